/// HTTP middleware for the Yatube service
///
/// Resolves the logged-in user from the session cookie and issues the
/// CSRF cookie. Handlers read the results through the [`Viewer`] and
/// [`CsrfToken`] extractors.
pub mod session;

pub use session::{session_cookie, CsrfToken, SessionMiddleware, Viewer};
