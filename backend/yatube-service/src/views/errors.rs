//! Error pages. These render without a viewer, so the navigation shows
//! the anonymous links.

use super::{escape_html, layout, PageContext};

pub fn not_found(path: &str) -> String {
    layout(
        &PageContext::anonymous(),
        "Page not found",
        &format!(
            "<h1>Custom 404</h1>\n<p>Page {} not found</p>\n<a href=\"/\">Go to the home page</a>\n",
            escape_html(path)
        ),
    )
}

pub fn permission_denied() -> String {
    layout(
        &PageContext::anonymous(),
        "Access denied",
        "<h1>Custom 403</h1>\n<p>You do not have permission to view this page.</p>\n",
    )
}

pub fn csrf_failure() -> String {
    layout(
        &PageContext::anonymous(),
        "CSRF verification failed",
        "<h1>Custom 403</h1>\n<p>CSRF verification failed. Request aborted.</p>\n",
    )
}

pub fn bad_request(message: &str) -> String {
    layout(
        &PageContext::anonymous(),
        "Bad request",
        &format!("<h1>Bad request</h1>\n<p>{}</p>\n", escape_html(message)),
    )
}

pub fn server_error() -> String {
    layout(
        &PageContext::anonymous(),
        "Server error",
        "<h1>Server error</h1>\n<p>Something went wrong. Please try again later.</p>\n",
    )
}
