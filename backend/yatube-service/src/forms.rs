/// HTML form payloads and their validation
///
/// Text inputs are trimmed before validation. Field errors are collected
/// into [`FormErrors`] so a page can be re-rendered next to the input.
use crate::error::{AppError, Result};
use actix_multipart::Multipart;
use futures_util::stream::StreamExt;
use serde::Deserialize;
use std::collections::BTreeMap;
use validator::{Validate, ValidateEmail, ValidationError, ValidationErrors};

/// Name of the hidden CSRF input on every POST form
pub const CSRF_FIELD: &str = "csrfmiddlewaretoken";

/// Key used for errors that belong to the whole form
pub const NON_FIELD: &str = "__all__";

/// Largest accepted non-file part of a multipart form (2.5 MiB)
pub const MAX_FIELD_BYTES: usize = 2_621_440;

/// Outcome of cleaning a form
pub type Cleaned<T> = std::result::Result<T, FormErrors>;

/// Error messages keyed by field name
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct FormErrors {
    fields: BTreeMap<String, Vec<String>>,
}

impl FormErrors {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn add(&mut self, field: &str, message: impl Into<String>) {
        self.fields
            .entry(field.to_string())
            .or_default()
            .push(message.into());
    }

    pub fn with(field: &str, message: impl Into<String>) -> Self {
        let mut errors = Self::new();
        errors.add(field, message);
        errors
    }

    pub fn get(&self, field: &str) -> &[String] {
        self.fields.get(field).map(Vec::as_slice).unwrap_or(&[])
    }

    pub fn is_empty(&self) -> bool {
        self.fields.is_empty()
    }

    pub fn merge(&mut self, other: FormErrors) {
        for (field, messages) in other.fields {
            self.fields.entry(field).or_default().extend(messages);
        }
    }
}

impl From<ValidationErrors> for FormErrors {
    fn from(errors: ValidationErrors) -> Self {
        let mut form_errors = FormErrors::new();
        for (field, field_errors) in errors.field_errors() {
            let field: &str = field.as_ref();
            for error in field_errors {
                let message = error
                    .message
                    .as_ref()
                    .map(|m| m.to_string())
                    .unwrap_or_else(|| format!("Invalid value ({}).", error.code));
                form_errors.add(field, message);
            }
        }
        form_errors
    }
}

/// Run derive validation and convert the result
pub fn check<T: Validate>(form: &T) -> Cleaned<()> {
    form.validate().map_err(FormErrors::from)
}

/// File part of a multipart form
#[derive(Debug, Clone, Default)]
pub struct UploadedFile {
    pub filename: Option<String>,
    pub bytes: Vec<u8>,
}

/// Create/edit post form (multipart)
#[derive(Debug, Clone, Default, Validate)]
pub struct PostForm {
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    /// Raw value of the group select; empty means no group
    pub group: Option<String>,
    pub image: Option<UploadedFile>,
    pub csrf_token: Option<String>,
}

impl PostForm {
    /// Read every part of the request. File parts beyond `max_file_bytes`
    /// are truncated to `max_file_bytes + 1` so the size check still fails.
    /// Any other part larger than [`MAX_FIELD_BYTES`] rejects the request.
    pub async fn from_multipart(mut payload: Multipart, max_file_bytes: usize) -> Result<Self> {
        let mut form = PostForm::default();

        while let Some(item) = payload.next().await {
            let mut field =
                item.map_err(|e| AppError::Validation(format!("malformed form data: {}", e)))?;
            let (name, filename) = match field.content_disposition() {
                Some(cd) => (
                    cd.get_name().unwrap_or_default().to_string(),
                    cd.get_filename().map(str::to_string),
                ),
                None => continue,
            };

            let is_file = name == "image";
            let limit = if is_file {
                max_file_bytes.saturating_add(1)
            } else {
                MAX_FIELD_BYTES
            };
            let mut bytes = Vec::new();
            while let Some(chunk) = field.next().await {
                let chunk = chunk
                    .map_err(|e| AppError::Validation(format!("malformed form data: {}", e)))?;
                if bytes.len() + chunk.len() > limit {
                    if !is_file {
                        return Err(AppError::Validation(format!(
                            "form field `{}` exceeds {} bytes",
                            name, MAX_FIELD_BYTES
                        )));
                    }
                    let room = limit - bytes.len();
                    bytes.extend_from_slice(&chunk[..room]);
                } else {
                    bytes.extend_from_slice(&chunk);
                }
            }

            match name.as_str() {
                "text" => form.text = String::from_utf8_lossy(&bytes).trim().to_string(),
                "group" => {
                    let value = String::from_utf8_lossy(&bytes).trim().to_string();
                    form.group = (!value.is_empty()).then_some(value);
                }
                "image" => {
                    // Browsers send an empty part when no file was chosen
                    if !bytes.is_empty() {
                        form.image = Some(UploadedFile { filename, bytes });
                    }
                }
                CSRF_FIELD => form.csrf_token = Some(String::from_utf8_lossy(&bytes).to_string()),
                other => tracing::debug!(field = %other, "ignoring unknown form field"),
            }
        }

        Ok(form)
    }

    /// Parse the group select value; `Err` carries the field message
    pub fn group_id(&self) -> std::result::Result<Option<i64>, String> {
        match self.group.as_deref() {
            None => Ok(None),
            Some(raw) => raw
                .parse::<i64>()
                .map(Some)
                .map_err(|_| invalid_choice_message()),
        }
    }
}

pub fn invalid_choice_message() -> String {
    "Select a valid choice. That choice is not one of the available choices.".to_string()
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct CommentForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub text: String,
    #[serde(default)]
    pub csrfmiddlewaretoken: Option<String>,
}

impl CommentForm {
    pub fn clean(mut self) -> Cleaned<Self> {
        self.text = self.text.trim().to_string();
        check(&self)?;
        Ok(self)
    }
}

fn validate_username(username: &str) -> std::result::Result<(), ValidationError> {
    let allowed = username
        .chars()
        .all(|c| c.is_alphanumeric() || matches!(c, '@' | '.' | '+' | '-' | '_'));
    if allowed {
        Ok(())
    } else {
        let mut error = ValidationError::new("invalid_username");
        error.message = Some(
            "Enter a valid username. This value may contain only letters, numbers, and @/./+/-/_ characters."
                .into(),
        );
        Err(error)
    }
}

/// Email may be left blank, but must be well-formed when given
fn validate_optional_email(email: &str) -> std::result::Result<(), ValidationError> {
    if email.is_empty() || email.validate_email() {
        Ok(())
    } else {
        let mut error = ValidationError::new("email");
        error.message = Some("Enter a valid email address.".into());
        Err(error)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct SignupForm {
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub first_name: String,
    #[serde(default)]
    #[validate(length(max = 150, message = "Ensure this value has at most 150 characters."))]
    pub last_name: String,
    #[serde(default)]
    #[validate(
        length(min = 1, max = 150, message = "Enter a username of at most 150 characters."),
        custom(function = "validate_username")
    )]
    pub username: String,
    #[serde(default)]
    #[validate(custom(function = "validate_optional_email"))]
    pub email: String,
    #[serde(default)]
    #[validate(length(
        min = 8,
        message = "This password is too short. It must contain at least 8 characters."
    ))]
    pub password1: String,
    #[serde(default)]
    #[validate(must_match(other = "password1", message = "The two password fields didn't match."))]
    pub password2: String,
    #[serde(default)]
    pub csrfmiddlewaretoken: Option<String>,
}

impl SignupForm {
    pub fn clean(mut self) -> Cleaned<Self> {
        self.first_name = self.first_name.trim().to_string();
        self.last_name = self.last_name.trim().to_string();
        self.username = self.username.trim().to_string();
        self.email = self.email.trim().to_string();
        check(&self)?;
        Ok(self)
    }
}

#[derive(Debug, Clone, Default, Deserialize, Validate)]
pub struct LoginForm {
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub username: String,
    #[serde(default)]
    #[validate(length(min = 1, message = "This field is required."))]
    pub password: String,
    #[serde(default)]
    pub next: Option<String>,
    #[serde(default)]
    pub csrfmiddlewaretoken: Option<String>,
}

impl LoginForm {
    pub fn clean(mut self) -> Cleaned<Self> {
        self.username = self.username.trim().to_string();
        check(&self)?;
        Ok(self)
    }
}

/// Form carrying only the CSRF token (logout, profile POST)
#[derive(Debug, Clone, Default, Deserialize)]
pub struct TokenOnlyForm {
    #[serde(default)]
    pub csrfmiddlewaretoken: Option<String>,
}

/// Redirect target when it is a local absolute path, else `None`
pub fn safe_next(next: Option<&str>) -> Option<String> {
    let next = next?.trim();
    let local = next.starts_with('/')
        && !next.starts_with("//")
        && !next.starts_with("/\\")
        && !next.chars().any(char::is_control);
    local.then(|| next.to_string())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn signup(password1: &str, password2: &str) -> SignupForm {
        SignupForm {
            first_name: "Leo".into(),
            last_name: "Tolstoy".into(),
            username: "leo".into(),
            email: "leo@example.com".into(),
            password1: password1.into(),
            password2: password2.into(),
            csrfmiddlewaretoken: None,
        }
    }

    #[test]
    fn test_signup_valid() {
        assert!(signup("war-and-peace", "war-and-peace").clean().is_ok());
    }

    #[test]
    fn test_signup_password_rules() {
        let errors = signup("short", "short").clean().unwrap_err();
        assert!(!errors.get("password1").is_empty());

        let errors = signup("war-and-peace", "anna-karenina").clean().unwrap_err();
        assert_eq!(
            errors.get("password2"),
            &["The two password fields didn't match.".to_string()]
        );
    }

    #[test]
    fn test_signup_email_optional_but_checked() {
        let mut form = signup("war-and-peace", "war-and-peace");
        form.email = String::new();
        assert!(form.clone().clean().is_ok());
        form.email = "not-an-email".into();
        assert!(!form.clean().unwrap_err().get("email").is_empty());
    }

    #[test]
    fn test_signup_rejects_bad_username() {
        let mut form = signup("war-and-peace", "war-and-peace");
        form.username = "leo tolstoy!".into();
        let errors = form.clean().unwrap_err();
        assert!(!errors.get("username").is_empty());
    }

    #[test]
    fn test_comment_whitespace_only_is_empty() {
        let form = CommentForm {
            text: "   ".into(),
            csrfmiddlewaretoken: None,
        };
        let errors = form.clean().unwrap_err();
        assert_eq!(errors.get("text"), &["This field is required.".to_string()]);
    }

    #[test]
    fn test_post_form_group_id() {
        let mut form = PostForm::default();
        assert_eq!(form.group_id(), Ok(None));
        form.group = Some("12".into());
        assert_eq!(form.group_id(), Ok(Some(12)));
        form.group = Some("cats".into());
        assert!(form.group_id().is_err());
    }

    #[test]
    fn test_safe_next() {
        assert_eq!(safe_next(Some("/create/")), Some("/create/".to_string()));
        assert_eq!(safe_next(Some("//evil.example/")), None);
        assert_eq!(safe_next(Some("https://evil.example/")), None);
        assert_eq!(safe_next(Some("")), None);
        assert_eq!(safe_next(None), None);
    }

    #[test]
    fn test_form_errors_merge() {
        let mut errors = FormErrors::with("text", "a");
        errors.merge(FormErrors::with("text", "b"));
        assert_eq!(errors.get("text").len(), 2);
        assert!(errors.get("group").is_empty());
    }
}
