/// Registration and credential checks
use crate::db::{Store, UserRepository};
use crate::error::{AppError, Result};
use crate::forms::{Cleaned, FormErrors, SignupForm};
use crate::metrics::activity::LOGIN_ATTEMPTS_TOTAL;
use crate::models::{NewUser, User};
use argon2::{
    password_hash::{PasswordHash, PasswordHasher, PasswordVerifier, SaltString},
    Argon2,
};
use std::sync::Arc;
use tracing::{info, warn};

/// Hash a password with Argon2id and a random salt (PHC string)
pub fn hash_password(password: &str) -> Result<String> {
    let salt = SaltString::generate(&mut rand::rngs::OsRng);
    let hash = Argon2::default()
        .hash_password(password.as_bytes(), &salt)
        .map_err(|e| AppError::Internal(format!("Password hashing failed: {}", e)))?
        .to_string();
    Ok(hash)
}

/// Verify a password against a stored PHC hash
pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    let parsed_hash = PasswordHash::new(password_hash)
        .map_err(|e| AppError::Internal(format!("Invalid password hash format: {}", e)))?;

    match Argon2::default().verify_password(password.as_bytes(), &parsed_hash) {
        Ok(_) => Ok(true),
        Err(argon2::password_hash::Error::Password) => Ok(false),
        Err(e) => Err(AppError::Internal(format!(
            "Password verification failed: {}",
            e
        ))),
    }
}

pub struct AuthService {
    store: Arc<dyn Store>,
}

impl AuthService {
    pub fn new(store: Arc<dyn Store>) -> Self {
        Self { store }
    }

    /// Create an account from a cleaned signup form
    pub async fn signup(&self, form: SignupForm) -> Result<Cleaned<User>> {
        let password_hash = hash_password(&form.password1)?;
        let created = self
            .store
            .create_user(NewUser {
                username: form.username.clone(),
                first_name: form.first_name,
                last_name: form.last_name,
                email: form.email,
                password_hash,
            })
            .await?;

        match created {
            Some(user) => {
                info!(user_id = user.id, username = %user.username, "user registered");
                Ok(Ok(user))
            }
            None => Ok(Err(FormErrors::with(
                "username",
                "A user with that username already exists.",
            ))),
        }
    }

    /// The user when the credentials match, otherwise `None`
    pub async fn authenticate(&self, username: &str, password: &str) -> Result<Option<User>> {
        let user = self.store.find_user_by_username(username).await?;
        let verified = match &user {
            Some(user) => verify_password(password, &user.password_hash)?,
            None => false,
        };

        if verified {
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["success"]).inc();
            Ok(user)
        } else {
            LOGIN_ATTEMPTS_TOTAL.with_label_values(&["failure"]).inc();
            warn!(username = %username, "failed login attempt");
            Ok(None)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_hash_and_verify() {
        let hash = hash_password("war-and-peace").unwrap();
        assert!(hash.starts_with("$argon2id$"));
        assert!(verify_password("war-and-peace", &hash).unwrap());
        assert!(!verify_password("anna-karenina", &hash).unwrap());
    }

    #[test]
    fn test_verify_rejects_garbage_hash() {
        assert!(verify_password("x", "not-a-hash").is_err());
    }
}
