// Auth service - Form validation and user-facing auth messages
use crate::application::identity_provider::{AuthError, IdentityProvider};
use crate::domain::session::User;
use regex::Regex;
use std::sync::{Arc, LazyLock};

pub const MIN_PASSWORD_LEN: usize = 6;
pub const RESET_EMAIL_SENT: &str = "Password reset email sent";

static EMAIL_PATTERN: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"^[^\s@]+@[^\s@]+\.[^\s@]+$").expect("static email pattern"));

/// What the login and registration forms show. No provider detail leaks
/// past this type.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum AuthFailure {
    #[error("Invalid email or password")]
    InvalidCredentials,

    #[error("Enter your email first")]
    MissingEmail,

    #[error("Failed to send reset email")]
    ResetFailed,

    #[error("Invalid email address")]
    InvalidEmail,

    #[error("Password must be at least 6 characters")]
    PasswordTooShort,

    #[error("Passwords do not match")]
    PasswordMismatch,

    #[error("Email already in use")]
    EmailInUse,

    #[error("Error creating account")]
    RegistrationFailed,
}

#[derive(Clone)]
pub struct AuthService {
    provider: Arc<dyn IdentityProvider>,
}

impl AuthService {
    pub fn new(provider: Arc<dyn IdentityProvider>) -> Self {
        Self { provider }
    }

    pub async fn sign_in(&self, email: &str, password: &str) -> Result<User, AuthFailure> {
        self.provider.sign_in(email.trim(), password).await.map_err(|e| {
            tracing::info!("Sign-in rejected: {}", e);
            AuthFailure::InvalidCredentials
        })
    }

    /// Checks run in order and stop at the first problem, before any
    /// request reaches the provider.
    pub async fn register(
        &self,
        email: &str,
        password: &str,
        confirm_password: &str,
    ) -> Result<User, AuthFailure> {
        let email = email.trim();
        validate_registration(email, password, confirm_password)?;

        self.provider
            .register(email, password)
            .await
            .map_err(|e| match e {
                AuthError::EmailInUse => AuthFailure::EmailInUse,
                other => {
                    tracing::warn!("Registration failed: {}", other);
                    AuthFailure::RegistrationFailed
                }
            })
    }

    pub async fn sign_out(&self) {
        if let Err(e) = self.provider.sign_out().await {
            tracing::warn!("Sign-out failed: {}", e);
        }
    }

    pub async fn send_password_reset(&self, email: &str) -> Result<&'static str, AuthFailure> {
        let email = email.trim();
        if email.is_empty() {
            return Err(AuthFailure::MissingEmail);
        }
        match self.provider.send_password_reset(email).await {
            Ok(()) => Ok(RESET_EMAIL_SENT),
            Err(e) => {
                tracing::warn!("Password reset failed: {}", e);
                Err(AuthFailure::ResetFailed)
            }
        }
    }
}

pub fn validate_registration(
    email: &str,
    password: &str,
    confirm_password: &str,
) -> Result<(), AuthFailure> {
    if !EMAIL_PATTERN.is_match(email) {
        return Err(AuthFailure::InvalidEmail);
    }
    if password.chars().count() < MIN_PASSWORD_LEN {
        return Err(AuthFailure::PasswordTooShort);
    }
    if password != confirm_password {
        return Err(AuthFailure::PasswordMismatch);
    }
    Ok(())
}
