//! Authentication contracts.
//!
//! # Responsibility
//! - Describe the sign-in handshake the screen consumes: launch a provider
//!   flow, receive a success/failure outcome.
//! - Expose the signed-in user whose `uid` names the remote collection.
//!
//! # Invariants
//! - A `uid` is stable for the same account across sign-ins.
//! - `uid` values are valid collection names (ASCII alphanumeric).

use std::error::Error;
use std::fmt::{Display, Formatter};

pub mod email;

pub type AuthResult<T> = Result<T, AuthError>;

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum AuthError {
    /// Provider refused the credentials or request shape.
    Rejected(String),
    /// Provider backend could not be reached.
    Unavailable(String),
}

impl Display for AuthError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::Rejected(message) => write!(f, "sign-in rejected: {message}"),
            Self::Unavailable(message) => write!(f, "auth provider unavailable: {message}"),
        }
    }
}

impl Error for AuthError {}

/// Identity providers the sign-in flow may offer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum IdentityProvider {
    Email,
}

/// Signed-in account.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthUser {
    /// Stable per-account id; doubles as the remote collection name.
    pub uid: String,
    pub email: String,
}

/// Request handed to the host UI to present a provider flow.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SignInRequest {
    pub providers: Vec<IdentityProvider>,
    /// Filled by the host once the user typed an address.
    pub email: Option<String>,
}

impl SignInRequest {
    /// The only flow the app offers: email sign-in.
    pub fn email_only() -> Self {
        Self {
            providers: vec![IdentityProvider::Email],
            email: None,
        }
    }

    pub fn with_email(mut self, email: impl Into<String>) -> Self {
        self.email = Some(email.into());
        self
    }
}

/// Result the host UI reports after the provider flow finishes.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum SignInOutcome {
    SignedIn(AuthUser),
    Cancelled,
    Failed(String),
}

/// Authentication provider seam.
pub trait AuthProvider: Send + Sync {
    fn current_user(&self) -> Option<AuthUser>;
    fn sign_in(&self, request: &SignInRequest) -> AuthResult<AuthUser>;
    fn sign_out(&self) -> AuthResult<()>;
}

/// Runs the provider and folds the result into a UI outcome.
pub fn complete_sign_in(provider: &dyn AuthProvider, request: &SignInRequest) -> SignInOutcome {
    if request.email.is_none() {
        return SignInOutcome::Cancelled;
    }
    match provider.sign_in(request) {
        Ok(user) => SignInOutcome::SignedIn(user),
        Err(err) => SignInOutcome::Failed(err.to_string()),
    }
}
