//! Local email identity provider.
//!
//! Derives a deterministic account id from the normalized address so the
//! same email always maps to the same collection.

use crate::auth::{AuthError, AuthProvider, AuthResult, AuthUser, IdentityProvider, SignInRequest};
use log::info;
use once_cell::sync::Lazy;
use regex::Regex;
use std::sync::{Mutex, PoisonError};
use uuid::Uuid;

static EMAIL_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[^@\s]+@[^@\s]+\.[^@\s]+$").expect("valid email regex"));

const USER_NAMESPACE: Uuid = Uuid::from_u128(0x6d79_746f_646f_4c69_7374_5573_6572_4e53);

/// Email provider that keeps the signed-in user in memory.
#[derive(Debug, Default)]
pub struct EmailAuthProvider {
    current: Mutex<Option<AuthUser>>,
}

impl EmailAuthProvider {
    pub fn new() -> Self {
        Self::default()
    }
}

impl AuthProvider for EmailAuthProvider {
    fn current_user(&self) -> Option<AuthUser> {
        self.current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .clone()
    }

    fn sign_in(&self, request: &SignInRequest) -> AuthResult<AuthUser> {
        if !request.providers.contains(&IdentityProvider::Email) {
            return Err(AuthError::Rejected(
                "email provider is not offered".to_string(),
            ));
        }
        let email = request
            .email
            .as_deref()
            .ok_or_else(|| AuthError::Rejected("email is required".to_string()))?;
        let email = normalize_email(email)?;
        let user = AuthUser {
            uid: uid_for_email(&email),
            email,
        };

        info!("event=auth_sign_in module=auth status=ok provider=email");
        *self.current.lock().unwrap_or_else(PoisonError::into_inner) = Some(user.clone());
        Ok(user)
    }

    fn sign_out(&self) -> AuthResult<()> {
        let previous = self
            .current
            .lock()
            .unwrap_or_else(PoisonError::into_inner)
            .take();
        info!(
            "event=auth_sign_out module=auth status=ok had_user={}",
            previous.is_some()
        );
        Ok(())
    }
}

fn normalize_email(value: &str) -> AuthResult<String> {
    let normalized = value.trim().to_ascii_lowercase();
    if !EMAIL_RE.is_match(&normalized) {
        return Err(AuthError::Rejected("email address is malformed".to_string()));
    }
    Ok(normalized)
}

/// Stable account id for one normalized email address.
pub fn uid_for_email(email: &str) -> String {
    Uuid::new_v5(&USER_NAMESPACE, email.as_bytes())
        .simple()
        .to_string()
}
