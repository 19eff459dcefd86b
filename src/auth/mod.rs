//! # Authentication
//!
//! The service issues an opaque key in exchange for an email and password.
//! The key travels in the `auth_key` header on every other call.

use std::fmt;

use serde::{Deserialize, Serialize};

use crate::http::ApiResponse;

/// Header carrying the auth key.
pub const AUTH_KEY_HEADER: &str = "auth_key";

#[derive(Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Credentials {
    pub email: String,
    pub password: String,
}

impl Credentials {
    pub fn new(email: impl Into<String>, password: impl Into<String>) -> Self {
        Self {
            email: email.into(),
            password: password.into(),
        }
    }
}

impl fmt::Debug for Credentials {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("Credentials")
            .field("email", &self.email)
            .field("password", &"<redacted>")
            .finish()
    }
}

/// Opaque key returned by `GET api/key`.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AuthKey(String);

impl AuthKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// Extract the `key` field from an auth response, if present.
    pub fn from_response(response: &ApiResponse) -> Option<Self> {
        response
            .field("key")
            .and_then(|value| value.as_str())
            .map(Self::new)
    }

    pub fn as_str(&self) -> &str {
        &self.0
    }
}
