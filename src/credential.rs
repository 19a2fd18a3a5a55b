//! API credential resolution.
//!
//! Each backend reads exactly one environment variable
//! ([`ModelKind::credential_var`]). Resolution happens before the PDF is read
//! and before any client exists, so a missing key never costs a network call.

use crate::config::ModelKind;
use crate::error::VegaError;
use std::fmt;
use tracing::debug;

/// An API key. `Debug` never prints the secret.
#[derive(Clone, PartialEq, Eq)]
pub struct ApiKey(String);

impl ApiKey {
    pub fn new(key: impl Into<String>) -> Self {
        Self(key.into())
    }

    /// The raw secret, for request headers only.
    pub fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for ApiKey {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("ApiKey(<redacted>)")
    }
}

/// Resolve the credential for `model` from the process environment.
pub fn resolve_api_key(model: ModelKind) -> Result<ApiKey, VegaError> {
    resolve_api_key_with(model, |name| std::env::var(name).ok())
}

/// Resolve the credential for `model` using `lookup` to read variables.
///
/// Blank values count as missing.
pub fn resolve_api_key_with<F>(model: ModelKind, lookup: F) -> Result<ApiKey, VegaError>
where
    F: Fn(&str) -> Option<String>,
{
    let var = model.credential_var();
    match lookup(var) {
        Some(value) if !value.trim().is_empty() => {
            debug!("Using credential from {}", var);
            Ok(ApiKey(value.trim().to_string()))
        }
        _ => Err(VegaError::MissingCredential { model, var }),
    }
}
