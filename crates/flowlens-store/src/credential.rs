use std::fmt;
use std::sync::Arc;

use crate::error::{Error, Result};

/// Environment variable holding the platform access token
pub const TOKEN_ENV_VAR: &str = "FLOWLENS_MCP_TOKEN";

const MAX_TOKEN_LEN: usize = 4096;

/// Bearer token authenticating this process to the FlowLens platform.
///
/// Immutable for the process lifetime. `Debug` is redacted and there is no
/// `Display`, so the value cannot end up in logs or error messages by accident.
#[derive(Clone, PartialEq, Eq)]
pub struct SessionCredential(Arc<str>);

impl SessionCredential {
    /// Validate a token supplied at startup.
    ///
    /// Tokens must be non-empty printable ASCII without whitespace so they
    /// can travel in an `Authorization` header unchanged.
    pub fn new(token: &str) -> Result<Self> {
        if token.is_empty() {
            return Err(Error::Credential(format!(
                "token is empty; pass --token or set {}",
                TOKEN_ENV_VAR
            )));
        }
        if token.len() > MAX_TOKEN_LEN {
            return Err(Error::Credential(format!(
                "token is longer than {} bytes",
                MAX_TOKEN_LEN
            )));
        }
        if let Some(pos) = token.chars().position(|c| !c.is_ascii_graphic()) {
            return Err(Error::Credential(format!(
                "token contains a whitespace, control or non-ASCII character at position {}",
                pos
            )));
        }
        Ok(Self(Arc::from(token)))
    }

    /// Resolve the token from an explicit value or [`TOKEN_ENV_VAR`].
    pub fn from_sources(explicit: Option<&str>) -> Result<Self> {
        match explicit {
            Some(token) => Self::new(token),
            None => match std::env::var(TOKEN_ENV_VAR) {
                Ok(token) => Self::new(&token),
                Err(_) => Err(Error::Credential(format!(
                    "no token supplied; pass --token or set {}",
                    TOKEN_ENV_VAR
                ))),
            },
        }
    }

    /// Raw token for the `Authorization` header. Keep call sites minimal.
    pub(crate) fn expose(&self) -> &str {
        &self.0
    }
}

impl fmt::Debug for SessionCredential {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("SessionCredential(<redacted>)")
    }
}
