//! Principal verification for write endpoints.
//!
//! Credentials are opaque bearer tokens. The shipped verifier compares the
//! SHA-256 digest of the presented token in constant time against digests
//! carried in configuration; token issuance is outside this service.

use sha2::{Digest, Sha256};
use subtle::ConstantTimeEq;
use thiserror::Error;

#[derive(Debug, Error, PartialEq, Eq)]
pub enum AuthError {
    #[error("missing credential")]
    Missing,
    #[error("invalid credential")]
    Invalid,
    #[error("insufficient role")]
    Forbidden,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Role {
    /// May mutate sights and clear caches.
    SightAdmin,
    /// Read-only caller.
    Viewer,
}

impl Role {
    pub fn parse(value: &str) -> Option<Self> {
        match value {
            "sight_admin" => Some(Role::SightAdmin),
            "viewer" => Some(Role::Viewer),
            _ => None,
        }
    }
}

#[derive(Debug, Clone)]
pub struct Principal {
    pub subject: String,
    pub role: Role,
}

impl Principal {
    pub fn require(&self, needed: Role) -> Result<(), AuthError> {
        if self.role == needed {
            Ok(())
        } else {
            Err(AuthError::Forbidden)
        }
    }
}

/// Validates a caller's identity and role from a credential.
pub trait PrincipalVerifier: Send + Sync {
    fn verify(&self, credential: &str) -> Result<Principal, AuthError>;
}

#[derive(Debug, Clone)]
pub struct TokenEntry {
    digest: [u8; 32],
    subject: String,
    role: Role,
}

/// Verifier backed by a static set of token digests from configuration.
pub struct DigestVerifier {
    tokens: Vec<TokenEntry>,
}

impl DigestVerifier {
    pub fn new(tokens: Vec<TokenEntry>) -> Self {
        Self { tokens }
    }

    /// Build an entry from a lowercase hex SHA-256 digest.
    pub fn entry(
        digest_hex: &str,
        subject: impl Into<String>,
        role: Role,
    ) -> Result<TokenEntry, AuthError> {
        let bytes = hex::decode(digest_hex).map_err(|_| AuthError::Invalid)?;
        let digest: [u8; 32] = bytes.try_into().map_err(|_| AuthError::Invalid)?;
        Ok(TokenEntry {
            digest,
            subject: subject.into(),
            role,
        })
    }

    /// Digest helper for issuing configuration entries in tests and docs.
    pub fn digest_hex(token: &str) -> String {
        let mut hasher = Sha256::new();
        hasher.update(token.as_bytes());
        hex::encode(hasher.finalize())
    }
}

impl PrincipalVerifier for DigestVerifier {
    fn verify(&self, credential: &str) -> Result<Principal, AuthError> {
        if credential.is_empty() {
            return Err(AuthError::Missing);
        }

        let mut hasher = Sha256::new();
        hasher.update(credential.as_bytes());
        let presented: [u8; 32] = hasher.finalize().into();

        for entry in &self.tokens {
            if entry.digest.ct_eq(&presented).unwrap_u8() == 1 {
                return Ok(Principal {
                    subject: entry.subject.clone(),
                    role: entry.role,
                });
            }
        }
        Err(AuthError::Invalid)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn verifier_with(token: &str, role: Role) -> DigestVerifier {
        let digest = DigestVerifier::digest_hex(token);
        let entry = DigestVerifier::entry(&digest, "ops", role).expect("valid digest");
        DigestVerifier::new(vec![entry])
    }

    #[test]
    fn known_token_yields_principal() {
        let verifier = verifier_with("sk_live_abc", Role::SightAdmin);
        let principal = verifier.verify("sk_live_abc").expect("verified");
        assert_eq!(principal.subject, "ops");
        assert!(principal.require(Role::SightAdmin).is_ok());
    }

    #[test]
    fn unknown_token_is_invalid() {
        let verifier = verifier_with("sk_live_abc", Role::SightAdmin);
        assert_eq!(
            verifier.verify("sk_live_xyz").unwrap_err(),
            AuthError::Invalid
        );
        assert_eq!(verifier.verify("").unwrap_err(), AuthError::Missing);
    }

    #[test]
    fn viewer_cannot_act_as_admin() {
        let verifier = verifier_with("sk_viewer", Role::Viewer);
        let principal = verifier.verify("sk_viewer").expect("verified");
        assert_eq!(
            principal.require(Role::SightAdmin),
            Err(AuthError::Forbidden)
        );
    }
}
