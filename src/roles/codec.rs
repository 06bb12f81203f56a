//! Identifier codec - derives stable storage ids from role display names
//!
//! The id is the namespace prefix followed by the lowercase hex of the first
//! 128 bits of the SHA-256 digest of the name. This keeps ids clear of the
//! storage layer's length and character restrictions and lets the registry
//! tell managed roles apart from foreign groups with a prefix test.

use sha2::{Digest, Sha256};

/// Number of digest bytes kept in the id (128 bits)
const DIGEST_BYTES: usize = 16;

/// Maps display names to namespaced ids
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct IdCodec {
    prefix: String,
}

impl IdCodec {
    pub fn new(prefix: impl Into<String>) -> Self {
        Self {
            prefix: prefix.into(),
        }
    }

    pub fn prefix(&self) -> &str {
        &self.prefix
    }

    /// Derive the id for a display name. Pure and deterministic.
    pub fn derive_id(&self, display_name: &str) -> String {
        let digest = Sha256::digest(display_name.as_bytes());
        format!("{}{}", self.prefix, hex::encode(&digest[..DIGEST_BYTES]))
    }

    /// Whether a group id belongs to a managed role
    pub fn is_managed(&self, id: &str) -> bool {
        id.starts_with(&self.prefix)
    }
}

impl Default for IdCodec {
    fn default() -> Self {
        Self::new("roles.")
    }
}
