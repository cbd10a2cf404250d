use sha3::{Digest, Keccak256};
use zeroize::Zeroize;

pub const KEY_LENGTH: usize = 32; // AES-256

/// Field encryption key, zeroed on drop.
///
/// Derived as Keccak-256 over the UTF-8 passphrase with no salt and no
/// iteration count. Every blob already stored depends on this exact
/// derivation, so it must not change without a re-encryption migration.
#[derive(Zeroize)]
#[zeroize(drop)]
pub struct FieldKey {
    pub(super) key_bytes: [u8; KEY_LENGTH],
}

impl FieldKey {
    /// Derive from a passphrase of any length
    pub fn derive(passphrase: &str) -> Self {
        let digest = Keccak256::digest(passphrase.as_bytes());
        let mut key_bytes = [0u8; KEY_LENGTH];
        key_bytes.copy_from_slice(&digest);
        Self { key_bytes }
    }

    /// Access the raw key bytes (internal use only)
    pub(crate) fn as_bytes(&self) -> &[u8; KEY_LENGTH] {
        &self.key_bytes
    }
}

impl std::fmt::Debug for FieldKey {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str("FieldKey(..)")
    }
}
