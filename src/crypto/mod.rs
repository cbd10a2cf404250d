pub mod keys;
pub mod encryption;
mod phi_audit;

pub use keys::*;
pub use encryption::*;

use thiserror::Error;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
pub enum CryptoError {
    #[error("Ciphertext length {len} is not a positive multiple of the block size")]
    InvalidLength { len: usize },

    #[error("Invalid padding — wrong key or corrupted data")]
    InvalidPadding,

    #[error("Decrypted bytes are not valid UTF-8")]
    InvalidUtf8,
}
