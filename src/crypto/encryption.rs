use aes::Aes256;
use base64::{engine::general_purpose::STANDARD as BASE64, Engine};
use ecb::cipher::block_padding::Pkcs7;
use ecb::cipher::{BlockDecryptMut, BlockEncryptMut, Key, KeyInit};
use serde::{Deserialize, Deserializer, Serialize, Serializer};

use super::keys::FieldKey;
use super::CryptoError;

type Aes256EcbEnc = ecb::Encryptor<Aes256>;
type Aes256EcbDec = ecb::Decryptor<Aes256>;

pub const BLOCK_SIZE: usize = 16;

/// Opaque ciphertext for exactly one plaintext value.
///
/// Raw AES-256-ECB output with PKCS#7 padding: no IV, nonce or tag is
/// stored alongside, so equal plaintexts under one key give equal blobs.
#[derive(Clone, PartialEq, Eq)]
pub struct EncryptedField(Vec<u8>);

impl EncryptedField {
    /// Wrap bytes read back from storage. Validity is checked on decrypt.
    pub fn from_bytes(bytes: Vec<u8>) -> Self {
        Self(bytes)
    }

    pub fn as_bytes(&self) -> &[u8] {
        &self.0
    }

    pub fn into_bytes(self) -> Vec<u8> {
        self.0
    }

    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    pub fn to_base64(&self) -> String {
        BASE64.encode(&self.0)
    }

    pub fn from_base64(text: &str) -> Result<Self, base64::DecodeError> {
        BASE64.decode(text).map(Self)
    }
}

impl std::fmt::Debug for EncryptedField {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "EncryptedField({} bytes)", self.0.len())
    }
}

impl Serialize for EncryptedField {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.serialize_str(&self.to_base64())
    }
}

impl<'de> Deserialize<'de> for EncryptedField {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        let text = String::deserialize(deserializer)?;
        Self::from_base64(&text).map_err(serde::de::Error::custom)
    }
}

/// Encrypt a UTF-8 string under an already-derived key
pub fn encrypt(plaintext: &str, key: &FieldKey) -> EncryptedField {
    encrypt_bytes(plaintext.as_bytes(), key)
}

/// Decrypt a field back to the string it was produced from
pub fn decrypt(field: &EncryptedField, key: &FieldKey) -> Result<String, CryptoError> {
    let bytes = field.as_bytes();
    if bytes.is_empty() || bytes.len() % BLOCK_SIZE != 0 {
        return Err(CryptoError::InvalidLength { len: bytes.len() });
    }

    let cipher = Aes256EcbDec::new(Key::<Aes256EcbDec>::from_slice(key.as_bytes()));
    let plaintext = cipher
        .decrypt_padded_vec_mut::<Pkcs7>(bytes)
        .map_err(|_| CryptoError::InvalidPadding)?;

    String::from_utf8(plaintext).map_err(|_| CryptoError::InvalidUtf8)
}

/// Derive the key from `passphrase` and encrypt
pub fn encrypt_with_passphrase(plaintext: &str, passphrase: &str) -> EncryptedField {
    encrypt(plaintext, &FieldKey::derive(passphrase))
}

/// Derive the key from `passphrase` and decrypt
pub fn decrypt_with_passphrase(
    field: &EncryptedField,
    passphrase: &str,
) -> Result<String, CryptoError> {
    decrypt(field, &FieldKey::derive(passphrase))
}

fn encrypt_bytes(plaintext: &[u8], key: &FieldKey) -> EncryptedField {
    let cipher = Aes256EcbEnc::new(Key::<Aes256EcbEnc>::from_slice(key.as_bytes()));
    EncryptedField(cipher.encrypt_padded_vec_mut::<Pkcs7>(plaintext))
}

/// Field cipher bound to one key for the lifetime of a service.
///
/// Loaded once at startup and handed to whoever needs to encrypt or
/// decrypt; there is no process-wide key.
#[derive(Debug)]
pub struct FieldCipher {
    key: FieldKey,
}

impl FieldCipher {
    pub fn new(key: FieldKey) -> Self {
        Self { key }
    }

    pub fn from_passphrase(passphrase: &str) -> Self {
        Self::new(FieldKey::derive(passphrase))
    }

    pub fn encrypt(&self, plaintext: &str) -> EncryptedField {
        encrypt(plaintext, &self.key)
    }

    pub fn decrypt(&self, field: &EncryptedField) -> Result<String, CryptoError> {
        decrypt(field, &self.key)
    }

    /// Decrypt each named field independently so one corrupt blob does not
    /// hide the others.
    pub fn decrypt_each<'a>(
        &self,
        fields: &[(&'static str, &'a EncryptedField)],
    ) -> Vec<(&'static str, Result<String, CryptoError>)> {
        fields
            .iter()
            .map(|(name, field)| (*name, self.decrypt(field)))
            .collect()
    }
}
