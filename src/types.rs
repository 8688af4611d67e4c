//! Core types, constants and the error enum for aesfile.

use std::path::PathBuf;

use secrecy::SecretString;
use thiserror::Error;

/// Default chunk size for streaming (32 KiB).
pub const DEFAULT_CHUNK_SIZE: usize = 32 * 1024;

/// Largest accepted chunk size (64 MiB). The chunk buffer is allocated up front.
pub const MAX_CHUNK_SIZE: usize = 64 * 1024 * 1024;

/// Marker written at the start of every container unless the profile overrides it.
pub const DEFAULT_SIGNATURE: &str = "AESFILE-ENCRYPTED";

/// Extension appended on encrypt and stripped on decrypt.
pub const ENC_EXTENSION: &str = "enc";

/// Immutable engine configuration.
///
/// The password is kept behind [`SecretString`] and has no getter; the rest of the
/// settings are readable so callers can report what an engine was built with.
#[derive(Debug, Clone)]
pub struct EncryptionProfile {
    pub(crate) password: SecretString,
    signature_text: String,
    chunk_size: usize,
    force: bool,
}

impl EncryptionProfile {
    /// Profile with the default signature, 32 KiB chunks and no overwriting.
    pub fn new(password: SecretString) -> Self {
        Self {
            password,
            signature_text: DEFAULT_SIGNATURE.to_owned(),
            chunk_size: DEFAULT_CHUNK_SIZE,
            force: false,
        }
    }

    /// Use a custom container signature.
    pub fn with_signature(mut self, signature_text: impl Into<String>) -> Self {
        self.signature_text = signature_text.into();
        self
    }

    /// Streaming chunk size in bytes. Rounded up to a multiple of 16 when streaming.
    pub fn with_chunk_size(mut self, chunk_size: usize) -> Self {
        self.chunk_size = chunk_size;
        self
    }

    /// When `true`, allow overwriting existing output file paths.
    pub fn with_force(mut self, on: bool) -> Self {
        self.force = on;
        self
    }

    pub fn signature_text(&self) -> &str {
        &self.signature_text
    }

    pub fn signature(&self) -> &[u8] {
        self.signature_text.as_bytes()
    }

    pub fn chunk_size(&self) -> usize {
        self.chunk_size
    }

    pub fn force(&self) -> bool {
        self.force
    }

    pub(crate) fn validate(&self) -> Result<(), EngineError> {
        if self.signature_text.is_empty() {
            return Err(EngineError::Invalid("signature must not be empty"));
        }
        if self.chunk_size == 0 {
            return Err(EngineError::Invalid("chunk_size must be > 0"));
        }
        if self.chunk_size > MAX_CHUNK_SIZE {
            return Err(EngineError::Invalid("chunk_size must be at most 64 MiB"));
        }
        Ok(())
    }
}

/// Library error type (no panics for expected failures).
#[derive(Error, Debug)]
pub enum EngineError {
    #[error("file not found: {}", .0.display())]
    FileNotFound(PathBuf),
    #[error("file is already encrypted: {}", .0.display())]
    AlreadyEncrypted(PathBuf),
    #[error("file is not encrypted: {}", .0.display())]
    FileIsNotEncrypted(PathBuf),
    #[error("malformed header: {0}")]
    MalformedHeader(&'static str),
    #[error("wrong password")]
    WrongPassword,
    #[error("ciphertext ended early: expected {expected} bytes, recovered {actual}")]
    TruncatedBody { expected: u64, actual: u64 },
    #[error("output exists: {}; enable force to overwrite", .0.display())]
    OutputExists(PathBuf),
    #[error("invalid argument: {0}")]
    Invalid(&'static str),
    #[error("encryption/decryption failure")]
    Crypto,
    #[error("I/O error")]
    Io(#[from] std::io::Error),
}

#[cfg(test)]
mod tests {
    use super::*;

    fn pw() -> SecretString {
        SecretString::new("pw".into())
    }

    #[test]
    fn defaults_are_valid() {
        let p = EncryptionProfile::new(pw());
        assert_eq!(p.signature_text(), DEFAULT_SIGNATURE);
        assert_eq!(p.chunk_size(), DEFAULT_CHUNK_SIZE);
        assert!(!p.force());
        assert!(p.validate().is_ok());
    }

    #[test]
    fn zero_chunk_and_empty_signature_rejected() {
        let zero = EncryptionProfile::new(pw()).with_chunk_size(0);
        assert!(matches!(zero.validate(), Err(EngineError::Invalid(_))));

        let empty = EncryptionProfile::new(pw()).with_signature("");
        assert!(matches!(empty.validate(), Err(EngineError::Invalid(_))));
    }

    #[test]
    fn oversize_chunk_rejected() {
        let max = EncryptionProfile::new(pw()).with_chunk_size(MAX_CHUNK_SIZE);
        assert!(max.validate().is_ok());

        for size in [MAX_CHUNK_SIZE + 1, MAX_CHUNK_SIZE * 2, usize::MAX / 2, usize::MAX] {
            let p = EncryptionProfile::new(pw()).with_chunk_size(size);
            assert!(
                matches!(p.validate(), Err(EngineError::Invalid(_))),
                "size={size}"
            );
        }
    }

    #[test]
    fn debug_does_not_leak_password() {
        let p = EncryptionProfile::new(SecretString::new("hunter2".into()));
        assert!(!format!("{p:?}").contains("hunter2"));
    }
}
