//! File-level encrypt/decrypt orchestration.

use std::fs::File;
use std::io::BufWriter;
use std::path::{Path, PathBuf};

use secrecy::{ExposeSecret, SecretString};
use subtle::ConstantTimeEq;
use tracing::{debug, info, warn};

use crate::crypto::generate_iv;
use crate::file::{
    create_output, decrypted_output_path, encrypted_output_path, finish_output, remove_source,
    require_exists,
};
use crate::format::{check_original_size, is_container, read_header, write_header};
use crate::kdf::{Key, derive_key, fingerprint};
use crate::streaming::{bounded_chunk_size, decrypt_stream, encrypt_stream};
use crate::types::{EncryptionProfile, EngineError};

/// Password-based file encryption engine.
///
/// An engine is an immutable value: the profile it is built from cannot be changed
/// afterwards and the password is never exposed. Engines deliberately do not
/// implement `PartialEq`; use [`matches_password`](Self::matches_password) or
/// [`shares_password_with`](Self::shares_password_with).
///
/// Calls do not lock anything. Callers must serialize access to a given path.
#[derive(Debug, Clone)]
pub struct FileEncryptionEngine {
    profile: EncryptionProfile,
}

impl FileEncryptionEngine {
    /// Engine with the default profile for `password`.
    pub fn new(password: SecretString) -> Self {
        Self {
            profile: EncryptionProfile::new(password),
        }
    }

    /// Engine with a custom profile.
    ///
    /// # Errors
    ///
    /// Returns `EngineError::Invalid` when the chunk size is zero or the signature is empty.
    pub fn with_profile(profile: EncryptionProfile) -> Result<Self, EngineError> {
        profile.validate()?;
        Ok(Self { profile })
    }

    pub fn profile(&self) -> &EncryptionProfile {
        &self.profile
    }

    /// True if `path` starts with this engine's signature.
    pub fn is_encrypted(&self, path: &Path) -> Result<bool, EngineError> {
        require_exists(path)?;
        let mut file = File::open(path)?;
        is_container(&mut file, self.profile.signature())
    }

    /// Encrypt `path` into `path` + ".enc".
    ///
    /// Refuses files that already carry the signature. When `delete_original` is set,
    /// the plaintext is removed only after the container has been fully written and
    /// synced.
    ///
    /// An I/O failure while streaming leaves the partial container on disk; it is not
    /// rolled back.
    ///
    /// # Errors
    ///
    /// `FileNotFound`, `AlreadyEncrypted`, `OutputExists`, `Invalid` (file too large
    /// for the size field), `Crypto` (no randomness), `Io`.
    pub fn encrypt(&self, path: &Path, delete_original: bool) -> Result<PathBuf, EngineError> {
        require_exists(path)?;
        let mut input = File::open(path)?;
        if is_container(&mut input, self.profile.signature())? {
            return Err(EngineError::AlreadyEncrypted(path.to_path_buf()));
        }

        let original_size = input.metadata()?.len();
        check_original_size(original_size)?;
        let iv = generate_iv()?;
        let key = self.key();
        let key_fingerprint = fingerprint(&key);

        let out_path = encrypted_output_path(path);
        let mut output = BufWriter::new(create_output(&out_path, self.profile.force())?);
        write_header(
            &mut output,
            self.profile.signature(),
            &key_fingerprint,
            original_size,
            &iv,
        )?;
        debug!(path = %out_path.display(), original_size, "container header written");

        let chunk_size = bounded_chunk_size(self.profile.chunk_size(), original_size);
        let body = encrypt_stream(&mut input, &mut output, &key, &iv, chunk_size)?;
        finish_output(output.into_inner().map_err(|e| e.into_error())?)?;
        drop(input);

        if delete_original {
            remove_source(path)?;
            debug!(path = %path.display(), "removed plaintext source");
        }
        info!(
            input = %path.display(),
            output = %out_path.display(),
            original_size,
            ciphertext = body,
            "encrypted file"
        );
        Ok(out_path)
    }

    /// Decrypt a container into its path with ".enc" stripped.
    ///
    /// The password is checked against the header fingerprint before any output file
    /// is created. When `delete_original` is set, the container is removed only after
    /// the plaintext has been fully written and synced.
    ///
    /// This is not authenticated encryption: a corrupted body decrypts to garbage
    /// without an error, as long as it is long enough.
    ///
    /// # Errors
    ///
    /// `FileNotFound`, `FileIsNotEncrypted`, `MalformedHeader`, `WrongPassword`,
    /// `OutputExists`, `TruncatedBody`, `Io`.
    pub fn decrypt(&self, path: &Path, delete_original: bool) -> Result<PathBuf, EngineError> {
        require_exists(path)?;
        let mut input = File::open(path)?;
        if !is_container(&mut input, self.profile.signature())? {
            return Err(EngineError::FileIsNotEncrypted(path.to_path_buf()));
        }

        let header = read_header(&mut input, self.profile.signature().len())?;
        let key = self.key();
        if !bool::from(fingerprint(&key)[..].ct_eq(&header.key_fingerprint[..])) {
            warn!(path = %path.display(), "key fingerprint mismatch");
            return Err(EngineError::WrongPassword);
        }
        debug!(path = %path.display(), original_size = header.original_size, "container header verified");

        let out_path = decrypted_output_path(path);
        let mut output = BufWriter::new(create_output(&out_path, self.profile.force())?);
        let plain = decrypt_stream(
            &mut input,
            &mut output,
            &key,
            &header.iv,
            bounded_chunk_size(self.profile.chunk_size(), header.original_size),
            header.original_size,
        )?;
        finish_output(output.into_inner().map_err(|e| e.into_error())?)?;
        drop(input);

        if delete_original {
            remove_source(path)?;
            debug!(path = %path.display(), "removed container");
        }
        info!(
            input = %path.display(),
            output = %out_path.display(),
            plaintext = plain,
            "decrypted file"
        );
        Ok(out_path)
    }

    /// True if this engine was configured with `candidate` as its password.
    pub fn matches_password(&self, candidate: &str) -> bool {
        self.key().as_slice().ct_eq(derive_key(candidate).as_slice()).into()
    }

    /// True if both engines hold the same password. Other settings are ignored.
    pub fn shares_password_with(&self, other: &FileEncryptionEngine) -> bool {
        self.key().as_slice().ct_eq(other.key().as_slice()).into()
    }

    fn key(&self) -> Key {
        derive_key(self.profile.password.expose_secret())
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn engine(pw: &str) -> FileEncryptionEngine {
        FileEncryptionEngine::new(SecretString::new(pw.into()))
    }

    #[test]
    fn password_matching() {
        let a = engine("correct");
        assert!(a.matches_password("correct"));
        assert!(!a.matches_password("wrong"));
        assert!(!a.matches_password(""));
    }

    #[test]
    fn engines_compare_by_password_only() {
        let a = engine("pw");
        let b = FileEncryptionEngine::with_profile(
            EncryptionProfile::new(SecretString::new("pw".into()))
                .with_signature("OTHER")
                .with_chunk_size(17),
        )
        .unwrap();
        assert!(a.shares_password_with(&b));
        assert!(!a.shares_password_with(&engine("pw2")));
    }

    #[test]
    fn invalid_profile_rejected() {
        let res = FileEncryptionEngine::with_profile(
            EncryptionProfile::new(SecretString::new("pw".into())).with_chunk_size(0),
        );
        assert!(matches!(res, Err(EngineError::Invalid(_))));
    }
}
