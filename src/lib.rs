#![forbid(unsafe_code)]
//! # aesfile — streaming password-based file encryption.
//!
//! `aesfile` encrypts a file of any size into a self-identifying container and back,
//! streaming the body through AES-256-CFB in fixed-size chunks so memory use does
//! not grow with the file.
//!
//! ## Container
//! - **Signature**: a configurable marker string, written verbatim first. A file is
//!   "ours" iff it starts with these bytes.
//! - **Key fingerprint**: SHA-256 of the derived key, checked before any plaintext
//!   is written so a wrong password fails fast.
//! - **Original size**: 16 ASCII decimal digits, used to cut the space padding off
//!   the last block on decrypt.
//! - **IV**: 16 random bytes, fresh for every encryption.
//!
//! ## Example: Encrypt and decrypt a file
//! ```no_run
//! use aesfile::FileEncryptionEngine;
//! use secrecy::SecretString;
//! use std::path::Path;
//!
//! let engine = FileEncryptionEngine::new(SecretString::new("mypassword".into()));
//! let enc = engine.encrypt(Path::new("notes.txt"), false).unwrap();
//! assert!(engine.is_encrypted(&enc).unwrap());
//!
//! std::fs::remove_file("notes.txt").unwrap();
//! let plain = engine.decrypt(&enc, true).unwrap();
//! assert_eq!(plain, Path::new("notes.txt"));
//! ```
//!
//! ## Example: Custom profile
//! ```no_run
//! use aesfile::{EncryptionProfile, FileEncryptionEngine};
//! use secrecy::SecretString;
//!
//! let profile = EncryptionProfile::new(SecretString::new("pw".into()))
//!     .with_signature("MYTOOL")
//!     .with_chunk_size(64 * 1024)
//!     .with_force(true);
//! let engine = FileEncryptionEngine::with_profile(profile).unwrap();
//! # let _ = engine;
//! ```
//!
//! Safety notes
//! - The crate is not audited or reviewed!
//! - CFB mode is **not authenticated**: modified ciphertext decrypts to garbage without
//!   an error. Do not treat a successful decrypt as proof the file is untouched.
//! - The key is an unsalted, single SHA-256 of the password. Identical passwords give
//!   identical keys across files; weak passwords are cheap to brute force.
//! - A failed stream leaves partial output on disk.

mod types;
mod kdf;
mod crypto;
mod format;
mod streaming;
mod file;
mod engine;

// Re-export public API from modules
pub use types::*;
pub use kdf::{FINGERPRINT_LEN, KEY_LEN, Key, derive_key, fingerprint};
pub use crypto::{BLOCK_LEN, IV_LEN, PAD_BYTE, generate_iv};
pub use format::{
    ContainerHeader, MAX_ORIGINAL_SIZE, SIZE_FIELD_LEN, check_original_size, header_len,
    is_container, read_header, write_header,
};
pub use streaming::{
    bounded_chunk_size, ciphertext_len, decrypt_stream, effective_chunk_size, encrypt_stream,
};
pub use file::{decrypted_output_path, encrypted_output_path};
pub use engine::FileEncryptionEngine;
