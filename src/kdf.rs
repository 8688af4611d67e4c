//! Password to key derivation.
//!
//! The key is a single SHA-256 of the UTF-8 password and the header fingerprint is a
//! SHA-256 of that key. There is no salt and no iteration count: identical passwords
//! produce identical keys everywhere. Containers depend on this exact derivation, so
//! changing it breaks every file written so far.

use sha2::{Digest, Sha256};
use zeroize::Zeroizing;

/// Length of the derived key (AES-256).
pub const KEY_LEN: usize = 32;

/// Length of the key fingerprint stored in the header.
pub const FINGERPRINT_LEN: usize = 32;

/// Derived symmetric key, wiped on drop.
pub type Key = Zeroizing<[u8; KEY_LEN]>;

/// Derive the 32-byte cipher key from a password.
pub fn derive_key(password: &str) -> Key {
    let mut key = Zeroizing::new([0u8; KEY_LEN]);
    key.copy_from_slice(&Sha256::digest(password.as_bytes()));
    key
}

/// Hash of the derived key, written to the header for password verification.
pub fn fingerprint(key: &[u8; KEY_LEN]) -> [u8; FINGERPRINT_LEN] {
    Sha256::digest(key).into()
}
