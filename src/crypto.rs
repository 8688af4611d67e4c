//! AES-256-CFB primitives: cipher construction, IV generation and space padding.
//!
//! CFB here is full-block (CFB-128) with the cipher state carried across calls, so
//! a stream encrypted in pieces is byte-identical to the same stream encrypted at
//! once. It provides confidentiality only; nothing detects modified ciphertext.

use aes::Aes256;
use cfb_mode::cipher::KeyIvInit;
use cfb_mode::{BufDecryptor, BufEncryptor};
use getrandom::fill as getrandom;

use crate::kdf::KEY_LEN;
use crate::types::EngineError;

/// AES block length.
pub const BLOCK_LEN: usize = 16;

/// IV length (one AES block).
pub const IV_LEN: usize = 16;

/// Byte appended to short final chunks.
pub const PAD_BYTE: u8 = b' ';

pub type Aes256CfbEnc = BufEncryptor<Aes256>;
pub type Aes256CfbDec = BufDecryptor<Aes256>;

/// Generate a fresh random IV.
pub fn generate_iv() -> Result<[u8; IV_LEN], EngineError> {
    let mut iv = [0u8; IV_LEN];
    getrandom(&mut iv).map_err(|_| EngineError::Crypto)?;
    Ok(iv)
}

/// Create a streaming AES-256-CFB encryptor.
pub fn cfb_encryptor(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Aes256CfbEnc, EngineError> {
    Aes256CfbEnc::new_from_slices(key, iv).map_err(|_| EngineError::Crypto)
}

/// Create a streaming AES-256-CFB decryptor.
pub fn cfb_decryptor(key: &[u8; KEY_LEN], iv: &[u8; IV_LEN]) -> Result<Aes256CfbDec, EngineError> {
    Aes256CfbDec::new_from_slices(key, iv).map_err(|_| EngineError::Crypto)
}

/// Round `len` up to the next multiple of [`BLOCK_LEN`].
pub fn padded_len(len: usize) -> usize {
    len.div_ceil(BLOCK_LEN) * BLOCK_LEN
}

/// Fill `buf[len..padded_len(len)]` with spaces and return the padded length.
///
/// `buf` must be at least `padded_len(len)` long.
pub fn pad_with_spaces(buf: &mut [u8], len: usize) -> usize {
    let padded = padded_len(len);
    buf[len..padded].fill(PAD_BYTE);
    padded
}
