//! Chunked AES-256-CFB transform between two streams.
//!
//! Memory use is one chunk buffer regardless of input size. Chunks are always
//! filled completely before they are transformed, so only the last chunk of a
//! stream can be short and only it ever receives space padding.

use std::io::{Read, Write};

use tracing::debug;
use zeroize::Zeroizing;

use crate::crypto::{BLOCK_LEN, IV_LEN, cfb_decryptor, cfb_encryptor, pad_with_spaces};
use crate::format::read_up_to;
use crate::kdf::KEY_LEN;
use crate::types::{EngineError, MAX_CHUNK_SIZE};

/// Working buffer length for a requested chunk size: rounded up to a multiple of
/// the block length so full chunks never need padding.
pub fn effective_chunk_size(chunk_size: usize) -> Result<usize, EngineError> {
    if chunk_size == 0 {
        return Err(EngineError::Invalid("chunk_size must be > 0"));
    }
    if chunk_size > MAX_CHUNK_SIZE {
        return Err(EngineError::Invalid("chunk_size must be at most 64 MiB"));
    }
    Ok(chunk_size.next_multiple_of(BLOCK_LEN))
}

/// Chunk size for a stream of known length: never larger than the padded stream.
pub fn bounded_chunk_size(chunk_size: usize, stream_len: u64) -> usize {
    let needed = ciphertext_len(stream_len.min(MAX_CHUNK_SIZE as u64)).max(BLOCK_LEN as u64);
    usize::try_from(needed).map_or(chunk_size, |n| chunk_size.min(n))
}

/// Encrypt `input` into `output`, space-padding the final chunk to a block boundary.
///
/// Returns the number of ciphertext bytes written.
pub fn encrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    chunk_size: usize,
) -> Result<u64, EngineError> {
    let chunk_len = effective_chunk_size(chunk_size)?;
    let mut cipher = cfb_encryptor(key, iv)?;
    let mut buf = Zeroizing::new(vec![0u8; chunk_len]);
    let mut written = 0u64;

    loop {
        let n = read_up_to(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        let len = pad_with_spaces(&mut buf, n);
        cipher.encrypt(&mut buf[..len]);
        output.write_all(&buf[..len])?;
        written += len as u64;
        if n < chunk_len {
            break;
        }
    }

    output.flush()?;
    debug!(bytes = written, chunk_len, "encrypted stream");
    Ok(written)
}

/// Decrypt `input` into `output`, writing exactly `original_size` plaintext bytes.
///
/// Anything the ciphertext decrypts to past `original_size` is padding and is
/// dropped. Fails with [`EngineError::TruncatedBody`] when the ciphertext runs out
/// first.
pub fn decrypt_stream<R: Read, W: Write>(
    mut input: R,
    mut output: W,
    key: &[u8; KEY_LEN],
    iv: &[u8; IV_LEN],
    chunk_size: usize,
    original_size: u64,
) -> Result<u64, EngineError> {
    let chunk_len = effective_chunk_size(chunk_size)?;
    let mut cipher = cfb_decryptor(key, iv)?;
    let mut buf = Zeroizing::new(vec![0u8; chunk_len]);
    let mut remaining = original_size;
    let mut consumed = 0u64;

    loop {
        let n = read_up_to(&mut input, &mut buf)?;
        if n == 0 {
            break;
        }
        consumed += n as u64;
        cipher.decrypt(&mut buf[..n]);
        let keep = remaining.min(n as u64) as usize;
        output.write_all(&buf[..keep])?;
        remaining -= keep as u64;
        if n < chunk_len {
            break;
        }
    }

    output.flush()?;
    let recovered = original_size - remaining;
    debug!(
        ciphertext = consumed,
        plaintext = recovered,
        padding = consumed.saturating_sub(recovered),
        "decrypted stream"
    );
    if remaining > 0 {
        return Err(EngineError::TruncatedBody {
            expected: original_size,
            actual: recovered,
        });
    }
    Ok(recovered)
}

/// Ciphertext length produced for `plaintext_len` bytes of input.
pub fn ciphertext_len(plaintext_len: u64) -> u64 {
    plaintext_len.div_ceil(BLOCK_LEN as u64) * BLOCK_LEN as u64
}
