//! On-disk container header.
//!
//! Layout, no padding between fields:
//!
//! | field           | size             | encoding                          |
//! |-----------------|------------------|-----------------------------------|
//! | signature       | `signature.len()`| raw bytes of the signature text   |
//! | key fingerprint | 32               | SHA-256 of the derived key        |
//! | original size   | 16               | ASCII decimal, zero-left-padded   |
//! | iv              | 16               | raw random bytes                  |
//!
//! The ciphertext follows immediately.

use std::io::{self, Read, Seek, SeekFrom, Write};

use crate::crypto::IV_LEN;
use crate::kdf::FINGERPRINT_LEN;
use crate::types::EngineError;

/// Width of the ASCII decimal size field.
pub const SIZE_FIELD_LEN: usize = 16;

/// Largest plaintext length the size field can record.
pub const MAX_ORIGINAL_SIZE: u64 = 9_999_999_999_999_999;

/// Total header length for a signature of `signature_len` bytes.
pub const fn header_len(signature_len: usize) -> usize {
    signature_len + FINGERPRINT_LEN + SIZE_FIELD_LEN + IV_LEN
}

/// Parsed container header.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ContainerHeader {
    pub signature: Vec<u8>,
    pub key_fingerprint: [u8; FINGERPRINT_LEN],
    pub original_size: u64,
    pub iv: [u8; IV_LEN],
}

/// Check whether the stream starts with `signature`.
///
/// The stream position is restored afterwards. A stream shorter than the signature
/// is simply not a container.
pub fn is_container<R: Read + Seek>(reader: &mut R, signature: &[u8]) -> Result<bool, EngineError> {
    let start = reader.stream_position()?;
    let mut probe = vec![0u8; signature.len()];
    let filled = read_up_to(reader, &mut probe)?;
    reader.seek(SeekFrom::Start(start))?;
    Ok(filled == signature.len() && probe == signature)
}

/// Reject plaintext lengths the 16-digit size field cannot record.
pub fn check_original_size(original_size: u64) -> Result<(), EngineError> {
    if original_size > MAX_ORIGINAL_SIZE {
        return Err(EngineError::Invalid(
            "original size does not fit the 16-digit size field",
        ));
    }
    Ok(())
}

/// Write the four header fields in order.
pub fn write_header<W: Write>(
    writer: &mut W,
    signature: &[u8],
    key_fingerprint: &[u8; FINGERPRINT_LEN],
    original_size: u64,
    iv: &[u8; IV_LEN],
) -> Result<(), EngineError> {
    check_original_size(original_size)?;
    let mut buf = Vec::with_capacity(header_len(signature.len()));
    buf.extend_from_slice(signature);
    buf.extend_from_slice(key_fingerprint);
    buf.extend_from_slice(format!("{original_size:0width$}", width = SIZE_FIELD_LEN).as_bytes());
    buf.extend_from_slice(iv);
    writer.write_all(&buf)?;
    Ok(())
}

/// Read the header from the start of a container.
///
/// Any field that runs short, or a size field that is not pure ASCII decimal,
/// yields [`EngineError::MalformedHeader`].
pub fn read_header<R: Read>(reader: &mut R, signature_len: usize) -> Result<ContainerHeader, EngineError> {
    let mut signature = vec![0u8; signature_len];
    read_field(reader, &mut signature, "truncated signature")?;

    let mut key_fingerprint = [0u8; FINGERPRINT_LEN];
    read_field(reader, &mut key_fingerprint, "truncated key fingerprint")?;

    let mut size_field = [0u8; SIZE_FIELD_LEN];
    read_field(reader, &mut size_field, "truncated size field")?;
    let original_size = parse_size_field(&size_field)?;

    let mut iv = [0u8; IV_LEN];
    read_field(reader, &mut iv, "truncated iv")?;

    Ok(ContainerHeader {
        signature,
        key_fingerprint,
        original_size,
        iv,
    })
}

fn parse_size_field(field: &[u8; SIZE_FIELD_LEN]) -> Result<u64, EngineError> {
    if !field.iter().all(u8::is_ascii_digit) {
        return Err(EngineError::MalformedHeader("size field is not ASCII decimal"));
    }
    // 16 digits always fit in a u64
    std::str::from_utf8(field)
        .ok()
        .and_then(|s| s.parse::<u64>().ok())
        .ok_or(EngineError::MalformedHeader("size field is not ASCII decimal"))
}

fn read_field<R: Read>(reader: &mut R, buf: &mut [u8], what: &'static str) -> Result<(), EngineError> {
    reader.read_exact(buf).map_err(|e| match e.kind() {
        io::ErrorKind::UnexpectedEof => EngineError::MalformedHeader(what),
        _ => EngineError::Io(e),
    })
}

/// Read until `buf` is full or EOF; returns the number of bytes read.
pub(crate) fn read_up_to<R: Read>(reader: &mut R, buf: &mut [u8]) -> io::Result<usize> {
    let mut filled = 0;
    while filled < buf.len() {
        match reader.read(&mut buf[filled..]) {
            Ok(0) => break,
            Ok(n) => filled += n,
            Err(e) if e.kind() == io::ErrorKind::Interrupted => continue,
            Err(e) => return Err(e),
        }
    }
    Ok(filled)
}
