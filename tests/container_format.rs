//! Byte-level checks of containers written to disk.

use std::fs::{self, File};
use std::io::Read;

use aesfile::{
    ContainerHeader, DEFAULT_SIGNATURE, EncryptionProfile, FileEncryptionEngine, ciphertext_len,
    derive_key, fingerprint, header_len, is_container, read_header,
};
use secrecy::SecretString;
use tempfile::tempdir;

fn init_logging() {
    let _ = tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .with_test_writer()
        .try_init();
}

fn header_of(path: &std::path::Path, sig_len: usize) -> ContainerHeader {
    let mut f = File::open(path).unwrap();
    read_header(&mut f, sig_len).unwrap()
}

#[test]
fn repeating_byte_file_with_small_chunks() {
    init_logging();
    let dir = tempdir().unwrap();
    let in_path = dir.path().join("ab.bin");
    let data = vec![0xABu8; 100_000];
    fs::write(&in_path, &data).unwrap();

    let profile = EncryptionProfile::new(SecretString::new("correct".into())).with_chunk_size(1024);
    let engine = FileEncryptionEngine::with_profile(profile).unwrap();
    let enc = engine.encrypt(&in_path, true).unwrap();

    let sig_len = DEFAULT_SIGNATURE.len();
    let expected = (sig_len + 32 + 16 + 16) as u64 + 100_000u64.div_ceil(16) * 16;
    assert_eq!(fs::metadata(&enc).unwrap().len(), expected);

    let wrong = FileEncryptionEngine::with_profile(
        EncryptionProfile::new(SecretString::new("wrong".into())).with_chunk_size(1024),
    )
    .unwrap();
    assert!(matches!(
        wrong.decrypt(&enc, false),
        Err(aesfile::EngineError::WrongPassword)
    ));

    let back = engine.decrypt(&enc, false).unwrap();
    assert_eq!(fs::read(back).unwrap(), data);
}

#[test]
fn header_fields_on_disk() {
    let dir = tempdir().unwrap();
    let in_path = dir.path().join("note.txt");
    fs::write(&in_path, b"seventeen bytes!!").unwrap();

    let sig = "MY-MARKER";
    let profile = EncryptionProfile::new(SecretString::new("pw".into())).with_signature(sig);
    let engine = FileEncryptionEngine::with_profile(profile).unwrap();
    let enc = engine.encrypt(&in_path, false).unwrap();

    let raw = fs::read(&enc).unwrap();
    assert_eq!(raw.len() as u64, header_len(sig.len()) as u64 + ciphertext_len(17));
    assert_eq!(&raw[..sig.len()], sig.as_bytes());
    let size_at = sig.len() + 32;
    assert_eq!(&raw[size_at..size_at + 16], b"0000000000000017");

    let hdr = header_of(&enc, sig.len());
    assert_eq!(hdr.signature, sig.as_bytes());
    assert_eq!(hdr.original_size, 17);
    assert_eq!(hdr.key_fingerprint, fingerprint(&derive_key("pw")));
    assert_eq!(&raw[size_at + 16..size_at + 32], &hdr.iv);
}

#[test]
fn every_encryption_gets_a_fresh_iv() {
    let dir = tempdir().unwrap();
    let engine = FileEncryptionEngine::new(SecretString::new("pw".into()));
    let sig_len = DEFAULT_SIGNATURE.len();

    let mut ivs = Vec::new();
    let mut bodies = Vec::new();
    for name in ["a", "b", "c"] {
        let p = dir.path().join(name);
        fs::write(&p, b"identical contents").unwrap();
        let enc = engine.encrypt(&p, true).unwrap();
        ivs.push(header_of(&enc, sig_len).iv);
        bodies.push(fs::read(&enc).unwrap()[header_len(sig_len)..].to_vec());
    }
    assert_ne!(ivs[0], ivs[1]);
    assert_ne!(ivs[1], ivs[2]);
    assert_ne!(bodies[0], bodies[1]);
}

#[test]
fn containers_are_recognized_plaintext_is_not() {
    let dir = tempdir().unwrap();
    let engine = FileEncryptionEngine::new(SecretString::new("pw".into()));

    for (i, len) in [0usize, 1, 16, 5000].into_iter().enumerate() {
        let p = dir.path().join(format!("f{i}"));
        fs::write(&p, vec![b'x'; len]).unwrap();
        assert!(!engine.is_encrypted(&p).unwrap());

        let enc = engine.encrypt(&p, false).unwrap();
        assert!(engine.is_encrypted(&enc).unwrap());

        let mut f = File::open(&enc).unwrap();
        assert!(is_container(&mut f, DEFAULT_SIGNATURE.as_bytes()).unwrap());
        // probing leaves the handle at the start
        let mut first = vec![0u8; DEFAULT_SIGNATURE.len()];
        f.read_exact(&mut first).unwrap();
        assert_eq!(first, DEFAULT_SIGNATURE.as_bytes());
    }
}

#[test]
fn plaintext_does_not_leak_into_container() {
    let dir = tempdir().unwrap();
    let p = dir.path().join("marker.txt");
    let needle = b"UNIQUE-PLAINTEXT-MARKER-0123456789";
    let mut data = Vec::new();
    for _ in 0..200 {
        data.extend_from_slice(needle);
    }
    fs::write(&p, &data).unwrap();

    let engine = FileEncryptionEngine::new(SecretString::new("pw".into()));
    let enc = engine.encrypt(&p, true).unwrap();
    let raw = fs::read(enc).unwrap();
    assert!(!raw.windows(needle.len()).any(|w| w == needle));
}
