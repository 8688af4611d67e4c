//! Output naming and output file creation.

use std::ffi::OsStr;
use std::fs::{self, File, OpenOptions};
use std::io;
use std::path::{Path, PathBuf};

use crate::types::{ENC_EXTENSION, EngineError};

/// Output path for encryption: the input file name with ".enc" appended.
///
/// `report.pdf` becomes `report.pdf.enc`; existing extensions are kept.
pub fn encrypted_output_path(input: &Path) -> PathBuf {
    let mut name = input
        .file_name()
        .unwrap_or_else(|| OsStr::new("out"))
        .to_os_string();
    name.push(".");
    name.push(ENC_EXTENSION);
    input.with_file_name(name)
}

/// Output path for decryption.
///
/// Strips a trailing ".enc" from the file name. The original name is not stored in
/// the container, so this is purely a naming convention: when the input does not
/// end in ".enc" (or nothing would be left), ".dec" is appended instead.
pub fn decrypted_output_path(input: &Path) -> PathBuf {
    let parent = input.parent().unwrap_or_else(|| Path::new(""));
    let file_name = input.file_name().unwrap_or_else(|| OsStr::new("out"));
    let suffix = format!(".{ENC_EXTENSION}");

    // Best-effort UTF-8 handling; fall back to appending ".dec" if not UTF-8.
    if let Some(name) = file_name.to_str() {
        if let Some(stripped) = name.strip_suffix(&suffix)
            && !stripped.is_empty()
        {
            return parent.join(stripped);
        }
        return parent.join(format!("{name}.dec"));
    }

    let mut os = file_name.to_os_string();
    os.push(".dec");
    parent.join(os)
}

/// Open the output file, honoring the force overwrite policy.
///
/// Without `force` the file is created with create-new semantics, so an existing
/// file (or one that appears concurrently) is never truncated.
pub fn create_output(path: &Path, force: bool) -> Result<File, EngineError> {
    let mut opts = OpenOptions::new();
    opts.write(true);
    if force {
        opts.create(true).truncate(true);
    } else {
        opts.create_new(true);
    }
    opts.open(path).map_err(|e| match e.kind() {
        io::ErrorKind::AlreadyExists => EngineError::OutputExists(path.to_path_buf()),
        _ => EngineError::Io(e),
    })
}

/// Flush file contents to disk before the source may be removed.
pub fn finish_output(file: File) -> Result<(), EngineError> {
    file.sync_all()?;
    Ok(())
}

/// Remove the source file after a successful operation.
pub fn remove_source(path: &Path) -> Result<(), EngineError> {
    fs::remove_file(path)?;
    Ok(())
}

/// Existence check mapped onto the engine error.
pub fn require_exists(path: &Path) -> Result<(), EngineError> {
    match fs::metadata(path) {
        Ok(_) => Ok(()),
        Err(e) if e.kind() == io::ErrorKind::NotFound => {
            Err(EngineError::FileNotFound(path.to_path_buf()))
        }
        Err(e) => Err(EngineError::Io(e)),
    }
}
