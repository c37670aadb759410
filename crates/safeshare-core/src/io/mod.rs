//! # File I/O
//!
//! Reading tabular input, writing anonymized output, and the file-level
//! helpers around it (size/extension checks, atomic writes, secure
//! deletion). The detection and anonymization core never touches the
//! filesystem; everything that does lives here or in
//! [`crate::crypto::store`].

pub mod csv;
pub mod json;

use std::fs;
use std::io::Write;
use std::path::Path;

use crate::error::{Result, SafeShareError};
use crate::table::Table;

pub use self::csv::{parse_csv, write_csv};
pub use self::json::write_json;

/// Default upper bound on input size, in megabytes.
pub const DEFAULT_MAX_FILE_SIZE_MB: u64 = 10;

/// Input extensions accepted by [`validate_file`] (lowercase).
pub const SUPPORTED_EXTENSIONS: &[&str] = &["csv"];

const SECURE_DELETE_CHUNK: usize = 64 * 1024;

/// Check that `path` is an existing, supported file no larger than
/// `max_size_mb`.
pub fn validate_file(path: &Path, max_size_mb: u64) -> Result<()> {
    let meta = fs::metadata(path).map_err(|_| SafeShareError::Validation {
        message: format!("file not found: {}", path.display()),
    })?;
    if !meta.is_file() {
        return Err(SafeShareError::Validation {
            message: format!("not a file: {}", path.display()),
        });
    }

    let ext = path
        .extension()
        .and_then(|e| e.to_str())
        .map(|e| e.to_ascii_lowercase())
        .unwrap_or_default();
    if !SUPPORTED_EXTENSIONS.contains(&ext.as_str()) {
        return Err(SafeShareError::Validation {
            message: format!(
                "unsupported file type '.{}' (supported: {})",
                ext,
                SUPPORTED_EXTENSIONS.join(", ")
            ),
        });
    }

    let limit = max_size_mb.saturating_mul(1024 * 1024);
    if meta.len() > limit {
        return Err(SafeShareError::Validation {
            message: format!(
                "file is {:.1} MB, limit is {} MB",
                meta.len() as f64 / (1024.0 * 1024.0),
                max_size_mb
            ),
        });
    }

    Ok(())
}

/// Read a CSV file into a [`Table`].
pub fn read_csv(path: &Path) -> Result<Table> {
    let file = fs::File::open(path).map_err(|e| SafeShareError::Io {
        message: format!("Failed to open {}", path.display()),
        source: e,
    })?;
    let table = parse_csv(std::io::BufReader::new(file))?;
    tracing::info!(
        "Loaded {} rows x {} columns from {}",
        table.row_count(),
        table.column_count(),
        path.display()
    );
    Ok(table)
}

/// Write `bytes` to `path` atomically.
///
/// The data goes to a hidden temp file next to `path`, is synced, then
/// renamed into place, so readers never observe a partial file. Missing
/// parent directories are created.
pub fn write_atomic(path: &Path, bytes: &[u8]) -> Result<()> {
    let dir = match path.parent() {
        Some(p) if !p.as_os_str().is_empty() => p,
        _ => Path::new("."),
    };
    fs::create_dir_all(dir).map_err(|e| SafeShareError::Io {
        message: format!("Failed to create directory {}", dir.display()),
        source: e,
    })?;

    let file_name = path
        .file_name()
        .and_then(|n| n.to_str())
        .unwrap_or("safeshare");
    let tmp_path = dir.join(format!(".{}.tmp", file_name));

    let mut file = fs::File::create(&tmp_path).map_err(|e| SafeShareError::Io {
        message: format!("Failed to create temp file at {}", tmp_path.display()),
        source: e,
    })?;
    file.write_all(bytes).map_err(|e| SafeShareError::Io {
        message: format!("Failed to write temp file at {}", tmp_path.display()),
        source: e,
    })?;
    file.sync_all().map_err(|e| SafeShareError::Io {
        message: "Failed to sync file to disk".to_string(),
        source: e,
    })?;
    drop(file);

    fs::rename(&tmp_path, path).map_err(|e| SafeShareError::Io {
        message: format!(
            "Failed to rename {} → {}",
            tmp_path.display(),
            path.display()
        ),
        source: e,
    })
}

/// Overwrite a file with zeros, sync, then remove it.
///
/// Best effort only: journaling filesystems and SSD wear levelling may keep
/// old blocks around.
pub fn secure_delete(path: &Path) -> Result<()> {
    let io_err = |message: String| {
        move |e: std::io::Error| SafeShareError::Io { message, source: e }
    };

    let len = fs::metadata(path)
        .map_err(io_err(format!("Failed to stat {}", path.display())))?
        .len();
    let mut file = fs::OpenOptions::new()
        .write(true)
        .open(path)
        .map_err(io_err(format!("Failed to open {} for wiping", path.display())))?;

    let zeros = vec![0u8; SECURE_DELETE_CHUNK];
    let mut remaining = len;
    while remaining > 0 {
        let n = remaining.min(SECURE_DELETE_CHUNK as u64) as usize;
        file.write_all(&zeros[..n])
            .map_err(io_err(format!("Failed to wipe {}", path.display())))?;
        remaining -= n as u64;
    }
    file.sync_all()
        .map_err(io_err(format!("Failed to sync {}", path.display())))?;
    drop(file);

    fs::remove_file(path).map_err(io_err(format!("Failed to remove {}", path.display())))?;
    tracing::debug!("Securely deleted {} ({} bytes)", path.display(), len);
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_validate_file() {
        let dir = tempdir().unwrap();
        let csv = dir.path().join("data.CSV");
        fs::write(&csv, "a,b\n1,2\n").unwrap();
        assert!(validate_file(&csv, DEFAULT_MAX_FILE_SIZE_MB).is_ok());

        let txt = dir.path().join("data.txt");
        fs::write(&txt, "a").unwrap();
        let err = validate_file(&txt, DEFAULT_MAX_FILE_SIZE_MB).unwrap_err();
        assert!(err.to_string().contains("unsupported file type"));

        let missing = dir.path().join("missing.csv");
        assert!(matches!(
            validate_file(&missing, 10),
            Err(SafeShareError::Validation { .. })
        ));
    }

    #[test]
    fn test_validate_file_size_limit() {
        let dir = tempdir().unwrap();
        let big = dir.path().join("big.csv");
        fs::write(&big, vec![b'x'; 1024 * 1024 + 1]).unwrap();
        assert!(validate_file(&big, 1).is_err());
        assert!(validate_file(&big, 2).is_ok());
    }

    #[test]
    fn test_read_csv_file() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("in.csv");
        fs::write(&path, "email\na@b.co\n").unwrap();
        let table = read_csv(&path).unwrap();
        assert_eq!(table.info().column_names, vec!["email"]);
    }

    #[test]
    fn test_write_atomic_replaces_and_cleans_up() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("nested").join("out.csv");
        write_atomic(&path, b"first").unwrap();
        write_atomic(&path, b"second").unwrap();

        assert_eq!(fs::read(&path).unwrap(), b"second");
        let tmp = path.parent().unwrap().join(".out.csv.tmp");
        assert!(!tmp.exists(), "temp file should be renamed away");
    }

    #[test]
    fn test_secure_delete() {
        let dir = tempdir().unwrap();
        let path = dir.path().join("secret.csv");
        fs::write(&path, "123456782\n").unwrap();
        secure_delete(&path).unwrap();
        assert!(!path.exists());

        assert!(secure_delete(&path).is_err());
    }
}
