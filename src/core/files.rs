//! Local file checks for upload commands.
//!
//! These run before any remote call so a typo never costs a token fetch.

use std::path::{Path, PathBuf};
use std::sync::LazyLock;

use base64::Engine;
use base64::engine::general_purpose::STANDARD;
use regex::Regex;

use crate::error::{PfmpError, Result};

static ASSET_NAME: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)\.(zip|tar\.gz|tar)$").unwrap());

/// Whether `name` carries an archive extension accepted for assets.
#[must_use]
pub fn is_valid_asset_name(name: &str) -> bool {
    ASSET_NAME.is_match(name)
}

/// Resolve `path` against the current directory and require it to exist.
///
/// # Errors
/// `FileNotFound` if nothing is at the resolved path.
pub fn resolve_existing_file(path: &Path) -> Result<PathBuf> {
    let resolved = if path.is_absolute() {
        path.to_path_buf()
    } else {
        std::env::current_dir()?.join(path)
    };
    if resolved.is_file() {
        Ok(resolved)
    } else {
        Err(PfmpError::FileNotFound {
            path: resolved.display().to_string(),
        })
    }
}

/// Asset name to upload `file` as: the explicit name, else the file name.
///
/// # Errors
/// `InvalidAssetName` if the name lacks a `.zip`, `.tar.gz` or `.tar` extension.
pub fn asset_name_for(file: &Path, explicit: Option<&str>) -> Result<String> {
    let name = match explicit.map(str::trim).filter(|n| !n.is_empty()) {
        Some(name) => name.to_string(),
        None => file
            .file_name()
            .map(|n| n.to_string_lossy().into_owned())
            .unwrap_or_default(),
    };
    if is_valid_asset_name(&name) {
        Ok(name)
    } else {
        Err(PfmpError::InvalidAssetName { name })
    }
}

/// Read a certificate file as base64 for upload.
///
/// # Errors
/// `Io` if the file cannot be read.
pub fn read_base64(path: &Path) -> Result<String> {
    let bytes = std::fs::read(path)?;
    Ok(STANDARD.encode(bytes))
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn asset_extensions() {
        for ok in ["server.zip", "SERVER.ZIP", "a.tar.gz", "a.TAR", "dir/a.b.zip"] {
            assert!(is_valid_asset_name(ok), "{ok}");
        }
        for bad in ["server.exe", "zip", "a.gz", "a.zip.bak", "a.tgz"] {
            assert!(!is_valid_asset_name(bad), "{bad}");
        }
    }

    #[test]
    fn asset_name_defaults_to_file_name() {
        assert_eq!(
            asset_name_for(Path::new("/tmp/build/server.zip"), None).unwrap(),
            "server.zip"
        );
        assert_eq!(
            asset_name_for(Path::new("/tmp/build/server.bin"), Some("renamed.tar.gz")).unwrap(),
            "renamed.tar.gz"
        );
        assert!(matches!(
            asset_name_for(Path::new("/tmp/build/server.bin"), None),
            Err(PfmpError::InvalidAssetName { .. })
        ));
    }

    #[test]
    fn missing_file_is_reported_with_resolved_path() {
        let dir = TempDir::new().unwrap();
        let missing = dir.path().join("nope.zip");
        match resolve_existing_file(&missing) {
            Err(PfmpError::FileNotFound { path }) => assert!(path.ends_with("nope.zip")),
            other => panic!("unexpected {other:?}"),
        }

        let present = dir.path().join("yes.zip");
        std::fs::write(&present, b"PK").unwrap();
        assert_eq!(resolve_existing_file(&present).unwrap(), present);
    }

    #[test]
    fn directories_are_not_files() {
        let dir = TempDir::new().unwrap();
        assert!(resolve_existing_file(dir.path()).is_err());
    }

    #[test]
    fn certificate_bytes_are_base64() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("cert.pfx");
        std::fs::write(&path, b"secret").unwrap();
        assert_eq!(read_base64(&path).unwrap(), "c2VjcmV0");
    }
}
