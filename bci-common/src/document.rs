//! JSON document I/O
//!
//! Inventory files are written with one-space indentation, the layout
//! downstream tooling already diffs against.

use crate::Result;
use serde::de::DeserializeOwned;
use serde::Serialize;
use std::fs;
use std::io::Write;
use std::path::{Path, PathBuf};

/// Read and deserialize a whole JSON document
pub fn read_json<T: DeserializeOwned>(path: &Path) -> Result<T> {
    let bytes = fs::read(path)?;
    Ok(serde_json::from_slice(&bytes)?)
}

/// Serialize with one-space indentation
pub fn to_json_bytes<T: Serialize>(value: &T) -> Result<Vec<u8>> {
    let mut buf = Vec::new();
    let formatter = serde_json::ser::PrettyFormatter::with_indent(b" ");
    let mut serializer = serde_json::Serializer::with_formatter(&mut buf, formatter);
    value.serialize(&mut serializer)?;
    Ok(buf)
}

/// Write a JSON document atomically (temporary sibling file + rename)
pub fn write_json<T: Serialize>(path: &Path, value: &T) -> Result<()> {
    let bytes = to_json_bytes(value)?;
    let tmp = temp_path(path);

    let write = || -> std::io::Result<()> {
        let mut file = fs::File::create(&tmp)?;
        file.write_all(&bytes)?;
        file.sync_all()?;
        fs::rename(&tmp, path)
    };

    if let Err(e) = write() {
        let _ = fs::remove_file(&tmp);
        return Err(e.into());
    }
    Ok(())
}

fn temp_path(path: &Path) -> PathBuf {
    let mut name = path
        .file_name()
        .map(|n| n.to_os_string())
        .unwrap_or_default();
    name.push(".tmp");
    path.with_file_name(name)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::model::Inventory;
    use serde_json::json;
    use tempfile::TempDir;

    #[test]
    fn test_one_space_indent() {
        let bytes = to_json_bytes(&json!({"meta": {"last_mod": ""}})).unwrap();
        let text = String::from_utf8(bytes).unwrap();
        assert_eq!(text, "{\n \"meta\": {\n  \"last_mod\": \"\"\n }\n}");
    }

    #[test]
    fn test_write_then_read() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("inventory.json");

        write_json(&path, &Inventory::default()).unwrap();
        let back: Inventory = read_json(&path).unwrap();
        assert_eq!(back, Inventory::default());
        assert!(!dir.path().join("inventory.json.tmp").exists());
    }

    #[test]
    fn test_write_replaces_existing_file() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("out.json");
        fs::write(&path, "stale").unwrap();

        write_json(&path, &json!([1, 2])).unwrap();
        let back: Vec<u32> = read_json(&path).unwrap();
        assert_eq!(back, vec![1, 2]);
    }

    #[test]
    fn test_read_missing_file_is_io_error() {
        let dir = TempDir::new().unwrap();
        let err = read_json::<Inventory>(&dir.path().join("nope.json")).unwrap_err();
        assert!(matches!(err, crate::Error::Io(_)));
    }

    #[test]
    fn test_read_malformed_file_is_json_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("bad.json");
        fs::write(&path, "{ not json").unwrap();
        let err = read_json::<Inventory>(&path).unwrap_err();
        assert!(matches!(err, crate::Error::Json(_)));
    }
}
