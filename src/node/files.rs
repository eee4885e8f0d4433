//! Local side of file sharing: where downloads land and how uploads are read.

use std::path::{Path, PathBuf};

use log::info;

use super::client::NodeError;

/// Reduces a remote-supplied file name to a single path component so a
/// download can never escape the download directory.
pub fn safe_file_name(name: &str) -> Option<String> {
    Path::new(name)
        .file_name()
        .and_then(|n| n.to_str())
        .filter(|n| !n.is_empty() && *n != "." && *n != "..")
        .map(str::to_string)
}

/// Writes downloaded bytes to `dir/<name>`, creating `dir` if needed.
pub async fn save_download(dir: &Path, name: &str, contents: &[u8]) -> Result<PathBuf, NodeError> {
    let file_name = safe_file_name(name)
        .ok_or_else(|| NodeError::Io(format!("refusing to save file named {name:?}")))?;
    tokio::fs::create_dir_all(dir).await?;
    let path = dir.join(file_name);
    tokio::fs::write(&path, contents).await?;
    info!("Saved {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

/// Reads a local file for upload, returning its bare name and contents.
pub async fn read_upload(path: &Path) -> Result<(String, Vec<u8>), NodeError> {
    let name = path
        .file_name()
        .and_then(|n| n.to_str())
        .map(str::to_string)
        .ok_or_else(|| NodeError::Io(format!("{} is not a file path", path.display())))?;
    let contents = tokio::fs::read(path).await?;
    Ok((name, contents))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_safe_file_name_strips_directories() {
        assert_eq!(safe_file_name("report.pdf").as_deref(), Some("report.pdf"));
        assert_eq!(safe_file_name("../../etc/passwd").as_deref(), Some("passwd"));
        assert_eq!(safe_file_name("a/b/c.txt").as_deref(), Some("c.txt"));
    }

    #[test]
    fn test_safe_file_name_rejects_empty_and_dots() {
        assert_eq!(safe_file_name(""), None);
        assert_eq!(safe_file_name(".."), None);
        assert_eq!(safe_file_name("/"), None);
    }

    #[tokio::test]
    async fn test_save_then_read_back() {
        let dir = std::env::temp_dir().join(format!("peerdeck-files-{}", std::process::id()));
        let path = save_download(&dir, "notes.txt", b"hello").await.unwrap();
        assert_eq!(path, dir.join("notes.txt"));

        let (name, contents) = read_upload(&path).await.unwrap();
        assert_eq!(name, "notes.txt");
        assert_eq!(contents, b"hello");

        let _ = std::fs::remove_dir_all(&dir);
    }

    #[tokio::test]
    async fn test_read_missing_upload_is_io_error() {
        let missing = std::env::temp_dir().join("peerdeck-definitely-missing.bin");
        let err = read_upload(&missing).await.unwrap_err();
        assert!(matches!(err, NodeError::Io(_)));
    }
}
