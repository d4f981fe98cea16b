use std::path::{Path, PathBuf};

use crate::prelude::Error;

/// Write `contents` to `dir/file_name`, creating `dir` when needed.
pub async fn save(dir: &Path, file_name: &str, contents: &[u8]) -> Result<PathBuf, Error> {
    tokio::fs::create_dir_all(dir)
        .await
        .map_err(|e| Error::Io(format!("Failed to create {}: {e}", dir.display())))?;

    let path = dir.join(file_name);
    tokio::fs::write(&path, contents)
        .await
        .map_err(|e| Error::Io(format!("Failed to write {}: {e}", path.display())))?;

    log::debug!("saved {} bytes to {}", contents.len(), path.display());
    Ok(path)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[tokio::test]
    async fn test_save_creates_directory() {
        let tmp = tempfile::tempdir().unwrap();
        let dir = tmp.path().join("nested").join("downloads");

        let path = save(&dir, "out.json", b"{}").await.unwrap();

        assert_eq!(path, dir.join("out.json"));
        assert_eq!(std::fs::read(&path).unwrap(), b"{}");
    }
}
