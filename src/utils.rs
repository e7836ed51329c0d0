//! Common utilities shared across modules.

use std::path::Path;

use tokio::fs;

/// Write `contents` to `path` so readers never see a partial file.
///
/// Creates missing parent directories, writes a sibling temporary file and
/// renames it over the target.
pub async fn write_whole_file(path: &Path, contents: &str) -> std::io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent).await?;
    }

    let mut tmp_name = path.as_os_str().to_owned();
    tmp_name.push(".tmp");
    let tmp_path = Path::new(&tmp_name);

    fs::write(tmp_path, contents).await?;
    if let Err(e) = fs::rename(tmp_path, path).await {
        let _ = fs::remove_file(tmp_path).await;
        return Err(e);
    }
    Ok(())
}

/// Remove everything inside `dir`, creating it if it does not exist.
pub async fn empty_dir(dir: &Path) -> std::io::Result<()> {
    match fs::read_dir(dir).await {
        Ok(mut entries) => {
            while let Some(entry) = entries.next_entry().await? {
                let path = entry.path();
                if entry.file_type().await?.is_dir() {
                    fs::remove_dir_all(&path).await?;
                } else {
                    fs::remove_file(&path).await?;
                }
            }
            Ok(())
        }
        Err(e) if e.kind() == std::io::ErrorKind::NotFound => fs::create_dir_all(dir).await,
        Err(e) => Err(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[tokio::test]
    async fn test_write_whole_file_creates_parents() {
        let temp_dir = TempDir::new().unwrap();
        let path = temp_dir.path().join("a/b/out.ts");

        write_whole_file(&path, "first").await.unwrap();
        write_whole_file(&path, "second").await.unwrap();

        assert_eq!(std::fs::read_to_string(&path).unwrap(), "second");
        assert!(!temp_dir.path().join("a/b/out.ts.tmp").exists());
    }

    #[tokio::test]
    async fn test_empty_dir() {
        let temp_dir = TempDir::new().unwrap();
        let dir = temp_dir.path().join("source");
        std::fs::create_dir_all(dir.join("nested")).unwrap();
        std::fs::write(dir.join("stale.ts"), "x").unwrap();
        std::fs::write(dir.join("nested/deep.ts"), "x").unwrap();

        empty_dir(&dir).await.unwrap();
        assert!(dir.is_dir());
        assert_eq!(std::fs::read_dir(&dir).unwrap().count(), 0);

        let missing = temp_dir.path().join("missing");
        empty_dir(&missing).await.unwrap();
        assert!(missing.is_dir());
    }
}
