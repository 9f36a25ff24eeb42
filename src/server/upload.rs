//! Scoped storage for uploaded files.
//!
//! Every upload gets its own temporary directory under the uploads
//! directory and a UUID file name. The directory and anything written into
//! it (e.g. transcoded audio) is removed when the `StoredUpload` is dropped.

use std::path::{Path, PathBuf};

use tempfile::TempDir;
use tracing::debug;
use uuid::Uuid;

/// Longest extension kept from a client-supplied file name.
const MAX_EXTENSION_LEN: usize = 10;

/// Owner of the uploads directory.
#[derive(Debug, Clone)]
pub struct UploadStore {
    root: PathBuf,
}

/// A stored upload; removed from disk on drop.
#[derive(Debug)]
pub struct StoredUpload {
    dir: TempDir,
    path: PathBuf,
    original_name: Option<String>,
}

impl UploadStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Write `bytes` to a fresh scoped directory.
    pub async fn store(
        &self,
        bytes: &[u8],
        client_name: Option<&str>,
    ) -> std::io::Result<StoredUpload> {
        tokio::fs::create_dir_all(&self.root).await?;
        let dir = tempfile::Builder::new()
            .prefix("upload-")
            .tempdir_in(&self.root)?;

        let mut file_name = Uuid::new_v4().to_string();
        if let Some(ext) = client_name.and_then(sanitized_extension) {
            file_name.push('.');
            file_name.push_str(&ext);
        }
        let path = dir.path().join(file_name);
        tokio::fs::write(&path, bytes).await?;

        debug!(
            "Stored upload {:?} ({} bytes, {}) at {}",
            client_name.unwrap_or("<unnamed>"),
            bytes.len(),
            mime_guess::from_path(&path).first_or_octet_stream(),
            path.display()
        );

        Ok(StoredUpload {
            dir,
            path,
            original_name: client_name.map(str::to_string),
        })
    }
}

impl StoredUpload {
    /// Path of the stored file.
    pub fn path(&self) -> &Path {
        &self.path
    }

    /// Scoped directory holding the file.
    pub fn dir(&self) -> &Path {
        self.dir.path()
    }

    pub fn original_name(&self) -> Option<&str> {
        self.original_name.as_deref()
    }
}

/// Lowercased ASCII-alphanumeric extension of `name`, if it has a usable one.
pub fn sanitized_extension(name: &str) -> Option<String> {
    let file_name = name.rsplit(['/', '\\']).next().unwrap_or(name);
    let (stem, ext) = file_name.rsplit_once('.')?;
    if stem.is_empty()
        || ext.is_empty()
        || ext.len() > MAX_EXTENSION_LEN
        || !ext.chars().all(|c| c.is_ascii_alphanumeric())
    {
        return None;
    }
    Some(ext.to_ascii_lowercase())
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::tempdir;

    #[test]
    fn test_sanitized_extension() {
        assert_eq!(sanitized_extension("card.JPG").as_deref(), Some("jpg"));
        assert_eq!(sanitized_extension("memo.m4a").as_deref(), Some("m4a"));
        assert_eq!(
            sanitized_extension("../../etc/passwd.sh").as_deref(),
            Some("sh")
        );
        assert_eq!(sanitized_extension("noext"), None);
        assert_eq!(sanitized_extension(".bashrc"), None);
        assert_eq!(sanitized_extension("weird.p/ng"), None);
        assert_eq!(sanitized_extension("x.tar gz"), None);
        assert_eq!(sanitized_extension("x.averyveryverylongext"), None);
    }

    #[tokio::test]
    async fn test_store_uses_unique_names_and_cleans_up() {
        let root = tempdir().unwrap();
        let store = UploadStore::new(root.path());

        let first = store.store(b"one", Some("card.png")).await.unwrap();
        let second = store.store(b"two", Some("card.png")).await.unwrap();

        assert_ne!(first.path(), second.path());
        assert_eq!(first.path().extension().unwrap(), "png");
        assert!(first.dir().starts_with(root.path()));
        assert!(first
            .dir()
            .file_name()
            .unwrap()
            .to_string_lossy()
            .starts_with("upload-"));
        assert_eq!(std::fs::read(first.path()).unwrap(), b"one");
        assert_eq!(first.original_name(), Some("card.png"));

        // Siblings written next to the upload go away with it
        let sibling = first.dir().join("converted.wav");
        std::fs::write(&sibling, b"pcm").unwrap();
        let dir = first.dir().to_path_buf();

        drop(first);
        assert!(!dir.exists());
        assert!(!sibling.exists());
        assert!(second.path().exists());
    }

    #[tokio::test]
    async fn test_store_creates_missing_root() {
        let root = tempdir().unwrap();
        let store = UploadStore::new(root.path().join("nested/uploads"));

        let upload = store.store(b"data", None).await.unwrap();
        assert!(upload.path().exists());
        assert!(upload.path().extension().is_none());
    }
}
