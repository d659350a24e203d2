//! Media store for uploaded files.
//!
//! PK-data uploads live in a flat directory under `MEDIA_ROOT`, named
//! `pk_data_<uuid>.tsv` so titles never leak into paths and re-uploads never
//! collide. Records reference files by bare name; deletion is explicit and
//! best-effort (a missing file is not an error).

use std::path::{Path, PathBuf};

use uuid::Uuid;

#[derive(Debug, thiserror::Error)]
pub enum MediaError {
    #[error("Invalid media file name: {0}")]
    InvalidName(String),

    #[error("Media I/O failed for {name}: {source}")]
    Io {
        name: String,
        #[source]
        source: std::io::Error,
    },
}

/// Filesystem-backed store rooted at `MEDIA_ROOT`.
#[derive(Debug, Clone)]
pub struct MediaStore {
    root: PathBuf,
}

impl MediaStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn root(&self) -> &Path {
        &self.root
    }

    /// Create the root directory if it does not exist yet.
    pub async fn ensure_root(&self) -> Result<(), MediaError> {
        tokio::fs::create_dir_all(&self.root)
            .await
            .map_err(|source| MediaError::Io { name: self.root.display().to_string(), source })
    }

    /// Store PK-data text under a fresh unique name, returning that name.
    pub async fn save_pk_data(&self, text: &str) -> Result<String, MediaError> {
        let name = format!("pk_data_{}.tsv", Uuid::new_v4());
        let path = self.root.join(&name);
        tokio::fs::write(&path, text)
            .await
            .map_err(|source| MediaError::Io { name: name.clone(), source })?;
        tracing::debug!(file = %name, "Stored PK data file");
        Ok(name)
    }

    /// Read a stored file back as text.
    pub async fn read(&self, name: &str) -> Result<String, MediaError> {
        let path = self.checked_path(name)?;
        tokio::fs::read_to_string(&path)
            .await
            .map_err(|source| MediaError::Io { name: name.to_string(), source })
    }

    /// Delete a stored file. Deleting a file that is already gone succeeds.
    pub async fn remove(&self, name: &str) -> Result<(), MediaError> {
        let path = self.checked_path(name)?;
        match tokio::fs::remove_file(&path).await {
            Ok(()) => {
                tracing::debug!(file = %name, "Removed media file");
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => Ok(()),
            Err(source) => Err(MediaError::Io { name: name.to_string(), source }),
        }
    }

    /// Resolve a stored name to a path, rejecting anything that could
    /// escape the media root.
    fn checked_path(&self, name: &str) -> Result<PathBuf, MediaError> {
        if name.is_empty()
            || name.contains('/')
            || name.contains('\\')
            || name.contains("..")
        {
            return Err(MediaError::InvalidName(name.to_string()));
        }
        Ok(self.root.join(name))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn store() -> (tempfile::TempDir, MediaStore) {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path());
        (dir, store)
    }

    #[tokio::test]
    async fn save_and_read_round_trip() {
        let (_dir, store) = store();
        let name = store.save_pk_data("0.1\t1\t1.1\n").await.unwrap();
        assert!(name.starts_with("pk_data_"));
        assert!(name.ends_with(".tsv"));
        assert_eq!(store.read(&name).await.unwrap(), "0.1\t1\t1.1\n");
    }

    #[tokio::test]
    async fn saved_names_are_unique() {
        let (_dir, store) = store();
        let a = store.save_pk_data("1\t2\n").await.unwrap();
        let b = store.save_pk_data("1\t2\n").await.unwrap();
        assert_ne!(a, b);
    }

    #[tokio::test]
    async fn remove_deletes_the_file() {
        let (dir, store) = store();
        let name = store.save_pk_data("1\t2\n").await.unwrap();
        assert!(dir.path().join(&name).is_file());
        store.remove(&name).await.unwrap();
        assert!(!dir.path().join(&name).is_file());
    }

    #[tokio::test]
    async fn remove_of_missing_file_is_ok() {
        let (_dir, store) = store();
        store.remove("pk_data_gone.tsv").await.unwrap();
    }

    #[tokio::test]
    async fn path_escapes_are_rejected() {
        let (_dir, store) = store();
        assert!(matches!(
            store.read("../outside.tsv").await,
            Err(MediaError::InvalidName(_))
        ));
        assert!(matches!(
            store.remove("a/b.tsv").await,
            Err(MediaError::InvalidName(_))
        ));
        assert!(matches!(store.read("").await, Err(MediaError::InvalidName(_))));
    }

    #[tokio::test]
    async fn ensure_root_creates_missing_directories() {
        let dir = tempfile::tempdir().unwrap();
        let store = MediaStore::new(dir.path().join("nested").join("media"));
        store.ensure_root().await.unwrap();
        let name = store.save_pk_data("1\t2\n").await.unwrap();
        assert!(store.root().join(name).is_file());
    }
}
