use anyhow::Result;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::io::AsyncWriteExt;
use tracing::{info, warn};
use uuid::Uuid;

/// On-disk storage for uploaded photos.
///
/// Files live flat under `dir` and are published under `url_prefix`, so a
/// stored photo's url is always `{url_prefix}/{file_name}`.
pub struct UploadStore {
    dir: PathBuf,
    url_prefix: String,
}

impl UploadStore {
    pub async fn new(dir: PathBuf, url_prefix: &str) -> Result<Self> {
        fs::create_dir_all(&dir).await?;
        info!("Upload directory: {}", dir.display());
        Ok(Self {
            dir,
            url_prefix: normalize_prefix(url_prefix),
        })
    }

    pub fn dir(&self) -> &Path {
        &self.dir
    }

    pub fn url_prefix(&self) -> &str {
        &self.url_prefix
    }

    /// Write an uploaded file and return its public url. Never overwrites:
    /// a clashing name gets a random prefix.
    pub async fn save(&self, original_name: &str, data: &[u8]) -> Result<String> {
        let mut file_name = sanitize_filename(original_name);
        if file_name.is_empty() {
            file_name = format!("upload-{}", Uuid::new_v4().simple());
        }

        let mut file = match self.create_new(&file_name).await {
            Ok(file) => file,
            Err(e) if e.kind() == std::io::ErrorKind::AlreadyExists => {
                let short = Uuid::new_v4().simple().to_string();
                file_name = format!("{}_{}", &short[..8], file_name);
                self.create_new(&file_name).await?
            }
            Err(e) => return Err(e.into()),
        };
        file.write_all(data).await?;
        file.flush().await?;

        info!("Stored upload {} ({} bytes)", file_name, data.len());
        Ok(format!("{}/{}", self.url_prefix, file_name))
    }

    async fn create_new(&self, file_name: &str) -> std::io::Result<fs::File> {
        fs::OpenOptions::new()
            .write(true)
            .create_new(true)
            .open(self.dir.join(file_name))
            .await
    }

    /// Disk path behind a stored url, if the url points into this store.
    pub fn local_path(&self, url: &str) -> Option<PathBuf> {
        let name = url.strip_prefix(&self.url_prefix)?.strip_prefix('/')?;
        if name.is_empty() || sanitize_filename(name) != name {
            return None;
        }
        Some(self.dir.join(name))
    }

    /// Remove the file behind a stored url. External urls are ignored.
    pub async fn remove(&self, url: &str) -> Result<()> {
        let Some(path) = self.local_path(url) else {
            return Ok(());
        };
        match fs::remove_file(&path).await {
            Ok(()) => {
                info!("Deleted upload {}", path.display());
                Ok(())
            }
            Err(e) if e.kind() == std::io::ErrorKind::NotFound => {
                warn!("Upload {} already gone", path.display());
                Ok(())
            }
            Err(e) => Err(e.into()),
        }
    }
}

/// Leading slash, no trailing slash.
fn normalize_prefix(prefix: &str) -> String {
    let trimmed = prefix.trim_matches('/');
    format!("/{}", trimmed)
}

/// Reduce a client-supplied file name to a safe flat name: path separators
/// and whitespace become `_`, anything outside `[A-Za-z0-9._-]` is dropped,
/// and leading/trailing dots and underscores are stripped.
pub fn sanitize_filename(name: &str) -> String {
    let spaced = name.replace(['/', '\\'], " ");
    let joined = spaced.split_whitespace().collect::<Vec<_>>().join("_");
    let kept: String = joined
        .chars()
        .filter(|c| c.is_ascii_alphanumeric() || matches!(c, '.' | '_' | '-'))
        .collect();
    kept.trim_matches(|c| c == '.' || c == '_').to_string()
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn sanitize_blocks_traversal() {
        assert_eq!(sanitize_filename("../../etc/passwd"), "etc_passwd");
        assert_eq!(sanitize_filename("..\\..\\boot.ini"), "boot.ini");
        assert_eq!(sanitize_filename("my photo.jpg"), "my_photo.jpg");
        assert_eq!(sanitize_filename(".hidden"), "hidden");
        assert_eq!(sanitize_filename("maç günü.png"), "ma_gn.png");
        assert_eq!(sanitize_filename("..."), "");
    }

    #[test]
    fn prefix_is_normalized() {
        assert_eq!(normalize_prefix("static/uploads/"), "/static/uploads");
        assert_eq!(normalize_prefix("/static/uploads"), "/static/uploads");
    }

    #[tokio::test]
    async fn save_never_overwrites_and_remove_cleans_up() {
        let dir = std::env::temp_dir().join(format!("kura-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(dir.clone(), "/static/uploads").await.unwrap();

        let first = store.save("team.jpg", b"one").await.unwrap();
        let second = store.save("team.jpg", b"two").await.unwrap();
        assert_eq!(first, "/static/uploads/team.jpg");
        assert_ne!(first, second);
        assert!(second.starts_with("/static/uploads/"));

        let path = store.local_path(&first).unwrap();
        assert_eq!(std::fs::read(&path).unwrap(), b"one");

        store.remove(&first).await.unwrap();
        assert!(!path.exists());
        // Second removal and external urls are both no-ops.
        store.remove(&first).await.unwrap();
        store.remove("https://img.example/x.jpg").await.unwrap();

        std::fs::remove_dir_all(dir).ok();
    }

    #[tokio::test]
    async fn local_path_rejects_foreign_and_crafted_urls() {
        let dir = std::env::temp_dir().join(format!("kura-uploads-{}", Uuid::new_v4()));
        let store = UploadStore::new(dir.clone(), "/static/uploads").await.unwrap();

        assert!(store.local_path("https://img.example/a.jpg").is_none());
        assert!(store.local_path("/static/uploads/../kura.db").is_none());
        assert!(store.local_path("/static/uploads/").is_none());
        assert!(store.local_path("/static/uploads/a.jpg").is_some());

        std::fs::remove_dir_all(dir).ok();
    }
}
