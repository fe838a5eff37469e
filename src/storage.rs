use std::path::PathBuf;

use anyhow::Context;
use axum::async_trait;
use bytes::Bytes;

/// Where uploaded recipe/product images live. Keys are relative paths
/// ("abc123.jpg", "products/def456.png") resolved against the upload root.
#[async_trait]
pub trait ImageStore: Send + Sync {
    async fn save(&self, key: &str, body: Bytes) -> anyhow::Result<()>;
    async fn delete(&self, key: &str) -> anyhow::Result<()>;
    fn public_url(&self, key: &str) -> String;

    fn url_opt(&self, key: Option<&str>) -> Option<String> {
        key.map(|k| self.public_url(k))
    }
}

#[derive(Clone)]
pub struct LocalImageStore {
    root: PathBuf,
}

impl LocalImageStore {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }
}

#[async_trait]
impl ImageStore for LocalImageStore {
    async fn save(&self, key: &str, body: Bytes) -> anyhow::Result<()> {
        let path = self.root.join(key);
        if let Some(parent) = path.parent() {
            tokio::fs::create_dir_all(parent)
                .await
                .context("create upload dir")?;
        }
        tokio::fs::write(&path, &body)
            .await
            .with_context(|| format!("write {}", path.display()))?;
        Ok(())
    }

    async fn delete(&self, key: &str) -> anyhow::Result<()> {
        let path = self.root.join(key);
        tokio::fs::remove_file(&path)
            .await
            .with_context(|| format!("remove {}", path.display()))?;
        Ok(())
    }

    fn public_url(&self, key: &str) -> String {
        format!("/static/uploads/{}", key)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn public_url_shape() {
        let store = LocalImageStore::new("static/uploads");
        assert_eq!(store.public_url("a.jpg"), "/static/uploads/a.jpg");
        assert_eq!(
            store.public_url("products/b.png"),
            "/static/uploads/products/b.png"
        );
        assert_eq!(store.url_opt(None), None);
        assert_eq!(
            store.url_opt(Some("c.webp")).as_deref(),
            Some("/static/uploads/c.webp")
        );
    }

    #[tokio::test]
    async fn save_and_delete_roundtrip() {
        let root = std::env::temp_dir().join(format!("bepnha-test-{}", uuid::Uuid::new_v4()));
        let store = LocalImageStore::new(&root);
        store
            .save("products/x.bin", Bytes::from_static(b"12345"))
            .await
            .expect("save");
        let on_disk = tokio::fs::read(root.join("products/x.bin")).await.expect("read back");
        assert_eq!(on_disk, b"12345");
        store.delete("products/x.bin").await.expect("delete");
        assert!(tokio::fs::metadata(root.join("products/x.bin")).await.is_err());
        let _ = tokio::fs::remove_dir_all(&root).await;
    }
}
