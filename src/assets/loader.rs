use crate::assets::{decode_png, Image};
use crate::config::{with_trailing_slash, AssetSource};
use crate::net::fetch;
use async_trait::async_trait;
use std::path::{Path, PathBuf};
use std::sync::Arc;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum AssetError {
    #[error("cannot read asset: {0}")]
    Io(#[from] std::io::Error),

    #[error(transparent)]
    Net(#[from] reqwest::Error),

    #[error("asset server answered {0}")]
    Status(u16),

    #[error("invalid asset url: {0}")]
    Url(#[from] url::ParseError),

    #[error("unsupported image format (only PNG is decoded)")]
    Unsupported,

    #[error("cannot decode image: {0}")]
    Decode(String),
}

/// Fetches and decodes a single image asset.
#[async_trait]
pub trait AssetLoader: Send + Sync {
    async fn load(&self, path: &str) -> Result<Image, AssetError>;
}

/// Returns the loader matching the configured asset source.
pub fn loader_for(source: &AssetSource, client: reqwest::Client) -> Arc<dyn AssetLoader> {
    match source {
        AssetSource::Directory(root) => Arc::new(FsAssetLoader::new(root.clone())),
        AssetSource::Http(base) => Arc::new(HttpAssetLoader::new(client, base.clone())),
    }
}

/// Loads assets from a directory. `/static/img/a.png` resolves to `<root>/static/img/a.png`.
pub struct FsAssetLoader {
    root: PathBuf,
}

impl FsAssetLoader {
    pub fn new(root: impl Into<PathBuf>) -> Self {
        Self { root: root.into() }
    }

    pub fn resolve(&self, path: &str) -> PathBuf {
        self.root.join(Path::new(path.trim_start_matches('/')))
    }
}

#[async_trait]
impl AssetLoader for FsAssetLoader {
    async fn load(&self, path: &str) -> Result<Image, AssetError> {
        let bytes = tokio::fs::read(self.resolve(path)).await?;
        decode_png(&bytes)
    }
}

/// Loads assets from the static file server.
pub struct HttpAssetLoader {
    client: reqwest::Client,
    base: Url,
}

impl HttpAssetLoader {
    pub fn new(client: reqwest::Client, base: Url) -> Self {
        Self {
            client,
            base: with_trailing_slash(base),
        }
    }
}

#[async_trait]
impl AssetLoader for HttpAssetLoader {
    async fn load(&self, path: &str) -> Result<Image, AssetError> {
        let url = self.base.join(path.trim_start_matches('/'))?;
        let resp = fetch(&self.client, url).await?;
        if !resp.is_success() {
            return Err(AssetError::Status(resp.status));
        }
        decode_png(&resp.body)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::EngineConfig;
    use crate::testing::{local_client, serve_once};

    #[test]
    fn fs_paths_are_rooted() {
        let loader = FsAssetLoader::new("/srv/www");
        assert_eq!(
            loader.resolve("/static/img/arbol.png"),
            PathBuf::from("/srv/www/static/img/arbol.png")
        );
        assert_eq!(loader.resolve("nube.png"), PathBuf::from("/srv/www/nube.png"));
    }

    #[tokio::test]
    async fn fs_loader_reads_png() {
        let dir = tempfile::tempdir().unwrap();
        let img_dir = dir.path().join("static/img");
        std::fs::create_dir_all(&img_dir).unwrap();

        let image = Image::from_raw(1, 1, vec![10, 20, 30, 255]).unwrap();
        let file = std::fs::File::create(img_dir.join("leon.png")).unwrap();
        image.write_png(std::io::BufWriter::new(file)).unwrap();

        let loader = FsAssetLoader::new(dir.path());
        let loaded = loader.load("/static/img/leon.png").await.unwrap();
        assert_eq!(loaded, image);

        assert!(matches!(
            loader.load("/static/img/missing.png").await,
            Err(AssetError::Io(_))
        ));
    }

    #[tokio::test]
    async fn fs_loader_rejects_jpeg() {
        let dir = tempfile::tempdir().unwrap();
        std::fs::write(dir.path().join("manzana.jpg"), [0xff, 0xd8, 0xff, 0xe0]).unwrap();

        let loader = FsAssetLoader::new(dir.path());
        assert!(matches!(
            loader.load("/manzana.jpg").await,
            Err(AssetError::Unsupported)
        ));
    }

    #[tokio::test]
    async fn http_loader_resolves_below_the_base_path() {
        let image = Image::from_raw(1, 1, vec![0, 0, 255, 255]).unwrap();
        let mut png = Vec::new();
        image.write_png(&mut png).unwrap();
        let (addr, server) = serve_once("200 OK", png).await;

        let base = Url::parse(&format!("http://{addr}/assets")).unwrap();
        let cfg = EngineConfig::builder().assets(AssetSource::Http(base)).build().unwrap();
        let loader = loader_for(&cfg.assets, local_client());

        assert_eq!(loader.load("/static/img/arbol.png").await.unwrap(), image);
        assert_eq!(server.await.unwrap(), "GET /assets/static/img/arbol.png HTTP/1.1");
    }

    #[tokio::test]
    async fn http_loader_reports_missing_assets() {
        let (addr, server) = serve_once("404 Not Found", "not found").await;
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let loader = HttpAssetLoader::new(local_client(), base);

        assert!(matches!(
            loader.load("/static/img/nube.png").await,
            Err(AssetError::Status(404))
        ));
        server.await.unwrap();
    }

    #[tokio::test]
    async fn http_loader_rejects_non_png_bodies() {
        let (addr, server) = serve_once("200 OK", "<html></html>").await;
        let base = Url::parse(&format!("http://{addr}/")).unwrap();
        let loader = HttpAssetLoader::new(local_client(), base);

        assert!(matches!(
            loader.load("/static/img/manzana.jpg").await,
            Err(AssetError::Unsupported)
        ));
        server.await.unwrap();
    }
}
