use crate::config::{with_trailing_slash, EngineConfig};
use crate::net::{build_client, fetch};
use async_trait::async_trait;
use serde::Deserialize;
use url::Url;

#[derive(Debug, thiserror::Error)]
pub enum FetchError {
    #[error(transparent)]
    Net(#[from] reqwest::Error),

    #[error("{url} answered {status}")]
    Status { status: u16, url: Url },

    #[error("malformed payload: {0}")]
    Malformed(#[from] serde_json::Error),

    #[error("invalid endpoint: {0}")]
    Endpoint(#[from] url::ParseError),
}

/// Aggregated module state as served by `GET /api/data/<module>`.
///
/// `data` holds the module-specific entity records of every node reporting for
/// the module; `count` is the number of reporting nodes. The remaining fields
/// are informational and optional.
#[derive(Debug, Clone, Default, PartialEq, Deserialize)]
pub struct Snapshot {
    pub data: Vec<serde_json::Value>,
    pub count: u64,
    #[serde(default)]
    pub module: Option<String>,
    #[serde(default)]
    pub nodes: Vec<String>,
    #[serde(default)]
    pub total_objects: Option<u64>,
}

/// Remote state provider polled by simulation units.
///
/// Implementations must be cheap to share: every unit holds the same
/// `Arc<dyn DataSource>`.
#[async_trait]
pub trait DataSource: Send + Sync {
    async fn snapshot(&self, module: &str) -> Result<Snapshot, FetchError>;
}

/// Data source backed by the HTTP data server.
pub struct HttpDataSource {
    client: reqwest::Client,
    base: Url,
}

impl HttpDataSource {
    pub fn new(config: &EngineConfig) -> Result<Self, reqwest::Error> {
        Ok(Self::with_client(build_client(config)?, config.data_url.clone()))
    }

    pub fn with_client(client: reqwest::Client, base: Url) -> Self {
        Self {
            client,
            base: with_trailing_slash(base),
        }
    }

    /// Endpoint URL for a module.
    pub fn endpoint(&self, module: &str) -> Result<Url, url::ParseError> {
        self.base.join(&format!("api/data/{module}"))
    }
}

#[async_trait]
impl DataSource for HttpDataSource {
    async fn snapshot(&self, module: &str) -> Result<Snapshot, FetchError> {
        let url = self.endpoint(module)?;
        let resp = fetch(&self.client, url).await?;

        if !resp.is_success() {
            return Err(FetchError::Status {
                status: resp.status,
                url: resp.url,
            });
        }

        Ok(resp.json::<Snapshot>()?)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::testing::{local_client, serve_once};
    use serde_json::json;

    fn source_at(addr: std::net::SocketAddr, path: &str) -> HttpDataSource {
        let base = Url::parse(&format!("http://{addr}{path}")).unwrap();
        HttpDataSource::with_client(local_client(), base)
    }

    #[test]
    fn endpoint_per_module() {
        let cfg = EngineConfig::builder()
            .data_url("http://10.0.0.2:5000")
            .unwrap()
            .build()
            .unwrap();
        let source = HttpDataSource::new(&cfg).unwrap();
        assert_eq!(
            source.endpoint("climate").unwrap().as_str(),
            "http://10.0.0.2:5000/api/data/climate"
        );
    }

    #[test]
    fn snapshot_accepts_server_payload() {
        let snapshot: Snapshot = serde_json::from_value(json!({
            "module": "life",
            "nodes": ["pi-1234", "pi-5678"],
            "count": 2,
            "data": [{"x": 1, "y": 2}],
            "total_objects": 1
        }))
        .unwrap();
        assert_eq!(snapshot.count, 2);
        assert_eq!(snapshot.data.len(), 1);
        assert_eq!(snapshot.nodes.len(), 2);
        assert_eq!(snapshot.module.as_deref(), Some("life"));
    }

    #[test]
    fn snapshot_requires_data_and_count() {
        assert!(serde_json::from_value::<Snapshot>(json!({"count": 1})).is_err());
        assert!(serde_json::from_value::<Snapshot>(json!({"data": []})).is_err());
        assert!(serde_json::from_value::<Snapshot>(json!({"error": "Invalid module"})).is_err());
    }

    #[test]
    fn endpoint_keeps_the_base_path() {
        let base = Url::parse("http://10.0.0.2:5000/sim").unwrap();
        let source = HttpDataSource::with_client(local_client(), base);
        assert_eq!(
            source.endpoint("trees").unwrap().as_str(),
            "http://10.0.0.2:5000/sim/api/data/trees"
        );
    }

    #[tokio::test]
    async fn snapshot_is_fetched_from_the_module_endpoint() {
        let body = json!({"module": "food", "count": 1, "data": [{"x": 3, "y": 4}]}).to_string();
        let (addr, server) = serve_once("200 OK", body).await;

        let snapshot = source_at(addr, "/sim").snapshot("food").await.unwrap();
        assert_eq!(snapshot.count, 1);
        assert_eq!(snapshot.data, vec![json!({"x": 3, "y": 4})]);
        assert_eq!(server.await.unwrap(), "GET /sim/api/data/food HTTP/1.1");
    }

    #[tokio::test]
    async fn error_status_is_a_failed_fetch() {
        let (addr, server) = serve_once("500 Internal Server Error", "boom").await;

        match source_at(addr, "/").snapshot("life").await {
            Err(FetchError::Status { status, url }) => {
                assert_eq!(status, 500);
                assert_eq!(url.path(), "/api/data/life");
            }
            other => panic!("expected a status error, got {other:?}"),
        }
        server.await.unwrap();
    }

    #[tokio::test]
    async fn html_body_is_a_failed_fetch() {
        let (addr, server) = serve_once("200 OK", "<html>maintenance</html>").await;

        assert!(matches!(
            source_at(addr, "/").snapshot("trees").await,
            Err(FetchError::Malformed(_))
        ));
        server.await.unwrap();
    }
}
