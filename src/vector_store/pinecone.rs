//! Pinecone vector index client.
//!
//! Talks to the Pinecone data plane over REST. The index host is taken from
//! settings when present, otherwise it is looked up once through the control
//! plane by index name.

use super::{ChunkMetadata, QueryMatch, VectorIndex, VectorRecord};
use crate::config::VectorStoreSettings;
use crate::error::{Result, SkinsafeError};
use async_trait::async_trait;
use reqwest::header::{HeaderMap, HeaderValue, CONTENT_TYPE};
use serde::{Deserialize, Serialize};
use std::time::Duration;
use tracing::{debug, info, instrument};

const CONTROL_PLANE_URL: &str = "https://api.pinecone.io";
const API_VERSION: &str = "2024-07";
const REQUEST_TIMEOUT_SECS: u64 = 60;

/// REST client bound to a single Pinecone index.
pub struct PineconeIndex {
    client: reqwest::Client,
    host: url::Url,
    namespace: String,
}

impl PineconeIndex {
    /// Build a client from settings, resolving the index host if needed.
    pub async fn connect(settings: &VectorStoreSettings) -> Result<Self> {
        let api_key = settings
            .api_key
            .as_deref()
            .filter(|k| !k.trim().is_empty())
            .ok_or_else(|| {
                SkinsafeError::Config(
                    "PINECONE_API_KEY not set. Set it with: export PINECONE_API_KEY='...'"
                        .to_string(),
                )
            })?;
        let client = Self::http_client(api_key)?;

        let host = match settings.host.as_deref().filter(|h| !h.trim().is_empty()) {
            Some(host) => host.to_string(),
            None => Self::describe_host(&client, CONTROL_PLANE_URL, &settings.index_name).await?,
        };

        Self::with_client(client, &host, &settings.namespace)
    }

    /// Build a client for a known index host.
    pub fn new(api_key: &str, host: &str, namespace: &str) -> Result<Self> {
        Self::with_client(Self::http_client(api_key)?, host, namespace)
    }

    fn with_client(client: reqwest::Client, host: &str, namespace: &str) -> Result<Self> {
        let host = normalize_host(host)?;
        info!("Using Pinecone index at {}", host);
        Ok(Self {
            client,
            host,
            namespace: namespace.to_string(),
        })
    }

    fn http_client(api_key: &str) -> Result<reqwest::Client> {
        let mut headers = HeaderMap::new();
        headers.insert(
            "Api-Key",
            HeaderValue::from_str(api_key.trim())
                .map_err(|_| SkinsafeError::Config("Invalid Pinecone API key".to_string()))?,
        );
        headers.insert("X-Pinecone-API-Version", HeaderValue::from_static(API_VERSION));
        headers.insert(CONTENT_TYPE, HeaderValue::from_static("application/json"));

        Ok(reqwest::Client::builder()
            .timeout(Duration::from_secs(REQUEST_TIMEOUT_SECS))
            .default_headers(headers)
            .build()?)
    }

    /// Look up an index's data-plane host by name.
    #[instrument(skip(client, control_plane))]
    async fn describe_host(
        client: &reqwest::Client,
        control_plane: &str,
        index_name: &str,
    ) -> Result<String> {
        let url = format!("{}/indexes/{}", control_plane.trim_end_matches('/'), index_name);
        let response = client.get(&url).send().await?;
        let description: IndexDescription = read_json(response).await?;
        debug!("Resolved index {} to host {}", index_name, description.host);
        Ok(description.host)
    }

    fn endpoint(&self, path: &str) -> Result<url::Url> {
        self.host
            .join(path)
            .map_err(|e| SkinsafeError::Config(format!("Invalid Pinecone endpoint {}: {}", path, e)))
    }
}

/// Accept bare hosts (as returned by the control plane) or full URLs.
fn normalize_host(host: &str) -> Result<url::Url> {
    let host = host.trim().trim_end_matches('/');
    let with_scheme = if host.starts_with("http://") || host.starts_with("https://") {
        host.to_string()
    } else {
        format!("https://{}", host)
    };
    url::Url::parse(&format!("{}/", with_scheme))
        .map_err(|e| SkinsafeError::Config(format!("Invalid Pinecone host {}: {}", host, e)))
}

async fn read_json<T: for<'de> Deserialize<'de>>(response: reqwest::Response) -> Result<T> {
    let status = response.status();
    if !status.is_success() {
        let body = response
            .text()
            .await
            .unwrap_or_else(|_| "<body unavailable>".to_string());
        return Err(SkinsafeError::Pinecone {
            status: status.as_u16(),
            body,
        });
    }
    Ok(response.json().await?)
}

#[async_trait]
impl VectorIndex for PineconeIndex {
    #[instrument(skip(self, records), fields(count = records.len()))]
    async fn upsert(&self, records: &[VectorRecord]) -> Result<usize> {
        if records.is_empty() {
            return Ok(0);
        }

        let request = UpsertRequest {
            vectors: records,
            namespace: &self.namespace,
        };
        let response = self
            .client
            .post(self.endpoint("vectors/upsert")?)
            .json(&request)
            .send()
            .await?;
        let body: UpsertResponse = read_json(response).await?;

        debug!("Pinecone acknowledged {} records", body.upserted_count);
        Ok(body.upserted_count)
    }

    #[instrument(skip(self, vector))]
    async fn query(&self, vector: &[f32], top_k: usize) -> Result<Vec<QueryMatch>> {
        let request = QueryRequest {
            vector,
            top_k,
            include_metadata: true,
            include_values: false,
            namespace: &self.namespace,
        };
        let response = self
            .client
            .post(self.endpoint("query")?)
            .json(&request)
            .send()
            .await?;
        let body: QueryResponse = read_json(response).await?;

        Ok(body
            .matches
            .into_iter()
            .map(|m| QueryMatch {
                id: m.id,
                score: m.score,
                metadata: m.metadata,
            })
            .collect())
    }

    async fn record_count(&self) -> Result<usize> {
        let response = self
            .client
            .post(self.endpoint("describe_index_stats")?)
            .json(&serde_json::json!({}))
            .send()
            .await?;
        let stats: IndexStats = read_json(response).await?;
        Ok(stats.total_vector_count)
    }

    fn name(&self) -> &'static str {
        "pinecone"
    }
}

// === Wire types ===

#[derive(Deserialize)]
struct IndexDescription {
    host: String,
}

#[derive(Serialize)]
struct UpsertRequest<'a> {
    vectors: &'a [VectorRecord],
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct UpsertResponse {
    #[serde(default)]
    upserted_count: usize,
}

#[derive(Serialize)]
#[serde(rename_all = "camelCase")]
struct QueryRequest<'a> {
    vector: &'a [f32],
    top_k: usize,
    include_metadata: bool,
    include_values: bool,
    #[serde(skip_serializing_if = "str::is_empty")]
    namespace: &'a str,
}

#[derive(Deserialize)]
struct QueryResponse {
    #[serde(default)]
    matches: Vec<WireMatch>,
}

#[derive(Deserialize)]
struct WireMatch {
    id: String,
    #[serde(default)]
    score: f32,
    #[serde(default)]
    metadata: Option<ChunkMetadata>,
}

#[derive(Deserialize)]
#[serde(rename_all = "camelCase")]
struct IndexStats {
    #[serde(default)]
    total_vector_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::vector_store::tests::record;
    use axum::{extract::State, http::HeaderMap as AxumHeaders, routing::{get, post}, Json, Router};
    use serde_json::{json, Value};
    use std::sync::{Arc, Mutex};

    #[derive(Default)]
    struct Captured {
        bodies: Mutex<Vec<(String, Value)>>,
        api_keys: Mutex<Vec<String>>,
    }

    fn remember(state: &Captured, headers: &AxumHeaders, path: &str, body: Value) {
        state.bodies.lock().unwrap().push((path.to_string(), body));
        if let Some(key) = headers.get("api-key").and_then(|v| v.to_str().ok()) {
            state.api_keys.lock().unwrap().push(key.to_string());
        }
    }

    async fn spawn_fake_pinecone() -> (String, Arc<Captured>) {
        let state = Arc::new(Captured::default());

        let app = Router::new()
            .route(
                "/vectors/upsert",
                post(
                    |State(s): State<Arc<Captured>>, headers: AxumHeaders, Json(body): Json<Value>| async move {
                        let count = body["vectors"].as_array().map(Vec::len).unwrap_or(0);
                        remember(&s, &headers, "upsert", body);
                        Json(json!({ "upsertedCount": count }))
                    },
                ),
            )
            .route(
                "/query",
                post(
                    |State(s): State<Arc<Captured>>, headers: AxumHeaders, Json(body): Json<Value>| async move {
                        remember(&s, &headers, "query", body);
                        Json(json!({
                            "matches": [
                                {
                                    "id": "sls_chunk_0",
                                    "score": 0.91,
                                    "metadata": {
                                        "title": "SLS and Eczema",
                                        "authors": "Unknown author(s)",
                                        "year": "2019",
                                        "source": "PDF literature",
                                        "chunk_index": 0.0,
                                        "content_type": "ingredient safety research",
                                        "text": "SLS disrupts the skin barrier."
                                    }
                                },
                                { "id": "bare", "score": 0.5 }
                            ],
                            "namespace": ""
                        }))
                    },
                ),
            )
            .route(
                "/describe_index_stats",
                post(|| async { Json(json!({ "totalVectorCount": 42, "dimension": 3072 })) }),
            )
            .route(
                "/indexes/{name}",
                get(|axum::extract::Path(name): axum::extract::Path<String>| async move {
                    Json(json!({ "name": name, "host": "resolved.example.pinecone.io" }))
                }),
            )
            .with_state(state.clone());

        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        (format!("http://{}", addr), state)
    }

    #[test]
    fn test_normalize_host() {
        assert_eq!(
            normalize_host("idx-abc.svc.pinecone.io").unwrap().as_str(),
            "https://idx-abc.svc.pinecone.io/"
        );
        assert_eq!(
            normalize_host("http://127.0.0.1:9000/").unwrap().as_str(),
            "http://127.0.0.1:9000/"
        );
    }

    #[tokio::test]
    async fn test_connect_requires_api_key() {
        let settings = VectorStoreSettings::default();
        assert!(matches!(
            PineconeIndex::connect(&settings).await,
            Err(SkinsafeError::Config(_))
        ));
    }

    #[tokio::test]
    async fn test_upsert_sends_records() {
        let (host, state) = spawn_fake_pinecone().await;
        let index = PineconeIndex::new("pc-test", &host, "").unwrap();

        let written = index
            .upsert(&[record("a_chunk_0", vec![0.1, 0.2]), record("a_chunk_1", vec![0.3, 0.4])])
            .await
            .unwrap();
        assert_eq!(written, 2);

        let bodies = state.bodies.lock().unwrap();
        let (path, body) = &bodies[0];
        assert_eq!(path, "upsert");
        assert_eq!(body["vectors"][1]["id"], "a_chunk_1");
        assert_eq!(body["vectors"][0]["metadata"]["source"], "PDF literature");
        assert!(body.get("namespace").is_none());
        assert_eq!(state.api_keys.lock().unwrap()[0], "pc-test");
    }

    #[tokio::test]
    async fn test_query_parses_matches() {
        let (host, state) = spawn_fake_pinecone().await;
        let index = PineconeIndex::new("pc-test", &host, "papers").unwrap();

        let matches = index.query(&[0.5, 0.5], 5).await.unwrap();
        assert_eq!(matches.len(), 2);
        assert_eq!(matches[0].id, "sls_chunk_0");
        let meta = matches[0].metadata.as_ref().unwrap();
        assert_eq!(meta.year, "2019");
        assert_eq!(meta.chunk_index, 0);
        assert!(matches[1].metadata.is_none());

        let bodies = state.bodies.lock().unwrap();
        let (_, body) = &bodies[0];
        assert_eq!(body["topK"], 5);
        assert_eq!(body["includeMetadata"], true);
        assert_eq!(body["namespace"], "papers");
    }

    #[tokio::test]
    async fn test_record_count() {
        let (host, _) = spawn_fake_pinecone().await;
        let index = PineconeIndex::new("pc-test", &host, "").unwrap();
        assert_eq!(index.record_count().await.unwrap(), 42);
    }

    #[tokio::test]
    async fn test_describe_host() {
        let (host, _) = spawn_fake_pinecone().await;
        let client = PineconeIndex::http_client("pc-test").unwrap();
        let resolved = PineconeIndex::describe_host(&client, &host, "skincare-rag")
            .await
            .unwrap();
        assert_eq!(resolved, "resolved.example.pinecone.io");
    }

    #[tokio::test]
    async fn test_error_status_surfaces() {
        let (host, _) = spawn_fake_pinecone().await;
        let client = PineconeIndex::http_client("pc-test").unwrap();
        let index = PineconeIndex::with_client(client, &format!("{}/missing", host), "").unwrap();
        match index.query(&[1.0], 1).await {
            Err(SkinsafeError::Pinecone { status, .. }) => assert_eq!(status, 404),
            other => panic!("expected Pinecone error, got {:?}", other.map(|m| m.len())),
        }
    }
}
