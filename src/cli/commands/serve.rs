//! HTTP API server for integration with other systems.
//!
//! Provides REST endpoints for product analysis and literature search.

use crate::cli::Output;
use crate::config::Settings;
use crate::error::SkinsafeError;
use crate::pipeline::{AnalysisRequest, SafetyPipeline};
use crate::research::{format_research_context, ResearchSnippet};
use axum::{
    extract::State,
    http::StatusCode,
    response::IntoResponse,
    routing::{get, post},
    Json, Router,
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::{Any, CorsLayer};

/// Shared application state.
struct AppState {
    pipeline: SafetyPipeline,
}

/// Run the HTTP API server.
pub async fn run_serve(host: &str, port: u16, settings: Settings) -> anyhow::Result<()> {
    let pipeline = SafetyPipeline::new(&settings).await?;
    let app = router(Arc::new(AppState { pipeline }));

    let addr = format!("{}:{}", host, port);
    let listener = tokio::net::TcpListener::bind(&addr).await?;

    Output::header("SkinSafe API Server");
    println!();
    Output::success(&format!("Listening on http://{}", addr));
    println!();
    println!("Endpoints:");
    Output::kv("Health", "GET  /health");
    Output::kv("Analyze", "POST /analyze");
    Output::kv("Search", "POST /search");
    println!();
    Output::info("Press Ctrl+C to stop the server.");

    axum::serve(listener, app).await?;

    Ok(())
}

fn router(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_origin(Any)
        .allow_methods(Any)
        .allow_headers(Any);

    Router::new()
        .route("/health", get(health))
        .route("/analyze", post(analyze))
        .route("/search", post(search))
        .layer(cors)
        .with_state(state)
}

// === Request/Response Types ===

#[derive(Deserialize)]
struct SearchRequest {
    query: String,
    #[serde(default)]
    top_k: Option<usize>,
}

#[derive(Serialize)]
struct SearchResponse {
    results: Vec<ResearchSnippet>,
    context: String,
}

#[derive(Serialize)]
struct ErrorResponse {
    error: String,
}

fn error_response(e: SkinsafeError) -> axum::response::Response {
    let status = match e {
        SkinsafeError::InvalidInput(_) => StatusCode::BAD_REQUEST,
        SkinsafeError::MalformedResponse(_)
        | SkinsafeError::OpenAI(_)
        | SkinsafeError::Pinecone { .. }
        | SkinsafeError::Http(_) => StatusCode::BAD_GATEWAY,
        _ => StatusCode::INTERNAL_SERVER_ERROR,
    };
    (
        status,
        Json(ErrorResponse {
            error: e.to_string(),
        }),
    )
        .into_response()
}

// === Handlers ===

async fn health() -> impl IntoResponse {
    Json(serde_json::json!({ "status": "ok" }))
}

async fn analyze(
    State(state): State<Arc<AppState>>,
    Json(req): Json<AnalysisRequest>,
) -> impl IntoResponse {
    match state.pipeline.run_analysis(&req).await {
        Ok(outcome) => Json(outcome).into_response(),
        Err(e) => error_response(e),
    }
}

async fn search(
    State(state): State<Arc<AppState>>,
    Json(req): Json<SearchRequest>,
) -> impl IntoResponse {
    let retriever = state.pipeline.retriever();
    let top_k = req.top_k.unwrap_or_else(|| retriever.top_k());

    match retriever.retrieve_top(&req.query, top_k).await {
        Ok(results) => Json(SearchResponse {
            context: format_research_context(&results),
            results,
        })
        .into_response(),
        Err(e) => error_response(e),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::analysis::fake::{CannedChat, VALID_REPLY};
    use crate::analysis::LlmAnalyzer;
    use crate::embedding::fake::HashEmbedder;
    use crate::ingredients::StaticIngredientSource;
    use crate::research::ResearchRetriever;
    use crate::validation::BrandValidator;
    use crate::vector_store::tests::RecordingIndex;
    use crate::vector_store::{ChunkMetadata, QueryMatch};
    use serde_json::{json, Value};

    async fn spawn_app(reply: &str) -> String {
        let index = Arc::new(RecordingIndex {
            canned_matches: (0..3)
                .map(|i| QueryMatch {
                    id: format!("paper_chunk_{}", i),
                    score: 0.9 - i as f32 * 0.1,
                    metadata: Some(ChunkMetadata {
                        title: "Paper".to_string(),
                        source: "PDF literature".to_string(),
                        text: format!("passage {}", i),
                        ..Default::default()
                    }),
                })
                .collect(),
            ..Default::default()
        });

        let pipeline = SafetyPipeline::with_components(
            BrandValidator::new(["cerave", "nivea"]),
            Arc::new(StaticIngredientSource::default()),
            ResearchRetriever::new(index, Arc::new(HashEmbedder::default())),
            LlmAnalyzer::new(Arc::new(CannedChat::new(reply))),
        );

        let app = router(Arc::new(AppState { pipeline }));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });

        format!("http://{}", addr)
    }

    #[tokio::test]
    async fn test_health() {
        let base = spawn_app(VALID_REPLY).await;
        let body: Value = reqwest::get(format!("{}/health", base))
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body, json!({ "status": "ok" }));
    }

    #[tokio::test]
    async fn test_analyze_endpoint() {
        let base = spawn_app(VALID_REPLY).await;
        let client = reqwest::Client::new();

        let body: Value = client
            .post(format!("{}/analyze", base))
            .json(&json!({ "product_name": "CeraVe Cleanser", "allergies": ["fragrance"] }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(body["is_suitable"], false);

        let body: Value = client
            .post(format!("{}/analyze", base))
            .json(&json!({ "product_name": "Generic Lotion" }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();
        assert_eq!(
            body,
            json!({ "error": "Brand missing", "message": "Please specify a product brand." })
        );
    }

    #[tokio::test]
    async fn test_malformed_reply_is_bad_gateway() {
        let base = spawn_app("not json").await;
        let response = reqwest::Client::new()
            .post(format!("{}/analyze", base))
            .json(&json!({ "product_name": "Nivea Creme" }))
            .send()
            .await
            .unwrap();
        assert_eq!(response.status(), reqwest::StatusCode::BAD_GATEWAY);
    }

    #[tokio::test]
    async fn test_search_endpoint() {
        let base = spawn_app(VALID_REPLY).await;
        let body: Value = reqwest::Client::new()
            .post(format!("{}/search", base))
            .json(&json!({ "query": "fragrance", "top_k": 2 }))
            .send()
            .await
            .unwrap()
            .json()
            .await
            .unwrap();

        assert_eq!(body["results"].as_array().unwrap().len(), 2);
        assert_eq!(body["results"][0]["text"], "passage 0");
        assert_eq!(
            body["context"].as_str().unwrap().matches("Score:").count(),
            2
        );
    }
}
