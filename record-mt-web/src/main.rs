use axum::{
    Json, Router,
    extract::State,
    http::{StatusCode, header},
    response::IntoResponse,
    routing::{get, post},
};
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing::{info, warn};

use record_mt::{
    BatchEngine, BatchError, Config, Directive, GoogleTranslateProvider, MachineTranslator,
    MockMode, MockTranslator, Record, UnitFailure,
};

#[derive(Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TranslateRequest {
    pub items: Vec<Record>,
    pub keys_to_translate: Vec<Directive>,
    pub source_lang: String,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
    #[serde(skip_serializing_if = "Vec::is_empty")]
    pub failures: Vec<UnitFailure>,
    /// Records with the successful translations applied, on partial failure
    #[serde(skip_serializing_if = "Option::is_none")]
    pub items: Option<Vec<Record>>,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

#[derive(Clone)]
pub struct AppState {
    pub engine: BatchEngine,
}

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::from_default_env().add_directive("info".parse()?),
        )
        .init();

    let config = Config::from_env().map_err(|e| format!("Failed to load configuration: {}", e))?;
    let use_mock = std::env::var("RECORD_MT_MOCK").is_ok_and(|v| v == "1" || v == "true");
    let translator: Arc<dyn MachineTranslator> = if use_mock {
        Arc::new(MockTranslator::new(MockMode::Suffix))
    } else {
        Arc::new(
            GoogleTranslateProvider::new(config.client())
                .map_err(|e| format!("Failed to initialize translator: {}", e))?,
        )
    };
    let state = AppState {
        engine: BatchEngine::new(translator, config.engine()),
    };

    info!(
        provider = state.engine.provider_name(),
        max_concurrency = config.max_concurrency,
        "Starting record-mt web server"
    );

    let bind = std::env::var("RECORD_MT_BIND").unwrap_or_else(|_| "127.0.0.1:3000".to_string());
    let listener = tokio::net::TcpListener::bind(&bind).await?;
    info!("Server running at http://{}", bind);

    axum::serve(listener, app(state)).await?;

    Ok(())
}

fn app(state: AppState) -> Router {
    Router::new()
        .route("/", get(serve_index))
        .route("/api/translate", post(translate_records))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state)
}

async fn serve_index() -> impl IntoResponse {
    (
        StatusCode::OK,
        [(header::CONTENT_TYPE, "text/html; charset=utf-8")],
        include_str!("static/index.html"),
    )
}

async fn translate_records(
    State(state): State<AppState>,
    Json(request): Json<TranslateRequest>,
) -> Result<Json<Vec<Record>>, ApiError> {
    let TranslateRequest {
        mut items,
        keys_to_translate,
        source_lang,
    } = request;

    info!(
        records = items.len(),
        directives = keys_to_translate.len(),
        %source_lang,
        "Translating records"
    );

    let report = state
        .engine
        .translate_batch(&mut items, &keys_to_translate, &source_lang)
        .await
        .map_err(|err| error_response(err, None))?;

    match report.into_result() {
        Ok(report) => {
            info!(translated = report.translated, "Batch translated");
            Ok(Json(items))
        }
        Err(err) => Err(error_response(err, Some(items))),
    }
}

fn error_response(err: BatchError, items: Option<Vec<Record>>) -> ApiError {
    if err.is_client_error() {
        warn!(%err, "Rejected translation request");
        return (
            StatusCode::BAD_REQUEST,
            Json(ErrorResponse {
                error: err.to_string(),
                failures: Vec::new(),
                items: None,
            }),
        );
    }

    warn!(%err, "Translation batch failed");
    let failures = match err {
        BatchError::Translation { failures } => failures,
        _ => Vec::new(),
    };
    (
        StatusCode::INTERNAL_SERVER_ERROR,
        Json(ErrorResponse {
            error: "Error translating content".to_string(),
            failures,
            items,
        }),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::{Body, to_bytes};
    use axum::http::{Method, Request};
    use serde_json::{Value, json};
    use std::collections::HashSet;
    use tower::ServiceExt;

    fn test_app(mock: MockTranslator) -> Router {
        app(AppState {
            engine: BatchEngine::new(Arc::new(mock), Config::default().engine()),
        })
    }

    fn post_json(body: Value) -> Request<Body> {
        Request::builder()
            .method(Method::POST)
            .uri("/api/translate")
            .header(header::CONTENT_TYPE, "application/json")
            .body(Body::from(body.to_string()))
            .unwrap()
    }

    async fn body_json(response: axum::response::Response) -> Value {
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        serde_json::from_slice(&bytes).unwrap()
    }

    #[tokio::test]
    async fn test_translate_renames_keys() {
        let response = test_app(MockTranslator::new(MockMode::Suffix))
            .oneshot(post_json(json!({
                "items": [{"name": "salam", "id": 1}, {"name": ""}],
                "keysToTranslate": [{"key": "name", "newKey": "name_en", "targetLang": "en"}],
                "sourceLang": "az"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(
            body_json(response).await,
            json!([{"id": 1, "name_en": "salam_en"}, {"name": ""}])
        );
    }

    #[tokio::test]
    async fn test_missing_new_key_is_bad_request() {
        let response = test_app(MockTranslator::new(MockMode::Suffix))
            .oneshot(post_json(json!({
                "items": [{"name": "salam"}],
                "keysToTranslate": [{"key": "name", "targetLang": "en"}],
                "sourceLang": "az"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::BAD_REQUEST);
        let body = body_json(response).await;
        assert_eq!(body["error"], "directive 0 (`name`): target key is required");
        assert!(body.get("failures").is_none());
    }

    #[tokio::test]
    async fn test_upstream_failure_is_server_error() {
        let fail: HashSet<String> = ["iki".to_string()].into_iter().collect();
        let response = test_app(MockTranslator::new(MockMode::FailOn(fail)))
            .oneshot(post_json(json!({
                "items": [{"x": "bir"}, {"x": "iki"}],
                "keysToTranslate": [{"key": "x", "newKey": "x", "targetLang": "en"}],
                "sourceLang": "az"
            })))
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::INTERNAL_SERVER_ERROR);
        let body = body_json(response).await;
        assert_eq!(body["error"], "Error translating content");
        assert_eq!(body["failures"][0]["recordIndex"], 1);
        assert_eq!(body["failures"][0]["sourceKey"], "x");
        assert_eq!(body["items"], json!([{"x": "bir_en"}, {"x": "iki"}]));
    }

    #[tokio::test]
    async fn test_get_is_method_not_allowed() {
        let response = test_app(MockTranslator::new(MockMode::Suffix))
            .oneshot(
                Request::builder()
                    .method(Method::GET)
                    .uri("/api/translate")
                    .body(Body::empty())
                    .unwrap(),
            )
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::METHOD_NOT_ALLOWED);
        let allow = response.headers().get(header::ALLOW).unwrap();
        assert!(allow.to_str().unwrap().contains("POST"));
    }

    #[tokio::test]
    async fn test_invalid_json_is_client_error() {
        let response = test_app(MockTranslator::new(MockMode::Suffix))
            .oneshot(
                Request::builder()
                    .method(Method::POST)
                    .uri("/api/translate")
                    .header(header::CONTENT_TYPE, "application/json")
                    .body(Body::from("{\"items\": ["))
                    .unwrap(),
            )
            .await
            .unwrap();

        assert!(response.status().is_client_error());
    }

    #[tokio::test]
    async fn test_index_page_is_served() {
        let response = test_app(MockTranslator::new(MockMode::Suffix))
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = to_bytes(response.into_body(), usize::MAX).await.unwrap();
        let page = String::from_utf8_lossy(&bytes);
        assert!(page.contains("/api/translate"));
        // Rejections from the JSON extractor are plain text
        assert!(page.contains("response.text()"));
        assert!(!page.contains("response.json()"));
    }
}
