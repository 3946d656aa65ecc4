//! HTTP surface: viewer page, JSON API, health and metrics.

use std::time::Duration;

use axum::{
    extract::{Query, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{Html, IntoResponse, Json},
    routing::get,
    Router,
};
use logread::{inventory, GuardError, LogFileEntry, LogRecord, LogStats};
use serde::{de, Deserialize, Deserializer, Serialize};
use serde_json::json;
use tower::ServiceBuilder;
use tower_http::cors::CorsLayer;
use tower_http::timeout::TimeoutLayer;
use tower_http::trace::TraceLayer;
use tracing::debug;

use crate::error::ApiResult;
use crate::state::AppState;

const INDEX_HTML: &str = include_str!("../static/index.html");

/// Build the application router
pub fn build_router(state: AppState) -> Router {
    let cors = if state.config.server.enable_cors {
        let origins = state.config.server.cors_origins
            .iter()
            .filter_map(|s| s.parse::<HeaderValue>().ok())
            .collect::<Vec<_>>();

        CorsLayer::new()
            .allow_origin(origins)
            .allow_methods([Method::GET, Method::OPTIONS])
            .allow_headers([header::CONTENT_TYPE])
    } else {
        // Same-origin only
        CorsLayer::new()
    };

    let request_timeout = Duration::from_secs(state.config.server.request_timeout_secs);

    Router::new()
        .route("/", get(index_handler))
        .route("/api/files", get(files_handler))
        .route("/api/logs", get(logs_handler))
        .route("/api/stats", get(stats_handler))
        .route("/health", get(health_handler))
        .route("/metrics", get(metrics_handler))
        .layer(
            ServiceBuilder::new()
                .layer(TraceLayer::new_for_http())
                .layer(TimeoutLayer::with_status_code(StatusCode::REQUEST_TIMEOUT, request_timeout))
                .layer(cors)
        )
        .with_state(state)
}

async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}

#[derive(Debug, Serialize)]
struct FilesResponse {
    files: Vec<LogFileEntry>,
}

/// GET /api/files: every log file under the root, newest first
async fn files_handler(State(state): State<AppState>) -> ApiResult<Json<FilesResponse>> {
    let files = list_files(&state).await?;
    Ok(Json(FilesResponse { files }))
}

/// GET /api/stats: file count and total size of the same listing
async fn stats_handler(State(state): State<AppState>) -> ApiResult<Json<LogStats>> {
    let files = list_files(&state).await?;
    Ok(Json(LogStats::from_entries(&files)))
}

async fn list_files(state: &AppState) -> ApiResult<Vec<LogFileEntry>> {
    state.metrics.listing();

    let pipeline = state.pipeline.clone();
    let extension = state.config.logs.file_extension.clone();
    let files = tokio::task::spawn_blocking(move || {
        inventory::scan(pipeline.guard().root(), &extension)
    })
    .await?;

    debug!(count = files.len(), "Listed log files");
    Ok(files)
}

#[derive(Debug, Default, Deserialize)]
pub struct LogsQuery {
    pub file: Option<String>,
    #[serde(default, deserialize_with = "deserialize_lines")]
    pub lines: Option<i64>,
    #[serde(default)]
    pub search: String,
    #[serde(default)]
    pub level: String,
}

fn deserialize_lines<'de, D>(deserializer: D) -> Result<Option<i64>, D::Error>
where
    D: Deserializer<'de>,
{
    let raw = String::deserialize(deserializer)?;
    parse_line_count(&raw)
        .map(Some)
        .ok_or_else(|| de::Error::custom(format!("invalid line count: {raw:?}")))
}

/// Parse a signed decimal line count. Integers outside `i64` saturate, so an
/// oversized request is clamped later instead of rejected here.
fn parse_line_count(raw: &str) -> Option<i64> {
    let raw = raw.trim();
    if let Ok(n) = raw.parse::<i64>() {
        return Some(n);
    }

    let (negative, digits) = match raw.strip_prefix('-') {
        Some(digits) => (true, digits),
        None => (false, raw.strip_prefix('+').unwrap_or(raw)),
    };
    if digits.is_empty() || !digits.bytes().all(|b| b.is_ascii_digit()) {
        return None;
    }

    Some(if negative { i64::MIN } else { i64::MAX })
}

#[derive(Debug, Serialize)]
struct LogsResponse {
    file: String,
    count: usize,
    logs: Vec<LogRecord>,
}

/// GET /api/logs: tail, parse and filter one file
async fn logs_handler(
    State(state): State<AppState>,
    Query(query): Query<LogsQuery>,
) -> ApiResult<Json<LogsResponse>> {
    state.metrics.log_request();

    let file = query.file.unwrap_or_else(|| state.config.logs.default_file.clone());
    let lines = query.lines
        .unwrap_or(state.config.logs.default_lines as i64);

    let pipeline = state.pipeline.clone();
    let file_ref = file.clone();
    let result = tokio::task::spawn_blocking(move || {
        pipeline.resolve_and_tail(&file_ref, lines, &query.search, &query.level)
    })
    .await?;

    let logs = result.inspect_err(|e| {
        if matches!(e, GuardError::PathEscape { .. }) {
            state.metrics.path_rejected();
        }
    })?;

    state.metrics.records_served(logs.len());
    Ok(Json(LogsResponse {
        file,
        count: logs.len(),
        logs,
    }))
}

/// Health check - reports whether the log root is present
async fn health_handler(State(state): State<AppState>) -> impl IntoResponse {
    let root = state.pipeline.guard().root();
    let exists = root.is_dir();

    Json(json!({
        "status": if exists { "healthy" } else { "degraded" },
        "timestamp": chrono::Utc::now().to_rfc3339(),
        "log_dir": {
            "path": root.display().to_string(),
            "exists": exists
        }
    }))
}

async fn metrics_handler(State(state): State<AppState>) -> impl IntoResponse {
    let metrics = &state.metrics;

    Json(json!({
        "logs": {
            "requests": metrics.log_requests(),
            "rejected_paths": metrics.rejected_paths(),
            "records_served": metrics.total_records_served()
        },
        "listings": metrics.listings()
    }))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::ViewerConfig;
    use axum::body::Body;
    use axum::http::Request;
    use http_body_util::BodyExt;
    use serde_json::Value;
    use std::fs;
    use tower::ServiceExt;

    const ALL_REMOTE: &str = "\
Jan  5 03:14:00 host1 sshd: Server listening on 0.0.0.0 port 22
Jan  5 03:14:07 host1 sshd: Accepted publickey for root
random unstructured text

Jan  5 03:14:09 host2 kernel: ERROR disk sda failing
Jan  5 03:14:10 host2 app[12]: warn: cache miss
";

    struct Fixture {
        _dir: tempfile::TempDir,
        root: std::path::PathBuf,
        state: AppState,
    }

    fn fixture() -> Fixture {
        let dir = tempfile::tempdir().unwrap();
        let root = dir.path().join("remote");
        fs::create_dir_all(root.join("hosts")).unwrap();
        fs::write(root.join("all-remote.log"), ALL_REMOTE).unwrap();
        fs::write(root.join("hosts/host1.log"), "Jan  5 03:14:07 host1 sshd: hello\n").unwrap();
        fs::write(root.join("hosts/ignored.txt"), "not a log").unwrap();

        let mut config = ViewerConfig::default();
        config.logs.root_dir = root.display().to_string();
        let state = AppState::new(config).unwrap();

        Fixture { _dir: dir, root, state }
    }

    async fn get(state: &AppState, uri: &str) -> (StatusCode, Value) {
        let response = build_router(state.clone())
            .oneshot(Request::builder().uri(uri).body(Body::empty()).unwrap())
            .await
            .unwrap();

        let status = response.status();
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let body = serde_json::from_slice(&bytes).unwrap_or(Value::Null);
        (status, body)
    }

    // ── /api/logs ───────────────────────────────────────────────

    #[tokio::test]
    async fn test_logs_default_file() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file"], "all-remote.log");
        assert_eq!(body["count"], 5);
        assert_eq!(body["logs"].as_array().unwrap().len(), 5);

        let first = &body["logs"][0];
        assert_eq!(first["timestamp"], "Jan  5 03:14:00");
        assert_eq!(first["hostname"], "host1");
        assert_eq!(first["tag"], "sshd");

        let plain = &body["logs"][2];
        assert_eq!(plain["timestamp"], "");
        assert_eq!(plain["message"], "random unstructured text");
        assert_eq!(plain["raw"], "random unstructured text");
    }

    #[tokio::test]
    async fn test_logs_tail_and_filters() {
        let fx = fixture();

        let (_, body) = get(&fx.state, "/api/logs?file=all-remote.log&lines=2").await;
        assert_eq!(body["count"], 2);
        assert_eq!(body["logs"][0]["tag"], "kernel");
        assert_eq!(body["logs"][1]["tag"], "app[12]");

        let (_, body) = get(&fx.state, "/api/logs?level=ERROR").await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["logs"][0]["hostname"], "host2");

        let (_, body) = get(&fx.state, "/api/logs?search=sshd&level=accepted").await;
        assert_eq!(body["count"], 1);
        assert_eq!(body["logs"][0]["message"], "Accepted publickey for root");
    }

    #[tokio::test]
    async fn test_logs_nested_file() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs?file=hosts/host1.log").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["file"], "hosts/host1.log");
        assert_eq!(body["logs"][0]["message"], "hello");
    }

    #[tokio::test]
    async fn test_logs_missing_file_is_empty() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs?file=nope.log").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 0);
        assert_eq!(body["logs"], json!([]));
    }

    #[tokio::test]
    async fn test_logs_traversal_forbidden() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs?file=../../etc/passwd").await;

        assert_eq!(status, StatusCode::FORBIDDEN);
        assert_eq!(body["error"], "Invalid file path");
        assert_eq!(fx.state.metrics.rejected_paths(), 1);
    }

    #[tokio::test]
    async fn test_logs_absolute_outside_forbidden() {
        let fx = fixture();
        let (status, _) = get(&fx.state, "/api/logs?file=/etc/passwd").await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logs_sibling_prefix_forbidden() {
        let fx = fixture();
        let sibling = format!("{}-other/x.log", fx.state.pipeline.guard().root().display());
        let uri = format!("/api/logs?file={}", sibling);
        let (status, _) = get(&fx.state, &uri).await;
        assert_eq!(status, StatusCode::FORBIDDEN);
    }

    #[tokio::test]
    async fn test_logs_read_failure_in_band() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs?file=hosts").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        let message = body["logs"][0]["message"].as_str().unwrap();
        assert!(message.starts_with("Error reading file:"));
        assert_eq!(body["logs"][0]["raw"], "");
    }

    #[tokio::test]
    async fn test_logs_non_positive_lines_clamped() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/logs?lines=-3").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["logs"][0]["tag"], "app[12]");
    }

    #[tokio::test]
    async fn test_logs_non_numeric_lines_rejected() {
        let fx = fixture();
        let (status, _) = get(&fx.state, "/api/logs?lines=lots").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);

        let (status, _) = get(&fx.state, "/api/logs?lines=12abc").await;
        assert_eq!(status, StatusCode::BAD_REQUEST);
    }

    #[tokio::test]
    async fn test_logs_oversized_lines_clamped() {
        let fx = fixture();

        let (status, body) = get(&fx.state, "/api/logs?lines=99999999999999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 5);

        let (status, body) = get(&fx.state, "/api/logs?lines=-99999999999999999999").await;
        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["count"], 1);
        assert_eq!(body["logs"][0]["tag"], "app[12]");
    }

    #[test]
    fn test_parse_line_count() {
        assert_eq!(parse_line_count("250"), Some(250));
        assert_eq!(parse_line_count(" -3 "), Some(-3));
        assert_eq!(parse_line_count("+7"), Some(7));
        assert_eq!(parse_line_count("99999999999999999999"), Some(i64::MAX));
        assert_eq!(parse_line_count("-99999999999999999999"), Some(i64::MIN));
        assert_eq!(parse_line_count(""), None);
        assert_eq!(parse_line_count("-"), None);
        assert_eq!(parse_line_count("1e20"), None);
        assert_eq!(parse_line_count("lots"), None);
    }

    // ── /api/files and /api/stats ───────────────────────────────

    #[tokio::test]
    async fn test_files_lists_logs_only() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/files").await;

        assert_eq!(status, StatusCode::OK);
        let files = body["files"].as_array().unwrap();
        assert_eq!(files.len(), 2);

        let mut paths: Vec<&str> = files.iter().map(|f| f["path"].as_str().unwrap()).collect();
        paths.sort();
        let nested = std::path::Path::new("hosts").join("host1.log");
        assert_eq!(paths, vec!["all-remote.log", nested.to_str().unwrap()]);

        for file in files {
            assert!(file["full_path"].as_str().unwrap().starts_with(fx.state.pipeline.guard().root().to_str().unwrap()));
            assert!(file["size"].as_u64().unwrap() > 0);
            assert!(file["modified"].is_string());
        }
    }

    #[tokio::test]
    async fn test_stats_totals() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/api/stats").await;

        let expected = fs::metadata(fx.root.join("all-remote.log")).unwrap().len()
            + fs::metadata(fx.root.join("hosts/host1.log")).unwrap().len();

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["total_files"], 2);
        assert_eq!(body["total_size"], expected);
        assert_eq!(body["total_size_mb"], 0.0);
    }

    // ── misc ────────────────────────────────────────────────────

    #[tokio::test]
    async fn test_index_served() {
        let fx = fixture();
        let response = build_router(fx.state.clone())
            .oneshot(Request::builder().uri("/").body(Body::empty()).unwrap())
            .await
            .unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        let bytes = response.into_body().collect().await.unwrap().to_bytes();
        let html = String::from_utf8(bytes.to_vec()).unwrap();
        assert!(html.contains("/api/logs"));
    }

    #[tokio::test]
    async fn test_health_reports_root() {
        let fx = fixture();
        let (status, body) = get(&fx.state, "/health").await;

        assert_eq!(status, StatusCode::OK);
        assert_eq!(body["status"], "healthy");
        assert_eq!(body["log_dir"]["exists"], true);
    }

    #[tokio::test]
    async fn test_metrics_count_requests() {
        let fx = fixture();
        get(&fx.state, "/api/logs?lines=2").await;
        get(&fx.state, "/api/logs?file=../secret").await;
        get(&fx.state, "/api/files").await;

        let (_, body) = get(&fx.state, "/metrics").await;
        assert_eq!(body["logs"]["requests"], 2);
        assert_eq!(body["logs"]["rejected_paths"], 1);
        assert_eq!(body["logs"]["records_served"], 2);
        assert_eq!(body["listings"], 1);
    }
}
