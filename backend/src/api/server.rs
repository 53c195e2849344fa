//! HTTP server for the mForm parser API.
//!
//! # API Endpoints
//!
//! | Method | Path                  | Description                          |
//! |--------|-----------------------|--------------------------------------|
//! | GET    | `/`                   | Liveness message                     |
//! | GET    | `/health`             | Health check                         |
//! | POST   | `/api/forms/parse`    | Upload XLSForm, get the parsed form  |
//! | POST   | `/api/forms/validate` | Upload XLSForm, schema check only    |
//! | GET    | `/api/logs`           | SSE stream for real-time logs        |

use axum::{
    extract::{DefaultBodyLimit, Multipart, State},
    http::{header, HeaderValue, Method, StatusCode},
    response::{sse::Event, IntoResponse, Json, Response, Sse},
    routing::{get, post},
    Router,
};
use futures::stream::Stream;
use serde_json::{json, Value};
use std::{convert::Infallible, net::SocketAddr, time::Duration};
use tokio_stream::wrappers::BroadcastStream;
use tokio_stream::StreamExt as _;
use tower_http::cors::{AllowOrigin, CorsLayer};

use super::logs::{log_error, LOG_BROADCASTER};
use super::types::{error_response, ParseResponse, ValidateResponse};
use crate::config::ServerConfig;
use crate::error::{FormError, ServerError, ServerResult};
use crate::parser::{parse_bytes, ParseOptions};
use crate::schema::check_schema;
use crate::source::load_workbook;

#[derive(Clone)]
struct AppState {
    options: ParseOptions,
}

/// Start the HTTP server
pub async fn start_server(config: ServerConfig) -> ServerResult<()> {
    let app = router(&config);

    let addr = SocketAddr::from(([0, 0, 0, 0], config.port));
    println!("🚀 mForm parser running on http://localhost:{}", config.port);
    println!("   POST /api/forms/parse    - Upload XLSForm");
    println!("   POST /api/forms/validate - Check XLSForm structure");
    println!("   GET  /api/logs           - SSE log stream");
    println!("   GET  /health             - Health check");
    println!("   CORS origins: {}", config.cors_origins.join(", "));
    println!();

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}

/// Build the application router.
pub fn router(config: &ServerConfig) -> Router {
    let state = AppState {
        options: config.parse_options,
    };

    Router::new()
        .route("/", get(root))
        .route("/health", get(health))
        .route("/api/forms/parse", post(parse_form))
        .route("/api/forms/validate", post(validate_form))
        .route("/api/logs", get(sse_logs))
        .layer(DefaultBodyLimit::max(config.max_upload_bytes))
        .layer(cors_layer(config))
        .with_state(state)
}

fn cors_layer(config: &ServerConfig) -> CorsLayer {
    let origin = if config.allows_any_origin() {
        AllowOrigin::any()
    } else {
        let origins: Vec<HeaderValue> = config
            .cors_origins
            .iter()
            .filter_map(|o| HeaderValue::from_str(o).ok())
            .collect();
        AllowOrigin::list(origins)
    };

    CorsLayer::new()
        .allow_origin(origin)
        .allow_methods([Method::GET, Method::POST, Method::OPTIONS])
        .allow_headers([header::CONTENT_TYPE, header::ACCEPT])
        .expose_headers([header::CONTENT_TYPE])
}

async fn root() -> Json<Value> {
    Json(json!({ "message": "mForm Parser API is running" }))
}

/// Health check endpoint
async fn health() -> Json<Value> {
    Json(json!({
        "status": "healthy",
        "service": "mform",
        "version": env!("CARGO_PKG_VERSION"),
        "endpoints": {
            "parse": "POST /api/forms/parse",
            "validate": "POST /api/forms/validate",
            "logs": "GET /api/logs (SSE)"
        }
    }))
}

/// SSE endpoint for real-time log streaming
async fn sse_logs() -> Sse<impl Stream<Item = Result<Event, Infallible>>> {
    let rx = LOG_BROADCASTER.subscribe();

    let stream = BroadcastStream::new(rx).filter_map(|result| match result {
        Ok(entry) => {
            let json = serde_json::to_string(&entry).ok()?;
            Some(Ok(Event::default().data(json)))
        }
        Err(_) => None,
    });

    Sse::new(stream).keep_alive(
        axum::response::sse::KeepAlive::new()
            .interval(Duration::from_secs(15))
            .text("keep-alive"),
    )
}

/// The `file` field of a multipart upload.
struct Upload {
    file_name: Option<String>,
    bytes: Vec<u8>,
}

async fn read_upload(mut multipart: Multipart) -> ServerResult<Upload> {
    let mut upload = None;

    while let Some(field) = multipart
        .next_field()
        .await
        .map_err(|e| ServerError::BadRequest(format!("Multipart error: {}", e)))?
    {
        if field.name() != Some("file") {
            continue;
        }
        let file_name = field.file_name().map(str::to_string);
        let bytes = field
            .bytes()
            .await
            .map_err(|e| ServerError::BadRequest(format!("Read error: {}", e)))?
            .to_vec();
        upload = Some(Upload { file_name, bytes });
    }

    upload.ok_or_else(|| ServerError::BadRequest("No file provided".to_string()))
}

/// Parse an uploaded XLSForm
async fn parse_form(
    State(state): State<AppState>,
    multipart: Multipart,
) -> ServerResult<Json<ParseResponse>> {
    let upload = read_upload(multipart).await?;

    println!("\n{}", "=".repeat(70));
    println!(
        "📄 NEW UPLOAD: {} ({} bytes)",
        upload.file_name.as_deref().unwrap_or("unknown"),
        upload.bytes.len()
    );
    println!("{}\n", "=".repeat(70));

    let form = parse_bytes(&upload.bytes, &state.options)?;

    Ok(Json(ParseResponse::new(
        form,
        upload.file_name,
        upload.bytes.len(),
        state.options.nesting,
    )))
}

/// Run only the structure checks on an uploaded XLSForm
async fn validate_form(multipart: Multipart) -> ServerResult<Json<ValidateResponse>> {
    let upload = read_upload(multipart).await?;
    let source = load_workbook(&upload.bytes).map_err(FormError::from)?;

    let sheets = source.sheet_names().into_iter().map(str::to_string).collect();
    let error = check_schema(&source).err().map(|e| e.to_string());

    Ok(Json(ValidateResponse {
        valid: error.is_none(),
        sheets,
        error,
    }))
}

impl ServerError {
    fn status(&self) -> StatusCode {
        match self {
            ServerError::Form(FormError::Schema(_)) => StatusCode::UNPROCESSABLE_ENTITY,
            ServerError::Form(FormError::Source(_)) => StatusCode::BAD_REQUEST,
            ServerError::BadRequest(_) => StatusCode::BAD_REQUEST,
            ServerError::Io(_) => StatusCode::INTERNAL_SERVER_ERROR,
        }
    }

    fn kind(&self) -> &'static str {
        match self {
            ServerError::Form(e) => e.kind(),
            ServerError::BadRequest(_) => "bad_request",
            ServerError::Io(_) => "internal",
        }
    }
}

impl IntoResponse for ServerError {
    fn into_response(self) -> Response {
        log_error(format!("Request failed: {}", self));
        let body = error_response(self.kind(), &self.to_string());
        (self.status(), Json(body)).into_response()
    }
}
