//! HTTP front end for the snippet rendering core.
//!
//! Documentation pipelines that are not written in Rust post captured
//! requests, captured responses and constraint queries as JSON and get the
//! rendering model or the selected descriptions back. The service keeps no
//! state.

use axum::{
    http::StatusCode,
    response::{IntoResponse, Response},
    routing::post,
    Json, Router,
};
use restdocs_core::{
    CapturedRequest, CapturedResponse, DescriptionQuery, PartContent, RenderError, RenderingModel,
    RequestRenderer, ResponseModel, ResponseRenderer,
};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tokio::net::TcpListener;
use tracing::{debug, info};

/// Response body of `POST /snippets/constraints`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Descriptions {
    pub descriptions: Vec<String>,
}

#[derive(Debug, Error)]
pub enum SnippetError {
    /// The service never reads server-local files on a client's behalf.
    #[error("file part `{0}` refers to a path on disk; send its bytes inline")]
    FileBackedPart(String),

    #[error(transparent)]
    Render(#[from] RenderError),
}

impl IntoResponse for SnippetError {
    fn into_response(self) -> Response {
        let status = match &self {
            SnippetError::FileBackedPart(_) => StatusCode::BAD_REQUEST,
            SnippetError::Render(RenderError::InvalidStatus { .. }) => {
                StatusCode::UNPROCESSABLE_ENTITY
            }
            SnippetError::Render(RenderError::PartRead { .. }) => {
                StatusCode::INTERNAL_SERVER_ERROR
            }
        };
        let body = serde_json::json!({ "error": self.to_string() });
        (status, Json(body)).into_response()
    }
}

pub fn app() -> Router {
    Router::new()
        .route("/snippets/http-request", post(render_http_request))
        .route("/snippets/http-response", post(render_http_response))
        .route("/snippets/constraints", post(select_constraint_descriptions))
}

pub async fn run(listener: TcpListener) -> Result<(), std::io::Error> {
    axum::serve(listener, app()).await
}

async fn render_http_request(
    Json(request): Json<CapturedRequest>,
) -> Result<Json<RenderingModel>, SnippetError> {
    if let Some(part) = request
        .parts
        .iter()
        .find(|part| matches!(part.content, PartContent::File(_)))
    {
        return Err(SnippetError::FileBackedPart(part.field_name.clone()));
    }
    let model = RequestRenderer::new().render(&request)?;
    info!(
        method = %model.method,
        path = %model.path_with_query,
        headers = model.headers.len(),
        "rendered http-request snippet"
    );
    Ok(Json(model))
}

async fn render_http_response(
    Json(response): Json<CapturedResponse>,
) -> Result<Json<ResponseModel>, SnippetError> {
    let model = ResponseRenderer::new().render(&response)?;
    info!(
        status = model.status_code,
        headers = model.headers.len(),
        "rendered http-response snippet"
    );
    Ok(Json(model))
}

async fn select_constraint_descriptions(Json(query): Json<DescriptionQuery>) -> Json<Descriptions> {
    let descriptions = query.select();
    debug!(
        constraints = query.constraints.len(),
        selected = descriptions.len(),
        "selected constraint descriptions"
    );
    Json(Descriptions { descriptions })
}
