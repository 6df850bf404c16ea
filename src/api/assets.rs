//! Embedded chat page and its static assets

use axum::{
    extract::Path,
    http::{header, StatusCode},
    response::{IntoResponse, Response},
};
use rust_embed::Embed;

#[derive(Embed)]
#[folder = "ui"]
struct Assets;

/// Serve an embedded file from the UI folder
pub async fn serve_static(Path(path): Path<String>) -> Response {
    embedded(&path).unwrap_or_else(|| (StatusCode::NOT_FOUND, "Not found").into_response())
}

/// The chat page itself
pub async fn serve_index() -> Response {
    embedded("index.html").unwrap_or_else(|| {
        (StatusCode::NOT_FOUND, "UI not found: ui/index.html is missing").into_response()
    })
}

fn embedded(path: &str) -> Option<Response> {
    let content = Assets::get(path)?;
    let mime = mime_guess::from_path(path).first_or_octet_stream();
    Some(
        (
            [(header::CONTENT_TYPE, mime.as_ref().to_string())],
            content.data.into_owned(),
        )
            .into_response(),
    )
}
