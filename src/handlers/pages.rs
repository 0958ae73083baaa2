//! Static pages: the upload form and the favicon.

use axum::http::header;
use axum::response::{Html, IntoResponse, Response};

const INDEX_HTML: &str = include_str!("../../static/index.html");

const FAVICON_SVG: &str = r##"<svg xmlns="http://www.w3.org/2000/svg" viewBox="0 0 16 16"><rect width="16" height="16" rx="3" fill="#2563eb"/><path d="M8 3a2 2 0 0 1 2 2v3a2 2 0 1 1-4 0V5a2 2 0 0 1 2-2zm-4 5a4 4 0 0 0 8 0h-1.2a2.8 2.8 0 1 1-5.6 0H4zm3.4 5.5h1.2V15H7.4z" fill="#fff"/></svg>"##;

pub async fn index() -> Html<&'static str> {
    Html(INDEX_HTML)
}

pub async fn favicon() -> Response {
    (
        [(header::CONTENT_TYPE, "image/svg+xml")],
        FAVICON_SVG,
    )
        .into_response()
}
