use axum::response::Html;

const INDEX_HTML: &str = include_str!("../../templates/index.html");

/// GET /
/// The single-page resume scanner UI.
pub async fn index_handler() -> Html<&'static str> {
    Html(INDEX_HTML)
}
