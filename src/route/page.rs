use axum::response::Html;

/// The two-panel dashboard. Charts are drawn in the browser from the
/// `/analytics` payload.
pub async fn index() -> Html<&'static str> {
	Html(include_str!("../../assets/index.html"))
}
