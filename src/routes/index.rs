use askama::Template;
use axum::response::{Html, IntoResponse, Response};

use crate::error::InternalError;

#[derive(Template)]
#[template(path = "index.html")]
struct IndexTemplate {}

// The page fetches its readings from the JSON endpoints itself.
pub async fn get_index() -> Result<Response, InternalError> {
    let content = IndexTemplate {}
        .render()
        .map_err(|err| InternalError::new(format!("Failed to render index page: {err}")))?;
    Ok(Html(content).into_response())
}
