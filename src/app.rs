use axum::{Router, routing::get};
use std::path::Path;
use tower_http::services::ServeDir;
use tower_http::trace::TraceLayer;

use crate::database::WeatherStore;
use crate::routes::{index, weather};

// Anything that goes in here must be a handle or pointer that can be cloned.
// The underlying state itself should be shared.
#[derive(Clone)]
pub struct AppState {
    pub store: WeatherStore,
}

pub fn create_app(state: AppState, assets_path: &Path) -> Router {
    let mut app = Router::new()
        .route("/", get(index::get_index))
        .merge(weather::routes(state))
        .layer(TraceLayer::new_for_http());

    log::debug!("serving assets from {}", assets_path.display());
    let assets_service = ServeDir::new(assets_path);
    app = app.fallback_service(assets_service);
    app
}
