use axum::extract::State;
use axum::{
    Json, Router,
    routing::{get, post},
};
use log::debug;

use crate::app::AppState;
use crate::error::InternalError;
use crate::models::reading::{Measurement, Reading};
use crate::sensor::generate_reading;

pub fn routes(state: AppState) -> Router {
    Router::new()
        .route("/add_data", post(add_data))
        .route("/get_data", get(get_data))
        .with_state(state)
}

/// Sample the sensor, store the sample and echo the measured values.
async fn add_data(State(state): State<AppState>) -> Result<Json<Measurement>, InternalError> {
    let measurement = generate_reading();
    let id = state
        .store
        .with_connection(move |connection| Reading::create(connection, &measurement))
        .await?;
    debug!("Stored reading {id}: {measurement:?}");
    Ok(Json(measurement))
}

async fn get_data(State(state): State<AppState>) -> Result<Json<Vec<Reading>>, InternalError> {
    let readings = state.store.with_connection(Reading::fetch_all).await?;
    debug!("Fetched {} readings", readings.len());
    Ok(Json(readings))
}
