use axum::{
    extract::{
        rejection::{JsonRejection, QueryRejection},
        Query, State,
    },
    http::StatusCode,
    Json,
};
use serde::Serialize;
use std::sync::Arc;
use tracing::{debug, error, warn};

use crate::counter::{Counter, CounterError};
use crate::models::{PageVisitStats, StatsQuery, Visit};

pub struct AppState {
    pub counter: Arc<dyn Counter>,
}

#[derive(Serialize)]
pub struct ErrorResponse {
    pub error: String,
}

#[derive(Serialize)]
pub struct SuccessResponse {
    pub message: String,
}

type ApiError = (StatusCode, Json<ErrorResponse>);

fn error_response(status: StatusCode, error: impl Into<String>) -> ApiError {
    (
        status,
        Json(ErrorResponse {
            error: error.into(),
        }),
    )
}

/// Register a visit to a page
pub async fn register_visit(
    State(state): State<Arc<AppState>>,
    payload: Result<Json<Visit>, JsonRejection>,
) -> Result<Json<SuccessResponse>, ApiError> {
    let Json(visit) = payload.map_err(|rejection| {
        let status = match &rejection {
            JsonRejection::MissingJsonContentType(_) => StatusCode::UNSUPPORTED_MEDIA_TYPE,
            JsonRejection::JsonDataError(_) | JsonRejection::JsonSyntaxError(_) => {
                StatusCode::BAD_REQUEST
            }
            other => other.status(),
        };
        warn!("Rejected visit registration ({}): {}", status, rejection);
        error_response(status, rejection.body_text())
    })?;

    match state.counter.add_visit(&visit.page, &visit.visitor_id) {
        Ok(()) => {
            debug!("Registered visit to {} by {}", visit.page, visit.visitor_id);
            Ok(Json(SuccessResponse {
                message: "visit registered".to_string(),
            }))
        }
        Err(e) => {
            error!("Failed to register visit to {}: {}", visit.page, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to register visit",
            ))
        }
    }
}

/// Unique visitors of the page named by the `url` query parameter
pub async fn get_visits(
    State(state): State<Arc<AppState>>,
    query: Result<Query<StatsQuery>, QueryRejection>,
) -> Result<Json<PageVisitStats>, ApiError> {
    let Query(query) = query.map_err(|rejection| {
        let status = rejection.status();
        warn!("Rejected visits query ({}): {}", status, rejection);
        error_response(status, rejection.body_text())
    })?;

    let page = match query.url {
        Some(url) if !url.is_empty() => url,
        _ => {
            return Err(error_response(
                StatusCode::BAD_REQUEST,
                "Missing 'url' query parameter",
            ))
        }
    };

    match state.counter.visits(&page) {
        Ok(unique_visitors) => {
            debug!("Page {} has {} unique visitors", page, unique_visitors);
            Ok(Json(PageVisitStats { unique_visitors }))
        }
        Err(CounterError::NotFound) => Err(error_response(
            StatusCode::NOT_FOUND,
            "No visits recorded for page",
        )),
        Err(e) => {
            error!("Failed to get visits for {}: {}", page, e);
            Err(error_response(
                StatusCode::INTERNAL_SERVER_ERROR,
                "Failed to get visits",
            ))
        }
    }
}

/// Health check endpoint
pub async fn health_check() -> Json<SuccessResponse> {
    Json(SuccessResponse {
        message: "OK".to_string(),
    })
}
