// Copyright 2025 Sushanth (https://github.com/sushanthpy)
//
// This program is free software: you can redistribute it and/or modify
// it under the terms of the GNU Affero General Public License as published by
// the Free Software Foundation, either version 3 of the License, or
// (at your option) any later version.
//
// This program is distributed in the hope that it will be useful,
// but WITHOUT ANY WARRANTY; without even the implied warranty of
// MERCHANTABILITY or FITNESS FOR A PARTICULAR PURPOSE. See the
// GNU Affero General Public License for more details.
//
// You should have received a copy of the GNU Affero General Public License
// along with this program. If not, see <https://www.gnu.org/licenses/>.

//! HTTP API
//!
//! The only place where error kinds are mapped to status codes.

pub mod health;
pub mod page_load;
pub mod statistics;

use crate::directory::USER_UUID_HEADER;
use crate::service::StatisticsService;
use axum::{
    extract::rejection::JsonRejection,
    http::{HeaderMap, StatusCode},
    response::{IntoResponse, Response},
    routing::{get, post},
    Json, Router,
};
use pagestats_core::PagestatsError;
use serde::{Deserialize, Serialize};
use std::sync::Arc;
use std::time::Instant;
use thiserror::Error;

pub use health::{health_check, liveness};
pub use page_load::record_page_load;
pub use statistics::{
    get_article_statistics, get_day_statistics, get_page_statistics, get_statistics,
};

/// API error type
#[derive(Debug, Error)]
pub enum ApiError {
    #[error("userUuid required in the header")]
    IdentityRequired,

    #[error("User needs to be an admin")]
    Forbidden,

    #[error("Missing parameter {0}")]
    MissingParameter(String),

    #[error("Invalid parameter {name}: {reason}")]
    InvalidParameter { name: String, reason: String },

    #[error("{0}")]
    InvalidBody(#[from] JsonRejection),

    #[error("Internal server error: {0}")]
    Internal(String),
}

impl From<PagestatsError> for ApiError {
    fn from(err: PagestatsError) -> Self {
        match err {
            PagestatsError::IdentityRequired => ApiError::IdentityRequired,
            PagestatsError::ForbiddenOperation => ApiError::Forbidden,
            PagestatsError::MissingParameter(name) => ApiError::MissingParameter(name),
            PagestatsError::InvalidParameter { name, reason } => {
                ApiError::InvalidParameter { name, reason }
            }
            other => ApiError::Internal(other.to_string()),
        }
    }
}

impl IntoResponse for ApiError {
    fn into_response(self) -> Response {
        let status = match &self {
            ApiError::IdentityRequired => StatusCode::BAD_REQUEST,
            ApiError::Forbidden => StatusCode::FORBIDDEN,
            ApiError::MissingParameter(_) => StatusCode::BAD_REQUEST,
            ApiError::InvalidParameter { .. } => StatusCode::BAD_REQUEST,
            ApiError::InvalidBody(rejection) => rejection.status(),
            ApiError::Internal(_) => StatusCode::INTERNAL_SERVER_ERROR,
        };

        if status.is_server_error() {
            tracing::error!(status = status.as_u16(), "{}", self);
        } else {
            tracing::warn!(status = status.as_u16(), "{}", self);
        }

        (
            status,
            Json(ErrorResponse {
                error: self.to_string(),
            }),
        )
            .into_response()
    }
}

#[derive(Debug, Serialize, Deserialize)]
pub struct ErrorResponse {
    pub error: String,
}

/// Shared application state
#[derive(Clone)]
pub struct AppState {
    pub service: Arc<StatisticsService>,
    pub started_at: Instant,
}

impl AppState {
    pub fn new(service: Arc<StatisticsService>) -> Self {
        Self {
            service,
            started_at: Instant::now(),
        }
    }
}

/// The caller identity sent in the `userUuid` header, if any
pub(crate) fn caller_id(headers: &HeaderMap) -> Option<&str> {
    headers
        .get(USER_UUID_HEADER)
        .and_then(|value| value.to_str().ok())
}

/// Read-only routes; `build_app` bounds them with the request timeout
pub fn read_routes() -> Router<AppState> {
    Router::new()
        .route("/", get(liveness))
        .route("/health", get(health_check))
        .route("/statistics", get(get_statistics))
        .route("/statistics/articles", get(get_article_statistics))
        .route("/statistics/day/:day", get(get_day_statistics))
        .route("/statistics/:page_key", get(get_page_statistics))
}

/// Routes that append to the store; they run to completion
pub fn write_routes() -> Router<AppState> {
    Router::new().route("/page-load", post(record_page_load))
}

/// All routes, without transport layers (CORS, tracing, timeouts)
pub fn router(state: AppState) -> Router {
    read_routes().merge(write_routes()).with_state(state)
}
