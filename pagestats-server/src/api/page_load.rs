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

use axum::{
    extract::{rejection::JsonRejection, State},
    http::HeaderMap,
    http::StatusCode,
    Json,
};
use serde::{Deserialize, Serialize};

use crate::api::{caller_id, ApiError, AppState};
use crate::service::require_identity;

#[derive(Debug, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PostPageLoadRequest {
    pub page_key: String,
}

/// POST /page-load - Record a page view for the calling user
///
/// The identity header is checked before the body is decoded.
pub async fn record_page_load(
    State(state): State<AppState>,
    headers: HeaderMap,
    body: Result<Json<PostPageLoadRequest>, JsonRejection>,
) -> Result<StatusCode, ApiError> {
    let caller = require_identity(caller_id(&headers))?;
    let Json(request) = body?;

    state
        .service
        .record_page_load(Some(caller), &request.page_key)
        .await?;
    Ok(StatusCode::OK)
}
