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

//! Statistics endpoints and their wire schema
//!
//! `lastYearViewsCount` and `lastYearUsersCount` are always present in
//! per-page rows; they are `null` unless the report is the article report.

use axum::{
    extract::{Path, State},
    http::HeaderMap,
    Json,
};
use chrono::NaiveDate;
use pagestats_core::{Aggregate, DailyAggregate};
use serde::{Deserialize, Serialize};

use crate::api::{caller_id, ApiError, AppState};
use crate::service::{require_identity, DayStatisticsReport, PageStatistics, StatisticsReport};

const DAY_FORMAT: &str = "%Y-%m-%d";

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct StatisticsJson {
    pub per_page: Vec<PageStatisticsJson>,
    pub per_day: Vec<DailyStatisticsJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageStatisticsJson {
    pub page_key: String,
    #[serde(rename = "last30DaysViewsCount")]
    pub last_30_days_views_count: u64,
    #[serde(rename = "last30DaysUsersCount")]
    pub last_30_days_users_count: u64,
    pub last_year_views_count: Option<u64>,
    pub last_year_users_count: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DailyStatisticsJson {
    pub date: NaiveDate,
    pub views_count: u64,
    pub users_count: u64,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct DayStatisticsJson {
    pub per_page: Vec<PageViewsJson>,
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct PageViewsJson {
    pub page_key: String,
    pub views_count: u64,
    pub users_count: u64,
}

impl From<PageStatistics> for PageStatisticsJson {
    fn from(row: PageStatistics) -> Self {
        Self {
            page_key: row.page_key,
            last_30_days_views_count: row.short.views_count,
            last_30_days_users_count: row.short.distinct_user_count,
            last_year_views_count: row.long.map(|c| c.views_count),
            last_year_users_count: row.long.map(|c| c.distinct_user_count),
        }
    }
}

impl From<DailyAggregate> for DailyStatisticsJson {
    fn from(row: DailyAggregate) -> Self {
        Self {
            date: row.date,
            views_count: row.views_count,
            users_count: row.distinct_user_count,
        }
    }
}

impl From<Aggregate> for PageViewsJson {
    fn from(row: Aggregate) -> Self {
        Self {
            page_key: row.page_key,
            views_count: row.views_count,
            users_count: row.distinct_user_count,
        }
    }
}

impl From<StatisticsReport> for StatisticsJson {
    fn from(report: StatisticsReport) -> Self {
        Self {
            per_page: report.per_page.into_iter().map(Into::into).collect(),
            per_day: report.per_day.into_iter().map(Into::into).collect(),
        }
    }
}

impl From<DayStatisticsReport> for DayStatisticsJson {
    fn from(report: DayStatisticsReport) -> Self {
        Self {
            per_page: report.per_page.into_iter().map(Into::into).collect(),
        }
    }
}

/// GET /statistics - Last 30 days across all pages
pub async fn get_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatisticsJson>, ApiError> {
    let report = state.service.overall_statistics(caller_id(&headers)).await?;
    Ok(Json(report.into()))
}

/// GET /statistics/articles - Article pages, last 30 days and last year
pub async fn get_article_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
) -> Result<Json<StatisticsJson>, ApiError> {
    let report = state.service.article_statistics(caller_id(&headers)).await?;
    Ok(Json(report.into()))
}

/// GET /statistics/:page_key - Last 30 days for one page
pub async fn get_page_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(page_key): Path<String>,
) -> Result<Json<StatisticsJson>, ApiError> {
    let report = state
        .service
        .page_statistics(caller_id(&headers), &page_key)
        .await?;
    Ok(Json(report.into()))
}

/// GET /statistics/day/:day - Per-page views on one UTC day (`yyyy-MM-dd`)
pub async fn get_day_statistics(
    State(state): State<AppState>,
    headers: HeaderMap,
    Path(day): Path<String>,
) -> Result<Json<DayStatisticsJson>, ApiError> {
    let caller = caller_id(&headers);
    require_identity(caller)?;
    let date = NaiveDate::parse_from_str(&day, DAY_FORMAT)
        .map_err(|_| ApiError::MissingParameter("day".to_string()))?;

    let report = state.service.day_statistics(caller, date).await?;
    Ok(Json(report.into()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pagestats_core::Counts;
    use serde_json::json;

    #[test]
    fn test_last_year_fields_are_null_when_absent() {
        let row = PageStatisticsJson::from(PageStatistics {
            page_key: "p1".to_string(),
            short: Counts::new(3, 1),
            long: None,
        });
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({
                "pageKey": "p1",
                "last30DaysViewsCount": 3,
                "last30DaysUsersCount": 1,
                "lastYearViewsCount": null,
                "lastYearUsersCount": null,
            })
        );
    }

    #[test]
    fn test_article_row_carries_both_windows() {
        let row = PageStatisticsJson::from(PageStatistics {
            page_key: "kta-article-key".to_string(),
            short: Counts::new(3, 1),
            long: Some(Counts::new(5, 2)),
        });
        let value = serde_json::to_value(&row).unwrap();
        assert_eq!(value["lastYearViewsCount"], 5);
        assert_eq!(value["lastYearUsersCount"], 2);
    }

    #[test]
    fn test_daily_row_shape() {
        let row = DailyStatisticsJson::from(DailyAggregate::new(
            NaiveDate::from_ymd_opt(2007, 12, 3).unwrap(),
            4,
            2,
        ));
        assert_eq!(
            serde_json::to_value(&row).unwrap(),
            json!({"date": "2007-12-03", "viewsCount": 4, "usersCount": 2})
        );
    }
}
