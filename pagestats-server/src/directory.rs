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

//! User directory
//!
//! Answers one question: is this user an admin? The statistics service never
//! caches the answer; every read request asks again.

use async_trait::async_trait;
use pagestats_core::{PagestatsError, Result};
use reqwest::header::{HeaderMap, HeaderValue, ACCEPT, ACCEPT_LANGUAGE};
use reqwest::Url;
use serde::Deserialize;
use std::collections::HashSet;
use std::time::Duration;

/// Header carrying the caller's user id, both inbound and towards the user service
pub const USER_UUID_HEADER: &str = "userUuid";

#[async_trait]
pub trait UserDirectory: Send + Sync {
    /// Whether `user_id` holds admin rights
    ///
    /// Lookup failures are errors, never a "not admin" answer.
    async fn is_admin(&self, user_id: &str) -> Result<bool>;
}

/// Fixed set of admin ids, for tests and local development
#[derive(Debug, Clone, Default)]
pub struct StaticUserDirectory {
    admins: HashSet<String>,
}

impl StaticUserDirectory {
    pub fn new<I, S>(admins: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        Self {
            admins: admins.into_iter().map(Into::into).collect(),
        }
    }
}

#[async_trait]
impl UserDirectory for StaticUserDirectory {
    async fn is_admin(&self, user_id: &str) -> Result<bool> {
        Ok(self.admins.contains(user_id))
    }
}

#[derive(Debug, Deserialize)]
struct UserJson {
    #[serde(default)]
    tags: Vec<String>,
}

/// Client for the remote user service (`GET {base_url}/user/me`)
#[derive(Debug, Clone)]
pub struct HttpUserDirectory {
    client: reqwest::Client,
    me_url: Url,
    admin_tag: String,
}

fn directory_error(context: &str, err: impl std::fmt::Display) -> PagestatsError {
    PagestatsError::Directory(format!("{}: {}", context, err))
}

impl HttpUserDirectory {
    pub fn new(base_url: &str, admin_tag: impl Into<String>, timeout: Duration) -> Result<Self> {
        // Without the trailing slash `join` would replace the last path segment
        let base = if base_url.ends_with('/') {
            base_url.to_string()
        } else {
            format!("{}/", base_url)
        };
        let me_url = Url::parse(&base)
            .and_then(|url| url.join("user/me"))
            .map_err(|e| directory_error("invalid user service URL", e))?;

        let mut headers = HeaderMap::new();
        headers.insert(ACCEPT, HeaderValue::from_static("application/json"));
        headers.insert(ACCEPT_LANGUAGE, HeaderValue::from_static("en"));

        let client = reqwest::Client::builder()
            .connect_timeout(timeout)
            .timeout(timeout)
            .default_headers(headers)
            .build()
            .map_err(|e| directory_error("failed to build HTTP client", e))?;

        Ok(Self {
            client,
            me_url,
            admin_tag: admin_tag.into(),
        })
    }

    pub fn me_url(&self) -> &Url {
        &self.me_url
    }
}

#[async_trait]
impl UserDirectory for HttpUserDirectory {
    async fn is_admin(&self, user_id: &str) -> Result<bool> {
        let response = self
            .client
            .get(self.me_url.clone())
            .header(USER_UUID_HEADER, user_id)
            .send()
            .await
            .map_err(|e| directory_error("user service request failed", e))?
            .error_for_status()
            .map_err(|e| directory_error("user service rejected request", e))?;

        let user: UserJson = response
            .json()
            .await
            .map_err(|e| directory_error("invalid user service response", e))?;

        Ok(user.tags.iter().any(|tag| tag == &self.admin_tag))
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::{http::HeaderMap as AxumHeaders, http::StatusCode, routing::get, Json, Router};
    use serde_json::json;

    /// Serve a fake `/user/me` on an ephemeral port and return its base URL
    async fn spawn_user_service() -> String {
        async fn me(headers: AxumHeaders) -> std::result::Result<Json<serde_json::Value>, StatusCode> {
            match headers.get("userUuid").and_then(|v| v.to_str().ok()) {
                Some("admin") => Ok(Json(json!({"tags": ["USER", "ADMIN"]}))),
                Some("plain") => Ok(Json(json!({"tags": ["USER"]}))),
                Some("untagged") => Ok(Json(json!({"name": "x"}))),
                _ => Err(StatusCode::NOT_FOUND),
            }
        }

        let app = Router::new().route("/api/user/me", get(me));
        let listener = tokio::net::TcpListener::bind("127.0.0.1:0").await.unwrap();
        let addr = listener.local_addr().unwrap();
        tokio::spawn(async move {
            axum::serve(listener, app).await.unwrap();
        });
        format!("http://{}/api", addr)
    }

    #[tokio::test]
    async fn test_static_directory() {
        let directory = StaticUserDirectory::new(["admin"]);
        assert!(directory.is_admin("admin").await.unwrap());
        assert!(!directory.is_admin("someone").await.unwrap());
    }

    #[test]
    fn test_me_url_resolution() {
        let timeout = Duration::from_secs(1);
        let with_slash = HttpUserDirectory::new("https://gapi.kt.academy/", "ADMIN", timeout).unwrap();
        assert_eq!(with_slash.me_url().as_str(), "https://gapi.kt.academy/user/me");

        let nested = HttpUserDirectory::new("http://localhost:9000/api", "ADMIN", timeout).unwrap();
        assert_eq!(nested.me_url().as_str(), "http://localhost:9000/api/user/me");

        assert!(HttpUserDirectory::new("not a url", "ADMIN", timeout).is_err());
    }

    #[tokio::test]
    async fn test_http_directory_reads_tags() {
        let base_url = spawn_user_service().await;
        let directory = HttpUserDirectory::new(&base_url, "ADMIN", Duration::from_secs(5)).unwrap();

        assert!(directory.is_admin("admin").await.unwrap());
        assert!(!directory.is_admin("plain").await.unwrap());
        assert!(!directory.is_admin("untagged").await.unwrap());
    }

    #[tokio::test]
    async fn test_http_directory_failure_is_an_error() {
        let base_url = spawn_user_service().await;
        let directory = HttpUserDirectory::new(&base_url, "ADMIN", Duration::from_secs(5)).unwrap();

        let result = directory.is_admin("unknown").await;
        assert!(matches!(result, Err(PagestatsError::Directory(_))));
    }
}
