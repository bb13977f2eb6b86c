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

pub mod api;
pub mod config;
pub mod directory;
pub mod service;

use anyhow::Result;
use axum::{http::HeaderName, Router};
use std::sync::Arc;
use std::time::Duration;
use tower_http::{
    cors::{Any, CorsLayer},
    timeout::TimeoutLayer,
    trace::TraceLayer,
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

use api::AppState;
use config::{ServerConfig, StorageBackend};
use directory::{HttpUserDirectory, StaticUserDirectory, UserDirectory};
use pagestats_core::{SystemTimeSource, UuidIdSource};
use pagestats_storage::{EventStore, FileEventStore, MemoryEventStore};
use service::StatisticsService;

/// Open the configured event store
pub fn open_store(config: &ServerConfig) -> Result<Arc<dyn EventStore>> {
    let store: Arc<dyn EventStore> = match config.storage.backend {
        StorageBackend::Memory => {
            tracing::warn!("Using in-memory event store; page loads are lost on restart");
            Arc::new(MemoryEventStore::new())
        }
        StorageBackend::File => {
            tracing::info!("Opening event store at: {:?}", config.storage.data_dir);
            Arc::new(FileEventStore::open(&config.storage.data_dir)?)
        }
    };
    Ok(store)
}

/// Build the configured user directory
pub fn build_directory(config: &ServerConfig) -> Result<Arc<dyn UserDirectory>> {
    let directory: Arc<dyn UserDirectory> = if config.directory.static_admins.is_empty() {
        tracing::info!("User directory: {}", config.directory.base_url);
        Arc::new(HttpUserDirectory::new(
            &config.directory.base_url,
            config.directory.admin_tag.clone(),
            config.directory.timeout(),
        )?)
    } else {
        tracing::info!(
            "User directory: {} static admin(s)",
            config.directory.static_admins.len()
        );
        Arc::new(StaticUserDirectory::new(
            config.directory.static_admins.iter().cloned(),
        ))
    };
    Ok(directory)
}

/// Wire the statistics service with production collaborators
pub fn build_service(config: &ServerConfig) -> Result<StatisticsService> {
    let service = StatisticsService::new(
        open_store(config)?,
        build_directory(config)?,
        Arc::new(SystemTimeSource),
        Arc::new(UuidIdSource),
        config.statistics.clone(),
        config.storage.operation_timeout(),
    )?;
    Ok(service)
}

/// Routes plus transport layers; the request timeout covers reads only
pub fn build_app(state: AppState, config: &ServerConfig) -> Router {
    let cors = if config.server.enable_cors {
        CorsLayer::new()
            .allow_origin(Any)
            .allow_methods(Any)
            .allow_headers([
                HeaderName::from_static("useruuid"),
                axum::http::header::CONTENT_TYPE,
            ])
    } else {
        CorsLayer::new()
    };

    let reads = api::read_routes().layer(TimeoutLayer::new(Duration::from_secs(
        config.server.request_timeout_secs,
    )));

    reads
        .merge(api::write_routes())
        .with_state(state)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
}

pub async fn run_server(config: ServerConfig) -> Result<()> {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pagestats_server=info,pagestats_storage=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    tracing::info!("Starting Pagestats Server");
    tracing::info!("Configuration: {:#?}", config);

    // Validate configuration
    config.validate()?;

    let service = Arc::new(build_service(&config)?);
    let app = build_app(AppState::new(service), &config);

    let addr = config.socket_addr()?;
    tracing::info!("Listening on http://{}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    tracing::info!("HTTP server stopped");
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        tracing::error!("Failed to listen for shutdown signal: {}", e);
        std::future::pending::<()>().await;
    }
    tracing::info!("Shutdown signal received");
}

#[cfg(test)]
mod tests {
    use super::*;
    use axum::body::Body;
    use axum::http::{Request, StatusCode};
    use pagestats_core::{
        EventFilter, ManualTimeSource, PageLoadEvent, SequentialIdSource, StatisticsConfig,
    };
    use tower::ServiceExt;

    /// Memory store whose appends take longer than the request timeout
    struct SlowAppendStore {
        inner: MemoryEventStore,
        delay: Duration,
    }

    impl EventStore for SlowAppendStore {
        fn append(&self, event: PageLoadEvent) -> pagestats_core::Result<()> {
            std::thread::sleep(self.delay);
            self.inner.append(event)
        }

        fn query(&self, filter: &EventFilter) -> pagestats_core::Result<Vec<PageLoadEvent>> {
            self.inner.query(filter)
        }

        fn len(&self) -> pagestats_core::Result<usize> {
            self.inner.len()
        }
    }

    #[tokio::test]
    async fn test_request_timeout_does_not_cut_off_appends() {
        let store = Arc::new(SlowAppendStore {
            inner: MemoryEventStore::new(),
            delay: Duration::from_millis(1500),
        });
        let service = StatisticsService::new(
            store.clone(),
            Arc::new(StaticUserDirectory::new(["admin"])),
            Arc::new(ManualTimeSource::new(chrono::Utc::now())),
            Arc::new(SequentialIdSource::default()),
            StatisticsConfig::default(),
            Duration::from_secs(5),
        )
        .unwrap();

        let mut config = ServerConfig::default();
        config.server.request_timeout_secs = 1;
        let app = build_app(AppState::new(Arc::new(service)), &config);

        let request = Request::builder()
            .method("POST")
            .uri("/page-load")
            .header("userUuid", "user-a")
            .header("Content-Type", "application/json")
            .body(Body::from(r#"{"pageKey":"p1"}"#))
            .unwrap();
        let response = app.oneshot(request).await.unwrap();

        assert_eq!(response.status(), StatusCode::OK);
        assert_eq!(store.len().unwrap(), 1);
    }

    #[test]
    fn test_config_validation() {
        let mut config = ServerConfig::default();
        config.storage.backend = StorageBackend::Memory;
        assert!(config.validate().is_ok());
    }

    #[test]
    fn test_build_service_with_file_store() {
        let dir = tempfile::TempDir::new().unwrap();
        let mut config = ServerConfig::default();
        config.storage.data_dir = dir.path().to_path_buf();
        config.directory.static_admins = vec!["admin".to_string()];

        build_service(&config).unwrap();
        assert!(dir.path().join("page_loads.log").exists());
    }
}
