//! # HTTP Server
//!
//! Route table plus the listener. Routes:
//!
//! - `/health`
//! - `{api_prefix}/users` and sub-routes (see `user_routes`)

use std::future::Future;
use std::net::SocketAddr;
use std::sync::Arc;

use axum::{middleware, Router};
use tokio::net::TcpListener;
use tower::ServiceBuilder;
use tower_http::cors::{AllowOrigin, Any, CorsLayer};

use crate::observability::{log_event_with_fields, Event};
use crate::store::UserStore;

use super::config::HttpServerConfig;
use super::middleware::log_requests;
use super::observability_routes::health_routes;
use super::user_routes::{user_routes, UsersState};

/// HTTP server for the users API
pub struct HttpServer {
    config: HttpServerConfig,
    router: Router,
}

impl HttpServer {
    pub fn new(config: HttpServerConfig, users: UserStore) -> Self {
        let router = Self::build_router(&config, users);
        Self { config, router }
    }

    fn build_router(config: &HttpServerConfig, users: UserStore) -> Router {
        let database = users.database().clone();
        let api = user_routes(Arc::new(UsersState::new(users)));

        let cors = if config.cors_origins.is_empty() {
            CorsLayer::new()
                .allow_origin(Any)
                .allow_methods(Any)
                .allow_headers(Any)
        } else {
            let origins: Vec<_> = config
                .cors_origins
                .iter()
                .filter_map(|s| s.parse().ok())
                .collect();

            CorsLayer::new()
                .allow_origin(AllowOrigin::list(origins))
                .allow_methods(Any)
                .allow_headers(Any)
        };

        let router = Router::new().merge(health_routes(database));
        let router = if config.api_prefix.is_empty() {
            router.merge(api)
        } else {
            router.nest(&config.api_prefix, api)
        };

        router.layer(
            ServiceBuilder::new()
                .layer(middleware::from_fn(log_requests))
                .layer(cors),
        )
    }

    pub fn socket_addr(&self) -> String {
        self.config.socket_addr()
    }

    /// Get the router (for testing)
    pub fn router(self) -> Router {
        self.router
    }

    /// Serve until `shutdown` resolves
    pub async fn start<F>(self, shutdown: F) -> Result<(), std::io::Error>
    where
        F: Future<Output = ()> + Send + 'static,
    {
        let listener = TcpListener::bind(self.config.socket_addr()).await?;
        let addr: SocketAddr = listener.local_addr()?;

        log_event_with_fields(
            Event::Serving,
            &[
                ("addr", addr.to_string().as_str()),
                ("users_path", self.config.users_path().as_str()),
            ],
        );

        axum::serve(listener, self.router)
            .with_graceful_shutdown(shutdown)
            .await
    }
}
