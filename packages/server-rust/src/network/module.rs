//! Server lifecycle with deferred startup.
//!
//! `new()` wires shared state, `start()` binds the listener, and `serve()`
//! accepts connections until the shutdown future resolves. Splitting bind from
//! serve lets callers learn the bound port (port 0) before traffic flows.

use std::future::Future;
use std::sync::Arc;

use axum::routing::get;
use axum::Router;
use tokio::net::TcpListener;
use tracing::info;

use super::config::{NetworkConfig, TlsConfig};
use super::handlers::{
    bootcamps_in_radius, create_bootcamp, delete_bootcamp, get_bootcamp, health_handler,
    list_bootcamps, liveness_handler, readiness_handler, update_bootcamp, AppState,
};
use super::middleware::{track_in_flight, with_http_layers};
use super::shutdown::ShutdownController;
use crate::traits::{BootcampStore, Geocoder};

/// Assembles the full router for `state`.
///
/// Routes:
/// - `GET /health`, `/health/live`, `/health/ready`
/// - `GET | POST /api/v1/bootcamps`
/// - `GET | PUT | PATCH | DELETE /api/v1/bootcamps/{id}`
/// - `GET /api/v1/bootcamps/radius/{zipcode}/{distance}`
///
/// API routes hold an in-flight guard; health probes do not.
pub fn build_router(state: AppState) -> Router {
    let api = Router::new()
        .route(
            "/bootcamps",
            get(list_bootcamps).post(create_bootcamp),
        )
        .route(
            "/bootcamps/{id}",
            get(get_bootcamp)
                .put(update_bootcamp)
                .patch(update_bootcamp)
                .delete(delete_bootcamp),
        )
        .route(
            "/bootcamps/radius/{zipcode}/{distance}",
            get(bootcamps_in_radius),
        )
        .layer(axum::middleware::from_fn_with_state(
            Arc::clone(&state.shutdown),
            track_in_flight,
        ));

    let router = Router::new()
        .route("/health", get(health_handler))
        .route("/health/live", get(liveness_handler))
        .route("/health/ready", get(readiness_handler))
        .nest("/api/v1", api);
    with_http_layers(router, &state.config).with_state(state)
}

/// Owns the listener and shared state of a running server.
pub struct NetworkModule {
    state: AppState,
    listener: Option<TcpListener>,
}

impl NetworkModule {
    /// Wires state without binding any port.
    #[must_use]
    pub fn new(
        config: NetworkConfig,
        store: Arc<dyn BootcampStore>,
        geocoder: Arc<dyn Geocoder>,
    ) -> Self {
        Self {
            state: AppState::new(store, geocoder, config),
            listener: None,
        }
    }

    #[must_use]
    pub fn shutdown_controller(&self) -> Arc<ShutdownController> {
        Arc::clone(&self.state.shutdown)
    }

    /// Binds the configured address and returns the bound port.
    ///
    /// # Errors
    ///
    /// Returns an error if the address cannot be bound.
    pub async fn start(&mut self) -> anyhow::Result<u16> {
        let config = &self.state.config;
        let addr = format!("{}:{}", config.host, config.port);
        let listener = TcpListener::bind(&addr).await?;
        let port = listener.local_addr()?.port();

        info!("TCP listener bound to {}:{}", config.host, port);

        self.listener = Some(listener);
        Ok(port)
    }

    /// Serves until `shutdown` resolves, then drains in-flight requests.
    ///
    /// # Errors
    ///
    /// Returns an error if `start()` was not called, if TLS material cannot be
    /// loaded, or on a fatal I/O error.
    pub async fn serve(
        self,
        shutdown: impl Future<Output = ()> + Send + 'static,
    ) -> anyhow::Result<()> {
        let Some(listener) = self.listener else {
            anyhow::bail!("start() must be called before serve()");
        };
        let shutdown_ctrl = Arc::clone(&self.state.shutdown);
        let config = Arc::clone(&self.state.config);
        let router = build_router(self.state);

        shutdown_ctrl.set_ready();

        if let Some(ref tls_config) = config.tls {
            serve_tls(listener, router, tls_config, shutdown).await?;
        } else {
            serve_plain(listener, router, shutdown).await?;
        }

        shutdown_ctrl.drain(config.drain_timeout).await;
        Ok(())
    }
}

async fn serve_plain(
    listener: TcpListener,
    router: Router,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    info!("Serving plain HTTP");

    axum::serve(listener, router)
        .with_graceful_shutdown(shutdown)
        .await?;
    Ok(())
}

/// Serves HTTPS via `axum-server`, reusing the pre-bound listener.
async fn serve_tls(
    listener: TcpListener,
    router: Router,
    tls_config: &TlsConfig,
    shutdown: impl Future<Output = ()> + Send + 'static,
) -> anyhow::Result<()> {
    use axum_server::tls_rustls::RustlsConfig;

    let rustls_config = RustlsConfig::from_pem_file(&tls_config.cert_path, &tls_config.key_path)
        .await
        .map_err(|e| anyhow::anyhow!("Failed to load TLS certificates: {e}"))?;

    let addr = listener.local_addr()?;
    let std_listener = listener.into_std()?;
    let handle = axum_server::Handle::new();
    let shutdown_handle = handle.clone();

    tokio::spawn(async move {
        shutdown.await;
        shutdown_handle.graceful_shutdown(None);
    });

    info!("Serving HTTPS on {}", addr);

    axum_server::from_tcp_rustls(std_listener, rustls_config)
        .handle(handle)
        .serve(router.into_make_service())
        .await?;
    Ok(())
}
