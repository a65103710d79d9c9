use crate::{
    app_state::{AppState, WorkflowSecret},
    configuration::{DatabaseSettings, Settings},
    error::route_not_found,
    routes::{auth, health_check, subscriptions, users, workflows},
    telemetry::{request_span, RequestUuid, REQUEST_ID_HEADER},
};
use anyhow::Context;
use axum::{http::HeaderName, Router};
use sqlx::{postgres::PgPoolOptions, PgPool};
use std::{net::SocketAddr, time::Duration};
use tokio::{net::TcpListener, signal};
use tower::ServiceBuilder;
use tower_http::{
    request_id::{PropagateRequestIdLayer, SetRequestIdLayer},
    trace::TraceLayer,
};

pub struct Application {
    listener: TcpListener,
    db_pool: PgPool,
    router: Router,
}

impl Application {
    pub async fn build(config: Settings) -> Result<Self, anyhow::Error> {
        let address = format!("{}:{}", config.application.host, config.application.port);
        let listener = TcpListener::bind(&address)
            .await
            .with_context(|| format!("Failed to bind {address}"))?;

        let db_pool = get_connection_pool(&config.database);
        let app_state = AppState {
            db_pool: db_pool.clone(),
            token_signer: config.application.token_signer()?,
            workflow_secret: WorkflowSecret(config.application.workflow_secret.clone()),
        };

        Ok(Self {
            listener,
            db_pool,
            router: build_router(app_state),
        })
    }

    pub fn local_addr(&self) -> Result<SocketAddr, std::io::Error> {
        self.listener.local_addr()
    }

    pub async fn run_until_stopped(self) -> Result<(), anyhow::Error> {
        tracing::info!("Listening on {}", self.local_addr()?);

        axum::serve(self.listener, self.router)
            .with_graceful_shutdown(shutdown_signal())
            .await?;

        self.db_pool.close().await;
        Ok(())
    }
}

pub fn get_connection_pool(config: &DatabaseSettings) -> PgPool {
    PgPoolOptions::new()
        .acquire_timeout(Duration::from_secs(2))
        .connect_lazy_with(config.with_db())
}

fn build_router(app_state: AppState) -> Router {
    let request_id_header = HeaderName::from_static(REQUEST_ID_HEADER);

    let api = Router::new()
        .merge(auth::router())
        .merge(users::router(&app_state))
        .merge(subscriptions::router(&app_state))
        .merge(workflows::router());

    Router::new()
        .merge(health_check::router())
        .nest("/api/v1", api)
        .fallback(route_not_found)
        .layer(
            ServiceBuilder::new()
                .layer(SetRequestIdLayer::new(
                    request_id_header.clone(),
                    RequestUuid,
                ))
                .layer(TraceLayer::new_for_http().make_span_with(request_span))
                .layer(PropagateRequestIdLayer::new(request_id_header)),
        )
        .with_state(app_state)
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            tracing::error!("Failed to install Ctrl+C handler: {e:?}");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                tracing::error!("Failed to install SIGTERM handler: {e:?}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {},
        () = terminate => {},
    }

    tracing::info!("Shutdown signal received");
}
