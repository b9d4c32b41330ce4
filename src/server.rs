use anyhow::{Context, Result};
use axum::Router;
use axum_server::tls_rustls::RustlsConfig;
use std::net::SocketAddr;
use std::sync::Arc;
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::info;

use crate::api::{dispatch, DispatchState};
use crate::handlers;
use crate::state::AppContext;

/// Axum app whose only route is the dispatcher fallback
pub fn app(ctx: &AppContext) -> Router {
    let routes = handlers::route_table(ctx);
    info!("Routes: {}", routes.paths().join(", "));

    let state = DispatchState {
        routes: Arc::new(routes),
        max_body_bytes: ctx.config.api.max_request_size_bytes,
    };

    let router = Router::new()
        .fallback(dispatch)
        .with_state(state)
        .layer(TraceLayer::new_for_http());

    if ctx.config.security.enable_cors {
        router.layer(CorsLayer::permissive())
    } else {
        router
    }
}

/// Serve plain HTTP, plus HTTPS when a certificate and key are configured
pub async fn run(ctx: AppContext) -> Result<()> {
    ctx.prepare_storage()
        .await
        .context("failed to prepare record directories")?;

    let app = app(&ctx);
    let server = &ctx.config.server;

    let http_addr: SocketAddr = format!("{}:{}", server.host, server.http_port)
        .parse()
        .with_context(|| format!("invalid HTTP bind address {}:{}", server.host, server.http_port))?;

    let http = {
        let app = app.clone();
        async move {
            let listener = tokio::net::TcpListener::bind(http_addr)
                .await
                .with_context(|| format!("failed to bind {}", http_addr))?;
            info!("HTTP server listening on http://{}", http_addr);
            axum::serve(listener, app).await.context("HTTP server error")
        }
    };

    let Some((cert, key)) = server.tls_paths() else {
        return http.await;
    };

    let https_addr: SocketAddr = format!("{}:{}", server.host, server.https_port)
        .parse()
        .with_context(|| format!("invalid HTTPS bind address {}:{}", server.host, server.https_port))?;

    let tls = RustlsConfig::from_pem_file(cert, key)
        .await
        .with_context(|| format!("failed to load TLS material from {} / {}", cert.display(), key.display()))?;

    let https = async move {
        info!("HTTPS server listening on https://{}", https_addr);
        axum_server::bind_rustls(https_addr, tls)
            .serve(app.into_make_service())
            .await
            .context("HTTPS server error")
    };

    tokio::try_join!(http, https)?;
    Ok(())
}
