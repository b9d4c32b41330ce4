#![allow(dead_code)]

use anyhow::{Context, Result};
use tempfile::TempDir;
use tokio::task::JoinHandle;
use tracing_subscriber::EnvFilter;

use uptime_api::config::AppConfig;
use uptime_api::server;
use uptime_api::state::AppContext;

pub const PHONE: &str = "1234567890";
pub const PASSWORD: &str = "pw";

/// In-process server bound to a free port with its own record directory
pub struct TestServer {
    pub port: u16,
    pub base_url: String,
    pub data_dir: TempDir,
    handle: JoinHandle<()>,
}

impl TestServer {
    pub async fn spawn() -> Result<Self> {
        Self::spawn_with(|_| {}).await
    }

    pub async fn spawn_with(configure: impl FnOnce(&mut AppConfig)) -> Result<Self> {
        init_tracing();
        let data_dir = tempfile::tempdir().context("failed to create data dir")?;

        let mut config = AppConfig::staging();
        config.storage.data_dir = data_dir.path().join("data");
        config.storage.public_dir = data_dir.path().join("public");
        configure(&mut config);

        let ctx = AppContext::new(config);
        ctx.prepare_storage().await?;
        let app = server::app(&ctx);

        // Pick an unused port for isolation
        let port = portpicker::pick_unused_port().context("failed to pick free port")?;
        let listener = tokio::net::TcpListener::bind(("127.0.0.1", port))
            .await
            .context("failed to bind test listener")?;

        let handle = tokio::spawn(async move {
            let _ = axum::serve(listener, app).await;
        });

        Ok(Self {
            port,
            base_url: format!("http://127.0.0.1:{}", port),
            data_dir,
            handle,
        })
    }

    pub fn url(&self, path: &str) -> String {
        format!("{}/{}", self.base_url, path.trim_start_matches('/'))
    }

    pub fn record_path(&self, resource: &str, key: &str) -> std::path::PathBuf {
        self.data_dir
            .path()
            .join("data")
            .join(resource)
            .join(format!("{}.json", key))
    }
}

impl Drop for TestServer {
    fn drop(&mut self) {
        self.handle.abort();
    }
}

/// Quiet unless RUST_LOG is set
fn init_tracing() {
    let _ = tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::from_default_env())
        .with_test_writer()
        .try_init();
}

pub fn new_user_payload() -> serde_json::Value {
    serde_json::json!({
        "firstName": "A",
        "lastName": "B",
        "phone": PHONE,
        "password": PASSWORD,
        "tosAgreement": true
    })
}
