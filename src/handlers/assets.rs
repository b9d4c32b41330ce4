use async_trait::async_trait;
use std::io::ErrorKind;
use std::path::{Component, Path, PathBuf};
use tracing::error;

use crate::api::{ContentType, Handler, HandlerResponse, Payload, RequestContext, PUBLIC_PREFIX};
use crate::error::ApiError;

pub const FAVICON: &str = "favicon.ico";

/// Serves files from the public directory.
///
/// Reached for any path containing `public/` (the part after the prefix names the
/// file) and for `favicon.ico`.
pub struct AssetsHandler {
    public_dir: PathBuf,
}

impl AssetsHandler {
    pub fn new(public_dir: impl Into<PathBuf>) -> Self {
        Self {
            public_dir: public_dir.into(),
        }
    }

    /// File name relative to the public directory, if the path names one safely
    fn asset_name(path: &str) -> Option<&str> {
        let name = if path == FAVICON {
            FAVICON
        } else {
            let start = path.find(PUBLIC_PREFIX)? + PUBLIC_PREFIX.len();
            path.get(start..)?
        };

        let safe = !name.is_empty()
            && Path::new(name)
                .components()
                .all(|c| matches!(c, Component::Normal(_)));
        safe.then_some(name)
    }

    async fn serve(&self, ctx: &RequestContext) -> Result<HandlerResponse, ApiError> {
        if ctx.method != "get" {
            return Err(ApiError::method_not_allowed(&ctx.method));
        }

        let name = Self::asset_name(&ctx.path).ok_or_else(|| ApiError::not_found("Asset not found"))?;
        let file = self.public_dir.join(name);

        let read_error = |e: std::io::Error| match e.kind() {
            ErrorKind::NotFound => ApiError::not_found("Asset not found"),
            _ => {
                error!("Could not read asset {}: {}", file.display(), e);
                ApiError::internal_server_error(e.to_string())
            }
        };

        if !tokio::fs::metadata(&file).await.map_err(read_error)?.is_file() {
            return Err(ApiError::not_found("Asset not found"));
        }
        let bytes = tokio::fs::read(&file).await.map_err(read_error)?;

        let content_type = file
            .extension()
            .and_then(|ext| ext.to_str())
            .map(ContentType::from_extension)
            .unwrap_or(ContentType::Plain);

        Ok(HandlerResponse::new(Some(200), Payload::Bytes(bytes), content_type))
    }
}

#[async_trait]
impl Handler for AssetsHandler {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResponse {
        match self.serve(ctx).await {
            Ok(response) => response,
            Err(e) => e.into(),
        }
    }
}
