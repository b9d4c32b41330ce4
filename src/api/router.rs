use async_trait::async_trait;
use std::collections::HashMap;
use std::sync::Arc;

use super::context::RequestContext;
use super::response::HandlerResponse;

/// Paths containing this prefix are served by the asset handler
pub const PUBLIC_PREFIX: &str = "public/";

/// A routed endpoint: takes the normalized request, returns its one response
#[async_trait]
pub trait Handler: Send + Sync {
    async fn handle(&self, ctx: &RequestContext) -> HandlerResponse;
}

/// Immutable path → handler table, built once at startup
pub struct RouteTable {
    routes: HashMap<&'static str, Arc<dyn Handler>>,
    assets: Arc<dyn Handler>,
    not_found: Arc<dyn Handler>,
}

impl RouteTable {
    pub fn builder(assets: Arc<dyn Handler>, not_found: Arc<dyn Handler>) -> RouteTableBuilder {
        RouteTableBuilder {
            routes: HashMap::new(),
            assets,
            not_found,
        }
    }

    /// Pick the handler for a normalized path.
    ///
    /// The public prefix wins over the table; unknown paths get the not-found handler.
    pub fn resolve(&self, path: &str) -> &Arc<dyn Handler> {
        if path.contains(PUBLIC_PREFIX) {
            return &self.assets;
        }
        self.routes.get(path).unwrap_or(&self.not_found)
    }

    pub fn paths(&self) -> Vec<&'static str> {
        let mut paths: Vec<_> = self.routes.keys().copied().collect();
        paths.sort();
        paths
    }
}

pub struct RouteTableBuilder {
    routes: HashMap<&'static str, Arc<dyn Handler>>,
    assets: Arc<dyn Handler>,
    not_found: Arc<dyn Handler>,
}

impl RouteTableBuilder {
    pub fn route(mut self, path: &'static str, handler: Arc<dyn Handler>) -> Self {
        self.routes.insert(path, handler);
        self
    }

    pub fn build(self) -> RouteTable {
        RouteTable {
            routes: self.routes,
            assets: self.assets,
            not_found: self.not_found,
        }
    }
}
