use async_trait::async_trait;

use crate::api::{Handler, HandlerResponse, RequestContext};

/// Liveness probe: 200 with an empty object for any method
pub struct PingHandler;

#[async_trait]
impl Handler for PingHandler {
    async fn handle(&self, _ctx: &RequestContext) -> HandlerResponse {
        HandlerResponse::status(200)
    }
}

/// Answers every path missing from the route table
pub struct NotFoundHandler;

#[async_trait]
impl Handler for NotFoundHandler {
    async fn handle(&self, _ctx: &RequestContext) -> HandlerResponse {
        HandlerResponse::status(404)
    }
}
