// handlers/mod.rs - route table wiring
//
// Every endpoint is a `Handler`; the table below is the complete set of routes
// and is built once when the server starts.
pub mod assets;
pub mod system;
pub mod tokens;
pub mod users;
pub mod validate;

use std::sync::Arc;

use crate::api::RouteTable;
use crate::state::AppContext;

use assets::{AssetsHandler, FAVICON};
use system::{NotFoundHandler, PingHandler};
use tokens::TokensHandler;
use users::UsersHandler;

pub fn route_table(app: &AppContext) -> RouteTable {
    let assets = Arc::new(AssetsHandler::new(app.config.storage.public_dir.clone()));

    RouteTable::builder(assets.clone(), Arc::new(NotFoundHandler))
        .route("ping", Arc::new(PingHandler))
        .route("api/users", Arc::new(UsersHandler::new(app.clone())))
        .route("api/tokens", Arc::new(TokensHandler::new(app.clone())))
        .route(FAVICON, assets)
        .build()
}
