pub mod context;
pub mod dispatch;
pub mod format;
pub mod response;
pub mod router;

pub use context::RequestContext;
pub use dispatch::{dispatch, DispatchState};
pub use response::{ContentType, HandlerResponse, Payload};
pub use router::{Handler, RouteTable, PUBLIC_PREFIX};
