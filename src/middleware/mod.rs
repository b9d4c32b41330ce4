pub mod auth;

pub use auth::{extract_token_from_headers, Authorizer, OpenAccess, TokenOwnership, TOKEN_HEADER};
