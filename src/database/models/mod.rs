pub mod token;
pub mod user;

pub use token::{Token, TOKENS};
pub use user::{User, USERS};
