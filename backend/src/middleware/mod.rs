pub mod auth;

pub use auth::{auth_middleware, decode_access_token, AuthUser, CurrentUser};
