//! Authentication: registration, login, token refresh, and the bearer-token
//! request extractor.

pub mod extractor;
pub mod handlers;
mod service;

pub use extractor::AuthedUser;
pub use service::{AuthService, Claims, LoginTokens};
