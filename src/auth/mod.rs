//! Authentication Module
//! Mission: Accounts, session tokens, revocation and the auth gate

pub mod api;
pub mod blacklist;
pub mod jwt;
pub mod middleware;
pub mod models;
pub mod password;
pub mod service;
pub mod user_store;

pub use blacklist::BlacklistStore;
pub use jwt::JwtHandler;
pub use middleware::{auth_middleware, GateState};
pub use models::Claims;
pub use service::AuthService;
pub use user_store::UserStore;
