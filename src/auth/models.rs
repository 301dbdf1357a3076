//! Authentication Models
//! Mission: Define user accounts, session claims and auth request bodies

use serde::{Deserialize, Serialize};
use uuid::Uuid;

/// User account
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct User {
    pub id: Uuid,
    pub name: String,
    pub email: String,
    #[serde(skip_serializing)]
    pub password_hash: String, // bcrypt hash - never serialize
    pub created_at: String,
}

/// JWT Claims payload
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Claims {
    pub username: String,
    #[serde(rename = "userID")]
    pub user_id: String,
    pub iat: i64, // issued at (unix seconds)
    pub exp: i64, // expiration timestamp
}

/// Register request body
#[derive(Debug, Deserialize)]
pub struct RegisterRequest {
    pub name: String,
    pub email: String,
    pub pass: String,
}

/// Login request body
#[derive(Debug, Deserialize)]
pub struct LoginRequest {
    pub email: String,
    pub pass: String,
}

/// Token issued by a successful login
#[derive(Debug, Clone)]
pub struct IssuedToken {
    pub token: String,
    pub expires_in: i64, // seconds until expiration
}

/// Login response
#[derive(Debug, Serialize)]
pub struct LoginResponse {
    pub msg: &'static str,
    pub token: String,
    pub expires_in: i64,
}

/// Register response
#[derive(Debug, Serialize)]
pub struct RegisterResponse {
    pub msg: &'static str,
    #[serde(rename = "registeredUser")]
    pub registered_user: UserResponse,
}

/// User response (sanitized)
#[derive(Debug, Serialize)]
pub struct UserResponse {
    pub id: String,
    pub name: String,
    pub email: String,
    pub created_at: String,
}

impl UserResponse {
    pub fn from_user(user: &User) -> Self {
        Self {
            id: user.id.to_string(),
            name: user.name.clone(),
            email: user.email.clone(),
            created_at: user.created_at.clone(),
        }
    }
}
