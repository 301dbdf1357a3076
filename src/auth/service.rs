//! Auth Service
//! Mission: Register accounts, issue session tokens, revoke them on logout

use crate::auth::{
    blacklist::BlacklistStore,
    jwt::JwtHandler,
    models::{IssuedToken, User},
    password,
    user_store::{is_constraint_violation, UserStore},
};
use crate::error::ApiError;
use chrono::Utc;
use std::sync::Arc;
use tracing::{debug, info, warn};

pub struct AuthService {
    users: Arc<UserStore>,
    blacklist: Arc<BlacklistStore>,
    jwt: Arc<JwtHandler>,
    bcrypt_cost: u32,
}

impl AuthService {
    pub fn new(
        users: Arc<UserStore>,
        blacklist: Arc<BlacklistStore>,
        jwt: Arc<JwtHandler>,
        bcrypt_cost: u32,
    ) -> Self {
        Self {
            users,
            blacklist,
            jwt,
            bcrypt_cost,
        }
    }

    /// Create an account. Email is checked before name, then the password policy.
    pub fn register(&self, name: &str, email: &str, pass: &str) -> Result<User, ApiError> {
        if self.users.get_user_by_email(email)?.is_some() {
            return Err(ApiError::Validation(
                "This email is already registered".to_string(),
            ));
        }
        if self.users.get_user_by_name(name)?.is_some() {
            return Err(ApiError::Validation("Username already exists".to_string()));
        }
        password::check_policy(pass).map_err(|msg| ApiError::Validation(msg.to_string()))?;

        let password_hash = password::hash_password(pass, self.bcrypt_cost)?;

        self.users
            .create_user(name, email, password_hash)
            .map_err(|e| {
                if is_constraint_violation(&e) {
                    // lost a race with a concurrent registration
                    ApiError::Validation("Username or email already exists".to_string())
                } else {
                    warn!("Failed to create user {}: {:#}", name, e);
                    e.into()
                }
            })
    }

    pub fn login(&self, email: &str, pass: &str) -> Result<IssuedToken, ApiError> {
        let user = self
            .users
            .get_user_by_email(email)?
            .ok_or(ApiError::UserNotFound)?;

        if !password::verify_password(pass, &user.password_hash)? {
            warn!("❌ Failed login attempt: {}", user.name);
            return Err(ApiError::InvalidCredentials);
        }

        let (token, expires_in) = self.jwt.generate_token(&user)?;
        info!("🔐 Login successful: {} ({})", user.name, user.id);

        Ok(IssuedToken { token, expires_in })
    }

    /// Revoke `token` until its own expiry. Strings the gate would already
    /// reject (foreign signature, garbage, expired) are not stored.
    pub fn logout(&self, token: &str) -> Result<(), ApiError> {
        let now = Utc::now().timestamp();
        match self.jwt.expiry_of(token) {
            Some(expires_at) if expires_at >= now => {
                self.blacklist.revoke(token, expires_at)?;
                info!("👋 Token revoked (expires_at={})", expires_at);
            }
            _ => debug!("Logout with a token that cannot authenticate; nothing to revoke"),
        }
        Ok(())
    }
}
