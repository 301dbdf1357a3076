//! Password policy and hashing

use anyhow::{Context, Result};
use bcrypt::{hash, verify};

pub const MIN_PASSWORD_LEN: usize = 8;
pub const SPECIAL_CHARS: &str = "!@#$%^&*()_+-=`~,.[]{}/:;<";

const POLICY_MESSAGE: &str = "Password must be at least 8 characters and contain one upper case \
     letter, one number and one special character";

/// Returns the policy message when `password` is too weak
pub fn check_policy(password: &str) -> Result<(), &'static str> {
    let long_enough = password.chars().count() >= MIN_PASSWORD_LEN;
    let has_upper = password.chars().any(|c| c.is_ascii_uppercase());
    let has_digit = password.chars().any(|c| c.is_ascii_digit());
    let has_special = password.chars().any(|c| SPECIAL_CHARS.contains(c));

    if long_enough && has_upper && has_digit && has_special {
        Ok(())
    } else {
        Err(POLICY_MESSAGE)
    }
}

pub fn hash_password(password: &str, cost: u32) -> Result<String> {
    hash(password, cost).context("Failed to hash password")
}

pub fn verify_password(password: &str, password_hash: &str) -> Result<bool> {
    verify(password, password_hash).context("Failed to verify password")
}
