//! Platform Crate - Technical Infrastructure
//!
//! This crate provides shared technical foundations:
//! - Cryptographic utilities (HMAC-SHA256, Base64url, random bytes)
//! - Password hashing (Argon2id)
//! - Signed access tokens (HS256)
//! - Bearer token extraction

pub mod bearer;
pub mod crypto;
pub mod password;
pub mod token;
