//! Entity Module

pub mod citizen_profile;
pub mod user;
