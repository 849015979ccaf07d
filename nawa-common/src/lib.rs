//! # Nawa Common Library
//!
//! Shared code for the Nawa site backend:
//! - Database schema, record models and submission repositories
//! - Payload validation
//! - Credential comparison
//! - Configuration loading
//! - Timestamps

pub mod auth;
pub mod config;
pub mod db;
pub mod error;
pub mod time;
pub mod validation;

pub use error::{Error, Result};
