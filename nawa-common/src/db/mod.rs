//! Database schema, models and repositories

pub mod finance;
pub mod init;
pub mod kinds;
pub mod models;
pub mod repository;

pub use init::*;
pub use kinds::*;
pub use models::*;
pub use repository::*;
