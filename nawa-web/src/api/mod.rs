//! HTTP API handlers for nawa-web

pub mod admin;
pub mod assets;
pub mod auth;
pub mod health;
pub mod preview;
pub mod submissions;

pub use admin::submission_counts;
pub use assets::background_image;
pub use auth::{require_bearer_auth, require_delete_auth, require_read_auth};
pub use health::health_check;
pub use preview::preview_email;
pub use submissions::{
    create_submission, create_workshop, delete_submission, delete_submissions, list_submissions,
};
