//! Confirmation email preview for template work

use axum::{
    extract::Query,
    response::{Html, IntoResponse, Response},
};
use serde::Deserialize;

use crate::email::templates::{render_workshop_confirmation, sample_friend, sample_registration};

/// Overrides applied to the sample registration
#[derive(Debug, Default, Deserialize)]
pub struct PreviewQuery {
    pub name: Option<String>,
    pub bundle: Option<String>,
    pub payment: Option<String>,
    /// Number of friends to include (0-2)
    pub friends: Option<u8>,
    /// `text` for the plaintext part, HTML otherwise
    pub format: Option<String>,
}

/// GET /api/preview-email
pub async fn preview_email(Query(query): Query<PreviewQuery>) -> Response {
    let mut registration = sample_registration();
    if let Some(name) = query.name {
        registration.name = name;
    }
    if let Some(bundle) = query.bundle {
        registration.bundle = bundle;
    }
    if let Some(payment) = query.payment {
        registration.payment = payment;
    }
    let friends = query.friends.unwrap_or(0).min(2);
    registration.friend1 = (friends >= 1).then(|| sample_friend(1));
    registration.friend2 = (friends >= 2).then(|| sample_friend(2));

    let email = render_workshop_confirmation(&registration);
    match query.format.as_deref() {
        Some("text") => email.text.into_response(),
        _ => Html(email.html).into_response(),
    }
}
