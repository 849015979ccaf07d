//! Submission models
//!
//! `*Input` types are the raw public-form payloads (every field optional so
//! missing fields surface as validation errors rather than parse failures).
//! Record types are what storage hands back.

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::validation::{
    clean, optional_email, optional_text, require_email, require_text, Validate, ValidationErrors,
    MAX_MESSAGE_LEN, MAX_NAME_LEN, MAX_PHONE_LEN, MAX_SHORT_TEXT_LEN,
};

// ========================================
// Contact
// ========================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactInput {
    pub name: Option<String>,
    pub organization: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub interest: Option<String>,
    pub message: Option<String>,
}

impl Validate for ContactInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name, MAX_NAME_LEN);
        optional_text(&mut errors, "organization", &self.organization, MAX_SHORT_TEXT_LEN);
        require_email(&mut errors, "email", &self.email);
        optional_text(&mut errors, "phone", &self.phone, MAX_PHONE_LEN);
        require_text(&mut errors, "interest", &self.interest, MAX_SHORT_TEXT_LEN);
        require_text(&mut errors, "message", &self.message, MAX_MESSAGE_LEN);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ContactSubmission {
    pub id: i64,
    pub name: String,
    pub organization: Option<String>,
    pub email: String,
    pub phone: Option<String>,
    pub interest: String,
    pub message: String,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Newsletter
// ========================================

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterInput {
    pub email: Option<String>,
}

impl Validate for NewsletterInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_email(&mut errors, "email", &self.email);
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct NewsletterSubscription {
    pub id: i64,
    pub email: String,
    pub created_at: DateTime<Utc>,
}

// ========================================
// Workshop
// ========================================

/// Payment method codes with a display label
pub const PAYMENT_METHODS: &[(&str, &str)] = &[
    ("venue", "Pay at the venue"),
    ("online", "Online payment"),
];

/// Bundle codes with a display label
pub const BUNDLES: &[(&str, &str)] = &[
    ("59", "Early bird ticket (59 €)"),
    ("89", "Standard ticket (89 €)"),
    ("199", "Group bundle for 3 (199 €)"),
];

/// Display label for a payment code; unknown codes display as given
pub fn payment_label(code: &str) -> &str {
    lookup_label(PAYMENT_METHODS, code)
}

/// Display label for a bundle code; unknown codes display as given
pub fn bundle_label(code: &str) -> &str {
    lookup_label(BUNDLES, code)
}

fn lookup_label<'a>(table: &'static [(&'static str, &'static str)], code: &'a str) -> &'a str {
    table
        .iter()
        .find(|(c, _)| *c == code.trim())
        .map(|(_, label)| *label)
        .unwrap_or(code)
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct FriendInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, Default, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopInput {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
    pub payment: Option<String>,
    pub bundle: Option<String>,
    pub friend1: Option<FriendInput>,
    pub friend2: Option<FriendInput>,
}

impl FriendInput {
    /// Every field absent or blank, as sent for an unused friend slot
    pub fn is_blank(&self) -> bool {
        clean(&self.name).is_none() && clean(&self.email).is_none() && clean(&self.phone).is_none()
    }

    fn validate_into(&self, errors: &mut ValidationErrors, prefix: &str) {
        require_text(errors, &format!("{}.name", prefix), &self.name, MAX_NAME_LEN);
        optional_email(errors, &format!("{}.email", prefix), &self.email);
        optional_text(errors, &format!("{}.phone", prefix), &self.phone, MAX_PHONE_LEN);
    }
}

impl WorkshopInput {
    /// `friend1` and `friend2`, with blank slots treated as absent
    pub fn friend_slots(&self) -> [Option<&FriendInput>; 2] {
        [&self.friend1, &self.friend2].map(|friend| friend.as_ref().filter(|f| !f.is_blank()))
    }
}

impl Validate for WorkshopInput {
    fn validate(&self) -> Result<(), ValidationErrors> {
        let mut errors = ValidationErrors::new();
        require_text(&mut errors, "name", &self.name, MAX_NAME_LEN);
        require_email(&mut errors, "email", &self.email);
        require_text(&mut errors, "phone", &self.phone, MAX_PHONE_LEN);
        require_text(&mut errors, "payment", &self.payment, MAX_SHORT_TEXT_LEN);
        require_text(&mut errors, "bundle", &self.bundle, MAX_SHORT_TEXT_LEN);
        let [friend1, friend2] = self.friend_slots();
        if let Some(friend) = friend1 {
            friend.validate_into(&mut errors, "friend1");
        }
        if let Some(friend) = friend2 {
            friend.validate_into(&mut errors, "friend2");
        }
        errors.into_result()
    }
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Friend {
    pub name: String,
    pub email: Option<String>,
    pub phone: Option<String>,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct WorkshopRegistration {
    pub id: i64,
    pub name: String,
    pub email: String,
    pub phone: String,
    pub payment: String,
    pub bundle: String,
    pub friend1: Option<Friend>,
    pub friend2: Option<Friend>,
    pub created_at: DateTime<Utc>,
}

impl WorkshopRegistration {
    /// Friends registered alongside the main attendee, in order
    pub fn friends(&self) -> impl Iterator<Item = &Friend> {
        self.friend1.iter().chain(self.friend2.iter())
    }

    pub fn bundle_label(&self) -> &str {
        bundle_label(&self.bundle)
    }

    pub fn payment_label(&self) -> &str {
        payment_label(&self.payment)
    }
}
