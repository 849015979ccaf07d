//! Per-kind storage descriptions
//!
//! Each submission kind is a zero-sized marker implementing
//! [`SubmissionKind`]; [`Repository`](super::Repository) does the rest.

use serde::de::DeserializeOwned;
use serde::Serialize;
use sqlx::query::Query;
use sqlx::sqlite::{Sqlite, SqliteArguments, SqliteRow};
use sqlx::Row;

use super::models::{
    ContactInput, ContactSubmission, Friend, NewsletterInput, NewsletterSubscription,
    WorkshopInput, WorkshopRegistration,
};
use super::repository::Table;
use crate::time;
use crate::validation::{clean, Validate};
use crate::Result;

/// Insert statement under construction
pub type SqliteQuery<'q> = Query<'q, Sqlite, SqliteArguments<'q>>;

/// Storage description for one submission kind
pub trait SubmissionKind: Send + Sync + 'static {
    /// Public-form payload
    type Input: Validate + DeserializeOwned + Send + Sync + 'static;
    /// Stored row as returned to callers
    type Record: Serialize + Send + Sync + Unpin + 'static;

    const TABLE: Table;

    /// Columns written by [`bind_insert`](Self::bind_insert), in bind order.
    /// `id` and `created_at` are handled by the repository.
    const INSERT_COLUMNS: &'static [&'static str];

    /// Columns read by [`decode`](Self::decode)
    const SELECT_COLUMNS: &'static str;

    /// Field to blame when an insert hits a unique constraint
    const UNIQUE_FIELD: Option<&'static str> = None;

    /// Bind one value per entry of `INSERT_COLUMNS`. The input has already
    /// passed validation.
    fn bind_insert<'q>(query: SqliteQuery<'q>, input: &Self::Input) -> SqliteQuery<'q>;

    fn decode(row: &SqliteRow) -> Result<Self::Record>;

    /// Storage-assigned id of a record
    fn record_id(record: &Self::Record) -> i64;

    /// One-line description for operator output
    fn summarize(record: &Self::Record) -> String;
}

fn created_at(row: &SqliteRow) -> Result<chrono::DateTime<chrono::Utc>> {
    let raw: String = row.try_get("created_at")?;
    time::from_db(&raw)
}

/// Contact form submissions
pub struct Contacts;

impl SubmissionKind for Contacts {
    type Input = ContactInput;
    type Record = ContactSubmission;

    const TABLE: Table = Table::Contacts;
    const INSERT_COLUMNS: &'static [&'static str] =
        &["name", "organization", "email", "phone", "interest", "message"];
    const SELECT_COLUMNS: &'static str =
        "id, name, organization, email, phone, interest, message, created_at";

    fn bind_insert<'q>(query: SqliteQuery<'q>, input: &ContactInput) -> SqliteQuery<'q> {
        query
            .bind(clean(&input.name))
            .bind(clean(&input.organization))
            .bind(clean(&input.email))
            .bind(clean(&input.phone))
            .bind(clean(&input.interest))
            .bind(clean(&input.message))
    }

    fn decode(row: &SqliteRow) -> Result<ContactSubmission> {
        Ok(ContactSubmission {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            organization: row.try_get("organization")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            interest: row.try_get("interest")?,
            message: row.try_get("message")?,
            created_at: created_at(row)?,
        })
    }

    fn record_id(record: &ContactSubmission) -> i64 {
        record.id
    }

    fn summarize(record: &ContactSubmission) -> String {
        format!(
            "#{} {} {} <{}> interest={}",
            record.id,
            time::to_db(&record.created_at),
            record.name,
            record.email,
            record.interest
        )
    }
}

/// Newsletter sign-ups; one row per address
pub struct Newsletters;

impl SubmissionKind for Newsletters {
    type Input = NewsletterInput;
    type Record = NewsletterSubscription;

    const TABLE: Table = Table::Newsletters;
    const INSERT_COLUMNS: &'static [&'static str] = &["email"];
    const SELECT_COLUMNS: &'static str = "id, email, created_at";
    const UNIQUE_FIELD: Option<&'static str> = Some("email");

    fn bind_insert<'q>(query: SqliteQuery<'q>, input: &NewsletterInput) -> SqliteQuery<'q> {
        query.bind(clean(&input.email))
    }

    fn decode(row: &SqliteRow) -> Result<NewsletterSubscription> {
        Ok(NewsletterSubscription {
            id: row.try_get("id")?,
            email: row.try_get("email")?,
            created_at: created_at(row)?,
        })
    }

    fn record_id(record: &NewsletterSubscription) -> i64 {
        record.id
    }

    fn summarize(record: &NewsletterSubscription) -> String {
        format!("#{} {} {}", record.id, time::to_db(&record.created_at), record.email)
    }
}

/// Workshop registrations with up to two accompanying friends
pub struct Workshops;

fn decode_friend(row: &SqliteRow, slot: u8) -> Result<Option<Friend>> {
    let name: Option<String> = row.try_get(format!("friend{}_name", slot).as_str())?;
    let email: Option<String> = row.try_get(format!("friend{}_email", slot).as_str())?;
    let phone: Option<String> = row.try_get(format!("friend{}_phone", slot).as_str())?;
    Ok(name.map(|name| Friend { name, email, phone }))
}

impl SubmissionKind for Workshops {
    type Input = WorkshopInput;
    type Record = WorkshopRegistration;

    const TABLE: Table = Table::Workshops;
    const INSERT_COLUMNS: &'static [&'static str] = &[
        "name",
        "email",
        "phone",
        "payment",
        "bundle",
        "friend1_name",
        "friend1_email",
        "friend1_phone",
        "friend2_name",
        "friend2_email",
        "friend2_phone",
    ];
    const SELECT_COLUMNS: &'static str = "id, name, email, phone, payment, bundle, \
         friend1_name, friend1_email, friend1_phone, \
         friend2_name, friend2_email, friend2_phone, created_at";

    fn bind_insert<'q>(query: SqliteQuery<'q>, input: &WorkshopInput) -> SqliteQuery<'q> {
        let mut query = query
            .bind(clean(&input.name))
            .bind(clean(&input.email))
            .bind(clean(&input.phone))
            .bind(clean(&input.payment))
            .bind(clean(&input.bundle));
        for friend in input.friend_slots() {
            let (name, email, phone) = match friend {
                Some(f) => (clean(&f.name), clean(&f.email), clean(&f.phone)),
                None => (None, None, None),
            };
            query = query.bind(name).bind(email).bind(phone);
        }
        query
    }

    fn decode(row: &SqliteRow) -> Result<WorkshopRegistration> {
        Ok(WorkshopRegistration {
            id: row.try_get("id")?,
            name: row.try_get("name")?,
            email: row.try_get("email")?,
            phone: row.try_get("phone")?,
            payment: row.try_get("payment")?,
            bundle: row.try_get("bundle")?,
            friend1: decode_friend(row, 1)?,
            friend2: decode_friend(row, 2)?,
            created_at: created_at(row)?,
        })
    }

    fn record_id(record: &WorkshopRegistration) -> i64 {
        record.id
    }

    fn summarize(record: &WorkshopRegistration) -> String {
        format!(
            "#{} {} {} <{}> bundle={} payment={} friends={}",
            record.id,
            time::to_db(&record.created_at),
            record.name,
            record.email,
            record.bundle,
            record.payment,
            record.friends().count()
        )
    }
}
