//! Generic submission repository
//!
//! Every submission kind supports the same operations: validated create,
//! list ordered by creation time, and the delete family (by id, by ids,
//! by email, by age, everything). [`Repository`] implements them once over
//! a [`SubmissionKind`]; [`Registry`] maps a [`Table`] to its repository for
//! callers that only know the table at runtime (admin CLI, counts).

use chrono::{DateTime, Utc};
use sqlx::SqlitePool;
use std::fmt;
use std::marker::PhantomData;
use std::str::FromStr;
use tracing::{debug, info};

use super::kinds::{Contacts, Newsletters, SubmissionKind, Workshops};
use crate::time;
use crate::validation::Validate;
use crate::{Error, Result};

/// Max ids per `DELETE ... IN (...)` statement (SQLite bind limit headroom)
const DELETE_CHUNK: usize = 500;

/// The three actively used submission tables
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Table {
    Contacts,
    Newsletters,
    Workshops,
}

impl Table {
    pub const ALL: [Table; 3] = [Table::Contacts, Table::Newsletters, Table::Workshops];

    /// SQL table name
    pub fn table_name(self) -> &'static str {
        match self {
            Table::Contacts => "contact_submissions",
            Table::Newsletters => "newsletter_subscriptions",
            Table::Workshops => "workshop_registrations",
        }
    }

    /// Operator-facing plural name (`contacts`, ...)
    pub fn as_str(self) -> &'static str {
        match self {
            Table::Contacts => "contacts",
            Table::Newsletters => "newsletters",
            Table::Workshops => "workshops",
        }
    }

    /// Human label for one record
    pub fn label(self) -> &'static str {
        match self {
            Table::Contacts => "contact submission",
            Table::Newsletters => "newsletter subscription",
            Table::Workshops => "workshop registration",
        }
    }
}

impl fmt::Display for Table {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Accepts the plural operator names and the singular route segments
impl FromStr for Table {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        match s {
            "contacts" | "contact" => Ok(Table::Contacts),
            "newsletters" | "newsletter" => Ok(Table::Newsletters),
            "workshops" | "workshop" => Ok(Table::Workshops),
            other => Err(Error::InvalidInput(format!(
                "Unknown table '{}' (expected workshops, contacts or newsletters)",
                other
            ))),
        }
    }
}

/// CRUD operations for one submission kind
pub struct Repository<K: SubmissionKind> {
    pool: SqlitePool,
    kind: PhantomData<fn() -> K>,
}

impl<K: SubmissionKind> Clone for Repository<K> {
    fn clone(&self) -> Self {
        Self::new(self.pool.clone())
    }
}

impl<K: SubmissionKind> Repository<K> {
    pub fn new(pool: SqlitePool) -> Self {
        Self {
            pool,
            kind: PhantomData,
        }
    }

    fn table() -> &'static str {
        K::TABLE.table_name()
    }

    /// Validate and insert; the id and creation time are assigned here.
    ///
    /// Fails with `Validation` before touching the database, or with
    /// `Duplicate` when a unique column already holds the value.
    pub async fn create(&self, input: &K::Input) -> Result<K::Record> {
        self.create_at(input, time::now()).await
    }

    /// [`create`](Self::create) with an explicit creation time (imports and
    /// backfills)
    pub async fn create_at(&self, input: &K::Input, created_at: DateTime<Utc>) -> Result<K::Record> {
        input.validate()?;

        let columns = K::INSERT_COLUMNS.join(", ");
        let placeholders = vec!["?"; K::INSERT_COLUMNS.len() + 1].join(", ");
        let sql = format!(
            "INSERT INTO {} ({}, created_at) VALUES ({})",
            Self::table(),
            columns,
            placeholders
        );

        let result = K::bind_insert(sqlx::query(&sql), input)
            .bind(time::to_db(&created_at))
            .execute(&self.pool)
            .await
            .map_err(classify_insert_error::<K>)?;

        let id = result.last_insert_rowid();
        info!("Created {} #{}", K::TABLE.label(), id);

        self.get(id)
            .await?
            .ok_or_else(|| Error::Internal(format!("{} #{} vanished after insert", K::TABLE.label(), id)))
    }

    /// All records, oldest first (id breaks ties)
    pub async fn list(&self) -> Result<Vec<K::Record>> {
        let sql = format!(
            "SELECT {} FROM {} ORDER BY created_at ASC, id ASC",
            K::SELECT_COLUMNS,
            Self::table()
        );
        let rows = sqlx::query(&sql).fetch_all(&self.pool).await?;
        rows.iter().map(K::decode).collect()
    }

    pub async fn get(&self, id: i64) -> Result<Option<K::Record>> {
        let sql = format!("SELECT {} FROM {} WHERE id = ?", K::SELECT_COLUMNS, Self::table());
        let row = sqlx::query(&sql).bind(id).fetch_optional(&self.pool).await?;
        row.as_ref().map(K::decode).transpose()
    }

    /// `true` iff a row was removed
    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        let sql = format!("DELETE FROM {} WHERE id = ?", Self::table());
        let removed = sqlx::query(&sql).bind(id).execute(&self.pool).await?.rows_affected();
        if removed > 0 {
            info!("Deleted {} #{}", K::TABLE.label(), id);
        } else {
            debug!("No {} #{} to delete", K::TABLE.label(), id);
        }
        Ok(removed > 0)
    }

    /// Number of rows removed. Empty input issues no statement.
    pub async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        if ids.is_empty() {
            return Ok(0);
        }

        let mut tx = self.pool.begin().await?;
        let mut removed = 0;
        for chunk in ids.chunks(DELETE_CHUNK) {
            let placeholders = vec!["?"; chunk.len()].join(", ");
            let sql = format!("DELETE FROM {} WHERE id IN ({})", Self::table(), placeholders);
            let mut query = sqlx::query(&sql);
            for id in chunk {
                query = query.bind(*id);
            }
            removed += query.execute(&mut *tx).await?.rows_affected();
        }
        tx.commit().await?;

        info!("Deleted {} {} record(s) by id", removed, K::TABLE.label());
        Ok(removed)
    }

    /// Remove every record for an address (case-insensitive)
    pub async fn delete_by_email(&self, email: &str) -> Result<u64> {
        let sql = format!("DELETE FROM {} WHERE lower(email) = lower(?)", Self::table());
        let removed = sqlx::query(&sql)
            .bind(email.trim())
            .execute(&self.pool)
            .await?
            .rows_affected();
        info!("Deleted {} {} record(s) by email", removed, K::TABLE.label());
        Ok(removed)
    }

    /// Remove records created strictly before `now - days`
    pub async fn delete_older_than(&self, days: u32) -> Result<u64> {
        let cutoff = time::cutoff_days(days);
        let sql = format!("DELETE FROM {} WHERE created_at < ?", Self::table());
        let removed = sqlx::query(&sql)
            .bind(time::to_db(&cutoff))
            .execute(&self.pool)
            .await?
            .rows_affected();
        info!(
            "Deleted {} {} record(s) older than {} day(s)",
            removed,
            K::TABLE.label(),
            days
        );
        Ok(removed)
    }

    /// Remove everything
    pub async fn clear(&self) -> Result<u64> {
        let sql = format!("DELETE FROM {}", Self::table());
        let removed = sqlx::query(&sql).execute(&self.pool).await?.rows_affected();
        info!("Cleared {} {} record(s)", removed, K::TABLE.label());
        Ok(removed)
    }

    pub async fn count(&self) -> Result<i64> {
        let sql = format!("SELECT COUNT(*) FROM {}", Self::table());
        let count: i64 = sqlx::query_scalar(&sql).fetch_one(&self.pool).await?;
        Ok(count)
    }
}

fn classify_insert_error<K: SubmissionKind>(err: sqlx::Error) -> Error {
    if let sqlx::Error::Database(db_err) = &err {
        if db_err.is_unique_violation() {
            return Error::Duplicate {
                table: K::TABLE.table_name(),
                field: K::UNIQUE_FIELD.unwrap_or("id"),
            };
        }
    }
    Error::Database(err)
}

/// A repository whose kind is chosen at runtime
#[derive(Clone)]
pub enum AnyRepository {
    Contacts(Repository<Contacts>),
    Newsletters(Repository<Newsletters>),
    Workshops(Repository<Workshops>),
}

macro_rules! dispatch {
    ($self:expr, $repo:ident => $body:expr) => {
        match $self {
            AnyRepository::Contacts($repo) => $body,
            AnyRepository::Newsletters($repo) => $body,
            AnyRepository::Workshops($repo) => $body,
        }
    };
}

impl AnyRepository {
    pub fn table(&self) -> Table {
        match self {
            AnyRepository::Contacts(_) => Table::Contacts,
            AnyRepository::Newsletters(_) => Table::Newsletters,
            AnyRepository::Workshops(_) => Table::Workshops,
        }
    }

    /// Records as JSON values, oldest first
    pub async fn list_json(&self) -> Result<Vec<serde_json::Value>> {
        dispatch!(self, repo => {
            let records = repo.list().await?;
            records
                .iter()
                .map(|r| serde_json::to_value(r).map_err(|e| Error::Internal(e.to_string())))
                .collect()
        })
    }

    /// One line per record, oldest first
    pub async fn list_summaries(&self) -> Result<Vec<String>> {
        fn summaries<K: SubmissionKind>(records: Vec<K::Record>) -> Vec<String> {
            records.iter().map(K::summarize).collect()
        }
        match self {
            AnyRepository::Contacts(repo) => Ok(summaries::<Contacts>(repo.list().await?)),
            AnyRepository::Newsletters(repo) => Ok(summaries::<Newsletters>(repo.list().await?)),
            AnyRepository::Workshops(repo) => Ok(summaries::<Workshops>(repo.list().await?)),
        }
    }

    pub async fn delete_by_id(&self, id: i64) -> Result<bool> {
        dispatch!(self, repo => repo.delete_by_id(id).await)
    }

    pub async fn delete_by_ids(&self, ids: &[i64]) -> Result<u64> {
        dispatch!(self, repo => repo.delete_by_ids(ids).await)
    }

    pub async fn delete_by_email(&self, email: &str) -> Result<u64> {
        dispatch!(self, repo => repo.delete_by_email(email).await)
    }

    pub async fn delete_older_than(&self, days: u32) -> Result<u64> {
        dispatch!(self, repo => repo.delete_older_than(days).await)
    }

    pub async fn clear(&self) -> Result<u64> {
        dispatch!(self, repo => repo.clear().await)
    }

    pub async fn count(&self) -> Result<i64> {
        dispatch!(self, repo => repo.count().await)
    }
}

/// Maps each [`Table`] to its repository over one shared pool
#[derive(Clone)]
pub struct Registry {
    pool: SqlitePool,
}

impl Registry {
    pub fn new(pool: SqlitePool) -> Self {
        Self { pool }
    }

    pub fn pool(&self) -> &SqlitePool {
        &self.pool
    }

    /// Typed repository for a kind known at compile time
    pub fn repository<K: SubmissionKind>(&self) -> Repository<K> {
        Repository::new(self.pool.clone())
    }

    /// Repository for a table chosen at runtime
    pub fn store(&self, table: Table) -> AnyRepository {
        match table {
            Table::Contacts => AnyRepository::Contacts(self.repository()),
            Table::Newsletters => AnyRepository::Newsletters(self.repository()),
            Table::Workshops => AnyRepository::Workshops(self.repository()),
        }
    }

    /// Row count per table, in [`Table::ALL`] order
    pub async fn counts(&self) -> Result<Vec<(Table, i64)>> {
        let mut counts = Vec::with_capacity(Table::ALL.len());
        for table in Table::ALL {
            counts.push((table, self.store(table).count().await?));
        }
        Ok(counts)
    }
}
