//! manage-submissions - operator CLI for stored site submissions
//!
//! ```bash
//! manage-submissions list workshops
//! manage-submissions delete contacts 12
//! manage-submissions delete-email newsletters someone@example.com
//! manage-submissions delete-old workshops 90
//! manage-submissions clear contacts
//! manage-submissions counts
//! ```
//!
//! Exit status: 0 on success, 1 when the storage call fails, 2 on usage
//! errors.

use clap::Parser;
use nawa_common::db::{self, Registry};
use nawa_web::admin::{run, AdminArgs};
use std::process::ExitCode;
use tracing::error;

#[tokio::main]
async fn main() -> ExitCode {
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "warn".into()),
        )
        .with_writer(std::io::stderr)
        .init();

    let args = AdminArgs::parse();

    match execute(&args).await {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            error!("{:#}", e);
            ExitCode::FAILURE
        }
    }
}

async fn execute(args: &AdminArgs) -> anyhow::Result<()> {
    let database_url = args.database_url()?;
    let pool = db::connect(&database_url).await?;
    let registry = Registry::new(pool);

    let stdout = std::io::stdout();
    let mut out = stdout.lock();
    run(&args.command, &registry, &mut out).await
}
