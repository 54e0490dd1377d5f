use sqlx::{postgres::PgPoolOptions, Pool, Postgres};

use crate::config::Settings;
use crate::validation::FieldErrors;

pub type Database = Pool<Postgres>;

pub async fn create_database_pool(settings: &Settings) -> Result<Database, sqlx::Error> {
    let pool = PgPoolOptions::new()
        .max_connections(settings.max_connections)
        .connect(&settings.database_url)
        .await?;

    // Test the connection
    sqlx::query("SELECT 1")
        .fetch_one(&pool)
        .await?;

    log::info!("Connected to database successfully");
    Ok(pool)
}

pub async fn run_migrations(db: &Database) -> Result<(), sqlx::migrate::MigrateError> {
    log::info!("Running database migrations");
    sqlx::migrate!("./migrations").run(db).await?;
    log::info!("Migrations completed");
    Ok(())
}

/// Postgres error code for a unique constraint violation.
pub const UNIQUE_VIOLATION: &str = "23505";
/// Postgres error code for a foreign key violation.
pub const FOREIGN_KEY_VIOLATION: &str = "23503";

/// Returns the violated constraint name when `err` is a unique or foreign key violation.
pub fn violated_constraint(err: &sqlx::Error) -> Option<&str> {
    match err {
        sqlx::Error::Database(db_err) => {
            let code = db_err.code()?;
            if code == UNIQUE_VIOLATION || code == FOREIGN_KEY_VIOLATION {
                db_err.constraint()
            } else {
                None
            }
        }
        _ => None,
    }
}

/// A constraint name, the form field it guards, and the message shown for it.
pub type ConstraintField = (&'static str, &'static str, &'static str);

/// Translates a unique or foreign key violation into a field error, when the
/// constraint is one of `known`.
pub fn constraint_errors(err: &sqlx::Error, known: &[ConstraintField]) -> Option<FieldErrors> {
    let constraint = violated_constraint(err)?;
    known
        .iter()
        .find(|(name, _, _)| *name == constraint)
        .map(|(_, field, message)| {
            let mut errors = FieldErrors::new();
            errors.add(field, *message);
            errors
        })
}
