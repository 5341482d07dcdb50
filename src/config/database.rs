//! Database configuration module for `AgroTrust`.
//!
//! Connects to the database named by the settings and creates every table from
//! the entity definitions using `SeaORM`'s `Schema::create_table_from_entity`, so
//! the schema always matches the Rust structs without hand-written SQL.

use crate::entities::{
    Complaint, Course, Crop, EducationContent, Feedback, LedgerEntry, Lesson, Notification, Order,
    Subsidy, SubsidyApplication, User, Verification,
};
use crate::errors::Result;
use sea_orm::{ConnectionTrait, Database, DatabaseConnection, EntityName, EntityTrait, Schema};
use std::path::{Path, PathBuf};
use tracing::debug;

/// Directory holding the file of a `sqlite://` URL, if it names one.
fn sqlite_parent_dir(database_url: &str) -> Option<PathBuf> {
    let path = database_url.strip_prefix("sqlite://")?;
    let path = path.split('?').next().unwrap_or_default();
    if path.is_empty() || path.starts_with(':') {
        return None;
    }
    Path::new(path)
        .parent()
        .filter(|dir| !dir.as_os_str().is_empty())
        .map(Path::to_path_buf)
}

/// Establishes a connection to the database at `database_url`.
///
/// For file-backed `SQLite` the parent directory is created first.
pub async fn create_connection(database_url: &str) -> Result<DatabaseConnection> {
    if let Some(dir) = sqlite_parent_dir(database_url) {
        std::fs::create_dir_all(&dir)?;
    }
    Database::connect(database_url).await.map_err(Into::into)
}

/// Creates one table if it does not exist yet.
async fn create_table<E>(db: &DatabaseConnection, schema: &Schema, entity: E) -> Result<()>
where
    E: EntityTrait,
{
    let table = entity.table_name().to_string();
    let builder = db.get_database_backend();
    let mut statement = schema.create_table_from_entity(entity);
    statement.if_not_exists();
    db.execute(builder.build(&statement)).await?;
    debug!("Ensured table {table}");
    Ok(())
}

/// Creates all tables, parents before children, skipping the ones that already exist.
pub async fn create_tables(db: &DatabaseConnection) -> Result<()> {
    let schema = Schema::new(db.get_database_backend());

    create_table(db, &schema, User).await?;
    create_table(db, &schema, Crop).await?;
    create_table(db, &schema, Order).await?;
    create_table(db, &schema, Subsidy).await?;
    create_table(db, &schema, SubsidyApplication).await?;
    create_table(db, &schema, Verification).await?;
    create_table(db, &schema, Notification).await?;
    create_table(db, &schema, Complaint).await?;
    create_table(db, &schema, Feedback).await?;
    create_table(db, &schema, Course).await?;
    create_table(db, &schema, Lesson).await?;
    create_table(db, &schema, EducationContent).await?;
    create_table(db, &schema, LedgerEntry).await?;

    Ok(())
}
