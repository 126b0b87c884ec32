use crate::store::StoreError;
use diesel::prelude::*;
use diesel::r2d2::{self, ConnectionManager};
use diesel_migrations::{embed_migrations, EmbeddedMigrations, MigrationHarness};

pub const MIGRATIONS: EmbeddedMigrations = embed_migrations!("../migrations");

pub type DbPool = r2d2::Pool<ConnectionManager<PgConnection>>;

pub fn create_pool(database_url: &str, max_size: u32) -> Result<DbPool, StoreError> {
    let manager = ConnectionManager::<PgConnection>::new(database_url);
    Ok(r2d2::Pool::builder().max_size(max_size).build(manager)?)
}

/// Apply any pending embedded migrations. Already-applied migrations are
/// skipped, so this is safe to run on every startup.
pub fn run_migrations(pool: &DbPool) -> Result<Vec<String>, StoreError> {
    let mut conn = pool.get()?;
    let applied = conn
        .run_pending_migrations(MIGRATIONS)
        .map_err(|e| StoreError::Migration(e.to_string()))?;

    Ok(applied.iter().map(|v| v.to_string()).collect())
}

/// Run `f` against a pooled connection on the blocking thread pool.
///
/// The connection is checked out for exactly the duration of `f` and goes
/// back to the pool when the closure returns, whether it succeeded or not.
pub async fn with_conn<T, F>(pool: &DbPool, op: &'static str, f: F) -> Result<T, StoreError>
where
    F: FnOnce(&mut PgConnection) -> Result<T, diesel::result::Error> + Send + 'static,
    T: Send + 'static,
{
    let pool = pool.clone();
    let span = tracing::info_span!("db.query", op);

    tokio::task::spawn_blocking(move || {
        let _entered = span.enter();
        let mut conn = pool.get()?;
        f(&mut conn).map_err(StoreError::from)
    })
    .await?
}
