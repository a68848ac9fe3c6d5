use diesel::connection::SimpleConnection;
use diesel::r2d2::{ConnectionManager, CustomizeConnection, Pool, PooledConnection};
use diesel::{Connection, SqliteConnection};
use std::time::Duration;

pub type InnerConnType = SqliteConnection;
pub type ConnType = PooledConnection<ConnectionManager<InnerConnType>>;
pub type PoolType = Pool<ConnectionManager<InnerConnType>>;

const IN_MEMORY_URL: &str = ":memory:";

#[derive(thiserror::Error, Debug)]
pub enum Error {
    #[error("Connection pool error: {0}")]
    Pool(#[from] r2d2::Error),
    #[error("Query error: {0}")]
    Query(#[from] diesel::result::Error),
    #[error("Migration error: {0}")]
    Migration(#[from] diesel_migrations::RunMigrationsError),
    #[error("Blocking task failed: {0}")]
    Runtime(#[from] tokio::task::JoinError),
}

/// Tuning applied to every pooled connection.
#[derive(Clone, Debug)]
pub struct DbOptions {
    pub busy_timeout: Duration,
    pub pool_size: u32,
}

impl Default for DbOptions {
    fn default() -> Self {
        DbOptions {
            busy_timeout: Duration::from_secs(5),
            pool_size: 8,
        }
    }
}

#[derive(Debug)]
struct ConnectionPragmas {
    busy_timeout: Duration,
}

impl CustomizeConnection<InnerConnType, diesel::r2d2::Error> for ConnectionPragmas {
    fn on_acquire(&self, conn: &mut InnerConnType) -> Result<(), diesel::r2d2::Error> {
        conn.batch_execute(&format!(
            "PRAGMA busy_timeout = {}; PRAGMA synchronous = NORMAL; PRAGMA journal_mode = WAL; PRAGMA foreign_keys = ON;",
            self.busy_timeout.as_millis()
        ))
        .map_err(diesel::r2d2::Error::QueryError)
    }
}

#[derive(Clone)]
pub struct DbExecutor {
    pub pool: PoolType,
}

impl DbExecutor {
    pub fn new<S: Into<String>>(database_url: S) -> Result<Self, Error> {
        Self::with_options(database_url, DbOptions::default())
    }

    pub fn with_options<S: Into<String>>(
        database_url: S,
        options: DbOptions,
    ) -> Result<Self, Error> {
        let database_url = database_url.into();
        // Every `:memory:` connection opens a separate database.
        let pool_size = match database_url.as_str() {
            IN_MEMORY_URL => 1,
            _ => options.pool_size.max(1),
        };
        log::debug!(
            "Opening database [{}], pool size: {}, busy timeout: {}",
            database_url,
            pool_size,
            humantime::format_duration(options.busy_timeout)
        );

        let manager = ConnectionManager::new(database_url);
        let pool = Pool::builder()
            .max_size(pool_size)
            .connection_customizer(Box::new(ConnectionPragmas {
                busy_timeout: options.busy_timeout,
            }))
            .build(manager)?;
        Ok(DbExecutor { pool })
    }

    pub fn in_memory() -> Result<Self, Error> {
        Self::new(IN_MEMORY_URL)
    }

    pub fn apply_migration<F>(&self, migration: F) -> anyhow::Result<()>
    where
        F: FnOnce(
            &InnerConnType,
            &mut dyn std::io::Write,
        ) -> Result<(), diesel_migrations::RunMigrationsError>,
    {
        let conn = self.pool.get()?;
        let mut output = Vec::new();
        migration(&*conn, &mut output).map_err(Error::from)?;

        let output = String::from_utf8_lossy(&output);
        for line in output.lines().filter(|line| !line.is_empty()) {
            log::debug!("Migration: {}", line);
        }
        Ok(())
    }

    pub fn as_dao<'a, T: AsDao<'a>>(&'a self) -> T {
        AsDao::as_dao(&self.pool)
    }
}

pub trait AsDao<'a> {
    fn as_dao(pool: &'a PoolType) -> Self;
}

/// Runs `f` in a `BEGIN IMMEDIATE` transaction on the blocking pool.
///
/// The write lock is taken when the transaction starts, so every read inside
/// `f` sees the state its writes will be applied to.
pub async fn do_with_transaction<R, E, F>(pool: &PoolType, label: &'static str, f: F) -> Result<R, E>
where
    F: FnOnce(&ConnType) -> Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: From<Error> + From<diesel::result::Error> + Send + 'static,
{
    let pool = pool.clone();
    run_blocking(label, move || {
        let conn = pool.get().map_err(Error::from)?;
        conn.immediate_transaction(|| f(&conn))
    })
    .await
}

/// Runs `f` in a deferred transaction, for queries that only read.
pub async fn readonly_transaction<R, E, F>(pool: &PoolType, label: &'static str, f: F) -> Result<R, E>
where
    F: FnOnce(&ConnType) -> Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: From<Error> + From<diesel::result::Error> + Send + 'static,
{
    let pool = pool.clone();
    run_blocking(label, move || {
        let conn = pool.get().map_err(Error::from)?;
        conn.transaction(|| f(&conn))
    })
    .await
}

async fn run_blocking<R, E, F>(label: &'static str, f: F) -> Result<R, E>
where
    F: FnOnce() -> Result<R, E> + Send + 'static,
    R: Send + 'static,
    E: From<Error> + Send + 'static,
{
    log::trace!("Transaction [{}] started", label);
    match tokio::task::spawn_blocking(f).await {
        Ok(result) => {
            log::trace!("Transaction [{}] finished, ok: {}", label, result.is_ok());
            result
        }
        Err(e) => Err(Error::from(e).into()),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use diesel::sql_types::Integer;
    use diesel::RunQueryDsl;
    use tempdir::TempDir;

    #[derive(QueryableByName)]
    struct Value {
        #[sql_type = "Integer"]
        value: i32,
    }

    fn file_db(dir: &TempDir) -> DbExecutor {
        let path = dir.path().join("test.db");
        DbExecutor::new(path.to_string_lossy()).unwrap()
    }

    fn prepare(db: &DbExecutor) {
        db.pool
            .get()
            .unwrap()
            .batch_execute("CREATE TABLE counter (value INTEGER NOT NULL); INSERT INTO counter VALUES (0);")
            .unwrap();
    }

    fn read(conn: &ConnType) -> Result<i32, Error> {
        let rows = diesel::sql_query("SELECT value FROM counter").load::<Value>(conn)?;
        Ok(rows.first().map(|row| row.value).unwrap_or_default())
    }

    #[tokio::test]
    async fn test_transaction_commits() {
        let dir = TempDir::new("persistence").unwrap();
        let db = file_db(&dir);
        prepare(&db);

        do_with_transaction(&db.pool, "increment", |conn| {
            diesel::sql_query("UPDATE counter SET value = value + 1").execute(conn)?;
            Ok::<_, Error>(())
        })
        .await
        .unwrap();

        let value = readonly_transaction(&db.pool, "read", |conn| read(conn))
            .await
            .unwrap();
        assert_eq!(value, 1);
    }

    #[tokio::test]
    async fn test_transaction_rolls_back_on_error() {
        let dir = TempDir::new("persistence").unwrap();
        let db = file_db(&dir);
        prepare(&db);

        let result = do_with_transaction(&db.pool, "failing", |conn| {
            diesel::sql_query("UPDATE counter SET value = 10").execute(conn)?;
            Err::<(), _>(Error::Query(diesel::result::Error::RollbackTransaction))
        })
        .await;
        assert!(result.is_err());

        let value = readonly_transaction(&db.pool, "read", |conn| read(conn))
            .await
            .unwrap();
        assert_eq!(value, 0);
    }

    #[tokio::test]
    async fn test_foreign_keys_enforced() {
        let dir = TempDir::new("persistence").unwrap();
        let db = file_db(&dir);
        db.pool
            .get()
            .unwrap()
            .batch_execute(
                "CREATE TABLE parent (id TEXT PRIMARY KEY);
                 CREATE TABLE child (parent_id TEXT NOT NULL REFERENCES parent(id));",
            )
            .unwrap();

        let result = do_with_transaction(&db.pool, "orphan", |conn| {
            diesel::sql_query("INSERT INTO child VALUES ('missing')").execute(conn)?;
            Ok::<_, Error>(())
        })
        .await;
        assert!(matches!(result, Err(Error::Query(_))));
    }

    #[test]
    fn test_in_memory_pool_has_single_connection() {
        let db = DbExecutor::in_memory().unwrap();
        assert_eq!(db.pool.max_size(), 1);
    }
}
