use log::debug;
use rusqlite::{Connection, OpenFlags, TransactionBehavior};
use std::path::{Path, PathBuf};
use std::time::Duration;
use thiserror::Error;

/// How long a connection waits for another writer to release the file lock.
const BUSY_TIMEOUT: Duration = Duration::from_secs(5);

#[derive(Debug, Error)]
pub enum SqliteDatabaseError {
    #[error("Could not access database: {source}")]
    RusqliteError {
        #[from]
        source: rusqlite::Error,
    },
    #[error("Could not apply database migrations: {source}")]
    MigrationError {
        #[from]
        source: refinery::Error,
    },
    #[error("Database is not writable: {source}")]
    ReadOnlyError { source: rusqlite::Error },
    #[error("Database task did not complete: {source}")]
    TaskError {
        #[from]
        source: tokio::task::JoinError,
    },
}

mod embedded {
    use refinery::embed_migrations;
    embed_migrations!("./sql_migrations");
}

pub fn apply_migrations(connection: &mut Connection) -> Result<(), SqliteDatabaseError> {
    let report = embedded::migrations::runner().run(connection)?;
    debug!("Applied migrations\n{:?}", report);
    Ok(())
}

/// SQLite quietly opens a write protected file read-only, so take the
/// write lock once to find out.
fn ensure_writable(connection: &mut Connection) -> Result<(), SqliteDatabaseError> {
    let transaction = connection
        .transaction_with_behavior(TransactionBehavior::Immediate)
        .map_err(|source| SqliteDatabaseError::ReadOnlyError { source })?;
    transaction.rollback()?;
    Ok(())
}

/// Handle to the weather database file.
///
/// The store holds no open connection. Every operation opens its own
/// connection and closes it again before returning, so the handle can be
/// cloned freely into request handlers.
#[derive(Debug, Clone)]
pub struct WeatherStore {
    file_path: PathBuf,
}

impl WeatherStore {
    pub fn new(file_path: impl Into<PathBuf>) -> WeatherStore {
        WeatherStore {
            file_path: file_path.into(),
        }
    }

    pub fn file_path(&self) -> &Path {
        &self.file_path
    }

    /// Make sure the weather table exists and the file accepts writes.
    /// Safe to call any number of times.
    pub fn initialize(&self) -> Result<(), SqliteDatabaseError> {
        let mut connection = self.connect()?;
        apply_migrations(&mut connection)?;
        ensure_writable(&mut connection)
    }

    /// Open a new connection, creating the file if it does not exist yet.
    pub fn connect(&self) -> Result<Connection, SqliteDatabaseError> {
        let connection = Connection::open_with_flags(
            &self.file_path,
            OpenFlags::SQLITE_OPEN_READ_WRITE
                | OpenFlags::SQLITE_OPEN_CREATE
                | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )?;
        connection.busy_timeout(BUSY_TIMEOUT)?;
        Ok(connection)
    }

    /// Run `f` on a fresh connection on the blocking thread pool.
    ///
    /// The connection is dropped when `f` returns, whether it succeeded or
    /// not.
    pub async fn with_connection<F, T>(&self, f: F) -> Result<T, SqliteDatabaseError>
    where
        F: FnOnce(&Connection) -> Result<T, rusqlite::Error> + Send + 'static,
        T: Send + 'static,
    {
        let store = self.clone();
        tokio::task::spawn_blocking(move || -> Result<T, SqliteDatabaseError> {
            let connection = store.connect()?;
            Ok(f(&connection)?)
        })
        .await?
    }
}
