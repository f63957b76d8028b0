//! Persistent stores
//!
//! - `SqliteStore`: `contacts` (outcome history) + `autoreply` tables
//! - `MemoryStore`: same contracts kept in process memory

use std::path::Path;
use std::sync::{Arc, Mutex, PoisonError};

use contracts::{
    AutoReplyRule, AutoReplyStore, ContractError, DeliveryOutcome, OutcomeStore, StoredOutcome,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::{debug, instrument};

const SCHEMA: &str = "
    CREATE TABLE IF NOT EXISTS contacts (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        name TEXT NOT NULL,
        phone TEXT NOT NULL,
        status INTEGER NOT NULL
    );

    CREATE TABLE IF NOT EXISTS autoreply (
        id INTEGER PRIMARY KEY AUTOINCREMENT,
        trigger TEXT NOT NULL,
        message TEXT NOT NULL
    );

    CREATE INDEX IF NOT EXISTS idx_autoreply_trigger
    ON autoreply(trigger);
";

fn sql_error(err: rusqlite::Error) -> ContractError {
    ContractError::store(err.to_string())
}

/// SQLite-backed outcome and auto-reply store
///
/// The connection is shared behind a mutex; every query runs on the blocking
/// pool so the dispatch loop never stalls a runtime worker.
#[derive(Clone)]
pub struct SqliteStore {
    db: Arc<Mutex<Connection>>,
}

impl SqliteStore {
    /// Open or create the database file
    pub fn open(path: impl AsRef<Path>) -> Result<Self, ContractError> {
        let path = path.as_ref();
        if let Some(parent) = path.parent().filter(|p| !p.as_os_str().is_empty()) {
            std::fs::create_dir_all(parent)?;
        }
        let db = Connection::open(path).map_err(|e| {
            ContractError::store(format!("failed to open {}: {e}", path.display()))
        })?;
        Self::initialize(db)
    }

    /// In-memory database (for testing / dry runs)
    pub fn open_in_memory() -> Result<Self, ContractError> {
        let db = Connection::open_in_memory().map_err(sql_error)?;
        Self::initialize(db)
    }

    fn initialize(db: Connection) -> Result<Self, ContractError> {
        db.execute_batch(SCHEMA).map_err(sql_error)?;
        Ok(Self {
            db: Arc::new(Mutex::new(db)),
        })
    }

    async fn with_conn<T, F>(&self, f: F) -> Result<T, ContractError>
    where
        T: Send + 'static,
        F: FnOnce(&Connection) -> rusqlite::Result<T> + Send + 'static,
    {
        let db = Arc::clone(&self.db);
        tokio::task::spawn_blocking(move || {
            let conn = db.lock().unwrap_or_else(PoisonError::into_inner);
            f(&conn).map_err(sql_error)
        })
        .await
        .map_err(|e| ContractError::store(format!("store task failed: {e}")))?
    }
}

impl OutcomeStore for SqliteStore {
    #[instrument(
        name = "sqlite_store_insert",
        skip(self, outcome),
        fields(recipient = %outcome.recipient_name, delivered = outcome.delivered)
    )]
    async fn insert(&self, outcome: &DeliveryOutcome) -> Result<i64, ContractError> {
        let outcome = outcome.clone();
        let id = self
            .with_conn(move |conn| {
                conn.execute(
                    "INSERT INTO contacts (name, phone, status) VALUES (?1, ?2, ?3)",
                    params![
                        outcome.recipient_name,
                        outcome.destination_address,
                        outcome.delivered
                    ],
                )?;
                Ok(conn.last_insert_rowid())
            })
            .await?;
        debug!(id, "Outcome stored");
        Ok(id)
    }

    async fn select_all(&self) -> Result<Vec<StoredOutcome>, ContractError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, name, phone, status FROM contacts ORDER BY id ASC")?;
            let rows = stmt.query_map([], |row| {
                Ok(StoredOutcome {
                    id: row.get(0)?,
                    outcome: DeliveryOutcome {
                        recipient_name: row.get(1)?,
                        destination_address: row.get(2)?,
                        delivered: row.get(3)?,
                    },
                })
            })?;
            rows.collect()
        })
        .await
    }

    #[instrument(name = "sqlite_store_delete_all", skip(self))]
    async fn delete_all(&self) -> Result<usize, ContractError> {
        self.with_conn(|conn| conn.execute("DELETE FROM contacts", []))
            .await
    }
}

impl AutoReplyStore for SqliteStore {
    async fn insert_rule(&self, trigger: &str, message: &str) -> Result<i64, ContractError> {
        let (trigger, message) = (trigger.to_string(), message.to_string());
        self.with_conn(move |conn| {
            conn.execute(
                "INSERT INTO autoreply (trigger, message) VALUES (?1, ?2)",
                params![trigger, message],
            )?;
            Ok(conn.last_insert_rowid())
        })
        .await
    }

    async fn list_rules(&self) -> Result<Vec<AutoReplyRule>, ContractError> {
        self.with_conn(|conn| {
            let mut stmt =
                conn.prepare("SELECT id, trigger, message FROM autoreply ORDER BY id ASC")?;
            let rows = stmt.query_map([], row_to_rule)?;
            rows.collect()
        })
        .await
    }

    async fn find_rule(&self, trigger: &str) -> Result<Option<AutoReplyRule>, ContractError> {
        let trigger = trigger.to_string();
        self.with_conn(move |conn| {
            conn.query_row(
                "SELECT id, trigger, message FROM autoreply WHERE trigger = ?1 ORDER BY id LIMIT 1",
                [trigger],
                row_to_rule,
            )
            .optional()
        })
        .await
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, ContractError> {
        self.with_conn(move |conn| conn.execute("DELETE FROM autoreply WHERE id = ?1", [id]))
            .await
            .map(|removed| removed > 0)
    }
}

fn row_to_rule(row: &rusqlite::Row<'_>) -> rusqlite::Result<AutoReplyRule> {
    Ok(AutoReplyRule {
        id: row.get(0)?,
        trigger: row.get(1)?,
        message: row.get(2)?,
    })
}

/// In-process store
#[derive(Debug, Default)]
pub struct MemoryStore {
    inner: Mutex<MemoryTables>,
}

#[derive(Debug, Default)]
struct MemoryTables {
    next_id: i64,
    outcomes: Vec<StoredOutcome>,
    rules: Vec<AutoReplyRule>,
}

impl MemoryTables {
    fn next_id(&mut self) -> i64 {
        self.next_id += 1;
        self.next_id
    }
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Outcomes in insertion order
    pub fn outcomes(&self) -> Vec<DeliveryOutcome> {
        self.tables()
            .outcomes
            .iter()
            .map(|row| row.outcome.clone())
            .collect()
    }

    fn tables(&self) -> std::sync::MutexGuard<'_, MemoryTables> {
        self.inner.lock().unwrap_or_else(PoisonError::into_inner)
    }
}

impl OutcomeStore for MemoryStore {
    async fn insert(&self, outcome: &DeliveryOutcome) -> Result<i64, ContractError> {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.outcomes.push(StoredOutcome {
            id,
            outcome: outcome.clone(),
        });
        Ok(id)
    }

    async fn select_all(&self) -> Result<Vec<StoredOutcome>, ContractError> {
        Ok(self.tables().outcomes.clone())
    }

    async fn delete_all(&self) -> Result<usize, ContractError> {
        let mut tables = self.tables();
        let removed = tables.outcomes.len();
        tables.outcomes.clear();
        Ok(removed)
    }
}

impl AutoReplyStore for MemoryStore {
    async fn insert_rule(&self, trigger: &str, message: &str) -> Result<i64, ContractError> {
        let mut tables = self.tables();
        let id = tables.next_id();
        tables.rules.push(AutoReplyRule {
            id,
            trigger: trigger.to_string(),
            message: message.to_string(),
        });
        Ok(id)
    }

    async fn list_rules(&self) -> Result<Vec<AutoReplyRule>, ContractError> {
        Ok(self.tables().rules.clone())
    }

    async fn find_rule(&self, trigger: &str) -> Result<Option<AutoReplyRule>, ContractError> {
        Ok(self
            .tables()
            .rules
            .iter()
            .find(|rule| rule.trigger == trigger)
            .cloned())
    }

    async fn delete_rule(&self, id: i64) -> Result<bool, ContractError> {
        let mut tables = self.tables();
        let before = tables.rules.len();
        tables.rules.retain(|rule| rule.id != id);
        Ok(tables.rules.len() != before)
    }
}
