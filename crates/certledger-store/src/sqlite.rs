//! SQLite implementation of the Ledger trait.
//!
//! Uses rusqlite with bundled SQLite, wrapped in async via
//! tokio::spawn_blocking. Fields are stored in canonical form and checked
//! against the fingerprint on every read.

use std::path::Path;
use std::sync::{Arc, Mutex};

use async_trait::async_trait;
use certledger_core::{
    canonicalize, decode_canonical, fingerprint, CertificateFields, ContentId, Fingerprint,
};
use rusqlite::{params, Connection, OptionalExtension};
use tracing::debug;

use crate::error::{Result, StoreError};
use crate::migration;
use crate::traits::{check_consistent, now_millis, Ledger, LedgerRecord, RegisterResult};

/// SQLite-backed ledger.
///
/// Thread-safe via internal Mutex. Cloning shares the connection.
#[derive(Clone)]
pub struct SqliteLedger {
    conn: Arc<Mutex<Connection>>,
}

impl SqliteLedger {
    /// Open a ledger database at the given path, creating and migrating it
    /// as needed.
    pub fn open(path: impl AsRef<Path>) -> Result<Self> {
        let mut conn = Connection::open(path)?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Open an in-memory ledger database.
    pub fn open_memory() -> Result<Self> {
        let mut conn = Connection::open_in_memory()?;
        migration::migrate(&mut conn)?;
        Ok(Self {
            conn: Arc::new(Mutex::new(conn)),
        })
    }

    /// Run a blocking operation on the connection off the async runtime.
    async fn run<F, T>(&self, f: F) -> Result<T>
    where
        F: FnOnce(&Connection) -> Result<T> + Send + 'static,
        T: Send + 'static,
    {
        let conn = self.conn.clone();
        tokio::task::spawn_blocking(move || {
            let conn = conn.lock()?;
            f(&conn)
        })
        .await?
    }
}

fn row_to_record(fp: Fingerprint, row: &rusqlite::Row<'_>) -> Result<LedgerRecord> {
    let canonical: Vec<u8> = row.get("canonical")?;
    let blob_ref: String = row.get("blob_ref")?;
    let registered_at: i64 = row.get("registered_at")?;

    if fingerprint(&canonical) != fp {
        return Err(StoreError::InvalidData(format!(
            "stored fields for {fp} do not hash to it"
        )));
    }
    let fields = decode_canonical(&canonical)
        .map_err(|e| StoreError::InvalidData(format!("stored fields for {fp}: {e}")))?;
    let blob_ref = ContentId::parse(&blob_ref)
        .map_err(|e| StoreError::InvalidData(format!("stored blob ref for {fp}: {e}")))?;

    Ok(LedgerRecord {
        fingerprint: fp,
        fields,
        blob_ref,
        registered_at,
    })
}

#[async_trait]
impl Ledger for SqliteLedger {
    async fn register(
        &self,
        fingerprint: &Fingerprint,
        fields: &CertificateFields,
        blob_ref: &ContentId,
    ) -> Result<RegisterResult> {
        check_consistent(fingerprint, fields)?;
        let fp = *fingerprint;
        let canonical = canonicalize(fields);
        let blob_ref = blob_ref.to_string();

        self.run(move |conn| {
            let inserted = conn.execute(
                "INSERT OR IGNORE INTO certificates (fingerprint, canonical, blob_ref, registered_at)
                 VALUES (?1, ?2, ?3, ?4)",
                params![fp.as_bytes().as_slice(), canonical, blob_ref, now_millis()],
            )?;

            if inserted == 0 {
                debug!(fingerprint = %fp, "fingerprint already registered");
                Ok(RegisterResult::AlreadyRegistered)
            } else {
                debug!(fingerprint = %fp, "registered fingerprint");
                Ok(RegisterResult::Registered)
            }
        })
        .await
    }

    async fn is_registered(&self, fingerprint: &Fingerprint) -> Result<bool> {
        let fp = *fingerprint;
        self.run(move |conn| {
            let found: Option<i64> = conn
                .query_row(
                    "SELECT 1 FROM certificates WHERE fingerprint = ?1",
                    params![fp.as_bytes().as_slice()],
                    |row| row.get(0),
                )
                .optional()?;
            Ok(found.is_some())
        })
        .await
    }

    async fn get(&self, fingerprint: &Fingerprint) -> Result<Option<LedgerRecord>> {
        let fp = *fingerprint;
        self.run(move |conn| {
            let mut stmt = conn.prepare(
                "SELECT canonical, blob_ref, registered_at FROM certificates WHERE fingerprint = ?1",
            )?;
            let mut rows = stmt.query(params![fp.as_bytes().as_slice()])?;
            let record = match rows.next()? {
                Some(row) => Some(row_to_record(fp, row)?),
                None => None,
            };
            Ok(record)
        })
        .await
    }

    async fn count(&self) -> Result<u64> {
        self.run(|conn| {
            let n: i64 = conn.query_row("SELECT COUNT(*) FROM certificates", [], |row| row.get(0))?;
            Ok(n as u64)
        })
        .await
    }
}
