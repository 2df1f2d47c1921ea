/// Fjall-based persistence layer for report records and project registrations
///
/// This module provides durable storage for the ingestion service. It uses
/// Fjall (an embedded LSM key-value store) to persist:
///
/// - Report records (one row per submission, forwarding outcome included)
/// - Project registrations (project key -> project, seeded from config)
///
/// Report rows are created by the ingest handler and mutated at most once,
/// by the same request, when a forwarding attempt resolves. Nothing in this
/// core deletes them; attachment cleanup is a separate collaborator.
///
/// ## Usage
///
/// ```rust,ignore
/// use quickbug::ledger::ReportStore;
///
/// let store = ReportStore::open("data/ledger")?;
/// store.put_report(&record)?;
/// let record = store.get_report("0193e5a4-…")?;
/// ```

pub mod error;
pub mod partitions;
pub mod store;

pub use error::{LedgerError, Result};
pub use store::{ReportStore, StoreStats};
