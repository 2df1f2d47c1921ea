use std::path::Path;

use fjall::{Config, Keyspace, PartitionCreateOptions, PartitionHandle};
use tracing::{debug, info};

use crate::api::models::{ProjectRecord, ReportRecord};

use super::error::Result;
use super::partitions::{encode_project_key, encode_report_key};

/// Fjall-backed persistent storage for report records and projects
#[derive(Clone)]
pub struct ReportStore {
    keyspace: Keyspace,
    reports: PartitionHandle,
    projects: PartitionHandle,
}

impl ReportStore {
    /// Open or create a store at the given path
    pub fn open<P: AsRef<Path>>(path: P) -> Result<Self> {
        let path = path.as_ref();
        info!("Opening report store at: {}", path.display());

        if let Some(parent) = path.parent() {
            std::fs::create_dir_all(parent)?;
        }

        let keyspace = Config::new(path).open()?;

        let reports = keyspace.open_partition("reports", PartitionCreateOptions::default())?;
        let projects = keyspace.open_partition("projects", PartitionCreateOptions::default())?;

        Ok(Self {
            keyspace,
            reports,
            projects,
        })
    }

    /// Store or update a report record. The ingest handler writes each record
    /// at most twice: once when persisted and once when a forwarding attempt
    /// resolves, both within the same request.
    pub fn put_report(&self, record: &ReportRecord) -> Result<()> {
        let key = encode_report_key(&record.id);
        let value = serde_json::to_vec(record)?;
        self.reports.insert(key, value)?;
        debug!("Stored report: {}", record.id);
        Ok(())
    }

    /// Get a report record by id
    pub fn get_report(&self, report_id: &str) -> Result<Option<ReportRecord>> {
        let key = encode_report_key(report_id);
        match self.reports.get(key)? {
            Some(value) => {
                let record = serde_json::from_slice(&value)?;
                Ok(Some(record))
            }
            None => Ok(None),
        }
    }

    /// Register (or re-register) a project
    pub fn put_project(&self, project: &ProjectRecord) -> Result<()> {
        let key = encode_project_key(&project.key);
        let value = serde_json::to_vec(project)?;
        self.projects.insert(key, value)?;
        debug!("Registered project: {}", project.key);
        Ok(())
    }

    /// Resolve a project key to a registered project
    pub fn get_project(&self, project_key: &str) -> Result<Option<ProjectRecord>> {
        let key = encode_project_key(project_key);
        match self.projects.get(key)? {
            Some(value) => {
                let project = serde_json::from_slice(&value)?;
                Ok(Some(project))
            }
            None => Ok(None),
        }
    }

    /// Persist all pending writes to disk
    pub fn persist(&self) -> Result<()> {
        self.keyspace.persist(fjall::PersistMode::SyncAll)?;
        Ok(())
    }

    /// Get internal statistics (for debugging/monitoring)
    pub fn stats(&self) -> Result<StoreStats> {
        let mut report_count = 0;
        let mut project_count = 0;

        for item in self.reports.iter() {
            item?;
            report_count += 1;
        }

        for item in self.projects.iter() {
            item?;
            project_count += 1;
        }

        Ok(StoreStats {
            report_count,
            project_count,
        })
    }
}

#[derive(Debug, Clone)]
pub struct StoreStats {
    pub report_count: usize,
    pub project_count: usize,
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::api::models::ReportStatus;
    use tempfile::TempDir;

    fn create_test_store() -> (ReportStore, TempDir) {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path().join("test_ledger")).unwrap();
        (store, temp_dir)
    }

    fn create_test_record(id: &str) -> ReportRecord {
        let mut record = ReportRecord::new(id.to_string(), "pk_test".to_string());
        record.title = "Button broken".to_string();
        record.has_screenshot = true;
        record.js_error_count = 2;
        record
    }

    #[test]
    fn test_open_store() {
        let temp_dir = TempDir::new().unwrap();
        let store = ReportStore::open(temp_dir.path().join("test_ledger"));
        assert!(store.is_ok());
    }

    #[test]
    fn test_put_and_get_report() {
        let (store, _temp) = create_test_store();
        let record = create_test_record("report_123");

        store.put_report(&record).unwrap();
        let retrieved = store.get_report("report_123").unwrap();

        assert!(retrieved.is_some());
        let retrieved = retrieved.unwrap();
        assert_eq!(retrieved.id, "report_123");
        assert_eq!(retrieved.title, "Button broken");
        assert!(retrieved.has_screenshot);
        assert_eq!(retrieved.js_error_count, 2);
    }

    #[test]
    fn test_get_nonexistent_report() {
        let (store, _temp) = create_test_store();
        let result = store.get_report("nonexistent").unwrap();
        assert!(result.is_none());
    }

    #[test]
    fn test_forwarding_outcome_written_once() {
        let (store, _temp) = create_test_store();
        let mut record = create_test_record("report_fwd");
        store.put_report(&record).unwrap();

        record.status = ReportStatus::Success;
        record.external_issue_key = Some("ENG-42".to_string());
        record.external_issue_url = Some("https://linear.app/t/issue/ENG-42".to_string());
        store.put_report(&record).unwrap();

        let retrieved = store.get_report("report_fwd").unwrap().unwrap();
        assert_eq!(retrieved.external_issue_key.as_deref(), Some("ENG-42"));
        assert!(matches!(retrieved.status, ReportStatus::Success));
    }

    #[test]
    fn test_project_registration() {
        let (store, _temp) = create_test_store();
        let project = ProjectRecord {
            key: "pk_live_abc".to_string(),
            name: "Storefront".to_string(),
            integration: None,
        };

        store.put_project(&project).unwrap();

        let found = store.get_project("pk_live_abc").unwrap().unwrap();
        assert_eq!(found.name, "Storefront");

        let missing = store.get_project("pk_other").unwrap();
        assert!(missing.is_none());
    }

    #[test]
    fn test_stats() {
        let (store, _temp) = create_test_store();

        store.put_report(&create_test_record("report_1")).unwrap();
        store
            .put_project(&ProjectRecord {
                key: "pk_1".to_string(),
                name: "One".to_string(),
                integration: None,
            })
            .unwrap();

        let stats = store.stats().unwrap();
        assert_eq!(stats.report_count, 1);
        assert_eq!(stats.project_count, 1);
    }

    #[test]
    fn test_persist() {
        let (store, _temp) = create_test_store();
        store.put_report(&create_test_record("report_persist")).unwrap();

        store.persist().unwrap();
    }
}
