//! Catalog persisted as one JSON document per record
//!
//! Layout: `{root}/{record_id}.json`. Every write goes through a temp file and
//! a rename. Mutations are serialized through a single lock so a
//! read-modify-write on one record cannot interleave with another.

use async_trait::async_trait;
use setu_core::{
    CaseId, CatalogEffects, EvidenceRecord, RecordId, RecordUpdate, Result, SetuError,
};
use std::io;
use std::path::{Path, PathBuf};
use tokio::fs;
use tokio::sync::Mutex;
use tracing::{debug, info, warn};

use super::{matches_case, most_recent, sort_newest_first};
use crate::fs::{prepare_dir, write_atomic};

const RECORD_SUFFIX: &str = ".json";

/// Durable catalog on the local filesystem
#[derive(Debug)]
pub struct FilesystemCatalog {
    root: PathBuf,
    write_lock: Mutex<()>,
}

impl FilesystemCatalog {
    /// Open (creating if needed) a catalog directory
    pub fn open(root: impl AsRef<Path>) -> Result<Self> {
        let root = prepare_dir(root.as_ref()).map_err(|e| {
            SetuError::storage(format!(
                "Failed to prepare catalog directory {}: {e}",
                root.as_ref().display()
            ))
        })?;
        info!("Opened evidence catalog at {:?}", root);
        Ok(Self {
            root,
            write_lock: Mutex::new(()),
        })
    }

    fn record_path(&self, id: RecordId) -> PathBuf {
        self.root.join(format!("{id}{RECORD_SUFFIX}"))
    }

    async fn read_record(&self, path: &Path) -> Result<Option<EvidenceRecord>> {
        match fs::read(path).await {
            Ok(bytes) => Ok(Some(serde_json::from_slice(&bytes)?)),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(None),
            Err(e) => Err(e.into()),
        }
    }

    async fn write_record(&self, record: &EvidenceRecord) -> Result<()> {
        let json = serde_json::to_vec_pretty(record)?;
        write_atomic(&self.record_path(record.id), &json).await?;
        Ok(())
    }

    /// Every readable record; unreadable documents are logged and skipped
    async fn scan(&self) -> Result<Vec<EvidenceRecord>> {
        let mut entries = fs::read_dir(&self.root).await?;
        let mut records = Vec::new();
        while let Some(entry) = entries.next_entry().await? {
            let path = entry.path();
            let is_record = path
                .file_name()
                .and_then(|n| n.to_str())
                .is_some_and(|n| n.ends_with(RECORD_SUFFIX) && !n.starts_with('.'));
            if !is_record {
                continue;
            }
            match self.read_record(&path).await {
                Ok(Some(record)) => records.push(record),
                Ok(None) => {}
                Err(e) => warn!(path = %path.display(), error = %e, "Skipping unreadable record"),
            }
        }
        Ok(records)
    }
}

#[async_trait]
impl CatalogEffects for FilesystemCatalog {
    async fn create_record(&self, record: EvidenceRecord) -> Result<RecordId> {
        let _guard = self.write_lock.lock().await;
        let path = self.record_path(record.id);
        if fs::try_exists(&path).await? {
            return Err(SetuError::conflict(format!(
                "record {} already exists",
                record.id
            )));
        }
        self.write_record(&record).await?;
        debug!(id = %record.id, case = %record.case_id, "Catalogued evidence record");
        Ok(record.id)
    }

    async fn get_record(&self, id: RecordId) -> Result<Option<EvidenceRecord>> {
        self.read_record(&self.record_path(id)).await
    }

    async fn find_by_case_and_name(
        &self,
        case_id: &CaseId,
        file_name: &str,
    ) -> Result<Option<EvidenceRecord>> {
        let records = self.scan().await?;
        Ok(most_recent(
            records
                .into_iter()
                .filter(|r| &r.case_id == case_id && r.file_name == file_name),
        ))
    }

    async fn update_record(&self, id: RecordId, update: RecordUpdate) -> Result<EvidenceRecord> {
        let _guard = self.write_lock.lock().await;
        let mut record = self
            .read_record(&self.record_path(id))
            .await?
            .ok_or_else(|| SetuError::not_found(format!("record {id}")))?;
        if !update.admits(&record) {
            return Err(SetuError::conflict(format!(
                "record {id} no longer satisfies the update precondition"
            )));
        }
        update.apply(&mut record);
        self.write_record(&record).await?;
        Ok(record)
    }

    async fn delete_record(&self, id: RecordId) -> Result<bool> {
        let _guard = self.write_lock.lock().await;
        match fs::remove_file(self.record_path(id)).await {
            Ok(()) => Ok(true),
            Err(e) if e.kind() == io::ErrorKind::NotFound => Ok(false),
            Err(e) => Err(e.into()),
        }
    }

    async fn list_records(&self, case_id: Option<&CaseId>) -> Result<Vec<EvidenceRecord>> {
        let mut records: Vec<_> = self
            .scan()
            .await?
            .into_iter()
            .filter(|r| matches_case(r, case_id))
            .collect();
        sort_newest_first(&mut records);
        Ok(records)
    }
}
