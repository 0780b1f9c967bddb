//! Document access records of one organization.

use std::collections::HashMap;

use chrono::Utc;
use ranklane_models::{AccessLevel, DocumentAccessRecord, DocumentId};

use crate::error::EngineError;

#[derive(Debug, Clone, Default)]
pub struct DocumentRegistry {
    records: HashMap<DocumentId, DocumentAccessRecord>,
}

impl DocumentRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_records<I>(records: I) -> Self
    where
        I: IntoIterator<Item = DocumentAccessRecord>,
    {
        Self {
            records: records
                .into_iter()
                .map(|record| (record.document_id, record))
                .collect(),
        }
    }

    pub fn get(&self, document_id: DocumentId) -> Option<&DocumentAccessRecord> {
        self.records.get(&document_id)
    }

    pub fn require(&self, document_id: DocumentId) -> Result<&DocumentAccessRecord, EngineError> {
        self.records
            .get(&document_id)
            .ok_or(EngineError::UnknownDocument(document_id))
    }

    pub fn records(&self) -> impl Iterator<Item = &DocumentAccessRecord> {
        self.records.values()
    }

    pub fn len(&self) -> usize {
        self.records.len()
    }

    pub fn is_empty(&self) -> bool {
        self.records.is_empty()
    }

    pub fn register(&mut self, record: DocumentAccessRecord) -> Result<(), EngineError> {
        if self.records.contains_key(&record.document_id) {
            return Err(EngineError::DuplicateDocument(record.document_id));
        }
        self.records.insert(record.document_id, record);
        Ok(())
    }

    pub fn set_access_level(
        &mut self,
        document_id: DocumentId,
        access_level: AccessLevel,
    ) -> Result<DocumentAccessRecord, EngineError> {
        let record = self
            .records
            .get_mut(&document_id)
            .ok_or(EngineError::UnknownDocument(document_id))?;
        if record.access_level != access_level {
            record.access_level = access_level;
            record.updated_at = Utc::now();
        }
        Ok(record.clone())
    }

    pub fn remove(&mut self, document_id: DocumentId) -> Result<DocumentAccessRecord, EngineError> {
        self.records
            .remove(&document_id)
            .ok_or(EngineError::UnknownDocument(document_id))
    }
}
