//! Top-level orchestration: owns the history and the loading flag.
//!
//! A [`Session`] turns every extraction attempt into a record. Failures become
//! error records at the head of the history instead of being returned.

use async_trait::async_trait;
use time::OffsetDateTime;

use crate::client::Extractor;
use crate::form::{LoadingFlag, Submit};
use crate::store::{PersistMode, RecordStore};
use crate::{ExtractionRecord, Result};

pub struct Session<E: Extractor> {
    extractor: E,
    store: RecordStore,
    persist: PersistMode,
    loading: LoadingFlag,
}

impl<E: Extractor> Session<E> {
    pub fn new(extractor: E, store: RecordStore, persist: PersistMode) -> Self {
        Self { extractor, store, persist, loading: LoadingFlag::new() }
    }

    /// Shares an existing flag, so one indicator covers the session and a form.
    pub fn with_loading_flag(mut self, flag: LoadingFlag) -> Self {
        self.loading = flag;
        self
    }

    pub fn store(&self) -> &RecordStore {
        &self.store
    }

    pub fn store_mut(&mut self) -> &mut RecordStore {
        &mut self.store
    }

    pub fn persist_mode(&self) -> PersistMode {
        self.persist
    }

    pub fn is_loading(&self) -> bool {
        self.loading.is_set()
    }

    /// A handle that reads the loading state while an extraction is running.
    pub fn loading_flag(&self) -> LoadingFlag {
        self.loading.clone()
    }

    /// Runs one extraction and prepends the outcome to the history.
    ///
    /// Returns the new head record, which is a failure record when the
    /// extractor returned an error.
    pub async fn handle_extract(&mut self, url: &str) -> &ExtractionRecord {
        self.loading.set(true);

        let record = match self.extractor.extract(url).await {
            Ok(record) => {
                tracing::info!(%url, title = %record.title, status = %record.status, "extraction finished");
                record
            }
            Err(e) => {
                tracing::warn!(%url, error = %e, "extraction failed");
                ExtractionRecord::failure(url, e.user_message(), OffsetDateTime::now_utc())
            }
        };

        self.store.prepend(record);

        if self.persist == PersistMode::OnWrite
            && let Err(e) = self.store.save()
        {
            tracing::warn!(error = %e, "could not persist extraction history");
        }

        self.loading.set(false);
        &self.store.records()[0]
    }
}

#[async_trait]
impl<E: Extractor> Submit for Session<E> {
    async fn submit(&mut self, url: &str) -> Result<ExtractionRecord> {
        Ok(self.handle_extract(url).await.clone())
    }
}
