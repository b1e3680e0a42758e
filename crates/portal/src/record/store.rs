//! Record store: filtered, sorted, paginated views over collections and
//! guarded stage transitions.
//!
//! Every operation loads the whole collection from the persistence
//! boundary, works on it in memory and, when it mutates, writes the whole
//! collection back. There is one logical writer; no version token guards
//! against concurrent read-modify-write cycles.

use std::cmp::Ordering;
use std::fmt;
use std::sync::Arc;
use std::time::Duration;

use serde::Serialize;
use serde_json::Value;

use super::entity::{Record, CREATED_DATE_KEY, ID_KEY, UPDATED_DATE_KEY};
use super::filter::RecordFilter;
use super::id::new_record_id;
use super::pagination::{paginate, Page, PageRequest};
use super::stage::{Stage, StageTable};
use crate::clock::{Clock, SystemClock};
use crate::config::PortalConfig;
use crate::error::StoreError;
use crate::storage::KeyValueStore;

type CompareFn<R> = dyn Fn(&R, &R) -> Ordering + Send + Sync;

/// Default ordering: most recently updated first, ties by id.
pub fn recently_updated_first<R: Record>(a: &R, b: &R) -> Ordering {
    b.updated_date()
        .cmp(&a.updated_date())
        .then_with(|| a.id().cmp(b.id()))
}

/// A `list` request: filter, page window and optional ordering.
pub struct ListQuery<R: Record> {
    pub filter: RecordFilter<R>,
    pub page: PageRequest,
    sort: Option<Arc<CompareFn<R>>>,
}

impl<R: Record> ListQuery<R> {
    pub fn new(filter: RecordFilter<R>, page: PageRequest) -> Self {
        Self {
            filter,
            page,
            sort: None,
        }
    }

    /// Orders results with `compare` instead of most-recently-updated first.
    pub fn sorted_by<F>(mut self, compare: F) -> Self
    where
        F: Fn(&R, &R) -> Ordering + Send + Sync + 'static,
    {
        self.sort = Some(Arc::new(compare));
        self
    }

    fn sort(&self, records: &mut [R]) {
        match &self.sort {
            Some(compare) => records.sort_by(|a, b| compare(a, b)),
            None => records.sort_by(recently_updated_first),
        }
    }
}

impl<R: Record> fmt::Debug for ListQuery<R> {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ListQuery")
            .field("filter", &self.filter)
            .field("page", &self.page)
            .field("custom_sort", &self.sort.is_some())
            .finish()
    }
}

/// Number of records sitting in one stage.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StageCount<S> {
    pub stage: S,
    pub count: usize,
    /// False for stages outside the transition chain.
    pub in_chain: bool,
}

/// Record store over a key-value persistence boundary.
///
/// Construct one per application and share it by reference; tests build a
/// fresh store over a [`MemoryStore`](crate::storage::MemoryStore).
pub struct RecordStore<B: KeyValueStore> {
    backend: B,
    clock: Arc<dyn Clock>,
    latency: Duration,
}

impl<B: KeyValueStore> RecordStore<B> {
    pub fn new(backend: B) -> Self {
        Self {
            backend,
            clock: Arc::new(SystemClock),
            latency: Duration::ZERO,
        }
    }

    /// Builds a store using the latency configured in `config`.
    pub fn from_config(backend: B, config: &PortalConfig) -> Self {
        Self::new(backend).with_latency(config.simulated_latency())
    }

    pub fn with_clock(mut self, clock: Arc<dyn Clock>) -> Self {
        self.clock = clock;
        self
    }

    /// Delays every operation by `latency` before it touches storage.
    pub fn with_latency(mut self, latency: Duration) -> Self {
        self.latency = latency;
        self
    }

    pub fn backend(&self) -> &B {
        &self.backend
    }

    pub fn clock(&self) -> &dyn Clock {
        self.clock.as_ref()
    }

    async fn simulate_latency(&self) {
        if !self.latency.is_zero() {
            tokio::time::sleep(self.latency).await;
        }
    }

    async fn load<R: Record>(&self) -> Result<Vec<R>, StoreError> {
        self.simulate_latency().await;
        let raw = self
            .backend
            .read(R::COLLECTION)
            .await
            .map_err(|e| StoreError::StorageUnavailable {
                key: R::COLLECTION.to_string(),
                source: e,
            })?;

        match raw {
            None => Ok(Vec::new()),
            Some(blob) => serde_json::from_str(&blob).map_err(|e| {
                log::error!("Collection '{}' holds malformed data: {}", R::COLLECTION, e);
                StoreError::Malformed {
                    key: R::COLLECTION.to_string(),
                    source: e,
                }
            }),
        }
    }

    async fn save<R: Record>(&self, records: &[R]) -> Result<(), StoreError> {
        let blob = serde_json::to_string(records).map_err(|e| StoreError::Encode {
            key: R::COLLECTION.to_string(),
            source: e,
        })?;
        self.backend
            .write(R::COLLECTION, blob)
            .await
            .map_err(|e| {
                log::error!("Failed to persist collection '{}': {}", R::COLLECTION, e);
                StoreError::StorageUnavailable {
                    key: R::COLLECTION.to_string(),
                    source: e,
                }
            })
    }

    fn position<R: Record>(records: &[R], id: &str) -> Result<usize, StoreError> {
        records
            .iter()
            .position(|r| r.id() == id)
            .ok_or_else(|| StoreError::NotFound {
                collection: R::COLLECTION.to_string(),
                id: id.to_string(),
            })
    }

    /// Filters, sorts and pages the collection.
    #[tracing::instrument(name = "store.list", skip_all, fields(collection = R::COLLECTION))]
    pub async fn list<R: Record>(&self, query: &ListQuery<R>) -> Result<Page<R>, StoreError> {
        let records = self.load::<R>().await?;
        let loaded = records.len();

        let mut matched = query.filter.apply(records, self.clock.now());
        query.sort(&mut matched);
        let page = paginate(matched, &query.page);

        log::debug!(
            "Listed {} of {} matching ({} stored) from '{}', page {}/{}",
            page.records.len(),
            page.pagination.total_records,
            loaded,
            R::COLLECTION,
            page.pagination.current_page,
            page.pagination.total_pages
        );
        Ok(page)
    }

    /// Returns the record with `id`.
    pub async fn get<R: Record>(&self, id: &str) -> Result<R, StoreError> {
        let mut records = self.load::<R>().await?;
        let idx = Self::position(&records, id)?;
        Ok(records.swap_remove(idx))
    }

    /// Creates a record at the domain's initial stage and appends it to the
    /// collection.
    #[tracing::instrument(name = "store.create", skip_all, fields(collection = R::COLLECTION))]
    pub async fn create<R: Record>(&self, draft: R::Draft) -> Result<R, StoreError> {
        let mut records = self.load::<R>().await?;

        let now = self.clock.now();
        let id = new_record_id(R::ID_PREFIX);
        let record = R::from_draft(id, draft, R::stage_table().initial(), now);
        records.push(record.clone());

        self.save(&records).await?;
        log::info!("Created {} record {}", R::COLLECTION, record.id());
        Ok(record)
    }

    /// Merges a JSON object patch into the record with `id`.
    ///
    /// `id` and `createdDate` never change; patch keys naming them are
    /// dropped. `updatedDate` is always stamped with the current time.
    #[tracing::instrument(name = "store.update_field", skip_all, fields(collection = R::COLLECTION, id = %id))]
    pub async fn update_field<R: Record>(&self, id: &str, patch: Value) -> Result<R, StoreError> {
        let Value::Object(patch) = patch else {
            return Err(StoreError::InvalidPatch {
                id: id.to_string(),
                reason: "patch must be a JSON object".to_string(),
            });
        };

        let mut records = self.load::<R>().await?;
        let idx = Self::position(&records, id)?;

        let invalid = |reason: String| StoreError::InvalidPatch {
            id: id.to_string(),
            reason,
        };

        let mut merged = match serde_json::to_value(&records[idx]) {
            Ok(Value::Object(map)) => map,
            Ok(_) => return Err(invalid("record does not serialize to an object".to_string())),
            Err(e) => return Err(invalid(e.to_string())),
        };
        for (key, value) in patch {
            if key == ID_KEY || key == CREATED_DATE_KEY || key == UPDATED_DATE_KEY {
                log::warn!(
                    "Ignoring patch of managed field '{}' on {} record {}",
                    key,
                    R::COLLECTION,
                    id
                );
                continue;
            }
            merged.insert(key, value);
        }

        let mut updated: R =
            serde_json::from_value(Value::Object(merged)).map_err(|e| invalid(e.to_string()))?;
        updated.validate().map_err(invalid)?;
        updated.set_updated_date(self.clock.now());
        records[idx] = updated.clone();

        self.save(&records).await?;
        Ok(updated)
    }

    /// Moves the record one step along the domain's stage chain.
    pub async fn advance_stage<R: Record>(&self, id: &str) -> Result<R, StoreError> {
        self.advance_stage_with(id, &R::stage_table()).await
    }

    /// Moves the record one step along `table`.
    ///
    /// At the end of the chain, or at a stage outside it, nothing is
    /// written and `TerminalStage` is returned.
    #[tracing::instrument(name = "store.advance_stage", skip_all, fields(collection = R::COLLECTION, id = %id))]
    pub async fn advance_stage_with<R: Record>(
        &self,
        id: &str,
        table: &StageTable<R::Stage>,
    ) -> Result<R, StoreError> {
        let mut records = self.load::<R>().await?;
        let idx = Self::position(&records, id)?;

        let current = records[idx].stage();
        let Some(next) = table.next(current) else {
            return Err(StoreError::TerminalStage {
                collection: R::COLLECTION.to_string(),
                id: id.to_string(),
                stage: current.to_string(),
            });
        };

        let now = self.clock.now();
        let record = &mut records[idx];
        table.enter(record, next, now);
        record.set_updated_date(now);
        let advanced = record.clone();

        self.save(&records).await?;
        log::info!(
            "Advanced {} record {} from '{}' to '{}'",
            R::COLLECTION,
            id,
            current,
            next
        );
        Ok(advanced)
    }

    /// Writes `records` as the collection if the collection key is absent.
    /// Returns whether the seed was written.
    pub async fn seed_if_absent<R: Record>(&self, records: Vec<R>) -> Result<bool, StoreError> {
        self.simulate_latency().await;
        let existing = self
            .backend
            .read(R::COLLECTION)
            .await
            .map_err(|e| StoreError::StorageUnavailable {
                key: R::COLLECTION.to_string(),
                source: e,
            })?;
        if existing.is_some() {
            return Ok(false);
        }

        self.save(&records).await?;
        log::info!("Seeded '{}' with {} records", R::COLLECTION, records.len());
        Ok(true)
    }

    /// Counts records per stage: chain stages in chain order, then any
    /// other stage the domain defines.
    pub async fn stage_summary<R: Record>(&self) -> Result<Vec<StageCount<R::Stage>>, StoreError> {
        let records = self.load::<R>().await?;
        let table = R::stage_table();

        let chain = table.stages().iter().copied();
        let off_chain = R::Stage::all()
            .iter()
            .copied()
            .filter(|stage| !table.contains(*stage));

        Ok(chain
            .chain(off_chain)
            .map(|stage| StageCount {
                stage,
                count: records.iter().filter(|r| r.stage() == stage).count(),
                in_chain: table.contains(stage),
            })
            .collect())
    }
}
