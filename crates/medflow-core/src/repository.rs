//! Appointment repository
//!
//! Owns the canonical collection of appointment records for every owner,
//! persisted as one JSON array under a single key.
//!
//! # Concurrency
//!
//! Every mutation is a whole-collection read-modify-write: load all records,
//! change the in-memory copy, write all records back. This is not
//! compare-and-swap. Two independent writers sharing the same storage (two
//! open sessions, two processes on one data directory) can lose each other's
//! updates. Extending to multi-session use needs optimistic versioning of the
//! collection first.

use crate::keys::APPOINTMENTS_KEY;
use crate::types::{AppointmentId, AppointmentRecord, AppointmentStatus, CitizenCode};
use medflow_store::{read_json, write_json, SharedStore, StoreError};

/// Scoped read/write access to appointment records
#[derive(Debug, Clone)]
pub struct AppointmentRepository {
    store: SharedStore,
}

impl AppointmentRepository {
    /// Create repository over `store`
    #[inline]
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self { store }
    }

    /// Every record, in insertion order
    ///
    /// Absent, unreadable or malformed data yields an empty collection.
    pub async fn all(&self) -> Vec<AppointmentRecord> {
        match read_json::<Vec<AppointmentRecord>>(self.store.as_ref(), APPOINTMENTS_KEY).await {
            Ok(records) => records.unwrap_or_default(),
            Err(e) => {
                tracing::warn!(error = %e, "appointment collection unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    /// Records of `owner`, ascending by scheduled time
    pub async fn for_owner(&self, owner: &CitizenCode) -> Vec<AppointmentRecord> {
        let records = self.all().await;
        tracing::debug!(cc = %owner, total = records.len(), "loading owner appointments");
        select_for_owner(records, owner)
    }

    /// Record with `id`, if any
    pub async fn find(&self, id: &AppointmentId) -> Option<AppointmentRecord> {
        self.all().await.into_iter().find(|r| &r.id == id)
    }

    /// Number of stored records across all owners
    pub async fn len(&self) -> usize {
        self.all().await.len()
    }

    /// Check if no record is stored
    pub async fn is_empty(&self) -> bool {
        self.all().await.is_empty()
    }

    /// Add `record` at the end of the collection
    ///
    /// # Errors
    /// Returns the store error if the collection cannot be written
    pub async fn append(&self, record: AppointmentRecord) -> Result<(), StoreError> {
        let mut records = self.all().await;
        tracing::info!(id = %record.id, cc = %record.owner_id, "appending appointment");
        records.push(record);
        self.persist(&records).await
    }

    /// Overwrite the status of the record with `id`
    ///
    /// No legality check is made. Returns the updated record, or `None`
    /// (and writes nothing) when no record has this id.
    ///
    /// # Errors
    /// Returns the store error if the collection cannot be written
    pub async fn update_status(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
    ) -> Result<Option<AppointmentRecord>, StoreError> {
        self.update_status_checked(id, status, |_| Ok::<_, StoreError>(()))
            .await
    }

    /// Overwrite the status of the record with `id` if `guard` accepts it
    ///
    /// `guard` sees the record as loaded in the same read-modify-write cycle
    /// that persists the change. If it fails, nothing is written and its
    /// error is returned.
    ///
    /// # Errors
    /// - the error returned by `guard`
    /// - the store error (converted) if the collection cannot be written
    pub async fn update_status_checked<E, F>(
        &self,
        id: &AppointmentId,
        status: AppointmentStatus,
        guard: F,
    ) -> Result<Option<AppointmentRecord>, E>
    where
        E: From<StoreError>,
        F: FnOnce(&AppointmentRecord) -> Result<(), E>,
    {
        let mut records = self.all().await;
        let Some(record) = records.iter_mut().find(|r| &r.id == id) else {
            tracing::debug!(%id, "status update for unknown appointment");
            return Ok(None);
        };

        guard(record)?;

        let previous = record.status;
        record.status = status;
        let updated = record.clone();

        self.persist(&records).await?;
        tracing::info!(%id, from = %previous, to = %status, "appointment status updated");
        Ok(Some(updated))
    }

    async fn persist(&self, records: &[AppointmentRecord]) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), APPOINTMENTS_KEY, records).await
    }
}

/// Records of `owner` from `records`, ascending by scheduled time
///
/// The sort is stable: records scheduled at the same instant keep their
/// insertion order.
#[must_use]
pub fn select_for_owner(
    records: impl IntoIterator<Item = AppointmentRecord>,
    owner: &CitizenCode,
) -> Vec<AppointmentRecord> {
    let mut owned: Vec<_> = records
        .into_iter()
        .filter(|r| r.is_owned_by(owner))
        .collect();
    owned.sort_by_key(|r| r.scheduled_at);
    owned
}
