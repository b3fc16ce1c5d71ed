//! Testing utilities for MedFlow workspace
//!
//! Shared test helpers and fixtures.

#![allow(missing_docs)]

use chrono::{DateTime, Utc};
use medflow_core::keys::APPOINTMENTS_KEY;
use medflow_core::{
    AppointmentId, AppointmentRecord, AppointmentRepository, AppointmentStatus, Catalog,
    CitizenCode, Identity, LifecycleEngine, NotificationSignal, Portal, PortalConfig,
};
use medflow_store::{InMemoryStore, SharedStore};
use std::sync::Arc;

pub fn cc(raw: &str) -> CitizenCode {
    CitizenCode::parse(raw).unwrap()
}

pub fn identity(raw_cc: &str, name: &str) -> Identity {
    Identity::new(cc(raw_cc), name)
}

pub fn at(rfc3339: &str) -> DateTime<Utc> {
    DateTime::parse_from_rfc3339(rfc3339)
        .unwrap()
        .with_timezone(&Utc)
}

pub fn create_test_record(owner: &str, scheduled_at: &str, status: AppointmentStatus) -> AppointmentRecord {
    AppointmentRecord {
        id: AppointmentId::new(),
        owner_id: cc(owner),
        specialty: "Cardiología".to_string(),
        practitioner: "Dr. Elena Torres".to_string(),
        scheduled_at: at(scheduled_at),
        notes: String::new(),
        status,
        created_at: at("2025-01-01T00:00:00Z"),
    }
}

pub fn memory_store() -> Arc<InMemoryStore> {
    Arc::new(InMemoryStore::new())
}

pub fn shared(store: &Arc<InMemoryStore>) -> SharedStore {
    store.clone()
}

/// Write `records` as the stored collection, bypassing the repository
pub fn seed_records(store: &InMemoryStore, records: &[AppointmentRecord]) {
    let raw = serde_json::to_string(records).unwrap();
    store.put_raw(APPOINTMENTS_KEY, &raw);
}

pub fn setup_engine(store: &Arc<InMemoryStore>) -> (LifecycleEngine, Arc<NotificationSignal>) {
    let signal = Arc::new(NotificationSignal::new());
    let engine = LifecycleEngine::new(
        AppointmentRepository::new(shared(store)),
        Arc::new(Catalog::default()),
        signal.clone(),
    );
    (engine, signal)
}

pub fn setup_portal() -> (Portal, Arc<InMemoryStore>) {
    setup_portal_with(PortalConfig::immediate())
}

pub fn setup_portal_with(config: PortalConfig) -> (Portal, Arc<InMemoryStore>) {
    let store = memory_store();
    (Portal::new(shared(&store), config), store)
}
