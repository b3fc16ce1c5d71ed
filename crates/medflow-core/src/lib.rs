//! MedFlow Core - personal appointment scheduling
//!
//! The appointment record store, its status lifecycle and the
//! session-gated access layer guarding it:
//! - Resolves the authenticated identity from the session
//! - Validates and records appointment requests
//! - Applies status transitions (cancel, complete)
//! - Projects upcoming/history views per owner
//! - Reports outcomes on a single-slot notification signal
//!
//! Rendering, navigation and form state belong to the presentation layer;
//! this crate renders nothing.
//!
//! # Example
//!
//! ```rust,ignore
//! use medflow_core::{NewAppointment, Portal, PortalConfig};
//! use medflow_store::InMemoryStore;
//! use std::sync::Arc;
//!
//! # async fn example() -> Result<(), medflow_core::AccessError> {
//! let portal = Portal::new(Arc::new(InMemoryStore::new()), PortalConfig::immediate());
//! portal.login("admin123", "demo1234").await?;
//!
//! let request = NewAppointment::new("Cardiología", "2025-05-01", "09:00")
//!     .with_practitioner("Dr. Elena Torres");
//! let record = portal.request_appointment(request).await?;
//!
//! println!("Requested {}", record.id);
//! # Ok(())
//! # }
//! ```

#![warn(unreachable_pub)]

// Core modules
pub mod catalog;
pub mod config;
pub mod directory;
pub mod error;
pub mod lifecycle;
pub mod notification;
pub mod portal;
pub mod projector;
pub mod repository;
pub mod session;
pub mod state_machine;
pub mod types;

// Re-exports for convenience
pub use catalog::Catalog;
pub use config::{DemoAccount, PortalConfig};
pub use directory::{IdentityDirectory, PhoneNumber, RegisteredIdentity, Registration};
pub use error::{AccessError, AppointmentError, ConfigError, DirectoryError, ValidationError};
pub use lifecycle::{combine_date_time, LifecycleEngine};
pub use notification::NotificationSignal;
pub use portal::Portal;
pub use projector::{AppointmentViews, ViewProjector};
pub use repository::{select_for_owner, AppointmentRepository};
pub use session::Session;
pub use state_machine::TransitionPolicy;
pub use types::{
    AppointmentId, AppointmentRecord, AppointmentStatus, CitizenCode, Identity, NewAppointment,
    Notice,
};

/// Well-known storage keys
pub mod keys {
    /// Serialized [`crate::Identity`] of the open session
    pub const SESSION_KEY: &str = "mf_user";
    /// Serialized sequence of [`crate::AppointmentRecord`]
    pub const APPOINTMENTS_KEY: &str = "mf_appointments";
    /// Serialized sequence of [`crate::RegisteredIdentity`]
    pub const DIRECTORY_KEY: &str = "mf_users";
}

/// Prelude module for common imports
pub mod prelude {
    //! Common imports for working with MedFlow Core
    pub use crate::{
        AccessError, AppointmentId, AppointmentRecord, AppointmentStatus, CitizenCode, Identity,
        NewAppointment, Notice, Portal, PortalConfig, Registration,
    };
}

/// Version of this crate
pub const VERSION: &str = env!("CARGO_PKG_VERSION");
