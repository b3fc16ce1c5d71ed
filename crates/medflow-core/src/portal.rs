//! Portal: the session-gated access layer
//!
//! Entry point for the presentation layer. The portal:
//! - Authenticates against the identity directory and opens the session
//! - Resolves the session before every appointment operation
//! - Scopes reads and transitions to the session owner
//! - Reports every outcome on the notification signal

use crate::catalog::Catalog;
use crate::config::PortalConfig;
use crate::directory::{IdentityDirectory, Registration, RegisteredIdentity};
use crate::error::AccessError;
use crate::lifecycle::LifecycleEngine;
use crate::notification::NotificationSignal;
use crate::projector::{AppointmentViews, ViewProjector};
use crate::repository::AppointmentRepository;
use crate::session::Session;
use crate::types::{AppointmentId, AppointmentRecord, Identity, NewAppointment, Notice};
use medflow_store::SharedStore;
use std::sync::Arc;

/// The session-gated facade over the appointment core
#[derive(Debug)]
pub struct Portal {
    /// Configuration
    config: PortalConfig,
    /// Current identity
    session: Session,
    /// Registered identities
    directory: IdentityDirectory,
    /// Canonical records
    repository: AppointmentRepository,
    /// Creation and transitions
    lifecycle: LifecycleEngine,
    /// Upcoming/history views
    projector: ViewProjector,
    /// Outcome channel
    signal: Arc<NotificationSignal>,
}

impl Portal {
    /// Create portal over `store`
    #[must_use]
    pub fn new(store: SharedStore, config: PortalConfig) -> Self {
        let signal = Arc::new(NotificationSignal::new());
        let repository = AppointmentRepository::new(store.clone());
        let lifecycle = LifecycleEngine::from_config(repository.clone(), &config, signal.clone());
        let directory = IdentityDirectory::new(store.clone())
            .with_demo_account(config.demo_account.clone())
            .with_delay(config.auth_delay());

        Self {
            session: Session::new(store),
            projector: ViewProjector::new(repository.clone()),
            directory,
            repository,
            lifecycle,
            signal,
            config,
        }
    }

    /// Configuration in use
    #[inline]
    #[must_use]
    pub fn config(&self) -> &PortalConfig {
        &self.config
    }

    /// Specialties and practitioners offered
    #[inline]
    #[must_use]
    pub fn catalog(&self) -> &Catalog {
        &self.config.catalog
    }

    /// Outcome channel
    #[inline]
    #[must_use]
    pub fn signal(&self) -> &NotificationSignal {
        &self.signal
    }

    /// Underlying session
    #[inline]
    #[must_use]
    pub fn session(&self) -> &Session {
        &self.session
    }

    /// Underlying repository (not session-gated)
    #[inline]
    #[must_use]
    pub fn repository(&self) -> &AppointmentRepository {
        &self.repository
    }

    /// Underlying lifecycle engine (not session-gated)
    #[inline]
    #[must_use]
    pub fn lifecycle(&self) -> &LifecycleEngine {
        &self.lifecycle
    }

    /// Underlying identity directory
    #[inline]
    #[must_use]
    pub fn directory(&self) -> &IdentityDirectory {
        &self.directory
    }

    /// Register a new identity; does not log in
    ///
    /// # Errors
    /// Returns `AccessError::Directory` if registration is rejected
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<RegisteredIdentity, AccessError> {
        let entry = self
            .directory
            .register(registration)
            .await
            .map_err(|e| self.fail(e.into()))?;
        self.signal.set(
            "Registro exitoso",
            "Ya puedes iniciar sesión con tu C.C. o teléfono.",
        );
        Ok(entry)
    }

    /// Authenticate and open the session
    ///
    /// # Errors
    /// - `AccessError::Directory` on bad credentials
    /// - `AccessError::Store` if the session cannot be written
    pub async fn login(&self, login: &str, secret: &str) -> Result<Identity, AccessError> {
        let identity = self
            .directory
            .authenticate(login, secret)
            .await
            .map_err(|e| self.fail(e.into()))?;
        self.session
            .start(&identity)
            .await
            .map_err(|e| self.fail(e.into()))?;
        self.signal.set(
            "Sesión iniciada",
            format!("Bienvenido/a, {}.", identity.display_name),
        );
        Ok(identity)
    }

    /// Close the session; idempotent
    ///
    /// # Errors
    /// Returns `AccessError::Store` if the session cannot be removed
    pub async fn logout(&self) -> Result<(), AccessError> {
        self.session.end().await.map_err(|e| self.fail(e.into()))?;
        self.signal.set("Sesión cerrada", "Has cerrado sesión.");
        Ok(())
    }

    /// Identity of the open session
    pub async fn current(&self) -> Option<Identity> {
        self.session.resolve().await
    }

    /// Identity of the open session, or `Unauthenticated`
    ///
    /// # Errors
    /// Returns `AccessError::Unauthenticated` if no session is open
    pub async fn require_identity(&self) -> Result<Identity, AccessError> {
        match self.session.resolve().await {
            Some(identity) => Ok(identity),
            None => Err(self.fail(AccessError::Unauthenticated)),
        }
    }

    /// Request an appointment for the session owner
    ///
    /// # Errors
    /// - `AccessError::Unauthenticated` if no session is open
    /// - `AccessError::Appointment` if the lifecycle engine rejects the request
    pub async fn request_appointment(
        &self,
        request: NewAppointment,
    ) -> Result<AppointmentRecord, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.lifecycle.create(&identity.id, request).await?)
    }

    /// Pending appointments of the session owner, soonest first
    ///
    /// # Errors
    /// Returns `AccessError::Unauthenticated` if no session is open
    pub async fn upcoming(&self) -> Result<Vec<AppointmentRecord>, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.projector.upcoming(&identity.id).await)
    }

    /// Completed and cancelled appointments of the session owner
    ///
    /// # Errors
    /// Returns `AccessError::Unauthenticated` if no session is open
    pub async fn history(&self) -> Result<Vec<AppointmentRecord>, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.projector.history(&identity.id).await)
    }

    /// Both lists of the session owner from one read
    ///
    /// # Errors
    /// Returns `AccessError::Unauthenticated` if no session is open
    pub async fn views(&self) -> Result<AppointmentViews, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.projector.views(&identity.id).await)
    }

    /// Cancel one of the session owner's appointments
    ///
    /// # Errors
    /// - `AccessError::Unauthenticated` if no session is open
    /// - `AccessError::Appointment` with `NotFound` if the record belongs to
    ///   someone else, or any lifecycle error
    pub async fn cancel(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.lifecycle.cancel_as(&identity.id, id).await?)
    }

    /// Mark one of the session owner's appointments as held
    ///
    /// # Errors
    /// Same as [`Self::cancel`]
    pub async fn complete(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AccessError> {
        let identity = self.require_identity().await?;
        Ok(self.lifecycle.complete_as(&identity.id, id).await?)
    }

    /// Pending notice, cleared
    pub fn take_notice(&self) -> Option<Notice> {
        self.signal.acknowledge()
    }

    fn fail(&self, error: AccessError) -> AccessError {
        self.signal.emit(error.notice());
        error
    }
}
