//! Appointment lifecycle engine
//!
//! Creation workflow and status transitions. Every outcome, successful or
//! not, is reported on the [`NotificationSignal`] in addition to being
//! returned.

use crate::catalog::Catalog;
use crate::config::PortalConfig;
use crate::error::{AppointmentError, ValidationError};
use crate::notification::NotificationSignal;
use crate::repository::AppointmentRepository;
use crate::state_machine::{validate_transition, TransitionPolicy};
use crate::types::{
    AppointmentId, AppointmentRecord, AppointmentStatus, CitizenCode, NewAppointment, Notice,
};
use chrono::{DateTime, Local, NaiveDate, NaiveTime, TimeZone, Utc};
use std::sync::Arc;
use std::time::Duration;

const DATE_FORMAT: &str = "%Y-%m-%d";
const TIME_FORMATS: [&str; 2] = ["%H:%M", "%H:%M:%S"];

/// Creates appointments and applies status transitions
#[derive(Debug, Clone)]
pub struct LifecycleEngine {
    repository: AppointmentRepository,
    catalog: Arc<Catalog>,
    signal: Arc<NotificationSignal>,
    policy: TransitionPolicy,
    commit_delay: Duration,
}

impl LifecycleEngine {
    /// Create engine with strict transitions and no commit delay
    #[inline]
    #[must_use]
    pub fn new(
        repository: AppointmentRepository,
        catalog: Arc<Catalog>,
        signal: Arc<NotificationSignal>,
    ) -> Self {
        Self {
            repository,
            catalog,
            signal,
            policy: TransitionPolicy::Strict,
            commit_delay: Duration::ZERO,
        }
    }

    /// Create engine following `config`
    #[must_use]
    pub fn from_config(
        repository: AppointmentRepository,
        config: &PortalConfig,
        signal: Arc<NotificationSignal>,
    ) -> Self {
        Self::new(repository, Arc::new(config.catalog.clone()), signal)
            .with_policy(config.transition_policy)
            .with_commit_delay(config.commit_delay())
    }

    /// With transition policy
    #[inline]
    #[must_use]
    pub fn with_policy(mut self, policy: TransitionPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// With delay applied before a new appointment is committed
    #[inline]
    #[must_use]
    pub fn with_commit_delay(mut self, delay: Duration) -> Self {
        self.commit_delay = delay;
        self
    }

    /// Active transition policy
    #[inline]
    #[must_use]
    pub fn policy(&self) -> TransitionPolicy {
        self.policy
    }

    /// Validate and record a new appointment for `owner`
    ///
    /// # Workflow
    /// 1. Check date, time and specialty are present and valid
    /// 2. Combine date and time in the local time zone
    /// 3. Wait the commit delay
    /// 4. Append the Upcoming record
    ///
    /// # Errors
    /// - `AppointmentError::Validation` if the request is incomplete or
    ///   malformed; nothing is written
    /// - `AppointmentError::Store` if the record cannot be persisted
    pub async fn create(
        &self,
        owner: &CitizenCode,
        request: NewAppointment,
    ) -> Result<AppointmentRecord, AppointmentError> {
        let result = self.try_create(owner, request).await;
        match &result {
            Ok(_) => self.signal.set(
                "Cita solicitada",
                "La cita ha sido agregada a tu lista de próximas citas.",
            ),
            Err(e) => {
                tracing::warn!(cc = %owner, error = %e, "appointment request rejected");
                self.signal.emit(e.notice());
            }
        }
        result
    }

    async fn try_create(
        &self,
        owner: &CitizenCode,
        request: NewAppointment,
    ) -> Result<AppointmentRecord, AppointmentError> {
        let (specialty, scheduled_at) = self.validate(&request)?;

        // No cancellation path: once started the request always commits
        if !self.commit_delay.is_zero() {
            tokio::time::sleep(self.commit_delay).await;
        }

        let record = AppointmentRecord {
            id: AppointmentId::new(),
            owner_id: owner.clone(),
            specialty,
            practitioner: trimmed_or_empty(request.practitioner.as_deref()),
            scheduled_at,
            notes: trimmed_or_empty(request.notes.as_deref()),
            status: AppointmentStatus::Upcoming,
            created_at: Utc::now(),
        };

        self.repository.append(record.clone()).await?;
        Ok(record)
    }

    fn validate(
        &self,
        request: &NewAppointment,
    ) -> Result<(String, DateTime<Utc>), ValidationError> {
        let date = request.date.trim();
        let time = request.time.trim();
        let specialty = request.specialty.trim();

        let missing: Vec<&'static str> = [("date", date), ("time", time), ("specialty", specialty)]
            .into_iter()
            .filter(|(_, value)| value.is_empty())
            .map(|(name, _)| name)
            .collect();
        if !missing.is_empty() {
            return Err(ValidationError::MissingFields(missing));
        }

        if !self.catalog.contains(specialty) {
            return Err(ValidationError::UnknownSpecialty(specialty.to_string()));
        }

        let scheduled_at = combine_date_time(&Local, date, time)?;
        Ok((specialty.to_string(), scheduled_at))
    }

    /// Mark the appointment as cancelled
    ///
    /// Returns the updated record; `None` only under the lenient policy when
    /// no record has this id.
    ///
    /// # Errors
    /// - `AppointmentError::NotFound` (strict) if no record has this id
    /// - `AppointmentError::InvalidTransition` (strict) if the record is terminal
    /// - `AppointmentError::Store` if the change cannot be persisted
    pub async fn cancel(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AppointmentError> {
        self.transition(None, id, AppointmentStatus::Cancelled).await
    }

    /// Mark the appointment as held
    ///
    /// Same contract as [`Self::cancel`].
    ///
    /// # Errors
    /// See [`Self::cancel`]
    pub async fn complete(
        &self,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AppointmentError> {
        self.transition(None, id, AppointmentStatus::Completed).await
    }

    /// Cancel on behalf of `owner`
    ///
    /// Ownership is checked on the same snapshot that gets written; a record
    /// of another owner is reported as `NotFound` under either policy.
    ///
    /// # Errors
    /// See [`Self::cancel`]
    pub async fn cancel_as(
        &self,
        owner: &CitizenCode,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AppointmentError> {
        self.transition(Some(owner), id, AppointmentStatus::Cancelled)
            .await
    }

    /// Complete on behalf of `owner`
    ///
    /// # Errors
    /// See [`Self::cancel_as`]
    pub async fn complete_as(
        &self,
        owner: &CitizenCode,
        id: &AppointmentId,
    ) -> Result<Option<AppointmentRecord>, AppointmentError> {
        self.transition(Some(owner), id, AppointmentStatus::Completed)
            .await
    }

    async fn transition(
        &self,
        owner: Option<&CitizenCode>,
        id: &AppointmentId,
        to: AppointmentStatus,
    ) -> Result<Option<AppointmentRecord>, AppointmentError> {
        let policy = self.policy;
        let updated = self
            .repository
            .update_status_checked(id, to, |current| {
                if let Some(owner) = owner.filter(|o| !current.is_owned_by(o)) {
                    tracing::warn!(%id, cc = %owner, "transition on foreign appointment");
                    return Err(AppointmentError::NotFound(id.clone()));
                }
                if policy == TransitionPolicy::Strict {
                    validate_transition(current.status, to).map_err(|e| {
                        AppointmentError::InvalidTransition {
                            id: id.clone(),
                            from: e.from,
                            to: e.to,
                        }
                    })?;
                }
                Ok(())
            })
            .await;

        let result = match (policy, updated) {
            (TransitionPolicy::Strict, Ok(None)) => Err(AppointmentError::NotFound(id.clone())),
            (_, other) => other,
        };

        match &result {
            Ok(_) => self.signal.emit(transition_notice(to)),
            Err(e) => {
                tracing::warn!(%id, to = %to, error = %e, "status change rejected");
                self.signal.emit(e.notice());
            }
        }
        result
    }
}

/// Combine a `YYYY-MM-DD` date and an `HH:MM` time in `tz`
///
/// Seconds (`HH:MM:SS`) are accepted. An ambiguous local time resolves to its
/// earliest instant.
///
/// # Errors
/// - `ValidationError::InvalidDate` / `InvalidTime` on unparsable input
/// - `ValidationError::NonexistentLocalTime` if the wall-clock time is skipped in `tz`
pub fn combine_date_time<Tz: TimeZone>(
    tz: &Tz,
    date: &str,
    time: &str,
) -> Result<DateTime<Utc>, ValidationError> {
    let day = NaiveDate::parse_from_str(date, DATE_FORMAT)
        .map_err(|_| ValidationError::InvalidDate(date.to_string()))?;
    let clock = TIME_FORMATS
        .iter()
        .find_map(|format| NaiveTime::parse_from_str(time, format).ok())
        .ok_or_else(|| ValidationError::InvalidTime(time.to_string()))?;

    tz.from_local_datetime(&day.and_time(clock))
        .earliest()
        .map(|local| local.with_timezone(&Utc))
        .ok_or_else(|| ValidationError::NonexistentLocalTime {
            date: date.to_string(),
            time: time.to_string(),
        })
}

fn transition_notice(to: AppointmentStatus) -> Notice {
    match to {
        AppointmentStatus::Cancelled => Notice::new(
            "Cita cancelada",
            "La cita ha sido marcada como cancelada.",
        ),
        AppointmentStatus::Completed => Notice::new(
            "Cita completada",
            "La cita ha sido marcada como realizada.",
        ),
        AppointmentStatus::Upcoming => Notice::new("Cita actualizada", ""),
    }
}

fn trimmed_or_empty(value: Option<&str>) -> String {
    value.map(str::trim).unwrap_or_default().to_string()
}
