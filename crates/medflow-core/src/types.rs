//! Core types for MedFlow
//!
//! Defines the fundamental values of the appointment core:
//! - Citizen codes and session identities
//! - Appointment records and their status
//! - Creation requests
//! - Notification payloads
//!
//! Field names on the persisted types follow the layout already found in
//! stored data (`userCc`, `doctor`, `datetime`, ...), so collections written
//! by earlier clients keep loading.

use crate::error::ValidationError;
use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};
use std::str::FromStr;
use uuid::Uuid;

/// Citizen identification code (CC), the login and owner key
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct CitizenCode(String);

impl CitizenCode {
    /// Parse a citizen code, trimming surrounding whitespace
    ///
    /// # Errors
    /// Returns `ValidationError::EmptyCitizenCode` if nothing is left after trimming
    pub fn parse(raw: &str) -> Result<Self, ValidationError> {
        let trimmed = raw.trim();
        if trimmed.is_empty() {
            return Err(ValidationError::EmptyCitizenCode);
        }
        Ok(Self(trimmed.to_string()))
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl FromStr for CitizenCode {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Self::parse(s)
    }
}

impl std::fmt::Display for CitizenCode {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// The authenticated identity held by a session
///
/// Created on successful login, immutable, destroyed on logout.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Identity {
    /// Citizen code of the user
    #[serde(rename = "cc")]
    pub id: CitizenCode,
    /// Name shown to the user
    #[serde(rename = "name")]
    pub display_name: String,
    /// When the session began
    #[serde(rename = "loginTime")]
    pub session_started_at: DateTime<Utc>,
}

impl Identity {
    /// Create identity whose session starts now
    #[inline]
    #[must_use]
    pub fn new(id: CitizenCode, display_name: impl Into<String>) -> Self {
        Self::started_at(id, display_name, Utc::now())
    }

    /// Create identity with an explicit session start
    #[inline]
    #[must_use]
    pub fn started_at(
        id: CitizenCode,
        display_name: impl Into<String>,
        session_started_at: DateTime<Utc>,
    ) -> Self {
        Self {
            id,
            display_name: display_name.into(),
            session_started_at,
        }
    }
}

/// Unique appointment identifier
///
/// New ids are UUID v4 strings. Stored ids are kept opaque so records written
/// with any other id scheme still load.
#[derive(Debug, Clone, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(transparent)]
pub struct AppointmentId(String);

impl AppointmentId {
    /// Generate new appointment ID
    #[inline]
    #[must_use]
    pub fn new() -> Self {
        Self(Uuid::new_v4().to_string())
    }

    /// Wrap an existing id
    #[inline]
    #[must_use]
    pub fn from_raw(raw: impl Into<String>) -> Self {
        Self(raw.into())
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl Default for AppointmentId {
    fn default() -> Self {
        Self::new()
    }
}

impl std::fmt::Display for AppointmentId {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Appointment status
///
/// `Upcoming` is the only non-terminal state.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum AppointmentStatus {
    /// Requested and not yet held
    Upcoming,
    /// Held
    Completed,
    /// Called off
    Cancelled,
}

impl AppointmentStatus {
    /// All statuses, in lifecycle order
    pub const ALL: [AppointmentStatus; 3] = [Self::Upcoming, Self::Completed, Self::Cancelled];

    /// Check if no transition leaves this status
    #[inline]
    #[must_use]
    pub fn is_terminal(&self) -> bool {
        !matches!(self, Self::Upcoming)
    }

    /// Lowercase label, as persisted
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Upcoming => "upcoming",
            Self::Completed => "completed",
            Self::Cancelled => "cancelled",
        }
    }
}

impl std::fmt::Display for AppointmentStatus {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// A stored appointment
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct AppointmentRecord {
    /// Unique, immutable id
    pub id: AppointmentId,
    /// Owner citizen code, immutable
    #[serde(rename = "userCc")]
    pub owner_id: CitizenCode,
    /// Specialty label from the catalog
    pub specialty: String,
    /// Practitioner display name, empty when not chosen
    #[serde(rename = "doctor", default)]
    pub practitioner: String,
    /// Absolute appointment time
    #[serde(rename = "datetime")]
    pub scheduled_at: DateTime<Utc>,
    /// Free-text notes, empty when none
    #[serde(default)]
    pub notes: String,
    /// Lifecycle status
    pub status: AppointmentStatus,
    /// When the request was recorded
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl AppointmentRecord {
    /// Check if the record belongs to `owner`
    #[inline]
    #[must_use]
    pub fn is_owned_by(&self, owner: &CitizenCode) -> bool {
        &self.owner_id == owner
    }

    /// Check if the record is still pending
    #[inline]
    #[must_use]
    pub fn is_upcoming(&self) -> bool {
        self.status == AppointmentStatus::Upcoming
    }
}

/// Raw input of an appointment request, as typed by the user
///
/// Date and time arrive as separate strings (`YYYY-MM-DD`, `HH:MM`) and are
/// only combined by the lifecycle engine.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewAppointment {
    /// Specialty label
    pub specialty: String,
    /// Optional practitioner
    pub practitioner: Option<String>,
    /// Date, `YYYY-MM-DD`
    pub date: String,
    /// Time, `HH:MM`
    pub time: String,
    /// Optional notes
    pub notes: Option<String>,
}

impl NewAppointment {
    /// Create request without practitioner or notes
    #[inline]
    #[must_use]
    pub fn new(
        specialty: impl Into<String>,
        date: impl Into<String>,
        time: impl Into<String>,
    ) -> Self {
        Self {
            specialty: specialty.into(),
            practitioner: None,
            date: date.into(),
            time: time.into(),
            notes: None,
        }
    }

    /// With practitioner
    #[inline]
    #[must_use]
    pub fn with_practitioner(mut self, practitioner: impl Into<String>) -> Self {
        self.practitioner = Some(practitioner.into());
        self
    }

    /// With notes
    #[inline]
    #[must_use]
    pub fn with_notes(mut self, notes: impl Into<String>) -> Self {
        self.notes = Some(notes.into());
        self
    }
}

/// Outcome message for the presentation layer
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Notice {
    /// Short heading
    pub title: String,
    /// Longer explanation, possibly empty
    pub body: String,
}

impl Notice {
    /// Create notice
    #[inline]
    #[must_use]
    pub fn new(title: impl Into<String>, body: impl Into<String>) -> Self {
        Self {
            title: title.into(),
            body: body.into(),
        }
    }
}

impl std::fmt::Display for Notice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        if self.body.is_empty() {
            f.write_str(&self.title)
        } else {
            write!(f, "{}: {}", self.title, self.body)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn citizen_code_trims() {
        let cc = CitizenCode::parse("  A1 ").unwrap();
        assert_eq!(cc.as_str(), "A1");
        assert!(CitizenCode::parse("   ").is_err());
    }

    #[test]
    fn appointment_ids_are_unique() {
        let a = AppointmentId::new();
        let b = AppointmentId::new();
        assert_ne!(a, b);
        assert!(Uuid::parse_str(a.as_str()).is_ok());
    }

    #[test]
    fn status_terminality() {
        assert!(!AppointmentStatus::Upcoming.is_terminal());
        assert!(AppointmentStatus::Completed.is_terminal());
        assert!(AppointmentStatus::Cancelled.is_terminal());
    }

    #[test]
    fn record_reads_stored_layout() {
        // Shape written by earlier clients: timestamp-based id, no doctor field
        let raw = r#"{
            "id": "1714550400000-k3j9zq",
            "userCc": "admin123",
            "specialty": "Nutrición",
            "datetime": "2025-05-01T14:00:00.000Z",
            "status": "cancelled",
            "createdAt": "2025-04-20T10:00:00.000Z"
        }"#;

        let record: AppointmentRecord = serde_json::from_str(raw).unwrap();
        assert_eq!(record.id.as_str(), "1714550400000-k3j9zq");
        assert_eq!(record.owner_id.as_str(), "admin123");
        assert_eq!(record.practitioner, "");
        assert_eq!(record.notes, "");
        assert_eq!(record.status, AppointmentStatus::Cancelled);
    }

    #[test]
    fn identity_serialized_field_names() {
        let identity = Identity::new(CitizenCode::parse("A1").unwrap(), "Ana");
        let json = serde_json::to_value(&identity).unwrap();
        assert_eq!(json["cc"], "A1");
        assert_eq!(json["name"], "Ana");
        assert!(json.get("loginTime").is_some());
    }

    #[test]
    fn notice_display() {
        assert_eq!(Notice::new("Hola", "").to_string(), "Hola");
        assert_eq!(Notice::new("Hola", "mundo").to_string(), "Hola: mundo");
    }
}
