//! Error types for MedFlow Core
//!
//! Provides error handling for:
//! - Invalid appointment requests
//! - Transitions against unknown or terminal records
//! - Registration and login failures
//! - Operations attempted without a session
//! - Configuration loading
//!
//! Every user-facing error converts into a [`Notice`] carrying the Spanish
//! text shown by the presentation layer.

use crate::types::{AppointmentId, AppointmentStatus, Notice};
use medflow_store::StoreError;
use std::path::PathBuf;

/// Appointment request validation failures
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum ValidationError {
    /// Date, time or specialty blank after trimming
    #[error("missing required fields: {}", .0.join(", "))]
    MissingFields(Vec<&'static str>),

    /// Citizen code blank after trimming
    #[error("citizen code is empty")]
    EmptyCitizenCode,

    /// Specialty not in the configured catalog
    #[error("unknown specialty: {0}")]
    UnknownSpecialty(String),

    /// Date not in `YYYY-MM-DD` form
    #[error("invalid date: {0:?}")]
    InvalidDate(String),

    /// Time not in `HH:MM` form
    #[error("invalid time: {0:?}")]
    InvalidTime(String),

    /// Local date/time skipped by a clock change
    #[error("{date} {time} does not exist in the local time zone")]
    NonexistentLocalTime {
        /// Requested date
        date: String,
        /// Requested time
        time: String,
    },
}

impl ValidationError {
    /// Spanish message for the user
    #[must_use]
    pub fn user_message(&self) -> String {
        match self {
            Self::MissingFields(_) => {
                "Completa fecha, hora y especialidad para solicitar la cita.".to_string()
            }
            Self::EmptyCitizenCode => "Ingresa tu número de C.C.".to_string(),
            Self::UnknownSpecialty(s) => format!("La especialidad \"{s}\" no está disponible."),
            Self::InvalidDate(d) => format!("La fecha \"{d}\" no es válida (AAAA-MM-DD)."),
            Self::InvalidTime(t) => format!("La hora \"{t}\" no es válida (HH:MM)."),
            Self::NonexistentLocalTime { date, time } => {
                format!("La hora {time} del {date} no existe en la zona horaria local.")
            }
        }
    }

    /// Notice reporting the failure
    #[must_use]
    pub fn notice(&self) -> Notice {
        Notice::new("Datos incompletos", self.user_message())
    }
}

/// Appointment lifecycle errors
#[derive(Debug, thiserror::Error)]
pub enum AppointmentError {
    /// Request rejected before anything was written
    #[error("invalid appointment request: {0}")]
    Validation(#[from] ValidationError),

    /// No record with this id (or not visible to the caller)
    #[error("appointment not found: {0}")]
    NotFound(AppointmentId),

    /// Transition not allowed from the current status
    #[error("cannot move appointment {id} from {from} to {to}")]
    InvalidTransition {
        /// Record id
        id: AppointmentId,
        /// Current status
        from: AppointmentStatus,
        /// Requested status
        to: AppointmentStatus,
    },

    /// Persisting failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl AppointmentError {
    /// Spanish message for the user
    #[must_use]
    pub fn user_message(&self) -> String {
        self.notice().body
    }

    /// Check if the error comes from user input rather than the system
    #[inline]
    #[must_use]
    pub fn is_user_error(&self) -> bool {
        !matches!(self, Self::Store(_))
    }

    /// Notice reporting the failure
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Validation(e) => e.notice(),
            Self::NotFound(_) => Notice::new(
                "Cita no encontrada",
                "La cita seleccionada no existe o no pertenece a tu cuenta.",
            ),
            Self::InvalidTransition { from, .. } => Notice::new(
                "Cambio no permitido",
                match from {
                    AppointmentStatus::Cancelled => "La cita ya fue cancelada.",
                    AppointmentStatus::Completed => "La cita ya fue realizada.",
                    AppointmentStatus::Upcoming => "La cita no admite ese cambio.",
                },
            ),
            Self::Store(_) => storage_notice(),
        }
    }
}

/// Registration and login errors
#[derive(Debug, thiserror::Error)]
pub enum DirectoryError {
    /// A required registration field is blank
    #[error("missing required registration fields")]
    MissingFields,

    /// Phone number could not be normalized
    #[error("invalid phone number: {0:?}")]
    InvalidPhone(String),

    /// Citizen code or phone already registered
    #[error("an identity with this citizen code or phone already exists")]
    AlreadyRegistered,

    /// Login/secret pair not recognized
    #[error("invalid credentials")]
    InvalidCredentials,

    /// Persisting failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl DirectoryError {
    /// Spanish message for the user
    #[must_use]
    pub fn user_message(&self) -> String {
        self.notice().body
    }

    /// Notice reporting the failure
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::MissingFields => {
                Notice::new("Registro incompleto", "Completa los campos requeridos.")
            }
            Self::InvalidPhone(_) => Notice::new(
                "Registro incompleto",
                "El teléfono debe contener solo dígitos (mínimo 7).",
            ),
            Self::AlreadyRegistered => Notice::new(
                "Registro rechazado",
                "Ya existe un usuario con esa C.C. o teléfono.",
            ),
            Self::InvalidCredentials => Notice::new(
                "Inicio de sesión fallido",
                "Credenciales incorrectas. Verifica C.C/telefono y contraseña.",
            ),
            Self::Store(_) => storage_notice(),
        }
    }
}

/// Errors of the session-gated access layer
#[derive(Debug, thiserror::Error)]
pub enum AccessError {
    /// No authenticated session
    #[error("no authenticated session")]
    Unauthenticated,

    /// Appointment operation failed
    #[error(transparent)]
    Appointment(#[from] AppointmentError),

    /// Directory operation failed
    #[error(transparent)]
    Directory(#[from] DirectoryError),

    /// Session storage failed
    #[error("storage error: {0}")]
    Store(#[from] StoreError),
}

impl AccessError {
    /// Spanish message for the user
    #[must_use]
    pub fn user_message(&self) -> String {
        self.notice().body
    }

    /// Check if the caller must log in first
    #[inline]
    #[must_use]
    pub fn requires_login(&self) -> bool {
        matches!(self, Self::Unauthenticated)
    }

    /// Notice reporting the failure
    #[must_use]
    pub fn notice(&self) -> Notice {
        match self {
            Self::Unauthenticated => Notice::new(
                "Sesión requerida",
                "Inicia sesión para gestionar tus citas.",
            ),
            Self::Appointment(e) => e.notice(),
            Self::Directory(e) => e.notice(),
            Self::Store(_) => storage_notice(),
        }
    }
}

impl From<ValidationError> for AccessError {
    fn from(value: ValidationError) -> Self {
        Self::Appointment(AppointmentError::Validation(value))
    }
}

/// Configuration loading errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    /// File could not be read
    #[error("cannot read {path}: {source}")]
    Read {
        /// Config path
        path: PathBuf,
        /// Underlying error
        #[source]
        source: std::io::Error,
    },

    /// File is not valid TOML for [`crate::PortalConfig`]
    #[error("invalid configuration: {0}")]
    Parse(#[from] toml::de::Error),

    /// Parsed but inconsistent
    #[error("invalid configuration: {0}")]
    Invalid(String),
}

fn storage_notice() -> Notice {
    Notice::new(
        "Error de almacenamiento",
        "No fue posible guardar los cambios. Intenta de nuevo.",
    )
}
