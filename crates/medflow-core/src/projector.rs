//! View projections over the repository
//!
//! Pure, on-demand derivations of what the presentation layer lists. The
//! repository is the single source of truth, so nothing is cached.

use crate::repository::AppointmentRepository;
use crate::types::{AppointmentRecord, CitizenCode};

/// Both lists of one owner, derived from a single read
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct AppointmentViews {
    /// Pending appointments, soonest first
    pub upcoming: Vec<AppointmentRecord>,
    /// Completed and cancelled appointments, oldest first
    pub history: Vec<AppointmentRecord>,
}

impl AppointmentViews {
    /// Split an owner-scoped, time-ordered list
    #[must_use]
    pub fn from_owned(owned: Vec<AppointmentRecord>) -> Self {
        let (upcoming, history) = owned.into_iter().partition(AppointmentRecord::is_upcoming);
        Self { upcoming, history }
    }

    /// Total records across both lists
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.upcoming.len() + self.history.len()
    }

    /// Check if both lists are empty
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.upcoming.is_empty() && self.history.is_empty()
    }
}

/// Derives upcoming/history views for an owner
#[derive(Debug, Clone)]
pub struct ViewProjector {
    repository: AppointmentRepository,
}

impl ViewProjector {
    /// Create projector over `repository`
    #[inline]
    #[must_use]
    pub fn new(repository: AppointmentRepository) -> Self {
        Self { repository }
    }

    /// Pending appointments of `owner`, soonest first
    pub async fn upcoming(&self, owner: &CitizenCode) -> Vec<AppointmentRecord> {
        self.views(owner).await.upcoming
    }

    /// Completed and cancelled appointments of `owner`, oldest first
    pub async fn history(&self, owner: &CitizenCode) -> Vec<AppointmentRecord> {
        self.views(owner).await.history
    }

    /// Both lists of `owner`
    pub async fn views(&self, owner: &CitizenCode) -> AppointmentViews {
        AppointmentViews::from_owned(self.repository.for_owner(owner).await)
    }
}
