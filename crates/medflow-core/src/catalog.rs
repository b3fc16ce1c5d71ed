//! Reference catalog of specialties and practitioners
//!
//! Static configuration injected at construction. Order is significant: the
//! specialty list and each practitioner list are presented in the order they
//! were configured, and the first practitioner is the default choice.

use indexmap::IndexMap;
use serde::{Deserialize, Serialize};

/// Ordered mapping specialty -> practitioner display names
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct Catalog {
    entries: IndexMap<String, Vec<String>>,
}

impl Catalog {
    /// Create catalog from `(specialty, practitioners)` pairs
    #[must_use]
    pub fn new<S, P>(entries: impl IntoIterator<Item = (S, Vec<P>)>) -> Self
    where
        S: Into<String>,
        P: Into<String>,
    {
        Self {
            entries: entries
                .into_iter()
                .map(|(s, ps)| (s.into(), ps.into_iter().map(Into::into).collect()))
                .collect(),
        }
    }

    /// Specialties in configured order
    pub fn specialties(&self) -> impl Iterator<Item = &str> + '_ {
        self.entries.keys().map(String::as_str)
    }

    /// Practitioners for `specialty`; empty when the specialty is unknown
    #[must_use]
    pub fn practitioners(&self, specialty: &str) -> &[String] {
        self.entries.get(specialty).map(Vec::as_slice).unwrap_or(&[])
    }

    /// First listed practitioner for `specialty`
    #[must_use]
    pub fn default_practitioner(&self, specialty: &str) -> Option<&str> {
        self.practitioners(specialty).first().map(String::as_str)
    }

    /// Check if `specialty` is offered
    #[inline]
    #[must_use]
    pub fn contains(&self, specialty: &str) -> bool {
        self.entries.contains_key(specialty)
    }

    /// Number of specialties
    #[inline]
    #[must_use]
    pub fn len(&self) -> usize {
        self.entries.len()
    }

    /// Check if no specialty is offered
    #[inline]
    #[must_use]
    pub fn is_empty(&self) -> bool {
        self.entries.is_empty()
    }
}

impl Default for Catalog {
    fn default() -> Self {
        Self::new([
            (
                "Cardiología",
                vec!["Dr. Elena Torres", "Dr. Ricardo Méndez", "Dra. Paula Ruiz"],
            ),
            (
                "Medicina General",
                vec!["Dr. Ricardo Pérez", "Dra. Marta López", "Dr. Hugo Salazar"],
            ),
            (
                "Odontología",
                vec!["Dra. Claudia Ramos", "Dr. Andrés Molina", "Dra. Laura Castro"],
            ),
            (
                "Nutrición",
                vec!["Lic. Javier Soto", "Lic. Silvia Ortega", "Lic. Mario Díaz"],
            ),
            (
                "Oftalmología",
                vec!["Dra. Laura Montes", "Dr. Fernando Gil", "Dra. Isabel Soto"],
            ),
        ])
    }
}
