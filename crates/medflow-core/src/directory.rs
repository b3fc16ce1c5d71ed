//! Identity directory: registration and login
//!
//! Registered identities are stored as one JSON array. Secrets are kept as a
//! SHA-256 digest bound to the citizen code. Entries written by earlier
//! clients carry a clear-text `password` instead; they still log in, and the
//! first successful login replaces it with the digest. A configured demo
//! account is checked before the directory.
//!
//! Entries that do not decode are kept verbatim and written back untouched.
//! A stored value that is not an array at all is never overwritten:
//! registration fails instead.

use crate::config::DemoAccount;
use crate::error::DirectoryError;
use crate::keys::DIRECTORY_KEY;
use crate::types::{CitizenCode, Identity};
use chrono::{DateTime, Utc};
use medflow_store::{read_json, write_json, SharedStore, StoreError};
use serde::{Deserialize, Serialize};
use serde_json::Value;
use sha2::{Digest, Sha256};
use std::time::Duration;

const MIN_PHONE_DIGITS: usize = 7;
const MAX_PHONE_DIGITS: usize = 15;

/// Phone number normalized at the boundary
///
/// Separators (spaces, dashes, dots, parentheses) are dropped and an optional
/// leading `+` is kept. New registrations must leave 7 to 15 ASCII digits;
/// stored numbers are only normalized, since earlier clients accepted any.
#[derive(Debug, Clone, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(from = "String", into = "String")]
pub struct PhoneNumber(String);

impl PhoneNumber {
    /// Normalize `raw`
    ///
    /// # Errors
    /// Returns `DirectoryError::InvalidPhone` if `raw` is not a phone number
    pub fn parse(raw: &str) -> Result<Self, DirectoryError> {
        let phone = Self::normalize(raw);
        let digits = phone.0.strip_prefix('+').unwrap_or(&phone.0);
        let valid = (MIN_PHONE_DIGITS..=MAX_PHONE_DIGITS).contains(&digits.len())
            && digits.chars().all(|c| c.is_ascii_digit());
        if !valid {
            return Err(DirectoryError::InvalidPhone(raw.to_string()));
        }
        Ok(phone)
    }

    /// Drop separators without validating what remains
    #[must_use]
    pub fn normalize(raw: &str) -> Self {
        let trimmed = raw.trim();
        let (plus, rest) = match trimmed.strip_prefix('+') {
            Some(rest) => ("+", rest),
            None => ("", trimmed),
        };
        let digits: String = rest
            .chars()
            .filter(|c| !matches!(c, ' ' | '-' | '.' | '(' | ')'))
            .collect();
        Self(format!("{plus}{digits}"))
    }

    /// Borrow as string
    #[inline]
    #[must_use]
    pub fn as_str(&self) -> &str {
        &self.0
    }
}

impl From<String> for PhoneNumber {
    fn from(value: String) -> Self {
        Self::normalize(&value)
    }
}

impl From<PhoneNumber> for String {
    fn from(value: PhoneNumber) -> Self {
        value.0
    }
}

impl std::fmt::Display for PhoneNumber {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(&self.0)
    }
}

/// Registration form input
#[derive(Debug, Clone, Default)]
pub struct Registration {
    /// Full name
    pub display_name: String,
    /// Citizen code
    pub cc: String,
    /// Phone, any common formatting
    pub phone: String,
    /// Clear-text secret
    pub secret: String,
}

impl Registration {
    /// Create registration
    #[inline]
    #[must_use]
    pub fn new(
        display_name: impl Into<String>,
        cc: impl Into<String>,
        phone: impl Into<String>,
        secret: impl Into<String>,
    ) -> Self {
        Self {
            display_name: display_name.into(),
            cc: cc.into(),
            phone: phone.into(),
            secret: secret.into(),
        }
    }
}

/// Secret as found in a directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub enum StoredSecret {
    /// Hex SHA-256 digest, see [`digest_secret`]
    #[serde(rename = "secretHash")]
    Digest(String),
    /// Clear text written by earlier clients
    #[serde(rename = "password")]
    Legacy(String),
}

/// A stored directory entry
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct RegisteredIdentity {
    /// Citizen code
    #[serde(rename = "cc")]
    pub id: CitizenCode,
    /// Full name
    #[serde(rename = "name")]
    pub display_name: String,
    /// Normalized phone
    pub phone: PhoneNumber,
    /// Secret digest, or legacy clear text
    #[serde(flatten)]
    pub secret: StoredSecret,
    /// Registration time
    #[serde(rename = "createdAt")]
    pub created_at: DateTime<Utc>,
}

impl RegisteredIdentity {
    /// Check `secret` against the stored digest
    #[inline]
    #[must_use]
    pub fn verify(&self, secret: &str) -> bool {
        match &self.secret {
            StoredSecret::Digest(digest) => *digest == digest_secret(&self.id, secret),
            StoredSecret::Legacy(clear) => clear == secret,
        }
    }

    /// Check if the secret is still stored in clear text
    #[inline]
    #[must_use]
    pub fn has_legacy_secret(&self) -> bool {
        matches!(self.secret, StoredSecret::Legacy(_))
    }

    fn answers_to(&self, login: &str, phone: &PhoneNumber) -> bool {
        self.id.as_str() == login || &self.phone == phone
    }
}

/// One element of the stored array, decoded or kept as found
#[derive(Debug, Clone, Serialize)]
#[serde(untagged)]
enum Slot {
    Entry(RegisteredIdentity),
    Unreadable(Value),
}

impl Slot {
    fn decode(value: Value) -> Self {
        match RegisteredIdentity::deserialize(&value) {
            Ok(entry) => Self::Entry(entry),
            Err(e) => {
                tracing::warn!(error = %e, "keeping undecodable directory entry as is");
                Self::Unreadable(value)
            }
        }
    }

    fn entry(&self) -> Option<&RegisteredIdentity> {
        match self {
            Self::Entry(entry) => Some(entry),
            Self::Unreadable(_) => None,
        }
    }

    fn claims(&self, id: &CitizenCode, phone: &PhoneNumber) -> bool {
        match self {
            Self::Entry(entry) => &entry.id == id || &entry.phone == phone,
            Self::Unreadable(value) => {
                let field = |name: &str| value.get(name).and_then(Value::as_str);
                field("cc").is_some_and(|cc| cc.trim() == id.as_str())
                    || field("phone").is_some_and(|p| &PhoneNumber::normalize(p) == phone)
            }
        }
    }
}

/// Registration and credential checks
#[derive(Debug, Clone)]
pub struct IdentityDirectory {
    store: SharedStore,
    demo: DemoAccount,
    delay: Duration,
}

impl IdentityDirectory {
    /// Create directory over `store` without demo account or delay
    #[inline]
    #[must_use]
    pub fn new(store: SharedStore) -> Self {
        Self {
            store,
            demo: DemoAccount::disabled(),
            delay: Duration::ZERO,
        }
    }

    /// With demo account
    #[inline]
    #[must_use]
    pub fn with_demo_account(mut self, demo: DemoAccount) -> Self {
        self.demo = demo;
        self
    }

    /// With delay applied before answering
    #[inline]
    #[must_use]
    pub fn with_delay(mut self, delay: Duration) -> Self {
        self.delay = delay;
        self
    }

    /// Every decodable registered identity; empty on unreadable data
    pub async fn all(&self) -> Vec<RegisteredIdentity> {
        self.load_or_empty()
            .await
            .into_iter()
            .filter_map(|slot| match slot {
                Slot::Entry(entry) => Some(entry),
                Slot::Unreadable(_) => None,
            })
            .collect()
    }

    /// Register a new identity
    ///
    /// # Errors
    /// - `DirectoryError::MissingFields` if a field is blank
    /// - `DirectoryError::InvalidPhone` if the phone cannot be normalized
    /// - `DirectoryError::AlreadyRegistered` if the citizen code or phone is taken
    /// - `DirectoryError::Store` if the stored directory is not an array, or
    ///   cannot be written
    pub async fn register(
        &self,
        registration: Registration,
    ) -> Result<RegisteredIdentity, DirectoryError> {
        let display_name = registration.display_name.trim();
        if display_name.is_empty()
            || registration.secret.is_empty()
            || registration.phone.trim().is_empty()
        {
            return Err(DirectoryError::MissingFields);
        }
        let id =
            CitizenCode::parse(&registration.cc).map_err(|_| DirectoryError::MissingFields)?;
        let phone = PhoneNumber::parse(&registration.phone)?;

        self.pause().await;

        let mut slots = self.load().await?;
        let taken = self.is_demo(&id) || slots.iter().any(|slot| slot.claims(&id, &phone));
        if taken {
            tracing::info!(cc = %id, "registration rejected: already registered");
            return Err(DirectoryError::AlreadyRegistered);
        }

        let entry = RegisteredIdentity {
            secret: StoredSecret::Digest(digest_secret(&id, &registration.secret)),
            id,
            display_name: display_name.to_string(),
            phone,
            created_at: Utc::now(),
        };
        slots.push(Slot::Entry(entry.clone()));
        self.persist(&slots).await?;

        tracing::info!(cc = %entry.id, "identity registered");
        Ok(entry)
    }

    /// Check credentials and build the session identity
    ///
    /// `login` is a citizen code or a phone number in any common formatting.
    /// A legacy clear-text secret is replaced by its digest on success.
    ///
    /// # Errors
    /// Returns `DirectoryError::InvalidCredentials` if nothing matches
    pub async fn authenticate(&self, login: &str, secret: &str) -> Result<Identity, DirectoryError> {
        self.pause().await;

        let login = login.trim();
        if self.demo.enabled && login == self.demo.cc.trim() && secret == self.demo.secret {
            let id = CitizenCode::parse(login).map_err(|_| DirectoryError::InvalidCredentials)?;
            tracing::info!(cc = %id, "demo account authenticated");
            return Ok(Identity::new(id, self.demo.display_name.clone()));
        }

        let phone = PhoneNumber::normalize(login);
        let mut slots = self.load_or_empty().await;
        let found = slots
            .iter()
            .filter_map(Slot::entry)
            .find(|e| !login.is_empty() && e.answers_to(login, &phone) && e.verify(secret))
            .cloned();

        let Some(entry) = found else {
            tracing::info!("authentication failed");
            return Err(DirectoryError::InvalidCredentials);
        };
        tracing::info!(cc = %entry.id, "identity authenticated");

        if entry.has_legacy_secret() {
            self.migrate_secret(&mut slots, &entry, secret).await;
        }
        Ok(Identity::new(entry.id, entry.display_name))
    }

    async fn migrate_secret(&self, slots: &mut [Slot], entry: &RegisteredIdentity, secret: &str) {
        for slot in slots.iter_mut() {
            if let Slot::Entry(stored) = slot {
                if stored.id == entry.id && stored.has_legacy_secret() {
                    stored.secret = StoredSecret::Digest(digest_secret(&stored.id, secret));
                }
            }
        }
        match self.persist(slots).await {
            Ok(()) => tracing::info!(cc = %entry.id, "legacy secret replaced by digest"),
            Err(e) => tracing::warn!(cc = %entry.id, error = %e, "could not migrate legacy secret"),
        }
    }

    async fn load(&self) -> Result<Vec<Slot>, StoreError> {
        let stored = read_json::<Vec<Value>>(self.store.as_ref(), DIRECTORY_KEY).await?;
        Ok(stored
            .unwrap_or_default()
            .into_iter()
            .map(Slot::decode)
            .collect())
    }

    async fn load_or_empty(&self) -> Vec<Slot> {
        match self.load().await {
            Ok(slots) => slots,
            Err(e) => {
                tracing::warn!(error = %e, "identity directory unreadable, treating as empty");
                Vec::new()
            }
        }
    }

    fn is_demo(&self, id: &CitizenCode) -> bool {
        self.demo.enabled && self.demo.cc.trim() == id.as_str()
    }

    async fn pause(&self) {
        if !self.delay.is_zero() {
            tokio::time::sleep(self.delay).await;
        }
    }

    async fn persist(&self, slots: &[Slot]) -> Result<(), StoreError> {
        write_json(self.store.as_ref(), DIRECTORY_KEY, slots).await
    }
}

/// Hex SHA-256 of the secret, bound to the citizen code
#[must_use]
pub fn digest_secret(id: &CitizenCode, secret: &str) -> String {
    let mut hasher = Sha256::new();
    hasher.update(id.as_str().as_bytes());
    hasher.update([0]);
    hasher.update(secret.as_bytes());
    hex::encode(hasher.finalize())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn phone_normalization() {
        assert_eq!(PhoneNumber::parse(" 300 123-4567 ").unwrap().as_str(), "3001234567");
        assert_eq!(PhoneNumber::parse("+57 (300) 123.4567").unwrap().as_str(), "+573001234567");
        assert!(PhoneNumber::parse("12345").is_err());
        assert!(PhoneNumber::parse("300-abc-4567").is_err());
        assert!(PhoneNumber::parse("").is_err());
    }

    #[test]
    fn phone_deserialization_normalizes_without_validating() {
        let phone: PhoneNumber = serde_json::from_str("\"300 123 4567\"").unwrap();
        assert_eq!(phone.as_str(), "3001234567");

        // Earlier clients stored short numbers
        let short: PhoneNumber = serde_json::from_str("\"123-45\"").unwrap();
        assert_eq!(short.as_str(), "12345");
    }

    #[test]
    fn stored_secret_layouts() {
        let legacy = r#"{"cc":"111","name":"Ana","phone":"3001112222","password":"pw","createdAt":"2024-01-01T00:00:00.000Z"}"#;
        let entry: RegisteredIdentity = serde_json::from_str(legacy).unwrap();
        assert!(entry.has_legacy_secret());
        assert!(entry.verify("pw"));
        assert!(!entry.verify("PW"));

        let migrated = RegisteredIdentity {
            secret: StoredSecret::Digest(digest_secret(&entry.id, "pw")),
            ..entry
        };
        let json = serde_json::to_value(&migrated).unwrap();
        assert!(json.get("password").is_none());
        assert_eq!(json["secretHash"].as_str().map(str::len), Some(64));
        assert!(migrated.verify("pw"));
    }

    #[test]
    fn unreadable_slot_is_written_back_verbatim() {
        let raw = serde_json::json!({"cc": 1, "extra": [true]});
        let slot = Slot::decode(raw.clone());
        assert!(slot.entry().is_none());
        assert_eq!(serde_json::to_value(&slot).unwrap(), raw);
    }

    #[test]
    fn digest_depends_on_citizen_code() {
        let a = CitizenCode::parse("A1").unwrap();
        let b = CitizenCode::parse("B2").unwrap();
        assert_eq!(digest_secret(&a, "pw"), digest_secret(&a, "pw"));
        assert_ne!(digest_secret(&a, "pw"), digest_secret(&b, "pw"));
        assert_eq!(digest_secret(&a, "pw").len(), 64);
    }
}
