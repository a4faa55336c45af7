//! Record domain model and field validation.
//!
//! # Responsibility
//! - Define `Record` and the draft/patch shapes derived from it.
//! - Provide the creation and edit validation policies.
//!
//! # Invariants
//! - `id` is assigned by the store and never changes.
//! - `created_at` is set once at creation (unix epoch milliseconds).
//! - Creation requires a 3+ char trimmed name, an `@` in email and a
//!   10-digit phone; edits only require non-empty fields.

use once_cell::sync::Lazy;
use regex::Regex;
use serde::{Deserialize, Serialize};
use std::error::Error;
use std::fmt::{Display, Formatter};
use uuid::Uuid;

static PHONE_RE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^[0-9]{10}$").expect("valid phone regex"));

/// Minimum trimmed name length accepted at registration.
pub const MIN_NAME_CHARS: usize = 3;

/// Exact phone length accepted at registration.
pub const PHONE_DIGITS: usize = 10;

/// Store-assigned identifier for one record.
pub type RecordId = Uuid;

/// Editable field of a record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Field {
    Name,
    Email,
    Phone,
}

impl Field {
    /// All editable fields in display order.
    pub const ALL: [Field; 3] = [Field::Name, Field::Email, Field::Phone];

    /// Stable lowercase identifier, also used as the store column name.
    pub fn as_str(self) -> &'static str {
        match self {
            Self::Name => "name",
            Self::Email => "email",
            Self::Phone => "phone",
        }
    }
}

impl Display for Field {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.as_str())
    }
}

/// Client-side validation failure. Never reaches the store.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ValidationError {
    /// Trimmed name shorter than [`MIN_NAME_CHARS`].
    NameTooShort { chars: usize },
    /// Email has no `@`.
    EmailMissingAt,
    /// Phone is not exactly [`PHONE_DIGITS`] ASCII digits.
    PhoneNotTenDigits,
    /// Field is blank after trimming (edit policy).
    EmptyField(Field),
}

impl Display for ValidationError {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::NameTooShort { .. } => {
                write!(f, "Name must be at least {MIN_NAME_CHARS} characters")
            }
            Self::EmailMissingAt => write!(f, "Invalid email"),
            Self::PhoneNotTenDigits => write!(f, "Phone must be {PHONE_DIGITS} digits"),
            Self::EmptyField(_) => write!(f, "All fields are required!"),
        }
    }
}

impl Error for ValidationError {}

/// The three user-editable fields, used as registration and edit drafts.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordFields {
    pub name: String,
    pub email: String,
    pub phone: String,
}

impl RecordFields {
    pub fn new(
        name: impl Into<String>,
        email: impl Into<String>,
        phone: impl Into<String>,
    ) -> Self {
        Self {
            name: name.into(),
            email: email.into(),
            phone: phone.into(),
        }
    }

    /// Returns the value of one field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
        }
    }

    /// Replaces the value of one field.
    pub fn set(&mut self, field: Field, value: impl Into<String>) {
        let slot = match field {
            Field::Name => &mut self.name,
            Field::Email => &mut self.email,
            Field::Phone => &mut self.phone,
        };
        *slot = value.into();
    }

    /// Resets every field to empty.
    pub fn clear(&mut self) {
        self.name.clear();
        self.email.clear();
        self.phone.clear();
    }

    /// Registration policy, checked in order: name, email, phone.
    ///
    /// # Errors
    /// - `NameTooShort` when the trimmed name has fewer than 3 chars.
    /// - `EmailMissingAt` when email contains no `@`.
    /// - `PhoneNotTenDigits` when phone is not exactly 10 ASCII digits.
    pub fn validate_for_create(&self) -> Result<(), ValidationError> {
        let chars = self.name.trim().chars().count();
        if chars < MIN_NAME_CHARS {
            return Err(ValidationError::NameTooShort { chars });
        }
        if !self.email.contains('@') {
            return Err(ValidationError::EmailMissingAt);
        }
        if !PHONE_RE.is_match(&self.phone) {
            return Err(ValidationError::PhoneNotTenDigits);
        }
        Ok(())
    }

    /// Edit policy: every field must be non-blank. No format checks.
    pub fn validate_for_edit(&self) -> Result<(), ValidationError> {
        for field in Field::ALL {
            if self.get(field).trim().is_empty() {
                return Err(ValidationError::EmptyField(field));
            }
        }
        Ok(())
    }

    /// Converts this draft into a patch that overwrites all three fields.
    pub fn to_patch(&self) -> RecordPatch {
        RecordPatch {
            name: Some(self.name.clone()),
            email: Some(self.email.clone()),
            phone: Some(self.phone.clone()),
        }
    }
}

/// Input to store `create`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NewRecord {
    #[serde(flatten)]
    pub fields: RecordFields,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

/// Partial update. `None` keeps the stored value.
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct RecordPatch {
    pub name: Option<String>,
    pub email: Option<String>,
    pub phone: Option<String>,
}

impl RecordPatch {
    pub fn is_empty(&self) -> bool {
        self.name.is_none() && self.email.is_none() && self.phone.is_none()
    }
}

/// Persisted user record.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Record {
    pub id: RecordId,
    pub name: String,
    pub email: String,
    pub phone: String,
    /// Unix epoch milliseconds.
    pub created_at: i64,
}

impl Record {
    /// Builds a record from store-assigned identity and creation input.
    pub fn from_new(id: RecordId, new: &NewRecord) -> Self {
        Self {
            id,
            name: new.fields.name.clone(),
            email: new.fields.email.clone(),
            phone: new.fields.phone.clone(),
            created_at: new.created_at,
        }
    }

    /// Snapshot of the editable fields.
    pub fn fields(&self) -> RecordFields {
        RecordFields::new(&self.name, &self.email, &self.phone)
    }

    /// Returns the value of one field.
    pub fn get(&self, field: Field) -> &str {
        match field {
            Field::Name => &self.name,
            Field::Email => &self.email,
            Field::Phone => &self.phone,
        }
    }

    /// Merges a patch into this record. `id` and `created_at` are untouched.
    pub fn apply_patch(&mut self, patch: &RecordPatch) {
        if let Some(name) = &patch.name {
            self.name = name.clone();
        }
        if let Some(email) = &patch.email {
            self.email = email.clone();
        }
        if let Some(phone) = &patch.phone {
            self.phone = phone.clone();
        }
    }
}
