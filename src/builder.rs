//! Record Builder - Form Input to Finished Record
//!
//! `build` MUST validate first. Blank optional fields are resolved by the
//! `resolve_*` functions, each independent of the others.

use chrono::{DateTime, Days, NaiveDate, Utc};
use serde::{Deserialize, Serialize};
use std::collections::BTreeMap;
use std::fmt;
use std::path::Path;
use std::str::FromStr;
use thiserror::Error;
use tracing::{debug, info, warn};
use uuid::Uuid;

use crate::catalog::CountryRef;
use crate::photo::Photo;
use crate::session::UserRef;
use crate::settings::{SettingsError, WizardSettings};
use crate::tokens::{RandomTokens, TokenSource};
use crate::validation::{ValidationResult, Validator};

const DATE_INPUT_FORMATS: [&str; 3] = ["%Y-%m-%d", "%d/%m/%Y", "%d.%m.%Y"];

#[derive(Debug, Error)]
pub enum FormError {
    #[error("Unknown form field: {0}")]
    UnknownField(String),

    #[error("{0} is read-only")]
    ReadOnlyField(&'static str),

    #[error("Record rejected: {}", .0.summary())]
    Rejected(ValidationResult),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub enum FormField {
    FirstName,
    LastName,
    DateOfBirth,
    PlaceOfBirth,
    Nationality,
    Sex,
    Height,
    EyeColor,
    DocumentNumber,
    IssueDate,
    ExpiryDate,
    IssuingAuthority,
}

impl FormField {
    pub const ALL: [FormField; 12] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::DateOfBirth,
        FormField::PlaceOfBirth,
        FormField::Nationality,
        FormField::Sex,
        FormField::Height,
        FormField::EyeColor,
        FormField::DocumentNumber,
        FormField::IssueDate,
        FormField::ExpiryDate,
        FormField::IssuingAuthority,
    ];

    pub const REQUIRED: [FormField; 5] = [
        FormField::FirstName,
        FormField::LastName,
        FormField::DateOfBirth,
        FormField::PlaceOfBirth,
        FormField::Sex,
    ];

    pub fn key(self) -> &'static str {
        match self {
            FormField::FirstName => "firstName",
            FormField::LastName => "lastName",
            FormField::DateOfBirth => "dateOfBirth",
            FormField::PlaceOfBirth => "placeOfBirth",
            FormField::Nationality => "nationality",
            FormField::Sex => "sex",
            FormField::Height => "height",
            FormField::EyeColor => "eyeColor",
            FormField::DocumentNumber => "documentNumber",
            FormField::IssueDate => "issueDate",
            FormField::ExpiryDate => "expiryDate",
            FormField::IssuingAuthority => "issuingAuthority",
        }
    }

    pub fn label(self) -> &'static str {
        match self {
            FormField::FirstName => "First name",
            FormField::LastName => "Last name",
            FormField::DateOfBirth => "Date of birth",
            FormField::PlaceOfBirth => "Place of birth",
            FormField::Nationality => "Nationality",
            FormField::Sex => "Sex",
            FormField::Height => "Height",
            FormField::EyeColor => "Eye color",
            FormField::DocumentNumber => "Document number",
            FormField::IssueDate => "Issue date",
            FormField::ExpiryDate => "Expiry date",
            FormField::IssuingAuthority => "Issuing authority",
        }
    }

    /// Accepts the camelCase key; `passportNumber` is an alias for the document number.
    pub fn from_key(key: &str) -> Option<Self> {
        if key == "passportNumber" {
            return Some(FormField::DocumentNumber);
        }
        Self::ALL.into_iter().find(|f| f.key() == key)
    }

    pub fn is_required(self) -> bool {
        Self::REQUIRED.contains(&self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "UPPERCASE")]
pub enum Sex {
    M,
    F,
    X,
}

impl Sex {
    pub fn label(self) -> &'static str {
        match self {
            Sex::M => "Male",
            Sex::F => "Female",
            Sex::X => "Other",
        }
    }
}

impl FromStr for Sex {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "m" | "male" => Ok(Sex::M),
            "f" | "female" => Ok(Sex::F),
            "x" | "other" => Ok(Sex::X),
            _ => Err(()),
        }
    }
}

impl fmt::Display for Sex {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let marker = match self {
            Sex::M => "M",
            Sex::F => "F",
            Sex::X => "X",
        };
        f.write_str(marker)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub enum EyeColor {
    Brown,
    Blue,
    Green,
    Hazel,
    Gray,
    Amber,
}

impl EyeColor {
    pub const ALL: [EyeColor; 6] = [
        EyeColor::Brown,
        EyeColor::Blue,
        EyeColor::Green,
        EyeColor::Hazel,
        EyeColor::Gray,
        EyeColor::Amber,
    ];
}

impl FromStr for EyeColor {
    type Err = ();

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        if wanted.eq_ignore_ascii_case("grey") {
            return Ok(EyeColor::Gray);
        }
        Self::ALL
            .into_iter()
            .find(|c| c.to_string().eq_ignore_ascii_case(wanted))
            .ok_or(())
    }
}

impl fmt::Display for EyeColor {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        fmt::Debug::fmt(self, f)
    }
}

/// Parse a date typed or picked into the form.
pub fn parse_date(raw: &str) -> Option<NaiveDate> {
    let raw = raw.trim();
    DATE_INPUT_FORMATS
        .iter()
        .find_map(|format| NaiveDate::parse_from_str(raw, format).ok())
}

/// Raw form input, keyed by field
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RecordForm {
    values: BTreeMap<FormField, String>,
    photo: Option<Photo>,
}

impl RecordForm {
    pub fn new() -> Self {
        Self::default()
    }

    /// Blank form for a country, nationality already filled in.
    pub fn for_country(country: &CountryRef) -> Self {
        let mut form = Self::new();
        form.values.insert(FormField::Nationality, resolve_nationality(country));
        form
    }

    /// Form re-opened on an existing record.
    pub fn from_record(record: &Record) -> Self {
        let personal = &record.personal;
        let document = &record.document;
        let mut form = Self::for_country(&record.country);

        let mut put = |field: FormField, value: String| {
            form.values.insert(field, value);
        };
        put(FormField::FirstName, personal.first_name.clone());
        put(FormField::LastName, personal.last_name.clone());
        put(FormField::DateOfBirth, personal.date_of_birth.to_string());
        put(FormField::PlaceOfBirth, personal.place_of_birth.clone());
        put(FormField::Sex, personal.sex.to_string());
        if let Some(height) = personal.height_cm {
            put(FormField::Height, height.to_string());
        }
        if let Some(color) = personal.eye_color {
            put(FormField::EyeColor, color.to_string());
        }
        put(FormField::DocumentNumber, document.document_number.clone());
        put(FormField::IssueDate, document.issue_date.to_string());
        put(FormField::ExpiryDate, document.expiry_date.to_string());
        put(FormField::IssuingAuthority, document.issuing_authority.clone());

        form.photo = record.photo.clone();
        form
    }

    pub fn from_pairs<I, K, V>(pairs: I) -> Result<Self, FormError>
    where
        I: IntoIterator<Item = (K, V)>,
        K: AsRef<str>,
        V: Into<String>,
    {
        let mut form = Self::new();
        for (key, value) in pairs {
            form.set(key.as_ref(), value)?;
        }
        Ok(form)
    }

    pub fn set(&mut self, key: &str, value: impl Into<String>) -> Result<(), FormError> {
        let field = FormField::from_key(key)
            .ok_or_else(|| FormError::UnknownField(key.to_string()))?;
        self.set_field(field, value)
    }

    pub fn set_field(&mut self, field: FormField, value: impl Into<String>) -> Result<(), FormError> {
        if field == FormField::Nationality {
            return Err(FormError::ReadOnlyField(field.label()));
        }
        self.values.insert(field, value.into());
        Ok(())
    }

    pub fn get(&self, field: FormField) -> &str {
        self.values.get(&field).map(String::as_str).unwrap_or("")
    }

    pub fn is_blank(&self, field: FormField) -> bool {
        self.optional(field).is_none()
    }

    /// Trimmed value, `None` when blank.
    pub fn optional(&self, field: FormField) -> Option<&str> {
        let value = self.get(field).trim();
        (!value.is_empty()).then_some(value)
    }

    pub fn photo(&self) -> Option<&Photo> {
        self.photo.as_ref()
    }

    pub fn attach_photo(&mut self, photo: Photo) {
        self.photo = Some(photo);
    }

    /// Replace the photo with a local file. An unreadable file leaves the
    /// photo unset and the rest of the form untouched.
    pub fn attach_photo_file(&mut self, path: &Path) -> bool {
        match Photo::load(path) {
            Ok(photo) => {
                debug!(path = %path.display(), media_type = %photo.media_type, "photo attached");
                self.photo = Some(photo);
                true
            }
            Err(e) => {
                warn!(path = %path.display(), error = %e, "photo could not be read");
                self.photo = None;
                false
            }
        }
    }

    pub fn clear_photo(&mut self) {
        self.photo = None;
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct PersonalDetails {
    pub first_name: String,
    pub last_name: String,
    pub date_of_birth: NaiveDate,
    pub place_of_birth: String,
    pub nationality: String,
    pub sex: Sex,
    #[serde(default)]
    pub height_cm: Option<u16>,
    #[serde(default)]
    pub eye_color: Option<EyeColor>,
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct DocumentDetails {
    pub document_number: String,
    pub issue_date: NaiveDate,
    pub expiry_date: NaiveDate,
    pub issuing_authority: String,
}

/// A finished record. Immutable; editing builds a replacement.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct Record {
    pub id: Uuid,
    pub created_at: DateTime<Utc>,
    pub personal: PersonalDetails,
    pub document: DocumentDetails,
    #[serde(default)]
    pub photo: Option<Photo>,
    pub country: CountryRef,
    pub user: UserRef,
}

impl Record {
    pub fn full_name(&self) -> String {
        format!("{} {}", self.personal.first_name, self.personal.last_name)
    }
}

// --- Derivation rules ---

/// Given number, or the country code followed by a fresh token.
pub fn resolve_document_number(
    raw: Option<&str>,
    country_code: &str,
    token_length: usize,
    tokens: &mut dyn TokenSource,
) -> String {
    match raw {
        Some(number) => number.to_string(),
        None => format!("{}{}", country_code, tokens.next_token(token_length)),
    }
}

pub fn resolve_issue_date(raw: Option<NaiveDate>, today: NaiveDate) -> NaiveDate {
    raw.unwrap_or(today)
}

/// Given date, or `today` plus the validity period.
pub fn resolve_expiry_date(raw: Option<NaiveDate>, today: NaiveDate, validity_days: u64) -> NaiveDate {
    raw.unwrap_or_else(|| {
        today
            .checked_add_days(Days::new(validity_days))
            .unwrap_or(NaiveDate::MAX)
    })
}

pub fn resolve_issuing_authority(raw: Option<&str>, prefix: &str, country: &CountryRef) -> String {
    match raw {
        Some(authority) => authority.to_string(),
        None => format!("{} - {}", prefix, country.name),
    }
}

/// Nationality always follows the selected country.
pub fn resolve_nationality(country: &CountryRef) -> String {
    country.name.clone()
}

/// The record builder - single entry point from form to record
pub struct RecordBuilder {
    settings: WizardSettings,
    validator: Validator,
    tokens: Box<dyn TokenSource>,
}

impl RecordBuilder {
    pub fn new(settings: WizardSettings) -> Result<Self, SettingsError> {
        Self::with_tokens(settings, Box::new(RandomTokens))
    }

    pub fn with_tokens(
        settings: WizardSettings,
        tokens: Box<dyn TokenSource>,
    ) -> Result<Self, SettingsError> {
        settings.validate()?;
        Ok(Self {
            settings,
            validator: Validator::new(),
            tokens,
        })
    }

    pub fn settings(&self) -> &WizardSettings {
        &self.settings
    }

    pub fn validate(&self, form: &RecordForm) -> ValidationResult {
        self.validator.validate(form)
    }

    /// Validate the form and derive a record from it.
    pub fn build(
        &mut self,
        form: &RecordForm,
        country: &CountryRef,
        user: &UserRef,
        today: NaiveDate,
    ) -> Result<Record, FormError> {
        let validation = self.validate(form);
        if !validation.valid {
            warn!(errors = %validation.summary(), "record form rejected");
            return Err(FormError::Rejected(validation));
        }
        let rejected = || FormError::Rejected(validation.clone());

        let personal = PersonalDetails {
            first_name: form.optional(FormField::FirstName).ok_or_else(rejected)?.to_string(),
            last_name: form.optional(FormField::LastName).ok_or_else(rejected)?.to_string(),
            date_of_birth: form
                .optional(FormField::DateOfBirth)
                .and_then(parse_date)
                .ok_or_else(rejected)?,
            place_of_birth: form.optional(FormField::PlaceOfBirth).ok_or_else(rejected)?.to_string(),
            nationality: resolve_nationality(country),
            sex: form
                .optional(FormField::Sex)
                .and_then(|s| s.parse().ok())
                .ok_or_else(rejected)?,
            height_cm: form.optional(FormField::Height).and_then(|h| h.parse().ok()),
            eye_color: form.optional(FormField::EyeColor).and_then(|c| c.parse().ok()),
        };

        let document = DocumentDetails {
            document_number: resolve_document_number(
                form.optional(FormField::DocumentNumber),
                &country.code,
                self.settings.token_length,
                self.tokens.as_mut(),
            ),
            issue_date: resolve_issue_date(
                form.optional(FormField::IssueDate).and_then(parse_date),
                today,
            ),
            expiry_date: resolve_expiry_date(
                form.optional(FormField::ExpiryDate).and_then(parse_date),
                today,
                self.settings.validity_days,
            ),
            issuing_authority: resolve_issuing_authority(
                form.optional(FormField::IssuingAuthority),
                &self.settings.authority_prefix,
                country,
            ),
        };

        let record = Record {
            id: Uuid::new_v4(),
            created_at: Utc::now(),
            personal,
            document,
            photo: form.photo().cloned(),
            country: country.clone(),
            user: user.clone(),
        };

        info!(
            record_id = %record.id,
            country = %country.code,
            document_number = %record.document.document_number,
            "record built"
        );
        Ok(record)
    }
}

impl Default for RecordBuilder {
    fn default() -> Self {
        Self {
            settings: WizardSettings::default(),
            validator: Validator::new(),
            tokens: Box::new(RandomTokens),
        }
    }
}
