//! PassportGen Core - Wizard Session Engine
//!
//! # Ground Rules
//! 1. One Owner Of State: only the session controller mutates the session
//! 2. Validation Before Records: a blank required field never yields a record
//! 3. Defaults Are Explicit: every blank optional field has a named resolver
//! 4. Nothing Leaves The Process: no persistence, no network, no real documents

pub mod catalog;
pub mod tokens;
pub mod photo;
pub mod settings;
pub mod validation;
pub mod builder;
pub mod presenter;
pub mod session;

pub use catalog::{Catalog, CatalogError, CountryRef, ALL_REGIONS};
pub use tokens::{FixedTokens, RandomTokens, SeededTokens, TokenSource};
pub use photo::{Photo, PhotoError};
pub use settings::{SettingsError, WizardSettings};
pub use validation::{ValidationResult, ValidationRule, ValidationViolation, ViolationSeverity};
pub use builder::{FormError, FormField, Record, RecordBuilder, RecordForm};
pub use presenter::{format_date, Acknowledgement, PreviewView, RecordPresenter};
pub use session::{PreviewAction, Session, SessionController, SessionError, Step, UserRef};

pub const ENGINE_VERSION: &str = env!("CARGO_PKG_VERSION");
