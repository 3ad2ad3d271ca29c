//! Session Controller - Single Owner of Wizard State
//!
//! Every transition goes through `SessionController`. A rejected transition
//! returns an error and leaves the session exactly as it was.

use chrono::{Local, NaiveDate};
use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::{debug, info, warn};

use crate::builder::{FormError, Record, RecordBuilder, RecordForm};
use crate::catalog::CountryRef;
use crate::presenter::{Acknowledgement, RecordPresenter};
use crate::validation::ValidationResult;

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum Step {
    Login,
    CatalogSelection,
    RecordEntry,
    RecordPreview,
}

impl Step {
    pub fn requires_auth(self) -> bool {
        self != Step::Login
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
#[serde(rename_all = "camelCase")]
pub struct UserRef {
    pub email: String,
    pub display_name: String,
}

impl UserRef {
    /// Display name is the local part of the email.
    pub fn from_email(email: &str) -> Self {
        let local = email.split('@').next().unwrap_or(email);
        Self {
            email: email.to_string(),
            display_name: local.to_string(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq)]
pub struct Session {
    pub authenticated: bool,
    pub step: Step,
    pub user: Option<UserRef>,
    pub country: Option<CountryRef>,
    pub record: Option<Record>,
}

impl Session {
    pub fn new() -> Self {
        Self {
            authenticated: false,
            step: Step::Login,
            user: None,
            country: None,
            record: None,
        }
    }

    /// Header greeting, present only once signed in.
    pub fn greeting(&self) -> Option<String> {
        self.user
            .as_ref()
            .filter(|_| self.authenticated)
            .map(|u| format!("Welcome, {}", u.display_name))
    }
}

impl Default for Session {
    fn default() -> Self {
        Self::new()
    }
}

#[derive(Debug, Error)]
pub enum SessionError {
    #[error("Email and password are required")]
    MissingCredentials,

    #[error("Name is required to sign up")]
    MissingName,

    #[error("Not signed in")]
    NotAuthenticated,

    #[error("Cannot {action} from step {step:?}")]
    InvalidTransition { step: Step, action: &'static str },

    #[error("No country selected")]
    NoCountrySelected,

    #[error("No record to show")]
    NoRecord,

    #[error("Record rejected: {}", .0.summary())]
    RecordRejected(ValidationResult),

    #[error(transparent)]
    Form(FormError),
}

impl From<FormError> for SessionError {
    fn from(err: FormError) -> Self {
        match err {
            FormError::Rejected(validation) => SessionError::RecordRejected(validation),
            other => SessionError::Form(other),
        }
    }
}

/// Actions offered by the preview
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum PreviewAction {
    Back,
    Edit,
    Download,
    Share,
}

/// The session controller - the only mutator of `Session`
pub struct SessionController {
    session: Session,
    builder: RecordBuilder,
}

impl SessionController {
    pub fn new(builder: RecordBuilder) -> Self {
        Self {
            session: Session::new(),
            builder,
        }
    }

    pub fn session(&self) -> &Session {
        &self.session
    }

    pub fn step(&self) -> Step {
        self.session.step
    }

    pub fn builder(&self) -> &RecordBuilder {
        &self.builder
    }

    fn expect_step(&self, step: Step, action: &'static str) -> Result<(), SessionError> {
        if step.requires_auth() && !self.session.authenticated {
            return Err(SessionError::NotAuthenticated);
        }
        if self.session.step != step {
            warn!(step = ?self.session.step, action, "transition rejected");
            return Err(SessionError::InvalidTransition {
                step: self.session.step,
                action,
            });
        }
        Ok(())
    }

    fn enter(&mut self, user: UserRef) {
        debug!(email = %user.email, "signed in");
        info!(display_name = %user.display_name, "session authenticated");
        self.session.user = Some(user);
        self.session.authenticated = true;
        self.session.step = Step::CatalogSelection;
    }

    /// Mock sign-in: any non-empty email and password are accepted.
    pub fn login(&mut self, email: &str, password: &str) -> Result<(), SessionError> {
        self.expect_step(Step::Login, "log in")?;
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        self.enter(UserRef::from_email(email));
        Ok(())
    }

    pub fn signup(&mut self, name: &str, email: &str, password: &str) -> Result<(), SessionError> {
        self.expect_step(Step::Login, "sign up")?;
        if email.is_empty() || password.is_empty() {
            return Err(SessionError::MissingCredentials);
        }
        if name.is_empty() {
            return Err(SessionError::MissingName);
        }
        self.enter(UserRef {
            email: email.to_string(),
            display_name: name.to_string(),
        });
        Ok(())
    }

    pub fn select_country(&mut self, country: CountryRef) -> Result<(), SessionError> {
        self.expect_step(Step::CatalogSelection, "select a country")?;
        info!(country = %country.code, "country selected");
        self.session.country = Some(country);
        self.session.step = Step::RecordEntry;
        Ok(())
    }

    /// The form the builder opens with.
    ///
    /// Re-entering for the record's own country pre-fills from the record;
    /// otherwise the form is blank apart from nationality.
    pub fn draft(&self) -> Result<RecordForm, SessionError> {
        let country = self.session.country.as_ref().ok_or(SessionError::NoCountrySelected)?;
        let form = match &self.session.record {
            Some(record) if record.country.code == country.code => RecordForm::from_record(record),
            _ => RecordForm::for_country(country),
        };
        Ok(form)
    }

    /// Submit the form, dated today.
    pub fn submit_record(&mut self, form: &RecordForm) -> Result<&Record, SessionError> {
        self.submit_record_on(form, Local::now().date_naive())
    }

    /// Submit the form against an explicit calendar date.
    pub fn submit_record_on(&mut self, form: &RecordForm, today: NaiveDate) -> Result<&Record, SessionError> {
        self.expect_step(Step::RecordEntry, "submit a record")?;
        let country = self.session.country.as_ref().ok_or(SessionError::NoCountrySelected)?;
        let user = self.session.user.as_ref().ok_or(SessionError::NotAuthenticated)?;

        let record = self.builder.build(form, country, user, today)?;
        self.session.step = Step::RecordPreview;
        Ok(&*self.session.record.insert(record))
    }

    /// Single-level back: preview to entry, entry to catalog.
    pub fn go_back(&mut self) -> Result<(), SessionError> {
        let previous = match self.session.step {
            Step::RecordPreview => Step::RecordEntry,
            Step::RecordEntry => Step::CatalogSelection,
            step => {
                return Err(SessionError::InvalidTransition { step, action: "go back" });
            }
        };
        debug!(from = ?self.session.step, to = ?previous, "going back");
        self.session.step = previous;
        Ok(())
    }

    /// Re-open the builder on the stored record. The record is kept.
    pub fn edit_record(&mut self) -> Result<(), SessionError> {
        self.expect_step(Step::RecordPreview, "edit the record")?;
        if self.session.record.is_none() {
            return Err(SessionError::NoRecord);
        }
        self.session.step = Step::RecordEntry;
        Ok(())
    }

    pub fn preview(&self) -> Result<RecordPresenter<'_>, SessionError> {
        self.expect_step(Step::RecordPreview, "preview the record")?;
        self.session
            .record
            .as_ref()
            .map(RecordPresenter::new)
            .ok_or(SessionError::NoRecord)
    }

    /// Dispatch an action from the preview. Only download and share
    /// return an acknowledgement.
    pub fn on_preview(&mut self, action: PreviewAction) -> Result<Option<Acknowledgement>, SessionError> {
        match action {
            PreviewAction::Back => {
                self.expect_step(Step::RecordPreview, "go back")?;
                self.go_back()?;
                Ok(None)
            }
            PreviewAction::Edit => {
                self.edit_record()?;
                Ok(None)
            }
            PreviewAction::Download => Ok(Some(self.preview()?.download())),
            PreviewAction::Share => Ok(Some(self.preview()?.share())),
        }
    }

    /// Reset to the initial session from any step.
    pub fn logout(&mut self) {
        info!("session reset");
        self.session = Session::new();
    }
}

impl Default for SessionController {
    fn default() -> Self {
        Self::new(RecordBuilder::default())
    }
}
