//! Record Presenter - Read-Only View
//!
//! Download and share are simulated. They only produce an acknowledgement
//! for the user; no file is written and nothing leaves the process.

use chrono::NaiveDate;
use serde::{Deserialize, Serialize};
use std::fmt::Write;
use tracing::info;

use crate::builder::Record;

const NOT_AVAILABLE: &str = "N/A";

/// `DD/MM/YYYY`, or an empty string for a missing date.
pub fn format_date(date: Option<NaiveDate>) -> String {
    date.map(|d| d.format("%d/%m/%Y").to_string()).unwrap_or_default()
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct DetailLine {
    pub label: String,
    pub value: String,
}

impl DetailLine {
    fn new(label: &str, value: impl Into<String>) -> Self {
        Self {
            label: label.to_string(),
            value: value.into(),
        }
    }
}

#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct Acknowledgement {
    pub title: String,
    pub description: String,
}

/// Serializable snapshot of both passport pages.
#[derive(Debug, Clone, Serialize, Deserialize, PartialEq, Eq)]
pub struct PreviewView {
    pub cover: Vec<DetailLine>,
    pub details: Vec<DetailLine>,
    #[serde(default)]
    pub photo_data_url: Option<String>,
}

pub struct RecordPresenter<'a> {
    record: &'a Record,
}

impl<'a> RecordPresenter<'a> {
    pub fn new(record: &'a Record) -> Self {
        Self { record }
    }

    pub fn record(&self) -> &'a Record {
        self.record
    }

    pub fn cover(&self) -> Vec<DetailLine> {
        let record = self.record;
        vec![
            DetailLine::new("Flag", record.country.flag_glyph.clone()),
            DetailLine::new("Country", record.country.name.to_uppercase()),
            DetailLine::new("Document", "PASSPORT"),
            DetailLine::new("Name", record.full_name()),
            DetailLine::new("Passport No", record.document.document_number.clone()),
        ]
    }

    pub fn details(&self) -> Vec<DetailLine> {
        let personal = &self.record.personal;
        let document = &self.record.document;
        vec![
            DetailLine::new("Given Name(s)", personal.first_name.clone()),
            DetailLine::new("Surname", personal.last_name.clone()),
            DetailLine::new("Date of Birth", format_date(Some(personal.date_of_birth))),
            DetailLine::new("Sex", personal.sex.to_string()),
            DetailLine::new("Place of Birth", personal.place_of_birth.clone()),
            DetailLine::new("Nationality", personal.nationality.clone()),
            DetailLine::new(
                "Height",
                personal
                    .height_cm
                    .map(|cm| format!("{} cm", cm))
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            DetailLine::new(
                "Eye Color",
                personal
                    .eye_color
                    .map(|c| c.to_string())
                    .unwrap_or_else(|| NOT_AVAILABLE.to_string()),
            ),
            DetailLine::new("Issue Date", format_date(Some(document.issue_date))),
            DetailLine::new("Expiry Date", format_date(Some(document.expiry_date))),
            DetailLine::new("Issuing Authority", document.issuing_authority.clone()),
            DetailLine::new("Document Number", document.document_number.clone()),
        ]
    }

    pub fn view(&self) -> PreviewView {
        PreviewView {
            cover: self.cover(),
            details: self.details(),
            photo_data_url: self.record.photo.as_ref().map(|p| p.data_url.clone()),
        }
    }

    /// Plain-text rendering of both pages.
    pub fn render_text(&self) -> String {
        let mut out = String::new();
        for line in self.cover() {
            let _ = writeln!(out, "{:<18}{}", line.label, line.value);
        }
        out.push_str("\nPERSONAL DETAILS\n");
        for line in self.details() {
            let _ = writeln!(out, "{:<18}{}", line.label, line.value);
        }
        if self.record.photo.is_some() {
            out.push_str("\n[photo attached]\n");
        }
        out
    }

    pub fn download(&self) -> Acknowledgement {
        info!(record_id = %self.record.id, "simulated download");
        Acknowledgement {
            title: "Download Started".to_string(),
            description: "Your passport is being downloaded as a PDF.".to_string(),
        }
    }

    pub fn share(&self) -> Acknowledgement {
        info!(record_id = %self.record.id, "simulated share");
        Acknowledgement {
            title: "Share Link Generated".to_string(),
            description: "A shareable link has been copied to your clipboard.".to_string(),
        }
    }
}
