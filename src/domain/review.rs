use std::fmt;

use chrono::NaiveDate;
use serde::Serialize;

/// A single normalized review as scraped from one marketplace listing.
///
/// `date` keeps the raw display text as shown on the page; the window filter
/// works on a parsed copy and drops records it cannot parse.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct Review {
    pub title: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_body: Option<String>,
    pub rating: Rating,
    pub date: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub reviewer_position: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub company_size: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub review_comments: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub pros: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub cons: Option<String>,
}

/// Rating scales differ per marketplace and are not normalized: Capterra
/// exposes a numeric score, G2 carries the raw attribute string.
#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(untagged)]
pub enum Rating {
    Score(f64),
    Label(String),
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ReviewSource {
    G2,
    Capterra,
}

impl fmt::Display for ReviewSource {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            ReviewSource::G2 => write!(f, "g2"),
            ReviewSource::Capterra => write!(f, "capterra"),
        }
    }
}

/// Validated caller input, immutable for the duration of one pipeline run.
#[derive(Debug, Clone)]
pub struct ScrapeQuery {
    pub company_name: String,
    pub start_date: NaiveDate,
    pub end_date: NaiveDate,
    pub source: ReviewSource,
}
