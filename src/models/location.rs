//! Wedding location model

use chrono::{DateTime, NaiveDate};
use serde::{Deserialize, Serialize};
use std::fmt;

use crate::error::{BudgetError, BudgetResult};

/// Where (and when) the wedding takes place
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct BudgetLocation {
    pub city: String,
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub state: Option<String>,
    pub country: String,
    #[serde(default)]
    pub is_destination: bool,
    /// ISO date string (`YYYY-MM-DD`)
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub wedding_date: Option<String>,
}

impl BudgetLocation {
    /// Create a local (non-destination) location without a date
    pub fn new(city: impl Into<String>, country: impl Into<String>) -> Self {
        Self {
            city: city.into(),
            state: None,
            country: country.into(),
            is_destination: false,
            wedding_date: None,
        }
    }

    /// Builder: set the state or region
    pub fn with_state(mut self, state: impl Into<String>) -> Self {
        self.state = Some(state.into());
        self
    }

    /// Builder: mark as a destination wedding
    pub fn as_destination(mut self) -> Self {
        self.is_destination = true;
        self
    }

    /// Builder: set the wedding date string
    pub fn with_wedding_date(mut self, date: impl Into<String>) -> Self {
        self.wedding_date = Some(date.into());
        self
    }

    /// The parsed wedding date
    ///
    /// # Errors
    ///
    /// `InvalidInput` when no date is set, `InvalidDate` when it cannot be parsed.
    pub fn parsed_wedding_date(&self) -> BudgetResult<NaiveDate> {
        match &self.wedding_date {
            Some(date) => parse_wedding_date(date),
            None => Err(BudgetError::InvalidInput(
                "a wedding date is required to plan the budget".into(),
            )),
        }
    }
}

impl fmt::Display for BudgetLocation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match &self.state {
            Some(state) => write!(f, "{}, {}, {}", self.city, state, self.country),
            None => write!(f, "{}, {}", self.city, self.country),
        }
    }
}

/// Parse an ISO date (`2026-06-13`) or an RFC 3339 timestamp
pub fn parse_wedding_date(s: &str) -> BudgetResult<NaiveDate> {
    let s = s.trim();
    if let Ok(date) = NaiveDate::parse_from_str(s, "%Y-%m-%d") {
        return Ok(date);
    }
    if let Ok(timestamp) = DateTime::parse_from_rfc3339(s) {
        return Ok(timestamp.date_naive());
    }
    Err(BudgetError::InvalidDate(format!(
        "'{}' is not a valid date (expected YYYY-MM-DD)",
        s
    )))
}
