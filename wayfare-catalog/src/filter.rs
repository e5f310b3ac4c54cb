use chrono::NaiveDate;
use serde::Deserialize;
use uuid::Uuid;
use wayfare_core::{Error, Result};

use crate::trip::TravelOption;

/// Catalog search parameters exactly as the presentation layer received
/// them, before any validation.
#[derive(Debug, Clone, Default, Deserialize)]
pub struct RawTripQuery {
    pub search: Option<String>,
    pub travel_mode: Option<String>,
    pub start_date: Option<String>,
    pub end_date: Option<String>,
    pub min_price: Option<String>,
    pub max_price: Option<String>,
}

/// Validated catalog filter. Read-only; applying it has no side effects.
#[derive(Debug, Clone)]
pub struct TripFilter {
    pub destination: Option<String>,
    pub mode_id: Option<Uuid>,
    pub departs_on_or_after: Option<NaiveDate>,
    pub returns_on_or_before: Option<NaiveDate>,
    pub min_price_minor: i64,
    pub max_price_minor: Option<i64>,
}

impl TripFilter {
    /// Parse raw query parameters. Malformed dates and non-numeric prices
    /// are `InvalidFilter` errors, never silently dropped. An unparseable
    /// travel-mode id is ignored, matching the observed catalog behaviour.
    /// `price_floor_minor` is the default lower bound when the caller sent
    /// none.
    pub fn from_raw(raw: &RawTripQuery, price_floor_minor: i64) -> Result<Self> {
        let destination = raw
            .search
            .as_deref()
            .map(str::trim)
            .filter(|s| !s.is_empty())
            .map(str::to_string);

        let mode_id = raw
            .travel_mode
            .as_deref()
            .and_then(|raw_id| Uuid::parse_str(raw_id).ok());

        let departs_on_or_after = parse_date(raw.start_date.as_deref(), "start_date")?;
        let returns_on_or_before = parse_date(raw.end_date.as_deref(), "end_date")?;

        let min_price_minor =
            parse_price(raw.min_price.as_deref(), "min_price")?.unwrap_or(price_floor_minor);
        let max_price_minor = parse_price(raw.max_price.as_deref(), "max_price")?;

        Ok(Self {
            destination,
            mode_id,
            departs_on_or_after,
            returns_on_or_before,
            min_price_minor,
            max_price_minor,
        })
    }

    pub fn matches(&self, trip: &TravelOption) -> bool {
        if let Some(needle) = &self.destination {
            if !trip
                .destination
                .to_lowercase()
                .contains(&needle.to_lowercase())
            {
                return false;
            }
        }
        if let Some(mode_id) = self.mode_id {
            if trip.mode_id != mode_id {
                return false;
            }
        }
        if let Some(start) = self.departs_on_or_after {
            if trip.travel_date.date_naive() < start {
                return false;
            }
        }
        if let Some(end) = self.returns_on_or_before {
            if trip.return_date.date_naive() > end {
                return false;
            }
        }
        if trip.price.amount_minor < self.min_price_minor {
            return false;
        }
        if let Some(max) = self.max_price_minor {
            if trip.price.amount_minor > max {
                return false;
            }
        }
        true
    }
}

fn parse_date(raw: Option<&str>, field: &str) -> Result<Option<NaiveDate>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => NaiveDate::parse_from_str(s, "%Y-%m-%d")
            .map(Some)
            .map_err(|_| Error::InvalidFilter(format!("{field} must be YYYY-MM-DD"))),
    }
}

fn parse_price(raw: Option<&str>, field: &str) -> Result<Option<i64>> {
    match raw.map(str::trim).filter(|s| !s.is_empty()) {
        None => Ok(None),
        Some(s) => {
            let major: f64 = s
                .parse()
                .map_err(|_| Error::InvalidFilter(format!("{field} must be a valid number")))?;
            Ok(Some((major * 100.0).round() as i64))
        }
    }
}
