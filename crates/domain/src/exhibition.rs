//! Exhibition and pop-up listing types
//!
//! These back the map view (viewport queries), the calendar view
//! (date-range queries) and the wishlist.

use chrono::{DateTime, Datelike, NaiveDate, Utc};
use serde::{Deserialize, Serialize};

use crate::error::{DomainError, DomainResult};
use crate::request::QueryParams;

/// Kind of event listed by the service.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum EventKind {
    /// Gallery or museum exhibition.
    Exhibition,
    /// Short-lived pop-up store or event.
    Popup,
}

impl EventKind {
    /// Returns the wire value used in query strings.
    #[must_use]
    pub const fn as_str(self) -> &'static str {
        match self {
            Self::Exhibition => "exhibition",
            Self::Popup => "popup",
        }
    }
}

impl std::str::FromStr for EventKind {
    type Err = DomainError;

    fn from_str(s: &str) -> DomainResult<Self> {
        match s.to_ascii_lowercase().as_str() {
            "exhibition" => Ok(Self::Exhibition),
            "popup" | "pop-up" => Ok(Self::Popup),
            other => Err(DomainError::InvalidQuery(format!("unknown event kind: {other}"))),
        }
    }
}

/// A listed exhibition or pop-up.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Exhibition {
    /// Server-side id.
    pub id: i64,
    /// Title shown on cards and the detail page.
    pub title: String,
    /// Exhibition or pop-up.
    pub kind: EventKind,
    /// Venue name.
    pub venue: String,
    /// Street address.
    #[serde(default)]
    pub address: String,
    /// Venue latitude (WGS84).
    pub latitude: f64,
    /// Venue longitude (WGS84).
    pub longitude: f64,
    /// First day open.
    pub start_date: NaiveDate,
    /// Last day open.
    pub end_date: NaiveDate,
    /// Card image.
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub thumbnail_url: Option<String>,
    /// Category tags.
    #[serde(default)]
    pub categories: Vec<String>,
    /// Whether the current user has wishlisted it.
    #[serde(default)]
    pub wishlisted: bool,
}

impl Exhibition {
    /// Returns true if the event is open on `date`.
    #[must_use]
    pub fn is_open_on(&self, date: NaiveDate) -> bool {
        self.start_date <= date && date <= self.end_date
    }
}

/// Entry of the user's wishlist.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct WishlistItem {
    /// The wishlisted event.
    pub exhibition: Exhibition,
    /// When it was added.
    pub added_at: DateTime<Utc>,
}

/// Visible map viewport.
#[derive(Debug, Clone, Copy, PartialEq, Serialize, Deserialize)]
pub struct MapBounds {
    /// Southern latitude.
    pub south: f64,
    /// Western longitude.
    pub west: f64,
    /// Northern latitude.
    pub north: f64,
    /// Eastern longitude.
    pub east: f64,
}

impl MapBounds {
    /// Creates a viewport after range checks.
    ///
    /// # Errors
    ///
    /// Returns an error if a coordinate is out of range or south > north.
    pub fn new(south: f64, west: f64, north: f64, east: f64) -> DomainResult<Self> {
        let lat_ok = |v: f64| (-90.0..=90.0).contains(&v);
        let lng_ok = |v: f64| (-180.0..=180.0).contains(&v);
        if !(lat_ok(south) && lat_ok(north) && lng_ok(west) && lng_ok(east)) {
            return Err(DomainError::InvalidQuery(
                "map bounds out of range".to_string(),
            ));
        }
        if south > north {
            return Err(DomainError::InvalidQuery(
                "south bound is above north bound".to_string(),
            ));
        }
        Ok(Self {
            south,
            west,
            north,
            east,
        })
    }
}

/// Filters for listing exhibitions.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ExhibitionQuery {
    /// Restrict to one kind.
    pub kind: Option<EventKind>,
    /// Restrict to one category tag.
    pub category: Option<String>,
    /// Events open on or after this day.
    pub from: Option<NaiveDate>,
    /// Events open on or before this day.
    pub to: Option<NaiveDate>,
    /// Map viewport.
    pub bounds: Option<MapBounds>,
    /// Zero-based page.
    pub page: Option<u32>,
    /// Page size.
    pub size: Option<u32>,
}

impl ExhibitionQuery {
    /// Returns a query covering the whole calendar month.
    ///
    /// # Errors
    ///
    /// Returns an error if `month` is not in `1..=12` or the year is out of range.
    pub fn for_month(year: i32, month: u32) -> DomainResult<Self> {
        let invalid = || DomainError::InvalidQuery(format!("invalid month: {year}-{month}"));
        let first = NaiveDate::from_ymd_opt(year, month, 1).ok_or_else(invalid)?;
        let next_first = if month == 12 {
            NaiveDate::from_ymd_opt(year + 1, 1, 1)
        } else {
            NaiveDate::from_ymd_opt(year, month + 1, 1)
        }
        .ok_or_else(invalid)?;
        let last = next_first.pred_opt().ok_or_else(invalid)?;
        debug_assert_eq!(last.month(), first.month());
        Ok(Self {
            from: Some(first),
            to: Some(last),
            ..Self::default()
        })
    }

    /// Restricts the query to a map viewport.
    #[must_use]
    pub const fn within(mut self, bounds: MapBounds) -> Self {
        self.bounds = Some(bounds);
        self
    }

    /// Checks the date range.
    ///
    /// # Errors
    ///
    /// Returns an error if `from` is after `to`.
    pub fn validate(&self) -> DomainResult<()> {
        if let (Some(from), Some(to)) = (self.from, self.to)
            && from > to
        {
            return Err(DomainError::InvalidQuery(format!(
                "date range is reversed: {from} > {to}"
            )));
        }
        Ok(())
    }

    /// Encodes the filters as query string parameters.
    #[must_use]
    pub fn to_params(&self) -> QueryParams {
        let mut params = QueryParams::new();
        params.push_opt("kind", self.kind.map(EventKind::as_str));
        params.push_opt("category", self.category.as_deref());
        params.push_opt("from", self.from);
        params.push_opt("to", self.to);
        if let Some(b) = self.bounds {
            params.push("south", b.south);
            params.push("west", b.west);
            params.push("north", b.north);
            params.push("east", b.east);
        }
        params.push_opt("page", self.page);
        params.push_opt("size", self.size);
        params
    }
}
