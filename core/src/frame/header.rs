use chrono::{DateTime, NaiveDateTime, Utc};
use serde::{Deserialize, Serialize};

/// A single FITS-style header value.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub enum HeaderValue {
    Text(String),
    Integer(i64),
    Real(f64),
    Logical(bool),
}

impl HeaderValue {
    pub fn as_f64(&self) -> Option<f64> {
        match self {
            HeaderValue::Integer(v) => Some(*v as f64),
            HeaderValue::Real(v) => Some(*v),
            HeaderValue::Text(s) => s.trim().parse().ok(),
            HeaderValue::Logical(_) => None,
        }
    }

    pub fn as_text(&self) -> Option<&str> {
        match self {
            HeaderValue::Text(s) => Some(s),
            _ => None,
        }
    }
}

/// Ordered key/value header accompanying a raster frame.
///
/// Loaded headers are never edited; `derive_with` produces the header for a
/// processed output from a source header plus updates.
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct ImageHeader {
    cards: Vec<(String, HeaderValue)>,
}

impl ImageHeader {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn from_cards(cards: Vec<(String, HeaderValue)>) -> Self {
        Self { cards }
    }

    /// Append a card during initial construction.
    pub fn push(&mut self, key: &str, value: HeaderValue) {
        self.cards.push((key.to_string(), value));
    }

    pub fn get(&self, key: &str) -> Option<&HeaderValue> {
        self.cards
            .iter()
            .find(|(k, _)| k.eq_ignore_ascii_case(key))
            .map(|(_, v)| v)
    }

    pub fn get_f64(&self, key: &str) -> Option<f64> {
        self.get(key).and_then(HeaderValue::as_f64)
    }

    pub fn get_text(&self, key: &str) -> Option<&str> {
        self.get(key).and_then(HeaderValue::as_text)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn is_empty(&self) -> bool {
        self.cards.is_empty()
    }

    pub fn cards(&self) -> &[(String, HeaderValue)] {
        &self.cards
    }

    /// New header derived from this one: updated keys replace in place,
    /// unknown keys append. `self` is left untouched.
    pub fn derive_with(&self, updates: &[(&str, HeaderValue)]) -> Self {
        let mut cards = self.cards.clone();
        for (key, value) in updates {
            match cards.iter_mut().find(|(k, _)| k.eq_ignore_ascii_case(key)) {
                Some(card) => card.1 = value.clone(),
                None => cards.push((key.to_string(), value.clone())),
            }
        }
        Self { cards }
    }

    /// Observation timestamp from DATE-OBS, if present and parseable.
    pub fn observation_datetime(&self) -> Option<DateTime<Utc>> {
        let raw = self.get_text("DATE-OBS")?;
        for fmt in [
            "%Y-%m-%dT%H:%M:%S%.f",
            "%Y-%m-%dT%H:%M:%S",
            "%Y-%m-%d",
        ] {
            if let Ok(naive) = NaiveDateTime::parse_from_str(raw, fmt) {
                return Some(naive.and_utc());
            }
            if fmt == "%Y-%m-%d" {
                if let Ok(date) = chrono::NaiveDate::parse_from_str(raw, fmt) {
                    return Some(date.and_hms_opt(0, 0, 0)?.and_utc());
                }
            }
        }
        None
    }

    /// Exposure time in seconds (EXPTIME with EXPOSURE as a fallback).
    pub fn exposure_time(&self) -> Option<f64> {
        self.get_f64("EXPTIME").or_else(|| self.get_f64("EXPOSURE"))
    }
}
