//! Price history value types.
//!
//! A `PriceSeries` is the only input of the trend analyzer. It is built once
//! per request from provider samples and never mutated afterwards.

use std::fmt;
use std::str::FromStr;

use chrono::{DateTime, Datelike, Duration, DurationRound, Utc};
use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use thiserror::Error;

#[derive(Debug, Error, Clone, PartialEq, Eq)]
pub enum SeriesError {
    #[error("Timestamps must be strictly increasing (violated at index {index})")]
    NonIncreasingTimestamp { index: usize },
    #[error("Unknown interval '{0}' (expected hour, day or week)")]
    InvalidInterval(String),
}

/// Sampling interval of a price series
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Interval {
    Hour,
    Day,
    Week,
}

impl Interval {
    /// Bucket start for a timestamp. Weeks start on Monday 00:00 UTC.
    pub fn bucket_start(&self, ts: DateTime<Utc>) -> DateTime<Utc> {
        match self {
            Interval::Hour => ts.duration_trunc(Duration::hours(1)).unwrap_or(ts),
            Interval::Day => ts.duration_trunc(Duration::days(1)).unwrap_or(ts),
            Interval::Week => {
                let day = ts.duration_trunc(Duration::days(1)).unwrap_or(ts);
                let offset = day.weekday().num_days_from_monday() as i64;
                day - Duration::days(offset)
            }
        }
    }
}

impl fmt::Display for Interval {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Interval::Hour => write!(f, "hour"),
            Interval::Day => write!(f, "day"),
            Interval::Week => write!(f, "week"),
        }
    }
}

impl FromStr for Interval {
    type Err = SeriesError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s.trim().to_ascii_lowercase().as_str() {
            "hour" | "hourly" | "1h" => Ok(Interval::Hour),
            "day" | "daily" | "1d" => Ok(Interval::Day),
            "week" | "weekly" | "1w" => Ok(Interval::Week),
            other => Err(SeriesError::InvalidInterval(other.to_string())),
        }
    }
}

/// A single price observation
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct PricePoint {
    pub timestamp: DateTime<Utc>,
    pub price: Decimal,
}

impl PricePoint {
    pub fn new(timestamp: DateTime<Utc>, price: Decimal) -> Self {
        Self { timestamp, price }
    }
}

/// Ordered price samples with strictly increasing timestamps
#[derive(Debug, Clone, PartialEq, Eq, Default, Serialize)]
pub struct PriceSeries {
    points: Vec<PricePoint>,
}

impl PriceSeries {
    /// Build a series, rejecting out-of-order or duplicate timestamps
    pub fn new(points: Vec<PricePoint>) -> Result<Self, SeriesError> {
        if let Some(index) = points
            .windows(2)
            .position(|w| w[1].timestamp <= w[0].timestamp)
        {
            return Err(SeriesError::NonIncreasingTimestamp { index: index + 1 });
        }
        Ok(Self { points })
    }

    /// Build a series from unordered samples: sorts by time and keeps the
    /// last price seen for any repeated timestamp.
    pub fn from_unordered(mut points: Vec<PricePoint>) -> Self {
        points.sort_by_key(|p| p.timestamp);
        let mut deduped: Vec<PricePoint> = Vec::with_capacity(points.len());
        for point in points {
            match deduped.last_mut() {
                Some(last) if last.timestamp == point.timestamp => *last = point,
                _ => deduped.push(point),
            }
        }
        Self { points: deduped }
    }

    pub fn points(&self) -> &[PricePoint] {
        &self.points
    }

    pub fn len(&self) -> usize {
        self.points.len()
    }

    pub fn is_empty(&self) -> bool {
        self.points.is_empty()
    }

    pub fn first(&self) -> Option<&PricePoint> {
        self.points.first()
    }

    pub fn last(&self) -> Option<&PricePoint> {
        self.points.last()
    }

    pub fn prices(&self) -> impl Iterator<Item = Decimal> + '_ {
        self.points.iter().map(|p| p.price)
    }

    /// Downsample to one point per interval bucket, keeping the last
    /// observation in each bucket (the bucket's close).
    pub fn resample(&self, interval: Interval) -> PriceSeries {
        let mut out: Vec<PricePoint> = Vec::new();
        let mut current_bucket: Option<DateTime<Utc>> = None;

        for point in &self.points {
            let bucket = interval.bucket_start(point.timestamp);
            if current_bucket == Some(bucket) {
                if let Some(last) = out.last_mut() {
                    *last = *point;
                }
            } else {
                current_bucket = Some(bucket);
                out.push(*point);
            }
        }

        PriceSeries { points: out }
    }
}
