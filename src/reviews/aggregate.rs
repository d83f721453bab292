//! Review aggregation.
//!
//! Each review's star value is validated at ingestion. Records that fail
//! validation are reported as [`MalformedReview`] and left out of both the
//! sum and the count, so one bad record never poisons the average.

use std::fmt;

use serde::{Serialize, Serializer};
use serde_json::Value;
use thiserror::Error;

use crate::reviews::repo_types::RawReview;

pub const MIN_STARS: u8 = 1;
pub const MAX_STARS: u8 = 5;

const STAR: char = '★';

/// Non-negative decimal with exactly two fractional digits.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord)]
pub struct Decimal2 {
    hundredths: u64,
}

impl Decimal2 {
    /// `sum / count`, rounded half-up to two places. `None` when `count` is 0.
    pub fn mean(sum: u64, count: u64) -> Option<Self> {
        if count == 0 {
            return None;
        }
        let hundredths = (sum * 200 + count) / (2 * count);
        Some(Self { hundredths })
    }
}

impl fmt::Display for Decimal2 {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}.{:02}", self.hundredths / 100, self.hundredths % 100)
    }
}

impl Serialize for Decimal2 {
    fn serialize<S: Serializer>(&self, s: S) -> Result<S::Ok, S::Error> {
        s.collect_str(self)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(tag = "kind", content = "value", rename_all = "snake_case")]
pub enum AggregateRating {
    Average(Decimal2),
    NoReviews,
}

impl fmt::Display for AggregateRating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            AggregateRating::Average(avg) => write!(f, "Average Rating: {avg}"),
            AggregateRating::NoReviews => f.write_str("No reviews yet."),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct DisplayItem {
    pub star_count: u8,
    /// `star_count` filled stars.
    pub indicator: String,
    pub message: String,
}

impl DisplayItem {
    fn new(star_count: u8, message: Option<String>) -> Self {
        Self {
            star_count,
            indicator: std::iter::repeat(STAR)
                .take(usize::from(star_count))
                .collect(),
            message: message.unwrap_or_default(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
pub enum MalformedReason {
    #[error("stars missing")]
    Missing,
    #[error("stars is not an integer: {0}")]
    NotInteger(String),
    #[error("stars {0} outside 1..=5")]
    OutOfRange(i64),
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct MalformedReview {
    pub review_id: String,
    #[serde(serialize_with = "serialize_display")]
    pub reason: MalformedReason,
}

fn serialize_display<T: fmt::Display, S: Serializer>(v: &T, s: S) -> Result<S::Ok, S::Error> {
    s.collect_str(v)
}

#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct ReviewSummary {
    pub average: AggregateRating,
    pub display_items: Vec<DisplayItem>,
    pub rejected: Vec<MalformedReview>,
}

fn as_integer(value: &Value) -> Option<i64> {
    match value {
        Value::Number(n) => n.as_i64().or_else(|| {
            n.as_f64()
                .filter(|f| f.is_finite() && f.fract() == 0.0 && f.abs() < 1e15)
                .map(|f| f as i64)
        }),
        Value::String(s) => s.trim().parse::<i64>().ok(),
        _ => None,
    }
}

/// Coerce a stored star value to an integer in `MIN_STARS..=MAX_STARS`.
/// Integers, integral floats and integer strings are accepted.
pub fn parse_stars(value: Option<&Value>) -> Result<u8, MalformedReason> {
    let value = value.ok_or(MalformedReason::Missing)?;
    let n = as_integer(value).ok_or_else(|| MalformedReason::NotInteger(value.to_string()))?;
    u8::try_from(n)
        .ok()
        .filter(|s| (MIN_STARS..=MAX_STARS).contains(s))
        .ok_or(MalformedReason::OutOfRange(n))
}

/// Summarise one doctor's reviews. Display order follows `reviews`.
pub fn summarize(reviews: Vec<RawReview>) -> ReviewSummary {
    let mut display_items = Vec::with_capacity(reviews.len());
    let mut rejected = Vec::new();
    let mut sum: u64 = 0;

    for review in reviews {
        match parse_stars(review.stars.as_ref()) {
            Ok(stars) => {
                sum += u64::from(stars);
                display_items.push(DisplayItem::new(stars, review.message));
            }
            Err(reason) => rejected.push(MalformedReview {
                review_id: review.id,
                reason,
            }),
        }
    }

    let count = display_items.len() as u64;
    let average = Decimal2::mean(sum, count)
        .map(AggregateRating::Average)
        .unwrap_or(AggregateRating::NoReviews);

    ReviewSummary {
        average,
        display_items,
        rejected,
    }
}
