//! Rating derived from experience and completed jobs. Never persisted.

use std::fmt;

use serde::{Serialize, Serializer};

use crate::models::LabourProfile;

const BASE: f64 = 3.0;
const EXPERIENCE_WEIGHT: f64 = 0.1;
const JOBS_WEIGHT: f64 = 0.05;
const BONUS_CAP: f64 = 1.0;

/// A score in `[3.0, 5.0]`, held at one decimal place.
#[derive(Debug, Clone, Copy, PartialEq, PartialOrd)]
pub struct Rating(f64);

impl Rating {
    pub fn value(self) -> f64 {
        self.0
    }
}

impl fmt::Display for Rating {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.pad(&format!("{:.1}", self.0))
    }
}

impl Serialize for Rating {
    fn serialize<S: Serializer>(&self, serializer: S) -> Result<S::Ok, S::Error> {
        serializer.collect_str(self)
    }
}

/// `3.0 + min(experience * 0.1, 1.0) + min(completed_jobs * 0.05, 1.0)`
pub fn rating(experience: u32, completed_jobs: u32) -> Rating {
    let experience_bonus = (f64::from(experience) * EXPERIENCE_WEIGHT).min(BONUS_CAP);
    let jobs_bonus = (f64::from(completed_jobs) * JOBS_WEIGHT).min(BONUS_CAP);
    let raw = BASE + experience_bonus + jobs_bonus;
    let tenths = fixed_tenths(raw);
    Rating(tenths as f64 / 10.0)
}

/// Round a non-negative `value` to tenths at its exact binary value, ties up.
///
/// Scaling by ten first would round the product instead, and `{:.1}` sends
/// exact ties to even; both disagree with the app's `toFixed(1)` display.
fn fixed_tenths(value: f64) -> u64 {
    // Ratings have at most 52 fractional bits, so 60 places print exactly.
    let exact = format!("{value:.60}");
    let (whole, fraction) = exact.split_once('.').unwrap_or((exact.as_str(), ""));
    let mut digits = fraction.bytes().map(|b| u64::from(b.saturating_sub(b'0')));
    let first = digits.next().unwrap_or(0);
    let second = digits.next().unwrap_or(0);
    let whole: u64 = whole.parse().unwrap_or(0);
    whole * 10 + first + u64::from(second >= 5)
}

impl LabourProfile {
    pub fn rating(&self) -> Rating {
        rating(self.experience, self.completed_jobs)
    }
}
