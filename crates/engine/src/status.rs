//! Countdown status of a deadline.
//!
//! Everything here is pure: the caller supplies `today`, usually from
//! [`today`]. Values change at midnight, so they are recomputed on every read
//! and never stored.

use chrono::{Local, NaiveDate};

/// Current local calendar date.
pub fn today() -> NaiveDate {
    Local::now().date_naive()
}

/// Signed number of calendar days from `today` to `deadline`.
///
/// Zero when the deadline is today, negative once it has passed.
pub fn days_left(deadline: NaiveDate, today: NaiveDate) -> i64 {
    (deadline - today).num_days()
}

/// Urgency band derived from the days left.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub enum StatusBand {
    Expired,
    Urgent,
    Warning,
    Attention,
    Normal,
}

/// Thresholds checked in order, first match wins: a band applies while
/// `days_left <= upper`. `Normal` catches everything above the last bound.
const THRESHOLDS: [(i64, StatusBand); 4] = [
    (-1, StatusBand::Expired),
    (3, StatusBand::Urgent),
    (7, StatusBand::Warning),
    (14, StatusBand::Attention),
];

impl StatusBand {
    pub const ALL: [StatusBand; 5] = [
        Self::Expired,
        Self::Urgent,
        Self::Warning,
        Self::Attention,
        Self::Normal,
    ];

    pub fn from_days_left(days_left: i64) -> Self {
        THRESHOLDS
            .iter()
            .find(|(upper, _)| days_left <= *upper)
            .map(|(_, band)| *band)
            .unwrap_or(Self::Normal)
    }

    pub fn label(self) -> &'static str {
        match self {
            Self::Expired => "expired",
            Self::Urgent => "urgent",
            Self::Warning => "warning",
            Self::Attention => "attention",
            Self::Normal => "normal",
        }
    }

    /// Hex color used for badges and card borders.
    pub fn color(self) -> &'static str {
        match self {
            Self::Expired => "#ff4d4f",
            Self::Urgent => "#ff7a45",
            Self::Warning => "#ffa940",
            Self::Attention => "#ffec3d",
            Self::Normal => "#52c41a",
        }
    }

    /// Whether `days_left` falls inside this band's range.
    pub fn contains(self, days_left: i64) -> bool {
        match self {
            Self::Expired => days_left < 0,
            Self::Urgent => (0..=3).contains(&days_left),
            Self::Warning => (4..=7).contains(&days_left),
            Self::Attention => (8..=14).contains(&days_left),
            Self::Normal => days_left > 14,
        }
    }
}

impl std::fmt::Display for StatusBand {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.write_str(self.label())
    }
}

/// Human-readable countdown, e.g. `3 days left` or `expired 2 days ago`.
pub fn describe_days(days_left: i64) -> String {
    match days_left {
        0 => "due today".to_string(),
        1 => "1 day left".to_string(),
        -1 => "expired 1 day ago".to_string(),
        n if n < 0 => format!("expired {} days ago", -n),
        n => format!("{n} days left"),
    }
}
