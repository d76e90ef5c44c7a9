use std::fmt;

use crate::error::{RegressError, Result};

/// Month lengths of a 365-day (no-leap) model calendar.
pub const DAYS_IN_MONTH: [u32; 12] = [31, 28, 31, 30, 31, 30, 31, 31, 30, 31, 30, 31];

const MONTH_ABBREV: [&str; 12] = [
    "Jan", "Feb", "Mar", "Apr", "May", "Jun", "Jul", "Aug", "Sep", "Oct", "Nov", "Dec",
];

// ---------------------------------------------------------------------------
// SeasonSpec
// ---------------------------------------------------------------------------

/// A run of calendar months from `begin` to `end` inclusive.
///
/// When `begin > end` the season wraps the year boundary, e.g. `(12, 2)` is
/// December–January–February.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct SeasonSpec {
    begin: u32,
    end: u32,
}

impl SeasonSpec {
    pub fn new(begin: u32, end: u32) -> Result<Self> {
        if !(1..=12).contains(&begin) || !(1..=12).contains(&end) {
            return Err(RegressError::InvalidSeason { begin, end });
        }
        Ok(SeasonSpec { begin, end })
    }

    pub fn annual() -> Self {
        SeasonSpec { begin: 1, end: 12 }
    }

    pub fn begin(&self) -> u32 {
        self.begin
    }

    pub fn end(&self) -> u32 {
        self.end
    }

    /// Whether the season crosses from December into January.
    pub fn wraps(&self) -> bool {
        self.begin > self.end
    }

    /// Calendar months in season order.
    pub fn months(&self) -> Vec<u32> {
        if self.wraps() {
            (self.begin..=12).chain(1..=self.end).collect()
        } else {
            (self.begin..=self.end).collect()
        }
    }

    pub fn n_months(&self) -> usize {
        if self.wraps() {
            (12 - self.begin + 1 + self.end) as usize
        } else {
            (self.end - self.begin + 1) as usize
        }
    }

    /// Days in each month of the season, used as aggregation weights.
    pub fn day_weights(&self) -> Vec<f64> {
        self.months()
            .into_iter()
            .map(|m| DAYS_IN_MONTH[(m - 1) as usize] as f64)
            .collect()
    }

    /// Year offset (0 or 1) of each month relative to the season's first month.
    pub fn year_offsets(&self) -> Vec<i32> {
        self.months()
            .into_iter()
            .map(|m| if m < self.begin { 1 } else { 0 })
            .collect()
    }

    /// Short label: `ANN`, month initials (`DJF`), or `Jan` for one month.
    pub fn name(&self) -> String {
        match (self.begin, self.end) {
            (1, 12) => "ANN".to_string(),
            (b, e) if b == e => MONTH_ABBREV[(b - 1) as usize].to_string(),
            _ => self
                .months()
                .into_iter()
                .map(|m| MONTH_ABBREV[(m - 1) as usize].chars().next().unwrap_or('?'))
                .collect(),
        }
    }
}

impl fmt::Display for SeasonSpec {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.name())
    }
}
