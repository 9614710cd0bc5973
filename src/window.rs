use crate::model::{PlayEvent, PlayTime};
use anyhow::{Context, Result};
use std::cmp::Ordering;
use time::{Date, Duration, Month, PrimitiveDateTime};

/// Inclusive date/time window. A missing bound leaves that side open.
#[derive(Debug, Clone, Copy, Default, PartialEq)]
pub struct DateWindow {
    pub start: Option<PlayTime>,
    pub end: Option<PlayTime>,
}

impl DateWindow {
    pub fn unbounded() -> Self {
        Self::default()
    }

    /// Window covering one calendar month, from the first instant of the
    /// month to one second before the next month starts. December rolls into
    /// January of the following year.
    pub fn month(year: i32, month: u8) -> Result<Self> {
        let month = Month::try_from(month)
            .ok()
            .with_context(|| format!("month {month} is out of range 1-12"))?;
        let start = first_instant(year, month)?;
        let (next_year, next_month) = match month {
            Month::December => (year + 1, Month::January),
            other => (year, other.next()),
        };
        let end = first_instant(next_year, next_month)? - Duration::seconds(1);
        Ok(Self {
            start: Some(PlayTime::Naive(start)),
            end: Some(PlayTime::Naive(end)),
        })
    }

    pub fn contains(&self, at: PlayTime) -> bool {
        if let Some(start) = self.start {
            if at.cmp_boundary(start) == Ordering::Less {
                return false;
            }
        }
        if let Some(end) = self.end {
            if at.cmp_boundary(end) == Ordering::Greater {
                return false;
            }
        }
        true
    }

    /// Keep the in-window subsequence without reordering it. An empty result
    /// is a valid outcome, not an error.
    pub fn filter(&self, events: &[PlayEvent]) -> Vec<PlayEvent> {
        events
            .iter()
            .filter(|event| self.contains(event.at))
            .cloned()
            .collect()
    }
}

fn first_instant(year: i32, month: Month) -> Result<PrimitiveDateTime> {
    let date = Date::from_calendar_date(year, month, 1)
        .with_context(|| format!("no such month: {year}-{month:?}"))?;
    Ok(date.midnight())
}
