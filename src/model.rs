use anyhow::{Context, Result};
use std::cmp::Ordering;
use time::format_description::well_known::Iso8601;
use time::{Date, OffsetDateTime, PrimitiveDateTime};

/// Timestamp of a play event. The log stores ISO-8601 text that may or may
/// not carry a UTC offset, and both forms are kept as parsed so comparisons
/// can reconcile the two instead of guessing a zone.
///
/// Within one log all timestamps are of the same kind; the mixed comparisons
/// below exist so that a window bound of the other kind never fails.
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum PlayTime {
    Naive(PrimitiveDateTime),
    Offset(OffsetDateTime),
}

impl PlayTime {
    /// Parse an ISO-8601 timestamp, offset-aware if the text has an offset,
    /// naive otherwise. A bare date is taken as midnight that day.
    pub fn parse(text: &str) -> Result<Self> {
        if let Ok(aware) = OffsetDateTime::parse(text, &Iso8601::DEFAULT) {
            return Ok(Self::Offset(aware));
        }
        if let Ok(naive) = PrimitiveDateTime::parse(text, &Iso8601::DEFAULT) {
            return Ok(Self::Naive(naive));
        }
        let date = Date::parse(text, &Iso8601::DEFAULT)
            .with_context(|| format!("unrecognized timestamp {text:?}"))?;
        Ok(Self::Naive(date.midnight()))
    }

    /// Calendar date used for per-day bucketing. An offset-aware timestamp
    /// keeps its own offset's date.
    pub fn date(self) -> Date {
        match self {
            Self::Naive(at) => at.date(),
            Self::Offset(at) => at.date(),
        }
    }

    fn wall_clock(self) -> PrimitiveDateTime {
        match self {
            Self::Naive(at) => at,
            Self::Offset(at) => PrimitiveDateTime::new(at.date(), at.time()),
        }
    }

    /// Compare this event time against a window bound. The bound is always
    /// the side that gets reconciled: a naive bound adopts the event's
    /// offset, and an offset-aware bound is read by its wall clock when the
    /// event is naive.
    pub fn cmp_boundary(self, bound: Self) -> Ordering {
        match (self, bound) {
            (Self::Naive(event), Self::Naive(bound)) => event.cmp(&bound),
            (Self::Offset(event), Self::Offset(bound)) => event.cmp(&bound),
            (Self::Offset(event), Self::Naive(bound)) => {
                event.cmp(&bound.assume_offset(event.offset()))
            }
            (Self::Naive(event), Self::Offset(bound)) => {
                event.cmp(&PrimitiveDateTime::new(bound.date(), bound.time()))
            }
        }
    }

    /// Ordering between event times. Same-kind timestamps compare directly;
    /// mixed ones fall back to wall-clock order, which keeps sorting
    /// deterministic even for a log that breaks the single-kind assumption.
    pub fn order(self, other: Self) -> Ordering {
        match (self, other) {
            (Self::Naive(a), Self::Naive(b)) => a.cmp(&b),
            (Self::Offset(a), Self::Offset(b)) => a.cmp(&b),
            _ => self.wall_clock().cmp(&other.wall_clock()),
        }
    }
}

/// One decoded row of the play log. Track identity is the decoded name:
/// distinct tracks sharing a name merge, a limitation of the source schema.
#[derive(Debug, Clone, PartialEq)]
pub struct PlayEvent {
    pub track: String,
    pub at: PlayTime,
    /// Seconds actually listened, never negative.
    pub played_seconds: f64,
    /// Full length of the track, always positive.
    pub track_seconds: f64,
}
