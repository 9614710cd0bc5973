use crate::model::{PlayEvent, PlayTime};
use std::cmp::Ordering;
use std::collections::hash_map::Entry;
use std::collections::{BTreeMap, HashMap, HashSet};
use time::Date;

/// Accumulated listening state for one track.
#[derive(Debug, Clone)]
pub struct TrackTotals {
    /// Plays that reached the completion threshold.
    pub play_count: u64,
    /// Seconds listened across every event, threshold or not.
    pub listen_seconds: f64,
    /// Earliest event for the track, threshold or not.
    pub first_play: PlayTime,
    /// Position of the track's first event in the stream; ranking ties break
    /// in this first-seen order.
    pub first_index: usize,
}

/// Per-track accumulation over one pass of the windowed log.
///
/// `first_play` deliberately counts partial plays while `play_count` does
/// not: the first answers "when did this track show up at all", the second
/// "how often was it substantively played".
#[derive(Debug, Default)]
pub struct ListenTotals {
    tracks: HashMap<String, TrackTotals>,
    order: Vec<String>,
}

/// Single pass over the events. An event counts as a play when its listened
/// time reaches `threshold_ratio` of the track length; listen seconds and
/// first-play tracking take every event regardless.
pub fn aggregate(events: &[PlayEvent], threshold_ratio: f64) -> ListenTotals {
    let mut totals = ListenTotals::default();
    for event in events {
        let next_index = totals.order.len();
        let entry = match totals.tracks.entry(event.track.clone()) {
            Entry::Occupied(slot) => slot.into_mut(),
            Entry::Vacant(slot) => {
                totals.order.push(event.track.clone());
                slot.insert(TrackTotals {
                    play_count: 0,
                    listen_seconds: 0.0,
                    first_play: event.at,
                    first_index: next_index,
                })
            }
        };
        if event.played_seconds >= threshold_ratio * event.track_seconds {
            entry.play_count += 1;
        }
        entry.listen_seconds += event.played_seconds;
        if event.at.order(entry.first_play) == Ordering::Less {
            entry.first_play = event.at;
        }
    }
    totals
}

impl ListenTotals {
    pub fn len(&self) -> usize {
        self.order.len()
    }

    pub fn is_empty(&self) -> bool {
        self.order.is_empty()
    }

    pub fn get(&self, track: &str) -> Option<&TrackTotals> {
        self.tracks.get(track)
    }

    /// Tracks in the order they first appeared.
    pub fn iter_first_seen(&self) -> impl Iterator<Item = (&str, &TrackTotals)> {
        self.order.iter().map(|name| (name.as_str(), &self.tracks[name]))
    }

    /// Grand total listen time. Summed in first-seen order, so it equals the
    /// per-track sum exactly and deterministically.
    pub fn total_listen_seconds(&self) -> f64 {
        self.iter_first_seen()
            .map(|(_, totals)| totals.listen_seconds)
            .sum()
    }

    /// Top `n` tracks by counted plays.
    pub fn top_by_plays(&self, n: usize) -> Vec<(String, u64)> {
        self.top_by(n, |totals| totals.play_count)
    }

    /// Top `n` tracks by total listen time.
    pub fn top_by_listen_time(&self, n: usize) -> Vec<(String, f64)> {
        self.top_by(n, |totals| totals.listen_seconds)
    }

    /// Descending by metric, ties resolved by ascending first-seen index.
    /// `n` past the number of tracks returns everything; zero returns nothing.
    fn top_by<M, F>(&self, n: usize, metric: F) -> Vec<(String, M)>
    where
        M: PartialOrd + Copy,
        F: Fn(&TrackTotals) -> M,
    {
        let mut ranked: Vec<(&str, M, usize)> = self
            .iter_first_seen()
            .map(|(name, totals)| (name, metric(totals), totals.first_index))
            .collect();
        ranked.sort_by(|a, b| {
            b.1.partial_cmp(&a.1)
                .unwrap_or(Ordering::Equal)
                .then(a.2.cmp(&b.2))
        });
        ranked
            .into_iter()
            .take(n)
            .map(|(name, value, _)| (name.to_string(), value))
            .collect()
    }
}

/// Per-day event counts for the given tracks only. Every event counts here,
/// including ones below the completion threshold, so the daily curves match
/// the raw play stream. An absent (track, date) pair means zero.
pub fn daily_play_counts(
    events: &[PlayEvent],
    tracks: &HashSet<String>,
) -> HashMap<String, BTreeMap<Date, u64>> {
    let mut per_day: HashMap<String, BTreeMap<Date, u64>> = HashMap::new();
    for event in events {
        if !tracks.contains(&event.track) {
            continue;
        }
        let days = per_day.entry(event.track.clone()).or_default();
        *days.entry(event.at.date()).or_insert(0) += 1;
    }
    per_day
}

/// One step of the discovery staircase.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DiscoveryPoint {
    pub at: PlayTime,
    pub discovered: u64,
}

/// Distinct tracks over time: the k-th point is the k-th track's first play,
/// so the curve is non-decreasing and ends at the distinct-track count. Ties
/// on first-play time fall back to name order to stay deterministic.
pub fn discovery_curve(totals: &ListenTotals) -> Vec<DiscoveryPoint> {
    let mut firsts: Vec<(&str, PlayTime)> = totals
        .iter_first_seen()
        .map(|(name, track)| (name, track.first_play))
        .collect();
    firsts.sort_by(|a, b| a.1.order(b.1).then_with(|| a.0.cmp(b.0)));
    firsts
        .into_iter()
        .enumerate()
        .map(|(index, (_, at))| DiscoveryPoint {
            at,
            discovered: index as u64 + 1,
        })
        .collect()
}
