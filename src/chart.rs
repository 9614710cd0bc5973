use crate::model::{PlayEvent, PlayTime};
use crate::stats::{DiscoveryPoint, daily_play_counts};
use anyhow::{Context, Result};
use plotters::prelude::*;
use std::collections::HashSet;
use std::path::{Path, PathBuf};
use time::{Date, OffsetDateTime};

const CHART_SIZE: (u32, u32) = (1200, 800);

/// Daily series for one track, ordered by date.
#[derive(Debug, Clone, PartialEq)]
pub struct TrackSeries {
    pub track: String,
    pub points: Vec<(Date, u64)>,
}

/// Everything the renderer needs: the overall growth curves plus per-track
/// daily and cumulative series for the ranked tracks.
#[derive(Debug, Clone, PartialEq)]
pub struct ChartData {
    /// Running play count, one point per event in stream order.
    pub cumulative_plays: Vec<(PlayTime, u64)>,
    /// Distinct-track staircase over the same time span.
    pub discovery: Vec<DiscoveryPoint>,
    /// Plays per day for each ranked track, ranking order preserved.
    pub daily_plays: Vec<TrackSeries>,
    /// Running per-day totals for the same tracks.
    pub cumulative_daily_plays: Vec<TrackSeries>,
}

/// Assemble the chart series from the windowed events. Per-track series are
/// built only for `top_tracks`, in the given ranking order.
pub fn build_chart_data(
    events: &[PlayEvent],
    discovery: Vec<DiscoveryPoint>,
    top_tracks: &[(String, u64)],
) -> ChartData {
    let cumulative_plays = events
        .iter()
        .enumerate()
        .map(|(index, event)| (event.at, index as u64 + 1))
        .collect();

    let subset: HashSet<String> = top_tracks.iter().map(|(name, _)| name.clone()).collect();
    let per_day = daily_play_counts(events, &subset);

    let mut daily_plays = Vec::new();
    let mut cumulative_daily_plays = Vec::new();
    for (track, _) in top_tracks {
        let Some(days) = per_day.get(track) else {
            continue;
        };
        let points: Vec<(Date, u64)> = days.iter().map(|(&date, &count)| (date, count)).collect();
        let mut running = 0;
        let cumulative = points
            .iter()
            .map(|&(date, count)| {
                running += count;
                (date, running)
            })
            .collect();
        daily_plays.push(TrackSeries {
            track: track.clone(),
            points,
        });
        cumulative_daily_plays.push(TrackSeries {
            track: track.clone(),
            points: cumulative,
        });
    }

    ChartData {
        cumulative_plays,
        discovery,
        daily_plays,
        cumulative_daily_plays,
    }
}

/// Render the three PNG charts into `dir`, returning the files written.
/// Nothing is rendered when the window held no plays.
pub fn render_charts(data: &ChartData, dir: &Path) -> Result<Vec<PathBuf>> {
    if data.cumulative_plays.is_empty() {
        log::warn!("no plays to chart, skipping chart output");
        return Ok(Vec::new());
    }
    std::fs::create_dir_all(dir)
        .with_context(|| format!("failed to create chart directory {}", dir.display()))?;

    let mut written = Vec::new();
    let growth = dir.join("plays_and_discovery.png");
    render_growth_chart(data, &growth)?;
    written.push(growth);

    if !data.daily_plays.is_empty() {
        let daily = dir.join("daily_top_tracks.png");
        render_daily_chart(
            &data.daily_plays,
            "Daily Plays for Top Tracks",
            "Plays/Day",
            &daily,
        )?;
        written.push(daily);

        let cumulative = dir.join("cumulative_top_tracks.png");
        render_daily_chart(
            &data.cumulative_daily_plays,
            "Cumulative Plays for Top Tracks",
            "Cumulative Plays",
            &cumulative,
        )?;
        written.push(cumulative);
    }
    Ok(written)
}

fn timeline_seconds(at: PlayTime) -> f64 {
    match at {
        PlayTime::Naive(t) => t.assume_utc().unix_timestamp() as f64,
        PlayTime::Offset(t) => t.unix_timestamp() as f64,
    }
}

fn date_label(seconds: &f64) -> String {
    OffsetDateTime::from_unix_timestamp(*seconds as i64)
        .map(|at| at.date().to_string())
        .unwrap_or_default()
}

fn span(values: impl Iterator<Item = f64>) -> (f64, f64) {
    let mut min = f64::MAX;
    let mut max = f64::MIN;
    for value in values {
        min = min.min(value);
        max = max.max(value);
    }
    if min >= max {
        (min - 1.0, min + 1.0)
    } else {
        (min, max)
    }
}

fn render_growth_chart(data: &ChartData, path: &Path) -> Result<()> {
    let (x_min, x_max) = span(
        data.cumulative_plays
            .iter()
            .map(|&(at, _)| timeline_seconds(at))
            .chain(data.discovery.iter().map(|point| timeline_seconds(point.at))),
    );
    let y_max = data
        .cumulative_plays
        .last()
        .map(|&(_, count)| count)
        .unwrap_or(1)
        .max(1) as f64;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(
            "Cumulative Plays and Unique Tracks Discovered",
            ("sans-serif", 28),
        )
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(56)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&date_label)
        .x_desc("Date")
        .y_desc("Count")
        .draw()?;

    chart
        .draw_series(LineSeries::new(
            data.cumulative_plays
                .iter()
                .map(|&(at, count)| (timeline_seconds(at), count as f64)),
            &BLUE,
        ))?
        .label("Cumulative Plays")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], BLUE));
    chart
        .draw_series(LineSeries::new(
            data.discovery
                .iter()
                .map(|point| (timeline_seconds(point.at), point.discovered as f64)),
            &RED,
        ))?
        .label("Unique Tracks Discovered")
        .legend(|(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], RED));

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}

fn render_daily_chart(
    series: &[TrackSeries],
    title: &str,
    y_desc: &str,
    path: &Path,
) -> Result<()> {
    let (x_min, x_max) = span(
        series
            .iter()
            .flat_map(|one| one.points.iter().map(|&(date, _)| date.to_julian_day() as f64)),
    );
    let y_max = series
        .iter()
        .flat_map(|one| one.points.iter().map(|&(_, count)| count))
        .max()
        .unwrap_or(1)
        .max(1) as f64;

    let root = BitMapBackend::new(path, CHART_SIZE).into_drawing_area();
    root.fill(&WHITE)?;
    let mut chart = ChartBuilder::on(&root)
        .caption(title, ("sans-serif", 28))
        .margin(16)
        .x_label_area_size(48)
        .y_label_area_size(56)
        .build_cartesian_2d(x_min..x_max, 0.0..y_max * 1.05)?;
    chart
        .configure_mesh()
        .x_labels(8)
        .x_label_formatter(&|day| {
            Date::from_julian_day(*day as i32)
                .map(|date| date.to_string())
                .unwrap_or_default()
        })
        .x_desc("Date")
        .y_desc(y_desc)
        .draw()?;

    for (index, one) in series.iter().enumerate() {
        let color = Palette99::pick(index).to_rgba();
        chart
            .draw_series(LineSeries::new(
                one.points
                    .iter()
                    .map(|&(date, count)| (date.to_julian_day() as f64, count as f64)),
                color,
            ))?
            .label(one.track.clone())
            .legend(move |(x, y)| PathElement::new(vec![(x, y), (x + 20, y)], color));
    }

    chart
        .configure_series_labels()
        .background_style(WHITE.mix(0.8))
        .border_style(BLACK)
        .draw()?;
    root.present()
        .with_context(|| format!("failed to write {}", path.display()))?;
    Ok(())
}
