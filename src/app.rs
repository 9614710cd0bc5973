use crate::chart;
use crate::config::AnalysisConfig;
use crate::report;
use crate::stats;
use crate::store::PlayLog;
use anyhow::{Context, Result, bail};
use std::io::Write;

/// Run one full analysis, writing the console summary to `out`.
///
/// The stages run strictly in sequence over in-memory data: fetch, window,
/// aggregate, rank, report, chart. Each stage hands its output to the next
/// and never mutates it afterwards.
pub fn run(config: &AnalysisConfig, out: &mut impl Write) -> Result<()> {
    config.validate()?;
    let Some(database) = config.database.as_deref() else {
        bail!("database: no play log path given");
    };
    let window = config.resolve_window()?;

    let play_log = PlayLog::open(database)?;
    let events = play_log.fetch_events()?;
    log::info!(
        "loaded {} play events from {}",
        events.len(),
        database.display()
    );

    let in_window = window.filter(&events);
    if in_window.is_empty() {
        log::warn!("no play events inside the requested window");
    } else {
        log::info!("{} play events inside the window", in_window.len());
    }

    let totals = stats::aggregate(&in_window, config.threshold_ratio);
    let top_plays = totals.top_by_plays(config.top_n_plays);
    let top_listen = totals.top_by_listen_time(config.top_n_cumulative);
    report::write_summary(
        out,
        config.top_n_plays,
        config.top_n_cumulative,
        &top_plays,
        &top_listen,
        totals.total_listen_seconds(),
    )
    .context("failed to write summary")?;

    if let Some(dir) = &config.chart_dir {
        let discovery = stats::discovery_curve(&totals);
        let data = chart::build_chart_data(&in_window, discovery, &top_plays);
        for path in chart::render_charts(&data, dir)? {
            log::info!("wrote {}", path.display());
        }
    }
    Ok(())
}
