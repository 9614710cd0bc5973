use std::io::{self, Write};

/// Render a duration as compact h/m/s text. Fractional seconds round up
/// before splitting into units; hours show only when non-zero, minutes
/// whenever hours show or minutes are non-zero, seconds always.
pub fn format_time(seconds: f64) -> String {
    let total = seconds.ceil() as u64;
    let hours = total / 3600;
    let minutes = (total % 3600) / 60;
    let secs = total % 60;

    let mut out = String::new();
    if hours > 0 {
        out.push_str(&format!("{hours}h:"));
    }
    if minutes > 0 || hours > 0 {
        out.push_str(&format!("{minutes}m:"));
    }
    out.push_str(&format!("{secs}s"));
    out
}

/// Write the console summary: the play-count ranking with its total, then the
/// listen-time ranking and the grand total. Empty rankings still print their
/// headers and zero totals.
pub fn write_summary<W: Write>(
    out: &mut W,
    requested_plays: usize,
    requested_listen: usize,
    top_plays: &[(String, u64)],
    top_listen: &[(String, f64)],
    total_listen_seconds: f64,
) -> io::Result<()> {
    writeln!(out, "Top {requested_plays} Tracks by Number of Plays:")?;
    let mut counted = 0u64;
    for (track, plays) in top_plays {
        writeln!(out, "{track}: {plays} plays")?;
        counted += plays;
    }

    writeln!(out)?;
    writeln!(out, "Number of Plays Total: {counted}")?;

    writeln!(out)?;
    writeln!(out, "Top {requested_listen} Tracks by Cumulative Play Time:")?;
    for (track, seconds) in top_listen {
        writeln!(out, "{}: {}", track, format_time(*seconds))?;
    }

    writeln!(out)?;
    writeln!(
        out,
        "Total Cumulative Time of All Tracks Listened To: {}",
        format_time(total_listen_seconds)
    )?;
    Ok(())
}
