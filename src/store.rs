use crate::model::{PlayEvent, PlayTime};
use anyhow::{Context, Result, bail};
use rusqlite::{Connection, OpenFlags};
use std::path::Path;

const PLAYS_QUERY: &str = "SELECT songs.name, song_plays.play_time, song_plays.play_length, songs.length \
     FROM song_plays JOIN songs ON song_plays.song_id = songs.id \
     ORDER BY song_plays.play_time";

/// Read-only handle on the tracking database.
pub struct PlayLog {
    conn: Connection,
}

impl PlayLog {
    pub fn open(path: &Path) -> Result<Self> {
        let conn = Connection::open_with_flags(
            path,
            OpenFlags::SQLITE_OPEN_READ_ONLY | OpenFlags::SQLITE_OPEN_NO_MUTEX,
        )
        .with_context(|| format!("failed to open play log {}", path.display()))?;
        Ok(Self { conn })
    }

    /// Every play event in ascending play-time order, names decoded and
    /// timestamps parsed. A row that fails to decode aborts the fetch with
    /// context naming the record.
    pub fn fetch_events(&self) -> Result<Vec<PlayEvent>> {
        let mut stmt = self
            .conn
            .prepare(PLAYS_QUERY)
            .context("failed to prepare play query")?;
        let rows = stmt.query_map([], |row| {
            Ok((
                row.get::<_, String>(0)?,
                row.get::<_, String>(1)?,
                row.get::<_, f64>(2)?,
                row.get::<_, f64>(3)?,
            ))
        })?;

        let mut events = Vec::new();
        for row in rows {
            let (raw_name, raw_time, played_seconds, track_seconds) = row?;
            events.push(decode_event(
                &raw_name,
                &raw_time,
                played_seconds,
                track_seconds,
            )?);
        }
        log::debug!("fetched {} play events", events.len());
        Ok(events)
    }
}

/// Percent-decode a stored track name into canonical text.
pub fn decode_track_name(raw: &str) -> Result<String> {
    let decoded = urlencoding::decode(raw)
        .with_context(|| format!("undecodable track name {raw:?}"))?;
    Ok(decoded.into_owned())
}

fn decode_event(
    raw_name: &str,
    raw_time: &str,
    played_seconds: f64,
    track_seconds: f64,
) -> Result<PlayEvent> {
    let track = decode_track_name(raw_name)?;
    let at =
        PlayTime::parse(raw_time).with_context(|| format!("bad play time for {track:?}"))?;
    if played_seconds < 0.0 {
        bail!("negative play length {played_seconds} for {track:?}");
    }
    if track_seconds <= 0.0 {
        bail!("non-positive track length {track_seconds} for {track:?}");
    }
    Ok(PlayEvent {
        track,
        at,
        played_seconds,
        track_seconds,
    })
}
