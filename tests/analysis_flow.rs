use replay::app;
use replay::config::{AnalysisConfig, WindowSpec};
use rusqlite::{Connection, params};
use std::path::{Path, PathBuf};
use tempfile::TempDir;

fn seed_log(rows: &[(&str, &str, f64, f64)]) -> (TempDir, PathBuf) {
    let dir = tempfile::tempdir().expect("tempdir");
    let path = dir.path().join("tracking.sqlite");
    let conn = Connection::open(&path).expect("open");
    conn.execute_batch(
        "CREATE TABLE songs (
             id INTEGER PRIMARY KEY,
             name TEXT NOT NULL UNIQUE,
             length REAL NOT NULL
         );
         CREATE TABLE song_plays (
             id INTEGER PRIMARY KEY AUTOINCREMENT,
             song_id INTEGER NOT NULL,
             play_time TEXT NOT NULL,
             play_length REAL NOT NULL
         );",
    )
    .expect("schema");

    for &(name, play_time, play_length, length) in rows {
        conn.execute(
            "INSERT OR IGNORE INTO songs (name, length) VALUES (?1, ?2)",
            params![name, length],
        )
        .expect("insert song");
        conn.execute(
            "INSERT INTO song_plays (song_id, play_time, play_length)
             SELECT id, ?2, ?3 FROM songs WHERE name = ?1",
            params![name, play_time, play_length],
        )
        .expect("insert play");
    }
    (dir, path)
}

fn config_for(path: &Path) -> AnalysisConfig {
    AnalysisConfig {
        database: Some(path.to_path_buf()),
        ..AnalysisConfig::default()
    }
}

fn run_to_string(config: &AnalysisConfig) -> String {
    let mut out = Vec::new();
    app::run(config, &mut out).expect("run");
    String::from_utf8(out).expect("utf8")
}

#[test]
fn month_summary_counts_and_formats() {
    let (_dir, path) = seed_log(&[
        ("Song%20A", "2025-01-03T10:00:00", 90.0, 100.0),
        ("Song%20A", "2025-01-04T11:00:00", 50.0, 100.0),
        ("Song%20A", "2025-01-05T12:00:00", 100.0, 100.0),
        ("Song%20B", "2025-01-06T13:00:00", 85.0, 100.0),
        ("Song%20A", "2025-02-01T09:00:00", 100.0, 100.0),
    ]);
    let config = AnalysisConfig {
        date_window: WindowSpec::Month {
            year: 2025,
            month: 1,
        },
        ..config_for(&path)
    };

    let text = run_to_string(&config);

    assert!(text.contains("Song A: 2 plays"));
    assert!(text.contains("Song B: 1 plays"));
    assert!(text.contains("Number of Plays Total: 3"));
    // 240s of Song A and 85s of Song B, both threshold-independent
    assert!(text.contains("Song A: 4m:0s"));
    assert!(text.contains("Song B: 1m:25s"));
    assert!(text.contains("Total Cumulative Time of All Tracks Listened To: 5m:25s"));
    // the February play stayed outside the window
    assert!(!text.contains("Song A: 3 plays"));
}

#[test]
fn unbounded_window_takes_everything() {
    let (_dir, path) = seed_log(&[
        ("One", "2024-06-01T00:00:00", 200.0, 200.0),
        ("Two", "2025-06-01T00:00:00", 200.0, 200.0),
    ]);
    let text = run_to_string(&config_for(&path));
    assert!(text.contains("One: 1 plays"));
    assert!(text.contains("Two: 1 plays"));
    assert!(text.contains("Number of Plays Total: 2"));
}

#[test]
fn empty_window_reports_zeroes() {
    let (_dir, path) = seed_log(&[("Song%20A", "2025-01-03T10:00:00", 90.0, 100.0)]);
    let charts = tempfile::tempdir().expect("tempdir");
    let config = AnalysisConfig {
        date_window: WindowSpec::Month {
            year: 2030,
            month: 6,
        },
        chart_dir: Some(charts.path().join("out")),
        ..config_for(&path)
    };

    let text = run_to_string(&config);
    assert!(text.contains("Number of Plays Total: 0"));
    assert!(text.contains("Total Cumulative Time of All Tracks Listened To: 0s"));
    assert!(!charts.path().join("out").join("plays_and_discovery.png").exists());
}

#[test]
fn empty_database_reports_zeroes() {
    let (_dir, path) = seed_log(&[]);
    let text = run_to_string(&config_for(&path));
    assert!(text.contains("Number of Plays Total: 0"));
    assert!(text.contains("Total Cumulative Time of All Tracks Listened To: 0s"));
}

#[test]
fn charts_are_written_next_to_the_summary() {
    let (_dir, path) = seed_log(&[
        ("Song%20A", "2025-01-03T10:00:00", 100.0, 100.0),
        ("Song%20A", "2025-01-04T10:00:00", 100.0, 100.0),
        ("Song%20B", "2025-01-04T11:00:00", 100.0, 100.0),
    ]);
    let charts = tempfile::tempdir().expect("tempdir");
    let chart_dir = charts.path().join("out");
    let config = AnalysisConfig {
        chart_dir: Some(chart_dir.clone()),
        ..config_for(&path)
    };

    run_to_string(&config);

    for name in [
        "plays_and_discovery.png",
        "daily_top_tracks.png",
        "cumulative_top_tracks.png",
    ] {
        let file = chart_dir.join(name);
        assert!(file.exists(), "{name} missing");
        assert!(std::fs::metadata(&file).expect("metadata").len() > 0);
    }
}

#[test]
fn offset_timestamps_work_with_naive_windows() {
    let (_dir, path) = seed_log(&[
        ("Aware", "2025-01-10T10:00:00+02:00", 100.0, 100.0),
        ("Aware", "2025-02-10T10:00:00+02:00", 100.0, 100.0),
    ]);
    let config = AnalysisConfig {
        date_window: WindowSpec::Month {
            year: 2025,
            month: 1,
        },
        ..config_for(&path)
    };
    let text = run_to_string(&config);
    assert!(text.contains("Aware: 1 plays"));
}

#[test]
fn threshold_override_changes_the_ranking() {
    let (_dir, path) = seed_log(&[
        ("Half", "2025-01-03T10:00:00", 50.0, 100.0),
        ("Half", "2025-01-04T10:00:00", 50.0, 100.0),
    ]);

    let strict = config_for(&path);
    assert!(run_to_string(&strict).contains("Number of Plays Total: 0"));

    let lenient = AnalysisConfig {
        threshold_ratio: 0.5,
        ..config_for(&path)
    };
    assert!(run_to_string(&lenient).contains("Half: 2 plays"));
}

#[test]
fn invalid_config_never_reaches_the_database() {
    let config = AnalysisConfig {
        database: Some(PathBuf::from("/definitely/not/there.sqlite")),
        top_n_plays: 0,
        ..AnalysisConfig::default()
    };
    let mut out = Vec::new();
    let err = app::run(&config, &mut out).expect_err("should fail");
    assert!(format!("{err:#}").contains("top_n_plays"));
    assert!(out.is_empty());
}

#[test]
fn inverted_window_is_a_config_error() {
    let (_dir, path) = seed_log(&[("Song", "2025-01-03T10:00:00", 90.0, 100.0)]);
    let config = AnalysisConfig {
        date_window: WindowSpec::Range {
            start: Some("2025-02-01T00:00:00".into()),
            end: Some("2025-01-01T00:00:00".into()),
        },
        ..config_for(&path)
    };
    let mut out = Vec::new();
    let err = app::run(&config, &mut out).expect_err("should fail");
    assert!(format!("{err:#}").contains("date_window"));
}
