use anyhow::{Context, Result, bail};
use replay::config::{AnalysisConfig, WindowSpec, load_config};
use std::path::PathBuf;

#[derive(Debug, Default)]
struct CliArgs {
    db: Option<PathBuf>,
    config: Option<PathBuf>,
    month: Option<(i32, u8)>,
    start: Option<String>,
    end: Option<String>,
    threshold: Option<f64>,
    top_plays: Option<usize>,
    top_time: Option<usize>,
    charts: Option<PathBuf>,
}

fn main() -> Result<()> {
    env_logger::init();
    let args = parse_args(std::env::args().skip(1).collect())?;
    let config = build_config(args)?;
    replay::app::run(&config, &mut std::io::stdout().lock())
}

fn parse_args(args: Vec<String>) -> Result<CliArgs> {
    let mut out = CliArgs::default();
    let mut index = 0;
    while index < args.len() {
        match args[index].as_str() {
            "--db" => out.db = Some(PathBuf::from(take_value(&args, &mut index, "--db")?)),
            "--config" => {
                out.config = Some(PathBuf::from(take_value(&args, &mut index, "--config")?));
            }
            "--month" => {
                let raw = take_value(&args, &mut index, "--month")?;
                out.month = Some(parse_month(raw)?);
            }
            "--start" => out.start = Some(take_value(&args, &mut index, "--start")?.to_string()),
            "--end" => out.end = Some(take_value(&args, &mut index, "--end")?.to_string()),
            "--threshold" => {
                let raw = take_value(&args, &mut index, "--threshold")?;
                out.threshold = Some(
                    raw.parse()
                        .with_context(|| format!("--threshold {raw:?} is not a number"))?,
                );
            }
            "--top-plays" => {
                let raw = take_value(&args, &mut index, "--top-plays")?;
                out.top_plays = Some(
                    raw.parse()
                        .with_context(|| format!("--top-plays {raw:?} is not a count"))?,
                );
            }
            "--top-time" => {
                let raw = take_value(&args, &mut index, "--top-time")?;
                out.top_time = Some(
                    raw.parse()
                        .with_context(|| format!("--top-time {raw:?} is not a count"))?,
                );
            }
            "--charts" => {
                out.charts = Some(PathBuf::from(take_value(&args, &mut index, "--charts")?));
            }
            "-h" | "--help" => {
                print_help();
                std::process::exit(0);
            }
            other => bail!("unknown argument {other}"),
        }
        index += 1;
    }
    if out.month.is_some() && (out.start.is_some() || out.end.is_some()) {
        bail!("--month cannot be combined with --start/--end");
    }
    Ok(out)
}

fn take_value<'a>(args: &'a [String], index: &mut usize, flag: &str) -> Result<&'a str> {
    *index += 1;
    let Some(value) = args.get(*index) else {
        bail!("{flag} requires a value");
    };
    if value.trim().is_empty() {
        bail!("{flag} cannot be empty");
    }
    Ok(value.trim())
}

fn parse_month(raw: &str) -> Result<(i32, u8)> {
    let Some((year, month)) = raw.split_once('-') else {
        bail!("--month expects YYYY-MM, got {raw:?}");
    };
    let year = year
        .parse()
        .with_context(|| format!("--month year {year:?}"))?;
    let month = month
        .parse()
        .with_context(|| format!("--month month {month:?}"))?;
    Ok((year, month))
}

fn build_config(args: CliArgs) -> Result<AnalysisConfig> {
    let mut config = match &args.config {
        Some(path) => load_config(path)?,
        None => AnalysisConfig::default(),
    };
    if args.db.is_some() {
        config.database = args.db;
    }
    if let Some((year, month)) = args.month {
        config.date_window = WindowSpec::Month { year, month };
    } else if args.start.is_some() || args.end.is_some() {
        config.date_window = WindowSpec::Range {
            start: args.start,
            end: args.end,
        };
    }
    if let Some(ratio) = args.threshold {
        config.threshold_ratio = ratio;
    }
    if let Some(n) = args.top_plays {
        config.top_n_plays = n;
    }
    if let Some(n) = args.top_time {
        config.top_n_cumulative = n;
    }
    if args.charts.is_some() {
        config.chart_dir = args.charts;
    }
    Ok(config)
}

fn print_help() {
    println!("replay - listening statistics from a play log");
    println!("  --db PATH          SQLite play log (required unless set in the config file)");
    println!("  --config PATH      JSON config file");
    println!("  --month YYYY-MM    Analyze one calendar month");
    println!("  --start ISO8601    Window start, inclusive");
    println!("  --end ISO8601      Window end, inclusive");
    println!("  --threshold RATIO  Completion ratio for a counted play (default 0.8)");
    println!("  --top-plays N      Ranking size by play count (default 10)");
    println!("  --top-time N       Ranking size by listen time (default 10)");
    println!("  --charts DIR       Write PNG charts into DIR");
}
