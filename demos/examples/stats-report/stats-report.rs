use anyhow::{Context, Result};
use clap::Parser;
use env_logger::Target;
use log::{debug, info};
use rtc_stats::{DirectionScope, MediaType, RTCStatsType, ReportBuilder, ReportConfig, Series};
use std::{fs, fs::OpenOptions, io::Write, str::FromStr};

#[derive(Parser)]
#[command(name = "stats-report")]
#[command(author = "Rusty Rain <y@liu.mx>")]
#[command(version = "0.0.0")]
#[command(about = "Reduces a series of getStats() snapshots into a quality-of-service report.")]
struct Cli {
    /// JSON file holding the snapshots of the monitored (or sending) connection
    #[arg(short, long)]
    input: String,
    /// JSON files holding the snapshots of receiving connections; switches to a call report
    #[arg(long)]
    receiver: Vec<String>,
    /// in, out or both
    #[arg(long)]
    direction: Option<String>,
    /// Comma separated metric families to report: audio, video, candidate-pair
    #[arg(long, value_delimiter = ',')]
    media: Option<Vec<String>>,
    /// Comma separated stat categories to keep, e.g. candidate-pair,inbound-rtp
    #[arg(long, value_delimiter = ',')]
    stats: Option<Vec<String>>,
    /// Nest the classified raw dump under "stats"
    #[arg(long)]
    raw: bool,
    /// Print the per tick view of the records feeding the metrics instead of the report
    #[arg(long)]
    extract: bool,
    #[arg(long)]
    pretty: bool,
    /// JSON file with a ReportConfig; flags override it
    #[arg(long, default_value_t = format!(""))]
    config: String,
    #[arg(short, long)]
    debug: bool,
    #[arg(short, long, default_value_t = format!("INFO"))]
    log_level: String,
    #[arg(short, long, default_value_t = format!(""))]
    output_log_file: String,
}

fn main() -> Result<()> {
    let cli = Cli::parse();
    let log_level = log::LevelFilter::from_str(&cli.log_level)?;
    if cli.debug {
        env_logger::Builder::new()
            .target(if !cli.output_log_file.is_empty() {
                Target::Pipe(Box::new(
                    OpenOptions::new()
                        .create(true)
                        .write(true)
                        .truncate(true)
                        .open(&cli.output_log_file)?,
                ))
            } else {
                Target::Stderr
            })
            .format(|buf, record| {
                writeln!(
                    buf,
                    "{}:{} [{}] {} - {}",
                    record.file().unwrap_or("unknown"),
                    record.line().unwrap_or(0),
                    record.level(),
                    chrono::Local::now().format("%H:%M:%S.%6f"),
                    record.args()
                )
            })
            .filter(None, log_level)
            .init();
    }

    let config = load_config(&cli)?;
    debug!(
        "direction={} media_types={:?} allowed_stats={:?} include_raw={}",
        config.direction, config.media_types, config.allowed_stats, config.include_raw
    );
    let builder = ReportBuilder::new(config);

    let sender = read_series(&builder, &cli.input)?;
    let output = if cli.extract {
        to_json(&builder.extract(&sender), cli.pretty)?
    } else if !cli.receiver.is_empty() {
        let receivers = cli
            .receiver
            .iter()
            .map(|path| read_series(&builder, path))
            .collect::<Result<Vec<Series>>>()?;
        let call = builder.build_call(&sender, &receivers);
        if cli.pretty {
            call.to_json_pretty()?
        } else {
            call.to_json()?
        }
    } else {
        let report = builder.build(&sender);
        for (name, err) in report.errors() {
            info!("{name} unavailable: {err}");
        }
        if cli.pretty {
            report.to_json_pretty()?
        } else {
            report.to_json()?
        }
    };

    println!("{output}");
    Ok(())
}

fn load_config(cli: &Cli) -> Result<ReportConfig> {
    let mut config = if cli.config.is_empty() {
        ReportConfig::default()
    } else {
        let json = fs::read_to_string(&cli.config)
            .with_context(|| format!("reading config {}", cli.config))?;
        serde_json::from_str(&json).with_context(|| format!("parsing config {}", cli.config))?
    };

    if let Some(direction) = &cli.direction {
        config = config.with_direction(DirectionScope::from_str(direction)?);
    }
    if let Some(media) = &cli.media {
        config = config.with_media_types(
            media
                .iter()
                .map(|m| MediaType::from_str(m.trim()))
                .collect::<rtc_stats::Result<Vec<_>>>()?,
        );
    }
    if let Some(stats) = &cli.stats {
        config = config.with_allowed_stats(
            stats
                .iter()
                .map(|s| RTCStatsType::from(s.trim()))
                .collect(),
        );
    }
    if cli.raw {
        config = config.with_include_raw(true);
    }
    Ok(config)
}

fn read_series(builder: &ReportBuilder, path: &str) -> Result<Series> {
    let json = fs::read_to_string(path).with_context(|| format!("reading {path}"))?;
    let series = builder
        .parse_json(&json)
        .with_context(|| format!("parsing {path}"))?;
    info!("{path}: {} snapshot(s)", series.len());
    Ok(series)
}

fn to_json<T: serde::Serialize>(value: &T, pretty: bool) -> Result<String> {
    Ok(if pretty {
        serde_json::to_string_pretty(value)?
    } else {
        serde_json::to_string(value)?
    })
}
