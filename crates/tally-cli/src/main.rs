use anyhow::{Context, Result};
use clap::builder::RangedU64ValueParser;
use clap::{Parser, ValueEnum};
use std::path::PathBuf;
use std::sync::Arc;
use tokio::time::sleep;
use tracing::info;

use tally_core::app::{TallyConfig, init_logging};
use tally_core::domain::render_csv;
use tally_core::impls::{InMemoryEventSink, JsonManifestImporter};
use tally_core::ports::{ImportError, ManifestImporter};
use tally_core::{CoordinatorBuilder, ScanOutcome, ScanResult, TaskCoordinator, TaskKind};

/// Replay a scanning session against a manifest and print the reconciliation.
#[derive(Debug, Parser)]
#[command(name = "tally", version)]
struct Cli {
    /// TOML configuration file.
    #[arg(short, long, env = "TALLY_CONFIG")]
    config: Option<PathBuf>,

    /// Zone that owns the task.
    #[arg(short, long)]
    zone: String,

    #[arg(short, long, value_enum, default_value_t = KindArg::Inspection)]
    kind: KindArg,

    /// JSON manifest: a row array or `{"source": .., "rows": [..]}`.
    #[arg(short, long)]
    manifest: PathBuf,

    /// File with one scanned code per line.
    #[arg(short, long)]
    scans: Option<PathBuf>,

    /// Number of simulated devices sharing the scan stream.
    #[arg(
        short,
        long,
        default_value_t = 1,
        value_parser = RangedU64ValueParser::<usize>::new().range(1..)
    )]
    devices: usize,

    /// Print snapshots and the audit trail as JSON instead of text.
    #[arg(long)]
    json: bool,

    /// Codes to scan after those read from `--scans`.
    codes: Vec<String>,
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum KindArg {
    Inspection,
    Outbound,
}

impl From<KindArg> for TaskKind {
    fn from(kind: KindArg) -> Self {
        match kind {
            KindArg::Inspection => TaskKind::Inspection,
            KindArg::Outbound => TaskKind::Outbound,
        }
    }
}

fn read_codes(cli: &Cli) -> Result<Vec<String>> {
    let mut codes = Vec::new();
    if let Some(path) = &cli.scans {
        let content = std::fs::read_to_string(path)
            .with_context(|| format!("reading scans from {}", path.display()))?;
        codes.extend(
            content
                .lines()
                .map(str::trim)
                .filter(|l| !l.is_empty() && !l.starts_with('#'))
                .map(String::from),
        );
    }
    codes.extend(cli.codes.iter().cloned());
    Ok(codes)
}

/// One device: scans its share of the stream in order.
async fn device_loop(
    device: usize,
    coordinator: Arc<TaskCoordinator>,
    zone: String,
    codes: Vec<String>,
) -> Result<Vec<(usize, ScanResult)>> {
    let mut results = Vec::with_capacity(codes.len());
    for code in codes {
        let result = coordinator
            .record_scan(&zone, &code)
            .await
            .with_context(|| format!("device {device} scanning {code}"))?;
        results.push((device, result));
    }
    Ok(results)
}

fn print_result(device: usize, result: &ScanResult) {
    match (&result.outcome, &result.line) {
        (ScanOutcome::Matched | ScanOutcome::Overscanned, Some(line)) => println!(
            "[dev{device}] {:<14} {:<16} {} -> {}/{} ({})",
            result.code,
            line.product_code,
            result.outcome.message(),
            line.scanned_qty,
            line.target_qty,
            line.status.as_str(),
        ),
        _ => println!(
            "[dev{device}] {:<14} {}",
            result.code,
            result.outcome.message()
        ),
    }
}

#[tokio::main]
async fn main() -> Result<()> {
    let cli = Cli::parse();

    let codes = read_codes(&cli)?;

    let config = match &cli.config {
        Some(path) => TallyConfig::load(path)?,
        None => TallyConfig::default(),
    };
    init_logging(&config.log)?;

    let audit = InMemoryEventSink::new();
    let coordinator = Arc::new(
        CoordinatorBuilder::from_config(&config)
            .event_sink(audit.clone())
            .build()
            .context("building coordinator")?,
    );

    let bytes = std::fs::read(&cli.manifest)
        .map_err(|e| ImportError::Unreadable(e.to_string()))
        .with_context(|| format!("reading {}", cli.manifest.display()))?;
    let label = cli
        .manifest
        .file_name()
        .map(|n| n.to_string_lossy().into_owned())
        .unwrap_or_default();
    let manifest = JsonManifestImporter.import(&label, &bytes)?;

    let created = coordinator
        .create_task(&cli.zone, cli.kind.into(), manifest)
        .await?;
    info!(
        zone = %created.zone,
        lines = created.progress.total_lines,
        target = created.progress.total_target,
        "session started"
    );

    // Round-robin the stream so every device gets an interleaved share.
    let mut shares: Vec<Vec<String>> = vec![Vec::new(); cli.devices];
    for (i, code) in codes.into_iter().enumerate() {
        shares[i % cli.devices].push(code);
    }

    let mut workers = Vec::with_capacity(cli.devices);
    for (device, share) in shares.into_iter().enumerate() {
        workers.push(tokio::spawn(device_loop(
            device,
            Arc::clone(&coordinator),
            cli.zone.clone(),
            share,
        )));
    }

    // Poll progress the way a display would until every device is done.
    let poll = coordinator.poll_interval();
    while !workers.iter().all(|w| w.is_finished()) {
        if let Some(snapshot) = coordinator.get_task(&cli.zone).await? {
            let p = snapshot.progress;
            info!(
                completed = p.completed_lines,
                lines = p.total_lines,
                scanned = p.total_scanned,
                target = p.total_target,
                "progress"
            );
        }
        sleep(poll.min(std::time::Duration::from_millis(200))).await;
    }

    for worker in workers {
        for (device, result) in worker.await.context("device task panicked")?? {
            print_result(device, &result);
        }
    }

    let snapshot = coordinator
        .get_task(&cli.zone)
        .await?
        .context("task vanished during replay")?;
    if cli.json {
        println!("{}", serde_json::to_string_pretty(&snapshot)?);
    }

    let rows = coordinator.export_report(&cli.zone).await?;
    print!("{}", render_csv(&rows).context("rendering report")?);

    let p = snapshot.progress;
    if p.is_complete {
        coordinator.clear_task(&cli.zone).await?;
        println!("all {} lines complete, task cleared", p.total_lines);
    } else {
        println!(
            "{}/{} lines complete, {} units outstanding",
            p.completed_lines,
            p.total_lines,
            p.remaining()
        );
    }

    if cli.json {
        let zone = coordinator.zone_key(&cli.zone)?;
        let events = audit.events_for(&zone).await;
        println!("{}", serde_json::to_string_pretty(&events)?);
    }

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn cli_parses_positional_codes() {
        let cli = Cli::parse_from([
            "tally",
            "--zone",
            "anymall",
            "--kind",
            "outbound",
            "--manifest",
            "order.json",
            "--devices",
            "3",
            "1001",
            "1002",
        ]);

        assert!(matches!(cli.kind, KindArg::Outbound));
        assert_eq!(cli.devices, 3);
        assert_eq!(cli.codes, vec!["1001", "1002"]);
    }

    #[test]
    fn zero_devices_is_rejected_at_parse_time() {
        let err = Cli::try_parse_from([
            "tally",
            "--zone",
            "anymall",
            "--manifest",
            "dn.json",
            "--devices",
            "0",
        ])
        .unwrap_err();

        assert_eq!(err.kind(), clap::error::ErrorKind::ValueValidation);
    }

    #[test]
    fn scans_file_skips_blanks_and_comments() {
        let dir = std::env::temp_dir().join(format!("tally-cli-{}", std::process::id()));
        std::fs::create_dir_all(&dir).unwrap();
        let path = dir.join("scans.txt");
        std::fs::write(&path, "# morning\n1001\n\n 1002 \n").unwrap();

        let cli = Cli::parse_from([
            "tally",
            "-z",
            "anymall",
            "-m",
            "dn.json",
            "-s",
            path.to_str().unwrap(),
            "9999",
        ]);

        assert_eq!(read_codes(&cli).unwrap(), vec!["1001", "1002", "9999"]);
        std::fs::remove_dir_all(&dir).unwrap();
    }
}
