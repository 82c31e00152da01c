use anyhow::{bail, Context};
use clap::Parser;
use indicatif::{ProgressBar, ProgressStyle};
use leakscan::cli::{Cli, Commands, OutputFormatter};
use leakscan::core::{Config, Detector, ScanReport};
use leakscan::engine::{reverify, Scanner};
use leakscan::utils::RateLimiter;
use leakscan::verifier::{CurlClient, VerificationClient};
use leakscan::{detectors, DetectorKind};
use std::io::Read;
use std::path::PathBuf;
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use tracing::info;

#[tokio::main]
async fn main() {
    let cli = Cli::parse();

    let log_level = if cli.verbose { "debug" } else { "info" };
    tracing_subscriber::fmt()
        .with_env_filter(log_level)
        .with_target(false)
        .init();

    OutputFormatter::print_banner();

    // Ctrl-C aborts in-flight verification requests.
    let cancel = CancellationToken::new();
    {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                cancel.cancel();
            }
        });
    }

    if let Err(e) = execute_command(cli.command, cancel).await {
        OutputFormatter::print_error(&format!("Error: {:#}", e));
        std::process::exit(1);
    }
}

async fn execute_command(command: Commands, cancel: CancellationToken) -> anyhow::Result<()> {
    match command {
        Commands::Scan {
            inputs,
            detector,
            verify,
            output,
        } => scan_command(inputs, detector, verify, output, cancel).await,
        Commands::Test { detector, secret } => test_command(detector, secret, cancel).await,
        Commands::Reverify { file } => reverify_command(file, cancel).await,
        Commands::List => list_command(),
    }
}

async fn scan_command(
    inputs: Vec<PathBuf>,
    detector: Option<String>,
    verify: bool,
    output: Option<PathBuf>,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    if verify {
        OutputFormatter::print_ethical_warning();
    }

    let config = Config::load()?;

    let base = if config.verifier.allow_local_addresses {
        CurlClient::sane()
    } else {
        CurlClient::no_local_addresses()
    };
    let client: Arc<dyn VerificationClient> =
        Arc::new(base.with_timeout(config.verifier.timeout()));
    let limiter = Arc::new(RateLimiter::new(config.verifier.requests_per_second));

    let selected: Vec<_> = detectors::configured_detectors(client, limiter)
        .into_iter()
        .filter(|d| match &detector {
            Some(name) => d.kind().name().eq_ignore_ascii_case(name),
            None => config.detector_enabled(d.kind().name()),
        })
        .collect();
    if selected.is_empty() {
        if let Some(name) = &detector {
            bail!("unknown detector: {}", name);
        }
        bail!("all detectors are disabled in the configuration");
    }

    let scanner = Scanner::with_detectors(selected, &config.verifier)?;

    // Each input file is one chunk; stdin is a single chunk.
    let chunks: Vec<(String, Vec<u8>)> = if inputs.is_empty() {
        let mut buf = Vec::new();
        std::io::stdin().read_to_end(&mut buf)?;
        vec![("<stdin>".to_string(), buf)]
    } else {
        let mut chunks = Vec::with_capacity(inputs.len());
        for path in &inputs {
            let data = std::fs::read(path)
                .with_context(|| format!("failed to read {}", path.display()))?;
            chunks.push((path.display().to_string(), data));
        }
        chunks
    };

    let pb = ProgressBar::new(chunks.len() as u64);
    pb.set_style(
        ProgressStyle::default_bar()
            .template("[{bar:40.cyan/blue}] {pos}/{len} {msg}")
            .unwrap_or_else(|_| ProgressStyle::default_bar())
            .progress_chars("=>-"),
    );

    let mut all_results = Vec::new();
    for (name, data) in &chunks {
        pb.set_message(name.clone());
        let results = scanner.scan(data, verify, &cancel).await;
        for result in &results {
            pb.suspend(|| OutputFormatter::print_result(result));
        }
        all_results.extend(results);
        pb.inc(1);
    }
    pb.finish_and_clear();

    if cancel.is_cancelled() {
        bail!("scan cancelled");
    }

    let report = ScanReport::new(all_results);
    info!(
        total = report.total,
        verified = report.verified,
        "scan complete"
    );

    let json = serde_json::to_string_pretty(&report)?;
    match output {
        Some(path) => {
            std::fs::write(&path, json)?;
            OutputFormatter::print_success(&format!("Report saved to {}", path.display()));
        }
        None => println!("{}", json),
    }

    Ok(())
}

async fn test_command(
    detector: String,
    secret: String,
    cancel: CancellationToken,
) -> anyhow::Result<()> {
    OutputFormatter::print_ethical_warning();

    let detector = detectors::detector_by_name(&detector)
        .with_context(|| format!("unknown detector: {}", detector))?;

    if detector.verify(&secret, &cancel).await {
        OutputFormatter::print_success("Credential is ACTIVE");
    } else {
        OutputFormatter::print_info("Credential did not verify");
    }
    Ok(())
}

async fn reverify_command(file: PathBuf, cancel: CancellationToken) -> anyhow::Result<()> {
    let updated = reverify::reverify_file(&file, &cancel).await?;
    if updated {
        OutputFormatter::print_success(&format!("Updated {}", file.display()));
    } else {
        OutputFormatter::print_info("Unknown detector id; record left unmodified");
    }
    Ok(())
}

fn list_command() -> anyhow::Result<()> {
    for kind in DetectorKind::ALL {
        let Some(detector) = detectors::get_detector(*kind) else {
            continue;
        };
        let multi = detector
            .multi_part()
            .map(|m| format!(" [fields: {}]", m.fields().join(", ")))
            .unwrap_or_default();
        println!(
            "  {:>3}  {}{}",
            kind.id(),
            kind.name(),
            multi
        );
        println!("       {}", detector.description());
    }
    Ok(())
}
