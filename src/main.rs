//! brsr-intake command line front end.
//!
//! ```text
//! brsr-intake submit --file report.pdf --file annexure.xlsx --manual sectionA=section_a.json
//! brsr-intake template principle6
//! ```

use std::path::PathBuf;
use std::sync::Arc;

use anyhow::{bail, Context};
use clap::{Parser, Subcommand};
use tokio_util::sync::CancellationToken;
use tracing::{info, warn};
use tracing_subscriber::{fmt, layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

use brsr_intake::adapters::HttpExtractionTransport;
use brsr_intake::application::{ExtractionGateway, ManualDataChannel};
use brsr_intake::config::{AppConfig, LoggingConfig};
use brsr_intake::domain::extraction::{ExtractionResult, FileBlob};
use brsr_intake::domain::foundation::{DomainError, SectionName};
use brsr_intake::domain::record::{SectionRecordStore, SectionSchema};

/// Command-line arguments for brsr-intake
#[derive(Parser, Debug)]
#[command(name = "brsr-intake", version, about = "BRSR manual data intake and extraction submission")]
struct Cli {
    #[command(subcommand)]
    command: Command,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Upload documents plus manual section data to the extraction service
    Submit {
        /// Source document to upload (repeatable, order is preserved)
        #[arg(short, long = "file", required = true)]
        files: Vec<PathBuf>,

        /// Manual data for a section as SECTION=PATH to a JSON file (repeatable)
        #[arg(short, long = "manual", value_parser = parse_manual)]
        manual: Vec<(SectionName, PathBuf)>,

        /// Override the configured timeout, in seconds
        #[arg(long)]
        timeout_secs: Option<u64>,
    },

    /// Print the fully-defaulted record of a section
    Template {
        /// Section wire key, e.g. sectionA or principle3
        section: SectionName,
    },
}

fn parse_manual(raw: &str) -> Result<(SectionName, PathBuf), String> {
    let (section, path) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected SECTION=PATH, got '{}'", raw))?;
    let section = section.parse::<SectionName>().map_err(|e| e.to_string())?;
    if path.trim().is_empty() {
        return Err(format!("missing path for section {}", section));
    }
    Ok((section, PathBuf::from(path)))
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    let config = AppConfig::load().context("Failed to load configuration")?;
    config.validate().context("Invalid configuration")?;
    init_tracing(&config.logging);

    match cli.command {
        Command::Submit {
            files,
            manual,
            timeout_secs,
        } => submit(&config, files, manual, timeout_secs).await,
        Command::Template { section } => {
            let defaults = SectionSchema::for_section(section).defaults();
            println!("{}", serde_json::to_string_pretty(defaults.as_value())?);
            Ok(())
        }
    }
}

/// Logs go to stderr so stdout carries only the extraction result.
fn init_tracing(logging: &LoggingConfig) {
    let filter = EnvFilter::try_new(logging.filter_directive()).unwrap_or_else(|_| EnvFilter::new("info"));
    let registry = tracing_subscriber::registry().with(filter);

    if logging.json {
        registry
            .with(fmt::layer().json().with_writer(std::io::stderr))
            .init();
    } else {
        registry.with(fmt::layer().with_writer(std::io::stderr)).init();
    }
}

async fn submit(
    config: &AppConfig,
    files: Vec<PathBuf>,
    manual: Vec<(SectionName, PathBuf)>,
    timeout_secs: Option<u64>,
) -> anyhow::Result<()> {
    let channel = ManualDataChannel::new();
    for (section, path) in manual {
        let text = tokio::fs::read_to_string(&path)
            .await
            .with_context(|| format!("Failed to read manual data for {} from {}", section, path.display()))?;

        let mut store = SectionRecordStore::for_section(section, None);
        channel.attach(&mut store)?;
        store
            .replace_record_json(&text)
            .map_err(DomainError::from)
            .with_context(|| format!("Invalid manual data for {} in {}", section.display_name(), path.display()))?;
        info!(section = %section, path = %path.display(), "Manual data loaded");
    }

    let mut blobs = Vec::with_capacity(files.len());
    for path in &files {
        let blob = FileBlob::from_path(path)
            .await
            .with_context(|| format!("Failed to read document {}", path.display()))?;
        blobs.push(blob);
    }

    // The HTTP client and the gateway timer share one effective timeout.
    let extraction = config
        .extraction
        .with_timeout_override(timeout_secs)
        .context("Invalid --timeout-secs")?;
    let transport = HttpExtractionTransport::from_config(&extraction)?;
    let gateway = ExtractionGateway::from_config(Arc::new(transport), &extraction);

    let cancel = CancellationToken::new();
    let interrupt = {
        let cancel = cancel.clone();
        tokio::spawn(async move {
            if tokio::signal::ctrl_c().await.is_ok() {
                warn!("Interrupt received, cancelling submission");
                cancel.cancel();
            }
        })
    };

    let result = gateway
        .submit_with_cancel(blobs, channel.snapshot(), cancel)
        .await;
    interrupt.abort();

    match result {
        ExtractionResult::Success(success) => {
            println!("{}", serde_json::to_string_pretty(&success.into_body())?);
            Ok(())
        }
        ExtractionResult::Failure(failure) => bail!("Extraction failed: {}", failure),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parse_manual_splits_section_and_path() {
        let (section, path) = parse_manual("principle6=./p6.json").unwrap();
        assert_eq!(section, SectionName::Principle6);
        assert_eq!(path, PathBuf::from("./p6.json"));
    }

    #[test]
    fn parse_manual_rejects_malformed_values() {
        assert!(parse_manual("sectionA").is_err());
        assert!(parse_manual("sectionZ=a.json").is_err());
        assert!(parse_manual("sectionA=").is_err());
    }

    #[test]
    fn cli_accepts_repeated_files_and_manual_data() {
        let cli = Cli::try_parse_from([
            "brsr-intake",
            "submit",
            "--file",
            "a.pdf",
            "--file",
            "b.xlsx",
            "--manual",
            "sectionA=a.json",
        ])
        .unwrap();

        match cli.command {
            Command::Submit { files, manual, .. } => {
                assert_eq!(files.len(), 2);
                assert_eq!(manual[0].0, SectionName::SectionA);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn submit_requires_a_file() {
        assert!(Cli::try_parse_from(["brsr-intake", "submit"]).is_err());
    }
}
