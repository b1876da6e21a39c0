use crate::render::{self, OutputFormat};
use clap::{Args, Parser, Subcommand};
use org_recon::config::{self, AppConfig};
use org_recon::error::AppError;
use org_recon::reconcile::{
    self, normalize, MasterSet, MasterSetBuilder, MismatchReport, ReconcileError, SourceRole,
};
use org_recon::sources::{self, PayloadSource, CSV_ACCEPT, JSON_ACCEPT};
use org_recon::telemetry;
use std::io::{self, Write};
use tracing::info;

#[derive(Parser, Debug)]
#[command(
    name = "org-recon",
    about = "Report candidate organization names that are missing from a master set",
    version
)]
struct Cli {
    #[command(subcommand)]
    command: Option<Command>,
}

#[derive(Subcommand, Debug)]
enum Command {
    /// Compare the candidate feed against the master set (default command)
    Run(RunArgs),
    /// Print the canonical master set in sorted order
    Master(MasterArgs),
    /// Check individual names against the master set
    Lookup(LookupArgs),
    /// Print the canonical comparison key for each name
    Normalize(NormalizeArgs),
}

#[derive(Args, Debug, Default)]
struct MasterSourceArgs {
    /// Master source: an http(s) URL returning a JSON array of {"name": ...} records, or a file path
    #[arg(long)]
    master: Option<String>,
}

#[derive(Args, Debug, Default)]
struct RunArgs {
    #[command(flatten)]
    source: MasterSourceArgs,
    /// Candidate source: an http(s) URL or file path with a header row
    #[arg(long)]
    candidates: Option<String>,
    /// Field delimiter of the candidate feed (single ASCII character, `tab` allowed)
    #[arg(long, value_parser = parse_delimiter_arg)]
    delimiter: Option<u8>,
    /// Output format for the mismatch report
    #[arg(long, value_enum, default_value_t = OutputFormat::Text)]
    format: OutputFormat,
}

#[derive(Args, Debug)]
struct MasterArgs {
    #[command(flatten)]
    source: MasterSourceArgs,
    /// Only print the first N entries
    #[arg(long)]
    limit: Option<usize>,
}

#[derive(Args, Debug)]
struct LookupArgs {
    #[command(flatten)]
    source: MasterSourceArgs,
    /// Names to look up
    #[arg(required = true)]
    names: Vec<String>,
}

#[derive(Args, Debug)]
struct NormalizeArgs {
    /// Names to normalize
    #[arg(required = true)]
    names: Vec<String>,
}

pub(crate) fn run() -> Result<(), AppError> {
    let cli = Cli::parse();
    let command = cli
        .command
        .unwrap_or_else(|| Command::Run(RunArgs::default()));

    match command {
        Command::Run(args) => {
            let mut config = load_config()?;
            if let Some(master) = args.source.master {
                config.sources.master = master;
            }
            if let Some(candidates) = args.candidates {
                config.sources.candidates = candidates;
            }
            if let Some(delimiter) = args.delimiter {
                config.sources.delimiter = delimiter;
            }
            run_reconcile(&config, args.format)
        }
        Command::Master(args) => {
            let config = load_config()?;
            let set = load_master(&config, args.source)?;
            let mut out = io::stdout().lock();
            render::write_master(&mut out, &set, args.limit)?;
            out.flush()?;
            Ok(())
        }
        Command::Lookup(args) => {
            let config = load_config()?;
            let set = load_master(&config, args.source)?;
            let mut out = io::stdout().lock();
            for name in &args.names {
                render::write_lookup(&mut out, name, set.contains_raw(name))?;
            }
            out.flush()?;
            Ok(())
        }
        Command::Normalize(args) => run_normalize(args),
    }
}

fn load_config() -> Result<AppConfig, AppError> {
    let config = AppConfig::load()?;
    telemetry::init(&config.telemetry)?;
    info!(environment = ?config.environment, "configuration loaded");
    Ok(config)
}

fn parse_delimiter_arg(raw: &str) -> Result<u8, String> {
    config::parse_delimiter(raw).map_err(|err| err.to_string())
}

fn open_payload(
    raw: &str,
    role: SourceRole,
    config: &AppConfig,
) -> Result<Box<dyn PayloadSource>, ReconcileError> {
    let accept = match role {
        SourceRole::Master => JSON_ACCEPT,
        SourceRole::Candidate => CSV_ACCEPT,
    };

    sources::open_source(raw, accept, config.sources.http_timeout()).map_err(|cause| {
        ReconcileError::SourceUnavailable {
            role,
            location: raw.to_string(),
            source: cause,
        }
    })
}

fn load_master(config: &AppConfig, args: MasterSourceArgs) -> Result<MasterSet, AppError> {
    let location = args.master.unwrap_or_else(|| config.sources.master.clone());
    let source = open_payload(&location, SourceRole::Master, config)?;
    Ok(MasterSetBuilder::build(source.as_ref())?)
}

fn run_reconcile(config: &AppConfig, format: OutputFormat) -> Result<(), AppError> {
    let master = open_payload(&config.sources.master, SourceRole::Master, config)?;
    let candidates = open_payload(&config.sources.candidates, SourceRole::Candidate, config)?;
    let mut out = io::stdout().lock();

    match format {
        OutputFormat::Text => {
            let out = &mut out;
            reconcile::reconcile_sources_with::<AppError, _, _>(
                master.as_ref(),
                candidates.as_ref(),
                config.sources.delimiter,
                move |_| {
                    render::write_text_heading(&mut *out)?;
                    Ok(move |raw: String| -> Result<(), AppError> {
                        render::write_text_mismatch(&mut *out, &raw)?;
                        Ok(())
                    })
                },
            )?;
        }
        OutputFormat::Json => {
            let mut mismatches = Vec::new();
            let (set, summary) = reconcile::reconcile_sources(
                master.as_ref(),
                candidates.as_ref(),
                config.sources.delimiter,
                |raw| -> Result<(), AppError> {
                    mismatches.push(raw);
                    Ok(())
                },
            )?;

            let report = MismatchReport {
                mismatches,
                summary,
            };
            render::write_json_report(
                &mut out,
                master.location(),
                candidates.location(),
                set.len(),
                &report,
            )?;
        }
    }

    out.flush()?;
    Ok(())
}

fn run_normalize(args: NormalizeArgs) -> Result<(), AppError> {
    let mut out = io::stdout().lock();
    for name in &args.names {
        writeln!(out, "{}", normalize(name))?;
    }
    out.flush()?;
    Ok(())
}
