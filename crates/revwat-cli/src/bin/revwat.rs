//! CLI entrypoint for the `revwat` watermarking tool.

use std::path::PathBuf;
use std::process::ExitCode;

use clap::{Parser, Subcommand};
use revwat_cli::structured_log::{LogEmitter, LogLevel, Operation, Outcome};
use revwat_cli::{BatchDriver, DriverError, EmbedRequest, ExtractRequest, RemoveRequest};
use revwat_ledger::Ledger;

/// Reversible watermarking codec and audit ledger.
#[derive(Debug, Parser)]
#[command(name = "revwat")]
#[command(about = "Reversible image watermarking with a hash-chained audit ledger")]
struct Cli {
    #[command(subcommand)]
    command: Command,
    /// JSONL structured log output path (stderr narration always prints regardless).
    #[arg(long, global = true)]
    log: Option<PathBuf>,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Embed a watermark into every image in a directory.
    Embed {
        /// TOML config file matching the embed request fields.
        #[arg(long)]
        config: PathBuf,
    },
    /// Reverse a previous embed for every image in a directory, using the ledger to recover parameters.
    Remove {
        /// TOML config file matching the remove request fields.
        #[arg(long)]
        config: PathBuf,
    },
    /// Forensically extract watermark bits from images without a ledger lookup.
    Extract {
        /// TOML config file matching the extract request fields.
        #[arg(long)]
        config: PathBuf,
    },
    /// Load and verify the hash chain of a ledger file.
    VerifyLedger {
        /// Path to the ledger JSON file.
        #[arg(long)]
        blockchain_path: PathBuf,
    },
}

fn main() -> ExitCode {
    let cli = Cli::parse();
    let mut log = match &cli.log {
        Some(path) => match LogEmitter::to_file(path, "revwat") {
            Ok(emitter) => emitter,
            Err(e) => {
                eprintln!("failed to open log file {}: {e}", path.display());
                return ExitCode::from(4);
            }
        },
        None => LogEmitter::to_buffer("revwat"),
    };

    let exit_code = match cli.command {
        Command::Embed { config } => run_embed(&config, &mut log),
        Command::Remove { config } => run_remove(&config, &mut log),
        Command::Extract { config } => run_extract(&config, &mut log),
        Command::VerifyLedger { blockchain_path } => run_verify_ledger(&blockchain_path, &mut log),
    };

    let _ = log.flush();
    ExitCode::from(exit_code)
}

fn load_config<T: serde::de::DeserializeOwned>(path: &PathBuf) -> Result<T, u8> {
    let raw = match std::fs::read_to_string(path) {
        Ok(raw) => raw,
        Err(e) => {
            eprintln!("failed to read config {}: {e}", path.display());
            return Err(4);
        }
    };
    toml::from_str(&raw).map_err(|e| {
        eprintln!("invalid config {}: {e}", path.display());
        2
    })
}

fn run_embed(config_path: &PathBuf, log: &mut LogEmitter) -> u8 {
    let request: EmbedRequest = match load_config(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let _ = log.emit_entry(
        revwat_cli::structured_log::LogEntry::new("", LogLevel::Info, "batch_start").with_operation(Operation::Embed),
    );
    match BatchDriver::new().run_embed_batch(&request) {
        Ok(response) => {
            print_response(&response);
            let _ = log.emit_entry(
                revwat_cli::structured_log::LogEntry::new("", LogLevel::Info, "batch_end")
                    .with_operation(Operation::Embed)
                    .with_outcome(if response.processed_images > 0 { Outcome::Pass } else { Outcome::Fail }),
            );
            exit_code_for_response(&response)
        }
        Err(err) => report_driver_error(log, Operation::Embed, &err),
    }
}

fn run_remove(config_path: &PathBuf, log: &mut LogEmitter) -> u8 {
    let request: RemoveRequest = match load_config(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let _ = log.emit_entry(
        revwat_cli::structured_log::LogEntry::new("", LogLevel::Info, "batch_start").with_operation(Operation::Remove),
    );
    match BatchDriver::new().run_remove_batch(&request) {
        Ok(response) => {
            print_response(&response);
            exit_code_for_response(&response)
        }
        Err(err) => report_driver_error(log, Operation::Remove, &err),
    }
}

fn run_extract(config_path: &PathBuf, log: &mut LogEmitter) -> u8 {
    let request: ExtractRequest = match load_config(config_path) {
        Ok(r) => r,
        Err(code) => return code,
    };
    let _ = log.emit_entry(
        revwat_cli::structured_log::LogEntry::new("", LogLevel::Info, "batch_start").with_operation(Operation::Extract),
    );
    match BatchDriver::new().run_extract_batch(&request) {
        Ok(response) => {
            print_response(&response);
            exit_code_for_response(&response)
        }
        Err(err) => report_driver_error(log, Operation::Extract, &err),
    }
}

fn run_verify_ledger(blockchain_path: &PathBuf, log: &mut LogEmitter) -> u8 {
    match Ledger::load(blockchain_path) {
        Ok(ledger) => {
            println!("{{\"block_count\": {}}}", ledger.blocks().len());
            let _ = log.emit_entry(
                revwat_cli::structured_log::LogEntry::new("", LogLevel::Info, "ledger_verified")
                    .with_operation(Operation::VerifyLedger)
                    .with_outcome(Outcome::Pass),
            );
            0
        }
        Err(err) => {
            eprintln!("ledger verification failed: {err}");
            let _ = log.emit_entry(
                revwat_cli::structured_log::LogEntry::new("", LogLevel::Error, "ledger_verification_failed")
                    .with_operation(Operation::VerifyLedger)
                    .with_outcome(Outcome::Fail)
                    .with_details(serde_json::json!({ "error": err.to_string() })),
            );
            exit_code_for_ledger_error(&err)
        }
    }
}

fn print_response(response: &revwat_cli::BatchResponse) {
    match serde_json::to_string_pretty(response) {
        Ok(json) => println!("{json}"),
        Err(e) => eprintln!("failed to serialize batch response: {e}"),
    }
}

fn exit_code_for_response(response: &revwat_cli::BatchResponse) -> u8 {
    if response.total_images > 0 && response.processed_images == 0 { 5 } else { 0 }
}

fn report_driver_error(log: &mut LogEmitter, operation: Operation, err: &DriverError) -> u8 {
    eprintln!("{operation:?} failed: {err}");
    let code = match err {
        DriverError::ConfigInvalid(_) => 2,
        DriverError::BatchEmpty => 5,
        DriverError::Ledger(ledger_err) => exit_code_for_ledger_error(ledger_err),
        DriverError::Io(_) => 4,
    };
    let _ = log.emit_entry(
        revwat_cli::structured_log::LogEntry::new("", LogLevel::Error, "batch_failed")
            .with_operation(operation)
            .with_outcome(Outcome::Fail)
            .with_exit_code(i32::from(code))
            .with_details(serde_json::json!({ "error": err.to_string() })),
    );
    code
}

fn exit_code_for_ledger_error(err: &revwat_ledger::LedgerError) -> u8 {
    use revwat_ledger::LedgerError;
    match err {
        LedgerError::ChainCorrupted { .. } | LedgerError::ConcurrentLedger => 3,
        LedgerError::Io(_) | LedgerError::Json(_) => 4,
    }
}
