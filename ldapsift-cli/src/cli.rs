//! CLI argument parsing using clap derive API
//!
//! This module defines the command-line interface structure using clap's derive macros.
//! It is purely declarative with no side effects or I/O.

use std::path::PathBuf;

use clap::{Parser, ValueEnum};

use ldapsift_engine::OutputFormat;

/// ldapsift -- correlate directory server access logs into structured events.
///
/// Reads an access log, pairs operation requests with their responses per
/// connection, and writes one structured event per completed operation to
/// standard output.
#[derive(Parser, Debug)]
#[command(name = "ldapsift", version, about, long_about = None)]
pub struct Cli {
    /// Keep watching the file and correlate new events as they are appended.
    #[arg(short = 'f', long)]
    pub follow: bool,

    /// Output format for correlated events.
    #[arg(long, value_enum, default_value_t = Format::Json)]
    pub format: Format,

    /// Log level for diagnostics on stderr (trace, debug, info, warn, error).
    #[arg(long, default_value = "warn")]
    pub log_level: String,

    /// Polling interval in milliseconds when following a file.
    #[arg(long, default_value_t = 250)]
    pub poll_interval_ms: u64,

    /// Access log files to process. Only the first file is read; extra
    /// files are reported and ignored.
    #[arg(required = true)]
    pub files: Vec<PathBuf>,
}

/// Supported output formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Format {
    /// One JSON object per line.
    Json,
    /// Indented XML records.
    Xml,
}

impl From<Format> for OutputFormat {
    fn from(format: Format) -> Self {
        match format {
            Format::Json => OutputFormat::Json,
            Format::Xml => OutputFormat::Xml,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_parse_single_file() {
        let args = Cli::try_parse_from(["ldapsift", "/var/log/dirsrv/access"]);
        assert!(args.is_ok(), "should parse single file argument");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.files, vec![PathBuf::from("/var/log/dirsrv/access")]);
        assert!(!cli.follow, "follow should default to false");
        assert_eq!(cli.format, Format::Json, "format should default to json");
    }

    #[test]
    fn test_cli_parse_multiple_files() {
        let args = Cli::try_parse_from(["ldapsift", "access.1", "access.2"]);
        assert!(args.is_ok(), "should parse multiple files");
        let cli = args.expect("parse succeeded");
        assert_eq!(cli.files.len(), 2);
    }

    #[test]
    fn test_cli_parse_follow_short() {
        let args = Cli::try_parse_from(["ldapsift", "-f", "access"]);
        assert!(args.is_ok(), "should parse -f flag");
        assert!(args.expect("parse succeeded").follow);
    }

    #[test]
    fn test_cli_parse_follow_long() {
        let args = Cli::try_parse_from(["ldapsift", "--follow", "access"]);
        assert!(args.is_ok(), "should parse --follow flag");
        assert!(args.expect("parse succeeded").follow);
    }

    #[test]
    fn test_cli_parse_format_xml() {
        let args = Cli::try_parse_from(["ldapsift", "--format", "xml", "access"]);
        assert!(args.is_ok(), "should parse --format xml");
        assert_eq!(args.expect("parse succeeded").format, Format::Xml);
    }

    #[test]
    fn test_cli_parse_format_json() {
        let args = Cli::try_parse_from(["ldapsift", "--format", "json", "access"]);
        assert!(args.is_ok(), "should parse --format json");
        assert_eq!(args.expect("parse succeeded").format, Format::Json);
    }

    #[test]
    fn test_cli_parse_invalid_format_fails() {
        let args = Cli::try_parse_from(["ldapsift", "--format", "yaml", "access"]);
        assert!(args.is_err(), "should reject unknown format");
    }

    #[test]
    fn test_cli_parse_log_level() {
        let args = Cli::try_parse_from(["ldapsift", "--log-level", "debug", "access"]);
        assert!(args.is_ok(), "should parse custom log level");
        assert_eq!(args.expect("parse succeeded").log_level, "debug");
    }

    #[test]
    fn test_cli_parse_poll_interval() {
        let args = Cli::try_parse_from(["ldapsift", "--poll-interval-ms", "500", "access"]);
        assert!(args.is_ok(), "should parse custom poll interval");
        assert_eq!(args.expect("parse succeeded").poll_interval_ms, 500);
    }

    #[test]
    fn test_cli_parse_no_files_fails() {
        let args = Cli::try_parse_from(["ldapsift"]);
        assert!(args.is_err(), "should fail when no log file is provided");
    }

    #[test]
    fn test_format_converts_to_engine_format() {
        assert_eq!(OutputFormat::from(Format::Json), OutputFormat::Json);
        assert_eq!(OutputFormat::from(Format::Xml), OutputFormat::Xml);
    }

    #[test]
    fn test_cli_verify_command_structure() {
        let cmd = Cli::command();
        assert_eq!(cmd.get_name(), "ldapsift");
        assert!(
            cmd.get_arguments().any(|a| a.get_id() == "follow"),
            "should have 'follow' argument"
        );
        assert!(
            cmd.get_arguments().any(|a| a.get_id() == "format"),
            "should have 'format' argument"
        );
    }
}
