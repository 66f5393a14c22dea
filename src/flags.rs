use std::path::PathBuf;

use clap::Parser;

/// Command-line options.
#[derive(Debug, Clone, Default, Parser)]
#[command(name = "husk", version, about = "A small job-control shell")]
pub struct Flags {
    /// Run a single command line and exit with its status
    #[arg(short = 'c', long = "command", value_name = "LINE")]
    pub command: Option<String>,

    /// Read startup settings from this file instead of ~/.huskrc
    #[arg(long, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Suppress non-essential diagnostics
    #[arg(short, long)]
    pub quiet: bool,

    /// Enable debug output
    #[arg(short, long)]
    pub debug: bool,
}

impl Flags {
    /// Default `tracing` filter directive for these flags.
    pub fn log_directive(&self) -> &'static str {
        if self.debug {
            "debug"
        } else {
            "warn"
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let flags = Flags::try_parse_from(["husk"]).expect("parse");
        assert!(flags.command.is_none());
        assert!(!flags.quiet);
        assert_eq!(flags.log_directive(), "warn");
    }

    #[test]
    fn test_command_and_debug() {
        let flags = Flags::try_parse_from(["husk", "-d", "-c", "sort > out.txt"]).expect("parse");
        assert_eq!(flags.command.as_deref(), Some("sort > out.txt"));
        assert_eq!(flags.log_directive(), "debug");
    }

    #[test]
    fn test_config_requires_value() {
        assert!(Flags::try_parse_from(["husk", "--config"]).is_err());
        let flags = Flags::try_parse_from(["husk", "--config", "/tmp/rc"]).expect("parse");
        assert_eq!(flags.config, Some(PathBuf::from("/tmp/rc")));
    }
}
