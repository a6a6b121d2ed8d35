//! CLI argument definitions using clap
//!
//! Commands:
//! - zmirror run --config <path> [--dry-run]
//! - zmirror check --config <path>
//! - zmirror restore --config <path> --dataset <name> [...]

use clap::{Parser, Subcommand};
use std::path::PathBuf;

/// zmirror - snapshot lifecycle and replication for hierarchical datasets
#[derive(Parser, Debug)]
#[command(name = "zmirror")]
#[command(version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Snapshot, reconcile and replicate every configured dataset
    Run {
        /// Path to configuration file
        #[arg(long, default_value = "./zmirror.json")]
        config: PathBuf,

        /// Preview every mutating action instead of running it
        #[arg(long)]
        dry_run: bool,
    },

    /// Validate configuration and probe the remote destination
    Check {
        /// Path to configuration file
        #[arg(long, default_value = "./zmirror.json")]
        config: PathBuf,
    },

    /// Restore a dataset tree from its replica
    Restore {
        /// Path to configuration file
        #[arg(long, default_value = "./zmirror.json")]
        config: PathBuf,

        /// Source dataset whose replica is restored
        #[arg(long)]
        dataset: String,

        /// Replica to restore from (default: remote only when the topology is remote)
        #[arg(long, value_parser = ["local", "remote"])]
        from: Option<String>,

        /// Snapshot name to restore; newest when omitted
        #[arg(long)]
        snapshot: Option<String>,

        /// Restore into this dataset instead of the original
        #[arg(long)]
        target: Option<String>,

        /// Overwrite existing datasets without asking
        #[arg(long)]
        yes: bool,

        /// Preview every mutating action instead of running it
        #[arg(long)]
        dry_run: bool,
    },
}

impl Cli {
    /// Parse command line arguments
    pub fn parse_args() -> Self {
        Cli::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_run_defaults() {
        let cli = Cli::try_parse_from(["zmirror", "run"]).unwrap();
        match cli.command {
            Command::Run { config, dry_run } => {
                assert_eq!(config, PathBuf::from("./zmirror.json"));
                assert!(!dry_run);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_restore_arguments() {
        let cli = Cli::try_parse_from([
            "zmirror",
            "restore",
            "--config",
            "/etc/zmirror/zmirror.json",
            "--dataset",
            "cache/appdata",
            "--from",
            "remote",
            "--yes",
        ])
        .unwrap();
        match cli.command {
            Command::Restore {
                dataset,
                from,
                snapshot,
                yes,
                ..
            } => {
                assert_eq!(dataset, "cache/appdata");
                assert_eq!(from.as_deref(), Some("remote"));
                assert!(snapshot.is_none());
                assert!(yes);
            }
            other => panic!("unexpected command {:?}", other),
        }
    }

    #[test]
    fn test_restore_rejects_unknown_source() {
        let parsed = Cli::try_parse_from([
            "zmirror",
            "restore",
            "--dataset",
            "cache/appdata",
            "--from",
            "tape",
        ]);
        assert!(parsed.is_err());
    }
}
