// CLI definitions using clap

use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser)]
#[command(name = "virjoy")]
#[command(author, version, about = "Touchscreen cockpit bridge for flight simulators")]
#[command(propagate_version = true)]
pub struct Cli {
    /// Config file path (default: ~/.config/virjoy/virjoy.toml)
    #[arg(short, long, global = true)]
    pub config: Option<PathBuf>,

    /// Log level (error, warn, info, debug, trace)
    #[arg(long, global = true, default_value = "info")]
    pub log_level: String,

    /// HTTP port, overriding the config file
    #[arg(short, long, global = true)]
    pub port: Option<u16>,

    /// Log actuation and variable writes instead of touching devices
    #[arg(long, global = true)]
    pub dry_run: bool,

    #[command(subcommand)]
    pub command: Option<Commands>,
}

#[derive(Subcommand)]
pub enum Commands {
    /// Run the HTTP server (default)
    Serve,

    /// List aircraft profiles, or print one as JSON
    #[command(visible_alias = "p")]
    Profiles {
        /// Profile id
        id: Option<String>,
    },

    /// Read mapped simulator variables once
    #[command(visible_alias = "v")]
    Vars {
        /// Profile id (default: every profile with its own table, plus the default)
        #[arg(long)]
        profile: Option<String>,
    },

    /// Decode a captured head-track packet given as hex
    Decode {
        /// Packet bytes, e.g. "78 56 34 12 ..."
        hex: String,
    },

    /// Print the effective configuration as TOML
    Config {
        /// Also write it to the config file path
        #[arg(long)]
        write: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_consistent() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_default_is_serve() {
        let cli = Cli::parse_from(["virjoy", "--dry-run", "--port", "5050"]);
        assert!(cli.command.is_none());
        assert!(cli.dry_run);
        assert_eq!(cli.port, Some(5050));
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "virjoy",
            "vars",
            "--profile",
            "fenix_a320",
            "--log-level",
            "debug",
        ]);
        match cli.command {
            Some(Commands::Vars { profile }) => assert_eq!(profile.as_deref(), Some("fenix_a320")),
            _ => panic!("expected vars"),
        }
        assert_eq!(cli.log_level, "debug");
    }
}
