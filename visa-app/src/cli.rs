//! Command-line arguments.

use clap::{Parser, Subcommand};
use std::path::PathBuf;
use visa_core::{Codigo, Ndoc};

/// Look up establishments in the VISA regulated dataset.
#[derive(Debug, Parser)]
#[command(name = "visa", version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Dataset base URL (the directory that contains `data/`)
    #[arg(long, global = true, value_name = "URL")]
    pub base_url: Option<String>,

    /// Local mirror of the dataset; wins over --base-url
    #[arg(long, global = true, value_name = "DIR")]
    pub data_dir: Option<PathBuf>,

    /// Configuration file (default: the user config directory)
    #[arg(long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Fetch timeout in seconds
    #[arg(long, global = true, value_name = "SECS")]
    pub timeout: Option<u64>,

    /// More logging (-v debug, -vv trace)
    #[arg(short, long, global = true, action = clap::ArgAction::Count)]
    pub verbose: u8,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// Search the index by name, trade name, document or code
    Search {
        /// Free-text query (at least 2 characters)
        query: String,

        /// Print matches as JSON
        #[arg(long)]
        json: bool,
    },

    /// Show one establishment
    Show {
        /// Establishment code
        codigo: Codigo,

        /// List its activities
        #[arg(long, conflicts_with = "inspections")]
        activities: bool,

        /// List its inspections
        #[arg(long)]
        inspections: bool,
    },

    /// Show the memo of one inspection
    History {
        /// Inspection document number
        ndoc: Ndoc,
    },

    /// Render page fragments as JSON, keyed by element id
    Html {
        /// Query to type into the search box
        query: String,

        /// Open this establishment after searching
        #[arg(long, value_name = "CODIGO")]
        select: Option<Codigo>,

        /// Element ids present on the page (default: all)
        #[arg(long, value_delimiter = ',', value_name = "IDS")]
        hooks: Vec<String>,
    },

    /// Check an e-mail address against the page guard allow-list
    Access {
        /// Address to check
        email: String,
    },

    /// Print the effective configuration
    Config {
        /// Also write it to the user config file
        #[arg(long)]
        save: bool,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn test_cli_is_well_formed() {
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_show_with_global_flags() {
        let cli = Cli::try_parse_from(["visa", "show", "1234", "--inspections", "--data-dir", "/srv/visa", "-vv"])
            .expect("valid args");
        assert_eq!(cli.verbose, 2);
        assert_eq!(cli.data_dir, Some(PathBuf::from("/srv/visa")));
        match cli.command {
            Command::Show { codigo, activities, inspections } => {
                assert_eq!(codigo.get(), 1234);
                assert!(!activities);
                assert!(inspections);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_rejects_bad_codigo() {
        assert!(Cli::try_parse_from(["visa", "show", "0"]).is_err());
        assert!(Cli::try_parse_from(["visa", "show", "abc"]).is_err());
    }

    #[test]
    fn test_hooks_are_comma_separated() {
        let cli = Cli::try_parse_from(["visa", "html", "farma", "--hooks", "status,results"])
            .expect("valid args");
        match cli.command {
            Command::Html { hooks, select, .. } => {
                assert_eq!(hooks, vec!["status", "results"]);
                assert!(select.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }
}
