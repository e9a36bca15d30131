use std::path::PathBuf;

use clap::{Parser, Subcommand};

#[derive(Debug, Parser)]
#[command(name = "chanvault", version, about = "Store files in a chat channel", long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Configuration file (default: platform config directory)
    #[arg(long, global = true)]
    pub config: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List stored files
    #[command(visible_alias = "l")]
    List,

    /// Upload a file, or a directory as a zip archive
    #[command(visible_alias = "u")]
    Upload {
        /// File or directory to upload
        path: PathBuf,
    },

    /// Download files by id (`N` or `#N`)
    #[command(visible_alias = "d")]
    Download {
        /// File ids as shown by `list`
        #[arg(required = true)]
        ids: Vec<String>,

        /// Output directory (default: configured download directory)
        #[arg(short, long)]
        output: Option<PathBuf>,
    },

    /// Delete a file by id
    #[command(visible_alias = "del")]
    Delete {
        /// File id as shown by `list`
        id: String,
    },

    /// Find files whose name contains the search text
    #[command(visible_alias = "f")]
    Find {
        /// Search words, joined with spaces
        #[arg(required = true)]
        terms: Vec<String>,
    },

    /// Store the bot token and channel id in the configuration file
    Init {
        #[arg(long)]
        token: String,

        #[arg(long)]
        channel_id: String,
    },
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::error::ErrorKind;

    fn parse(args: &[&str]) -> Result<Cli, clap::Error> {
        Cli::try_parse_from(std::iter::once("chanvault").chain(args.iter().copied()))
    }

    #[test]
    fn aliases() {
        assert!(matches!(parse(&["l"]).unwrap().command, Command::List));
        assert!(matches!(parse(&["u", "a.txt"]).unwrap().command, Command::Upload { .. }));
        assert!(matches!(parse(&["del", "#2"]).unwrap().command, Command::Delete { .. }));
    }

    #[test]
    fn download_takes_many_ids() {
        match parse(&["d", "1", "#3", "-o", "/tmp/out"]).unwrap().command {
            Command::Download { ids, output } => {
                assert_eq!(ids, ["1", "#3"]);
                assert_eq!(output, Some(PathBuf::from("/tmp/out")));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn find_keeps_every_word() {
        match parse(&["f", "annual", "report"]).unwrap().command {
            Command::Find { terms } => assert_eq!(terms.join(" "), "annual report"),
            other => panic!("unexpected: {other:?}"),
        }
    }

    #[test]
    fn missing_arguments_are_usage_errors() {
        let cases: [&[&str]; 5] = [&["download"], &["find"], &["upload"], &["delete"], &["init"]];
        for args in cases {
            let err = parse(args).unwrap_err();
            assert_eq!(err.kind(), ErrorKind::MissingRequiredArgument, "{args:?}");
            assert_eq!(err.exit_code(), 2);
        }
    }

    #[test]
    fn global_flags_after_subcommand() {
        let cli = parse(&["list", "--verbose", "--config", "/tmp/c.toml"]).unwrap();
        assert!(cli.verbose);
        assert_eq!(cli.config, Some(PathBuf::from("/tmp/c.toml")));
    }

    #[test]
    fn init_requires_both_credentials() {
        match parse(&["init", "--token", "t", "--channel-id", "9"]).unwrap().command {
            Command::Init { token, channel_id } => {
                assert_eq!((token.as_str(), channel_id.as_str()), ("t", "9"));
            }
            other => panic!("unexpected: {other:?}"),
        }
    }
}
