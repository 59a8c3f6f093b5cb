//! CLI command definitions and parsing
use clap::{Parser, Subcommand};
use std::path::PathBuf;

#[derive(Parser, Debug)]
#[command(
    name = "versewise",
    version,
    about = "Scripture smart search with scope, intent and response-format classification",
    long_about = "Versewise searches a Bible corpus by meaning and by exact wording. Each query is \
                  classified for scope (testament, book group, single book), search intent \
                  (keyword, semantic, hybrid) and the answer format it calls for."
)]
pub struct Cli {
    /// Global config file path (defaults to ~/.config/versewise/config.toml)
    #[arg(short, long, global = true, value_name = "FILE")]
    pub config: Option<PathBuf>,

    /// Configuration profile to apply
    #[arg(short, long, global = true)]
    pub profile: Option<String>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Search the corpus
    Search {
        /// Search query text
        query: String,

        /// Maximum number of results to return
        #[arg(short, long)]
        limit: Option<usize>,

        /// Minimum reranked score (0.0 - 1.0)
        #[arg(short, long)]
        min_score: Option<f32>,

        /// Only return verses of this translation (e.g. "KRV")
        #[arg(long)]
        translation: Option<String>,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Show how a query is classified without searching
    Classify {
        /// Query text
        query: String,

        /// Show results in JSON format
        #[arg(long)]
        json: bool,
    },

    /// Count verses containing a keyword, honoring any scope phrase in the query
    Stats {
        /// Keyword, optionally with a scope phrase (e.g. "신약에서 사랑")
        query: String,

        /// Only count this translation
        #[arg(long)]
        translation: Option<String>,
    },

    /// Look up verses by reference
    Verse {
        /// Book name or short name (e.g. "창세기", "창", "Genesis")
        book: String,

        /// Chapter number
        chapter: u32,

        /// Verse number (whole chapter when omitted)
        verse: Option<u32>,

        /// Last verse of a range
        #[arg(long, requires = "verse")]
        to: Option<u32>,

        /// Verses of surrounding context on each side
        #[arg(short = 'n', long, requires = "verse", conflicts_with = "to")]
        context: Option<u32>,

        /// Translation (defaults to the primary one)
        #[arg(long)]
        translation: Option<String>,
    },

    /// Interactive search session with conversation memory
    Repl {
        /// Session id (a new one is generated when omitted)
        #[arg(short, long)]
        session: Option<String>,
    },

    /// Manage configuration
    Config {
        #[command(subcommand)]
        action: ConfigAction,
    },
}

#[derive(Subcommand, Debug)]
pub enum ConfigAction {
    /// Show current configuration
    Show {
        /// Show only a specific section (e.g. "search")
        #[arg(short, long)]
        section: Option<String>,
    },

    /// Validate configuration file
    Validate {
        /// Path to config file (defaults to standard location)
        #[arg(short, long)]
        file: Option<PathBuf>,
    },

    /// Initialize default configuration
    Init {
        /// Force overwrite existing config
        #[arg(short, long)]
        force: bool,
    },
}

impl Cli {
    /// Parse CLI arguments from command line
    pub fn parse_args() -> Self {
        Self::parse()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn verify_cli() {
        use clap::CommandFactory;
        Cli::command().debug_assert();
    }

    #[test]
    fn test_parse_search() {
        let cli = Cli::try_parse_from([
            "versewise",
            "search",
            "복음서에서 사랑",
            "--limit",
            "5",
            "--translation",
            "KRV",
        ])
        .unwrap();

        match cli.command {
            Commands::Search {
                query,
                limit,
                translation,
                json,
                ..
            } => {
                assert_eq!(query, "복음서에서 사랑");
                assert_eq!(limit, Some(5));
                assert_eq!(translation.as_deref(), Some("KRV"));
                assert!(!json);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[test]
    fn test_verse_context_conflicts_with_range() {
        let result = Cli::try_parse_from([
            "versewise", "verse", "창", "1", "1", "--to", "3", "--context", "2",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn test_global_profile() {
        let cli = Cli::try_parse_from(["versewise", "classify", "사랑", "--profile", "offline"])
            .unwrap();
        assert_eq!(cli.profile.as_deref(), Some("offline"));
    }
}
