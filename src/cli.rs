//! Command-line interface definitions for Orbital News.
//!
//! Global options can be provided via command-line flags or environment variables.

use clap::{Parser, Subcommand};

/// Command-line arguments for the Orbital News application.
///
/// # Examples
///
/// ```sh
/// # Print today's French headlines, translated into English
/// orbital_news --feeds data/feeds.json news -c FR --translate
///
/// # Write several countries to a JSON directory
/// orbital_news news -c DE -c US -j ./json
///
/// # Check a feed before adding it to the registry
/// orbital_news test-feed --url https://www.lemonde.fr/rss/une.xml
/// orbital_news feeds set -c FR https://www.lemonde.fr/rss/une.xml
/// ```
#[derive(Parser, Debug)]
#[command(author, version, about)]
pub struct Cli {
    /// Optional path to a config.yaml file
    #[arg(short = 'C', long, global = true)]
    pub config: Option<String>,

    /// Path to the country to feed-URL registry
    #[arg(long, global = true, env = "FEEDS_FILE", default_value = "data/feeds.json")]
    pub feeds: String,

    /// DeepL API key, required for translation
    #[arg(long, global = true, env = "DEEPL_API_KEY", hide_env_values = true)]
    pub deepl_api_key: Option<String>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug)]
pub enum Command {
    /// Aggregate news for one or more countries
    News {
        /// ISO 3166-1 alpha-2 country code (repeatable)
        #[arg(short, long = "country", required = true, value_parser = parse_country)]
        countries: Vec<String>,

        /// Translate titles and descriptions into English
        #[arg(short, long)]
        translate: bool,

        /// Output directory for JSON files; prints to stdout when omitted
        #[arg(short, long)]
        json_output_dir: Option<String>,
    },

    /// Fetch and parse a single feed URL and report what it publishes
    TestFeed {
        #[arg(short, long)]
        url: String,
    },

    /// List the countries configured in the feed registry
    Countries,

    /// Show the translation provider's character usage
    Usage,

    /// Edit the feed registry file
    Feeds {
        #[command(subcommand)]
        action: FeedsCommand,
    },
}

#[derive(Subcommand, Debug)]
pub enum FeedsCommand {
    /// Replace the feeds of one country
    Set {
        #[arg(short, long, value_parser = parse_country)]
        country: String,

        /// Feed URLs (at least one)
        #[arg(required = true)]
        urls: Vec<String>,
    },

    /// Delete every feed of one country
    Remove {
        #[arg(short, long, value_parser = parse_country)]
        country: String,
    },

    /// Merge a JSON backup into the registry, skipping invalid entries
    Import {
        /// File with `[{"country": "..", "feeds": [..]}]` entries
        file: String,
    },

    /// Write the whole registry as JSON to stdout or a file
    Export {
        #[arg(short, long)]
        output: Option<String>,
    },
}

fn parse_country(raw: &str) -> Result<String, String> {
    let code = raw.trim().to_ascii_uppercase();
    if code.len() == 2 && code.chars().all(|c| c.is_ascii_alphabetic()) {
        Ok(code)
    } else {
        Err(format!("'{raw}' is not a two-letter country code"))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_news_parsing() {
        let cli = Cli::parse_from([
            "orbital_news",
            "--feeds",
            "/tmp/feeds.json",
            "news",
            "--country",
            "fr",
            "-c",
            "US",
            "--translate",
        ]);

        assert_eq!(cli.feeds, "/tmp/feeds.json");
        match cli.command {
            Command::News {
                countries,
                translate,
                json_output_dir,
            } => {
                assert_eq!(countries, vec!["FR", "US"]);
                assert!(translate);
                assert!(json_output_dir.is_none());
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_global_flags_after_subcommand() {
        let cli = Cli::parse_from([
            "orbital_news",
            "news",
            "-c",
            "DE",
            "-j",
            "/tmp/json",
            "--config",
            "/etc/orbital.yaml",
        ]);

        assert_eq!(cli.config.as_deref(), Some("/etc/orbital.yaml"));
        assert!(matches!(
            cli.command,
            Command::News { json_output_dir: Some(ref dir), .. } if dir == "/tmp/json"
        ));
    }

    #[test]
    fn test_invalid_country_is_rejected() {
        let result = Cli::try_parse_from(["orbital_news", "news", "-c", "France"]);
        assert!(result.is_err());
    }

    #[test]
    fn test_news_requires_a_country() {
        assert!(Cli::try_parse_from(["orbital_news", "news"]).is_err());
    }

    #[test]
    fn test_feeds_set_parsing() {
        let cli = Cli::parse_from([
            "orbital_news",
            "feeds",
            "set",
            "-c",
            "jp",
            "https://a.example/rss",
            "https://b.example/rss",
        ]);
        match cli.command {
            Command::Feeds {
                action: FeedsCommand::Set { country, urls },
            } => {
                assert_eq!(country, "JP");
                assert_eq!(urls.len(), 2);
            }
            other => panic!("unexpected command {other:?}"),
        }
    }

    #[test]
    fn test_feeds_set_requires_urls() {
        assert!(Cli::try_parse_from(["orbital_news", "feeds", "set", "-c", "JP"]).is_err());
    }

    #[test]
    fn test_feeds_import_and_export_parsing() {
        let cli = Cli::parse_from(["orbital_news", "feeds", "import", "backup.json"]);
        assert!(matches!(
            cli.command,
            Command::Feeds { action: FeedsCommand::Import { ref file } } if file == "backup.json"
        ));

        let cli = Cli::parse_from(["orbital_news", "feeds", "export"]);
        assert!(matches!(
            cli.command,
            Command::Feeds { action: FeedsCommand::Export { output: None } }
        ));
    }

    #[test]
    fn test_test_feed_parsing() {
        let cli = Cli::parse_from(["orbital_news", "test-feed", "--url", "https://a.example/rss"]);
        assert!(matches!(cli.command, Command::TestFeed { ref url } if url == "https://a.example/rss"));
    }
}
