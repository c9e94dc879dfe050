use clap::{Parser, Subcommand, ValueEnum};
use std::path::PathBuf;

/// Returns the version string, including git hash and commit date for non-release builds.
/// Format: "0.1.0" for releases, "0.1.0@abc1234 2024-01-15 14:30" for dev builds
fn get_version() -> &'static str {
    const VERSION: &str = env!("CARGO_PKG_VERSION");
    const GIT_HASH: &str = env!("GIT_HASH");
    const GIT_COMMIT_DATE: &str = env!("GIT_COMMIT_DATE");
    const IS_RELEASE: &str = env!("IS_RELEASE");

    use std::sync::OnceLock;
    static VERSION_STRING: OnceLock<String> = OnceLock::new();

    VERSION_STRING.get_or_init(|| {
        if IS_RELEASE == "true" || GIT_HASH.is_empty() {
            VERSION.to_string()
        } else {
            format!("{}@{} {}", VERSION, GIT_HASH, GIT_COMMIT_DATE)
        }
    })
}

#[derive(Parser, Debug)]
#[command(name = "shelf", bin_name = "shelf", version = get_version())]
#[command(
    about = "Keep PDFs, EPUBs and text files on a shelf with their extracted text",
    long_about = None
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,

    /// Shelf root directory
    #[arg(long, global = true, env = "SHELF_ROOT", value_name = "PATH")]
    pub shelf: Option<PathBuf>,

    /// Directory holding config.json
    #[arg(long, global = true, env = "SHELF_CONFIG_DIR", value_name = "PATH", hide = true)]
    pub config_dir: Option<PathBuf>,

    /// Verbose output (debug diagnostics on stderr)
    #[arg(short, long, global = true)]
    pub verbose: bool,
}

#[derive(Copy, Clone, Debug, Default, PartialEq, Eq, ValueEnum)]
pub enum OutputFormat {
    #[default]
    Text,
    Json,
    Csv,
}

#[derive(Copy, Clone, Debug, PartialEq, Eq, ValueEnum)]
pub enum ConfigKey {
    ShelfRoot,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Add a document to the shelf
    #[command(display_order = 1)]
    Add {
        /// Source document (.pdf, .epub, anything else is read as text)
        path: PathBuf,

        /// Item id, also used as directory and file name
        id: String,

        /// Title
        title: String,

        /// Free-form note
        #[arg(long)]
        memo: Option<String>,
    },

    /// Show an item's metadata and extracted text
    #[command(alias = "view", display_order = 2)]
    Show { id: String },

    /// Print an item's metadata as JSON
    #[command(display_order = 3)]
    Info { id: String },

    /// Change an item's title or memo
    #[command(display_order = 4)]
    Edit {
        id: String,

        #[arg(long)]
        title: Option<String>,

        #[arg(long)]
        memo: Option<String>,
    },

    /// Delete an item and all of its files
    #[command(alias = "rm", display_order = 5)]
    Delete { id: String },

    /// List items
    #[command(alias = "ls", display_order = 6)]
    List {
        #[arg(short, long, value_enum, default_value_t = OutputFormat::Text)]
        output: OutputFormat,
    },

    /// Print the directory of an item
    #[command(display_order = 7)]
    Path { id: String },

    /// Check the shelf for leftovers and corrupt items
    #[command(display_order = 8)]
    Doctor,

    /// Show or change configuration
    #[command(display_order = 9)]
    Config {
        #[arg(value_enum)]
        key: Option<ConfigKey>,

        /// New value
        #[arg(requires = "key", conflicts_with = "unset")]
        value: Option<PathBuf>,

        /// Remove the key from the config file
        #[arg(long, requires = "key")]
        unset: bool,
    },
}
