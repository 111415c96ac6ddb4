use clap::{Args, Parser, Subcommand};

use crate::metadata::{PKG_DESCRIPTION, PKG_NAME, PKG_VERSION};
use crate::types::RecipeId;

pub const DEFAULT_API_URL: &str = "http://localhost:5000";
pub const DEFAULT_TIMEOUT_SECS: u64 = 30;

#[derive(Parser, Debug, Clone)]
#[command(name = PKG_NAME)]
#[command(version = PKG_VERSION)]
#[command(about = PKG_DESCRIPTION, long_about = None)]
pub struct Cli {
    #[command(flatten)]
    pub settings: ClientSettings,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Subcommand, Debug, Clone)]
pub enum Command {
    /// Show the current session after checking it with the server
    Status,
    /// Check that the recipe service is reachable
    Health,
    /// Log in and load your recipes
    Login {
        username: String,
        /// Prompted for when omitted
        #[arg(long, env = "CULINARY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// Create an account
    Register {
        username: String,
        email: String,
        /// Prompted for when omitted
        #[arg(long, env = "CULINARY_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },
    /// End the session on the server and forget it locally
    Logout,
    /// Generate recipes from ingredients (comma separated or repeated)
    Generate {
        #[arg(value_delimiter = ',')]
        ingredients: Vec<String>,
    },
    /// List your saved recipes
    List(ListArguments),
    /// Show one recipe in full
    Show { id: RecipeId },
    /// Delete a recipe
    Delete {
        id: RecipeId,
        /// Skip the confirmation prompt
        #[arg(long, short = 'y', default_value_t = false)]
        yes: bool,
    },
    /// Print version information
    Version,
}

#[derive(Args, Debug, Clone, Default)]
pub struct ListArguments {
    /// Exact difficulty, e.g. Easy, Medium or Hard
    #[arg(long)]
    pub difficulty: Option<String>,

    /// Text contained in the cooking time, e.g. "30"
    #[arg(long)]
    pub time: Option<String>,

    /// Only recipes that take at most this many minutes
    #[arg(long)]
    pub max_minutes: Option<u32>,

    /// Text contained in the title or an ingredient
    #[arg(long, short = 's')]
    pub search: Option<String>,
}

#[derive(Args, Debug, Clone)]
pub struct ClientSettings {
    /// Base URL of the recipe service
    #[arg(long, global = true, env = "CULINARY_API_URL", default_value = DEFAULT_API_URL)]
    pub api_url: String,

    /// Directory holding the local session file
    #[arg(long, global = true, env = "CULINARY_DATA_DIR")]
    pub data_dir: Option<String>,

    /// Request timeout in seconds
    #[arg(long, global = true, env = "CULINARY_TIMEOUT_SECS", default_value_t = DEFAULT_TIMEOUT_SECS)]
    pub timeout_secs: u64,

    /// Log filter used when RUST_LOG is unset
    #[arg(long, global = true, env = "CULINARY_LOG", default_value = "warn")]
    pub log_level: String,
}

impl ClientSettings {
    pub fn default_settings() -> Self {
        Self {
            api_url: DEFAULT_API_URL.to_string(),
            data_dir: None,
            timeout_secs: DEFAULT_TIMEOUT_SECS,
            log_level: "warn".to_string(),
        }
    }

    /// Validate CLI/environment-derived settings.
    pub fn validate(&self) -> Result<(), String> {
        let url = self.api_url.trim();
        if url.is_empty() {
            return Err("CULINARY_API_URL cannot be empty".to_string());
        }
        if let Some((scheme, rest)) = url.split_once("://") {
            if scheme != "http" && scheme != "https" {
                return Err(format!("Invalid CULINARY_API_URL '{url}': unsupported scheme"));
            }
            if rest.is_empty() {
                return Err(format!("Invalid CULINARY_API_URL '{url}': missing host"));
            }
        }
        if self.timeout_secs == 0 {
            return Err("CULINARY_TIMEOUT_SECS must be greater than zero".to_string());
        }
        if self.data_dir.as_deref().is_some_and(|d| d.trim().is_empty()) {
            return Err("CULINARY_DATA_DIR cannot be empty".to_string());
        }
        Ok(())
    }
}
