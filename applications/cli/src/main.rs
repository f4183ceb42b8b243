/// ibcast - build iBroadcast playlists from folders and album names
use clap::{Args, Parser, Subcommand};
use ibcast_client::{IbcastClient, Session};
use std::io::IsTerminal;
use std::path::PathBuf;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

mod commands;
mod config;
mod error;

use crate::config::CliConfig;
use crate::error::CliError;

#[derive(Parser)]
#[command(name = "ibcast")]
#[command(version, about = "Create iBroadcast playlists from folders and album names", long_about = None)]
struct Cli {
    /// Username for the iBroadcast account
    #[arg(short, long, env = "IBCAST_USERNAME", global = true)]
    username: Option<String>,

    /// Password for the iBroadcast account (prompted for when omitted on a terminal)
    #[arg(short, long, env = "IBCAST_PASSWORD", hide_env_values = true, global = true)]
    password: Option<String>,

    /// Verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,

    /// Configuration file path (default: ./ibcast.toml if present)
    #[arg(long, global = true)]
    config: Option<PathBuf>,

    #[command(subcommand)]
    command: Commands,
}

#[derive(Subcommand)]
pub(crate) enum Commands {
    /// Create a playlist from folders and album name filters
    #[command(visible_alias = "cp")]
    CreatePlaylist(CreatePlaylistArgs),

    /// Show the albums a name filter selects
    #[command(visible_alias = "sa")]
    SelectAlbum {
        /// Album name filter (`*` and `?` wildcards)
        #[arg(short = 'F', long)]
        filter: String,
    },

    /// Show how many tracks a folder selects
    #[command(visible_alias = "sf")]
    SelectFolder {
        /// Folder to select from
        #[arg(short, long)]
        folder: String,
    },

    /// List the file types the service accepts (undocumented API)
    Filetypes,

    /// Upload track files, skipping ones already in the library (undocumented API)
    Upload {
        /// Files to upload
        #[arg(required = true)]
        paths: Vec<PathBuf>,

        /// Upload even when the file is already present
        #[arg(long)]
        force: bool,
    },

    /// List existing playlists
    Playlists,
}

#[derive(Args)]
pub(crate) struct CreatePlaylistArgs {
    /// Playlist name
    #[arg(short, long)]
    pub name: String,

    /// Playlist description
    #[arg(short = 'D', long, default_value = "")]
    pub description: String,

    /// Folder to add tracks from (repeatable)
    #[arg(short, long = "folder")]
    pub folders: Vec<String>,

    /// Album name filter to add tracks from (repeatable)
    #[arg(short = 'F', long = "filter")]
    pub filters: Vec<String>,

    /// Create a public playlist
    #[arg(long, overrides_with = "private")]
    pub public: bool,

    /// Create a private playlist (default)
    #[arg(long, overrides_with = "public")]
    pub private: bool,
}

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let cli = Cli::parse();

    // Initialize tracing
    let default_filter = if cli.verbose {
        "ibcast=debug,ibcast_client=debug,ibcast_core=debug"
    } else {
        "ibcast=info,ibcast_client=info,ibcast_core=info"
    };
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| default_filter.into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let config = CliConfig::load(cli.config.as_deref())?;
    config.validate()?;

    let username = cli
        .username
        .ok_or_else(|| CliError::Usage("a username is required (-u or IBCAST_USERNAME)".into()))?;
    let password = resolve_password(
        cli.password,
        &username,
        std::io::stdin().is_terminal(),
        rpassword::prompt_password,
    )?;

    let mut cache = commands::load_checksum_cache(&config.upload.cache_path).await;

    let client = IbcastClient::new(config.client_config())?;
    let mut session =
        Session::new(client, config.match_policy()).with_checksum_cache(cache.clone());

    session.login(&username, &password).await?;

    let result = commands::run(&mut session, &config, &mut cache, cli.command).await;

    if let Err(e) = session.logout().await {
        tracing::warn!(error = %e, "Logout failed");
    }

    result?;
    Ok(())
}

/// Use the given password, or ask for it without echo when stdin is a terminal.
fn resolve_password<F>(
    password: Option<String>,
    username: &str,
    interactive: bool,
    prompt: F,
) -> error::Result<String>
where
    F: FnOnce(String) -> std::io::Result<String>,
{
    if let Some(password) = password {
        return Ok(password);
    }
    if !interactive {
        return Err(CliError::Usage(
            "a password is required (-p or IBCAST_PASSWORD)".into(),
        ));
    }

    prompt(format!("Enter password for {}: ", username))
        .map_err(|e| CliError::Usage(format!("could not read password: {}", e)))
}
