//! CLI argument definitions using clap.
//!
//! Flags map one-to-one onto request fields of the multiplayer API.
//! Mutually exclusive selectors are plain optional flags here; they are
//! checked by `core::selector` so every command reports the same
//! "exactly one of" error.

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand, ValueEnum};
use clap_complete::Shell;
use uuid::Uuid;

use crate::core::models::{
    AssetReferenceParams, BuildRegionParams, ContainerFlavor, GameCertificateReferenceParams, Port,
};
use crate::core::region::{AzureRegion, parse_region};

/// Manage multiplayer server builds, assets, certificates and sessions.
#[derive(Parser, Debug)]
#[command(name = "pfmp")]
#[command(author, version, about, long_about = None)]
#[command(propagate_version = true)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Option<Commands>,

    // === Global flags ===
    /// Output format
    #[arg(long, value_enum, global = true)]
    pub format: Option<OutputFormat>,

    /// Shorthand for --format json
    #[arg(long, global = true)]
    pub json: bool,

    /// Pretty-print JSON output
    #[arg(long, global = true)]
    pub pretty: bool,

    /// Disable colored output
    #[arg(long, global = true)]
    pub no_color: bool,

    /// Log level
    #[arg(long, value_name = "LEVEL", global = true)]
    pub log_level: Option<String>,

    /// Emit JSONL logs to stderr
    #[arg(long, global = true)]
    pub json_output: bool,

    /// Verbose output (sets log level to debug)
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// API host suffix (e.g. ".playfabapi.com") or a full base URL
    #[arg(long, value_name = "URL", global = true)]
    pub production_environment_url: Option<String>,

    /// Request timeout in seconds
    #[arg(long, value_name = "SECONDS", global = true)]
    pub timeout: Option<u64>,
}

impl Cli {
    /// Output format requested on the command line, if any.
    #[must_use]
    pub const fn cli_format(&self) -> Option<OutputFormat> {
        if self.json {
            Some(OutputFormat::Json)
        } else {
            self.format
        }
    }
}

/// Available commands.
#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Configure the title and its entity token
    #[command(subcommand)]
    Title(TitleCommand),

    /// Create, list and remove builds
    #[command(subcommand)]
    Build(BuildCommand),

    /// Upload, list and remove game server assets
    #[command(subcommand)]
    Asset(AssetCommand),

    /// Upload, list and remove game certificates
    #[command(subcommand)]
    Certificate(CertificateCommand),

    /// List and untag container images
    #[command(subcommand)]
    Image(ImageCommand),

    /// Request and list multiplayer servers
    #[command(subcommand)]
    Server(ServerCommand),

    /// Quality-of-service endpoints
    #[command(subcommand)]
    Qos(QosCommand),

    /// Print a shell completion script
    Completions {
        /// Target shell
        #[arg(value_enum)]
        shell: Shell,
    },
}

// =============================================================================
// title
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum TitleCommand {
    /// Store title credentials and fetch an entity token
    Set {
        /// Title id
        #[arg(long, value_name = "ID")]
        title_id: String,

        /// Developer secret key
        #[arg(long, value_name = "KEY", env = "PFMP_SECRET_KEY", hide_env_values = true)]
        secret_key: String,
    },

    /// Show the entity token expiry, refreshing it if stale
    Token {
        /// Fetch a new token even if the cached one is fresh
        #[arg(long)]
        force: bool,
    },

    /// Show the configured title and token cache state
    Show,

    /// Remove stored credentials and the token cache
    Clear,
}

// =============================================================================
// build
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum BuildCommand {
    /// Create a build with a managed container
    Create(BuildCreateArgs),

    /// List builds by name, by id, or all of them
    List(BuildListArgs),

    /// Delete a build
    Remove {
        /// Build id
        #[arg(long, value_name = "ID")]
        build_id: String,
    },
}

#[derive(Args, Debug)]
pub struct BuildCreateArgs {
    /// Build name
    #[arg(long, value_name = "NAME")]
    pub name: String,

    /// Uploaded asset and where to mount it (file_name:mount_path)
    #[arg(long = "asset", value_name = "FILE:MOUNT", required = true)]
    pub assets: Vec<AssetReferenceParams>,

    /// Certificate to install (name[:gsdk_alias])
    #[arg(long = "certificate", value_name = "NAME[:ALIAS]")]
    pub certificates: Vec<GameCertificateReferenceParams>,

    /// Game port (name:number[:tcp|udp])
    #[arg(long = "port", value_name = "NAME:NUM[:PROTO]", required = true)]
    pub ports: Vec<Port>,

    /// Region capacity (Region:standby:max)
    #[arg(long = "region", value_name = "REGION:STANDBY:MAX", required = true)]
    pub regions: Vec<BuildRegionParams>,

    /// Metadata entry (key=value)
    #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_key_value)]
    pub metadata: Vec<(String, String)>,

    /// Command that starts the game server inside the container
    #[arg(long, value_name = "COMMAND")]
    pub start_command: String,

    /// Virtual machine size
    #[arg(long, value_name = "SIZE", default_value = "Standard_D2_v2")]
    pub vm_size: String,

    /// Game servers per virtual machine
    #[arg(long, value_name = "N", default_value_t = 1)]
    pub servers_per_vm: u32,

    /// Container flavor
    #[arg(long, value_name = "FLAVOR", default_value = "ManagedWindowsServerCore")]
    pub container_flavor: ContainerFlavor,
}

#[derive(Args, Debug)]
pub struct BuildListArgs {
    /// Builds whose name contains this text (case-insensitive)
    #[arg(long, value_name = "NAME")]
    pub name: Option<String>,

    /// A single build by id
    #[arg(long, value_name = "ID")]
    pub id: Option<String>,

    /// Every build
    #[arg(long)]
    pub all: bool,

    /// Fetch full details (ports, regions) for each build
    #[arg(long)]
    pub detailed: bool,
}

// =============================================================================
// asset
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum AssetCommand {
    /// Upload a game server package (.zip, .tar.gz or .tar)
    Add {
        /// File to upload
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Name to store the asset under (defaults to the file name)
        #[arg(long, value_name = "NAME")]
        asset_name: Option<String>,

        /// Metadata entry (key=value)
        #[arg(long = "metadata", value_name = "KEY=VALUE", value_parser = parse_key_value)]
        metadata: Vec<(String, String)>,
    },

    /// List uploaded assets
    List {
        /// Fetch every page
        #[arg(long)]
        all: bool,
    },

    /// Delete an uploaded asset
    Remove {
        /// Asset file name
        #[arg(long, value_name = "NAME")]
        file_name: String,
    },
}

// =============================================================================
// certificate
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum CertificateCommand {
    /// Upload a certificate
    Add {
        /// Certificate file (.pfx)
        #[arg(long, value_name = "PATH")]
        file: PathBuf,

        /// Certificate name
        #[arg(long, value_name = "NAME")]
        name: String,

        /// Certificate password
        #[arg(long, value_name = "PASSWORD", env = "PFMP_CERTIFICATE_PASSWORD", hide_env_values = true)]
        password: Option<String>,
    },

    /// List uploaded certificates
    List {
        /// Fetch every page
        #[arg(long)]
        all: bool,
    },

    /// Delete a certificate
    Remove {
        /// Certificate name
        #[arg(long, value_name = "NAME")]
        name: String,
    },
}

// =============================================================================
// image
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ImageCommand {
    /// List container images
    List {
        /// Fetch every page
        #[arg(long)]
        all: bool,
    },

    /// List tags of a container image
    Tags {
        /// Image name
        #[arg(long, value_name = "NAME")]
        image_name: String,
    },

    /// Remove a tag from a container image
    Untag {
        /// Image name
        #[arg(long, value_name = "NAME")]
        image_name: String,

        /// Tag to remove
        #[arg(long, value_name = "TAG")]
        tag: String,
    },
}

// =============================================================================
// server
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum ServerCommand {
    /// Request a game server for a session
    Request(ServerRequestArgs),

    /// List game servers of a build
    List(ServerListArgs),

    /// Enable multiplayer servers for the title and wait until ready
    Enable(ServerEnableArgs),
}

/// Build reference shared by server commands.
#[derive(Args, Debug)]
pub struct BuildRefArgs {
    /// Build name (must match exactly one build)
    #[arg(long, value_name = "NAME")]
    pub build_name: Option<String>,

    /// Build id
    #[arg(long, value_name = "ID")]
    pub build_id: Option<String>,
}

#[derive(Args, Debug)]
pub struct ServerRequestArgs {
    #[command(flatten)]
    pub build: BuildRefArgs,

    /// Session id
    #[arg(long, value_name = "UUID")]
    pub session_id: Uuid,

    /// Opaque data passed to the game server
    #[arg(long, value_name = "COOKIE")]
    pub session_cookie: Option<String>,

    /// Regions to try, in order of preference
    #[arg(long = "preferred-region", value_name = "REGION", value_parser = parse_region, required = true)]
    pub preferred_regions: Vec<AzureRegion>,
}

#[derive(Args, Debug)]
pub struct ServerListArgs {
    #[command(flatten)]
    pub build: BuildRefArgs,

    /// Region to list servers in
    #[arg(long = "region", value_name = "REGION", value_parser = parse_region)]
    pub regions: Vec<AzureRegion>,

    /// Every region the build is deployed to
    #[arg(long)]
    pub all_regions: bool,

    /// Fetch every page in each region
    #[arg(long)]
    pub all: bool,
}

#[derive(Args, Debug)]
pub struct ServerEnableArgs {
    /// Seconds between status checks
    #[arg(long, value_name = "SECONDS", default_value_t = 10)]
    pub poll_interval: u64,

    /// Give up after this many seconds
    #[arg(long, value_name = "SECONDS")]
    pub max_wait: Option<u64>,
}

// =============================================================================
// qos
// =============================================================================

#[derive(Subcommand, Debug)]
pub enum QosCommand {
    /// List QoS servers for the title
    List,
}

/// Output format.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, ValueEnum)]
pub enum OutputFormat {
    /// Human-readable columns
    #[default]
    Human,
    /// JSON output
    Json,
}

impl OutputFormat {
    /// Parse from string (case-insensitive).
    #[must_use]
    pub fn from_arg(s: &str) -> Option<Self> {
        match s.trim().to_lowercase().as_str() {
            "human" => Some(Self::Human),
            "json" => Some(Self::Json),
            _ => None,
        }
    }
}

/// Parse `key=value`.
///
/// # Errors
/// Returns a message if there is no `=` or the key is empty.
pub fn parse_key_value(s: &str) -> Result<(String, String), String> {
    match s.split_once('=') {
        Some((key, value)) if !key.trim().is_empty() => {
            Ok((key.trim().to_string(), value.to_string()))
        }
        _ => Err(format!("'{s}' must look like key=value")),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use clap::CommandFactory;

    #[test]
    fn cli_parses() {
        Cli::command().debug_assert();
    }

    #[test]
    fn json_flag_overrides_format() {
        let cli = Cli::try_parse_from(["pfmp", "--format", "human", "--json", "qos", "list"]).unwrap();
        assert_eq!(cli.cli_format(), Some(OutputFormat::Json));
        let cli = Cli::try_parse_from(["pfmp", "qos", "list"]).unwrap();
        assert_eq!(cli.cli_format(), None);
    }

    #[test]
    fn build_create_parses_structured_values() {
        let cli = Cli::try_parse_from([
            "pfmp",
            "build",
            "create",
            "--name",
            "alpha",
            "--asset",
            "server.zip:C:\\Assets",
            "--port",
            "game:7777:tcp",
            "--region",
            "EastUs:1:3",
            "--region",
            "westeurope:0:2",
            "--metadata",
            "branch=main",
            "--start-command",
            "C:\\Assets\\server.exe",
        ])
        .unwrap();
        let Some(Commands::Build(BuildCommand::Create(args))) = cli.command else {
            panic!("expected build create");
        };
        assert_eq!(args.regions.len(), 2);
        assert_eq!(args.regions[1].region, AzureRegion::WestEurope);
        assert_eq!(args.ports[0].num, 7777);
        assert_eq!(args.metadata, vec![("branch".to_string(), "main".to_string())]);
        assert_eq!(args.vm_size, "Standard_D2_v2");
        assert_eq!(args.container_flavor, ContainerFlavor::ManagedWindowsServerCore);
    }

    #[test]
    fn bad_region_is_a_parse_error() {
        let result = Cli::try_parse_from([
            "pfmp",
            "server",
            "list",
            "--build-id",
            "b",
            "--region",
            "Atlantis",
        ]);
        assert!(result.is_err());
    }

    #[test]
    fn key_value_parsing() {
        assert_eq!(
            parse_key_value("a=b=c").unwrap(),
            ("a".to_string(), "b=c".to_string())
        );
        assert!(parse_key_value("novalue").is_err());
        assert!(parse_key_value("=x").is_err());
    }
}
