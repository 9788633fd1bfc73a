use std::net::SocketAddr;
use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use servdash_types::{CategoryFilter, ServerCategory};

#[derive(Parser)]
#[command(
    name = "servdash",
    about = "servdash: inventory of servers and the sites they host",
    version
)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Command,

    /// Base URL of the servdash server
    #[arg(
        long,
        global = true,
        env = "SERVDASH_URL",
        default_value = "http://127.0.0.1:8788"
    )]
    pub url: String,

    #[arg(short, long, global = true)]
    pub verbose: bool,

    #[arg(long, global = true, default_value = "text")]
    pub format: OutputFormat,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum)]
pub enum OutputFormat {
    Text,
    Json,
}

#[derive(Subcommand)]
pub enum Command {
    /// Run the HTTP server
    Serve(ServeArgs),
    /// List servers, optionally of one category
    Servers(ServersArgs),
    /// List all hosted sites
    Sites(SitesArgs),
    /// Show counts per category
    Stats,
    /// Create, edit, or delete a server
    Server {
        #[command(subcommand)]
        action: ServerAction,
    },
    /// Create, edit, or delete a site
    Site {
        #[command(subcommand)]
        action: SiteAction,
    },
}

#[derive(Args)]
pub struct ServeArgs {
    /// TOML configuration file
    #[arg(long)]
    pub config: Option<PathBuf>,
    #[arg(long)]
    pub bind: Option<SocketAddr>,
    /// Directory for persistent data; in-memory when omitted
    #[arg(long)]
    pub data_dir: Option<PathBuf>,
}

#[derive(Args)]
pub struct ServersArgs {
    /// Category name, or "all"
    #[arg(long, default_value = "all", value_parser = parse_filter)]
    pub category: CategoryFilter,
}

#[derive(Args)]
pub struct SitesArgs {
    /// Case-insensitive match on domain, file server, database, or proxy link
    #[arg(short, long)]
    pub query: Option<String>,
}

#[derive(Subcommand)]
pub enum ServerAction {
    /// Add a server
    Add(ServerFields),
    /// Edit a server; only the given fields change
    Edit {
        id: String,
        #[command(flatten)]
        fields: ServerFields,
    },
    /// Delete a server
    Delete {
        id: String,
        /// Skip the confirmation and delete
        #[arg(long)]
        yes: bool,
    },
    /// Show one server
    Show { id: String },
    /// List sites associated with a server
    Associations { id: String },
}

#[derive(Args, Default)]
pub struct ServerFields {
    #[arg(long, value_parser = parse_category)]
    pub category: Option<ServerCategory>,
    #[arg(long)]
    pub title: Option<String>,
    #[arg(long)]
    pub link: Option<String>,
    #[arg(long)]
    pub port: Option<String>,
    #[arg(long)]
    pub login: Option<String>,
    #[arg(long)]
    pub password: Option<String>,
    /// MX record; repeat for several
    #[arg(long = "mx")]
    pub mx_records: Vec<String>,
    /// Custom field as LABEL=VALUE; repeat for several
    #[arg(long = "field", value_parser = parse_label_value)]
    pub custom_fields: Vec<(String, String)>,
    /// Drop existing custom fields before adding new ones
    #[arg(long)]
    pub clear_fields: bool,
    #[arg(long)]
    pub fixed: Option<bool>,
    #[arg(long)]
    pub mural: Option<bool>,
}

#[derive(Subcommand)]
pub enum SiteAction {
    /// Add a site to a file server
    Add {
        #[arg(long)]
        file_server: String,
        #[command(flatten)]
        fields: SiteFields,
    },
    /// Edit a site; only the given fields change
    Edit {
        id: String,
        /// Move the site to another file server
        #[arg(long)]
        move_to: Option<String>,
        #[command(flatten)]
        fields: SiteFields,
    },
    /// Delete a site
    Delete {
        id: String,
        #[arg(long)]
        yes: bool,
    },
    /// Show one site
    Show { id: String },
}

/// Association flags take a server id; an empty value clears the association.
#[derive(Args, Default)]
pub struct SiteFields {
    #[arg(long)]
    pub domain: Option<String>,
    #[arg(long)]
    pub admin_user: Option<String>,
    #[arg(long)]
    pub admin_password: Option<String>,
    #[arg(long = "db")]
    pub db_server: Option<String>,
    #[arg(long = "proxy")]
    pub reverse_proxy: Option<String>,
    #[arg(long = "backup")]
    pub backup_server: Option<String>,
    #[arg(long)]
    pub email_service: Option<String>,
    /// Comma-separated MX records, used without an email service
    #[arg(long = "mx")]
    pub mx_records: Option<String>,
    #[arg(long = "field", value_parser = parse_label_value)]
    pub custom_fields: Vec<(String, String)>,
    #[arg(long)]
    pub clear_fields: bool,
}

fn parse_category(s: &str) -> Result<ServerCategory, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_filter(s: &str) -> Result<CategoryFilter, String> {
    s.parse().map_err(|e| format!("{e}"))
}

fn parse_label_value(s: &str) -> Result<(String, String), String> {
    let (label, value) = s
        .split_once('=')
        .ok_or_else(|| format!("expected LABEL=VALUE, got {s:?}"))?;
    Ok((label.trim().to_string(), value.to_string()))
}
