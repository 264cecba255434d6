//! tally - 门店后台管理命令行
//!
//! Every command opens the console, restores the saved session, runs, then
//! saves local state and prints the notices it produced.

use std::path::PathBuf;
use std::process::ExitCode;

use anyhow::Context;
use clap::{Args, Parser, Subcommand, ValueEnum};
use shared::client::Role;
use tally_client::AuthScheme;
use tally_console::state::Theme;
use tally_console::{Console, ConsoleConfig};

mod commands;

#[derive(Parser)]
#[command(name = "tally")]
#[command(about = "Administration console for the Tally point-of-sale backend")]
#[command(version = env!("CARGO_PKG_VERSION"))]
struct Cli {
    #[command(subcommand)]
    command: Command,

    /// Backend base URL
    #[arg(long, env = "TALLY_API_URL", global = true)]
    api_url: Option<String>,

    /// Authorization header scheme (raw or bearer)
    #[arg(long, env = "TALLY_AUTH_SCHEME", global = true)]
    auth_scheme: Option<AuthScheme>,

    /// Value of the `shop_id` header
    #[arg(long, env = "TALLY_SHOP_ID", global = true)]
    shop_id: Option<String>,

    /// Value of the `branch` header
    #[arg(long, env = "TALLY_BRANCH", global = true)]
    branch: Option<String>,

    /// Request timeout in seconds
    #[arg(long, env = "TALLY_TIMEOUT_SECS", global = true)]
    timeout: Option<u64>,

    /// Local state directory
    #[arg(long, env = "TALLY_DATA_DIR", global = true)]
    data_dir: Option<PathBuf>,

    /// Log directory
    #[arg(long, env = "TALLY_LOG_DIR", global = true)]
    log_dir: Option<PathBuf>,

    /// Enable verbose logging
    #[arg(short, long, global = true)]
    verbose: bool,
}

impl Cli {
    fn config(&self) -> ConsoleConfig {
        let mut config = ConsoleConfig::from_env();
        if let Some(url) = &self.api_url {
            config.api_url = url.clone();
        }
        if let Some(scheme) = self.auth_scheme {
            config.auth_scheme = Some(scheme);
        }
        if self.shop_id.is_some() {
            config.shop_id = self.shop_id.clone();
        }
        if self.branch.is_some() {
            config.branch = self.branch.clone();
        }
        if let Some(timeout) = self.timeout {
            config.timeout_secs = timeout;
        }
        if let Some(dir) = &self.data_dir {
            config.data_dir = dir.clone();
            if self.log_dir.is_none() {
                config.log_dir = dir.join("logs");
            }
        }
        if let Some(dir) = &self.log_dir {
            config.log_dir = dir.clone();
        }
        config
    }
}

/// Resources with a list screen
#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum ResourceKind {
    Products,
    Categories,
    Brands,
    Branches,
    Admins,
    Permissions,
    Sales,
    Debts,
    Reports,
}

#[derive(Debug, Args)]
pub struct ListArgs {
    /// Case-insensitive text search
    #[arg(short, long)]
    pub search: Option<String>,

    /// Filter: `field=value`, `field=min..max`, `field?`, `!field`
    #[arg(short, long = "filter")]
    pub filters: Vec<String>,

    /// Sort key; prefix with `-` for descending
    #[arg(long, allow_hyphen_values = true)]
    pub sort: Option<String>,

    /// Page number (1-based)
    #[arg(long)]
    pub page: Option<u32>,

    /// Rows per page
    #[arg(long)]
    pub per_page: Option<u32>,

    /// Write every matching row to a CSV file instead of printing a page
    #[arg(long)]
    pub csv: Option<PathBuf>,

    /// Show category and brand names instead of identifiers (products)
    #[arg(long)]
    pub names: bool,
}

#[derive(Debug, Subcommand)]
pub enum CartCommand {
    /// Add units of a product
    Add { product: String, quantity: i64 },
    /// Remove a product line
    Remove { product: String },
    /// Show the cart
    Show,
    /// Record a sale for every line
    Checkout,
}

#[derive(Debug, Subcommand)]
enum Command {
    /// Log in as a superuser or an admin
    Login {
        #[arg(long, value_enum, default_value = "admin")]
        role: RoleArg,
        #[arg(short, long)]
        username: String,
        #[arg(short, long, env = "TALLY_PASSWORD", hide_env_values = true)]
        password: String,
    },
    /// Log out and purge local state
    Logout,
    /// Show the current session
    Whoami,
    /// List a resource
    List {
        resource: ResourceKind,
        #[command(flatten)]
        args: ListArgs,
    },
    /// Show one record as JSON
    Show { resource: ResourceKind, id: String },
    /// Create a record from a JSON payload
    Create {
        resource: ResourceKind,
        #[arg(long)]
        json: String,
    },
    /// Update a record from a JSON payload of changed fields
    Update {
        resource: ResourceKind,
        id: String,
        #[arg(long)]
        json: String,
    },
    /// Delete a record
    Delete { resource: ResourceKind, id: String },
    /// Dashboard statistics
    Stats,
    /// Download a backup of every table
    Backup { path: PathBuf },
    /// Upload a backup file
    Restore { path: PathBuf },
    /// Select the branch sent with requests (no argument clears it)
    Branch { id: Option<String> },
    /// Manage the pending sale
    Cart {
        #[command(subcommand)]
        command: CartCommand,
    },
    /// Local preferences
    Settings {
        #[arg(long)]
        per_page: Option<u32>,
        #[arg(long)]
        auth_scheme: Option<AuthScheme>,
        #[arg(long, value_enum)]
        theme: Option<ThemeArg>,
    },
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum RoleArg {
    Superuser,
    Admin,
}

impl From<RoleArg> for Role {
    fn from(role: RoleArg) -> Self {
        match role {
            RoleArg::Superuser => Role::Superuser,
            RoleArg::Admin => Role::Admin,
        }
    }
}

#[derive(Debug, Clone, Copy, ValueEnum)]
enum ThemeArg {
    Light,
    Dark,
}

impl From<ThemeArg> for Theme {
    fn from(theme: ThemeArg) -> Self {
        match theme {
            ThemeArg::Light => Theme::Light,
            ThemeArg::Dark => Theme::Dark,
        }
    }
}

async fn run(console: &mut Console, command: Command) -> shared::AppResult<()> {
    match command {
        Command::Login {
            role,
            username,
            password,
        } => {
            let user = console.login(role.into(), &username, &password).await?;
            println!("{} ({})", user.display_name(), Role::from(role));
            Ok(())
        }
        Command::Logout => console.logout().await,
        Command::Whoami => commands::whoami(console),
        Command::List { resource, args } => commands::list(console, resource, &args).await,
        Command::Show { resource, id } => commands::show(console, resource, &id).await,
        Command::Create { resource, json } => commands::create(console, resource, &json).await,
        Command::Update { resource, id, json } => {
            commands::update(console, resource, &id, &json).await
        }
        Command::Delete { resource, id } => commands::delete(console, resource, &id).await,
        Command::Stats => {
            let stats = console.statistics().await?;
            for (label, value) in stats.rows() {
                println!("{label:<20} {value}");
            }
            Ok(())
        }
        Command::Backup { path } => {
            let rows = console.backup_to(&path).await?;
            println!("{rows} rows saved to {}", path.display());
            Ok(())
        }
        Command::Restore { path } => console.restore_from(&path).await.map(|_| ()),
        Command::Branch { id } => {
            console.select_branch(id).await;
            Ok(())
        }
        Command::Cart { command } => commands::cart(console, command).await,
        Command::Settings {
            per_page,
            auth_scheme,
            theme,
        } => {
            let settings = &mut console.state_mut().settings;
            if let Some(per_page) = per_page {
                settings.per_page = per_page.max(1);
            }
            if auth_scheme.is_some() {
                settings.auth_scheme = auth_scheme;
            }
            if let Some(theme) = theme {
                settings.theme = theme.into();
            }
            println!("{}", serde_json::to_string_pretty(settings).unwrap_or_default());
            Ok(())
        }
    }
}

#[tokio::main]
async fn main() -> anyhow::Result<ExitCode> {
    // 加载 .env 文件 (如果存在)
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let config = cli.config();

    let _log_guard = tally_console::logging::init(&config.log_dir, cli.verbose)
        .with_context(|| format!("Failed to initialize logging in {}", config.log_dir.display()))?;

    let mut console = Console::open(&config)
        .await
        .context("Failed to open console")?;

    let is_logout = matches!(cli.command, Command::Logout);
    let result = run(&mut console, cli.command).await;

    if !is_logout {
        console.save().context("Failed to save local state")?;
    }
    for notice in console.notices().drain() {
        eprintln!("{notice}");
    }

    Ok(match result {
        Ok(()) => ExitCode::SUCCESS,
        Err(e) => {
            tracing::debug!(kind = %e.kind, details = ?e.details, "command failed");
            ExitCode::FAILURE
        }
    })
}
