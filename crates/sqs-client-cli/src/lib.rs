//! # SQS Client CLI
//!
//! Command-line front end for the queue client.
//!
//! This module provides CLI commands for:
//! - Listing, creating and deleting queues
//! - Sending, receiving and deleting messages
//! - Reading and changing queue attributes
//! - Granting and revoking permissions
//!
//! Settings are layered: an optional TOML file, then `SQS_CLIENT_*`
//! environment variables, then command-line flags.

use clap::{Parser, Subcommand};
use serde::{Deserialize, Serialize};
use sqs_client::{
    Attribute, Client, ClientConfig, ConfigurationError, CreateQueueOptions, Credentials, Message,
    MessageId, Permission, PermissionAction, QueueAttributes, ReceiptHandle, Region, RequestStyle,
    SqsError,
};
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, info};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt, EnvFilter};

#[cfg(test)]
#[path = "lib_tests.rs"]
mod tests;

// ============================================================================
// CLI Structure
// ============================================================================

/// SQS CLI - work with hosted message queues
#[derive(Debug, Parser)]
#[command(name = "sqs")]
#[command(version = env!("CARGO_PKG_VERSION"))]
#[command(about = "Manage queues and messages on a hosted queue service")]
pub struct Cli {
    /// Configuration file path (TOML)
    #[arg(short, long, env = "SQS_CLIENT_CONFIG")]
    pub config: Option<PathBuf>,

    /// Logging level or filter directive
    #[arg(short, long, default_value = "warn")]
    pub log_level: String,

    /// Enable JSON logging
    #[arg(long)]
    pub json_logs: bool,

    /// Output format
    #[arg(short, long, default_value = "text")]
    pub format: OutputFormat,

    /// Region name, e.g. eu-west-1
    #[arg(short, long)]
    pub region: Option<String>,

    /// Service endpoint overriding the region's default
    #[arg(long)]
    pub endpoint: Option<String>,

    /// Request timeout in seconds
    #[arg(long)]
    pub timeout: Option<u64>,

    /// Send parameters in the query string (get) or a form body (post)
    #[arg(long)]
    pub request_style: Option<String>,

    /// Subcommand to execute
    #[command(subcommand)]
    pub command: Commands,
}

/// Available CLI commands
#[derive(Debug, Subcommand)]
pub enum Commands {
    /// List queues
    List {
        /// Only queues whose name starts with this prefix
        #[arg(short, long)]
        prefix: Option<String>,
    },

    /// Create a queue
    Create {
        name: String,

        /// Default visibility timeout in seconds
        #[arg(long)]
        visibility_timeout: Option<u32>,
    },

    /// Delete a queue and all of its messages
    DeleteQueue { name: String },

    /// Send a message
    Send { name: String, body: String },

    /// Receive at most one message
    Receive { name: String },

    /// Delete a received message
    DeleteMessage { name: String, receipt_handle: String },

    /// Change the visibility timeout of a received message
    ChangeVisibility {
        name: String,
        receipt_handle: String,
        seconds: u32,
    },

    /// Show queue attributes (all when none are named)
    Attributes {
        name: String,
        attributes: Vec<Attribute>,
    },

    /// Set a queue attribute
    SetAttribute {
        name: String,
        attribute: Attribute,
        value: String,
    },

    /// Grant actions on a queue to other accounts
    AddPermission {
        name: String,
        label: String,

        /// Account id, paired in order with --action
        #[arg(long = "account", required = true)]
        accounts: Vec<String>,

        /// Action name or *, paired in order with --account
        #[arg(long = "action", required = true)]
        actions: Vec<PermissionAction>,
    },

    /// Revoke a permission by label
    RemovePermission { name: String, label: String },
}

/// Output format options
#[derive(Clone, Copy, Debug, PartialEq, Eq, clap::ValueEnum, Serialize, Deserialize)]
pub enum OutputFormat {
    /// Human-readable text
    Text,
    /// JSON output
    Json,
}

// ============================================================================
// CLI Error Types
// ============================================================================

/// CLI-specific errors
#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("Configuration error: {0}")]
    Configuration(#[from] ConfigError),

    #[error("{0}")]
    Client(#[from] SqsError),

    #[error("Invalid argument: {arg} - {message}")]
    InvalidArgument { arg: String, message: String },

    #[error("Failed to initialize logging: {message}")]
    Logging { message: String },

    #[error("Failed to render output: {0}")]
    Output(#[from] serde_json::Error),
}

impl CliError {
    /// Process exit code for the error class
    pub fn exit_code(&self) -> i32 {
        match self {
            Self::Configuration(_) | Self::Client(SqsError::Configuration(_)) => 1,
            Self::InvalidArgument { .. } | Self::Logging { .. } => 2,
            Self::Client(e) if e.is_not_found() => 3,
            Self::Client(SqsError::Service(_)) => 4,
            Self::Client(SqsError::Transport(_)) => 5,
            Self::Client(_) => 6,
            Self::Output(_) => 7,
        }
    }
}

/// Configuration-related errors
#[derive(Debug, thiserror::Error)]
pub enum ConfigError {
    #[error("Configuration file not found: {path}")]
    FileNotFound { path: PathBuf },

    #[error("Failed to load configuration: {0}")]
    Load(#[from] config::ConfigError),

    #[error("{0}")]
    Invalid(#[from] ConfigurationError),
}

// ============================================================================
// Configuration Types
// ============================================================================

/// Settings used to build the client
#[derive(Debug, Clone, PartialEq, Eq, Deserialize, Serialize)]
#[serde(default)]
pub struct CliConfig {
    /// Access key; the standard environment variables are used when unset
    pub access_key: Option<String>,
    /// Secret key; the standard environment variables are used when unset
    #[serde(skip_serializing)]
    pub secret_key: Option<String>,
    pub region: String,
    pub endpoint: Option<String>,
    pub timeout_seconds: u64,
    pub request_style: String,
}

impl Default for CliConfig {
    fn default() -> Self {
        Self {
            access_key: None,
            secret_key: None,
            region: "us-east-1".to_string(),
            endpoint: None,
            timeout_seconds: 30,
            request_style: "get".to_string(),
        }
    }
}

impl CliConfig {
    /// Apply command-line flags on top of the loaded settings
    pub fn with_overrides(mut self, cli: &Cli) -> Self {
        if let Some(region) = &cli.region {
            self.region = region.clone();
        }
        if let Some(endpoint) = &cli.endpoint {
            self.endpoint = Some(endpoint.clone());
        }
        if let Some(timeout) = cli.timeout {
            self.timeout_seconds = timeout;
        }
        if let Some(style) = &cli.request_style {
            self.request_style = style.clone();
        }
        self
    }

    /// Build a client from these settings
    pub fn build_client(&self) -> Result<Client, CliError> {
        let credentials = match (&self.access_key, &self.secret_key) {
            (Some(access_key), Some(secret_key)) => Credentials::new(access_key, secret_key),
            _ => Credentials::from_env().map_err(ConfigError::from)?,
        };

        let region = match &self.endpoint {
            Some(endpoint) => Region::custom(&self.region, endpoint),
            None => Region::from_name(&self.region).map_err(ConfigError::from)?,
        };

        let request_style: RequestStyle =
            self.request_style.parse().map_err(ConfigError::from)?;

        let mut config = ClientConfig::default().with_request_style(request_style);
        config = if self.timeout_seconds == 0 {
            config.without_timeout()
        } else {
            config.with_timeout(Duration::from_secs(self.timeout_seconds))
        };

        Ok(Client::with_config(credentials, region, config)?)
    }
}

/// Load settings from an optional TOML file and `SQS_CLIENT_*` variables
pub fn load_configuration(config_path: Option<&Path>) -> Result<CliConfig, ConfigError> {
    let mut builder = config::Config::builder();

    if let Some(path) = config_path {
        if !path.exists() {
            return Err(ConfigError::FileNotFound {
                path: path.to_path_buf(),
            });
        }
        info!(path = %path.display(), "Loading configuration file");
        builder = builder.add_source(
            config::File::from(path)
                .required(true)
                .format(config::FileFormat::Toml),
        );
    }

    let config = builder
        .add_source(config::Environment::with_prefix("SQS_CLIENT"))
        .build()?;

    Ok(config.try_deserialize()?)
}

// ============================================================================
// Command Output
// ============================================================================

/// Queue as shown to the user
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
pub struct QueueSummary {
    pub name: String,
    pub url: String,
}

/// Result of a command, rendered as text or JSON
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum CommandOutput {
    Queues(Vec<QueueSummary>),
    Queue(QueueSummary),
    MessageSent(MessageId),
    Message(Option<Message>),
    Attributes(QueueAttributes),
    Done,
}

impl CommandOutput {
    pub fn render(&self, format: OutputFormat) -> Result<String, CliError> {
        match format {
            OutputFormat::Text => Ok(self.render_text()),
            OutputFormat::Json => self.render_json(),
        }
    }

    fn render_text(&self) -> String {
        match self {
            Self::Queues(queues) => queues
                .iter()
                .map(|q| format!("{}\t{}", q.name, q.url))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Queue(queue) => queue.url.clone(),
            Self::MessageSent(id) => id.to_string(),
            Self::Message(Some(message)) => format!(
                "MessageId: {}\nReceiptHandle: {}\nBody: {}",
                message.id, message.receipt_handle, message.body
            ),
            Self::Message(None) => "No message available".to_string(),
            Self::Attributes(attributes) => attributes
                .iter()
                .map(|a| format!("{}={}", a.name, a.value))
                .collect::<Vec<_>>()
                .join("\n"),
            Self::Done => String::new(),
        }
    }

    fn render_json(&self) -> Result<String, CliError> {
        let rendered = match self {
            Self::Queues(queues) => serde_json::to_string_pretty(queues)?,
            Self::Queue(queue) => serde_json::to_string_pretty(queue)?,
            Self::MessageSent(id) => {
                serde_json::to_string_pretty(&serde_json::json!({ "message_id": id }))?
            }
            Self::Message(message) => serde_json::to_string_pretty(message)?,
            Self::Attributes(attributes) => serde_json::to_string_pretty(attributes)?,
            Self::Done => serde_json::to_string_pretty(&serde_json::json!({ "status": "ok" }))?,
        };
        Ok(rendered)
    }
}

// ============================================================================
// Main Entry Point
// ============================================================================

/// Main CLI entry point
pub async fn run_cli() -> Result<(), CliError> {
    let cli = Cli::parse();

    initialize_logging(&cli)?;

    let output = run(cli).await?;
    if !output.is_empty() {
        println!("{}", output);
    }
    Ok(())
}

/// Load configuration, execute the command and render its output
pub async fn run(cli: Cli) -> Result<String, CliError> {
    let config = load_configuration(cli.config.as_deref())?.with_overrides(&cli);
    let client = config.build_client()?;

    debug!(
        region = %client.region().name(),
        endpoint = %client.region().endpoint(),
        "Client configured"
    );

    let output = execute_command(&client, cli.command).await?;
    output.render(cli.format)
}

/// Initialize logging based on CLI arguments
pub fn initialize_logging(cli: &Cli) -> Result<(), CliError> {
    let filter = EnvFilter::try_new(&cli.log_level).map_err(|e| CliError::InvalidArgument {
        arg: "log-level".to_string(),
        message: e.to_string(),
    })?;

    let registry = tracing_subscriber::registry().with(filter);
    let result = if cli.json_logs {
        registry
            .with(
                tracing_subscriber::fmt::layer()
                    .json()
                    .with_writer(std::io::stderr),
            )
            .try_init()
    } else {
        registry
            .with(tracing_subscriber::fmt::layer().with_writer(std::io::stderr))
            .try_init()
    };

    result.map_err(|e| CliError::Logging {
        message: e.to_string(),
    })
}

// ============================================================================
// Command Implementations
// ============================================================================

/// Execute one command against the service
pub async fn execute_command(client: &Client, command: Commands) -> Result<CommandOutput, CliError> {
    match command {
        Commands::List { prefix } => {
            info!(prefix = ?prefix, "Listing queues");
            let queues = client.list_queues(prefix.as_deref()).await?;
            Ok(CommandOutput::Queues(
                queues
                    .iter()
                    .map(|q| QueueSummary {
                        name: q.name().to_string(),
                        url: q.url(),
                    })
                    .collect(),
            ))
        }
        Commands::Create {
            name,
            visibility_timeout,
        } => {
            info!(queue = %name, visibility_timeout = ?visibility_timeout, "Creating queue");
            let options = visibility_timeout
                .map(|t| CreateQueueOptions::default().with_default_visibility_timeout(t));
            let queue = client.create_queue(&name, options).await?;
            Ok(CommandOutput::Queue(QueueSummary {
                name: queue.name().to_string(),
                url: queue.url(),
            }))
        }
        Commands::DeleteQueue { name } => {
            info!(queue = %name, "Deleting queue");
            client.queue(&name).await?.delete_queue().await?;
            Ok(CommandOutput::Done)
        }
        Commands::Send { name, body } => {
            info!(queue = %name, "Sending message");
            let id = client.queue(&name).await?.send_message(&body).await?;
            Ok(CommandOutput::MessageSent(id))
        }
        Commands::Receive { name } => {
            info!(queue = %name, "Receiving message");
            let message = client.queue(&name).await?.receive_message().await?;
            Ok(CommandOutput::Message(message))
        }
        Commands::DeleteMessage {
            name,
            receipt_handle,
        } => {
            info!(queue = %name, "Deleting message");
            client
                .queue(&name)
                .await?
                .delete_message(&ReceiptHandle::new(receipt_handle))
                .await?;
            Ok(CommandOutput::Done)
        }
        Commands::ChangeVisibility {
            name,
            receipt_handle,
            seconds,
        } => {
            info!(queue = %name, seconds = seconds, "Changing message visibility");
            client
                .queue(&name)
                .await?
                .change_message_visibility(&ReceiptHandle::new(receipt_handle), seconds)
                .await?;
            Ok(CommandOutput::Done)
        }
        Commands::Attributes { name, attributes } => {
            let attributes = if attributes.is_empty() {
                vec![Attribute::All]
            } else {
                attributes
            };
            info!(queue = %name, attributes = ?attributes, "Reading queue attributes");
            let values = client
                .queue(&name)
                .await?
                .get_queue_attributes(&attributes)
                .await?;
            Ok(CommandOutput::Attributes(values))
        }
        Commands::SetAttribute {
            name,
            attribute,
            value,
        } => {
            info!(queue = %name, attribute = %attribute, "Setting queue attribute");
            client
                .queue(&name)
                .await?
                .set_queue_attribute(attribute, &value)
                .await?;
            Ok(CommandOutput::Done)
        }
        Commands::AddPermission {
            name,
            label,
            accounts,
            actions,
        } => {
            let permissions = pair_permissions(accounts, actions)?;
            info!(queue = %name, label = %label, grants = permissions.len(), "Adding permission");
            client
                .queue(&name)
                .await?
                .add_permission(&label, &permissions)
                .await?;
            Ok(CommandOutput::Done)
        }
        Commands::RemovePermission { name, label } => {
            info!(queue = %name, label = %label, "Removing permission");
            client.queue(&name).await?.remove_permission(&label).await?;
            Ok(CommandOutput::Done)
        }
    }
}

/// Pair each `--account` with the `--action` in the same position
fn pair_permissions(
    accounts: Vec<String>,
    actions: Vec<PermissionAction>,
) -> Result<Vec<Permission>, CliError> {
    if accounts.len() != actions.len() {
        return Err(CliError::InvalidArgument {
            arg: "account/action".to_string(),
            message: format!(
                "{} accounts given for {} actions; each --account needs one --action",
                accounts.len(),
                actions.len()
            ),
        });
    }

    Ok(accounts
        .into_iter()
        .zip(actions)
        .map(|(account, action)| Permission::new(account, action))
        .collect())
}
