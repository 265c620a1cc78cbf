//! Command-line arguments

use std::path::PathBuf;

use clap::{Args, Parser, Subcommand};
use mcpctl_core::{ResourceLimits, ServerSpec, ServerSpecPatch, ServerTransport};

#[derive(Debug, Parser)]
#[command(name = "mcpctl", version, about = "Control MCP servers through the management API")]
pub struct Cli {
    /// Management API base URL
    #[arg(long, global = true, env = "MCPCTL_API_URL")]
    pub api_url: Option<String>,

    /// Bearer token (defaults to $MCPCTL_TOKEN, read on every request)
    #[arg(long, global = true)]
    pub token: Option<String>,

    /// Debug logging for mcpctl crates
    #[arg(short, long, global = true)]
    pub verbose: bool,

    /// Also write daily-rotated log files to this directory
    #[arg(long, global = true, value_name = "DIR")]
    pub log_dir: Option<PathBuf>,

    #[command(subcommand)]
    pub command: Command,
}

#[derive(Debug, Subcommand)]
pub enum Command {
    /// List managed servers
    List {
        #[arg(long)]
        json: bool,
    },
    /// Show one server
    Get {
        id: String,
        #[arg(long)]
        json: bool,
    },
    /// Create a server
    Create(CreateArgs),
    /// Change a server's configuration
    Update(UpdateArgs),
    /// Delete a server
    Delete {
        id: String,
        /// Refuse to delete a running server
        #[arg(long)]
        require_stopped: bool,
    },
    Start {
        id: String,
    },
    Stop {
        id: String,
    },
    Restart {
        id: String,
    },
    /// Follow a server's logs until Ctrl-C
    Logs {
        id: String,
        /// Print payloads exactly as received
        #[arg(long)]
        raw: bool,
    },
    /// Send an elicitation prompt to a server
    Elicit {
        id: String,
        #[arg(long)]
        prompt: String,
        /// Extra context entries, KEY=JSON
        #[arg(long = "context", value_parser = parse_key_val)]
        context: Vec<(String, String)>,
    },
}

#[derive(Debug, Args)]
pub struct ConfigArgs {
    #[arg(long)]
    pub description: Option<String>,

    /// Docker image
    #[arg(long)]
    pub image: Option<String>,

    /// Environment variable, KEY=VALUE (repeatable)
    #[arg(long = "env", value_parser = parse_key_val)]
    pub env: Vec<(String, String)>,

    #[arg(long)]
    pub port: Option<u32>,

    /// CPU cores, e.g. 1.5
    #[arg(long)]
    pub cpu_limit: Option<String>,

    /// Memory limit, e.g. 512m
    #[arg(long)]
    pub memory_limit: Option<String>,

    /// Enabled middleware (comma separated)
    #[arg(long, value_delimiter = ',')]
    pub middleware: Option<Vec<String>>,

    #[arg(long)]
    pub elicitation: Option<bool>,

    #[arg(long)]
    pub auth_required: Option<bool>,
}

impl ConfigArgs {
    fn resources(&self) -> Option<ResourceLimits> {
        if self.cpu_limit.is_none() && self.memory_limit.is_none() {
            return None;
        }
        Some(ResourceLimits::new(
            self.cpu_limit.as_deref(),
            self.memory_limit.as_deref(),
        ))
    }

    fn env(&self) -> Option<std::collections::HashMap<String, String>> {
        if self.env.is_empty() {
            None
        } else {
            Some(self.env.iter().cloned().collect())
        }
    }
}

#[derive(Debug, Args)]
pub struct CreateArgs {
    #[arg(long)]
    pub name: String,

    /// stdio, sse or streamable_http
    #[arg(long, default_value = "stdio")]
    pub transport: ServerTransport,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl CreateArgs {
    pub fn to_spec(&self) -> ServerSpec {
        ServerSpec {
            name: self.name.clone(),
            description: self.config.description.clone(),
            transport: self.transport,
            image: self.config.image.clone(),
            env: self.config.env(),
            port: self.config.port,
            resources: self.config.resources(),
            middleware: self.config.middleware.clone(),
            elicitation: self.config.elicitation,
            auth_required: self.config.auth_required,
        }
    }
}

#[derive(Debug, Args)]
pub struct UpdateArgs {
    pub id: String,

    #[arg(long)]
    pub name: Option<String>,

    #[arg(long)]
    pub transport: Option<ServerTransport>,

    #[command(flatten)]
    pub config: ConfigArgs,
}

impl UpdateArgs {
    pub fn to_patch(&self) -> ServerSpecPatch {
        ServerSpecPatch {
            name: self.name.clone(),
            description: self.config.description.clone(),
            transport: self.transport,
            image: self.config.image.clone(),
            env: self.config.env(),
            port: self.config.port,
            resources: self.config.resources(),
            middleware: self.config.middleware.clone(),
            elicitation: self.config.elicitation,
            auth_required: self.config.auth_required,
        }
    }
}

fn parse_key_val(raw: &str) -> Result<(String, String), String> {
    let (key, value) = raw
        .split_once('=')
        .ok_or_else(|| format!("expected KEY=VALUE, got '{raw}'"))?;
    if key.is_empty() {
        return Err(format!("empty key in '{raw}'"));
    }
    Ok((key.to_string(), value.to_string()))
}
