//! mcpctl - command-line control of managed MCP servers

mod cli;
mod logging;

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use mcpctl_client::{
    callbacks, ApiClient, ClientConfig, CredentialProvider, DeletePolicy, EnvToken,
    LifecycleController, ServerApi, StaticToken,
};
use mcpctl_core::{
    ElicitationRequest, LifecycleCommand, LogLine, ManagedServer, ServerCollection, ServerId,
};
use tracing::debug;

use crate::cli::{Cli, Command};

#[tokio::main]
async fn main() -> Result<()> {
    // Load .env before clap reads the environment
    dotenvy::dotenv().ok();

    let cli = Cli::parse();
    let _log_guard = logging::init_tracing(cli.verbose, cli.log_dir.as_deref())?;

    let config = client_config(cli.api_url.as_deref())?;
    debug!(base_url = %config.base_url(), "Using management API");

    let credentials: Arc<dyn CredentialProvider> = match cli.token {
        Some(token) => Arc::new(StaticToken::new(token)),
        None => Arc::new(EnvToken::default()),
    };
    let client = Arc::new(ApiClient::with_credentials(config, credentials)?);

    run(cli.command, client).await
}

/// clap has already folded `MCPCTL_API_URL` into `api_url`; the flag wins over it
fn client_config(api_url: Option<&str>) -> Result<ClientConfig> {
    match api_url {
        Some(url) => ClientConfig::new()
            .with_base_url(url)
            .with_context(|| format!("invalid API URL '{url}' (--api-url or MCPCTL_API_URL)")),
        None => Ok(ClientConfig::new()),
    }
}

async fn run(command: Command, client: Arc<ApiClient>) -> Result<()> {
    let controller = LifecycleController::new(client.clone());
    let servers = ServerCollection::new();

    match command {
        Command::List { json } => {
            controller.refresh(&servers).await?;
            let list = servers.snapshot();
            if json {
                println!("{}", serde_json::to_string_pretty(&list)?);
            } else if list.is_empty() {
                println!("No servers");
            } else {
                for server in &list {
                    print_summary(server);
                }
            }
        }

        Command::Get { id, json } => {
            let server = client.get_server(&ServerId::from(id)).await?;
            if json {
                println!("{}", serde_json::to_string_pretty(&server)?);
            } else {
                print_details(&server);
            }
        }

        Command::Create(args) => {
            let created = controller.create(&servers, &args.to_spec()).await?;
            println!("Created {} ({})", created.name(), created.id);
        }

        Command::Update(args) => {
            let id = ServerId::from(args.id.clone());
            controller.refresh(&servers).await?;
            let updated = controller.update(&servers, &id, &args.to_patch()).await?;
            println!("Updated {} ({})", updated.name(), updated.id);
        }

        Command::Delete {
            id,
            require_stopped,
        } => {
            let policy = if require_stopped {
                DeletePolicy::RequireStopped
            } else {
                DeletePolicy::AllowRunning
            };
            let controller = controller.with_delete_policy(policy);
            lifecycle(&controller, &servers, id, LifecycleCommand::Delete).await?;
        }

        Command::Start { id } => {
            lifecycle(&controller, &servers, id, LifecycleCommand::Start).await?
        }
        Command::Stop { id } => {
            lifecycle(&controller, &servers, id, LifecycleCommand::Stop).await?
        }
        Command::Restart { id } => {
            lifecycle(&controller, &servers, id, LifecycleCommand::Restart).await?
        }

        Command::Logs { id, raw } => follow_logs(&client, ServerId::from(id), raw).await?,

        Command::Elicit {
            id,
            prompt,
            context,
        } => {
            let mut request = ElicitationRequest::new(prompt);
            for (key, value) in context {
                // Plain strings are accepted without JSON quoting
                let value = serde_json::from_str(&value)
                    .unwrap_or(serde_json::Value::String(value));
                request = request.with_context(key, value);
            }
            let response = client.elicit(&ServerId::from(id), &request).await?;
            println!("{}", response.response);
            if let Some(tool_calls) = response.tool_calls.filter(|calls| !calls.is_empty()) {
                println!("{}", serde_json::to_string_pretty(&tool_calls)?);
            }
        }
    }

    Ok(())
}

async fn lifecycle(
    controller: &LifecycleController,
    servers: &ServerCollection,
    id: String,
    command: LifecycleCommand,
) -> Result<()> {
    let id = ServerId::from(id);
    controller.refresh(servers).await?;

    let outcome = controller
        .execute(servers, &id, command)
        .await
        .with_context(|| format!("{command} {id} failed"))?;

    match (&outcome.server, outcome.message.is_empty()) {
        (Some(server), true) => println!("{} is {}", server.id, server.current_status()),
        (Some(server), false) => println!(
            "{} is {}: {}",
            server.id,
            server.current_status(),
            outcome.message
        ),
        (None, true) => println!("{command} {id}: done"),
        (None, false) => println!("{command} {id}: {}", outcome.message),
    }
    Ok(())
}

async fn follow_logs(client: &ApiClient, id: ServerId, raw: bool) -> Result<()> {
    let mut subscription = client
        .stream_logs(
            &id,
            callbacks(
                move |line: LogLine| print_log_line(&line, raw),
                |error| eprintln!("log stream error: {error}"),
            ),
        )
        .await
        .with_context(|| format!("failed to open log stream for {id}"))?;

    let interrupted = tokio::select! {
        _ = subscription.finished() => false,
        signal = tokio::signal::ctrl_c() => {
            signal.context("failed to listen for Ctrl-C")?;
            true
        }
    };

    if interrupted {
        subscription.cancel();
        debug!(server_id = %id, "Log stream closed on Ctrl-C");
    }
    Ok(())
}

fn print_log_line(line: &LogLine, raw: bool) {
    match line.entry().filter(|_| !raw) {
        Some(entry) => println!(
            "{} {:<8} {}",
            entry.timestamp.format("%Y-%m-%d %H:%M:%S"),
            entry.level.to_uppercase(),
            entry.message
        ),
        None => println!("{line}"),
    }
}

fn print_summary(server: &ManagedServer) {
    println!(
        "{}\t{}\t{}\t{}",
        server.id,
        server.name(),
        server.current_status(),
        server.config.transport
    );
}

fn print_details(server: &ManagedServer) {
    let config = &server.config;
    println!("id:          {}", server.id);
    println!("name:        {}", config.name);
    if !config.description.is_empty() {
        println!("description: {}", config.description);
    }
    println!("status:      {}", server.current_status());
    println!("transport:   {}", config.transport);
    if let Some(port) = config.port {
        println!("port:        {port}");
    }
    println!("image:       {}", config.docker_image);
    println!("cpu:         {}", config.cpu_limit);
    println!("memory:      {}", config.memory_limit);
    if !config.middleware_config.is_empty() {
        println!(
            "middleware:  {}",
            config.middleware_config.enabled_middleware.join(", ")
        );
    }
    if let Some(started_at) = server.started_at() {
        println!("started:     {}", started_at.format("%Y-%m-%d %H:%M:%S UTC"));
    }
    if let Some(error) = &server.status.error_message {
        println!("error:       {error}");
    }
}
