//! Config projection between the user-facing spec and the wire schema
//!
//! Pure functions, no I/O. Every validation failure surfaces here, before a
//! request is ever built.

use thiserror::Error;

use crate::domain::{
    MiddlewareConfig, ResourceLimits, ServerConfig, ServerConfigPatch, ServerSpec, ServerSpecPatch,
};

/// Image used when the spec does not name one
pub const DEFAULT_IMAGE: &str = "langconnect-mcp:latest";

/// Memory limit used when the spec does not set one
pub const DEFAULT_MEMORY_LIMIT: &str = "512m";

/// CPU limit (cores) used when the spec does not set one
pub const DEFAULT_CPU_LIMIT: f64 = 1.0;

#[derive(Debug, Clone, PartialEq, Error)]
pub enum ProjectionError {
    #[error("server name must not be empty")]
    EmptyName,

    #[error("invalid port {0}: expected 1-65535")]
    InvalidPort(u32),

    #[error("invalid cpu limit '{0}': expected a number of cores")]
    InvalidCpuLimit(String),

    #[error("unknown transport '{0}': expected stdio, sse or streamable_http")]
    UnknownTransport(String),
}

/// Project a user spec onto the wire configuration used by `create`
pub fn project_spec(spec: &ServerSpec) -> Result<ServerConfig, ProjectionError> {
    let name = validate_name(&spec.name)?;
    let port = spec.port.map(validate_port).transpose()?;
    let resources = spec.resources.clone().unwrap_or_default();

    Ok(ServerConfig {
        name,
        description: present(&spec.description).unwrap_or_default(),
        transport: spec.transport,
        port,
        environment: spec.env.clone().unwrap_or_default(),
        docker_image: present(&spec.image).unwrap_or_else(|| DEFAULT_IMAGE.to_string()),
        memory_limit: present(&resources.memory_limit)
            .unwrap_or_else(|| DEFAULT_MEMORY_LIMIT.to_string()),
        cpu_limit: present(&resources.cpu_limit)
            .as_deref()
            .map(parse_cpu_limit)
            .transpose()?
            .unwrap_or(DEFAULT_CPU_LIMIT),
        restart_policy: None,
        volumes: Vec::new(),
        labels: Default::default(),
        middleware_config: spec
            .middleware
            .clone()
            .map(MiddlewareConfig::enabled)
            .unwrap_or_default(),
        elicitation: spec.elicitation,
        auth_required: spec.auth_required,
    })
}

/// Project a partial spec onto the `PATCH` body; unset fields stay unset
pub fn project_patch(patch: &ServerSpecPatch) -> Result<ServerConfigPatch, ProjectionError> {
    let resources = patch.resources.clone().unwrap_or_default();

    Ok(ServerConfigPatch {
        name: patch.name.as_deref().map(validate_name).transpose()?,
        description: patch.description.clone(),
        transport: patch.transport,
        port: patch.port.map(validate_port).transpose()?,
        environment: patch.env.clone(),
        docker_image: present(&patch.image),
        memory_limit: present(&resources.memory_limit),
        cpu_limit: present(&resources.cpu_limit)
            .as_deref()
            .map(parse_cpu_limit)
            .transpose()?,
        middleware_config: patch.middleware.clone().map(MiddlewareConfig::enabled),
        elicitation: patch.elicitation,
        auth_required: patch.auth_required,
    })
}

/// Reverse projection for display and editing
pub fn spec_from_config(config: &ServerConfig) -> ServerSpec {
    ServerSpec {
        name: config.name.clone(),
        description: Some(config.description.clone()).filter(|d| !d.is_empty()),
        transport: config.transport,
        image: Some(config.docker_image.clone()),
        env: Some(config.environment.clone()).filter(|env| !env.is_empty()),
        port: config.port.map(u32::from),
        resources: Some(ResourceLimits {
            cpu_limit: Some(format_cpu_limit(config.cpu_limit)),
            memory_limit: Some(config.memory_limit.clone()),
        }),
        middleware: Some(config.middleware_config.enabled_middleware.clone())
            .filter(|names| !names.is_empty()),
        elicitation: config.elicitation,
        auth_required: config.auth_required,
    }
}

/// Parse a textual CPU limit; only unparsable or non-finite text is rejected
pub fn parse_cpu_limit(raw: &str) -> Result<f64, ProjectionError> {
    raw.trim()
        .parse::<f64>()
        .ok()
        .filter(|value| value.is_finite())
        .ok_or_else(|| ProjectionError::InvalidCpuLimit(raw.to_string()))
}

pub fn format_cpu_limit(value: f64) -> String {
    value.to_string()
}

/// Blank text counts as unset, so the default applies
fn present(value: &Option<String>) -> Option<String> {
    value.clone().filter(|text| !text.trim().is_empty())
}

fn validate_name(name: &str) -> Result<String, ProjectionError> {
    let trimmed = name.trim();
    if trimmed.is_empty() {
        return Err(ProjectionError::EmptyName);
    }
    Ok(trimmed.to_string())
}

fn validate_port(port: u32) -> Result<u16, ProjectionError> {
    u16::try_from(port)
        .ok()
        .filter(|p| *p > 0)
        .ok_or(ProjectionError::InvalidPort(port))
}
