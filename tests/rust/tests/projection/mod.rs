//! Config projection tests

use std::collections::HashMap;

use mcpctl_core::projection::{DEFAULT_CPU_LIMIT, DEFAULT_IMAGE, DEFAULT_MEMORY_LIMIT};
use mcpctl_core::{
    project_patch, project_spec, spec_from_config, ProjectionError, ResourceLimits, ServerSpec,
    ServerSpecPatch, ServerTransport,
};
use pretty_assertions::assert_eq;
use serde_json::json;

// =============================================================================
// Spec -> wire
// =============================================================================

#[test]
fn test_resources_projected_to_numbers() {
    let spec = ServerSpec::new("svc", ServerTransport::Sse)
        .with_resources(ResourceLimits::new(Some("1.5"), Some("256m")));

    let config = project_spec(&spec).unwrap();

    assert_eq!(config.cpu_limit, 1.5);
    assert_eq!(config.memory_limit, "256m");
    assert_eq!(
        serde_json::to_value(&config).unwrap(),
        json!({
            "name": "svc",
            "description": "",
            "transport": "sse",
            "environment": {},
            "docker_image": DEFAULT_IMAGE,
            "memory_limit": "256m",
            "cpu_limit": 1.5,
            "middleware_config": {}
        })
    );
}

#[test]
fn test_non_numeric_cpu_limit_rejected() {
    let spec = ServerSpec::new("svc", ServerTransport::Sse)
        .with_resources(ResourceLimits::new(Some("abc"), Some("256m")));

    assert_eq!(
        project_spec(&spec),
        Err(ProjectionError::InvalidCpuLimit("abc".to_string()))
    );
}

#[test]
fn test_defaults_fill_missing_fields() {
    let config = project_spec(&ServerSpec::new("bare", ServerTransport::StreamableHttp)).unwrap();

    assert_eq!(config.docker_image, DEFAULT_IMAGE);
    assert_eq!(config.memory_limit, DEFAULT_MEMORY_LIMIT);
    assert_eq!(config.cpu_limit, DEFAULT_CPU_LIMIT);
    assert_eq!(config.description, "");
    assert!(config.environment.is_empty());
    assert!(config.middleware_config.is_empty());
}

#[test]
fn test_memory_only_keeps_default_cpu() {
    let spec = ServerSpec::new("svc", ServerTransport::Stdio)
        .with_resources(ResourceLimits::new(None, Some("2g")));

    let config = project_spec(&spec).unwrap();

    assert_eq!(config.cpu_limit, DEFAULT_CPU_LIMIT);
    assert_eq!(config.memory_limit, "2g");
}

#[test]
fn test_blank_text_falls_back_to_defaults() {
    let spec = ServerSpec::new("svc", ServerTransport::Stdio)
        .with_image("")
        .with_description("  ")
        .with_resources(ResourceLimits::new(Some(""), Some(" ")));

    let config = project_spec(&spec).unwrap();

    assert_eq!(config.docker_image, DEFAULT_IMAGE);
    assert_eq!(config.memory_limit, DEFAULT_MEMORY_LIMIT);
    assert_eq!(config.cpu_limit, DEFAULT_CPU_LIMIT);
    assert_eq!(config.description, "");
}

#[test]
fn test_zero_cpu_limit_is_a_number() {
    let spec = ServerSpec::new("svc", ServerTransport::Stdio)
        .with_resources(ResourceLimits::new(Some("0"), None));

    assert_eq!(project_spec(&spec).unwrap().cpu_limit, 0.0);
}

#[test]
fn test_full_spec_projection() {
    let spec = ServerSpec::new("search", ServerTransport::StreamableHttp)
        .with_description("Vector search")
        .with_image("registry.local/search:2")
        .with_env("API_KEY", "k")
        .with_port(8765)
        .with_middleware(vec!["auth".to_string(), "audit".to_string()]);

    let config = project_spec(&spec).unwrap();

    assert_eq!(config.description, "Vector search");
    assert_eq!(config.docker_image, "registry.local/search:2");
    assert_eq!(
        config.environment,
        HashMap::from([("API_KEY".to_string(), "k".to_string())])
    );
    assert_eq!(config.port, Some(8765));
    assert_eq!(
        serde_json::to_value(&config.middleware_config).unwrap(),
        json!({"enabled_middleware": ["auth", "audit"]})
    );
}

#[test]
fn test_deprecated_transport_still_valid() {
    assert!(ServerTransport::Sse.is_deprecated());
    assert_eq!("sse".parse::<ServerTransport>(), Ok(ServerTransport::Sse));
    assert_eq!(
        "websocket".parse::<ServerTransport>(),
        Err(ProjectionError::UnknownTransport("websocket".to_string()))
    );
}

// =============================================================================
// Patches and reverse projection
// =============================================================================

#[test]
fn test_patch_serializes_only_set_fields() {
    let patch = ServerSpecPatch {
        resources: Some(ResourceLimits::new(Some("0.5"), None)),
        middleware: Some(vec!["rate_limit".to_string()]),
        ..Default::default()
    };

    let wire = project_patch(&patch).unwrap();

    assert_eq!(
        serde_json::to_value(&wire).unwrap(),
        json!({
            "cpu_limit": 0.5,
            "middleware_config": {"enabled_middleware": ["rate_limit"]}
        })
    );
}

#[test]
fn test_patch_blank_fields_stay_unset() {
    let patch = ServerSpecPatch {
        image: Some(String::new()),
        resources: Some(ResourceLimits::new(Some(""), Some(""))),
        ..Default::default()
    };

    let wire = project_patch(&patch).unwrap();

    assert_eq!(serde_json::to_value(&wire).unwrap(), json!({}));
}

#[test]
fn test_patch_with_bad_cpu_rejected() {
    let patch = ServerSpecPatch {
        resources: Some(ResourceLimits::new(Some("two"), None)),
        ..Default::default()
    };
    assert!(matches!(
        project_patch(&patch),
        Err(ProjectionError::InvalidCpuLimit(_))
    ));
}

#[test]
fn test_reverse_projection_for_editing() {
    let spec = ServerSpec::new("svc", ServerTransport::Sse)
        .with_port(9000)
        .with_resources(ResourceLimits::new(Some("1.5"), Some("256m")));

    let edited = spec_from_config(&project_spec(&spec).unwrap());

    assert_eq!(edited.name, "svc");
    assert_eq!(edited.transport, ServerTransport::Sse);
    assert_eq!(edited.port, Some(9000));
    assert_eq!(edited.description, None);
    assert_eq!(edited.env, None);
    assert_eq!(edited.middleware, None);
    assert_eq!(edited.image.as_deref(), Some(DEFAULT_IMAGE));
    assert_eq!(
        edited.resources,
        Some(ResourceLimits::new(Some("1.5"), Some("256m")))
    );

    // Projecting the edited spec again yields the same wire config
    assert_eq!(project_spec(&edited), project_spec(&spec));
}
