// Copyright (c) 2025 Steve Wagner (ciroque@live.com)
// SPDX-License-Identifier: MIT

use std::env;
use std::time::Duration;

use anyhow::{bail, Context, Result};
use serde_json::json;
use tracing_subscriber::EnvFilter;

use stageflow::config::{load_and_validate_config, EngineConfig};
use stageflow::events::EventKind;
use stageflow::payload::NodeKind;
use stageflow::store::TransferPolicy;
use stageflow::{DataFlowEngine, EngineHandle};

/// Pipeline stages wired by the demo, in data-flow order
const STAGES: [(&str, NodeKind, &str); 5] = [
    ("geometry", NodeKind::Geometry, "Bracket Geometry"),
    ("mesh", NodeKind::Mesh, "Tetra Mesh"),
    ("solver", NodeKind::Computation, "Static Solver"),
    ("results", NodeKind::Results, "Solver Results"),
    ("viewer", NodeKind::Visualization, "Result Viewer"),
];

fn init_tracing() {
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new("stageflow=info")),
        )
        .init();
}

fn load_config(args: &[String]) -> Result<EngineConfig> {
    match args {
        [_] => Ok(EngineConfig::default()),
        [_, path] => load_and_validate_config(path)
            .with_context(|| format!("Failed to load engine config from '{}'", path)),
        _ => bail!(
            "Usage: {} [engine-config.yaml|engine-config.toml]",
            args.first().map(String::as_str).unwrap_or("stageflow")
        ),
    }
}

fn build_pipeline(engine: &mut DataFlowEngine) -> Result<()> {
    let mut previous: Option<&str> = None;
    for (id, kind, name) in STAGES {
        let dependencies = previous.map(|p| vec![p.to_string()]).unwrap_or_default();
        engine.create_node(id, kind, name, None, dependencies)?;
        if let Some(source) = previous {
            engine.create_connection(
                format!("{}_to_{}", source, id),
                source,
                id,
                TransferPolicy::default(),
                vec![],
            )?;
        }
        previous = Some(id);
    }
    Ok(())
}

#[tokio::main]
async fn main() -> Result<()> {
    init_tracing();

    let args: Vec<String> = env::args().collect();
    let config = load_config(&args)?;

    println!("🚀 Stageflow pipeline demo");
    println!("═══════════════════════════");
    println!("Mapping mode: {:?}", config.mapping_mode);
    println!("Version cap:  {}", config.max_versions_per_node);
    println!();

    let mut engine = DataFlowEngine::new(config)?;
    build_pipeline(&mut engine)?;
    engine.on(EventKind::TransferCompleted, |event| {
        let size = event
            .payload
            .as_ref()
            .and_then(|p| p.get("size"))
            .cloned()
            .unwrap_or_default();
        println!("  ✅ {} ({} bytes)", event.subject, size);
        Ok(())
    });
    engine.on(EventKind::Error, |event| {
        println!(
            "  ❌ {}: {}",
            event.subject,
            event.error.as_deref().unwrap_or("unknown error")
        );
        Ok(())
    });

    let handle = EngineHandle::new(engine);
    let scheduler = handle.spawn_scheduler();
    let cleanup = handle.spawn_cleanup();

    println!("Publishing geometry...");
    handle.lock().await.update_node_data(
        "geometry",
        json!({
            "nodes": [{"id": 1, "x": 0.0}, {"id": 2, "x": 1.0}, {"id": 3, "x": 0.5}],
            "elements": [{"id": 1, "nodes": [1, 2, 3]}],
            "materials": [{"name": "steel", "youngsModulus": 2.1e11}]
        }),
        Some("Imported bracket"),
    )?;

    // Let the background scheduler carry the update down the chain.
    while handle.lock().await.pending_cascades() > 0 {
        tokio::time::sleep(Duration::from_millis(5)).await;
    }

    handle.shutdown();
    scheduler.await?;
    cleanup.await?;

    let engine = handle.lock().await;
    println!();
    println!("📦 Stages:");
    for node in engine.nodes() {
        println!(
            "  {:<10} {:<16} {:?} ({} versions)",
            node.id,
            node.name,
            node.status,
            node.versions().len()
        );
    }

    println!();
    println!("📊 Metrics:");
    println!("{}", serde_json::to_string_pretty(&engine.performance_metrics())?);

    if let Some(viewer) = engine.node("viewer") {
        println!();
        println!("🖼️  Viewer payload:");
        println!("{}", serde_json::to_string_pretty(&viewer.data)?);
    }

    Ok(())
}
