//! Algoviz Visualization Server
//!
//! Serve stepwise algorithm visualizers over HTTP and WebSocket.

use algoviz_vis::{VisConfig, VisServer};
use std::env;
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "algoviz_vis=info,algoviz_engine=info,tower_http=info".into()),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    let mut config = VisConfig::from_env();
    if let Some(port) = env::args().nth(1).and_then(|s| s.parse().ok()) {
        config = config.with_port(port);
    }

    println!("Algoviz Visualizer");
    println!("==================");
    println!();
    println!("  Step delay: {} ms", config.engine.delay().as_millis());
    println!("  Timeline cap: {} steps", config.max_recorded_steps);
    println!();
    println!("Create a visualizer: POST http://{}/api/visualizers", config.addr);
    println!("Stream its steps:    ws://{}/ws/<id>", config.addr);
    println!();

    VisServer::new(config).serve().await?;

    Ok(())
}
