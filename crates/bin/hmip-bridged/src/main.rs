//! # hmip-bridged — Homematic IP to MQTT bridge daemon
//!
//! Composition root that wires the automation session and the MQTT bus
//! together and runs the session supervisor.
//!
//! ## Responsibilities
//! - Parse configuration (env vars, config file)
//! - Initialize logging
//! - Open the automation session
//! - Connect to the broker (fatal on failure)
//! - Run the supervisor until SIGINT/SIGTERM
//!
//! ## Dependency rule
//! This is the **only** crate that depends on all other crates.
//! It is the wiring layer — no domain logic belongs here.

mod config;

use std::sync::Arc;
use std::time::Duration;

use hmip_bridge_adapter_virtual::VirtualSession;
use hmip_bridge_app::services::publisher::OutboundPublisher;
use hmip_bridge_app::supervisor::SessionSupervisor;
use tokio::sync::mpsc;
use tracing_subscriber::EnvFilter;

use crate::config::Config;

const INBOUND_CAPACITY: usize = 64;
const STATUS_CAPACITY: usize = 8;
const DISCONNECT_GRACE: Duration = Duration::from_secs(2);

#[tokio::main]
async fn main() -> Result<(), Box<dyn std::error::Error>> {
    let config = Config::load()?;
    init_tracing(&config);

    tracing::info!(
        access_point = config.session.access_point.as_deref().unwrap_or_default(),
        broker = %config.mqtt.host,
        port = config.mqtt.port,
        dry_run = config.bridge.no_publish,
        "starting hmip-bridged"
    );

    // Session
    let session = match &config.session.fixture {
        Some(path) => VirtualSession::from_file(path)?,
        None => VirtualSession::demo()?,
    };
    let session = Arc::new(session);

    // Bus
    let (bus, mut connection) = hmip_bridge_adapter_mqtt::connect(&config.mqtt);
    connection.wait_connected().await?;

    let (inbound_tx, inbound_rx) = mpsc::channel(INBOUND_CAPACITY);
    let (status_tx, status_rx) = mpsc::channel(STATUS_CAPACITY);
    let connection_task = tokio::spawn(connection.run(inbound_tx, status_tx));

    // Supervisor
    let publisher = OutboundPublisher::new(config.bridge.no_publish);
    let mut supervisor = SessionSupervisor::new(session, publisher, config.supervisor());
    supervisor.attach_bus(bus.clone());
    supervisor
        .run(inbound_rx, status_rx, shutdown_signal())
        .await;

    match bus.disconnect().await {
        Ok(()) => {
            if tokio::time::timeout(DISCONNECT_GRACE, connection_task)
                .await
                .is_err()
            {
                tracing::warn!("broker disconnect not flushed in time");
            }
        }
        Err(err) => tracing::warn!(error = %err, "failed to disconnect from broker"),
    }
    tracing::info!("hmip-bridged stopped");
    Ok(())
}

fn init_tracing(config: &Config) {
    let filter = EnvFilter::try_new(config.log_filter()).unwrap_or_else(|err| {
        eprintln!("invalid log filter {:?}: {err}", config.log_filter());
        EnvFilter::new("info")
    });
    tracing_subscriber::fmt().with_env_filter(filter).init();
}

async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(err) = tokio::signal::ctrl_c().await {
            tracing::error!(error = %err, "failed to listen for ctrl-c");
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match tokio::signal::unix::signal(tokio::signal::unix::SignalKind::terminate()) {
            Ok(mut signal) => {
                signal.recv().await;
            }
            Err(err) => {
                tracing::error!(error = %err, "failed to listen for SIGTERM");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        () = ctrl_c => {}
        () = terminate => {}
    }
    tracing::info!("shutdown signal received");
}
