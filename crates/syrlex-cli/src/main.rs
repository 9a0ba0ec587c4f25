//! syrlex2mqtt - bridges SyrConnect water softeners to MQTT.
//!
//! The appliance polls our HTTP(S) listeners; Home Assistant talks to us
//! over the broker. Both streams feed the shared [`BridgeService`].

mod config;

use std::net::SocketAddr;
use std::sync::Arc;
use std::time::Duration;

use anyhow::{Context, Result};
use axum_server::tls_rustls::RustlsConfig;
use clap::Parser;
use rumqttc::{AsyncClient, Event, LastWill, MqttOptions, Packet, QoS};
use tracing::{info, warn};
use tracing_subscriber::EnvFilter;

use syrlex_bridge::{http, topics, BridgeConfig, BridgeService, RumqttcPublisher};

use crate::config::Settings;

const MQTT_CLIENT_ID: &str = "syrlex2mqtt";

/// SyrConnect to MQTT bridge.
#[derive(Parser, Debug)]
#[command(name = "syrlex2mqtt")]
#[command(author, version, about, long_about = None)]
struct Args {
    /// Verbose output (debug-level logging).
    #[arg(short, long)]
    verbose: bool,
}

#[tokio::main]
async fn main() -> Result<()> {
    let args = Args::parse();

    let default_level = if args.verbose { "debug" } else { "info" };
    let filter =
        EnvFilter::try_from_default_env().unwrap_or_else(|_| EnvFilter::new(default_level));
    tracing_subscriber::fmt().with_env_filter(filter).init();

    // Fatal before any network activity.
    let settings = Settings::from_env()?;

    let bridge_config = BridgeConfig {
        extra_sensors: settings.extra_sensors.clone(),
        ..BridgeConfig::default()
    };
    let namespace = bridge_config.namespace.clone();

    let mut options = MqttOptions::new(
        MQTT_CLIENT_ID,
        &settings.broker_host,
        settings.broker_port,
    );
    options.set_keep_alive(Duration::from_secs(60));
    options.set_last_will(LastWill::new(
        topics::bridge_state(&namespace),
        "offline",
        QoS::AtLeastOnce,
        true,
    ));
    if let (Some(user), Some(pass)) = (&settings.username, &settings.password) {
        options.set_credentials(user, pass);
    }
    let (client, eventloop) = AsyncClient::new(options, 10);

    let service = Arc::new(BridgeService::new(
        bridge_config,
        Arc::new(RumqttcPublisher::new(client.clone())),
    ));

    spawn_broker_loop(eventloop, client, service.clone(), namespace);

    let app = http::router(service);

    if let Some(tls) = settings.tls.clone() {
        let https_addr = SocketAddr::from(([0, 0, 0, 0], settings.https_port));
        let rustls_config = RustlsConfig::from_pem_file(&tls.cert_file, &tls.key_file)
            .await
            .with_context(|| format!("loading TLS pair {:?} / {:?}", tls.cert_file, tls.key_file))?;
        let https_app = app.clone();
        tokio::spawn(async move {
            info!("HTTPS listener on {https_addr}");
            if let Err(e) = axum_server::bind_rustls(https_addr, rustls_config)
                .serve(https_app.into_make_service())
                .await
            {
                warn!("HTTPS listener stopped: {e}");
            }
        });
    }

    let http_addr = SocketAddr::from(([0, 0, 0, 0], settings.http_port));
    info!("HTTP listener on {http_addr}");
    let listener = tokio::net::TcpListener::bind(http_addr)
        .await
        .with_context(|| format!("binding {http_addr}"))?;
    axum::serve(listener, app).await.context("HTTP listener")?;
    Ok(())
}

/// Drive the broker connection: resubscribe and re-announce on every
/// connect, feed inbound publishes to the bridge, back off on errors.
fn spawn_broker_loop(
    mut eventloop: rumqttc::EventLoop,
    client: AsyncClient,
    service: Arc<BridgeService>,
    namespace: String,
) {
    tokio::spawn(async move {
        loop {
            match eventloop.poll().await {
                Ok(Event::Incoming(Packet::ConnAck(_))) => {
                    info!("connected to broker");
                    for topic in [
                        topics::command_subscription(&namespace),
                        topics::HUB_STATUS.to_string(),
                    ] {
                        if let Err(e) = client.subscribe(&topic, QoS::AtLeastOnce).await {
                            warn!("subscribe to {topic} failed: {e}");
                        }
                    }
                    if let Err(e) = service.announce_bridge_online().await {
                        warn!("bridge availability publish failed: {e}");
                    }
                }
                Ok(Event::Incoming(Packet::Publish(publish))) => {
                    service
                        .handle_broker_message(&publish.topic, &publish.payload)
                        .await;
                }
                Ok(_) => {}
                Err(e) => {
                    warn!("broker connection error, retrying: {e}");
                    tokio::time::sleep(Duration::from_secs(1)).await;
                }
            }
        }
    });
}
