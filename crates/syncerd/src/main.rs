//! syncerd: anti-entropy peer state daemon.

use std::sync::Arc;

use anyhow::{Context, Result};
use clap::Parser;
use tokio::net::TcpListener;

use syncer_api::ApiState;
use syncer_services::{
    new_registry, AntiEntropyScheduler, HttpTransport, MembershipSource, PeerDiscovery,
};

mod cli;

#[tokio::main]
async fn main() -> Result<()> {
    tracing_subscriber::fmt()
        .with_env_filter(tracing_subscriber::EnvFilter::from_default_env())
        .init();

    let cli = cli::Cli::parse();
    let config = cli.resolve()?;
    let port = config.node.port;
    tracing::info!(port, "syncerd starting");

    let registry = new_registry(port);

    // Bind first: peers probing us during their own discovery must get an answer.
    let bind = format!("{}:{}", config.node.bind_addr, port);
    let listener = TcpListener::bind(&bind)
        .await
        .with_context(|| format!("failed to bind {bind}"))?;

    // ── Shutdown channel ─────────────────────────────────────────────────────
    let (shutdown_tx, mut shutdown_rx) = tokio::sync::broadcast::channel::<()>(1);

    {
        let shutdown = shutdown_tx.clone();
        tokio::spawn(async move {
            tokio::signal::ctrl_c().await.ok();
            tracing::info!("shutdown signal received");
            let _ = shutdown.send(());
        });
    }

    // ── Sync endpoint ────────────────────────────────────────────────────────
    let state = ApiState::new(registry.clone(), config.api.max_inbound);
    let server_task = tokio::spawn(syncer_api::serve(state, listener, shutdown_tx.subscribe()));

    // ── Discovery ────────────────────────────────────────────────────────────
    let membership: Box<dyn MembershipSource> = (&config.discovery.membership).into();
    let probe_transport = Arc::new(
        HttpTransport::new(port, &config.node.peer_host, config.discovery.probe_timeout())
            .context("failed to build probe client")?,
    );
    let report = PeerDiscovery::new(config.discovery.max_in_flight)
        .discover(
            probe_transport,
            membership.candidates(),
            port,
            registry.snapshot().await,
        )
        .await;
    let seeded = registry.seed(report.reachable.iter().copied()).await;
    tracing::info!(
        peers = ?report.reachable,
        seeded,
        max_in_flight = report.max_observed_in_flight,
        "registry seeded"
    );

    // ── Anti-entropy loop ────────────────────────────────────────────────────
    let sync_transport = Arc::new(
        HttpTransport::new(port, &config.node.peer_host, config.sync.request_timeout())
            .context("failed to build sync client")?,
    );
    let scheduler_task = tokio::spawn(
        AntiEntropyScheduler::new(
            registry.clone(),
            sync_transport,
            config.sync.interval(),
            shutdown_tx.subscribe(),
        )
        .run(),
    );

    // ── Wait for exit ────────────────────────────────────────────────────────
    tokio::select! {
        _ = shutdown_rx.recv() => tracing::info!("shutting down"),
        r = server_task        => tracing::error!("sync endpoint exited: {:?}", r),
        r = scheduler_task     => tracing::error!("scheduler exited: {:?}", r),
    }

    Ok(())
}
