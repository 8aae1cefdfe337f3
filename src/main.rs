#![allow(dead_code)]

mod db;
mod geometry;
mod map;
mod message;
mod nav;
mod positioning;
mod routes;
mod services;
mod state;

use std::sync::Arc;

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let port: u16 = std::env::var("PORT")
        .unwrap_or_else(|_| "8080".into())
        .parse()
        .expect("invalid PORT");

    // Reference data is validated up front: a broken beacon table must
    // stop the process, not produce silently wrong positions.
    let registry = map::MapRegistry::from_seed_data().expect("beacon reference data invalid");
    tracing::info!(beacons = registry.beacon_count(), "map registry loaded");

    let graph = nav::RouteGraph::building_graph();
    tracing::info!(nodes = graph.node_count(), "route graph built");

    // The location-log sink is optional: positioning must keep working
    // when the database is missing or down.
    let log_tx = match std::env::var("DATABASE_URL") {
        Ok(url) => match db::init_pool(&url).await {
            Ok(pool) => Some(services::location_log::spawn_log_worker(pool)),
            Err(e) => {
                tracing::warn!(error = %e, "database unavailable — location logging disabled");
                None
            }
        },
        Err(_) => {
            tracing::warn!("DATABASE_URL not set — location logging disabled");
            None
        }
    };

    let state = state::AppState::new(Arc::new(registry), Arc::new(graph), log_tx);

    let app = routes::app(state);
    let listener = tokio::net::TcpListener::bind(format!("0.0.0.0:{port}"))
        .await
        .expect("failed to bind");

    tracing::info!(%port, "wayfinder listening");
    axum::serve(listener, app).await.expect("server failed");
}
