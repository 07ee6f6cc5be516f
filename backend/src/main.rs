mod ethos_client;
mod models;
mod routes;
mod services;
mod state;
mod userkey;

use axum::{
    routing::{get, post},
    Router,
};
use state::AppState;
use tower_http::{cors::CorsLayer, services::ServeDir};

#[tokio::main]
async fn main() {
    tracing_subscriber::fmt::init();

    let state = AppState::new();

    // Warm the price cache right away, then poll on the fixed interval
    let price = state.price.clone();
    tokio::spawn(async move {
        price.update_price().await;
    });
    state.price.start_updates().await;

    let api_routes = Router::new()
        .route("/search-user", post(routes::search::search_user))
        .route(
            "/search-user-farcaster",
            post(routes::farcaster::search_farcaster_user),
        )
        .route(
            "/enhanced-profile/:userkey",
            get(routes::profile::enhanced_profile),
        )
        .route(
            "/exchange-rates",
            get(routes::exchange_rates::get_exchange_rates),
        )
        .route("/health", get(routes::health::health));

    let app = Router::new()
        .nest("/api", api_routes)
        .route(
            "/.well-known/farcaster.json",
            get(routes::manifest::farcaster_manifest),
        )
        .fallback_service(ServeDir::new("static"))
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = std::net::SocketAddr::from(([0, 0, 0, 0], 3000));
    tracing::info!("Server listening on {}", addr);

    let listener = tokio::net::TcpListener::bind(addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
