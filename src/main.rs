use axum::{
    routing::{get, post},
    Router,
};
use std::sync::Arc;
use tokio::sync::broadcast;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;

mod config;
mod db;
mod error;
mod handlers;
mod models;
mod services;
mod store;
#[cfg(test)]
mod test_support;

use config::Config;
use services::notifications::Notifier;
use store::LogStore;

#[derive(Clone)]
pub struct AppState {
    pub store: LogStore,
    pub config: Arc<Config>,
    pub notifier: Notifier,
}

#[tokio::main]
async fn main() {
    dotenvy::dotenv().ok();

    // Initialize tracing
    tracing_subscriber::fmt()
        .with_env_filter(
            tracing_subscriber::EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| "pulsecoach_api=debug,tower_http=debug".into()),
        )
        .json()
        .init();

    let config = Arc::new(Config::from_env());

    // Database (schema is managed outside this service)
    let db = db::create_pool(&config.database_url, config.db_max_connections).await;

    // Fan-out channel for fire-and-forget notifications; delivery
    // transports subscribe on their side.
    let (notify_tx, _) = broadcast::channel::<String>(256);

    let state = AppState {
        store: LogStore::new(db),
        config: config.clone(),
        notifier: Notifier::new(notify_tx),
    };

    let api_routes = Router::new()
        // Daily logs (the award event source)
        .route(
            "/api/users/:user_id/daily-logs",
            post(handlers::daily_logs::upsert_daily_log).get(handlers::daily_logs::list_daily_logs),
        )
        // Exercise logs
        .route(
            "/api/users/:user_id/exercise-logs",
            post(handlers::exercise_logs::create_exercise_log)
                .get(handlers::exercise_logs::list_exercise_logs),
        )
        // Points & leaderboard
        .route(
            "/api/users/:user_id/points",
            get(handlers::points::get_points_summary),
        )
        .route(
            "/api/users/:user_id/points/milestones",
            post(handlers::points::award_milestone),
        )
        .route(
            "/api/users/:user_id/points/welcome-bonus",
            post(handlers::points::award_welcome_bonus),
        )
        .route("/api/leaderboard", get(handlers::points::get_leaderboard))
        // Coaching phase
        .route(
            "/api/users/:user_id/phase/evaluation",
            get(handlers::phases::evaluate_phase),
        )
        .route(
            "/api/users/:user_id/phase/transition",
            post(handlers::phases::execute_phase),
        )
        // Workout analytics
        .route(
            "/api/users/:user_id/analytics/workouts",
            get(handlers::analytics::get_workout_analytics),
        )
        // Profile
        .route(
            "/api/users/:user_id/profile",
            get(handlers::profile::get_profile).put(handlers::profile::update_profile),
        );

    let allowed_origins: Vec<axum::http::HeaderValue> = {
        let mut origins = vec![config
            .frontend_url
            .parse::<axum::http::HeaderValue>()
            .unwrap()];
        // In dev, also allow LAN access (e.g. testing from another device)
        if let Ok(extra) = std::env::var("CORS_EXTRA_ORIGINS") {
            for o in extra.split(',') {
                if let Ok(hv) = o.trim().parse::<axum::http::HeaderValue>() {
                    origins.push(hv);
                }
            }
        }
        origins
    };
    let cors = CorsLayer::new()
        .allow_origin(allowed_origins)
        .allow_methods([
            axum::http::Method::GET,
            axum::http::Method::POST,
            axum::http::Method::PUT,
            axum::http::Method::OPTIONS,
        ])
        .allow_headers([
            axum::http::header::AUTHORIZATION,
            axum::http::header::CONTENT_TYPE,
            axum::http::header::ACCEPT,
        ])
        .allow_credentials(true);

    let app = Router::new()
        .route("/health", get(handlers::health::health_check))
        .route("/readyz", get(handlers::health::readyz))
        .merge(api_routes)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(state);

    let addr = config.listen_addr();
    tracing::info!("Starting server on {}", addr);

    let listener = tokio::net::TcpListener::bind(&addr).await.unwrap();
    axum::serve(listener, app).await.unwrap();
}
