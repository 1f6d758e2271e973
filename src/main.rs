use std::sync::{Arc, Mutex};

use axum::routing::{get, post, put};
use axum::Router;
use tower_http::cors::CorsLayer;
use tower_http::trace::TraceLayer;
use tracing_subscriber::EnvFilter;

use hirelink::config::AppConfig;
use hirelink::db;
use hirelink::handlers;
use hirelink::services::push::expo::ExpoPushProvider;
use hirelink::services::sms::twilio::TwilioSmsProvider;
use hirelink::state::AppState;

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    let _ = dotenvy::dotenv();

    tracing_subscriber::fmt()
        .with_env_filter(EnvFilter::try_from_default_env().unwrap_or_else(|_| "info".into()))
        .init();

    let config = AppConfig::from_env();

    let conn = db::init_db(&config.database_url)?;

    let sms = TwilioSmsProvider::new(
        config.twilio_account_sid.clone(),
        config.twilio_auth_token.clone(),
        config.twilio_phone_number.clone(),
    );
    if !sms.is_configured() {
        tracing::warn!("Twilio not configured, verification codes will only be logged");
    }
    let push = ExpoPushProvider::new(config.expo_access_token.clone());

    let state = Arc::new(AppState {
        db: Arc::new(Mutex::new(conn)),
        config: config.clone(),
        sms: Box::new(sms),
        push: Box::new(push),
    });

    let app = Router::new()
        .route("/health", get(handlers::health::health))
        .route("/auth/send-otp", post(handlers::auth::send_otp))
        .route("/auth/verify", post(handlers::auth::verify))
        .route("/auth/name", post(handlers::auth::set_name))
        .route("/auth/role", post(handlers::auth::set_role))
        .route("/auth/push-token", post(handlers::auth::set_push_token))
        .route("/auth/me/:id", get(handlers::auth::get_me))
        .route("/services", post(handlers::services::create_service))
        .route("/services", get(handlers::services::list_services))
        .route(
            "/services/worker/:worker_id",
            get(handlers::services::list_services_for_worker),
        )
        .route("/bookings", post(handlers::bookings::create_booking))
        .route("/bookings/:id", get(handlers::bookings::get_booking))
        .route(
            "/bookings/user/:id/:role",
            get(handlers::bookings::get_bookings_for_user),
        )
        .route(
            "/bookings/:id/respond",
            post(handlers::bookings::respond_to_booking),
        )
        .route(
            "/bookings/:id/complete",
            post(handlers::bookings::complete_booking),
        )
        .route(
            "/bookings/:id/chat",
            post(handlers::bookings::append_chat_message),
        )
        .route(
            "/bookings/:id/chat",
            get(handlers::bookings::get_chat_messages),
        )
        .route("/settings", get(handlers::settings::get_settings))
        .route("/settings", put(handlers::settings::update_settings))
        .layer(TraceLayer::new_for_http())
        .layer(CorsLayer::permissive())
        .with_state(state);

    let addr = format!("0.0.0.0:{}", config.port);
    tracing::info!("starting server on {addr}");

    let listener = tokio::net::TcpListener::bind(&addr).await?;
    axum::serve(listener, app).await?;

    Ok(())
}
