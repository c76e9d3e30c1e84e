//! Documentation of a food ordering backend.
//!
//! Customers browse restaurants, fill a cart and place orders. Restaurant
//! accounts manage what they own, admins manage everything.
//!
//!
//!
//! # General Infrastructure
//! - `backend` binary serves the HTTP API on `0.0.0.0:$RUST_PORT`
//! - `store` crate owns the SQLite schema and every query
//! - `manage` binary applies migrations and creates admin accounts
//! - Secrets are read from `/run/secrets/<KEY>` first, then from the environment
//!
//!
//!
//! # Request Lifecycle
//!
//! - [`auth::Caller`] verifies the bearer token, 401 on any failure
//! - [`policy::authorize`] decides from role and resource owner
//! - [`utils::ValidatedJson`] parses and validates the body, 400 on any failure
//! - Handler opens one [`store::UnitOfWork`], commits once at the end
//! - Dropped without commit, nothing the handler wrote is kept
//!
//!
//!
//! # Notes
//!
//! ## Money
//! Prices and totals are exact decimals with two places, stored as integer
//! hundredths. JSON accepts numbers or strings and always answers with strings
//! such as `"12.50"`.
//!
//! ## Cart totals
//! `totalPrice` is cached on the cart row. Add, quantity change, remove and clear
//! each move it inside the same transaction, deletes of menu items and
//! restaurants subtract their cart lines before the cascade removes them.
//!
//! ## Orders
//! Line prices are snapshots and never follow later menu changes. The order
//! total is still checked against the lines it was placed with.
//!
//!
//!
//! # Setup
//!
//! Required configuration.
//! ```sh
//! export JWT_SECRET=change-me JWT_ISSUER=food JWT_AUDIENCE=food-clients
//! ```
//!
//! Start the server.
//! ```sh
//! RUST_LOG=info cargo run -p backend
//! ```
//!
//! Create the first admin.
//! ```sh
//! cargo run -p manage -- create-admin --name Admin --email admin@example.com --password secret1
//! ```
//!
//! View current docs.
//! ```sh
//! cargo doc --open
//! ```
use std::{sync::Arc, time::Duration};

use axum::{
    Router,
    http::{
        Method,
        header::{AUTHORIZATION, CONTENT_TYPE},
    },
    routing::{delete, get, post, put},
};
use signal::{
    ctrl_c,
    unix::{SignalKind, signal},
};
use tokio::{net::TcpListener, signal};
use tower_http::{cors::CorsLayer, trace::TraceLayer};
use tracing::{error, info};
use tracing_subscriber::{EnvFilter, fmt};

pub mod auth;
pub mod config;
pub mod database;
pub mod error;
pub mod password;
pub mod payloads;
pub mod policy;
pub mod routes;
pub mod state;
pub mod utils;

use config::Config;
use routes::{auth::*, cart::*, menu_items::*, orders::*, restaurants::*, users::*};
use state::AppState;

pub fn app(state: Arc<AppState>) -> Router {
    let cors = CorsLayer::new()
        .allow_methods([
            Method::GET,
            Method::POST,
            Method::PUT,
            Method::DELETE,
            Method::OPTIONS,
        ])
        .allow_headers([CONTENT_TYPE, AUTHORIZATION])
        .max_age(Duration::from_secs(60 * 60));

    Router::new()
        .route("/api/auth/register", post(register_handler))
        .route("/api/auth/login", post(login_handler))
        .route("/api/cart", get(get_cart_handler))
        .route("/api/cart/add", post(add_to_cart_handler))
        .route("/api/cart/update/{cart_item_id}", put(update_cart_item_handler))
        .route("/api/cart/remove/{cart_item_id}", delete(remove_cart_item_handler))
        .route("/api/cart/clear", delete(clear_cart_handler))
        .route(
            "/api/menuitem/restaurant/{restaurant_id}",
            get(list_menu_items_handler),
        )
        .route("/api/menuitem", post(add_menu_item_handler))
        .route(
            "/api/menuitem/{menu_item_id}",
            get(get_menu_item_handler)
                .put(update_menu_item_handler)
                .delete(delete_menu_item_handler),
        )
        .route("/api/order", post(place_order_handler))
        .route("/api/order/history", get(order_history_handler))
        .route("/api/order/user/{user_id}", get(user_orders_handler))
        .route(
            "/api/order/restaurant/{restaurant_id}",
            get(restaurant_orders_handler),
        )
        .route(
            "/api/order/{order_id}",
            get(get_order_handler)
                .put(update_order_status_handler)
                .delete(delete_order_handler),
        )
        .route(
            "/api/restaurant",
            get(list_restaurants_handler).post(add_restaurant_handler),
        )
        .route(
            "/api/restaurant/{restaurant_id}",
            get(get_restaurant_handler)
                .put(update_restaurant_handler)
                .delete(delete_restaurant_handler),
        )
        .route("/api/user/all", get(list_users_handler))
        .route(
            "/api/user/profile",
            get(profile_handler).put(update_profile_handler),
        )
        .route("/api/user/orders", get(own_orders_handler))
        .route("/api/user/my-restaurant", get(my_restaurant_handler))
        .route(
            "/api/user/{user_id}",
            get(get_user_handler).delete(delete_user_handler),
        )
        .layer(TraceLayer::new_for_http())
        .layer(cors)
        .with_state(state)
}

pub async fn start_server() -> anyhow::Result<()> {
    fmt().with_env_filter(EnvFilter::from_default_env()).init();

    info!("Loading config...");
    let config = Config::load().inspect_err(|e| error!("Configuration error: {e}"))?;

    info!("Initializing state...");
    let state = AppState::new(config).await?;

    info!("Starting server...");
    let address = format!("0.0.0.0:{}", state.config.port);
    let app = app(state);

    info!("Binding to {address}");
    let listener = TcpListener::bind(&address).await?;
    info!("Server running on {address}");

    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await?;

    info!("Server shut down");
    Ok(())
}

async fn shutdown_signal() {
    let ctrl_c = async {
        match ctrl_c().await {
            Ok(()) => info!("Received Ctrl+C, shutting down"),
            Err(e) => {
                error!("Failed to install Ctrl+C handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal(SignalKind::terminate()) {
            Ok(mut terminate) => {
                terminate.recv().await;
                info!("Received terminate signal, shutting down");
            }
            Err(e) => {
                error!("Failed to install signal handler: {e}");
                std::future::pending::<()>().await;
            }
        }
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {},
        _ = terminate => {},
    }
}
