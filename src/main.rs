use std::sync::Arc;
use tokio::sync::RwLock;
use toolshed_lending_admin::{
    adapters::http::HttpBackendGateway,
    api::{create_router, handlers::AppState},
    application::loan::{LoanStore, ServiceDependencies, refresh_loans},
};
use tracing_subscriber::{layer::SubscriberExt, util::SubscriberInitExt};

#[tokio::main]
async fn main() {
    // Initialize tracing
    tracing_subscriber::registry()
        .with(
            tracing_subscriber::EnvFilter::try_from_default_env().unwrap_or_else(|_| {
                "toolshed_lending_admin=debug,tower_http=debug,axum=trace".into()
            }),
        )
        .with(tracing_subscriber::fmt::layer())
        .init();

    // Backend base URL (the remote service owning items/users/loans)
    let backend_url = std::env::var("BACKEND_URL")
        .unwrap_or_else(|_| "https://en-w-backend.onrender.com".into());

    tracing::info!("Backend URL: {}", backend_url);

    // Initialize adapters
    let gateway = Arc::new(HttpBackendGateway::new(backend_url));
    let store = Arc::new(RwLock::new(LoanStore::new()));

    // Create service dependencies
    let service_deps = ServiceDependencies { store, gateway };

    // Initial snapshot load; failures degrade to an empty view plus a notice
    let outcome = refresh_loans(&service_deps).await;
    tracing::info!(
        "Initial loan snapshot: {} loaded, {} notice(s)",
        outcome.loaded,
        outcome.notices.len()
    );

    // Create application state
    let app_state = Arc::new(AppState { service_deps });

    // Create router
    let app = create_router(app_state);

    // Server configuration
    let port = std::env::var("PORT").unwrap_or_else(|_| "3000".into());
    let addr = format!("0.0.0.0:{}", port);
    let listener = tokio::net::TcpListener::bind(&addr)
        .await
        .expect("Failed to bind to address");

    tracing::info!("Server listening on {}", addr);

    // Start server
    axum::serve(listener, app)
        .await
        .expect("Failed to start server");
}
