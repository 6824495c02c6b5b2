use anyhow::Result;
use axum::{response::Json, routing::get, Router};
use dotenvy::dotenv;
use serde_json::json;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info};

use cab_booking::config::environment::EnvironmentConfig;
use cab_booking::database::DatabaseConnection;
use cab_booking::middleware::{self, cors::{cors_middleware, cors_middleware_with_origins}};
use cab_booking::routes;
use cab_booking::state::AppState;
use tower_http::trace::TraceLayer;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    // Configurar logging
    tracing_subscriber::fmt()
        .with_max_level(tracing::Level::DEBUG)
        .init();

    info!("🚕 Cab Booking - Backend de administración");
    info!("==========================================");

    // Inicializar base de datos
    let db_connection = match DatabaseConnection::new_default().await {
        Ok(conn) => conn,
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    let pool = db_connection.pool().clone();
    let config = EnvironmentConfig::default();
    let bind_addr = format!("{}:{}", config.host, config.port);

    let app_state = AppState::new(pool, config);

    // Rutas protegidas por autenticación JWT
    let protected = Router::new()
        .nest("/booking", routes::booking_routes::create_booking_router())
        .nest("/vehicle", routes::vehicle_routes::create_vehicle_router())
        .nest(
            "/transaction",
            routes::transaction_routes::create_transaction_router(),
        )
        .layer(axum::middleware::from_fn_with_state(
            app_state.clone(),
            middleware::auth::auth_middleware,
        ));

    let cors = if app_state.config.is_production() {
        cors_middleware_with_origins(app_state.config.cors_origins.clone())
    } else {
        cors_middleware()
    };

    let app = Router::new()
        .route("/health", get(health_check))
        .merge(protected)
        .layer(cors)
        .layer(TraceLayer::new_for_http())
        .with_state(app_state);

    let addr: SocketAddr = bind_addr.parse()?;

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("📆 Endpoints - Booking:");
    info!("   POST /booking/create - Crear reserva");
    info!("   GET  /booking/ - Listar reservas (filtros + paginación)");
    info!("   GET  /booking/:id - Detalle de reserva");
    info!("   PUT  /booking/:id/status - Transición de estado");
    info!("   GET  /booking/realtime-fare-calculation - Cotización de tarifa");
    info!("🚗 Endpoints - Vehicle:");
    info!("   POST /vehicle - Crear vehículo");
    info!("   GET  /vehicle - Listar vehículos");
    info!("   GET  /vehicle/:id - Obtener vehículo");
    info!("   PUT  /vehicle/:id - Actualizar vehículo");
    info!("   PUT  /vehicle/:id/fare-rule - Guardar regla tarifaria");
    info!("   DELETE /vehicle/:id - Eliminar vehículo");
    info!("💳 Endpoints - Transaction:");
    info!("   POST /transaction/:booking_id - Registrar pago");
    info!("   GET  /transaction/:booking_id - Pagos de una reserva");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
        .map_err(|e| {
            error!("❌ Error del servidor: {}", e);
            e
        })?;

    info!("👋 Servidor terminado");
    Ok(())
}

/// Health check sin autenticación
async fn health_check() -> Json<serde_json::Value> {
    Json(json!({
        "service": "cab-booking",
        "status": "healthy",
        "timestamp": chrono::Utc::now().to_rfc3339(),
    }))
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        signal::ctrl_c()
            .await
            .expect("failed to install Ctrl+C handler");
    };

    #[cfg(unix)]
    let terminate = async {
        signal::unix::signal(signal::unix::SignalKind::terminate())
            .expect("failed to install signal handler")
            .recv()
            .await;
    };

    #[cfg(not(unix))]
    let terminate = std::future::pending::<()>();

    tokio::select! {
        _ = ctrl_c => {
            info!("🛑 Señal Ctrl+C recibida, apagando servidor...");
        },
        _ = terminate => {
            info!("🛑 Señal de terminación recibida, apagando servidor...");
        },
    }
}
