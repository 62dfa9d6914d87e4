use anyhow::Result;
use std::net::SocketAddr;
use tokio::signal;
use tracing::{error, info, warn};
use tracing_subscriber::EnvFilter;
use dotenvy::dotenv;

use geofence_monitoring::config::{DatabaseConfig, EnvironmentConfig};
use geofence_monitoring::routes::create_router;
use geofence_monitoring::services::AlertHub;
use geofence_monitoring::state::AppState;

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging
    tracing_subscriber::fmt()
        .with_env_filter(
            EnvFilter::try_from_default_env()
                .unwrap_or_else(|_| EnvFilter::new(config.log_level.clone())),
        )
        .init();

    info!("🛰️  Geofence Monitoring - Motor de alertas");
    info!("================================================");
    info!("⚙️  Entorno: {}", config.environment);
    if !config.is_development() && config.cors_origins.is_empty() {
        warn!("⚠️ CORS_ORIGINS vacío fuera de desarrollo: se acepta cualquier origen");
    }

    // Inicializar base de datos
    let db_config = DatabaseConfig::default();
    info!("🗄️  Conectando a {}", db_config.masked_url());
    let pool = match db_config.create_pool().await {
        Ok(pool) => {
            info!("✅ Base de datos conectada");
            pool
        }
        Err(e) => {
            error!("❌ Error conectando a la base de datos: {}", e);
            return Err(anyhow::anyhow!("Error de base de datos: {}", e));
        }
    };

    // Hub de alertas en vivo
    let (hub, hub_handle) = AlertHub::spawn(config.subscriber_queue_capacity);
    info!(
        "📡 Hub de alertas iniciado (cola por suscriptor: {})",
        config.subscriber_queue_capacity
    );

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::postgres(pool, config, hub));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health - Health check");
    info!("   POST /vehicles/location - Reportar posición de vehículo");
    info!("   GET  /ws/alerts - Stream de alertas (WebSocket)");

    let listener = tokio::net::TcpListener::bind(addr).await?;
    if let Err(e) = axum::serve(listener, app)
        .with_graceful_shutdown(shutdown_signal())
        .await
    {
        error!("❌ Servidor terminó con error: {}", e);
    }

    hub_handle.abort();
    info!("👋 Servidor terminado");
    Ok(())
}

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            warn!("⚠️ No se pudo instalar el handler de Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut sigterm) => {
                sigterm.recv().await;
            }
            Err(e) => {
                warn!("⚠️ No se pudo instalar el handler de SIGTERM: {}", e);
                std::future::pending::<()>().await;
            }
        }
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
