use std::net::SocketAddr;
use std::sync::Arc;

use anyhow::Result;
use dotenvy::dotenv;
use tokio::signal;
use tracing::{error, info, warn};

use mission_management::config::{database::DatabaseConfig, EnvironmentConfig, StoreBackend};
use mission_management::database::create_pool;
use mission_management::repositories::{MemoryStore, PgStore, Store};
use mission_management::{create_router, AppState};

#[tokio::main]
async fn main() -> Result<()> {
    // Cargar variables de entorno
    dotenv().ok();

    let config = EnvironmentConfig::from_env()?;

    // Configurar logging (los macros de `log` se redirigen a tracing)
    tracing_subscriber::fmt()
        .with_max_level(config.log_level)
        .init();

    info!("🧳 Mission Management API");
    info!("================================================");
    info!("🌍 Entorno: {}", config.environment);

    let store: Arc<dyn Store> = match config.store_backend {
        StoreBackend::Postgres => {
            let db_config = DatabaseConfig::from_env()?;
            let pool = match create_pool(&db_config).await {
                Ok(pool) => pool,
                Err(e) => {
                    error!("❌ Error conectando a la base de datos: {}", e);
                    return Err(anyhow::anyhow!("Error de base de datos: {}", e));
                }
            };
            Arc::new(PgStore::new(pool))
        }
        StoreBackend::Memory => {
            warn!("⚠️ Almacén en memoria: los datos se pierden al reiniciar");
            Arc::new(MemoryStore::new())
        }
    };

    let addr: SocketAddr = config.server_url().parse()?;
    let app = create_router(AppState::new(store, config));

    info!("🌐 Servidor iniciando en http://{}", addr);
    info!("🔍 Endpoints disponibles:");
    info!("   GET  /health");
    info!("   POST /api/login");
    info!("🧳 Missions: POST /api/missions, GET /api/missions/mine, GET /api/missions/dates, PUT /api/missions/return");
    info!("👔 Manager: GET /api/manager/pending-missions, PUT /api/manager/missions/:id/status");
    info!("💶 Finanzas: GET /api/financial/queue, GET /api/financial/mission-history, PUT /api/financial/missions/:id/status");
    info!("🚗 Vehículos: GET /api/vehicules/disponibles");
    info!("🗂️ Back-office: /api/backoffice/vehicules[/count], /api/backoffice/personnel[/count], PUT /api/backoffice/personnel/:id/profile");

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

/// Señal de apagado graceful
async fn shutdown_signal() {
    let ctrl_c = async {
        if let Err(e) = signal::ctrl_c().await {
            error!("❌ No se pudo escuchar Ctrl+C: {}", e);
            std::future::pending::<()>().await;
        }
    };

    #[cfg(unix)]
    let terminate = async {
        match signal::unix::signal(signal::unix::SignalKind::terminate()) {
            Ok(mut stream) => {
                stream.recv().await;
            }
            Err(e) => {
                error!("❌ No se pudo instalar el handler de SIGTERM: {}", e);
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
