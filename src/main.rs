//! Chapterhouse - 多书籍章节树编辑服务
//!
//! - Domain: book/, chapter/ 以及中文数字、标题递增、Markdown 导出
//! - Application: commands, queries, ports, 编辑会话
//! - Infrastructure: http, memory, worker, persistence, adapters, events

use std::sync::Arc;
use std::time::Duration;

use chapterhouse::application::SnapshotStorePort;
use chapterhouse::config::{load_config, print_config, AppConfig, SyncBackend};
use chapterhouse::domain::book::BookCatalog;
use chapterhouse::infrastructure::adapters::{HttpSnapshotStore, HttpSnapshotStoreConfig};
use chapterhouse::infrastructure::events::EventPublisher;
use chapterhouse::infrastructure::http::{AppState, BackgroundTask, HttpServer, ServerConfig};
use chapterhouse::infrastructure::memory::{InMemoryEditorSessionManager, InMemorySnapshotStore};
use chapterhouse::infrastructure::persistence::sqlite::{
    create_pool, run_migrations, DatabaseConfig, SqliteSnapshotRepository,
};
use chapterhouse::infrastructure::worker::{
    snapshot_sync_channel, SessionReaper, SessionReaperConfig, SnapshotSyncConfig,
};
use tokio::sync::{oneshot, watch};

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 加载配置（优先级：环境变量 > 配置文件 > 默认值）
    let config = load_config().map_err(|e| anyhow::anyhow!("Failed to load config: {}", e))?;

    init_tracing(&config);

    tracing::info!("Chapterhouse - 章节树编辑服务");
    print_config(&config);

    let snapshot_store = create_snapshot_store(&config).await?;

    // 事件发布器
    let event_publisher = Arc::new(EventPublisher::new());

    // 快照同步 Worker
    let sync_config = SnapshotSyncConfig {
        debounce: config.sync.debounce(),
        max_retries: config.sync.max_retries,
        queue_capacity: config.sync.queue_capacity,
    };
    let (sync_queue, sync_worker) =
        snapshot_sync_channel(sync_config, snapshot_store.clone(), event_publisher.clone());
    let (worker_shutdown_tx, worker_shutdown_rx) = oneshot::channel::<()>();
    let worker_handle = tokio::spawn(sync_worker.run(async {
        let _ = worker_shutdown_rx.await;
    }));

    // 编辑会话与空闲回收
    let session_manager = Arc::new(InMemoryEditorSessionManager::new());
    let (reaper_shutdown_tx, mut reaper_shutdown_rx) = watch::channel(false);
    let reaper = SessionReaper::new(
        SessionReaperConfig {
            idle_timeout_secs: config.session.idle_timeout_secs,
            interval: Duration::from_secs(config.session.reap_interval_secs),
        },
        session_manager.clone(),
        event_publisher.clone(),
    );
    let reaper_handle = tokio::spawn(reaper.run(async move {
        let _ = reaper_shutdown_rx.changed().await;
    }));

    // HTTP 服务器
    let state = Arc::new(AppState::new(
        session_manager,
        snapshot_store,
        Arc::new(sync_queue),
        Arc::new(BookCatalog::default()),
        event_publisher,
    ));
    let server_config = ServerConfig::new(&config.server.host, config.server.port);

    // 先停回收，再让同步 Worker 刷新剩余快照
    let server = HttpServer::new(server_config, state)
        .with_background_task(BackgroundTask::new(
            "session_reaper",
            move || {
                let _ = reaper_shutdown_tx.send(true);
            },
            reaper_handle,
        ))
        .with_background_task(BackgroundTask::new(
            "snapshot_sync",
            move || {
                let _ = worker_shutdown_tx.send(());
            },
            worker_handle,
        ));

    server
        .run_with_shutdown(async {
            if let Err(e) = tokio::signal::ctrl_c().await {
                tracing::error!(error = %e, "Failed to listen for ctrl-c");
            }
            tracing::info!("Received shutdown signal");
        })
        .await?;

    tracing::info!("Server shutdown complete");

    Ok(())
}

fn init_tracing(config: &AppConfig) {
    let log_filter = format!(
        "{},chapterhouse={},tower_http=debug",
        config.log.level, config.log.level
    );
    let env_filter = tracing_subscriber::EnvFilter::try_from_default_env()
        .unwrap_or_else(|_| tracing_subscriber::EnvFilter::new(&log_filter));

    if config.log.json {
        tracing_subscriber::fmt()
            .json()
            .with_env_filter(env_filter)
            .init();
    } else {
        tracing_subscriber::fmt().with_env_filter(env_filter).init();
    }
}

async fn create_snapshot_store(config: &AppConfig) -> anyhow::Result<Arc<dyn SnapshotStorePort>> {
    let store: Arc<dyn SnapshotStorePort> = match config.sync.backend {
        SyncBackend::Sqlite => {
            if let Some(parent) = std::path::Path::new(&config.database.path).parent() {
                tokio::fs::create_dir_all(parent).await?;
            }

            let db_config = DatabaseConfig {
                database_url: config.database.database_url(),
                max_connections: config.database.max_connections,
            };
            let pool = create_pool(&db_config).await?;
            run_migrations(&pool).await?;
            Arc::new(SqliteSnapshotRepository::new(pool))
        }
        SyncBackend::Http => {
            let base_url = config
                .sync
                .remote_url
                .clone()
                .ok_or_else(|| anyhow::anyhow!("sync.remote_url is not set"))?;
            let remote = HttpSnapshotStoreConfig::new(base_url).with_timeout(config.sync.timeout_secs);
            Arc::new(HttpSnapshotStore::new(remote)?)
        }
        SyncBackend::Memory => {
            tracing::warn!("Snapshots are kept in memory and lost on restart");
            Arc::new(InMemorySnapshotStore::new())
        }
    };
    Ok(store)
}
