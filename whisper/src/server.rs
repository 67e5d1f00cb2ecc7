use crate::config::Config;
use crate::error::Result;
use axum::Router;
use std::fs;
use std::sync::Arc;
use tracing::info;
use whisper_api::{names, Site, SiteBuilder};
use whisper_infra::{DatabaseManager, LocalPostStorage, MemoryCache, MemorySessionService, SeaOrmPostRepository};
use whisper_migration::{Migrator, MigratorTrait};
use whisper_plugin::PluginManager;
use whisper_web::{create_router, AppState};

/// 连接数据库、加载插件并冻结站点
pub async fn init_site(config: &Config) -> Result<Arc<Site>> {
    fs::create_dir_all(&config.site.instance_path)?;

    let db = DatabaseManager::connect(&config.database_url()).await?;
    Migrator::up(db.connection().as_ref(), None).await?;
    info!("Database migrated");

    let repository = Arc::new(SeaOrmPostRepository::new(db.connection()));
    let storage = Arc::new(LocalPostStorage::new(config.posts_path()));
    let mut builder = SiteBuilder::new(repository, storage, config.site.main.as_str());

    let mut plugins = PluginManager::new();
    plugins.load_all(&config.site.plugins, &config.plugins, &mut builder)?;
    info!("Loaded {} plugins", plugins.loaded().len());

    let site = Arc::new(builder.build()?);
    site.events().emit(names::CORE_LOADED)?;
    Ok(site)
}

/// 初始化应用状态并创建路由
pub async fn init_app(config: &Config) -> Result<Router> {
    let site = init_site(config).await?;
    let sessions = Arc::new(MemorySessionService::new(
        Arc::new(MemoryCache::default()),
        config.admin.session_ttl(),
        config.admin.trusted_session_ttl(),
    ));
    let state = AppState::new(site, sessions, config.admin.clone())?;
    Ok(create_router(state))
}
