use crate::service::rpc::group_user_rpc_service_impl::GroupUserRpcServiceImpl;
use biz_service::biz_service::group_user_service::GroupUserService;
use biz_service::biz_service::mysql_group_store::MySqlGroupStore;
use biz_service::manager::background::BackgroundTasks;
use biz_service::protocol::group_user::stealth_i_m_group_user_server::StealthIMGroupUserServer;
use biz_service::rpc_client::user_client::UserDirectoryClient;
use common::config::AppConfig;
use common::errors::AppError;
use common::redis::redis_pool::build_redis_pool;
use common::redis::redis_template::RedisTemplate;
use log::{LevelFilter, info, warn};
use std::net::SocketAddr;
use std::str::FromStr;
use std::sync::Arc;

mod service;

const DEFAULT_CONFIG_FILE: &str = "group-user-config.toml";

#[tokio::main]
async fn main() -> anyhow::Result<()> {
    // 第一个参数可指定配置文件
    let config_file = std::env::args().nth(1).unwrap_or_else(|| DEFAULT_CONFIG_FILE.to_string());
    let app_cfg = AppConfig::load(&config_file)?;
    //初始化日志
    init_log(&app_cfg)?;

    let address_and_port = format!("{}:{}", app_cfg.get_server().host, app_cfg.get_server().port);
    let addr = SocketAddr::from_str(&address_and_port)?;

    let redis_pool = build_redis_pool(&app_cfg.get_redis())?;
    let database = app_cfg.get_database();
    let store = MySqlGroupStore::connect(&database).await?;
    if database.migrate {
        store.migrate().await?;
    }
    let directory = UserDirectoryClient::connect_lazy(&app_cfg.get_user().addr)?;

    let service = GroupUserService::new(
        Arc::new(store),
        Arc::new(RedisTemplate::new(redis_pool)),
        Arc::new(directory),
        BackgroundTasks::new(),
        app_cfg.get_security().password_salt,
    );

    warn!("Starting group user server on {}", address_and_port);
    tonic::transport::Server::builder()
        .add_service(StealthIMGroupUserServer::new(GroupUserRpcServiceImpl::new(service.clone())))
        .serve_with_shutdown(addr, shutdown_signal())
        .await?;

    info!("server stopped, waiting for background cache work");
    service.settle().await;
    Ok(())
}

async fn shutdown_signal() {
    if let Err(e) = tokio::signal::ctrl_c().await {
        warn!("listen for ctrl_c failed: {}", e);
        std::future::pending::<()>().await;
    }
    info!("shutdown signal received");
}

pub fn init_log(config: &AppConfig) -> Result<(), AppError> {
    let log_level = config.get_sys().log_level;
    let filter = LevelFilter::from_str(&log_level)
        .map_err(|e| AppError::Internal(format!("invalid log level {}: {}", log_level, e)))?;
    env_logger::Builder::new().filter(None, filter).init();
    Ok(())
}
