use crate::config::RedisConfig;
use crate::errors::AppError;
use deadpool_redis::{Config, Pool, Runtime};
use log::info;

/// 根据配置创建 Redis 连接池（逻辑库编号拼接在 URL 路径上）
pub fn build_redis_pool(cfg: &RedisConfig) -> Result<Pool, AppError> {
    let pool = Config::from_url(redis_url(cfg)).create_pool(Some(Runtime::Tokio1))?;
    info!("redis pool created, db={}", cfg.db);
    Ok(pool)
}

fn redis_url(cfg: &RedisConfig) -> String {
    format!("{}/{}", cfg.url.trim_end_matches('/'), cfg.db)
}
