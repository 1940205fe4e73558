use deadpool_redis::redis::RedisError;
use deadpool_redis::{CreatePoolError, PoolError};
use thiserror::Error;

/// 基础设施错误类型（缓存、数据库、RPC、配置）
#[derive(Debug, Error)]
pub enum AppError {
    #[error("Redis pool error: {0}")]
    RedisPoolError(#[from] PoolError),
    #[error("Redis pool create error: {0}")]
    RedisCreatePool(#[from] CreatePoolError),
    #[error("Redis error: {0}")]
    Redis(#[from] RedisError),

    #[error("Database error: {0}")]
    Database(#[from] sqlx::Error),
    #[error("Database migrate error: {0}")]
    Migrate(#[from] sqlx::migrate::MigrateError),

    #[error("rpc status: {0}")]
    Rpc(#[from] tonic::Status),
    #[error("rpc transport: {0}")]
    Transport(#[from] tonic::transport::Error),

    #[error("config error: {0}")]
    Config(#[from] config::ConfigError),

    #[error("Conversion error: {0}")]
    ConversionError(String),
    #[error("Internal server error: {0}")]
    Internal(String),
}
