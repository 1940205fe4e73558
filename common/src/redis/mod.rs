use crate::errors::AppError;
use async_trait::async_trait;

pub mod redis_pool;
pub mod redis_template;

/// 键值缓存网关：按字符串键读写二进制值，不设置过期时间
#[async_trait]
pub trait CacheGateway: Send + Sync {
    /// 读取缓存值，键不存在时返回 `None`
    async fn get(&self, key: &str) -> Result<Option<Vec<u8>>, AppError>;

    /// 写入缓存值（永不过期）
    async fn set(&self, key: &str, value: Vec<u8>) -> Result<(), AppError>;

    /// 删除缓存键
    async fn delete(&self, key: &str) -> Result<(), AppError>;
}
