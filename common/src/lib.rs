pub mod config;
pub mod errors;
pub mod redis;
pub mod util;

/// 用户 ID（用户服务分配）
pub type UserId = i32;
/// 群组 ID（数据库自增分配）
pub type GroupId = i32;
