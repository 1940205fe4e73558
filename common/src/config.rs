use crate::errors::AppError;
use config::Config;
use serde::Deserialize;

#[derive(Debug, Deserialize, Clone, Default)]
pub struct AppConfig {
    pub server: Option<ServerConfig>,
    pub redis: Option<RedisConfig>,
    pub database: Option<DatabaseConfig>,
    pub user: Option<UserServiceConfig>,
    pub security: Option<SecurityConfig>,
    pub sys: Option<SysConfig>,
}

impl AppConfig {
    /// 读取配置文件，并用 `APP_` 前缀的环境变量覆盖（层级分隔符 `__`）
    pub fn load(file: &str) -> Result<Self, AppError> {
        let config = Config::builder()
            .add_source(config::File::with_name(file).required(true))
            .add_source(config::Environment::with_prefix("APP").separator("__"))
            .build()?;
        Ok(config.try_deserialize::<AppConfig>()?)
    }

    pub fn get_server(&self) -> ServerConfig {
        self.server.clone().unwrap_or_default()
    }
    pub fn get_redis(&self) -> RedisConfig {
        self.redis.clone().unwrap_or_default()
    }
    pub fn get_database(&self) -> DatabaseConfig {
        self.database.clone().unwrap_or_default()
    }
    pub fn get_user(&self) -> UserServiceConfig {
        self.user.clone().unwrap_or_default()
    }
    pub fn get_security(&self) -> SecurityConfig {
        self.security.clone().unwrap_or_default()
    }
    pub fn get_sys(&self) -> SysConfig {
        self.sys.clone().unwrap_or_default()
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct ServerConfig {
    pub host: String,
    pub port: u16,
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self { host: "0.0.0.0".to_string(), port: 50058 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct RedisConfig {
    pub url: String,
    /// 逻辑库编号
    #[serde(default)]
    pub db: u8,
}

impl Default for RedisConfig {
    fn default() -> Self {
        Self { url: "redis://127.0.0.1:6379".to_string(), db: 0 }
    }
}

#[derive(Debug, Deserialize, Clone)]
pub struct DatabaseConfig {
    pub url: String,
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
    /// 启动时执行内嵌迁移
    #[serde(default)]
    pub migrate: bool,
}

fn default_max_connections() -> u32 {
    16
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            url: "mysql://root@127.0.0.1:3306/groups".to_string(),
            max_connections: default_max_connections(),
            migrate: false,
        }
    }
}

/// 用户服务（用户名 <-> uid 查询）
#[derive(Debug, Deserialize, Clone)]
pub struct UserServiceConfig {
    pub addr: String,
}

impl Default for UserServiceConfig {
    fn default() -> Self {
        Self { addr: "http://127.0.0.1:50055".to_string() }
    }
}

#[derive(Debug, Deserialize, Clone, Default)]
pub struct SecurityConfig {
    /// 群密码哈希盐
    #[serde(default)]
    pub password_salt: String,
}

#[derive(Debug, Deserialize, Clone)]
pub struct SysConfig {
    //全局日志级别
    pub log_level: String,
}

impl Default for SysConfig {
    fn default() -> Self {
        Self { log_level: "info".to_string() }
    }
}
