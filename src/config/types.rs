//! Configuration Types
//!
//! 定义所有配置结构体

use serde::Deserialize;
use std::time::Duration;

/// 应用主配置
#[derive(Debug, Clone, Default, Deserialize)]
pub struct AppConfig {
    /// 服务器配置
    #[serde(default)]
    pub server: ServerConfig,

    /// 数据库配置
    #[serde(default)]
    pub database: DatabaseConfig,

    /// 快照同步配置
    #[serde(default)]
    pub sync: SyncConfig,

    /// 编辑会话配置
    #[serde(default)]
    pub session: SessionConfig,

    /// 日志配置
    #[serde(default)]
    pub log: LogConfig,
}

// ============================================================================
// Server
// ============================================================================

/// 服务器配置
#[derive(Debug, Clone, Deserialize)]
pub struct ServerConfig {
    /// 监听地址
    #[serde(default = "default_host")]
    pub host: String,

    /// 监听端口
    #[serde(default = "default_port")]
    pub port: u16,
}

fn default_host() -> String {
    "0.0.0.0".to_string()
}

fn default_port() -> u16 {
    5070
}

impl Default for ServerConfig {
    fn default() -> Self {
        Self {
            host: default_host(),
            port: default_port(),
        }
    }
}

impl ServerConfig {
    /// 获取服务器地址
    pub fn addr(&self) -> String {
        format!("{}:{}", self.host, self.port)
    }
}

// ============================================================================
// Database
// ============================================================================

/// 数据库配置
#[derive(Debug, Clone, Deserialize)]
pub struct DatabaseConfig {
    /// 数据库文件路径
    #[serde(default = "default_db_path")]
    pub path: String,

    /// 最大连接数
    #[serde(default = "default_max_connections")]
    pub max_connections: u32,
}

fn default_db_path() -> String {
    "data/chapterhouse.db".to_string()
}

fn default_max_connections() -> u32 {
    5
}

impl Default for DatabaseConfig {
    fn default() -> Self {
        Self {
            path: default_db_path(),
            max_connections: default_max_connections(),
        }
    }
}

impl DatabaseConfig {
    /// 获取 SQLite 连接 URL
    pub fn database_url(&self) -> String {
        format!("sqlite:{}?mode=rwc", self.path)
    }
}

// ============================================================================
// Sync
// ============================================================================

/// 快照存储后端
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum SyncBackend {
    /// 本地 SQLite
    #[default]
    Sqlite,
    /// 远程快照服务
    Http,
    /// 进程内存（重启即丢失）
    Memory,
}

impl SyncBackend {
    pub fn as_str(&self) -> &'static str {
        match self {
            SyncBackend::Sqlite => "sqlite",
            SyncBackend::Http => "http",
            SyncBackend::Memory => "memory",
        }
    }
}

/// 快照同步配置
#[derive(Debug, Clone, Deserialize)]
pub struct SyncConfig {
    /// 存储后端
    #[serde(default)]
    pub backend: SyncBackend,

    /// 最后一次修改后等待多久再保存（毫秒）
    #[serde(default = "default_debounce_ms")]
    pub debounce_ms: u64,

    /// 远程快照服务 URL（backend = http 时必填）
    #[serde(default)]
    pub remote_url: Option<String>,

    /// 远程请求超时（秒）
    #[serde(default = "default_timeout_secs")]
    pub timeout_secs: u64,

    /// 保存失败后的最大重试次数
    #[serde(default = "default_max_retries")]
    pub max_retries: u32,

    /// 待保存队列容量
    #[serde(default = "default_queue_capacity")]
    pub queue_capacity: usize,
}

fn default_debounce_ms() -> u64 {
    1500
}

fn default_timeout_secs() -> u64 {
    10
}

fn default_max_retries() -> u32 {
    3
}

fn default_queue_capacity() -> usize {
    256
}

impl Default for SyncConfig {
    fn default() -> Self {
        Self {
            backend: SyncBackend::default(),
            debounce_ms: default_debounce_ms(),
            remote_url: None,
            timeout_secs: default_timeout_secs(),
            max_retries: default_max_retries(),
            queue_capacity: default_queue_capacity(),
        }
    }
}

impl SyncConfig {
    pub fn debounce(&self) -> Duration {
        Duration::from_millis(self.debounce_ms)
    }
}

// ============================================================================
// Session
// ============================================================================

/// 编辑会话配置
#[derive(Debug, Clone, Deserialize)]
pub struct SessionConfig {
    /// 空闲多久后回收会话（秒）
    #[serde(default = "default_idle_timeout")]
    pub idle_timeout_secs: u64,

    /// 回收检查间隔（秒）
    #[serde(default = "default_reap_interval")]
    pub reap_interval_secs: u64,
}

fn default_idle_timeout() -> u64 {
    3600
}

fn default_reap_interval() -> u64 {
    60
}

impl Default for SessionConfig {
    fn default() -> Self {
        Self {
            idle_timeout_secs: default_idle_timeout(),
            reap_interval_secs: default_reap_interval(),
        }
    }
}

// ============================================================================
// Log
// ============================================================================

/// 日志配置
#[derive(Debug, Clone, Deserialize)]
pub struct LogConfig {
    /// 日志级别
    #[serde(default = "default_log_level")]
    pub level: String,

    /// 是否启用 JSON 格式
    #[serde(default)]
    pub json: bool,
}

fn default_log_level() -> String {
    "info".to_string()
}

impl Default for LogConfig {
    fn default() -> Self {
        Self {
            level: default_log_level(),
            json: false,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_defaults() {
        let config = AppConfig::default();
        assert_eq!(config.server.addr(), "0.0.0.0:5070");
        assert_eq!(config.sync.backend, SyncBackend::Sqlite);
        assert_eq!(config.sync.debounce(), Duration::from_millis(1500));
        assert_eq!(config.session.idle_timeout_secs, 3600);
    }

    #[test]
    fn test_database_url() {
        let config = DatabaseConfig::default();
        assert_eq!(config.database_url(), "sqlite:data/chapterhouse.db?mode=rwc");
    }

    #[test]
    fn test_backend_deserializes_lowercase() {
        let backend: SyncBackend = serde_json::from_str("\"http\"").unwrap();
        assert_eq!(backend, SyncBackend::Http);
        assert_eq!(backend.as_str(), "http");
    }
}
