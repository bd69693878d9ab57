use std::time::Duration;

use log::warn;
use serde::{Deserialize, Serialize};

use crate::codec::DEFAULT_MAX_DECODED_BYTES;

/// 配置文件路径的环境变量
pub const CONFIG_ENV: &str = "VOXEL_INTEGRAL_CONFIG";
pub const BIND_ENV: &str = "VOXEL_INTEGRAL_BIND";
pub const PORT_ENV: &str = "VOXEL_INTEGRAL_PORT";
pub const RESOURCE_DIR_ENV: &str = "VOXEL_INTEGRAL_RESOURCE_DIR";

/// 服务配置
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct ServiceConfig {
    pub bind_host: String,
    pub bind_port: u16,
    /// 网格文件所在目录
    pub resource_dir: String,
    /// 上传网格的保留时间（秒）
    pub grid_ttl_secs: u64,
    /// 过期清理的间隔（秒）
    pub cleanup_interval_secs: u64,
    /// 上传请求体的上限（字节）
    pub max_upload_bytes: usize,
    /// gzip 上传解压后的上限（字节）
    pub max_decoded_bytes: usize,
}

impl Default for ServiceConfig {
    fn default() -> Self {
        ServiceConfig {
            bind_host: "127.0.0.1".to_string(),
            bind_port: 8080,
            resource_dir: "test/resource".to_string(),
            grid_ttl_secs: 30 * 60,
            cleanup_interval_secs: 5 * 60,
            max_upload_bytes: 256 * 1024 * 1024,
            max_decoded_bytes: DEFAULT_MAX_DECODED_BYTES,
        }
    }
}

impl ServiceConfig {
    /// 读取配置：先读 JSON 文件（若指定），再用环境变量覆盖
    pub fn load() -> Self {
        let mut config = match std::env::var(CONFIG_ENV) {
            Ok(path) => Self::from_file(&path).unwrap_or_else(|e| {
                warn!("读取配置文件 {} 失败，使用默认配置: {}", path, e);
                Self::default()
            }),
            Err(_) => Self::default(),
        };
        config.apply_overrides(|key| std::env::var(key).ok());
        config
    }

    pub fn from_file(path: &str) -> Result<Self, Box<dyn std::error::Error>> {
        let text = std::fs::read_to_string(path)?;
        Ok(serde_json::from_str(&text)?)
    }

    /// 用外部提供的键值覆盖配置，无效值保留原配置
    pub fn apply_overrides<F>(&mut self, lookup: F)
    where
        F: Fn(&str) -> Option<String>,
    {
        if let Some(host) = lookup(BIND_ENV) {
            self.bind_host = host;
        }
        if let Some(port) = lookup(PORT_ENV) {
            match port.parse() {
                Ok(port) => self.bind_port = port,
                Err(e) => warn!("忽略无效的端口 '{}': {}", port, e),
            }
        }
        if let Some(dir) = lookup(RESOURCE_DIR_ENV) {
            self.resource_dir = dir;
        }
    }

    pub fn grid_ttl(&self) -> Duration {
        Duration::from_secs(self.grid_ttl_secs)
    }

    pub fn cleanup_interval(&self) -> Duration {
        Duration::from_secs(self.cleanup_interval_secs.max(1))
    }
}
