/// 应用配置管理
use serde::{Deserialize, Serialize};
use std::path::{Path, PathBuf};
use thiserror::Error;

use crate::board::seed::COMPLETED_COLUMN;

#[derive(Debug, Error)]
pub enum ConfigError {
    #[error("failed to read or write config file {path}: {source}")]
    Io {
        path: PathBuf,
        source: std::io::Error,
    },
    #[error("failed to parse config file: {0}")]
    Parse(#[from] toml::de::Error),
    #[error("failed to serialize config: {0}")]
    Serialize(#[from] toml::ser::Error),
    #[error("could not determine config directory")]
    NoConfigDir,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct Config {
    /// 视为"已完成"的列 ID
    pub completed_column: String,
    /// tracing 过滤级别，RUST_LOG 优先
    pub log_level: String,
    /// 日志文件路径，缺省为临时目录下的 taskpro.log
    pub log_file: Option<PathBuf>,
    /// 通知显示秒数
    pub notification_secs: u64,
    /// 新任务默认部门
    pub default_department: String,
}

impl Default for Config {
    fn default() -> Self {
        Self {
            completed_column: COMPLETED_COLUMN.to_string(),
            log_level: "info".to_string(),
            log_file: None,
            notification_secs: 3,
            default_department: "Produção".to_string(),
        }
    }
}

impl Config {
    pub fn log_path(&self) -> PathBuf {
        self.log_file
            .clone()
            .unwrap_or_else(|| std::env::temp_dir().join("taskpro.log"))
    }
}

/// 获取配置文件路径
/// Linux: ~/.config/taskpro/config.toml
/// macOS: ~/Library/Application Support/taskpro/config.toml
/// Windows: %APPDATA%\taskpro\config.toml
pub fn get_config_path() -> Result<PathBuf, ConfigError> {
    let config_dir = dirs::config_dir().ok_or(ConfigError::NoConfigDir)?;
    Ok(config_dir.join("taskpro").join("config.toml"))
}

/// 加载配置，文件不存在时返回默认值
pub fn load_config_from(path: &Path) -> Result<Config, ConfigError> {
    if !path.exists() {
        return Ok(Config::default());
    }
    let content = std::fs::read_to_string(path).map_err(|source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    })?;
    Ok(toml::from_str(&content)?)
}

pub fn save_config_to(path: &Path, config: &Config) -> Result<(), ConfigError> {
    let io_err = |source| ConfigError::Io {
        path: path.to_path_buf(),
        source,
    };
    // 确保目录存在
    if let Some(parent) = path.parent() {
        std::fs::create_dir_all(parent).map_err(io_err)?;
    }
    let content = toml::to_string_pretty(config)?;
    std::fs::write(path, content).map_err(io_err)?;
    Ok(())
}

pub fn load_config() -> Result<Config, ConfigError> {
    load_config_from(&get_config_path()?)
}

pub fn save_config(config: &Config) -> Result<(), ConfigError> {
    save_config_to(&get_config_path()?, config)
}

/// 首次运行时写入默认配置
/// 返回 (config, is_first_run)
pub fn check_first_run_at(path: &Path) -> Result<(Config, bool), ConfigError> {
    if path.exists() {
        return Ok((load_config_from(path)?, false));
    }
    let config = Config::default();
    save_config_to(path, &config)?;
    Ok((config, true))
}

pub fn check_first_run() -> Result<(Config, bool), ConfigError> {
    check_first_run_at(&get_config_path()?)
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    #[test]
    fn test_missing_file_gives_defaults() {
        let dir = TempDir::new().unwrap();
        let config = load_config_from(&dir.path().join("config.toml")).unwrap();
        assert_eq!(config, Config::default());
        assert_eq!(config.completed_column, "column-3");
    }

    #[test]
    fn test_partial_file_keeps_other_defaults() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = \"debug\"\n").unwrap();
        let config = load_config_from(&path).unwrap();
        assert_eq!(config.log_level, "debug");
        assert_eq!(config.notification_secs, 3);
    }

    #[test]
    fn test_first_run_writes_file_once() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("nested").join("config.toml");
        let (_, first) = check_first_run_at(&path).unwrap();
        assert!(first);
        assert!(path.exists());

        let mut config = load_config_from(&path).unwrap();
        config.completed_column = "column-2".to_string();
        save_config_to(&path, &config).unwrap();
        let (loaded, first) = check_first_run_at(&path).unwrap();
        assert!(!first);
        assert_eq!(loaded.completed_column, "column-2");
    }

    #[test]
    fn test_bad_toml_is_parse_error() {
        let dir = TempDir::new().unwrap();
        let path = dir.path().join("config.toml");
        std::fs::write(&path, "log_level = [").unwrap();
        assert!(matches!(load_config_from(&path), Err(ConfigError::Parse(_))));
    }
}
