use anyhow::{Context, Result};
use serde::{Deserialize, Serialize};
use std::fs;
use std::path::{Path, PathBuf};
use tracing::debug;

use crate::sync::error::SyncError;

/// 项目配置文件名
pub const CONF_FILE_NAME: &str = "s3-project-backup.json";

/// 全局配置目录名 (位于用户配置目录下)
const GLOBAL_CONF_DIR: &str = "s3-project-backup";

/// s3_path_prefix 的占位值：使用当前目录名
pub const DIRNAME_SENTINEL: &str = "DIRNAME";

pub const DEFAULT_STORAGE_CLASS: &str = "STANDARD";

const REMOTE_SCHEME: &str = "s3";

/// 项目配置，四个字段在同步时都必须有值
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Config {
    pub aws_profile: String,
    pub s3_bucket: String,
    pub s3_path_prefix: String,
    pub s3_storage_class: String,
}

/// 全局模板配置，任意字段都可以缺省、为空或为 null
#[derive(Debug, Clone, Default, PartialEq, Eq, Deserialize)]
#[serde(default)]
pub struct ConfigTemplate {
    pub aws_profile: Option<String>,
    pub s3_bucket: Option<String>,
    pub s3_path_prefix: Option<String>,
    pub s3_storage_class: Option<String>,
}

impl ConfigTemplate {
    /// 转换为配置，缺失字段填空字符串，由 init 逐项补全
    pub fn into_config(self) -> Config {
        Config {
            aws_profile: self.aws_profile.unwrap_or_default(),
            s3_bucket: self.s3_bucket.unwrap_or_default(),
            s3_path_prefix: self.s3_path_prefix.unwrap_or_default(),
            s3_storage_class: self.s3_storage_class.unwrap_or_default(),
        }
    }
}

/// 项目配置文件路径
pub fn project_config_path(root: &Path) -> PathBuf {
    root.join(CONF_FILE_NAME)
}

/// 默认的全局模板路径，例如 ~/.config/s3-project-backup/s3-project-backup.json
pub fn global_config_path() -> Option<PathBuf> {
    dirs::config_dir().map(|dir| dir.join(GLOBAL_CONF_DIR).join(CONF_FILE_NAME))
}

/// 目录的名称 (先解析为绝对路径，"." 也能得到真实目录名)
pub fn dir_name(root: &Path) -> Result<String> {
    let resolved = root
        .canonicalize()
        .with_context(|| format!("Failed to resolve directory {}", root.display()))?;
    resolved
        .file_name()
        .map(|name| name.to_string_lossy().into_owned())
        .ok_or_else(|| SyncError::NoCurrentDirName(resolved.clone()).into())
}

/// 读取项目配置，并把 DIRNAME 占位替换为目录名
pub fn load_project_config(root: &Path) -> Result<Config> {
    let path = project_config_path(root);
    if !path.exists() {
        return Err(SyncError::ConfigMissing(path).into());
    }

    let content = fs::read_to_string(&path)
        .with_context(|| format!("Failed to read config file at {}", path.display()))?;
    let mut config: Config = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from config file at {}", path.display()))?;

    if config.s3_path_prefix == DIRNAME_SENTINEL {
        config.s3_path_prefix = dir_name(root)?;
        debug!(prefix = %config.s3_path_prefix, "resolved DIRNAME prefix");
    }

    Ok(config)
}

/// 读取全局模板；文件不存在时返回 None
pub fn load_global_config(path: &Path) -> Result<Option<ConfigTemplate>> {
    if !path.exists() {
        debug!(path = %path.display(), "no global template");
        return Ok(None);
    }

    let content = fs::read_to_string(path)
        .with_context(|| format!("Failed to read global config at {}", path.display()))?;
    let template = serde_json::from_str(&content)
        .with_context(|| format!("Failed to parse JSON from global config at {}", path.display()))?;
    Ok(Some(template))
}

/// 远端路径，末尾的 / 让 aws s3 sync 同步目录内容而不是新建子目录
pub fn remote_uri(config: &Config) -> String {
    format!(
        "{}://{}/{}/",
        REMOTE_SCHEME, config.s3_bucket, config.s3_path_prefix
    )
}
