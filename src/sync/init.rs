use anyhow::{Context, Result};
use chrono::NaiveDate;
use std::fs;
use std::io::{self, BufRead, Write};
use std::path::Path;
use tracing::debug;

use crate::sync::config::{
    dir_name, load_global_config, project_config_path, remote_uri, Config, CONF_FILE_NAME,
    DEFAULT_STORAGE_CLASS, DIRNAME_SENTINEL,
};
use crate::sync::error::SyncError;
use crate::sync::exclude::{ExclusionPolicy, GIT_IGNORE_FILE_NAME};

pub const README_FILE_NAME: &str = "README.md";

/// 交互输入的能力：终端或测试脚本
pub trait Prompt {
    fn ask(&mut self, message: &str) -> Result<String>;
}

/// 从标准输入逐行读取
pub struct StdinPrompt;

impl Prompt for StdinPrompt {
    fn ask(&mut self, message: &str) -> Result<String> {
        print!("{}", message);
        io::stdout().flush().context("Failed to flush stdout")?;

        read_answer(&mut io::stdin().lock())
    }
}

/// 读取一行回答，只去掉行尾换行；输入流已关闭时报错
fn read_answer<R: BufRead>(reader: &mut R) -> Result<String> {
    let mut input = String::new();
    let read = reader
        .read_line(&mut input)
        .context("Failed to read user input")?;
    if read == 0 {
        return Err(SyncError::InputClosed.into());
    }
    Ok(input.trim_end_matches(['\r', '\n']).to_string())
}

/// s3_path_prefix 的默认值
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PrefixDefault {
    /// 目录名
    DirName,
    /// 日期 + 目录名，例如 20261019-alpha
    Dated(NaiveDate),
}

impl PrefixDefault {
    pub fn compute(&self, dir_name: &str) -> String {
        match self {
            PrefixDefault::DirName => dir_name.to_string(),
            PrefixDefault::Dated(date) => format!("{}-{}", date.format("%Y%m%d"), dir_name),
        }
    }
}

pub struct InitOptions<'a> {
    pub global_config: Option<&'a Path>,
    pub prefix_default: PrefixDefault,
}

/// 初始化项目：生成配置文件、.gitignore 和 README.md
///
/// 配置文件已存在时拒绝覆盖，不写任何文件。
pub fn init(
    root: &Path,
    policy: &ExclusionPolicy,
    options: &InitOptions<'_>,
    prompt: &mut dyn Prompt,
) -> Result<Config> {
    let conf_path = project_config_path(root);
    if conf_path.exists() {
        return Err(SyncError::ConfigExists(conf_path).into());
    }

    let template = match options.global_config {
        Some(path) => load_global_config(path)?,
        None => None,
    };
    debug!(from_template = template.is_some(), "seeding config");
    let mut conf = template.unwrap_or_default().into_config();

    if conf.aws_profile.is_empty() {
        conf.aws_profile = prompt.ask("aws profile: ")?;
    }

    if conf.s3_bucket.is_empty() {
        conf.s3_bucket = prompt.ask("s3 bucket name: ")?;
    }

    if conf.s3_path_prefix.is_empty() {
        let default_prefix = options.prefix_default.compute(&dir_name(root)?);
        conf.s3_path_prefix =
            prompt.ask(&format!("s3 path prefix (default:\"{}\"): ", default_prefix))?;
        if conf.s3_path_prefix.is_empty() {
            conf.s3_path_prefix = default_prefix;
        }
    }

    if conf.s3_storage_class.is_empty() {
        conf.s3_storage_class = prompt.ask(&format!(
            "s3 storage class (default:\"{}\"): ",
            DEFAULT_STORAGE_CLASS
        ))?;
        if conf.s3_storage_class.is_empty() {
            conf.s3_storage_class = DEFAULT_STORAGE_CLASS.to_string();
        }
    }

    let json = serde_json::to_string_pretty(&conf).context("Failed to serialize config")?;
    fs::write(&conf_path, json)
        .with_context(|| format!("Failed to write {}", conf_path.display()))?;

    let ignore_path = root.join(GIT_IGNORE_FILE_NAME);
    fs::write(&ignore_path, &policy.ignore_template)
        .with_context(|| format!("Failed to write {}", ignore_path.display()))?;

    let readme_path = root.join(README_FILE_NAME);
    if !readme_path.exists() {
        let mut resolved = conf.clone();
        if resolved.s3_path_prefix == DIRNAME_SENTINEL {
            resolved.s3_path_prefix = dir_name(root)?;
        }
        let uri = remote_uri(&resolved);
        fs::write(&readme_path, format!("# {}\n", uri.trim_end_matches('/')))
            .with_context(|| format!("Failed to write {}", readme_path.display()))?;
    }

    println!("created {}", CONF_FILE_NAME);
    Ok(conf)
}
