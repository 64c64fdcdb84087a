use anyhow::{Context, Result};
use std::path::Path;
use walkdir::WalkDir;

/// 同步与清理都不会触碰的文件
pub const EXCLUDE_ITEMS: &[&str] = &[
    "upload.sh",
    ".gitignore",
    "s3-project-backup.json",
    "s3-project-backup.py",
    "_DS_Store",
    ".DS_Store",
];

/// 允许与远端重复存在于本地的文件
pub const DUPLICATED_ITEMS: &[&str] = &["README.md"];

pub const GIT_IGNORE_FILE_NAME: &str = ".gitignore";

/// 写入 .gitignore 的模板：忽略一切，只保留脚手架文件
pub const GIT_IGNORE: &str = "
/*
!.gitignore
!README.md
!s3-project-backup.json
";

/// 排除规则，作为参数传给各个操作，测试可以替换
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct ExclusionPolicy {
    pub exclude: Vec<String>,
    pub duplicated: Vec<String>,
    pub ignore_template: String,
}

impl Default for ExclusionPolicy {
    fn default() -> Self {
        Self {
            exclude: EXCLUDE_ITEMS.iter().map(|s| s.to_string()).collect(),
            duplicated: DUPLICATED_ITEMS.iter().map(|s| s.to_string()).collect(),
            ignore_template: GIT_IGNORE.to_string(),
        }
    }
}

impl ExclusionPolicy {
    /// 是否属于脚手架文件 (排除列表或重复列表)
    pub fn is_bootstrap(&self, name: &str) -> bool {
        self.exclude.iter().any(|e| e == name) || self.duplicated.iter().any(|d| d == name)
    }

    /// 模板中以 ! 开头的放行条目
    pub fn ignore_allow_list(&self) -> Vec<String> {
        self.ignore_template
            .lines()
            .filter_map(|line| line.trim().strip_prefix('!'))
            .map(|entry| entry.trim().to_string())
            .filter(|entry| !entry.is_empty())
            .collect()
    }

    /// clean 时保留的条目：排除列表、重复列表加上模板放行条目
    pub fn clean_keep_list(&self) -> Vec<String> {
        let mut keep = self.exclude.clone();
        let extra = self.duplicated.iter().cloned().chain(self.ignore_allow_list());
        for entry in extra {
            if !keep.contains(&entry) {
                keep.push(entry);
            }
        }
        keep
    }
}

/// 列出目录下的直接子项名称，按名称排序
pub fn list_entries(root: &Path) -> Result<Vec<String>> {
    let mut names = Vec::new();
    for entry in WalkDir::new(root)
        .min_depth(1)
        .max_depth(1)
        .sort_by_file_name()
    {
        let entry = entry.with_context(|| format!("Failed to list {}", root.display()))?;
        names.push(entry.file_name().to_string_lossy().into_owned());
    }
    Ok(names)
}

/// 目录中只有脚手架文件时返回 true，用于判断是否是刚 clone 下来的项目
pub fn has_only_bootstrap_files(root: &Path, policy: &ExclusionPolicy) -> Result<bool> {
    Ok(list_entries(root)?
        .iter()
        .all(|name| policy.is_bootstrap(name)))
}
