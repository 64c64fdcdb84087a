use anyhow::{Context, Result};
use std::fs;
use std::path::Path;
use tracing::debug;

use crate::sync::exclude::{list_entries, ExclusionPolicy};

/// 删除本地所有非脚手架文件，只影响本地，不会访问远端
///
/// dry run 时只打印将被删除的条目。返回候选条目名称。
pub fn clean(root: &Path, policy: &ExclusionPolicy, dry_run: bool) -> Result<Vec<String>> {
    let keep = policy.clean_keep_list();
    let mut removed = Vec::new();

    for name in list_entries(root)? {
        if keep.contains(&name) {
            continue;
        }
        println!("{}", name);
        removed.push(name.clone());
        if dry_run {
            continue;
        }

        let path = root.join(&name);
        // symlink_metadata 不跟随链接，指向目录的链接只删除链接本身
        let meta = fs::symlink_metadata(&path)
            .with_context(|| format!("Failed to stat {}", path.display()))?;
        if meta.is_dir() {
            fs::remove_dir_all(&path)
                .with_context(|| format!("Failed to remove directory {}", path.display()))?;
        } else {
            fs::remove_file(&path)
                .with_context(|| format!("Failed to remove {}", path.display()))?;
        }
        debug!(entry = %name, "removed");
    }

    Ok(removed)
}
