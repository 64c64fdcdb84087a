use anyhow::Result;
use std::path::{Path, PathBuf};
use tracing::{debug, warn};

use crate::sync::cli::{Cli, Command};
use crate::sync::command::{build_sync_command, AwsCli, Direction, Syncer};
use crate::sync::config::{
    global_config_path, load_project_config, project_config_path, remote_uri, CONF_FILE_NAME,
};
use crate::sync::error::SyncError;
use crate::sync::exclude::{has_only_bootstrap_files, ExclusionPolicy};
use crate::sync::init::{init, InitOptions, PrefixDefault, StdinPrompt};

/// 未指定命令时：只有脚手架文件则下载，否则上传
pub fn resolve_command(
    command: Option<Command>,
    root: &Path,
    policy: &ExclusionPolicy,
) -> Result<Command> {
    if let Some(command) = command {
        return Ok(command);
    }

    if has_only_bootstrap_files(root, policy)? {
        warn!("no local files besides bootstrap files, downloading (--delete mirrors remote)");
        Ok(Command::Download)
    } else {
        debug!("local files present, uploading");
        Ok(Command::Upload)
    }
}

/// 读取配置并执行一次同步
pub fn execute_sync(
    root: &Path,
    direction: Direction,
    policy: &ExclusionPolicy,
    dry_run: bool,
    syncer: &dyn Syncer,
) -> Result<()> {
    let config = load_project_config(root)?;
    let remote = remote_uri(&config);

    match direction {
        Direction::Upload => println!("upload from local directory to {} .", remote),
        Direction::Download => println!("download from {} to local directory.", remote),
    }

    let argv = build_sync_command(&config, direction, policy, dry_run);
    syncer.sync(&argv)
}

/// 执行上传命令
pub fn execute_upload(root: &Path, policy: &ExclusionPolicy, dry_run: bool) -> Result<()> {
    execute_sync(root, Direction::Upload, policy, dry_run, &AwsCli::new(root))
}

/// 执行下载命令
pub fn execute_download(root: &Path, policy: &ExclusionPolicy, dry_run: bool) -> Result<()> {
    execute_sync(root, Direction::Download, policy, dry_run, &AwsCli::new(root))
}

/// 执行初始化命令
pub fn execute_init(
    root: &Path,
    policy: &ExclusionPolicy,
    global_config: Option<PathBuf>,
    dated_prefix: bool,
) -> Result<()> {
    let global_config = global_config.or_else(global_config_path);
    let prefix_default = if dated_prefix {
        PrefixDefault::Dated(chrono::Local::now().date_naive())
    } else {
        PrefixDefault::DirName
    };
    let options = InitOptions {
        global_config: global_config.as_deref(),
        prefix_default,
    };

    init(root, policy, &options, &mut StdinPrompt)?;
    Ok(())
}

/// 执行清理命令
pub fn execute_clean(root: &Path, policy: &ExclusionPolicy, dry_run: bool) -> Result<()> {
    crate::sync::clean::clean(root, policy, dry_run)?;
    Ok(())
}

/// 同步和清理前检查项目配置是否存在
fn require_project_config(root: &Path) -> Result<()> {
    let conf_path = project_config_path(root);
    if !conf_path.exists() {
        println!("{} not found.", CONF_FILE_NAME);
        println!("please run `s3-project-backup init` .");
        return Err(SyncError::ConfigMissing(conf_path).into());
    }
    Ok(())
}

/// 命令分发入口
pub fn run(cli: Cli, root: &Path) -> Result<()> {
    let policy = ExclusionPolicy::default();
    let command = resolve_command(cli.command, root, &policy)?;
    debug!(?command, dry_run = cli.dry_run, root = %root.display(), "dispatch");

    match command {
        Command::Init => execute_init(root, &policy, cli.global_config, cli.dated_prefix),
        Command::Upload => {
            require_project_config(root)?;
            execute_upload(root, &policy, cli.dry_run)
        }
        Command::Download => {
            require_project_config(root)?;
            execute_download(root, &policy, cli.dry_run)
        }
        Command::Clean => {
            require_project_config(root)?;
            execute_clean(root, &policy, cli.dry_run)
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::cell::RefCell;
    use std::fs;
    use tempfile::TempDir;

    /// 只记录参数、不执行的 Syncer
    #[derive(Debug, Default)]
    struct RecordingSyncer {
        calls: RefCell<Vec<Vec<String>>>,
    }

    impl Syncer for RecordingSyncer {
        fn sync(&self, argv: &[String]) -> Result<()> {
            self.calls.borrow_mut().push(argv.to_vec());
            Ok(())
        }
    }

    fn write_config(root: &Path) {
        fs::write(
            root.join(CONF_FILE_NAME),
            r#"{"aws_profile": "work", "s3_bucket": "backups", "s3_path_prefix": "alpha", "s3_storage_class": "STANDARD"}"#,
        )
        .unwrap();
    }

    #[test]
    fn test_explicit_command_wins() -> Result<()> {
        let root = TempDir::new()?;
        let policy = ExclusionPolicy::default();
        let command = resolve_command(Some(Command::Upload), root.path(), &policy)?;
        assert_eq!(command, Command::Upload);
        Ok(())
    }

    #[test]
    fn test_fresh_clone_downloads_then_local_work_uploads() -> Result<()> {
        let root = TempDir::new()?;
        let policy = ExclusionPolicy::default();
        write_config(root.path());
        fs::write(root.path().join("README.md"), "# s3://backups/alpha\n")?;
        assert_eq!(resolve_command(None, root.path(), &policy)?, Command::Download);

        fs::create_dir(root.path().join("src"))?;
        fs::write(root.path().join("src").join("main.go"), "package main\n")?;
        assert_eq!(resolve_command(None, root.path(), &policy)?, Command::Upload);
        Ok(())
    }

    #[test]
    fn test_execute_sync_builds_upload() -> Result<()> {
        let root = TempDir::new()?;
        write_config(root.path());
        let syncer = RecordingSyncer::default();

        execute_sync(root.path(), Direction::Upload, &ExclusionPolicy::default(), true, &syncer)?;
        let calls = syncer.calls.borrow();
        assert_eq!(calls.len(), 1);
        assert_eq!(calls[0][4], ".");
        assert_eq!(calls[0][5], "s3://backups/alpha/");
        assert_eq!(calls[0].last().map(String::as_str), Some("--dryrun"));
        Ok(())
    }

    #[test]
    fn test_execute_sync_without_config() {
        let root = TempDir::new().unwrap();
        let syncer = RecordingSyncer::default();

        let err = execute_sync(
            root.path(),
            Direction::Download,
            &ExclusionPolicy::default(),
            false,
            &syncer,
        )
        .unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ConfigMissing(_))
        ));
        assert!(syncer.calls.borrow().is_empty());
    }

    #[test]
    fn test_clean_requires_config() {
        let root = TempDir::new().unwrap();
        fs::write(root.path().join("data.csv"), "a,b\n").unwrap();
        let cli = Cli {
            command: Some(Command::Clean),
            dry_run: false,
            dated_prefix: false,
            global_config: None,
            verbose: false,
        };

        assert!(run(cli, root.path()).is_err());
        assert!(root.path().join("data.csv").exists());
    }
}
