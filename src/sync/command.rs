use anyhow::{Context, Result};
use std::path::{Path, PathBuf};
use std::process::Command;
use tracing::{debug, info};
use which::which;

use crate::sync::config::{remote_uri, Config};
use crate::sync::error::SyncError;
use crate::sync::exclude::ExclusionPolicy;

const AWS_PROGRAM: &str = "aws";

/// 同步的本地端，子进程在项目根目录下运行
const LOCAL_OPERAND: &str = ".";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Direction {
    Upload,
    Download,
}

/// 组装 aws s3 sync 的完整参数 (包含程序名)
///
/// 上传: 本地 -> 远端，并带上 storage class；下载: 远端 -> 本地。
/// 两个方向都带 --delete，目标端与源端保持镜像。
pub fn build_sync_command(
    config: &Config,
    direction: Direction,
    policy: &ExclusionPolicy,
    dry_run: bool,
) -> Vec<String> {
    let remote = remote_uri(config);
    let mut cmd = vec![
        AWS_PROGRAM.to_string(),
        format!("--profile={}", config.aws_profile),
        "s3".to_string(),
        "sync".to_string(),
    ];

    match direction {
        Direction::Upload => {
            cmd.push(LOCAL_OPERAND.to_string());
            cmd.push(remote);
            cmd.push(format!("--storage-class={}", config.s3_storage_class));
        }
        Direction::Download => {
            cmd.push(remote);
            cmd.push(LOCAL_OPERAND.to_string());
        }
    }

    cmd.push("--delete".to_string());
    cmd.extend(policy.exclude.iter().map(|e| format!("--exclude={}", e)));

    if dry_run {
        cmd.push("--dryrun".to_string());
    }

    cmd
}

/// 执行同步命令的能力，测试中替换为只记录参数的实现
pub trait Syncer {
    fn sync(&self, argv: &[String]) -> Result<()>;
}

/// 调用本机安装的 aws CLI
pub struct AwsCli {
    workdir: PathBuf,
}

impl AwsCli {
    pub fn new(workdir: &Path) -> Self {
        Self {
            workdir: workdir.to_path_buf(),
        }
    }
}

impl Syncer for AwsCli {
    fn sync(&self, argv: &[String]) -> Result<()> {
        run_command(argv, &self.workdir)
    }
}

/// 把参数转成可以直接粘贴到 shell 的形式
pub fn shell_join(argv: &[String]) -> String {
    argv.iter()
        .map(|arg| shell_quote(arg))
        .collect::<Vec<_>>()
        .join(" ")
}

fn shell_quote(arg: &str) -> String {
    let safe = !arg.is_empty()
        && arg
            .chars()
            .all(|c| c.is_ascii_alphanumeric() || "@%+=:,./-_".contains(c));
    if safe {
        arg.to_string()
    } else {
        format!("'{}'", arg.replace('\'', "'\"'\"'"))
    }
}

/// 打印并执行命令，标准输出/错误直接继承；非零退出即失败
pub fn run_command(argv: &[String], workdir: &Path) -> Result<()> {
    let (program, args) = argv.split_first().context("empty command line")?;

    println!("$ {}", shell_join(argv));

    let executable = which(program).map_err(|_| SyncError::ExecutableNotFound {
        program: program.clone(),
    })?;
    debug!(executable = %executable.display(), workdir = %workdir.display(), "spawning");

    let status = Command::new(&executable)
        .args(args)
        .current_dir(workdir)
        .status()
        .with_context(|| format!("Failed to execute {}", executable.display()))?;

    if !status.success() {
        return Err(SyncError::CommandFailed {
            program: program.clone(),
            code: status.code(),
        }
        .into());
    }

    info!(program = %program, "command finished");
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn sample_config() -> Config {
        Config {
            aws_profile: "work".to_string(),
            s3_bucket: "backups".to_string(),
            s3_path_prefix: "alpha".to_string(),
            s3_storage_class: "GLACIER_IR".to_string(),
        }
    }

    fn position(cmd: &[String], needle: &str) -> usize {
        cmd.iter().position(|a| a == needle).unwrap()
    }

    #[test]
    fn test_upload_command() {
        let policy = ExclusionPolicy::default();
        let cmd = build_sync_command(&sample_config(), Direction::Upload, &policy, false);

        assert_eq!(
            &cmd[..6],
            &["aws", "--profile=work", "s3", "sync", ".", "s3://backups/alpha/"]
        );
        assert!(position(&cmd, ".") < position(&cmd, "s3://backups/alpha/"));
        assert!(cmd.contains(&"--storage-class=GLACIER_IR".to_string()));
        assert!(cmd.contains(&"--delete".to_string()));
        assert!(!cmd.contains(&"--dryrun".to_string()));

        let excludes: Vec<_> = cmd.iter().filter(|a| a.starts_with("--exclude=")).collect();
        assert_eq!(excludes.len(), policy.exclude.len());
        assert!(excludes.contains(&&"--exclude=.DS_Store".to_string()));
    }

    #[test]
    fn test_download_command() {
        let policy = ExclusionPolicy::default();
        let cmd = build_sync_command(&sample_config(), Direction::Download, &policy, true);

        assert!(position(&cmd, "s3://backups/alpha/") < position(&cmd, "."));
        assert!(!cmd.iter().any(|a| a.starts_with("--storage-class")));
        assert!(cmd.contains(&"--delete".to_string()));
        assert_eq!(cmd.last().map(String::as_str), Some("--dryrun"));
        assert_eq!(
            cmd.iter().filter(|a| a.starts_with("--exclude=")).count(),
            policy.exclude.len()
        );
    }

    #[test]
    fn test_exclusions_follow_policy() {
        let policy = ExclusionPolicy {
            exclude: vec!["*.tmp".to_string()],
            duplicated: Vec::new(),
            ignore_template: String::new(),
        };
        let cmd = build_sync_command(&sample_config(), Direction::Upload, &policy, false);
        let excludes: Vec<_> = cmd.iter().filter(|a| a.starts_with("--exclude=")).collect();
        assert_eq!(excludes, vec!["--exclude=*.tmp"]);
    }

    #[test]
    fn test_shell_join_quotes_when_needed() {
        let argv = vec![
            "aws".to_string(),
            "--exclude=*.tmp".to_string(),
            "my dir".to_string(),
            "it's".to_string(),
            String::new(),
        ];
        assert_eq!(
            shell_join(&argv),
            r#"aws '--exclude=*.tmp' 'my dir' 'it'"'"'s' ''"#
        );
    }

    #[test]
    fn test_run_command_rejects_empty() {
        assert!(run_command(&[], Path::new(".")).is_err());
    }

    #[test]
    fn test_run_command_missing_executable() {
        let argv = vec!["definitely-not-a-real-program-4242".to_string()];
        let err = run_command(&argv, Path::new(".")).unwrap_err();
        assert!(matches!(
            err.downcast_ref::<SyncError>(),
            Some(SyncError::ExecutableNotFound { .. })
        ));
    }

    #[cfg(unix)]
    #[test]
    fn test_run_command_propagates_exit_code() {
        let argv = vec!["sh".to_string(), "-c".to_string(), "exit 3".to_string()];
        let err = run_command(&argv, Path::new(".")).unwrap_err();
        match err.downcast_ref::<SyncError>() {
            Some(SyncError::CommandFailed { code, .. }) => assert_eq!(*code, Some(3)),
            other => panic!("unexpected error: {:?}", other),
        }
    }
}
