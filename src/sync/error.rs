use std::path::PathBuf;
use thiserror::Error;

/// 需要区分退出码的错误类型，其余错误统一走 anyhow
#[derive(Error, Debug)]
pub enum SyncError {
    #[error("{} not found", .0.display())]
    ConfigMissing(PathBuf),

    #[error("{} already exists", .0.display())]
    ConfigExists(PathBuf),

    #[error("{program} executable not found in PATH")]
    ExecutableNotFound { program: String },

    #[error("command `{program}` failed with {}", describe_exit(.code))]
    CommandFailed { program: String, code: Option<i32> },

    #[error("unexpected end of input")]
    InputClosed,

    #[error("cannot determine directory name of {}", .0.display())]
    NoCurrentDirName(PathBuf),
}

fn describe_exit(code: &Option<i32>) -> String {
    match code {
        Some(code) => format!("exit code {}", code),
        None => "no exit code (terminated by signal)".to_string(),
    }
}

impl SyncError {
    /// 进程退出码：同步命令失败时沿用子进程的退出码
    pub fn exit_code(&self) -> u8 {
        match self {
            SyncError::CommandFailed { code: Some(code), .. } => {
                u8::try_from(*code).ok().filter(|c| *c != 0).unwrap_or(1)
            }
            _ => 1,
        }
    }
}
