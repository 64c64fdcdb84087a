use clap::{Parser, ValueEnum};
use std::path::PathBuf;

#[derive(Debug, Parser)]
#[command(name = "s3-project-backup")]
#[command(about = "simple s3 directory backup / 用 aws s3 sync 备份项目目录")]
#[command(version)]
#[command(after_help = r#"
EXAMPLES / 示例:
  Create s3-project-backup.json / 初始化配置:
    s3-project-backup init

  Upload if the directory has local work, download if it only holds bootstrap files
  / 自动判断方向:
    s3-project-backup

  Preview an upload / 预览上传:
    s3-project-backup upload -d

  Delete local files that are already backed up / 清理本地文件:
    s3-project-backup clean

GLOBAL TEMPLATE / 全局模板:
  ~/.config/s3-project-backup/s3-project-backup.json
"#)]
pub struct Cli {
    /// 命令，省略时根据目录内容自动选择 upload 或 download
    #[arg(value_enum)]
    pub command: Option<Command>,

    /// dry run，只打印不执行 / Dry run
    #[arg(short = 'd', long = "dryrun")]
    pub dry_run: bool,

    /// init 时默认前缀带上日期 / Offer a date-stamped default prefix during init
    #[arg(long)]
    pub dated_prefix: bool,

    /// 全局模板路径 / Global template path
    #[arg(long, value_name = "PATH")]
    pub global_config: Option<PathBuf>,

    /// 输出调试日志 / Verbose logging
    #[arg(short = 'v', long)]
    pub verbose: bool,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, ValueEnum)]
pub enum Command {
    /// 初始化 s3-project-backup.json / Create the project config
    Init,
    /// 上传本地目录到 s3 / Sync local directory up to s3
    Upload,
    /// 从 s3 下载到本地目录 / Sync s3 down to the local directory
    Download,
    /// 删除本地非脚手架文件 / Delete local entries not in the exclude list
    Clean,
}
