// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/best_box.rs - 每帧只留置信度最高的框
//
// 本文件根据 Apache 许可证第 2.0 版（以下简称“许可证”）授权使用；
// 除非遵守该许可证条款，否则您不得使用本文件。
// 您可通过以下网址获取许可证副本：
// http://www.apache.org/licenses/LICENSE-2.0
// 除非适用法律要求或书面同意，根据本许可协议分发的软件均按“原样”提供，
// 不附带任何形式的明示或暗示的保证或条件。
// 有关许可权限与限制的具体条款，请参阅本许可协议。
//
// Copyright (C) 2026 Johann Li <me@qinka.pro>, Wareless Group

use std::path::PathBuf;
use std::process::ExitCode;

use clap::Parser;
use tracing::{error, info, warn};

use xinban::labels::{self, StoreError};
use xinban::pipeline::PipelineError;
use xinban::reduce;

/// 置信度筛选: 主动脉瓣在一帧里至多出现一次, 每帧只留最可信的框
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 预测标注目录 (每行须带置信度)
  #[arg(long, value_name = "DIR")]
  input: PathBuf,

  /// 筛选结果输出目录
  #[arg(long, value_name = "DIR")]
  output: PathBuf,

  /// 原始文件备份目录（可选）
  #[arg(long, value_name = "DIR")]
  backup: Option<PathBuf>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(PipelineError::Store(StoreError::EmptyInput(dir))) => {
      warn!("输入目录 {} 中没有标注文件, 无事可做", dir.display());
      ExitCode::from(2)
    }
    Err(err) => {
      error!("{err}");
      ExitCode::from(1)
    }
  }
}

fn run(args: &Args) -> Result<(), PipelineError> {
  let files = labels::scan_label_dir(&args.input)?;
  info!("找到 {} 个标注文件", files.len());

  if let Some(backup_dir) = &args.backup {
    for path in &files {
      labels::backup_file(path, backup_dir)?;
    }
    info!("已备份 {} 个原始文件到 {}", files.len(), backup_dir.display());
  }

  let mut removed = 0;
  for path in files {
    let key = labels::frame_key(&path);
    let (records, _) = labels::read_records(&path)?;
    let before = records.len();
    let records = reduce::reduce(records).map_err(|source| PipelineError::Reduce {
      frame: key.clone(),
      source,
    })?;
    removed += before - records.len();
    labels::write_records(&args.output.join(format!("{key}.txt")), &records)?;
  }

  info!("筛选完成: 共移除 {removed} 个低置信度框");
  Ok(())
}
