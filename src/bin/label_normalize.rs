// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/label_normalize.rs - 标注规范化工具
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
use xinban::normalize::NormalizeSummary;

/// 规范化 YOLO 标注: 钳制坐标, 平移中心, 丢弃不可修复的框
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 待规范化的标注目录
  #[arg(long, value_name = "DIR")]
  input: PathBuf,

  /// 规范化结果输出目录
  #[arg(long, value_name = "DIR")]
  output: PathBuf,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  match run(&args) {
    Ok(()) => ExitCode::SUCCESS,
    Err(StoreError::EmptyInput(dir)) => {
      warn!("输入目录 {} 中没有标注文件, 无事可做", dir.display());
      ExitCode::from(2)
    }
    Err(err) => {
      error!("{err}");
      ExitCode::from(1)
    }
  }
}

fn run(args: &Args) -> Result<(), StoreError> {
  let files = labels::scan_label_dir(&args.input)?;
  info!("找到 {} 个标注文件", files.len());

  let mut summary = NormalizeSummary::default();
  for path in files {
    let (records, file_summary) = labels::read_records(&path)?;
    summary.merge(&file_summary);
    let out = args.output.join(format!("{}.txt", labels::frame_key(&path)));
    labels::write_records(&out, &records)?;
  }

  info!(
    "规范化完成: 保留 {} 框, 坏行 {}, 丢弃 {}",
    summary.kept, summary.malformed, summary.dropped
  );
  Ok(())
}
