// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/continuity_filter.rs - 连续性过滤工具
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
use tracing::{error, warn};

use xinban::index::FrameIndexParser;
use xinban::labels::StoreError;
use xinban::pipeline::{self, PipelineError, PipelineOptions};

/// 连续性过滤: 主动脉瓣一旦入镜会连续出现, 孤立的短检测段判为误检并清空
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 预测标注目录
  #[arg(long, value_name = "DIR")]
  input: PathBuf,

  /// 过滤结果输出目录
  #[arg(long, value_name = "DIR")]
  output: PathBuf,

  /// 原始文件备份目录（可选）
  #[arg(long, value_name = "DIR")]
  backup: Option<PathBuf>,

  /// 连续出现的阈值（张数）
  #[arg(long, default_value = "30", value_name = "COUNT")]
  min_run_length: u64,

  /// 自定义帧序号正则（第一个捕获组为序号）
  #[arg(long, value_name = "REGEX")]
  index_pattern: Option<String>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  let index_parser = match &args.index_pattern {
    Some(pattern) => match FrameIndexParser::with_pattern(pattern) {
      Ok(parser) => parser,
      Err(err) => {
        error!("{err}");
        return ExitCode::from(1);
      }
    },
    None => FrameIndexParser::new(),
  };

  let options = PipelineOptions {
    input_dir: args.input.clone(),
    output_dir: args.output.clone(),
    backup_dir: args.backup.clone(),
    min_run_length: args.min_run_length,
    // 只做连续性分析, 不动每帧的框
    best_box: false,
    index_parser,
  };

  match pipeline::run(&options) {
    Ok(_) => ExitCode::SUCCESS,
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
