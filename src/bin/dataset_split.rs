// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/dataset_split.rs - 按 patient 切分训练/验证集
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

use xinban::split::{self, SplitError, SplitOptions};

/// 数据集切分: 同一 patient 的帧整体进同一侧, 避免验证集泄漏
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 图像根目录 (下含 patient* 子目录)
  #[arg(long, value_name = "DIR")]
  images: PathBuf,

  /// 标注根目录 (下含 patient* 子目录)
  #[arg(long, value_name = "DIR")]
  labels: PathBuf,

  /// 数据集输出根目录 (生成 train/ 与 val/)
  #[arg(long, value_name = "DIR")]
  output: PathBuf,

  /// 训练集 patient 数
  #[arg(long, default_value = "40", value_name = "COUNT")]
  train_count: usize,

  /// 验证集 patient 数
  #[arg(long, default_value = "10", value_name = "COUNT")]
  val_count: usize,

  /// 移动文件而不是复制
  #[arg(long = "move")]
  move_files: bool,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  let options = SplitOptions {
    image_dir: args.images.clone(),
    label_dir: args.labels.clone(),
    output_dir: args.output.clone(),
    train_count: args.train_count,
    val_count: args.val_count,
    move_files: args.move_files,
  };

  match split::split_dataset(&options) {
    Ok(summary) => {
      if summary.missing_images > 0 {
        warn!("有 {} 个标注找不到对应图片", summary.missing_images);
      }
      ExitCode::SUCCESS
    }
    Err(SplitError::NoPatients(dir)) => {
      warn!("{} 下没有含标注的 patient 子目录, 无事可做", dir.display());
      ExitCode::from(2)
    }
    Err(err) => {
      error!("{err}");
      ExitCode::from(1)
    }
  }
}
