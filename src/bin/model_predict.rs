// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/model_predict.rs - 调用 ultralytics 做推理
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

use anyhow::Result;
use clap::Parser;

use xinban::model::{Model, PredictConfig, UltralyticsCli};

/// 推理主动脉瓣检测模型, 产出带置信度的标注文件供后处理流水线使用
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 训练产出的权重
  #[arg(long, value_name = "WEIGHTS")]
  weights: PathBuf,

  /// 待推理的图像目录
  #[arg(long, value_name = "DIR")]
  source: PathBuf,

  #[arg(long, default_value = "640")]
  imgsz: u32,

  /// 推理设备 (GPU 编号或 cpu)
  #[arg(long, default_value = "0", value_name = "DEVICE")]
  device: String,

  /// ultralytics 命令行程序名
  #[arg(long, default_value = "yolo", value_name = "PROGRAM")]
  program: String,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  let config = PredictConfig {
    weights: args.weights,
    source: args.source,
    imgsz: args.imgsz,
    device: args.device,
  };
  UltralyticsCli::new(args.program).predict(&config)?;
  Ok(())
}
