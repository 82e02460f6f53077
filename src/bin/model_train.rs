// 该文件是 Xinban （心瓣） 项目的一部分。
// src/bin/model_train.rs - 调用 ultralytics 训练检测模型
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

use xinban::model::{Model, TrainConfig, UltralyticsCli};

/// 训练主动脉瓣检测模型 (委托给 ultralytics 命令行)
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 数据集配置 yaml
  #[arg(long, default_value = "aortic_valve.yaml", value_name = "FILE")]
  data: PathBuf,

  /// 预训练权重
  #[arg(long, default_value = "yolov9m.pt", value_name = "WEIGHTS")]
  weights: String,

  #[arg(long, default_value = "100")]
  epochs: u32,

  #[arg(long, default_value = "4")]
  batch: u32,

  #[arg(long, default_value = "640")]
  imgsz: u32,

  /// 训练设备 (GPU 编号或 cpu)
  #[arg(long, default_value = "0", value_name = "DEVICE")]
  device: String,

  /// ultralytics 命令行程序名
  #[arg(long, default_value = "yolo", value_name = "PROGRAM")]
  program: String,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  let config = TrainConfig {
    data: args.data,
    weights: args.weights,
    epochs: args.epochs,
    batch: args.batch,
    imgsz: args.imgsz,
    device: args.device,
  };
  UltralyticsCli::new(args.program).train(&config)?;
  Ok(())
}
