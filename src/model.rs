// 该文件是 Xinban （心瓣） 项目的一部分。
// src/model.rs - 检测模型外部接口
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

use std::io;
use std::path::PathBuf;
use std::process::{Command, ExitStatus};

use thiserror::Error;
use tracing::info;

#[derive(Error, Debug)]
pub enum ModelError {
  #[error("无法启动外部命令 '{program}': {source}")]
  Spawn { program: String, source: io::Error },
  #[error("外部命令 '{program}' 失败: {status}")]
  Failed { program: String, status: ExitStatus },
}

/// 检测模型对本工具链的全部接口。
/// 训练与推理整体委托给外部实现，工具链不了解也不关心模型内部。
pub trait Model {
  type Error;

  fn train(&self, config: &TrainConfig) -> Result<(), Self::Error>;
  fn predict(&self, config: &PredictConfig) -> Result<(), Self::Error>;
}

#[derive(Debug, Clone)]
pub struct TrainConfig {
  /// 数据集配置 yaml
  pub data: PathBuf,
  /// 预训练权重
  pub weights: String,
  pub epochs: u32,
  pub batch: u32,
  pub imgsz: u32,
  pub device: String,
}

impl Default for TrainConfig {
  fn default() -> Self {
    Self {
      data: PathBuf::from("aortic_valve.yaml"),
      weights: "yolov9m.pt".to_string(),
      epochs: 100,
      batch: 4,
      imgsz: 640,
      device: "0".to_string(),
    }
  }
}

#[derive(Debug, Clone)]
pub struct PredictConfig {
  /// 训练产出的权重
  pub weights: PathBuf,
  /// 待推理的图像目录
  pub source: PathBuf,
  pub imgsz: u32,
  pub device: String,
}

/// 通过 ultralytics 命令行调用 YOLO。
/// 推理固定带 save_txt/save_conf，产出的标注文件正是后处理流水线的输入。
#[derive(Debug, Clone)]
pub struct UltralyticsCli {
  program: String,
}

impl UltralyticsCli {
  pub fn new(program: impl Into<String>) -> Self {
    Self {
      program: program.into(),
    }
  }

  fn run(&self, args: &[String]) -> Result<(), ModelError> {
    info!("执行外部命令: {} {}", self.program, args.join(" "));
    let status = Command::new(&self.program)
      .args(args)
      .status()
      .map_err(|source| ModelError::Spawn {
        program: self.program.clone(),
        source,
      })?;
    if !status.success() {
      return Err(ModelError::Failed {
        program: self.program.clone(),
        status,
      });
    }
    Ok(())
  }
}

impl Default for UltralyticsCli {
  fn default() -> Self {
    Self::new("yolo")
  }
}

impl Model for UltralyticsCli {
  type Error = ModelError;

  fn train(&self, config: &TrainConfig) -> Result<(), ModelError> {
    let args = vec![
      "detect".to_string(),
      "train".to_string(),
      format!("data={}", config.data.display()),
      format!("model={}", config.weights),
      format!("epochs={}", config.epochs),
      format!("batch={}", config.batch),
      format!("imgsz={}", config.imgsz),
      format!("device={}", config.device),
    ];
    self.run(&args)
  }

  fn predict(&self, config: &PredictConfig) -> Result<(), ModelError> {
    let args = vec![
      "detect".to_string(),
      "predict".to_string(),
      format!("model={}", config.weights.display()),
      format!("source={}", config.source.display()),
      format!("imgsz={}", config.imgsz),
      format!("device={}", config.device),
      "save=True".to_string(),
      "save_txt=True".to_string(),
      "save_conf=True".to_string(),
    ];
    self.run(&args)
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn missing_program_is_a_spawn_error() {
    let cli = UltralyticsCli::new("xinban-no-such-program");
    let result = cli.train(&TrainConfig::default());
    assert!(matches!(result, Err(ModelError::Spawn { .. })));
  }

  #[cfg(unix)]
  #[test]
  fn failing_program_reports_the_status() {
    let cli = UltralyticsCli::new("false");
    let result = cli.predict(&PredictConfig {
      weights: PathBuf::from("best.pt"),
      source: PathBuf::from("images"),
      imgsz: 640,
      device: "cpu".to_string(),
    });
    assert!(matches!(result, Err(ModelError::Failed { .. })));
  }
}
