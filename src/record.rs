// 该文件是 Xinban （心瓣） 项目的一部分。
// src/record.rs - 标注记录定义
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

use std::fmt;

use thiserror::Error;

#[derive(Error, Debug)]
pub enum RecordError {
  #[error("标注行字段数错误: 期望 5 或 6 个字段, 实际 {0} 个")]
  FieldCount(usize),
  #[error("标注行字段无法解析为数值: '{0}'")]
  BadNumber(String),
}

/// 从标注文件一行解析出的原始记录，未经任何校验或钳制。
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct RawRecord {
  pub class: f64,
  pub x_center: f64,
  pub y_center: f64,
  pub width: f64,
  pub height: f64,
  pub confidence: Option<f64>,
}

/// 规范化后的标注记录，满足 YOLO 归一化约定：
/// 中心坐标在 [0,1]，宽高在 [0.001,1]，框完整落在图像内。
/// 置信度仅预测结果携带，真值标注为 None。
#[derive(Debug, Clone, PartialEq)]
pub struct LabelRecord {
  pub class_id: u32,
  pub x_center: f64,
  pub y_center: f64,
  pub width: f64,
  pub height: f64,
  pub confidence: Option<f64>,
}

/// 解析一行标注文本: `<class> <x> <y> <w> <h> [<conf>]`。
/// 字段以空白分隔；字段数不对或任一字段不是有限数值都算坏行。
pub fn parse_line(line: &str) -> Result<RawRecord, RecordError> {
  let fields: Vec<&str> = line.split_whitespace().collect();
  if fields.len() < 5 || fields.len() > 6 {
    return Err(RecordError::FieldCount(fields.len()));
  }

  let mut values = [0.0f64; 5];
  for (value, field) in values.iter_mut().zip(fields.iter()) {
    *value = parse_number(field)?;
  }

  let confidence = match fields.get(5) {
    Some(field) => Some(parse_number(field)?),
    None => None,
  };

  Ok(RawRecord {
    class: values[0],
    x_center: values[1],
    y_center: values[2],
    width: values[3],
    height: values[4],
    confidence,
  })
}

fn parse_number(field: &str) -> Result<f64, RecordError> {
  let value: f64 = field
    .parse()
    .map_err(|_| RecordError::BadNumber(field.to_string()))?;
  // "nan"/"inf" 能通过 f64 解析，但对钳制和比较没有意义，按坏字段处理。
  if !value.is_finite() {
    return Err(RecordError::BadNumber(field.to_string()));
  }
  Ok(value)
}

impl fmt::Display for LabelRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    write!(
      f,
      "{} {:.6} {:.6} {:.6} {:.6}",
      self.class_id, self.x_center, self.y_center, self.width, self.height
    )?;
    if let Some(confidence) = self.confidence {
      write!(f, " {confidence:.6}")?;
    }
    Ok(())
  }
}
