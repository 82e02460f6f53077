// 该文件是 Xinban （心瓣） 项目的一部分。
// src/normalize.rs - 标注规范化
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

use crate::record::{self, LabelRecord, RawRecord};

/// 宽高下限，避免退化的零面积框。
pub const MIN_BOX_SIZE: f64 = 0.001;

/// 规范化结果：要么得到一条合法记录，要么该框无法修复被丢弃。
#[derive(Debug, Clone, PartialEq)]
pub enum Normalized {
  Record(LabelRecord),
  Dropped,
}

/// 把一条原始记录规范化为合法的 YOLO 标注。
///
/// 规则（顺序即语义）：
/// 1. 宽或高本身超过 1 的框即使中心居中也放不进图像，无法修复，直接丢弃；
/// 2. 类别向零截断，负数落到 0；
/// 3. 中心坐标钳制到 [0,1]，宽高钳制到 [0.001,1]；
/// 4. 框若仍越出图像，移动中心（而不是改变尺寸）把它收回 [0,1]×[0,1]；
/// 5. 置信度（若有）钳制到 [0,1]。
pub fn normalize(raw: &RawRecord) -> Normalized {
  if raw.width > 1.0 || raw.height > 1.0 {
    return Normalized::Dropped;
  }

  let class_id = if raw.class < 0.0 {
    0
  } else {
    raw.class.trunc() as u32
  };

  let width = raw.width.clamp(MIN_BOX_SIZE, 1.0);
  let height = raw.height.clamp(MIN_BOX_SIZE, 1.0);
  let x_center = raw
    .x_center
    .clamp(0.0, 1.0)
    .clamp(width / 2.0, 1.0 - width / 2.0);
  let y_center = raw
    .y_center
    .clamp(0.0, 1.0)
    .clamp(height / 2.0, 1.0 - height / 2.0);
  let confidence = raw.confidence.map(|confidence| confidence.clamp(0.0, 1.0));

  Normalized::Record(LabelRecord {
    class_id,
    x_center,
    y_center,
    width,
    height,
    confidence,
  })
}

/// 一个标注文件的规范化统计。
#[derive(Debug, Default, Clone, Copy, PartialEq, Eq)]
pub struct NormalizeSummary {
  /// 规范化后保留的记录数
  pub kept: usize,
  /// 无法修复而丢弃的记录数
  pub dropped: usize,
  /// 无法解析而跳过的行数
  pub malformed: usize,
}

impl NormalizeSummary {
  pub fn merge(&mut self, other: &NormalizeSummary) {
    self.kept += other.kept;
    self.dropped += other.dropped;
    self.malformed += other.malformed;
  }
}

/// 逐行规范化一个标注文件的内容。
/// 坏行跳过并计数，绝不中断同一文件里其余行的处理；空行不算坏行。
pub fn normalize_lines<'a>(
  lines: impl Iterator<Item = &'a str>,
) -> (Vec<LabelRecord>, NormalizeSummary) {
  let mut records = Vec::new();
  let mut summary = NormalizeSummary::default();

  for line in lines {
    let line = line.trim();
    if line.is_empty() {
      continue;
    }
    match record::parse_line(line) {
      Ok(raw) => match normalize(&raw) {
        Normalized::Record(record) => {
          summary.kept += 1;
          records.push(record);
        }
        Normalized::Dropped => summary.dropped += 1,
      },
      Err(_) => summary.malformed += 1,
    }
  }

  (records, summary)
}
