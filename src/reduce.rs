// 该文件是 Xinban （心瓣） 项目的一部分。
// src/reduce.rs - 置信度筛选
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

use thiserror::Error;

use crate::record::LabelRecord;

#[derive(Error, Debug)]
pub enum ReduceError {
  #[error("记录缺少置信度, 无法做置信度筛选 (该文件可能是真值标注)")]
  MissingConfidence,
}

/// 每帧至多保留一条记录：置信度最高者。
///
/// 并列时保留输入顺序里先出现的一条（稳定且确定）。
/// 空输入原样返回。任何记录缺少置信度都视为误用，整帧失败。
/// 对已筛选过（至多一条）的输入幂等。
pub fn reduce(records: Vec<LabelRecord>) -> Result<Vec<LabelRecord>, ReduceError> {
  let mut best: Option<(f64, LabelRecord)> = None;

  for record in records {
    let Some(score) = record.confidence else {
      return Err(ReduceError::MissingConfidence);
    };
    let replace = match &best {
      None => true,
      Some((best_score, _)) => score > *best_score,
    };
    if replace {
      best = Some((score, record));
    }
  }

  Ok(best.map(|(_, record)| vec![record]).unwrap_or_default())
}
