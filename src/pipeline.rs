// 该文件是 Xinban （心瓣） 项目的一部分。
// src/pipeline.rs - 后处理流水线编排
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

use std::collections::BTreeSet;
use std::path::PathBuf;

use chrono::Utc;
use serde_json::json;
use thiserror::Error;
use tracing::{info, warn};

use crate::continuity::{self, ContinuityOutcome};
use crate::index::FrameIndexParser;
use crate::labels::{self, StoreError};
use crate::normalize::NormalizeSummary;
use crate::record::LabelRecord;
use crate::reduce::{self, ReduceError};

#[derive(Error, Debug)]
pub enum PipelineError {
  #[error(transparent)]
  Store(#[from] StoreError),
  #[error("帧 {frame} 置信度筛选失败: {source}")]
  Reduce { frame: String, source: ReduceError },
}

/// 流水线配置。输入目录只读；输出永远写到新目录，
/// 备份目录只是对旧脚本就地改写习惯的兼容。
#[derive(Debug, Clone)]
pub struct PipelineOptions {
  pub input_dir: PathBuf,
  pub output_dir: PathBuf,
  pub backup_dir: Option<PathBuf>,
  pub min_run_length: u64,
  pub best_box: bool,
  pub index_parser: FrameIndexParser,
}

/// 一次流水线运行的审计汇总。
#[derive(Debug, Clone, Default)]
pub struct PipelineReport {
  pub files: usize,
  pub normalize: NormalizeSummary,
  pub best_box_removed: usize,
  pub frames_without_index: usize,
  pub frames_emptied: usize,
  pub min_run_length: u64,
  pub continuity: ContinuityOutcome,
}

impl PipelineReport {
  pub fn to_json(&self) -> serde_json::Value {
    json!({
      "generated_at": Utc::now().to_rfc3339(),
      "files": self.files,
      "normalize": {
        "kept": self.normalize.kept,
        "dropped": self.normalize.dropped,
        "malformed": self.normalize.malformed,
      },
      "best_box_removed": self.best_box_removed,
      "frames_without_index": self.frames_without_index,
      "frames_emptied": self.frames_emptied,
      "min_run_length": self.min_run_length,
      "runs": self.continuity.report.iter().map(|verdict| json!({
        "start": verdict.run.start,
        "end": verdict.run.end,
        "length": verdict.run.length(),
        "kept": verdict.kept,
      })).collect::<Vec<_>>(),
    })
  }
}

struct FrameState {
  path: PathBuf,
  key: String,
  index: Option<u64>,
  records: Vec<LabelRecord>,
}

/// 依次执行规范化、置信度筛选与连续性过滤，把结果写进输出目录。
///
/// 三个阶段都是对整个记录集的纯变换，这里只负责文件进出与计数。
/// 任何写失败立即中止，之前已写出的文件保持完整（写入都是整文件替换）。
pub fn run(options: &PipelineOptions) -> Result<PipelineReport, PipelineError> {
  let files = labels::scan_label_dir(&options.input_dir)?;
  info!(
    "找到 {} 个标注文件: {}",
    files.len(),
    options.input_dir.display()
  );

  let mut report = PipelineReport {
    files: files.len(),
    min_run_length: options.min_run_length,
    ..PipelineReport::default()
  };

  // 阶段一/二: 逐帧规范化，（可选）只留置信度最高的框
  let mut frames = Vec::with_capacity(files.len());
  for path in files {
    let key = labels::frame_key(&path);
    let (mut records, summary) = labels::read_records(&path)?;
    report.normalize.merge(&summary);

    if options.best_box {
      let before = records.len();
      records = reduce::reduce(records).map_err(|source| PipelineError::Reduce {
        frame: key.clone(),
        source,
      })?;
      report.best_box_removed += before - records.len();
    }

    let index = options.index_parser.parse_index(&key);
    if index.is_none() {
      report.frames_without_index += 1;
      warn!("无法从文件名提取帧序号, 不参与连续性分析: {key}");
    }

    frames.push(FrameState {
      path,
      key,
      index,
      records,
    });
  }

  // 阶段三: 对能解析出序号的帧做连续性分析
  let marks: Vec<(u64, bool)> = frames
    .iter()
    .filter_map(|frame| frame.index.map(|index| (index, !frame.records.is_empty())))
    .collect();
  report.continuity = continuity::filter_runs(&marks, options.min_run_length);
  for verdict in &report.continuity.report {
    info!(
      "区段 [{}..{}] 长度 {} => {}",
      verdict.run.start,
      verdict.run.end,
      verdict.run.length(),
      if verdict.kept { "保留" } else { "判为误检" }
    );
  }

  // 写输出。备份（若启用）在第一次写之前完成。
  if let Some(backup_dir) = &options.backup_dir {
    for frame in &frames {
      labels::backup_file(&frame.path, backup_dir)?;
    }
    info!("已备份 {} 个原始文件到 {}", frames.len(), backup_dir.display());
  }

  let dropped: BTreeSet<u64> = report.continuity.dropped.iter().copied().collect();
  for frame in &frames {
    let out_path = options.output_dir.join(format!("{}.txt", frame.key));
    let emptied = frame
      .index
      .is_some_and(|index| dropped.contains(&index));
    if emptied && !frame.records.is_empty() {
      report.frames_emptied += 1;
    }
    let final_records: &[LabelRecord] = if emptied { &[] } else { &frame.records };
    labels::write_records(&out_path, final_records)?;
  }

  info!(
    "处理完成: {} 帧, 规范化保留 {} 框 (坏行 {}, 丢弃 {}), 置信度筛选移除 {}, 连续性清空 {} 帧",
    report.files,
    report.normalize.kept,
    report.normalize.malformed,
    report.normalize.dropped,
    report.best_box_removed,
    report.frames_emptied
  );

  Ok(report)
}

#[cfg(test)]
mod tests {
  use std::fs;

  use super::*;

  fn write_frames(dir: &std::path::Path, range: std::ops::RangeInclusive<u64>, line: &str) {
    for index in range {
      fs::write(dir.join(format!("img_{index:04}.txt")), line).unwrap();
    }
  }

  fn options(input: &std::path::Path, output: &std::path::Path) -> PipelineOptions {
    PipelineOptions {
      input_dir: input.to_path_buf(),
      output_dir: output.to_path_buf(),
      backup_dir: None,
      min_run_length: 30,
      best_box: true,
      index_parser: FrameIndexParser::new(),
    }
  }

  #[test]
  fn short_burst_is_emptied_long_run_survives() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    // 1..=35 连续检测, 50..=52 孤立误检
    write_frames(&input, 1..=35, "0 0.5 0.5 0.2 0.2 0.9\n");
    write_frames(&input, 50..=52, "0 0.5 0.5 0.2 0.2 0.8\n");

    let report = run(&options(&input, &output)).unwrap();
    assert_eq!(report.files, 38);
    assert_eq!(report.frames_emptied, 3);
    assert_eq!(report.continuity.report.len(), 2);

    let kept = fs::read_to_string(output.join("img_0001.txt")).unwrap();
    assert_eq!(kept, "0 0.500000 0.500000 0.200000 0.200000 0.900000\n");
    let emptied = fs::read_to_string(output.join("img_0050.txt")).unwrap();
    assert!(emptied.is_empty());
  }

  #[test]
  fn best_box_keeps_only_the_strongest_prediction() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    write_frames(
      &input,
      1..=30,
      "0 0.5 0.5 0.2 0.2 0.9\n0 0.4 0.4 0.1 0.1 0.6\n",
    );

    let report = run(&options(&input, &output)).unwrap();
    assert_eq!(report.best_box_removed, 30);
    let kept = fs::read_to_string(output.join("img_0001.txt")).unwrap();
    assert_eq!(kept.lines().count(), 1);
    assert!(kept.contains("0.900000"));
  }

  #[test]
  fn originals_are_never_mutated() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    write_frames(&input, 1..=3, "0 0.5 0.5 0.2 0.2 0.9\n");
    run(&options(&input, &output)).unwrap();

    // 孤立短段被清空，但输入文件原样保留
    assert_eq!(
      fs::read_to_string(input.join("img_0001.txt")).unwrap(),
      "0 0.5 0.5 0.2 0.2 0.9\n"
    );
    assert!(fs::read_to_string(output.join("img_0001.txt")).unwrap().is_empty());
  }

  #[test]
  fn frame_without_index_passes_through_untouched() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    // 1..=3 是长度 3 的孤立短段; cover 无帧序号但带检测
    write_frames(&input, 1..=3, "0 0.5 0.5 0.2 0.2 0.9\n");
    fs::write(input.join("cover.txt"), "0 0.5 0.5 0.2 0.2 0.7\n").unwrap();

    let report = run(&options(&input, &output)).unwrap();
    assert_eq!(report.frames_without_index, 1);

    // 无序号的帧不延长区间: 短段照常整段清空
    assert_eq!(report.continuity.report.len(), 1);
    assert!(!report.continuity.report[0].kept);
    assert!(
      fs::read_to_string(output.join("img_0001.txt"))
        .unwrap()
        .is_empty()
    );

    // 它自己也不参与连续性分析, 记录原样写出
    assert_eq!(
      fs::read_to_string(output.join("cover.txt")).unwrap(),
      "0 0.500000 0.500000 0.200000 0.200000 0.700000\n"
    );
  }

  #[test]
  fn empty_input_directory_is_nothing_to_do() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    let result = run(&options(&input, &output));
    assert!(matches!(
      result,
      Err(PipelineError::Store(StoreError::EmptyInput(_)))
    ));
  }

  #[test]
  fn ground_truth_input_fails_loudly_when_reducing() {
    let dir = tempfile::tempdir().unwrap();
    let input = dir.path().join("labels");
    let output = dir.path().join("filtered");
    fs::create_dir_all(&input).unwrap();

    write_frames(&input, 1..=2, "0 0.5 0.5 0.2 0.2\n");
    let result = run(&options(&input, &output));
    assert!(matches!(result, Err(PipelineError::Reduce { .. })));
  }
}
