// 该文件是 Xinban （心瓣） 项目的一部分。
// src/labels.rs - 标注文件存取
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

use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;
use tracing::warn;

use crate::normalize::{self, NormalizeSummary};
use crate::record::LabelRecord;

#[derive(Error, Debug)]
pub enum StoreError {
  #[error("无法读取输入目录 {path}: {source}")]
  UnreadableInput { path: PathBuf, source: io::Error },
  #[error("输入目录 {0} 中没有找到标注文件")]
  EmptyInput(PathBuf),
  #[error("无法写入输出 {path}: {source}")]
  UnwritableOutput { path: PathBuf, source: io::Error },
  #[error("I/O 错误: {0}")]
  Io(#[from] io::Error),
}

/// 收集目录下全部 .txt 标注文件，按路径排序。
/// 排序保证后续处理与文件系统遍历顺序无关；找不到任何标注文件是
/// “无事可做”，由调用方决定以哪个退出码上报。
pub fn scan_label_dir(dir: &Path) -> Result<Vec<PathBuf>, StoreError> {
  let entries = fs::read_dir(dir).map_err(|source| StoreError::UnreadableInput {
    path: dir.to_path_buf(),
    source,
  })?;

  let mut files = Vec::new();
  for entry in entries {
    let entry = entry.map_err(|source| StoreError::UnreadableInput {
      path: dir.to_path_buf(),
      source,
    })?;
    let path = entry.path();
    if path.is_file()
      && path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    {
      files.push(path);
    }
  }

  if files.is_empty() {
    return Err(StoreError::EmptyInput(dir.to_path_buf()));
  }
  files.sort();
  Ok(files)
}

/// 文件名主干，作为帧标识（与同名图像共享）。
pub fn frame_key(path: &Path) -> String {
  path
    .file_stem()
    .map(|stem| stem.to_string_lossy().into_owned())
    .unwrap_or_default()
}

/// 读取并规范化一个标注文件。
/// 坏行与无法修复的框逐行跳过并计数，不中断该文件其余行。
pub fn read_records(path: &Path) -> Result<(Vec<LabelRecord>, NormalizeSummary), StoreError> {
  let content = fs::read_to_string(path)?;
  let (records, summary) = normalize::normalize_lines(content.lines());
  if summary.malformed > 0 {
    warn!(
      "文件 {} 中有 {} 行无法解析, 已跳过",
      path.display(),
      summary.malformed
    );
  }
  if summary.dropped > 0 {
    warn!(
      "文件 {} 中有 {} 个框无法修复, 已丢弃",
      path.display(),
      summary.dropped
    );
  }
  Ok((records, summary))
}

/// 整文件替换式写入，必要时创建父目录。
/// 写失败视为致命：上层应立即中止，避免数据集处于不可审计的半改状态。
pub fn write_records(path: &Path, records: &[LabelRecord]) -> Result<(), StoreError> {
  if let Some(parent) = path.parent()
    && !parent.as_os_str().is_empty()
  {
    fs::create_dir_all(parent).map_err(|source| StoreError::UnwritableOutput {
      path: path.to_path_buf(),
      source,
    })?;
  }

  let mut content = String::new();
  for record in records {
    content.push_str(&record.to_string());
    content.push('\n');
  }

  fs::write(path, content).map_err(|source| StoreError::UnwritableOutput {
    path: path.to_path_buf(),
    source,
  })
}

/// 在产生任何输出之前，把原始文件按原名备份到指定目录。
pub fn backup_file(path: &Path, backup_dir: &Path) -> Result<(), StoreError> {
  fs::create_dir_all(backup_dir).map_err(|source| StoreError::UnwritableOutput {
    path: backup_dir.to_path_buf(),
    source,
  })?;

  let target = backup_dir.join(path.file_name().unwrap_or_default());
  fs::copy(path, &target).map_err(|source| StoreError::UnwritableOutput {
    path: target.clone(),
    source,
  })?;
  Ok(())
}
