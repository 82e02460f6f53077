// 该文件是 Xinban （心瓣） 项目的一部分。
// src/split.rs - 按 patient 切分数据集
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
use tracing::{info, warn};

#[derive(Error, Debug)]
pub enum SplitError {
  #[error("无法读取标注根目录 {path}: {source}")]
  UnreadableRoot { path: PathBuf, source: io::Error },
  #[error("标注根目录 {0} 下没有含标注的 patient 子目录")]
  NoPatients(PathBuf),
  #[error("I/O 错误: {0}")]
  Io(#[from] io::Error),
}

/// 切分配置。同一 patient 的帧高度相似，必须整体进同一侧，
/// 否则验证集会泄漏训练集信息；因此切分单位是 patient 而不是帧。
#[derive(Debug, Clone)]
pub struct SplitOptions {
  pub image_dir: PathBuf,
  pub label_dir: PathBuf,
  pub output_dir: PathBuf,
  pub train_count: usize,
  pub val_count: usize,
  /// true 时移动文件（旧脚本行为），false 时复制
  pub move_files: bool,
}

#[derive(Debug, Default, Clone, Copy)]
pub struct SplitSummary {
  pub train_patients: usize,
  pub val_patients: usize,
  pub train_images: usize,
  pub train_labels: usize,
  pub val_images: usize,
  pub val_labels: usize,
  pub missing_images: usize,
}

/// 按 patient 顺序切分数据集：排序后的前 train_count 个 patient 进训练集，
/// 随后的 val_count 个进验证集。以标注目录为准；没有 .txt 的 patient 跳过。
pub fn split_dataset(options: &SplitOptions) -> Result<SplitSummary, SplitError> {
  let mut patients = Vec::new();
  let entries =
    fs::read_dir(&options.label_dir).map_err(|source| SplitError::UnreadableRoot {
      path: options.label_dir.clone(),
      source,
    })?;
  for entry in entries {
    let entry = entry?;
    let path = entry.path();
    let name = entry.file_name().to_string_lossy().into_owned();
    if path.is_dir() && name.starts_with("patient") && dir_has_labels(&path)? {
      patients.push(name);
    }
  }
  if patients.is_empty() {
    return Err(SplitError::NoPatients(options.label_dir.clone()));
  }
  patients.sort();
  info!("找到 {} 个 patient 子目录", patients.len());

  let mut train_count = options.train_count;
  if train_count > patients.len() {
    train_count = patients.len().saturating_sub(options.val_count);
    warn!(
      "训练集数量 {} 超过总数 {}, 改用前 {} 个",
      options.train_count,
      patients.len(),
      train_count
    );
  }
  let val_end = (train_count + options.val_count).min(patients.len());
  let (train_patients, rest) = patients.split_at(train_count);
  let val_patients = &rest[..val_end - train_count];
  if val_patients.len() < options.val_count {
    warn!(
      "验证集实际数量 {} 少于预期 {}",
      val_patients.len(),
      options.val_count
    );
  }

  let mut summary = SplitSummary {
    train_patients: train_patients.len(),
    val_patients: val_patients.len(),
    ..SplitSummary::default()
  };

  for patient in train_patients {
    let (images, labels) = transfer_patient(options, patient, "train", &mut summary)?;
    summary.train_images += images;
    summary.train_labels += labels;
  }
  for patient in val_patients {
    let (images, labels) = transfer_patient(options, patient, "val", &mut summary)?;
    summary.val_images += images;
    summary.val_labels += labels;
  }

  info!(
    "切分完成: train {} patients ({} 图 / {} 标), val {} patients ({} 图 / {} 标)",
    summary.train_patients,
    summary.train_images,
    summary.train_labels,
    summary.val_patients,
    summary.val_images,
    summary.val_labels
  );
  Ok(summary)
}

fn dir_has_labels(dir: &Path) -> Result<bool, io::Error> {
  for entry in fs::read_dir(dir)? {
    let path = entry?.path();
    if path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    {
      return Ok(true);
    }
  }
  Ok(false)
}

fn transfer_patient(
  options: &SplitOptions,
  patient: &str,
  subset: &str,
  summary: &mut SplitSummary,
) -> Result<(usize, usize), SplitError> {
  let image_out = options.output_dir.join(subset).join("images");
  let label_out = options.output_dir.join(subset).join("labels");
  fs::create_dir_all(&image_out)?;
  fs::create_dir_all(&label_out)?;

  let mut label_files = Vec::new();
  for entry in fs::read_dir(options.label_dir.join(patient))? {
    let path = entry?.path();
    if path
      .extension()
      .is_some_and(|ext| ext.eq_ignore_ascii_case("txt"))
    {
      label_files.push(path);
    }
  }
  label_files.sort();

  let mut images = 0;
  let mut labels = 0;
  for label_file in label_files {
    let file_name = label_file.file_name().unwrap_or_default().to_owned();
    transfer(&label_file, &label_out.join(&file_name), options.move_files)?;
    labels += 1;

    let stem = label_file
      .file_stem()
      .map(|stem| stem.to_string_lossy().into_owned())
      .unwrap_or_default();
    let image_file = options
      .image_dir
      .join(patient)
      .join(format!("{stem}.png"));
    if image_file.is_file() {
      let image_name = image_file.file_name().unwrap_or_default().to_owned();
      transfer(&image_file, &image_out.join(&image_name), options.move_files)?;
      images += 1;
    } else {
      summary.missing_images += 1;
      warn!("找不到对应的图片: {}", image_file.display());
    }
  }

  info!("[{subset}] {patient}: {images} 图片, {labels} 标注");
  Ok((images, labels))
}

fn transfer(src: &Path, dst: &Path, move_files: bool) -> Result<(), io::Error> {
  if move_files {
    // rename 跨文件系统会失败，退回复制加删除
    if fs::rename(src, dst).is_err() {
      fs::copy(src, dst)?;
      fs::remove_file(src)?;
    }
    Ok(())
  } else {
    fs::copy(src, dst).map(|_| ())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  fn seed_patient(root: &Path, name: &str, frames: u32) {
    let image_dir = root.join("images").join(name);
    let label_dir = root.join("labels").join(name);
    fs::create_dir_all(&image_dir).unwrap();
    fs::create_dir_all(&label_dir).unwrap();
    for frame in 0..frames {
      fs::write(
        label_dir.join(format!("{name}_{frame:04}.txt")),
        "0 0.5 0.5 0.2 0.2\n",
      )
      .unwrap();
      fs::write(image_dir.join(format!("{name}_{frame:04}.png")), "png").unwrap();
    }
  }

  fn split_options(root: &Path, train: usize, val: usize) -> SplitOptions {
    SplitOptions {
      image_dir: root.join("images"),
      label_dir: root.join("labels"),
      output_dir: root.join("datasets"),
      train_count: train,
      val_count: val,
      move_files: false,
    }
  }

  #[test]
  fn patients_are_split_in_sorted_order() {
    let dir = tempfile::tempdir().unwrap();
    seed_patient(dir.path(), "patient0002", 2);
    seed_patient(dir.path(), "patient0001", 3);
    seed_patient(dir.path(), "patient0003", 1);

    let summary = split_dataset(&split_options(dir.path(), 2, 1)).unwrap();
    assert_eq!(summary.train_patients, 2);
    assert_eq!(summary.val_patients, 1);
    assert_eq!(summary.train_labels, 5);
    assert_eq!(summary.val_labels, 1);
    assert_eq!(summary.missing_images, 0);

    // patient0003 排在最后，应整体落入验证集
    assert!(
      dir
        .path()
        .join("datasets/val/labels/patient0003_0000.txt")
        .is_file()
    );
    assert!(
      dir
        .path()
        .join("datasets/train/images/patient0001_0000.png")
        .is_file()
    );
  }

  #[test]
  fn missing_image_is_counted_not_fatal() {
    let dir = tempfile::tempdir().unwrap();
    seed_patient(dir.path(), "patient0001", 1);
    fs::remove_file(
      dir
        .path()
        .join("images/patient0001/patient0001_0000.png"),
    )
    .unwrap();

    let summary = split_dataset(&split_options(dir.path(), 1, 0)).unwrap();
    assert_eq!(summary.missing_images, 1);
    assert_eq!(summary.train_labels, 1);
  }

  #[test]
  fn no_patients_is_an_error() {
    let dir = tempfile::tempdir().unwrap();
    fs::create_dir_all(dir.path().join("labels")).unwrap();
    fs::create_dir_all(dir.path().join("images")).unwrap();
    assert!(matches!(
      split_dataset(&split_options(dir.path(), 1, 1)),
      Err(SplitError::NoPatients(_))
    ));
  }
}
