// 该文件是 Xinban （心瓣） 项目的一部分。
// src/index.rs - 帧序号解析
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

use std::sync::OnceLock;

use regex::Regex;
use thiserror::Error;

#[derive(Error, Debug)]
pub enum IndexPatternError {
  #[error("自定义序号模式必须包含一个捕获组")]
  MissingCaptureGroup,
  #[error("自定义序号模式无效: {0}")]
  InvalidPattern(#[from] regex::Error),
}

/// 从文件名主干提取帧序号。
///
/// 文件名是自由字符串，序号提取本质上是启发式的，因此约定必须显式：
/// 默认取主干中最右侧的一段连续数字（`patient01_0042`、`img_0042`、
/// `0042` 都得到 42，同一数据集内保持一致）；同一数据集若使用别的
/// 命名方案，可用 `with_pattern` 指定自定义正则，以第一个捕获组为序号。
#[derive(Debug, Clone, Default)]
pub struct FrameIndexParser {
  custom: Option<Regex>,
}

impl FrameIndexParser {
  pub fn new() -> Self {
    Self::default()
  }

  /// 使用自定义命名约定。模式作用于文件名主干，
  /// 第一个捕获组必须是十进制序号。
  pub fn with_pattern(pattern: &str) -> Result<Self, IndexPatternError> {
    let custom = Regex::new(pattern)?;
    if custom.captures_len() < 2 {
      return Err(IndexPatternError::MissingCaptureGroup);
    }
    Ok(Self {
      custom: Some(custom),
    })
  }

  /// 提取帧序号；主干中没有数字（或不匹配自定义模式）时返回 None。
  /// None 不是错误：这样的帧只是不参与连续性分析。
  pub fn parse_index(&self, stem: &str) -> Option<u64> {
    if let Some(custom) = &self.custom {
      return custom
        .captures(stem)
        .and_then(|caps| caps.get(1))
        .and_then(|group| group.as_str().parse().ok());
    }

    static DIGIT_RUN: OnceLock<Regex> = OnceLock::new();
    let digit_run = DIGIT_RUN.get_or_init(|| Regex::new(r"\d+").unwrap());
    digit_run
      .find_iter(stem)
      .last()
      .and_then(|group| group.as_str().parse().ok())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn common_naming_conventions() {
    let parser = FrameIndexParser::new();
    assert_eq!(parser.parse_index("patient01_0042"), Some(42));
    assert_eq!(parser.parse_index("img_0042"), Some(42));
    assert_eq!(parser.parse_index("frame0042"), Some(42));
    assert_eq!(parser.parse_index("0042"), Some(42));
  }

  #[test]
  fn rightmost_digit_run_wins() {
    let parser = FrameIndexParser::new();
    assert_eq!(parser.parse_index("patient0003_frame_0117"), Some(117));
    assert_eq!(parser.parse_index("a12b34"), Some(34));
  }

  #[test]
  fn no_digits_means_no_index() {
    let parser = FrameIndexParser::new();
    assert_eq!(parser.parse_index("cover"), None);
    assert_eq!(parser.parse_index(""), None);
  }

  #[test]
  fn custom_pattern_overrides_the_default() {
    let parser = FrameIndexParser::with_pattern(r"^patient(\d+)_").unwrap();
    assert_eq!(parser.parse_index("patient0003_frame_0117"), Some(3));
    assert_eq!(parser.parse_index("frame_0117"), None);
  }

  #[test]
  fn custom_pattern_requires_a_capture_group() {
    assert!(matches!(
      FrameIndexParser::with_pattern(r"\d+"),
      Err(IndexPatternError::MissingCaptureGroup)
    ));
  }
}
