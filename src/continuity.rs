// 该文件是 Xinban （心瓣） 项目的一部分。
// src/continuity.rs - 连续性过滤
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

/// 一段极大的连续区间：帧序号严格逐一递增，且每帧都有存活检测。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Run {
  pub start: u64,
  pub end: u64,
}

impl Run {
  pub fn length(&self) -> u64 {
    self.end - self.start + 1
  }
}

/// 一段区间的判定：长度达到阈值则保留，否则判为误检段。
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct RunVerdict {
  pub run: Run,
  pub kept: bool,
}

/// 连续性分析结果。kept/dropped 为帧序号，升序；
/// report 按起始序号升序列出每一段（无论保留与否），供审计与测试核对。
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ContinuityOutcome {
  pub kept: Vec<u64>,
  pub dropped: Vec<u64>,
  pub report: Vec<RunVerdict>,
}

/// 对帧序列做连续性分析。
///
/// 输入是 (帧序号, 是否有存活检测)；顺序不限，内部按序号排序，
/// 结果只由输入集合与阈值决定，与文件系统遍历顺序无关。
/// 没有检测的帧天然断开区间：它的序号不进入任何区间，
/// 相邻有检测的帧因此不再连续。长度恰好等于阈值的区间保留（含边界）。
pub fn filter_runs(frames: &[(u64, bool)], min_run_length: u64) -> ContinuityOutcome {
  let mut indices: Vec<u64> = frames
    .iter()
    .filter(|(_, has_detection)| *has_detection)
    .map(|(index, _)| *index)
    .collect();
  indices.sort_unstable();
  indices.dedup();

  let mut outcome = ContinuityOutcome::default();
  let mut start = 0;
  while start < indices.len() {
    let mut end = start;
    while end + 1 < indices.len() && indices[end + 1] == indices[end] + 1 {
      end += 1;
    }

    let run = Run {
      start: indices[start],
      end: indices[end],
    };
    let kept = run.length() >= min_run_length;
    outcome.report.push(RunVerdict { run, kept });
    if kept {
      outcome.kept.extend_from_slice(&indices[start..=end]);
    } else {
      outcome.dropped.extend_from_slice(&indices[start..=end]);
    }

    start = end + 1;
  }

  outcome
}

#[cfg(test)]
mod tests {
  use super::*;

  fn detected(range: std::ops::RangeInclusive<u64>) -> Vec<(u64, bool)> {
    range.map(|index| (index, true)).collect()
  }

  #[test]
  fn empty_input_gives_empty_report() {
    let outcome = filter_runs(&[], 30);
    assert!(outcome.kept.is_empty());
    assert!(outcome.dropped.is_empty());
    assert!(outcome.report.is_empty());
  }

  #[test]
  fn short_run_is_classified_as_false_positive() {
    // 帧 1..29 全有检测，阈值 30：一段 [1,29] 长度 29，整段丢弃
    let outcome = filter_runs(&detected(1..=29), 30);
    assert!(outcome.kept.is_empty());
    assert_eq!(outcome.dropped, (1..=29).collect::<Vec<_>>());
    assert_eq!(
      outcome.report,
      vec![RunVerdict {
        run: Run { start: 1, end: 29 },
        kept: false
      }]
    );
  }

  #[test]
  fn long_run_is_kept_entirely() {
    // 帧 1..35 全有检测：一段 [1,35] 长度 35 >= 30，整段保留
    let outcome = filter_runs(&detected(1..=35), 30);
    assert_eq!(outcome.kept, (1..=35).collect::<Vec<_>>());
    assert!(outcome.dropped.is_empty());
    assert_eq!(outcome.report.len(), 1);
    assert!(outcome.report[0].kept);
  }

  #[test]
  fn frame_without_detection_breaks_the_run() {
    // 1..20 有检测，21 无，22..40 有：两段 20 和 19，都低于阈值
    let mut frames = detected(1..=20);
    frames.push((21, false));
    frames.extend(detected(22..=40));
    let outcome = filter_runs(&frames, 30);
    assert!(outcome.kept.is_empty());
    assert_eq!(outcome.report.len(), 2);
    assert_eq!(outcome.report[0].run, Run { start: 1, end: 20 });
    assert_eq!(outcome.report[1].run, Run { start: 22, end: 40 });
    assert!(!outcome.report[0].kept);
    assert!(!outcome.report[1].kept);
  }

  #[test]
  fn threshold_boundary_is_inclusive() {
    let outcome = filter_runs(&detected(1..=30), 30);
    assert_eq!(outcome.kept.len(), 30);

    let outcome = filter_runs(&detected(1..=29), 30);
    assert_eq!(outcome.dropped.len(), 29);
  }

  #[test]
  fn report_runs_are_ordered_and_consistent() {
    let mut frames = detected(5..=40);
    frames.extend(detected(100..=160));
    frames.extend(detected(50..=52));
    let outcome = filter_runs(&frames, 30);

    let mut last_end = None;
    for verdict in &outcome.report {
      assert_eq!(
        verdict.run.end - verdict.run.start + 1,
        verdict.run.length()
      );
      if let Some(last_end) = last_end {
        assert!(verdict.run.start > last_end);
      }
      last_end = Some(verdict.run.end);
    }

    // 保留帧恰好等于长度达标区间的并集
    let expected: Vec<u64> = (5..=40).chain(100..=160).collect();
    assert_eq!(outcome.kept, expected);
    assert_eq!(outcome.dropped, (50..=52).collect::<Vec<_>>());
  }

  #[test]
  fn input_order_does_not_matter() {
    let mut frames = detected(1..=35);
    frames.reverse();
    let shuffled = filter_runs(&frames, 30);
    let sorted = filter_runs(&detected(1..=35), 30);
    assert_eq!(shuffled, sorted);
  }
}
