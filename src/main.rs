// 该文件是 Xinban （心瓣） 项目的一部分。
// src/main.rs - 项目主程序（完整后处理流水线）
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
use std::process::ExitCode;

use clap::Parser;

use xinban::index::FrameIndexParser;
use xinban::labels::StoreError;
use xinban::pipeline::{self, PipelineError, PipelineOptions};

/// Xinban 后处理流水线: 规范化 -> 置信度筛选 -> 连续性过滤
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
struct Args {
  /// 预测标注目录 (ultralytics save_txt 的输出)
  #[arg(long, value_name = "DIR")]
  input: PathBuf,

  /// 过滤结果输出目录（输入目录永远不会被改写）
  #[arg(long, value_name = "DIR")]
  output: PathBuf,

  /// 原始文件备份目录（可选，兼容旧脚本的就地改写习惯）
  #[arg(long, value_name = "DIR")]
  backup: Option<PathBuf>,

  /// 连续出现的阈值（张数），低于该长度的检测段判为误检
  #[arg(long, default_value = "30", value_name = "COUNT")]
  min_run_length: u64,

  /// 关闭置信度筛选（输入已是每帧至多一框时使用）
  #[arg(long)]
  no_best_box: bool,

  /// 自定义帧序号正则（作用于文件名主干，第一个捕获组为序号）；
  /// 默认取主干中最右侧的一段连续数字
  #[arg(long, value_name = "REGEX")]
  index_pattern: Option<String>,

  /// 审计报告 JSON 输出路径
  #[arg(long, value_name = "FILE")]
  report: Option<PathBuf>,
}

fn main() -> ExitCode {
  tracing_subscriber::fmt::init();
  let args = Args::parse();

  println!("Xinban 主动脉瓣检测后处理");
  println!("========================");
  println!("输入目录: {}", args.input.display());
  println!("输出目录: {}", args.output.display());
  if let Some(backup) = &args.backup {
    println!("备份目录: {}", backup.display());
  }
  println!("连续阈值: {}", args.min_run_length);
  println!("置信度筛选: {}", if args.no_best_box { "关" } else { "开" });
  println!();

  let index_parser = match &args.index_pattern {
    Some(pattern) => match FrameIndexParser::with_pattern(pattern) {
      Ok(parser) => parser,
      Err(err) => {
        eprintln!("错误: {err}");
        return ExitCode::from(1);
      }
    },
    None => FrameIndexParser::new(),
  };

  let options = PipelineOptions {
    input_dir: args.input.clone(),
    output_dir: args.output.clone(),
    backup_dir: args.backup.clone(),
    min_run_length: args.min_run_length,
    best_box: !args.no_best_box,
    index_parser,
  };

  let report = match pipeline::run(&options) {
    Ok(report) => report,
    Err(PipelineError::Store(StoreError::EmptyInput(dir))) => {
      eprintln!("警告: 输入目录 {} 中没有标注文件, 无事可做", dir.display());
      return ExitCode::from(2);
    }
    Err(err) => {
      eprintln!("错误: {err}");
      return ExitCode::from(1);
    }
  };

  if let Some(path) = &args.report {
    let text = match serde_json::to_string_pretty(&report.to_json()) {
      Ok(text) => text,
      Err(err) => {
        eprintln!("错误: 无法序列化报告: {err}");
        return ExitCode::from(1);
      }
    };
    if let Err(err) = std::fs::write(path, text) {
      eprintln!("错误: 无法写入报告 {}: {err}", path.display());
      return ExitCode::from(1);
    }
    println!("审计报告: {}", path.display());
  }

  println!();
  println!("处理完成!");
  println!("总文件数: {}", report.files);
  println!(
    "规范化: 保留 {} 框 / 坏行 {} / 丢弃 {}",
    report.normalize.kept, report.normalize.malformed, report.normalize.dropped
  );
  println!("置信度筛选移除: {} 框", report.best_box_removed);
  println!("无法提取序号的帧: {}", report.frames_without_index);
  println!("连续性清空帧数: {}", report.frames_emptied);
  for verdict in &report.continuity.report {
    println!(
      "  区段 [{}..{}] 长度 {} => {}",
      verdict.run.start,
      verdict.run.end,
      verdict.run.length(),
      if verdict.kept { "保留" } else { "判为误检" }
    );
  }

  ExitCode::SUCCESS
}
