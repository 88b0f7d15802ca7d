// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/bin/serve_stdio.rs - 标准输入输出服务演示
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

use std::io::{BufRead, Write};
use std::sync::mpsc;
use std::thread;
use std::time::Duration;

use anyhow::Result;
use clap::Parser;
use tracing::{info, warn};
use url::Url;

use hanzhong::{
  FromUrl,
  loader::FileImageLoader,
  mask::BitMask,
  model::{Instance, InstanceResult, ModelHandle, ReplayModel},
  service::{ServiceNode, service_channel},
  wire::{DetectRequest, ErrorKind, WireReply},
};

/// Hanzhong 服务演示配置
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 图像根目录（folder:///path/to/images）
  #[arg(long, value_name = "SOURCE")]
  pub images: Url,

  /// 置信度阈值 (0.0 - 1.0)
  #[arg(long, default_value = "0.4", value_name = "THRESHOLD")]
  pub threshold: f32,

  /// 回放模型模拟的单次推理耗时（毫秒）
  #[arg(long, default_value = "50", value_name = "MS")]
  pub latency_ms: u64,

  /// 请求队列深度（排队上限，队列满后输入阻塞）
  #[arg(long, default_value = "8", value_name = "COUNT")]
  pub queue_depth: usize,
}

/// 回放用的固定结果：两个实例，掩码各占 8x8 网格的左右半边
fn demo_result() -> InstanceResult {
  let mut left = BitMask::new(8, 8);
  let mut right = BitMask::new(8, 8);
  for y in 0..8 {
    for x in 0..4 {
      left.set(x, y, true);
      right.set(x + 4, y, true);
    }
  }

  InstanceResult {
    items: Box::new([
      Instance {
        class_id: 3,
        score: 0.91,
        bbox: [0.0, 0.0, 0.5, 1.0],
        mask: left,
      },
      Instance {
        class_id: 7,
        score: 0.55,
        bbox: [0.5, 0.0, 1.0, 1.0],
        mask: right,
      },
    ]),
  }
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("图像根目录: {}", args.images);
  info!("置信度阈值: {}", args.threshold);
  info!("模拟推理耗时: {} ms", args.latency_ms);
  info!("请求队列深度: {}", args.queue_depth);

  let loader = FileImageLoader::from_url(&args.images)?;
  let model: ReplayModel<image::RgbImage> =
    ReplayModel::new(demo_result()).with_latency(Duration::from_millis(args.latency_ms));
  let handle = ModelHandle::new(model, args.threshold);
  let node = ServiceNode::new(handle, loader);

  let (client, listener) = service_channel(args.queue_depth);
  let server = thread::spawn(move || listener.serve(&node));

  let (stop_tx, stop_rx) = mpsc::channel();
  ctrlc::set_handler(move || {
    info!("收到中断信号，准备退出...");
    let _ = stop_tx.send(());
    thread::spawn(|| {
      thread::sleep(Duration::from_secs(30));
      warn!("强制退出程序");
      std::process::exit(1);
    });
  })
  .expect("Error setting Ctrl-C handler");

  info!("开始服务，按行读取 JSON 请求...");
  let stdin = std::io::stdin();
  let mut stdout = std::io::stdout();
  for line in stdin.lock().lines() {
    let line = line?;
    if line.trim().is_empty() {
      continue;
    }

    let reply = match serde_json::from_str::<DetectRequest>(&line) {
      Ok(request) => client.call(request)?,
      Err(e) => {
        // 解析失败同样要应答一行错误
        warn!("请求解析失败: {}", e);
        WireReply::Err {
          kind: ErrorKind::InvalidRequest,
          message: format!("请求解析失败: {}", e),
        }
      }
    };

    writeln!(stdout, "{}", serde_json::to_string(&reply)?)?;
    stdout.flush()?;

    if stop_rx.try_recv().is_ok() {
      warn!("中断信号接收，退出主循环");
      break;
    }
  }

  drop(client);
  let _ = server.join();
  info!("服务退出");

  Ok(())
}
