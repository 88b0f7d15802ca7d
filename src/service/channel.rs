// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/service/channel.rs - 进程内服务通道
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

use std::sync::mpsc::{Receiver, Sender, SyncSender, channel, sync_channel};

use thiserror::Error;
use tracing::{debug, info, warn};

use crate::loader::ImageLoader;
use crate::model::Model;
use crate::service::ServiceNode;
use crate::wire::{DetectRequest, WireReply};

/// 单次调用：请求加回信通道
struct PendingCall {
  request: DetectRequest,
  reply_tx: Sender<WireReply>,
}

#[derive(Error, Debug)]
pub enum CallError {
  /// 服务端已关闭，请求未被接收
  #[error("服务端已关闭")]
  Closed,
  /// 请求已被接收，但服务端在应答前退出
  #[error("服务端在应答前退出")]
  Hangup,
}

/// 建立有界服务通道。容量即排队上限：队列满时 `call` 阻塞，
/// 对上游形成背压，而不是无限堆积待处理的图像。
pub fn service_channel(capacity: usize) -> (ServiceClient, ServiceListener) {
  let (tx, rx) = sync_channel(capacity);
  (ServiceClient { tx }, ServiceListener { rx })
}

/// 服务通道的调用端，可克隆给多个并发调用方
#[derive(Clone)]
pub struct ServiceClient {
  tx: SyncSender<PendingCall>,
}

impl ServiceClient {
  /// 同步调用：阻塞直到请求入队并等到回复。
  /// 不设内部超时；调用方超时属于传输层的职责。
  pub fn call(&self, request: DetectRequest) -> Result<WireReply, CallError> {
    let (reply_tx, reply_rx) = channel();
    self
      .tx
      .send(PendingCall { request, reply_tx })
      .map_err(|_| CallError::Closed)?;
    reply_rx.recv().map_err(|_| CallError::Hangup)
  }
}

/// 服务通道的应答端，由持有节点的一侧驱动
pub struct ServiceListener {
  rx: Receiver<PendingCall>,
}

impl ServiceListener {
  /// 服务循环：按到达顺序逐个应答，所有调用端断开后返回。
  /// 每个收到的请求必定发出一个回复，失败也不例外。
  pub fn serve<M, L>(self, node: &ServiceNode<M, L>)
  where
    M: Model,
    L: ImageLoader<Image = M::Input>,
  {
    info!("服务循环启动");
    for call in self.rx.iter() {
      debug!("收到请求: {}", call.request.image_reference);
      let reply = node.reply(&call.request);
      if call.reply_tx.send(reply).is_err() {
        warn!("回复发送失败，调用方已断开");
      }
    }
    info!("所有调用端已断开，服务循环退出");
  }
}
