// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/service.rs - 推理服务节点
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

use std::time::Instant;

use thiserror::Error;
use tracing::{info, warn};

use crate::loader::ImageLoader;
use crate::model::{Model, ModelHandle};
use crate::wire::{DetectRequest, DetectResponse, ErrorKind, WireReply};

#[derive(Error, Debug)]
pub enum ServiceError {
  /// 请求本身不合法，不会触发任何推理
  #[error("无效请求: {0}")]
  InvalidRequest(String),
  /// 图像或模型资源不可用；是否重试由调用方决定
  #[error("资源不可用: {0}")]
  ResourceUnavailable(String),
  /// 模型调用内部出错；节点自身保持存活
  #[error("推理失败: {0}")]
  InferenceFailure(String),
}

impl ServiceError {
  pub fn kind(&self) -> ErrorKind {
    match self {
      ServiceError::InvalidRequest(_) => ErrorKind::InvalidRequest,
      ServiceError::ResourceUnavailable(_) => ErrorKind::ResourceUnavailable,
      ServiceError::InferenceFailure(_) => ErrorKind::InferenceFailure,
    }
  }
}

/// 推理服务节点：一端接请求通道，一端持有模型句柄。
/// 节点在进程启动时构造一次，模型句柄随节点存活，从不重载。
pub struct ServiceNode<M, L> {
  handle: ModelHandle<M>,
  loader: L,
}

impl<M, L> ServiceNode<M, L>
where
  M: Model,
  L: ImageLoader<Image = M::Input>,
{
  pub fn new(handle: ModelHandle<M>, loader: L) -> Self {
    Self { handle, loader }
  }

  /// 处理单个请求：校验引用 -> 加载图像 -> 推理 -> 翻译。
  /// 推理耗时仅记入日志，不影响控制流与响应内容。
  pub fn handle_request(
    &self,
    request: &DetectRequest,
  ) -> Result<DetectResponse, ServiceError> {
    let reference = request.image_reference.trim();
    if reference.is_empty() {
      return Err(ServiceError::InvalidRequest("图像引用为空".to_string()));
    }

    let image = self
      .loader
      .load(reference)
      .map_err(|e| ServiceError::ResourceUnavailable(e.to_string()))?;

    let now = Instant::now();
    let result = self
      .handle
      .infer(&image)
      .map_err(|e| ServiceError::InferenceFailure(e.to_string()))?;
    let elapsed = now.elapsed();
    info!("推理完成，耗时: {:.2?}，共 {} 个实例", elapsed, result.len());

    Ok(DetectResponse::from(result))
  }

  /// 把处理结果封装成线路回复。任何错误都转成显式错误回复，
  /// 绝不允许无声丢弃调用让对端永远阻塞。
  pub fn reply(&self, request: &DetectRequest) -> WireReply {
    match self.handle_request(request) {
      Ok(response) => WireReply::Ok(response),
      Err(err) => {
        warn!("请求处理失败: {}", err);
        WireReply::Err {
          kind: err.kind(),
          message: err.to_string(),
        }
      }
    }
  }
}

mod channel;
pub use self::channel::{CallError, ServiceClient, ServiceListener, service_channel};
