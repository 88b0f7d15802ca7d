// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/wire.rs - 线路数据契约
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

use serde::{Deserialize, Serialize};

use crate::mask::BitMask;
use crate::model::InstanceResult;

/// 检测请求：每次调用创建一个，应答后即丢弃
#[derive(Debug, Clone, Serialize, Deserialize)]
pub struct DetectRequest {
  pub image_reference: String,
}

/// 检测响应：按实例对齐的平行数组，下标 i 的各字段描述同一个实例。
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct DetectResponse {
  pub count: u32,
  pub labels: Vec<u32>,
  pub scores: Vec<f32>,
  pub boxes: Vec<[f32; 4]>,
  pub masks: Vec<BitMask>,
}

/// 纯翻译：逐实例展开为平行数组，保持模型输出顺序，
/// 不排序、不去重、不合并。
impl From<InstanceResult> for DetectResponse {
  fn from(result: InstanceResult) -> Self {
    let count = result.len();
    let mut labels = Vec::with_capacity(count);
    let mut scores = Vec::with_capacity(count);
    let mut boxes = Vec::with_capacity(count);
    let mut masks = Vec::with_capacity(count);

    for item in result.items.into_vec() {
      labels.push(item.class_id);
      scores.push(item.score);
      boxes.push(item.bbox);
      masks.push(item.mask);
    }

    DetectResponse {
      count: count as u32,
      labels,
      scores,
      boxes,
      masks,
    }
  }
}

/// 线路错误类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum ErrorKind {
  InvalidRequest,
  ResourceUnavailable,
  InferenceFailure,
}

/// 单次调用的回复信封：每个被接收的请求恰好产生一个回复，
/// 失败也要以显式错误回复结束，绝不无声丢弃。
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(tag = "status", rename_all = "snake_case")]
pub enum WireReply {
  Ok(DetectResponse),
  Err { kind: ErrorKind, message: String },
}

impl WireReply {
  pub fn is_ok(&self) -> bool {
    matches!(self, WireReply::Ok(_))
  }
}
