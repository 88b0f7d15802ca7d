// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/model.rs - 模型
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

use crate::mask::BitMask;

/// 实例分割模型 trait。
/// `infer` 采用 `&mut self`：同一模型实例不允许两次推理真正并发执行，
/// 共享时必须经由 [`ModelHandle`] 串行化。
pub trait Model {
  type Input;
  type Error: std::error::Error + Send + Sync + 'static;

  fn infer(&mut self, input: &Self::Input) -> Result<InstanceResult, Self::Error>;
}

/// 单个检测实例
#[derive(Debug, Clone)]
pub struct Instance {
  pub class_id: u32,
  pub score: f32,
  pub bbox: [f32; 4], // [x_min, y_min, x_max, y_max]
  pub mask: BitMask,
}

/// 模型原生输出，保持模型给出的实例顺序。
/// 该结构不直接上线路，必须经 [`crate::wire::DetectResponse`] 翻译。
#[derive(Debug, Clone)]
pub struct InstanceResult {
  pub items: Box<[Instance]>,
}

impl InstanceResult {
  pub fn len(&self) -> usize {
    self.items.len()
  }

  pub fn is_empty(&self) -> bool {
    self.items.is_empty()
  }
}

mod handle;
mod replay;
pub use self::handle::ModelHandle;
pub use self::replay::ReplayModel;
