// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/model/replay.rs - 回放模型
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

use std::marker::PhantomData;
use std::time::Duration;

use tracing::debug;

use crate::model::{InstanceResult, Model};

/// 回放模型：不做真实推理，对任意输入回放同一份固定结果。
/// 可选地模拟单次推理耗时，用于演示服务链路和验证排队行为。
pub struct ReplayModel<Input> {
  result: InstanceResult,
  latency: Option<Duration>,
  invocations: u64,
  _phantom: PhantomData<Input>,
}

impl<Input> ReplayModel<Input> {
  pub fn new(result: InstanceResult) -> Self {
    Self {
      result,
      latency: None,
      invocations: 0,
      _phantom: PhantomData,
    }
  }

  pub fn with_latency(mut self, latency: Duration) -> Self {
    self.latency = Some(latency);
    self
  }

  /// 已执行的推理次数
  pub fn invocations(&self) -> u64 {
    self.invocations
  }
}

impl<Input> Model for ReplayModel<Input> {
  type Input = Input;
  type Error = std::convert::Infallible;

  fn infer(&mut self, _input: &Self::Input) -> Result<InstanceResult, Self::Error> {
    self.invocations += 1;
    if let Some(latency) = self.latency {
      std::thread::sleep(latency);
    }
    debug!(
      "回放第 {} 次推理结果, {} 个实例",
      self.invocations,
      self.result.len()
    );
    Ok(self.result.clone())
  }
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::mask::BitMask;
  use crate::model::Instance;

  #[test]
  fn replays_the_same_result_and_counts_invocations() {
    let result = InstanceResult {
      items: Box::new([Instance {
        class_id: 42,
        score: 0.7,
        bbox: [0.0, 0.0, 1.0, 1.0],
        mask: BitMask::new(2, 2),
      }]),
    };
    let mut model: ReplayModel<()> = ReplayModel::new(result);

    for _ in 0..3 {
      let replayed = model.infer(&()).unwrap();
      assert_eq!(replayed.len(), 1);
      assert_eq!(replayed.items[0].class_id, 42);
    }
    assert_eq!(model.invocations(), 3);
  }
}
