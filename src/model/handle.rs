// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/model/handle.rs - 模型句柄
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

use std::sync::Mutex;
use tracing::{debug, warn};

use crate::model::{InstanceResult, Model};

/// 模型句柄：进程内唯一的共享模型资源。
/// 内部互斥锁是模型调用的唯一临界区，所有请求的推理都在此排队；
/// 置信度阈值在构造时固定，不支持按请求覆盖。
pub struct ModelHandle<M> {
  inner: Mutex<M>,
  score_threshold: f32,
}

impl<M: Model> ModelHandle<M> {
  pub fn new(model: M, score_threshold: f32) -> Self {
    let score_threshold = if (0.0..=1.0).contains(&score_threshold) {
      score_threshold
    } else {
      warn!("置信度阈值 {} 超出 [0, 1] 范围，已截断", score_threshold);
      score_threshold.clamp(0.0, 1.0)
    };

    Self {
      inner: Mutex::new(model),
      score_threshold,
    }
  }

  pub fn score_threshold(&self) -> f32 {
    self.score_threshold
  }

  /// 互斥执行一次推理，然后按置信度阈值过滤实例。
  /// 并发调用会在锁上排队；推理一旦开始就运行到结束，无抢占、无取消。
  pub fn infer(&self, input: &M::Input) -> Result<InstanceResult, M::Error> {
    let mut model = match self.inner.lock() {
      Ok(guard) => guard,
      // 推理中 panic 会使锁中毒；句柄必须继续服务后续请求
      Err(poisoned) => poisoned.into_inner(),
    };

    let result = model.infer(input)?;
    Ok(self.filter(result))
  }

  /// 丢弃低于阈值的实例，保持模型输出顺序
  fn filter(&self, result: InstanceResult) -> InstanceResult {
    let before = result.len();
    let items: Vec<_> = result
      .items
      .into_vec()
      .into_iter()
      .filter(|item| item.score >= self.score_threshold)
      .collect();

    if items.len() < before {
      debug!(
        "置信度过滤: {} -> {} 个实例 (阈值 {})",
        before,
        items.len(),
        self.score_threshold
      );
    }

    InstanceResult {
      items: items.into_boxed_slice(),
    }
  }
}

#[cfg(test)]
mod tests {
  use std::panic::{AssertUnwindSafe, catch_unwind};

  use super::*;
  use crate::mask::BitMask;
  use crate::model::Instance;

  fn instance(class_id: u32, score: f32) -> Instance {
    Instance {
      class_id,
      score,
      bbox: [0.0, 0.0, 1.0, 1.0],
      mask: BitMask::new(2, 2),
    }
  }

  /// 固定输出的测试模型
  struct StaticModel {
    items: Vec<Instance>,
    panic_once: bool,
  }

  impl Model for StaticModel {
    type Input = ();
    type Error = std::convert::Infallible;

    fn infer(&mut self, _input: &()) -> Result<InstanceResult, Self::Error> {
      if self.panic_once {
        self.panic_once = false;
        panic!("模拟推理崩溃");
      }
      Ok(InstanceResult {
        items: self.items.clone().into_boxed_slice(),
      })
    }
  }

  #[test]
  fn threshold_keeps_order_and_uses_greater_equal() {
    let model = StaticModel {
      items: vec![instance(3, 0.91), instance(5, 0.39), instance(7, 0.4)],
      panic_once: false,
    };
    let handle = ModelHandle::new(model, 0.4);

    let result = handle.infer(&()).unwrap();
    let ids: Vec<u32> = result.items.iter().map(|i| i.class_id).collect();
    assert_eq!(ids, vec![3, 7]);
    assert!(result.items.iter().all(|i| i.score >= 0.4));
  }

  #[test]
  fn zero_threshold_keeps_everything() {
    let model = StaticModel {
      items: vec![instance(1, 0.0), instance(2, 0.2)],
      panic_once: false,
    };
    let handle = ModelHandle::new(model, 0.0);

    assert_eq!(handle.infer(&()).unwrap().len(), 2);
  }

  #[test]
  fn out_of_range_threshold_is_clamped() {
    let model = StaticModel {
      items: vec![instance(1, 0.99)],
      panic_once: false,
    };
    let handle = ModelHandle::new(model, 1.5);

    assert_eq!(handle.score_threshold(), 1.0);
    assert!(handle.infer(&()).unwrap().is_empty());
  }

  #[test]
  fn poisoned_lock_is_recovered() {
    let model = StaticModel {
      items: vec![instance(9, 0.8)],
      panic_once: true,
    };
    let handle = ModelHandle::new(model, 0.4);

    let panicked = catch_unwind(AssertUnwindSafe(|| handle.infer(&()))).is_err();
    assert!(panicked);

    // 上一次调用 panic 之后句柄必须仍然可用
    let result = handle.infer(&()).unwrap();
    assert_eq!(result.len(), 1);
    assert_eq!(result.items[0].class_id, 9);
  }
}
