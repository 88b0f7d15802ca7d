// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/mask.rs - 实例掩码定义
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

/// 实例掩码：逐像素的二值归属网格。
/// 行优先存储，每像素一个字节，非零表示该像素属于对应实例。
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct BitMask {
  width: u32,
  height: u32,
  data: Box<[u8]>,
}

impl BitMask {
  /// 创建全零掩码
  pub fn new(width: u32, height: u32) -> Self {
    let size = (width as usize) * (height as usize);
    Self {
      width,
      height,
      data: vec![0u8; size].into_boxed_slice(),
    }
  }

  /// 从原始字节构造掩码，长度必须等于 width * height
  pub fn from_raw(width: u32, height: u32, data: Vec<u8>) -> Self {
    let expected = (width as usize) * (height as usize);
    if data.len() != expected {
      panic!(
        "数据长度不匹配: 期望长度 {}, 实际长度 {}",
        expected,
        data.len()
      );
    }

    Self {
      width,
      height,
      data: data.into_boxed_slice(),
    }
  }

  pub fn width(&self) -> u32 {
    self.width
  }

  pub fn height(&self) -> u32 {
    self.height
  }

  fn index(&self, x: u32, y: u32) -> usize {
    if x >= self.width || y >= self.height {
      panic!(
        "坐标越界: ({}, {}), 掩码尺寸 {}x{}",
        x, y, self.width, self.height
      );
    }
    (y as usize) * (self.width as usize) + (x as usize)
  }

  pub fn get(&self, x: u32, y: u32) -> bool {
    self.data[self.index(x, y)] != 0
  }

  pub fn set(&mut self, x: u32, y: u32, member: bool) {
    let index = self.index(x, y);
    self.data[index] = member as u8;
  }

  /// 掩码覆盖的像素数
  pub fn area(&self) -> usize {
    self.data.iter().filter(|&&b| b != 0).count()
  }

  pub fn as_bytes(&self) -> &[u8] {
    &self.data
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn zeroed_mask_has_no_members() {
    let mask = BitMask::new(4, 3);
    assert_eq!(mask.width(), 4);
    assert_eq!(mask.height(), 3);
    assert_eq!(mask.area(), 0);
    assert!(!mask.get(3, 2));
  }

  #[test]
  fn set_and_get_are_row_major() {
    let mut mask = BitMask::new(3, 2);
    mask.set(2, 1, true);
    assert!(mask.get(2, 1));
    assert_eq!(mask.as_bytes(), &[0, 0, 0, 0, 0, 1]);
    assert_eq!(mask.area(), 1);

    mask.set(2, 1, false);
    assert_eq!(mask.area(), 0);
  }

  #[test]
  fn from_raw_keeps_bytes() {
    let mask = BitMask::from_raw(2, 2, vec![1, 0, 0, 1]);
    assert!(mask.get(0, 0));
    assert!(!mask.get(1, 0));
    assert!(mask.get(1, 1));
    assert_eq!(mask.area(), 2);
  }

  #[test]
  #[should_panic]
  fn from_raw_rejects_wrong_length() {
    let _ = BitMask::from_raw(2, 2, vec![1, 0, 0]);
  }

  #[test]
  #[should_panic(expected = "坐标越界")]
  fn get_rejects_out_of_range_coordinates() {
    let mask = BitMask::new(2, 2);
    let _ = mask.get(2, 0);
  }

  #[test]
  #[should_panic(expected = "坐标越界")]
  fn set_rejects_out_of_range_coordinates() {
    let mut mask = BitMask::new(2, 2);
    mask.set(0, 2, true);
  }
}
