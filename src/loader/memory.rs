// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/loader/memory.rs - 预载图像加载
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

use std::collections::HashMap;

use image::RgbImage;
use thiserror::Error;

use crate::loader::ImageLoader;

#[derive(Error, Debug)]
pub enum MemoryImageLoaderError {
  #[error("图像不存在: {0}")]
  NotFound(String),
}

/// 预载图像加载器：按名字从内存中取图，不触碰文件系统。
#[derive(Default)]
pub struct MemoryImageLoader {
  images: HashMap<String, RgbImage>,
}

impl MemoryImageLoader {
  pub fn new() -> Self {
    Self::default()
  }

  pub fn insert(&mut self, name: impl Into<String>, image: RgbImage) {
    self.images.insert(name.into(), image);
  }

  pub fn with_image(mut self, name: impl Into<String>, image: RgbImage) -> Self {
    self.insert(name, image);
    self
  }
}

impl ImageLoader for MemoryImageLoader {
  type Image = RgbImage;
  type Error = MemoryImageLoaderError;

  fn load(&self, reference: &str) -> Result<RgbImage, MemoryImageLoaderError> {
    self
      .images
      .get(reference)
      .cloned()
      .ok_or_else(|| MemoryImageLoaderError::NotFound(reference.to_string()))
  }
}
