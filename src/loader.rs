// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/loader.rs - 图像加载模块
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

/// 图像加载 trait：把请求中的图像引用解析为内存图像。
/// 加载失败直接返回错误，不在内部重试。
pub trait ImageLoader {
  type Image;
  type Error: std::error::Error + Send + Sync + 'static;

  fn load(&self, reference: &str) -> Result<Self::Image, Self::Error>;
}

mod file;
mod memory;
pub use self::file::{FileImageLoader, FileImageLoaderError};
pub use self::memory::{MemoryImageLoader, MemoryImageLoaderError};
