// 该文件是 Hanzhong （汉中） 项目的一部分。
// src/loader/file.rs - 目录图像加载
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

use std::path::{Component, Path, PathBuf};

use image::{ImageReader, RgbImage};
use thiserror::Error;
use tracing::{debug, error};
use url::Url;

use crate::loader::ImageLoader;
use crate::{FromUrl, FromUrlWithScheme};

#[derive(Error, Debug)]
pub enum FileImageLoaderError {
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("图像不存在: {0}")]
  NotFound(String),
  #[error("图像引用越出根目录: {0}")]
  OutsideRoot(String),
  #[error("I/O error: {0}")]
  IoError(#[from] std::io::Error),
  #[error("Image loading error: {0}")]
  ImageLoadError(#[from] image::ImageError),
}

/// 目录图像加载器：把图像引用解析为根目录下的相对路径。
pub struct FileImageLoader {
  root: PathBuf,
}

impl FileImageLoader {
  pub fn new(root: impl Into<PathBuf>) -> Self {
    Self { root: root.into() }
  }

  /// 引用只允许是根目录内的相对路径
  fn resolve(&self, reference: &str) -> Result<PathBuf, FileImageLoaderError> {
    let relative = Path::new(reference);
    if relative.is_absolute()
      || relative
        .components()
        .any(|c| matches!(c, Component::ParentDir))
    {
      return Err(FileImageLoaderError::OutsideRoot(reference.to_string()));
    }

    Ok(self.root.join(relative))
  }
}

impl FromUrlWithScheme for FileImageLoader {
  const SCHEME: &'static str = "folder";
}

impl FromUrl for FileImageLoader {
  type Error = FileImageLoaderError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(FileImageLoaderError::SchemeMismatch);
    }

    let path = urlencoding::decode(url.path())
      .map(|p| p.into_owned())
      .unwrap_or_else(|_| url.path().to_string());

    Ok(FileImageLoader::new(path))
  }
}

impl ImageLoader for FileImageLoader {
  type Image = RgbImage;
  type Error = FileImageLoaderError;

  fn load(&self, reference: &str) -> Result<RgbImage, FileImageLoaderError> {
    let path = self.resolve(reference)?;
    if !path.is_file() {
      return Err(FileImageLoaderError::NotFound(reference.to_string()));
    }

    debug!("加载图像文件: {}", path.display());
    let image = ImageReader::open(&path)?.decode()?;
    Ok(image.into())
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn loads_image_under_root() {
    let dir = tempfile::tempdir().unwrap();
    let image = RgbImage::new(6, 4);
    image.save(dir.path().join("frame_001.png")).unwrap();

    let loader = FileImageLoader::new(dir.path());
    let loaded = loader.load("frame_001.png").unwrap();
    assert_eq!(loaded.dimensions(), (6, 4));
  }

  #[test]
  fn missing_file_is_not_found() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileImageLoader::new(dir.path());

    let err = loader.load("nope.png").unwrap_err();
    assert!(matches!(err, FileImageLoaderError::NotFound(_)));
  }

  #[test]
  fn parent_dir_reference_is_rejected() {
    let dir = tempfile::tempdir().unwrap();
    let loader = FileImageLoader::new(dir.path());

    let err = loader.load("../escape.png").unwrap_err();
    assert!(matches!(err, FileImageLoaderError::OutsideRoot(_)));

    let err = loader.load("/etc/passwd").unwrap_err();
    assert!(matches!(err, FileImageLoaderError::OutsideRoot(_)));
  }

  #[test]
  fn from_url_checks_scheme() {
    let url = Url::parse("folder:///var/images").unwrap();
    let loader = FileImageLoader::from_url(&url).unwrap();
    assert_eq!(loader.root, PathBuf::from("/var/images"));

    let url = Url::parse("file:///var/images").unwrap();
    assert!(matches!(
      FileImageLoader::from_url(&url),
      Err(FileImageLoaderError::SchemeMismatch)
    ));
  }
}
