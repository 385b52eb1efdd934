// 该文件是 Kitti View 项目的一部分。
// src/render/save_image_file.rs - 保存标注图像文件
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

use std::path::{Path, PathBuf};

use image::RgbImage;
use thiserror::Error;
use tracing::info;
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  render::{
    Render,
    draw::{Annotation, Draw, DrawError},
  },
};

#[derive(Error, Debug)]
pub enum SaveImageFileError {
  #[error("I/O 错误: {0}")]
  IoError(#[from] std::io::Error),
  #[error("图像错误: {0}")]
  ImageError(#[from] image::ImageError),
  #[error("绘制配置错误: {0}")]
  DrawError(#[from] DrawError),
  #[error("URI 方案不匹配: {0}")]
  SchemeMismatch(String),
  #[error("无效的查询参数: {0}={1}")]
  InvalidQuery(String, String),
}

/// 在图像副本上绘制标注并保存
///
/// URI 形如 `image:///tmp/000007.png?grid=100&line_width=3&font=/path/font.ttf`
pub struct SaveImageFileOutput {
  path: PathBuf,
  draw: Draw,
}

impl FromUrlWithScheme for SaveImageFileOutput {
  const SCHEME: &'static str = "image";
}

fn parse_query<T: std::str::FromStr>(key: &str, value: &str) -> Result<T, SaveImageFileError> {
  value
    .parse()
    .map_err(|_| SaveImageFileError::InvalidQuery(key.to_string(), value.to_string()))
}

impl FromUrl for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn from_url(uri: &Url) -> Result<Self, Self::Error> {
    if uri.scheme() != Self::SCHEME {
      return Err(SaveImageFileError::SchemeMismatch(format!(
        "期望保存方式 '{}', 实际保存方式 '{}'",
        Self::SCHEME,
        uri.scheme()
      )));
    }

    let mut draw = Draw::default();
    for (k, v) in uri.query_pairs() {
      match &*k {
        "grid" => draw = draw.with_grid(parse_query(&k, &v)?),
        "line_width" => draw = draw.with_line_width(parse_query(&k, &v)?),
        "font_size" => draw = draw.with_font_size(parse_query(&k, &v)?),
        "font" => draw = draw.with_font_file(&*v)?,
        _ => return Err(SaveImageFileError::InvalidQuery(k.to_string(), v.to_string())),
      }
    }

    let path = urlencoding::decode(uri.path())
      .map_err(|_| SaveImageFileError::InvalidQuery("path".to_string(), uri.path().to_string()))?;

    Ok(SaveImageFileOutput::new(path.into_owned(), draw))
  }
}

impl SaveImageFileOutput {
  pub fn new<P: Into<PathBuf>>(path: P, draw: Draw) -> Self {
    Self {
      path: path.into(),
      draw,
    }
  }

  pub fn path(&self) -> &Path {
    &self.path
  }

  fn save_image(&self, image: &RgbImage) -> Result<(), SaveImageFileError> {
    if let Some(parent) = self.path.parent()
      && !parent.as_os_str().is_empty()
    {
      std::fs::create_dir_all(parent)?;
    }

    image.save(&self.path)?;

    info!("保存图像到文件: {}", self.path.display());

    Ok(())
  }
}

impl Render<RgbImage, Annotation> for SaveImageFileOutput {
  type Error = SaveImageFileError;

  fn render_result(&self, frame: &RgbImage, result: &Annotation) -> Result<(), Self::Error> {
    let mut image = frame.clone();
    self.draw.draw_annotation(&mut image, result);
    self.save_image(&image)
  }
}
