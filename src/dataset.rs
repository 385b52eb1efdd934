// 该文件是 Kitti View 项目的一部分。
// src/dataset.rs - KITTI 数据集访问
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

use std::collections::BTreeSet;
use std::path::PathBuf;

use thiserror::Error;
use tracing::{debug, error, info};
use url::Url;

use crate::{
  FromUrl, FromUrlWithScheme,
  config::{ConfigError, DatasetConfig},
  label::{BBoxPolicy, LabelError, ObjectRecord, ParseOptions, UnknownTypePolicy, load_labels},
  path::{IMAGE_EXTENSION, PathResolver},
};

#[derive(Error, Debug)]
pub enum DatasetError {
  #[error("配置错误: {0}")]
  Config(#[from] ConfigError),
  #[error("标签错误: {0}")]
  Label(#[from] LabelError),
  #[error("图像文件不存在: {}", .0.display())]
  ImageNotFound(PathBuf),
  #[cfg(feature = "render")]
  #[error("图像错误: {0}")]
  Image(#[from] image::ImageError),
  #[error("读取目录 {} 失败: {source}", path.display())]
  ReadDir {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("URI 方案不匹配")]
  SchemeMismatch,
  #[error("kitti URI 不支持主机名: {0}")]
  UnexpectedHost(String),
  #[error("无效的查询参数: {0}={1}")]
  InvalidQuery(String, String),
  #[error("URI 路径解码失败: {0}")]
  InvalidPath(#[from] std::string::FromUtf8Error),
}

/// 数据集访问入口，每次调用相互独立，不缓存任何内容
#[derive(Debug, Clone, Default)]
pub struct KittiDataset {
  resolver: PathResolver,
  options: ParseOptions,
}

impl FromUrlWithScheme for KittiDataset {
  const SCHEME: &'static str = "kitti";
}

/// URI 形如 `kitti:///data/kitti?config=/etc/kitti.json&bbox=reject&types=reject`，
/// 路径部分为数据集根目录；`kitti:///?config=...` 使用配置文件中的根目录，不接受主机名
impl FromUrl for KittiDataset {
  type Error = DatasetError;

  fn from_url(url: &Url) -> Result<Self, Self::Error> {
    if url.scheme() != Self::SCHEME {
      error!(
        "URI scheme mismatch: expected '{}', found '{}'",
        Self::SCHEME,
        url.scheme()
      );
      return Err(DatasetError::SchemeMismatch);
    }

    if let Some(host) = url.host_str()
      && !host.is_empty()
    {
      error!("kitti URI 不应包含主机名 '{}', 请使用 kitti:///<根目录>", host);
      return Err(DatasetError::UnexpectedHost(host.to_string()));
    }

    let mut config = DatasetConfig::default();
    let mut options = ParseOptions::default();
    for (k, v) in url.query_pairs() {
      match (&*k, &*v) {
        ("config", path) => config = DatasetConfig::from_json_file(path)?,
        ("bbox", "accept") => options.bbox = BBoxPolicy::Accept,
        ("bbox", "warn") => options.bbox = BBoxPolicy::Warn,
        ("bbox", "reject") => options.bbox = BBoxPolicy::Reject,
        ("types", "keep") => options.unknown_type = UnknownTypePolicy::Keep,
        ("types", "reject") => options.unknown_type = UnknownTypePolicy::Reject,
        _ => return Err(DatasetError::InvalidQuery(k.to_string(), v.to_string())),
      }
    }

    // 路径为空或仅为 "/" 时沿用配置中的根目录
    let root = urlencoding::decode(url.path())?;
    if !root.is_empty() && root != "/" {
      config = config.with_root(root.into_owned());
    }

    Ok(KittiDataset::new(config).with_parse_options(options))
  }
}

impl KittiDataset {
  pub fn new(config: DatasetConfig) -> Self {
    Self {
      resolver: PathResolver::new(config),
      options: ParseOptions::default(),
    }
  }

  pub fn with_parse_options(mut self, options: ParseOptions) -> Self {
    self.options = options;
    self
  }

  pub fn resolver(&self) -> &PathResolver {
    &self.resolver
  }

  pub fn parse_options(&self) -> &ParseOptions {
    &self.options
  }

  pub fn load_labels(&self, id: u64, split: &str) -> Result<Box<[ObjectRecord]>, DatasetError> {
    let path = self.resolver.label_path(id, split)?;
    Ok(load_labels(path, &self.options)?)
  }

  /// 划分图像目录中所有 png 文件的编号，升序排列
  pub fn list_ids(&self, split: &str) -> Result<Vec<u64>, DatasetError> {
    let dir = self.resolver.config().image_dir(split)?;
    let read_dir_error = |source| DatasetError::ReadDir {
      path: dir.clone(),
      source,
    };

    let mut ids = BTreeSet::new();
    for entry in std::fs::read_dir(&dir).map_err(read_dir_error)? {
      let path = entry.map_err(read_dir_error)?.path();
      if !path.is_file() || path.extension().is_none_or(|ext| ext != IMAGE_EXTENSION) {
        continue;
      }
      match path.file_stem().and_then(|s| s.to_str()).map(str::parse::<u64>) {
        Some(Ok(id)) => {
          ids.insert(id);
        }
        _ => debug!("跳过无法解析编号的文件: {}", path.display()),
      }
    }

    info!("{} 划分共 {} 张图像", split, ids.len());
    Ok(ids.into_iter().collect())
  }
}

#[cfg(feature = "render")]
mod display {
  use image::RgbImage;

  use super::{DatasetError, KittiDataset};
  use crate::label::ObjectType;
  use crate::render::{Annotation, build_boxes};
  use crate::table::{Column, format_table};

  /// 单张图像的显示选项
  #[derive(Debug, Clone, PartialEq)]
  pub struct DisplayOptions {
    pub boxes: bool,
    pub info: bool,
    pub title: bool,
    pub types: Vec<ObjectType>,
    pub columns: Vec<Column>,
  }

  impl Default for DisplayOptions {
    fn default() -> Self {
      Self {
        boxes: true,
        info: true,
        title: true,
        types: ObjectType::ALL.to_vec(),
        columns: vec![Column::BBox],
      }
    }
  }

  pub struct DisplayResult {
    pub image: RgbImage,
    pub annotation: Annotation,
    pub table: Option<String>,
  }

  impl KittiDataset {
    pub fn load_image(&self, id: u64, split: &str) -> Result<RgbImage, DatasetError> {
      let path = self.resolver.image_path(id, split)?;
      match image::open(&path) {
        Ok(image) => Ok(image.into_rgb8()),
        Err(image::ImageError::IoError(err)) if err.kind() == std::io::ErrorKind::NotFound => {
          Err(DatasetError::ImageNotFound(path))
        }
        Err(err) => Err(err.into()),
      }
    }

    /// 读取图像，并按需读取标签生成边界框与属性表
    pub fn display(
      &self,
      id: u64,
      split: &str,
      options: &DisplayOptions,
    ) -> Result<DisplayResult, DatasetError> {
      let image = self.load_image(id, split)?;

      let records = if options.boxes || options.info {
        self.load_labels(id, split)?
      } else {
        Box::default()
      };

      let annotation = Annotation {
        boxes: if options.boxes {
          build_boxes(&records, &options.types)
        } else {
          Vec::new()
        },
        title: options.title.then(|| format!("{}_{}", split, id)),
      };

      let table = options
        .info
        .then(|| format_table(&records, &options.types, &options.columns));

      Ok(DisplayResult {
        image,
        annotation,
        table,
      })
    }
  }
}

#[cfg(feature = "render")]
pub use self::display::{DisplayOptions, DisplayResult};
