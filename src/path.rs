// 该文件是 Kitti View 项目的一部分。
// src/path.rs - 图像与标签路径构造
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

use std::path::PathBuf;

use crate::config::{ConfigError, DatasetConfig};

pub const IMAGE_EXTENSION: &str = "png";
pub const LABEL_EXTENSION: &str = "txt";

const STEM_WIDTH: usize = 6;

/// 编号补零到 6 位，超过 6 位的编号保持原样
pub fn file_stem(id: u64) -> String {
  format!("{:0width$}", id, width = STEM_WIDTH)
}

/// 纯路径拼接，不访问文件系统
#[derive(Debug, Clone, Default)]
pub struct PathResolver {
  config: DatasetConfig,
}

impl PathResolver {
  pub fn new(config: DatasetConfig) -> Self {
    Self { config }
  }

  pub fn config(&self) -> &DatasetConfig {
    &self.config
  }

  pub fn image_path(&self, id: u64, split: &str) -> Result<PathBuf, ConfigError> {
    let dir = self.config.image_dir(split)?;
    Ok(dir.join(format!("{}.{}", file_stem(id), IMAGE_EXTENSION)))
  }

  pub fn label_path(&self, id: u64, split: &str) -> Result<PathBuf, ConfigError> {
    let dir = self.config.label_dir(split)?;
    Ok(dir.join(format!("{}.{}", file_stem(id), LABEL_EXTENSION)))
  }
}
