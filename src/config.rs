// 该文件是 Kitti View 项目的一部分。
// src/config.rs - 数据集目录配置
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

use std::collections::BTreeMap;
use std::path::{Path, PathBuf};

use serde::{Deserialize, Serialize};
use thiserror::Error;
use tracing::debug;

pub const DEFAULT_ROOT: &str = "/data2/Kitti/left_12g/";

pub const TRAIN_SPLIT: &str = "train";
pub const TEST_SPLIT: &str = "test";

#[derive(Error, Debug)]
pub enum ConfigError {
  #[error("未知的数据集划分: {0}")]
  UnknownSplit(String),
  #[error("数据集划分 {0} 没有标签目录")]
  NoLabels(String),
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("配置文件解析错误: {0}")]
  Json(#[from] serde_json::Error),
}

/// 单个划分下的图像与标签子目录，均相对于数据集根目录
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SplitDirs {
  pub image_dir: PathBuf,
  #[serde(default, skip_serializing_if = "Option::is_none")]
  pub label_dir: Option<PathBuf>,
}

/// 数据集根目录以及划分名称到子目录的映射
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct DatasetConfig {
  pub root: PathBuf,
  pub splits: BTreeMap<String, SplitDirs>,
}

impl Default for DatasetConfig {
  fn default() -> Self {
    let mut splits = BTreeMap::new();
    splits.insert(
      TRAIN_SPLIT.to_string(),
      SplitDirs {
        image_dir: PathBuf::from("data_object_image_2/training/image_2/"),
        label_dir: Some(PathBuf::from("data_object_label_2/training/label_2/")),
      },
    );
    // KITTI 不公开测试集标签
    splits.insert(
      TEST_SPLIT.to_string(),
      SplitDirs {
        image_dir: PathBuf::from("data_object_image_2/testing/image_2/"),
        label_dir: None,
      },
    );

    Self {
      root: PathBuf::from(DEFAULT_ROOT),
      splits,
    }
  }
}

impl DatasetConfig {
  pub fn from_json_file<P: AsRef<Path>>(path: P) -> Result<Self, ConfigError> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path)?;
    let config: DatasetConfig = serde_json::from_str(&text)?;
    debug!(
      "从 {} 加载数据集配置, 共 {} 个划分",
      path.display(),
      config.splits.len()
    );
    Ok(config)
  }

  pub fn with_root<P: Into<PathBuf>>(mut self, root: P) -> Self {
    self.root = root.into();
    self
  }

  pub fn split(&self, name: &str) -> Result<&SplitDirs, ConfigError> {
    self
      .splits
      .get(name)
      .ok_or_else(|| ConfigError::UnknownSplit(name.to_string()))
  }

  pub fn image_dir(&self, split: &str) -> Result<PathBuf, ConfigError> {
    Ok(self.root.join(&self.split(split)?.image_dir))
  }

  pub fn label_dir(&self, split: &str) -> Result<PathBuf, ConfigError> {
    let label_dir = self
      .split(split)?
      .label_dir
      .as_ref()
      .ok_or_else(|| ConfigError::NoLabels(split.to_string()))?;
    Ok(self.root.join(label_dir))
  }
}

#[cfg(test)]
mod tests {
  use super::*;

  #[test]
  fn default_layout_has_train_and_test() {
    let config = DatasetConfig::default();
    assert_eq!(
      config.image_dir("train").unwrap(),
      PathBuf::from("/data2/Kitti/left_12g/data_object_image_2/training/image_2/")
    );
    assert_eq!(
      config.label_dir("train").unwrap(),
      PathBuf::from("/data2/Kitti/left_12g/data_object_label_2/training/label_2/")
    );
    assert!(config.image_dir("test").is_ok());
  }

  #[test]
  fn test_split_has_no_labels() {
    let config = DatasetConfig::default();
    assert!(matches!(
      config.label_dir("test"),
      Err(ConfigError::NoLabels(name)) if name == "test"
    ));
  }

  #[test]
  fn unknown_split_is_rejected() {
    let config = DatasetConfig::default();
    assert!(matches!(
      config.split("validation"),
      Err(ConfigError::UnknownSplit(name)) if name == "validation"
    ));
    // 名称大小写敏感
    assert!(config.split("Train").is_err());
  }

  #[test]
  fn json_file_round_trip() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("kitti.json");
    let config = DatasetConfig::default().with_root("/mnt/kitti");
    std::fs::write(&path, serde_json::to_string_pretty(&config).unwrap()).unwrap();

    let loaded = DatasetConfig::from_json_file(&path).unwrap();
    assert_eq!(loaded, config);
    assert_eq!(loaded.root, PathBuf::from("/mnt/kitti"));
  }

  #[test]
  fn json_label_dir_is_optional() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("kitti.json");
    std::fs::write(
      &path,
      r#"{"root": "/k", "splits": {"val": {"image_dir": "val/img"}}}"#,
    )
    .unwrap();

    let config = DatasetConfig::from_json_file(&path).unwrap();
    assert_eq!(config.image_dir("val").unwrap(), PathBuf::from("/k/val/img"));
    assert!(matches!(config.label_dir("val"), Err(ConfigError::NoLabels(_))));
  }

  #[test]
  fn broken_json_is_reported() {
    let dir = tempfile::tempdir().expect("create temp dir");
    let path = dir.path().join("kitti.json");
    std::fs::write(&path, "{ not json").unwrap();
    assert!(matches!(
      DatasetConfig::from_json_file(&path),
      Err(ConfigError::Json(_))
    ));
    assert!(matches!(
      DatasetConfig::from_json_file(dir.path().join("missing.json")),
      Err(ConfigError::Io(_))
    ));
  }
}
