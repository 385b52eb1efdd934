// 该文件是 Kitti View 项目的一部分。
// src/label.rs - KITTI 标签解析
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

use std::fmt;
use std::path::{Path, PathBuf};
use std::str::FromStr;

use thiserror::Error;
use tracing::{debug, warn};

const MIN_FIELDS: usize = 15;
const MAX_FIELDS: usize = 16;

const FIELD_NAMES: [&str; MAX_FIELDS] = [
  "type",
  "truncated",
  "occluded",
  "alpha",
  "x_min",
  "y_min",
  "x_max",
  "y_max",
  "height",
  "width",
  "length",
  "x",
  "y",
  "z",
  "rotation_y",
  "score",
];

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的目标类别: {0}")]
pub struct UnknownObjectType(pub String);

/// KITTI 目标类别
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum ObjectType {
  Car,
  Van,
  Truck,
  Pedestrian,
  PersonSitting,
  Cyclist,
  Tram,
  Misc,
  DontCare,
}

impl ObjectType {
  /// 默认显示顺序
  pub const ALL: [ObjectType; 9] = [
    ObjectType::Car,
    ObjectType::Van,
    ObjectType::Truck,
    ObjectType::Pedestrian,
    ObjectType::PersonSitting,
    ObjectType::Cyclist,
    ObjectType::Tram,
    ObjectType::Misc,
    ObjectType::DontCare,
  ];

  pub fn as_str(&self) -> &'static str {
    match self {
      ObjectType::Car => "Car",
      ObjectType::Van => "Van",
      ObjectType::Truck => "Truck",
      ObjectType::Pedestrian => "Pedestrian",
      ObjectType::PersonSitting => "Person_sitting",
      ObjectType::Cyclist => "Cyclist",
      ObjectType::Tram => "Tram",
      ObjectType::Misc => "Misc",
      ObjectType::DontCare => "DontCare",
    }
  }

  /// 绘制边界框使用的 RGB 颜色
  pub fn color(&self) -> [u8; 3] {
    match self {
      ObjectType::Car => [0xff, 0x00, 0x00],           // 红
      ObjectType::Van => [0xff, 0xff, 0x00],           // 黄
      ObjectType::Truck => [0xff, 0x00, 0xff],         // 紫红
      ObjectType::Pedestrian => [0x33, 0xcc, 0x33],    // 绿
      ObjectType::PersonSitting => [0x00, 0xff, 0xff], // 浅蓝
      ObjectType::Cyclist => [0xff, 0x99, 0x33],       // 橙
      ObjectType::Tram => [0x00, 0x00, 0xff],          // 蓝
      ObjectType::Misc => [0x99, 0x66, 0x33],          // 棕
      ObjectType::DontCare => [0x99, 0x00, 0xff],      // 紫
    }
  }
}

impl FromStr for ObjectType {
  type Err = UnknownObjectType;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ObjectType::ALL
      .iter()
      .find(|kind| kind.as_str() == s)
      .copied()
      .ok_or_else(|| UnknownObjectType(s.to_string()))
  }
}

impl fmt::Display for ObjectType {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(self.as_str())
  }
}

/// 像素坐标下的二维边界框
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct BBox {
  pub x_min: f64,
  pub y_min: f64,
  pub x_max: f64,
  pub y_max: f64,
}

impl BBox {
  pub fn width(&self) -> f64 {
    self.x_max - self.x_min
  }

  pub fn height(&self) -> f64 {
    self.y_max - self.y_min
  }

  pub fn is_ordered(&self) -> bool {
    self.x_min <= self.x_max && self.y_min <= self.y_max
  }
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Dimensions3d {
  pub height: f64,
  pub width: f64,
  pub length: f64,
}

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Location3d {
  pub x: f64,
  pub y: f64,
  pub z: f64,
}

/// 边界框坐标颠倒时的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum BBoxPolicy {
  #[default]
  Accept,
  Warn,
  Reject,
}

/// 未知类别的处理方式
#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub enum UnknownTypePolicy {
  #[default]
  Keep,
  Reject,
}

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq)]
pub struct ParseOptions {
  pub bbox: BBoxPolicy,
  pub unknown_type: UnknownTypePolicy,
}

#[derive(Error, Debug, Clone, PartialEq)]
pub enum MalformedKind {
  #[error("字段数量应为 15 或 16, 实际为 {0}")]
  FieldCount(usize),
  #[error("字段 {index} ({name}) 不是合法数值: {value:?}")]
  InvalidNumber {
    index: usize,
    name: &'static str,
    value: String,
  },
  #[error("边界框坐标颠倒: {0:?}")]
  InvalidBBox(BBox),
  #[error(transparent)]
  UnknownType(#[from] UnknownObjectType),
}

#[derive(Error, Debug, Clone, PartialEq)]
#[error("第 {line} 行格式错误: {kind}")]
pub struct MalformedRecord {
  /// 从 1 开始的行号
  pub line: usize,
  pub kind: MalformedKind,
}

#[derive(Error, Debug)]
pub enum LabelError {
  #[error("标签文件不存在: {}", .0.display())]
  NotFound(PathBuf),
  #[error("读取标签文件 {} 失败: {source}", path.display())]
  Io {
    path: PathBuf,
    #[source]
    source: std::io::Error,
  },
  #[error("标签文件 {} 解析失败: {source}", path.display())]
  Malformed {
    path: PathBuf,
    #[source]
    source: MalformedRecord,
  },
}

/// 标签文件中的一行
///
/// 只能通过解析得到，创建后不可修改。`Display` 原样输出解析时的文本行。
#[derive(Debug, Clone, PartialEq)]
pub struct ObjectRecord {
  object_type: String,
  truncated: f64,
  occluded: i32,
  alpha: f64,
  bbox: BBox,
  dimensions: Dimensions3d,
  location: Location3d,
  rotation_y: f64,
  score: Option<f64>,
  line: Box<str>,
}

fn field<T: FromStr>(fields: &[&str], index: usize) -> Result<T, MalformedKind> {
  fields[index]
    .parse::<T>()
    .map_err(|_| MalformedKind::InvalidNumber {
      index,
      name: FIELD_NAMES[index],
      value: fields[index].to_string(),
    })
}

impl ObjectRecord {
  pub fn parse(line: &str, options: &ParseOptions) -> Result<Self, MalformedKind> {
    let line = line.trim();
    let fields: Vec<&str> = line.split(' ').collect();
    if !(MIN_FIELDS..=MAX_FIELDS).contains(&fields.len()) {
      return Err(MalformedKind::FieldCount(fields.len()));
    }

    let object_type = fields[0];
    if options.unknown_type == UnknownTypePolicy::Reject {
      object_type.parse::<ObjectType>()?;
    }

    let bbox = BBox {
      x_min: field(&fields, 4)?,
      y_min: field(&fields, 5)?,
      x_max: field(&fields, 6)?,
      y_max: field(&fields, 7)?,
    };
    if !bbox.is_ordered() {
      match options.bbox {
        BBoxPolicy::Accept => {}
        BBoxPolicy::Warn => warn!("{} 的边界框坐标颠倒: {:?}", object_type, bbox),
        BBoxPolicy::Reject => return Err(MalformedKind::InvalidBBox(bbox)),
      }
    }

    let score = if fields.len() == MAX_FIELDS {
      Some(field(&fields, 15)?)
    } else {
      None
    };

    Ok(ObjectRecord {
      object_type: object_type.to_string(),
      truncated: field(&fields, 1)?,
      occluded: field(&fields, 2)?,
      alpha: field(&fields, 3)?,
      bbox,
      dimensions: Dimensions3d {
        height: field(&fields, 8)?,
        width: field(&fields, 9)?,
        length: field(&fields, 10)?,
      },
      location: Location3d {
        x: field(&fields, 11)?,
        y: field(&fields, 12)?,
        z: field(&fields, 13)?,
      },
      rotation_y: field(&fields, 14)?,
      score,
      line: line.into(),
    })
  }

  pub fn object_type(&self) -> &str {
    &self.object_type
  }

  /// 类别不在 KITTI 固定类别集合内时返回 `None`
  pub fn category(&self) -> Option<ObjectType> {
    self.object_type.parse().ok()
  }

  pub fn truncated(&self) -> f64 {
    self.truncated
  }

  pub fn occluded(&self) -> i32 {
    self.occluded
  }

  pub fn alpha(&self) -> f64 {
    self.alpha
  }

  pub fn bbox(&self) -> &BBox {
    &self.bbox
  }

  pub fn dimensions(&self) -> &Dimensions3d {
    &self.dimensions
  }

  pub fn location(&self) -> &Location3d {
    &self.location
  }

  pub fn rotation_y(&self) -> f64 {
    self.rotation_y
  }

  pub fn score(&self) -> Option<f64> {
    self.score
  }
}

impl FromStr for ObjectRecord {
  type Err = MalformedKind;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    ObjectRecord::parse(s, &ParseOptions::default())
  }
}

impl fmt::Display for ObjectRecord {
  fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
    f.write_str(&self.line)
  }
}

/// 逐行解析标签文本，跳过空行，遇到第一处错误即中止
pub fn parse_labels(
  text: &str,
  options: &ParseOptions,
) -> Result<Box<[ObjectRecord]>, MalformedRecord> {
  text
    .lines()
    .enumerate()
    .filter(|(_, line)| !line.trim().is_empty())
    .map(|(index, line)| {
      ObjectRecord::parse(line, options).map_err(|kind| MalformedRecord {
        line: index + 1,
        kind,
      })
    })
    .collect()
}

pub fn load_labels<P: AsRef<Path>>(
  path: P,
  options: &ParseOptions,
) -> Result<Box<[ObjectRecord]>, LabelError> {
  let path = path.as_ref();
  let text = std::fs::read_to_string(path).map_err(|err| match err.kind() {
    std::io::ErrorKind::NotFound => LabelError::NotFound(path.to_path_buf()),
    _ => LabelError::Io {
      path: path.to_path_buf(),
      source: err,
    },
  })?;

  let records = parse_labels(&text, options).map_err(|source| LabelError::Malformed {
    path: path.to_path_buf(),
    source,
  })?;
  debug!("从 {} 读取 {} 个目标", path.display(), records.len());

  Ok(records)
}
