// 该文件是 Kitti View 项目的一部分。
// src/render/boxes.rs - 由标签构造绘制用的边界框
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

use tracing::debug;

use crate::label::{ObjectRecord, ObjectType};

/// 像素坐标下的矩形，(x, y) 为左上角
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct DrawBox {
  pub kind: ObjectType,
  pub x: f64,
  pub y: f64,
  pub width: f64,
  pub height: f64,
  pub color: [u8; 3],
}

/// 只保留类别在 `types` 中的目标，未知类别直接跳过
pub fn build_boxes(records: &[ObjectRecord], types: &[ObjectType]) -> Vec<DrawBox> {
  records
    .iter()
    .filter_map(|record| {
      let Some(kind) = record.category() else {
        debug!("跳过未知类别: {}", record.object_type());
        return None;
      };
      if !types.contains(&kind) {
        return None;
      }

      let bbox = record.bbox();
      Some(DrawBox {
        kind,
        x: bbox.x_min,
        y: bbox.y_min,
        width: bbox.width(),
        height: bbox.height(),
        color: kind.color(),
      })
    })
    .collect()
}
