// 该文件是 Kitti View 项目的一部分。
// src/table.rs - 目标属性表格输出
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

use std::str::FromStr;

use thiserror::Error;

use crate::label::{ObjectRecord, ObjectType};

const TYPE_CELL_WIDTH: usize = 16;
const CELL_WIDTH: usize = 12;

#[derive(Error, Debug, Clone, PartialEq, Eq)]
#[error("未知的表格列: {0}")]
pub struct UnknownColumn(pub String);

/// 表格列，复合列按分量展开为多个单元格
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum Column {
  Truncated,
  Occluded,
  Alpha,
  BBox,
  Dimensions,
  Location,
  RotationY,
  Score,
}

impl Column {
  pub fn headers(&self) -> &'static [&'static str] {
    match self {
      Column::Truncated => &["truncated"],
      Column::Occluded => &["occluded"],
      Column::Alpha => &["alpha"],
      Column::BBox => &["x_min", "y_min", "x_max", "y_max"],
      Column::Dimensions => &["height", "width", "length"],
      Column::Location => &["x", "y", "z"],
      Column::RotationY => &["rotation_y"],
      Column::Score => &["score"],
    }
  }

  fn values(&self, record: &ObjectRecord) -> Vec<String> {
    match self {
      Column::Truncated => vec![float(record.truncated())],
      Column::Occluded => vec![record.occluded().to_string()],
      Column::Alpha => vec![float(record.alpha())],
      Column::BBox => {
        let bbox = record.bbox();
        vec![
          float(bbox.x_min),
          float(bbox.y_min),
          float(bbox.x_max),
          float(bbox.y_max),
        ]
      }
      Column::Dimensions => {
        let dim = record.dimensions();
        vec![float(dim.height), float(dim.width), float(dim.length)]
      }
      Column::Location => {
        let loc = record.location();
        vec![float(loc.x), float(loc.y), float(loc.z)]
      }
      Column::RotationY => vec![float(record.rotation_y())],
      Column::Score => vec![record.score().map(float).unwrap_or_default()],
    }
  }
}

impl FromStr for Column {
  type Err = UnknownColumn;

  fn from_str(s: &str) -> Result<Self, Self::Err> {
    match s {
      "truncated" => Ok(Column::Truncated),
      "occluded" => Ok(Column::Occluded),
      "alpha" => Ok(Column::Alpha),
      "bbox" => Ok(Column::BBox),
      "dimensions" | "3D_dim" => Ok(Column::Dimensions),
      "location" | "3D_loc" => Ok(Column::Location),
      "rotation_y" => Ok(Column::RotationY),
      "score" => Ok(Column::Score),
      _ => Err(UnknownColumn(s.to_string())),
    }
  }
}

// 整数值保留 ".0"，例如 100.0
/// 与 Python `str(float)` 一致：指数至少两位且带符号，NaN 输出为 `nan`
fn float(value: f64) -> String {
  if value.is_nan() {
    return "nan".to_string();
  }

  let text = format!("{:?}", value);
  match text.split_once('e') {
    Some((mantissa, exponent)) => {
      let (sign, digits) = match exponent.strip_prefix('-') {
        Some(digits) => ('-', digits),
        None => ('+', exponent),
      };
      format!("{mantissa}e{sign}{digits:0>2}")
    }
    None => text,
  }
}

fn cell(text: &str) -> String {
  format!("{:>width$}", format!("{:<w$}", text, w = CELL_WIDTH - 2), width = CELL_WIDTH)
}

fn type_cell(text: &str) -> String {
  format!("|{:<width$}|", text, width = TYPE_CELL_WIDTH)
}

fn rule(row: &str) -> String {
  "-".repeat(row.chars().count())
}

/// 按 `types` 的顺序分组输出，同组内保持文件顺序
pub fn format_table(records: &[ObjectRecord], types: &[ObjectType], columns: &[Column]) -> String {
  let mut out = String::new();

  let mut header = type_cell("type");
  for column in columns {
    for name in column.headers() {
      header.push_str(&cell(name));
      header.push('|');
    }
  }

  let line = rule(&header);
  for text in [&line, &header, &line, &line] {
    out.push_str(text);
    out.push('\n');
  }

  for kind in types {
    for record in records.iter().filter(|r| r.object_type() == kind.as_str()) {
      let mut row = type_cell(record.object_type());
      for column in columns {
        for value in column.values(record) {
          row.push_str(&cell(&value));
          row.push('|');
        }
      }
      out.push_str(&row);
      out.push('\n');
      out.push_str(&rule(&row));
      out.push('\n');
    }
  }

  out
}

pub fn print_table(records: &[ObjectRecord], types: &[ObjectType], columns: &[Column]) {
  print!("{}", format_table(records, types, columns));
}

#[cfg(test)]
mod tests {
  use super::*;
  use crate::label::{ParseOptions, parse_labels};

  const LABELS: &str = "\
Pedestrian 0.00 1 0.30 10.0 20.0 30.0 80.0 1.7 0.6 0.8 -2.0 1.6 8.0 0.1
Car 0.00 0 -1.57 100.0 50.0 200.0 150.0 1.5 1.6 3.8 1.0 1.5 10.0 -1.57 0.95
Bus 0.00 0 0.00 1.0 1.0 2.0 2.0 1.0 1.0 1.0 1.0 1.0 1.0 0.0
Car 0.50 2 1.00 300.0 60.0 350.0 90.0 1.5 1.6 3.8 4.0 1.5 30.0 1.00
";

  fn records() -> Box<[ObjectRecord]> {
    parse_labels(LABELS, &ParseOptions::default()).unwrap()
  }

  #[test]
  fn bbox_table_layout() {
    let table = format_table(&records()[1..2], &[ObjectType::Car], &[Column::BBox]);
    let header = "|type            |  x_min     |  y_min     |  x_max     |  y_max     |";
    let row = "|Car             |  100.0     |  50.0      |  200.0     |  150.0     |";
    let line = "-".repeat(header.len());
    let expected = format!("{line}\n{header}\n{line}\n{line}\n{row}\n{line}\n");
    assert_eq!(table, expected);
  }

  #[test]
  fn rows_are_grouped_by_requested_type_order() {
    let table = format_table(
      &records(),
      &[ObjectType::Pedestrian, ObjectType::Car],
      &[Column::Occluded],
    );
    let rows: Vec<&str> = table.lines().filter(|l| l.starts_with('|')).skip(1).collect();
    assert_eq!(rows.len(), 3);
    assert!(rows[0].starts_with("|Pedestrian "));
    assert!(rows[1].contains("  0         |"));
    assert!(rows[2].contains("  2         |"));
  }

  #[test]
  fn unknown_and_unrequested_types_are_skipped() {
    let table = format_table(&records(), &[ObjectType::Car], &[Column::Alpha]);
    assert!(!table.contains("Bus"));
    assert!(!table.contains("Pedestrian"));
  }

  #[test]
  fn missing_score_is_an_empty_cell() {
    let records = records();
    let table = format_table(&records[2..], &ObjectType::ALL, &[Column::Score]);
    let rows: Vec<&str> = table.lines().filter(|l| l.starts_with('|')).skip(1).collect();
    assert_eq!(rows, vec!["|Car             |            |"]);

    let table = format_table(&records[1..2], &ObjectType::ALL, &[Column::Score]);
    assert!(table.contains("|  0.95      |"));
  }

  #[test]
  fn compound_columns_expand() {
    let table = format_table(&[], &ObjectType::ALL, &[Column::Dimensions, Column::Location]);
    let header = table.lines().nth(1).unwrap();
    for name in ["height", "width", "length", "x", "y", "z"] {
      assert!(header.contains(&format!("  {:<10}|", name)));
    }
  }

  #[test]
  fn empty_records_print_only_the_header() {
    let table = format_table(&[], &ObjectType::ALL, &[Column::BBox]);
    assert_eq!(table.lines().count(), 4);
  }

  #[test]
  fn floats_follow_python_str() {
    assert_eq!(float(100.0), "100.0");
    assert_eq!(float(-1.57), "-1.57");
    assert_eq!(float(0.0001), "0.0001");
    assert_eq!(float(1e-5), "1e-05");
    assert_eq!(float(1.5e-7), "1.5e-07");
    assert_eq!(float(1e16), "1e+16");
    assert_eq!(float(-2.5e20), "-2.5e+20");
    assert_eq!(float(1e-100), "1e-100");
    assert_eq!(float(f64::NAN), "nan");
    assert_eq!(float(f64::NEG_INFINITY), "-inf");
  }

  #[test]
  fn column_names() {
    assert_eq!("bbox".parse(), Ok(Column::BBox));
    assert_eq!("3D_dim".parse(), Ok(Column::Dimensions));
    assert_eq!("location".parse(), Ok(Column::Location));
    assert!("type".parse::<Column>().is_err());
  }
}
