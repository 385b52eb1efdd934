// 该文件是 Kitti View 项目的一部分。
// src/bin/kitti_show.rs - 显示单张图像的标注
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

use anyhow::Result;
use clap::Parser;
use url::Url;

use kitti_view::{
  FromUrl, KittiDataset, ObjectType,
  dataset::DisplayOptions,
  render::{Render, SaveImageFileOutput},
  table::Column,
};
use tracing::info;

/// 在 KITTI 图像上绘制标注框并输出属性表
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 数据集位置，例如 kitti:///data2/Kitti/left_12g/?bbox=warn
  #[arg(long, value_name = "DATASET", default_value = "kitti:///data2/Kitti/left_12g/")]
  pub dataset: Url,
  /// 数据集划分
  #[arg(long, default_value = "train")]
  pub split: String,
  /// 图像编号
  #[arg(long)]
  pub id: u64,
  /// 输出路径，例如 image:///tmp/000007.png?grid=100&font=/path/font.ttf
  #[arg(long, value_name = "OUTPUT")]
  pub output: Url,
  /// 需要显示的类别，默认全部
  #[arg(long, value_delimiter = ',')]
  pub types: Vec<ObjectType>,
  /// 属性表的列，默认 bbox
  #[arg(long, value_delimiter = ',')]
  pub columns: Vec<Column>,
  /// 不绘制边界框
  #[arg(long)]
  pub no_boxes: bool,
  /// 不输出属性表
  #[arg(long)]
  pub no_info: bool,
  /// 不绘制标题
  #[arg(long)]
  pub no_title: bool,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();

  info!("数据集: {}", args.dataset);
  info!("图像: {}_{}", args.split, args.id);
  info!("输出路径: {}", args.output);

  let dataset = KittiDataset::from_url(&args.dataset)?;
  let output = SaveImageFileOutput::from_url(&args.output)?;

  let mut options = DisplayOptions {
    boxes: !args.no_boxes,
    info: !args.no_info,
    title: !args.no_title,
    ..Default::default()
  };
  if !args.types.is_empty() {
    options.types = args.types;
  }
  if !args.columns.is_empty() {
    options.columns = args.columns;
  }

  let result = dataset.display(args.id, &args.split, &options)?;
  info!("共 {} 个边界框", result.annotation.boxes.len());
  output.render_result(&result.image, &result.annotation)?;

  if let Some(table) = result.table {
    print!("{}", table);
  }

  Ok(())
}
