// 该文件是 Kitti View 项目的一部分。
// src/bin/kitti_list.rs - 列出划分中的图像编号
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

use kitti_view::{FromUrl, KittiDataset};
use tracing::info;

/// 列出 KITTI 划分中的全部图像编号
#[derive(Parser, Debug)]
#[command(author, version, about, long_about = None)]
pub struct Args {
  /// 数据集位置
  #[arg(long, value_name = "DATASET", default_value = "kitti:///data2/Kitti/left_12g/")]
  pub dataset: Url,
  /// 数据集划分
  #[arg(long, default_value = "train")]
  pub split: String,
}

fn main() -> Result<()> {
  tracing_subscriber::fmt::init();

  let args = Args::parse();
  info!("数据集: {}", args.dataset);

  let dataset = KittiDataset::from_url(&args.dataset)?;
  for id in dataset.list_ids(&args.split)? {
    println!("{}", id);
  }

  Ok(())
}
