// 该文件是 Kitti View 项目的一部分。
// src/render/draw.rs - 标注结果可视化
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

use std::path::Path;

use ab_glyph::{FontVec, InvalidFont, PxScale};
use image::{Rgb, RgbImage};
use imageproc::drawing::{
  draw_filled_rect_mut, draw_hollow_rect_mut, draw_line_segment_mut, draw_text_mut, text_size,
};
use imageproc::rect::Rect;
use thiserror::Error;
use tracing::{debug, warn};

use crate::render::boxes::DrawBox;

const LINE_WIDTH: u32 = 3;
const TITLE_FONT_SIZE: f32 = 35.0;
const TITLE_PADDING: u32 = 4;
const TITLE_COLOR: [u8; 3] = [255, 255, 255]; // 白色
const TITLE_BACKGROUND: [u8; 3] = [0, 0, 0];
const GRID_COLOR: [u8; 3] = [200, 200, 200]; // 浅灰

#[derive(Error, Debug)]
pub enum DrawError {
  #[error("I/O 错误: {0}")]
  Io(#[from] std::io::Error),
  #[error("字体加载错误: {0}")]
  Font(#[from] InvalidFont),
}

/// 单张图像上需要绘制的内容
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Annotation {
  pub boxes: Vec<DrawBox>,
  pub title: Option<String>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Grid {
  pub step: u32,
  pub color: [u8; 3],
}

pub struct Draw {
  line_width: u32,
  grid: Option<Grid>,
  font: Option<FontVec>,
  font_size: f32,
  title_color: [u8; 3],
  title_background: [u8; 3],
}

impl Default for Draw {
  fn default() -> Self {
    Self {
      line_width: LINE_WIDTH,
      grid: None,
      font: None,
      font_size: TITLE_FONT_SIZE,
      title_color: TITLE_COLOR,
      title_background: TITLE_BACKGROUND,
    }
  }
}

impl Draw {
  pub fn with_line_width(mut self, line_width: u32) -> Self {
    self.line_width = line_width.max(1);
    self
  }

  /// 步长为 0 时关闭网格
  pub fn with_grid(mut self, step: u32) -> Self {
    self.grid = (step > 0).then_some(Grid {
      step,
      color: GRID_COLOR,
    });
    self
  }

  pub fn with_font(mut self, font: FontVec) -> Self {
    self.font = Some(font);
    self
  }

  pub fn with_font_file<P: AsRef<Path>>(self, path: P) -> Result<Self, DrawError> {
    let data = std::fs::read(path.as_ref())?;
    let font = FontVec::try_from_vec(data)?;
    debug!("加载标题字体: {}", path.as_ref().display());
    Ok(self.with_font(font))
  }

  pub fn with_font_size(mut self, font_size: f32) -> Self {
    self.font_size = font_size;
    self
  }

  pub fn grid(&self) -> Option<Grid> {
    self.grid
  }

  pub fn has_font(&self) -> bool {
    self.font.is_some()
  }

  /// 绘制空心矩形，线宽向框内加粗
  pub fn draw_box(&self, image: &mut RgbImage, draw_box: &DrawBox) {
    let (w, h) = (image.width() as i32, image.height() as i32);
    if w == 0 || h == 0 {
      return;
    }

    let (x_a, x_b) = (draw_box.x, draw_box.x + draw_box.width);
    let (y_a, y_b) = (draw_box.y, draw_box.y + draw_box.height);

    // 限制到图像外一个像素，超出部分由 imageproc 裁剪
    let x_min = (x_a.min(x_b).floor() as i32).clamp(-1, w);
    let y_min = (y_a.min(y_b).floor() as i32).clamp(-1, h);
    let x_max = (x_a.max(x_b).ceil() as i32).clamp(-1, w);
    let y_max = (y_a.max(y_b).ceil() as i32).clamp(-1, h);

    let color = Rgb(draw_box.color);
    for thickness in 0..self.line_width as i32 {
      let (left, top) = (x_min + thickness, y_min + thickness);
      let (right, bottom) = (x_max - thickness, y_max - thickness);
      if left > right || top > bottom {
        break;
      }
      let rect = Rect::at(left, top).of_size((right - left + 1) as u32, (bottom - top + 1) as u32);
      draw_hollow_rect_mut(image, rect, color);
    }
  }

  pub fn draw_grid(&self, image: &mut RgbImage) {
    let Some(Grid { step, color }) = self.grid else {
      return;
    };
    let (w, h) = image.dimensions();
    if w == 0 || h == 0 {
      return;
    }

    for x in (step..w).step_by(step as usize) {
      draw_line_segment_mut(image, (x as f32, 0.0), (x as f32, (h - 1) as f32), Rgb(color));
    }
    for y in (step..h).step_by(step as usize) {
      draw_line_segment_mut(image, (0.0, y as f32), ((w - 1) as f32, y as f32), Rgb(color));
    }
  }

  /// 没有加载字体时不绘制标题，并给出警告
  pub fn draw_title(&self, image: &mut RgbImage, title: &str) {
    let Some(font) = &self.font else {
      warn!("未加载字体, 无法绘制标题 '{}', 请通过 font 参数指定字体文件", title);
      return;
    };
    if title.is_empty() {
      return;
    }

    let scale = PxScale::from(self.font_size);
    let (text_width, text_height) = text_size(scale, font, title);
    let rect = Rect::at(0, 0).of_size(
      text_width + 2 * TITLE_PADDING,
      text_height + 2 * TITLE_PADDING,
    );
    draw_filled_rect_mut(image, rect, Rgb(self.title_background));
    draw_text_mut(
      image,
      Rgb(self.title_color),
      TITLE_PADDING as i32,
      TITLE_PADDING as i32,
      scale,
      font,
      title,
    );
  }

  pub fn draw_annotation(&self, image: &mut RgbImage, annotation: &Annotation) {
    self.draw_grid(image);
    for draw_box in annotation.boxes.iter() {
      self.draw_box(image, draw_box);
    }
    if let Some(title) = &annotation.title {
      self.draw_title(image, title);
    }
  }
}

#[cfg(test)]
mod tests {
  use std::sync::{Arc, Mutex};

  use super::*;
  use crate::label::ObjectType;

  const BLACK: Rgb<u8> = Rgb([0, 0, 0]);
  const RED: Rgb<u8> = Rgb([0xff, 0, 0]);

  fn car_box(x: f64, y: f64, width: f64, height: f64) -> DrawBox {
    DrawBox {
      kind: ObjectType::Car,
      x,
      y,
      width,
      height,
      color: ObjectType::Car.color(),
    }
  }

  #[test]
  fn box_edges_are_three_pixels_wide() {
    let mut image = RgbImage::new(100, 100);
    Draw::default().draw_box(&mut image, &car_box(10.0, 20.0, 30.0, 40.0));

    // 四条边
    assert_eq!(*image.get_pixel(25, 20), RED);
    assert_eq!(*image.get_pixel(25, 60), RED);
    assert_eq!(*image.get_pixel(10, 40), RED);
    assert_eq!(*image.get_pixel(40, 40), RED);
    // 向内加粗
    assert_eq!(*image.get_pixel(12, 40), RED);
    assert_eq!(*image.get_pixel(13, 40), BLACK);
    assert_eq!(*image.get_pixel(25, 40), BLACK);
    // 框外
    assert_eq!(*image.get_pixel(9, 40), BLACK);
    assert_eq!(*image.get_pixel(50, 40), BLACK);
  }

  #[test]
  fn inverted_and_out_of_bounds_boxes_do_not_panic() {
    let mut image = RgbImage::new(50, 50);
    let draw = Draw::default().with_line_width(5);
    draw.draw_box(&mut image, &car_box(40.0, 40.0, -30.0, -30.0));
    assert_eq!(*image.get_pixel(10, 25), RED);

    draw.draw_box(&mut image, &car_box(-1000.0, -1000.0, 5000.0, 5000.0));
    draw.draw_box(&mut image, &car_box(f64::NAN, 3.0, 1.0, 1.0));
    draw.draw_box(&mut image, &car_box(5.0, 5.0, 0.0, 0.0));

    let mut empty = RgbImage::new(0, 0);
    draw.draw_box(&mut empty, &car_box(1.0, 1.0, 2.0, 2.0));
  }

  #[test]
  fn grid_lines_every_step() {
    let mut image = RgbImage::new(100, 100);
    let draw = Draw::default().with_grid(25);
    draw.draw_grid(&mut image);

    let grid = Rgb(GRID_COLOR);
    assert_eq!(*image.get_pixel(25, 3), grid);
    assert_eq!(*image.get_pixel(75, 90), grid);
    assert_eq!(*image.get_pixel(3, 50), grid);
    assert_eq!(*image.get_pixel(26, 3), BLACK);
    assert_eq!(*image.get_pixel(0, 0), BLACK);
  }

  #[test]
  fn zero_step_disables_grid() {
    let draw = Draw::default().with_grid(0);
    assert_eq!(draw.grid(), None);
    let mut image = RgbImage::new(10, 10);
    draw.draw_grid(&mut image);
    assert!(image.pixels().all(|p| *p == BLACK));
  }

  #[test]
  fn title_without_font_is_skipped() {
    let mut image = RgbImage::new(20, 20);
    let annotation = Annotation {
      boxes: vec![],
      title: Some("train_7".to_string()),
    };
    Draw::default().draw_annotation(&mut image, &annotation);
    assert!(image.pixels().all(|p| *p == BLACK));
  }

  #[derive(Clone, Default)]
  struct LogBuffer(Arc<Mutex<Vec<u8>>>);

  impl std::io::Write for LogBuffer {
    fn write(&mut self, buf: &[u8]) -> std::io::Result<usize> {
      self.0.lock().unwrap().extend_from_slice(buf);
      Ok(buf.len())
    }

    fn flush(&mut self) -> std::io::Result<()> {
      Ok(())
    }
  }

  #[test]
  fn title_without_font_warns() {
    let logs = LogBuffer::default();
    let writer = logs.clone();
    let subscriber = tracing_subscriber::fmt()
      .with_writer(move || writer.clone())
      .with_ansi(false)
      .finish();

    let mut image = RgbImage::new(20, 20);
    let annotation = Annotation {
      boxes: vec![],
      title: Some("train_7".to_string()),
    };
    tracing::subscriber::with_default(subscriber, || {
      Draw::default().draw_annotation(&mut image, &annotation)
    });

    let logs = String::from_utf8(logs.0.lock().unwrap().clone()).unwrap();
    assert!(logs.contains("WARN"), "{logs}");
    assert!(logs.contains("train_7"), "{logs}");
  }

  #[test]
  fn invalid_font_file_is_reported() {
    let dir = tempfile::tempdir().expect("create temp dir");
    assert!(matches!(
      Draw::default().with_font_file(dir.path().join("missing.ttf")),
      Err(DrawError::Io(_))
    ));

    let path = dir.path().join("broken.ttf");
    std::fs::write(&path, b"not a font").unwrap();
    assert!(matches!(
      Draw::default().with_font_file(&path),
      Err(DrawError::Font(_))
    ));
  }
}
