use std::cell::RefCell;

use anyhow::{Result, anyhow};
use common::{Point, Region, Size, region_dilate, region_scale};
use image::{
    RgbaImage,
    imageops::{self, FilterType},
};

use ndarray::{Array, ArrayBase, ArrayView2, Dim, OwnedRepr};
use ort::{
    session::{Session, SessionOutputs, builder::GraphOptimizationLevel},
    value::TensorRef,
};
use tracing::debug;

/// 概率图二值化阈值
const PROB_THRESHOLD: f32 = 0.3;
/// 区域平均得分过滤阈值
const BOX_THRESHOLD: f32 = 0.6;
/// 检测输入最长边限制
const MAX_SIDE_LEN: u32 = 960;
/// 区域外扩比例
const UNCLIP_RATIO: f32 = 1.5;
/// 最小可用区域边长 (概率图坐标系)
const MIN_SIDE: i32 = 3;

/// 基于 PaddleOCR DBNet 的文本检测实现
pub struct PPDet {
    session: RefCell<Session>,
}

impl PPDet {
    /// 创建 PPDet 实例
    ///
    /// # 参数
    ///
    /// * `model_path` - 检测模型路径
    pub fn new(model_path: &str) -> Result<PPDet> {
        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)?;

        debug!("文本检测模型加载成功: {}", model_path);

        Ok(PPDet {
            session: RefCell::new(session),
        })
    }

    /// 计算检测输入尺寸
    ///
    /// 最长边限制在 MAX_SIDE_LEN 内, 宽高均向下取整到 32 的倍数
    fn target_size(width: u32, height: u32) -> (u32, u32) {
        let max_side = width.max(height);
        let ratio = if max_side > MAX_SIDE_LEN {
            MAX_SIDE_LEN as f32 / max_side as f32
        } else {
            1.0
        };

        let scale = |side: u32| ((side as f32 * ratio) as u32 / 32 * 32).max(32);
        (scale(width), scale(height))
    }

    /// 将图像转换为张量数组数据
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    fn image_to_tensor_array_data(image: &RgbaImage) -> ArrayBase<OwnedRepr<f32>, Dim<[usize; 4]>> {
        let (width, height) = image.dimensions();
        let (target_width, target_height) = PPDet::target_size(width, height);

        let resized_image =
            imageops::resize(image, target_width, target_height, FilterType::Triangle);
        let mut input = Array::zeros((1, 3, target_height as usize, target_width as usize));

        // ImageNet 均值方差归一化
        let mean = [0.485, 0.456, 0.406];
        let std = [0.229, 0.224, 0.225];
        for (x, y, pixel) in resized_image.enumerate_pixels() {
            let [r, g, b, _] = pixel.0;

            input[[0, 0, y as usize, x as usize]] = (r as f32 / 255.0 - mean[0]) / std[0];
            input[[0, 1, y as usize, x as usize]] = (g as f32 / 255.0 - mean[1]) / std[1];
            input[[0, 2, y as usize, x as usize]] = (b as f32 / 255.0 - mean[2]) / std[2];
        }
        input
    }

    /// 处理模型输出, 提取文本区域
    ///
    /// # 参数
    ///
    /// * `outputs` - 模型输出
    /// * `source_size` - 原图尺寸
    fn handle_session_outputs(outputs: &SessionOutputs, source_size: &Size) -> Result<Vec<Region>> {
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;

        if output_shape.len() != 4 {
            return Err(anyhow!("意想不到的输出形状: {:?}", output_shape));
        }

        let map_height = output_shape[2] as usize;
        let map_width = output_shape[3] as usize;

        if output_data.len() != map_height * map_width {
            return Err(anyhow!("意想不到的输出长度: {}", output_data.len()));
        }

        let prob_map = ArrayView2::from_shape((map_height, map_width), output_data)
            .map_err(|e| anyhow!("转换输出到数组视图失败: {}", e))?;

        let map_size = Size {
            width: map_width as i32,
            height: map_height as i32,
        };

        let mut regions = Vec::new();
        for (region, score) in regions_from_prob_map(&prob_map, PROB_THRESHOLD) {
            if score < BOX_THRESHOLD {
                debug!("区域 {:?} 得分过低: {}", region, score);
                continue;
            }
            if region.width() < MIN_SIDE || region.height() < MIN_SIDE {
                continue;
            }

            let region = region_dilate(&region, unclip_margin(&region), &map_size);
            regions.push(region_scale(&region, &map_size, source_size));
        }
        Ok(regions)
    }

    /// 检测图像中的文本区域
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    pub fn find_regions(&self, image: &RgbaImage) -> Result<Vec<Region>> {
        let (width, height) = image.dimensions();
        let source_size = Size {
            width: width as i32,
            height: height as i32,
        };

        let tensor = PPDet::image_to_tensor_array_data(image);
        let tensor = TensorRef::from_array_view(tensor.view())?;
        let mut session = self.session.borrow_mut();
        let outputs = session.run(ort::inputs![tensor])?;
        PPDet::handle_session_outputs(&outputs, &source_size)
    }
}

/// 从概率图中提取连通区域
///
/// 返回 (区域, 平均得分) 列表, 按自上而下, 自左向右排序
///
/// # 参数
///
/// * `prob_map` - 概率图
/// * `threshold` - 二值化阈值
fn regions_from_prob_map(prob_map: &ArrayView2<f32>, threshold: f32) -> Vec<(Region, f32)> {
    let (height, width) = prob_map.dim();
    let mut visited = vec![false; width * height];
    let mut regions = Vec::new();

    for y in 0..height {
        for x in 0..width {
            if visited[y * width + x] || prob_map[[y, x]] < threshold {
                continue;
            }

            let mut min_x = x;
            let mut max_x = x;
            let mut min_y = y;
            let mut max_y = y;
            let mut score_sum = 0.0f32;
            let mut count = 0u32;

            let mut stack = vec![(x, y)];
            visited[y * width + x] = true;
            while let Some((cx, cy)) = stack.pop() {
                min_x = min_x.min(cx);
                max_x = max_x.max(cx);
                min_y = min_y.min(cy);
                max_y = max_y.max(cy);
                score_sum += prob_map[[cy, cx]];
                count += 1;

                let neighbors = [
                    (cx.wrapping_sub(1), cy),
                    (cx + 1, cy),
                    (cx, cy.wrapping_sub(1)),
                    (cx, cy + 1),
                ];
                for (nx, ny) in neighbors {
                    if nx >= width || ny >= height {
                        continue;
                    }
                    if visited[ny * width + nx] || prob_map[[ny, nx]] < threshold {
                        continue;
                    }
                    visited[ny * width + nx] = true;
                    stack.push((nx, ny));
                }
            }

            let region = Region {
                start: Point {
                    x: min_x as i32,
                    y: min_y as i32,
                },
                end: Point {
                    x: max_x as i32 + 1,
                    y: max_y as i32 + 1,
                },
            };
            regions.push((region, score_sum / count as f32));
        }
    }

    regions.sort_by_key(|(region, _)| (region.start.y, region.start.x));
    regions
}

/// 计算区域外扩边距
///
/// # 参数
///
/// * `region` - 区域
fn unclip_margin(region: &Region) -> i32 {
    let area = region.width() * region.height();
    let perimeter = 2 * (region.width() + region.height());
    (area as f32 * UNCLIP_RATIO / perimeter as f32).round() as i32
}
