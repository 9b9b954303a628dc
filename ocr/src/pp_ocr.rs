use anyhow::Result;
use common::Region;
use image::{RgbaImage, imageops};
use tracing::debug;

use crate::det::PPDet;
use crate::ocr::{Detection, Ocr};
use crate::rec::PPRec;

/// 基于 PaddleOCR 的 OCR 实现
///
/// 检测模型负责定位文本区域, 识别模型负责逐区域识别文本
pub struct PPOcr {
    det: PPDet,
    rec: PPRec,
}

impl PPOcr {
    /// 创建 PPOcr 实例
    ///
    /// # 参数
    ///
    /// * `det_model_path` - 检测模型路径
    /// * `rec_model_path` - 识别模型路径
    pub fn new(det_model_path: &str, rec_model_path: &str) -> Result<PPOcr> {
        Ok(PPOcr {
            det: PPDet::new(det_model_path)?,
            rec: PPRec::new(rec_model_path)?,
        })
    }
}

/// 裁剪图像区域
///
/// # 参数
///
/// * `image` - 待裁剪的图像
/// * `region` - 待裁剪的区域
fn crop_region(image: &RgbaImage, region: &Region) -> RgbaImage {
    imageops::crop_imm(
        image,
        region.start.x as u32,
        region.start.y as u32,
        region.width() as u32,
        region.height() as u32,
    )
    .to_image()
}

impl Ocr for PPOcr {
    /// 识别图像中的所有文本区域
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<Detection>> {
        let regions = self.det.find_regions(image)?;
        debug!("检测到 {} 个文本区域", regions.len());

        let mut detections = Vec::with_capacity(regions.len());
        for region in regions {
            let line_image = crop_region(image, &region);
            let (text, confidence) = self.rec.recognize_line(&line_image)?;
            detections.push(Detection {
                region,
                text,
                confidence,
            });
        }
        Ok(detections)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use common::Point;

    #[test]
    fn test_crop_region() {
        let image = RgbaImage::new(100, 80);
        let region = Region {
            start: Point { x: 10, y: 20 },
            end: Point { x: 60, y: 50 },
        };
        let cropped_image = crop_region(&image, &region);
        assert_eq!(cropped_image.dimensions(), (50, 30));
    }
}
