use anyhow::Result;
use common::Region;
use image::RgbaImage;

/// 单条文本检测结果
#[derive(Debug, Clone)]
pub struct Detection {
    pub region: Region,
    pub text: String,
    pub confidence: f32,
}

/// OCR 接口
pub trait Ocr {
    /// 识别图片中的所有文本区域
    ///
    /// 检测结果按引擎自身的顺序返回
    ///
    /// # 参数
    ///
    /// * `image` - 待识别的图片
    fn recognize(&self, image: &RgbaImage) -> Result<Vec<Detection>>;
}
