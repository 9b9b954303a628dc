use clap::Parser;
use tracing::Level;

/// IMTEXT 图片文字提取工具 (Image Text Extractor)
#[derive(Parser, Debug)]
#[command(version, about, long_about = None)]
pub struct Args {
    /// 待识别的图片路径
    pub image_path: Option<String>,

    /// 文本检测模型路径
    #[arg(long, default_value = "models/ch_PP-OCRv4_det_infer.onnx")]
    pub det_model: String,

    /// 文本识别模型路径
    #[arg(long, default_value = "models/en_PP-OCRv4_mobile_rec_infer.onnx")]
    pub rec_model: String,

    /// 日志等级 (trace, debug, info, warn, error)
    #[arg(short, long, default_value = "info")]
    pub log_level: Option<Level>,

    /// 日志文件路径
    #[arg(long)]
    pub log_file: Option<String>,

    /// 追加日志到文件
    #[arg(long, default_value_t = false)]
    pub append_log: bool,
}

impl Args {
    /// 创建命令行参数解析器
    pub fn new() -> Self {
        Self::parse()
    }
}
