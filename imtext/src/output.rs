use anyhow::Result;
use ocr::Detection;
use serde::Serialize;

/// 缺失图片路径时的固定错误信息
pub const NO_IMAGE_PATH_ERROR: &str = "No image path provided";

/// 标准输出的 JSON 结构
///
/// 成功时输出 `{"text": ...}`, 缺失参数时输出 `{"error": ...}`, 不含其它键
#[derive(Serialize, Debug)]
#[serde(untagged)]
pub enum Output {
    Text { text: String },
    Error { error: String },
}

impl Output {
    /// 创建识别成功输出
    pub fn text(text: String) -> Self {
        Output::Text { text }
    }

    /// 创建错误输出
    pub fn error(error: &str) -> Self {
        Output::Error {
            error: error.to_string(),
        }
    }

    /// 序列化为单行 JSON 字符串
    pub fn to_json(&self) -> Result<String> {
        Ok(serde_json::to_string(self)?)
    }
}

/// 拼接检测结果文本
///
/// 按检测结果顺序以换行符拼接, 无首尾分隔符, 空列表返回空字符串
///
/// # 参数
///
/// * `detections` - 检测结果列表
pub fn join_detection_text(detections: &[Detection]) -> String {
    detections
        .iter()
        .map(|detection| detection.text.as_str())
        .collect::<Vec<_>>()
        .join("\n")
}

#[cfg(test)]
mod tests {
    use super::*;
    use ocr::{Point, Region};

    fn build_detection(text: &str) -> Detection {
        Detection {
            region: Region {
                start: Point { x: 0, y: 0 },
                end: Point { x: 10, y: 10 },
            },
            text: text.to_string(),
            confidence: 0.9,
        }
    }

    #[test]
    fn test_output_text_json() {
        let output = Output::text("hello\nworld".to_string());
        assert_eq!(output.to_json().unwrap(), r#"{"text":"hello\nworld"}"#);
    }

    #[test]
    fn test_output_error_json() {
        let output = Output::error(NO_IMAGE_PATH_ERROR);
        assert_eq!(
            output.to_json().unwrap(),
            r#"{"error":"No image path provided"}"#
        );
    }

    #[test]
    fn test_output_json_single_line() {
        let output = Output::text("a\nb".to_string());
        let json = output.to_json().unwrap();
        assert!(!json.contains('\n'));
    }

    #[test]
    fn test_join_detection_text() {
        let detections = vec![
            build_detection("first"),
            build_detection("second"),
            build_detection("third"),
        ];
        assert_eq!(join_detection_text(&detections), "first\nsecond\nthird");
    }

    #[test]
    fn test_join_detection_text_single() {
        let detections = vec![build_detection("only")];
        assert_eq!(join_detection_text(&detections), "only");
    }

    #[test]
    fn test_join_detection_text_empty() {
        assert_eq!(join_detection_text(&[]), "");
    }
}
