use std::cell::RefCell;

use anyhow::{Result, anyhow};
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

/// 识别模型输入高度
const INPUT_HEIGHT: u32 = 48;

/// 基于 PaddleOCR CRNN 的文本行识别实现
pub struct PPRec {
    session: RefCell<Session>,
    character_dict: Vec<String>,
}

impl PPRec {
    /// 创建 PPRec 实例
    ///
    /// # 参数
    ///
    /// * `model_path` - 识别模型路径
    pub fn new(model_path: &str) -> Result<PPRec> {
        let mut character_dict: Vec<String> = include_str!("../en_dict.txt")
            .lines()
            .map(String::from)
            .collect();
        // 英文模型启用空格识别, 词表末尾追加空格类
        character_dict.push(" ".to_string());

        let session = Session::builder()?
            .with_optimization_level(GraphOptimizationLevel::Level3)?
            .with_intra_threads(4)?
            .commit_from_file(model_path)?;

        debug!("文本识别模型加载成功: {}", model_path);

        Ok(PPRec {
            session: RefCell::new(session),
            character_dict,
        })
    }

    /// 将文本行图像转换为张量数组数据
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    fn image_to_tensor_array_data(image: &RgbaImage) -> ArrayBase<OwnedRepr<f32>, Dim<[usize; 4]>> {
        let (width, height) = image.dimensions();

        let target_height = INPUT_HEIGHT;
        let target_width =
            (((width as f32 / height as f32) * target_height as f32) as u32).max(16);

        let resized_image =
            imageops::resize(image, target_width, target_height, FilterType::Triangle);
        let mut input = Array::zeros((1, 3, target_height as usize, target_width as usize));

        for (x, y, pixel) in resized_image.enumerate_pixels() {
            let [r, g, b, _] = pixel.0;

            input[[0, 0, y as usize, x as usize]] = (r as f32 / 255.0 - 0.5) / 0.5;
            input[[0, 1, y as usize, x as usize]] = (g as f32 / 255.0 - 0.5) / 0.5;
            input[[0, 2, y as usize, x as usize]] = (b as f32 / 255.0 - 0.5) / 0.5;
        }
        input
    }

    /// 处理模型输出
    ///
    /// # 参数
    ///
    /// * `outputs` - 模型输出
    fn handle_session_outputs(&self, outputs: &SessionOutputs) -> Result<(String, f32)> {
        let (output_shape, output_data) = outputs[0].try_extract_tensor::<f32>()?;

        if output_shape.len() != 3 {
            return Err(anyhow!("意想不到的输出形状: {:?}", output_shape));
        }

        let batch_size_out = output_shape[0] as usize;
        let seq_len = output_shape[1] as usize;
        let num_classes = output_shape[2] as usize;
        let expected_len = batch_size_out * seq_len * num_classes;

        if output_data.len() != expected_len {
            return Err(anyhow!("意想不到的输出长度: {}", output_data.len()));
        }

        let array_view =
            ndarray::ArrayView3::from_shape((batch_size_out, seq_len, num_classes), output_data)
                .map_err(|e| anyhow!("转换输出到数组视图失败: {}", e))?;

        let preds = array_view.index_axis(ndarray::Axis(0), 0);
        let (text, confidence) = ctc_greedy_decode(&self.character_dict, &preds);

        debug!("识别结果: {}, 置信度: {}", text, confidence);

        Ok((text, confidence))
    }

    /// 识别单行文本图像
    ///
    /// # 参数
    ///
    /// * `image` - 输入图像
    pub fn recognize_line(&self, image: &RgbaImage) -> Result<(String, f32)> {
        let tensor = PPRec::image_to_tensor_array_data(image);
        let tensor = TensorRef::from_array_view(tensor.view())?;
        let mut session = self.session.borrow_mut();
        let outputs = session.run(ort::inputs![tensor])?;
        self.handle_session_outputs(&outputs)
    }
}

/// CTC 贪心解码
///
/// 逐时间步取概率最大的类, 跳过空白类 (下标 0) 与连续重复类,
/// 置信度取保留字符概率的平均值
///
/// # 参数
///
/// * `character_dict` - 字符词表
/// * `preds` - 模型输出 (时间步 x 类别数)
fn ctc_greedy_decode(character_dict: &[String], preds: &ArrayView2<f32>) -> (String, f32) {
    let blank_index = 0;

    let mut sequence_idx = Vec::new();
    let mut sequence_prob = Vec::new();

    for row in preds.outer_iter() {
        if let Some((idx, &prob)) = row
            .iter()
            .enumerate()
            .max_by(|(_, a), (_, b)| a.partial_cmp(b).unwrap())
        {
            sequence_idx.push(idx);
            sequence_prob.push(prob);
        }
    }

    let mut filtered_idx = Vec::new();
    let mut filtered_prob = Vec::new();

    for (i, &idx) in sequence_idx.iter().enumerate() {
        if (i > 0 && sequence_idx[i] == sequence_idx[i - 1]) || idx == blank_index {
            continue;
        }

        filtered_idx.push(idx);
        filtered_prob.push(sequence_prob[i]);
    }

    if filtered_idx.is_empty() {
        return ("".to_string(), 0.0);
    }

    let text: String = filtered_idx
        .iter()
        .map(|&idx| character_dict[idx - 1].clone())
        .collect::<String>()
        .trim()
        .to_string();

    let confidence = filtered_prob.iter().sum::<f32>() / filtered_prob.len() as f32;

    (text, confidence)
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::Array2;

    fn build_dict() -> Vec<String> {
        vec!["a", "b", "c", " "]
            .into_iter()
            .map(String::from)
            .collect()
    }

    #[test]
    fn test_ctc_greedy_decode() {
        let dict = build_dict();
        // 5 个时间步, 5 个类别 (空白 + 词表)
        // 序列: 空白, a, a, b, 空白 -> "ab"
        let preds = Array2::from_shape_vec(
            (5, 5),
            vec![
                0.9, 0.02, 0.03, 0.03, 0.02, // t=0: 空白
                0.1, 0.8, 0.05, 0.03, 0.02, // t=1: a
                0.1, 0.7, 0.1, 0.05, 0.05, // t=2: a (重复, 跳过)
                0.1, 0.1, 0.7, 0.05, 0.05, // t=3: b
                0.8, 0.05, 0.05, 0.05, 0.05, // t=4: 空白
            ],
        )
        .unwrap();

        let (text, confidence) = ctc_greedy_decode(&dict, &preds.view());
        assert_eq!(text, "ab");
        assert!((confidence - 0.75).abs() < 0.001);
    }

    #[test]
    fn test_ctc_greedy_decode_blank_only() {
        let dict = build_dict();
        let preds = Array2::from_shape_vec(
            (2, 5),
            vec![
                0.9, 0.02, 0.03, 0.03, 0.02, //
                0.8, 0.05, 0.05, 0.05, 0.05, //
            ],
        )
        .unwrap();

        let (text, confidence) = ctc_greedy_decode(&dict, &preds.view());
        assert_eq!(text, "");
        assert_eq!(confidence, 0.0);
    }

    #[test]
    fn test_ctc_greedy_decode_space() {
        let dict = build_dict();
        // a, 空格, b -> "a b"
        let preds = Array2::from_shape_vec(
            (3, 5),
            vec![
                0.1, 0.8, 0.05, 0.03, 0.02, // t=0: a
                0.1, 0.05, 0.05, 0.05, 0.75, // t=1: 空格
                0.1, 0.1, 0.7, 0.05, 0.05, // t=2: b
            ],
        )
        .unwrap();

        let (text, _) = ctc_greedy_decode(&dict, &preds.view());
        assert_eq!(text, "a b");
    }

    #[test]
    fn test_character_dict() {
        let character_dict: Vec<String> = include_str!("../en_dict.txt")
            .lines()
            .map(String::from)
            .collect();
        assert_eq!(character_dict.len(), 94);
        assert_eq!(character_dict[0], "0");
        assert_eq!(character_dict[10], ":");
        assert!(character_dict.contains(&"A".to_string()));
        assert!(character_dict.contains(&"z".to_string()));
    }
}
