use ocr::{Ocr, PPOcr};
use tracing::{error, info};

use crate::args::Args;
use crate::error::ImtextError;
use crate::log::init_log;
use crate::output::{NO_IMAGE_PATH_ERROR, Output, join_detection_text};

mod args;
mod error;
mod log;
mod output;

/// 程序入口
fn application() -> Result<(), ImtextError> {
    let args = Args::new();

    init_log(&args)?;

    let image_path = match &args.image_path {
        Some(image_path) => image_path,
        None => {
            println!("{}", Output::error(NO_IMAGE_PATH_ERROR).to_json()?);
            return Ok(());
        }
    };

    // OCR 识别引擎, 每次运行重新加载模型
    let pp_ocr = PPOcr::new(&args.det_model, &args.rec_model)?;

    let image = image::open(image_path)
        .map_err(|source| ImtextError::ImageRead {
            path: image_path.clone(),
            source,
        })?
        .to_rgba8();

    let detections = pp_ocr.recognize(&image)?;
    info!("识别到 {} 个文本区域", detections.len());

    println!("{}", Output::text(join_detection_text(&detections)).to_json()?);
    Ok(())
}

fn main() {
    match application() {
        Ok(_) => {}
        Err(e) => {
            error!("程序存在异常: {}", e);
            std::process::exit(1);
        }
    }
}
