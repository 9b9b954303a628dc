use thiserror::Error;

#[derive(Error, Debug)]
pub enum ImtextError {
    #[error("读取图片失败: {path}")]
    ImageRead {
        path: String,
        #[source]
        source: image::ImageError,
    },
    #[error(transparent)]
    AnyhowError(#[from] anyhow::Error),
}
