use std::io::Cursor;

use anyhow::Context;
use image::{imageops::FilterType, ImageFormat};

use crate::{
    api::{self, Bounds, MediaType, Upload},
    Error,
};

/// What the form shows for a picked file before it is submitted
#[derive(Clone, Debug, Eq, PartialEq)]
pub enum Preview {
    /// `data:` URL of the resampled image
    Image(String),
    Text(String),
}

#[derive(Clone, Debug, Eq, PartialEq)]
pub struct Resampled {
    pub upload: Upload,
    pub width: u32,
    pub height: u32,
    pub preview: Preview,
}

/// Dimensions of a `width`x`height` image scaled down to fit in `bounds`,
/// keeping its aspect ratio. Images that already fit are left as-is.
///
/// Each side is rounded to the nearest pixel but never below 1, so very thin
/// images still produce an encodable result.
pub fn scaled_dimensions(width: u32, height: u32, bounds: Bounds) -> (u32, u32) {
    if width == 0 || height == 0 {
        return (width, height);
    }
    let scale = (bounds.width as f64 / width as f64)
        .min(bounds.height as f64 / height as f64)
        .min(1.0);
    let scaled = |len: u32| ((len as f64 * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}

fn image_format(media_type: MediaType) -> Option<ImageFormat> {
    match media_type {
        MediaType::Jpeg => Some(ImageFormat::Jpeg),
        MediaType::Png => Some(ImageFormat::Png),
        MediaType::Gif => Some(ImageFormat::Gif),
        MediaType::PlainText => None,
    }
}

/// Scales `upload` to fit in `bounds` and re-encodes it in its own format.
///
/// Decoding and encoding run on the blocking thread pool.
pub async fn resample(upload: Upload, bounds: Bounds) -> Result<Resampled, Error> {
    tokio::task::spawn_blocking(move || resample_blocking(upload, bounds))
        .await
        .context("resampling task panicked")?
}

fn resample_blocking(upload: Upload, bounds: Bounds) -> Result<Resampled, Error> {
    let format = image_format(upload.media_type).ok_or_else(|| {
        api::Error::UnsupportedAttachment(upload.media_type.mime().to_string())
    })?;
    let img = image::load_from_memory_with_format(&upload.data, format)?;
    let (width, height) = scaled_dimensions(img.width(), img.height(), bounds);
    let img = match (width, height) == (img.width(), img.height()) {
        true => img,
        false => img.resize_exact(width, height, FilterType::Triangle),
    };

    let mut data = Vec::new();
    img.write_to(&mut Cursor::new(&mut data), format)?;
    tracing::debug!(
        file = %upload.file_name,
        from = upload.data.len(),
        to = data.len(),
        width,
        height,
        "resampled image"
    );

    let preview = Preview::Image(format!(
        "data:{};base64,{}",
        upload.media_type.mime(),
        base64::encode(&data)
    ));
    Ok(Resampled {
        upload: Upload {
            file_name: upload.file_name,
            media_type: upload.media_type,
            data,
        },
        width,
        height,
        preview,
    })
}
