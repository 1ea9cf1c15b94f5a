//! Image preprocessing
//!
//! Gates uploads by extension and size, then downscales oversized photos
//! before storage and verification. Decode or encode failure is logged and
//! swallowed: the pipeline proceeds with the original bytes rather than
//! failing the submission over a thumbnailing problem.

use image::imageops::FilterType;
use image::{ImageFormat, ImageOutputFormat};
use std::io::Cursor;
use tracing::{debug, warn};

/// Accepted upload extensions (trailing filename segment, case-insensitive)
pub const ALLOWED_EXTENSIONS: [&str; 4] = ["png", "jpg", "jpeg", "gif"];

/// Maximum accepted upload size
pub const MAX_UPLOAD_BYTES: usize = 16 * 1024 * 1024;

/// Images larger than this in either dimension are downscaled to fit
pub const MAX_DIMENSION: u32 = 1024;

/// JPEG re-encode quality after downscaling
const JPEG_QUALITY: u8 = 85;

/// True iff the filename carries an allowed image extension
pub fn allowed_file(filename: &str) -> bool {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ALLOWED_EXTENSIONS.contains(&ext.to_lowercase().as_str()),
        None => false,
    }
}

/// MIME type sniffed from the payload, falling back to JPEG
pub fn sniff_mime_type(data: &[u8]) -> &'static str {
    infer::get(data)
        .map(|kind| kind.mime_type())
        .unwrap_or("image/jpeg")
}

/// Downscale an image to fit within 1024x1024, preserving aspect ratio
///
/// Returns the original bytes unchanged when the image already fits, or
/// when it cannot be decoded or re-encoded (verification backends are
/// expected to tolerate oversized input).
pub fn preprocess(data: Vec<u8>, filename: &str) -> Vec<u8> {
    match downscale(&data) {
        Ok(Some(resized)) => {
            debug!(
                filename,
                original_bytes = data.len(),
                resized_bytes = resized.len(),
                "Downscaled oversized upload"
            );
            resized
        }
        Ok(None) => data,
        Err(e) => {
            warn!(filename, error = %e, "Error processing image; keeping original");
            data
        }
    }
}

/// Some(bytes) when a resize happened, None when the image already fits
fn downscale(data: &[u8]) -> Result<Option<Vec<u8>>, image::ImageError> {
    let format = image::guess_format(data)?;
    let img = image::load_from_memory_with_format(data, format)?;

    if img.width() <= MAX_DIMENSION && img.height() <= MAX_DIMENSION {
        return Ok(None);
    }

    let resized = img.resize(MAX_DIMENSION, MAX_DIMENSION, FilterType::Lanczos3);

    let output_format = match format {
        ImageFormat::Jpeg => ImageOutputFormat::Jpeg(JPEG_QUALITY),
        ImageFormat::Png => ImageOutputFormat::Png,
        ImageFormat::Gif => ImageOutputFormat::Gif,
        // Extension said png/jpg/jpeg/gif but the content is something else
        // the backends may still understand; leave it alone
        _ => return Ok(None),
    };

    let mut buffer = Cursor::new(Vec::new());
    resized.write_to(&mut buffer, output_format)?;
    Ok(Some(buffer.into_inner()))
}
