//! Image file adapter: decode any supported format into an 8-bit gray buffer
//! and encode filtered buffers back in the input's format.

#[cfg(test)]
mod tests;

use std::io;
use std::path::{Path, PathBuf};

use image::{ColorType, ExtendedColorType, ImageFormat, ImageReader};
use thiserror::Error;

use crate::buffer::PixelBuffer;

/// Errors from reading or writing image files.
#[derive(Debug, Error)]
pub enum CodecError {
    #[error("Failed to open image '{path}': {source}")]
    Open {
        path: PathBuf,
        #[source]
        source: io::Error,
    },

    #[error("Unrecognized image format: '{path}'")]
    UnknownFormat { path: PathBuf },

    #[error("Failed to decode image '{path}': {source}")]
    Decode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Image '{path}' is too large: {width}x{height}")]
    TooLarge {
        path: PathBuf,
        width: usize,
        height: usize,
    },

    #[error("Failed to encode image '{path}': {source}")]
    Encode {
        path: PathBuf,
        #[source]
        source: image::ImageError,
    },

    #[error("Not a file path: '{path}'")]
    InvalidPath { path: PathBuf },
}

/// A decoded image reduced to one 8-bit luma channel.
#[derive(Debug, Clone)]
pub struct LoadedImage {
    pub buffer: PixelBuffer,
    /// Container format, used again when saving.
    pub format: ImageFormat,
    /// Color type of the file before conversion to luma.
    pub color: ColorType,
}

impl LoadedImage {
    /// Whether the file had to be converted to reach 8-bit gray.
    pub fn was_converted(&self) -> bool {
        self.color != ColorType::L8
    }
}

/// Decode `path` and convert it to 8-bit luma.
///
/// The format is detected from the file contents, falling back to the
/// extension. Palette, color, alpha and 16-bit images are converted.
pub fn load_gray(path: &Path) -> Result<LoadedImage, CodecError> {
    let reader = ImageReader::open(path)
        .and_then(|reader| reader.with_guessed_format())
        .map_err(|source| CodecError::Open {
            path: path.to_path_buf(),
            source,
        })?;

    let format = reader.format().ok_or_else(|| CodecError::UnknownFormat {
        path: path.to_path_buf(),
    })?;

    let image = reader.decode().map_err(|source| CodecError::Decode {
        path: path.to_path_buf(),
        source,
    })?;

    let color = image.color();
    let gray = image.to_luma8();
    let (width, height) = (gray.width() as usize, gray.height() as usize);
    let buffer =
        PixelBuffer::new(width, height, gray.into_raw()).map_err(|_| CodecError::TooLarge {
            path: path.to_path_buf(),
            width,
            height,
        })?;

    tracing::debug!(
        path = %path.display(),
        ?format,
        ?color,
        width,
        height,
        "Image decoded"
    );

    Ok(LoadedImage {
        buffer,
        format,
        color,
    })
}

/// Encode `buffer` as 8-bit gray to `path` in `format`.
pub fn save_gray(path: &Path, buffer: &PixelBuffer, format: ImageFormat) -> Result<(), CodecError> {
    let (width, height) = match (
        u32::try_from(buffer.width()),
        u32::try_from(buffer.height()),
    ) {
        (Ok(w), Ok(h)) => (w, h),
        _ => {
            return Err(CodecError::TooLarge {
                path: path.to_path_buf(),
                width: buffer.width(),
                height: buffer.height(),
            })
        }
    };

    image::save_buffer_with_format(
        path,
        buffer.pixels(),
        width,
        height,
        ExtendedColorType::L8,
        format,
    )
    .map_err(|source| CodecError::Encode {
        path: path.to_path_buf(),
        source,
    })
}

/// Destination for the filtered copy of `input`: `<dir>/<prefix><file name>`.
///
/// `dir` defaults to the directory of `input`. The extension is kept so the
/// output is written in the same format.
pub fn output_path(
    input: &Path,
    output_dir: Option<&Path>,
    prefix: &str,
) -> Result<PathBuf, CodecError> {
    let file_name = input.file_name().ok_or_else(|| CodecError::InvalidPath {
        path: input.to_path_buf(),
    })?;

    let mut name = prefix.to_owned();
    name.push_str(&file_name.to_string_lossy());

    let dir = match output_dir {
        Some(dir) => dir.to_path_buf(),
        None => input.parent().map(Path::to_path_buf).unwrap_or_default(),
    };
    Ok(dir.join(name))
}
