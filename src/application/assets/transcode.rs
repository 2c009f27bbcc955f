//! Image decoding and variant encoding on top of the `image` crate.

use std::io::Cursor;

use image::codecs::gif::{GifDecoder, GifEncoder, Repeat};
use image::codecs::jpeg::JpegEncoder;
use image::imageops::{self, FilterType};
use image::{AnimationDecoder, DynamicImage, Frame, ImageError, ImageFormat};
use thiserror::Error;

use crate::domain::assets::ImageEncoding;

const JPEG_QUALITY: u8 = 80;
const FILTER: FilterType = FilterType::Lanczos3;

#[derive(Debug, Error)]
pub enum TranscodeError {
    #[error("failed to decode source image: {0}")]
    Decode(#[source] ImageError),
    #[error("failed to encode variant: {0}")]
    Encode(#[source] ImageError),
    #[error("source image has no frames")]
    Empty,
    #[error("image task failed: {0}")]
    Task(String),
}

/// Pick the output encoding for a fetched source. GIF stays GIF so
/// animations survive; everything else becomes JPEG.
pub fn output_encoding(content_type: Option<&str>, data: &[u8]) -> ImageEncoding {
    let declared_gif = content_type
        .map(|value| value.split(';').next().unwrap_or(value).trim())
        .is_some_and(|value| value.eq_ignore_ascii_case("image/gif"));
    let sniffed_gif = content_type.is_none()
        && matches!(image::guess_format(data), Ok(ImageFormat::Gif));

    if declared_gif || sniffed_gif {
        ImageEncoding::Gif
    } else {
        ImageEncoding::Jpeg
    }
}

/// A decoded source image, ready to be resized repeatedly.
pub enum DecodedImage {
    Still(DynamicImage),
    Animated(Vec<Frame>),
}

impl DecodedImage {
    pub fn decode(data: &[u8], encoding: ImageEncoding) -> Result<Self, TranscodeError> {
        match encoding {
            ImageEncoding::Gif => {
                let decoder = GifDecoder::new(Cursor::new(data)).map_err(TranscodeError::Decode)?;
                let frames = decoder
                    .into_frames()
                    .collect_frames()
                    .map_err(TranscodeError::Decode)?;
                if frames.is_empty() {
                    return Err(TranscodeError::Empty);
                }
                Ok(Self::Animated(frames))
            }
            ImageEncoding::Jpeg => image::load_from_memory(data)
                .map(Self::Still)
                .map_err(TranscodeError::Decode),
        }
    }

    pub fn dimensions(&self) -> (u32, u32) {
        match self {
            Self::Still(image) => (image.width(), image.height()),
            Self::Animated(frames) => frames
                .first()
                .map_or((0, 0), |frame| frame.buffer().dimensions()),
        }
    }

    /// Encode a copy that fits inside a `bound`×`bound` box.
    pub fn encode_variant(&self, bound: u32) -> Result<Vec<u8>, TranscodeError> {
        let (width, height) = self.dimensions();
        let (target_width, target_height) = fit_within(width, height, bound);
        let mut output = Vec::new();

        match self {
            Self::Still(image) => {
                let resized = if (target_width, target_height) == (width, height) {
                    image.to_rgb8()
                } else {
                    image
                        .resize_exact(target_width, target_height, FILTER)
                        .to_rgb8()
                };
                JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY)
                    .encode_image(&resized)
                    .map_err(TranscodeError::Encode)?;
            }
            Self::Animated(frames) => {
                let resized: Vec<Frame> = frames
                    .iter()
                    .map(|frame| {
                        let buffer = if (target_width, target_height) == (width, height) {
                            frame.buffer().clone()
                        } else {
                            imageops::resize(frame.buffer(), target_width, target_height, FILTER)
                        };
                        Frame::from_parts(buffer, 0, 0, frame.delay())
                    })
                    .collect();

                let mut encoder = GifEncoder::new(&mut output);
                encoder
                    .set_repeat(Repeat::Infinite)
                    .map_err(TranscodeError::Encode)?;
                encoder
                    .encode_frames(resized)
                    .map_err(TranscodeError::Encode)?;
            }
        }

        Ok(output)
    }
}

/// Scale `(width, height)` to fit inside `bound`×`bound`, preserving aspect
/// ratio and never enlarging.
pub fn fit_within(width: u32, height: u32, bound: u32) -> (u32, u32) {
    if width <= bound && height <= bound {
        return (width, height);
    }
    let scale = f64::from(bound) / f64::from(width.max(height));
    let scaled = |value: u32| ((f64::from(value) * scale).round() as u32).max(1);
    (scaled(width), scaled(height))
}
