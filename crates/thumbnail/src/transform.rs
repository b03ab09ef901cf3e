use crate::{
    Level,
    error::{ErrorKind, Result},
};
use exn::{OptionExt, ResultExt};
use image::{
    DynamicImage, ImageFormat, Rgba, RgbaImage, codecs::jpeg::JpegEncoder, imageops,
};
use std::io::Cursor;
use tracing::instrument;

const JPEG_QUALITY: u8 = 85;

/// Decode, censor and re-encode an image in its source format.
#[instrument(skip(source), fields(source_size = source.len()))]
pub(crate) fn censor(source: &[u8], mosaic: Level, blur: Level) -> Result<Vec<u8>> {
    let format = image::guess_format(source).or_raise(|| ErrorKind::Decode)?;
    let mut decoded = image::load_from_memory_with_format(source, format).or_raise(|| ErrorKind::Decode)?;
    if !mosaic.is_off() {
        decoded = DynamicImage::ImageRgba8(pixelate(&decoded.to_rgba8(), u32::from(mosaic.get())));
    }
    if !blur.is_off() {
        decoded = DynamicImage::ImageRgba8(imageops::blur(&decoded.to_rgba8(), f32::from(blur.get())));
    }
    encode(decoded, format)
}

fn encode(image: DynamicImage, format: ImageFormat) -> Result<Vec<u8>> {
    let name = format.extensions_str().first().copied().ok_or_raise(|| ErrorKind::Encode("unknown"))?;
    let mut output = Cursor::new(Vec::new());
    match format {
        // JPEG has no alpha channel.
        ImageFormat::Jpeg => DynamicImage::ImageRgb8(image.to_rgb8())
            .write_with_encoder(JpegEncoder::new_with_quality(&mut output, JPEG_QUALITY))
            .or_raise(|| ErrorKind::Encode(name))?,
        _ => image.write_to(&mut output, format).or_raise(|| ErrorKind::Encode(name))?,
    }
    Ok(output.into_inner())
}

/// Replace every `block`×`block` cell with the average of its pixels.
///
/// Cells on the right and bottom edges may be narrower than `block`.
pub(crate) fn pixelate(image: &RgbaImage, block: u32) -> RgbaImage {
    let block = block.max(1);
    let (width, height) = image.dimensions();
    let mut output = RgbaImage::new(width, height);
    for top in (0..height).step_by(block as usize) {
        for left in (0..width).step_by(block as usize) {
            let right = (left + block).min(width);
            let bottom = (top + block).min(height);
            let mut sum = [0u64; 4];
            for y in top..bottom {
                for x in left..right {
                    let pixel = image.get_pixel(x, y);
                    for (total, channel) in sum.iter_mut().zip(pixel.0) {
                        *total += u64::from(channel);
                    }
                }
            }
            let count = u64::from((right - left) * (bottom - top));
            let average = Rgba(sum.map(|total| ((total + count / 2) / count) as u8));
            for y in top..bottom {
                for x in left..right {
                    output.put_pixel(x, y, average);
                }
            }
        }
    }
    output
}
