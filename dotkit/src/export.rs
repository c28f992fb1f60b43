//! PNG export of composited documents.

use dotkit_core::state::PixelBuffer;

/// Encode as 8 bit RGBA, unpremultiplied, rows top to bottom.
pub fn write_png(pixels: &PixelBuffer, writer: impl std::io::Write) -> Result<(), png::EncodingError> {
    let (width, height) = pixels.dimensions();
    let mut encoder = png::Encoder::new(writer, width, height);
    encoder.set_color(png::ColorType::Rgba);
    encoder.set_depth(png::BitDepth::Eight);

    let data: Vec<u8> = pixels
        .as_slice()
        .iter()
        .flat_map(|pixel| pixel.to_rgba_bytes())
        .collect();

    let mut writer = encoder.write_header()?;
    writer.write_image_data(&data)?;
    writer.finish()
}

pub fn save_png(pixels: &PixelBuffer, path: &std::path::Path) -> anyhow::Result<()> {
    use anyhow::Context;
    let file = std::fs::File::create(path).with_context(|| format!("creating {path:?}"))?;
    write_png(pixels, std::io::BufWriter::new(file)).with_context(|| format!("encoding {path:?}"))?;
    log::debug!("wrote {}x{} png to {path:?}", pixels.width(), pixels.height());
    Ok(())
}
