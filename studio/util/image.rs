/// PNG encoding for the example tiles served at `/report/images/{id}.png`.

use std::io::Cursor;

use image::{DynamicImage, GrayImage, ImageOutputFormat};

/// Encodes a grayscale tile as PNG bytes.
pub fn encode_png(tile: &GrayImage) -> Result<Vec<u8>, String> {
    let mut bytes = Vec::new();
    DynamicImage::ImageLuma8(tile.clone())
        .write_to(&mut Cursor::new(&mut bytes), ImageOutputFormat::Png)
        .map_err(|e| e.to_string())?;
    Ok(bytes)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn output_is_a_png_that_decodes_back() {
        let mut tile = GrayImage::new(3, 2);
        tile.put_pixel(1, 1, image::Luma([200]));
        let bytes = encode_png(&tile).unwrap();
        assert_eq!(&bytes[..4], b"\x89PNG");

        let decoded = image::load_from_memory(&bytes).unwrap().to_luma8();
        assert_eq!(decoded.get_pixel(1, 1).0[0], 200);
        assert_eq!(decoded.dimensions(), (3, 2));
    }
}
