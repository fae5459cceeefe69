//! Decoding of packed device-independent bitmaps (`CF_DIB` clipboard data).
//!
//! A packed DIB is a BMP file without its 14-byte file header, so the `image`
//! crate's BMP decoder reads it directly: any bit depth, palettes, bitfields
//! and RLE.

use std::io::Cursor;

use image::codecs::bmp::BmpDecoder;
use image::DynamicImage;

use crate::error::DibError;

/// Decodes raw `CF_DIB` bytes into an image.
pub fn decode_dib(data: &[u8]) -> Result<DynamicImage, DibError> {
    let decoder = BmpDecoder::new_without_file_header(Cursor::new(data))?;
    let image = DynamicImage::from_decoder(decoder)?;
    log::debug!(
        "Decoded {}x{} DIB as {:?}",
        image.width(),
        image.height(),
        image.color()
    );
    Ok(drop_empty_alpha(image))
}

/// Many producers leave the fourth byte of 32-bit pixels at zero. An alpha
/// channel that is zero everywhere is padding, not transparency.
fn drop_empty_alpha(image: DynamicImage) -> DynamicImage {
    match image {
        DynamicImage::ImageRgba8(rgba) if rgba.pixels().all(|px| px.0[3] == 0) => {
            DynamicImage::ImageRgb8(DynamicImage::ImageRgba8(rgba).to_rgb8())
        }
        other => other,
    }
}

/// Builders for synthetic DIB payloads used across the crate's tests.
#[cfg(test)]
pub(crate) mod testing {
    pub(crate) fn header(
        width: i32,
        height: i32,
        bit_count: u16,
        compression: u32,
        colors_used: u32,
    ) -> Vec<u8> {
        let mut h = Vec::with_capacity(40);
        h.extend_from_slice(&40u32.to_le_bytes());
        h.extend_from_slice(&width.to_le_bytes());
        h.extend_from_slice(&height.to_le_bytes());
        h.extend_from_slice(&1u16.to_le_bytes());
        h.extend_from_slice(&bit_count.to_le_bytes());
        h.extend_from_slice(&compression.to_le_bytes());
        h.extend_from_slice(&[0u8; 12]);
        h.extend_from_slice(&colors_used.to_le_bytes());
        h.extend_from_slice(&[0u8; 4]);
        h
    }

    /// 24-bit bottom-up DIB. `rows` are given top to bottom as RGB triples.
    pub(crate) fn rgb_dib(width: i32, rows: &[Vec<[u8; 3]>]) -> Vec<u8> {
        let mut data = header(width, rows.len() as i32, 24, 0, 0);
        let row_size = (width as usize * 3).div_ceil(4) * 4;
        for row in rows.iter().rev() {
            let mut bytes: Vec<u8> = row.iter().flat_map(|[r, g, b]| [*b, *g, *r]).collect();
            bytes.resize(row_size, 0);
            data.extend_from_slice(&bytes);
        }
        data
    }

    /// 32-bit uncompressed DIB, top-down. `rows` are RGB plus the raw fourth byte.
    pub(crate) fn bgrx_dib(width: i32, rows: &[Vec<[u8; 4]>]) -> Vec<u8> {
        let mut data = header(width, -(rows.len() as i32), 32, 0, 0);
        for row in rows {
            for [r, g, b, x] in row {
                data.extend_from_slice(&[*b, *g, *r, *x]);
            }
        }
        data
    }

    /// A 1x1 opaque pixel; different colours give different payloads.
    pub(crate) fn pixel_dib(rgb: [u8; 3]) -> Vec<u8> {
        rgb_dib(1, &[vec![rgb]])
    }
}

#[cfg(test)]
mod tests {
    use super::testing::*;
    use super::*;
    use image::{GenericImageView, Rgba, RgbaImage};

    #[test]
    fn decodes_bottom_up_24_bit_with_row_padding() {
        // Width 3 → 9 bytes of pixels, padded to 12.
        let rows = vec![
            vec![[255, 0, 0], [0, 255, 0], [0, 0, 255]],
            vec![[10, 20, 30], [40, 50, 60], [70, 80, 90]],
        ];
        let img = decode_dib(&rgb_dib(3, &rows)).unwrap();

        assert_eq!(img.dimensions(), (3, 2));
        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [255, 0, 0]);
        assert_eq!(rgb.get_pixel(2, 0).0, [0, 0, 255]);
        assert_eq!(rgb.get_pixel(1, 1).0, [40, 50, 60]);
    }

    #[test]
    fn decodes_top_down_32_bit() {
        let rows = vec![vec![[1, 2, 3, 0], [4, 5, 6, 0]], vec![[7, 8, 9, 0], [10, 11, 12, 0]]];
        let img = decode_dib(&bgrx_dib(2, &rows)).unwrap();

        let rgb = img.to_rgb8();
        assert_eq!(rgb.get_pixel(0, 0).0, [1, 2, 3]);
        assert_eq!(rgb.get_pixel(0, 1).0, [7, 8, 9]);
        assert_eq!(rgb.get_pixel(1, 1).0, [10, 11, 12]);
    }

    #[test]
    fn decodes_8_bit_paletted() {
        let mut data = header(1, 1, 8, 0, 2);
        data.extend_from_slice(&[0, 0, 255, 0]); // red
        data.extend_from_slice(&[0, 255, 0, 0]); // green
        data.extend_from_slice(&[1, 0, 0, 0]); // index 1, padded row

        let img = decode_dib(&data).unwrap();

        assert_eq!(img.to_rgb8().get_pixel(0, 0).0, [0, 255, 0]);
    }

    #[test]
    fn decodes_16_bit_rgb555() {
        let mut data = header(1, 1, 16, 0, 0);
        data.extend_from_slice(&0x001Fu16.to_le_bytes());
        data.extend_from_slice(&[0, 0]);

        let img = decode_dib(&data).unwrap();

        assert_eq!(img.to_rgb8().get_pixel(0, 0).0, [0, 0, 255]);
    }

    #[test]
    fn decodes_32_bit_bitfields() {
        let (width, height) = (2, 2);
        let mut data = header(width, height, 32, 3, 0);
        for mask in [0x00FF_0000u32, 0x0000_FF00, 0x0000_00FF] {
            data.extend_from_slice(&mask.to_le_bytes());
        }
        data.resize(data.len() + (width * height) as usize * 4, 0x7F);

        let img = decode_dib(&data).unwrap();

        assert_eq!(img.dimensions(), (2, 2));
        assert_eq!(img.to_rgb8().get_pixel(1, 1).0, [0x7F, 0x7F, 0x7F]);
    }

    #[test]
    fn zero_alpha_becomes_opaque_rgb() {
        let transparent = RgbaImage::from_pixel(2, 1, Rgba([9, 8, 7, 0]));
        let DynamicImage::ImageRgb8(rgb) = drop_empty_alpha(DynamicImage::ImageRgba8(transparent))
        else {
            panic!("expected RGB output");
        };
        assert_eq!(rgb.get_pixel(1, 0).0, [9, 8, 7]);

        let mut mixed = RgbaImage::from_pixel(2, 1, Rgba([9, 8, 7, 0]));
        mixed.put_pixel(0, 0, Rgba([1, 1, 1, 200]));
        assert!(matches!(
            drop_empty_alpha(DynamicImage::ImageRgba8(mixed)),
            DynamicImage::ImageRgba8(_)
        ));
    }

    #[test]
    fn rejects_garbage() {
        assert!(decode_dib(&[0u8; 10]).is_err());
        assert!(decode_dib(b"definitely not a bitmap header at all, no").is_err());
    }
}
