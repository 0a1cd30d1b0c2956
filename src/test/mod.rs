//! Shared fixtures for unit tests: synthetic PE images and icon payloads.


pub use builders::*;

use std::io::Cursor;

/// A `BITMAPINFOHEADER`-prefixed 32bpp DIB of uniform color, as stored in RT_ICON.
///
/// `bgra` is the pixel value in on-disk order. The height field is doubled and a zero
/// AND mask is appended, matching what resource compilers emit.
pub fn dib_32bpp(width: u32, height: u32, bgra: [u8; 4]) -> Vec<u8> {
    let pixels = (width * height) as usize;
    let mask_row = width.div_ceil(32) as usize * 4;

    let mut dib = vec![0_u8; 40];
    put32(&mut dib, 0, 40);
    put32(&mut dib, 4, width);
    put32(&mut dib, 8, height * 2);
    put16(&mut dib, 12, 1);
    put16(&mut dib, 14, 32);
    put32(&mut dib, 20, (pixels * 4) as u32);

    for _ in 0..pixels {
        dib.extend_from_slice(&bgra);
    }
    dib.resize(dib.len() + mask_row * height as usize, 0);
    dib
}

/// A paletted DIB (1, 4 or 8 bpp) with every pixel at palette index 0 and a zero AND mask.
pub fn dib(width: u32, height: u32, bit_count: u16) -> Vec<u8> {
    let colors = 1_usize << bit_count;
    let xor_row = (width * u32::from(bit_count)).div_ceil(32) as usize * 4;
    let mask_row = width.div_ceil(32) as usize * 4;

    let mut dib = vec![0_u8; 40];
    put32(&mut dib, 0, 40);
    put32(&mut dib, 4, width);
    put32(&mut dib, 8, height * 2);
    put16(&mut dib, 12, 1);
    put16(&mut dib, 14, bit_count);
    put32(&mut dib, 20, (xor_row * height as usize) as u32);
    put32(&mut dib, 32, colors as u32);

    for index in 0..colors {
        dib.extend_from_slice(&[index as u8, 0x40, 0x80, 0x00]);
    }
    dib.resize(dib.len() + (xor_row + mask_row) * height as usize, 0);
    dib
}

/// A GRPICONDIR with one record per `(width, height, bit_count, bytes_in_res, id)`.
pub fn group_icon_dir(entries: &[(u8, u8, u16, u32, u16)]) -> Vec<u8> {
    let mut dir = vec![0_u8; 6 + 14 * entries.len()];
    put16(&mut dir, 2, 1);
    put16(&mut dir, 4, entries.len() as u16);

    for (i, (width, height, bit_count, bytes, id)) in entries.iter().enumerate() {
        let at = 6 + 14 * i;
        dir[at] = *width;
        dir[at + 1] = *height;
        put16(&mut dir, at + 4, 1);
        put16(&mut dir, at + 6, *bit_count);
        put32(&mut dir, at + 8, *bytes);
        put16(&mut dir, at + 12, *id);
    }
    dir
}

/// A PNG-encoded uniform RGBA image.
pub fn png(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
    let image = image::RgbaImage::from_pixel(width, height, image::Rgba(rgba));

    let mut encoded = Cursor::new(Vec::new());
    image::DynamicImage::ImageRgba8(image)
        .write_to(&mut encoded, image::ImageFormat::Png)
        .unwrap();
    encoded.into_inner()
}
