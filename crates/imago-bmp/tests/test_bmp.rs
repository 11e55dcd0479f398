/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use imago_bmp::BmpDecoder;
use imago_core::bit_depth::BitDepth;
use imago_core::options::DecoderOptions;

/// Assemble a BMP with a 40 byte BITMAPINFOHEADER
///
/// `masks` lands right after the header, `palette` entries are 4 byte
/// BGRX. `pixels` must already be padded to 4 byte rows.
fn build_v3(
    width: i32,
    height: i32,
    bpp: u16,
    compression: u32,
    masks: &[u32],
    palette: &[[u8; 4]],
    pixels: &[u8],
) -> Vec<u8> {
    let pao = 14 + 40 + masks.len() * 4 + palette.len() * 4;
    let file_size = pao + pixels.len();

    let mut out = Vec::with_capacity(file_size);
    out.extend_from_slice(b"BM");
    out.extend_from_slice(&(file_size as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);
    out.extend_from_slice(&(pao as u32).to_le_bytes());

    out.extend_from_slice(&40_u32.to_le_bytes());
    out.extend_from_slice(&width.to_le_bytes());
    out.extend_from_slice(&height.to_le_bytes());
    out.extend_from_slice(&1_u16.to_le_bytes());
    out.extend_from_slice(&bpp.to_le_bytes());
    out.extend_from_slice(&compression.to_le_bytes());
    // raw size, resolutions, palette count, important colors
    out.extend_from_slice(&[0; 12]);
    out.extend_from_slice(&(palette.len() as u32).to_le_bytes());
    out.extend_from_slice(&[0; 4]);

    for mask in masks {
        out.extend_from_slice(&mask.to_le_bytes());
    }
    for entry in palette {
        out.extend_from_slice(entry);
    }
    out.extend_from_slice(pixels);
    out
}

#[test]
fn rgb24_bottom_up() {
    // display order: red green / blue white, stored bottom row first
    // as BGR with two pad bytes per row
    let pixels = [
        0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00, // blue, white
        0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00, // red, green
    ];
    let bmp = build_v3(2, 2, 24, 0, &[], &[], &pixels);

    let mut decoder = BmpDecoder::new(&bmp);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((2, 2)));
    assert_eq!(decoder.depth(), BitDepth::Eight);
    assert_eq!(
        decoded,
        [0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF]
    );
}

#[test]
fn rgb24_top_down_matches_bottom_up() {
    let bottom_up_pixels = [
        0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
        0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00,
    ];
    let top_down_pixels = [
        0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00,
        0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
    ];

    let bottom_up = build_v3(2, 2, 24, 0, &[], &[], &bottom_up_pixels);
    // negative height flags top-down storage
    let top_down = build_v3(2, -2, 24, 0, &[], &[], &top_down_pixels);

    let a = BmpDecoder::new(&bottom_up).decode().unwrap();
    let b = BmpDecoder::new(&top_down).decode().unwrap();
    assert_eq!(a, b);
}

#[test]
fn forced_flip_reverses_rows() {
    let pixels = [
        0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00,
        0x00, 0x00, 0xFF, 0x00, 0xFF, 0x00, 0x00, 0x00,
    ];
    let bmp = build_v3(2, 2, 24, 0, &[], &[], &pixels);

    let options = DecoderOptions::default().set_flip_vertically(true);
    let decoded = BmpDecoder::new_with_options(&bmp, options).decode().unwrap();

    assert_eq!(
        decoded,
        [0x00, 0x00, 0xFF, 0xFF, 0xFF, 0xFF, 0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00]
    );
}

#[test]
fn monochrome_palette_all_ones() {
    // 8x8, 1 bpp, palette black/white, every pixel bit set
    let palette = [[0x00, 0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF, 0x00]];
    let mut pixels = Vec::new();
    for _ in 0..8 {
        pixels.extend_from_slice(&[0xFF, 0x00, 0x00, 0x00]);
    }

    let bmp = build_v3(8, 8, 1, 0, &[], &palette, &pixels);
    let decoded = BmpDecoder::new(&bmp).decode().unwrap();

    assert_eq!(decoded.len(), 8 * 8 * 3);
    assert!(decoded.iter().all(|px| *px == 0xFF));
}

#[test]
fn zero_palette_count_means_all_entries() {
    let palette = [[0x00, 0x00, 0x00, 0x00], [0xFF, 0xFF, 0xFF, 0x00]];
    let pixels = [0x80, 0x00, 0x00, 0x00];

    let mut bmp = build_v3(1, 1, 1, 0, &[], &palette, &pixels);
    // blank the stored palette count; at 1 bpp the decoder must
    // derive two entries on its own
    bmp[46..50].fill(0);

    let decoded = BmpDecoder::new(&bmp).decode().unwrap();
    assert_eq!(decoded, [0xFF, 0xFF, 0xFF]);
}

#[test]
fn four_bit_palette_width_three() {
    // width 3 at 4 bpp: two pixels in the first byte, one in the
    // second, trailing nibble ignored, row padded to four bytes
    let palette = [
        [0x00, 0x00, 0x00, 0x00], // 0: black
        [0x00, 0x00, 0xFF, 0x00], // 1: red (stored BGR0)
        [0x00, 0xFF, 0x00, 0x00], // 2: green
        [0xFF, 0x00, 0x00, 0x00], // 3: blue
    ];
    // indices 1, 2, 3 -> bytes 0x12, 0x30
    let pixels = [0x12, 0x30, 0x00, 0x00];

    let bmp = build_v3(3, 1, 4, 0, &[], &palette, &pixels);
    let decoded = BmpDecoder::new(&bmp).decode().unwrap();

    assert_eq!(decoded, [0xFF, 0, 0, 0, 0xFF, 0, 0, 0, 0xFF]);
}

#[test]
fn eight_bit_palette() {
    let mut palette = [[0_u8; 4]; 256];
    palette[7] = [0x10, 0x20, 0x30, 0x00];
    palette[255] = [0xFF, 0xFF, 0xFF, 0x00];

    // 2x1 image, indices 7 and 255
    let pixels = [7, 255, 0, 0];
    let bmp = build_v3(2, 1, 8, 0, &[], &palette, &pixels);
    let decoded = BmpDecoder::new(&bmp).decode().unwrap();

    assert_eq!(decoded, [0x30, 0x20, 0x10, 0xFF, 0xFF, 0xFF]);
}

#[test]
fn sampled_16bpp_565_bitfields() {
    let masks = [0xF800, 0x07E0, 0x001F];
    // red then green, no padding needed at width 2
    let pixels = [0x00, 0xF8, 0xE0, 0x07];

    let bmp = build_v3(2, 1, 16, 3, &masks, &[], &pixels);
    let mut decoder = BmpDecoder::new(&bmp);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoder.colorspace(), Some(imago_core::colorspace::ColorSpace::RGB));
    assert_eq!(decoded, [0xFF, 0x00, 0x00, 0x00, 0xFF, 0x00]);
}

#[test]
fn sampled_16bpp_without_masks_defaults_to_555() {
    // 0x7C00 is full red in the implied 5-5-5 layout
    let pixels = [0x00, 0x7C, 0x00, 0x00];
    let bmp = build_v3(1, 1, 16, 0, &[], &[], &pixels);

    let decoded = BmpDecoder::new(&bmp).decode().unwrap();
    assert_eq!(decoded, [0xFF, 0x00, 0x00]);
}

#[test]
fn sampled_32bpp_alpha_bitfields() {
    let masks = [0x00FF_0000, 0x0000_FF00, 0x0000_00FF, 0xFF00_0000];
    let sample: u32 = 0x80FF_8040;
    let bmp = build_v3(1, 1, 32, 6, &masks, &[], &sample.to_le_bytes());

    let mut decoder = BmpDecoder::new(&bmp);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoder.colorspace(), Some(imago_core::colorspace::ColorSpace::RGBA));
    assert_eq!(decoded, [0xFF, 0x80, 0x40, 0x80]);
}

#[test]
fn raw_32bpp_without_mask_discards_alpha() {
    // stored BGRA, the alpha byte must not reach the output
    let pixels = [0x40, 0x80, 0xFF, 0xAA];
    let bmp = build_v3(1, 1, 32, 0, &[], &[], &pixels);

    let mut decoder = BmpDecoder::new(&bmp);
    let decoded = decoder.decode().unwrap();

    assert_eq!(decoder.dimensions(), Some((1, 1)));
    assert_eq!(decoded, [0xFF, 0x80, 0x40]);
}

#[test]
fn width_one_rows_are_padded() {
    // 1x2 at 24 bpp: each 3 byte row pads to 4
    let pixels = [
        0x01, 0x02, 0x03, 0x00, // bottom row
        0x04, 0x05, 0x06, 0x00, // top row
    ];
    let bmp = build_v3(1, 2, 24, 0, &[], &[], &pixels);
    let decoded = BmpDecoder::new(&bmp).decode().unwrap();

    assert_eq!(decoded, [0x06, 0x05, 0x04, 0x03, 0x02, 0x01]);
}

#[test]
fn bad_magic_is_rejected() {
    let mut bmp = build_v3(1, 1, 24, 0, &[], &[], &[0, 0, 0, 0]);
    bmp[0] = b'Q';

    assert!(BmpDecoder::new(&bmp).decode().is_err());
}

#[test]
fn rle_compression_is_unsupported() {
    let bmp = build_v3(1, 1, 8, 1, &[], &[[0, 0, 0, 0]], &[0, 0, 0, 0]);

    assert!(BmpDecoder::new(&bmp).decode().is_err());
}

#[test]
fn truncated_pixel_array_is_rejected() {
    let pixels = [0xFF, 0x00, 0x00, 0xFF, 0xFF, 0xFF, 0x00, 0x00];
    let mut bmp = build_v3(2, 2, 24, 0, &[], &[], &pixels);
    // chop off most of the pixel data
    bmp.truncate(bmp.len() - 10);

    assert!(BmpDecoder::new(&bmp).decode().is_err());
}

#[test]
fn invalid_dib_size_is_rejected() {
    let mut bmp = build_v3(1, 1, 24, 0, &[], &[], &[0, 0, 0, 0]);
    // dib size lives right after the 14 byte file header
    bmp[14] = 200;

    assert!(BmpDecoder::new(&bmp).decode().is_err());
}

#[test]
fn zero_dimensions_are_rejected() {
    let bmp = build_v3(0, 1, 24, 0, &[], &[], &[]);
    assert!(BmpDecoder::new(&bmp).decode().is_err());
}
