/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Format sniffing and decoder dispatch

use imago_bmp::BmpDecoder;
use imago_core::options::DecoderOptions;
use imago_png::PngDecoder;

use crate::errors::ImagoErrors;
use crate::image::Image;

/// Image formats the loader can tell apart from their magic bytes
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ImageFormat {
    /// Windows bitmap
    Bmp,
    /// Portable Network Graphics
    Png,
    /// JPEG, recognized but not decoded
    Jpeg,
    /// Anything else
    Unknown,
}

/// Guess the format of an image from its first four bytes
///
/// JPEG is sniffed so the caller gets a precise "recognized but
/// unsupported" answer instead of a generic unknown-format one.
pub fn guess_format(bytes: &[u8]) -> ImageFormat {
    let Some(magic) = bytes.get(0..4) else {
        return ImageFormat::Unknown;
    };

    match magic {
        [0x42, 0x4D, _, _] => ImageFormat::Bmp,
        [0x89, b'P', b'N', b'G'] => ImageFormat::Png,
        [0xFF, 0xD8, _, _] => ImageFormat::Jpeg,
        _ => ImageFormat::Unknown,
    }
}

/// Sniff `bytes` and run the matching decoder
pub(crate) fn decode_buffer(
    bytes: &[u8],
    options: DecoderOptions,
) -> Result<Image, ImagoErrors> {
    match guess_format(bytes) {
        ImageFormat::Bmp => {
            let mut decoder = BmpDecoder::new_with_options(bytes, options);
            let pixels = decoder.decode()?;

            // headers decoded successfully, metadata is present
            let (width, height) = decoder.dimensions().unwrap_or((0, 0));
            let channels = decoder
                .colorspace()
                .map_or(0, |colorspace| colorspace.num_components());

            Ok(Image::new(pixels, width, height, channels))
        }
        ImageFormat::Png => {
            let mut decoder = PngDecoder::new_with_options(bytes, options);
            let pixels = decoder.decode()?;

            let (width, height) = decoder.dimensions().unwrap_or((0, 0));
            let channels = decoder
                .colorspace()
                .map_or(0, |colorspace| colorspace.num_components());

            Ok(Image::new(pixels, width, height, channels))
        }
        ImageFormat::Jpeg => Err(ImagoErrors::UnsupportedFormat(ImageFormat::Jpeg)),
        ImageFormat::Unknown => Err(ImagoErrors::UnknownFormat),
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn magic_byte_sniffing() {
        assert_eq!(guess_format(b"BM\x00\x00rest"), ImageFormat::Bmp);
        assert_eq!(guess_format(&[0x89, b'P', b'N', b'G']), ImageFormat::Png);
        assert_eq!(guess_format(&[0xFF, 0xD8, 0xFF, 0xE0]), ImageFormat::Jpeg);
        assert_eq!(guess_format(b"GIF8"), ImageFormat::Unknown);
        assert_eq!(guess_format(b"BM"), ImageFormat::Unknown);
        assert_eq!(guess_format(&[]), ImageFormat::Unknown);
    }
}
