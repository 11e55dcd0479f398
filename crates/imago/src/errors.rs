/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::fmt::{Debug, Display, Formatter};

use imago_bmp::BmpDecoderErrors;
use imago_png::PngErrors;

use crate::codecs::ImageFormat;

/// All the ways loading an image can fail
#[non_exhaustive]
pub enum ImagoErrors {
    /// The magic bytes matched no format we can sniff
    UnknownFormat,
    /// The format was recognized but no decoder exists for it
    UnsupportedFormat(ImageFormat),
    /// BMP decoding failed
    BmpDecodeErrors(BmpDecoderErrors),
    /// PNG decoding failed
    PngDecodeErrors(PngErrors),
    /// Pixel coordinates outside the image.
    ///
    /// Layout is `(x, y, width, height)`
    OutOfRange(usize, usize, usize, usize),
    /// Reading the file from disk failed
    IoErrors(std::io::Error),
}

impl Debug for ImagoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::UnknownFormat => writeln!(f, "Cannot determine image format from magic bytes"),
            Self::UnsupportedFormat(format) => {
                writeln!(f, "No decoder for format {format:?}")
            }
            Self::BmpDecodeErrors(err) => writeln!(f, "Bmp decoding failed: {err:?}"),
            Self::PngDecodeErrors(err) => writeln!(f, "Png decoding failed: {err:?}"),
            Self::OutOfRange(x, y, width, height) => {
                writeln!(f, "Pixel ({x}, {y}) outside a {width} x {height} image")
            }
            Self::IoErrors(err) => writeln!(f, "I/O error: {err}"),
        }
    }
}

impl Display for ImagoErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        Debug::fmt(self, f)
    }
}

impl std::error::Error for ImagoErrors {}

impl From<BmpDecoderErrors> for ImagoErrors {
    fn from(value: BmpDecoderErrors) -> Self {
        ImagoErrors::BmpDecodeErrors(value)
    }
}

impl From<PngErrors> for ImagoErrors {
    fn from(value: PngErrors) -> Self {
        ImagoErrors::PngDecodeErrors(value)
    }
}

impl From<std::io::Error> for ImagoErrors {
    fn from(value: std::io::Error) -> Self {
        ImagoErrors::IoErrors(value)
    }
}
