/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::fmt::{Debug, Formatter};

use imago_core::bytestream::ByteIoError;

/// BMP errors that can occur during decoding
#[non_exhaustive]
pub enum BmpDecoderErrors {
    /// The file/bytes do not start with `BM`
    InvalidMagicBytes,
    /// The container is understood but a field violates the format
    GenericStatic(&'static str),
    /// Same as [`GenericStatic`](Self::GenericStatic) but with a
    /// formatted reason
    Generic(String),
    /// The image is valid BMP but uses a feature the decoder does not
    /// handle
    Unsupported(&'static str),
    /// Too large dimensions for a given width or height.
    ///
    /// Layout is `(dimension, configured maximum, found)`
    TooLargeDimensions(&'static str, usize, usize),
    /// A size calculation overflowed
    OverFlowOccurred,
    /// The input ended before the decoder was done
    IoErrors(ByteIoError),
}

impl Debug for BmpDecoderErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InvalidMagicBytes => {
                writeln!(f, "Invalid magic bytes, file does not start with BM")
            }
            Self::GenericStatic(reason) => writeln!(f, "{reason}"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::Unsupported(feature) => writeln!(f, "Unsupported BMP feature: {feature}"),
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds limit {expected}"
                )
            }
            Self::OverFlowOccurred => writeln!(f, "Overflow occurred"),
            Self::IoErrors(err) => writeln!(f, "{err:?}"),
        }
    }
}

impl From<ByteIoError> for BmpDecoderErrors {
    fn from(value: ByteIoError) -> Self {
        BmpDecoderErrors::IoErrors(value)
    }
}
