/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::fmt::{Debug, Formatter};

use imago_core::bytestream::ByteIoError;
use imago_inflate::InflateDecodeErrors;

/// PNG errors that can occur during decoding
#[non_exhaustive]
pub enum PngErrors {
    /// The container is understood but a field violates the format
    GenericStatic(&'static str),
    /// Same as [`GenericStatic`](Self::GenericStatic) but with a
    /// formatted reason
    Generic(String),
    /// A paletted image arrived without a PLTE chunk
    EmptyPalette,
    /// Too large dimensions for a given width or height.
    ///
    /// Layout is `(dimension, configured maximum, found)`
    TooLargeDimensions(&'static str, usize, usize),
    /// A size calculation overflowed
    OverFlowOccurred,
    /// The compressed image data would not inflate
    ZlibDecodeErrors(InflateDecodeErrors),
    /// The input ended before the decoder was done
    IoErrors(ByteIoError),
}

impl Debug for PngErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::GenericStatic(reason) => writeln!(f, "{reason}"),
            Self::Generic(reason) => writeln!(f, "{reason}"),
            Self::EmptyPalette => writeln!(f, "Paletted image without a PLTE chunk"),
            Self::TooLargeDimensions(dimension, expected, found) => {
                writeln!(
                    f,
                    "Too large dimensions for {dimension}, {found} exceeds limit {expected}"
                )
            }
            Self::OverFlowOccurred => writeln!(f, "Overflow occurred"),
            Self::ZlibDecodeErrors(err) => writeln!(f, "Inflate error: {err:?}"),
            Self::IoErrors(err) => writeln!(f, "{err:?}"),
        }
    }
}

impl From<InflateDecodeErrors> for PngErrors {
    fn from(value: InflateDecodeErrors) -> Self {
        Self::ZlibDecodeErrors(value)
    }
}

impl From<ByteIoError> for PngErrors {
    fn from(value: ByteIoError) -> Self {
        Self::IoErrors(value)
    }
}
