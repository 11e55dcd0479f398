/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image colorspace information

/// All colorspaces the decoders can emit
///
/// Pixels are always packed, 8 bits per channel, with the channel
/// order the variant name spells out.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum ColorSpace {
    /// Grayscale, one channel
    Luma,
    /// Grayscale plus alpha, two channels
    LumaA,
    /// Red, green, blue
    RGB,
    /// Red, green, blue plus alpha
    RGBA,
    /// The colorspace could not be determined
    Unknown,
}

impl ColorSpace {
    /// Number of channels a single pixel occupies
    pub const fn num_components(&self) -> usize {
        match self {
            Self::Luma => 1,
            Self::LumaA => 2,
            Self::RGB => 3,
            Self::RGBA => 4,
            Self::Unknown => 0,
        }
    }

    /// True if the colorspace carries an alpha channel
    pub const fn has_alpha(&self) -> bool {
        matches!(self, Self::RGBA | Self::LumaA)
    }

    /// True if the colorspace is single luminance based
    pub const fn is_grayscale(&self) -> bool {
        matches!(self, Self::Luma | Self::LumaA)
    }
}
