/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
#![allow(clippy::upper_case_acronyms, non_camel_case_types)]

/// Chunk types the decoder tells apart, see
/// <https://www.w3.org/TR/2003/REC-PNG-20031110/> table 5.3
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngChunkType {
    IHDR,
    PLTE,
    IDAT,
    IEND,
    tRNS,
    /// Anything else; ancillary chunks land here and get skipped
    unkn,
}

impl PngChunkType {
    pub fn from_bytes(bytes: [u8; 4]) -> PngChunkType {
        match &bytes {
            b"IHDR" => Self::IHDR,
            b"PLTE" => Self::PLTE,
            b"IDAT" => Self::IDAT,
            b"IEND" => Self::IEND,
            b"tRNS" => Self::tRNS,
            _ => Self::unkn,
        }
    }
}

/// Scanline filter types plus the first-row specializations the
/// unfilter loop swaps in when there is no previous scanline
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum FilterMethod {
    None,
    Sub,
    Up,
    Average,
    Paeth,
    // first scanline, the row above is implicitly zero
    PaethFirst,
    AvgFirst,
}

impl FilterMethod {
    pub fn from_int(int: u8) -> Option<FilterMethod> {
        match int {
            0 => Some(FilterMethod::None),
            1 => Some(FilterMethod::Sub),
            2 => Some(FilterMethod::Up),
            3 => Some(FilterMethod::Average),
            4 => Some(FilterMethod::Paeth),
            _ => None,
        }
    }
}

/// Interlacing scheme declared in the IHDR
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
pub enum InterlaceMethod {
    Standard,
    Adam7,
    Unknown,
}

impl Default for InterlaceMethod {
    fn default() -> Self {
        Self::Unknown
    }
}

impl InterlaceMethod {
    pub fn from_int(int: u8) -> Option<InterlaceMethod> {
        match int {
            0 => Some(Self::Standard),
            1 => Some(Self::Adam7),
            _ => None,
        }
    }
}

/// Color type declared in the IHDR
#[derive(Debug, Copy, Clone, Eq, PartialEq)]
pub enum PngColor {
    Luma,
    RGB,
    Palette,
    LumaA,
    RGBA,
    Unknown,
}

impl Default for PngColor {
    fn default() -> Self {
        Self::Unknown
    }
}

impl PngColor {
    /// Samples one pixel carries inside the container
    ///
    /// Paletted pixels are a single index sample; they expand to 3 or
    /// 4 channels only after the palette is applied.
    pub(crate) fn num_components(self) -> u8 {
        match self {
            PngColor::Luma | PngColor::Palette => 1,
            PngColor::LumaA => 2,
            PngColor::RGB => 3,
            PngColor::RGBA => 4,
            PngColor::Unknown => 0,
        }
    }

    pub(crate) fn from_int(int: u8) -> Option<PngColor> {
        match int {
            0 => Some(Self::Luma),
            2 => Some(Self::RGB),
            3 => Some(Self::Palette),
            4 => Some(Self::LumaA),
            6 => Some(Self::RGBA),
            _ => None,
        }
    }

    /// True if `depth` is a bit depth the PNG spec allows for this
    /// color type
    pub(crate) fn supports_depth(self, depth: u8) -> bool {
        match self {
            PngColor::Luma => matches!(depth, 1 | 2 | 4 | 8 | 16),
            PngColor::Palette => matches!(depth, 1 | 2 | 4 | 8),
            PngColor::RGB | PngColor::LumaA | PngColor::RGBA => matches!(depth, 8 | 16),
            PngColor::Unknown => false,
        }
    }
}
