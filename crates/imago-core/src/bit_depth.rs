/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Image bit depth information

/// The bit depth of an image as stored in its container
///
/// The decoders always hand out 8 bit per channel pixels; sub-byte
/// depths are expanded and sixteen bit samples are scaled down, so
/// this mainly exists for callers that want to know what the file
/// itself carried.
#[derive(Copy, Clone, Debug, Eq, PartialEq)]
#[non_exhaustive]
pub enum BitDepth {
    /// Eight bits per channel, the native output depth
    Eight,
    /// Sixteen bits per channel in the container, scaled down to
    /// eight on decode
    Sixteen,
    /// Bit depth information is not known
    Unknown,
}

impl Default for BitDepth {
    fn default() -> Self {
        Self::Unknown
    }
}
