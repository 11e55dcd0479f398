/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A PNG decoder
//!
//! Decodes the Portable Network Graphics container into packed 8 bit
//! per channel pixels, top row first.
//!
//! # Supported
//! - All five color types at every bit depth the PNG specification
//!   allows; sub-byte samples are expanded and 16 bit samples scaled
//!   down to 8 bits
//! - Palette images, with tRNS alpha applied when present
//! - All five scanline filters
//! - Adam7 interlaced images
//! - IDAT payloads split across any number of chunks
//!
//! # Unsupported
//! - Animated PNG (only the primary image decodes)
//! - Color management: gAMA, cHRM, iCCP and sRGB chunks are skipped,
//!   no gamma correction is applied
//! - CRC and Adler32 checksums are read but never verified
//!
//! The decoder expects its caller to have sniffed the 8 byte
//! signature already; the signature bytes are skipped, not checked.
pub use crate::decoder::{PngDecoder, PngInfo};
pub use crate::enums::{InterlaceMethod, PngColor};
pub use crate::error::PngErrors;

mod decoder;
mod enums;
mod error;
mod filters;
mod headers;
