/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A BMP decoder
//!
//! Decodes the Windows bitmap family into packed 8 bit per channel
//! RGB(A) pixels, top row first.
//!
//! # Supported
//! - Every DIB header size from BITMAPCOREHEADER (12 bytes) through
//!   BITMAPV5HEADER (124 bytes), OS/2 2.x variants included
//! - Paletted images at 1, 2, 4 and 8 bits per pixel
//! - BITFIELDS / ALPHABITFIELDS sampled images at 16 and 32 bits per
//!   pixel with arbitrary channel masks
//! - Plain raw 16, 24 and 32 bit pixels
//! - Bottom-up and top-down row order, plus a caller requested flip
//!
//! # Unsupported
//! - RLE4 / RLE8 / RLE24 compressed images
//! - OS/2 Huffman 1D compressed images
//! - Embedded PNG and JPEG payloads
//!
//! # Usage
//! ```
//! use imago_bmp::BmpDecoder;
//!
//! // a 1x1 24 bpp bitmap holding a single blue pixel
//! let bytes = [
//!     // file header, pixel array at offset 54
//!     0x42, 0x4D, 0x3A, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x36, 0x00, 0x00, 0x00,
//!     // 40 byte BITMAPINFOHEADER, 1x1, one plane, 24 bpp, no compression
//!     0x28, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00, 0x00, 0x00, 0x01, 0x00,
//!     0x18, 0x00, 0x00, 0x00, 0x00, 0x00, 0x04, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00, 0x00,
//!     // one BGR pixel plus row padding
//!     0xFF, 0x00, 0x00, 0x00,
//! ];
//!
//! let pixels = BmpDecoder::new(&bytes).decode().unwrap();
//! assert_eq!(pixels, [0x00, 0x00, 0xFF]);
//! ```
pub use crate::decoder::BmpDecoder;
pub use crate::errors::BmpDecoderErrors;

mod common;
mod decoder;
mod errors;
mod utils;
