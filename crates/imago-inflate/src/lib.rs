/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A DEFLATE (RFC 1951) inflater
//!
//! This crate decompresses raw DEFLATE streams. Its one unusual
//! property is that the input does not have to be contiguous: the
//! bit reader walks an ordered chain of byte chunks, which lets the
//! PNG decoder feed it IDAT payloads straight out of the container
//! without stitching them into a single allocation first.
//!
//! ```
//! use imago_inflate::DeflateDecoder;
//!
//! // a stored (uncompressed) block holding three bytes
//! let stream = [0x01, 0x03, 0x00, 0xFC, 0xFF, b'a', b'b', b'c'];
//! let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();
//! assert_eq!(decoded, b"abc");
//! ```
pub use crate::bitstream::ChunkedBitReader;
pub use crate::decoder::{DeflateDecoder, DeflateOptions};
pub use crate::errors::InflateDecodeErrors;

mod bitstream;
mod constants;
mod decoder;
mod errors;
mod huffman;
