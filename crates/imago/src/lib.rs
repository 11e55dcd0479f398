/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! imago: load BMP and PNG images into packed 8 bit pixels
//!
//! The loader reads a file or an in-memory buffer, sniffs the format
//! from the magic bytes and hands back an [`Image`]: a packed, top
//! row first, 8 bit per channel raster with 1 to 4 channels.
//!
//! Two failure styles are on offer. The plain entry points never
//! fail; anything that goes wrong comes back as an empty image, the
//! way stb_image style loaders behave:
//!
//! ```no_run
//! let image = imago::read("texture.png");
//! if image.ok() {
//!     println!("{} x {}", image.width(), image.height());
//! }
//! ```
//!
//! The `try_` variants surface the actual error for diagnostics:
//!
//! ```no_run
//! match imago::try_read("texture.png") {
//!     Ok(image) => println!("{} channels", image.channels()),
//!     Err(err) => eprintln!("loading failed: {err}"),
//! }
//! ```
//!
//! Decoding is configured through [`DecoderOptions`], shared by every
//! format; the vertical flip wanted by GL-style texture uploads lives
//! there:
//!
//! ```no_run
//! use imago::DecoderOptions;
//!
//! let options = DecoderOptions::default().set_flip_vertically(true);
//! let image = imago::read_with_options("texture.bmp", options);
//! ```
use std::path::Path;

use log::error;

pub use imago_core::colorspace::ColorSpace;
pub use imago_core::options::DecoderOptions;

pub use crate::codecs::{guess_format, ImageFormat};
pub use crate::errors::ImagoErrors;
pub use crate::image::Image;

mod codecs;
mod errors;
mod image;

/// Load an image from a file, returning an empty image on any
/// failure
pub fn read<P: AsRef<Path>>(path: P) -> Image {
    read_with_options(path, DecoderOptions::default())
}

/// Load an image from a file with explicit decoder options,
/// returning an empty image on any failure
pub fn read_with_options<P: AsRef<Path>>(path: P, options: DecoderOptions) -> Image {
    match try_read_with_options(path, options) {
        Ok(image) => image,
        Err(err) => {
            error!("Image loading failed: {err:?}");
            Image::empty()
        }
    }
}

/// Load an image from an in-memory buffer, returning an empty image
/// on any failure
pub fn decode(bytes: &[u8]) -> Image {
    decode_with_options(bytes, DecoderOptions::default())
}

/// Load an image from an in-memory buffer with explicit decoder
/// options, returning an empty image on any failure
pub fn decode_with_options(bytes: &[u8], options: DecoderOptions) -> Image {
    match try_decode_with_options(bytes, options) {
        Ok(image) => image,
        Err(err) => {
            error!("Image decoding failed: {err:?}");
            Image::empty()
        }
    }
}

/// Load an image from a file, surfacing the error on failure
pub fn try_read<P: AsRef<Path>>(path: P) -> Result<Image, ImagoErrors> {
    try_read_with_options(path, DecoderOptions::default())
}

/// Load an image from a file with explicit decoder options,
/// surfacing the error on failure
pub fn try_read_with_options<P: AsRef<Path>>(
    path: P,
    options: DecoderOptions,
) -> Result<Image, ImagoErrors> {
    let contents = std::fs::read(path)?;
    try_decode_with_options(&contents, options)
}

/// Load an image from an in-memory buffer, surfacing the error on
/// failure
pub fn try_decode(bytes: &[u8]) -> Result<Image, ImagoErrors> {
    try_decode_with_options(bytes, DecoderOptions::default())
}

/// Load an image from an in-memory buffer with explicit decoder
/// options, surfacing the error on failure
pub fn try_decode_with_options(
    bytes: &[u8],
    options: DecoderOptions,
) -> Result<Image, ImagoErrors> {
    codecs::decode_buffer(bytes, options)
}
