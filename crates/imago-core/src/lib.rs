/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Core routines shared by the imago decoders
//!
//! This crate provides the small set of building blocks every decoder
//! in the imago family leans on
//!
//! - A bounds checked byte reader with endian aware reads and
//!   borrowed sub-views
//! - Colorspace and bit depth information shared by images
//! - Decoder options
//! - Bit expansion utilities for sub-byte sample depths

pub mod bit_depth;
pub mod bytestream;
pub mod colorspace;
pub mod options;
pub mod utils;
