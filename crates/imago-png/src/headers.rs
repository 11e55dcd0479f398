/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Parsers for the individual chunks the decoder cares about

use log::trace;

use imago_core::bytestream::ByteReader;

use crate::decoder::{PLTEEntry, PngChunk};
use crate::enums::{InterlaceMethod, PngColor};
use crate::error::PngErrors;
use crate::PngDecoder;

impl<'a> PngDecoder<'a> {
    pub(crate) fn parse_ihdr(&mut self, chunk: PngChunk<'a>) -> Result<(), PngErrors> {
        if self.seen_hdr {
            return Err(PngErrors::GenericStatic("Multiple IHDR, corrupt PNG"));
        }
        if chunk.length != 13 {
            return Err(PngErrors::GenericStatic("Bad IHDR length, corrupt PNG"));
        }

        let mut data = ByteReader::new(chunk.data);

        self.png_info.width = data.get_u32_be_err()? as usize;
        self.png_info.height = data.get_u32_be_err()? as usize;

        if self.png_info.width == 0 || self.png_info.height == 0 {
            return Err(PngErrors::GenericStatic("Width or height cannot be zero"));
        }
        if self.png_info.width > self.options.max_width() {
            return Err(PngErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.png_info.width,
            ));
        }
        if self.png_info.height > self.options.max_height() {
            return Err(PngErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.png_info.height,
            ));
        }

        self.png_info.depth = data.read_u8_err()?;

        let color = data.read_u8_err()?;
        self.png_info.color = PngColor::from_int(color)
            .ok_or_else(|| PngErrors::Generic(format!("Unknown color type {color}")))?;
        self.png_info.component = self.png_info.color.num_components();

        if !self.png_info.color.supports_depth(self.png_info.depth) {
            return Err(PngErrors::Generic(format!(
                "Bit depth {} is not allowed for color type {:?}",
                self.png_info.depth, self.png_info.color
            )));
        }

        if data.read_u8_err()? != 0 {
            return Err(PngErrors::GenericStatic("Unknown compression method"));
        }
        if data.read_u8_err()? != 0 {
            return Err(PngErrors::GenericStatic("Unknown filter method"));
        }

        let interlace = data.read_u8_err()?;
        self.png_info.interlace_method = InterlaceMethod::from_int(interlace)
            .ok_or_else(|| PngErrors::Generic(format!("Unknown interlace method {interlace}")))?;

        trace!("Width: {}", self.png_info.width);
        trace!("Height: {}", self.png_info.height);
        trace!("Depth: {}", self.png_info.depth);
        trace!("Color type: {:?}", self.png_info.color);
        trace!("Interlace: {:?}", self.png_info.interlace_method);

        self.seen_hdr = true;

        Ok(())
    }

    pub(crate) fn parse_plte(&mut self, chunk: PngChunk<'a>) -> Result<(), PngErrors> {
        if !self.seen_hdr {
            return Err(PngErrors::GenericStatic("PLTE before IHDR, corrupt PNG"));
        }
        if chunk.length % 3 != 0 {
            return Err(PngErrors::GenericStatic("Invalid PLTE length, corrupt PNG"));
        }
        let entries = chunk.length / 3;
        if entries > 256 {
            return Err(PngErrors::GenericStatic("PLTE with more than 256 entries"));
        }

        // stray indices index into the padding, whose entries stay
        // black and opaque
        self.palette.resize(256, PLTEEntry::default());

        for (entry, rgb) in self.palette.iter_mut().zip(chunk.data.chunks_exact(3)) {
            entry.red = rgb[0];
            entry.green = rgb[1];
            entry.blue = rgb[2];
        }

        self.seen_plte = true;

        Ok(())
    }

    pub(crate) fn parse_trns(&mut self, chunk: PngChunk<'a>) -> Result<(), PngErrors> {
        match self.png_info.color {
            PngColor::Luma => {
                // gray sample transparency keys are not applied
                trace!("Ignoring tRNS gray sample");
            }
            PngColor::RGB => {
                trace!("Ignoring tRNS rgb sample");
            }
            PngColor::Palette => {
                if !self.seen_plte {
                    return Err(PngErrors::GenericStatic("tRNS chunk before PLTE"));
                }
                if chunk.length > 256 {
                    return Err(PngErrors::GenericStatic("tRNS chunk with too many entries"));
                }
                for (entry, alpha) in self.palette.iter_mut().zip(chunk.data) {
                    entry.alpha = *alpha;
                }
                self.seen_trns = true;
            }
            _ => {
                let msg = format!(
                    "A tRNS chunk shall not appear for colour type {:?} as it already carries alpha",
                    self.png_info.color
                );
                return Err(PngErrors::Generic(msg));
            }
        }

        Ok(())
    }

    pub(crate) fn parse_idat(&mut self, chunk: PngChunk<'a>) -> Result<(), PngErrors> {
        if !self.seen_hdr {
            return Err(PngErrors::GenericStatic("IDAT before IHDR, corrupt PNG"));
        }

        let mut data = chunk.data;

        // the first IDAT opens with the two byte zlib header; the
        // DEFLATE payload follows and continues across every later
        // IDAT
        if !self.seen_zlib_header {
            if data.is_empty() {
                return Ok(());
            }
            if data.len() < 2 {
                return Err(PngErrors::GenericStatic(
                    "First IDAT too short for the zlib header",
                ));
            }

            let cmf = data[0];
            let flg = data[1];

            if cmf & 0xF != 8 {
                return Err(PngErrors::GenericStatic(
                    "Compression method for PNG has to be DEFLATE (8)",
                ));
            }
            if cmf >> 4 > 7 {
                return Err(PngErrors::GenericStatic(
                    "zlib window size cannot exceed 32 KiB",
                ));
            }
            if (flg >> 5) & 1 != 0 {
                return Err(PngErrors::GenericStatic(
                    "PNG cannot be compressed with preset dictionaries",
                ));
            }
            if (u16::from(cmf) * 256 + u16::from(flg)) % 31 != 0 {
                return Err(PngErrors::GenericStatic("FCHECK integrity not preserved"));
            }

            data = &data[2..];
            self.seen_zlib_header = true;
        }

        self.idat_stream.append_chunk(data);

        Ok(())
    }
}
