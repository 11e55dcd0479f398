/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use log::trace;

use imago_core::bit_depth::BitDepth;
use imago_core::bytestream::ByteReader;
use imago_core::colorspace::ColorSpace;
use imago_core::options::DecoderOptions;
use imago_core::utils::expand_bits_to_byte;
use imago_inflate::{ChunkedBitReader, DeflateDecoder, DeflateOptions};

use crate::enums::{FilterMethod, InterlaceMethod, PngChunkType, PngColor};
use crate::error::PngErrors;
use crate::filters::{
    handle_avg, handle_avg_first, handle_paeth, handle_paeth_first, handle_sub, handle_up,
};

// Adam7 pass origins and spacings, pass order as the spec numbers them
const XORIG: [usize; 7] = [0, 4, 0, 2, 0, 1, 0];
const YORIG: [usize; 7] = [0, 0, 4, 0, 2, 0, 1];
const XSPC: [usize; 7] = [8, 8, 4, 4, 2, 2, 1];
const YSPC: [usize; 7] = [8, 8, 8, 4, 4, 2, 2];

/// One palette entry
///
/// tRNS may carry fewer alpha values than there are palette entries,
/// every entry it does not reach keeps alpha 255.
#[derive(Copy, Clone)]
pub(crate) struct PLTEEntry {
    pub red: u8,
    pub green: u8,
    pub blue: u8,
    pub alpha: u8,
}

impl Default for PLTEEntry {
    fn default() -> Self {
        PLTEEntry {
            red: 0,
            green: 0,
            blue: 0,
            alpha: 255,
        }
    }
}

/// One chunk as the walk sees it: length, resolved type and a view
/// over its payload
#[derive(Copy, Clone)]
pub(crate) struct PngChunk<'a> {
    pub length: usize,
    pub chunk_type: PngChunkType,
    pub type_bytes: [u8; 4],
    pub data: &'a [u8],
}

/// Image facts pulled out of the IHDR chunk
#[derive(Default, Debug, Copy, Clone)]
pub struct PngInfo {
    pub width: usize,
    pub height: usize,
    pub depth: u8,
    pub color: PngColor,
    pub component: u8,
    pub interlace_method: InterlaceMethod,
}

/// A PNG decoder
///
/// Walks the chunk stream, inflates the concatenated IDAT payloads,
/// reverses scanline filtering and post-processes the raster into
/// packed 8 bit per channel pixels, top row first.
///
/// ```no_run
/// use imago_png::PngDecoder;
///
/// let data: &[u8] = &[];
/// let mut decoder = PngDecoder::new(data);
/// let pixels = decoder.decode()?;
/// let (width, height) = decoder.dimensions().unwrap();
/// println!("{width} x {height}: {} bytes", pixels.len());
/// # Ok::<(), imago_png::PngErrors>(())
/// ```
pub struct PngDecoder<'a> {
    pub(crate) stream: ByteReader<'a>,
    pub(crate) options: DecoderOptions,
    pub(crate) png_info: PngInfo,
    pub(crate) palette: Vec<PLTEEntry>,
    pub(crate) idat_stream: ChunkedBitReader<'a>,
    pub(crate) out: Vec<u8>,
    pub(crate) seen_hdr: bool,
    pub(crate) seen_plte: bool,
    pub(crate) seen_trns: bool,
    pub(crate) seen_zlib_header: bool,
    decoded: bool,
}

impl<'a> PngDecoder<'a> {
    /// Create a new decoder reading from `data`
    pub fn new(data: &'a [u8]) -> PngDecoder<'a> {
        PngDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with explicit options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> PngDecoder<'a> {
        PngDecoder {
            stream: ByteReader::new(data),
            options,
            png_info: PngInfo::default(),
            palette: Vec::new(),
            idat_stream: ChunkedBitReader::new(),
            out: Vec::new(),
            seen_hdr: false,
            seen_plte: false,
            seen_trns: false,
            seen_zlib_header: false,
            decoded: false,
        }
    }

    /// Get image dimensions as `(width, height)`, available once
    /// [`decode`](Self::decode) has run
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.seen_hdr
            .then_some((self.png_info.width, self.png_info.height))
    }

    /// Get the colorspace decoded pixels are in, available once
    /// [`decode`](Self::decode) has run
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.seen_hdr {
            return None;
        }
        Some(match self.png_info.color {
            PngColor::Luma => ColorSpace::Luma,
            PngColor::LumaA => ColorSpace::LumaA,
            PngColor::RGB => ColorSpace::RGB,
            PngColor::RGBA => ColorSpace::RGBA,
            PngColor::Palette => {
                if self.seen_trns {
                    ColorSpace::RGBA
                } else {
                    ColorSpace::RGB
                }
            }
            PngColor::Unknown => ColorSpace::Unknown,
        })
    }

    /// Everything the IHDR chunk declared, available once
    /// [`decode`](Self::decode) has run
    pub fn info(&self) -> Option<&PngInfo> {
        self.seen_hdr.then_some(&self.png_info)
    }

    /// The bit depth the container stored
    pub fn depth(&self) -> Option<BitDepth> {
        if !self.seen_hdr {
            return None;
        }
        Some(match self.png_info.depth {
            1 | 2 | 4 | 8 => BitDepth::Eight,
            16 => BitDepth::Sixteen,
            _ => BitDepth::Unknown,
        })
    }

    fn read_chunk(&mut self) -> Result<PngChunk<'a>, PngErrors> {
        let length = self.stream.get_u32_be_err()? as usize;
        let type_bytes = self.stream.read_fixed_bytes_or_error::<4>()?;
        let data = self.stream.get_as_ref(length)?;
        // the CRC is read and discarded, verification is out of scope
        self.stream.get_u32_be_err()?;

        Ok(PngChunk {
            length,
            chunk_type: PngChunkType::from_bytes(type_bytes),
            type_bytes,
            data,
        })
    }

    /// Walk the container up to IEND, collecting IHDR facts, the
    /// palette, alpha entries and every IDAT payload
    fn walk_chunks(&mut self) -> Result<(), PngErrors> {
        // the eight signature bytes were already matched by whoever
        // routed the buffer here
        self.stream.skip(8)?;

        loop {
            let chunk = self.read_chunk()?;

            match chunk.chunk_type {
                PngChunkType::IHDR => self.parse_ihdr(chunk)?,
                PngChunkType::PLTE => self.parse_plte(chunk)?,
                PngChunkType::tRNS => self.parse_trns(chunk)?,
                PngChunkType::IDAT => self.parse_idat(chunk)?,
                PngChunkType::IEND => break,
                PngChunkType::unkn => {
                    trace!(
                        "Skipping chunk {:?}",
                        core::str::from_utf8(&chunk.type_bytes).unwrap_or("????")
                    );
                }
            }
        }

        if !self.seen_hdr {
            return Err(PngErrors::GenericStatic("No IHDR chunk, corrupt PNG"));
        }

        Ok(())
    }

    /// Decode the image, returning packed 8 bit per channel pixels in
    /// top-to-bottom row order
    pub fn decode(&mut self) -> Result<Vec<u8>, PngErrors> {
        if self.decoded {
            return Err(PngErrors::GenericStatic("Decoder already consumed"));
        }
        self.decoded = true;

        self.walk_chunks()?;

        let deflate_data = self.inflate()?;
        let info = self.png_info;

        match info.interlace_method {
            InterlaceMethod::Standard => {
                let width_stride = self.row_bytes(info.width).ok_or(PngErrors::OverFlowOccurred)?;
                self.out = vec![0; width_stride * info.height];
                self.unfilter_into_out(&deflate_data, info.width, info.height)?;

                if info.depth < 8 {
                    self.expand_sub_byte(info.width, info.height);
                }
            }
            InterlaceMethod::Adam7 => self.deinterlace_adam7(&deflate_data)?,
            InterlaceMethod::Unknown => {
                return Err(PngErrors::GenericStatic("Unknown interlace method"));
            }
        }

        if info.depth == 16 {
            self.downscale_sixteen_bit();
        }
        if info.color == PngColor::Palette {
            self.expand_palette()?;
        }

        if self.options.flip_vertically() {
            self.flip_scanlines();
        }

        Ok(std::mem::take(&mut self.out))
    }

    /// Bytes one scanline of `width` pixels occupies, filter byte not
    /// included
    fn row_bytes(&self, width: usize) -> Option<usize> {
        width
            .checked_mul(usize::from(self.png_info.component))?
            .checked_mul(usize::from(self.png_info.depth))?
            .checked_add(7)
            .map(|bits| bits / 8)
    }

    /// Exact size of the filtered stream the IDAT payloads must
    /// inflate to
    fn filtered_stream_size(&self) -> Option<usize> {
        let info = &self.png_info;

        match info.interlace_method {
            InterlaceMethod::Standard => self
                .row_bytes(info.width)?
                .checked_add(1)?
                .checked_mul(info.height),
            InterlaceMethod::Adam7 => {
                let mut total: usize = 0;
                for p in 0..7 {
                    let (x, y) = adam7_pass_size(info.width, info.height, p);
                    if x == 0 || y == 0 {
                        continue;
                    }
                    total = total.checked_add(self.row_bytes(x)?.checked_add(1)?.checked_mul(y)?)?;
                }
                Some(total)
            }
            InterlaceMethod::Unknown => None,
        }
    }

    /// Run the inflater over the collected IDAT chunks
    fn inflate(&mut self) -> Result<Vec<u8>, PngErrors> {
        let size = self
            .filtered_stream_size()
            .ok_or(PngErrors::OverFlowOccurred)?;

        let options = DeflateOptions::default().set_size_hint(size).set_limit(size);
        let stream = std::mem::take(&mut self.idat_stream);

        DeflateDecoder::from_stream(stream, options)
            .decode_deflate()
            .map_err(PngErrors::from)
    }

    /// Reverse scanline filtering of `height` rows of `width` pixels
    /// into `self.out`
    ///
    /// `self.out` must already hold at least one filterless image of
    /// that size; interlaced decoding reuses the buffer per pass.
    fn unfilter_into_out(
        &mut self,
        filtered: &[u8],
        width: usize,
        height: usize,
    ) -> Result<(), PngErrors> {
        let info = self.png_info;

        let width_stride = (width * usize::from(info.component) * usize::from(info.depth) + 7) / 8;
        let chunk_size = width_stride + 1;

        // distance in bytes to the byte one whole pixel to the left
        let components =
            ((usize::from(info.component) * usize::from(info.depth)) / 8).max(1);

        if filtered.len() < chunk_size * height {
            return Err(PngErrors::Generic(format!(
                "Filtered stream too short, expected {} bytes but found {}",
                chunk_size * height,
                filtered.len()
            )));
        }

        let out = &mut self.out[..width_stride * height];

        let mut prev_row_start = 0;
        let mut first_row = true;
        let mut out_position = 0;

        for in_stride in filtered.chunks_exact(chunk_size).take(height) {
            // everything before `out_position` is already
            // reconstructed, the previous row is its tail
            let (prev, current) = out.split_at_mut(out_position);

            let mut prev_row: &[u8] = &[];
            if !first_row {
                prev_row = &prev[prev_row_start..prev_row_start + width_stride];
                prev_row_start += width_stride;
            }
            out_position += width_stride;

            let filter_byte = in_stride[0];
            let raw = &in_stride[1..];
            let current = &mut current[..width_stride];

            let mut filter = FilterMethod::from_int(filter_byte)
                .ok_or_else(|| PngErrors::Generic(format!("Unknown filter type {filter_byte}")))?;

            if first_row {
                // on the first row the row above is all zeroes, which
                // collapses some filters into simpler ones
                filter = match filter {
                    FilterMethod::Paeth => FilterMethod::PaethFirst,
                    FilterMethod::Average => FilterMethod::AvgFirst,
                    FilterMethod::Up => FilterMethod::None,
                    other => other,
                };
                first_row = false;
            }

            match filter {
                FilterMethod::None => current.copy_from_slice(raw),
                FilterMethod::Sub => handle_sub(raw, current, components),
                FilterMethod::Up => handle_up(prev_row, raw, current),
                FilterMethod::Average => handle_avg(prev_row, raw, current, components),
                FilterMethod::Paeth => handle_paeth(prev_row, raw, current, components),
                FilterMethod::PaethFirst => handle_paeth_first(raw, current, components),
                FilterMethod::AvgFirst => handle_avg_first(raw, current, components),
            }
        }

        Ok(())
    }

    /// Expand sub-byte samples so every sample occupies one byte,
    /// scaling grayscale values up to the full range and leaving
    /// palette indices untouched
    fn expand_sub_byte(&mut self, width: usize, height: usize) {
        let info = self.png_info;
        let depth = usize::from(info.depth);

        // only Luma and Palette images have sub-byte depths, both
        // carry a single sample per pixel
        let in_stride = (width * depth + 7) / 8;
        let scale_to_byte = info.color != PngColor::Palette;

        let mut new_out = vec![0; width * height];

        for (in_row, out_row) in self
            .out
            .chunks_exact(in_stride)
            .zip(new_out.chunks_exact_mut(width))
            .take(height)
        {
            expand_bits_to_byte(depth, scale_to_byte, in_row, out_row);
        }

        self.out = new_out;
    }

    /// Scale 16 bit big endian samples down to 8 bits
    fn downscale_sixteen_bit(&mut self) {
        let precise = self.options.precise_sixteen_bit();

        let new_out: Vec<u8> = self
            .out
            .chunks_exact(2)
            .map(|pair| {
                let value = u16::from_be_bytes([pair[0], pair[1]]);
                if precise {
                    ((u32::from(value) * 255 + 32767) / 65535) as u8
                } else {
                    (value >> 8) as u8
                }
            })
            .collect();

        self.out = new_out;
    }

    /// Replace palette indices with their RGB(A) entries
    fn expand_palette(&mut self) -> Result<(), PngErrors> {
        if self.palette.is_empty() {
            return Err(PngErrors::EmptyPalette);
        }

        let info = self.png_info;
        let components = if self.seen_trns { 4 } else { 3 };
        let out_size = info
            .width
            .checked_mul(info.height)
            .and_then(|px| px.checked_mul(components))
            .ok_or(PngErrors::OverFlowOccurred)?;

        // parse_plte padded the palette to 256 entries, no index can
        // land outside it
        let palette: &[PLTEEntry; 256] = self.palette[0..256]
            .try_into()
            .map_err(|_| PngErrors::EmptyPalette)?;

        let data = &self.out;
        let mut out = vec![0; out_size];

        if components == 3 {
            for (px, index) in out.chunks_exact_mut(3).zip(data) {
                let entry = palette[usize::from(*index)];
                px[0] = entry.red;
                px[1] = entry.green;
                px[2] = entry.blue;
            }
        } else {
            for (px, index) in out.chunks_exact_mut(4).zip(data) {
                let entry = palette[usize::from(*index)];
                px[0] = entry.red;
                px[1] = entry.green;
                px[2] = entry.blue;
                px[3] = entry.alpha;
            }
        }

        self.out = out;

        Ok(())
    }

    /// Decode the seven Adam7 passes and scatter their pixels into
    /// final positions
    fn deinterlace_adam7(&mut self, deflate_data: &[u8]) -> Result<(), PngErrors> {
        let info = self.png_info;
        let out_n = usize::from(info.component);

        // bytes one pixel occupies while being reassembled; sub-byte
        // passes are expanded to a byte per sample first
        let sample_bytes = if info.depth == 16 { 2 } else { 1 };
        let out_bytes = out_n * sample_bytes;

        let final_size = info
            .width
            .checked_mul(info.height)
            .and_then(|px| px.checked_mul(out_bytes))
            .ok_or(PngErrors::OverFlowOccurred)?;
        let mut final_out = vec![0_u8; final_size];

        let mut image_offset = 0;

        for p in 0..7 {
            let (x, y) = adam7_pass_size(info.width, info.height, p);
            if x == 0 || y == 0 {
                continue;
            }

            let width_stride = self.row_bytes(x).ok_or(PngErrors::OverFlowOccurred)?;
            let pass_len = (width_stride + 1) * y;

            let pass_slice = deflate_data
                .get(image_offset..image_offset + pass_len)
                .ok_or(PngErrors::GenericStatic("Interlaced stream too short"))?;

            // each pass is an independently filtered sub-image
            self.out = vec![0; width_stride * y];
            self.unfilter_into_out(pass_slice, x, y)?;
            if info.depth < 8 {
                self.expand_sub_byte(x, y);
            }

            for j in 0..y {
                for i in 0..x {
                    let out_y = j * YSPC[p] + YORIG[p];
                    let out_x = i * XSPC[p] + XORIG[p];

                    let final_start = (out_y * info.width + out_x) * out_bytes;
                    let out_start = (j * x + i) * out_bytes;

                    final_out[final_start..final_start + out_bytes]
                        .copy_from_slice(&self.out[out_start..out_start + out_bytes]);
                }
            }

            image_offset += pass_len;
        }

        self.out = final_out;

        Ok(())
    }

    /// Reverse the scanline order of the finished raster in place
    fn flip_scanlines(&mut self) {
        let components = match self.png_info.color {
            PngColor::Palette => {
                if self.seen_trns {
                    4
                } else {
                    3
                }
            }
            other => usize::from(other.num_components()),
        };
        let stride = self.png_info.width * components;
        if stride == 0 {
            return;
        }

        let half = self.out.len() / 2;
        let (top, bottom) = self.out.split_at_mut(half);

        for (upper, lower) in top
            .chunks_exact_mut(stride)
            .zip(bottom.rchunks_exact_mut(stride))
        {
            upper.swap_with_slice(lower);
        }
    }
}

/// Pixel dimensions of Adam7 pass `p` for a `width` x `height` image
fn adam7_pass_size(width: usize, height: usize, p: usize) -> (usize, usize) {
    let x = (width.saturating_sub(XORIG[p]) + XSPC[p] - 1) / XSPC[p];
    let y = (height.saturating_sub(YORIG[p]) + YSPC[p] - 1) / YSPC[p];
    (x, y)
}
