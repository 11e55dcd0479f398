/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */

// BMP is a format that has grown headers for thirty years. The sizes
// the decoder tells apart:
//
// - 12: BITMAPCOREHEADER, 16 bit unsigned width/height, palette
//   entries are 3 bytes
// - 16/64: OS/2 2.x. Treated like the Windows layout except width and
//   height stay 16 bit and compression method 3 means Huffman 1D
//   (rejected) instead of BITFIELDS
// - 40: BITMAPINFOHEADER, the common case. Signed 32 bit dimensions,
//   a negative height flags top-down row order. BITFIELDS masks,
//   when present, follow the header
// - 52/56: BITMAPV2/V3INFOHEADER, the masks moved inside the header
// - 108/124: BITMAPV4/V5HEADER, adds colorspace and gamma fields the
//   decoder skips wholesale
//
// Everything decodes to packed RGB(A), 8 bits per channel, top row
// first unless the caller asks for a flip.

use log::{trace, warn};

use imago_core::bit_depth::BitDepth;
use imago_core::bytestream::ByteReader;
use imago_core::colorspace::ColorSpace;
use imago_core::options::DecoderOptions;
use imago_core::utils::expand_bits_to_byte;

use crate::common::{BmpCompression, ChannelMask};
use crate::errors::BmpDecoderErrors;
use crate::utils::extract_channel;

/// A BMP decoder
///
/// Call [`decode_headers`](Self::decode_headers) for the metadata
/// alone or [`decode`](Self::decode) to get pixels out.
///
/// ```no_run
/// use imago_bmp::BmpDecoder;
///
/// let data: &[u8] = &[];
/// let mut decoder = BmpDecoder::new(data);
/// decoder.decode_headers()?;
/// let (width, height) = decoder.dimensions().unwrap();
/// println!("{width} x {height}");
/// # Ok::<(), imago_bmp::BmpDecoderErrors>(())
/// ```
pub struct BmpDecoder<'a> {
    bytes: ByteReader<'a>,
    options: DecoderOptions,
    width: usize,
    height: usize,
    // true when rows are stored top to bottom
    flipped: bool,
    depth: u16,
    dib_size: u32,
    pixel_array_offset: u32,
    comp: BmpCompression,
    // raw palette bytes, `bytes_per_color` per entry, padded out to
    // 256 entries so a stray index can never read out of bounds
    palette: Vec<u8>,
    bytes_per_color: usize,
    // r, g, b, a channel masks for the sampled path
    masks: [ChannelMask; 4],
    has_masks: bool,
    channels: usize,
    decoded_headers: bool,
}

impl<'a> BmpDecoder<'a> {
    /// Create a new decoder reading from `data`
    pub fn new(data: &'a [u8]) -> BmpDecoder<'a> {
        BmpDecoder::new_with_options(data, DecoderOptions::default())
    }

    /// Create a new decoder with explicit options
    pub fn new_with_options(data: &'a [u8], options: DecoderOptions) -> BmpDecoder<'a> {
        BmpDecoder {
            bytes: ByteReader::new(data),
            options,
            width: 0,
            height: 0,
            flipped: false,
            depth: 0,
            dib_size: 0,
            pixel_array_offset: 0,
            comp: BmpCompression::Rgb,
            palette: vec![],
            bytes_per_color: 4,
            masks: [ChannelMask::default(); 4],
            has_masks: false,
            channels: 0,
            decoded_headers: false,
        }
    }

    /// Parse the file header, DIB header, channel masks and palette,
    /// leaving the cursor just before the pixel array
    ///
    /// Calling this more than once is a no-op.
    pub fn decode_headers(&mut self) -> Result<(), BmpDecoderErrors> {
        if self.decoded_headers {
            return Ok(());
        }

        if self.bytes.read_u8_err()? != b'B' || self.bytes.read_u8_err()? != b'M' {
            return Err(BmpDecoderErrors::InvalidMagicBytes);
        }
        // file size and the two reserved fields carry nothing we need
        self.bytes.skip(8)?;

        self.pixel_array_offset = self.bytes.get_u32_le_err()?;
        self.dib_size = self.bytes.get_u32_le_err()?;

        if !(12..=124).contains(&self.dib_size) {
            return Err(BmpDecoderErrors::Generic(format!(
                "Invalid DIB header size {}",
                self.dib_size
            )));
        }

        match self.dib_size {
            // core and OS/2 headers keep 16 bit dimensions
            12 | 16 | 64 => {
                self.width = usize::from(self.bytes.get_u16_le_err()?);
                self.height = usize::from(self.bytes.get_u16_le_err()?);
            }
            _ => {
                let width = self.bytes.get_i32_le_err()?;
                let height = self.bytes.get_i32_le_err()?;

                if width < 0 {
                    return Err(BmpDecoderErrors::GenericStatic("Negative image width"));
                }
                self.width = width as usize;
                self.height = height.unsigned_abs() as usize;
                self.flipped = height < 0;
            }
        }

        if self.width == 0 || self.height == 0 {
            return Err(BmpDecoderErrors::GenericStatic(
                "Width or height is zero, invalid image",
            ));
        }
        if self.width > self.options.max_width() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "width",
                self.options.max_width(),
                self.width,
            ));
        }
        if self.height > self.options.max_height() {
            return Err(BmpDecoderErrors::TooLargeDimensions(
                "height",
                self.options.max_height(),
                self.height,
            ));
        }

        trace!("Width: {}", self.width);
        trace!("Height: {}", self.height);

        if self.bytes.get_u16_le_err()? != 1 {
            return Err(BmpDecoderErrors::GenericStatic(
                "Invalid BMP header, color planes must be 1",
            ));
        }

        self.depth = self.bytes.get_u16_le_err()?;
        if !matches!(self.depth, 1 | 2 | 4 | 8 | 16 | 24 | 32) {
            return Err(BmpDecoderErrors::Generic(format!(
                "Depth {} unsupported",
                self.depth
            )));
        }

        // stored palette color count, resolved further down
        let mut colors: u32 = 0;

        if self.dib_size >= 40 {
            let method = self.bytes.get_u32_le_err()?;
            self.comp = match BmpCompression::from_u32(method) {
                Some(c) => c,
                None => {
                    return Err(match method {
                        1 | 2 => BmpDecoderErrors::Unsupported("RLE compressed bitmaps"),
                        4 | 5 => BmpDecoderErrors::Unsupported("embedded JPEG/PNG payloads"),
                        _ => BmpDecoderErrors::GenericStatic("Unknown BMP compression method"),
                    });
                }
            };
            // raw bitmap size plus horizontal and vertical resolution
            self.bytes.skip(12)?;
            colors = self.bytes.get_u32_le_err()?;
            // important colors
            self.bytes.skip(4)?;
        }

        // on the OS/2 2.x headers method 3 is Huffman 1D, not masks
        if self.comp.uses_masks() && (self.dib_size == 16 || self.dib_size == 64) {
            return Err(BmpDecoderErrors::Unsupported("OS/2 Huffman 1D compression"));
        }

        // a stored palette count on a non-indexed image is legacy
        // device compatibility data, an absent one on an indexed image
        // means "all of them"
        if colors != 0 && self.depth > 8 {
            colors = 0;
        }
        if colors == 0 && self.depth <= 8 {
            colors = 1 << self.depth;
        }
        if self.depth <= 8 && colors > (1 << self.depth) {
            let msg = format!(
                "Palette count {} exceeds maximum for depth {}",
                colors, self.depth
            );
            if self.options.strict_mode() {
                return Err(BmpDecoderErrors::Generic(msg));
            }
            warn!("{}", msg);
            colors = 1 << self.depth;
        }

        if self.comp.uses_masks() {
            if self.depth != 16 && self.depth != 32 {
                return Err(BmpDecoderErrors::GenericStatic(
                    "BITFIELDS compression requires 16 or 32 bpp",
                ));
            }

            self.masks[0] = ChannelMask::new(self.bytes.get_u32_le_err()?);
            self.masks[1] = ChannelMask::new(self.bytes.get_u32_le_err()?);
            self.masks[2] = ChannelMask::new(self.bytes.get_u32_le_err()?);

            // V3 and later headers reserve mask space whether or not
            // the alpha channel is actually in use
            if self.comp == BmpCompression::AlphaBitfields || self.dib_size >= 56 {
                self.masks[3] = ChannelMask::new(self.bytes.get_u32_le_err()?);
            }
            self.has_masks = true;
        } else if self.depth == 16 {
            // 16 bpp without masks defaults to the 5-5-5 layout
            self.masks[0] = ChannelMask::new(31 << 10);
            self.masks[1] = ChannelMask::new(31 << 5);
            self.masks[2] = ChannelMask::new(31);
            self.has_masks = true;
        }

        // the OS/2 64 byte header insists rows run left to right,
        // bottom to top unless this field says otherwise
        if self.dib_size == 64 {
            self.bytes.skip(4)?;
            if self.bytes.get_u16_le_err()? != 0 {
                return Err(BmpDecoderErrors::Unsupported(
                    "OS/2 recording orders other than bottom-up",
                ));
            }
        }

        // jump over whatever header fields remain (halftoning,
        // colorspace endpoints, gamma), landing where the palette
        // would start
        let header_end = 14 + self.dib_size as usize;
        let remaining = header_end.saturating_sub(self.bytes.bytes_read());
        self.bytes.skip(remaining)?;

        if self.depth <= 8 {
            // core headers store RGB triples, everything newer BGRX
            self.bytes_per_color = if self.dib_size > 12 { 4 } else { 3 };

            self.palette = vec![0; 256 * self.bytes_per_color];
            let wanted = colors as usize * self.bytes_per_color;
            self.bytes.read_exact_bytes(&mut self.palette[..wanted])?;
        }

        self.channels = self.derive_channels();

        trace!("Depth: {}", self.depth);
        trace!("Compression: {:?}", self.comp);
        trace!("Channels: {}", self.channels);

        // the pixel array offset is measured from the start of the
        // file and may leave a gap after the palette
        let gap = (self.pixel_array_offset as usize)
            .checked_sub(self.bytes.bytes_read())
            .ok_or(BmpDecoderErrors::GenericStatic(
                "Pixel array offset points inside the header",
            ))?;
        self.bytes.skip(gap)?;

        self.decoded_headers = true;

        Ok(())
    }

    fn derive_channels(&self) -> usize {
        if self.depth <= 8 {
            // indexed images expand to plain RGB
            3
        } else if self.has_masks && !self.masks[3].is_empty() {
            4
        } else {
            // raw 32 bpp carries a fourth byte but without an alpha
            // mask it is meaningless and gets discarded
            3
        }
    }

    /// Get image dimensions as `(width, height)`, or `None` if the
    /// headers have not been decoded yet
    pub fn dimensions(&self) -> Option<(usize, usize)> {
        self.decoded_headers.then_some((self.width, self.height))
    }

    /// Get the colorspace pixels will be returned in, or `None` if
    /// the headers have not been decoded yet
    pub fn colorspace(&self) -> Option<ColorSpace> {
        if !self.decoded_headers {
            return None;
        }
        Some(match self.channels {
            4 => ColorSpace::RGBA,
            _ => ColorSpace::RGB,
        })
    }

    /// The bit depth of the decoder output
    ///
    /// Always [`BitDepth::Eight`]; sub-byte images are expanded during
    /// decoding
    pub fn depth(&self) -> BitDepth {
        BitDepth::Eight
    }

    /// Size in bytes of the decoded pixel buffer, or `None` if the
    /// headers have not been decoded or the calculation overflows
    pub fn output_buf_size(&self) -> Option<usize> {
        if !self.decoded_headers {
            return None;
        }
        self.width
            .checked_mul(self.height)?
            .checked_mul(self.channels)
    }

    /// Decode the image, returning packed 8 bit per channel pixels in
    /// top-to-bottom row order
    pub fn decode(&mut self) -> Result<Vec<u8>, BmpDecoderErrors> {
        self.decode_headers()?;

        let output_size = self
            .output_buf_size()
            .ok_or(BmpDecoderErrors::OverFlowOccurred)?;
        let mut buf = vec![0_u8; output_size];

        // stored bottom-up rows already get reversed on output, so a
        // requested flip cancels that reversal and vice versa
        let flipped = self.flipped ^ self.options.flip_vertically();

        if self.depth <= 8 {
            self.decode_indexed(&mut buf, flipped)?;
        } else if self.has_masks {
            self.decode_sampled(&mut buf, flipped)?;
        } else {
            self.decode_raw(&mut buf, flipped)?;
        }

        Ok(buf)
    }

    // Each output row of a stream stored bottom-up (the default) goes
    // to the opposite end of the buffer; top-down rows map straight
    // through.
    fn output_row<'b>(
        &self,
        buf: &'b mut [u8],
        stream_row: usize,
        flipped: bool,
    ) -> &'b mut [u8] {
        let stride = self.width * self.channels;
        let row = if flipped {
            stream_row
        } else {
            self.height - 1 - stream_row
        };
        &mut buf[row * stride..(row + 1) * stride]
    }

    /// Palette images: unpack MSB-first indices, then look every
    /// index up in the palette
    fn decode_indexed(&mut self, buf: &mut [u8], flipped: bool) -> Result<(), BmpDecoderErrors> {
        let depth = usize::from(self.depth);
        let row_padded = ((self.width * depth + 7) / 8 + 3) & !3;
        let bpc = self.bytes_per_color;

        let mut indices = vec![0_u8; self.width];

        for stream_row in 0..self.height {
            let row = self.bytes.get_as_ref(row_padded)?;

            if depth == 8 {
                indices.copy_from_slice(&row[..self.width]);
            } else {
                expand_bits_to_byte(depth, false, row, &mut indices);
            }

            let out_row = self.output_row(buf, stream_row, flipped);
            for (px, index) in out_row.chunks_exact_mut(3).zip(&indices) {
                // palette entries are stored blue first
                let entry = &self.palette[usize::from(*index) * bpc..];
                px[0] = entry[2];
                px[1] = entry[1];
                px[2] = entry[0];
            }
        }
        Ok(())
    }

    /// Masked images: every pixel is a little endian 16 or 32 bit
    /// sample, channels are cut out with the precomputed masks
    fn decode_sampled(&mut self, buf: &mut [u8], flipped: bool) -> Result<(), BmpDecoderErrors> {
        let bytes_per_pixel = usize::from(self.depth / 8);
        let row_padded = (self.width * bytes_per_pixel + 3) & !3;
        let channels = self.channels;
        let [red_mask, green_mask, blue_mask, alpha_mask] = self.masks;

        for stream_row in 0..self.height {
            let mut row = self.bytes.subset(row_padded)?;
            let out_row = self.output_row(buf, stream_row, flipped);

            for px in out_row.chunks_exact_mut(channels) {
                // the subset is fully sized, so the silent readers
                // cannot run short here
                let sample = if bytes_per_pixel == 2 {
                    u32::from(row.get_u16_le())
                } else {
                    row.get_u32_le()
                };

                px[0] = extract_channel(sample, &red_mask);
                px[1] = extract_channel(sample, &green_mask);
                px[2] = extract_channel(sample, &blue_mask);
                if channels == 4 {
                    px[3] = if alpha_mask.is_empty() {
                        255
                    } else {
                        extract_channel(sample, &alpha_mask)
                    };
                }
            }
        }
        Ok(())
    }

    /// Plain pixels, stored as BGR(A); swap blue and red on the way
    /// through
    fn decode_raw(&mut self, buf: &mut [u8], flipped: bool) -> Result<(), BmpDecoderErrors> {
        let bytes_per_pixel = usize::from(self.depth / 8);
        let row_padded = (self.width * bytes_per_pixel + 3) & !3;
        let channels = self.channels;

        for stream_row in 0..self.height {
            let mut row = self.bytes.subset(row_padded)?;
            let out_row = self.output_row(buf, stream_row, flipped);

            for px in out_row.chunks_exact_mut(channels) {
                if bytes_per_pixel == 3 {
                    let [b, g, r] = row.read_fixed_bytes_or_zero::<3>();
                    px[0] = r;
                    px[1] = g;
                    px[2] = b;
                } else {
                    let [b, g, r, a] = row.read_fixed_bytes_or_zero::<4>();
                    px[0] = r;
                    px[1] = g;
                    px[2] = b;
                    if channels == 4 {
                        px[3] = a;
                    }
                }
            }
        }
        Ok(())
    }
}
