/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::sync::OnceLock;

use crate::bitstream::ChunkedBitReader;
use crate::constants::{
    DISTANCE_BASE, DISTANCE_EXTRA, FIXED_LITLEN_SYMBOLS, LENGTH_BASE, LENGTH_EXTRA,
    MAX_DISTANCE_SYMBOLS, MAX_LITLEN_SYMBOLS, PRECODE_LENS_ORDER, PRECODE_SYMBOLS,
};
use crate::errors::InflateDecodeErrors;
use crate::huffman::HuffmanTree;

/// Options for the inflater
///
/// Configured in builder style
#[derive(Debug, Copy, Clone)]
pub struct DeflateOptions {
    size_hint: usize,
    limit: usize,
}

impl Default for DeflateOptions {
    fn default() -> Self {
        DeflateOptions {
            size_hint: 4096,
            limit: 1 << 30,
        }
    }
}

impl DeflateOptions {
    /// Expected size of the decompressed output, used to reserve the
    /// output allocation up front
    pub fn set_size_hint(mut self, hint: usize) -> Self {
        self.size_hint = hint;
        self
    }

    /// Hard ceiling on the decompressed output size; decoding fails
    /// with [`InflateDecodeErrors::OutputLimitExceeded`] when a stream
    /// tries to grow past it
    pub fn set_limit(mut self, limit: usize) -> Self {
        self.limit = limit;
        self
    }
}

/// A DEFLATE decoder
///
/// Consumes a bit stream and produces the decompressed byte sequence,
/// or an error describing where the stream went wrong. One decoder
/// decodes one stream.
pub struct DeflateDecoder<'src> {
    stream: ChunkedBitReader<'src>,
    options: DeflateOptions,
}

impl<'src> DeflateDecoder<'src> {
    /// Create a decoder over a single contiguous raw DEFLATE stream
    pub fn new(data: &'src [u8]) -> DeflateDecoder<'src> {
        DeflateDecoder::new_with_options(data, DeflateOptions::default())
    }

    /// Create a decoder over a contiguous stream with explicit options
    pub fn new_with_options(data: &'src [u8], options: DeflateOptions) -> DeflateDecoder<'src> {
        DeflateDecoder {
            stream: ChunkedBitReader::from_slice(data),
            options,
        }
    }

    /// Create a decoder over an already assembled chunked bit stream
    ///
    /// This is the constructor the PNG decoder uses after appending
    /// every IDAT payload to one reader.
    pub fn from_stream(
        stream: ChunkedBitReader<'src>,
        options: DeflateOptions,
    ) -> DeflateDecoder<'src> {
        DeflateDecoder { stream, options }
    }

    /// Decompress the whole stream, consuming the decoder
    ///
    /// Runs the RFC 1951 block loop until a block with the final bit
    /// set has been decoded. Input past the final block is left
    /// untouched, which is where a zlib trailer ends up when the
    /// caller stripped the header and fed the rest through.
    pub fn decode_deflate(mut self) -> Result<Vec<u8>, InflateDecodeErrors> {
        let mut out = Vec::with_capacity(self.options.size_hint);

        loop {
            let is_final_block = self.stream.read_bits(1)? == 1;
            let block_type = self.stream.read_bits(2)?;

            match block_type {
                0 => self.stored_block(&mut out)?,
                1 => {
                    let (litlen, distance) = fixed_trees();
                    self.huffman_block(&mut out, litlen, distance)?;
                }
                2 => {
                    let (litlen, distance) = self.dynamic_trees()?;
                    self.huffman_block(&mut out, &litlen, &distance)?;
                }
                _ => return Err(InflateDecodeErrors::Corrupt("reserved block type 3")),
            }

            if is_final_block {
                break;
            }
        }

        Ok(out)
    }

    /// Copy a stored block to the output
    fn stored_block(&mut self, out: &mut Vec<u8>) -> Result<(), InflateDecodeErrors> {
        // align to the byte boundary, keeping an untouched byte
        self.stream.flush_byte(false);

        let len = self.stream.read_bits(16)? as usize;
        let nlen = self.stream.read_bits(16)? as usize;

        if len != (!nlen & 0xFFFF) {
            return Err(InflateDecodeErrors::Corrupt(
                "LEN and NLEN of a stored block are not complements",
            ));
        }
        if out.len() + len > self.options.limit {
            return Err(InflateDecodeErrors::OutputLimitExceeded(
                self.options.limit,
                out.len() + len,
            ));
        }

        self.stream.copy_bytes_to(out, len)
    }

    /// Read the code length declarations of a dynamic block and build
    /// its literal/length and distance trees
    fn dynamic_trees(&mut self) -> Result<(HuffmanTree, HuffmanTree), InflateDecodeErrors> {
        let hlit = self.stream.read_bits(5)? as usize + 257;
        let hdist = self.stream.read_bits(5)? as usize + 1;
        let hclen = self.stream.read_bits(4)? as usize + 4;

        if hlit > MAX_LITLEN_SYMBOLS {
            return Err(InflateDecodeErrors::CorruptStr(format!(
                "HLIT declares {hlit} literal/length codes, the maximum is {MAX_LITLEN_SYMBOLS}"
            )));
        }
        if hdist > MAX_DISTANCE_SYMBOLS {
            return Err(InflateDecodeErrors::CorruptStr(format!(
                "HDIST declares {hdist} distance codes, the maximum is {MAX_DISTANCE_SYMBOLS}"
            )));
        }

        let mut precode_lens = [0_u16; PRECODE_SYMBOLS];
        for position in &PRECODE_LENS_ORDER[..hclen] {
            precode_lens[*position] = self.stream.read_bits(3)? as u16;
        }
        let precode_tree = HuffmanTree::build(&precode_lens)?;

        // one run-length coded table covers both alphabets
        let mut lengths = [0_u16; MAX_LITLEN_SYMBOLS + MAX_DISTANCE_SYMBOLS];
        let total = hlit + hdist;
        let mut index = 0;

        while index < total {
            let symbol = precode_tree.decode_symbol(&mut self.stream)?;

            let (value, count) = match symbol {
                0..=15 => {
                    lengths[index] = symbol;
                    index += 1;
                    continue;
                }
                16 => {
                    if index == 0 {
                        return Err(InflateDecodeErrors::Corrupt(
                            "length repeat with no previous length",
                        ));
                    }
                    (lengths[index - 1], 3 + self.stream.read_bits(2)? as usize)
                }
                17 => (0, 3 + self.stream.read_bits(3)? as usize),
                _ => (0, 11 + self.stream.read_bits(7)? as usize),
            };

            if index + count > total {
                return Err(InflateDecodeErrors::Corrupt(
                    "length repeat runs past the declared code count",
                ));
            }
            lengths[index..index + count].fill(value);
            index += count;
        }

        if lengths[256] == 0 {
            return Err(InflateDecodeErrors::Corrupt(
                "end of block symbol has no code",
            ));
        }

        let litlen = HuffmanTree::build(&lengths[..hlit])?;
        let distance = HuffmanTree::build(&lengths[hlit..total])?;

        Ok((litlen, distance))
    }

    /// Decode literals and matches until the end of block symbol
    fn huffman_block(
        &mut self,
        out: &mut Vec<u8>,
        litlen: &HuffmanTree,
        distance_tree: &HuffmanTree,
    ) -> Result<(), InflateDecodeErrors> {
        loop {
            let symbol = litlen.decode_symbol(&mut self.stream)?;

            if symbol < 256 {
                if out.len() >= self.options.limit {
                    return Err(InflateDecodeErrors::OutputLimitExceeded(
                        self.options.limit,
                        out.len() + 1,
                    ));
                }
                out.push(symbol as u8);
                continue;
            }
            if symbol == 256 {
                return Ok(());
            }

            let length_sym = usize::from(symbol - 257);
            if length_sym >= LENGTH_BASE.len() {
                return Err(InflateDecodeErrors::Corrupt(
                    "length symbol outside the 257..=285 range",
                ));
            }
            let length = usize::from(LENGTH_BASE[length_sym])
                + self.stream.read_bits(u32::from(LENGTH_EXTRA[length_sym]))? as usize;

            let distance_sym = usize::from(distance_tree.decode_symbol(&mut self.stream)?);
            let distance = usize::from(DISTANCE_BASE[distance_sym])
                + self.stream.read_bits(u32::from(DISTANCE_EXTRA[distance_sym]))? as usize;

            // distances may reach across earlier blocks, but never
            // before the start of the stream
            if distance > out.len() {
                return Err(InflateDecodeErrors::Corrupt(
                    "back reference distance exceeds bytes emitted",
                ));
            }
            if out.len() + length > self.options.limit {
                return Err(InflateDecodeErrors::OutputLimitExceeded(
                    self.options.limit,
                    out.len() + length,
                ));
            }

            // byte at a time so a distance smaller than the length
            // re-copies bytes this same match just produced
            for _ in 0..length {
                let byte = out[out.len() - distance];
                out.push(byte);
            }
        }
    }
}

/// The literal/length and distance trees every fixed Huffman block
/// shares, built on first use and immutable afterwards
fn fixed_trees() -> &'static (HuffmanTree, HuffmanTree) {
    static FIXED_TREES: OnceLock<(HuffmanTree, HuffmanTree)> = OnceLock::new();

    FIXED_TREES.get_or_init(|| {
        let mut lengths = [0_u16; FIXED_LITLEN_SYMBOLS];
        lengths[..144].fill(8);
        lengths[144..256].fill(9);
        lengths[256..280].fill(7);
        lengths[280..].fill(8);

        let litlen =
            HuffmanTree::build(&lengths).expect("fixed literal/length code lengths are valid");
        let distance = HuffmanTree::build(&[5_u16; MAX_DISTANCE_SYMBOLS])
            .expect("fixed distance code lengths are valid");

        (litlen, distance)
    })
}
