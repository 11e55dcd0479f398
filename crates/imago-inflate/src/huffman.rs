/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! Canonical Huffman trees built from code length tables
//!
//! A tree is stored as two parallel arrays: `counts[l]` holds the
//! number of symbols whose codeword is `l` bits long and `symbols`
//! holds every coded symbol ordered by ascending code length, ties
//! broken by symbol value. That ordering is exactly the canonical
//! Huffman enumeration, so decoding never needs the codewords
//! themselves.

use crate::bitstream::ChunkedBitReader;
use crate::constants::{FIXED_LITLEN_SYMBOLS, MAX_CODE_LENGTH};
use crate::errors::InflateDecodeErrors;

pub(crate) struct HuffmanTree {
    counts: [u16; MAX_CODE_LENGTH + 1],
    symbols: [u16; FIXED_LITLEN_SYMBOLS],
}

impl HuffmanTree {
    /// Build a tree from one code length per symbol, zero meaning the
    /// symbol is not coded
    ///
    /// Rejects tables with no coded symbol at all and tables that
    /// oversubscribe the code space (the Kraft-McMillan inequality).
    pub fn build(lengths: &[u16]) -> Result<HuffmanTree, InflateDecodeErrors> {
        let mut counts = [0_u16; MAX_CODE_LENGTH + 1];
        let mut symbols = [0_u16; FIXED_LITLEN_SYMBOLS];

        for length in lengths {
            match counts.get_mut(usize::from(*length)) {
                Some(count) => *count += 1,
                None => return Err(InflateDecodeErrors::Corrupt("code length exceeds 15 bits")),
            }
        }

        if usize::from(counts[0]) == lengths.len() {
            return Err(InflateDecodeErrors::Corrupt(
                "all code lengths are zero, tree has no codes",
            ));
        }

        // each l bit codeword claims 2^(15 - l) of the 2^15 codespace;
        // going negative here means the lengths oversubscribe it
        let mut codes_left: i32 = 1;
        for length in 1..=MAX_CODE_LENGTH {
            codes_left <<= 1;
            codes_left -= i32::from(counts[length]);
            if codes_left < 0 {
                return Err(InflateDecodeErrors::Corrupt(
                    "code lengths oversubscribe the code space",
                ));
            }
        }

        // offsets[l] is where symbols of length l start in the sorted
        // symbol table
        let mut offsets = [0_u16; MAX_CODE_LENGTH + 1];
        for length in 1..MAX_CODE_LENGTH {
            offsets[length + 1] = offsets[length] + counts[length];
        }

        for (symbol, length) in lengths.iter().enumerate() {
            if *length != 0 {
                symbols[usize::from(offsets[usize::from(*length)])] = symbol as u16;
                offsets[usize::from(*length)] += 1;
            }
        }

        Ok(HuffmanTree { counts, symbols })
    }

    /// Decode one symbol, pulling bits from `stream` one at a time
    ///
    /// Walks the code lengths in ascending order; at each length the
    /// accumulated code is checked against the range of canonical
    /// codes of that length.
    pub fn decode_symbol(
        &self,
        stream: &mut ChunkedBitReader,
    ) -> Result<u16, InflateDecodeErrors> {
        // numeric value of the codeword read so far
        let mut code: i32 = 0;
        // canonical code value of the first codeword of this length
        let mut first: i32 = 0;
        // symbol table index of the first codeword of this length
        let mut index: i32 = 0;

        for length in 1..=MAX_CODE_LENGTH {
            code |= stream.read_bits(1)? as i32;

            let count = i32::from(self.counts[length]);
            if code - count < first {
                return Ok(self.symbols[(index + (code - first)) as usize]);
            }

            index += count;
            first += count;
            first <<= 1;
            code <<= 1;
        }

        Err(InflateDecodeErrors::Corrupt(
            "codeword longer than 15 bits, no symbol matched",
        ))
    }
}
