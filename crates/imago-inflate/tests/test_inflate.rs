/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::io::Write;

use imago_inflate::{ChunkedBitReader, DeflateDecoder, DeflateOptions};

/// Build a stored (BTYPE=00) block payload, optionally final
fn stored_block(data: &[u8], is_final: bool) -> Vec<u8> {
    let len = data.len() as u16;
    let mut out = vec![u8::from(is_final)];
    out.extend_from_slice(&len.to_le_bytes());
    out.extend_from_slice(&(!len).to_le_bytes());
    out.extend_from_slice(data);
    out
}

fn reference_deflate(data: &[u8]) -> Vec<u8> {
    let mut encoder =
        flate2::write::DeflateEncoder::new(Vec::new(), flate2::Compression::best());
    encoder.write_all(data).unwrap();
    encoder.finish().unwrap()
}

#[test]
fn stored_block_roundtrip() {
    let stream = stored_block(b"hello stored world", true);
    let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();

    assert_eq!(decoded, b"hello stored world");
}

#[test]
fn stored_block_empty() {
    let stream = stored_block(b"", true);
    let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();

    assert!(decoded.is_empty());
}

#[test]
fn stored_block_bad_nlen() {
    // LEN says 3, NLEN says "no it doesn't"
    let stream = [0x01, 0x03, 0x00, 0x00, 0x00, b'a', b'b', b'c'];

    assert!(DeflateDecoder::new(&stream).decode_deflate().is_err());
}

#[test]
fn reserved_block_type_is_rejected() {
    // BFINAL=1, BTYPE=11
    let stream = [0b0000_0111];

    assert!(DeflateDecoder::new(&stream).decode_deflate().is_err());
}

#[test]
fn truncated_stream_is_rejected() {
    let mut stream = stored_block(b"0123456789", true);
    stream.truncate(stream.len() - 4);

    assert!(DeflateDecoder::new(&stream).decode_deflate().is_err());
}

#[test]
fn fixed_block_with_overlapping_back_reference() {
    // one literal 'A' then a (length=4, distance=1) match, so the
    // match keeps copying the byte it just produced
    let stream = [0x73, 0x04, 0x01, 0x00];
    let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();

    assert_eq!(decoded, b"AAAAA");
}

#[test]
fn back_reference_may_span_blocks() {
    // block one (not final, fixed): literal 'A'
    // block two (final, fixed): (length=4, distance=1) reaching into
    // the output of block one
    let stream = [0x72, 0x04, 0x0C, 0x04, 0x00];
    let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();

    assert_eq!(decoded, b"AAAAA");
}

#[test]
fn back_reference_before_stream_start_is_rejected() {
    // fixed block opening directly with a (length=3, distance=1)
    // match when nothing has been emitted yet
    let stream = [0x03, 0x02];

    assert!(DeflateDecoder::new(&stream).decode_deflate().is_err());
}

#[test]
fn stored_block_across_chunk_boundary() {
    // the block header lives in one chunk, half the payload in the next
    let stream = stored_block(b"split right down the middle", true);
    let (front, back) = stream.split_at(9);

    let mut bits = ChunkedBitReader::new();
    bits.append_chunk(front);
    bits.append_chunk(back);

    let decoded = DeflateDecoder::from_stream(bits, DeflateOptions::default())
        .decode_deflate()
        .unwrap();

    assert_eq!(decoded, b"split right down the middle");
}

#[test]
fn multiple_stored_blocks_concatenate() {
    let mut stream = stored_block(b"first ", false);
    stream.extend_from_slice(&stored_block(b"second", true));

    let decoded = DeflateDecoder::new(&stream).decode_deflate().unwrap();
    assert_eq!(decoded, b"first second");
}

#[test]
fn reference_roundtrip_compressible() {
    // long repetitive text compresses with dynamic Huffman blocks
    let source: Vec<u8> = b"the quick brown fox jumps over the lazy dog. "
        .iter()
        .copied()
        .cycle()
        .take(16 * 1024)
        .collect();

    let compressed = reference_deflate(&source);
    let decoded = DeflateDecoder::new(&compressed).decode_deflate().unwrap();

    assert_eq!(decoded, source);
}

#[test]
fn reference_roundtrip_noisy() {
    // a cheap xorshift keeps the data hard to compress without
    // needing an rng dependency
    let mut state = 0x2545_F491_4F6C_DD1D_u64;
    let source: Vec<u8> = (0..8 * 1024)
        .map(|_| {
            state ^= state << 13;
            state ^= state >> 7;
            state ^= state << 17;
            state as u8
        })
        .collect();

    let compressed = reference_deflate(&source);
    let decoded = DeflateDecoder::new(&compressed).decode_deflate().unwrap();

    assert_eq!(decoded, source);
}

#[test]
fn reference_roundtrip_split_into_chunks() {
    let source: Vec<u8> = b"chunked input, contiguous output. "
        .iter()
        .copied()
        .cycle()
        .take(4096)
        .collect();
    let compressed = reference_deflate(&source);

    // feed the compressed stream in awkward little pieces
    let mut bits = ChunkedBitReader::new();
    for piece in compressed.chunks(7) {
        bits.append_chunk(piece);
    }

    let decoded = DeflateDecoder::from_stream(bits, DeflateOptions::default())
        .decode_deflate()
        .unwrap();

    assert_eq!(decoded, source);
}

#[test]
fn output_limit_is_enforced() {
    let stream = stored_block(&[0_u8; 512], true);
    let options = DeflateOptions::default().set_limit(100);

    let result = DeflateDecoder::new_with_options(&stream, options).decode_deflate();
    assert!(result.is_err());
}
