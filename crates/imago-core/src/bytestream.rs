/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
//! A sequential, bounds checked reader over a borrowed byte region
//!
//! Every decoder in the workspace consumes its input through
//! [`ByteReader`]; the reader never reads past the end of the region it
//! was created over and reports truncation through [`ByteIoError`].

use core::fmt::{Debug, Formatter};

/// Errors that can occur when pulling bytes out of a [`ByteReader`]
#[derive(Copy, Clone, Eq, PartialEq)]
pub enum ByteIoError {
    /// Not enough bytes to satisfy a read.
    ///
    /// Layout is `(found, expected)`
    NotEnoughBytes(usize, usize),
    /// A rewind went past the start of the stream
    RewindTooFar(usize, usize),
    /// Anything else
    Generic(&'static str),
}

impl Debug for ByteIoError {
    fn fmt(&self, f: &mut Formatter<'_>) -> core::fmt::Result {
        match self {
            Self::NotEnoughBytes(found, expected) => {
                writeln!(f, "Not enough bytes, expected {expected} but found {found}")
            }
            Self::RewindTooFar(requested, position) => {
                writeln!(
                    f,
                    "Cannot rewind {requested} bytes, only {position} bytes were read"
                )
            }
            Self::Generic(reason) => writeln!(f, "{reason}"),
        }
    }
}

/// A cursor over an immutable borrowed byte region
///
/// The reader keeps track of how many bytes were consumed and refuses
/// any read that would go past the end of the region. Sub-views over
/// the next `n` bytes can be split off with [`subset`](Self::subset)
/// or [`get_as_ref`](Self::get_as_ref); the views borrow from the same
/// region and live at most as long as it.
pub struct ByteReader<'a> {
    stream: &'a [u8],
    position: usize,
}

enum Mode {
    // Big endian
    Be,
    // Little endian
    Le,
}

impl<'a> ByteReader<'a> {
    /// Create a new reader over `buf` with the cursor at the start
    pub const fn new(buf: &'a [u8]) -> ByteReader<'a> {
        ByteReader {
            stream: buf,
            position: 0,
        }
    }

    /// Number of bytes consumed so far
    pub const fn bytes_read(&self) -> usize {
        self.position
    }

    /// Number of bytes that can still be read
    pub const fn bytes_left(&self) -> usize {
        self.stream.len().saturating_sub(self.position)
    }

    /// Total length of the underlying region
    pub const fn len(&self) -> usize {
        self.stream.len()
    }

    /// True if no bytes remain
    pub const fn is_empty(&self) -> bool {
        self.bytes_left() == 0
    }

    /// True if at least `num` bytes remain
    pub const fn has(&self, num: usize) -> bool {
        self.bytes_left() >= num
    }

    /// Read a single byte, returning `0` once the stream is exhausted
    ///
    /// Use [`read_u8_err`](Self::read_u8_err) where a `0` byte and an
    /// exhausted stream must be told apart.
    #[inline(always)]
    pub fn read_u8(&mut self) -> u8 {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                *byte
            }
            None => 0,
        }
    }

    /// Read a single byte or error out if the stream is exhausted
    #[inline(always)]
    pub fn read_u8_err(&mut self) -> Result<u8, ByteIoError> {
        match self.stream.get(self.position) {
            Some(byte) => {
                self.position += 1;
                Ok(*byte)
            }
            None => Err(ByteIoError::NotEnoughBytes(0, 1)),
        }
    }

    /// Skip `num` bytes, erroring out if fewer remain
    #[inline]
    pub fn skip(&mut self, num: usize) -> Result<(), ByteIoError> {
        if !self.has(num) {
            return Err(ByteIoError::NotEnoughBytes(self.bytes_left(), num));
        }
        self.position += num;
        Ok(())
    }

    /// Move the cursor back `num` bytes
    #[inline]
    pub fn rewind(&mut self, num: usize) -> Result<(), ByteIoError> {
        if num > self.position {
            return Err(ByteIoError::RewindTooFar(num, self.position));
        }
        self.position -= num;
        Ok(())
    }

    /// Fill `buf` exactly or error out without advancing
    pub fn read_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        match self.stream.get(self.position..self.position + buf.len()) {
            Some(bytes) => {
                buf.copy_from_slice(bytes);
                self.position += buf.len();
                Ok(())
            }
            None => Err(ByteIoError::NotEnoughBytes(self.bytes_left(), buf.len())),
        }
    }

    /// Fill `buf` exactly without advancing the cursor
    pub fn peek_exact_bytes(&mut self, buf: &mut [u8]) -> Result<(), ByteIoError> {
        self.read_exact_bytes(buf)?;
        self.position -= buf.len();
        Ok(())
    }

    /// Read `N` bytes into a fixed array or error out
    #[inline(always)]
    pub fn read_fixed_bytes_or_error<const N: usize>(&mut self) -> Result<[u8; N], ByteIoError> {
        let mut byte_store = [0; N];
        self.read_exact_bytes(&mut byte_store)?;
        Ok(byte_store)
    }

    /// Read `N` bytes into a fixed array, returning zeroes on a short read
    #[inline(always)]
    pub fn read_fixed_bytes_or_zero<const N: usize>(&mut self) -> [u8; N] {
        let mut byte_store = [0; N];
        if let Some(bytes) = self.stream.get(self.position..self.position + N) {
            byte_store.copy_from_slice(bytes);
            self.position += N;
        }
        byte_store
    }

    /// Borrow the next `num` bytes as a plain slice and advance past them
    pub fn get_as_ref(&mut self, num: usize) -> Result<&'a [u8], ByteIoError> {
        match self.stream.get(self.position..self.position + num) {
            Some(bytes) => {
                self.position += num;
                Ok(bytes)
            }
            None => Err(ByteIoError::NotEnoughBytes(self.bytes_left(), num)),
        }
    }

    /// Split off an independent reader over the next `num` bytes
    ///
    /// The child starts at position zero over its own region, this
    /// reader advances past the `num` bytes. Both views share the same
    /// underlying storage.
    pub fn subset(&mut self, num: usize) -> Result<ByteReader<'a>, ByteIoError> {
        self.get_as_ref(num).map(ByteReader::new)
    }

}

macro_rules! get_single_type {
    ($name:tt,$name2:tt,$name3:tt,$name4:tt,$name5:tt,$name6:tt,$int_type:tt) => {
        impl<'a> ByteReader<'a> {
            #[inline(always)]
            fn $name(&mut self, mode: Mode) -> $int_type {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let bytes = self.read_fixed_bytes_or_zero::<SIZE_OF_VAL>();

                match mode {
                    Mode::Be => $int_type::from_be_bytes(bytes),
                    Mode::Le => $int_type::from_le_bytes(bytes),
                }
            }

            #[inline(always)]
            fn $name2(&mut self, mode: Mode) -> Result<$int_type, ByteIoError> {
                const SIZE_OF_VAL: usize = core::mem::size_of::<$int_type>();

                let bytes = self.read_fixed_bytes_or_error::<SIZE_OF_VAL>()?;

                match mode {
                    Mode::Be => Ok($int_type::from_be_bytes(bytes)),
                    Mode::Le => Ok($int_type::from_le_bytes(bytes)),
                }
            }

            #[doc = concat!("Read ", stringify!($int_type), " as a big endian integer")]
            #[doc = "returning 0 if there are not enough bytes left"]
            #[inline(always)]
            pub fn $name3(&mut self) -> $int_type {
                self.$name(Mode::Be)
            }

            #[doc = concat!("Read ", stringify!($int_type), " as a little endian integer")]
            #[doc = "returning 0 if there are not enough bytes left"]
            #[inline(always)]
            pub fn $name4(&mut self) -> $int_type {
                self.$name(Mode::Le)
            }

            #[doc = concat!("Read ", stringify!($int_type), " as a big endian integer")]
            #[doc = "erroring out if there are not enough bytes left"]
            #[inline]
            pub fn $name5(&mut self) -> Result<$int_type, ByteIoError> {
                self.$name2(Mode::Be)
            }

            #[doc = concat!("Read ", stringify!($int_type), " as a little endian integer")]
            #[doc = "erroring out if there are not enough bytes left"]
            #[inline]
            pub fn $name6(&mut self) -> Result<$int_type, ByteIoError> {
                self.$name2(Mode::Le)
            }
        }
    };
}

get_single_type!(
    get_u16_inner_or_default,
    get_u16_inner_or_die,
    get_u16_be,
    get_u16_le,
    get_u16_be_err,
    get_u16_le_err,
    u16
);
get_single_type!(
    get_u32_inner_or_default,
    get_u32_inner_or_die,
    get_u32_be,
    get_u32_le,
    get_u32_be_err,
    get_u32_le_err,
    u32
);

impl<'a> ByteReader<'a> {
    /// Read a signed 32 bit little endian integer, erroring out if
    /// there are not enough bytes left
    #[inline]
    pub fn get_i32_le_err(&mut self) -> Result<i32, ByteIoError> {
        self.get_u32_le_err().map(|v| v as i32)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn endian_aware_reads() {
        let data = [0x01, 0x02, 0x03, 0x04, 0xFF, 0xFF, 0xFF, 0xFF];
        let mut reader = ByteReader::new(&data);

        assert_eq!(reader.len(), 8);
        assert!(reader.has(8));
        assert!(!reader.has(9));

        assert_eq!(reader.get_u16_le_err().unwrap(), 0x0201);
        reader.rewind(2).unwrap();
        assert_eq!(reader.get_u16_be_err().unwrap(), 0x0102);
        reader.rewind(2).unwrap();
        assert_eq!(reader.get_u32_be(), 0x0102_0304);

        assert_eq!(reader.get_i32_le_err().unwrap(), -1);
        assert!(reader.is_empty());
        assert_eq!(reader.bytes_left(), 0);
        // silent reads degrade to zero at the end
        assert_eq!(reader.get_u16_be(), 0);
        assert_eq!(reader.get_u16_le(), 0);
        assert_eq!(reader.get_u32_le(), 0);
    }

    #[test]
    fn short_reads_do_not_advance() {
        let data = [1, 2, 3];
        let mut reader = ByteReader::new(&data);

        reader.skip(2).unwrap();
        assert!(reader.get_u32_le_err().is_err());
        assert_eq!(reader.bytes_read(), 2);
        assert_eq!(reader.read_u8_err().unwrap(), 3);
        assert!(reader.read_u8_err().is_err());
        // the silent variant degrades to zero
        assert_eq!(reader.read_u8(), 0);
    }

    #[test]
    fn subset_advances_parent() {
        let data = [9, 8, 7, 6, 5];
        let mut parent = ByteReader::new(&data);
        parent.skip(1).unwrap();

        let mut child = parent.subset(3).unwrap();
        assert_eq!(parent.bytes_read(), 4);
        assert_eq!(child.read_u8_err().unwrap(), 8);
        assert_eq!(child.bytes_left(), 2);
        assert!(child.skip(3).is_err());

        assert_eq!(parent.read_u8_err().unwrap(), 5);
    }

    #[test]
    fn peek_keeps_position() {
        let data = [4, 5, 6];
        let mut reader = ByteReader::new(&data);
        let mut buf = [0; 2];

        reader.peek_exact_bytes(&mut buf).unwrap();
        assert_eq!(buf, [4, 5]);
        assert_eq!(reader.bytes_read(), 0);
        assert!(reader.rewind(1).is_err());
    }
}
