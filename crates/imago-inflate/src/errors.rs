/*
 * Copyright (c) 2023.
 *
 * This software is free software;
 *
 * You can redistribute it or modify it under terms of the MIT, Apache License or Zlib license
 */
use std::fmt::{Debug, Formatter};

/// Errors that can occur during inflation
#[non_exhaustive]
pub enum InflateDecodeErrors {
    /// The input ran out before the stream was complete
    InsufficientData,
    /// The stream violates RFC 1951 in some way
    Corrupt(&'static str),
    /// Same as [`Corrupt`](Self::Corrupt) but with a formatted reason
    CorruptStr(String),
    /// The decompressed output grew past the limit the caller set.
    ///
    /// Layout is `(limit, current)`
    OutputLimitExceeded(usize, usize),
}

impl Debug for InflateDecodeErrors {
    fn fmt(&self, f: &mut Formatter<'_>) -> std::fmt::Result {
        match self {
            Self::InsufficientData => writeln!(f, "Insufficient data"),
            Self::Corrupt(reason) => writeln!(f, "Corrupt deflate stream: {reason}"),
            Self::CorruptStr(reason) => writeln!(f, "Corrupt deflate stream: {reason}"),
            Self::OutputLimitExceeded(limit, current) => writeln!(
                f,
                "Output limit exceeded, set limit was {limit} and output size is {current}"
            ),
        }
    }
}
