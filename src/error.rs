//! Error types for zlib/DEFLATE decompression.

use std::fmt;

/// Everything that can make a decompression call fail.
///
/// One flat discriminant per failure category, matching the cases in
/// RFC 1950 (zlib) and RFC 1951 (DEFLATE) that a conformant decoder must
/// reject. There are no nested causes: a single decode call has exactly
/// one entry point, so there is nothing to chain.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
#[non_exhaustive]
pub enum Error {
    /// Null/zero-length buffers, or a length that does not fit the host.
    InvalidArgument,
    /// The bit reader or byte cursor ran past the end of the input.
    TruncatedInput,
    /// zlib `CM` was not 8 (DEFLATE), or the header's FCHECK bits are wrong.
    UnsupportedMethod,
    /// The window size implied by `CINFO` exceeds 32768 bytes.
    UnsupportedWindowSize,
    /// `FDICT` was set; preset dictionaries are not supported.
    UnsupportedPresetDictionary,
    /// A block declared `BTYPE == 3` (reserved).
    ReservedBlockType,
    /// A stored block's `LEN` did not match the one's complement of `NLEN`.
    BlockSizeMismatch,
    /// A Huffman code-length set is over-subscribed (exceeds `2^max` at some level).
    OverSubscribed,
    /// A dynamic block's literal/length table has no code for symbol 256.
    MissingEndOfBlock,
    /// Huffman decode produced no match, or a literal/length symbol exceeded 285.
    InvalidSymbol,
    /// A back-reference's distance exceeds the bytes already written.
    BadDistance,
    /// A write would exceed the caller-provided output capacity.
    OutputOverflow,
    /// The trailing Adler-32 did not match the recomputed checksum.
    ChecksumMismatch,
}

impl fmt::Display for Error {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        let msg = match self {
            Error::InvalidArgument => "invalid argument",
            Error::TruncatedInput => "truncated input",
            Error::UnsupportedMethod => "unsupported compression method or bad zlib header check",
            Error::UnsupportedWindowSize => "unsupported window size",
            Error::UnsupportedPresetDictionary => "preset dictionaries are not supported",
            Error::ReservedBlockType => "reserved block type (BTYPE = 3)",
            Error::BlockSizeMismatch => "stored block LEN/NLEN mismatch",
            Error::OverSubscribed => "Huffman code lengths are over-subscribed",
            Error::MissingEndOfBlock => "dynamic Huffman table has no code for end-of-block",
            Error::InvalidSymbol => "invalid Huffman symbol",
            Error::BadDistance => "back-reference distance exceeds bytes written so far",
            Error::OutputOverflow => "output buffer is too small",
            Error::ChecksumMismatch => "Adler-32 checksum mismatch",
        };
        f.write_str(msg)
    }
}

impl std::error::Error for Error {}

pub type Result<T> = core::result::Result<T, Error>;
