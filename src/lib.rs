//! zlib/DEFLATE decompression.
//!
//! Given a zlib-wrapped DEFLATE stream (RFC 1950 container around an RFC
//! 1951 bitstream), produces the decompressed bytes and verifies the
//! trailing Adler-32 checksum. Compression, gzip containers, and streaming
//! (incremental) decoding are out of scope; [`decompress`] and
//! [`decompress_to_vec`] each take a complete buffer and return a complete
//! result.

pub mod adler32;
pub mod bitstream;
pub mod error;
pub mod huffman;
pub mod inflate;
pub mod zlib_format;

pub use error::Error;
pub use zlib_format::{decompress, decompress_to_vec};
