//! zlib container format (RFC 1950): header, DEFLATE stream, Adler-32 trailer.

use crate::error::{Error, Result};
use crate::inflate::Inflater;

/// Compression method required by RFC 1950: 8 means DEFLATE.
const CM_DEFLATE: u8 = 8;

/// Parsed zlib header (CMF/FLG byte pair plus an optional DICTID).
#[derive(Clone, Copy, Debug)]
pub struct ZlibHeader {
    /// Compression method; always 8 (DEFLATE) for a header that parses.
    pub cm: u8,
    /// `log2(window size) - 8`, 0..=7.
    pub cinfo: u8,
    /// Preset-dictionary flag. This crate rejects headers with it set.
    pub fdict: bool,
    /// Compression level hint the encoder recorded; not used for decoding.
    pub flevel: u8,
}

impl ZlibHeader {
    /// Parse the 2-byte CMF/FLG header. A set `FDICT` bit is reported in
    /// the returned header rather than rejected here, since whether to
    /// reject it is the caller's call (the top-level `decompress` entry
    /// point does reject it).
    pub fn decode(data: &[u8]) -> Result<(Self, usize)> {
        if data.len() < 2 {
            return Err(Error::TruncatedInput);
        }

        let cmf = data[0];
        let flg = data[1];

        let cm = cmf & 0x0F;
        let cinfo = (cmf >> 4) & 0x0F;

        if cm != CM_DEFLATE {
            return Err(Error::UnsupportedMethod);
        }
        if cinfo > 7 {
            return Err(Error::UnsupportedWindowSize);
        }
        if ((cmf as u16) * 256 + (flg as u16)) % 31 != 0 {
            return Err(Error::UnsupportedMethod);
        }

        let fdict = (flg & 0x20) != 0;
        let flevel = (flg >> 6) & 0x03;

        Ok((
            Self {
                cm,
                cinfo,
                fdict,
                flevel,
            },
            2,
        ))
    }
}

/// Decompress a complete zlib-wrapped DEFLATE stream into `output`.
///
/// `output` must be at least as large as the decompressed payload; the
/// returned value is the number of bytes actually written. Verifies the
/// trailing Adler-32 before returning success.
pub fn decompress(compressed: &[u8], output: &mut [u8]) -> Result<usize> {
    if compressed.len() < 2 {
        return Err(Error::InvalidArgument);
    }

    let (header, header_len) = ZlibHeader::decode(compressed)?;
    if header.fdict {
        return Err(Error::UnsupportedPresetDictionary);
    }

    let mut inflater = Inflater::new(header.cinfo as u32 + 8);
    let mut decoded = Vec::new();
    let consumed = inflater.decompress(&compressed[header_len..], &mut decoded, output.len())?;

    output[..decoded.len()].copy_from_slice(&decoded);

    let trailer_pos = header_len + consumed;
    if trailer_pos + 4 > compressed.len() {
        return Err(Error::TruncatedInput);
    }
    let stored_adler = u32::from_be_bytes([
        compressed[trailer_pos],
        compressed[trailer_pos + 1],
        compressed[trailer_pos + 2],
        compressed[trailer_pos + 3],
    ]);

    if stored_adler != inflater.checksum() {
        log::debug!(
            "adler32 mismatch: stored {:#010x}, computed {:#010x}",
            stored_adler,
            inflater.checksum()
        );
        return Err(Error::ChecksumMismatch);
    }

    log::trace!("decompressed {} bytes from {} input bytes", decoded.len(), trailer_pos + 4);
    Ok(decoded.len())
}

/// Convenience wrapper over [`decompress`] that allocates its own output
/// buffer, for callers that don't know the decompressed size up front.
///
/// Tries increasingly larger buffers rather than trusting a size hint from
/// untrusted input, since a compressed stream's true output size cannot be
/// derived without decoding it.
pub fn decompress_to_vec(compressed: &[u8]) -> Result<Vec<u8>> {
    let mut capacity = compressed.len().saturating_mul(4).max(4096);
    loop {
        let mut buf = vec![0u8; capacity];
        match decompress(compressed, &mut buf) {
            Ok(len) => {
                buf.truncate(len);
                return Ok(buf);
            }
            Err(Error::OutputOverflow) => {
                capacity = capacity.saturating_mul(2);
            }
            Err(e) => return Err(e),
        }
    }
}
