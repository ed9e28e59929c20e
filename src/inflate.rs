//! DEFLATE decompression (RFC 1951).
//!
//! `Inflater` owns the sliding window, the two Huffman tables currently in
//! effect, and the running Adler-32; `decompress` drives it block by block
//! over a `BitReader` until the final block's end-of-block symbol is seen.

use crate::adler32::Adler32;
use crate::bitstream::BitReader;
use crate::error::{Error, Result};
use crate::huffman::{
    HuffmanTable, CODELEN_CODES, CODELEN_ORDER, DIST_BASE, DIST_CODES, DIST_EXTRA,
    FIXED_DIST_LENGTHS, FIXED_LITLEN_LENGTHS, LENGTH_BASE, LENGTH_EXTRA, LITLEN_CODES, MAX_BITS,
};

/// Largest window DEFLATE allows (`CINFO` up to 7, i.e. `2^15`).
pub const MAX_WINDOW_SIZE: usize = 32768;

/// End-of-block literal/length symbol.
const END_OF_BLOCK: u16 = 256;

/// Streaming DEFLATE decompressor state: sliding window, current pair of
/// Huffman tables, and the running checksum over everything produced.
pub struct Inflater {
    window: Vec<u8>,
    window_pos: usize,
    window_len: usize,

    litlen_table: HuffmanTable,
    dist_table: HuffmanTable,

    checksum: Adler32,
}

impl Inflater {
    /// `window_bits` is the base-2 log of the window size (8..=15,
    /// matching zlib's `CINFO + 8`).
    pub fn new(window_bits: u32) -> Self {
        let window_bits = window_bits.clamp(8, 15);
        let window_size = 1usize << window_bits;
        log::trace!("creating inflater with {}-byte window", window_size);
        Self {
            window: vec![0; window_size],
            window_pos: 0,
            window_len: 0,
            litlen_table: HuffmanTable::new(),
            dist_table: HuffmanTable::new(),
            checksum: Adler32::new(),
        }
    }

    pub fn checksum(&self) -> u32 {
        self.checksum.finalize()
    }

    /// Decode the whole DEFLATE block sequence in `input`, appending
    /// decoded bytes to `output` and failing with `Error::OutputOverflow`
    /// the instant a write would push `output` past `capacity` bytes, so a
    /// maliciously expansive stream (e.g. maximal back-references) can
    /// never grow `output` unboundedly before the limit is enforced.
    /// Returns the number of input bytes consumed, stopping right after the
    /// final block.
    pub fn decompress(&mut self, input: &[u8], output: &mut Vec<u8>, capacity: usize) -> Result<usize> {
        let mut reader = BitReader::new(input);

        loop {
            let bfinal = reader.get_bits(1)? != 0;
            let btype = reader.get_bits(2)?;

            match btype {
                0 => self.inflate_stored(&mut reader, output, capacity)?,
                1 => {
                    self.setup_fixed_huffman()?;
                    self.inflate_huffman(&mut reader, output, capacity)?;
                }
                2 => {
                    self.read_dynamic_huffman(&mut reader)?;
                    self.inflate_huffman(&mut reader, output, capacity)?;
                }
                3 => return Err(Error::ReservedBlockType),
                _ => unreachable!("get_bits(2) cannot return > 3"),
            }

            if bfinal {
                break;
            }
        }

        self.checksum.update(output);
        reader.align_to_byte();
        Ok(reader.byte_cursor())
    }

    fn inflate_stored(
        &mut self,
        reader: &mut BitReader<'_>,
        output: &mut Vec<u8>,
        capacity: usize,
    ) -> Result<()> {
        reader.align_to_byte();
        let header = reader.read_aligned_bytes(4)?;
        let len = u16::from_le_bytes([header[0], header[1]]);
        let nlen = u16::from_le_bytes([header[2], header[3]]);
        if len != !nlen {
            return Err(Error::BlockSizeMismatch);
        }

        let data = reader.read_aligned_bytes(len as usize)?;
        if output.len() + data.len() > capacity {
            return Err(Error::OutputOverflow);
        }
        output.reserve(data.len());
        for &byte in data {
            output.push(byte);
            self.add_to_window(byte);
        }
        Ok(())
    }

    fn setup_fixed_huffman(&mut self) -> Result<()> {
        self.litlen_table.build(&FIXED_LITLEN_LENGTHS, LITLEN_CODES)?;
        self.dist_table.build(&FIXED_DIST_LENGTHS, DIST_CODES)?;
        Ok(())
    }

    /// Parse HLIT/HDIST/HCLEN and the RLE-compressed length tables (RFC
    /// 1951 §3.2.7), then build the literal/length and distance tables
    /// those lengths describe.
    fn read_dynamic_huffman(&mut self, reader: &mut BitReader<'_>) -> Result<()> {
        let hlit = reader.get_bits(5)? as usize + 257;
        let hdist = reader.get_bits(5)? as usize + 1;
        let hclen = reader.get_bits(4)? as usize + 4;

        if hlit > LITLEN_CODES || hdist > DIST_CODES {
            return Err(Error::InvalidSymbol);
        }

        let mut codelen_lengths = [0u8; CODELEN_CODES];
        for i in 0..hclen {
            codelen_lengths[CODELEN_ORDER[i]] = reader.get_bits(3)? as u8;
        }

        let mut codelen_table = HuffmanTable::new();
        codelen_table.build(&codelen_lengths, CODELEN_CODES)?;

        let mut lengths = vec![0u8; hlit + hdist];
        let mut i = 0;
        while i < lengths.len() {
            let peeked = reader.peek_bits_lossy(MAX_BITS as u32);
            let (sym, bits) = codelen_table.decode(peeked);
            if bits == 0 {
                return Err(Error::InvalidSymbol);
            }
            reader.consume(bits as u32)?;

            match sym {
                0..=15 => {
                    lengths[i] = sym as u8;
                    i += 1;
                }
                16 => {
                    if i == 0 {
                        return Err(Error::InvalidSymbol);
                    }
                    let count = reader.get_bits(2)? as usize + 3;
                    let prev = lengths[i - 1];
                    if i + count > lengths.len() {
                        return Err(Error::InvalidSymbol);
                    }
                    for slot in &mut lengths[i..i + count] {
                        *slot = prev;
                    }
                    i += count;
                }
                17 => {
                    let count = reader.get_bits(3)? as usize + 3;
                    if i + count > lengths.len() {
                        return Err(Error::InvalidSymbol);
                    }
                    i += count;
                }
                18 => {
                    let count = reader.get_bits(7)? as usize + 11;
                    if i + count > lengths.len() {
                        return Err(Error::InvalidSymbol);
                    }
                    i += count;
                }
                _ => return Err(Error::InvalidSymbol),
            }
        }

        if lengths[END_OF_BLOCK as usize] == 0 {
            return Err(Error::MissingEndOfBlock);
        }

        self.litlen_table.build(&lengths[..hlit], hlit)?;
        self.dist_table.build(&lengths[hlit..], hdist)?;
        log::trace!(
            "built dynamic huffman tables: hlit={} hdist={} hclen={}",
            hlit,
            hdist,
            hclen
        );
        Ok(())
    }

    fn inflate_huffman(
        &mut self,
        reader: &mut BitReader<'_>,
        output: &mut Vec<u8>,
        capacity: usize,
    ) -> Result<()> {
        loop {
            let peeked = reader.peek_bits_lossy(MAX_BITS as u32);
            let (sym, bits) = self.litlen_table.decode(peeked);
            if bits == 0 {
                return Err(Error::InvalidSymbol);
            }
            reader.consume(bits as u32)?;

            if sym < 256 {
                if output.len() >= capacity {
                    return Err(Error::OutputOverflow);
                }
                output.push(sym as u8);
                self.add_to_window(sym as u8);
                continue;
            }
            if sym == END_OF_BLOCK {
                return Ok(());
            }

            let len_idx = (sym - 257) as usize;
            if len_idx >= LENGTH_BASE.len() {
                return Err(Error::InvalidSymbol);
            }
            let mut length = LENGTH_BASE[len_idx] as usize;
            let extra = LENGTH_EXTRA[len_idx] as u32;
            if extra > 0 {
                length += reader.get_bits(extra)? as usize;
            }

            let peeked = reader.peek_bits_lossy(MAX_BITS as u32);
            let (dist_sym, dist_bits) = self.dist_table.decode(peeked);
            if dist_bits == 0 {
                return Err(Error::InvalidSymbol);
            }
            reader.consume(dist_bits as u32)?;

            let dist_idx = dist_sym as usize;
            if dist_idx >= DIST_BASE.len() {
                return Err(Error::InvalidSymbol);
            }
            let mut distance = DIST_BASE[dist_idx] as usize;
            let dist_extra = DIST_EXTRA[dist_idx] as u32;
            if dist_extra > 0 {
                distance += reader.get_bits(dist_extra)? as usize;
            }

            self.copy_from_window(output, distance, length, capacity)?;
        }
    }

    fn add_to_window(&mut self, byte: u8) {
        let window_size = self.window.len();
        self.window[self.window_pos] = byte;
        self.window_pos = (self.window_pos + 1) & (window_size - 1);
        if self.window_len < window_size {
            self.window_len += 1;
        }
    }

    fn copy_from_window(
        &mut self,
        output: &mut Vec<u8>,
        distance: usize,
        length: usize,
        capacity: usize,
    ) -> Result<()> {
        if distance == 0 || distance > self.window_len {
            return Err(Error::BadDistance);
        }
        if output.len() + length > capacity {
            return Err(Error::OutputOverflow);
        }

        let window_size = self.window.len();
        let mut src_pos = (self.window_pos + window_size - distance) & (window_size - 1);

        output.reserve(length);
        for _ in 0..length {
            let byte = self.window[src_pos];
            output.push(byte);
            self.add_to_window(byte);
            src_pos = (src_pos + 1) & (window_size - 1);
        }
        Ok(())
    }
}
