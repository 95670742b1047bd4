//! PNG encoding for RGBA tile buffers.
//!
//! Tiles with at most 256 distinct RGBA values are written as palette images
//! (color type 3) with a `tRNS` chunk for alpha; anything richer falls back
//! to truecolor with alpha (color type 6). Density tiles almost always take
//! the palette path.
//!
//! Palette entries are numbered by first appearance in the pixel buffer, so
//! identical pixels always produce identical bytes.

use std::collections::{HashMap, HashSet};
use std::io::Write;

use flate2::write::ZlibEncoder;
use flate2::Compression;
use rayon::prelude::*;
use thiserror::Error;
use tile_common::TileError;
use tracing::debug;

const PNG_SIGNATURE: [u8; 8] = [0x89, b'P', b'N', b'G', b'\r', b'\n', 0x1a, b'\n'];

/// Largest palette a PNG8 image can carry.
const PALETTE_LIMIT: usize = 256;

/// Below this many pixels the palette is built on one thread.
const PARALLEL_MIN_PIXELS: usize = 64 * 64;

const COLOR_TYPE_INDEXED: u8 = 3;
const COLOR_TYPE_RGBA: u8 = 6;

#[derive(Debug, Error)]
pub enum PngError {
    #[error("buffer of {len} bytes does not match a {width}x{height} image")]
    BufferSize { width: usize, height: usize, len: usize },

    #[error("palette has {0} entries, at most 256 are allowed")]
    PaletteTooLarge(usize),

    #[error("IDAT compression failed: {0}")]
    Compression(#[from] std::io::Error),
}

impl From<PngError> for TileError {
    fn from(err: PngError) -> Self {
        TileError::Render(err.to_string())
    }
}

/// Encode RGBA pixels, choosing the palette format when it fits.
pub fn create_png_auto(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    expect_len(pixels.len(), width, height, 4)?;

    let quantized = if pixels.len() / 4 >= PARALLEL_MIN_PIXELS {
        Quantized::build_parallel(pixels)
    } else {
        Quantized::build(pixels)
    };

    match quantized {
        Some(q) => create_png_indexed(width, height, &q.palette, &q.indices),
        None => {
            debug!(width, height, "More than 256 colors, falling back to RGBA");
            create_png(pixels, width, height)
        }
    }
}

/// Encode a palette image. `indices` holds one palette index per pixel.
pub fn create_png_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 4]],
    indices: &[u8],
) -> Result<Vec<u8>, PngError> {
    expect_len(indices.len(), width, height, 1)?;
    if palette.is_empty() || palette.len() > PALETTE_LIMIT {
        return Err(PngError::PaletteTooLarge(palette.len()));
    }

    let rgb: Vec<u8> = palette.iter().flat_map(|c| [c[0], c[1], c[2]]).collect();

    let mut out = ChunkWriter::new();
    out.chunk(b"IHDR", &header(width, height, COLOR_TYPE_INDEXED));
    out.chunk(b"PLTE", &rgb);
    if palette.iter().any(|c| c[3] != 255) {
        let alpha: Vec<u8> = palette.iter().map(|c| c[3]).collect();
        out.chunk(b"tRNS", &alpha);
    }
    out.chunk(b"IDAT", &compress_rows(indices, width, height)?);
    Ok(out.finish())
}

/// Encode RGBA pixels as a truecolor image with alpha.
pub fn create_png(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>, PngError> {
    expect_len(pixels.len(), width, height, 4)?;

    let mut out = ChunkWriter::new();
    out.chunk(b"IHDR", &header(width, height, COLOR_TYPE_RGBA));
    out.chunk(b"IDAT", &compress_rows(pixels, width * 4, height)?);
    Ok(out.finish())
}

fn expect_len(len: usize, width: usize, height: usize, channels: usize) -> Result<(), PngError> {
    let fits_u32 = u32::try_from(width).is_ok() && u32::try_from(height).is_ok();
    let expected = width.checked_mul(height).and_then(|n| n.checked_mul(channels));
    if !fits_u32 || expected != Some(len) {
        return Err(PngError::BufferSize { width, height, len });
    }
    Ok(())
}

/// Palette plus per-pixel indices for an RGBA buffer.
#[derive(Debug, PartialEq)]
struct Quantized {
    palette: Vec<[u8; 4]>,
    indices: Vec<u8>,
}

fn rgba(px: &[u8]) -> [u8; 4] {
    [px[0], px[1], px[2], px[3]]
}

impl Quantized {
    /// Single pass over the pixels. None once a 257th color shows up.
    fn build(pixels: &[u8]) -> Option<Self> {
        let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(PALETTE_LIMIT);
        let mut palette = Vec::with_capacity(PALETTE_LIMIT);
        let mut indices = Vec::with_capacity(pixels.len() / 4);

        for px in pixels.chunks_exact(4) {
            let color = rgba(px);
            let idx = match lookup.get(&color) {
                Some(&i) => i,
                None => {
                    if palette.len() == PALETTE_LIMIT {
                        return None;
                    }
                    let i = palette.len() as u8;
                    palette.push(color);
                    lookup.insert(color, i);
                    i
                }
            };
            indices.push(idx);
        }

        Some(Self { palette, indices })
    }

    /// Same result as [`Quantized::build`], spread over the rayon pool.
    ///
    /// Each stripe reports its colors in first-seen order. Concatenating the
    /// stripe lists in stripe order and keeping first occurrences reproduces
    /// the sequential numbering.
    fn build_parallel(pixels: &[u8]) -> Option<Self> {
        let stripe_pixels = (pixels.len() / 4 / rayon::current_num_threads()).max(256);
        let stripe_bytes = stripe_pixels * 4;

        let stripes: Vec<Vec<[u8; 4]>> = pixels
            .par_chunks(stripe_bytes)
            .map(|stripe| {
                let mut seen = HashSet::with_capacity(PALETTE_LIMIT);
                let mut order = Vec::new();
                for px in stripe.chunks_exact(4) {
                    let color = rgba(px);
                    if seen.insert(color) {
                        order.push(color);
                        if order.len() > PALETTE_LIMIT {
                            break;
                        }
                    }
                }
                order
            })
            .collect();

        let mut lookup: HashMap<[u8; 4], u8> = HashMap::with_capacity(PALETTE_LIMIT);
        let mut palette = Vec::with_capacity(PALETTE_LIMIT);
        for color in stripes.into_iter().flatten() {
            if lookup.contains_key(&color) {
                continue;
            }
            if palette.len() == PALETTE_LIMIT {
                return None;
            }
            lookup.insert(color, palette.len() as u8);
            palette.push(color);
        }

        let mut indices = vec![0u8; pixels.len() / 4];
        indices
            .par_chunks_mut(stripe_pixels)
            .zip(pixels.par_chunks(stripe_bytes))
            .for_each(|(out, stripe)| {
                for (slot, px) in out.iter_mut().zip(stripe.chunks_exact(4)) {
                    *slot = lookup.get(&rgba(px)).copied().unwrap_or(0);
                }
            });

        Some(Self { palette, indices })
    }
}

/// IHDR payload: 8-bit depth, deflate, no filter method, no interlace.
fn header(width: usize, height: usize, color_type: u8) -> [u8; 13] {
    let mut ihdr = [0u8; 13];
    ihdr[..4].copy_from_slice(&(width as u32).to_be_bytes());
    ihdr[4..8].copy_from_slice(&(height as u32).to_be_bytes());
    ihdr[8] = 8;
    ihdr[9] = color_type;
    ihdr
}

/// Accumulates length-prefixed, CRC-suffixed chunks after the signature.
struct ChunkWriter {
    buf: Vec<u8>,
}

impl ChunkWriter {
    fn new() -> Self {
        Self {
            buf: PNG_SIGNATURE.to_vec(),
        }
    }

    fn chunk(&mut self, kind: &[u8; 4], payload: &[u8]) {
        let mut crc = crc32fast::Hasher::new();
        crc.update(kind);
        crc.update(payload);

        self.buf.extend_from_slice(&(payload.len() as u32).to_be_bytes());
        self.buf.extend_from_slice(kind);
        self.buf.extend_from_slice(payload);
        self.buf.extend_from_slice(&crc.finalize().to_be_bytes());
    }

    fn finish(mut self) -> Vec<u8> {
        self.chunk(b"IEND", &[]);
        self.buf
    }
}

/// Zlib-compress `height` scanlines of `stride` bytes, each behind a
/// filter-type-0 byte.
fn compress_rows(data: &[u8], stride: usize, height: usize) -> Result<Vec<u8>, PngError> {
    let mut encoder = ZlibEncoder::new(
        Vec::with_capacity(data.len() / 8 + 64),
        Compression::fast(),
    );
    for row in data.chunks_exact(stride.max(1)).take(height) {
        encoder.write_all(&[0])?;
        encoder.write_all(row)?;
    }
    Ok(encoder.finish()?)
}
