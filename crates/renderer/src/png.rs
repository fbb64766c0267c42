//! PNG encoding for rendered figures.
//!
//! Figures arrive as packed RGB (the plotting backend's buffer format) and are
//! written in one of two modes:
//! - **Indexed PNG (color type 3)**: used when the figure has ≤256 unique
//!   colors. Smaller files, 1 byte per pixel before compression.
//! - **Truecolor PNG (color type 2)**: fallback for figures with more colors.
//!
//! Use [`encode_rgb`] for automatic mode selection.

use rayon::prelude::*;
use std::collections::HashMap;
use std::io::Write;

use crate::error::{RenderError, Result};

/// Maximum colors for indexed PNG (PNG8)
const MAX_PALETTE_SIZE: usize = 256;

/// Minimum pixels to benefit from parallel palette extraction
const PARALLEL_THRESHOLD: usize = 4096; // 64x64 or larger

const SIGNATURE: [u8; 8] = [137, 80, 78, 71, 13, 10, 26, 10];

/// How an image ended up encoded.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PngEncoding {
    Indexed { colors: usize },
    Truecolor,
}

/// Encoded PNG bytes plus the mode that was chosen.
#[derive(Debug, Clone)]
pub struct EncodedPng {
    pub bytes: Vec<u8>,
    pub encoding: PngEncoding,
}

/// Encode packed RGB pixels, choosing indexed or truecolor output.
///
/// # Arguments
/// - `pixels`: RGB pixel data (3 bytes per pixel, row-major, top row first)
/// - `width`: Image width in pixels
/// - `height`: Image height in pixels
pub fn encode_rgb(pixels: &[u8], width: usize, height: usize) -> Result<EncodedPng> {
    check_dimensions(pixels, width, height)?;

    let num_pixels = width * height;
    let palette_result = if num_pixels >= PARALLEL_THRESHOLD {
        extract_palette_parallel(pixels)
    } else {
        extract_palette_sequential(pixels)
    };

    match palette_result {
        Some((palette, indices)) => Ok(EncodedPng {
            bytes: encode_indexed(width, height, &palette, &indices)?,
            encoding: PngEncoding::Indexed {
                colors: palette.len(),
            },
        }),
        None => Ok(EncodedPng {
            bytes: encode_truecolor(pixels, width, height)?,
            encoding: PngEncoding::Truecolor,
        }),
    }
}

fn check_dimensions(pixels: &[u8], width: usize, height: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(RenderError::Encoding(format!(
            "empty image {width}x{height}"
        )));
    }
    if pixels.len() != width * height * 3 {
        return Err(RenderError::Encoding(format!(
            "expected {} RGB bytes for {width}x{height}, got {}",
            width * height * 3,
            pixels.len()
        )));
    }
    Ok(())
}

/// Pack RGB bytes into a u32 for faster hashing and comparison
#[inline(always)]
fn pack_color(r: u8, g: u8, b: u8) -> u32 {
    (r as u32) | ((g as u32) << 8) | ((b as u32) << 16)
}

#[inline(always)]
fn unpack_color(packed: u32) -> [u8; 3] {
    [packed as u8, (packed >> 8) as u8, (packed >> 16) as u8]
}

/// Sequential palette extraction for small images.
fn extract_palette_sequential(pixels: &[u8]) -> Option<(Vec<[u8; 3]>, Vec<u8>)> {
    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 3]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    let mut indices: Vec<u8> = Vec::with_capacity(pixels.len() / 3);

    for px in pixels.chunks_exact(3) {
        let packed = pack_color(px[0], px[1], px[2]);
        let index = match color_to_index.get(&packed) {
            Some(&idx) => idx,
            None => {
                if palette.len() >= MAX_PALETTE_SIZE {
                    return None;
                }
                let idx = palette.len() as u8;
                palette.push([px[0], px[1], px[2]]);
                color_to_index.insert(packed, idx);
                idx
            }
        };
        indices.push(index);
    }

    Some((palette, indices))
}

/// Parallel palette extraction for larger images.
///
/// Unique colors are collected per chunk, merged, and only if they fit in
/// a palette are the pixels mapped to indices in a second parallel pass.
fn extract_palette_parallel(pixels: &[u8]) -> Option<(Vec<[u8; 3]>, Vec<u8>)> {
    let pixels_per_chunk = (pixels.len() / 3 / rayon::current_num_threads()).max(256);
    let chunk_bytes = pixels_per_chunk * 3;

    let unique_colors: Vec<u32> = pixels
        .par_chunks(chunk_bytes)
        .flat_map(|chunk| {
            let mut local: HashMap<u32, ()> = HashMap::with_capacity(MAX_PALETTE_SIZE);
            for px in chunk.chunks_exact(3) {
                local.insert(pack_color(px[0], px[1], px[2]), ());
                // Already too many for a palette; no need to keep counting.
                if local.len() > MAX_PALETTE_SIZE {
                    break;
                }
            }
            local.into_keys().collect::<Vec<_>>()
        })
        .collect();

    let mut color_to_index: HashMap<u32, u8> = HashMap::with_capacity(MAX_PALETTE_SIZE);
    let mut palette: Vec<[u8; 3]> = Vec::with_capacity(MAX_PALETTE_SIZE);
    for packed in unique_colors {
        if !color_to_index.contains_key(&packed) {
            if palette.len() >= MAX_PALETTE_SIZE {
                return None;
            }
            color_to_index.insert(packed, palette.len() as u8);
            palette.push(unpack_color(packed));
        }
    }

    let mut indices = vec![0u8; pixels.len() / 3];
    indices
        .par_chunks_mut(pixels_per_chunk)
        .zip(pixels.par_chunks(chunk_bytes))
        .for_each(|(idx_chunk, px_chunk)| {
            for (idx, px) in idx_chunk.iter_mut().zip(px_chunk.chunks_exact(3)) {
                let packed = pack_color(px[0], px[1], px[2]);
                *idx = color_to_index.get(&packed).copied().unwrap_or(0);
            }
        });

    Some((palette, indices))
}

/// Create an indexed PNG (color type 3) from palette and indices.
pub fn encode_indexed(
    width: usize,
    height: usize,
    palette: &[[u8; 3]],
    indices: &[u8],
) -> Result<Vec<u8>> {
    if palette.is_empty() || palette.len() > MAX_PALETTE_SIZE {
        return Err(RenderError::Encoding(format!(
            "palette must hold 1..=256 colors, got {}",
            palette.len()
        )));
    }
    if indices.len() != width * height {
        return Err(RenderError::Encoding(format!(
            "expected {} palette indices, got {}",
            width * height,
            indices.len()
        )));
    }

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 3));

    let plte: Vec<u8> = palette.iter().flatten().copied().collect();
    write_chunk(&mut png, b"PLTE", &plte);

    let idat = deflate_scanlines(indices, width, height, 1)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

/// Create a truecolor PNG (color type 2) from packed RGB pixels.
pub fn encode_truecolor(pixels: &[u8], width: usize, height: usize) -> Result<Vec<u8>> {
    check_dimensions(pixels, width, height)?;

    let mut png = Vec::new();
    png.extend_from_slice(&SIGNATURE);
    write_chunk(&mut png, b"IHDR", &ihdr(width, height, 2));

    let idat = deflate_scanlines(pixels, width, height, 3)?;
    write_chunk(&mut png, b"IDAT", &idat);
    write_chunk(&mut png, b"IEND", &[]);

    Ok(png)
}

fn ihdr(width: usize, height: usize, color_type: u8) -> Vec<u8> {
    let mut data = Vec::with_capacity(13);
    data.extend_from_slice(&(width as u32).to_be_bytes());
    data.extend_from_slice(&(height as u32).to_be_bytes());
    data.push(8); // bit depth
    data.push(color_type);
    data.push(0); // compression method
    data.push(0); // filter method
    data.push(0); // interlace method
    data
}

/// Length, type, data, CRC over type + data.
fn write_chunk(png: &mut Vec<u8>, chunk_type: &[u8; 4], data: &[u8]) {
    png.extend_from_slice(&(data.len() as u32).to_be_bytes());
    png.extend_from_slice(chunk_type);
    png.extend_from_slice(data);

    let mut hasher = crc32fast::Hasher::new();
    hasher.update(chunk_type);
    hasher.update(data);
    png.extend_from_slice(&hasher.finalize().to_be_bytes());
}

/// Zlib-compress scanlines, each prefixed with filter type 0.
fn deflate_scanlines(
    data: &[u8],
    width: usize,
    height: usize,
    bytes_per_pixel: usize,
) -> Result<Vec<u8>> {
    let row_len = width * bytes_per_pixel;
    let mut uncompressed = Vec::with_capacity(height * (1 + row_len));
    for row in data.chunks_exact(row_len).take(height) {
        uncompressed.push(0); // filter type: none
        uncompressed.extend_from_slice(row);
    }

    let compression_failed = |e: std::io::Error| RenderError::Encoding(format!("IDAT compression failed: {e}"));
    let mut encoder = flate2::write::ZlibEncoder::new(Vec::new(), flate2::Compression::default());
    encoder.write_all(&uncompressed).map_err(compression_failed)?;
    encoder.finish().map_err(compression_failed)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_extract_palette_simple() {
        // red, green, blue, red
        let pixels = [255, 0, 0, 0, 255, 0, 0, 0, 255, 255, 0, 0];

        let (palette, indices) = extract_palette_sequential(&pixels).unwrap();
        assert_eq!(palette.len(), 3);
        assert_eq!(indices, vec![0, 1, 2, 0]);
    }

    #[test]
    fn test_extract_palette_too_many_colors() {
        let pixels: Vec<u8> = (0..300u32)
            .flat_map(|i| [(i % 256) as u8, (i / 256) as u8, 7])
            .collect();
        assert!(extract_palette_sequential(&pixels).is_none());
        assert!(extract_palette_parallel(&pixels).is_none());
    }

    #[test]
    fn test_parallel_matches_sequential_mapping() {
        // 128x128 with ~50 colors, above PARALLEL_THRESHOLD
        let mut pixels = Vec::with_capacity(128 * 128 * 3);
        for y in 0..128 {
            for x in 0..128 {
                let c = ((x / 8) + (y / 8)) % 50;
                pixels.extend_from_slice(&[(c * 5) as u8, (100 + c * 3) as u8, (200 - c * 2) as u8]);
            }
        }

        let (palette, indices) = extract_palette_parallel(&pixels).unwrap();
        assert!(palette.len() <= 50);
        assert_eq!(indices.len(), 128 * 128);
        for (i, px) in pixels.chunks_exact(3).enumerate() {
            assert_eq!(palette[indices[i] as usize], [px[0], px[1], px[2]]);
        }
    }

    #[test]
    fn test_chunk_crc_covers_type_and_data() {
        let mut png = Vec::new();
        write_chunk(&mut png, b"IEND", &[]);
        assert_eq!(&png[..8], &[0, 0, 0, 0, b'I', b'E', b'N', b'D']);
        let crc = u32::from_be_bytes([png[8], png[9], png[10], png[11]]);
        assert_eq!(crc, crc32fast::hash(b"IEND"));
    }

    #[test]
    fn test_rejects_mismatched_buffer() {
        assert!(encode_rgb(&[0; 11], 2, 2).is_err());
        assert!(encode_rgb(&[], 0, 0).is_err());
    }
}
