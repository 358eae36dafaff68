//! # Mip chain generation
//!
//! This module builds the full chain of mip levels for an RGBA8 image on the CPU. Each level is
//! half the size of the previous one (rounded down, never below one texel) and every texel is the
//! unweighted average of the corresponding 2x2 block of the previous level, truncated to an
//! integer. The resulting levels are uploaded one by one as texture subresources by
//! [`crate::texture::load_texture`].
//!
//! ## Example
//!
//! ```rust
//! use mesh_viewer_core::mipmap::{generate_mip_chain, mip_level_count};
//!
//! let pixels = vec![255u8; 4 * 8 * 4];
//! let chain = generate_mip_chain(8, 4, &pixels).unwrap();
//! assert_eq!(chain.len() as u32, mip_level_count(8, 4));
//! assert_eq!((chain[3].width, chain[3].height), (1, 1));
//! ```

use crate::error::{Error, Result};

/// Bytes per texel of the only format the generator handles (`Rgba8Unorm`).
pub const BYTES_PER_PIXEL: usize = 4;

/// Number of mip levels needed to go from `width` x `height` down to a single texel.
///
/// This is `floor(log2(max(width, height))) + 1`. Zero-sized images are treated as 1x1.
pub fn mip_level_count(width: u32, height: u32) -> u32 {
    width.max(height).max(1).ilog2() + 1
}

/// A single level of a mip chain with tightly packed RGBA8 rows.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct MipLevel {
    pub width: u32,
    pub height: u32,
    pub pixels: Vec<u8>,
}

impl MipLevel {
    /// Row pitch in bytes, as expected by `wgpu::TexelCopyBufferLayout::bytes_per_row`.
    pub fn bytes_per_row(&self) -> u32 {
        self.width * BYTES_PER_PIXEL as u32
    }

    /// The RGBA value at column `x`, row `y`.
    pub fn pixel(&self, x: u32, y: u32) -> [u8; 4] {
        let offset = BYTES_PER_PIXEL * (y as usize * self.width as usize + x as usize);
        let mut out = [0; 4];
        out.copy_from_slice(&self.pixels[offset..offset + BYTES_PER_PIXEL]);
        out
    }
}

/// Produces the next level of the chain from `previous` with a 2x2 box filter.
///
/// When a dimension of `previous` is already 1 the same source row/column is read twice, which
/// keeps non-square chains in bounds down to the last level.
///
/// # Errors
///
/// Fails like [`generate_mip_chain`] when `previous` is zero-sized or its pixel buffer does not
/// match its dimensions.
pub fn downsample(previous: &MipLevel) -> Result<MipLevel> {
    check_pixels(previous.width, previous.height, previous.pixels.len())?;

    let width = (previous.width / 2).max(1);
    let height = (previous.height / 2).max(1);
    let max_x = previous.width - 1;
    let max_y = previous.height - 1;

    let mut pixels = vec![0u8; BYTES_PER_PIXEL * width as usize * height as usize];
    for j in 0..height {
        let y0 = (2 * j).min(max_y);
        let y1 = (2 * j + 1).min(max_y);
        for i in 0..width {
            let x0 = (2 * i).min(max_x);
            let x1 = (2 * i + 1).min(max_x);

            let p00 = previous.pixel(x0, y0);
            let p01 = previous.pixel(x1, y0);
            let p10 = previous.pixel(x0, y1);
            let p11 = previous.pixel(x1, y1);

            let offset = BYTES_PER_PIXEL * (j as usize * width as usize + i as usize);
            for channel in 0..BYTES_PER_PIXEL {
                let sum = p00[channel] as u32
                    + p01[channel] as u32
                    + p10[channel] as u32
                    + p11[channel] as u32;
                pixels[offset + channel] = (sum / 4) as u8;
            }
        }
    }

    Ok(MipLevel {
        width,
        height,
        pixels,
    })
}

fn check_pixels(width: u32, height: u32, len: usize) -> Result<()> {
    if width == 0 || height == 0 {
        return Err(Error::EmptyImage);
    }
    let expected = BYTES_PER_PIXEL * width as usize * height as usize;
    if len != expected {
        return Err(Error::PixelCount { expected, got: len });
    }
    Ok(())
}

/// Builds every level of the chain, starting with a copy of `base_pixels` as level 0.
///
/// # Errors
///
/// Returns [`Error::EmptyImage`] for a zero-sized image and [`Error::PixelCount`] when
/// `base_pixels` does not hold exactly `4 * width * height` bytes.
pub fn generate_mip_chain(width: u32, height: u32, base_pixels: &[u8]) -> Result<Vec<MipLevel>> {
    check_pixels(width, height, base_pixels.len())?;

    let count = mip_level_count(width, height) as usize;
    let mut levels = Vec::with_capacity(count);
    levels.push(MipLevel {
        width,
        height,
        pixels: base_pixels.to_vec(),
    });
    while levels.len() < count {
        let next = downsample(&levels[levels.len() - 1])?;
        levels.push(next);
    }

    Ok(levels)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn solid(width: u32, height: u32, rgba: [u8; 4]) -> Vec<u8> {
        rgba.iter()
            .copied()
            .cycle()
            .take(4 * (width * height) as usize)
            .collect()
    }

    #[test]
    fn level_counts() {
        assert_eq!(mip_level_count(1, 1), 1);
        assert_eq!(mip_level_count(2, 2), 2);
        assert_eq!(mip_level_count(3, 3), 2);
        assert_eq!(mip_level_count(4, 1), 3);
        assert_eq!(mip_level_count(256, 256), 9);
        assert_eq!(mip_level_count(2048, 1024), 12);
        assert_eq!(mip_level_count(1000, 600), 10);
    }

    #[test]
    fn chain_dimensions_halve_down_to_one() {
        let chain = generate_mip_chain(16, 4, &solid(16, 4, [1, 2, 3, 4])).unwrap();
        let dims: Vec<_> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(16, 4), (8, 2), (4, 1), (2, 1), (1, 1)]);
        for level in &chain {
            assert_eq!(level.pixels.len(), 4 * (level.width * level.height) as usize);
        }
    }

    #[test]
    fn odd_sizes_round_down() {
        let chain = generate_mip_chain(5, 3, &solid(5, 3, [0; 4])).unwrap();
        let dims: Vec<_> = chain.iter().map(|l| (l.width, l.height)).collect();
        assert_eq!(dims, vec![(5, 3), (2, 1), (1, 1)]);
    }

    #[test]
    fn box_filter_truncates() {
        // 2x2 image, red channel 0, 1, 1, 1 -> 3 / 4 truncates to 0.
        let base = MipLevel {
            width: 2,
            height: 2,
            pixels: vec![
                0, 10, 255, 255, //
                1, 20, 255, 0, //
                1, 30, 254, 255, //
                1, 41, 255, 0,
            ],
        };
        let next = downsample(&base).unwrap();
        assert_eq!((next.width, next.height), (1, 1));
        assert_eq!(next.pixel(0, 0), [0, 25, 254, 127]);
    }

    #[test]
    fn each_texel_reads_its_own_block() {
        // 4x2 image: left block all 100, right block all 200.
        let mut pixels = Vec::new();
        for _row in 0..2 {
            for x in 0..4 {
                let v = if x < 2 { 100 } else { 200 };
                pixels.extend_from_slice(&[v, v, v, 255]);
            }
        }
        let chain = generate_mip_chain(4, 2, &pixels).unwrap();
        assert_eq!(chain[1].pixel(0, 0), [100, 100, 100, 255]);
        assert_eq!(chain[1].pixel(1, 0), [200, 200, 200, 255]);
        assert_eq!(chain[2].pixel(0, 0), [150, 150, 150, 255]);
    }

    #[test]
    fn single_row_averages_with_itself() {
        let pixels = [10, 10, 10, 255, 20, 20, 20, 255];
        let chain = generate_mip_chain(2, 1, &pixels).unwrap();
        assert_eq!(chain.len(), 2);
        assert_eq!(chain[1].pixel(0, 0), [15, 15, 15, 255]);

        // 1x4 column: rows 0/1 and 2/3 pair up, the single column is read twice.
        let column = [0, 0, 0, 0, 8, 8, 8, 8, 100, 0, 0, 0, 200, 0, 0, 0];
        let chain = generate_mip_chain(1, 4, &column).unwrap();
        assert_eq!((chain[1].width, chain[1].height), (1, 2));
        assert_eq!(chain[1].pixel(0, 0), [4, 4, 4, 4]);
        assert_eq!(chain[1].pixel(0, 1), [150, 0, 0, 0]);
        assert_eq!(chain[2].pixel(0, 0), [77, 2, 2, 2]);
    }

    #[test]
    fn downsample_rejects_malformed_levels() {
        let empty = MipLevel {
            width: 0,
            height: 2,
            pixels: Vec::new(),
        };
        assert!(matches!(downsample(&empty), Err(Error::EmptyImage)));

        let short = MipLevel {
            width: 2,
            height: 2,
            pixels: vec![0; 12],
        };
        assert!(matches!(
            downsample(&short),
            Err(Error::PixelCount {
                expected: 16,
                got: 12
            })
        ));
    }

    #[test]
    fn solid_color_is_preserved() {
        let chain = generate_mip_chain(32, 32, &solid(32, 32, [12, 34, 56, 78])).unwrap();
        let last = chain.last().unwrap();
        assert_eq!(last.pixel(0, 0), [12, 34, 56, 78]);
    }

    #[test]
    fn base_level_is_copied_verbatim() {
        let pixels: Vec<u8> = (0..64).collect();
        let chain = generate_mip_chain(4, 4, &pixels).unwrap();
        assert_eq!(chain[0].pixels, pixels);
        assert_eq!(chain[0].bytes_per_row(), 16);
    }

    #[test]
    fn rejects_bad_input() {
        assert!(matches!(
            generate_mip_chain(0, 4, &[]),
            Err(Error::EmptyImage)
        ));
        assert!(matches!(
            generate_mip_chain(2, 2, &[0; 15]),
            Err(Error::PixelCount {
                expected: 16,
                got: 15
            })
        ));
    }
}
