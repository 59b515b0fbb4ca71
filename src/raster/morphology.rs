//! Binary erosion and dilation with straight-line structuring elements.
//!
//! Kernels are `imageproc` masks built from a `1×N` (or `N×1`) strip, run
//! through `grayscale_erode`/`grayscale_dilate`. On a 0/255 raster those are
//! exactly binary erosion and dilation. Pixels outside the image are ignored by
//! both, so the border behaves as foreground during erosion.
//!
//! `Mask` is limited to 511 pixels per side. Longer kernels, which only occur
//! on very large renders with a small line scale, fall back to a separable
//! running-count sweep with the same window and border rules.

use image::{GrayImage, Luma};
use imageproc::morphology::{grayscale_dilate, grayscale_erode, Mask};

use super::BinaryRaster;
use crate::geometry::Orientation;

/// Longest kernel `imageproc::morphology::Mask` can represent.
pub const MAX_MASK_LENGTH: u32 = 511;

/// A straight structuring element.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct LineKernel {
    /// Axis the element extends along
    pub orientation: Orientation,
    /// Number of pixels covered
    pub length: u32,
}

impl LineKernel {
    /// Create a kernel of `length` pixels along `orientation`.
    pub fn new(orientation: Orientation, length: u32) -> Self {
        Self {
            orientation,
            length,
        }
    }

    /// Offset of the anchor pixel within the element.
    pub fn anchor(&self) -> usize {
        self.length as usize / 2
    }

    /// The kernel as an `imageproc` mask, or `None` past [`MAX_MASK_LENGTH`].
    fn mask(&self) -> Option<Mask> {
        if self.length > MAX_MASK_LENGTH {
            return None;
        }
        // anchor <= 255 whenever length <= 511
        let anchor = u8::try_from(self.anchor()).ok()?;
        let strip = match self.orientation {
            Orientation::Horizontal => GrayImage::from_pixel(self.length, 1, Luma([255])),
            Orientation::Vertical => GrayImage::from_pixel(1, self.length, Luma([255])),
        };
        Some(match self.orientation {
            Orientation::Horizontal => Mask::from_image(&strip, anchor, 0),
            Orientation::Vertical => Mask::from_image(&strip, 0, anchor),
        })
    }
}

#[derive(Clone, Copy)]
enum Op {
    Erode,
    Dilate,
}

/// Erode `raster` with `kernel`.
pub fn erode(raster: &BinaryRaster, kernel: LineKernel) -> BinaryRaster {
    apply(raster, kernel, Op::Erode)
}

/// Dilate `raster` with `kernel`, `iterations` times.
///
/// Zero iterations returns an unchanged copy.
pub fn dilate(raster: &BinaryRaster, kernel: LineKernel, iterations: u32) -> BinaryRaster {
    let mut out = raster.clone();
    for _ in 0..iterations {
        out = apply(&out, kernel, Op::Dilate);
    }
    out
}

fn apply(raster: &BinaryRaster, kernel: LineKernel, op: Op) -> BinaryRaster {
    if kernel.length <= 1 || raster.width() == 0 || raster.height() == 0 {
        return raster.clone();
    }
    match kernel.mask() {
        Some(mask) => {
            let image = match op {
                Op::Erode => grayscale_erode(raster.as_image(), &mask),
                Op::Dilate => grayscale_dilate(raster.as_image(), &mask),
            };
            BinaryRaster { image }
        },
        None => {
            log::debug!(
                "kernel of {} px exceeds the mask limit, using separable sweep",
                kernel.length
            );
            apply_separable(raster, kernel, op)
        },
    }
}

fn apply_separable(raster: &BinaryRaster, kernel: LineKernel, op: Op) -> BinaryRaster {
    let (width, height) = (raster.width() as usize, raster.height() as usize);
    let len = kernel.length as usize;
    let anchor = kernel.anchor();
    let mut out = BinaryRaster::new(raster.width(), raster.height());

    match kernel.orientation {
        Orientation::Horizontal => {
            let mut line = vec![false; width];
            for y in 0..height {
                for (x, px) in line.iter_mut().enumerate() {
                    *px = raster.is_set(x as u32, y as u32);
                }
                for (x, on) in sweep(&line, len, anchor, op).into_iter().enumerate() {
                    if on {
                        out.set(x as u32, y as u32, true);
                    }
                }
            }
        },
        Orientation::Vertical => {
            let mut line = vec![false; height];
            for x in 0..width {
                for (y, px) in line.iter_mut().enumerate() {
                    *px = raster.is_set(x as u32, y as u32);
                }
                for (y, on) in sweep(&line, len, anchor, op).into_iter().enumerate() {
                    if on {
                        out.set(x as u32, y as u32, true);
                    }
                }
            }
        },
    }
    out
}

/// One-dimensional pass: output `i` looks at inputs `i - anchor ..= i - anchor + len - 1`.
fn sweep(line: &[bool], len: usize, anchor: usize, op: Op) -> Vec<bool> {
    let n = line.len() as isize;
    let mut prefix = Vec::with_capacity(line.len() + 1);
    prefix.push(0usize);
    for &px in line {
        let last = prefix[prefix.len() - 1];
        prefix.push(last + px as usize);
    }

    (0..n)
        .map(|i| {
            let start = i - anchor as isize;
            let end = start + len as isize - 1;
            let lo = start.max(0);
            let hi = end.min(n - 1);
            let (inside, covered) = if lo <= hi {
                (prefix[hi as usize + 1] - prefix[lo as usize], (hi - lo + 1) as usize)
            } else {
                (0, 0)
            };
            match op {
                Op::Erode => inside + (len - covered) == len,
                Op::Dilate => inside > 0,
            }
        })
        .collect()
}
