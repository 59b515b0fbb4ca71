//! Two-level page rasters.
//!
//! [`BinaryRaster`] wraps an `image::GrayImage` whose pixels are either `0`
//! (background) or `255` (foreground, i.e. ink). It is the input of the line
//! detector and the type of every intermediate mask.

pub mod morphology;

use image::{GrayImage, Luma};

use crate::config::ThresholdConfig;
use crate::error::{Error, Result};
use crate::geometry::PixelRect;

pub use morphology::LineKernel;

/// Pixel value of foreground (ink) pixels.
pub const FOREGROUND: u8 = 255;

/// Pixel value of background pixels.
pub const BACKGROUND: u8 = 0;

/// A binary raster in pixel space (origin top-left, y downward).
#[derive(Debug, Clone, PartialEq)]
pub struct BinaryRaster {
    image: GrayImage,
}

impl BinaryRaster {
    /// Create an all-background raster.
    pub fn new(width: u32, height: u32) -> Self {
        Self {
            image: GrayImage::new(width, height),
        }
    }

    /// Wrap an already two-level image; any non-zero pixel is foreground.
    pub fn from_gray(gray: GrayImage) -> Result<Self> {
        ensure_not_empty(&gray)?;
        let mut image = gray;
        for px in image.pixels_mut() {
            if px.0[0] != BACKGROUND {
                px.0[0] = FOREGROUND;
            }
        }
        Ok(Self { image })
    }

    /// Binarize a grayscale page image with a gaussian-weighted local threshold.
    ///
    /// Unless `process_background` is set the image is inverted first, so dark
    /// ink on a light page becomes foreground. A pixel is foreground when it is
    /// brighter than its neighbourhood mean minus `c`.
    pub fn adaptive_threshold(gray: &GrayImage, config: &ThresholdConfig) -> Result<Self> {
        config.validate()?;
        ensure_not_empty(gray)?;

        let mut source = gray.clone();
        if !config.process_background {
            image::imageops::invert(&mut source);
        }

        // sigma implied by a gaussian aperture of `block_size` pixels
        let sigma = 0.3 * ((config.block_size as f32 - 1.0) * 0.5 - 1.0) + 0.8;
        let mean = imageproc::filter::gaussian_blur_f32(&source, sigma);

        let image = GrayImage::from_fn(gray.width(), gray.height(), |x, y| {
            let value = source.get_pixel(x, y).0[0] as f32;
            let local = mean.get_pixel(x, y).0[0] as f32;
            if value > local - config.c {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });

        log::debug!(
            "Thresholded {}x{} raster (block size {}, c {})",
            gray.width(),
            gray.height(),
            config.block_size,
            config.c
        );
        Ok(Self { image })
    }

    /// Width in pixels.
    pub fn width(&self) -> u32 {
        self.image.width()
    }

    /// Height in pixels.
    pub fn height(&self) -> u32 {
        self.image.height()
    }

    /// `(width, height)` in pixels.
    pub fn dimensions(&self) -> (u32, u32) {
        self.image.dimensions()
    }

    /// The underlying 0/255 image.
    pub fn as_image(&self) -> &GrayImage {
        &self.image
    }

    /// Whether the pixel at `(x, y)` is foreground. Out-of-range reads are background.
    pub fn is_set(&self, x: u32, y: u32) -> bool {
        x < self.width() && y < self.height() && self.image.get_pixel(x, y).0[0] != BACKGROUND
    }

    /// Set or clear one pixel. Out-of-range writes are ignored.
    pub fn set(&mut self, x: u32, y: u32, on: bool) {
        if x < self.width() && y < self.height() {
            let value = if on { FOREGROUND } else { BACKGROUND };
            self.image.put_pixel(x, y, Luma([value]));
        }
    }

    /// Set every pixel of `rect` (clipped to the raster) to foreground.
    pub fn fill_rect(&mut self, rect: PixelRect) {
        if let Some((x0, y0, x1, y1)) = self.clip(&rect) {
            for y in y0..y1 {
                for x in x0..x1 {
                    self.image.put_pixel(x, y, Luma([FOREGROUND]));
                }
            }
        }
    }

    /// Number of foreground pixels.
    pub fn count_foreground(&self) -> usize {
        self.image.pixels().filter(|p| p.0[0] != BACKGROUND).count()
    }

    /// Pixel-wise union (the sum of two masks).
    pub fn union(&self, other: &BinaryRaster) -> Result<BinaryRaster> {
        self.combine(other, |a, b| a || b)
    }

    /// Pixel-wise intersection (the product of two masks).
    pub fn intersect(&self, other: &BinaryRaster) -> Result<BinaryRaster> {
        self.combine(other, |a, b| a && b)
    }

    /// Copy out the part of the raster covered by `rect` (clipped).
    pub fn crop(&self, rect: &PixelRect) -> BinaryRaster {
        match self.clip(rect) {
            Some((x0, y0, x1, y1)) => BinaryRaster {
                image: image::imageops::crop_imm(&self.image, x0, y0, x1 - x0, y1 - y0)
                    .to_image(),
            },
            None => BinaryRaster::new(0, 0),
        }
    }

    /// Clear every pixel that lies outside all of `rects`.
    pub fn retain_regions(&self, rects: &[PixelRect]) -> BinaryRaster {
        let mut mask = BinaryRaster::new(self.width(), self.height());
        for rect in rects {
            mask.fill_rect(*rect);
        }
        // Same dimensions by construction.
        self.combine(&mask, |a, b| a && b).unwrap_or(mask)
    }

    /// Erode with a line kernel.
    pub fn erode(&self, kernel: LineKernel) -> BinaryRaster {
        morphology::erode(self, kernel)
    }

    /// Dilate with a line kernel, `iterations` times.
    pub fn dilate(&self, kernel: LineKernel, iterations: u32) -> BinaryRaster {
        morphology::dilate(self, kernel, iterations)
    }

    fn combine(&self, other: &BinaryRaster, f: impl Fn(bool, bool) -> bool) -> Result<BinaryRaster> {
        if self.dimensions() != other.dimensions() {
            return Err(Error::DimensionMismatch {
                expected: self.dimensions(),
                found: other.dimensions(),
            });
        }
        let image = GrayImage::from_fn(self.width(), self.height(), |x, y| {
            if f(self.is_set(x, y), other.is_set(x, y)) {
                Luma([FOREGROUND])
            } else {
                Luma([BACKGROUND])
            }
        });
        Ok(BinaryRaster { image })
    }

    /// Clip `rect` to the raster, as half-open `(x0, y0, x1, y1)`.
    fn clip(&self, rect: &PixelRect) -> Option<(u32, u32, u32, u32)> {
        let x0 = rect.x.max(0) as i64;
        let y0 = rect.y.max(0) as i64;
        let x1 = (rect.x as i64 + rect.width as i64).min(self.width() as i64);
        let y1 = (rect.y as i64 + rect.height as i64).min(self.height() as i64);
        if x0 >= x1 || y0 >= y1 {
            return None;
        }
        Some((x0 as u32, y0 as u32, x1 as u32, y1 as u32))
    }
}

fn ensure_not_empty(gray: &GrayImage) -> Result<()> {
    if gray.width() == 0 || gray.height() == 0 {
        return Err(Error::InvalidRaster(format!(
            "image has no pixels ({}x{})",
            gray.width(),
            gray.height()
        )));
    }
    Ok(())
}
