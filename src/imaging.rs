//! Image loading and preprocessing.
use std::path::Path;

use image::imageops::FilterType;
use image::DynamicImage;

use crate::error::Error;

const IMAGENET_MEAN: [f32; 3] = [0.485, 0.456, 0.406];
const IMAGENET_STD: [f32; 3] = [0.229, 0.224, 0.225];

/// Open and decode an image.
pub fn open_image(path: &Path) -> Result<DynamicImage, Error> {
    Ok(image::open(path)?)
}

/// Resize, center crop and normalize an image into a CHW buffer.
///
/// Defaults: shorter side resized to 256, 224x224 crop, ImageNet mean/std.
#[derive(Debug, Clone, PartialEq)]
pub struct ImageTransform {
    resize: u32,
    crop: u32,
    mean: [f32; 3],
    std: [f32; 3],
}

impl Default for ImageTransform {
    fn default() -> Self {
        Self {
            resize: 256,
            crop: 224,
            mean: IMAGENET_MEAN,
            std: IMAGENET_STD,
        }
    }
}

impl ImageTransform {
    pub fn new(resize: u32, crop: u32) -> Self {
        Self {
            resize,
            crop,
            ..Default::default()
        }
    }

    /// Side length of the output.
    pub fn crop(&self) -> u32 {
        self.crop
    }

    pub fn apply(&self, img: &DynamicImage) -> Vec<f32> {
        // shorter side to `resize`, keeping the aspect ratio
        let (w, h) = (img.width().max(1) as u64, img.height().max(1) as u64);
        let resize = self.resize as u64;
        let (nw, nh) = if w <= h {
            (resize, (h * resize / w).max(1))
        } else {
            ((w * resize / h).max(1), resize)
        };
        let resized = img.resize_exact(nw as u32, nh as u32, FilterType::Triangle);

        let cw = self.crop.min(resized.width());
        let ch = self.crop.min(resized.height());
        let x = (resized.width() - cw) / 2;
        let y = (resized.height() - ch) / 2;
        let rgb = resized.crop_imm(x, y, cw, ch).to_rgb8();

        let (cw, ch) = (cw as usize, ch as usize);
        let mut pixels = vec![0.0f32; 3 * cw * ch];
        for (px, py, pixel) in rgb.enumerate_pixels() {
            let (px, py) = (px as usize, py as usize);
            for c in 0..3 {
                let val = pixel[c] as f32 / 255.0;
                pixels[c * cw * ch + py * cw + px] = (val - self.mean[c]) / self.std[c];
            }
        }
        pixels
    }
}
