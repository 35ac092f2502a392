use crate::error::{ReportError, Result};

/// Held-out examples the streamer draws its prediction grid from.
///
/// Each image is `width * height` pixels, row-major, normalized to `[0, 1]`.
#[derive(Debug, Clone)]
pub struct EvalSet {
    width: u32,
    height: u32,
    images: Vec<Vec<f32>>,
}

impl EvalSet {
    pub fn new(width: u32, height: u32, images: Vec<Vec<f32>>) -> Result<Self> {
        let n_pixels = (width as usize) * (height as usize);
        if n_pixels == 0 {
            return Err(ReportError::contract("evaluation images must have a non-zero size"));
        }
        if let Some((i, img)) = images.iter().enumerate().find(|(_, img)| img.len() != n_pixels) {
            return Err(ReportError::contract(format!(
                "evaluation image {} has {} pixels, expected {}x{}={}",
                i, img.len(), width, height, n_pixels
            )));
        }
        Ok(EvalSet { width, height, images })
    }

    pub fn width(&self) -> u32 {
        self.width
    }

    pub fn height(&self) -> u32 {
        self.height
    }

    pub fn len(&self) -> usize {
        self.images.len()
    }

    pub fn is_empty(&self) -> bool {
        self.images.is_empty()
    }

    pub fn get(&self, index: usize) -> Option<&[f32]> {
        self.images.get(index).map(Vec::as_slice)
    }
}
