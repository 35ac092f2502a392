use image::{GrayImage, Luma};
use rand::Rng;

use crate::error::{ReportError, Result};

/// Draws `amount` distinct indices from `0..population`, uniformly and
/// without replacement. `amount == population` is allowed.
pub fn sample_indices<R: Rng + ?Sized>(rng: &mut R, population: usize, amount: usize) -> Result<Vec<usize>> {
    if amount > population {
        return Err(ReportError::EvalSetTooSmall { required: amount, available: population });
    }
    Ok(rand::seq::index::sample(rng, population, amount).into_vec())
}

/// Builds a display tile from normalized pixels, inverted (`1 - v`) so ink
/// shows dark on a light background.
///
/// Values outside `[0, 1]` are clamped; missing pixels render white.
pub fn inverted_tile(pixels: &[f32], width: u32, height: u32) -> GrayImage {
    GrayImage::from_fn(width, height, |x, y| {
        let v = pixels
            .get((y * width + x) as usize)
            .copied()
            .unwrap_or(0.0)
            .clamp(0.0, 1.0);
        Luma([((1.0 - v) * 255.0).round() as u8])
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use rand::rngs::StdRng;
    use rand::SeedableRng;
    use std::collections::HashSet;

    #[test]
    fn indices_are_distinct_and_in_range() {
        let mut rng = StdRng::seed_from_u64(7);
        let picked = sample_indices(&mut rng, 1_000, 36).unwrap();
        assert_eq!(picked.len(), 36);
        assert_eq!(picked.iter().collect::<HashSet<_>>().len(), 36);
        assert!(picked.iter().all(|&i| i < 1_000));
    }

    #[test]
    fn population_equal_to_amount_takes_everything() {
        let mut rng = StdRng::seed_from_u64(1);
        let mut picked = sample_indices(&mut rng, 36, 36).unwrap();
        picked.sort_unstable();
        assert_eq!(picked, (0..36).collect::<Vec<_>>());
    }

    #[test]
    fn too_small_population_is_an_error() {
        let mut rng = StdRng::seed_from_u64(1);
        assert!(matches!(
            sample_indices(&mut rng, 35, 36),
            Err(ReportError::EvalSetTooSmall { required: 36, available: 35 })
        ));
    }

    #[test]
    fn tiles_are_inverted() {
        let tile = inverted_tile(&[0.0, 1.0, 0.5, 2.0], 2, 2);
        assert_eq!(tile.get_pixel(0, 0).0[0], 255);
        assert_eq!(tile.get_pixel(1, 0).0[0], 0);
        assert_eq!(tile.get_pixel(0, 1).0[0], 128);
        assert_eq!(tile.get_pixel(1, 1).0[0], 0);
    }
}
