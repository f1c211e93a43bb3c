use ahash::AHashMap;
use parking_lot::Mutex;
use std::sync::Arc;
use trellis_core::{CornerMask, Corners};

const SUBSAMPLES: u32 = 4;

/// Host-scoped cache of rasterized corner masks. Masks only depend on radius
/// and corner set, so every wrapper with the same shape shares one.
#[derive(Debug, Default)]
pub struct RoundedCornerMaskCache {
    masks: Mutex<AHashMap<(u32, Corners), Arc<CornerMask>>>,
}

impl RoundedCornerMaskCache {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn mask(&self, radius_px: u32, corners: Corners) -> Arc<CornerMask> {
        self.masks
            .lock()
            .entry((radius_px, corners))
            .or_insert_with(|| {
                log::debug!("rasterizing corner mask r={radius_px} {corners:?}");
                Arc::new(CornerMask {
                    radius_px,
                    corners,
                    alpha: rasterize_quadrant(radius_px),
                })
            })
            .clone()
    }

    pub fn len(&self) -> usize {
        self.masks.lock().len()
    }

    pub fn is_empty(&self) -> bool {
        self.masks.lock().is_empty()
    }

    pub fn purge(&self) {
        self.masks.lock().clear();
    }
}

/// Coverage of the top-left corner square, row-major. 255 is inside the
/// rounded shape, 0 is cut away.
fn rasterize_quadrant(radius: u32) -> Vec<u8> {
    let r = radius as f32;
    let n = SUBSAMPLES * SUBSAMPLES;
    let mut alpha = Vec::with_capacity((radius * radius) as usize);
    for y in 0..radius {
        for x in 0..radius {
            let mut inside = 0;
            for sy in 0..SUBSAMPLES {
                for sx in 0..SUBSAMPLES {
                    let px = x as f32 + (sx as f32 + 0.5) / SUBSAMPLES as f32;
                    let py = y as f32 + (sy as f32 + 0.5) / SUBSAMPLES as f32;
                    let dx = r - px;
                    let dy = r - py;
                    if dx * dx + dy * dy <= r * r {
                        inside += 1;
                    }
                }
            }
            alpha.push((inside * 255 / n) as u8);
        }
    }
    alpha
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_masks_are_shared_per_shape() {
        let cache = RoundedCornerMaskCache::new();
        let a = cache.mask(8, Corners::ALL);
        let b = cache.mask(8, Corners::ALL);
        let c = cache.mask(8, Corners::TOP_START);
        assert!(Arc::ptr_eq(&a, &b));
        assert!(!Arc::ptr_eq(&a, &c));
        assert_eq!(cache.len(), 2);

        cache.purge();
        assert!(cache.is_empty());
    }

    #[test]
    fn test_quadrant_coverage() {
        let alpha = rasterize_quadrant(10);
        assert_eq!(alpha.len(), 100);
        // outer corner pixel is cut, inner one is solid
        assert_eq!(alpha[0], 0);
        assert_eq!(alpha[99], 255);
    }
}
