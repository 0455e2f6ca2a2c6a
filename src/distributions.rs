use crate::geometry::Vec3f;
use rand::Rng;
use rand_distr::{Distribution, Uniform};

pub const HEMISPHERE_ATTEMPTS: usize = 64;

/// Rejection-samples a direction on the side of `normal`. Candidates are drawn
/// from the positive unit cube; the first one inside the unit sphere and not
/// facing away from `normal` is returned normalized. After
/// `HEMISPHERE_ATTEMPTS` rejections `normal` itself is returned.
pub fn sample_hemisphere<R: Rng + ?Sized>(normal: &Vec3f, rng: &mut R) -> Vec3f {
    try_sample_hemisphere(normal, rng).unwrap_or(*normal)
}

pub fn try_sample_hemisphere<R: Rng + ?Sized>(normal: &Vec3f, rng: &mut R) -> Option<Vec3f> {
    let dist = Uniform::new(0.0f32, 1.0);
    for _ in 0..HEMISPHERE_ATTEMPTS {
        let v = Vec3f::new(dist.sample(rng), dist.sample(rng), dist.sample(rng));
        if v.dot(&v) <= 1.0 && v.dot(normal) >= 0.0 {
            if let Some(direction) = v.try_normalize(0.0) {
                return Some(direction);
            }
        }
    }
    None
}
