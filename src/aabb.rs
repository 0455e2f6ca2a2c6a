use crate::geometry::{Fp, Ray, Triangle, Vec3f, FP_INF, FP_NEG_INF};

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Aabb {
    pub min: Vec3f,
    pub max: Vec3f,
}

impl Default for Aabb {
    fn default() -> Self {
        Aabb {
            min: Vec3f::new(FP_INF, FP_INF, FP_INF),
            max: Vec3f::new(FP_NEG_INF, FP_NEG_INF, FP_NEG_INF),
        }
    }
}

impl Aabb {
    pub fn extend_point(&self, point: &Vec3f) -> Aabb {
        Aabb {
            min: self.min.inf(point),
            max: self.max.sup(point),
        }
    }

    pub fn extend_aabb(&self, aabb: &Aabb) -> Aabb {
        Aabb {
            min: self.min.inf(&aabb.min),
            max: self.max.sup(&aabb.max),
        }
    }

    pub fn is_empty(&self) -> bool {
        (0..3).any(|axis| self.min[axis] > self.max[axis])
    }

    pub fn diagonal(&self) -> Vec3f {
        self.max - self.min
    }

    /// Half of the surface area. Only ratios matter for the SAH, so the factor
    /// of two is dropped.
    pub fn half_area(&self) -> Fp {
        if self.is_empty() {
            return 0.0;
        }
        let diff = self.diagonal();
        let x = diff.x;
        let y = diff.y;
        let z = diff.z;
        x * y + y * z + z * x
    }

    pub fn contains(&self, aabb: &Aabb) -> bool {
        for coord in 0..3 {
            if aabb.min[coord] < self.min[coord] {
                return false;
            }
            if aabb.max[coord] > self.max[coord] {
                return false;
            }
        }
        true
    }

    /// Slab test clipped to the ray's parametric range. Returns the entry and
    /// exit distances when the box is hit.
    pub fn intersect_ray(&self, ray: &Ray, inv_dir: &Vec3f) -> Option<(Fp, Fp)> {
        let mut t_entry = ray.t_min;
        let mut t_exit = ray.t_max;
        for axis in 0..3 {
            let t0 = (self.min[axis] - ray.origin[axis]) * inv_dir[axis];
            let t1 = (self.max[axis] - ray.origin[axis]) * inv_dir[axis];
            // f32::max/min drop NaNs produced by 0 * inf for axis-parallel rays
            t_entry = t_entry.max(t0.min(t1));
            t_exit = t_exit.min(t0.max(t1));
        }
        if t_entry <= t_exit {
            Some((t_entry, t_exit))
        } else {
            None
        }
    }
}

// Padded so that flat triangles get a non-degenerate box and edge hits are not
// lost to rounding in the slab test.
const TRIANGLE_PAD: Fp = 1e-5;

pub fn calculate_aabb_for_triangle(triangle: &Triangle) -> Aabb {
    let eps_vec = Vec3f::new(TRIANGLE_PAD, TRIANGLE_PAD, TRIANGLE_PAD);
    Aabb {
        min: triangle.a.inf(&triangle.b).inf(&triangle.c) - eps_vec,
        max: triangle.a.sup(&triangle.b).sup(&triangle.c) + eps_vec,
    }
}

pub fn compute_bounding_boxes_and_centers(triangles: &[Triangle]) -> (Vec<Aabb>, Vec<Vec3f>) {
    triangles
        .iter()
        .map(|triangle| (calculate_aabb_for_triangle(triangle), triangle.centroid()))
        .unzip()
}

pub fn compute_bounding_boxes_union(boxes: &[Aabb]) -> Aabb {
    boxes
        .iter()
        .fold(Aabb::default(), |acc, aabb| acc.extend_aabb(aabb))
}
