use nalgebra::{Matrix4, Point3, Vector3};

pub type Fp = f32;
pub type Vec3f = Vector3<Fp>;
pub type Point3f = Point3<Fp>;
pub type Mat4f = Matrix4<Fp>;

pub static FP_INF: Fp = Fp::INFINITY;
pub static FP_NEG_INF: Fp = Fp::NEG_INFINITY;

// determinant threshold below which a ray is treated as parallel to a triangle
pub static EPS: Fp = 1e-8;

#[derive(Clone, Debug)]
pub struct Ray {
    pub origin: Vec3f,
    pub direction: Vec3f,
    pub t_min: Fp,
    pub t_max: Fp,
}

impl Ray {
    pub fn new(origin: Vec3f, direction: Vec3f) -> Ray {
        Ray {
            origin,
            direction,
            t_min: 0.0,
            t_max: FP_INF,
        }
    }

    pub fn at(&self, t: Fp) -> Vec3f {
        self.origin + self.direction * t
    }

    pub fn inverse_direction(&self) -> Vec3f {
        self.direction.map(|d| 1.0 / d)
    }
}

/// Closest-hit record: distance along the ray and the index of the triangle in
/// its mesh's (BVH-ordered) triangle array.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Hit {
    pub distance: Fp,
    pub primitive_index: usize,
    pub u: Fp,
    pub v: Fp,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Triangle {
    pub a: Vec3f,
    pub b: Vec3f,
    pub c: Vec3f,
    pub n: Vec3f,
}

impl Triangle {
    /// The stored normal is `cross(a - b, c - a)`, which points inward for
    /// counter-clockwise winding. Shading flips it.
    pub fn new(a: Vec3f, b: Vec3f, c: Vec3f) -> Triangle {
        let n = (a - b).cross(&(c - a));
        let n = n.try_normalize(0.0).unwrap_or_else(Vec3f::zeros);
        Triangle { a, b, c, n }
    }

    pub fn centroid(&self) -> Vec3f {
        (self.a + self.b + self.c) / 3.0
    }

    // Moller-Trumbore. Returns (t, u, v) with t inside the ray's open range.
    pub fn intersect(&self, ray: &Ray) -> Option<(Fp, Fp, Fp)> {
        let e1 = self.b - self.a;
        let e2 = self.c - self.a;
        let p = ray.direction.cross(&e2);
        let det = e1.dot(&p);
        if det.abs() < EPS {
            return None;
        }
        let inv_det = 1.0 / det;
        let s = ray.origin - self.a;
        let u = s.dot(&p) * inv_det;
        if !(0.0..=1.0).contains(&u) {
            return None;
        }
        let q = s.cross(&e1);
        let v = ray.direction.dot(&q) * inv_det;
        if v < 0.0 || u + v > 1.0 {
            return None;
        }
        let t = e2.dot(&q) * inv_det;
        if t > ray.t_min && t < ray.t_max {
            Some((t, u, v))
        } else {
            None
        }
    }
}

pub fn transform_point(transform: &Mat4f, point: &Vec3f) -> Vec3f {
    transform.transform_point(&Point3f::from(*point)).coords
}

pub fn lerp(a: &Vec3f, b: &Vec3f, alpha: Fp) -> Vec3f {
    a + (b - a) * alpha
}
