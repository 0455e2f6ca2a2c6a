use crate::display::DisplaySink;
use crate::distributions::sample_hemisphere;
use crate::geometry::{lerp, Fp, Hit, Ray, Vec3f};
use crate::scene::{ChessScene, SurfaceHit};
use rand::{Rng, RngCore, SeedableRng};
use rand_xoshiro::{Xoshiro256Plus, Xoshiro256PlusPlus};
use rayon::prelude::*;
use std::time::Instant;

pub type PixelRng = Xoshiro256Plus;

pub const MAX_DEPTH: u32 = 3;
pub const SHADOW_BIAS: Fp = 1e-5;

const PAWN_ALBEDO: Vec3f = Vec3f::new(0.8, 0.8, 0.8);
const FLOOR_BLUE: Fp = 0.8;
const SKY_LOW: Vec3f = Vec3f::new(1.0, 1.0, 1.0);
const SKY_HIGH: Vec3f = Vec3f::new(0.5, 0.7, 1.0);
const UP: Vec3f = Vec3f::new(0.0, 1.0, 0.0);

/// Lifecycle calls made by the presentation shell.
pub trait RenderEngine {
    fn init(&mut self);
    fn cleanup(&mut self);
    fn resize(&mut self, width: usize, height: usize);
    fn render(&mut self, sink: &mut dyn DisplaySink, width: usize, height: usize);
}

#[derive(Clone, Debug)]
pub struct Camera {
    pub origin: Vec3f,
    pub forward: Vec3f,
    pub right: Vec3f,
    pub up: Vec3f,
}

impl Default for Camera {
    fn default() -> Self {
        Camera {
            origin: Vec3f::new(0.0, 1.0, 2.0),
            forward: Vec3f::new(0.0, 0.0, -1.0),
            right: Vec3f::new(1.0, 0.0, 0.0),
            up: UP,
        }
    }
}

impl Camera {
    pub fn looking_down(origin: Vec3f) -> Camera {
        Camera {
            origin,
            forward: Vec3f::new(0.0, -1.0, 0.0),
            right: Vec3f::new(1.0, 0.0, 0.0),
            up: Vec3f::new(0.0, 0.0, -1.0),
        }
    }

    pub fn primary_ray(&self, x: usize, y: usize, width: usize, height: usize) -> Ray {
        let aspect = width as Fp / height as Fp;
        let u = (x as Fp + 0.5) / width as Fp;
        let v = (y as Fp + 0.5) / height as Fp;
        let dx = (u * 2.0 - 1.0) * aspect;
        let dy = v * 2.0 - 1.0;
        let direction = self.right * dx + self.up * dy + self.forward;
        Ray::new(self.origin, direction.normalize())
    }
}

pub fn trace<R: Rng + ?Sized>(scene: &ChessScene, ray: &Ray, rng: &mut R, depth: u32) -> Vec3f {
    if depth >= MAX_DEPTH {
        return Vec3f::zeros();
    }
    match scene.closest_surface(ray) {
        Some(SurfaceHit::Pawn(hit)) => shade_pawn_hit(scene, ray, &hit, rng, depth),
        Some(SurfaceHit::Floor(hit)) => shade_floor_hit(scene, ray, &hit, rng, depth),
        None => on_miss(ray),
    }
}

// The bounce starts slightly in front of the surface to avoid self-hits.
fn biased_hit_position(ray: &Ray, hit: &Hit) -> Vec3f {
    ray.at(hit.distance - SHADOW_BIAS)
}

fn shade_pawn_hit<R: Rng + ?Sized>(
    scene: &ChessScene,
    ray: &Ray,
    hit: &Hit,
    rng: &mut R,
    depth: u32,
) -> Vec3f {
    let hit_pos = biased_hit_position(ray, hit);
    let normal = -scene.pawn().triangles[hit.primitive_index].n;
    let second_ray = Ray::new(hit_pos, sample_hemisphere(&normal, rng));
    PAWN_ALBEDO.component_mul(&trace(scene, &second_ray, rng, depth + 1))
}

fn shade_floor_hit<R: Rng + ?Sized>(
    scene: &ChessScene,
    ray: &Ray,
    hit: &Hit,
    rng: &mut R,
    depth: u32,
) -> Vec3f {
    let hit_pos = biased_hit_position(ray, hit);
    let (u, v) = checker(&hit_pos);
    let second_ray = Ray::new(hit_pos, sample_hemisphere(&UP, rng));
    Vec3f::new(u, v, FLOOR_BLUE).component_mul(&trace(scene, &second_ray, rng, depth + 1))
}

/// Two-tone checker weights, each 0 or 1, with eight cells across the floor.
pub fn checker(hit_pos: &Vec3f) -> (Fp, Fp) {
    let cell = |coord: Fp| (((coord + 1.0) * 4.0).floor() as i64).rem_euclid(2) as Fp;
    (cell(hit_pos.x), cell(hit_pos.z))
}

pub fn on_miss(ray: &Ray) -> Vec3f {
    let alpha = (ray.direction.dot(&UP) + 1.0) * 0.5;
    lerp(&SKY_LOW, &SKY_HIGH, alpha)
}

/// Seeds one generator per pixel, in row-major order, from a single generator
/// seeded with the pixel count.
pub fn seed_pixel_rngs(width: usize, height: usize) -> Vec<PixelRng> {
    let pixel_count = width * height;
    let mut seed_rng = Xoshiro256PlusPlus::seed_from_u64(pixel_count as u64);
    (0..pixel_count)
        .map(|_| PixelRng::seed_from_u64(seed_rng.next_u64()))
        .collect()
}

pub struct PathTracer {
    scene: ChessScene,
    camera: Camera,
    rngs: Vec<PixelRng>,
    width: usize,
    height: usize,
}

impl PathTracer {
    pub fn new(scene: ChessScene) -> PathTracer {
        PathTracer::with_camera(scene, Camera::default())
    }

    pub fn with_camera(scene: ChessScene, camera: Camera) -> PathTracer {
        PathTracer {
            scene,
            camera,
            rngs: vec![],
            width: 0,
            height: 0,
        }
    }

    pub fn scene(&self) -> &ChessScene {
        &self.scene
    }

    pub fn pixel_rngs(&self) -> &[PixelRng] {
        &self.rngs
    }

    /// Traces one sample per pixel and returns a row-major RGB buffer, three
    /// floats per pixel, unclamped.
    pub fn render_frame(&mut self, width: usize, height: usize) -> Vec<Fp> {
        if width != self.width || height != self.height || self.rngs.len() != width * height {
            log::debug!("render at {}x{} without matching resize", width, height);
            self.resize(width, height);
        }
        let mut rgb = vec![0.0; width * height * 3];
        let scene = &self.scene;
        let camera = &self.camera;
        rgb.par_chunks_mut(3)
            .zip(self.rngs.par_iter_mut())
            .enumerate()
            .for_each(|(i, (pixel, rng))| {
                let x = i % width;
                let y = i / width;
                let ray = camera.primary_ray(x, y, width, height);
                let color = trace(scene, &ray, rng, 0);
                pixel.copy_from_slice(color.as_slice());
            });
        rgb
    }
}

impl RenderEngine for PathTracer {
    fn init(&mut self) {}

    fn cleanup(&mut self) {}

    fn resize(&mut self, width: usize, height: usize) {
        self.rngs = seed_pixel_rngs(width, height);
        self.width = width;
        self.height = height;
    }

    fn render(&mut self, sink: &mut dyn DisplaySink, width: usize, height: usize) {
        let start = Instant::now();
        let rgb = self.render_frame(width, height);
        log::debug!("traced {}x{} in {:?}", width, height, start.elapsed());
        if let Err(err) = sink.present(&rgb, width, height) {
            log::warn!("display sink rejected frame: {}", err);
        }
    }
}
