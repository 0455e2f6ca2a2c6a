use crate::geometry::{Fp, Hit, Mat4f, Ray, Vec3f};
use crate::mesh::Mesh;
use crate::obj::read_obj;
use std::path::Path;

pub const PAWN_PATH: &str = concat!(env!("CARGO_MANIFEST_DIR"), "/assets/pawn.obj");
pub const PAWN_SCALE: Fp = 0.25;

/// Which of the two meshes a ray hit. Carries the hit within that mesh.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum SurfaceHit {
    Pawn(Hit),
    Floor(Hit),
}

/// A checkerboard floor and a single pawn, each with its own BVH. Built once,
/// then shared read-only by every pixel task.
#[derive(Debug, Default)]
pub struct ChessScene {
    floor: Mesh,
    pawn: Mesh,
}

impl ChessScene {
    pub fn new() -> ChessScene {
        ChessScene::with_pawn_path(PAWN_PATH)
    }

    pub fn with_pawn_path(path: impl AsRef<Path>) -> ChessScene {
        let transform = Mat4f::new_scaling(PAWN_SCALE);
        ChessScene {
            floor: create_floor(),
            pawn: load_mesh(path.as_ref(), &transform),
        }
    }

    pub fn from_meshes(floor: Mesh, pawn: Mesh) -> ChessScene {
        ChessScene { floor, pawn }
    }

    pub fn floor(&self) -> &Mesh {
        &self.floor
    }

    pub fn pawn(&self) -> &Mesh {
        &self.pawn
    }

    /// The pawn wins whenever it is hit at all, even if the floor is nearer
    /// along the same ray.
    pub fn closest_surface(&self, ray: &Ray) -> Option<SurfaceHit> {
        if let Some(hit) = self.pawn.find_closest_hit(ray) {
            return Some(SurfaceHit::Pawn(hit));
        }
        self.floor.find_closest_hit(ray).map(SurfaceHit::Floor)
    }
}

pub fn create_floor() -> Mesh {
    let p00 = Vec3f::new(-1.0, 0.0, -1.0);
    let p01 = Vec3f::new(-1.0, 0.0, 1.0);
    let p10 = Vec3f::new(1.0, 0.0, -1.0);
    let p11 = Vec3f::new(1.0, 0.0, 1.0);

    let mut floor = Mesh::default();
    floor.add_triangle(p00, p10, p11);
    floor.add_triangle(p11, p01, p00);
    floor.commit_bvh();
    floor
}

/// Loads a triangulated OBJ mesh and applies `transform` to every vertex.
/// Unreadable or malformed files give an empty mesh.
pub fn load_mesh(path: &Path, transform: &Mat4f) -> Mesh {
    let mut mesh = Mesh::default();
    let data = match read_obj(path) {
        Ok(data) => data,
        Err(err) => {
            log::warn!("falling back to an empty mesh for {}: {}", path.display(), err);
            return mesh;
        }
    };
    for [a, b, c] in data.triangles(transform) {
        mesh.add_triangle(a, b, c);
    }
    mesh.commit_bvh();
    log::info!(
        "loaded {}: {} triangles, {} BVH nodes, depth {}",
        path.display(),
        mesh.triangles.len(),
        mesh.bvh.nodes.len(),
        mesh.bvh.depth()
    );
    mesh
}
