use crate::geometry::{transform_point, Fp, Mat4f, Vec3f};
use std::fs;
use std::path::Path;
use thiserror::Error;

#[derive(Debug, Error)]
pub enum ObjError {
    #[error("failed to read mesh file: {0}")]
    Io(#[from] std::io::Error),
    #[error("line {line}: invalid number")]
    InvalidNumber { line: usize },
    #[error("line {line}: invalid vertex reference")]
    InvalidIndex { line: usize },
    #[error("line {line}: vertex index {index} is out of range")]
    IndexOutOfRange { line: usize, index: i64 },
    #[error("line {line}: face has fewer than three vertices")]
    DegenerateFace { line: usize },
}

/// Vertex positions and triangle indices read from a Wavefront OBJ file.
/// Polygons are fan-triangulated, so `indices.len()` is a multiple of three.
#[derive(Clone, Debug, Default)]
pub struct ObjData {
    pub positions: Vec<Vec3f>,
    pub indices: Vec<usize>,
}

impl ObjData {
    pub fn triangle_count(&self) -> usize {
        self.indices.len() / 3
    }

    pub fn triangles<'a>(
        &'a self,
        transform: &'a Mat4f,
    ) -> impl Iterator<Item = [Vec3f; 3]> + 'a {
        self.indices.chunks_exact(3).map(move |face| {
            [
                transform_point(transform, &self.positions[face[0]]),
                transform_point(transform, &self.positions[face[1]]),
                transform_point(transform, &self.positions[face[2]]),
            ]
        })
    }
}

pub fn read_obj(path: impl AsRef<Path>) -> Result<ObjData, ObjError> {
    let content = fs::read_to_string(path)?;
    parse_obj(&content)
}

pub fn parse_obj(content: &str) -> Result<ObjData, ObjError> {
    let mut result = ObjData::default();
    for (line_index, line) in content.lines().enumerate() {
        let line_number = line_index + 1;
        let line = match line.find('#') {
            Some(comment) => &line[..comment],
            None => line,
        };
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some("v") => {
                let mut coords = [0.0 as Fp; 3];
                for coord in coords.iter_mut() {
                    *coord = tokens
                        .next()
                        .and_then(|token| token.parse().ok())
                        .ok_or(ObjError::InvalidNumber { line: line_number })?;
                }
                result
                    .positions
                    .push(Vec3f::new(coords[0], coords[1], coords[2]));
            }
            Some("f") => {
                let face = tokens
                    .map(|token| resolve_index(token, result.positions.len(), line_number))
                    .collect::<Result<Vec<_>, _>>()?;
                if face.len() < 3 {
                    return Err(ObjError::DegenerateFace { line: line_number });
                }
                for i in 1..face.len() - 1 {
                    result.indices.extend([face[0], face[i], face[i + 1]]);
                }
            }
            // texture coordinates, normals, groups, materials and the rest
            _ => {}
        }
    }
    Ok(result)
}

// `token` is one of `i`, `i/t`, `i//n` or `i/t/n`; only the position index is
// used. Negative indices count back from the most recent vertex.
fn resolve_index(token: &str, vertex_count: usize, line: usize) -> Result<usize, ObjError> {
    let position = token.split('/').next().unwrap_or_default();
    let index: i64 = position
        .parse()
        .map_err(|_| ObjError::InvalidIndex { line })?;
    let resolved = match index {
        0 => return Err(ObjError::InvalidIndex { line }),
        i if i > 0 => i - 1,
        i => vertex_count as i64 + i,
    };
    if resolved < 0 || resolved >= vertex_count as i64 {
        return Err(ObjError::IndexOutOfRange { line, index });
    }
    Ok(resolved as usize)
}
