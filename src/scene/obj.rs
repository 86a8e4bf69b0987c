use std::{fs, path::Path};

use thiserror::Error;
use tracing::{debug, warn};

use crate::geometry::{Triangle, WorldPoint, WorldTriangle};

#[derive(Debug, Error)]
pub enum ObjOpenError {
    #[error("Failed to read file: {0}")]
    ReadError(#[from] std::io::Error),

    #[error("Failed to parse file: {0}")]
    ParseError(#[from] wavefront_obj::ParseError),
}

/// Reads triangles of all objects in a Wavefront OBJ file.
pub fn load_obj(path: impl AsRef<Path>) -> Result<Vec<WorldTriangle>, ObjOpenError> {
    let path = path.as_ref();
    let content = fs::read_to_string(path)?;
    debug!(path = %path.display(), "Loading OBJ");
    parse_obj(content)
}

/// Parses triangles out of OBJ source. Only positions are used, points and lines
/// are skipped.
pub fn parse_obj(content: impl Into<String>) -> Result<Vec<WorldTriangle>, ObjOpenError> {
    let parsed = wavefront_obj::obj::parse(content.into())?;

    let mut triangles = Vec::new();
    let mut skipped = 0usize;

    for o in parsed.objects.iter() {
        let position = |index: usize| {
            let v = &o.vertices[index];
            WorldPoint::new(v.x as f32, v.y as f32, v.z as f32)
        };

        for geometry in o.geometry.iter() {
            for shape in geometry.shapes.iter() {
                let wavefront_obj::obj::Primitive::Triangle(a, b, c) = shape.primitive else {
                    skipped += 1;
                    continue;
                };

                triangles.push(Triangle::new(position(a.0), position(b.0), position(c.0)));
            }
        }
    }

    if skipped > 0 {
        warn!(skipped, "Ignoring non-triangle primitives");
    }

    Ok(triangles)
}
