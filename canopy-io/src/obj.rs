//! OBJ format support
//!
//! Each OBJ object (`o` statement) becomes one sub-mesh of the [`Model`].
//! Only vertices referenced by an object's faces belong to it, re-indexed
//! from zero, and polygons are fan-triangulated.

use crate::error::{open, IoError};
use canopy_core::{Model, Point3f, Result, TriangleMesh};
use ::obj::{ObjData, SimplePolygon};
use std::collections::HashMap;
use std::io::{BufReader, Read};
use std::path::Path;

pub struct ObjReader;

impl ObjReader {
    /// Read a model from an OBJ file
    pub fn read_model<P: AsRef<Path>>(path: P) -> Result<Model> {
        let path = path.as_ref();
        let file = open(path)?;
        let model = Self::read_model_from(BufReader::new(file))?;
        log::info!(
            "loaded {}: {} sub-meshes, {} vertices",
            path.display(),
            model.mesh_count(),
            model.vertex_count()
        );
        Ok(model)
    }

    /// Read a model from OBJ text
    pub fn read_model_from<R: Read>(input: R) -> Result<Model> {
        let data = ObjData::load_buf(input).map_err(|e| IoError::ParseError {
            message: e.to_string(),
        })?;
        convert(&data)
    }
}

fn convert(data: &ObjData) -> Result<Model> {
    let mut meshes = Vec::with_capacity(data.objects.len());

    for object in &data.objects {
        let mut mesh = TriangleMesh::new().with_name(object.name.clone());
        let mut remap: HashMap<usize, usize> = HashMap::new();

        let polys = object.groups.iter().flat_map(|g| g.polys.iter());
        for SimplePolygon(corners) in polys {
            let mut local = Vec::with_capacity(corners.len());
            for corner in corners {
                let global = corner.0;
                let index = match remap.get(&global) {
                    Some(&index) => index,
                    None => {
                        let [x, y, z] = *data.position.get(global).ok_or_else(|| {
                            IoError::ParseError {
                                message: format!("vertex index {} out of range", global + 1),
                            }
                        })?;
                        let index = mesh.add_vertex(Point3f::new(x, y, z));
                        remap.insert(global, index);
                        index
                    }
                };
                local.push(index);
            }

            // Fan triangulation; lines and points contribute vertices only
            for i in 1..local.len().saturating_sub(1) {
                mesh.add_face([local[0], local[i], local[i + 1]]);
            }
        }

        meshes.push(mesh);
    }

    Ok(Model::new(meshes))
}
