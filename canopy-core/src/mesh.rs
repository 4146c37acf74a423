//! Mesh data structures and functionality

use crate::point::*;

/// A triangle mesh with vertices and faces
#[derive(Debug, Clone, Default, PartialEq)]
pub struct TriangleMesh {
    pub name: Option<String>,
    pub vertices: Vec<Point3f>,
    pub faces: Vec<[usize; 3]>,
}

impl TriangleMesh {
    /// Create a new empty mesh
    pub fn new() -> Self {
        Self::default()
    }

    /// Create a mesh from vertices and faces
    pub fn from_vertices_and_faces(vertices: Vec<Point3f>, faces: Vec<[usize; 3]>) -> Self {
        Self {
            name: None,
            vertices,
            faces,
        }
    }

    pub fn with_name(mut self, name: impl Into<String>) -> Self {
        self.name = Some(name.into());
        self
    }

    /// Get the number of vertices
    pub fn vertex_count(&self) -> usize {
        self.vertices.len()
    }

    /// Get the number of faces
    pub fn face_count(&self) -> usize {
        self.faces.len()
    }

    /// Check if the mesh has no vertices. Faces are not required: a vertex-only
    /// mesh is still usable as a point source.
    pub fn is_empty(&self) -> bool {
        self.vertices.is_empty()
    }

    /// Add a vertex to the mesh
    pub fn add_vertex(&mut self, vertex: Point3f) -> usize {
        let index = self.vertices.len();
        self.vertices.push(vertex);
        index
    }

    /// Add a face to the mesh
    pub fn add_face(&mut self, face: [usize; 3]) {
        self.faces.push(face);
    }

    /// Clear the mesh
    pub fn clear(&mut self) {
        self.vertices.clear();
        self.faces.clear();
    }
}

/// A loaded model: one triangle mesh per sub-mesh (object) of the asset
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Model {
    pub meshes: Vec<TriangleMesh>,
}

impl Model {
    pub fn new(meshes: Vec<TriangleMesh>) -> Self {
        Self { meshes }
    }

    /// Number of sub-meshes
    pub fn mesh_count(&self) -> usize {
        self.meshes.len()
    }

    /// The first sub-mesh, which is the one used as the tree source
    pub fn primary(&self) -> Option<&TriangleMesh> {
        self.meshes.first()
    }

    /// A model is degenerate when it has no sub-meshes or its primary sub-mesh has no vertices
    pub fn is_degenerate(&self) -> bool {
        self.primary().map_or(true, TriangleMesh::is_empty)
    }

    pub fn vertex_count(&self) -> usize {
        self.meshes.iter().map(TriangleMesh::vertex_count).sum()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn triangle() -> TriangleMesh {
        let mut mesh = TriangleMesh::new();
        let a = mesh.add_vertex(Point3f::new(0.0, 0.0, 0.0));
        let b = mesh.add_vertex(Point3f::new(1.0, 0.0, 0.0));
        let c = mesh.add_vertex(Point3f::new(0.5, 1.0, 0.0));
        mesh.add_face([a, b, c]);
        mesh
    }

    #[test]
    fn test_mesh_counts() {
        let mesh = triangle();
        assert_eq!(mesh.vertex_count(), 3);
        assert_eq!(mesh.face_count(), 1);
        assert!(!mesh.is_empty());
    }

    #[test]
    fn test_model_degenerate() {
        assert!(Model::default().is_degenerate());
        assert!(Model::new(vec![TriangleMesh::new()]).is_degenerate());

        let model = Model::new(vec![triangle().with_name("tree"), TriangleMesh::new()]);
        assert!(!model.is_degenerate());
        assert_eq!(model.primary().and_then(|m| m.name.as_deref()), Some("tree"));
        assert_eq!(model.vertex_count(), 3);
    }
}
