//! Error types for scene construction.

use thiserror::Error;

/// Problems found when validating mesh data.
#[derive(Error, Debug, Clone, PartialEq)]
pub enum MeshError {
    #[error("Mesh has no triangles")]
    Empty,

    #[error("Triangle {triangle} references vertex {index}, but the mesh has {vertex_count} vertices")]
    IndexOutOfRange {
        triangle: usize,
        index: u32,
        vertex_count: usize,
    },

    #[error("Vertex {0} has a non-finite position")]
    NonFinitePosition(usize),

    #[error("Normal count ({normals}) doesn't match vertex count ({vertices})")]
    NormalCountMismatch { normals: usize, vertices: usize },
}

/// Errors raised while assembling a [`crate::Scene`].
#[derive(Error, Debug, Clone, PartialEq)]
pub enum SceneError {
    #[error("Invalid mesh: {0}")]
    Mesh(#[from] MeshError),

    #[error("Invalid mesh index: {0}")]
    InvalidMesh(usize),

    #[error("Invalid material index: {0}")]
    InvalidMaterial(usize),
}

/// Result type for scene operations.
pub type SceneResult<T> = Result<T, SceneError>;
