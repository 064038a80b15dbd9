//! glTF/GLB decoding into an in-memory model description
//!
//! Decoding is all-or-nothing: either the bytes parse into a fully usable
//! [`DecodedModel`] or an error comes back and nothing is instantiated.
//! The decoder resolves the default scene itself and hands out its top-level
//! nodes directly, so callers never have to search for a conventionally
//! named root.

use glam::{Mat4, Vec3};
use thiserror::Error;

#[derive(Error, Debug)]
pub enum DecodeError {
    #[error("empty input")]
    EmptyInput,
    #[error("failed to parse glTF: {0}")]
    Parse(#[from] gltf::Error),
    #[error("malformed model: {0}")]
    MalformedModel(String),
}

/// Decoded scene content, valid only transiently during instantiation.
#[derive(Debug, Clone)]
pub struct DecodedModel {
    /// Scene name from the file, or a generic fallback
    pub name: String,
    /// One entry per top-level node of the default scene
    pub nodes: Vec<ModelNode>,
}

/// A top-level piece of the decoded scene, with its subtree meshes merged in.
#[derive(Debug, Clone)]
pub struct ModelNode {
    pub name: String,
    /// Local translation relative to the container
    pub translation: [f32; 3],
    /// Local rotation quaternion (x, y, z, w)
    pub rotation: [f32; 4],
    /// Local scale
    pub scale: [f32; 3],
    /// Mesh primitives from this node and all of its descendants
    pub meshes: Vec<DecodedMesh>,
    /// Axis-aligned bounds of all mesh vertices, in node-local space
    pub min: [f32; 3],
    pub max: [f32; 3],
}

impl ModelNode {
    /// Whether any mesh geometry contributed to the bounds.
    pub fn has_bounds(&self) -> bool {
        (0..3).all(|i| self.min[i] <= self.max[i])
    }
}

/// One triangle-list primitive, positioned relative to its [`ModelNode`].
#[derive(Debug, Clone)]
pub struct DecodedMesh {
    pub name: String,
    /// Column-major transform relative to the owning node
    pub transform: [[f32; 4]; 4],
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub uvs: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
    /// Linear RGBA base color factor from the primitive's material
    pub base_color: [f32; 4],
}

/// Parse a glTF or GLB byte buffer into a [`DecodedModel`].
///
/// Textual glTF with embedded (base64) buffers is accepted; files that
/// reference external resources fail to resolve and come back as a parse
/// error, which the import workflow treats the same as any other failure.
pub fn decode_model(bytes: &[u8]) -> Result<DecodedModel, DecodeError> {
    if bytes.is_empty() {
        return Err(DecodeError::EmptyInput);
    }

    let (document, buffers, _images) = gltf::import_slice(bytes)?;

    let scene = document
        .default_scene()
        .or_else(|| document.scenes().next())
        .ok_or_else(|| DecodeError::MalformedModel("file contains no scene".to_string()))?;

    let name = scene.name().unwrap_or("model").to_string();

    let mut nodes = Vec::new();
    for node in scene.nodes() {
        nodes.push(decode_node(&node, &buffers)?);
    }

    if nodes.is_empty() {
        return Err(DecodeError::MalformedModel(
            "default scene has no nodes".to_string(),
        ));
    }

    tracing::debug!(scene = %name, nodes = nodes.len(), "decoded model");
    Ok(DecodedModel { name, nodes })
}

fn decode_node(node: &gltf::Node, buffers: &[gltf::buffer::Data]) -> Result<ModelNode, DecodeError> {
    let (translation, rotation, scale) = node.transform().decomposed();
    let name = node
        .name()
        .map(str::to_string)
        .unwrap_or_else(|| format!("node-{}", node.index()));

    let mut meshes = Vec::new();
    // Meshes are gathered relative to this node, so the node's own transform
    // applies exactly once when the container child is placed.
    collect_meshes(node, Mat4::IDENTITY, buffers, &mut meshes)?;

    let (min, max) = mesh_bounds(&meshes);

    Ok(ModelNode {
        name,
        translation,
        rotation,
        scale,
        meshes,
        min,
        max,
    })
}

fn collect_meshes(
    node: &gltf::Node,
    rel_transform: Mat4,
    buffers: &[gltf::buffer::Data],
    out: &mut Vec<DecodedMesh>,
) -> Result<(), DecodeError> {
    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh
            .name()
            .map(str::to_string)
            .unwrap_or_else(|| format!("mesh-{}", mesh.index()));

        for primitive in mesh.primitives() {
            if primitive.mode() != gltf::mesh::Mode::Triangles {
                tracing::warn!(
                    mesh = %mesh_name,
                    mode = ?primitive.mode(),
                    "skipping non-triangle primitive"
                );
                continue;
            }

            let reader = primitive.reader(|buffer| Some(&buffers[buffer.index()]));

            let positions: Vec<[f32; 3]> = reader
                .read_positions()
                .ok_or_else(|| {
                    DecodeError::MalformedModel(format!(
                        "primitive in mesh '{}' has no positions",
                        mesh_name
                    ))
                })?
                .collect();

            let indices: Vec<u32> = match reader.read_indices() {
                Some(indices) => indices.into_u32().collect(),
                None => (0..positions.len() as u32).collect(),
            };

            let normals: Vec<[f32; 3]> = match reader.read_normals() {
                Some(normals) => normals.collect(),
                None => compute_normals(&positions, &indices),
            };

            let uvs: Vec<[f32; 2]> = match reader.read_tex_coords(0) {
                Some(uvs) => uvs.into_f32().collect(),
                None => vec![[0.0, 0.0]; positions.len()],
            };

            let base_color = primitive
                .material()
                .pbr_metallic_roughness()
                .base_color_factor();

            out.push(DecodedMesh {
                name: mesh_name.clone(),
                transform: rel_transform.to_cols_array_2d(),
                positions,
                normals,
                uvs,
                indices,
                base_color,
            });
        }
    }

    for child in node.children() {
        let child_transform =
            rel_transform * Mat4::from_cols_array_2d(&child.transform().matrix());
        collect_meshes(&child, child_transform, buffers, out)?;
    }

    Ok(())
}

/// Smooth per-vertex normals accumulated from face normals.
fn compute_normals(positions: &[[f32; 3]], indices: &[u32]) -> Vec<[f32; 3]> {
    let mut normals = vec![Vec3::ZERO; positions.len()];

    for triangle in indices.chunks_exact(3) {
        let [a, b, c] = [
            triangle[0] as usize,
            triangle[1] as usize,
            triangle[2] as usize,
        ];
        if a >= positions.len() || b >= positions.len() || c >= positions.len() {
            continue;
        }
        let pa = Vec3::from(positions[a]);
        let pb = Vec3::from(positions[b]);
        let pc = Vec3::from(positions[c]);
        let face = (pb - pa).cross(pc - pa);
        normals[a] += face;
        normals[b] += face;
        normals[c] += face;
    }

    normals
        .into_iter()
        .map(|n| n.normalize_or(Vec3::Y).to_array())
        .collect()
}

/// Bounds of every mesh vertex in node-local space.
///
/// A node without geometry yields an inverted box (min > max) so callers can
/// detect it via [`ModelNode::has_bounds`].
fn mesh_bounds(meshes: &[DecodedMesh]) -> ([f32; 3], [f32; 3]) {
    let mut min = Vec3::splat(f32::INFINITY);
    let mut max = Vec3::splat(f32::NEG_INFINITY);

    for mesh in meshes {
        let transform = Mat4::from_cols_array_2d(&mesh.transform);
        for position in &mesh.positions {
            let p = transform.transform_point3(Vec3::from(*position));
            min = min.min(p);
            max = max.max(p);
        }
    }

    (min.to_array(), max.to_array())
}
