//! Instantiation of decoded models into the scene graph
//!
//! Every import produces one container entity placed at [`SPAWN_OFFSET`].
//! Each top-level node of the decoded model becomes a part child carrying
//! its bounding-box collider and manipulation settings, and each part in
//! turn parents the render meshes of its subtree.

use bevy::asset::RenderAssetUsages;
use bevy::prelude::*;
use bevy::mesh::{Indices, PrimitiveTopology};

use plinth_core::{DecodedMesh, DecodedModel, ModelNode};

/// Where newly imported containers appear: slightly up and forward of the
/// world origin, inside the default camera framing.
pub const SPAWN_OFFSET: Vec3 = Vec3::new(0.0, 1.2, 1.2);

/// Fallback collider half-extent for parts without any mesh geometry.
const EMPTY_PART_HALF_EXTENT: f32 = 0.05;

/// Root entity of one imported model. Its children are the parts.
#[derive(Component)]
pub struct ImportedContainer {
    /// Scene name from the source file
    pub model_name: String,
}

/// One grabbable piece of an imported model.
#[derive(Component)]
pub struct ImportedPart {
    /// Node name from the source file
    pub node_name: String,
    /// The container this part belongs to
    pub container: Entity,
}

/// Axis-aligned box in part-local space used for grab ray tests.
#[derive(Component, Debug, Clone, Copy)]
pub struct PartCollider {
    pub center: Vec3,
    pub half_extents: Vec3,
}

impl PartCollider {
    pub fn min(&self) -> Vec3 {
        self.center - self.half_extents
    }

    pub fn max(&self) -> Vec3 {
        self.center + self.half_extents
    }
}

/// Manipulation settings for a part.
#[derive(Component, Debug, Clone, Copy)]
pub struct Manipulable {
    /// Whether a second pointer may grab the part while one already holds it
    pub multi_grab: bool,
}

impl Default for Manipulable {
    fn default() -> Self {
        Self { multi_grab: true }
    }
}

/// Spawn a decoded model as a container entity and return it.
///
/// The container itself renders nothing; parts hold the transforms from the
/// file and the meshes hang off the parts with their subtree-relative
/// transforms baked in.
pub fn spawn_model(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    model: &DecodedModel,
) -> Entity {
    let container = commands
        .spawn((
            ImportedContainer {
                model_name: model.name.clone(),
            },
            Transform::from_translation(SPAWN_OFFSET),
            Visibility::default(),
        ))
        .id();

    for node in &model.nodes {
        let part = spawn_part(commands, meshes, materials, container, node);
        commands.entity(container).add_child(part);
    }

    tracing::debug!(
        model = %model.name,
        parts = model.nodes.len(),
        "spawned container"
    );

    container
}

fn spawn_part(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    container: Entity,
    node: &ModelNode,
) -> Entity {
    let part = commands
        .spawn((
            ImportedPart {
                node_name: node.name.clone(),
                container,
            },
            part_collider(node),
            Manipulable::default(),
            Transform {
                translation: Vec3::from(node.translation),
                rotation: Quat::from_array(node.rotation),
                scale: Vec3::from(node.scale),
            },
            Visibility::default(),
        ))
        .id();

    for decoded in &node.meshes {
        let mesh = commands
            .spawn((
                Mesh3d(meshes.add(mesh_from_decoded(decoded))),
                MeshMaterial3d(materials.add(StandardMaterial {
                    base_color: Color::linear_rgba(
                        decoded.base_color[0],
                        decoded.base_color[1],
                        decoded.base_color[2],
                        decoded.base_color[3],
                    ),
                    ..default()
                })),
                Transform::from_matrix(Mat4::from_cols_array_2d(&decoded.transform)),
            ))
            .id();
        commands.entity(part).add_child(mesh);
    }

    part
}

/// Collider box from the node's decoded bounds, or a small default box for
/// parts that carry no geometry so they stay grabbable.
fn part_collider(node: &ModelNode) -> PartCollider {
    if node.has_bounds() {
        let min = Vec3::from(node.min);
        let max = Vec3::from(node.max);
        PartCollider {
            center: (min + max) / 2.0,
            half_extents: ((max - min) / 2.0).max(Vec3::splat(f32::EPSILON)),
        }
    } else {
        PartCollider {
            center: Vec3::ZERO,
            half_extents: Vec3::splat(EMPTY_PART_HALF_EXTENT),
        }
    }
}

fn mesh_from_decoded(decoded: &DecodedMesh) -> Mesh {
    Mesh::new(
        PrimitiveTopology::TriangleList,
        RenderAssetUsages::default(),
    )
    .with_inserted_attribute(Mesh::ATTRIBUTE_POSITION, decoded.positions.clone())
    .with_inserted_attribute(Mesh::ATTRIBUTE_NORMAL, decoded.normals.clone())
    .with_inserted_attribute(Mesh::ATTRIBUTE_UV_0, decoded.uvs.clone())
    .with_inserted_indices(Indices::U32(decoded.indices.clone()))
}

#[cfg(test)]
mod tests {
    use super::*;
    use bevy::ecs::system::SystemState;
    use plinth_core::decode_model;

    type SpawnParams<'w, 's> = (
        Commands<'w, 's>,
        ResMut<'w, Assets<Mesh>>,
        ResMut<'w, Assets<StandardMaterial>>,
    );

    fn world_with_assets() -> World {
        let mut world = World::new();
        world.insert_resource(Assets::<Mesh>::default());
        world.insert_resource(Assets::<StandardMaterial>::default());
        world
    }

    fn spawn_in(world: &mut World, model: &DecodedModel) -> Entity {
        let mut state: SystemState<SpawnParams> = SystemState::new(world);
        let (mut commands, mut meshes, mut materials) = state.get_mut(world);
        let container = spawn_model(&mut commands, &mut meshes, &mut materials, model);
        state.apply(world);
        container
    }

    fn two_triangle_model() -> DecodedModel {
        decode_model(&plinth_core::fixtures::two_mesh_glb()).unwrap()
    }

    #[test]
    fn container_holds_one_part_per_top_level_node() {
        let mut world = world_with_assets();
        let model = two_triangle_model();

        let container = spawn_in(&mut world, &model);

        let children: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap_or_default();
        assert_eq!(children.len(), 2);
        for child in &children {
            let part = world.get::<ImportedPart>(*child).unwrap();
            assert_eq!(part.container, container);
            assert!(world.get::<PartCollider>(*child).is_some());
            // Parts accept simultaneous grabs from several pointers
            assert!(world.get::<Manipulable>(*child).unwrap().multi_grab);
        }
    }

    #[test]
    fn container_sits_at_the_spawn_offset() {
        let mut world = world_with_assets();
        let model = two_triangle_model();

        let container = spawn_in(&mut world, &model);

        let transform = world.get::<Transform>(container).unwrap();
        assert_eq!(transform.translation, SPAWN_OFFSET);
        assert!(world.get::<ImportedContainer>(container).is_some());
    }

    #[test]
    fn part_transforms_come_from_the_file() {
        let mut world = world_with_assets();
        let model = two_triangle_model();

        let container = spawn_in(&mut world, &model);

        let children: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap();
        let second = world.get::<Transform>(children[1]).unwrap();
        assert_eq!(second.translation, Vec3::new(0.5, 0.0, 0.0));
    }

    #[test]
    fn collider_wraps_the_part_geometry() {
        let mut world = world_with_assets();
        let model = two_triangle_model();

        let container = spawn_in(&mut world, &model);

        let children: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap();
        let collider = world.get::<PartCollider>(children[0]).unwrap();
        // Triangle spans (0,0,0)..(1,1,0)
        assert_eq!(collider.center, Vec3::new(0.5, 0.5, 0.0));
        assert!((collider.half_extents.x - 0.5).abs() < 1e-6);
        assert!((collider.half_extents.y - 0.5).abs() < 1e-6);
        assert!(collider.half_extents.z > 0.0);
    }

    #[test]
    fn meshless_parts_get_a_default_collider() {
        let mut world = world_with_assets();
        let model = decode_model(plinth_core::fixtures::minimal_gltf_json().as_bytes()).unwrap();

        let container = spawn_in(&mut world, &model);

        let children: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap();
        assert_eq!(children.len(), 2);
        let collider = world.get::<PartCollider>(children[0]).unwrap();
        assert_eq!(collider.half_extents, Vec3::splat(EMPTY_PART_HALF_EXTENT));
    }

    #[test]
    fn part_meshes_carry_material_and_geometry() {
        let mut world = world_with_assets();
        let model = two_triangle_model();

        let container = spawn_in(&mut world, &model);

        let parts: Vec<Entity> = world
            .get::<Children>(container)
            .map(|c| c.iter().collect())
            .unwrap();
        let mesh_children: Vec<Entity> = world
            .get::<Children>(parts[0])
            .map(|c| c.iter().collect())
            .unwrap();
        assert_eq!(mesh_children.len(), 1);
        assert!(world.get::<Mesh3d>(mesh_children[0]).is_some());
        assert!(world.get::<MeshMaterial3d<StandardMaterial>>(mesh_children[0]).is_some());
    }
}
