//! Static scene content: camera, lights, ground grid, world axes

use bevy::prelude::*;
use bevy::render::alpha::AlphaMode;

use crate::camera::MainCamera;
use crate::spawn::SPAWN_OFFSET;

pub struct SceneSetupPlugin;

impl Plugin for SceneSetupPlugin {
    fn build(&self, app: &mut App) {
        app.add_systems(Startup, setup_scene)
            .add_systems(Update, toggle_helpers);
    }
}

/// Marker for ground grid lines
#[derive(Component)]
pub struct GridLine;

/// Marker for the world axis indicators at the origin
#[derive(Component)]
pub struct WorldAxis;

fn setup_scene(
    mut commands: Commands,
    mut meshes: ResMut<Assets<Mesh>>,
    mut materials: ResMut<Assets<StandardMaterial>>,
) {
    // Y-up world, ground on the X-Z plane
    commands.spawn((
        Camera3d::default(),
        Projection::Perspective(PerspectiveProjection {
            near: 0.01,
            far: 500.0,
            ..default()
        }),
        Transform::from_xyz(0.0, 2.4, 4.5).looking_at(SPAWN_OFFSET, Vec3::Y),
        MainCamera,
    ));

    commands.insert_resource(AmbientLight {
        color: Color::srgb(0.9, 0.95, 1.0),
        brightness: 200.0,
        ..default()
    });

    // Key light with shadows, like sunlight
    commands.spawn((
        DirectionalLight {
            illuminance: 5000.0,
            shadows_enabled: true,
            ..default()
        },
        Transform::from_xyz(2.0, 4.0, 2.0).looking_at(Vec3::ZERO, Vec3::Y),
    ));

    // Warm fill light, no shadows
    commands.spawn((
        PointLight {
            intensity: 100_000.0,
            shadows_enabled: false,
            color: Color::srgb(1.0, 0.95, 0.9),
            ..default()
        },
        Transform::from_xyz(-1.0, 2.0, -1.0),
    ));

    // Grid lines on the ground plane
    let grid_size = 10;
    let grid_spacing = 0.5;
    let grid_extent = (grid_size as f32) * grid_spacing;
    let thickness = 0.004;

    let line_material = materials.add(StandardMaterial {
        base_color: Color::srgba(0.4, 0.4, 0.4, 0.5),
        unlit: true,
        alpha_mode: AlphaMode::Blend,
        ..default()
    });

    let line_mesh_x = meshes.add(Cuboid::new(grid_extent * 2.0, thickness, thickness));
    let line_mesh_z = meshes.add(Cuboid::new(thickness, thickness, grid_extent * 2.0));

    // Lines along X (varying Z)
    for i in -grid_size..=grid_size {
        let z = i as f32 * grid_spacing;
        commands.spawn((
            Mesh3d(line_mesh_x.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(0.0, 0.0, z)),
            GridLine,
        ));
    }

    // Lines along Z (varying X)
    for i in -grid_size..=grid_size {
        let x = i as f32 * grid_spacing;
        commands.spawn((
            Mesh3d(line_mesh_z.clone()),
            MeshMaterial3d(line_material.clone()),
            Transform::from_translation(Vec3::new(x, 0.0, 0.0)),
            GridLine,
        ));
    }

    spawn_axis(
        &mut commands,
        &mut meshes,
        &mut materials,
        Color::srgb(0.9, 0.2, 0.2),
        Vec3::X,
    );
    spawn_axis(
        &mut commands,
        &mut meshes,
        &mut materials,
        Color::srgb(0.2, 0.9, 0.2),
        Vec3::Y,
    );
    spawn_axis(
        &mut commands,
        &mut meshes,
        &mut materials,
        Color::srgb(0.2, 0.2, 0.9),
        Vec3::Z,
    );
}

/// One world axis at the origin: a cylinder shaft plus a cone tip.
///
/// Cylinders and cones are Y-aligned by default, so both get the arc
/// rotation from +Y onto the axis direction.
fn spawn_axis(
    commands: &mut Commands,
    meshes: &mut Assets<Mesh>,
    materials: &mut Assets<StandardMaterial>,
    color: Color,
    direction: Vec3,
) {
    let length = 0.5;
    let thickness = 0.006;
    let cone_height = thickness * 5.0;
    let cone_radius = thickness * 3.0;

    let material = materials.add(StandardMaterial {
        base_color: color,
        unlit: true,
        ..default()
    });
    let rotation = Quat::from_rotation_arc(Vec3::Y, direction);

    commands.spawn((
        Mesh3d(meshes.add(Cylinder::new(thickness, length))),
        MeshMaterial3d(material.clone()),
        Transform::from_translation(direction * (length / 2.0)).with_rotation(rotation),
        WorldAxis,
    ));
    commands.spawn((
        Mesh3d(meshes.add(Cone::new(cone_radius, cone_height))),
        MeshMaterial3d(material),
        Transform::from_translation(direction * (length + cone_height / 2.0))
            .with_rotation(rotation),
        WorldAxis,
    ));
}

/// G toggles the ground grid, X toggles the world axes.
fn toggle_helpers(
    keyboard: Res<ButtonInput<KeyCode>>,
    mut grid_query: Query<&mut Visibility, (With<GridLine>, Without<WorldAxis>)>,
    mut axis_query: Query<&mut Visibility, With<WorldAxis>>,
) {
    if keyboard.just_pressed(KeyCode::KeyG) {
        for mut visibility in grid_query.iter_mut() {
            visibility.toggle_visible_hidden();
        }
    }
    if keyboard.just_pressed(KeyCode::KeyX) {
        for mut visibility in axis_query.iter_mut() {
            visibility.toggle_visible_hidden();
        }
    }
}
