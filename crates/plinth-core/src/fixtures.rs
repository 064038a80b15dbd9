//! Hand-built glTF fixtures shared by the decode and workflow tests.

const GLB_MAGIC: u32 = 0x4654_6C67; // "glTF"
const CHUNK_JSON: u32 = 0x4E4F_534A; // "JSON"
const CHUNK_BIN: u32 = 0x004E_4942; // "BIN\0"

/// A valid textual glTF whose default scene holds two nodes without meshes.
pub fn minimal_gltf_json() -> String {
    r#"{
        "asset": {"version": "2.0"},
        "scene": 0,
        "scenes": [{"name": "Scene", "nodes": [0, 1]}],
        "nodes": [{"name": "left"}, {"name": "right"}]
    }"#
    .to_string()
}

/// A valid GLB containing two single-triangle meshes under two top-level
/// nodes. Both meshes share one position accessor spanning (0,0,0)..(1,1,0).
pub fn two_mesh_glb() -> Vec<u8> {
    let positions: [f32; 9] = [
        0.0, 0.0, 0.0, //
        1.0, 0.0, 0.0, //
        0.0, 1.0, 0.0,
    ];
    let mut bin = Vec::with_capacity(positions.len() * 4);
    for value in positions {
        bin.extend_from_slice(&value.to_le_bytes());
    }

    let json = format!(
        concat!(
            r#"{{"asset":{{"version":"2.0"}},"scene":0,"#,
            r#""scenes":[{{"name":"Scene","nodes":[0,1]}}],"#,
            r#""nodes":[{{"name":"part_a","mesh":0}},"#,
            r#"{{"name":"part_b","mesh":1,"translation":[0.5,0.0,0.0]}}],"#,
            r#""meshes":[{{"name":"tri_a","primitives":[{{"attributes":{{"POSITION":0}}}}]}},"#,
            r#"{{"name":"tri_b","primitives":[{{"attributes":{{"POSITION":0}}}}]}}],"#,
            r#""accessors":[{{"bufferView":0,"componentType":5126,"count":3,"#,
            r#""type":"VEC3","min":[0.0,0.0,0.0],"max":[1.0,1.0,0.0]}}],"#,
            r#""bufferViews":[{{"buffer":0,"byteOffset":0,"byteLength":{len},"target":34962}}],"#,
            r#""buffers":[{{"byteLength":{len}}}]}}"#,
        ),
        len = bin.len()
    );

    build_glb(json.as_bytes(), &bin)
}

fn build_glb(json: &[u8], bin: &[u8]) -> Vec<u8> {
    let mut json_chunk = json.to_vec();
    while json_chunk.len() % 4 != 0 {
        json_chunk.push(b' ');
    }
    let mut bin_chunk = bin.to_vec();
    while bin_chunk.len() % 4 != 0 {
        bin_chunk.push(0);
    }

    let total = 12 + 8 + json_chunk.len() + 8 + bin_chunk.len();

    let mut glb = Vec::with_capacity(total);
    glb.extend_from_slice(&GLB_MAGIC.to_le_bytes());
    glb.extend_from_slice(&2u32.to_le_bytes());
    glb.extend_from_slice(&(total as u32).to_le_bytes());

    glb.extend_from_slice(&(json_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_JSON.to_le_bytes());
    glb.extend_from_slice(&json_chunk);

    glb.extend_from_slice(&(bin_chunk.len() as u32).to_le_bytes());
    glb.extend_from_slice(&CHUNK_BIN.to_le_bytes());
    glb.extend_from_slice(&bin_chunk);

    glb
}
