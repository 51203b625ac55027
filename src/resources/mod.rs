//! Loading of external assets (glTF models, textures, raw binaries).

use std::{
    convert::identity,
    io::{BufReader, Cursor},
};

use wgpu::util::DeviceExt;

use crate::data_structures::{
    bounds::Aabb,
    instance::Instance,
    model::{Material, Mesh, ModelVertex},
    node::{LoadedModel, ModelNode},
    texture::Texture,
};

pub mod texture;

pub use texture::{diffuse_layout, load_binary, load_texture};

/// Loads a `.gltf`/`.glb` file into a [`LoadedModel`].
///
/// The returned model always carries at least one material: meshes without
/// a base color texture fall back to a plain white one so the draw path
/// never has to special-case untextured geometry.
pub async fn load_model_gltf(
    file_name: &str,
    device: &wgpu::Device,
    queue: &wgpu::Queue,
) -> anyhow::Result<LoadedModel> {
    let gltf_bytes = load_binary(file_name).await?;
    let gltf_cursor = Cursor::new(gltf_bytes);
    let gltf_reader = BufReader::new(gltf_cursor);
    let gltf = gltf::Gltf::from_reader(gltf_reader)?;

    // Load buffers
    let mut buffer_data = Vec::new();
    for buffer in gltf.buffers() {
        match buffer.source() {
            gltf::buffer::Source::Bin => {
                if let Some(blob) = gltf.blob.as_deref() {
                    buffer_data.push(blob.to_vec());
                }
            }
            gltf::buffer::Source::Uri(uri) => {
                let bin = load_binary(uri).await?;
                buffer_data.push(bin);
            }
        }
    }

    // Load materials
    let layout = diffuse_layout(device);
    let mut materials = Vec::new();
    for material in gltf.materials() {
        let pbr = material.pbr_metallic_roughness();
        let diffuse_texture = match pbr
            .base_color_texture()
            .map(|tex| tex.texture().source().source())
        {
            Some(gltf::image::Source::View { view, mime_type }) => {
                let start = view.offset();
                let end = start + view.length();
                let parent = buffer_data
                    .get(view.buffer().index())
                    .ok_or_else(|| anyhow::anyhow!("texture view references missing buffer"))?;
                Texture::from_bytes(
                    device,
                    queue,
                    &parent[start..end],
                    file_name,
                    mime_type.split('/').last(),
                )?
            }
            Some(gltf::image::Source::Uri { uri, mime_type }) => {
                load_texture(
                    uri,
                    device,
                    queue,
                    mime_type.map(|mt| mt.split('/').last().map_or("jpg", identity)),
                )
                .await?
            }
            None => Texture::solid_colour([255, 255, 255, 255], 1, 1, device, queue),
        };
        let name = material.name().unwrap_or(file_name);
        materials.push(Material::new(device, name, diffuse_texture, &layout));
    }
    if materials.is_empty() {
        let white = Texture::solid_colour([255, 255, 255, 255], 1, 1, device, queue);
        materials.push(Material::new(device, "default material", white, &layout));
    }

    let mut roots = Vec::new();
    for scene in gltf.scenes() {
        for node in scene.nodes() {
            roots.push(to_model_node(node, &buffer_data, device));
        }
    }

    let root = if roots.len() == 1 {
        roots.remove(0)
    } else {
        let mut root = ModelNode::new(device, file_name, Vec::new(), Instance::default());
        for child in roots {
            root.add_child(child);
        }
        root
    };

    log::info!("loaded model {}", file_name);
    Ok(LoadedModel::new(root, materials))
}

fn to_model_node(node: gltf::scene::Node, buf: &[Vec<u8>], device: &wgpu::Device) -> ModelNode {
    let mut meshes = Vec::new();
    if let Some(mesh) = node.mesh() {
        let mesh_name = mesh.name().unwrap_or("unknown_mesh").to_string();
        for primitive in mesh.primitives() {
            let reader = primitive.reader(|buffer| buf.get(buffer.index()).map(Vec::as_slice));

            let mut bounds = Aabb::empty();
            let mut vertices = Vec::new();
            if let Some(positions) = reader.read_positions() {
                positions.for_each(|position| {
                    bounds.expand(position.into());
                    vertices.push(ModelVertex {
                        position,
                        tex_coords: Default::default(),
                        normal: Default::default(),
                    })
                });
            }
            if let Some(normals) = reader.read_normals() {
                for (vertex, normal) in vertices.iter_mut().zip(normals) {
                    vertex.normal = normal;
                }
            }
            if let Some(tex_coords) = reader.read_tex_coords(0).map(|v| v.into_f32()) {
                for (vertex, tex_coord) in vertices.iter_mut().zip(tex_coords) {
                    vertex.tex_coords = tex_coord;
                }
            }

            // Non-indexed primitives get a trivial index list.
            let indices: Vec<u32> = match reader.read_indices() {
                Some(raw) => raw.into_u32().collect(),
                None => (0..vertices.len() as u32).collect(),
            };

            let vertex_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Vertex Buffer", mesh_name)),
                contents: bytemuck::cast_slice(&vertices),
                usage: wgpu::BufferUsages::VERTEX,
            });
            let index_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
                label: Some(&format!("{:?} Index Buffer", mesh_name)),
                contents: bytemuck::cast_slice(&indices),
                usage: wgpu::BufferUsages::INDEX,
            });

            meshes.push(Mesh {
                name: mesh_name.clone(),
                vertex_buffer,
                index_buffer,
                num_elements: indices.len() as u32,
                material: primitive.material().index().unwrap_or(0),
                bounds,
            });
        }
    }

    let (position, rotation, scale) = node.transform().decomposed();
    let local = Instance {
        position: position.into(),
        rotation: rotation.into(),
        scale: scale.into(),
    };

    let mut model_node = ModelNode::new(device, node.name().unwrap_or("unnamed"), meshes, local);
    for child in node.children() {
        model_node.add_child(to_model_node(child, buf, device));
    }
    model_node
}
