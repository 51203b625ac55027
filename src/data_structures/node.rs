//! The loaded model node hierarchy.
//!
//! A glTF file becomes one [`LoadedModel`]: a tree of [`ModelNode`]s (each
//! with its meshes and a single per-node instance buffer) plus the shared
//! material list and the model-space bounding box computed at load time.

use wgpu::util::DeviceExt;

use crate::data_structures::{
    bounds::Aabb,
    instance::Instance,
    model::{DrawModel, Material, Mesh},
};

pub struct ModelNode {
    pub name: String,
    meshes: Vec<Mesh>,
    children: Vec<ModelNode>,
    local: Instance,
    world: Instance,
    instance_buffer: wgpu::Buffer,
}

impl ModelNode {
    pub fn new(device: &wgpu::Device, name: &str, meshes: Vec<Mesh>, local: Instance) -> Self {
        let instance_buffer = device.create_buffer_init(&wgpu::util::BufferInitDescriptor {
            label: Some(&format!("{:?} Instance Buffer", name)),
            contents: bytemuck::cast_slice(&[local.to_raw()]),
            usage: wgpu::BufferUsages::VERTEX | wgpu::BufferUsages::COPY_DST,
        });

        Self {
            name: name.to_string(),
            meshes,
            children: Vec::new(),
            world: local.clone(),
            local,
            instance_buffer,
        }
    }

    pub fn add_child(&mut self, child: ModelNode) {
        self.children.push(child);
    }

    /// Bounding box of this node and its subtree, expressed in the parent's
    /// space (i.e. with this node's local transform applied).
    pub fn bounds(&self) -> Aabb {
        let mut aabb = Aabb::empty();
        for mesh in &self.meshes {
            aabb = aabb.union(&mesh.bounds);
        }
        for child in &self.children {
            aabb = aabb.union(&child.bounds());
        }
        aabb.transformed(&self.local)
    }

    /// Recomputes world transforms for the subtree from `parent` down.
    pub fn update_world(&mut self, parent: &Instance) {
        self.world = parent * &self.local;
        let world = self.world.clone();
        for child in &mut self.children {
            child.update_world(&world);
        }
    }

    /// Uploads the world transforms computed by [`Self::update_world`].
    pub fn write_to_buffers(&self, queue: &wgpu::Queue) {
        queue.write_buffer(
            &self.instance_buffer,
            0,
            bytemuck::cast_slice(&[self.world.to_raw()]),
        );
        for child in &self.children {
            child.write_to_buffers(queue);
        }
    }

    pub fn draw(
        &self,
        materials: &[Material],
        camera_bind_group: &wgpu::BindGroup,
        light_bind_group: &wgpu::BindGroup,
        render_pass: &mut wgpu::RenderPass<'_>,
    ) {
        if !self.meshes.is_empty() {
            render_pass.set_vertex_buffer(1, self.instance_buffer.slice(..));
            for mesh in &self.meshes {
                // The loader guarantees at least one material.
                let material = materials.get(mesh.material).unwrap_or(&materials[0]);
                render_pass.draw_mesh(mesh, material, camera_bind_group, light_bind_group);
            }
        }
        for child in &self.children {
            child.draw(materials, camera_bind_group, light_bind_group, render_pass);
        }
    }
}

/// Everything the loader yields for one asset.
pub struct LoadedModel {
    pub root: ModelNode,
    pub materials: Vec<Material>,
    /// Model-space bounds, captured once at load time.
    pub bounds: Aabb,
}

impl LoadedModel {
    pub fn new(root: ModelNode, materials: Vec<Material>) -> Self {
        let bounds = root.bounds();
        Self {
            root,
            materials,
            bounds,
        }
    }
}
