//! The frame renderer.

use std::cell::{Ref, RefCell};
use std::collections::{HashMap, HashSet};
use std::rc::Rc;
use std::sync::Arc;

use bytemuck::{Pod, Zeroable};
use glamx::Mat3;

use crate::camera::Camera;
use crate::color::BLACK;
use crate::context::Context;
use crate::error::Result;
use crate::light::{LightCollection, LightKind, MAX_LIGHTS};
use crate::material::Material;
use crate::renderer::pipelines::{PipelineCache, PipelineKey};
use crate::renderer::state::RenderState;
use crate::resource::{GpuGeometry, Texture};
use crate::scene::Scene;
use crate::window::Canvas;

/// GPU representation of a single non-ambient light.
#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
struct GpuLight {
    position: [f32; 3],
    kind: u32, // 0 = point, 1 = directional
    direction: [f32; 3],
    radius: f32,
    color: [f32; 3],
    intensity: f32,
}

/// Frame-level uniforms: camera matrices, lights and fog.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct FrameUniforms {
    view: [[f32; 4]; 4],
    proj: [[f32; 4]; 4],
    eye: [f32; 4],
    ambient: [f32; 4],
    fog_color: [f32; 4],  // w = 1.0 when fog is enabled
    fog_params: [f32; 4], // x = near, y = far
    lights: [GpuLight; MAX_LIGHTS],
    num_lights: u32,
    _pad: [u32; 3],
}

/// Object-level uniforms: transform and material parameters.
#[repr(C)]
#[derive(Copy, Clone, Debug, Pod, Zeroable)]
struct ObjectUniforms {
    transform: [[f32; 4]; 4],
    ntransform: [[f32; 4]; 3], // mat3x3 padded to mat3x4 for alignment
    scale: [[f32; 4]; 3],      // mat3x3 padded to mat3x4 for alignment
    color: [f32; 4],
    emissive: [f32; 4],
    specular: [f32; 4], // rgb = specular color, w = shininess
}

/// Per-object GPU resources, created lazily and dropped when the object
/// leaves the scene.
struct ObjectGpu {
    uniform_buffer: wgpu::Buffer,
    bind_group: wgpu::BindGroup,
    texture_bind_group: wgpu::BindGroup,
    texture_id: u64,
    pipeline_code: Option<String>,
}

impl ObjectGpu {
    fn new(
        ctxt: &Context,
        object_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
        map: &Arc<Texture>,
    ) -> ObjectGpu {
        let uniform_buffer = ctxt.create_buffer(
            Some("tre3d_object_uniforms"),
            std::mem::size_of::<ObjectUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let bind_group = ctxt.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tre3d_object_bind_group"),
            layout: object_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: uniform_buffer.as_entire_binding(),
            }],
        });

        let texture_bind_group = Self::texture_bind_group(ctxt, texture_layout, map);

        ObjectGpu {
            uniform_buffer,
            bind_group,
            texture_bind_group,
            texture_id: texture_identity(map),
            pipeline_code: None,
        }
    }

    fn texture_bind_group(
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        map: &Arc<Texture>,
    ) -> wgpu::BindGroup {
        ctxt.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tre3d_texture_bind_group"),
            layout,
            entries: &[
                wgpu::BindGroupEntry {
                    binding: 0,
                    resource: wgpu::BindingResource::TextureView(&map.view),
                },
                wgpu::BindGroupEntry {
                    binding: 1,
                    resource: wgpu::BindingResource::Sampler(&map.sampler),
                },
            ],
        })
    }

    fn update_texture(
        &mut self,
        ctxt: &Context,
        layout: &wgpu::BindGroupLayout,
        map: &Arc<Texture>,
    ) {
        let id = texture_identity(map);
        if id != self.texture_id {
            self.texture_bind_group = Self::texture_bind_group(ctxt, layout, map);
            self.texture_id = id;
        }
    }
}

fn texture_identity(map: &Arc<Texture>) -> u64 {
    Arc::as_ptr(map) as u64
}

/// One mesh ready to be drawn this frame.
struct Prepared {
    node_id: u64,
    geometry: Rc<RefCell<GpuGeometry>>,
    wireframe: bool,
    pipeline_code: String,
}

/// Renders a [`Scene`] from a [`Camera`] into a [`Canvas`].
///
/// One frame is produced per [`render`](Self::render) call; the canvas
/// presents it on the next [`swap_buffers`](Canvas::swap_buffers).
pub struct Renderer {
    ctxt: Context,
    frame_uniform_buffer: wgpu::Buffer,
    frame_bind_group: wgpu::BindGroup,
    object_layout: wgpu::BindGroupLayout,
    texture_layout: wgpu::BindGroupLayout,
    pipelines: PipelineCache,
    state: RenderState,
    objects: HashMap<u64, ObjectGpu>,
    default_map: Arc<Texture>,
}

impl Renderer {
    /// Creates a renderer drawing to the given canvas's surface format.
    pub fn new(canvas: &Canvas) -> Renderer {
        // The canvas guarantees the shared context is initialized.
        let ctxt = Context::get();
        log::debug!(
            "creating renderer for a {}x{} canvas ({:?})",
            canvas.width(),
            canvas.height(),
            ctxt.surface_format
        );

        let frame_layout =
            ctxt.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tre3d_frame_bind_group_layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let object_layout =
            ctxt.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tre3d_object_bind_group_layout"),
                    entries: &[wgpu::BindGroupLayoutEntry {
                        binding: 0,
                        visibility: wgpu::ShaderStages::VERTEX | wgpu::ShaderStages::FRAGMENT,
                        ty: wgpu::BindingType::Buffer {
                            ty: wgpu::BufferBindingType::Uniform,
                            has_dynamic_offset: false,
                            min_binding_size: None,
                        },
                        count: None,
                    }],
                });

        let texture_layout =
            ctxt.device
                .create_bind_group_layout(&wgpu::BindGroupLayoutDescriptor {
                    label: Some("tre3d_texture_bind_group_layout"),
                    entries: &[
                        wgpu::BindGroupLayoutEntry {
                            binding: 0,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Texture {
                                sample_type: wgpu::TextureSampleType::Float { filterable: true },
                                view_dimension: wgpu::TextureViewDimension::D2,
                                multisampled: false,
                            },
                            count: None,
                        },
                        wgpu::BindGroupLayoutEntry {
                            binding: 1,
                            visibility: wgpu::ShaderStages::FRAGMENT,
                            ty: wgpu::BindingType::Sampler(wgpu::SamplerBindingType::Filtering),
                            count: None,
                        },
                    ],
                });

        let frame_uniform_buffer = ctxt.create_buffer(
            Some("tre3d_frame_uniforms"),
            std::mem::size_of::<FrameUniforms>() as u64,
            wgpu::BufferUsages::UNIFORM | wgpu::BufferUsages::COPY_DST,
        );

        let frame_bind_group = ctxt.device.create_bind_group(&wgpu::BindGroupDescriptor {
            label: Some("tre3d_frame_bind_group"),
            layout: &frame_layout,
            entries: &[wgpu::BindGroupEntry {
                binding: 0,
                resource: frame_uniform_buffer.as_entire_binding(),
            }],
        });

        let pipelines = PipelineCache::new(&ctxt, &frame_layout, &object_layout, &texture_layout);
        let default_map = Texture::default_white();

        Renderer {
            ctxt,
            frame_uniform_buffer,
            frame_bind_group,
            object_layout,
            texture_layout,
            pipelines,
            state: RenderState::new(),
            objects: HashMap::new(),
            default_map,
        }
    }

    /// Renders one frame of `scene` from `camera`.
    ///
    /// The frame stays pending on the canvas until
    /// [`swap_buffers`](Canvas::swap_buffers) presents it. A lost or outdated
    /// surface is reconfigured and the frame skipped.
    pub fn render(
        &mut self,
        scene: &Scene,
        camera: &mut dyn Camera,
        canvas: &mut Canvas,
    ) -> Result<()> {
        camera.update(canvas);
        scene.update_world_transforms();

        let lights = scene.collect_lights();
        self.write_frame_uniforms(scene, camera, &lights);

        let frame_view = match canvas.begin_frame() {
            Ok(view) => view,
            Err(wgpu::SurfaceError::Lost) | Err(wgpu::SurfaceError::Outdated) => {
                log::warn!("surface lost or outdated; reconfiguring and skipping the frame");
                canvas.reconfigure();
                return Ok(());
            }
            Err(wgpu::SurfaceError::Timeout) => {
                log::warn!("timed out waiting for the next frame; skipping");
                return Ok(());
            }
            Err(err) => return Err(err.into()),
        };

        let prepared = self.prepare(scene);
        self.sweep_stale_objects(&prepared);

        let mut encoder = self.ctxt.create_command_encoder(Some("tre3d_frame_encoder"));

        // Clear color and depth in a dedicated pass, then draw on top.
        {
            let bg = scene.background.unwrap_or(BLACK);
            let _clear_pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tre3d_clear_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Clear(wgpu::Color {
                            r: bg.r as f64,
                            g: bg.g as f64,
                            b: bg.b as f64,
                            a: bg.a as f64,
                        }),
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: canvas.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Clear(1.0),
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });
        }

        // Geometry borrows must outlive the render pass.
        let geometries: Vec<Ref<'_, GpuGeometry>> =
            prepared.iter().map(|p| p.geometry.borrow()).collect();

        self.state.reset();
        {
            let state = &mut self.state;
            let pipelines = &self.pipelines;
            let objects = &self.objects;
            let frame_bind_group = &self.frame_bind_group;

            let mut pass = encoder.begin_render_pass(&wgpu::RenderPassDescriptor {
                label: Some("tre3d_scene_pass"),
                color_attachments: &[Some(wgpu::RenderPassColorAttachment {
                    view: &frame_view,
                    resolve_target: None,
                    ops: wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    },
                    depth_slice: None,
                })],
                depth_stencil_attachment: Some(wgpu::RenderPassDepthStencilAttachment {
                    view: canvas.depth_view(),
                    depth_ops: Some(wgpu::Operations {
                        load: wgpu::LoadOp::Load,
                        store: wgpu::StoreOp::Store,
                    }),
                    stencil_ops: None,
                }),
                timestamp_writes: None,
                occlusion_query_set: None,
            });

            pass.set_bind_group(0, frame_bind_group, &[]);

            for (item, geometry) in prepared.iter().zip(geometries.iter()) {
                let Some(object) = objects.get(&item.node_id) else {
                    continue;
                };
                let Some((pipeline, pipeline_id)) = pipelines.get(&item.pipeline_code) else {
                    continue;
                };

                if state.use_pipeline(pipeline_id) {
                    pass.set_pipeline(pipeline);
                }
                if state.use_bind_group(1, item.node_id) {
                    pass.set_bind_group(1, &object.bind_group, &[]);
                }
                if state.use_bind_group(2, object.texture_id) {
                    pass.set_bind_group(2, &object.texture_bind_group, &[]);
                }

                let (Some(coords), Some(uvs), Some(normals)) = (
                    geometry.coords_buffer(),
                    geometry.uvs_buffer(),
                    geometry.normals_buffer(),
                ) else {
                    continue;
                };

                pass.set_vertex_buffer(0, coords.slice(..));
                pass.set_vertex_buffer(1, uvs.slice(..));
                pass.set_vertex_buffer(2, normals.slice(..));

                if item.wireframe {
                    let Some(edges) = geometry.edges_buffer() else {
                        continue;
                    };
                    pass.set_index_buffer(edges.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..geometry.num_edge_indices(), 0, 0..1);
                } else {
                    let Some(faces) = geometry.faces_buffer() else {
                        continue;
                    };
                    pass.set_index_buffer(faces.slice(..), wgpu::IndexFormat::Uint32);
                    pass.draw_indexed(0..geometry.num_face_indices(), 0, 0..1);
                }
            }
        }

        self.ctxt.submit(std::iter::once(encoder.finish()));
        Ok(())
    }

    /// Uploads geometry and per-object uniforms for every visible mesh.
    fn prepare(&mut self, scene: &Scene) -> Vec<Prepared> {
        let draws = scene.collect_draws();
        let mut prepared = Vec::with_capacity(draws.len());

        for item in draws {
            let material: Material = match &scene.override_material {
                Some(m) => m.clone(),
                None => item.material.borrow().clone(),
            };

            {
                let mut geometry = item.geometry.borrow_mut();
                if geometry.is_empty() {
                    continue;
                }
                geometry.upload(&self.ctxt);
                if material.wireframe() {
                    geometry.ensure_edges_uploaded(&self.ctxt);
                }
            }

            let object = self.objects.entry(item.node_id).or_insert_with(|| {
                ObjectGpu::new(
                    &self.ctxt,
                    &self.object_layout,
                    &self.texture_layout,
                    &self.default_map,
                )
            });

            let map = material.map().unwrap_or(&self.default_map);
            object.update_texture(&self.ctxt, &self.texture_layout, map);

            let uniforms = object_uniforms(&item, &material);
            self.ctxt
                .write_buffer(&object.uniform_buffer, 0, bytemuck::bytes_of(&uniforms));

            let key = PipelineKey {
                kind: material.kind(),
                wireframe: material.wireframe(),
                double_sided: material.double_sided(),
            };
            let code = key.code();
            if object.pipeline_code.as_deref() != Some(code.as_str()) {
                if let Some(old) = object.pipeline_code.take() {
                    self.pipelines.release(&old);
                }
                self.pipelines.acquire(&self.ctxt, &key);
                object.pipeline_code = Some(code.clone());
            }

            prepared.push(Prepared {
                node_id: item.node_id,
                geometry: item.geometry.clone(),
                wireframe: material.wireframe(),
                pipeline_code: code,
            });
        }

        prepared
    }

    /// Drops GPU data (and pipeline uses) of objects gone from the scene.
    fn sweep_stale_objects(&mut self, prepared: &[Prepared]) {
        let seen: HashSet<u64> = prepared.iter().map(|p| p.node_id).collect();
        let pipelines = &mut self.pipelines;
        self.objects.retain(|id, object| {
            if seen.contains(id) {
                true
            } else {
                if let Some(code) = object.pipeline_code.take() {
                    pipelines.release(&code);
                }
                false
            }
        });
    }

    fn write_frame_uniforms(
        &mut self,
        scene: &Scene,
        camera: &mut dyn Camera,
        lights: &LightCollection,
    ) {
        let view = camera.view_transform().to_mat4();
        let proj = camera.projection();
        let eye = camera.eye();

        let mut gpu_lights = [GpuLight::default(); MAX_LIGHTS];
        for (slot, light) in gpu_lights.iter_mut().zip(lights.lights.iter()) {
            let (kind, radius) = match light.kind {
                LightKind::Point { radius } => (0, radius),
                LightKind::Directional(_) => (1, 0.0),
                // Ambient lights never land in the collection array.
                LightKind::Ambient => (0, 0.0),
            };
            *slot = GpuLight {
                position: light.position.into(),
                kind,
                direction: light.direction.into(),
                radius,
                color: light.color.into(),
                intensity: light.intensity,
            };
        }

        let (fog_color, fog_params) = match &scene.fog {
            Some(fog) => (
                [fog.color.r, fog.color.g, fog.color.b, 1.0],
                [fog.near, fog.far, 0.0, 0.0],
            ),
            None => ([0.0; 4], [0.0; 4]),
        };

        let uniforms = FrameUniforms {
            view: view.to_cols_array_2d(),
            proj: proj.to_cols_array_2d(),
            eye: [eye.x, eye.y, eye.z, 1.0],
            ambient: [lights.ambient.x, lights.ambient.y, lights.ambient.z, 0.0],
            fog_color,
            fog_params,
            lights: gpu_lights,
            num_lights: lights.len() as u32,
            _pad: [0; 3],
        };

        self.ctxt
            .write_buffer(&self.frame_uniform_buffer, 0, bytemuck::bytes_of(&uniforms));
    }
}

fn mat3_padded(m: &Mat3) -> [[f32; 4]; 3] {
    [
        [m.col(0).x, m.col(0).y, m.col(0).z, 0.0],
        [m.col(1).x, m.col(1).y, m.col(1).z, 0.0],
        [m.col(2).x, m.col(2).y, m.col(2).z, 0.0],
    ]
}

fn object_uniforms(item: &crate::scene::node::DrawItem, material: &Material) -> ObjectUniforms {
    let ntransform = Mat3::from_quat(item.transform.rotation);
    let scale = Mat3::from_diagonal(item.scale);

    let color = material.color();
    let (emissive, specular) = match material {
        Material::Phong(m) => (
            [m.emissive.r, m.emissive.g, m.emissive.b, 0.0],
            [m.specular.r, m.specular.g, m.specular.b, m.shininess],
        ),
        Material::Basic(_) => ([0.0; 4], [0.0, 0.0, 0.0, 1.0]),
    };

    ObjectUniforms {
        transform: item.transform.to_mat4().to_cols_array_2d(),
        ntransform: mat3_padded(&ntransform),
        scale: mat3_padded(&scale),
        color: [color.r, color.g, color.b, color.a],
        emissive,
        specular,
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::material::{BasicMaterial, PhongMaterial};

    #[test]
    fn uniform_structs_have_shader_compatible_sizes() {
        assert_eq!(std::mem::size_of::<GpuLight>(), 48);
        assert_eq!(
            std::mem::size_of::<FrameUniforms>(),
            64 + 64 + 4 * 16 + MAX_LIGHTS * 48 + 16
        );
        assert_eq!(std::mem::size_of::<ObjectUniforms>(), 64 + 48 + 48 + 3 * 16);
    }

    #[test]
    fn phong_parameters_reach_the_uniforms() {
        use crate::color::{Color, ColorExt};
        use crate::scene::node::DrawItem;
        use glamx::{Pose3, Vec3};

        let mut phong = PhongMaterial::new(Color::from_hex(0x4169e1));
        phong.shininess = 60.0;
        let material: Material = phong.into();

        let item = DrawItem {
            node_id: 1,
            transform: Pose3::IDENTITY,
            scale: Vec3::splat(2.0),
            geometry: Rc::new(RefCell::new(crate::resource::GpuGeometry::new(
                crate::geometry::unit_cuboid(),
            ))),
            material: Rc::new(RefCell::new(material.clone())),
        };

        let uniforms = object_uniforms(&item, &material);
        assert_eq!(uniforms.specular[3], 60.0);
        assert_eq!(uniforms.scale[0][0], 2.0);
        assert_eq!(uniforms.scale[1][1], 2.0);
        assert!((uniforms.color[2] - 225.0 / 255.0).abs() < 1.0e-4);
    }

    #[test]
    fn basic_materials_emit_nothing() {
        use crate::scene::node::DrawItem;
        use glamx::{Pose3, Vec3};

        let material: Material = BasicMaterial::default().into();
        let item = DrawItem {
            node_id: 1,
            transform: Pose3::IDENTITY,
            scale: Vec3::ONE,
            geometry: Rc::new(RefCell::new(crate::resource::GpuGeometry::new(
                crate::geometry::unit_cuboid(),
            ))),
            material: Rc::new(RefCell::new(material.clone())),
        };

        let uniforms = object_uniforms(&item, &material);
        assert_eq!(uniforms.emissive, [0.0; 4]);
    }
}
