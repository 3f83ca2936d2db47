//! Render pipeline caching.
//!
//! Pipelines are expensive to build, so they are cached under a code string
//! derived from the parameters that select a shader variant. Entries are
//! use-counted: objects acquire the pipeline they draw with and release it
//! when they disappear, and an entry whose count reaches zero is destroyed.

use std::collections::HashMap;

use crate::context::Context;
use crate::material::MaterialKind;

/// The parameters that select a pipeline variant.
#[derive(Clone, Copy, Debug, PartialEq, Eq, Hash)]
pub(crate) struct PipelineKey {
    /// Shading family.
    pub kind: MaterialKind,
    /// Line-list edges instead of filled triangles.
    pub wireframe: bool,
    /// Backface culling disabled.
    pub double_sided: bool,
}

impl PipelineKey {
    /// The cache code for this variant.
    pub fn code(&self) -> String {
        let shader = match self.kind {
            MaterialKind::Basic => "basic",
            MaterialKind::Phong => "phong",
        };
        let topology = if self.wireframe { "lines" } else { "triangles" };
        let culling = if self.double_sided { "no_cull" } else { "cull" };
        [shader, topology, culling].join(",")
    }
}

struct CacheEntry<P> {
    value: P,
    id: u64,
    used_times: u32,
}

/// A use-counted cache keyed by code strings.
pub(crate) struct KeyedCache<P> {
    entries: HashMap<String, CacheEntry<P>>,
    next_id: u64,
}

impl<P> KeyedCache<P> {
    pub fn new() -> KeyedCache<P> {
        KeyedCache {
            entries: HashMap::new(),
            next_id: 1,
        }
    }

    /// Acquires the entry for `code`, building it on first use, and bumps its
    /// use count. Returns the entry id.
    pub fn acquire(&mut self, code: &str, build: impl FnOnce() -> P) -> u64 {
        if let Some(entry) = self.entries.get_mut(code) {
            entry.used_times += 1;
            entry.id
        } else {
            let id = self.next_id;
            self.next_id += 1;
            self.entries.insert(
                code.to_owned(),
                CacheEntry {
                    value: build(),
                    id,
                    used_times: 1,
                },
            );
            id
        }
    }

    /// Drops one use of `code`. The entry is destroyed when its count
    /// reaches zero; returns `true` in that case.
    pub fn release(&mut self, code: &str) -> bool {
        if let Some(entry) = self.entries.get_mut(code) {
            entry.used_times -= 1;
            if entry.used_times == 0 {
                self.entries.remove(code);
                return true;
            }
        }
        false
    }

    /// Looks up an entry without touching its use count.
    pub fn get(&self, code: &str) -> Option<(&P, u64)> {
        self.entries.get(code).map(|e| (&e.value, e.id))
    }

    /// The number of live entries.
    pub fn len(&self) -> usize {
        self.entries.len()
    }
}

/// Builds and caches the render pipelines for every material variant.
pub(crate) struct PipelineCache {
    basic_shader: wgpu::ShaderModule,
    phong_shader: wgpu::ShaderModule,
    layout: wgpu::PipelineLayout,
    cache: KeyedCache<wgpu::RenderPipeline>,
}

impl PipelineCache {
    /// Creates the cache and compiles the shader modules.
    pub fn new(
        ctxt: &Context,
        frame_layout: &wgpu::BindGroupLayout,
        object_layout: &wgpu::BindGroupLayout,
        texture_layout: &wgpu::BindGroupLayout,
    ) -> PipelineCache {
        let basic_shader =
            ctxt.create_shader_module(Some("tre3d_basic_shader"), include_str!("shaders/basic.wgsl"));
        let phong_shader =
            ctxt.create_shader_module(Some("tre3d_phong_shader"), include_str!("shaders/phong.wgsl"));

        let layout = ctxt
            .device
            .create_pipeline_layout(&wgpu::PipelineLayoutDescriptor {
                label: Some("tre3d_pipeline_layout"),
                bind_group_layouts: &[frame_layout, object_layout, texture_layout],
                push_constant_ranges: &[],
            });

        PipelineCache {
            basic_shader,
            phong_shader,
            layout,
            cache: KeyedCache::new(),
        }
    }

    /// Acquires the pipeline for `key`, building it on first use.
    pub fn acquire(&mut self, ctxt: &Context, key: &PipelineKey) -> u64 {
        let code = key.code();
        let shader = match key.kind {
            MaterialKind::Basic => &self.basic_shader,
            MaterialKind::Phong => &self.phong_shader,
        };
        let layout = &self.layout;
        self.cache.acquire(&code, || {
            log::debug!("building render pipeline `{code}`");
            build_pipeline(ctxt, layout, shader, key, &code)
        })
    }

    /// Releases one use of the pipeline behind `code`.
    pub fn release(&mut self, code: &str) {
        if self.cache.release(code) {
            log::debug!(
                "destroyed render pipeline `{code}` ({} still live)",
                self.cache.len()
            );
        }
    }

    /// Looks up a pipeline by code.
    pub fn get(&self, code: &str) -> Option<(&wgpu::RenderPipeline, u64)> {
        self.cache.get(code)
    }
}

fn build_pipeline(
    ctxt: &Context,
    layout: &wgpu::PipelineLayout,
    shader: &wgpu::ShaderModule,
    key: &PipelineKey,
    label: &str,
) -> wgpu::RenderPipeline {
    // Positions, texture coordinates and normals live in separate buffers.
    let vertex_buffer_layouts = [
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 0,
                format: wgpu::VertexFormat::Float32x3,
            }],
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 2]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 1,
                format: wgpu::VertexFormat::Float32x2,
            }],
        },
        wgpu::VertexBufferLayout {
            array_stride: std::mem::size_of::<[f32; 3]>() as wgpu::BufferAddress,
            step_mode: wgpu::VertexStepMode::Vertex,
            attributes: &[wgpu::VertexAttribute {
                offset: 0,
                shader_location: 2,
                format: wgpu::VertexFormat::Float32x3,
            }],
        },
    ];

    let topology = if key.wireframe {
        wgpu::PrimitiveTopology::LineList
    } else {
        wgpu::PrimitiveTopology::TriangleList
    };

    // Lines have no faces to cull.
    let cull_mode = if key.wireframe || key.double_sided {
        None
    } else {
        Some(wgpu::Face::Back)
    };

    ctxt.device
        .create_render_pipeline(&wgpu::RenderPipelineDescriptor {
            label: Some(label),
            layout: Some(layout),
            vertex: wgpu::VertexState {
                module: shader,
                entry_point: Some("vs_main"),
                buffers: &vertex_buffer_layouts,
                compilation_options: Default::default(),
            },
            fragment: Some(wgpu::FragmentState {
                module: shader,
                entry_point: Some("fs_main"),
                targets: &[Some(wgpu::ColorTargetState {
                    format: ctxt.surface_format,
                    blend: Some(wgpu::BlendState::ALPHA_BLENDING),
                    write_mask: wgpu::ColorWrites::ALL,
                })],
                compilation_options: Default::default(),
            }),
            primitive: wgpu::PrimitiveState {
                topology,
                strip_index_format: None,
                front_face: wgpu::FrontFace::Ccw,
                cull_mode,
                polygon_mode: wgpu::PolygonMode::Fill,
                unclipped_depth: false,
                conservative: false,
            },
            depth_stencil: Some(wgpu::DepthStencilState {
                format: Context::depth_format(),
                depth_write_enabled: true,
                depth_compare: wgpu::CompareFunction::Less,
                stencil: wgpu::StencilState::default(),
                bias: wgpu::DepthBiasState::default(),
            }),
            multisample: wgpu::MultisampleState {
                count: 1,
                mask: !0,
                alpha_to_coverage_enabled: false,
            },
            multiview: None,
            cache: None,
        })
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn codes_distinguish_every_variant() {
        let mut codes = std::collections::HashSet::new();
        for kind in [MaterialKind::Basic, MaterialKind::Phong] {
            for wireframe in [false, true] {
                for double_sided in [false, true] {
                    let key = PipelineKey {
                        kind,
                        wireframe,
                        double_sided,
                    };
                    assert!(codes.insert(key.code()), "duplicate code {}", key.code());
                }
            }
        }
        assert_eq!(codes.len(), 8);
    }

    #[test]
    fn acquire_builds_once_and_counts_uses() {
        let mut cache: KeyedCache<u32> = KeyedCache::new();
        let mut builds = 0;

        let id_a = cache.acquire("basic,triangles,cull", || {
            builds += 1;
            42
        });
        let id_b = cache.acquire("basic,triangles,cull", || {
            builds += 1;
            42
        });

        assert_eq!(id_a, id_b);
        assert_eq!(builds, 1);
        assert_eq!(cache.len(), 1);
        assert_eq!(cache.get("basic,triangles,cull").map(|(v, _)| *v), Some(42));
    }

    #[test]
    fn release_destroys_at_zero_uses() {
        let mut cache: KeyedCache<u32> = KeyedCache::new();
        cache.acquire("phong,lines,cull", || 1);
        cache.acquire("phong,lines,cull", || 1);

        assert!(!cache.release("phong,lines,cull"));
        assert_eq!(cache.len(), 1);
        assert!(cache.release("phong,lines,cull"));
        assert_eq!(cache.len(), 0);
        assert!(cache.get("phong,lines,cull").is_none());
    }

    #[test]
    fn rebuilding_after_destruction_gets_a_fresh_id() {
        let mut cache: KeyedCache<u32> = KeyedCache::new();
        let first = cache.acquire("basic,lines,no_cull", || 1);
        cache.release("basic,lines,no_cull");
        let second = cache.acquire("basic,lines,no_cull", || 2);
        assert_ne!(first, second);
    }

    #[test]
    fn releasing_an_unknown_code_is_a_no_op() {
        let mut cache: KeyedCache<u32> = KeyedCache::new();
        assert!(!cache.release("nonexistent"));
    }
}
