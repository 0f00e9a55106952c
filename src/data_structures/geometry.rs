//! Shape descriptions and their CPU tessellation.
//!
//! A [`Geometry`] is immutable once created and shared between meshes via
//! `Arc`. [`Geometry::mesh_data`] turns it into triangle lists for upload,
//! [`Geometry::edges`] derives the outline line list.

use std::{collections::HashMap, f32::consts::PI, sync::Arc};

use cgmath::{InnerSpace, Vector3};

/// Triangle (or line) list with per-vertex attributes.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct MeshData {
    pub positions: Vec<[f32; 3]>,
    pub normals: Vec<[f32; 3]>,
    pub tex_coords: Vec<[f32; 2]>,
    pub indices: Vec<u32>,
}

impl MeshData {
    pub fn vertex_count(&self) -> usize {
        self.positions.len()
    }

    fn push_vertex(&mut self, position: [f32; 3], normal: [f32; 3], uv: [f32; 2]) -> u32 {
        self.positions.push(position);
        self.normals.push(normal);
        self.tex_coords.push(uv);
        (self.positions.len() - 1) as u32
    }
}

#[derive(Clone, Debug, PartialEq)]
pub enum Geometry {
    Box {
        width: f32,
        height: f32,
        depth: f32,
    },
    /// Lies in the XY plane facing +Z; rotate it -90° about X to lay it flat.
    Plane { width: f32, height: f32 },
    Sphere {
        radius: f32,
        width_segments: u32,
        height_segments: u32,
    },
    /// Triangles read from a model file.
    Custom(MeshData),
    /// Line list (pairs of indices), as produced by [`Geometry::edges`].
    Edges(MeshData),
}

impl Geometry {
    pub fn cuboid(width: f32, height: f32, depth: f32) -> Arc<Self> {
        Arc::new(Self::Box {
            width,
            height,
            depth,
        })
    }

    pub fn plane(width: f32, height: f32) -> Arc<Self> {
        Arc::new(Self::Plane { width, height })
    }

    pub fn sphere(radius: f32, width_segments: u32, height_segments: u32) -> Arc<Self> {
        Arc::new(Self::Sphere {
            radius,
            width_segments: width_segments.max(3),
            height_segments: height_segments.max(2),
        })
    }

    /// True for geometries that are drawn as lines rather than triangles.
    pub fn is_line_list(&self) -> bool {
        matches!(self, Self::Edges(_))
    }

    pub fn mesh_data(&self) -> MeshData {
        match self {
            Self::Box {
                width,
                height,
                depth,
            } => box_data(*width, *height, *depth),
            Self::Plane { width, height } => plane_data(*width, *height),
            Self::Sphere {
                radius,
                width_segments,
                height_segments,
            } => sphere_data(*radius, *width_segments, *height_segments),
            Self::Custom(data) | Self::Edges(data) => data.clone(),
        }
    }

    /// Derives the visible edges of this geometry as a line list.
    ///
    /// Vertices are welded by position first, so seams from split normals or
    /// texture coordinates do not show up. An edge is kept when it borders a
    /// single triangle or when the normals of its two triangles differ by more
    /// than `threshold_degrees`.
    pub fn edges(&self, threshold_degrees: f32) -> Geometry {
        let data = self.mesh_data();
        if self.is_line_list() {
            return Geometry::Edges(data);
        }
        let threshold = threshold_degrees.to_radians().cos();

        let mut welded: HashMap<[i64; 3], u32> = HashMap::new();
        let mut out = MeshData::default();
        let weld_index: Vec<u32> = data
            .positions
            .iter()
            .map(|p| {
                let key = p.map(|c| (c * 1e4).round() as i64);
                *welded.entry(key).or_insert_with(|| {
                    out.push_vertex(*p, [0.0, 0.0, 0.0], [0.0, 0.0])
                })
            })
            .collect();

        // (low, high) vertex pair -> normals of the triangles sharing it
        let mut faces_per_edge: HashMap<(u32, u32), Vec<Vector3<f32>>> = HashMap::new();
        let mut order: Vec<(u32, u32)> = Vec::new();
        for tri in data.indices.chunks_exact(3) {
            let (Some(&a), Some(&b), Some(&c)) = (
                weld_index.get(tri[0] as usize),
                weld_index.get(tri[1] as usize),
                weld_index.get(tri[2] as usize),
            ) else {
                continue;
            };
            if a == b || b == c || a == c {
                continue;
            }
            let pa: Vector3<f32> = out.positions[a as usize].into();
            let pb: Vector3<f32> = out.positions[b as usize].into();
            let pc: Vector3<f32> = out.positions[c as usize].into();
            let normal = (pb - pa).cross(pc - pa);
            if normal.magnitude2() == 0.0 {
                continue;
            }
            let normal = normal.normalize();
            for (from, to) in [(a, b), (b, c), (c, a)] {
                let key = (from.min(to), from.max(to));
                let normals = faces_per_edge.entry(key).or_insert_with(|| {
                    order.push(key);
                    Vec::new()
                });
                normals.push(normal);
            }
        }

        for key in order {
            let normals = &faces_per_edge[&key];
            let keep = match normals.as_slice() {
                [_] => true,
                [first, second] => first.dot(*second) <= threshold,
                // non-manifold edges are always drawn
                _ => true,
            };
            if keep {
                out.indices.push(key.0);
                out.indices.push(key.1);
            }
        }
        Geometry::Edges(out)
    }
}

fn box_data(width: f32, height: f32, depth: f32) -> MeshData {
    let (hx, hy, hz) = (width / 2.0, height / 2.0, depth / 2.0);
    let mut data = MeshData::default();
    // (normal, u axis, v axis) per face; corners are normal*h + u*h + v*h
    let faces: [([f32; 3], [f32; 3], [f32; 3]); 6] = [
        ([1.0, 0.0, 0.0], [0.0, 0.0, -1.0], [0.0, 1.0, 0.0]),
        ([-1.0, 0.0, 0.0], [0.0, 0.0, 1.0], [0.0, 1.0, 0.0]),
        ([0.0, 1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, -1.0]),
        ([0.0, -1.0, 0.0], [1.0, 0.0, 0.0], [0.0, 0.0, 1.0]),
        ([0.0, 0.0, 1.0], [1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
        ([0.0, 0.0, -1.0], [-1.0, 0.0, 0.0], [0.0, 1.0, 0.0]),
    ];
    let half = [hx, hy, hz];
    for (normal, u, v) in faces {
        let corner = |su: f32, sv: f32| -> [f32; 3] {
            let mut p = [0.0; 3];
            for i in 0..3 {
                p[i] = (normal[i] + u[i] * su + v[i] * sv) * half[i];
            }
            p
        };
        let i0 = data.push_vertex(corner(-1.0, -1.0), normal, [0.0, 1.0]);
        let i1 = data.push_vertex(corner(1.0, -1.0), normal, [1.0, 1.0]);
        let i2 = data.push_vertex(corner(1.0, 1.0), normal, [1.0, 0.0]);
        let i3 = data.push_vertex(corner(-1.0, 1.0), normal, [0.0, 0.0]);
        data.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
    }
    data
}

fn plane_data(width: f32, height: f32) -> MeshData {
    let (hx, hy) = (width / 2.0, height / 2.0);
    let normal = [0.0, 0.0, 1.0];
    let mut data = MeshData::default();
    let i0 = data.push_vertex([-hx, -hy, 0.0], normal, [0.0, 1.0]);
    let i1 = data.push_vertex([hx, -hy, 0.0], normal, [1.0, 1.0]);
    let i2 = data.push_vertex([hx, hy, 0.0], normal, [1.0, 0.0]);
    let i3 = data.push_vertex([-hx, hy, 0.0], normal, [0.0, 0.0]);
    data.indices.extend_from_slice(&[i0, i1, i2, i0, i2, i3]);
    data
}

fn sphere_data(radius: f32, width_segments: u32, height_segments: u32) -> MeshData {
    let mut data = MeshData::default();
    for iy in 0..=height_segments {
        let v = iy as f32 / height_segments as f32;
        let theta = v * PI;
        for ix in 0..=width_segments {
            let u = ix as f32 / width_segments as f32;
            let phi = u * 2.0 * PI;
            let normal = [
                -phi.cos() * theta.sin(),
                theta.cos(),
                phi.sin() * theta.sin(),
            ];
            data.push_vertex(normal.map(|n| n * radius), normal, [u, v]);
        }
    }
    let row = width_segments + 1;
    for iy in 0..height_segments {
        for ix in 0..width_segments {
            let a = iy * row + ix + 1;
            let b = iy * row + ix;
            let c = (iy + 1) * row + ix;
            let d = (iy + 1) * row + ix + 1;
            if iy != 0 {
                data.indices.extend_from_slice(&[a, b, d]);
            }
            if iy != height_segments - 1 {
                data.indices.extend_from_slice(&[b, c, d]);
            }
        }
    }
    data
}
