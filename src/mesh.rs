use std::{collections::HashMap, path::Path};

use anyhow::{anyhow, bail, Context, Result};

use crate::{
    color::{Color, WHITE},
    vec::{Vec2, Vec3},
    Vertex,
};

/// An indexed triangle list.
#[derive(Clone, Debug, Default, PartialEq)]
pub struct Mesh {
    pub vertices: Vec<Vertex>,
    pub indices: Vec<u32>,
}

/// Vertex references of one face corner: position, uv and normal, 0-based.
type Corner = (usize, Option<usize>, Option<usize>);

impl Mesh {
    pub fn load_obj(path: impl AsRef<Path>) -> Result<Self> {
        let path = path.as_ref();
        let src = std::fs::read_to_string(path)
            .with_context(|| format!("failed to read file {path:?}"))?;
        let mesh = Self::parse_obj(&src).with_context(|| format!("failed to parse {path:?}"))?;
        log::debug!(
            "loaded {path:?}: {} vertices, {} triangles",
            mesh.vertices.len(),
            mesh.indices.len() / 3
        );
        Ok(mesh)
    }

    /// Parses the geometry of a Wavefront OBJ file: `v`, `vt`, `vn` and `f` statements. Faces
    /// with more than three corners are triangulated as fans. When the file has no normals, they
    /// are computed from the faces.
    pub fn parse_obj(src: &str) -> Result<Self> {
        let mut positions = Vec::new();
        let mut uvs = Vec::new();
        let mut normals = Vec::new();
        let mut corners: HashMap<Corner, u32> = HashMap::new();
        let mut mesh = Mesh::default();

        for (lineno, line) in src.lines().enumerate() {
            let lineno = lineno + 1;
            let mut it = line.split_ascii_whitespace();
            match it.next() {
                Some("v") => positions.push(parse_floats::<3>(it, lineno)?),
                Some("vt") => {
                    let [u, v] = parse_floats::<2>(it, lineno)?;
                    // OBJ puts the origin at the bottom left, textures start at the top.
                    uvs.push(Vec2::from([u, 1. - v]));
                }
                Some("vn") => normals.push(Vec3::from(parse_floats::<3>(it, lineno)?)),
                Some("f") => {
                    let face = it
                        .map(|corner| {
                            parse_corner(corner, positions.len(), uvs.len(), normals.len())
                                .with_context(|| format!("line {lineno}: bad face corner {corner:?}"))
                        })
                        .collect::<Result<Vec<_>>>()?;
                    if face.len() < 3 {
                        bail!("line {lineno}: face needs at least 3 corners");
                    }

                    let mut index_of = |corner: Corner| {
                        *corners.entry(corner).or_insert_with(|| {
                            let (pos, uv, normal) = corner;
                            mesh.vertices.push(Vertex::new(
                                Vec3::from(positions[pos]),
                                normal.map_or(Vec3::zero(), |i| normals[i]),
                                uv.map_or(Vec2::zero(), |i| uvs[i]),
                                WHITE,
                            ));
                            (mesh.vertices.len() - 1) as u32
                        })
                    };
                    let first = index_of(face[0]);
                    for pair in face[1..].windows(2) {
                        let (b, c) = (index_of(pair[0]), index_of(pair[1]));
                        mesh.indices.extend([first, b, c]);
                    }
                }
                _ => continue,
            }
        }

        if normals.is_empty() {
            mesh.compute_normals();
        }
        Ok(mesh)
    }

    /// Smooth per-vertex normals: the normalized sum of the normals of every adjacent face.
    pub fn compute_normals(&mut self) {
        for v in &mut self.vertices {
            v.normal = Vec3::zero();
        }
        for tri in self.indices.chunks_exact(3) {
            let [a, b, c] = [tri[0], tri[1], tri[2]].map(|i| i as usize);
            let [pa, pb, pc] = [a, b, c].map(|i| self.vertices[i].position.xyz());
            let normal = (pb - pa).cross(pc - pa);
            for i in [a, b, c] {
                self.vertices[i].normal += normal;
            }
        }
        for v in &mut self.vertices {
            v.normal = v.normal.normalized();
        }
    }

    /// A unit cube centered at the origin, with one quad per face so every face gets flat normals
    /// and its own `[0, 1]` UV square. Front faces wind counterclockwise around their normal.
    pub fn cube() -> Self {
        let x = Vec3::from([1., 0., 0.]);
        let y = Vec3::from([0., 1., 0.]);
        let z = Vec3::from([0., 0., 1.]);
        // (normal, u, v) with `u × v = normal`.
        let faces = [(x, y, z), (-x, z, y), (y, z, x), (-y, x, z), (z, x, y), (-z, y, x)];

        let mut mesh = Mesh::default();
        for (normal, u, v) in faces {
            let base = mesh.vertices.len() as u32;
            for (su, sv) in [(-1., -1.), (1., -1.), (1., 1.), (-1., 1.)] {
                let position = (normal + u * su + v * sv) * 0.5;
                let uv = Vec2::from([(su + 1.) * 0.5, (sv + 1.) * 0.5]);
                mesh.vertices.push(Vertex::new(position, normal, uv, WHITE));
            }
            mesh.indices
                .extend([base, base + 1, base + 2, base, base + 2, base + 3]);
        }
        mesh
    }
}

/// Line segments of a square grid on the `y = 0` plane, `2 * half_cells` cells across.
pub fn grid_lines(half_cells: i32, spacing: f32, color: Color) -> Vec<[Vertex; 2]> {
    let extent = half_cells as f32 * spacing;
    let point = |x: f32, z: f32| Vertex::new(Vec3::from([x, 0., z]), y_up(), Vec2::zero(), color);
    (-half_cells..=half_cells)
        .flat_map(|i| {
            let offset = i as f32 * spacing;
            [
                [point(offset, -extent), point(offset, extent)],
                [point(-extent, offset), point(extent, offset)],
            ]
        })
        .collect()
}

fn y_up() -> Vec3 {
    Vec3::from([0., 1., 0.])
}

fn parse_floats<'a, const N: usize>(
    mut it: impl Iterator<Item = &'a str>,
    lineno: usize,
) -> Result<[f32; N]> {
    let mut ret = [0.; N];
    for value in &mut ret {
        let token = it
            .next()
            .ok_or_else(|| anyhow!("line {lineno}: expected {N} numbers"))?;
        *value = token
            .parse()
            .with_context(|| format!("line {lineno}: invalid number {token:?}"))?;
    }
    Ok(ret)
}

/// Resolves a 1-based (or negative, relative to the end) OBJ index.
fn resolve(token: &str, len: usize) -> Result<usize> {
    let index: i64 = token.parse()?;
    let resolved = if index < 0 { len as i64 + index } else { index - 1 };
    if !(0..len as i64).contains(&resolved) {
        bail!("index {index} out of range for {len} elements");
    }
    Ok(resolved as usize)
}

fn parse_corner(corner: &str, positions: usize, uvs: usize, normals: usize) -> Result<Corner> {
    let mut parts = corner.split('/');
    let pos = resolve(parts.next().unwrap_or_default(), positions)?;
    let uv = match parts.next() {
        Some("") | None => None,
        Some(token) => Some(resolve(token, uvs)?),
    };
    let normal = match parts.next() {
        Some("") | None => None,
        Some(token) => Some(resolve(token, normals)?),
    };
    Ok((pos, uv, normal))
}
