//! # Resource loading
//!
//! Reads the assets the viewer needs from disk: triangle meshes (Wavefront OBJ or a small
//! ad-hoc text format), and WGSL shader source. Textures live in [`crate::texture`] because they
//! need the GPU queue to upload their mip levels.
//!
//! OBJ models are authored Y-up while the scene is Z-up, so positions and normals are rotated
//! with `(x, y, z) -> (x, -z, y)` on load, and the V texture coordinate is flipped because image
//! rows start at the top.

use std::io::BufRead;
use std::path::Path;

use crate::error::{Error, Result};
use crate::vertex::Vertex;

/// Color given to OBJ vertices when the file has no `v x y z r g b` colors.
const DEFAULT_VERTEX_COLOR: [f32; 3] = [1.0, 1.0, 1.0];

/// Loads an OBJ file and expands it into a flat triangle list.
pub fn load_geometry_from_obj(path: impl AsRef<Path>) -> Result<Vec<Vertex>> {
    let path = path.as_ref();
    let file = std::fs::File::open(path).map_err(Error::io_ctx(path))?;
    let vertices = vertices_from_obj(std::io::BufReader::new(file))?;
    log::info!("Loaded {} vertices from {path:?}", vertices.len());
    Ok(vertices)
}

/// Parses OBJ data from `reader`. Polygons are triangulated, and every face must reference
/// normals and texture coordinates. Material libraries are ignored.
pub fn vertices_from_obj(mut reader: impl BufRead) -> Result<Vec<Vertex>> {
    let options = tobj::LoadOptions {
        single_index: false,
        triangulate: true,
        ..Default::default()
    };
    let (models, _materials) = tobj::load_obj_buf(&mut reader, &options, |_| {
        Err(tobj::LoadError::OpenFileFailed)
    })?;

    let mut vertices = Vec::new();
    for model in &models {
        append_mesh(&model.mesh, &mut vertices)?;
    }
    Ok(vertices)
}

fn append_mesh(mesh: &tobj::Mesh, out: &mut Vec<Vertex>) -> Result<()> {
    if mesh.normal_indices.len() != mesh.indices.len() {
        return Err(Error::MissingObjAttribute("normals"));
    }
    if mesh.texcoord_indices.len() != mesh.indices.len() {
        return Err(Error::MissingObjAttribute("texture coordinates"));
    }

    let corners = mesh
        .indices
        .iter()
        .zip(&mesh.normal_indices)
        .zip(&mesh.texcoord_indices);
    for ((&position, &normal), &texcoord) in corners {
        let p = 3 * position as usize;
        let n = 3 * normal as usize;
        let t = 2 * texcoord as usize;

        let color = match mesh.vertex_color.get(p..p + 3) {
            Some(&[r, g, b]) => [r, g, b],
            _ => DEFAULT_VERTEX_COLOR,
        };

        out.push(Vertex {
            position: [
                mesh.positions[p],
                -mesh.positions[p + 2],
                mesh.positions[p + 1],
            ],
            normal: [mesh.normals[n], -mesh.normals[n + 2], mesh.normals[n + 1]],
            color,
            uv: [mesh.texcoords[t], 1.0 - mesh.texcoords[t + 1]],
        });
    }
    Ok(())
}

/// Loads a mesh, picking the parser from the file extension: `.obj` files go through
/// [`load_geometry_from_obj`], anything else is read as the ad-hoc format with 3D points.
pub fn load_mesh(path: impl AsRef<Path>) -> Result<Vec<Vertex>> {
    let path = path.as_ref();
    let is_obj = path
        .extension()
        .is_some_and(|ext| ext.eq_ignore_ascii_case("obj"));
    if is_obj {
        return load_geometry_from_obj(path);
    }

    let (points, indices) = load_geometry(path, 3)?;
    let vertices = vertices_from_geometry(&points, &indices)?;
    log::info!("Loaded {} vertices from {path:?}", vertices.len());
    Ok(vertices)
}

/// Expands 3D `x y z r g b` points into a triangle list. The ad-hoc format has no normals or
/// texture coordinates, so every vertex faces +Z and samples the texture's corner.
pub fn vertices_from_geometry(points: &[f32], indices: &[u16]) -> Result<Vec<Vertex>> {
    let points: Vec<&[f32]> = points.chunks_exact(6).collect();
    indices
        .iter()
        .map(|&index| {
            let point = points.get(index as usize).ok_or_else(|| Error::Geometry {
                line: 0,
                message: format!("index {index} out of range ({} points)", points.len()),
            })?;
            Ok(Vertex {
                position: [point[0], point[1], point[2]],
                normal: [0.0, 0.0, 1.0],
                color: [point[3], point[4], point[5]],
                uv: [0.0, 0.0],
            })
        })
        .collect()
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Section {
    None,
    Points,
    Indices,
}

/// Loads a file in the ad-hoc geometry format, see [`parse_geometry`].
pub fn load_geometry(path: impl AsRef<Path>, dimensions: usize) -> Result<(Vec<f32>, Vec<u16>)> {
    let path = path.as_ref();
    let text = std::fs::read_to_string(path).map_err(Error::io_ctx(path))?;
    parse_geometry(&text, dimensions)
}

/// Parses the ad-hoc geometry format:
///
/// ```text
/// [points]
/// # x y r g b   (dimensions = 2)
/// -0.5 -0.5 1.0 0.0 0.0
/// [indices]
/// 0 1 2
/// ```
///
/// Each line under `[points]` holds `dimensions` coordinates followed by an RGB color, each line
/// under `[indices]` one triangle. Blank lines and `#` comments are skipped, and lines before
/// the first section header are ignored.
pub fn parse_geometry(text: &str, dimensions: usize) -> Result<(Vec<f32>, Vec<u16>)> {
    let mut points = Vec::new();
    let mut indices = Vec::new();
    let mut section = Section::None;

    for (number, line) in text.lines().enumerate() {
        let line = line.trim();
        match line {
            "[points]" => section = Section::Points,
            "[indices]" => section = Section::Indices,
            _ if line.is_empty() || line.starts_with('#') => {}
            _ => match section {
                Section::Points => parse_values(line, number + 1, dimensions + 3, &mut points)?,
                Section::Indices => parse_values(line, number + 1, 3, &mut indices)?,
                Section::None => {}
            },
        }
    }

    Ok((points, indices))
}

fn parse_values<T: std::str::FromStr>(
    line: &str,
    number: usize,
    count: usize,
    out: &mut Vec<T>,
) -> Result<()> {
    let mut parsed = 0;
    for token in line.split_whitespace().take(count) {
        let value = token.parse().map_err(|_| Error::Geometry {
            line: number,
            message: format!("invalid number {token:?}"),
        })?;
        out.push(value);
        parsed += 1;
    }
    if parsed < count {
        return Err(Error::Geometry {
            line: number,
            message: format!("expected {count} values, found {parsed}"),
        });
    }
    Ok(())
}

/// Reads a WGSL file verbatim.
pub fn load_shader_source(path: impl AsRef<Path>) -> Result<String> {
    let path = path.as_ref();
    std::fs::read_to_string(path).map_err(Error::io_ctx(path))
}

pub fn create_shader_module(
    device: &wgpu::Device,
    label: &str,
    source: &str,
) -> wgpu::ShaderModule {
    device.create_shader_module(wgpu::ShaderModuleDescriptor {
        label: Some(label),
        source: wgpu::ShaderSource::Wgsl(std::borrow::Cow::Borrowed(source)),
    })
}

#[cfg(test)]
mod tests {
    use super::*;

    const TRIANGLE_OBJ: &str = "\
v 1.0 2.0 3.0
v 4.0 5.0 6.0
v 7.0 8.0 9.0
vt 0.0 0.25
vt 1.0 0.0
vt 0.0 1.0
vn 0.0 1.0 0.0
f 1/1/1 2/2/1 3/3/1
";

    #[test]
    fn obj_is_rotated_to_z_up() {
        let vertices = vertices_from_obj(TRIANGLE_OBJ.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 3);
        assert_eq!(vertices[0].position, [1.0, -3.0, 2.0]);
        assert_eq!(vertices[2].position, [7.0, -9.0, 8.0]);
        assert_eq!(vertices[0].normal, [0.0, 0.0, 1.0]);
        assert_eq!(vertices[0].uv, [0.0, 0.75]);
        assert_eq!(vertices[1].uv, [1.0, 1.0]);
        assert_eq!(vertices[0].color, DEFAULT_VERTEX_COLOR);
    }

    #[test]
    fn shared_obj_vertices_are_expanded() {
        let quad = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
f 1/1/1 3/1/1 4/1/1
";
        let vertices = vertices_from_obj(quad.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[0], vertices[3]);
        assert_eq!(vertices[2], vertices[4]);
    }

    #[test]
    fn quads_are_triangulated() {
        let quad = "\
v 0 0 0
v 1 0 0
v 1 1 0
v 0 1 0
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1 4/1/1
";
        let vertices = vertices_from_obj(quad.as_bytes()).unwrap();
        assert_eq!(vertices.len(), 6);
        for vertex in &vertices {
            assert_eq!(vertex.normal, [0.0, -1.0, 0.0]);
        }
        for corner in [[0.0, 0.0, 0.0], [1.0, 0.0, 0.0], [1.0, 0.0, 1.0], [0.0, 0.0, 1.0]] {
            assert!(vertices.iter().any(|v| v.position == corner));
        }
    }

    #[test]
    fn obj_vertex_colors_are_kept() {
        let obj = "\
v 0 0 0 1 0 0
v 1 0 0 0 1 0
v 0 1 0 0 0 1
vt 0 0
vn 0 0 1
f 1/1/1 2/1/1 3/1/1
";
        let vertices = vertices_from_obj(obj.as_bytes()).unwrap();
        assert_eq!(vertices[0].color, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[2].color, [0.0, 0.0, 1.0]);
    }

    #[test]
    fn obj_without_normals_is_an_error() {
        let obj = "v 0 0 0\nv 1 0 0\nv 0 1 0\nf 1 2 3\n";
        assert!(matches!(
            vertices_from_obj(obj.as_bytes()),
            Err(Error::MissingObjAttribute("normals"))
        ));
    }

    #[test]
    fn parses_sections_comments_and_crlf() {
        let text = "# pyramid\r\n[points]\r\n-0.5 -0.5 1.0 0.0 0.0\r\n\r\n0.5 -0.5 0.0 1.0 0.0\r\n0.0 0.5 0.0 0.0 1.0\r\n[indices]\r\n# one triangle\r\n0 1 2\r\n";
        let (points, indices) = parse_geometry(text, 2).unwrap();
        assert_eq!(points.len(), 15);
        assert_eq!(points[..5], [-0.5f32, -0.5, 1.0, 0.0, 0.0]);
        assert_eq!(indices, vec![0, 1, 2]);
    }

    #[test]
    fn lines_before_a_section_are_ignored() {
        let (points, indices) = parse_geometry("1 2 3\n[indices]\n3 4 5\n", 3).unwrap();
        assert!(points.is_empty());
        assert_eq!(indices, vec![3, 4, 5]);
    }

    #[test]
    fn bad_numbers_report_the_line() {
        let err = parse_geometry("[points]\n0 0 0 0 0\n0 zero 0 0 0\n", 2).unwrap_err();
        assert!(matches!(err, Error::Geometry { line: 3, .. }));

        let err = parse_geometry("[indices]\n0 1\n", 2).unwrap_err();
        assert!(matches!(err, Error::Geometry { line: 2, .. }));
    }

    #[test]
    fn geometry_points_become_vertices() {
        let (points, indices) =
            parse_geometry("[points]\n0 0 0 1 0 0\n1 0 0 0 1 0\n0 1 0 0 0 1\n[indices]\n0 1 2\n2 1 0\n", 3)
                .unwrap();
        let vertices = vertices_from_geometry(&points, &indices).unwrap();
        assert_eq!(vertices.len(), 6);
        assert_eq!(vertices[1].position, [1.0, 0.0, 0.0]);
        assert_eq!(vertices[1].color, [0.0, 1.0, 0.0]);
        assert_eq!(vertices[0], vertices[5]);

        assert!(matches!(
            vertices_from_geometry(&points, &[0, 1, 3]),
            Err(Error::Geometry { .. })
        ));
    }

    #[test]
    fn bundled_pyramid_loads_by_extension() {
        let path = Path::new(env!("CARGO_MANIFEST_DIR")).join("resources/pyramid.txt");
        let vertices = load_mesh(path).unwrap();
        assert_eq!(vertices.len(), 18);
        assert_eq!(vertices[2].position, [0.5, 0.5, -0.3]);
        assert_eq!(vertices[5].color, [1.0, 1.0, 1.0]);
    }

    #[test]
    fn missing_shader_names_the_path() {
        match load_shader_source("no/such/shader.wgsl") {
            Err(Error::Io { path, .. }) => assert!(path.ends_with("shader.wgsl")),
            other => panic!("unexpected result: {other:?}"),
        }
    }
}
