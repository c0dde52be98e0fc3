use bytemuck::{Pod, Zeroable};
use glam::Vec3;
use glow::HasContext;

#[repr(C)]
#[derive(Copy, Clone, Debug, Default, Pod, Zeroable)]
pub struct Vertex {
    pub position: [f32; 3],
    pub normal: [f32; 3],
    pub tex_coords: [f32; 2],
}

// (normal, u, v) with u x v == normal, so quads come out counter-clockwise from outside
const FACES: [(Vec3, Vec3, Vec3); 6] = [
    (Vec3::X, Vec3::NEG_Z, Vec3::Y),
    (Vec3::NEG_X, Vec3::Z, Vec3::Y),
    (Vec3::Y, Vec3::X, Vec3::NEG_Z),
    (Vec3::NEG_Y, Vec3::X, Vec3::Z),
    (Vec3::Z, Vec3::X, Vec3::Y),
    (Vec3::NEG_Z, Vec3::NEG_X, Vec3::Y),
];

/// Unit cube centered on the origin: four vertices per face so every face gets its own
/// normal and full texture, plus the `TrianglesList` indices into them.
pub fn cube() -> (Vec<Vertex>, Vec<u32>) {
    let mut vertices = Vec::with_capacity(24);
    let mut indices = Vec::with_capacity(36);
    for (normal, u, v) in FACES {
        let base = u32::try_from(vertices.len()).unwrap_or(u32::MAX);
        for (su, sv) in [(-1.0, -1.0), (1.0, -1.0), (1.0, 1.0), (-1.0, 1.0)] {
            let corner = (normal + u * su + v * sv) * 0.5;
            vertices.push(Vertex {
                position: corner.into(),
                normal: normal.into(),
                tex_coords: [(su + 1.0) * 0.5, (sv + 1.0) * 0.5],
            });
        }
        indices.extend([0, 1, 2, 2, 3, 0].map(|i| base + i));
    }
    (vertices, indices)
}

/// Vertex array with its vertex and index buffers.
pub struct Mesh {
    vao: glow::VertexArray,
    vbo: glow::Buffer,
    ebo: glow::Buffer,
    index_count: i32,
}

impl Mesh {
    pub fn new(gl: &glow::Context, vertices: &[Vertex], indices: &[u32]) -> Result<Self, String> {
        let stride = std::mem::size_of::<Vertex>() as i32;
        let index_count = i32::try_from(indices.len()).map_err(|e| e.to_string())?;
        unsafe {
            let vao = gl.create_vertex_array()?;
            gl.bind_vertex_array(Some(vao));

            let vbo = gl.create_buffer()?;
            gl.bind_buffer(glow::ARRAY_BUFFER, Some(vbo));
            gl.buffer_data_u8_slice(
                glow::ARRAY_BUFFER,
                bytemuck::cast_slice(vertices),
                glow::STATIC_DRAW,
            );

            let ebo = gl.create_buffer()?;
            gl.bind_buffer(glow::ELEMENT_ARRAY_BUFFER, Some(ebo));
            gl.buffer_data_u8_slice(
                glow::ELEMENT_ARRAY_BUFFER,
                bytemuck::cast_slice(indices),
                glow::STATIC_DRAW,
            );

            gl.vertex_attrib_pointer_f32(0, 3, glow::FLOAT, false, stride, 0);
            gl.enable_vertex_attrib_array(0);
            gl.vertex_attrib_pointer_f32(1, 3, glow::FLOAT, false, stride, 12);
            gl.enable_vertex_attrib_array(1);
            gl.vertex_attrib_pointer_f32(2, 2, glow::FLOAT, false, stride, 24);
            gl.enable_vertex_attrib_array(2);

            // the element buffer binding is part of the VAO, so only the VAO is unbound
            gl.bind_vertex_array(None);
            gl.bind_buffer(glow::ARRAY_BUFFER, None);

            Ok(Self {
                vao,
                vbo,
                ebo,
                index_count,
            })
        }
    }

    /// Issues the draw call. The caller has already bound a program.
    pub fn draw(&self, gl: &glow::Context) {
        unsafe {
            gl.bind_vertex_array(Some(self.vao));
            gl.draw_elements(glow::TRIANGLES, self.index_count, glow::UNSIGNED_INT, 0);
            gl.bind_vertex_array(None);
        }
    }

    pub fn delete(self, gl: &glow::Context) {
        unsafe {
            gl.delete_vertex_array(self.vao);
            gl.delete_buffer(self.vbo);
            gl.delete_buffer(self.ebo);
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn winding(triangle: &[Vec3]) -> Vec3 {
        (triangle[1] - triangle[0]).cross(triangle[2] - triangle[0])
    }

    #[test]
    fn cube_has_four_vertices_per_face() {
        let (vertices, indices) = cube();
        assert_eq!(vertices.len(), 24);
        assert_eq!(indices.len(), 36);
        assert!(indices.iter().all(|&i| (i as usize) < vertices.len()));
    }

    #[test]
    fn triangles_wind_counter_clockwise_from_outside() {
        let (vertices, indices) = cube();
        for tri in indices.chunks(3) {
            let points: Vec<Vec3> = tri
                .iter()
                .map(|&i| Vec3::from(vertices[i as usize].position))
                .collect();
            let normal = Vec3::from(vertices[tri[0] as usize].normal);
            assert!(winding(&points).dot(normal) > 0.0);
        }
    }
}
