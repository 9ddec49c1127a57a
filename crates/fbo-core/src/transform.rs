//! 4x4 transforms for the projection installed with each render target.

/// Column-major 4x4 matrix: `m[column][row]`, translation in `m[3]`.
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Transform {
    pub m: [[f32; 4]; 4],
}

impl Transform {
    pub fn identity() -> Self {
        let mut m = [[0.0; 4]; 4];
        for (i, column) in m.iter_mut().enumerate() {
            column[i] = 1.0;
        }
        Self { m }
    }

    /// Orthographic projection mapping `(left, top)` to clip-space
    /// `(-1, 1)` and `(right, bottom)` to `(1, -1)`.
    ///
    /// Passing `top = 0, bottom = h` gives the top-down pixel convention used
    /// for both the backbuffer and off-screen targets.
    pub fn orthographic(left: f32, top: f32, near: f32, right: f32, bottom: f32, far: f32) -> Self {
        let delta_x = right - left;
        let delta_y = top - bottom;
        let delta_z = far - near;

        let mut t = Self::identity();
        t.m[0][0] = 2.0 / delta_x;
        t.m[1][1] = 2.0 / delta_y;
        t.m[2][2] = 2.0 / delta_z;
        t.m[3][0] = -(right + left) / delta_x;
        t.m[3][1] = -(top + bottom) / delta_y;
        t.m[3][2] = -(far + near) / delta_z;
        t
    }

    /// Projection for a `width` x `height` pixel surface with depth range
    /// `[-1, 1]`.
    pub fn pixel_projection(width: u32, height: u32) -> Self {
        Self::orthographic(0.0, 0.0, -1.0, width as f32, height as f32, 1.0)
    }

    /// `self * other`, i.e. apply `other` first.
    pub fn compose(&self, other: &Transform) -> Transform {
        let mut out = [[0.0; 4]; 4];
        for (col, out_col) in out.iter_mut().enumerate() {
            for (row, cell) in out_col.iter_mut().enumerate() {
                *cell = (0..4).map(|k| self.m[k][row] * other.m[col][k]).sum();
            }
        }
        Transform { m: out }
    }

    pub fn transform_point(&self, x: f32, y: f32, z: f32) -> (f32, f32, f32) {
        let m = &self.m;
        (
            m[0][0] * x + m[1][0] * y + m[2][0] * z + m[3][0],
            m[0][1] * x + m[1][1] * y + m[2][1] * z + m[3][1],
            m[0][2] * x + m[1][2] * y + m[2][2] * z + m[3][2],
        )
    }

    /// Flattened column-major array, ready for `glUniformMatrix4fv`.
    pub fn as_array(&self) -> [f32; 16] {
        let mut out = [0.0; 16];
        for (col, column) in self.m.iter().enumerate() {
            out[col * 4..col * 4 + 4].copy_from_slice(column);
        }
        out
    }
}

impl Default for Transform {
    fn default() -> Self {
        Self::identity()
    }
}
