use crossterm::style::Color;

pub type Vec3 = [f64; 3];
pub type Mat3 = [[f64; 3]; 3];

pub const IDENTITY: Mat3 = [[1.0, 0.0, 0.0], [0.0, 1.0, 0.0], [0.0, 0.0, 1.0]];

/// Multiplies a 3x3 matrix by a 3-dimensional vector
pub fn multiply_matrix_vector(matrix: &Mat3, vector: &Vec3) -> Vec3 {
    let mut result = [0.0; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i] += matrix[i][j] * vector[j];
        }
    }
    result
}

/// Multiplies two 3x3 matrices
pub fn multiply_matrices(a: &Mat3, b: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            for k in 0..3 {
                result[i][j] += a[i][k] * b[k][j];
            }
        }
    }
    result
}

pub fn transpose(m: &Mat3) -> Mat3 {
    let mut result = [[0.0; 3]; 3];
    for i in 0..3 {
        for j in 0..3 {
            result[i][j] = m[j][i];
        }
    }
    result
}

/// Rotation around the X-axis
pub fn rotation_x(angle: f64) -> Mat3 {
    let (sin_a, cos_a) = angle.sin_cos();
    [[1.0, 0.0, 0.0], [0.0, cos_a, -sin_a], [0.0, sin_a, cos_a]]
}

/// Rotation around the Y-axis
pub fn rotation_y(angle: f64) -> Mat3 {
    let (sin_a, cos_a) = angle.sin_cos();
    [[cos_a, 0.0, sin_a], [0.0, 1.0, 0.0], [-sin_a, 0.0, cos_a]]
}

pub fn add(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] + b[0], a[1] + b[1], a[2] + b[2]]
}

pub fn sub(a: &Vec3, b: &Vec3) -> Vec3 {
    [a[0] - b[0], a[1] - b[1], a[2] - b[2]]
}

pub fn scale(a: &Vec3, s: f64) -> Vec3 {
    [a[0] * s, a[1] * s, a[2] * s]
}

pub fn dot(a: &Vec3, b: &Vec3) -> f64 {
    a[0] * b[0] + a[1] * b[1] + a[2] * b[2]
}

pub fn cross(a: &Vec3, b: &Vec3) -> Vec3 {
    [
        a[1] * b[2] - a[2] * b[1],
        a[2] * b[0] - a[0] * b[2],
        a[0] * b[1] - a[1] * b[0],
    ]
}

pub fn length(a: &Vec3) -> f64 {
    dot(a, a).sqrt()
}

pub fn normalize(a: &Vec3) -> Vec3 {
    let length = length(a);
    if length == 0.0 {
        return *a;
    }
    [a[0] / length, a[1] / length, a[2] / length]
}

/// Edge function used in rasterization
pub fn edge_function(a: &[f64; 2], b: &[f64; 2], c: &[f64; 2]) -> f64 {
    (c[0] - a[0]) * (b[1] - a[1]) - (c[1] - a[1]) * (b[0] - a[0])
}

/// Omnidirectional light with linear falloff
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct PointLight {
    pub position: Vec3,
    pub intensity: f64,
    /// Distance at which the light fades out completely
    pub range: f64,
}

/// Light level every lit surface gets even when facing away from the light
pub const AMBIENT_INTENSITY: f64 = 0.1;

/// Calculates the light intensity based on the normal vector and light position
pub fn calculate_light_intensity(normal: &Vec3, position: &Vec3, light: &PointLight) -> f64 {
    let to_light = sub(&light.position, position);
    let distance = length(&to_light);
    if distance == 0.0 {
        return light.intensity.max(AMBIENT_INTENSITY);
    }
    let light_dir = scale(&to_light, 1.0 / distance);
    let attenuation = (1.0 - distance / light.range).max(0.0);
    let dot_product = dot(normal, &light_dir).max(0.0);
    (dot_product * light.intensity * attenuation).max(AMBIENT_INTENSITY)
}

/// Converts a `0xRRGGBB` value to a terminal colour
pub fn rgb(hex: u32) -> Color {
    Color::Rgb {
        r: ((hex >> 16) & 0xff) as u8,
        g: ((hex >> 8) & 0xff) as u8,
        b: (hex & 0xff) as u8,
    }
}

/// Applies lighting to a colour
pub fn apply_lighting(color: Color, intensity: f64) -> Color {
    match color {
        Color::Rgb { r, g, b } => Color::Rgb {
            r: (r as f64 * intensity).min(255.0) as u8,
            g: (g as f64 * intensity).min(255.0) as u8,
            b: (b as f64 * intensity).min(255.0) as u8,
        },
        other => other,
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn assert_vec_close(a: Vec3, b: Vec3) {
        for i in 0..3 {
            assert!((a[i] - b[i]).abs() < 1e-12, "{:?} != {:?}", a, b);
        }
    }

    #[test]
    fn rotation_y_turns_x_towards_negative_z() {
        let rotation = rotation_y(std::f64::consts::FRAC_PI_2);
        let rotated = multiply_matrix_vector(&rotation, &[1.0, 0.0, 0.0]);
        assert_vec_close(rotated, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn rotation_x_lays_xy_plane_flat() {
        let rotated =
            multiply_matrix_vector(&rotation_x(-std::f64::consts::FRAC_PI_2), &[0.0, 1.0, 0.0]);
        assert_vec_close(rotated, [0.0, 0.0, -1.0]);
    }

    #[test]
    fn identity_is_neutral() {
        let m = rotation_y(0.7);
        assert_eq!(multiply_matrices(&IDENTITY, &m), m);
    }

    #[test]
    fn light_facing_surface_is_brighter_than_ambient() {
        let light = PointLight {
            position: [0.0, 0.0, 0.0],
            intensity: 2.0,
            range: 300.0,
        };
        let facing = calculate_light_intensity(&[-1.0, 0.0, 0.0], &[50.0, 0.0, 0.0], &light);
        let away = calculate_light_intensity(&[1.0, 0.0, 0.0], &[50.0, 0.0, 0.0], &light);
        assert!(facing > 1.0);
        assert_eq!(away, AMBIENT_INTENSITY);
    }

    #[test]
    fn light_fades_beyond_range() {
        let light = PointLight {
            position: [0.0, 0.0, 0.0],
            intensity: 2.0,
            range: 300.0,
        };
        let far = calculate_light_intensity(&[-1.0, 0.0, 0.0], &[400.0, 0.0, 0.0], &light);
        assert_eq!(far, AMBIENT_INTENSITY);
    }

    #[test]
    fn lighting_scales_and_saturates() {
        assert_eq!(
            apply_lighting(rgb(0x804020), 0.5),
            Color::Rgb { r: 64, g: 32, b: 16 }
        );
        assert_eq!(
            apply_lighting(rgb(0x808080), 4.0),
            Color::Rgb { r: 255, g: 255, b: 255 }
        );
    }
}
