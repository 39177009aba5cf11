use crate::camera::{Camera, CELL_ASPECT};
use crate::math::{
    add, apply_lighting, calculate_light_intensity, edge_function, multiply_matrix_vector, scale,
    transpose, Mat3, PointLight, Vec3,
};
use crate::vertex::Vertex;
use crossterm::style::Color;

/// One character cell of the output surface
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct Cell {
    pub ch: char,
    pub fg: Color,
    pub bg: Color,
}

impl Cell {
    pub const BLANK: Cell = Cell {
        ch: ' ',
        fg: Color::Reset,
        bg: Color::Reset,
    };

    pub fn new(ch: char, fg: Color) -> Self {
        Cell {
            ch,
            fg,
            bg: Color::Reset,
        }
    }
}

/// Character cells plus a depth buffer
#[derive(Clone, Debug)]
pub struct FrameBuffer {
    width: usize,
    height: usize,
    cells: Vec<Cell>,
    depth: Vec<f64>,
}

impl FrameBuffer {
    pub fn new(width: u16, height: u16) -> Self {
        let (width, height) = (width as usize, height as usize);
        FrameBuffer {
            width,
            height,
            cells: vec![Cell::BLANK; width * height],
            depth: vec![f64::INFINITY; width * height],
        }
    }

    pub fn resize(&mut self, width: u16, height: u16) {
        *self = FrameBuffer::new(width, height);
    }

    pub fn clear(&mut self) {
        self.cells.fill(Cell::BLANK);
        self.depth.fill(f64::INFINITY);
    }

    pub fn width(&self) -> usize {
        self.width
    }

    pub fn height(&self) -> usize {
        self.height
    }

    pub fn cells(&self) -> &[Cell] {
        &self.cells
    }

    pub fn cell(&self, x: usize, y: usize) -> Option<&Cell> {
        if x >= self.width || y >= self.height {
            return None;
        }
        self.cells.get(y * self.width + x)
    }

    /// Writes a cell if it lies on the surface and is nearer than what is already there
    pub fn plot(&mut self, x: isize, y: isize, depth: f64, cell: Cell) -> bool {
        if x < 0 || y < 0 || x as usize >= self.width || y as usize >= self.height {
            return false;
        }
        let offset = y as usize * self.width + x as usize;
        if depth >= self.depth[offset] {
            return false;
        }
        self.depth[offset] = depth;
        self.cells[offset] = cell;
        true
    }

    /// Writes text over everything, clipped at the right and bottom edges
    pub fn put_str(&mut self, x: usize, y: usize, text: &str, fg: Color, bg: Color) {
        if y >= self.height {
            return;
        }
        for (i, ch) in text.chars().enumerate() {
            let column = x + i;
            if column >= self.width {
                break;
            }
            let offset = y * self.width + column;
            self.cells[offset] = Cell { ch, fg, bg };
            self.depth[offset] = f64::NEG_INFINITY;
        }
    }

    /// Paints a background rectangle over everything
    pub fn fill_rect(&mut self, x: usize, y: usize, width: usize, height: usize, bg: Color) {
        for row in y..(y + height).min(self.height) {
            for column in x..(x + width).min(self.width) {
                let offset = row * self.width + column;
                self.cells[offset] = Cell { ch: ' ', fg: Color::Reset, bg };
                self.depth[offset] = f64::NEG_INFINITY;
            }
        }
    }
}

/// How a sphere reacts to light
#[derive(Clone, Copy, Debug)]
pub enum Surface<'a> {
    /// Flat colour, unaffected by lights
    Basic(Color),
    /// Lambert shading with longitudinal bands that turn with the body
    Standard {
        color: Color,
        light: &'a PointLight,
        orientation: Mat3,
    },
}

/// Picks a block glyph for a light level
pub fn shade_char(intensity: f64) -> char {
    if intensity >= 0.75 {
        '█'
    } else if intensity >= 0.5 {
        '▓'
    } else if intensity >= 0.25 {
        '▒'
    } else {
        '░'
    }
}

/// Darkens every other band of longitude in the body's own frame
fn band_factor(normal: &Vec3, orientation: &Mat3) -> f64 {
    let local = multiply_matrix_vector(&transpose(orientation), normal);
    let longitude = local[0].atan2(local[2]);
    if (longitude * 3.0).sin() >= 0.0 {
        1.0
    } else {
        0.75
    }
}

/// Draws a sphere with per-cell lighting
pub fn draw_sphere(
    frame: &mut FrameBuffer,
    camera: &Camera,
    eye: &Vec3,
    basis: &[Vec3; 3],
    center: &Vec3,
    radius: f64,
    surface: Surface,
) {
    let Some(projection) = camera.project_with(center, eye, basis) else {
        return;
    };

    // Vertical and horizontal radii in cells
    let ry = radius * projection.scale;
    let rx = ry / CELL_ASPECT;

    let base_color = match surface {
        Surface::Basic(color) => color,
        Surface::Standard { color, .. } => color,
    };

    // Too small to cover a cell; draw a single marker
    if rx < 0.5 && ry < 0.5 {
        frame.plot(
            projection.x.floor() as isize,
            projection.y.floor() as isize,
            projection.depth - radius,
            Cell::new('•', base_color),
        );
        return;
    }

    let min_x = (projection.x - rx).floor() as isize;
    let max_x = (projection.x + rx).ceil() as isize;
    let min_y = (projection.y - ry).floor() as isize;
    let max_y = (projection.y + ry).ceil() as isize;

    for y in min_y.max(0)..=max_y.min(frame.height() as isize - 1) {
        for x in min_x.max(0)..=max_x.min(frame.width() as isize - 1) {
            let dx = (x as f64 + 0.5 - projection.x) / rx;
            let dy = (y as f64 + 0.5 - projection.y) / ry;
            let distance_squared = dx * dx + dy * dy;
            if distance_squared > 1.0 {
                continue;
            }
            let dz = (1.0 - distance_squared).sqrt();

            // Screen rows grow downwards and the visible face points back at the eye
            let normal = camera.view_offset(basis, dx, -dy, -dz);
            let depth = projection.depth - dz * radius;

            let cell = match surface {
                Surface::Basic(color) => Cell::new('█', color),
                Surface::Standard {
                    color,
                    light,
                    orientation,
                } => {
                    let point = add(center, &scale(&normal, radius));
                    let intensity = calculate_light_intensity(&normal, &point, light)
                        * band_factor(&normal, &orientation);
                    Cell::new(shade_char(intensity), apply_lighting(color, intensity))
                }
            };
            frame.plot(x, y, depth, cell);
        }
    }
}

/// Rasterizes a triangle with a depth test. Both windings are filled.
pub fn draw_triangle(v0: &Vertex, v1: &Vertex, v2: &Vertex, frame: &mut FrameBuffer, cell: Cell) {
    if frame.width() == 0 || frame.height() == 0 {
        return;
    }

    // Compute bounding box of the triangle
    let min_x = v0.screen_position[0]
        .min(v1.screen_position[0])
        .min(v2.screen_position[0])
        .floor()
        .max(0.0) as usize;
    let max_x = v0.screen_position[0]
        .max(v1.screen_position[0])
        .max(v2.screen_position[0])
        .ceil()
        .min(frame.width() as f64 - 1.0) as usize;
    let min_y = v0.screen_position[1]
        .min(v1.screen_position[1])
        .min(v2.screen_position[1])
        .floor()
        .max(0.0) as usize;
    let max_y = v0.screen_position[1]
        .max(v1.screen_position[1])
        .max(v2.screen_position[1])
        .ceil()
        .min(frame.height() as f64 - 1.0) as usize;

    let area = edge_function(&v0.screen_position, &v1.screen_position, &v2.screen_position);
    if area == 0.0 {
        return;
    }

    for y in min_y..=max_y {
        for x in min_x..=max_x {
            let p = [x as f64 + 0.5, y as f64 + 0.5];

            // Dividing by the signed area makes the weights positive inside for either winding
            let w0 = edge_function(&v1.screen_position, &v2.screen_position, &p) / area;
            let w1 = edge_function(&v2.screen_position, &v0.screen_position, &p) / area;
            let w2 = edge_function(&v0.screen_position, &v1.screen_position, &p) / area;

            if w0 >= 0.0 && w1 >= 0.0 && w2 >= 0.0 {
                let depth = v0.depth * w0 + v1.depth * w1 + v2.depth * w2;
                frame.plot(x as isize, y as isize, depth, cell);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::camera::Viewport;
    use crate::math::{rgb, IDENTITY};

    fn vertex(x: f64, y: f64, depth: f64) -> Vertex {
        Vertex {
            screen_position: [x, y],
            depth,
        }
    }

    #[test]
    fn plot_keeps_the_nearest_cell() {
        let mut frame = FrameBuffer::new(4, 4);
        assert!(frame.plot(1, 1, 10.0, Cell::new('a', Color::White)));
        assert!(!frame.plot(1, 1, 20.0, Cell::new('b', Color::White)));
        assert!(frame.plot(1, 1, 5.0, Cell::new('c', Color::White)));
        assert_eq!(frame.cell(1, 1).unwrap().ch, 'c');
        assert!(!frame.plot(-1, 0, 1.0, Cell::new('d', Color::White)));
        assert!(!frame.plot(4, 0, 1.0, Cell::new('d', Color::White)));
    }

    #[test]
    fn put_str_clips_and_covers_geometry() {
        let mut frame = FrameBuffer::new(5, 2);
        frame.put_str(3, 0, "hello", Color::White, Color::Reset);
        assert_eq!(frame.cell(3, 0).unwrap().ch, 'h');
        assert_eq!(frame.cell(4, 0).unwrap().ch, 'e');
        assert!(!frame.plot(3, 0, 0.0, Cell::new('x', Color::White)));
        frame.put_str(0, 5, "ignored", Color::White, Color::Reset);
    }

    #[test]
    fn clear_resets_cells_and_depth() {
        let mut frame = FrameBuffer::new(3, 3);
        frame.plot(0, 0, 1.0, Cell::new('x', Color::White));
        frame.clear();
        assert!(frame.cells().iter().all(|c| *c == Cell::BLANK));
        assert!(frame.plot(0, 0, 100.0, Cell::new('y', Color::White)));
    }

    #[test]
    fn triangle_fills_either_winding() {
        let cell = Cell::new('#', Color::Grey);
        let mut clockwise = FrameBuffer::new(10, 10);
        draw_triangle(
            &vertex(0.0, 0.0, 1.0),
            &vertex(10.0, 0.0, 1.0),
            &vertex(0.0, 10.0, 1.0),
            &mut clockwise,
            cell,
        );
        let mut counter = FrameBuffer::new(10, 10);
        draw_triangle(
            &vertex(0.0, 0.0, 1.0),
            &vertex(0.0, 10.0, 1.0),
            &vertex(10.0, 0.0, 1.0),
            &mut counter,
            cell,
        );
        assert_eq!(clockwise.cell(1, 1).unwrap().ch, '#');
        assert_eq!(counter.cell(1, 1).unwrap().ch, '#');
        assert_eq!(clockwise.cell(9, 9).unwrap().ch, ' ');
    }

    #[test]
    fn degenerate_triangle_draws_nothing() {
        let mut frame = FrameBuffer::new(5, 5);
        draw_triangle(
            &vertex(0.0, 0.0, 1.0),
            &vertex(2.0, 2.0, 1.0),
            &vertex(4.0, 4.0, 1.0),
            &mut frame,
            Cell::new('#', Color::Grey),
        );
        assert!(frame.cells().iter().all(|c| *c == Cell::BLANK));
    }

    #[test]
    fn sun_sized_sphere_covers_the_centre() {
        let camera = Camera::new(Viewport {
            width: 80,
            height: 24,
        });
        let mut frame = FrameBuffer::new(80, 24);
        let eye = camera.position();
        let basis = camera.basis();
        draw_sphere(
            &mut frame,
            &camera,
            &eye,
            &basis,
            &[0.0, 0.0, 0.0],
            10.0,
            Surface::Basic(rgb(0xffdd00)),
        );
        let centre = frame.cell(40, 12).unwrap();
        assert_eq!(centre.ch, '█');
        assert_eq!(centre.fg, rgb(0xffdd00));
        assert_eq!(frame.cell(0, 0).unwrap().ch, ' ');
    }

    #[test]
    fn lit_sphere_is_brighter_towards_the_light() {
        let camera = Camera::new(Viewport {
            width: 200,
            height: 60,
        });
        let light = PointLight {
            position: [0.0, 0.0, 0.0],
            intensity: 2.0,
            range: 300.0,
        };
        let mut frame = FrameBuffer::new(200, 60);
        let eye = camera.position();
        let basis = camera.basis();
        let center = [30.0, 0.0, 0.0];
        draw_sphere(
            &mut frame,
            &camera,
            &eye,
            &basis,
            &center,
            6.0,
            Surface::Standard {
                color: rgb(0xffffff),
                light: &light,
                orientation: IDENTITY,
            },
        );
        let projection = camera.project(&center).unwrap();
        let row = projection.y as usize;
        let left = (projection.x - 6.0 * projection.scale / CELL_ASPECT * 0.8) as usize;
        let right = (projection.x + 6.0 * projection.scale / CELL_ASPECT * 0.8) as usize;
        let level = |cell: &Cell| match cell.fg {
            Color::Rgb { r, .. } => r,
            _ => 0,
        };
        assert!(level(frame.cell(left, row).unwrap()) > level(frame.cell(right, row).unwrap()));
    }

    #[test]
    fn shade_char_ramps_with_intensity() {
        assert_eq!(shade_char(1.0), '█');
        assert_eq!(shade_char(0.6), '▓');
        assert_eq!(shade_char(0.3), '▒');
        assert_eq!(shade_char(0.1), '░');
    }
}
