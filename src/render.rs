//! Drawing streamlines and seed points.
//!
//! A [`Scene`] gathers drawable [`Actor`]s: polylines coloured by their
//! local direction, and dots of a uniform colour. A [`Renderer`] either
//! shows a scene or records it into an image file. [`RasterRenderer`]
//! projects the scene orthographically on one anatomical plane and
//! rasterises it into a PNG.

use crate::tractogram::{Point, Streamline};
use image::{ImageError, Rgb, RgbImage};
use rgb::RGB8;
use std::fmt;
use std::io::Error as IOError;
use std::path::Path;

quick_error! {
    /// Error type for rendering failures.
    #[derive(Debug)]
    #[non_exhaustive]
    pub enum RenderError {
        /// The requested image has no pixels.
        EmptyImage(width: u32, height: u32) {
            display("Cannot render an image of {}x{} pixels", width, height)
        }
        /// The image could not be encoded or saved.
        Image(err: ImageError) {
            from()
            source(err)
            display("Could not save the image: {}", err)
        }
        /// I/O Error
        Io(err: IOError) {
            from()
            source(err)
            display("I/O error: {}", err)
        }
    }
}

/// Alias type for rendering results.
pub type Result<T> = ::std::result::Result<T, RenderError>;

/// White, the colour of seed dots.
pub const WHITE: RGB8 = RGB8 {
    r: 255,
    g: 255,
    b: 255,
};

/// Something which can be drawn in a scene.
#[derive(Debug, Clone, PartialEq)]
pub enum Actor {
    /// Polylines, each segment coloured by its direction.
    Lines(Vec<Vec<Point>>),
    /// Points drawn with one colour.
    Dots {
        /// Point positions
        points: Vec<Point>,
        /// Uniform colour
        color: RGB8,
    },
}

impl Actor {
    /// A line actor drawing the given streamlines.
    pub fn line(streamlines: &[Streamline]) -> Actor {
        Actor::Lines(streamlines.iter().map(|s| s.points().to_vec()).collect())
    }

    /// A dot actor drawing the given points with a uniform colour.
    pub fn dots(points: &[Point], color: RGB8) -> Actor {
        Actor::Dots {
            points: points.to_vec(),
            color,
        }
    }

    fn points(&self) -> Box<dyn Iterator<Item = &Point> + '_> {
        match self {
            Actor::Lines(lines) => Box::new(lines.iter().flatten()),
            Actor::Dots { points, .. } => Box::new(points.iter()),
        }
    }
}

/// A set of actors to draw together.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct Scene {
    actors: Vec<Actor>,
}

impl Scene {
    /// An empty scene.
    pub fn new() -> Self {
        Scene::default()
    }

    /// Add an actor to the scene.
    pub fn add(&mut self, actor: Actor) {
        self.actors.push(actor);
    }

    /// The actors, in insertion order.
    pub fn actors(&self) -> &[Actor] {
        &self.actors
    }

    /// Axis-aligned bounding box of every point in the scene, as
    /// `(min, max)`. `None` for a scene without points.
    pub fn bounds(&self) -> Option<(Point, Point)> {
        let mut points = self.actors.iter().flat_map(Actor::points);
        let first = *points.next()?;
        Some(points.fold((first, first), |(mut lo, mut hi), p| {
            for i in 0..3 {
                lo[i] = lo[i].min(p[i]);
                hi[i] = hi[i].max(p[i]);
            }
            (lo, hi)
        }))
    }

    /// Counts describing the scene.
    pub fn summary(&self) -> SceneSummary {
        let mut summary = SceneSummary {
            bounds: self.bounds(),
            ..Default::default()
        };
        for actor in &self.actors {
            match actor {
                Actor::Lines(lines) => {
                    summary.lines += lines.len();
                    summary.line_points += lines.iter().map(Vec::len).sum::<usize>();
                }
                Actor::Dots { points, .. } => summary.dots += points.len(),
            }
        }
        summary
    }
}

/// Counts describing a scene.
#[derive(Debug, Clone, PartialEq, Default)]
pub struct SceneSummary {
    /// Number of polylines
    pub lines: usize,
    /// Number of points over all polylines
    pub line_points: usize,
    /// Number of dots
    pub dots: usize,
    /// Bounding box of the scene
    pub bounds: Option<(Point, Point)>,
}

impl fmt::Display for SceneSummary {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(
            f,
            "{} streamlines ({} points), {} seed points",
            self.lines, self.line_points, self.dots
        )?;
        if let Some((lo, hi)) = self.bounds {
            write!(
                f,
                ", bounds [{:.1}, {:.1}] x [{:.1}, {:.1}] x [{:.1}, {:.1}]",
                lo[0], hi[0], lo[1], hi[1], lo[2], hi[2]
            )?;
        }
        Ok(())
    }
}

/// Something which can present a scene.
pub trait Renderer {
    /// Present the scene to the user.
    fn show(&mut self, scene: &Scene) -> Result<()>;

    /// Render the scene into an image file of the given size in pixels.
    fn record(&mut self, scene: &Scene, out_path: &Path, size: (u32, u32)) -> Result<()>;
}

/// Anatomical plane the scene is projected on.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum View {
    /// Looking down the z axis: x to the right, y up
    Axial,
    /// Looking along the y axis: x to the right, z up
    Coronal,
    /// Looking along the x axis: y to the right, z up
    Sagittal,
}

impl Default for View {
    fn default() -> Self {
        View::Axial
    }
}

impl View {
    fn project(self, p: &Point) -> (f32, f32) {
        match self {
            View::Axial => (p[0], p[1]),
            View::Coronal => (p[0], p[2]),
            View::Sagittal => (p[1], p[2]),
        }
    }
}

/// Maps projected scene coordinates to pixel coordinates, fitting the
/// scene in the frame with a small margin.
#[derive(Debug, Clone, Copy)]
struct Viewport {
    center: (f32, f32),
    scale: f32,
    size: (u32, u32),
}

impl Viewport {
    const MARGIN: f32 = 0.05;

    fn fit(view: View, bounds: Option<(Point, Point)>, size: (u32, u32)) -> Viewport {
        let (lo, hi) = match bounds {
            Some((lo, hi)) => (view.project(&lo), view.project(&hi)),
            None => ((0., 0.), (0., 0.)),
        };
        let span = (hi.0 - lo.0).max(hi.1 - lo.1).max(f32::EPSILON);
        let frame = size.0.min(size.1) as f32 * (1. - 2. * Self::MARGIN);
        Viewport {
            center: ((lo.0 + hi.0) / 2., (lo.1 + hi.1) / 2.),
            scale: frame / span,
            size,
        }
    }

    fn to_pixel(&self, (u, v): (f32, f32)) -> (i64, i64) {
        let x = self.size.0 as f32 / 2. + (u - self.center.0) * self.scale;
        let y = self.size.1 as f32 / 2. - (v - self.center.1) * self.scale;
        (x.round() as i64, y.round() as i64)
    }
}

/// Off-screen renderer producing RGB images.
#[derive(Debug, Clone, PartialEq)]
pub struct RasterRenderer {
    view: View,
    background: RGB8,
    dot_radius: u32,
}

impl Default for RasterRenderer {
    fn default() -> Self {
        RasterRenderer {
            view: View::Axial,
            background: RGB8 { r: 0, g: 0, b: 0 },
            dot_radius: 2,
        }
    }
}

impl RasterRenderer {
    /// A renderer with an axial view on a black background.
    pub fn new() -> Self {
        RasterRenderer::default()
    }

    /// Sets the plane the scene is projected on.
    pub fn view(mut self, view: View) -> Self {
        self.view = view;
        self
    }

    /// Sets the background colour.
    pub fn background(mut self, color: RGB8) -> Self {
        self.background = color;
        self
    }

    /// Sets the half-width of dots, in pixels.
    pub fn dot_radius(mut self, radius: u32) -> Self {
        self.dot_radius = radius;
        self
    }

    /// Rasterise the scene into an image of the given size.
    pub fn render(&self, scene: &Scene, (width, height): (u32, u32)) -> Result<RgbImage> {
        if width == 0 || height == 0 {
            return Err(RenderError::EmptyImage(width, height));
        }
        let mut img = RgbImage::from_pixel(width, height, to_pixel(self.background));
        let viewport = Viewport::fit(self.view, scene.bounds(), (width, height));

        // lines first, so that dots stay visible on top
        for actor in scene.actors() {
            if let Actor::Lines(lines) = actor {
                for line in lines {
                    for segment in line.windows(2) {
                        let color = direction_color(&segment[0], &segment[1]);
                        let a = viewport.to_pixel(self.view.project(&segment[0]));
                        let b = viewport.to_pixel(self.view.project(&segment[1]));
                        draw_line(&mut img, a, b, color);
                    }
                }
            }
        }
        for actor in scene.actors() {
            if let Actor::Dots { points, color } = actor {
                for p in points {
                    let center = viewport.to_pixel(self.view.project(p));
                    draw_dot(&mut img, center, self.dot_radius, to_pixel(*color));
                }
            }
        }
        Ok(img)
    }
}

impl Renderer for RasterRenderer {
    /// Without a windowing backend, showing a scene prints its summary.
    fn show(&mut self, scene: &Scene) -> Result<()> {
        println!("{}", scene.summary());
        Ok(())
    }

    fn record(&mut self, scene: &Scene, out_path: &Path, size: (u32, u32)) -> Result<()> {
        let img = self.render(scene, size)?;
        img.save(out_path)?;
        log::info!(
            "saved a {}x{} screenshot to {}",
            size.0,
            size.1,
            out_path.display()
        );
        Ok(())
    }
}

fn to_pixel(c: RGB8) -> Rgb<u8> {
    Rgb([c.r, c.g, c.b])
}

/// Colour of a segment from its direction: absolute value of the unit
/// vector, x in red, y in green, z in blue.
fn direction_color(a: &Point, b: &Point) -> Rgb<u8> {
    let d = [b[0] - a[0], b[1] - a[1], b[2] - a[2]];
    let norm = (d[0] * d[0] + d[1] * d[1] + d[2] * d[2]).sqrt();
    if norm <= f32::EPSILON {
        return Rgb([255, 255, 255]);
    }
    let channel = |v: f32| ((v / norm).abs() * 255.).round() as u8;
    Rgb([channel(d[0]), channel(d[1]), channel(d[2])])
}

fn put(img: &mut RgbImage, (x, y): (i64, i64), color: Rgb<u8>) {
    if x >= 0 && y >= 0 && (x as u64) < u64::from(img.width()) && (y as u64) < u64::from(img.height()) {
        img.put_pixel(x as u32, y as u32, color);
    }
}

/// Bresenham's line algorithm, clipped to the image.
fn draw_line(img: &mut RgbImage, (x0, y0): (i64, i64), (x1, y1): (i64, i64), color: Rgb<u8>) {
    let dx = (x1 - x0).abs();
    let dy = -(y1 - y0).abs();
    let sx = if x0 < x1 { 1 } else { -1 };
    let sy = if y0 < y1 { 1 } else { -1 };
    let mut err = dx + dy;
    let (mut x, mut y) = (x0, y0);
    loop {
        put(img, (x, y), color);
        if x == x1 && y == y1 {
            break;
        }
        let e2 = 2 * err;
        if e2 >= dy {
            err += dy;
            x += sx;
        }
        if e2 <= dx {
            err += dx;
            y += sy;
        }
    }
}

fn draw_dot(img: &mut RgbImage, (cx, cy): (i64, i64), radius: u32, color: Rgb<u8>) {
    let r = i64::from(radius);
    for y in cy - r..=cy + r {
        for x in cx - r..=cx + r {
            put(img, (x, y), color);
        }
    }
}
