//! Renders the compositing passes into a `tiny-skia` pixmap and samples pixels,
//! so the punched hole and the clipped piece are checked for real.

use captcha_core::compositor::{paint_cutout, paint_gradient, paint_piece};
use captcha_core::{Composite, PiecePath, Point, Rect, Rgba, Size, Surface};
use tiny_skia::{
    BlendMode, Color, FillRule, GradientStop, LineJoin, LinearGradient, Mask, Paint, Path,
    PathBuilder, Pixmap, PixmapPaint, SpreadMode, Stroke, Transform,
};

const W: u32 = 120;
const H: u32 = 80;

#[derive(Clone)]
struct DrawState {
    fill: Color,
    stroke: Color,
    width: f32,
    round: bool,
    blend: BlendMode,
    clip: Option<Mask>,
}

struct Raster {
    pixmap: Pixmap,
    state: DrawState,
    stack: Vec<DrawState>,
}

impl Raster {
    fn new() -> Self {
        Raster {
            pixmap: Pixmap::new(W, H).unwrap(),
            state: DrawState {
                fill: Color::BLACK,
                stroke: Color::BLACK,
                width: 1.0,
                round: false,
                blend: BlendMode::SourceOver,
                clip: None,
            },
            stack: Vec::new(),
        }
    }

    fn paint(&self, color: Color) -> Paint<'static> {
        let mut paint = Paint::default();
        paint.set_color(color);
        paint.blend_mode = self.state.blend;
        paint.anti_alias = true;
        paint
    }
}

fn color(c: Rgba) -> Color {
    Color::from_rgba8(c.r, c.g, c.b, (c.a * 255.0).round() as u8)
}

fn outline(path: &PiecePath) -> Path {
    let poly = path.flatten(16);
    let mut pb = PathBuilder::new();
    for (i, c) in poly.exterior().coords().enumerate() {
        if i == 0 {
            pb.move_to(c.x as f32, c.y as f32);
        } else {
            pb.line_to(c.x as f32, c.y as f32);
        }
    }
    pb.close();
    pb.finish().unwrap()
}

impl Surface for Raster {
    type Source = Pixmap;

    fn clear(&mut self, _size: Size) {
        self.pixmap.fill(Color::TRANSPARENT);
    }
    fn save(&mut self) {
        self.stack.push(self.state.clone());
    }
    fn restore(&mut self) {
        if let Some(s) = self.stack.pop() {
            self.state = s;
        }
    }
    fn set_fill(&mut self, c: Rgba) {
        self.state.fill = color(c);
    }
    fn set_stroke(&mut self, c: Rgba) {
        self.state.stroke = color(c);
    }
    fn set_line_width(&mut self, width: f64) {
        self.state.width = width as f32;
    }
    fn set_round_joins(&mut self) {
        self.state.round = true;
    }
    fn set_shadow(&mut self, _color: Rgba, _blur: f64) {}
    fn set_composite(&mut self, op: Composite) {
        self.state.blend = match op {
            Composite::SourceOver => BlendMode::SourceOver,
            Composite::DestinationOut => BlendMode::DestinationOut,
        };
    }
    fn fill_rect(&mut self, rect: Rect) {
        let r =
            tiny_skia::Rect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32)
                .unwrap();
        let paint = self.paint(self.state.fill);
        self.pixmap
            .fill_rect(r, &paint, Transform::identity(), self.state.clip.as_ref());
    }
    fn fill_gradient(&mut self, rect: Rect, from: Rgba, to: Rgba) {
        let mut paint = self.paint(color(from));
        paint.shader = LinearGradient::new(
            tiny_skia::Point::from_xy(rect.x as f32, rect.y as f32),
            tiny_skia::Point::from_xy(rect.right() as f32, rect.bottom() as f32),
            vec![
                GradientStop::new(0.0, color(from)),
                GradientStop::new(1.0, color(to)),
            ],
            SpreadMode::Pad,
            Transform::identity(),
        )
        .unwrap();
        let r =
            tiny_skia::Rect::from_xywh(rect.x as f32, rect.y as f32, rect.w as f32, rect.h as f32)
                .unwrap();
        self.pixmap
            .fill_rect(r, &paint, Transform::identity(), self.state.clip.as_ref());
    }
    fn fill_path(&mut self, path: &PiecePath) {
        let paint = self.paint(self.state.fill);
        self.pixmap.fill_path(
            &outline(path),
            &paint,
            FillRule::Winding,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }
    fn stroke_path(&mut self, path: &PiecePath) {
        let paint = self.paint(self.state.stroke);
        let stroke = Stroke {
            width: self.state.width,
            line_join: if self.state.round {
                LineJoin::Round
            } else {
                LineJoin::Miter
            },
            ..Stroke::default()
        };
        self.pixmap.stroke_path(
            &outline(path),
            &paint,
            &stroke,
            Transform::identity(),
            self.state.clip.as_ref(),
        );
    }
    fn clip_path(&mut self, path: &PiecePath) {
        let mut mask = Mask::new(W, H).unwrap();
        mask.fill_path(&outline(path), FillRule::Winding, true, Transform::identity());
        self.state.clip = Some(mask);
    }
    fn draw_source(&mut self, source: &Pixmap, dest: Rect) {
        let sx = dest.w as f32 / source.width() as f32;
        let sy = dest.h as f32 / source.height() as f32;
        self.pixmap.draw_pixmap(
            0,
            0,
            source.as_ref(),
            &PixmapPaint::default(),
            Transform::from_row(sx, 0.0, 0.0, sy, dest.x as f32, dest.y as f32),
            self.state.clip.as_ref(),
        );
    }
}

fn piece() -> PiecePath {
    PiecePath::new(Point::new(20.0, 10.0), 44.0)
}

#[test]
fn cutout_dims_everything_but_the_hole() {
    let mut r = Raster::new();
    paint_cutout(&mut r, &piece(), Size::new(W as f64, H as f64));

    let outside = r.pixmap.pixel(110, 70).unwrap();
    assert_eq!(outside.red(), 0);
    assert!((110..=120).contains(&outside.alpha()), "alpha {}", outside.alpha());

    // centre of the hole: shade removed, white highlight on top
    let hole = r.pixmap.pixel(42, 32).unwrap();
    assert!(hole.red() > 100, "hole {:?}", hole);
    assert!(hole.alpha() < 130, "hole {:?}", hole);
}

#[test]
fn piece_shows_background_only_inside_outline() {
    let mut bg = Pixmap::new(W, H).unwrap();
    bg.fill(Color::from_rgba8(255, 0, 0, 255));
    let mut r = Raster::new();
    paint_piece(&mut r, &piece(), &bg, Size::new(W as f64, H as f64));

    let centre = r.pixmap.pixel(42, 32).unwrap();
    assert_eq!((centre.red(), centre.alpha()), (255, 255));
    // outward right lobe
    let lobe = r.pixmap.pixel(20 + 44 + 4, 32).unwrap();
    assert_eq!(lobe.red(), 255);
    // inward top lobe and far corner stay empty
    assert_eq!(r.pixmap.pixel(42, 12).unwrap().alpha(), 0);
    assert_eq!(r.pixmap.pixel(110, 70).unwrap().alpha(), 0);
}

#[test]
fn gradient_fallback_fills_the_surface() {
    let mut r = Raster::new();
    paint_gradient(&mut r, Size::new(W as f64, H as f64));
    let corner = r.pixmap.pixel(0, 0).unwrap();
    assert_eq!(corner.alpha(), 255);
    assert!(corner.blue() > corner.red());
    let far = r.pixmap.pixel(W - 1, H - 1).unwrap();
    assert!(far.blue() >= corner.blue());
}
