//! Canvas compositing for the three stacked layers.
//!
//! The drawing order lives here, against [`Surface`]; the browser crate
//! implements the trait over `CanvasRenderingContext2d`.

use serde::{Deserialize, Serialize};

use crate::geometry::{PiecePath, Rect, Size};

/// Straight-alpha colour, channels 0-255 and alpha 0-1.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Rgba {
    pub r: u8,
    pub g: u8,
    pub b: u8,
    pub a: f64,
}

impl Rgba {
    pub const fn new(r: u8, g: u8, b: u8, a: f64) -> Self {
        Rgba { r, g, b, a }
    }

    pub fn css(&self) -> String {
        if self.a >= 1.0 {
            format!("#{:02x}{:02x}{:02x}", self.r, self.g, self.b)
        } else {
            format!("rgba({},{},{},{})", self.r, self.g, self.b, self.a)
        }
    }
}

pub const SHADE: Rgba = Rgba::new(0, 0, 0, 0.45);
pub const HOLE_HIGHLIGHT: Rgba = Rgba::new(255, 255, 255, 0.45);
pub const INNER_SHADOW: Rgba = Rgba::new(0, 0, 0, 0.25);
pub const INNER_SHADOW_BLUR: Rgba = Rgba::new(0, 0, 0, 0.4);
pub const OUTLINE: Rgba = Rgba::new(255, 255, 255, 1.0);
pub const OUTLINE_SHADOW: Rgba = Rgba::new(0, 0, 0, 0.3);
pub const GRADIENT_FROM: Rgba = Rgba::new(0x0b, 0x10, 0x20, 1.0);
pub const GRADIENT_TO: Rgba = Rgba::new(0x13, 0x1c, 0x34, 1.0);

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum Composite {
    #[default]
    SourceOver,
    DestinationOut,
}

impl Composite {
    pub fn as_str(self) -> &'static str {
        match self {
            Composite::SourceOver => "source-over",
            Composite::DestinationOut => "destination-out",
        }
    }
}

/// How the background image is mapped onto the widget.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum Fit {
    /// Uniform scale that fills the widget, cropping the overflow.
    #[default]
    Cover,
    /// Uniform scale that shows the whole image, letterboxed.
    Contain,
    /// Non-uniform scale to the exact widget size.
    Stretch,
}

/// Destination rectangle for an `image` drawn into `container` with `fit`.
/// `None` when either side has no area.
pub fn fit_rect(fit: Fit, image: Size, container: Size) -> Option<Rect> {
    if image.width <= 0.0
        || image.height <= 0.0
        || container.width <= 0.0
        || container.height <= 0.0
    {
        return None;
    }
    if fit == Fit::Stretch {
        return Some(container.rect());
    }
    let sx = container.width / image.width;
    let sy = container.height / image.height;
    let scale = match fit {
        Fit::Cover => sx.max(sy),
        _ => sx.min(sy),
    };
    let w = image.width * scale;
    let h = image.height * scale;
    Some(Rect::new(
        (container.width - w) / 2.0,
        (container.height - h) / 2.0,
        w,
        h,
    ))
}

/// Physical backing store for a logical canvas size on a `dpr` display.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Backing {
    pub logical: Size,
    pub dpr: f64,
}

impl Backing {
    pub fn new(logical: Size, dpr: f64) -> Self {
        let dpr = if dpr.is_finite() && dpr > 0.0 { dpr } else { 1.0 };
        Backing { logical, dpr }
    }

    pub fn pixel_width(&self) -> u32 {
        (self.logical.width * self.dpr).round().clamp(1.0, 10000.0) as u32
    }

    pub fn pixel_height(&self) -> u32 {
        (self.logical.height * self.dpr).round().clamp(1.0, 10000.0) as u32
    }
}

/// The subset of the 2D canvas API the captcha draws with. All coordinates
/// are logical pixels; implementations own the device-pixel transform.
pub trait Surface {
    /// Something drawable: a decoded image or another surface.
    type Source;

    fn clear(&mut self, size: Size);
    fn save(&mut self);
    fn restore(&mut self);
    fn set_fill(&mut self, color: Rgba);
    fn set_stroke(&mut self, color: Rgba);
    fn set_line_width(&mut self, width: f64);
    fn set_round_joins(&mut self);
    fn set_shadow(&mut self, color: Rgba, blur: f64);
    fn set_composite(&mut self, op: Composite);
    fn fill_rect(&mut self, rect: Rect);
    /// Diagonal linear gradient from the top-left to the bottom-right of `rect`.
    fn fill_gradient(&mut self, rect: Rect, from: Rgba, to: Rgba);
    fn fill_path(&mut self, path: &PiecePath);
    fn stroke_path(&mut self, path: &PiecePath);
    fn clip_path(&mut self, path: &PiecePath);
    fn draw_source(&mut self, source: &Self::Source, dest: Rect);
}

/// Fallback background used whenever no image could be drawn.
pub fn paint_gradient<S: Surface>(surface: &mut S, size: Size) {
    surface.clear(size);
    surface.fill_gradient(size.rect(), GRADIENT_FROM, GRADIENT_TO);
}

/// Draw the background image with `fit`; degrades to the gradient when the
/// image reports no usable size. Returns whether the image was drawn.
pub fn paint_background<S: Surface>(
    surface: &mut S,
    image: &S::Source,
    image_size: Size,
    fit: Fit,
    size: Size,
) -> bool {
    match fit_rect(fit, image_size, size) {
        Some(dest) => {
            surface.clear(size);
            surface.draw_source(image, dest);
            true
        }
        None => {
            paint_gradient(surface, size);
            false
        }
    }
}

/// Shade the widget, punch the piece outline out of the shade, then layer the
/// hole highlight, the inner shadow and the white outline, in that order.
pub fn paint_cutout<S: Surface>(surface: &mut S, path: &PiecePath, size: Size) {
    surface.clear(size);

    surface.save();
    surface.set_fill(SHADE);
    surface.fill_rect(size.rect());
    surface.set_composite(Composite::DestinationOut);
    surface.set_round_joins();
    surface.set_line_width(2.0);
    surface.stroke_path(path);
    surface.fill_path(path);
    surface.restore();

    surface.save();
    surface.set_composite(Composite::SourceOver);
    surface.set_fill(HOLE_HIGHLIGHT);
    surface.fill_path(path);
    surface.restore();

    surface.save();
    surface.set_composite(Composite::SourceOver);
    surface.set_stroke(INNER_SHADOW);
    surface.set_line_width(3.0);
    surface.set_shadow(INNER_SHADOW_BLUR, 4.0);
    surface.stroke_path(path);
    surface.restore();

    surface.save();
    surface.set_stroke(OUTLINE);
    surface.set_line_width(2.0);
    surface.set_shadow(OUTLINE_SHADOW, 2.0);
    surface.set_round_joins();
    surface.stroke_path(path);
    surface.restore();
}

/// Clip the background through the piece outline and rim it in white.
///
/// The piece is painted at the target; the host moves the whole layer by
/// `offset - target.x` while dragging.
pub fn paint_piece<S: Surface>(
    surface: &mut S,
    path: &PiecePath,
    background: &S::Source,
    size: Size,
) {
    surface.clear(size);

    surface.save();
    surface.clip_path(path);
    surface.draw_source(background, size.rect());
    surface.restore();

    surface.save();
    surface.set_stroke(OUTLINE);
    surface.set_line_width(1.5);
    surface.set_shadow(OUTLINE_SHADOW, 2.0);
    surface.stroke_path(path);
    surface.restore();
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::geometry::Point;

    #[derive(Debug, PartialEq)]
    enum Op {
        Clear,
        Save,
        Restore,
        Fill(Rgba),
        Stroke(Rgba),
        Composite(Composite),
        FillRect,
        Gradient,
        FillPath,
        StrokePath,
        ClipPath,
        Draw(Rect),
        Other,
    }

    #[derive(Default)]
    struct Recorder {
        ops: Vec<Op>,
    }

    impl Surface for Recorder {
        type Source = ();

        fn clear(&mut self, _size: Size) {
            self.ops.push(Op::Clear);
        }
        fn save(&mut self) {
            self.ops.push(Op::Save);
        }
        fn restore(&mut self) {
            self.ops.push(Op::Restore);
        }
        fn set_fill(&mut self, color: Rgba) {
            self.ops.push(Op::Fill(color));
        }
        fn set_stroke(&mut self, color: Rgba) {
            self.ops.push(Op::Stroke(color));
        }
        fn set_line_width(&mut self, _width: f64) {
            self.ops.push(Op::Other);
        }
        fn set_round_joins(&mut self) {
            self.ops.push(Op::Other);
        }
        fn set_shadow(&mut self, _color: Rgba, _blur: f64) {
            self.ops.push(Op::Other);
        }
        fn set_composite(&mut self, op: Composite) {
            self.ops.push(Op::Composite(op));
        }
        fn fill_rect(&mut self, _rect: Rect) {
            self.ops.push(Op::FillRect);
        }
        fn fill_gradient(&mut self, _rect: Rect, _from: Rgba, _to: Rgba) {
            self.ops.push(Op::Gradient);
        }
        fn fill_path(&mut self, _path: &PiecePath) {
            self.ops.push(Op::FillPath);
        }
        fn stroke_path(&mut self, _path: &PiecePath) {
            self.ops.push(Op::StrokePath);
        }
        fn clip_path(&mut self, _path: &PiecePath) {
            self.ops.push(Op::ClipPath);
        }
        fn draw_source(&mut self, _source: &(), dest: Rect) {
            self.ops.push(Op::Draw(dest));
        }
    }

    fn significant(ops: Vec<Op>) -> Vec<Op> {
        ops.into_iter().filter(|o| *o != Op::Other).collect()
    }

    #[test]
    fn cover_crops_and_contain_letterboxes() {
        let image = Size::new(100.0, 100.0);
        let container = Size::new(200.0, 100.0);
        assert_eq!(
            fit_rect(Fit::Cover, image, container),
            Some(Rect::new(0.0, -50.0, 200.0, 200.0))
        );
        assert_eq!(
            fit_rect(Fit::Contain, image, container),
            Some(Rect::new(50.0, 0.0, 100.0, 100.0))
        );
        assert_eq!(
            fit_rect(Fit::Stretch, image, container),
            Some(Rect::new(0.0, 0.0, 200.0, 100.0))
        );
        assert_eq!(fit_rect(Fit::Cover, Size::new(0.0, 10.0), container), None);
    }

    #[test]
    fn backing_scales_by_device_pixel_ratio() {
        let b = Backing::new(Size::new(320.0, 160.0), 2.0);
        assert_eq!((b.pixel_width(), b.pixel_height()), (640, 320));
        let b = Backing::new(Size::new(300.5, 150.0), f64::NAN);
        assert_eq!(b.dpr, 1.0);
        assert_eq!(b.pixel_width(), 301);
    }

    #[test]
    fn cutout_layers_in_fixed_order() {
        let path = PiecePath::new(Point::new(20.0, 20.0), 44.0);
        let mut rec = Recorder::default();
        paint_cutout(&mut rec, &path, Size::new(320.0, 160.0));
        assert_eq!(
            significant(rec.ops),
            vec![
                Op::Clear,
                Op::Save,
                Op::Fill(SHADE),
                Op::FillRect,
                Op::Composite(Composite::DestinationOut),
                Op::StrokePath,
                Op::FillPath,
                Op::Restore,
                Op::Save,
                Op::Composite(Composite::SourceOver),
                Op::Fill(HOLE_HIGHLIGHT),
                Op::FillPath,
                Op::Restore,
                Op::Save,
                Op::Composite(Composite::SourceOver),
                Op::Stroke(INNER_SHADOW),
                Op::StrokePath,
                Op::Restore,
                Op::Save,
                Op::Stroke(OUTLINE),
                Op::StrokePath,
                Op::Restore,
            ]
        );
    }

    #[test]
    fn piece_is_clipped_before_drawing() {
        let path = PiecePath::new(Point::new(20.0, 20.0), 44.0);
        let mut rec = Recorder::default();
        let size = Size::new(320.0, 160.0);
        paint_piece(&mut rec, &path, &(), size);
        let ops = significant(rec.ops);
        let clip = ops.iter().position(|o| *o == Op::ClipPath).unwrap();
        let draw = ops.iter().position(|o| *o == Op::Draw(size.rect())).unwrap();
        assert!(clip < draw);
        assert_eq!(ops.last(), Some(&Op::Restore));
    }

    #[test]
    fn unusable_image_degrades_to_gradient() {
        let mut rec = Recorder::default();
        let drawn = paint_background(
            &mut rec,
            &(),
            Size::new(0.0, 0.0),
            Fit::Cover,
            Size::new(320.0, 160.0),
        );
        assert!(!drawn);
        assert_eq!(rec.ops, vec![Op::Clear, Op::Gradient]);
    }

    #[test]
    fn css_colours() {
        assert_eq!(SHADE.css(), "rgba(0,0,0,0.45)");
        assert_eq!(OUTLINE.css(), "#ffffff");
        assert_eq!(GRADIENT_FROM.css(), "#0b1020");
    }
}
