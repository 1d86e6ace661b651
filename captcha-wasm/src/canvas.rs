use captcha_core::{Backing, Composite, PathCommand, PiecePath, Rect, Rgba, Size, Surface};
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, HtmlCanvasElement, HtmlImageElement, Path2d};

use crate::utils::warn;

// Non-deprecated helpers to set canvas styles via property assignment.
pub fn set_fill_style(ctx: &CanvasRenderingContext2d, style: &JsValue) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("fillStyle"), style);
}

pub fn set_stroke_style(ctx: &CanvasRenderingContext2d, style: &JsValue) {
    let _ = js_sys::Reflect::set(ctx.as_ref(), &JsValue::from_str("strokeStyle"), style);
}

/// Anything the 2D context can `drawImage` from.
pub enum Source {
    Image(HtmlImageElement),
    Canvas(HtmlCanvasElement),
}

impl Source {
    /// Intrinsic size in the units `drawImage` samples from.
    pub fn size(&self) -> Size {
        match self {
            Source::Image(img) => {
                let w = if img.natural_width() > 0 { img.natural_width() } else { img.width() };
                let h = if img.natural_height() > 0 { img.natural_height() } else { img.height() };
                Size::new(w as f64, h as f64)
            }
            Source::Canvas(c) => Size::new(c.width() as f64, c.height() as f64),
        }
    }
}

/// Replay a piece outline into a browser `Path2D`.
pub fn path2d(path: &PiecePath) -> Result<Path2d, JsValue> {
    let p = Path2d::new()?;
    for cmd in path.commands() {
        match *cmd {
            PathCommand::MoveTo(pt) => p.move_to(pt.x, pt.y),
            PathCommand::LineTo(pt) => p.line_to(pt.x, pt.y),
            PathCommand::Arc {
                center,
                radius,
                start,
                end,
                ccw,
            } => p.arc_with_anticlockwise(center.x, center.y, radius, start, end, ccw)?,
            PathCommand::ArcTo { corner, to, radius } => {
                p.arc_to(corner.x, corner.y, to.x, to.y, radius)?
            }
            PathCommand::Close => p.close_path(),
        }
    }
    Ok(p)
}

/// One DPR-scaled canvas layer of the stage.
#[derive(Clone)]
pub struct Layer {
    pub canvas: HtmlCanvasElement,
    pub ctx: CanvasRenderingContext2d,
}

impl Layer {
    pub fn new(canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2D context not available"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Layer { canvas, ctx })
    }

    /// Match the backing store to `backing` and draw in logical pixels.
    /// Resizing resets the context, so the transform is reapplied every time.
    pub fn sync_size(&self, backing: &Backing) -> Result<(), JsValue> {
        let (w, h) = (backing.pixel_width(), backing.pixel_height());
        if self.canvas.width() != w {
            self.canvas.set_width(w);
        }
        if self.canvas.height() != h {
            self.canvas.set_height(h);
        }
        let style = self.canvas.style();
        style.set_property("width", &format!("{}px", backing.logical.width))?;
        style.set_property("height", &format!("{}px", backing.logical.height))?;
        self.ctx
            .set_transform(backing.dpr, 0.0, 0.0, backing.dpr, 0.0, 0.0)
    }

    pub fn surface(&self) -> CanvasSurface {
        CanvasSurface {
            ctx: self.ctx.clone(),
            path: None,
        }
    }
}

/// [`Surface`] over a browser 2D context.
pub struct CanvasSurface {
    ctx: CanvasRenderingContext2d,
    // the outline is the same for every call within one paint pass
    path: Option<(PiecePath, Path2d)>,
}

impl CanvasSurface {
    fn path2d(&mut self, path: &PiecePath) -> Option<Path2d> {
        if let Some((cached, p)) = &self.path
            && cached == path
        {
            return Some(p.clone());
        }
        match path2d(path) {
            Ok(p) => {
                self.path = Some((path.clone(), p.clone()));
                Some(p)
            }
            Err(e) => {
                warn(&format!("Path2D construction failed: {e:?}"));
                None
            }
        }
    }
}

impl Surface for CanvasSurface {
    type Source = Source;

    fn clear(&mut self, size: Size) {
        self.ctx.clear_rect(0.0, 0.0, size.width, size.height);
    }

    fn save(&mut self) {
        self.ctx.save();
    }

    fn restore(&mut self) {
        self.ctx.restore();
    }

    fn set_fill(&mut self, color: Rgba) {
        set_fill_style(&self.ctx, &JsValue::from_str(&color.css()));
    }

    fn set_stroke(&mut self, color: Rgba) {
        set_stroke_style(&self.ctx, &JsValue::from_str(&color.css()));
    }

    fn set_line_width(&mut self, width: f64) {
        self.ctx.set_line_width(width);
    }

    fn set_round_joins(&mut self) {
        self.ctx.set_line_join("round");
        self.ctx.set_line_cap("round");
    }

    fn set_shadow(&mut self, color: Rgba, blur: f64) {
        self.ctx.set_shadow_color(&color.css());
        self.ctx.set_shadow_blur(blur);
    }

    fn set_composite(&mut self, op: Composite) {
        let _ = self.ctx.set_global_composite_operation(op.as_str());
    }

    fn fill_rect(&mut self, rect: Rect) {
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_gradient(&mut self, rect: Rect, from: Rgba, to: Rgba) {
        let g = self
            .ctx
            .create_linear_gradient(rect.x, rect.y, rect.right(), rect.bottom());
        let _ = g.add_color_stop(0.0, &from.css());
        let _ = g.add_color_stop(1.0, &to.css());
        set_fill_style(&self.ctx, &g);
        self.ctx.fill_rect(rect.x, rect.y, rect.w, rect.h);
    }

    fn fill_path(&mut self, path: &PiecePath) {
        if let Some(p) = self.path2d(path) {
            self.ctx.fill_with_path_2d(&p);
        }
    }

    fn stroke_path(&mut self, path: &PiecePath) {
        if let Some(p) = self.path2d(path) {
            self.ctx.stroke_with_path(&p);
        }
    }

    fn clip_path(&mut self, path: &PiecePath) {
        if let Some(p) = self.path2d(path) {
            self.ctx.clip_with_path_2d(&p);
        }
    }

    fn draw_source(&mut self, source: &Source, dest: Rect) {
        let res = match source {
            Source::Image(img) => self.ctx.draw_image_with_html_image_element_and_dw_and_dh(
                img, dest.x, dest.y, dest.w, dest.h,
            ),
            Source::Canvas(c) => self.ctx.draw_image_with_html_canvas_element_and_dw_and_dh(
                c, dest.x, dest.y, dest.w, dest.h,
            ),
        };
        if let Err(e) = res {
            warn(&format!("drawImage failed: {e:?}"));
        }
    }
}
