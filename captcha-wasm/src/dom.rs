use captcha_core::{CaptchaConfig, ImagePair, StatusView, Theme};
use gloo::timers::callback::Timeout;
use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{Document, Element, HtmlCanvasElement, HtmlElement, HtmlImageElement};

use crate::canvas::Layer;
use crate::constants::{
    PAIR_BG_HEIGHT, PAIR_BG_WIDTH, PAIR_PIECE_LEFT, PAIR_PIECE_WIDTH, SHAKE_MS, THUMB_WIDTH,
    Z_CUTOUT, Z_PIECE, Z_REFRESH,
};

const THUMB_ICON: &str =
    r#"<svg viewBox="0 0 24 24" fill="currentColor"><path d="M8 5l8 7-8 7"/></svg>"#;
const REFRESH_ICON: &str = concat!(
    r##"<svg viewBox="0 0 24 24" width="20" height="20" fill="none" stroke="#333" "##,
    r#"stroke-width="2" stroke-linecap="round">"#,
    r#"<path d="M20 12a8 8 0 1 1-2.34-5.66"/><path d="M20 4v5h-5"/></svg>"#,
);

/// Every node one captcha owns. Only `stage` and `bar` hang off the host root.
pub struct Dom {
    pub root: Element,
    pub stage: HtmlElement,
    pub bar: HtmlElement,
    pub fill: HtmlElement,
    pub thumb: HtmlElement,
    pub status: HtmlElement,
    pub refresh: HtmlElement,
    pub loading: HtmlElement,
    pub bg: Layer,
    pub cut: Layer,
    pub piece: Layer,
    pub bg_img: HtmlImageElement,
    pub piece_img: HtmlImageElement,
    // dropping a pending timeout cancels it
    shake_timer: Option<Timeout>,
}

fn element<T: JsCast>(doc: &Document, tag: &str) -> Result<T, JsValue> {
    doc.create_element(tag)?
        .dyn_into::<T>()
        .map_err(|_| JsValue::from_str(&format!("<{tag}> has an unexpected type")))
}

fn div(doc: &Document, class: &str) -> Result<HtmlElement, JsValue> {
    let el: HtmlElement = element(doc, "div")?;
    el.set_class_name(class);
    Ok(el)
}

fn set_styles(el: &HtmlElement, props: &[(&str, &str)]) -> Result<(), JsValue> {
    let style = el.style();
    for (k, v) in props {
        style.set_property(k, v)?;
    }
    Ok(())
}

fn canvas_layer(doc: &Document, z_index: Option<&str>) -> Result<Layer, JsValue> {
    let canvas: HtmlCanvasElement = element(doc, "canvas")?;
    set_styles(&canvas, &[("position", "absolute"), ("top", "0"), ("left", "0")])?;
    if let Some(z) = z_index {
        set_styles(&canvas, &[("z-index", z)])?;
    }
    Layer::new(canvas)
}

impl Dom {
    /// Create the stage and the slider bar and mount both under `root`.
    pub fn build(doc: &Document, root: &Element, config: &CaptchaConfig) -> Result<Dom, JsValue> {
        let width = config.width.css();
        let height = config.height.css();

        let stage = div(doc, "slider-captcha-stage")?;
        set_styles(
            &stage,
            &[("width", &width), ("height", &height), ("position", "relative")],
        )?;

        let bg = canvas_layer(doc, None)?;
        let cut = canvas_layer(doc, Some(Z_CUTOUT))?;
        let piece = canvas_layer(doc, Some(Z_PIECE))?;
        set_styles(&piece.canvas, &[("cursor", "grab")])?;

        let bg_img: HtmlImageElement = element(doc, "img")?;
        set_styles(
            &bg_img,
            &[
                ("position", "absolute"),
                ("top", "0"),
                ("left", "0"),
                ("object-fit", "cover"),
            ],
        )?;
        let piece_img: HtmlImageElement = element(doc, "img")?;
        set_styles(
            &piece_img,
            &[("position", "absolute"), ("top", "0"), ("cursor", "grab"), ("z-index", Z_PIECE)],
        )?;

        let loading = div(doc, "slider-captcha-loading")?;
        let spinner = div(doc, "spinner")?;
        loading.append_child(&spinner)?;
        set_styles(
            &loading,
            &[("position", "absolute"), ("inset", "0"), ("z-index", "30"), ("display", "none")],
        )?;
        stage.append_child(&loading)?;

        let refresh = div(doc, "slider-captcha-refresh")?;
        refresh.set_inner_html(REFRESH_ICON);
        refresh.set_attribute("role", "button")?;
        refresh.set_attribute("aria-label", "Refresh captcha")?;
        set_styles(
            &refresh,
            &[
                ("position", "absolute"),
                ("top", "8px"),
                ("right", "8px"),
                ("cursor", "pointer"),
                ("z-index", Z_REFRESH),
            ],
        )?;
        stage.append_child(&refresh)?;

        let bar = div(doc, "slider-captcha-bar")?;
        set_styles(&bar, &[("width", &width)])?;
        let track = div(doc, "slider-captcha-track")?;
        let fill = div(doc, "slider-captcha-fill")?;
        track.append_child(&fill)?;
        let thumb = div(doc, "slider-captcha-thumb")?;
        thumb.set_inner_html(THUMB_ICON);
        set_styles(
            &thumb,
            &[("cursor", "grab"), ("width", &format!("{THUMB_WIDTH}px"))],
        )?;
        let status = div(doc, "slider-captcha-status")?;
        bar.append_child(&track)?;
        bar.append_child(&thumb)?;
        bar.append_child(&status)?;

        root.append_child(&stage)?;
        root.append_child(&bar)?;
        let classes = root.class_list();
        for class in Theme::ALL_CLASSES {
            classes.remove_1(class)?;
        }
        classes.add_1(config.theme.class())?;

        Ok(Dom {
            root: root.clone(),
            stage,
            bar,
            fill,
            thumb,
            status,
            refresh,
            loading,
            bg,
            cut,
            piece,
            bg_img,
            piece_img,
            shake_timer: None,
        })
    }

    /// Spinner on, puzzle layers hidden, or the reverse.
    pub fn show_loading(&self, show: bool) {
        let _ = self
            .loading
            .style()
            .set_property("display", if show { "flex" } else { "none" });
        let visibility = if show { "hidden" } else { "visible" };
        for el in [&self.cut.canvas, &self.piece.canvas] {
            let _ = el.style().set_property("visibility", visibility);
        }
        let _ = self.piece_img.style().set_property("visibility", visibility);
    }

    /// Put the three canvases on the stage (moving, never duplicating them) and
    /// take the image pair off.
    pub fn show_canvas_layers(&self) -> Result<(), JsValue> {
        self.bg_img.remove();
        self.piece_img.remove();
        for layer in [&self.bg, &self.cut, &self.piece] {
            self.stage.append_child(&layer.canvas)?;
        }
        Ok(())
    }

    pub fn show_image_pair(&self, pair: &ImagePair) -> Result<(), JsValue> {
        for layer in [&self.bg, &self.cut, &self.piece] {
            layer.canvas.remove();
        }
        self.bg_img.set_src(&pair.bg_url);
        set_styles(
            &self.bg_img,
            &[
                ("width", &format!("{PAIR_BG_WIDTH}px")),
                ("height", &format!("{PAIR_BG_HEIGHT}px")),
            ],
        )?;
        self.piece_img.set_src(&pair.puzzle_url);
        set_styles(
            &self.piece_img,
            &[
                ("width", &format!("{PAIR_PIECE_WIDTH}px")),
                ("left", &format!("{PAIR_PIECE_LEFT}px")),
            ],
        )?;
        self.stage.append_child(&self.bg_img)?;
        self.stage.append_child(&self.piece_img)?;
        Ok(())
    }

    pub fn apply_status(&self, view: &StatusView) {
        self.status.set_inner_text(&view.text);
        self.status.set_class_name(&view.class);
    }

    /// Drop the shake class again once the animation had time to play.
    /// Replaces the timer of an earlier failure.
    pub fn schedule_unshake(&mut self) {
        let status = self.status.clone();
        self.shake_timer = Some(Timeout::new(SHAKE_MS, move || {
            let _ = status.class_list().remove_1("shake");
        }));
    }

    /// Slider fill and thumb for a horizontal `offset`.
    pub fn set_slider(&self, offset: f64) {
        let _ = self
            .fill
            .style()
            .set_property("width", &format!("{}px", offset + THUMB_WIDTH));
        let _ = self
            .thumb
            .style()
            .set_property("transform", &format!("translateX({offset}px)"));
    }

    pub fn clear_slider(&self) {
        let _ = self.fill.style().set_property("width", "0px");
        let _ = self
            .thumb
            .style()
            .set_property("transform", "translateX(0px)");
    }

    pub fn set_piece_shift(&self, shift: f64) {
        let _ = self
            .piece
            .canvas
            .style()
            .set_property("transform", &format!("translateX({shift}px)"));
    }

    pub fn set_pair_offset(&self, offset: f64) {
        let _ = self
            .piece_img
            .style()
            .set_property("transform", &format!("translateX({offset}px)"));
    }

    pub fn set_grabbing(&self, grabbing: bool) {
        let cursor = if grabbing { "grabbing" } else { "grab" };
        let _ = self.thumb.style().set_property("cursor", cursor);
        let _ = self.piece.canvas.style().set_property("cursor", cursor);
        let _ = self.piece_img.style().set_property("cursor", cursor);
    }

    /// Unmount stage and bar and drop the theme class from the host root.
    pub fn detach(&mut self) {
        self.shake_timer = None;
        self.stage.remove();
        self.bar.remove();
        let classes = self.root.class_list();
        for class in Theme::ALL_CLASSES {
            let _ = classes.remove_1(class);
        }
    }
}
