use std::cell::RefCell;
use std::rc::Rc;

use captcha_core::config::{DEFAULT_HEIGHT, DEFAULT_WIDTH};
use captcha_core::{
    Backing, CaptchaConfig, Challenge, ImagePair, Point, Size, Target,
};
use captcha_core::compositor::{paint_background, paint_cutout, paint_gradient, paint_piece};
use rand::rngs::SmallRng;
use wasm_bindgen::JsValue;
use web_sys::{HtmlImageElement, Window};

use crate::canvas::Source;
use crate::dom::Dom;
use crate::options::Hooks;

/// How the current round is presented.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Mode {
    /// Background, cutout and piece rendered locally on three canvases.
    Canvas,
    /// Background and piece are host-supplied images.
    Paired,
}

/// What a refresh ended up with for the background.
pub enum Background {
    Image(HtmlImageElement),
    Pair(ImagePair),
    Gradient,
}

/// Everything one mounted captcha owns, shared between its listeners and
/// async tasks behind an `Rc<RefCell<_>>`.
pub struct State {
    pub window: Window,
    pub dom: Dom,
    pub config: CaptchaConfig,
    pub hooks: Hooks,
    pub challenge: Challenge,
    pub rng: SmallRng,
    pub mode: Mode,
    pub destroyed: bool,
}

pub type Shared = Rc<RefCell<State>>;

impl State {
    /// Logical stage size: fixed options win, otherwise the laid-out size.
    pub fn measure(&self) -> Size {
        let stage = &self.dom.stage;
        Size::new(
            self.config.width.resolve(stage.offset_width() as f64, DEFAULT_WIDTH),
            self.config.height.resolve(stage.offset_height() as f64, DEFAULT_HEIGHT),
        )
    }

    pub fn seed(&mut self, size: Size) -> Target {
        let piece = self.config.piece_size;
        captcha_core::seed_target(&mut self.rng, size.width, size.height, piece)
    }

    /// Size every canvas for `size` at the current device pixel ratio.
    pub fn sync_layers(&self, size: Size) -> Result<(), JsValue> {
        let backing = Backing::new(size, self.window.device_pixel_ratio());
        for layer in [&self.dom.bg, &self.dom.cut, &self.dom.piece] {
            layer.sync_size(&backing)?;
        }
        Ok(())
    }

    /// Put the loaded background on screen and draw the round's cutout and piece.
    pub fn present(&mut self, background: Background) -> Result<(), JsValue> {
        let size = self.challenge.size();
        let path = self.challenge.path().clone();
        match background {
            Background::Pair(pair) => {
                self.mode = Mode::Paired;
                return self.dom.show_image_pair(&pair);
            }
            Background::Image(img) => {
                self.mode = Mode::Canvas;
                self.dom.show_canvas_layers()?;
                let source = Source::Image(img);
                let image_size = source.size();
                paint_background(
                    &mut self.dom.bg.surface(),
                    &source,
                    image_size,
                    self.config.fit,
                    size,
                );
            }
            Background::Gradient => {
                self.mode = Mode::Canvas;
                self.dom.show_canvas_layers()?;
                paint_gradient(&mut self.dom.bg.surface(), size);
            }
        }
        paint_cutout(&mut self.dom.cut.surface(), &path, size);
        let bg = Source::Canvas(self.dom.bg.canvas.clone());
        paint_piece(&mut self.dom.piece.surface(), &path, &bg, size);
        Ok(())
    }

    /// Slider, piece and status back to the start of an attempt.
    pub fn reset_visuals(&self) {
        self.dom.apply_status(&self.challenge.status());
        self.reset_position();
    }

    /// Slider back to zero after a rejected attempt; the status label stays.
    pub fn reset_position(&self) {
        self.dom.clear_slider();
        self.dom.set_grabbing(false);
        match self.mode {
            Mode::Canvas => self.dom.set_piece_shift(self.challenge.piece_shift(0.0)),
            Mode::Paired => self.dom.set_pair_offset(0.0),
        }
    }

    pub fn apply_offset(&self, offset: f64) {
        self.dom.set_slider(offset);
        match self.mode {
            Mode::Canvas => self.dom.set_piece_shift(self.challenge.piece_shift(offset)),
            Mode::Paired => self.dom.set_pair_offset(offset),
        }
    }

    /// Whether a viewport point lands on the piece as currently drawn.
    pub fn hits_piece(&self, pos: Point) -> bool {
        match self.mode {
            Mode::Paired => true,
            Mode::Canvas => {
                // the canvas rect already includes the layer's translateX
                let rect = self.dom.piece.canvas.get_bounding_client_rect();
                let local = Point::new(pos.x - rect.left(), pos.y - rect.top());
                self.challenge.path().contains(local, 0.0)
            }
        }
    }
}
