//! Canvas 2D backend

use wasm_bindgen::JsCast;
use wasm_bindgen::prelude::*;
use web_sys::{CanvasRenderingContext2d, Document, HtmlCanvasElement, HtmlImageElement};

use super::{Sprite, SpriteKind, sprites};
use crate::sim::GameState;

pub struct CanvasRenderer {
    canvas: HtmlCanvasElement,
    ctx: CanvasRenderingContext2d,
    player_img: HtmlImageElement,
    object_img: HtmlImageElement,
}

fn image(document: &Document, id: &str) -> Result<HtmlImageElement, JsValue> {
    document
        .get_element_by_id(id)
        .ok_or_else(|| JsValue::from_str(&format!("missing image #{id}")))?
        .dyn_into::<HtmlImageElement>()
        .map_err(|_| JsValue::from_str(&format!("#{id} is not an <img>")))
}

impl CanvasRenderer {
    pub fn new(document: &Document, canvas: HtmlCanvasElement) -> Result<Self, JsValue> {
        let ctx = canvas
            .get_context("2d")?
            .ok_or_else(|| JsValue::from_str("2d context unavailable"))?
            .dyn_into::<CanvasRenderingContext2d>()?;
        Ok(Self {
            player_img: image(document, "astronaut")?,
            object_img: image(document, "object")?,
            canvas,
            ctx,
        })
    }

    pub fn resize(&self, width: u32, height: u32) {
        self.canvas.set_width(width);
        self.canvas.set_height(height);
    }

    pub fn clear(&self) {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
    }

    /// Draw one frame of play
    pub fn render(&self, state: &GameState) -> Result<(), JsValue> {
        self.clear();
        for sprite in sprites(state) {
            self.draw_sprite(&sprite)?;
        }
        Ok(())
    }

    /// Black canvas with the closing message centered
    pub fn end_screen(&self, message: &str) -> Result<(), JsValue> {
        let (w, h) = self.size();
        self.ctx.clear_rect(0.0, 0.0, w, h);
        self.ctx.set_fill_style_str("black");
        self.ctx.fill_rect(0.0, 0.0, w, h);
        self.ctx.set_fill_style_str("white");
        self.ctx.set_font("30px Arial");
        self.ctx.set_text_align("center");
        self.ctx.fill_text(message, w / 2.0, h / 2.0)
    }

    fn draw_sprite(&self, sprite: &Sprite) -> Result<(), JsValue> {
        let img = match sprite.kind {
            SpriteKind::Object => &self.object_img,
            SpriteKind::Player => &self.player_img,
        };
        let (x, y) = (sprite.pos.x as f64, sprite.pos.y as f64);
        let (w, h) = (sprite.size.x as f64, sprite.size.y as f64);

        if sprite.scale == 1.0 {
            return self
                .ctx
                .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h);
        }

        // Scale about the sprite's center
        let c = sprite.center();
        let (cx, cy) = (c.x as f64, c.y as f64);
        let s = sprite.scale as f64;
        self.ctx.save();
        let drawn = self
            .ctx
            .translate(cx, cy)
            .and_then(|_| self.ctx.scale(s, s))
            .and_then(|_| self.ctx.translate(-cx, -cy))
            .and_then(|_| {
                self.ctx
                    .draw_image_with_html_image_element_and_dw_and_dh(img, x, y, w, h)
            });
        self.ctx.restore();
        drawn
    }

    fn size(&self) -> (f64, f64) {
        (self.canvas.width() as f64, self.canvas.height() as f64)
    }
}
