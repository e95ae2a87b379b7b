//! Canvas 2D rendering module
//!
//! `sprites` lays out what to draw for a frame; the wasm-only `canvas`
//! backend paints it. Neither mutates the simulation.

#[cfg(target_arch = "wasm32")]
pub mod canvas;

#[cfg(target_arch = "wasm32")]
pub use canvas::CanvasRenderer;

use glam::Vec2;

use crate::sim::GameState;

/// Closing line drawn on the end screen
pub const END_MESSAGE: &str =
    "El final era inevitable, tu muerte llegaría pronto, pero luchaste por tu vida";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SpriteKind {
    Object,
    Player,
}

/// One image to draw
#[derive(Debug, Clone, Copy, PartialEq)]
pub struct Sprite {
    pub kind: SpriteKind,
    /// Top-left corner
    pub pos: Vec2,
    pub size: Vec2,
    /// Uniform scale about the sprite's center
    pub scale: f32,
}

impl Sprite {
    #[inline]
    pub fn center(&self) -> Vec2 {
        self.pos + self.size / 2.0
    }
}

/// Draw order for one frame: objects in spawn order, then the player on top
pub fn sprites(state: &GameState) -> Vec<Sprite> {
    let mut out = Vec::with_capacity(state.objects.len() + 1);
    out.extend(state.objects.iter().map(|obj| Sprite {
        kind: SpriteKind::Object,
        pos: obj.pos,
        size: state.object_size,
        scale: 1.0,
    }));
    out.push(Sprite {
        kind: SpriteKind::Player,
        pos: state.player.pos,
        size: state.player.size,
        scale: state.player.breath_scale,
    });
    out
}
