pub mod board;
pub mod gravity;
pub mod input;
pub mod piece;
pub mod randomizer;
pub mod schedule;
pub mod scoring;
pub mod session;
pub mod shape;
#[cfg(target_arch = "wasm32")]
pub mod web;

use wasm_bindgen::prelude::*;

pub use board::{Board, COLS, ROWS};
pub use gravity::GravityCurve;
pub use input::{Command, ControlBindings};
pub use piece::ActivePiece;
pub use randomizer::RandomizerKind;
pub use session::{DropOutcome, GameEvent, GameSession, GameSettings, GameStatus, SessionView};
pub use shape::{Shape, Tetromino};

#[wasm_bindgen(start)]
pub fn bootstrap() {
    console_error_panic_hook::set_once();
}

#[cfg(target_arch = "wasm32")]
pub(crate) fn log(msg: &str) {
    web_sys::console::log_1(&JsValue::from_str(msg));
}

#[cfg(not(target_arch = "wasm32"))]
pub(crate) fn log(msg: &str) {
    println!("{msg}");
}
