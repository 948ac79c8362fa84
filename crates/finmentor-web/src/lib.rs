//! FinMentor Web Frontend
//!
//! Leptos-based WASM frontend: the AI chat and the portfolio generator.
//! The chat transcript lives here and is sent with every request; the
//! server only relays.

mod api;
mod app;
mod components;
mod pages;

pub use app::App;

use wasm_bindgen::prelude::*;

/// WASM entry point
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    leptos::mount::mount_to_body(App);
}
