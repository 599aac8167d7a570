/// Vid Hider - Chrome Extension for hiding subscriptions-feed videos
/// Built with Rust + WASM + Yew

mod content;
mod extract;
mod messages;
mod reconcile;
mod storage;
mod video_data;
pub mod ui;

use wasm_bindgen::prelude::*;

// Set up panic hook for better error messages in the browser console
#[wasm_bindgen(start)]
pub fn main() {
    console_error_panic_hook::set_once();
    wasm_logger::init(wasm_logger::Config::default());
}

// Start the Yew app for the popup
#[wasm_bindgen]
pub fn start_popup() {
    yew::Renderer::<ui::popup::App>::new().render();
}

// Start the content script on the subscriptions page
#[wasm_bindgen]
pub fn start_content() {
    content::run();
}
