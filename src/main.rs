// The browser frontend is the only consumer of these modules; native builds
// compile them for the test harness alone.
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod config;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod logging;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code, unused_imports))]
mod motion;
#[cfg_attr(not(target_arch = "wasm32"), allow(dead_code))]
mod story;

#[cfg(target_arch = "wasm32")]
mod frontend;

#[cfg(not(target_arch = "wasm32"))]
fn main() {
    eprintln!("This project is frontend-only. Run `trunk serve` or `trunk build --release`.");
}

#[cfg(target_arch = "wasm32")]
fn main() {
    frontend::run();
}
