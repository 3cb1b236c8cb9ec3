//! Scroll- and pointer-driven animation primitives.
//!
//! Everything here is plain state and arithmetic so it runs under the native
//! test harness; the browser layer feeds it measurements and writes its
//! output back to the DOM.
//!
//! - `smooth_scroll` turns wheel/touch deltas into a damped scroll position.
//! - `trigger` maps scroll offsets to enter/leave events per element.
//! - `timeline` samples staggered property tweens over time.
//! - `gate` latches first visibility of an element.
//! - `pointer` computes magnetic, parallax and spotlight offsets.
//! - `stage` owns the live bindings of a page and their release.

pub mod easing;
pub mod gate;
pub mod pointer;
pub mod smooth_scroll;
pub mod stage;
pub mod timeline;
pub mod trigger;

pub use easing::{Ease, Spring};
pub use gate::{stagger_delay, ViewportGate};
pub use pointer::{LeavePolicy, Magnetic, Parallax, Point, Rect};
pub use smooth_scroll::{normalize_wheel, InputSource, SmoothScroll, SmoothScrollConfig, WheelDeltaMode};
pub use stage::{PlayerId, Removal, RemovalQueue, Stage, Surface, Unbind};
pub use timeline::{Frame, Position, Timeline, Tween};
pub use trigger::{Bounds, TriggerEvent, TriggerNotice, TriggerSpec};
