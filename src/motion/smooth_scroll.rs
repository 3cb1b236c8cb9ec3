//! Damped scroll driver: raw wheel/touch deltas move a target, and the
//! rendered position chases it once per animation frame.

use super::easing::Ease;

/// Distance under which the animated position snaps onto its target.
const SETTLE_EPSILON: f64 = 0.5;
const LINE_HEIGHT_PX: f64 = 16.0;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct SmoothScrollConfig {
    /// Seconds taken by programmatic (anchor) scrolls.
    pub duration: f64,
    /// Fraction of the remaining distance covered per 60 Hz frame.
    pub lerp: f64,
    pub smooth_wheel: bool,
    pub smooth_touch: bool,
    pub wheel_multiplier: f64,
    pub touch_multiplier: f64,
}

impl Default for SmoothScrollConfig {
    fn default() -> Self {
        Self {
            duration: 1.2,
            lerp: 0.08,
            smooth_wheel: true,
            smooth_touch: false,
            wheel_multiplier: 1.0,
            touch_multiplier: 1.0,
        }
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum InputSource {
    Wheel,
    Touch,
}

/// `WheelEvent.deltaMode` values.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum WheelDeltaMode {
    Pixel,
    Line,
    Page,
}

impl WheelDeltaMode {
    pub fn from_dom(mode: u32) -> Self {
        match mode {
            1 => Self::Line,
            2 => Self::Page,
            _ => Self::Pixel,
        }
    }
}

pub fn normalize_wheel(delta: f64, mode: WheelDeltaMode, viewport_height: f64) -> f64 {
    match mode {
        WheelDeltaMode::Pixel => delta,
        WheelDeltaMode::Line => delta * LINE_HEIGHT_PX,
        WheelDeltaMode::Page => delta * viewport_height,
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
enum Motion {
    Idle,
    Damped,
    Timed { from: f64, elapsed: f64 },
}

#[derive(Clone, Debug)]
pub struct SmoothScroll {
    config: SmoothScrollConfig,
    animated: f64,
    target: f64,
    limit: f64,
    motion: Motion,
}

impl SmoothScroll {
    pub fn new(config: SmoothScrollConfig, position: f64, limit: f64) -> Self {
        let limit = limit.max(0.0);
        let position = position.clamp(0.0, limit);
        Self {
            config,
            animated: position,
            target: position,
            limit,
            motion: Motion::Idle,
        }
    }

    pub fn position(&self) -> f64 {
        self.animated
    }

    pub fn target(&self) -> f64 {
        self.target
    }

    pub fn is_scrolling(&self) -> bool {
        self.motion != Motion::Idle
    }

    pub fn set_limit(&mut self, limit: f64) {
        self.limit = limit.max(0.0);
        self.target = self.target.clamp(0.0, self.limit);
        if !self.is_scrolling() {
            self.animated = self.animated.clamp(0.0, self.limit);
        }
    }

    /// Feeds a raw input delta. Returns `true` when the driver takes over the
    /// input, in which case the native scroll must be suppressed.
    pub fn on_input(&mut self, source: InputSource, delta: f64) -> bool {
        let multiplier = match source {
            InputSource::Wheel if self.config.smooth_wheel => self.config.wheel_multiplier,
            InputSource::Touch if self.config.smooth_touch => self.config.touch_multiplier,
            _ => return false,
        };

        // A timed anchor scroll is interrupted by user input.
        let base = if matches!(self.motion, Motion::Timed { .. }) {
            self.animated
        } else {
            self.target
        };

        self.target = (base + delta * multiplier).clamp(0.0, self.limit);
        self.motion = Motion::Damped;
        true
    }

    pub fn scroll_to(&mut self, target: f64, immediate: bool) {
        let target = target.clamp(0.0, self.limit);
        self.target = target;

        if immediate || self.config.duration <= 0.0 {
            self.animated = target;
            self.motion = Motion::Idle;
            return;
        }

        self.motion = Motion::Timed {
            from: self.animated,
            elapsed: 0.0,
        };
    }

    /// Adopts a position changed outside the driver. Ignored mid-animation.
    pub fn sync_native(&mut self, position: f64) {
        if self.is_scrolling() {
            return;
        }
        let position = position.clamp(0.0, self.limit);
        self.animated = position;
        self.target = position;
    }

    /// Halts at the current position, dropping any pending target.
    pub fn stop(&mut self) {
        self.target = self.animated;
        self.motion = Motion::Idle;
    }

    /// Advances by `dt` seconds. Returns the new position when it moved.
    pub fn advance(&mut self, dt: f64) -> Option<f64> {
        let dt = dt.max(0.0);
        let previous = self.animated;

        match self.motion {
            Motion::Idle => return None,
            Motion::Damped => {
                self.animated = damp(self.animated, self.target, self.config.lerp * 60.0, dt);
                if (self.target - self.animated).abs() < SETTLE_EPSILON {
                    self.animated = self.target;
                    self.motion = Motion::Idle;
                }
            }
            Motion::Timed { from, elapsed } => {
                let elapsed = elapsed + dt;
                let progress = (elapsed / self.config.duration).min(1.0);
                self.animated = from + (self.target - from) * Ease::ExpoOut.apply(progress);
                if progress >= 1.0 {
                    self.animated = self.target;
                    self.motion = Motion::Idle;
                } else {
                    self.motion = Motion::Timed { from, elapsed };
                }
            }
        }

        (self.animated != previous).then_some(self.animated)
    }
}

/// Frame-rate independent exponential smoothing.
pub fn damp(current: f64, target: f64, lambda: f64, dt: f64) -> f64 {
    let t = 1.0 - (-lambda * dt).exp();
    current + (target - current) * t
}

#[cfg(test)]
mod tests {
    use super::*;

    const FRAME: f64 = 1.0 / 60.0;

    fn driver() -> SmoothScroll {
        SmoothScroll::new(SmoothScrollConfig::default(), 0.0, 4_000.0)
    }

    #[test]
    fn wheel_input_is_captured_and_eases_toward_target() {
        let mut scroll = driver();

        assert!(scroll.on_input(InputSource::Wheel, 300.0));
        assert_eq!(scroll.target(), 300.0);

        let first = scroll.advance(FRAME).expect("first frame moves");
        assert!(first > 0.0 && first < 300.0);

        let second = scroll.advance(FRAME).expect("second frame moves");
        assert!(second > first);
        assert!(second - first < first, "steps shrink as the target nears");
    }

    #[test]
    fn damped_scroll_settles_exactly_on_target() {
        let mut scroll = driver();
        scroll.on_input(InputSource::Wheel, 500.0);

        for _ in 0..600 {
            scroll.advance(FRAME);
        }

        assert_eq!(scroll.position(), 500.0);
        assert!(!scroll.is_scrolling());
        assert_eq!(scroll.advance(FRAME), None);
    }

    #[test]
    fn touch_stays_native_when_touch_smoothing_is_disabled() {
        let mut scroll = driver();

        assert!(!scroll.on_input(InputSource::Touch, 120.0));
        assert_eq!(scroll.target(), 0.0);
        assert!(!scroll.is_scrolling());
    }

    #[test]
    fn target_is_clamped_to_scroll_limit() {
        let mut scroll = driver();
        scroll.on_input(InputSource::Wheel, 10_000.0);
        assert_eq!(scroll.target(), 4_000.0);

        scroll.on_input(InputSource::Wheel, -20_000.0);
        assert_eq!(scroll.target(), 0.0);
    }

    #[test]
    fn timed_scroll_reaches_target_after_duration() {
        let mut scroll = driver();
        scroll.scroll_to(1_000.0, false);

        let mut elapsed = 0.0;
        while scroll.is_scrolling() {
            scroll.advance(FRAME);
            elapsed += FRAME;
            assert!(elapsed < 2.0, "timed scroll must finish");
        }

        assert_eq!(scroll.position(), 1_000.0);
        assert!((elapsed - 1.2).abs() < 2.0 * FRAME);
    }

    #[test]
    fn immediate_scroll_jumps() {
        let mut scroll = driver();
        scroll.scroll_to(750.0, true);

        assert_eq!(scroll.position(), 750.0);
        assert!(!scroll.is_scrolling());
    }

    #[test]
    fn native_scroll_is_adopted_only_when_idle() {
        let mut scroll = driver();
        scroll.sync_native(900.0);
        assert_eq!(scroll.position(), 900.0);

        scroll.on_input(InputSource::Wheel, 100.0);
        scroll.sync_native(0.0);
        assert_eq!(scroll.target(), 1_000.0);
    }

    #[test]
    fn wheel_input_interrupts_anchor_scroll_from_current_position() {
        let mut scroll = driver();
        scroll.scroll_to(2_000.0, false);
        for _ in 0..10 {
            scroll.advance(FRAME);
        }
        let current = scroll.position();

        scroll.on_input(InputSource::Wheel, 100.0);
        assert!((scroll.target() - (current + 100.0)).abs() < 1e-9);
    }

    #[test]
    fn stopping_holds_the_current_position() {
        let mut scroll = driver();
        scroll.scroll_to(2_000.0, false);
        for _ in 0..10 {
            scroll.advance(FRAME);
        }
        let held = scroll.position();

        scroll.stop();
        assert!(!scroll.is_scrolling());
        assert_eq!(scroll.target(), held);
        assert_eq!(scroll.advance(FRAME), None);
        scroll.sync_native(held + 40.0);
        assert_eq!(scroll.position(), held + 40.0);
    }

    #[test]
    fn wheel_line_and_page_modes_become_pixels() {
        assert_eq!(normalize_wheel(3.0, WheelDeltaMode::Line, 800.0), 48.0);
        assert_eq!(normalize_wheel(1.0, WheelDeltaMode::Page, 800.0), 800.0);
        assert_eq!(normalize_wheel(42.0, WheelDeltaMode::from_dom(0), 800.0), 42.0);
    }
}
