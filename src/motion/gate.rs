//! "Has this element been seen" flag fed by intersection ratios.

/// Intersection observers report ratios a hair under the threshold they
/// fired for.
const RATIO_TOLERANCE: f64 = 1e-3;

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ViewportGate {
    threshold: f64,
    once: bool,
    open: bool,
}

impl ViewportGate {
    pub fn new(threshold: f64, once: bool) -> Self {
        Self {
            threshold: threshold.clamp(0.0, 1.0),
            once,
            open: false,
        }
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn is_open(&self) -> bool {
        self.open
    }

    /// Whether further observations can still change the gate.
    pub fn is_settled(&self) -> bool {
        self.once && self.open
    }

    /// Records one observation; returns `true` if the gate changed.
    pub fn observe(&mut self, ratio: f64, intersecting: bool) -> bool {
        if self.is_settled() {
            return false;
        }

        let visible = intersecting && ratio + RATIO_TOLERANCE >= self.threshold;
        let changed = visible != self.open;
        self.open = visible;
        changed
    }
}

pub fn stagger_delay(index: usize, step: f64) -> f64 {
    index as f64 * step
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn opens_at_threshold_and_latches_when_once() {
        let mut gate = ViewportGate::new(0.3, true);

        assert!(!gate.observe(0.1, true));
        assert!(!gate.is_open());
        assert!(gate.observe(0.2995, true));
        assert!(gate.is_open());

        assert!(!gate.observe(0.0, false));
        assert!(!gate.observe(0.9, true));
        assert!(gate.is_open());
    }

    #[test]
    fn repeating_gate_closes_when_element_leaves() {
        let mut gate = ViewportGate::new(0.3, false);

        assert!(gate.observe(0.5, true));
        assert!(gate.observe(0.0, false));
        assert!(!gate.is_open());
    }

    #[test]
    fn non_intersecting_entries_never_open() {
        let mut gate = ViewportGate::new(0.0, true);
        assert!(!gate.observe(0.0, false));
        assert!(gate.observe(0.0, true));
    }

    #[test]
    fn stagger_grows_linearly_with_index() {
        let delays: Vec<f64> = (0..4).map(|index| stagger_delay(index, 0.12)).collect();

        assert_eq!(delays[0], 0.0);
        assert!((delays[3] - 0.36).abs() < 1e-9);
    }
}
