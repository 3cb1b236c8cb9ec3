//! Scroll-position triggers: an element edge meeting a viewport line opens a
//! window of scroll offsets, and crossing its boundaries produces events.

use std::collections::BTreeMap;
use std::str::FromStr;

/// A line on either the element or the viewport.
#[derive(Clone, Copy, Debug, PartialEq)]
pub enum Anchor {
    Fraction(f64),
    Pixels(f64),
}

impl Anchor {
    pub const TOP: Self = Self::Fraction(0.0);
    pub const CENTER: Self = Self::Fraction(0.5);
    pub const BOTTOM: Self = Self::Fraction(1.0);

    fn resolve(self, extent: f64) -> f64 {
        match self {
            Self::Fraction(fraction) => extent * fraction,
            Self::Pixels(pixels) => pixels,
        }
    }
}

impl FromStr for Anchor {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        match value {
            "top" => Ok(Self::TOP),
            "center" => Ok(Self::CENTER),
            "bottom" => Ok(Self::BOTTOM),
            _ => {
                if let Some(percent) = value.strip_suffix('%') {
                    let percent = percent.parse::<f64>().map_err(|_| "invalid percentage anchor")?;
                    return Ok(Self::Fraction(percent / 100.0));
                }
                if let Some(pixels) = value.strip_suffix("px") {
                    let pixels = pixels.parse::<f64>().map_err(|_| "invalid pixel anchor")?;
                    return Ok(Self::Pixels(pixels));
                }
                Err("unknown anchor")
            }
        }
    }
}

/// `"<element anchor> <viewport anchor>"`, e.g. `"top center"` or `"top 80%"`.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerPoint {
    pub element: Anchor,
    pub viewport: Anchor,
}

impl TriggerPoint {
    pub const fn new(element: Anchor, viewport: Anchor) -> Self {
        Self { element, viewport }
    }

    /// Scroll offset at which the two anchors coincide.
    pub fn scroll_offset(&self, bounds: Bounds, viewport_height: f64) -> f64 {
        bounds.top + self.element.resolve(bounds.height) - self.viewport.resolve(viewport_height)
    }
}

impl FromStr for TriggerPoint {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let mut parts = value.split_whitespace();
        let element = parts.next().ok_or("empty trigger point")?.parse()?;
        let viewport = parts.next().unwrap_or("top").parse()?;
        if parts.next().is_some() {
            return Err("trigger point takes at most two anchors");
        }
        Ok(Self { element, viewport })
    }
}

/// Element box in document coordinates.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Bounds {
    pub top: f64,
    pub height: f64,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerMode {
    /// Fires a single `Enter` and unregisters itself.
    Once,
    /// Reports every boundary crossing in both directions.
    Toggle,
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct TriggerSpec {
    pub start: TriggerPoint,
    pub end: TriggerPoint,
    pub mode: TriggerMode,
}

impl TriggerSpec {
    pub fn once(start: &str) -> Result<Self, &'static str> {
        Ok(Self {
            start: start.parse()?,
            end: TriggerPoint::new(Anchor::BOTTOM, Anchor::TOP),
            mode: TriggerMode::Once,
        })
    }

    pub fn toggle(start: &str, end: &str) -> Result<Self, &'static str> {
        Ok(Self {
            start: start.parse()?,
            end: end.parse()?,
            mode: TriggerMode::Toggle,
        })
    }

    /// `[start, end)` scroll offsets during which the trigger is active.
    pub fn window(&self, bounds: Bounds, viewport_height: f64) -> (f64, f64) {
        let start = self.start.scroll_offset(bounds, viewport_height);
        let end = self.end.scroll_offset(bounds, viewport_height).max(start);
        (start, end)
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum TriggerEvent {
    Enter,
    Leave,
    EnterBack,
    LeaveBack,
}

impl TriggerEvent {
    /// Whether the binding is inside its window after this event.
    pub fn is_active(self) -> bool {
        matches!(self, Self::Enter | Self::EnterBack)
    }
}

/// An event as delivered to listeners, with the binding's state once the
/// whole frame's batch has been evaluated.
#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct TriggerNotice {
    pub event: TriggerEvent,
    pub active: bool,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct TriggerId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum Region {
    Before,
    Inside,
    After,
}

impl Region {
    fn locate(scroll: f64, (start, end): (f64, f64)) -> Self {
        if scroll < start {
            Self::Before
        } else if scroll < end {
            Self::Inside
        } else {
            Self::After
        }
    }
}

fn transition(from: Region, to: Region) -> &'static [TriggerEvent] {
    use TriggerEvent::*;
    match (from, to) {
        (Region::Before, Region::Inside) => &[Enter],
        (Region::Before, Region::After) => &[Enter, Leave],
        (Region::Inside, Region::After) => &[Leave],
        (Region::After, Region::Inside) => &[EnterBack],
        (Region::After, Region::Before) => &[EnterBack, LeaveBack],
        (Region::Inside, Region::Before) => &[LeaveBack],
        _ => &[],
    }
}

#[derive(Debug)]
struct Binding {
    spec: TriggerSpec,
    region: Region,
}

/// Registry of independent scroll triggers.
#[derive(Debug, Default)]
pub struct TriggerEngine {
    bindings: BTreeMap<TriggerId, Binding>,
    next_id: u32,
}

impl TriggerEngine {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn register(&mut self, spec: TriggerSpec) -> TriggerId {
        let id = TriggerId(self.next_id);
        self.next_id = self.next_id.wrapping_add(1);
        self.bindings.insert(
            id,
            Binding {
                spec,
                region: Region::Before,
            },
        );
        id
    }

    pub fn unregister(&mut self, id: TriggerId) -> bool {
        self.bindings.remove(&id).is_some()
    }

    pub fn contains(&self, id: TriggerId) -> bool {
        self.bindings.contains_key(&id)
    }

    pub fn is_active(&self, id: TriggerId) -> bool {
        self.bindings
            .get(&id)
            .is_some_and(|binding| binding.region == Region::Inside)
    }

    pub fn len(&self) -> usize {
        self.bindings.len()
    }

    /// Evaluates every binding against `scroll`. `measure` returns the
    /// target's bounds, or `None` when the target is not mounted, in which
    /// case the binding is left untouched.
    pub fn update(
        &mut self,
        scroll: f64,
        viewport_height: f64,
        mut measure: impl FnMut(TriggerId) -> Option<Bounds>,
    ) -> Vec<(TriggerId, TriggerEvent)> {
        let mut events = Vec::new();
        let mut finished = Vec::new();

        for (&id, binding) in self.bindings.iter_mut() {
            let Some(bounds) = measure(id) else {
                continue;
            };

            let region = Region::locate(scroll, binding.spec.window(bounds, viewport_height));
            if region == binding.region {
                continue;
            }

            let crossed = transition(binding.region, region);
            binding.region = region;

            match binding.spec.mode {
                TriggerMode::Toggle => {
                    events.extend(crossed.iter().map(|event| (id, *event)));
                }
                TriggerMode::Once => {
                    if crossed.contains(&TriggerEvent::Enter) {
                        events.push((id, TriggerEvent::Enter));
                        finished.push(id);
                    }
                }
            }
        }

        for id in finished {
            self.bindings.remove(&id);
        }

        events
    }

    /// `update`, with each event paired with its binding's final state.
    pub fn update_notices(
        &mut self,
        scroll: f64,
        viewport_height: f64,
        measure: impl FnMut(TriggerId) -> Option<Bounds>,
    ) -> Vec<(TriggerId, TriggerNotice)> {
        let events = self.update(scroll, viewport_height, measure);
        events
            .into_iter()
            .map(|(id, event)| {
                // Once bindings are gone after firing.
                let active = if self.contains(id) {
                    self.is_active(id)
                } else {
                    event.is_active()
                };
                (id, TriggerNotice { event, active })
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const VIEWPORT: f64 = 800.0;

    fn bounds(top: f64, height: f64) -> Bounds {
        Bounds { top, height }
    }

    #[test]
    fn parses_named_percent_and_pixel_anchors() {
        let point: TriggerPoint = "top 80%".parse().expect("valid trigger point");
        assert_eq!(point.element, Anchor::TOP);
        assert_eq!(point.viewport, Anchor::Fraction(0.8));

        let point: TriggerPoint = "bottom 120px".parse().expect("valid trigger point");
        assert_eq!(point.viewport, Anchor::Pixels(120.0));

        assert!("middle center".parse::<TriggerPoint>().is_err());
        assert!("top center bottom".parse::<TriggerPoint>().is_err());
        assert!("".parse::<TriggerPoint>().is_err());
    }

    #[test]
    fn window_aligns_element_edge_with_viewport_line() {
        let spec = TriggerSpec::toggle("top center", "bottom center").expect("valid spec");
        let (start, end) = spec.window(bounds(1_000.0, 600.0), VIEWPORT);

        assert_eq!(start, 600.0);
        assert_eq!(end, 1_200.0);
    }

    #[test]
    fn toggle_reports_every_crossing() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::toggle("top center", "bottom center").expect("valid spec"));
        let measure = |_| Some(bounds(1_000.0, 600.0));

        assert!(engine.update(0.0, VIEWPORT, measure).is_empty());
        assert_eq!(engine.update(700.0, VIEWPORT, measure), vec![(id, TriggerEvent::Enter)]);
        assert!(engine.is_active(id));
        assert_eq!(engine.update(1_300.0, VIEWPORT, measure), vec![(id, TriggerEvent::Leave)]);
        assert_eq!(engine.update(900.0, VIEWPORT, measure), vec![(id, TriggerEvent::EnterBack)]);
        assert_eq!(engine.update(100.0, VIEWPORT, measure), vec![(id, TriggerEvent::LeaveBack)]);
        assert!(!engine.is_active(id));
    }

    #[test]
    fn jumping_across_a_window_reports_both_edges() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::toggle("top center", "bottom center").expect("valid spec"));
        let measure = |_| Some(bounds(1_000.0, 600.0));

        assert_eq!(
            engine.update(5_000.0, VIEWPORT, measure),
            vec![(id, TriggerEvent::Enter), (id, TriggerEvent::Leave)]
        );
        assert_eq!(
            engine.update(0.0, VIEWPORT, measure),
            vec![(id, TriggerEvent::EnterBack), (id, TriggerEvent::LeaveBack)]
        );
    }

    #[test]
    fn once_fires_a_single_enter_and_unregisters() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::once("top 80%").expect("valid spec"));
        let measure = |_| Some(bounds(2_000.0, 300.0));

        assert!(engine.update(0.0, VIEWPORT, measure).is_empty());
        assert_eq!(engine.update(1_500.0, VIEWPORT, measure), vec![(id, TriggerEvent::Enter)]);
        assert!(!engine.contains(id));
        assert!(engine.update(0.0, VIEWPORT, measure).is_empty());
        assert!(engine.update(1_500.0, VIEWPORT, measure).is_empty());
    }

    #[test]
    fn once_fires_when_already_past_at_first_evaluation() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::once("top 60%").expect("valid spec"));

        let events = engine.update(9_000.0, VIEWPORT, |_| Some(bounds(1_000.0, 500.0)));
        assert_eq!(events, vec![(id, TriggerEvent::Enter)]);
    }

    #[test]
    fn unmeasured_targets_are_skipped_without_state_change() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::toggle("top center", "bottom center").expect("valid spec"));

        assert!(engine.update(700.0, VIEWPORT, |_| None).is_empty());
        assert!(!engine.is_active(id));
        assert_eq!(
            engine.update(700.0, VIEWPORT, |_| Some(bounds(1_000.0, 600.0))),
            vec![(id, TriggerEvent::Enter)]
        );
    }

    #[test]
    fn unregistered_bindings_stop_reporting() {
        let mut engine = TriggerEngine::new();
        let id = engine.register(TriggerSpec::toggle("top center", "bottom center").expect("valid spec"));

        assert!(engine.unregister(id));
        assert!(!engine.unregister(id));
        assert!(engine.update(700.0, VIEWPORT, |_| Some(bounds(1_000.0, 600.0))).is_empty());
        assert_eq!(engine.len(), 0);
    }
}
