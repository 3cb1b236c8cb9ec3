//! Timelines of property tweens placed on a shared clock, with per-member
//! stagger and forward/reverse playback.

use std::str::FromStr;

use super::easing::Ease;

/// Visual properties a tween can drive. `None` leaves a property alone.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Frame {
    pub opacity: Option<f64>,
    pub y: Option<f64>,
    pub scale: Option<f64>,
    pub width_percent: Option<f64>,
}

#[derive(Clone, Copy)]
enum Property {
    Opacity,
    Y,
    Scale,
    WidthPercent,
}

const PROPERTIES: [Property; 4] = [
    Property::Opacity,
    Property::Y,
    Property::Scale,
    Property::WidthPercent,
];

impl Property {
    fn rest(self) -> f64 {
        match self {
            Self::Opacity | Self::Scale => 1.0,
            Self::Y | Self::WidthPercent => 0.0,
        }
    }
}

impl Frame {
    pub const fn new() -> Self {
        Self {
            opacity: None,
            y: None,
            scale: None,
            width_percent: None,
        }
    }

    pub const fn opacity(mut self, value: f64) -> Self {
        self.opacity = Some(value);
        self
    }

    pub const fn y(mut self, value: f64) -> Self {
        self.y = Some(value);
        self
    }

    pub const fn scale(mut self, value: f64) -> Self {
        self.scale = Some(value);
        self
    }

    pub const fn width_percent(mut self, value: f64) -> Self {
        self.width_percent = Some(value);
        self
    }

    fn get(&self, property: Property) -> Option<f64> {
        match property {
            Property::Opacity => self.opacity,
            Property::Y => self.y,
            Property::Scale => self.scale,
            Property::WidthPercent => self.width_percent,
        }
    }

    fn slot(&mut self, property: Property) -> &mut Option<f64> {
        match property {
            Property::Opacity => &mut self.opacity,
            Property::Y => &mut self.y,
            Property::Scale => &mut self.scale,
            Property::WidthPercent => &mut self.width_percent,
        }
    }

    /// Interpolates every property named on either side; a side that omits
    /// a property contributes its resting value.
    pub fn interpolate(&self, to: &Frame, t: f64) -> Frame {
        let mut out = Frame::new();
        for property in PROPERTIES {
            if self.get(property).is_none() && to.get(property).is_none() {
                continue;
            }
            let from = self.get(property).unwrap_or(property.rest());
            let to = to.get(property).unwrap_or(property.rest());
            *out.slot(property) = Some(from + (to - from) * t);
        }
        out
    }

    /// Properties set on `over` replace ours.
    pub fn merge(&mut self, over: &Frame) {
        for property in PROPERTIES {
            if let Some(value) = over.get(property) {
                *self.slot(property) = Some(value);
            }
        }
    }

    pub fn transform(&self) -> Option<String> {
        if self.y.is_none() && self.scale.is_none() {
            return None;
        }
        Some(format!(
            "translate3d(0, {:.2}px, 0) scale({:.4})",
            self.y.unwrap_or(0.0),
            self.scale.unwrap_or(1.0)
        ))
    }

    /// Inline style declarations for this frame.
    pub fn css_declarations(&self) -> Vec<(&'static str, String)> {
        let mut declarations = Vec::new();
        if let Some(opacity) = self.opacity {
            declarations.push(("opacity", format!("{:.4}", opacity.clamp(0.0, 1.0))));
        }
        if let Some(transform) = self.transform() {
            declarations.push(("transform", transform));
        }
        if let Some(width) = self.width_percent {
            declarations.push(("width", format!("{:.2}%", width.max(0.0))));
        }
        declarations
    }
}

/// Where a tween starts relative to the tweens added before it.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub enum Position {
    /// At the end of the previous tween.
    #[default]
    Sequential,
    /// Offset from the end of the previous tween.
    Relative(f64),
    /// Together with the previous tween.
    WithPrevious,
    Absolute(f64),
}

impl FromStr for Position {
    type Err = &'static str;

    fn from_str(value: &str) -> Result<Self, Self::Err> {
        let value = value.trim();
        if value.is_empty() {
            return Ok(Self::Sequential);
        }
        if value == "<" {
            return Ok(Self::WithPrevious);
        }
        if let Some(offset) = value.strip_prefix("-=") {
            let offset = offset.parse::<f64>().map_err(|_| "invalid relative position")?;
            return Ok(Self::Relative(-offset));
        }
        if let Some(offset) = value.strip_prefix("+=") {
            let offset = offset.parse::<f64>().map_err(|_| "invalid relative position")?;
            return Ok(Self::Relative(offset));
        }
        value
            .parse::<f64>()
            .map(Self::Absolute)
            .map_err(|_| "invalid position")
    }
}

#[derive(Clone, Debug, PartialEq)]
pub struct Tween {
    pub from: Frame,
    pub to: Frame,
    pub duration: f64,
    pub delay: f64,
    pub ease: Ease,
    /// Extra delay per member index.
    pub stagger: f64,
    /// Target group and its member count.
    pub group: usize,
    pub count: usize,
    pub position: Position,
}

impl Tween {
    /// Animates from `frame` to the resting state.
    pub fn from(group: usize, frame: Frame) -> Self {
        Self::from_to(group, frame, Frame::new())
    }

    /// Animates from the resting state to `frame`.
    pub fn to(group: usize, frame: Frame) -> Self {
        Self::from_to(group, Frame::new(), frame)
    }

    pub fn from_to(group: usize, from: Frame, to: Frame) -> Self {
        Self {
            from,
            to,
            duration: 0.5,
            delay: 0.0,
            ease: Ease::default(),
            stagger: 0.0,
            group,
            count: 1,
            position: Position::Sequential,
        }
    }

    pub fn duration(mut self, seconds: f64) -> Self {
        self.duration = seconds.max(0.0);
        self
    }

    pub fn delay(mut self, seconds: f64) -> Self {
        self.delay = seconds.max(0.0);
        self
    }

    pub fn ease(mut self, ease: Ease) -> Self {
        self.ease = ease;
        self
    }

    pub fn stagger(mut self, count: usize, seconds: f64) -> Self {
        self.count = count;
        self.stagger = seconds.max(0.0);
        self
    }

    pub fn at(mut self, position: Position) -> Self {
        self.position = position;
        self
    }

    /// Span from placement to the last member's end.
    fn span(&self) -> f64 {
        let staggered = self.stagger * self.count.saturating_sub(1) as f64;
        self.delay + staggered + self.duration
    }

    fn member_progress(&self, local_time: f64, index: usize) -> f64 {
        let elapsed = local_time - self.delay - self.stagger * index as f64;
        if self.duration <= 0.0 {
            return if elapsed >= 0.0 { 1.0 } else { 0.0 };
        }
        (elapsed / self.duration).clamp(0.0, 1.0)
    }
}

#[derive(Clone, Debug, PartialEq)]
struct Placed {
    tween: Tween,
    start: f64,
}

/// Rendered state of one member of one target group.
#[derive(Clone, Debug, PartialEq)]
pub struct TargetFrame {
    pub group: usize,
    pub index: usize,
    pub frame: Frame,
}

#[derive(Clone, Debug, Default, PartialEq)]
pub struct Timeline {
    label: &'static str,
    placed: Vec<Placed>,
    duration: f64,
}

impl Timeline {
    pub fn new(label: &'static str) -> Self {
        Self {
            label,
            placed: Vec::new(),
            duration: 0.0,
        }
    }

    pub fn label(&self) -> &'static str {
        self.label
    }

    pub fn add(mut self, tween: Tween) -> Self {
        let (previous_start, previous_end) = self
            .placed
            .last()
            .map(|placed| (placed.start, placed.start + placed.tween.span()))
            .unwrap_or((0.0, 0.0));

        let start = match tween.position {
            Position::Sequential => previous_end,
            Position::Relative(offset) => previous_end + offset,
            Position::WithPrevious => previous_start,
            Position::Absolute(at) => at,
        }
        .max(0.0);

        self.duration = self.duration.max(start + tween.span());
        self.placed.push(Placed { tween, start });
        self
    }

    pub fn duration(&self) -> f64 {
        self.duration
    }

    /// Every member's frame at `time`. Members of tweens that have not
    /// started render their `from` frame; later tweens win on overlap.
    pub fn sample(&self, time: f64) -> Vec<TargetFrame> {
        let mut frames: Vec<TargetFrame> = Vec::new();

        for placed in &self.placed {
            let tween = &placed.tween;
            let local = time - placed.start;
            for index in 0..tween.count {
                let progress = tween.ease.apply(tween.member_progress(local, index));
                let frame = tween.from.interpolate(&tween.to, progress);

                match frames
                    .iter_mut()
                    .find(|existing| existing.group == tween.group && existing.index == index)
                {
                    Some(existing) if local >= 0.0 => existing.frame.merge(&frame),
                    Some(_) => {}
                    None => frames.push(TargetFrame {
                        group: tween.group,
                        index,
                        frame,
                    }),
                }
            }
        }

        frames
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
enum PlayState {
    Paused,
    Playing,
    Reversing,
    Killed,
}

/// Playhead over a timeline.
#[derive(Clone, Debug)]
pub struct Playback {
    timeline: Timeline,
    time: f64,
    state: PlayState,
}

impl Playback {
    pub fn new(timeline: Timeline) -> Self {
        Self {
            timeline,
            time: 0.0,
            state: PlayState::Paused,
        }
    }

    pub fn timeline(&self) -> &Timeline {
        &self.timeline
    }

    pub fn is_running(&self) -> bool {
        matches!(self.state, PlayState::Playing | PlayState::Reversing)
    }

    pub fn progress(&self) -> f64 {
        if self.timeline.duration() <= 0.0 {
            return if self.time > 0.0 { 1.0 } else { 0.0 };
        }
        (self.time / self.timeline.duration()).clamp(0.0, 1.0)
    }

    pub fn play(&mut self) {
        if self.state != PlayState::Killed {
            self.state = PlayState::Playing;
        }
    }

    pub fn reverse(&mut self) {
        if self.state != PlayState::Killed {
            self.state = PlayState::Reversing;
        }
    }

    /// Jumps to the end state and pauses there.
    pub fn seek_end(&mut self) {
        if self.state != PlayState::Killed {
            self.time = self.timeline.duration();
            self.state = PlayState::Paused;
        }
    }

    pub fn kill(&mut self) {
        self.state = PlayState::Killed;
    }

    pub fn frames(&self) -> Vec<TargetFrame> {
        self.timeline.sample(self.time)
    }

    /// Advances by `dt` seconds; returns frames to render while running.
    pub fn tick(&mut self, dt: f64) -> Option<Vec<TargetFrame>> {
        let dt = dt.max(0.0);
        match self.state {
            PlayState::Paused | PlayState::Killed => return None,
            PlayState::Playing => {
                self.time = (self.time + dt).min(self.timeline.duration());
                if self.time >= self.timeline.duration() {
                    self.state = PlayState::Paused;
                }
            }
            PlayState::Reversing => {
                self.time = (self.time - dt).max(0.0);
                if self.time <= 0.0 {
                    self.state = PlayState::Paused;
                }
            }
        }
        Some(self.frames())
    }
}
