//! Per-page motion runtime. One frame loop advances the scroll driver,
//! evaluates triggers, dispatches their notices and ticks timelines, in that
//! order, so every consumer reads this frame's scroll position.

use std::cell::RefCell;
use std::rc::{Rc, Weak};

use gloo::events::{EventListener, EventListenerOptions};
use gloo::render::{request_animation_frame, AnimationFrame};
use serde_json::json;
use wasm_bindgen::JsCast;
use web_sys::{window, Element, MouseEvent, TouchEvent, WheelEvent};
use yew::{Callback, NodeRef};

use super::dom;
use crate::config::MotionConfig;
use crate::logging::Logger;
use crate::motion::{
    normalize_wheel, stage, Bounds, InputSource, PlayerId, Point, Removal, RemovalQueue,
    SmoothScroll, Stage, Timeline, TriggerNotice, TriggerSpec, Unbind, WheelDeltaMode,
};
use crate::story::Section;

/// Longest step a single frame may advance, so a backgrounded tab does not
/// jump every animation to its end on return.
const MAX_FRAME_DELTA_SECONDS: f64 = 0.1;

/// What a trigger measures.
#[derive(Clone, PartialEq)]
pub enum TriggerTarget {
    Node(NodeRef),
    ElementId(&'static str),
}

impl TriggerTarget {
    fn bounds(&self) -> Option<Bounds> {
        let element = match self {
            Self::Node(node) => node.cast::<Element>()?,
            Self::ElementId(id) => dom::element_by_id(id)?,
        };
        Some(dom::document_bounds(&element))
    }
}

pub struct MotionRuntime {
    config: MotionConfig,
    logger: Logger,
    scroll: SmoothScroll,
    stage: Stage<TriggerTarget, Callback<TriggerNotice>, NodeRef>,
    last_frame: Option<f64>,
    frame_delta: f64,
    touch_y: Option<f64>,
}

impl MotionRuntime {
    fn step(&mut self, timestamp: f64) -> Vec<(Callback<TriggerNotice>, TriggerNotice)> {
        self.frame_delta = self
            .last_frame
            .map(|last| ((timestamp - last) / 1_000.0).clamp(0.0, MAX_FRAME_DELTA_SECONDS))
            .unwrap_or(0.0);
        self.last_frame = Some(timestamp);

        self.scroll.set_limit(dom::scroll_limit());
        match self.scroll.advance(self.frame_delta) {
            Some(position) => dom::scroll_window_to(position),
            None => self.scroll.sync_native(dom::scroll_y()),
        }

        self.stage
            .evaluate(dom::scroll_y(), dom::viewport_height(), TriggerTarget::bounds)
    }
}

impl Unbind for MotionRuntime {
    fn unbind(&mut self, removal: Removal) {
        self.stage.unbind(removal);
    }
}

/// Releases one trigger, timeline or spotlight card when dropped. Removals
/// requested while the runtime is mid-frame are applied on the next frame.
pub type Registration = stage::Registration<MotionRuntime>;

/// Shared handle to the page's motion runtime, provided through context.
#[derive(Clone)]
pub struct MotionHandle {
    state: Rc<RefCell<MotionRuntime>>,
    pending: RemovalQueue,
}

impl PartialEq for MotionHandle {
    fn eq(&self, other: &Self) -> bool {
        Rc::ptr_eq(&self.state, &other.state)
    }
}

impl MotionHandle {
    pub fn new(config: MotionConfig) -> Self {
        let scroll = SmoothScroll::new(config.scroll, dom::scroll_y(), dom::scroll_limit());
        Self {
            state: Rc::new(RefCell::new(MotionRuntime {
                config,
                logger: Logger::new(config.log_level),
                scroll,
                stage: Stage::new(),
                last_frame: None,
                frame_delta: 0.0,
                touch_y: None,
            })),
            pending: RemovalQueue::default(),
        }
    }

    pub fn config(&self) -> MotionConfig {
        self.state.borrow().config
    }

    pub fn logger(&self) -> Logger {
        self.state.borrow().logger
    }

    fn registration(&self, removal: Removal) -> Registration {
        Registration::new(removal, &self.state, &self.pending)
    }

    pub fn register_trigger(
        &self,
        target: TriggerTarget,
        spec: TriggerSpec,
        on_notice: Callback<TriggerNotice>,
    ) -> Registration {
        let mut runtime = self.state.borrow_mut();
        let id = runtime.stage.bind_trigger(spec, target, on_notice);
        runtime.logger.debug(
            "trigger_registered",
            json!({ "mode": format!("{:?}", spec.mode), "total": runtime.stage.trigger_count() }),
        );
        drop(runtime);
        self.registration(Removal::Trigger(id))
    }

    /// Registers a paused timeline and renders its initial frames.
    pub fn add_timeline(&self, timeline: Timeline, targets: Vec<Vec<NodeRef>>) -> (PlayerId, Registration) {
        let id = self.state.borrow_mut().stage.add_player(timeline, targets);
        (id, self.registration(Removal::Player(id)))
    }

    pub fn play(&self, id: PlayerId) {
        let mut runtime = self.state.borrow_mut();
        let reduced = runtime.config.reduced_motion;
        let logger = runtime.logger;
        if let Some(playback) = runtime.stage.play(id, reduced) {
            logger.debug(
                "timeline_started",
                json!({
                    "timeline": playback.timeline().label(),
                    "progress": playback.progress(),
                    "reducedMotion": reduced,
                }),
            );
        }
    }

    pub fn reverse(&self, id: PlayerId) {
        let mut runtime = self.state.borrow_mut();
        let reduced = runtime.config.reduced_motion;
        runtime.stage.reverse(id, reduced);
    }

    pub fn register_spotlight(&self, node: NodeRef) -> Registration {
        let mut runtime = self.state.borrow_mut();
        let key = runtime.stage.add_spotlight(node.clone());
        runtime
            .logger
            .debug("spotlight_registered", json!({ "total": runtime.stage.spotlight_count() }));
        let pointer = runtime.stage.last_pointer();
        drop(runtime);

        if let Some(pointer) = pointer {
            paint_spotlight(&node, pointer);
        }
        self.registration(Removal::Spotlight(key))
    }

    pub fn broadcast_pointer(&self, pointer: Point) {
        let Ok(mut runtime) = self.state.try_borrow_mut() else {
            return;
        };
        let updates = runtime
            .stage
            .broadcast(pointer, |node| node.cast::<Element>().map(|element| dom::client_rect(&element)));
        for (node, local) in updates {
            write_spotlight(node, local);
        }
    }

    pub fn scroll_to_section(&self, section: Section) {
        let Some(element) = dom::element_by_id(section.id()) else {
            return;
        };
        let top = dom::document_bounds(&element).top;

        let mut runtime = self.state.borrow_mut();
        let immediate = runtime.config.reduced_motion;
        runtime.scroll.set_limit(dom::scroll_limit());
        runtime.scroll.scroll_to(top, immediate);
        if immediate {
            dom::scroll_window_to(runtime.scroll.position());
        }
        runtime.logger.info(
            "scroll_to_section",
            json!({ "section": section.id(), "target": runtime.scroll.target().round() }),
        );
    }

    fn on_wheel(&self, event: &WheelEvent) {
        if event.ctrl_key() {
            return;
        }
        let delta = normalize_wheel(
            event.delta_y(),
            WheelDeltaMode::from_dom(event.delta_mode()),
            dom::viewport_height(),
        );

        let mut runtime = self.state.borrow_mut();
        runtime.scroll.set_limit(dom::scroll_limit());
        if runtime.scroll.on_input(InputSource::Wheel, delta) {
            event.prevent_default();
        }
    }

    fn on_touch_start(&self, event: &TouchEvent) {
        let y = event.touches().get(0).map(|touch| f64::from(touch.client_y()));
        let mut runtime = self.state.borrow_mut();
        // A finger on the page takes over from a running wheel or anchor scroll.
        runtime.scroll.stop();
        runtime.touch_y = y;
    }

    fn on_touch_move(&self, event: &TouchEvent) {
        let Some(y) = event.touches().get(0).map(|touch| f64::from(touch.client_y())) else {
            return;
        };

        let mut runtime = self.state.borrow_mut();
        let Some(previous) = runtime.touch_y.replace(y) else {
            return;
        };
        if runtime.scroll.on_input(InputSource::Touch, previous - y) {
            event.prevent_default();
        }
    }

    fn frame(&self, timestamp: f64) {
        let dispatch = {
            let Ok(mut runtime) = self.state.try_borrow_mut() else {
                return;
            };
            stage::flush(&mut *runtime, &self.pending);
            runtime.step(timestamp)
        };

        for (callback, notice) in dispatch {
            callback.emit(notice);
        }

        if let Ok(mut runtime) = self.state.try_borrow_mut() {
            let dt = runtime.frame_delta;
            runtime.stage.tick(dt);
        }
    }
}

fn write_spotlight(node: &NodeRef, local: Point) {
    dom::set_style(node, "--x", &format!("{:.1}px", local.x));
    dom::set_style(node, "--y", &format!("{:.1}px", local.y));
}

fn paint_spotlight(node: &NodeRef, pointer: Point) {
    if let Some(element) = node.cast::<Element>() {
        write_spotlight(node, dom::client_rect(&element).relative(pointer));
    }
}

type FrameSlot = Rc<RefCell<Option<AnimationFrame>>>;

/// Requests the next frame; each callback re-arms the loop while `slot` is
/// alive.
fn request_frame(handle: MotionHandle, slot: Weak<RefCell<Option<AnimationFrame>>>) -> AnimationFrame {
    request_animation_frame(move |timestamp| {
        handle.frame(timestamp);
        if let Some(slot) = slot.upgrade() {
            let next = request_frame(handle, Rc::downgrade(&slot));
            *slot.borrow_mut() = Some(next);
        }
    })
}

/// Page-level input and frame bindings for the runtime. Dropping it cancels
/// the pending frame and releases wheel, touch and pointer listeners.
pub struct PageDriver {
    _frames: FrameSlot,
    _listeners: Vec<EventListener>,
}

impl PageDriver {
    pub fn attach(handle: &MotionHandle) -> Self {
        let config = handle.config();
        let logger = handle.logger();
        let frames = FrameSlot::default();

        let Some(win) = window() else {
            logger.info("motion_runtime_inert", json!({ "reason": "no window" }));
            return Self {
                _frames: frames,
                _listeners: Vec::new(),
            };
        };

        let mut listeners = Vec::new();

        let wheel_handle = handle.clone();
        listeners.push(EventListener::new_with_options(
            &win,
            "wheel",
            EventListenerOptions::enable_prevent_default(),
            move |event| {
                if let Some(event) = event.dyn_ref::<WheelEvent>() {
                    wheel_handle.on_wheel(event);
                }
            },
        ));

        let start_handle = handle.clone();
        listeners.push(EventListener::new(&win, "touchstart", move |event| {
            if let Some(event) = event.dyn_ref::<TouchEvent>() {
                start_handle.on_touch_start(event);
            }
        }));

        if config.scroll.smooth_touch {
            let move_handle = handle.clone();
            listeners.push(EventListener::new_with_options(
                &win,
                "touchmove",
                EventListenerOptions::enable_prevent_default(),
                move |event| {
                    if let Some(event) = event.dyn_ref::<TouchEvent>() {
                        move_handle.on_touch_move(event);
                    }
                },
            ));
        }

        let pointer_handle = handle.clone();
        listeners.push(EventListener::new(&win, "mousemove", move |event| {
            if let Some(event) = event.dyn_ref::<MouseEvent>() {
                pointer_handle.broadcast_pointer(Point::new(
                    f64::from(event.client_x()),
                    f64::from(event.client_y()),
                ));
            }
        }));

        *frames.borrow_mut() = Some(request_frame(handle.clone(), Rc::downgrade(&frames)));

        logger.info(
            "motion_runtime_started",
            json!({
                "smoothWheel": config.scroll.smooth_wheel,
                "smoothTouch": config.scroll.smooth_touch,
                "lerp": config.scroll.lerp,
                "duration": config.scroll.duration,
                "reducedMotion": config.reduced_motion,
            }),
        );

        Self {
            _frames: frames,
            _listeners: listeners,
        }
    }
}
