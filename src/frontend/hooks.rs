use std::cell::RefCell;
use std::rc::Rc;

use gloo::events::EventListener;
use serde_json::json;
use wasm_bindgen::JsCast;
use web_sys::{window, Element, Event, HtmlElement, MouseEvent};
use yew::prelude::*;

use super::dom::{self, IntersectionWatch};
use super::runtime::{MotionHandle, PageDriver, TriggerTarget};
use crate::config::MotionConfig;
use crate::logging::{LogLevel, Logger};
use crate::motion::{
    LeavePolicy, Magnetic, Parallax, PlayerId, Point, Timeline, TriggerEvent, TriggerNotice, TriggerSpec,
    ViewportGate,
};

#[hook]
pub fn use_motion() -> Option<MotionHandle> {
    use_context::<MotionHandle>()
}

/// Config of the enclosing runtime, or defaults outside one.
#[hook]
pub fn use_motion_config() -> MotionConfig {
    use_motion()
        .map(|motion| motion.config())
        .unwrap_or_default()
}

#[hook]
pub fn use_logger() -> Logger {
    use_motion()
        .map(|motion| motion.logger())
        .unwrap_or_else(|| Logger::new(LogLevel::Info))
}

/// Creates the page runtime once and drives it for the component's lifetime.
#[hook]
pub fn use_motion_runtime(config: MotionConfig) -> MotionHandle {
    let handle = use_memo((), move |_| MotionHandle::new(config));

    {
        let handle = (*handle).clone();
        use_effect_with((), move |_| {
            let driver = PageDriver::attach(&handle);
            move || drop(driver)
        });
    }

    (*handle).clone()
}

pub enum TimelineStart {
    /// Plays as soon as the component mounts.
    Mount,
    /// Plays when the trigger enters; toggle triggers reverse on `LeaveBack`.
    Trigger(TriggerTarget, Option<TriggerSpec>),
    /// Plays when the returned callback is emitted.
    Manual,
}

/// Binds a timeline to `targets` (one `Vec` per tween group). The timeline
/// is killed and its inline styles removed when the component unmounts.
#[hook]
pub fn use_timeline(
    timeline: Timeline,
    targets: Vec<Vec<NodeRef>>,
    start: TimelineStart,
) -> Callback<()> {
    let motion = use_motion();
    let player = use_mut_ref(|| None::<PlayerId>);

    {
        let motion = motion.clone();
        let player = player.clone();
        use_effect_with((), move |_| {
            let registrations = motion.map(|motion| {
                let (id, timeline_registration) = motion.add_timeline(timeline, targets);
                *player.borrow_mut() = Some(id);

                let trigger_registration = match start {
                    TimelineStart::Mount => {
                        motion.play(id);
                        None
                    }
                    TimelineStart::Trigger(target, Some(spec)) => {
                        let controller = motion.clone();
                        let on_notice = Callback::from(move |notice: TriggerNotice| match notice.event {
                            TriggerEvent::Enter | TriggerEvent::EnterBack => controller.play(id),
                            TriggerEvent::LeaveBack => controller.reverse(id),
                            TriggerEvent::Leave => {}
                        });
                        Some(motion.register_trigger(target, spec, on_notice))
                    }
                    TimelineStart::Trigger(_, None) | TimelineStart::Manual => None,
                };

                (timeline_registration, trigger_registration)
            });

            move || drop(registrations)
        });
    }

    Callback::from(move |_| {
        if let (Some(motion), Some(id)) = (motion.as_ref(), *player.borrow()) {
            motion.play(id);
        }
    })
}

/// Whether `target` has shown at least `threshold` of itself; with `once`
/// the answer stays `true` for the rest of the component's life.
#[hook]
pub fn use_in_view(target: NodeRef, threshold: f64, once: bool) -> bool {
    let open = use_state(|| false);
    let logger = use_logger();

    {
        let open = open.clone();
        use_effect_with((), move |_| {
            let gate = Rc::new(RefCell::new(ViewportGate::new(threshold, once)));
            let watch = target.cast::<Element>().and_then(|element| {
                IntersectionWatch::observe(&element, threshold, move |ratio, intersecting| {
                    let mut gate = gate.borrow_mut();
                    if gate.observe(ratio, intersecting) {
                        if gate.is_open() {
                            logger.debug("viewport_gate_opened", json!({ "threshold": gate.threshold() }));
                        }
                        open.set(gate.is_open());
                    }
                })
            });
            move || drop(watch)
        });
    }

    *open
}

fn pointer_of(event: &Event) -> Option<Point> {
    let event = event.dyn_ref::<MouseEvent>()?;
    Some(Point::new(f64::from(event.client_x()), f64::from(event.client_y())))
}

/// Pulls `node` toward the pointer anywhere on the page; resets when the
/// pointer leaves the document.
#[hook]
pub fn use_magnetic(node: NodeRef, strength: f64) {
    use_effect_with((), move |_| {
        let magnetic = Magnetic::new(strength);
        let mut listeners = Vec::new();

        if let Some(win) = window() {
            let move_node = node.clone();
            listeners.push(EventListener::new(&win, "mousemove", move |event| {
                let (Some(pointer), Some(element)) = (pointer_of(event), move_node.cast::<HtmlElement>()) else {
                    return;
                };
                let offset = magnetic.on_move(dom::client_rect(&element), pointer);
                let _ = element.style().set_property("transform", &offset.translate());
            }));

            if let Some(document) = win.document() {
                listeners.push(EventListener::new(&document, "mouseleave", move |_| {
                    dom::set_style(&node, "transform", &magnetic.on_leave().translate());
                }));
            }
        }

        move || drop(listeners)
    });
}

/// Shifts `node` by the pointer's position inside it.
#[hook]
pub fn use_parallax(node: NodeRef, depth: f64, policy: LeavePolicy) {
    use_effect_with((), move |_| {
        let parallax = Rc::new(RefCell::new(Parallax::new(depth, policy)));
        let mut listeners = Vec::new();

        if let Some(element) = node.cast::<HtmlElement>() {
            let move_state = parallax.clone();
            let move_element = element.clone();
            listeners.push(EventListener::new(&element, "mousemove", move |event| {
                let Some(pointer) = pointer_of(event) else {
                    return;
                };
                let offset = move_state.borrow_mut().on_move(dom::client_rect(&move_element), pointer);
                let _ = move_element.style().set_property("transform", &offset.translate3d());
            }));

            let leave_element = element.clone();
            listeners.push(EventListener::new(&element, "mouseleave", move |_| {
                if let Some(offset) = parallax.borrow_mut().on_leave() {
                    let _ = leave_element.style().set_property("transform", &offset.translate3d());
                }
            }));
        }

        move || drop(listeners)
    });
}

/// Enrolls `node` in the page's pointer spotlight broadcast while mounted.
#[hook]
pub fn use_spotlight(node: NodeRef) {
    let motion = use_motion();
    use_effect_with((), move |_| {
        let registration = motion.map(|motion| motion.register_spotlight(node));
        move || drop(registration)
    });
}
