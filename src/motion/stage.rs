//! Bookkeeping for everything bound to the page's frame loop: triggers and
//! their listeners, timeline players and spotlight cards.
//!
//! Bindings are released by dropping their `Registration`. A guard dropped
//! while its owner is borrowed for a frame queues the removal instead, and
//! `flush` applies the queue before the next frame runs.

use std::cell::RefCell;
use std::collections::BTreeMap;
use std::rc::{Rc, Weak};

use super::pointer::{Point, Rect, SpotlightKey, SpotlightRegistry};
use super::timeline::{Frame, Playback, TargetFrame, Timeline};
use super::trigger::{Bounds, TriggerEngine, TriggerId, TriggerNotice, TriggerSpec};

/// Something a timeline renders into.
pub trait Surface {
    fn paint(&self, frame: &Frame);

    /// Removes everything `paint` wrote.
    fn clear(&self);
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct PlayerId(u32);

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum Removal {
    Trigger(TriggerId),
    Player(PlayerId),
    Spotlight(SpotlightKey),
}

/// Owner of the bindings a `Registration` releases.
pub trait Unbind {
    fn unbind(&mut self, removal: Removal);
}

pub type RemovalQueue = Rc<RefCell<Vec<Removal>>>;

/// Releases one binding when dropped.
pub struct Registration<S: Unbind> {
    removal: Removal,
    owner: Weak<RefCell<S>>,
    queue: Weak<RefCell<Vec<Removal>>>,
}

impl<S: Unbind> Registration<S> {
    pub fn new(removal: Removal, owner: &Rc<RefCell<S>>, queue: &RemovalQueue) -> Self {
        Self {
            removal,
            owner: Rc::downgrade(owner),
            queue: Rc::downgrade(queue),
        }
    }
}

impl<S: Unbind> Drop for Registration<S> {
    fn drop(&mut self) {
        let Some(owner) = self.owner.upgrade() else {
            return;
        };
        match owner.try_borrow_mut() {
            Ok(mut owner) => owner.unbind(self.removal),
            Err(_) => {
                if let Some(queue) = self.queue.upgrade() {
                    queue.borrow_mut().push(self.removal);
                }
            }
        };
    }
}

/// Applies the removals queued while `owner` was borrowed.
pub fn flush<S: Unbind>(owner: &mut S, queue: &RefCell<Vec<Removal>>) {
    // Taken first: unbinding may drop further guards that queue more work.
    let pending = std::mem::take(&mut *queue.borrow_mut());
    for removal in pending {
        owner.unbind(removal);
    }
}

struct Listener<T, L> {
    target: T,
    listener: L,
}

struct Player<N> {
    playback: Playback,
    /// One `Vec` per tween group.
    targets: Vec<Vec<N>>,
}

impl<N: Surface> Player<N> {
    fn render(&self, frames: &[TargetFrame]) {
        for target in frames {
            if let Some(node) = self
                .targets
                .get(target.group)
                .and_then(|group| group.get(target.index))
            {
                node.paint(&target.frame);
            }
        }
    }

    fn revert(&self) {
        for node in self.targets.iter().flatten() {
            node.clear();
        }
    }
}

/// Triggers measured through `T`, notifying listeners `L`, and timelines and
/// spotlight cards rendering into surfaces `N`.
pub struct Stage<T, L, N> {
    triggers: TriggerEngine,
    listeners: BTreeMap<TriggerId, Listener<T, L>>,
    players: BTreeMap<PlayerId, Player<N>>,
    next_player: u32,
    spotlight: SpotlightRegistry<N>,
}

impl<T, L, N> Default for Stage<T, L, N> {
    fn default() -> Self {
        Self {
            triggers: TriggerEngine::new(),
            listeners: BTreeMap::new(),
            players: BTreeMap::new(),
            next_player: 0,
            spotlight: SpotlightRegistry::new(),
        }
    }
}

impl<T, L: Clone, N: Surface> Stage<T, L, N> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn bind_trigger(&mut self, spec: TriggerSpec, target: T, listener: L) -> TriggerId {
        let id = self.triggers.register(spec);
        self.listeners.insert(id, Listener { target, listener });
        id
    }

    pub fn trigger_count(&self) -> usize {
        self.triggers.len()
    }

    /// Evaluates every trigger at `scroll` and returns the listeners to
    /// notify, in registration order. Nothing is called while the stage is
    /// borrowed; the caller emits after releasing it.
    pub fn evaluate(
        &mut self,
        scroll: f64,
        viewport_height: f64,
        mut measure: impl FnMut(&T) -> Option<Bounds>,
    ) -> Vec<(L, TriggerNotice)> {
        let listeners = &self.listeners;
        let notices = self.triggers.update_notices(scroll, viewport_height, |id| {
            listeners.get(&id).and_then(|bound| measure(&bound.target))
        });

        let dispatch = notices
            .into_iter()
            .filter_map(|(id, notice)| {
                let bound = self.listeners.get(&id)?;
                Some((bound.listener.clone(), notice))
            })
            .collect();

        // Once-triggers unregister themselves after firing.
        let triggers = &self.triggers;
        self.listeners.retain(|id, _| triggers.contains(*id));

        dispatch
    }

    /// Adds a paused timeline and renders its initial frames.
    pub fn add_player(&mut self, timeline: Timeline, targets: Vec<Vec<N>>) -> PlayerId {
        let id = PlayerId(self.next_player);
        self.next_player = self.next_player.wrapping_add(1);

        let player = Player {
            playback: Playback::new(timeline),
            targets,
        };
        player.render(&player.playback.frames());
        self.players.insert(id, player);
        id
    }

    /// Starts a player, or with `jump` renders its end state at once.
    pub fn play(&mut self, id: PlayerId, jump: bool) -> Option<&Playback> {
        let player = self.players.get_mut(&id)?;
        if jump {
            player.playback.seek_end();
            player.render(&player.playback.frames());
        } else {
            player.playback.play();
        }
        Some(&player.playback)
    }

    pub fn reverse(&mut self, id: PlayerId, jump: bool) {
        let Some(player) = self.players.get_mut(&id) else {
            return;
        };
        player.playback.reverse();
        if jump {
            if let Some(frames) = player.playback.tick(f64::MAX) {
                player.render(&frames);
            }
        }
    }

    /// Advances running players by `dt` seconds and renders them.
    pub fn tick(&mut self, dt: f64) {
        for player in self.players.values_mut() {
            if !player.playback.is_running() {
                continue;
            }
            if let Some(frames) = player.playback.tick(dt) {
                player.render(&frames);
            }
        }
    }

    pub fn add_spotlight(&mut self, card: N) -> SpotlightKey {
        self.spotlight.insert(card)
    }

    pub fn spotlight_count(&self) -> usize {
        self.spotlight.len()
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.spotlight.last_pointer()
    }

    /// Records the pointer and yields each card with its local coordinates.
    pub fn broadcast<'a>(
        &'a mut self,
        pointer: Point,
        measure: impl FnMut(&N) -> Option<Rect> + 'a,
    ) -> impl Iterator<Item = (&'a N, Point)> + 'a {
        self.spotlight.broadcast(pointer, measure)
    }
}

impl<T, L, N: Surface> Unbind for Stage<T, L, N> {
    fn unbind(&mut self, removal: Removal) {
        match removal {
            Removal::Trigger(id) => {
                self.triggers.unregister(id);
                self.listeners.remove(&id);
            }
            Removal::Player(id) => {
                if let Some(mut player) = self.players.remove(&id) {
                    player.playback.kill();
                    player.revert();
                }
            }
            Removal::Spotlight(key) => {
                self.spotlight.remove(key);
            }
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::motion::{TriggerEvent, Tween};

    const VIEWPORT: f64 = 800.0;
    const SECTION: Bounds = Bounds {
        top: 1_000.0,
        height: 600.0,
    };

    /// Records every write; `None` marks a clear.
    #[derive(Clone, Default)]
    struct Canvas(Rc<RefCell<Vec<Option<Frame>>>>);

    impl Canvas {
        fn writes(&self) -> usize {
            self.0.borrow().len()
        }

        fn last(&self) -> Option<Option<Frame>> {
            self.0.borrow().last().copied()
        }
    }

    impl Surface for Canvas {
        fn paint(&self, frame: &Frame) {
            self.0.borrow_mut().push(Some(*frame));
        }

        fn clear(&self) {
            self.0.borrow_mut().push(None);
        }
    }

    type TestStage = Stage<Bounds, &'static str, Canvas>;

    fn fade() -> Timeline {
        Timeline::new("fade").add(Tween::from(0, Frame::new().opacity(0.0)).duration(1.0))
    }

    fn toggle() -> TriggerSpec {
        TriggerSpec::toggle("top center", "bottom center").expect("valid trigger")
    }

    fn measure(bounds: &Bounds) -> Option<Bounds> {
        Some(*bounds)
    }

    #[test]
    fn removal_while_mid_frame_applies_on_the_next_frame() {
        let stage = Rc::new(RefCell::new(TestStage::new()));
        let queue = RemovalQueue::default();
        let canvas = Canvas::default();

        let (trigger, player) = {
            let mut stage_mut = stage.borrow_mut();
            let trigger = stage_mut.bind_trigger(toggle(), SECTION, "section");
            let player = stage_mut.add_player(fade(), vec![vec![canvas.clone()]]);
            stage_mut.play(player, false);
            (trigger, player)
        };
        let trigger = Registration::new(Removal::Trigger(trigger), &stage, &queue);
        let player = Registration::new(Removal::Player(player), &stage, &queue);

        // Unmount while a frame holds the stage: nothing is released yet.
        let frame = stage.borrow_mut();
        drop(trigger);
        drop(player);
        assert_eq!(queue.borrow().len(), 2);
        assert_eq!(frame.trigger_count(), 1);
        drop(frame);

        let mut next = stage.borrow_mut();
        flush(&mut *next, &queue);
        assert!(queue.borrow().is_empty());
        assert_eq!(next.trigger_count(), 0);
        assert_eq!(canvas.last(), Some(None), "player reverted its styles");

        let writes = canvas.writes();
        assert!(next.evaluate(1_000.0, VIEWPORT, measure).is_empty());
        next.tick(0.1);
        assert_eq!(canvas.writes(), writes);
    }

    #[test]
    fn dropping_outside_a_frame_releases_at_once() {
        let stage = Rc::new(RefCell::new(TestStage::new()));
        let queue = RemovalQueue::default();

        let key = stage.borrow_mut().add_spotlight(Canvas::default());
        let id = stage.borrow_mut().bind_trigger(toggle(), SECTION, "section");
        drop(Registration::new(Removal::Spotlight(key), &stage, &queue));
        drop(Registration::new(Removal::Trigger(id), &stage, &queue));

        assert!(queue.borrow().is_empty());
        assert_eq!(stage.borrow().spotlight_count(), 0);
        assert_eq!(stage.borrow().trigger_count(), 0);
    }

    #[test]
    fn guard_outliving_its_stage_is_inert() {
        let stage = Rc::new(RefCell::new(TestStage::new()));
        let queue = RemovalQueue::default();
        let id = stage.borrow_mut().bind_trigger(toggle(), SECTION, "section");
        let registration = Registration::new(Removal::Trigger(id), &stage, &queue);

        drop(stage);
        drop(registration);
        assert!(queue.borrow().is_empty());
    }

    #[test]
    fn evaluate_notifies_in_registration_order_and_forgets_fired_once_triggers() {
        let mut stage = TestStage::new();
        stage.bind_trigger(TriggerSpec::once("top center").expect("valid trigger"), SECTION, "once");
        stage.bind_trigger(toggle(), SECTION, "toggle");

        let notified: Vec<_> = stage
            .evaluate(1_000.0, VIEWPORT, measure)
            .into_iter()
            .map(|(listener, notice)| (listener, notice.event))
            .collect();

        assert_eq!(notified, vec![("once", TriggerEvent::Enter), ("toggle", TriggerEvent::Enter)]);
        assert_eq!(stage.trigger_count(), 1);

        let back: Vec<_> = stage.evaluate(0.0, VIEWPORT, measure);
        assert_eq!(back.len(), 1);
        assert_eq!(back[0].0, "toggle");
        assert_eq!(back[0].1.event, TriggerEvent::LeaveBack);
    }

    #[test]
    fn jumping_play_renders_the_end_state_without_ticking() {
        let mut stage = TestStage::new();
        let canvas = Canvas::default();
        let id = stage.add_player(fade(), vec![vec![canvas.clone()]]);
        assert_eq!(canvas.last(), Some(Some(Frame::new().opacity(0.0))));

        let playback = stage.play(id, true).expect("player exists");
        assert_eq!(playback.progress(), 1.0);
        assert!(!playback.is_running());
        assert_eq!(canvas.last(), Some(Some(Frame::new().opacity(1.0))));

        stage.reverse(id, true);
        assert_eq!(canvas.last(), Some(Some(Frame::new().opacity(0.0))));
    }

    #[test]
    fn only_running_players_render_on_tick() {
        let mut stage = TestStage::new();
        let idle = Canvas::default();
        let running = Canvas::default();
        stage.add_player(fade(), vec![vec![idle.clone()]]);
        let id = stage.add_player(fade(), vec![vec![running.clone()]]);
        stage.play(id, false);

        stage.tick(0.5);
        assert_eq!(idle.writes(), 1);
        assert_eq!(running.writes(), 2);
    }
}
