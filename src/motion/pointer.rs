//! Pointer-proportional transforms and the registry of spotlight cards.

use std::collections::BTreeMap;

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Point {
    pub x: f64,
    pub y: f64,
}

impl Point {
    pub const fn new(x: f64, y: f64) -> Self {
        Self { x, y }
    }
}

/// Viewport-relative box, as returned by `getBoundingClientRect`.
#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Rect {
    pub left: f64,
    pub top: f64,
    pub width: f64,
    pub height: f64,
}

impl Rect {
    pub fn center(&self) -> Point {
        Point::new(self.left + self.width / 2.0, self.top + self.height / 2.0)
    }

    pub fn is_degenerate(&self) -> bool {
        self.width <= 0.0 || self.height <= 0.0
    }

    pub fn relative(&self, pointer: Point) -> Point {
        Point::new(pointer.x - self.left, pointer.y - self.top)
    }
}

#[derive(Clone, Copy, Debug, Default, PartialEq)]
pub struct Offset {
    pub x: f64,
    pub y: f64,
}

impl Offset {
    pub const ZERO: Self = Self { x: 0.0, y: 0.0 };

    pub fn translate(&self) -> String {
        format!("translate({:.2}px, {:.2}px)", self.x, self.y)
    }

    pub fn translate3d(&self) -> String {
        format!("translate3d({:.2}px, {:.2}px, 0)", self.x, self.y)
    }
}

pub fn magnetic_offset(rect: Rect, pointer: Point, strength: f64) -> Offset {
    let strength = strength.max(1.0);
    let center = rect.center();
    Offset {
        x: (pointer.x - center.x) / strength,
        y: (pointer.y - center.y) / strength,
    }
}

/// Element pulled toward the pointer wherever it is on the page.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Magnetic {
    strength: f64,
}

impl Magnetic {
    pub fn new(strength: f64) -> Self {
        Self { strength }
    }

    pub fn on_move(&self, rect: Rect, pointer: Point) -> Offset {
        magnetic_offset(rect, pointer, self.strength)
    }

    pub fn on_leave(&self) -> Offset {
        Offset::ZERO
    }
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub enum LeavePolicy {
    /// Keep the last offset until the next move.
    Persist,
    Reset,
}

/// Image shifted by the pointer's position inside it.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct Parallax {
    depth: f64,
    policy: LeavePolicy,
    offset: Offset,
}

impl Parallax {
    pub fn new(depth: f64, policy: LeavePolicy) -> Self {
        Self {
            depth,
            policy,
            offset: Offset::ZERO,
        }
    }

    pub fn on_move(&mut self, rect: Rect, pointer: Point) -> Offset {
        if rect.is_degenerate() {
            return self.offset;
        }
        let local = rect.relative(pointer);
        self.offset = Offset {
            x: (local.x / rect.width - 0.5) * self.depth,
            y: (local.y / rect.height - 0.5) * self.depth,
        };
        self.offset
    }

    /// Returns the offset to render, if leaving changes it.
    pub fn on_leave(&mut self) -> Option<Offset> {
        match self.policy {
            LeavePolicy::Persist => None,
            LeavePolicy::Reset => {
                self.offset = Offset::ZERO;
                Some(self.offset)
            }
        }
    }
}

/// Pointer position relative to a card, for its gradient spotlight.
pub fn spotlight_point(rect: Rect, pointer: Point) -> Point {
    rect.relative(pointer)
}

#[derive(Clone, Copy, Debug, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct SpotlightKey(u32);

/// Cards currently mounted that follow the pointer.
#[derive(Debug)]
pub struct SpotlightRegistry<T> {
    cards: BTreeMap<SpotlightKey, T>,
    next_key: u32,
    last_pointer: Option<Point>,
}

impl<T> Default for SpotlightRegistry<T> {
    fn default() -> Self {
        Self {
            cards: BTreeMap::new(),
            next_key: 0,
            last_pointer: None,
        }
    }
}

impl<T> SpotlightRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn insert(&mut self, card: T) -> SpotlightKey {
        let key = SpotlightKey(self.next_key);
        self.next_key = self.next_key.wrapping_add(1);
        self.cards.insert(key, card);
        key
    }

    pub fn remove(&mut self, key: SpotlightKey) -> Option<T> {
        self.cards.remove(&key)
    }

    pub fn len(&self) -> usize {
        self.cards.len()
    }

    pub fn last_pointer(&self) -> Option<Point> {
        self.last_pointer
    }

    /// Records the pointer and yields each card with its local coordinates.
    pub fn broadcast<'a>(
        &'a mut self,
        pointer: Point,
        mut measure: impl FnMut(&T) -> Option<Rect> + 'a,
    ) -> impl Iterator<Item = (&'a T, Point)> + 'a {
        self.last_pointer = Some(pointer);
        self.cards.values().filter_map(move |card| {
            let rect = measure(card)?;
            Some((card, spotlight_point(rect, pointer)))
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    const BUTTON: Rect = Rect {
        left: 100.0,
        top: 200.0,
        width: 200.0,
        height: 40.0,
    };

    #[test]
    fn magnetic_translation_is_center_offset_over_strength() {
        let magnetic = Magnetic::new(40.0);
        let offset = magnetic.on_move(BUTTON, Point::new(600.0, 20.0));

        assert_eq!(offset, Offset { x: 10.0, y: -5.0 });
        assert_eq!(magnetic.on_leave(), Offset::ZERO);
    }

    #[test]
    fn stronger_divisor_pulls_less() {
        let pointer = Point::new(600.0, 220.0);
        let weak = magnetic_offset(BUTTON, pointer, 80.0);
        let strong = magnetic_offset(BUTTON, pointer, 20.0);

        assert!(weak.x < strong.x);
    }

    #[test]
    fn parallax_is_centered_fraction_times_depth() {
        let image = Rect {
            left: 0.0,
            top: 0.0,
            width: 400.0,
            height: 200.0,
        };
        let mut parallax = Parallax::new(10.0, LeavePolicy::Reset);

        assert_eq!(parallax.on_move(image, Point::new(200.0, 100.0)), Offset::ZERO);
        assert_eq!(parallax.on_move(image, Point::new(400.0, 0.0)), Offset { x: 5.0, y: -5.0 });
        assert_eq!(parallax.on_leave(), Some(Offset::ZERO));
    }

    #[test]
    fn persisting_parallax_keeps_offset_on_leave() {
        let image = Rect {
            left: 0.0,
            top: 0.0,
            width: 100.0,
            height: 100.0,
        };
        let mut parallax = Parallax::new(10.0, LeavePolicy::Persist);
        parallax.on_move(image, Point::new(100.0, 100.0));

        assert_eq!(parallax.on_leave(), None);
        // A degenerate measurement after leaving re-renders the kept offset.
        assert_eq!(parallax.on_move(Rect::default(), Point::new(0.0, 0.0)), Offset { x: 5.0, y: 5.0 });
    }

    #[test]
    fn degenerate_rect_keeps_previous_parallax() {
        let mut parallax = Parallax::new(10.0, LeavePolicy::Reset);
        let offset = parallax.on_move(Rect::default(), Point::new(10.0, 10.0));

        assert_eq!(offset, Offset::ZERO);
        assert!(offset.x.is_finite());
    }

    #[test]
    fn broadcast_reaches_only_registered_cards() {
        let mut registry = SpotlightRegistry::new();
        let first = registry.insert(Rect {
            left: 10.0,
            top: 10.0,
            width: 100.0,
            height: 100.0,
        });
        let second = registry.insert(Rect {
            left: 200.0,
            top: 0.0,
            width: 50.0,
            height: 50.0,
        });
        registry.remove(first);

        let updates: Vec<Point> = registry
            .broadcast(Point::new(220.0, 30.0), |rect| Some(*rect))
            .map(|(_, local)| local)
            .collect();

        assert_eq!(updates, vec![Point::new(20.0, 30.0)]);
        assert_eq!(registry.last_pointer(), Some(Point::new(220.0, 30.0)));
        assert!(registry.remove(second).is_some());
        assert_eq!(registry.len(), 0);
    }

    #[test]
    fn css_translations_format_pixels() {
        let offset = Offset { x: 1.5, y: -2.0 };
        assert_eq!(offset.translate(), "translate(1.50px, -2.00px)");
        assert_eq!(offset.translate3d(), "translate3d(1.50px, -2.00px, 0)");
    }
}
