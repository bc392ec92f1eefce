use heapless::Vec;

use crate::types::{TouchId, TouchPointState, TouchSnapshot, MAX_TOUCH_POINTS};

pub const ACTIVE_TOUCH_CAPACITY: usize = 16;

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
pub struct ActiveTouch {
    pub id: TouchId,
    pub start_ms: u64,
}

/// Touches currently pressed and not yet released, with their press times.
///
/// Slots are reused first-fit. When every slot is taken the oldest touch is
/// evicted to make room, which only happens with more fingers than
/// [`ACTIVE_TOUCH_CAPACITY`] or when releases were never reported.
#[derive(Clone, Debug)]
pub struct ActiveTouchPool {
    slots: [Option<ActiveTouch>; ACTIVE_TOUCH_CAPACITY],
    len: usize,
}

impl Default for ActiveTouchPool {
    fn default() -> Self {
        Self::new()
    }
}

impl ActiveTouchPool {
    pub const fn new() -> Self {
        Self {
            slots: [None; ACTIVE_TOUCH_CAPACITY],
            len: 0,
        }
    }

    pub fn len(&self) -> usize {
        self.len
    }

    pub fn is_empty(&self) -> bool {
        self.len == 0
    }

    pub fn contains(&self, id: TouchId) -> bool {
        self.iter().any(|touch| touch.id == id)
    }

    pub fn iter(&self) -> impl Iterator<Item = &ActiveTouch> {
        self.slots.iter().filter_map(Option::as_ref)
    }

    /// Records a press. Returns the entry evicted to make room, if any.
    pub fn add_touch_point(&mut self, id: TouchId, now_ms: u64) -> Option<ActiveTouch> {
        if let Some(existing) = self.slots.iter_mut().flatten().find(|touch| touch.id == id) {
            existing.start_ms = now_ms;
            return None;
        }

        let mut evicted = None;
        let slot = match self.slots.iter().position(Option::is_none) {
            Some(free) => free,
            None => {
                let oldest = self.oldest_slot();
                evicted = self.slots[oldest].take();
                self.len -= 1;
                if let Some(touch) = evicted {
                    log::warn!(
                        "active touch pool full ({} entries); evicting touch {} pressed at {}ms",
                        ACTIVE_TOUCH_CAPACITY,
                        touch.id,
                        touch.start_ms
                    );
                }
                oldest
            }
        };

        self.slots[slot] = Some(ActiveTouch {
            id,
            start_ms: now_ms,
        });
        self.len += 1;
        evicted
    }

    pub fn remove_touch_point(&mut self, id: TouchId) -> bool {
        for slot in &mut self.slots {
            if slot.is_some_and(|touch| touch.id == id) {
                *slot = None;
                self.len -= 1;
                return true;
            }
        }
        false
    }

    /// Latest press time among active touches, `None` when the pool is empty.
    pub fn most_recent_start_time(&self) -> Option<u64> {
        self.iter().map(|touch| touch.start_ms).max()
    }

    /// Applies the presses and releases reported by `snapshot`.
    ///
    /// Returns the entries evicted by pool exhaustion.
    pub fn update(&mut self, snapshot: &TouchSnapshot) -> Vec<ActiveTouch, MAX_TOUCH_POINTS> {
        let mut evicted = Vec::new();
        for point in &snapshot.points {
            match point.state {
                TouchPointState::Pressed => {
                    if let Some(touch) = self.add_touch_point(point.id, snapshot.t_ms) {
                        let _ = evicted.push(touch);
                    }
                }
                TouchPointState::Released => {
                    self.remove_touch_point(point.id);
                }
                TouchPointState::Moved | TouchPointState::Stationary => {}
            }
        }
        evicted
    }

    fn oldest_slot(&self) -> usize {
        self.slots
            .iter()
            .enumerate()
            .filter_map(|(index, slot)| slot.map(|touch| (index, touch.start_ms)))
            .min_by_key(|(_, start_ms)| *start_ms)
            .map_or(0, |(index, _)| index)
    }
}
