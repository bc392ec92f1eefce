//! Touch-ownership arbitration between recognizers sharing a touch source.

use std::{cell::RefCell, collections::VecDeque};

use crate::{
    gesture::SwipeMessage,
    types::{RecognizerId, TouchId, TouchPointState, TouchSnapshot},
};

/// Arbiter deciding which recognizer exclusively owns a touch.
///
/// Calls never grant synchronously; the outcome reaches recognizers later as
/// [`SwipeMessage::OwnershipGained`] or [`SwipeMessage::OwnershipLost`].
pub trait TouchOwnershipRegistry {
    /// Registers interest in `touch_id` without claiming it.
    fn add_candidate_owner_for_touch(&self, touch_id: TouchId, recognizer: RecognizerId);
    fn request_touch_ownership(&self, touch_id: TouchId, recognizer: RecognizerId);
    fn remove_candidate_owner_for_touch(&self, touch_id: TouchId, recognizer: RecognizerId);
    /// Keeps `recognizer` informed about `touch_id` until it ends, without competing for it.
    fn add_touch_watcher(&self, touch_id: TouchId, recognizer: RecognizerId);
}

#[derive(Clone, Debug, PartialEq)]
pub struct Delivery {
    pub recipient: RecognizerId,
    pub message: SwipeMessage,
}

#[derive(Clone, Copy, Debug, PartialEq, Eq)]
struct Candidate {
    recognizer: RecognizerId,
    requested: bool,
}

#[derive(Clone, Debug)]
struct TouchInfo {
    id: TouchId,
    candidates: Vec<Candidate>,
    owner: Option<RecognizerId>,
    watchers: Vec<RecognizerId>,
}

impl TouchInfo {
    fn new(id: TouchId) -> Self {
        Self {
            id,
            candidates: Vec::new(),
            owner: None,
            watchers: Vec::new(),
        }
    }

    fn is_candidate(&self, recognizer: RecognizerId) -> bool {
        self.candidates
            .iter()
            .any(|candidate| candidate.recognizer == recognizer)
    }

    fn follows_unowned(&self, recognizer: RecognizerId) -> bool {
        self.owner != Some(recognizer)
            && (self.is_candidate(recognizer) || self.watchers.contains(&recognizer))
    }

    fn parties(&self) -> impl Iterator<Item = RecognizerId> + '_ {
        self.owner
            .into_iter()
            .chain(self.candidates.iter().map(|candidate| candidate.recognizer))
            .chain(self.watchers.iter().copied())
    }
}

/// In-process registry: the earliest registered candidate that requests
/// ownership wins, every other candidate is told it lost.
///
/// A candidate that requests while an earlier one is still undecided waits
/// until the earlier ones withdraw.
#[derive(Debug, Default)]
pub struct TouchRegistry {
    touches: RefCell<Vec<TouchInfo>>,
    pending: RefCell<VecDeque<Delivery>>,
}

impl TouchRegistry {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn owner_of(&self, touch_id: TouchId) -> Option<RecognizerId> {
        self.touches
            .borrow()
            .iter()
            .find(|info| info.id == touch_id)
            .and_then(|info| info.owner)
    }

    pub fn candidates_of(&self, touch_id: TouchId) -> Vec<RecognizerId> {
        self.touches
            .borrow()
            .iter()
            .find(|info| info.id == touch_id)
            .map(|info| info.candidates.iter().map(|c| c.recognizer).collect())
            .unwrap_or_default()
    }

    pub fn watchers_of(&self, touch_id: TouchId) -> Vec<RecognizerId> {
        self.touches
            .borrow()
            .iter()
            .find(|info| info.id == touch_id)
            .map(|info| info.watchers.clone())
            .unwrap_or_default()
    }

    pub fn is_tracking(&self, touch_id: TouchId) -> bool {
        self.touches.borrow().iter().any(|info| info.id == touch_id)
    }

    /// Drains ownership decisions made since the last call, oldest first.
    pub fn take_ownership_events(&self) -> Vec<Delivery> {
        self.pending.borrow_mut().drain(..).collect()
    }

    /// Splits one frame into per-recognizer deliveries.
    ///
    /// `recipients` are the recognizers whose area the frame hits. Each of
    /// them gets fresh presses plus the touches it owns as a direct
    /// [`SwipeMessage::Sample`]. Candidates and watchers of a touch also get
    /// it as [`SwipeMessage::UnownedSample`], wherever they are. Released
    /// touches are forgotten once the frame is routed.
    pub fn route(&self, snapshot: &TouchSnapshot, recipients: &[RecognizerId]) -> Vec<Delivery> {
        let mut touches = self.touches.borrow_mut();
        for point in snapshot.pressed() {
            if let Some(index) = touches.iter().position(|info| info.id == point.id) {
                log::debug!("touch {} pressed again; dropping its stale record", point.id);
                touches.swap_remove(index);
            }
        }

        let mut everyone: Vec<RecognizerId> = recipients.to_vec();
        for point in &snapshot.points {
            if let Some(info) = touches.iter().find(|info| info.id == point.id) {
                for party in info.parties() {
                    if !everyone.contains(&party) {
                        everyone.push(party);
                    }
                }
            }
        }

        let mut deliveries = Vec::new();
        for recipient in everyone {
            let hits_area = recipients.contains(&recipient);
            let direct = snapshot.filtered(|point| {
                match touches.iter().find(|info| info.id == point.id) {
                    Some(info) => info.owner == Some(recipient),
                    None => hits_area && point.state == TouchPointState::Pressed,
                }
            });
            let unowned = snapshot.filtered(|point| {
                touches
                    .iter()
                    .find(|info| info.id == point.id)
                    .is_some_and(|info| info.follows_unowned(recipient))
            });

            if !direct.is_empty() {
                deliveries.push(Delivery {
                    recipient,
                    message: SwipeMessage::Sample(direct),
                });
            }
            if !unowned.is_empty() {
                deliveries.push(Delivery {
                    recipient,
                    message: SwipeMessage::UnownedSample(unowned),
                });
            }
        }

        for point in &snapshot.points {
            if point.state == TouchPointState::Released {
                touches.retain(|info| info.id != point.id);
            }
        }

        deliveries
    }

    fn with_touch<R>(&self, touch_id: TouchId, f: impl FnOnce(&mut TouchInfo) -> R) -> R {
        let mut touches = self.touches.borrow_mut();
        let index = match touches.iter().position(|info| info.id == touch_id) {
            Some(index) => index,
            None => {
                touches.push(TouchInfo::new(touch_id));
                touches.len() - 1
            }
        };
        f(&mut touches[index])
    }

    fn arbitrate(&self, info: &mut TouchInfo) {
        if info.owner.is_some() {
            return;
        }
        let Some(first) = info.candidates.first().copied() else {
            return;
        };
        if !first.requested {
            return;
        }

        log::debug!(
            "touch {}: ownership granted to {:?}",
            info.id,
            first.recognizer
        );
        info.owner = Some(first.recognizer);
        let mut pending = self.pending.borrow_mut();
        pending.push_back(Delivery {
            recipient: first.recognizer,
            message: SwipeMessage::OwnershipGained(info.id),
        });
        for loser in info.candidates.drain(1..) {
            pending.push_back(Delivery {
                recipient: loser.recognizer,
                message: SwipeMessage::OwnershipLost(info.id),
            });
        }
    }
}

impl TouchOwnershipRegistry for TouchRegistry {
    fn add_candidate_owner_for_touch(&self, touch_id: TouchId, recognizer: RecognizerId) {
        self.with_touch(touch_id, |info| {
            if let Some(owner) = info.owner.filter(|owner| *owner != recognizer) {
                log::debug!(
                    "touch {touch_id}: {:?} arrived after {:?} took ownership",
                    recognizer,
                    owner
                );
                self.pending.borrow_mut().push_back(Delivery {
                    recipient: recognizer,
                    message: SwipeMessage::OwnershipLost(touch_id),
                });
                return;
            }
            if !info.is_candidate(recognizer) {
                info.candidates.push(Candidate {
                    recognizer,
                    requested: false,
                });
            }
        });
    }

    fn request_touch_ownership(&self, touch_id: TouchId, recognizer: RecognizerId) {
        self.with_touch(touch_id, |info| {
            if info.owner == Some(recognizer) {
                return;
            }
            match info
                .candidates
                .iter_mut()
                .find(|candidate| candidate.recognizer == recognizer)
            {
                Some(candidate) => candidate.requested = true,
                None if info.owner.is_some() => {
                    self.pending.borrow_mut().push_back(Delivery {
                        recipient: recognizer,
                        message: SwipeMessage::OwnershipLost(touch_id),
                    });
                    return;
                }
                None => info.candidates.push(Candidate {
                    recognizer,
                    requested: true,
                }),
            }
            self.arbitrate(info);
        });
    }

    fn remove_candidate_owner_for_touch(&self, touch_id: TouchId, recognizer: RecognizerId) {
        let mut touches = self.touches.borrow_mut();
        // Released touches are already retired by `route`.
        if let Some(info) = touches.iter_mut().find(|info| info.id == touch_id) {
            info.candidates
                .retain(|candidate| candidate.recognizer != recognizer);
            if info.owner == Some(recognizer) {
                info.owner = None;
            }
            self.arbitrate(info);
        }
    }

    fn add_touch_watcher(&self, touch_id: TouchId, recognizer: RecognizerId) {
        self.with_touch(touch_id, |info| {
            if !info.watchers.contains(&recognizer) {
                info.watchers.push(recognizer);
            }
        });
    }
}

#[cfg(test)]
mod tests;
