//! Sequence arbitration.
//!
//! The arbiter owns the recognizers of the current touch sequence. Their
//! emissions are queued per candidate and delivered only once every candidate
//! the node waits for has failed or been cancelled. Delivering an `Activated`
//! signal cancels every other candidate not declared simultaneous, which is
//! what guarantees a single winner per sequence.

use super::{
    ArbitrationContext, Emission, GestureGraph, GestureOutcome, GesturePayload, NodeDescriptor,
    NodeKey, Recognizer, RecognizerState, RegionHit, Signal, Transition,
};
use crate::config::GestureConfig;
use crate::input::{TouchEvent, TouchPhase, TouchState};
use std::collections::VecDeque;

/// Arbiter-side status of a candidate, separate from its recognizer.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum Status {
    Live,
    Ended,
    Failed,
    Cancelled,
}

#[derive(Debug)]
struct Candidate {
    key: NodeKey,
    descriptor: NodeDescriptor,
    recognizer: Box<dyn Recognizer>,
    queue: VecDeque<Emission>,
    status: Status,
    /// Whether a `Began` outcome reached the router.
    began: bool,
    last_payload: GesturePayload,
}

impl Candidate {
    /// True once this candidate can no longer win or block anyone.
    fn has_given_up(&self) -> bool {
        match self.status {
            Status::Failed | Status::Cancelled => true,
            Status::Ended => false,
            Status::Live => matches!(
                self.recognizer.state(),
                RecognizerState::Failed | RecognizerState::Cancelled
            ),
        }
    }
}

/// Runs one touch sequence at a time against a [`GestureGraph`].
#[derive(Debug, Default)]
pub struct Arbiter {
    config: GestureConfig,
    touches: TouchState,
    /// Candidates in descending priority.
    candidates: Vec<Candidate>,
}

impl Arbiter {
    pub fn new(config: GestureConfig) -> Self {
        Self {
            config,
            touches: TouchState::new(),
            candidates: Vec::new(),
        }
    }

    /// Whether a sequence is running.
    pub fn in_sequence(&self) -> bool {
        !self.candidates.is_empty() || self.touches.pointer_count() > 0
    }

    pub fn pointer_count(&self) -> usize {
        self.touches.pointer_count()
    }

    /// Keys of the current sequence's candidates, in priority order.
    pub fn candidates(&self) -> Vec<NodeKey> {
        self.candidates.iter().map(|c| c.key).collect()
    }

    /// Feed one touch event and return the outcomes it released.
    ///
    /// `hit` describes what lies under the event position; it is consulted
    /// only when the event starts a new sequence.
    pub fn handle_touch(
        &mut self,
        event: &TouchEvent,
        graph: &GestureGraph,
        ctx: &ArbitrationContext,
        hit: &RegionHit,
    ) -> Vec<GestureOutcome> {
        let starts_sequence =
            event.phase == TouchPhase::Down && self.touches.pointer_count() == 0;
        let Some(event) = self.touches.handle_event(event) else {
            return Vec::new();
        };
        if starts_sequence {
            self.start_sequence(graph, ctx, hit);
        }

        let mut outcomes = Vec::new();
        self.disable_candidates(ctx, &mut outcomes);
        for candidate in &mut self.candidates {
            if candidate.status != Status::Live {
                continue;
            }
            let emitted = candidate.recognizer.on_touch(&event, &self.touches);
            candidate.queue.extend(emitted);
            let emitted = candidate.recognizer.on_tick(event.time_ms);
            candidate.queue.extend(emitted);
        }
        self.resolve(&mut outcomes);
        self.finish_if_idle(&mut outcomes);
        outcomes
    }

    /// Advance recognizer timers.
    pub fn tick(&mut self, time_ms: u64, ctx: &ArbitrationContext) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        if self.candidates.is_empty() {
            return outcomes;
        }
        self.touches.time_ms = self.touches.time_ms.max(time_ms);
        self.disable_candidates(ctx, &mut outcomes);
        for candidate in &mut self.candidates {
            if candidate.status == Status::Live {
                let emitted = candidate.recognizer.on_tick(time_ms);
                candidate.queue.extend(emitted);
            }
        }
        self.resolve(&mut outcomes);
        outcomes
    }

    /// Cancel the running sequence and forget every pointer.
    pub fn cancel_all(&mut self) -> Vec<GestureOutcome> {
        let mut outcomes = Vec::new();
        for index in 0..self.candidates.len() {
            self.cancel(index, &mut outcomes);
        }
        if !self.candidates.is_empty() {
            log::debug!("Cancelled gesture sequence");
        }
        self.candidates.clear();
        self.touches.clear();
        outcomes
    }

    /// The highest-priority candidate that can still win.
    pub fn resolve_winner(&self) -> Option<NodeKey> {
        self.candidates
            .iter()
            .find(|c| c.status != Status::Ended && !c.has_given_up())
            .map(|c| c.key)
    }

    fn start_sequence(&mut self, graph: &GestureGraph, ctx: &ArbitrationContext, hit: &RegionHit) {
        self.candidates = graph
            .nodes()
            .filter(|(_, d)| d.enablement.allows(ctx) && d.region.matches(hit))
            .map(|(key, descriptor)| Candidate {
                key: *key,
                descriptor: descriptor.clone(),
                recognizer: descriptor.kind.instantiate(&self.config),
                queue: VecDeque::new(),
                status: Status::Live,
                began: false,
                last_payload: GesturePayload::default(),
            })
            .collect();
        self.candidates
            .sort_by(|a, b| b.descriptor.priority.cmp(&a.descriptor.priority));
        log::debug!(
            "Sequence started with candidates {:?}",
            self.candidates.iter().map(|c| c.key).collect::<Vec<_>>()
        );
    }

    /// Cancel live candidates the context no longer enables.
    fn disable_candidates(&mut self, ctx: &ArbitrationContext, outcomes: &mut Vec<GestureOutcome>) {
        for index in 0..self.candidates.len() {
            let candidate = &self.candidates[index];
            if candidate.status == Status::Live && !candidate.descriptor.enablement.allows(ctx) {
                log::debug!("{:?} disabled mid-sequence", candidate.key);
                self.cancel(index, outcomes);
            }
        }
    }

    fn is_blocked(&self, index: usize) -> bool {
        let waits_for = &self.candidates[index].descriptor.waits_for;
        self.candidates
            .iter()
            .enumerate()
            .any(|(other, c)| other != index && waits_for.contains(&c.key) && !c.has_given_up())
    }

    /// Deliver queued emissions until nothing more can move.
    ///
    /// Candidates whose recognizer already failed go first in every pass, so
    /// their failure is reported before a winner's activation could cancel them.
    fn resolve(&mut self, outcomes: &mut Vec<GestureOutcome>) {
        loop {
            self.settle_silent_failures();
            let (failed, rest): (Vec<usize>, Vec<usize>) = (0..self.candidates.len())
                .partition(|&i| self.candidates[i].recognizer.state() == RecognizerState::Failed);
            let mut progressed = false;
            for index in failed.into_iter().chain(rest) {
                while self.candidates[index].status == Status::Live
                    && !self.is_blocked(index)
                {
                    let Some(emission) = self.candidates[index].queue.pop_front() else {
                        break;
                    };
                    self.deliver(index, emission, outcomes);
                    progressed = true;
                }
            }
            if !progressed {
                break;
            }
        }
    }

    /// A failed recognizer that never delivered `Began` has nothing to report.
    fn settle_silent_failures(&mut self) {
        for candidate in &mut self.candidates {
            if candidate.status == Status::Live
                && !candidate.began
                && candidate.recognizer.state() == RecognizerState::Failed
            {
                log::trace!("{:?} failed before delivering", candidate.key);
                candidate.status = Status::Failed;
                candidate.queue.clear();
            }
        }
    }

    fn deliver(&mut self, index: usize, emission: Emission, outcomes: &mut Vec<GestureOutcome>) {
        let Emission { signal, payload } = emission;
        let key = self.candidates[index].key;
        self.candidates[index].last_payload = payload;
        match signal {
            Signal::Began => {
                self.candidates[index].began = true;
            }
            Signal::Activated => {
                log::debug!("{key:?} activated");
                for other in 0..self.candidates.len() {
                    if other == index {
                        continue;
                    }
                    let other_key = self.candidates[other].key;
                    let simultaneous = self.candidates[index].descriptor.is_simultaneous_with(&other_key)
                        || self.candidates[other].descriptor.is_simultaneous_with(&key);
                    if !simultaneous {
                        self.cancel(other, outcomes);
                    }
                }
            }
            Signal::Updated => {}
            Signal::Ended => {
                self.candidates[index].status = Status::Ended;
            }
            Signal::Failed => {
                let candidate = &mut self.candidates[index];
                candidate.status = Status::Failed;
                candidate.queue.clear();
                log::debug!("{key:?} failed");
                if !candidate.began {
                    return;
                }
            }
        }
        outcomes.push(GestureOutcome {
            key,
            transition: Transition::from(signal),
            payload,
        });
    }

    /// Stop a candidate. It reports `Cancelled` only if it had begun.
    fn cancel(&mut self, index: usize, outcomes: &mut Vec<GestureOutcome>) {
        let candidate = &mut self.candidates[index];
        if candidate.status != Status::Live {
            return;
        }
        candidate.status = Status::Cancelled;
        candidate.queue.clear();
        candidate.recognizer.cancel();
        if candidate.began {
            log::debug!("{:?} cancelled", candidate.key);
            outcomes.push(GestureOutcome {
                key: candidate.key,
                transition: Transition::Cancelled,
                payload: candidate.last_payload,
            });
        }
    }

    /// Close the sequence once every pointer is up.
    fn finish_if_idle(&mut self, outcomes: &mut Vec<GestureOutcome>) {
        if self.touches.pointer_count() > 0 {
            return;
        }
        for index in 0..self.candidates.len() {
            if self.candidates[index].status == Status::Live {
                log::debug!("{:?} still live at sequence end", self.candidates[index].key);
                self.cancel(index, outcomes);
            }
        }
        self.candidates.clear();
    }
}
