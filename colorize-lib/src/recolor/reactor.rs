use crate::color::normalize::{ColorNormalizer, CssColorNormalizer};
use crate::dom::dom_tree::{self, Document, MutationRecord, NodeRef, ObserveOptions};
use crate::recolor::engine::OverrideEngine;
use std::rc::Rc;
use std::time::{Duration, Instant};

/// Attributes whose changes can alter an element's computed colors.
const WATCHED_ATTRIBUTES: [&str; 2] = ["style", "class"];

/// How the reactor keeps up with a changing document after the first sweep.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Strategy {
    /// React to child-list and `style`/`class` mutations under the body.
    Observe,
    /// Re-run the full sweep every `period`.
    Poll { period: Duration },
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum State {
    Idle,
    Observing,
    Polling { next_due: Instant },
}

/// Drives the override engine over a document: once at start, then either
/// incrementally from mutation records or on a timer.
///
/// Time is passed in by the caller so the same code serves a real event loop
/// and deterministic tests.
#[derive(Debug)]
pub struct Reactor<N = CssColorNormalizer> {
    engine: OverrideEngine<N>,
    strategy: Strategy,
    state: State,
}

impl<N: ColorNormalizer> Reactor<N> {
    pub fn new(engine: OverrideEngine<N>, strategy: Strategy) -> Self {
        Reactor {
            engine,
            strategy,
            state: State::Idle,
        }
    }

    pub fn engine(&self) -> &OverrideEngine<N> {
        &self.engine
    }

    pub fn strategy(&self) -> Strategy {
        self.strategy
    }

    pub fn is_active(&self) -> bool {
        self.state != State::Idle
    }

    /// Override every element in the document. Returns the number of writes.
    pub fn full_sweep(&self, document: &Document) -> usize {
        let elements = document.elements();
        let writes: usize = elements
            .iter()
            .map(|element| self.engine.override_element(document, element))
            .sum();
        log::info!("full sweep: {} elements, {} overrides", elements.len(), writes);
        writes
    }

    /// Override `root` and every element below it.
    pub fn sweep_subtree(&self, document: &Document, root: &NodeRef) -> usize {
        let mut writes = self.engine.override_element(document, root);
        for node in dom_tree::descendants(root) {
            if node.borrow().is_element() {
                writes += self.engine.override_element(document, &node);
            }
        }
        writes
    }

    /// Run the load-time full sweep, then arm the configured strategy.
    /// Restarting an active reactor first stops it.
    pub fn start_reacting(&mut self, document: &Document, now: Instant) -> usize {
        if self.is_active() {
            self.stop(document);
        }
        let writes = self.full_sweep(document);

        self.state = match self.strategy {
            Strategy::Observe => {
                let target = document.body().unwrap_or_else(|| Rc::clone(&document.root));
                document.observe(
                    &target,
                    ObserveOptions {
                        child_list: true,
                        attributes: true,
                        subtree: true,
                        attribute_filter: WATCHED_ATTRIBUTES
                            .iter()
                            .map(|a| a.to_string())
                            .collect(),
                    },
                );
                State::Observing
            }
            Strategy::Poll { period } => State::Polling {
                next_due: now + period,
            },
        };
        writes
    }

    /// Give the reactor a turn: deliver the pending mutation batch, or fire
    /// the timer if it is due. Returns the number of writes.
    pub fn pump(&mut self, document: &Document, now: Instant) -> usize {
        match self.state {
            State::Idle => 0,
            State::Observing => {
                let records = document.take_records();
                if records.is_empty() {
                    return 0;
                }
                let writes = self.handle_records(document, records);
                // Our own overrides were just recorded; every element they
                // touched was swept in this batch already.
                let own = document.take_records();
                log::trace!("dropped {} self-inflicted records", own.len());
                writes
            }
            State::Polling { next_due } => {
                if now < next_due {
                    return 0;
                }
                let writes = self.full_sweep(document);
                if let Strategy::Poll { period } = self.strategy {
                    self.state = State::Polling {
                        next_due: now + period,
                    };
                }
                writes
            }
        }
    }

    /// Disarm whichever strategy is active. Overrides already written stay.
    pub fn stop(&mut self, document: &Document) {
        if self.state == State::Observing {
            document.disconnect();
        }
        self.state = State::Idle;
    }

    fn handle_records(&self, document: &Document, records: Vec<MutationRecord>) -> usize {
        let record_count = records.len();
        let mut roots: Vec<NodeRef> = Vec::new();
        for record in records {
            match record {
                MutationRecord::ChildList { added, .. } => {
                    roots.extend(added.into_iter().filter(|node| node.borrow().is_element()));
                }
                // A class change can restyle descendants through selectors
                // such as `.dark .child`, so the whole subtree is re-checked.
                MutationRecord::Attributes { target, .. } => roots.push(target),
            }
        }

        let roots = collapse_roots(roots);
        let writes: usize = roots
            .iter()
            .map(|root| self.sweep_subtree(document, root))
            .sum();
        log::debug!(
            "mutation batch: {} records, {} subtrees, {} overrides",
            record_count,
            roots.len(),
            writes
        );
        writes
    }
}

/// Drop repeated nodes and nodes already inside another root's subtree.
fn collapse_roots(roots: Vec<NodeRef>) -> Vec<NodeRef> {
    let mut unique: Vec<NodeRef> = Vec::new();
    for root in roots {
        if !unique.iter().any(|seen| Rc::ptr_eq(seen, &root)) {
            unique.push(root);
        }
    }
    unique
        .iter()
        .filter(|&root| {
            !unique.iter().any(|other| {
                !Rc::ptr_eq(other, root) && dom_tree::is_inclusive_descendant(root, other)
            })
        })
        .cloned()
        .collect()
}
