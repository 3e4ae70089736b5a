//! Structured progress reporting for the move search.
//!
//! The search never prints. It reports each phase to a [`SearchObserver`]; the default
//! [`LogObserver`] forwards events to the `log` facade at debug level, so nothing is
//! emitted unless the embedding program installs a logger.
use std::ops::Range;
use std::time::Duration;

use log::debug;

use crate::engine::{Cell, Player};

/// Counters collected by one search invocation.
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct SearchStats {
    /// Positions expanded (children generated).
    pub nodes: u64,
    /// Lookups answered from the memo table.
    pub memo_hits: u64,
    /// Entries in the memo table when the search finished.
    pub memo_entries: usize,
    /// Whether the wall-clock budget ran out.
    pub deadline_hit: bool,
    pub elapsed: Duration,
}

/// One step of a move computation.
#[derive(Clone, Debug, PartialEq)]
pub enum SearchEvent {
    /// The board was split into independent column regions.
    Divide {
        player: Player,
        regions: Vec<Range<usize>>,
    },
    /// The best move inside one region was computed.
    Conquer {
        region: usize,
        columns: Range<usize>,
        candidates: usize,
        best: Option<(Cell, f64)>,
    },
    /// The bounded search scored its root candidates.
    Bounded {
        player: Player,
        candidates: usize,
        max_depth: u32,
    },
    /// The time budget expired; remaining nodes fall back to static evaluation.
    DeadlineExpired { nodes: u64 },
    /// Region or candidate results were merged into one move.
    Combine { chosen: Option<(Cell, f64)> },
    /// The search is done.
    Finished { stats: SearchStats },
}

impl SearchEvent {
    /// Short phase name, suitable as a log prefix.
    pub fn phase(&self) -> &'static str {
        match self {
            SearchEvent::Divide { .. } => "divide",
            SearchEvent::Conquer { .. } => "conquer",
            SearchEvent::Bounded { .. } => "bounded",
            SearchEvent::DeadlineExpired { .. } => "deadline",
            SearchEvent::Combine { .. } => "combine",
            SearchEvent::Finished { .. } => "finished",
        }
    }
}

/// Receives search progress. Implemented for closures taking `&SearchEvent`.
pub trait SearchObserver {
    fn on_event(&mut self, event: &SearchEvent);
}

impl<F: FnMut(&SearchEvent)> SearchObserver for F {
    fn on_event(&mut self, event: &SearchEvent) {
        self(event)
    }
}

/// Discards every event.
#[derive(Clone, Copy, Debug, Default)]
pub struct NullObserver;

impl SearchObserver for NullObserver {
    fn on_event(&mut self, _event: &SearchEvent) {}
}

/// Forwards events to `log::debug!`.
#[derive(Clone, Copy, Debug, Default)]
pub struct LogObserver;

impl SearchObserver for LogObserver {
    fn on_event(&mut self, event: &SearchEvent) {
        match event {
            SearchEvent::Divide { player, regions } => {
                debug!("[{}] {} to move, regions {:?}", event.phase(), player, regions)
            }
            SearchEvent::Conquer {
                region,
                columns,
                candidates,
                best,
            } => debug!(
                "[{}] region {} (cols {:?}): {} candidates, best {:?}",
                event.phase(),
                region,
                columns,
                candidates,
                best
            ),
            SearchEvent::Bounded {
                player,
                candidates,
                max_depth,
            } => debug!(
                "[{}] {} to move, {} root candidates, depth {}",
                event.phase(),
                player,
                candidates,
                max_depth
            ),
            SearchEvent::DeadlineExpired { nodes } => {
                debug!("[{}] budget exhausted after {} nodes", event.phase(), nodes)
            }
            SearchEvent::Combine { chosen } => {
                debug!("[{}] selected {:?}", event.phase(), chosen)
            }
            SearchEvent::Finished { stats } => debug!(
                "[{}] {} nodes, {} memo hits, {} entries, {:?}",
                event.phase(),
                stats.nodes,
                stats.memo_hits,
                stats.memo_entries,
                stats.elapsed
            ),
        }
    }
}

/// Collects every event, mostly useful in tests.
#[derive(Clone, Debug, Default)]
pub struct Recorder {
    pub events: Vec<SearchEvent>,
}

impl Recorder {
    pub fn phases(&self) -> Vec<&'static str> {
        self.events.iter().map(SearchEvent::phase).collect()
    }
}

impl SearchObserver for Recorder {
    fn on_event(&mut self, event: &SearchEvent) {
        self.events.push(event.clone());
    }
}
