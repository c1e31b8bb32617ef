//! Sample history: the unbounded session record plus the bounded chart window.

use std::collections::VecDeque;

use crate::sample::Sample;

/// Points kept in the rolling display window (and on the chart).
pub const WINDOW_CAP: usize = 100;

pub fn push_capped<T>(dq: &mut VecDeque<T>, v: T, cap: usize) {
    if dq.len() == cap {
        dq.pop_front();
    }
    dq.push_back(v);
}

#[derive(Debug, Default)]
pub struct StreamBuffer {
    full: Vec<Sample>,
    window: VecDeque<Sample>,
}

impl StreamBuffer {
    pub fn new() -> Self {
        Self {
            full: Vec::new(),
            window: VecDeque::with_capacity(WINDOW_CAP),
        }
    }

    pub fn reset(&mut self) {
        self.full.clear();
        self.window.clear();
    }

    pub fn append(&mut self, sample: Sample) {
        push_capped(&mut self.window, sample.clone(), WINDOW_CAP);
        self.full.push(sample);
    }

    /// Every sample since monitoring started, in arrival order.
    pub fn full_history(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.full.iter()
    }

    pub fn rolling_window(&self) -> impl DoubleEndedIterator<Item = &Sample> + ExactSizeIterator {
        self.window.iter()
    }

    pub fn latest(&self) -> Option<&Sample> {
        self.full.last()
    }

    pub fn len(&self) -> usize {
        self.full.len()
    }

    pub fn is_empty(&self) -> bool {
        self.full.is_empty()
    }
}

// Keeps a load history deque per core with a fixed capacity (per-core sparklines)
pub struct PerCoreHistory {
    pub deques: Vec<VecDeque<u16>>,
    cap: usize,
}

impl PerCoreHistory {
    pub fn new(cap: usize) -> Self {
        Self {
            deques: Vec::new(),
            cap,
        }
    }

    // One deque per core; start over when the core count changes
    pub fn ensure_cores(&mut self, n: usize) {
        if self.deques.len() == n {
            return;
        }
        self.deques = (0..n).map(|_| VecDeque::with_capacity(self.cap)).collect();
    }

    pub fn clear(&mut self) {
        self.deques.clear();
    }

    pub fn push_sample(&mut self, sample: &Sample) {
        self.ensure_cores(sample.cores.len());
        for (i, c) in sample.cores.iter().enumerate() {
            let val = c.load_pct.clamp(0.0, 100.0).round() as u16;
            push_capped(&mut self.deques[i], val, self.cap);
        }
    }
}
