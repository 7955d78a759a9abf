//! Call-site cross references between functions.
//!
//! Functions refer to each other by [`FunctionId`], never by pointer;
//! the tracker is a side table keyed by id, with edges kept in the order
//! they were observed.

use crate::module::FunctionId;

/// One directed half of a call edge.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct CrossReference {
    /// True when the edge points toward a higher function index.
    pub direction_down: bool,
    /// True on the callee's half (the edge arrives there).
    pub is_destination: bool,
    /// Byte offset of the call site within the caller's body.
    pub offset: u32,
    pub target: FunctionId,
}

/// Both halves of a call edge: the caller's outgoing reference and the
/// callee's incoming one.
#[derive(Debug, Clone, Copy)]
pub struct TwoWayCrossReference {
    pub caller: FunctionId,
    pub callee: FunctionId,
    pub outgoing: CrossReference,
    pub incoming: CrossReference,
}

/// Side table of recorded call edges.
#[derive(Debug, Default)]
pub struct XrefTracker {
    by_function: Vec<Vec<CrossReference>>,
}

impl XrefTracker {
    /// A tracker with one empty slot per known function.
    pub fn with_function_count(count: usize) -> Self {
        Self {
            by_function: vec![Vec::new(); count],
        }
    }

    /// Record both halves of an edge.
    pub fn record(&mut self, edge: &TwoWayCrossReference) {
        self.ensure_slot(edge.caller);
        self.ensure_slot(edge.callee);
        self.by_function[edge.caller.index()].push(edge.outgoing);
        self.by_function[edge.callee.index()].push(edge.incoming);
    }

    /// All references recorded against one function, in observed order.
    pub fn refs_of(&self, id: FunctionId) -> &[CrossReference] {
        self.by_function
            .get(id.index())
            .map(Vec::as_slice)
            .unwrap_or(&[])
    }

    fn ensure_slot(&mut self, id: FunctionId) {
        if self.by_function.len() <= id.index() {
            self.by_function.resize(id.index() + 1, Vec::new());
        }
    }
}
