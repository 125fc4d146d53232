//! Sequenced native requests
//!
//! Every call to the native engine carries a monotonically increasing
//! [`Ticket`]. An entry remembers the ticket of its latest request, so an
//! outcome for an older ticket is recognised as stale and cannot overwrite
//! newer state.

use std::fmt;

use fence_meta::{FenceCommand, FenceId};

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct Ticket(u64);

impl Ticket {
    pub fn value(&self) -> u64 {
        self.0
    }

    pub(crate) fn from_value(value: u64) -> Self {
        Self(value)
    }
}

impl fmt::Display for Ticket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq)]
pub enum NativeOp {
    /// Add or update the region
    Register(FenceCommand),
    Deregister,
}

impl NativeOp {
    pub fn is_register(&self) -> bool {
        matches!(self, Self::Register(_))
    }
}

/// A native call waiting to be dispatched.
#[derive(Debug, Clone, PartialEq)]
pub struct NativeRequest {
    pub ticket: Ticket,
    pub id: FenceId,
    pub op: NativeOp,
}

/// The result of dispatching a [`NativeRequest`].
#[derive(Debug)]
pub struct NativeOutcome {
    pub ticket: Ticket,
    pub id: FenceId,
    pub op: NativeOp,
    pub result: fence_native::Result<()>,
}

impl NativeOutcome {
    pub fn new(request: NativeRequest, result: fence_native::Result<()>) -> Self {
        Self {
            ticket: request.ticket,
            id: request.id,
            op: request.op,
            result,
        }
    }
}

/// What applying an outcome did to the live collection.
#[derive(Debug)]
pub struct Resolution {
    pub ticket: Ticket,
    pub id: FenceId,
    pub kind: ResolutionKind,
}

#[derive(Debug)]
pub enum ResolutionKind {
    Registered,
    RegistrationFailed(fence_native::Error),
    Removed,
    RemovalFailed(fence_native::Error),
    /// A newer request for the same entry was issued; nothing changed
    Stale,
    /// The entry no longer exists; nothing changed
    Orphaned,
}

impl Resolution {
    pub fn is_failure(&self) -> bool {
        matches!(
            self.kind,
            ResolutionKind::RegistrationFailed(_) | ResolutionKind::RemovalFailed(_)
        )
    }
}
