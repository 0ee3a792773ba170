use crate::StoreError;
use parking_lot::RwLock;
use satchel_primitives::{RawTransactionRequest, UserOperation};
use tracing::trace;

/// Aggregate state of the session's single pending request.
///
/// Populated on an inbound request, enriched with the derived unsigned
/// operation (and optionally a user-edited copy of the request list), and
/// cleared atomically when the request resolves, is rejected, or is
/// superseded by a newer request.
#[derive(Clone, Debug, Default, PartialEq, Eq)]
pub struct PendingRequestState {
    /// Origin the pending request came from; `None` marks an empty slot
    pub origin: Option<String>,
    /// Single raw request, the input of the unsigned operation
    pub request: Option<RawTransactionRequest>,
    /// Batched raw requests shown to the confirmation surface
    pub requests: Option<Vec<RawTransactionRequest>>,
    /// User-edited copy of the request list, kept for audit next to (never
    /// instead of) the original
    pub modified_requests: Option<Vec<RawTransactionRequest>>,
    /// Unsigned operation derived from the request
    pub unsigned_user_operation: Option<UserOperation>,
}

impl PendingRequestState {
    pub fn is_empty(&self) -> bool {
        self.origin.is_none()
    }
}

#[derive(Debug, Default)]
struct Slot {
    state: PendingRequestState,
    // identifies the pending request across the async sign/submit boundary;
    // bumped whenever the slot is replaced or cleared, not when derived
    // artifacts are attached
    generation: u64,
}

/// Single-slot storage for the in-flight request.
///
/// All mutation goes through one write lock, so no partial state is ever
/// observable; reads hand out cloned snapshots. A new inbound request
/// unconditionally replaces whatever the slot holds (last-writer-wins, no
/// queue, no error on overwrite).
#[derive(Debug, Default)]
pub struct RequestStore {
    slot: RwLock<Slot>,
}

impl RequestStore {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replaces the slot with a single inbound request.
    pub fn set_request(&self, origin: impl Into<String>, request: RawTransactionRequest) {
        let mut slot = self.slot.write();
        slot.state = PendingRequestState {
            origin: Some(origin.into()),
            request: Some(request),
            ..PendingRequestState::default()
        };
        slot.generation += 1;
        trace!("pending request replaced, generation {}", slot.generation);
    }

    /// Replaces the slot with a batch of inbound requests from one origin.
    pub fn set_requests(&self, origin: impl Into<String>, requests: Vec<RawTransactionRequest>) {
        let mut slot = self.slot.write();
        slot.state = PendingRequestState {
            origin: Some(origin.into()),
            requests: Some(requests),
            ..PendingRequestState::default()
        };
        slot.generation += 1;
        trace!("pending request batch replaced, generation {}", slot.generation);
    }

    /// Records the user-edited version of the request list next to the
    /// original.
    pub fn set_modified_requests(
        &self,
        requests: Vec<RawTransactionRequest>,
    ) -> Result<(), StoreError> {
        let mut slot = self.slot.write();
        if slot.state.is_empty() {
            return Err(StoreError::NoActiveRequest);
        }
        slot.state.modified_requests = Some(requests);
        Ok(())
    }

    /// Attaches or replaces the unsigned operation derived from the current
    /// request.
    pub fn set_unsigned_user_operation(&self, uo: UserOperation) -> Result<(), StoreError> {
        let mut slot = self.slot.write();
        if slot.state.is_empty() {
            return Err(StoreError::NoActiveRequest);
        }
        slot.state.unsigned_user_operation = Some(uo);
        Ok(())
    }

    /// Resets the slot. Idempotent.
    pub fn clear(&self) {
        let mut slot = self.slot.write();
        slot.state = PendingRequestState::default();
        slot.generation += 1;
    }

    /// Clears the slot only if it still holds the request identified by
    /// `generation`; returns whether this call did the clearing.
    ///
    /// The coordinator snapshots the generation before signing and uses this
    /// compare-and-clear afterwards, so a request rejected or superseded
    /// while a send was in flight is never resolved a second time.
    pub fn clear_if_current(&self, generation: u64) -> bool {
        let mut slot = self.slot.write();
        if slot.generation != generation {
            return false;
        }
        slot.state = PendingRequestState::default();
        slot.generation += 1;
        true
    }

    /// Atomic snapshot of the slot and the generation it belongs to.
    pub fn snapshot(&self) -> (PendingRequestState, u64) {
        let slot = self.slot.read();
        (slot.state.clone(), slot.generation)
    }

    pub fn is_empty(&self) -> bool {
        self.slot.read().state.is_empty()
    }

    pub fn origin(&self) -> Option<String> {
        self.slot.read().state.origin.clone()
    }

    pub fn request(&self) -> Option<RawTransactionRequest> {
        self.slot.read().state.request.clone()
    }

    pub fn requests(&self) -> Option<Vec<RawTransactionRequest>> {
        self.slot.read().state.requests.clone()
    }

    pub fn modified_requests(&self) -> Option<Vec<RawTransactionRequest>> {
        self.slot.read().state.modified_requests.clone()
    }

    pub fn unsigned_user_operation(&self) -> Option<UserOperation> {
        self.slot.read().state.unsigned_user_operation.clone()
    }
}
