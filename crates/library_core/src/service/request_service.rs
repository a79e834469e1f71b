//! Patron request tracker.
//!
//! # Responsibility
//! - Append patron requests to the request log.
//! - List requests for librarian review or for one patron.
//! - Apply librarian resolution to pending requests.
//!
//! # Invariants
//! - Requests are never removed.
//! - Resolution only moves `Pending -> Approved | Rejected`.

use crate::config::{Clock, SystemClock};
use crate::model::request::{BookRequest, RequestId, RequestResolution};
use crate::repo::collection_store::{CollectionStore, Mutation};
use crate::service::{RequestTransition, ServiceResult, TransitionOutcome};
use log::info;

/// Request log service.
pub struct RequestService<S: CollectionStore, C: Clock = SystemClock> {
    store: S,
    clock: C,
}

impl<S: CollectionStore> RequestService<S> {
    pub fn new(store: S) -> Self {
        Self::with_clock(store, SystemClock)
    }
}

impl<S: CollectionStore, C: Clock> RequestService<S, C> {
    pub fn with_clock(store: S, clock: C) -> Self {
        Self { store, clock }
    }

    /// Records a pending request and returns the created record.
    pub fn request_book(
        &self,
        title: &str,
        author: &str,
        patron: &str,
    ) -> ServiceResult<BookRequest> {
        let request = BookRequest::new(
            title.trim(),
            author.trim(),
            patron.trim(),
            self.clock.now_ms(),
        );
        request.validate()?;

        let created = request.clone();
        self.store.update_requests(move |requests| {
            requests.push(request);
            Mutation::Commit(())
        })?;

        info!(
            "event=request_create module=requests status=ok request_id={}",
            created.id
        );
        Ok(created)
    }

    /// All requests in storage order.
    pub fn list_requests(&self) -> ServiceResult<Vec<BookRequest>> {
        Ok(self.store.get_requests()?)
    }

    /// Requests filed by one patron, in storage order.
    pub fn requests_for(&self, patron: &str) -> ServiceResult<Vec<BookRequest>> {
        let patron = patron.trim();
        Ok(self
            .store
            .get_requests()?
            .into_iter()
            .filter(|request| request.requested_by == patron)
            .collect())
    }

    /// Approves or rejects a pending request.
    pub fn resolve_request(
        &self,
        id: RequestId,
        resolution: RequestResolution,
    ) -> ServiceResult<RequestTransition> {
        let outcome = self.store.update_requests(|requests| {
            let Some(request) = requests.iter_mut().find(|request| request.id == id) else {
                return Mutation::Discard(TransitionOutcome::NotFound);
            };
            if request.resolve(resolution) {
                Mutation::Commit(TransitionOutcome::Applied(request.clone()))
            } else {
                Mutation::Discard(TransitionOutcome::InvalidState(request.status))
            }
        })?;

        info!(
            "event=request_resolve module=requests status={} request_id={id} resolution={}",
            outcome.label(),
            resolution.target_status()
        );
        Ok(outcome)
    }
}
