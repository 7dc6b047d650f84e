//! Form-and-list controller: owns the record list, the active draft and the
//! in-flight bookkeeping, and drives a [`CinemaStore`].

use std::{collections::BTreeSet, fmt, sync::Arc};

use shared::domain::{CinemaField, CinemaFields, CinemaId, CinemaRecord};
use tokio::{
    runtime::Handle,
    sync::{broadcast, Mutex, OwnedMutexGuard},
};
use tracing::{debug, error, info, warn};

use crate::{
    error::{ControllerError, StoreError},
    store::CinemaStore,
};

const EVENT_CHANNEL_CAPACITY: usize = 64;

/// The form is editing exactly one of these at a time.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Draft {
    New(CinemaFields),
    Edit { id: CinemaId, fields: CinemaFields },
}

impl Default for Draft {
    fn default() -> Self {
        Draft::New(CinemaFields::default())
    }
}

impl Draft {
    pub fn kind(&self) -> DraftKind {
        match self {
            Draft::New(_) => DraftKind::New,
            Draft::Edit { .. } => DraftKind::Edit,
        }
    }

    pub fn fields(&self) -> &CinemaFields {
        match self {
            Draft::New(fields) | Draft::Edit { fields, .. } => fields,
        }
    }

    fn fields_mut(&mut self) -> &mut CinemaFields {
        match self {
            Draft::New(fields) | Draft::Edit { fields, .. } => fields,
        }
    }

    pub fn editing_id(&self) -> Option<&CinemaId> {
        match self {
            Draft::New(_) => None,
            Draft::Edit { id, .. } => Some(id),
        }
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum DraftKind {
    New,
    Edit,
}

impl fmt::Display for DraftKind {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            DraftKind::New => f.write_str("new"),
            DraftKind::Edit => f.write_str("edit"),
        }
    }
}

/// A call against the store. Mutations are also the keys of the in-flight set.
#[derive(Debug, Clone, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub enum StoreOp {
    List,
    Create,
    Update(CinemaId),
    Delete(CinemaId),
}

impl fmt::Display for StoreOp {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            StoreOp::List => f.write_str("list"),
            StoreOp::Create => f.write_str("create"),
            StoreOp::Update(id) => write!(f, "update {id}"),
            StoreOp::Delete(id) => write!(f, "delete {id}"),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum RefreshOutcome {
    Applied { count: usize },
    /// A newer refresh was issued while this one was in flight.
    Superseded,
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub struct MutationOutcome {
    pub op: StoreOp,
    /// False when the follow-up refresh failed or was superseded.
    pub refreshed: bool,
}

#[derive(Debug, Clone, PartialEq, Eq, Default)]
pub struct ControllerSnapshot {
    pub records: Vec<CinemaRecord>,
    pub draft: Draft,
    pub draft_revision: u64,
    pub is_loading: bool,
    pub pending: Vec<StoreOp>,
}

impl ControllerSnapshot {
    pub fn is_pending(&self, op: &StoreOp) -> bool {
        self.pending.contains(op)
    }

    pub fn record(&self, id: &CinemaId) -> Option<&CinemaRecord> {
        self.records.iter().find(|record| &record.id == id)
    }

    /// Whether submitting the current draft would be rejected as a duplicate.
    pub fn submit_in_flight(&self) -> bool {
        match &self.draft {
            Draft::New(_) => self.is_pending(&StoreOp::Create),
            Draft::Edit { id, .. } => self.is_pending(&StoreOp::Update(id.clone())),
        }
    }
}

#[derive(Debug, Clone)]
pub enum ControllerEvent {
    StateChanged(ControllerSnapshot),
    RequestFailed { op: StoreOp, message: String },
}

#[derive(Debug, Default)]
struct ControllerState {
    records: Vec<CinemaRecord>,
    draft: Draft,
    shelved_new: Option<CinemaFields>,
    draft_revision: u64,
    refresh_generation: u64,
    is_loading: bool,
    pending: BTreeSet<StoreOp>,
}

impl ControllerState {
    fn snapshot(&self) -> ControllerSnapshot {
        ControllerSnapshot {
            records: self.records.clone(),
            draft: self.draft.clone(),
            draft_revision: self.draft_revision,
            is_loading: self.is_loading,
            pending: self.pending.iter().cloned().collect(),
        }
    }

    fn replace_draft(&mut self, draft: Draft) {
        self.draft = draft;
        self.draft_revision = self.draft_revision.wrapping_add(1);
    }

    fn close_edit(&mut self) {
        let resumed = self.shelved_new.take().unwrap_or_default();
        self.replace_draft(Draft::New(resumed));
    }
}

fn publish_state(events: &broadcast::Sender<ControllerEvent>, state: &ControllerState) {
    let _ = events.send(ControllerEvent::StateChanged(state.snapshot()));
}

/// Holds one entry of the in-flight set. The entry is removed by [`PendingGuard::finish`],
/// or on drop if the request future is cancelled before reaching it.
#[derive(Debug)]
struct PendingGuard {
    state: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<ControllerEvent>,
    op: Option<StoreOp>,
}

impl PendingGuard {
    async fn finish(mut self) -> OwnedMutexGuard<ControllerState> {
        let mut state = Arc::clone(&self.state).lock_owned().await;
        if let Some(op) = self.op.take() {
            state.pending.remove(&op);
        }
        state
    }
}

impl Drop for PendingGuard {
    fn drop(&mut self) {
        let Some(op) = self.op.take() else {
            return;
        };
        warn!(%op, "cinema request abandoned before completion");
        if let Ok(mut state) = self.state.try_lock() {
            state.pending.remove(&op);
            publish_state(&self.events, &state);
            return;
        }
        let Ok(handle) = Handle::try_current() else {
            error!(%op, "no runtime left to clear in-flight request");
            return;
        };
        let state = Arc::clone(&self.state);
        let events = self.events.clone();
        handle.spawn(async move {
            let mut state = state.lock().await;
            state.pending.remove(&op);
            publish_state(&events, &state);
        });
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
enum SubmitTarget {
    Create,
    Update(CinemaId),
}

impl SubmitTarget {
    fn op(&self) -> StoreOp {
        match self {
            SubmitTarget::Create => StoreOp::Create,
            SubmitTarget::Update(id) => StoreOp::Update(id.clone()),
        }
    }
}

/// A validated copy of the draft that already owns its in-flight slot.
///
/// Later edits to the form do not change what [`CinemaController::send`] writes.
/// Dropping it without sending releases the slot.
#[derive(Debug)]
pub struct PreparedSubmit {
    target: SubmitTarget,
    fields: CinemaFields,
    guard: PendingGuard,
}

impl PreparedSubmit {
    pub fn op(&self) -> StoreOp {
        self.target.op()
    }

    pub fn fields(&self) -> &CinemaFields {
        &self.fields
    }
}

pub struct CinemaController {
    store: Arc<dyn CinemaStore>,
    inner: Arc<Mutex<ControllerState>>,
    events: broadcast::Sender<ControllerEvent>,
}

impl CinemaController {
    pub fn new(store: Arc<dyn CinemaStore>) -> Self {
        let (events, _) = broadcast::channel(EVENT_CHANNEL_CAPACITY);
        Self {
            store,
            inner: Arc::new(Mutex::new(ControllerState::default())),
            events,
        }
    }

    pub fn subscribe(&self) -> broadcast::Receiver<ControllerEvent> {
        self.events.subscribe()
    }

    pub async fn snapshot(&self) -> ControllerSnapshot {
        self.inner.lock().await.snapshot()
    }

    fn publish(&self, state: &ControllerState) {
        publish_state(&self.events, state);
    }

    fn report_failure(&self, op: StoreOp, source: StoreError) -> ControllerError {
        error!(%op, error = %source, "cinema store request failed");
        let _ = self.events.send(ControllerEvent::RequestFailed {
            op: op.clone(),
            message: source.to_string(),
        });
        ControllerError::Request { op, source }
    }

    fn begin(
        &self,
        state: &mut ControllerState,
        op: StoreOp,
    ) -> Result<PendingGuard, ControllerError> {
        if !state.pending.insert(op.clone()) {
            return Err(ControllerError::InFlight(op));
        }
        Ok(PendingGuard {
            state: Arc::clone(&self.inner),
            events: self.events.clone(),
            op: Some(op),
        })
    }

    /// Replaces the list with the store's current contents.
    pub async fn refresh(&self) -> Result<RefreshOutcome, ControllerError> {
        let generation = {
            let mut state = self.inner.lock().await;
            state.refresh_generation += 1;
            state.is_loading = true;
            self.publish(&state);
            state.refresh_generation
        };

        let result = self.store.list().await;

        let mut state = self.inner.lock().await;
        if generation != state.refresh_generation {
            debug!(
                generation,
                latest = state.refresh_generation,
                failed = result.is_err(),
                "discarding superseded refresh result"
            );
            return Ok(RefreshOutcome::Superseded);
        }

        state.is_loading = false;
        match result {
            Ok(records) => {
                let count = records.len();
                state.records = records;
                self.publish(&state);
                info!(count, "cinema records refreshed");
                Ok(RefreshOutcome::Applied { count })
            }
            Err(source) => {
                self.publish(&state);
                drop(state);
                Err(self.report_failure(StoreOp::List, source))
            }
        }
    }

    /// Writes into whichever draft is active. No validation happens here.
    pub async fn set_field(&self, field: CinemaField, value: impl Into<String>) {
        let mut state = self.inner.lock().await;
        state.draft.fields_mut().set(field, value);
        self.publish(&state);
    }

    pub async fn set_field_named(
        &self,
        name: &str,
        value: impl Into<String>,
    ) -> Result<(), ControllerError> {
        let field = name.parse::<CinemaField>()?;
        self.set_field(field, value).await;
        Ok(())
    }

    /// Opens an edit draft holding a copy of `record`.
    pub async fn begin_edit(&self, record: &CinemaRecord) {
        let mut state = self.inner.lock().await;
        let shelved = match &state.draft {
            Draft::New(fields) if !fields.is_blank() => Some(fields.clone()),
            _ => None,
        };
        if shelved.is_some() {
            state.shelved_new = shelved;
        }
        state.replace_draft(Draft::Edit {
            id: record.id.clone(),
            fields: record.fields(),
        });
        debug!(id = %record.id, "editing cinema record");
        self.publish(&state);
    }

    /// Returns false when no edit was open.
    pub async fn cancel_edit(&self) -> bool {
        let mut state = self.inner.lock().await;
        if state.draft.kind() != DraftKind::Edit {
            return false;
        }
        state.close_edit();
        self.publish(&state);
        true
    }

    /// Submits whichever draft is active.
    pub async fn submit(&self) -> Result<MutationOutcome, ControllerError> {
        let prepared = self.prepare(None).await?;
        self.send(prepared).await
    }

    pub async fn submit_create(&self) -> Result<MutationOutcome, ControllerError> {
        let prepared = self.prepare(Some(DraftKind::New)).await?;
        self.send(prepared).await
    }

    pub async fn submit_edit(&self) -> Result<MutationOutcome, ControllerError> {
        let prepared = self.prepare(Some(DraftKind::Edit)).await?;
        self.send(prepared).await
    }

    /// First half of [`submit`](Self::submit): captures and validates the active
    /// draft and marks it in flight, all under one lock.
    pub async fn prepare_submit(&self) -> Result<PreparedSubmit, ControllerError> {
        self.prepare(None).await
    }

    async fn prepare(
        &self,
        expected: Option<DraftKind>,
    ) -> Result<PreparedSubmit, ControllerError> {
        let mut state = self.inner.lock().await;
        let actual = state.draft.kind();
        if let Some(expected) = expected.filter(|expected| *expected != actual) {
            return Err(ControllerError::DraftMismatch { expected, actual });
        }

        let (target, fields) = match &state.draft {
            Draft::New(fields) => (SubmitTarget::Create, fields.clone()),
            Draft::Edit { id, fields } => (SubmitTarget::Update(id.clone()), fields.clone()),
        };
        if let Err(err) = fields.validate() {
            match &target {
                SubmitTarget::Create => {
                    warn!(missing = ?err.missing, "rejected new cinema record")
                }
                SubmitTarget::Update(id) => {
                    warn!(%id, missing = ?err.missing, "rejected cinema record edit")
                }
            }
            return Err(err.into());
        }

        let guard = self.begin(&mut state, target.op())?;
        self.publish(&state);
        Ok(PreparedSubmit {
            target,
            fields,
            guard,
        })
    }

    /// Second half of [`submit`](Self::submit). `prepared` must come from this controller.
    pub async fn send(
        &self,
        prepared: PreparedSubmit,
    ) -> Result<MutationOutcome, ControllerError> {
        let PreparedSubmit {
            target,
            fields,
            guard,
        } = prepared;
        match target {
            SubmitTarget::Create => self.send_create(fields, guard).await,
            SubmitTarget::Update(id) => self.send_update(id, fields, guard).await,
        }
    }

    async fn send_create(
        &self,
        fields: CinemaFields,
        guard: PendingGuard,
    ) -> Result<MutationOutcome, ControllerError> {
        let result = self.store.create(&fields).await;

        {
            let mut state = guard.finish().await;
            if let Err(source) = result {
                self.publish(&state);
                drop(state);
                return Err(self.report_failure(StoreOp::Create, source));
            }

            // Text typed after the submit started is kept.
            let submitted_is_active =
                matches!(&state.draft, Draft::New(current) if *current == fields);
            if submitted_is_active {
                state.replace_draft(Draft::New(CinemaFields::default()));
            } else if state.shelved_new.as_ref() == Some(&fields) {
                state.shelved_new = None;
            }
            info!(movie = %fields.movie, "cinema record created");
            self.publish(&state);
        }

        Ok(self.finish_mutation(StoreOp::Create).await)
    }

    async fn send_update(
        &self,
        id: CinemaId,
        fields: CinemaFields,
        guard: PendingGuard,
    ) -> Result<MutationOutcome, ControllerError> {
        let op = StoreOp::Update(id.clone());
        let record = CinemaRecord::from_parts(id.clone(), fields.clone());
        let result = self.store.update(&id, &record).await;

        {
            let mut state = guard.finish().await;
            if let Err(source) = result {
                self.publish(&state);
                drop(state);
                return Err(self.report_failure(op, source));
            }

            let unchanged = matches!(
                &state.draft,
                Draft::Edit { id: open_id, fields: open_fields }
                    if *open_id == id && *open_fields == fields
            );
            if unchanged {
                state.close_edit();
            }
            info!(%id, "cinema record updated");
            self.publish(&state);
        }

        Ok(self.finish_mutation(op).await)
    }

    /// Deletes without confirmation.
    pub async fn delete_record(&self, id: &CinemaId) -> Result<MutationOutcome, ControllerError> {
        let op = StoreOp::Delete(id.clone());
        let guard = {
            let mut state = self.inner.lock().await;
            let guard = self.begin(&mut state, op.clone())?;
            self.publish(&state);
            guard
        };

        let result = self.store.delete(id).await;

        {
            let state = guard.finish().await;
            self.publish(&state);
        }
        if let Err(source) = result {
            return Err(self.report_failure(op, source));
        }
        info!(%id, "cinema record deleted");

        Ok(self.finish_mutation(op).await)
    }

    async fn finish_mutation(&self, op: StoreOp) -> MutationOutcome {
        let refreshed = matches!(self.refresh().await, Ok(RefreshOutcome::Applied { .. }));
        if !refreshed {
            warn!(%op, "list not refreshed after successful mutation");
        }
        MutationOutcome { op, refreshed }
    }
}

#[cfg(test)]
#[path = "tests/controller_tests.rs"]
mod tests;
