//! [`Dayflow`]: the engine owning the record store, the sync mirror and the
//! clock. Every mutation is a method on it.
//!
//! Operations are split across modules by concern (directory, attendance,
//! leave). Each mutation commits locally first and then dispatches its
//! mirror writes without awaiting them.

use std::sync::Arc;

use crate::{
  Result,
  clock::Clock,
  mirror::{Mirror, MirrorCounts, MirrorOutcome, SyncMirror},
  records::RecordStore,
  store::SnapshotCache,
};

pub struct Dayflow<C, M> {
  pub(crate) records: RecordStore<C>,
  pub(crate) mirror:  SyncMirror<M>,
  pub(crate) clock:   Arc<dyn Clock>,
}

impl<C, M> Dayflow<C, M>
where
  C: SnapshotCache,
  M: Mirror,
{
  pub fn new(
    records: RecordStore<C>,
    mirror: SyncMirror<M>,
    clock: Arc<dyn Clock>,
  ) -> Self {
    Self { records, mirror, clock }
  }

  pub fn records(&self) -> &RecordStore<C> { &self.records }

  pub fn mirror_counts(&self) -> MirrorCounts { self.mirror.counts() }

  pub fn clock(&self) -> &dyn Clock { self.clock.as_ref() }

  /// Persist the records and wait for in-flight mirror writes.
  pub async fn shutdown(&self) -> Result<Vec<MirrorOutcome>> {
    self.records.flush().await?;
    let outcomes = self.mirror.drain().await;
    tracing::info!(mirror_writes = outcomes.len(), "engine shut down");
    Ok(outcomes)
  }
}
