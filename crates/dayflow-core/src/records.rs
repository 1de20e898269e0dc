//! [`RecordStore`]: the explicitly constructed owner of all employee,
//! attendance and leave records.

use tokio::sync::RwLock;

use crate::{Error, Result, snapshot::Snapshot, store::SnapshotCache};

/// In-memory collections backed by a durable [`SnapshotCache`].
///
/// Mutations go through [`RecordStore::commit`], which applies a closure to
/// a working copy and swaps it in only if the closure succeeds and the full
/// snapshot has been written to the cache. Commits are serialised, so local
/// mutations land in call order and a half-applied mutation is never
/// observable.
pub struct RecordStore<C> {
  cache: C,
  key:   String,
  state: RwLock<Snapshot>,
}

impl<C: SnapshotCache> RecordStore<C> {
  /// Load the snapshot under `key`, or start empty if there is none.
  pub async fn open(cache: C, key: impl Into<String>) -> Result<Self> {
    let key = key.into();
    let snapshot = cache.load(&key).await.map_err(cache_error)?;
    match &snapshot {
      Some(s) => tracing::info!(
        key = %key,
        employees = s.employees.len(),
        attendance = s.attendance.len(),
        leaves = s.leaves.len(),
        "loaded snapshot"
      ),
      None => tracing::info!(key = %key, "no snapshot found; starting empty"),
    }
    Ok(Self {
      cache,
      key,
      state: RwLock::new(snapshot.unwrap_or_default()),
    })
  }

  /// Like [`RecordStore::open`], but an absent snapshot is replaced by
  /// `seed`, which is written to the cache immediately.
  pub async fn open_or_seed(
    cache: C,
    key: impl Into<String>,
    seed: Snapshot,
  ) -> Result<Self> {
    let key = key.into();
    if cache.load(&key).await.map_err(cache_error)?.is_none() {
      tracing::info!(
        key = %key,
        employees = seed.employees.len(),
        "seeding empty store"
      );
      cache.save(&key, &seed).await.map_err(cache_error)?;
    }
    Self::open(cache, key).await
  }

  pub fn cache(&self) -> &C { &self.cache }

  /// Run `f` against a consistent view of the records.
  pub async fn read<T>(&self, f: impl FnOnce(&Snapshot) -> T) -> T {
    f(&*self.state.read().await)
  }

  /// A full copy of the current records.
  pub async fn snapshot(&self) -> Snapshot { self.read(Snapshot::clone).await }

  /// Apply `f` atomically.
  ///
  /// On `Err` nothing changes. On `Ok` the new state is persisted in full
  /// (skipped if `f` left the records unchanged) and then published.
  pub async fn commit<T>(
    &self,
    f: impl FnOnce(&mut Snapshot) -> Result<T>,
  ) -> Result<T> {
    let mut state = self.state.write().await;
    let mut working = state.clone();
    let value = f(&mut working)?;
    if working != *state {
      self
        .cache
        .save(&self.key, &working)
        .await
        .map_err(cache_error)?;
      *state = working;
    }
    Ok(value)
  }

  /// Write the current records to the cache.
  pub async fn flush(&self) -> Result<()> {
    let state = self.state.read().await;
    self.cache.save(&self.key, &state).await.map_err(cache_error)
  }

  /// Flush and release the store.
  pub async fn close(self) -> Result<()> {
    self.flush().await?;
    tracing::info!(key = %self.key, "record store closed");
    Ok(())
  }
}

fn cache_error<E: std::error::Error + Send + Sync + 'static>(e: E) -> Error {
  Error::Cache(Box::new(e))
}
