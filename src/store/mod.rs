//! Shared document store: a tree of JSON values addressed by slash-separated
//! paths, with child notifications and guarded batch commits.

use serde_json::{Map, Value};
use tokio::sync::mpsc::UnboundedReceiver;

pub mod memory;
pub mod records;

pub use memory::MemoryStore;

/// Condition checked before a batch is applied.
#[derive(Debug, Clone, PartialEq)]
pub enum Guard {
    /// Value at the path must equal the given one.
    Equals { path: String, value: Value },
    Exists(String),
    Absent(String),
}

/// A single write. Writing `null` deletes.
#[derive(Debug, Clone, PartialEq)]
pub enum Mutation {
    Set { path: String, value: Value },
    /// Set each field under `path`; field names may themselves be paths.
    Update { path: String, fields: Map<String, Value> },
    Remove(String),
}

/// Mutations applied all together, and only if every guard holds.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct Batch {
    pub guards: Vec<Guard>,
    pub mutations: Vec<Mutation>,
}

impl Batch {
    pub fn new() -> Self {
        Self::default()
    }

    pub fn guard_eq(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.guards.push(Guard::Equals {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    pub fn guard_exists(mut self, path: impl Into<String>) -> Self {
        self.guards.push(Guard::Exists(path.into()));
        self
    }

    pub fn guard_absent(mut self, path: impl Into<String>) -> Self {
        self.guards.push(Guard::Absent(path.into()));
        self
    }

    pub fn set(mut self, path: impl Into<String>, value: impl Into<Value>) -> Self {
        self.mutations.push(Mutation::Set {
            path: path.into(),
            value: value.into(),
        });
        self
    }

    pub fn update(mut self, path: impl Into<String>, fields: Map<String, Value>) -> Self {
        self.mutations.push(Mutation::Update {
            path: path.into(),
            fields,
        });
        self
    }

    pub fn remove(mut self, path: impl Into<String>) -> Self {
        self.mutations.push(Mutation::Remove(path.into()));
        self
    }

    /// In-place variants for building batches in loops.
    pub fn push_set(&mut self, path: impl Into<String>, value: impl Into<Value>) {
        self.mutations.push(Mutation::Set {
            path: path.into(),
            value: value.into(),
        });
    }

    pub fn push_remove(&mut self, path: impl Into<String>) {
        self.mutations.push(Mutation::Remove(path.into()));
    }

    pub fn is_empty(&self) -> bool {
        self.mutations.is_empty()
    }
}

/// Change to a direct child of a watched path.
#[derive(Debug, Clone, PartialEq)]
pub enum ChildEvent {
    Added { key: String, value: Value },
    Changed { key: String, value: Value },
    Removed { key: String },
}

#[async_trait::async_trait]
pub trait DocumentStore: Send + Sync {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>>;

    /// Apply `batch` atomically. Returns `false`, with nothing written, when
    /// any guard fails.
    async fn commit(&self, batch: Batch) -> anyhow::Result<bool>;

    /// Children of `collection` whose `field` equals `value`.
    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<(String, Value)>>;

    /// Subscribe to child events under `path`. Existing children are
    /// reported as added first.
    async fn watch(&self, path: &str) -> anyhow::Result<UnboundedReceiver<ChildEvent>>;

    /// Fresh key that sorts after every key handed out before it.
    fn new_key(&self) -> String;

    async fn set(&self, path: &str, value: Value) -> anyhow::Result<()> {
        self.commit(Batch::new().set(path, value)).await.map(|_| ())
    }

    async fn update(&self, path: &str, fields: Map<String, Value>) -> anyhow::Result<()> {
        self.commit(Batch::new().update(path, fields)).await.map(|_| ())
    }

    async fn push(&self, path: &str, value: Value) -> anyhow::Result<String> {
        let key = self.new_key();
        self.set(&join(path, &key), value).await?;
        Ok(key)
    }

    async fn remove(&self, path: &str) -> anyhow::Result<()> {
        self.commit(Batch::new().remove(path)).await.map(|_| ())
    }
}

/// Join path segments with `/`.
pub fn join(base: &str, child: &str) -> String {
    if base.is_empty() {
        child.to_string()
    } else {
        format!("{}/{}", base.trim_end_matches('/'), child.trim_start_matches('/'))
    }
}

pub(crate) fn segments(path: &str) -> impl Iterator<Item = &str> {
    path.split('/').filter(|s| !s.is_empty())
}
