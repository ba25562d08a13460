#![cfg(feature = "std")]

use std::sync::atomic::{AtomicU64, Ordering};
use std::sync::Mutex;

use anyhow::anyhow;
use serde_json::{Map, Value};
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use crate::store::{join, segments, Batch, ChildEvent, DocumentStore, Guard, Mutation};

struct Watcher {
    path: String,
    tx: UnboundedSender<ChildEvent>,
}

struct State {
    root: Value,
    watchers: Vec<Watcher>,
}

/// Process-local store. All writes go through one lock, so a batch is seen
/// either entirely or not at all.
pub struct MemoryStore {
    state: Mutex<State>,
    next_key: AtomicU64,
}

impl MemoryStore {
    pub fn new() -> Self {
        Self::from_value(Value::Object(Map::new()))
    }

    /// Start from an existing tree, e.g. one saved with [`MemoryStore::snapshot`].
    pub fn from_value(root: Value) -> Self {
        Self {
            state: Mutex::new(State {
                root,
                watchers: Vec::new(),
            }),
            next_key: AtomicU64::new(0),
        }
    }

    /// Copy of the whole tree.
    pub fn snapshot(&self) -> anyhow::Result<Value> {
        let state = self.lock()?;
        Ok(state.root.clone())
    }

    fn lock(&self) -> anyhow::Result<std::sync::MutexGuard<'_, State>> {
        self.state
            .lock()
            .map_err(|_| anyhow!("memory store lock poisoned"))
    }
}

impl Default for MemoryStore {
    fn default() -> Self {
        Self::new()
    }
}

#[async_trait::async_trait]
impl DocumentStore for MemoryStore {
    async fn get(&self, path: &str) -> anyhow::Result<Option<Value>> {
        let state = self.lock()?;
        Ok(lookup(&state.root, path).cloned())
    }

    async fn commit(&self, batch: Batch) -> anyhow::Result<bool> {
        let mut state = self.lock()?;
        if !batch.guards.iter().all(|g| holds(&state.root, g)) {
            return Ok(false);
        }

        let before: Vec<Option<Value>> = state
            .watchers
            .iter()
            .map(|w| lookup(&state.root, &w.path).cloned())
            .collect();

        for mutation in batch.mutations {
            match mutation {
                Mutation::Set { path, value } => write(&mut state.root, &path, value),
                Mutation::Update { path, fields } => {
                    for (field, value) in fields {
                        write(&mut state.root, &join(&path, &field), value);
                    }
                }
                Mutation::Remove(path) => write(&mut state.root, &path, Value::Null),
            }
        }

        let State { root, watchers } = &mut *state;
        let mut open = Vec::with_capacity(watchers.len());
        for (watcher, old) in watchers.drain(..).zip(before) {
            let new = lookup(root, &watcher.path);
            let alive = diff_children(old.as_ref(), new)
                .into_iter()
                .all(|event| watcher.tx.send(event).is_ok());
            if alive && !watcher.tx.is_closed() {
                open.push(watcher);
            }
        }
        *watchers = open;
        Ok(true)
    }

    async fn query(
        &self,
        collection: &str,
        field: &str,
        value: &Value,
    ) -> anyhow::Result<Vec<(String, Value)>> {
        let state = self.lock()?;
        let Some(Value::Object(children)) = lookup(&state.root, collection) else {
            return Ok(Vec::new());
        };
        Ok(children
            .iter()
            .filter(|(_, child)| lookup(child, field) == Some(value))
            .map(|(key, child)| (key.clone(), child.clone()))
            .collect())
    }

    async fn watch(&self, path: &str) -> anyhow::Result<UnboundedReceiver<ChildEvent>> {
        let (tx, rx) = mpsc::unbounded_channel();
        let mut state = self.lock()?;
        for event in diff_children(None, lookup(&state.root, path)) {
            let _ = tx.send(event);
        }
        state.watchers.push(Watcher {
            path: path.to_string(),
            tx,
        });
        Ok(rx)
    }

    fn new_key(&self) -> String {
        format!("-{:012}", self.next_key.fetch_add(1, Ordering::Relaxed))
    }
}

fn holds(root: &Value, guard: &Guard) -> bool {
    match guard {
        Guard::Equals { path, value } => lookup(root, path) == Some(value),
        Guard::Exists(path) => lookup(root, path).is_some(),
        Guard::Absent(path) => lookup(root, path).is_none(),
    }
}

fn lookup<'a>(root: &'a Value, path: &str) -> Option<&'a Value> {
    let mut node = root;
    for seg in segments(path) {
        node = node.as_object()?.get(seg)?;
    }
    Some(node)
}

/// Write `value` at `path`, creating parents. A null value deletes the node
/// and any parent left empty.
fn write(root: &mut Value, path: &str, value: Value) {
    let segs: Vec<&str> = segments(path).collect();
    if value.is_null() {
        remove_at(root, &segs);
        return;
    }
    let mut node = root;
    for seg in segs {
        if !node.is_object() {
            *node = Value::Object(Map::new());
        }
        let Value::Object(map) = node else {
            return;
        };
        node = map.entry(seg.to_string()).or_insert(Value::Null);
    }
    *node = strip_nulls(value);
}

/// Returns true when `node` is left as an empty object.
fn remove_at(node: &mut Value, segs: &[&str]) -> bool {
    let Some((first, rest)) = segs.split_first() else {
        *node = Value::Object(Map::new());
        return true;
    };
    let Value::Object(map) = node else {
        return false;
    };
    if rest.is_empty() {
        map.remove(*first);
    } else if let Some(child) = map.get_mut(*first) {
        if remove_at(child, rest) {
            map.remove(*first);
        }
    }
    map.is_empty()
}

fn strip_nulls(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .filter(|(_, v)| !v.is_null())
                .map(|(k, v)| (k, strip_nulls(v)))
                .collect(),
        ),
        other => other,
    }
}

fn diff_children(old: Option<&Value>, new: Option<&Value>) -> Vec<ChildEvent> {
    let empty = Map::new();
    let old = old.and_then(Value::as_object).unwrap_or(&empty);
    let new = new.and_then(Value::as_object).unwrap_or(&empty);
    let mut events = Vec::new();
    for (key, value) in new {
        match old.get(key) {
            None => events.push(ChildEvent::Added {
                key: key.clone(),
                value: value.clone(),
            }),
            Some(prev) if prev != value => events.push(ChildEvent::Changed {
                key: key.clone(),
                value: value.clone(),
            }),
            _ => {}
        }
    }
    for key in old.keys() {
        if !new.contains_key(key) {
            events.push(ChildEvent::Removed { key: key.clone() });
        }
    }
    events
}
