use gnw::store::{join, Batch, ChildEvent, DocumentStore, MemoryStore};
use serde_json::{json, Map, Value};

#[tokio::test]
async fn set_get_and_nested_paths() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("ships/s1", json!({"name": "Paralos", "health": {"hull": 4}})).await?;
    assert_eq!(store.get("ships/s1/name").await?, Some(json!("Paralos")));
    assert_eq!(store.get("ships/s1/health/hull").await?, Some(json!(4)));
    assert_eq!(store.get("ships/s2").await?, None);
    assert_eq!(store.get("ships/s1/name/deeper").await?, None);
    Ok(())
}

#[tokio::test]
async fn update_merges_fields_and_null_deletes() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("ships/s1", json!({"name": "Paralos", "heading": 0, "orders": ["P"]})).await?;
    let mut fields = Map::new();
    fields.insert("heading".into(), json!(90));
    fields.insert("health/hull".into(), json!(3));
    fields.insert("orders".into(), Value::Null);
    store.update("ships/s1", fields).await?;
    assert_eq!(
        store.get("ships/s1").await?,
        Some(json!({"name": "Paralos", "heading": 90, "health": {"hull": 3}}))
    );
    Ok(())
}

#[tokio::test]
async fn removing_last_child_prunes_parent() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("crumbs/b1/s1/k1", json!({"turn": 0})).await?;
    store.set("battles/b1/turn", json!(0)).await?;
    store.remove("crumbs/b1/s1/k1").await?;
    assert_eq!(store.get("crumbs").await?, None);
    assert_eq!(store.snapshot()?, json!({"battles": {"b1": {"turn": 0}}}));
    Ok(())
}

#[tokio::test]
async fn nulls_inside_written_values_are_dropped() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("a", json!({"b": null, "c": {"d": null, "e": 1}})).await?;
    assert_eq!(store.get("a").await?, Some(json!({"c": {"e": 1}})));
    Ok(())
}

#[tokio::test]
async fn failed_guard_writes_nothing() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("battles/b1", json!({"turn": 3, "awaiting": "orders"})).await?;

    let batch = Batch::new()
        .guard_eq("battles/b1/turn", 2)
        .set("battles/b1/turn", 3)
        .set("ships/s1/heading", 45);
    assert!(!store.commit(batch).await?);
    assert_eq!(store.get("ships").await?, None);

    let batch = Batch::new()
        .guard_eq("battles/b1/turn", 3)
        .guard_eq("battles/b1/awaiting", "orders")
        .guard_exists("battles/b1")
        .guard_absent("battles/b1/review")
        .set("battles/b1/turn", 4)
        .set("ships/s1/heading", 45);
    assert!(store.commit(batch).await?);
    assert_eq!(store.get("battles/b1/turn").await?, Some(json!(4)));
    assert_eq!(store.get("ships/s1/heading").await?, Some(json!(45)));
    Ok(())
}

#[tokio::test]
async fn query_matches_field() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("ships/s1", json!({"battleId": "b1"})).await?;
    store.set("ships/s2", json!({"battleId": "b2"})).await?;
    store.set("ships/s3", json!({"battleId": "b1"})).await?;
    store.set("ships/s4", json!({"name": "idle"})).await?;
    let found = store.query("ships", "battleId", &json!("b1")).await?;
    let ids: Vec<_> = found.iter().map(|(id, _)| id.as_str()).collect();
    assert_eq!(ids, vec!["s1", "s3"]);
    assert!(store.query("nothing", "battleId", &json!("b1")).await?.is_empty());
    Ok(())
}

#[tokio::test]
async fn push_keys_sort_in_order() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    let mut keys = Vec::new();
    for i in 0..12 {
        keys.push(store.push("battles/b1/log", json!({"n": i})).await?);
    }
    let mut sorted = keys.clone();
    sorted.sort();
    assert_eq!(keys, sorted);
    let Some(Value::Object(log)) = store.get("battles/b1/log").await? else {
        panic!("log missing");
    };
    let order: Vec<_> = log.values().map(|v| v["n"].as_i64().unwrap()).collect();
    assert_eq!(order, (0..12).collect::<Vec<_>>());
    Ok(())
}

#[tokio::test]
async fn watch_reports_child_changes() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("battles/b1/squadrons/sq1", json!({"city": "Athens"})).await?;
    let mut rx = store.watch("battles/b1/squadrons").await?;
    assert_eq!(
        rx.recv().await,
        Some(ChildEvent::Added {
            key: "sq1".into(),
            value: json!({"city": "Athens"})
        })
    );

    store.set("battles/b1/squadrons/sq2", json!({"city": "Sparta"})).await?;
    assert_eq!(
        rx.recv().await,
        Some(ChildEvent::Added {
            key: "sq2".into(),
            value: json!({"city": "Sparta"})
        })
    );

    store.set("battles/b1/squadrons/sq1/side", json!(1)).await?;
    assert_eq!(
        rx.recv().await,
        Some(ChildEvent::Changed {
            key: "sq1".into(),
            value: json!({"city": "Athens", "side": 1})
        })
    );

    store.remove("battles/b1/squadrons/sq2").await?;
    assert_eq!(rx.recv().await, Some(ChildEvent::Removed { key: "sq2".into() }));

    // unrelated writes produce nothing
    store.set("ships/s1/name", json!("Paralos")).await?;
    assert!(rx.try_recv().is_err());
    Ok(())
}

#[tokio::test]
async fn snapshot_round_trips() -> anyhow::Result<()> {
    let store = MemoryStore::new();
    store.set("battles/b1/turn", json!(7)).await?;
    let copy = MemoryStore::from_value(store.snapshot()?);
    assert_eq!(copy.get("battles/b1/turn").await?, Some(json!(7)));
    Ok(())
}

#[test]
fn join_paths() {
    assert_eq!(join("ships", "s1"), "ships/s1");
    assert_eq!(join("ships/", "/s1"), "ships/s1");
    assert_eq!(join("", "s1"), "s1");
}
