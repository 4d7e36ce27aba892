use tracing::debug;

use super::{bump, live, Tracker};
use crate::{
    catalog::RepositoryItem,
    dispatch::Dispatcher,
    events::{EventKind, EventValue, ItemValue, ServerEvent},
    stats::ItemInfoType,
};

pub(super) fn register(dispatcher: &mut Dispatcher<Tracker>) {
    dispatcher.register(EventKind::ItemPickedUp, live(on_item_picked_up));
    dispatcher.register(EventKind::ItemDropped, live(on_item_disposed));
    dispatcher.register(EventKind::ItemThrown, live(on_item_disposed));
    dispatcher.register(EventKind::ItemRemovedFromInventory, live(on_item_disposed));
}

fn display_name(item: &RepositoryItem, value: &ItemValue) -> String {
    [&item.title, &item.common_name, &value.item_name]
        .into_iter()
        .find(|name| !name.trim().is_empty())
        .cloned()
        .unwrap_or_else(|| value.repository_id.to_string())
}

fn within_intro_grace(tracker: &Tracker, timestamp: f64) -> bool {
    tracker
        .state
        .intro_cut_end
        .is_some_and(|end| timestamp - end < tracker.settings.item_pickup_grace_secs)
}

fn on_item_picked_up(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Item(value) = &event.value else {
        return;
    };
    if within_intro_grace(tracker, event.timestamp) {
        debug!(item = %value.repository_id, "ignoring pickup inside intro grace window");
        return;
    }
    let metadata = tracker.repository.item(&value.repository_id);
    let misc = &mut tracker.state.stats.misc;
    bump(&mut misc.items_picked_up);

    let Some(item) = metadata else {
        debug!(item = %value.repository_id, "picked up item missing from repository");
        return;
    };
    match item.kind {
        ItemInfoType::Key => bump(&mut misc.key_items_picked_up),
        ItemInfoType::Intel => bump(&mut misc.intel_items_picked_up),
        _ => {}
    }
    let name = display_name(&item, value);
    tracker
        .state
        .stats
        .items_obtained
        .insert(value.repository_id.clone(), item.kind, name);
}

fn on_item_disposed(tracker: &mut Tracker, event: &ServerEvent) {
    let EventValue::Item(value) = &event.value else {
        return;
    };
    let stats = &mut tracker.state.stats;
    match event.kind {
        EventKind::ItemDropped => bump(&mut stats.misc.items_dropped),
        EventKind::ItemThrown => bump(&mut stats.misc.items_thrown),
        _ => bump(&mut stats.misc.items_removed_from_inventory),
    }

    if let Some(info) = stats.items_obtained.take_one(&value.repository_id) {
        stats
            .items_disposed
            .insert(value.repository_id.clone(), info.kind, info.name);
        return;
    }
    match tracker.repository.item(&value.repository_id) {
        Some(item) => {
            let name = display_name(&item, value);
            tracker
                .state
                .stats
                .items_disposed
                .insert(value.repository_id.clone(), item.kind, name);
        }
        None => debug!(item = %value.repository_id, "disposed item missing from repository"),
    }
}

#[cfg(test)]
mod tests {
    use serde_json::json;

    use crate::{handlers::testing::Harness, keys::RepoId, stats::ItemInfoType};

    const REPOSITORY: &str = r#"[
        { "ID_": "coin", "Title": "Coin", "InventoryCategoryIcon": "coin" },
        { "ID_": "key-card", "Title": "Keycard", "InventoryCategoryIcon": "key" },
        { "ID_": "gun", "CommonName": "Silverballer", "InventoryCategoryIcon": "pistol" }
    ]"#;

    #[test]
    fn pickups_inside_intro_grace_window_are_ignored() {
        let mut harness = Harness::with_repository(REPOSITORY);
        harness.send("IntroCutEnd", json!(null), 10.0);
        harness.send("ItemPickedUp", json!({ "RepositoryId": "gun" }), 11.5);
        assert_eq!(harness.tracker.state.stats.misc.items_picked_up, 0);

        harness.send("ItemPickedUp", json!({ "RepositoryId": "gun" }), 12.5);
        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.misc.items_picked_up, 1);
        let gun = stats
            .items_obtained
            .get(&RepoId::new("gun"))
            .expect("gun should be obtained");
        assert_eq!(gun.name, "Silverballer");
        assert_eq!(gun.kind, ItemInfoType::Firearm);
    }

    #[test]
    fn unknown_items_are_counted_but_not_obtained() {
        let mut harness = Harness::with_repository(REPOSITORY);
        harness.send("ItemPickedUp", json!({ "RepositoryId": "mystery", "ItemName": "Box" }), 5.0);
        harness.send("ItemPickedUp", json!({ "RepositoryId": "key-card" }), 6.0);
        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.misc.items_picked_up, 2);
        assert_eq!(stats.misc.key_items_picked_up, 1);
        assert_eq!(stats.items_obtained.len(), 1);
    }

    #[test]
    fn disposal_moves_one_item_from_obtained() {
        let mut harness = Harness::with_repository(REPOSITORY);
        harness.send("ItemPickedUp", json!({ "RepositoryId": "coin" }), 5.0);
        harness.send("ItemPickedUp", json!({ "RepositoryId": "coin" }), 6.0);
        harness.send("ItemThrown", json!({ "RepositoryId": "coin" }), 7.0);

        let stats = &harness.tracker.state.stats;
        assert_eq!(stats.misc.items_thrown, 1);
        assert_eq!(stats.items_obtained.get(&RepoId::new("coin")).map(|i| i.count), Some(1));
        assert_eq!(stats.items_disposed.get(&RepoId::new("coin")).map(|i| i.count), Some(1));

        harness.send("ItemDropped", json!({ "RepositoryId": "coin" }), 8.0);
        harness.send("ItemRemovedFromInventory", json!({ "RepositoryId": "nothing" }), 9.0);
        let stats = &harness.tracker.state.stats;
        assert!(stats.items_obtained.is_empty());
        assert_eq!(stats.items_disposed.get(&RepoId::new("coin")).map(|i| i.count), Some(2));
        assert_eq!(stats.items_disposed.len(), 1);
        assert_eq!(stats.misc.items_removed_from_inventory, 1);
    }
}
