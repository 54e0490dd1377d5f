//! Low-inventory detection for the dashboard.

use uuid::Uuid;

use crate::models::InventoryItem;

/// Items owned by `owner` whose quantity is at or below `threshold`, by id.
pub fn find_low_inventory<'a>(items: &'a [InventoryItem], owner: Uuid, threshold: i32) -> Vec<&'a InventoryItem> {
    let mut low: Vec<&InventoryItem> = items
        .iter()
        .filter(|item| item.owner_id == owner && item.quantity <= threshold)
        .collect();
    low.sort_by_key(|item| item.id);
    low
}

/// The dashboard alert for `count` low items, or nothing when there are none.
pub fn low_inventory_message(count: usize) -> Option<String> {
    match count {
        0 => None,
        1 => Some("1 item has low inventory".to_string()),
        n => Some(format!("{n} items have low inventory")),
    }
}

/// Low-inventory summary of one user's items.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct LowInventoryAlert {
    pub item_ids: Vec<i64>,
    pub message: Option<String>,
}

impl LowInventoryAlert {
    pub fn for_owner(items: &[InventoryItem], owner: Uuid, threshold: i32) -> Self {
        let item_ids: Vec<i64> = find_low_inventory(items, owner, threshold)
            .into_iter()
            .map(|item| item.id)
            .collect();
        let message = low_inventory_message(item_ids.len());
        Self { item_ids, message }
    }

    pub fn contains(&self, id: i64) -> bool {
        self.item_ids.contains(&id)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::Utc;

    fn item(id: i64, quantity: i32, owner: Uuid) -> InventoryItem {
        InventoryItem {
            id,
            name: format!("item {id}"),
            quantity,
            category_id: None,
            created_at: Utc::now(),
            owner_id: owner,
        }
    }

    #[test]
    fn threshold_is_inclusive() {
        let owner = Uuid::new_v4();
        let items = vec![item(1, 2, owner), item(2, 10, owner)];

        let low: Vec<i64> = find_low_inventory(&items, owner, 5).iter().map(|i| i.id).collect();
        assert_eq!(low, vec![1]);

        let low: Vec<i64> = find_low_inventory(&items, owner, 10).iter().map(|i| i.id).collect();
        assert_eq!(low, vec![1, 2]);
    }

    #[test]
    fn results_are_ordered_by_id() {
        let owner = Uuid::new_v4();
        let items = vec![item(9, 0, owner), item(3, 1, owner), item(5, 2, owner)];
        let low: Vec<i64> = find_low_inventory(&items, owner, 5).iter().map(|i| i.id).collect();
        assert_eq!(low, vec![3, 5, 9]);
    }

    #[test]
    fn other_users_items_are_ignored() {
        let owner = Uuid::new_v4();
        let someone_else = Uuid::new_v4();
        let items = vec![item(1, 0, someone_else), item(2, 1, owner)];
        let alert = LowInventoryAlert::for_owner(&items, owner, 5);
        assert_eq!(alert.item_ids, vec![2]);
        assert!(!alert.contains(1));
    }

    #[test]
    fn message_is_pluralised() {
        assert_eq!(low_inventory_message(0), None);
        assert_eq!(low_inventory_message(1).as_deref(), Some("1 item has low inventory"));
        assert_eq!(low_inventory_message(2).as_deref(), Some("2 items have low inventory"));
    }

    #[test]
    fn alert_without_low_items_has_no_message() {
        let owner = Uuid::new_v4();
        let items = vec![item(1, 50, owner)];
        assert_eq!(LowInventoryAlert::for_owner(&items, owner, 5), LowInventoryAlert::default());
    }
}
