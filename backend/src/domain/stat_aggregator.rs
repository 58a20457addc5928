//! Effective-stat derivation.
//!
//! Effective stats are computed at read time as base stats plus the sum of
//! every equipped item's delta. Nothing here writes to storage, so a
//! corrected item stat table is reflected on the next read.

use super::ports::{ItemCatalog, ItemCatalogError};
use super::{BaseStats, EffectiveStats, EquipmentBoard, ItemId, ItemStats};

/// Combine base stats with a set of item contributions.
///
/// # Examples
///
/// ```
/// # use armoury::domain::{BaseStats, ItemStats, aggregate};
/// let base = BaseStats { strength: 10, ..BaseStats::default() };
/// let sword = ItemStats { strength: 5, ..ItemStats::ZERO };
/// let ring = ItemStats { mana: 10, ..ItemStats::ZERO };
///
/// let effective = aggregate(&base, [sword, ring]);
/// assert_eq!(effective.strength, 15);
/// assert_eq!(effective.mana, base.mana + 10);
/// ```
pub fn aggregate<I>(base: &BaseStats, contributions: I) -> EffectiveStats
where
    I: IntoIterator<Item = ItemStats>,
{
    EffectiveStats::from_parts(base, contributions.into_iter().sum())
}

/// Stat delta of one item; a missing stat record contributes nothing.
pub async fn contribution<C>(catalog: &C, item_id: &ItemId) -> Result<ItemStats, ItemCatalogError>
where
    C: ItemCatalog + ?Sized,
{
    Ok(catalog
        .find_item_stats(item_id)
        .await?
        .unwrap_or(ItemStats::ZERO))
}

/// Deltas of every occupant of `board`, one per occupied slot.
///
/// An item held in two slots contributes twice.
pub async fn equipped_contributions<C>(
    catalog: &C,
    board: &EquipmentBoard,
) -> Result<Vec<ItemStats>, ItemCatalogError>
where
    C: ItemCatalog + ?Sized,
{
    let mut contributions = Vec::new();
    for (_, item_id) in board.occupied() {
        contributions.push(contribution(catalog, item_id).await?);
    }
    Ok(contributions)
}

#[cfg(test)]
mod tests {
    //! Regression coverage for this module.
    use super::*;
    use crate::domain::EquipmentSlot;
    use crate::domain::ports::MockItemCatalog;
    use rstest::rstest;

    fn slot(name: &str) -> EquipmentSlot {
        EquipmentSlot::new(name).expect("valid slot")
    }

    #[rstest]
    fn aggregate_without_equipment_returns_base() {
        let base = BaseStats::default();
        let effective = aggregate(&base, std::iter::empty());
        assert_eq!(effective, EffectiveStats::from_parts(&base, ItemStats::ZERO));
    }

    #[rstest]
    #[tokio::test]
    async fn missing_stats_contribute_nothing() {
        let mut catalog = MockItemCatalog::new();
        catalog.expect_find_item_stats().returning(|_| Ok(None));

        let total = contribution(&catalog, &ItemId::random())
            .await
            .expect("lookup succeeds");

        assert!(total.is_zero());
    }

    #[rstest]
    #[tokio::test]
    async fn duplicated_occupants_count_once_per_slot() {
        let ring = ItemId::random();
        let board: EquipmentBoard = [(slot("ring-left"), ring), (slot("ring-right"), ring)]
            .into_iter()
            .collect();
        let mut catalog = MockItemCatalog::new();
        catalog.expect_find_item_stats().times(2).returning(|_| {
            Ok(Some(ItemStats {
                intelligence: 2,
                ..ItemStats::ZERO
            }))
        });

        let contributions = equipped_contributions(&catalog, &board)
            .await
            .expect("contributions computed");
        let effective = aggregate(&BaseStats::default(), contributions);

        assert_eq!(
            effective.intelligence,
            BaseStats::default().intelligence + 4
        );
    }

    #[rstest]
    #[tokio::test]
    async fn catalogue_failures_propagate() {
        let board: EquipmentBoard = [(slot("weapon"), ItemId::random())].into_iter().collect();
        let mut catalog = MockItemCatalog::new();
        catalog
            .expect_find_item_stats()
            .returning(|_| Err(ItemCatalogError::connection("down")));

        let result = equipped_contributions(&catalog, &board).await;

        assert_eq!(result, Err(ItemCatalogError::connection("down")));
    }
}
