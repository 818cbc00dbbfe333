//! Category grouping and totals.
//!
//! # Responsibility
//! - Partition records by raw category label.
//! - Order each group by date with a stable sort.
//! - Compute per-group subtotals and the grand total.
//!
//! # Invariants
//! - Category order is first-seen order in the record sequence.
//! - Every input record lands in exactly one group.
//! - Records sharing a date keep their store order.
//! - Sums are exact; rounding happens only when rendering.
//! - Totals saturate at `Decimal::MAX` instead of overflowing.

use crate::model::expense::ExpenseRecord;
use indexmap::IndexMap;
use rust_decimal::Decimal;

/// Records of one category with derived totals.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct CategoryGroup<'a> {
    pub records: Vec<&'a ExpenseRecord>,
    pub subtotal: Decimal,
}

impl CategoryGroup<'_> {
    pub fn count(&self) -> usize {
        self.records.len()
    }
}

/// Grouped view over a record sequence.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Summary<'a> {
    pub groups: IndexMap<&'a str, CategoryGroup<'a>>,
    pub grand_total: Decimal,
}

impl<'a> Summary<'a> {
    /// Groups `records` by category and computes totals.
    pub fn from_records(records: &'a [ExpenseRecord]) -> Self {
        let mut groups: IndexMap<&'a str, CategoryGroup<'a>> = IndexMap::new();

        for record in records {
            let group = groups
                .entry(record.category.as_str())
                .or_insert_with(|| CategoryGroup {
                    records: Vec::new(),
                    subtotal: Decimal::ZERO,
                });
            group.records.push(record);
            group.subtotal = group.subtotal.saturating_add(record.amount);
        }

        for group in groups.values_mut() {
            // `sort_by_key` is stable, equal dates keep store order.
            group.records.sort_by_key(|record| record.date);
        }

        let grand_total = groups
            .values()
            .fold(Decimal::ZERO, |total, group| total.saturating_add(group.subtotal));

        Self {
            groups,
            grand_total,
        }
    }

    pub fn group(&self, category: &str) -> Option<&CategoryGroup<'a>> {
        self.groups.get(category)
    }

    pub fn categories(&self) -> impl Iterator<Item = &'a str> + '_ {
        self.groups.keys().copied()
    }

    pub fn is_empty(&self) -> bool {
        self.groups.is_empty()
    }
}

/// Sum of all amounts, independent of grouping, saturating at `Decimal::MAX`.
pub fn grand_total(records: &[ExpenseRecord]) -> Decimal {
    checked_grand_total(records).unwrap_or(Decimal::MAX)
}

/// Sum of all amounts, or `None` when it does not fit in a `Decimal`.
pub fn checked_grand_total(records: &[ExpenseRecord]) -> Option<Decimal> {
    records
        .iter()
        .try_fold(Decimal::ZERO, |total, record| total.checked_add(record.amount))
}

#[cfg(test)]
mod tests {
    use super::{checked_grand_total, grand_total, Summary};
    use crate::model::expense::ExpenseRecord;
    use chrono::NaiveDate;
    use rust_decimal::Decimal;

    fn record(id: i64, category: &str, amount_cents: i64, day: u32) -> ExpenseRecord {
        ExpenseRecord {
            id,
            description: format!("item-{id}"),
            amount: Decimal::new(amount_cents, 2),
            category: category.to_string(),
            date: NaiveDate::from_ymd_opt(2024, 1, day).unwrap(),
        }
    }

    #[test]
    fn groups_follow_first_seen_order_not_alphabetical() {
        let records = vec![
            record(1, "Transport", 200, 3),
            record(2, "Food", 350, 5),
            record(3, "Transport", 100, 1),
        ];
        let summary = Summary::from_records(&records);

        let categories: Vec<_> = summary.categories().collect();
        assert_eq!(categories, vec!["Transport", "Food"]);
    }

    #[test]
    fn category_labels_are_not_normalized() {
        let records = vec![
            record(1, "Food", 100, 1),
            record(2, "food", 100, 1),
            record(3, "Food ", 100, 1),
        ];
        let summary = Summary::from_records(&records);
        assert_eq!(summary.groups.len(), 3);
    }

    #[test]
    fn groups_sort_by_date_and_sum_subtotals() {
        let records = vec![
            record(1, "Food", 350, 5),
            record(2, "Transport", 200, 3),
            record(3, "Food", 800, 2),
        ];
        let summary = Summary::from_records(&records);

        let food = summary.group("Food").unwrap();
        let ids: Vec<_> = food.records.iter().map(|r| r.id).collect();
        assert_eq!(ids, vec![3, 1]);
        assert_eq!(food.subtotal, Decimal::new(1150, 2));
        assert_eq!(food.count(), 2);

        assert_eq!(summary.grand_total, Decimal::new(1350, 2));
        assert_eq!(summary.grand_total, grand_total(&records));
    }

    #[test]
    fn totals_saturate_instead_of_overflowing() {
        let mut huge = record(1, "Food", 0, 1);
        huge.amount = Decimal::MAX;
        let records = vec![
            huge,
            record(2, "Food", 100, 2),
            record(3, "Rent", 100, 3),
        ];

        let summary = Summary::from_records(&records);
        assert_eq!(summary.group("Food").unwrap().subtotal, Decimal::MAX);
        assert_eq!(summary.group("Rent").unwrap().subtotal, Decimal::ONE);
        assert_eq!(summary.grand_total, Decimal::MAX);
        assert_eq!(grand_total(&records), Decimal::MAX);
        assert_eq!(checked_grand_total(&records), None);
    }

    #[test]
    fn empty_input_yields_empty_summary() {
        let summary = Summary::from_records(&[]);
        assert!(summary.is_empty());
        assert_eq!(summary.grand_total, Decimal::ZERO);
    }
}
