//! Nutrient aggregation and report rows.
//!
//! Sums the nutrient fields of a lookup result and renders the ordered
//! row sequence the presentation layer turns into a table. An empty
//! item list yields the explicit "no data" signal instead of a table
//! with a spurious zero total.

use crate::{Food, NutrientTotals};

/// Label of the synthetic aggregate row
const TOTAL_LABEL: &str = "Total";

/// Sum calories, fat, carbohydrates, and protein across items
pub fn aggregate(items: &[Food]) -> NutrientTotals {
    items.iter().fold(NutrientTotals::default(), |acc, item| {
        NutrientTotals {
            calories: acc.calories + item.calories,
            fat: acc.fat + item.fat,
            carbohydrates: acc.carbohydrates + item.carbohydrates,
            protein: acc.protein + item.protein,
        }
    })
}

/// Render the ordered report rows: one row per item, then a final
/// `Total` row built from `totals`.
///
/// Returns `None` for an empty item list -- the caller renders an
/// "unknown food" message rather than an empty table.
pub fn format_report(items: &[Food], totals: &NutrientTotals) -> Option<Vec<Vec<String>>> {
    if items.is_empty() {
        return None;
    }

    let mut rows: Vec<Vec<String>> = items.iter().map(Food::row).collect();
    rows.push(vec![
        TOTAL_LABEL.to_string(),
        totals.calories.to_string(),
        totals.fat.to_string(),
        totals.carbohydrates.to_string(),
        totals.protein.to_string(),
    ]);
    Some(rows)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn fixture_foods() -> Vec<Food> {
        vec![
            Food {
                name: "Potatoes".into(),
                calories: 92.9,
                fat: 0.1,
                carbohydrates: 21.0,
                protein: 2.5,
            },
            Food {
                name: "Orange Juice".into(),
                calories: 46.4,
                fat: 0.1,
                carbohydrates: 11.2,
                protein: 0.7,
            },
        ]
    }

    #[test]
    fn test_aggregate_sums_each_field() {
        let totals = aggregate(&fixture_foods());

        assert_eq!(totals.calories, 139.3);
        assert_eq!(totals.fat, 0.2);
        assert_eq!(totals.carbohydrates, 32.2);
        assert_eq!(totals.protein, 3.2);
    }

    #[test]
    fn test_aggregate_empty_is_all_zero() {
        assert_eq!(aggregate(&[]), NutrientTotals::default());
    }

    #[test]
    fn test_report_appends_total_row() {
        let foods = fixture_foods();
        let totals = aggregate(&foods);
        let rows = format_report(&foods, &totals).unwrap();

        assert_eq!(
            rows,
            vec![
                vec!["Potatoes", "92.9", "0.1", "21", "2.5"],
                vec!["Orange Juice", "46.4", "0.1", "11.2", "0.7"],
                vec!["Total", "139.3", "0.2", "32.2", "3.2"],
            ]
            .into_iter()
            .map(|row| row.into_iter().map(String::from).collect::<Vec<_>>())
            .collect::<Vec<_>>()
        );
    }

    #[test]
    fn test_empty_report_is_no_data_signal() {
        let totals = aggregate(&[]);
        assert_eq!(format_report(&[], &totals), None);
    }
}
