//! Carbohydrate-to-insulin calculation engine.
//!
//! Pure arithmetic over a meal's nutrient totals and the configured
//! short-acting dose ratio. Rounding happens once, at the final step,
//! using round-half-to-even; everything before that stays in floating
//! point.

use crate::{Dose, Error, InsulinKind, NutrientTotals, Result};

/// Suggest a short-acting insulin amount for a meal.
///
/// The suggestion is `total_carbs / ratio.carbs_amount * ratio.insulin_amount`,
/// rounded half-to-even. `ratio` must be a short-acting dose; the dose
/// invariant guarantees its `carbs_amount` is positive, so no separate
/// divide-by-zero branch exists. Zero total carbohydrates yield a
/// suggestion of 0.
pub fn suggest_insulin(totals: &NutrientTotals, ratio: &Dose) -> Result<u32> {
    if ratio.kind() != InsulinKind::Short {
        return Err(Error::validation(
            "type",
            "insulin suggestions require a short-acting dose ratio",
        ));
    }

    let units = totals.carbohydrates / f64::from(ratio.carbs_amount())
        * f64::from(ratio.insulin_amount());

    Ok(units.round_ties_even() as u32)
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::report::aggregate;
    use crate::Food;

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
    fn test_suggestion_matches_fixture_ratios() {
        let totals = aggregate(&fixture_foods());

        let ratio = Dose::new(InsulinKind::Short, 1, 10).unwrap();
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 3);

        let ratio = Dose::new(InsulinKind::Short, 1, 15).unwrap();
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 2);

        let ratio = Dose::new(InsulinKind::Short, 1, 6).unwrap();
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 5);
    }

    #[test]
    fn test_long_ratio_rejected() {
        let totals = aggregate(&fixture_foods());
        let ratio = Dose::new(InsulinKind::Long, 24, 0).unwrap();

        match suggest_insulin(&totals, &ratio) {
            Err(Error::Validation { field, .. }) => assert_eq!(field, "type"),
            other => panic!("Expected validation error, got {:?}", other),
        }
    }

    #[test]
    fn test_empty_meal_suggests_zero() {
        let totals = aggregate(&[]);
        let ratio = Dose::new(InsulinKind::Short, 1, 10).unwrap();

        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 0);
    }

    #[test]
    fn test_halfway_rounds_to_even() {
        // 25 g at 1u/10g is exactly 2.5 units; half-to-even gives 2
        let totals = NutrientTotals {
            carbohydrates: 25.0,
            ..Default::default()
        };
        let ratio = Dose::new(InsulinKind::Short, 1, 10).unwrap();
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 2);

        // 35 g is exactly 3.5 units; half-to-even gives 4
        let totals = NutrientTotals {
            carbohydrates: 35.0,
            ..Default::default()
        };
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 4);
    }

    #[test]
    fn test_multi_unit_ratio() {
        // 2 units per 12 g over 30 g of carbs is 5.0 units exactly
        let totals = NutrientTotals {
            carbohydrates: 30.0,
            ..Default::default()
        };
        let ratio = Dose::new(InsulinKind::Short, 2, 12).unwrap();
        assert_eq!(suggest_insulin(&totals, &ratio).unwrap(), 5);
    }
}
