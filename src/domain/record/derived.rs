//! Derived Field Rules - Totals computed from other leaves of a record.
//!
//! Rules run in declaration order on every mutation. Sums come first so a
//! weighted average may read totals produced earlier in the same pass.

use serde_json::Value;

use super::schema::SectionSchema;
use super::value::{coerce_number, lookup, lookup_mut, number_value, SectionRecord};
use crate::domain::foundation::{FieldPath, SectionName};

/// One rate in a weighted average and the population it is weighted by.
#[derive(Debug, Clone, PartialEq)]
pub struct WeightedTerm {
    pub rate: FieldPath,
    pub population: Vec<FieldPath>,
}

impl WeightedTerm {
    pub fn new(rate: FieldPath, population: Vec<FieldPath>) -> Self {
        Self { rate, population }
    }
}

/// A numeric leaf whose value is computed, never entered.
#[derive(Debug, Clone, PartialEq)]
pub enum DerivedRule {
    /// `target = sum(addends)`, non-numeric inputs read as 0.
    Sum {
        target: FieldPath,
        addends: Vec<FieldPath>,
    },
    /// `target = round2(sum(rate * population) / sum(population))`.
    ///
    /// Left untouched while the combined population is zero.
    WeightedAverage {
        target: FieldPath,
        terms: Vec<WeightedTerm>,
    },
}

impl DerivedRule {
    pub fn sum(target: FieldPath, addends: Vec<FieldPath>) -> Self {
        DerivedRule::Sum { target, addends }
    }

    pub fn weighted_average(target: FieldPath, terms: Vec<WeightedTerm>) -> Self {
        DerivedRule::WeightedAverage { target, terms }
    }

    pub fn target(&self) -> &FieldPath {
        match self {
            DerivedRule::Sum { target, .. } | DerivedRule::WeightedAverage { target, .. } => target,
        }
    }

    /// Every leaf this rule reads.
    pub fn inputs(&self) -> Vec<&FieldPath> {
        match self {
            DerivedRule::Sum { addends, .. } => addends.iter().collect(),
            DerivedRule::WeightedAverage { terms, .. } => terms
                .iter()
                .flat_map(|term| std::iter::once(&term.rate).chain(term.population.iter()))
                .collect(),
        }
    }

    /// New value for the target, or `None` to leave it as is.
    fn evaluate(&self, root: &Value) -> Option<f64> {
        let read = |path: &FieldPath| coerce_number(lookup(root, path));
        match self {
            DerivedRule::Sum { addends, .. } => {
                Some(DerivedFieldRules::total(addends.iter().map(read)))
            }
            DerivedRule::WeightedAverage { terms, .. } => {
                let pairs: Vec<(f64, f64)> = terms
                    .iter()
                    .map(|term| {
                        (
                            read(&term.rate),
                            DerivedFieldRules::total(term.population.iter().map(read)),
                        )
                    })
                    .collect();
                DerivedFieldRules::weighted_average(&pairs).map(DerivedFieldRules::round2)
            }
        }
    }
}

/// Pure calculator applying a section's derived rules.
pub struct DerivedFieldRules;

impl DerivedFieldRules {
    /// Returns `record` with every derived field recomputed.
    ///
    /// When nothing changes the input record is returned as-is, sharing
    /// its tree.
    pub fn recompute(schema: &SectionSchema, record: &SectionRecord) -> SectionRecord {
        let rules = schema.derived_rules();
        if rules.is_empty() {
            return record.clone();
        }

        let mut root = record.as_value().clone();
        Self::apply(rules, &mut root);

        if &root == record.as_value() {
            record.clone()
        } else {
            SectionRecord::from_value(record.section(), root)
        }
    }

    /// Applies `rules` in order to a raw tree.
    pub fn apply(rules: &[DerivedRule], root: &mut Value) {
        for rule in rules {
            let Some(computed) = rule.evaluate(root) else {
                continue;
            };
            if let Some(slot) = lookup_mut(root, rule.target()) {
                *slot = number_value(computed);
            }
        }
    }

    /// Sum of finite values.
    pub fn total(values: impl IntoIterator<Item = f64>) -> f64 {
        values.into_iter().filter(|x| x.is_finite()).sum()
    }

    /// Average of `(rate, weight)` pairs weighted by `weight`.
    ///
    /// # Edge Cases
    /// - Zero combined weight: returns `None`
    /// - Non-finite result: returns `None`
    pub fn weighted_average(pairs: &[(f64, f64)]) -> Option<f64> {
        let weight: f64 = pairs.iter().map(|(_, w)| w).sum();
        if weight == 0.0 {
            return None;
        }
        let weighted: f64 = pairs.iter().map(|(rate, w)| rate * w).sum();
        Some(weighted / weight).filter(|x| x.is_finite())
    }

    /// Rounds half away from zero to two decimal places.
    pub fn round2(x: f64) -> f64 {
        (x * 100.0).round() / 100.0
    }
}

/// Derived rules declared for a section.
pub fn rules_for(section: SectionName) -> Vec<DerivedRule> {
    match section {
        SectionName::SectionA => section_a_rules(),
        _ => Vec::new(),
    }
}

const WORKFORCE_GROUPS: &[&str] = &["employees", "workers"];
const EMPLOYMENT_TYPES: &[&str] = &["permanent", "otherThanPermanent"];

/// Headcount totals per employment type, then the turnover rate of each
/// workforce group weighted by its gendered headcount.
fn section_a_rules() -> Vec<DerivedRule> {
    let path = FieldPath::from_literal;
    let mut rules = Vec::new();

    for group in WORKFORCE_GROUPS {
        for kind in EMPLOYMENT_TYPES {
            rules.push(DerivedRule::sum(
                path(&format!("{group}.{kind}.total")),
                vec![
                    path(&format!("{group}.{kind}.male")),
                    path(&format!("{group}.{kind}.female")),
                ],
            ));
        }
    }

    for group in WORKFORCE_GROUPS {
        let terms = ["male", "female"]
            .iter()
            .map(|gender| {
                WeightedTerm::new(
                    path(&format!("turnover.{group}.{gender}")),
                    EMPLOYMENT_TYPES
                        .iter()
                        .map(|kind| path(&format!("{group}.{kind}.{gender}")))
                        .collect(),
                )
            })
            .collect();
        rules.push(DerivedRule::weighted_average(
            path(&format!("turnover.{group}.total")),
            terms,
        ));
    }

    rules
}

#[cfg(test)]
mod tests {
    use super::*;
    use proptest::prelude::*;
    use serde_json::json;
    use std::sync::Arc;

    fn p(s: &str) -> FieldPath {
        FieldPath::parse(s).unwrap()
    }

    fn section_a() -> Arc<SectionSchema> {
        SectionSchema::for_section(SectionName::SectionA)
    }

    fn record_with(value: Value) -> SectionRecord {
        let mut root = section_a().defaults().into_value();
        merge_into(&mut root, value);
        SectionRecord::from_value(SectionName::SectionA, root)
    }

    fn merge_into(base: &mut Value, patch: Value) {
        match (base, patch) {
            (Value::Object(base), Value::Object(patch)) => {
                for (k, v) in patch {
                    merge_into(base.entry(k).or_insert(Value::Null), v);
                }
            }
            (slot, v) => *slot = v,
        }
    }

    #[test]
    fn section_a_declares_sums_before_averages() {
        let rules = rules_for(SectionName::SectionA);
        assert_eq!(rules.len(), 6);
        assert!(rules[..4].iter().all(|r| matches!(r, DerivedRule::Sum { .. })));
        assert!(rules[4..]
            .iter()
            .all(|r| matches!(r, DerivedRule::WeightedAverage { .. })));
        assert!(rules_for(SectionName::Principle6).is_empty());
    }

    #[test]
    fn headcount_totals_are_sums() {
        let record = record_with(json!({
            "employees": { "permanent": { "male": 100, "female": 50 } },
            "workers": { "otherThanPermanent": { "male": "12", "female": 8 } }
        }));

        let out = DerivedFieldRules::recompute(&section_a(), &record);

        assert_eq!(out.get(&p("employees.permanent.total")), Some(&json!(150)));
        assert_eq!(out.get(&p("workers.otherThanPermanent.total")), Some(&json!(20)));
        assert_eq!(out.get(&p("employees.otherThanPermanent.total")), Some(&json!(0)));
    }

    #[test]
    fn non_numeric_inputs_count_as_zero() {
        let record = record_with(json!({
            "employees": { "permanent": { "male": "n/a", "female": 7 } }
        }));
        let out = DerivedFieldRules::recompute(&section_a(), &record);
        assert_eq!(out.get(&p("employees.permanent.total")), Some(&json!(7)));
    }

    #[test]
    fn turnover_total_is_weighted_by_headcount() {
        let record = record_with(json!({
            "employees": {
                "permanent": { "male": 100, "female": 50 },
                "otherThanPermanent": { "male": 50, "female": 25 }
            },
            "turnover": { "employees": { "male": 5, "female": 3 } }
        }));

        let out = DerivedFieldRules::recompute(&section_a(), &record);

        // (5 * 150 + 3 * 75) / 225 = 4.333..
        assert_eq!(out.get(&p("turnover.employees.total")), Some(&json!(4.33)));
    }

    #[test]
    fn zero_headcount_leaves_turnover_total_unchanged() {
        let record = record_with(json!({
            "turnover": { "workers": { "male": 9, "female": 4, "total": 2.5 } }
        }));

        let out = DerivedFieldRules::recompute(&section_a(), &record);

        assert_eq!(out.get(&p("turnover.workers.total")), Some(&json!(2.5)));
    }

    #[test]
    fn recompute_is_idempotent_and_shares_unchanged_tree() {
        let record = record_with(json!({
            "workers": { "permanent": { "male": 3, "female": 4 } },
            "turnover": { "workers": { "male": 1.5, "female": 2 } }
        }));

        let once = DerivedFieldRules::recompute(&section_a(), &record);
        let twice = DerivedFieldRules::recompute(&section_a(), &once);

        assert_eq!(once, twice);
        assert!(twice.shares_root_with(&once));
    }

    #[test]
    fn sections_without_rules_pass_through() {
        let schema = SectionSchema::for_section(SectionName::Principle3);
        let record = schema.defaults();
        let out = DerivedFieldRules::recompute(&schema, &record);
        assert!(out.shares_root_with(&record));
    }

    #[test]
    fn weighted_average_edge_cases() {
        assert_eq!(DerivedFieldRules::weighted_average(&[]), None);
        assert_eq!(DerivedFieldRules::weighted_average(&[(4.0, 0.0), (2.0, 0.0)]), None);
        assert_eq!(DerivedFieldRules::weighted_average(&[(4.0, 1.0), (2.0, 1.0)]), Some(3.0));
    }

    #[test]
    fn round2_rounds_to_cents() {
        assert_eq!(DerivedFieldRules::round2(4.3333), 4.33);
        assert_eq!(DerivedFieldRules::round2(2.675_1), 2.68);
        assert_eq!(DerivedFieldRules::round2(7.0), 7.0);
    }

    proptest! {
        #[test]
        fn totals_hold_and_recompute_is_idempotent(
            perm in (0u32..100_000, 0u32..100_000),
            other in (0u32..100_000, 0u32..100_000),
            rates in (0u32..10_000, 0u32..10_000),
        ) {
            let record = record_with(json!({
                "employees": {
                    "permanent": { "male": perm.0, "female": perm.1 },
                    "otherThanPermanent": { "male": other.0, "female": other.1 }
                },
                "turnover": {
                    "employees": {
                        "male": f64::from(rates.0) / 100.0,
                        "female": f64::from(rates.1) / 100.0
                    }
                }
            }));

            let once = DerivedFieldRules::recompute(&section_a(), &record);
            let twice = DerivedFieldRules::recompute(&section_a(), &once);

            prop_assert_eq!(
                once.number_at(&p("employees.permanent.total")),
                f64::from(perm.0) + f64::from(perm.1)
            );
            prop_assert_eq!(
                once.number_at(&p("employees.otherThanPermanent.total")),
                f64::from(other.0) + f64::from(other.1)
            );
            prop_assert_eq!(&once, &twice);
        }
    }
}
