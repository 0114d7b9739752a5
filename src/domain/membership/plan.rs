//! Membership plan catalog.
//!
//! Plans are fixed product definitions. A plan id is derived from its title:
//! lower case with spaces replaced by hyphens (`"3-Month Plan"` becomes
//! `3-month-plan`).

use serde::{Deserialize, Serialize};

use crate::domain::foundation::PlanId;
use crate::domain::payment::MinorUnits;

/// A purchasable membership plan.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct Plan {
    pub id: PlanId,
    pub title: String,
    /// Price in major units (whole rupees).
    pub price: i64,
    pub duration_days: i64,
    pub sessions_included: u32,
}

impl Plan {
    /// Builds a plan whose id is derived from the title.
    ///
    /// Returns `None` for a blank title.
    pub fn new(title: &str, price: i64, duration_days: i64, sessions_included: u32) -> Option<Self> {
        let id = PlanId::new(Self::slug(title)).ok()?;
        Some(Self {
            id,
            title: title.to_string(),
            price,
            duration_days,
            sessions_included,
        })
    }

    /// Derives a plan id from a title.
    pub fn slug(title: &str) -> String {
        title
            .trim()
            .to_lowercase()
            .split_whitespace()
            .collect::<Vec<_>>()
            .join("-")
    }

    /// Price in minor units (paise).
    pub fn price_minor(&self) -> i64 {
        self.price * 100
    }

    /// True when the given order amount pays exactly this plan's price.
    pub fn is_paid_by(&self, amount: MinorUnits) -> bool {
        amount.value() == self.price_minor()
    }
}

/// The set of plans on sale.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PlanCatalog {
    plans: Vec<Plan>,
}

impl PlanCatalog {
    pub fn new(plans: Vec<Plan>) -> Self {
        Self { plans }
    }

    /// The standard product line.
    pub fn standard() -> Self {
        let plans = [
            ("Lite", 10_999, 30, 12),
            ("Active", 13_999, 30, 16),
            ("Elite", 15_999, 30, 20),
            ("3-Month Plan", 33_999, 90, 48),
            ("6-Month Plan", 64_999, 180, 120),
        ]
        .into_iter()
        .filter_map(|(title, price, days, sessions)| Plan::new(title, price, days, sessions))
        .collect();
        Self { plans }
    }

    pub fn get(&self, id: &PlanId) -> Option<&Plan> {
        self.plans.iter().find(|p| &p.id == id)
    }

    pub fn all(&self) -> &[Plan] {
        &self.plans
    }
}

impl Default for PlanCatalog {
    fn default() -> Self {
        Self::standard()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn plan_id(id: &str) -> PlanId {
        PlanId::new(id).unwrap()
    }

    #[test]
    fn slug_lowercases_and_hyphenates() {
        assert_eq!(Plan::slug("3-Month Plan"), "3-month-plan");
        assert_eq!(Plan::slug("  Elite "), "elite");
    }

    #[test]
    fn standard_catalog_has_five_plans() {
        let catalog = PlanCatalog::standard();
        let ids: Vec<&str> = catalog.all().iter().map(|p| p.id.as_str()).collect();
        assert_eq!(ids, ["lite", "active", "elite", "3-month-plan", "6-month-plan"]);
    }

    #[test]
    fn lite_plan_values() {
        let catalog = PlanCatalog::standard();
        let lite = catalog.get(&plan_id("lite")).unwrap();
        assert_eq!(lite.price, 10_999);
        assert_eq!(lite.duration_days, 30);
        assert_eq!(lite.sessions_included, 12);
        assert_eq!(lite.price_minor(), 1_099_900);
    }

    #[test]
    fn six_month_plan_values() {
        let catalog = PlanCatalog::standard();
        let plan = catalog.get(&plan_id("6-month-plan")).unwrap();
        assert_eq!(plan.duration_days, 180);
        assert_eq!(plan.sessions_included, 120);
    }

    #[test]
    fn unknown_plan_is_absent() {
        assert!(PlanCatalog::standard().get(&plan_id("platinum")).is_none());
    }

    #[test]
    fn is_paid_by_requires_exact_amount() {
        let catalog = PlanCatalog::standard();
        let elite = catalog.get(&plan_id("elite")).unwrap();
        assert!(elite.is_paid_by(MinorUnits::new(1_599_900).unwrap()));
        assert!(!elite.is_paid_by(MinorUnits::new(1_599_899).unwrap()));
    }
}
