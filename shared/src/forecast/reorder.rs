//! Reorder quantity, urgency and ranking

use rust_decimal::Decimal;

use super::model::ReorderPolicy;
use crate::models::{ReorderCandidate, ReorderRecommendation, Urgency};

impl ReorderPolicy {
    /// Whether a medicine is close enough to its minimum to be considered
    pub fn qualifies(&self, quantity: i64, min_quantity: i64) -> bool {
        quantity as f64 <= min_quantity as f64 * self.restock_multiplier
    }

    pub fn urgency(&self, quantity: i64, min_quantity: i64) -> Urgency {
        if quantity as f64 <= min_quantity as f64 * self.high_urgency_ratio {
            Urgency::High
        } else {
            Urgency::Medium
        }
    }

    pub fn safety_stock(&self, predicted_demand: i64) -> i64 {
        (predicted_demand as f64 * self.safety_stock_ratio).round() as i64
    }

    pub fn lead_time_demand(&self, predicted_demand: i64) -> i64 {
        (predicted_demand as f64 * self.lead_time_ratio).round() as i64
    }

    /// Order enough to refill to the maximum, and never less than safety stock
    /// plus lead-time demand.
    pub fn reorder_quantity(&self, candidate: &ReorderCandidate, predicted_demand: i64) -> i64 {
        let refill = candidate.max_quantity - candidate.quantity;
        let buffer = self.safety_stock(predicted_demand) + self.lead_time_demand(predicted_demand);
        refill.max(buffer)
    }

    pub fn recommend(
        &self,
        candidate: &ReorderCandidate,
        predicted_demand: i64,
    ) -> ReorderRecommendation {
        let reorder_qty = self.reorder_quantity(candidate, predicted_demand);
        ReorderRecommendation {
            medicine_id: candidate.medicine_id,
            medicine: candidate.medicine.clone(),
            current_stock: candidate.quantity,
            min_required: candidate.min_quantity,
            monthly_sales: candidate.recent_sales,
            predicted_demand,
            reorder_qty,
            urgency: self.urgency(candidate.quantity, candidate.min_quantity),
            est_cost: Decimal::from(reorder_qty) * self.placeholder_unit_cost,
        }
    }
}

/// Largest shortfall first; ties keep their incoming order
pub fn rank(recommendations: &mut [ReorderRecommendation]) {
    recommendations.sort_by(|a, b| b.shortfall().cmp(&a.shortfall()));
}

#[cfg(test)]
mod tests {
    use super::*;
    use uuid::Uuid;

    fn candidate(quantity: i64, min_quantity: i64, max_quantity: i64) -> ReorderCandidate {
        ReorderCandidate {
            medicine_id: Uuid::new_v4(),
            medicine: "Augmentin 625mg".to_string(),
            quantity,
            min_quantity,
            max_quantity,
            recent_sales: 12,
        }
    }

    #[test]
    fn test_out_of_stock_is_high() {
        let policy = ReorderPolicy::default();
        assert_eq!(policy.urgency(0, 20), Urgency::High);
        assert_eq!(policy.urgency(10, 20), Urgency::High);
    }

    #[test]
    fn test_three_quarters_of_minimum_is_medium() {
        let policy = ReorderPolicy::default();
        assert_eq!(policy.urgency(15, 20), Urgency::Medium);
    }

    #[test]
    fn test_qualification_boundary() {
        let policy = ReorderPolicy::default();
        assert!(policy.qualifies(30, 20));
        assert!(!policy.qualifies(31, 20));
        assert!(policy.qualifies(0, 0));
    }

    #[test]
    fn test_refill_to_max_wins() {
        let policy = ReorderPolicy::default();
        let rec = policy.recommend(&candidate(10, 20, 200), 100);
        // refill 190 vs 30 + 10
        assert_eq!(rec.reorder_qty, 190);
        assert_eq!(rec.est_cost, Decimal::from(9500));
        assert_eq!(rec.monthly_sales, 12);
    }

    #[test]
    fn test_buffer_wins_for_fast_movers() {
        let policy = ReorderPolicy::default();
        let rec = policy.recommend(&candidate(25, 20, 40), 945);
        // refill 15 vs round(283.5) + round(94.5)
        let expected = (945.0_f64 * 0.3).round() as i64 + (945.0_f64 * 0.1).round() as i64;
        assert_eq!(rec.reorder_qty, expected);
        assert_eq!(rec.urgency, Urgency::Medium);
    }

    #[test]
    fn test_rank_by_shortfall_descending() {
        let policy = ReorderPolicy::default();
        let mut recs = vec![
            policy.recommend(&candidate(25, 20, 100), 10),
            policy.recommend(&candidate(0, 20, 100), 10),
            policy.recommend(&candidate(10, 40, 100), 10),
        ];
        rank(&mut recs);
        let shortfalls: Vec<i64> = recs.iter().map(|r| r.shortfall()).collect();
        assert_eq!(shortfalls, vec![30, 20, -5]);
    }
}
