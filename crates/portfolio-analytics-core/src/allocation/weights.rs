use rust_decimal::Decimal;
use serde::{Deserialize, Serialize};
use std::ops::Deref;

use crate::error::PortfolioError;
use crate::PortfolioResult;

/// Non-negative per-asset weights summing to one, in the asset order of the
/// series they apply to.
///
/// Build one with [`normalize_weights`], [`equal_weights`] or the max-Sharpe
/// optimizer rather than from raw slider values.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(transparent)]
pub struct WeightVector(Vec<Decimal>);

impl WeightVector {
    pub(crate) fn from_normalized(weights: Vec<Decimal>) -> Self {
        Self(weights)
    }

    pub fn as_slice(&self) -> &[Decimal] {
        &self.0
    }

    pub fn into_inner(self) -> Vec<Decimal> {
        self.0
    }

    pub fn total(&self) -> Decimal {
        self.0.iter().sum()
    }

    /// Herfindahl-Hirschman index of the weights.
    pub fn hhi(&self) -> Decimal {
        self.0.iter().map(|w| *w * *w).sum()
    }
}

impl Deref for WeightVector {
    type Target = [Decimal];

    fn deref(&self) -> &[Decimal] {
        &self.0
    }
}

impl From<WeightVector> for Vec<Decimal> {
    fn from(w: WeightVector) -> Self {
        w.0
    }
}

/// Scale raw allocation inputs so they sum to one.
///
/// A zero total cannot be normalized and is reported as
/// [`PortfolioError::InvalidAllocation`] so the caller can ask for new input.
pub fn normalize_weights(raw: &[Decimal]) -> PortfolioResult<WeightVector> {
    if let Some((i, w)) = raw.iter().enumerate().find(|(_, w)| **w < Decimal::ZERO) {
        return Err(PortfolioError::InvalidInput {
            field: format!("weights[{}]", i),
            reason: format!("Weights must be non-negative, got {}", w),
        });
    }

    let total: Decimal = raw.iter().sum();
    if total.is_zero() {
        return Err(PortfolioError::InvalidAllocation(
            "All weights are zero; assign a positive weight to at least one asset".into(),
        ));
    }

    Ok(WeightVector(raw.iter().map(|w| *w / total).collect()))
}

/// Equal weights for n assets.
pub fn equal_weights(n: usize) -> PortfolioResult<WeightVector> {
    if n == 0 {
        return Err(PortfolioError::InsufficientData(
            "At least one asset required".into(),
        ));
    }
    let w = Decimal::ONE / Decimal::from(n as i64);
    Ok(WeightVector(vec![w; n]))
}

#[cfg(test)]
mod tests {
    use super::*;
    use pretty_assertions::assert_eq;
    use rust_decimal_macros::dec;

    #[test]
    fn test_normalize_simple() {
        let w = normalize_weights(&[dec!(0.2), dec!(0.3)]).unwrap();
        assert_eq!(w.as_slice(), &[dec!(0.4), dec!(0.6)]);
        assert!((w.total() - Decimal::ONE).abs() < dec!(0.000000001));
    }

    #[test]
    fn test_normalize_already_normalized() {
        let w = normalize_weights(&[dec!(0.25), dec!(0.25), dec!(0.5)]).unwrap();
        assert_eq!(w.into_inner(), vec![dec!(0.25), dec!(0.25), dec!(0.5)]);
    }

    #[test]
    fn test_normalize_all_zero() {
        let err = normalize_weights(&[dec!(0), dec!(0), dec!(0)]).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidAllocation(_)));
    }

    #[test]
    fn test_normalize_empty_is_invalid_allocation() {
        assert!(matches!(
            normalize_weights(&[]),
            Err(PortfolioError::InvalidAllocation(_))
        ));
    }

    #[test]
    fn test_normalize_negative_rejected() {
        let err = normalize_weights(&[dec!(0.5), dec!(-0.1)]).unwrap_err();
        assert!(matches!(err, PortfolioError::InvalidInput { .. }));
    }

    #[test]
    fn test_normalize_zero_entries_kept() {
        let w = normalize_weights(&[dec!(0), dec!(0.5)]).unwrap();
        assert_eq!(w.as_slice(), &[dec!(0), dec!(1)]);
    }

    #[test]
    fn test_equal_weights() {
        let w = equal_weights(4).unwrap();
        assert_eq!(w.len(), 4);
        assert!(w.iter().all(|x| *x == dec!(0.25)));
        assert_eq!(w.hhi(), dec!(0.25));
        assert!(equal_weights(0).is_err());
    }

    #[test]
    fn test_weight_vector_serializes_as_array() {
        let w = normalize_weights(&[dec!(1), dec!(3)]).unwrap();
        let json = serde_json::to_value(&w).unwrap();
        assert!(json.is_array());
        assert_eq!(json.as_array().unwrap().len(), 2);
    }
}
