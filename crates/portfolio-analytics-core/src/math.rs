//! Small Decimal linear-algebra and statistics helpers shared by the
//! series, allocation and performance modules.

use rust_decimal::Decimal;
use rust_decimal::MathematicalOps;

/// Dot product.
pub fn vec_dot(a: &[Decimal], b: &[Decimal]) -> Decimal {
    a.iter().zip(b.iter()).map(|(x, y)| *x * *y).sum()
}

/// Dot product; `None` if any product or partial sum overflows.
pub fn checked_vec_dot(a: &[Decimal], b: &[Decimal]) -> Option<Decimal> {
    a.iter()
        .zip(b.iter())
        .try_fold(Decimal::ZERO, |acc, (x, y)| acc.checked_add(x.checked_mul(*y)?))
}

/// Matrix-vector multiplication.
pub fn mat_vec_multiply(mat: &[Vec<Decimal>], v: &[Decimal]) -> Vec<Decimal> {
    mat.iter().map(|row| vec_dot(row, v)).collect()
}

/// Quadratic form w' * Sigma * w.
pub fn quadratic_form(w: &[Decimal], sigma: &[Vec<Decimal>]) -> Decimal {
    vec_dot(w, &mat_vec_multiply(sigma, w))
}

/// Arithmetic mean; zero for an empty slice.
pub fn mean(values: &[Decimal]) -> Decimal {
    if values.is_empty() {
        return Decimal::ZERO;
    }
    let sum: Decimal = values.iter().sum();
    sum / Decimal::from(values.len() as i64)
}

/// Sample variance (n-1 denominator)
pub fn sample_variance(data: &[Decimal], mean: Decimal) -> Decimal {
    let n = data.len();
    if n < 2 {
        return Decimal::ZERO;
    }
    let sum_sq: Decimal = data.iter().map(|x| (x - mean) * (x - mean)).sum();
    sum_sq / Decimal::from((n - 1) as i64)
}

/// Per-column means of a row-major observation matrix.
pub fn column_means(rows: &[Vec<Decimal>], n_cols: usize) -> Vec<Decimal> {
    if rows.is_empty() {
        return vec![Decimal::ZERO; n_cols];
    }
    let n = Decimal::from(rows.len() as i64);
    (0..n_cols)
        .map(|j| rows.iter().map(|row| row[j]).sum::<Decimal>() / n)
        .collect()
}

/// Sample covariance matrix (n-1) of a row-major observation matrix.
#[allow(clippy::needless_range_loop)]
pub fn sample_covariance_matrix(rows: &[Vec<Decimal>], n_cols: usize) -> Vec<Vec<Decimal>> {
    let mut cov = vec![vec![Decimal::ZERO; n_cols]; n_cols];
    let t = rows.len();
    if t < 2 {
        return cov;
    }
    let means = column_means(rows, n_cols);
    let denom = Decimal::from((t - 1) as i64);
    for i in 0..n_cols {
        for j in i..n_cols {
            let sum: Decimal = rows
                .iter()
                .map(|row| (row[i] - means[i]) * (row[j] - means[j]))
                .sum();
            let c = sum / denom;
            cov[i][j] = c;
            cov[j][i] = c;
        }
    }
    cov
}

/// Square root; zero for non-positive input.
pub fn sqrt_decimal(val: Decimal) -> Decimal {
    if val <= Decimal::ZERO {
        return Decimal::ZERO;
    }
    val.sqrt().unwrap_or(Decimal::ZERO)
}

#[cfg(test)]
mod tests {
    use super::*;
    use rust_decimal_macros::dec;

    #[test]
    fn test_dot_and_quadratic_form() {
        let w = vec![dec!(0.5), dec!(0.5)];
        let sigma = vec![vec![dec!(0.04), dec!(0.01)], vec![dec!(0.01), dec!(0.09)]];
        assert_eq!(vec_dot(&w, &[dec!(0.1), dec!(0.2)]), dec!(0.15));
        // 0.25*0.04 + 2*0.25*0.01 + 0.25*0.09 = 0.0375
        assert_eq!(quadratic_form(&w, &sigma), dec!(0.0375));
    }

    #[test]
    fn test_checked_dot_reports_overflow() {
        assert_eq!(
            checked_vec_dot(&[dec!(2), dec!(3)], &[dec!(4), dec!(5)]),
            Some(dec!(23))
        );
        assert_eq!(checked_vec_dot(&[Decimal::MAX, Decimal::MAX], &[dec!(1), dec!(1)]), None);
        assert_eq!(checked_vec_dot(&[Decimal::MAX], &[dec!(2)]), None);
    }

    #[test]
    fn test_sample_covariance_matrix() {
        let rows = vec![
            vec![dec!(1), dec!(2)],
            vec![dec!(2), dec!(4)],
            vec![dec!(3), dec!(6)],
        ];
        let cov = sample_covariance_matrix(&rows, 2);
        assert_eq!(cov[0][0], dec!(1));
        assert_eq!(cov[1][1], dec!(4));
        assert_eq!(cov[0][1], dec!(2));
        assert_eq!(cov[1][0], cov[0][1]);
    }

    #[test]
    fn test_covariance_single_row_is_zero() {
        let cov = sample_covariance_matrix(&[vec![dec!(0.1), dec!(0.2)]], 2);
        assert!(cov.iter().flatten().all(|c| c.is_zero()));
    }

    #[test]
    fn test_sqrt_decimal() {
        assert!((sqrt_decimal(dec!(0.0144)) - dec!(0.12)).abs() < dec!(0.0000000001));
        assert_eq!(sqrt_decimal(dec!(-1)), Decimal::ZERO);
        assert_eq!(sqrt_decimal(Decimal::ZERO), Decimal::ZERO);
    }

    #[test]
    fn test_mean_and_variance() {
        let xs = vec![dec!(1), dec!(2), dec!(3), dec!(4)];
        let m = mean(&xs);
        assert_eq!(m, dec!(2.5));
        // Sum of squares 5 / 3
        assert_eq!(sample_variance(&xs, m), dec!(5) / dec!(3));
        assert_eq!(mean(&[]), Decimal::ZERO);
    }
}
