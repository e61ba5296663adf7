use ndarray::Array2;

pub struct MatrixHelper;

impl MatrixHelper {
    /// Solve the square system `a * x = b` by Gaussian elimination with
    /// partial pivoting. `None` when the matrix is singular to working
    /// precision.
    pub fn solve(a: &Array2<f64>, b: &[f64]) -> Option<Vec<f64>> {
        let n = a.nrows();
        if a.ncols() != n || b.len() != n {
            return None;
        }

        let mut m = a.clone();
        let mut rhs = b.to_vec();

        for col in 0..n {
            let pivot_row = (col..n).max_by(|&r1, &r2| {
                m[(r1, col)].abs().total_cmp(&m[(r2, col)].abs())
            })?;
            if m[(pivot_row, col)].abs() < 1e-12 {
                return None;
            }
            if pivot_row != col {
                for k in 0..n {
                    let tmp = m[(col, k)];
                    m[(col, k)] = m[(pivot_row, k)];
                    m[(pivot_row, k)] = tmp;
                }
                rhs.swap(col, pivot_row);
            }

            for row in col + 1..n {
                let factor = m[(row, col)] / m[(col, col)];
                for k in col..n {
                    m[(row, k)] -= factor * m[(col, k)];
                }
                rhs[row] -= factor * rhs[col];
            }
        }

        let mut x = vec![0.0; n];
        for row in (0..n).rev() {
            let mut sum = rhs[row];
            for k in row + 1..n {
                sum -= m[(row, k)] * x[k];
            }
            x[row] = sum / m[(row, row)];
        }
        Some(x)
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use ndarray::array;

    #[test]
    fn solve_recovers_known_solution() {
        let a = array![[2.0, 1.0], [1.0, 3.0]];
        let b = [5.0, 10.0];
        let x = MatrixHelper::solve(&a, &b).unwrap();
        assert!((x[0] - 1.0).abs() < 1e-12);
        assert!((x[1] - 3.0).abs() < 1e-12);
    }

    #[test]
    fn solve_rejects_singular_matrix() {
        let a = array![[1.0, 2.0], [2.0, 4.0]];
        assert!(MatrixHelper::solve(&a, &[1.0, 2.0]).is_none());
    }

    #[test]
    fn solve_pivots_on_zero_diagonal() {
        let a = array![[0.0, 1.0], [1.0, 0.0]];
        let x = MatrixHelper::solve(&a, &[2.0, 3.0]).unwrap();
        assert!((x[0] - 3.0).abs() < 1e-12);
        assert!((x[1] - 2.0).abs() < 1e-12);
    }
}
