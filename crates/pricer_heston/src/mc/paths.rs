//! Append-only path storage.

/// Simulated values indexed by time step (rows) and path (columns).
///
/// Row 0 holds the initial value for every path. Rows are appended in time
/// order and are never modified once written.
///
/// # Examples
///
/// ```rust
/// use pricer_heston::mc::PathMatrix;
///
/// let mut paths = PathMatrix::with_initial(2.0, 3, 2);
/// paths.push_row_with(|prev, next| {
///     for (n, p) in next.iter_mut().zip(prev) {
///         *n = p * 2.0;
///     }
/// });
/// assert_eq!(paths.row(1), &[4.0, 4.0, 4.0]);
/// assert_eq!(paths.terminal(), &[4.0, 4.0, 4.0]);
/// ```
#[derive(Clone, Debug, PartialEq)]
pub struct PathMatrix {
    n_paths: usize,
    data: Vec<f64>,
}

impl PathMatrix {
    /// Creates a matrix whose row 0 is `initial` on every path, with room
    /// for `n_steps` further rows.
    pub fn with_initial(initial: f64, n_paths: usize, n_steps: usize) -> Self {
        let mut data = Vec::with_capacity(n_paths * (n_steps + 1));
        data.resize(n_paths, initial);
        Self { n_paths, data }
    }

    /// Appends a row computed from the previous one.
    ///
    /// `fill(prev, next)` receives the last written row and a zeroed slot for
    /// the new row.
    pub fn push_row_with<F>(&mut self, fill: F)
    where
        F: FnOnce(&[f64], &mut [f64]),
    {
        let start = self.data.len();
        self.data.resize(start + self.n_paths, 0.0);
        let (head, next) = self.data.split_at_mut(start);
        let prev = &head[start - self.n_paths..];
        fill(prev, next);
    }

    /// Appends a fully computed row.
    pub fn push_row(&mut self, row: &[f64]) {
        debug_assert_eq!(row.len(), self.n_paths);
        self.data.extend_from_slice(row);
    }

    /// Number of paths.
    #[inline]
    pub fn n_paths(&self) -> usize {
        self.n_paths
    }

    /// Number of steps written after the initial row.
    #[inline]
    pub fn n_steps(&self) -> usize {
        self.n_rows() - 1
    }

    /// Number of rows, including the initial row.
    #[inline]
    pub fn n_rows(&self) -> usize {
        if self.n_paths == 0 {
            1
        } else {
            self.data.len() / self.n_paths
        }
    }

    /// Row `step`.
    #[inline]
    pub fn row(&self, step: usize) -> &[f64] {
        let start = step * self.n_paths;
        &self.data[start..start + self.n_paths]
    }

    /// Last written row.
    #[inline]
    pub fn terminal(&self) -> &[f64] {
        self.row(self.n_rows() - 1)
    }

    /// Value at (step, path).
    #[inline]
    pub fn get(&self, step: usize, path: usize) -> f64 {
        self.data[step * self.n_paths + path]
    }

    /// Flat view in row-major order.
    #[inline]
    pub fn as_slice(&self) -> &[f64] {
        &self.data
    }

    /// Iterator over rows in time order.
    pub fn rows(&self) -> impl Iterator<Item = &[f64]> {
        self.data.chunks_exact(self.n_paths.max(1))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_initial_row() {
        let paths = PathMatrix::with_initial(0.04, 5, 10);
        assert_eq!(paths.n_paths(), 5);
        assert_eq!(paths.n_rows(), 1);
        assert_eq!(paths.n_steps(), 0);
        assert_eq!(paths.row(0), &[0.04; 5]);
        assert_eq!(paths.terminal(), &[0.04; 5]);
    }

    #[test]
    fn test_rows_append_in_order() {
        let mut paths = PathMatrix::with_initial(1.0, 2, 3);
        for step in 1..=3 {
            paths.push_row_with(|prev, next| {
                next[0] = prev[0] + step as f64;
                next[1] = prev[1] * 2.0;
            });
        }

        assert_eq!(paths.n_steps(), 3);
        assert_eq!(paths.row(1), &[2.0, 2.0]);
        assert_eq!(paths.row(2), &[4.0, 4.0]);
        assert_eq!(paths.row(3), &[7.0, 8.0]);
        assert_eq!(paths.get(3, 1), 8.0);
        assert_eq!(paths.rows().count(), 4);
    }

    #[test]
    fn test_push_row() {
        let mut paths = PathMatrix::with_initial(0.0, 3, 1);
        paths.push_row(&[1.0, 2.0, 3.0]);
        assert_eq!(paths.terminal(), &[1.0, 2.0, 3.0]);
        assert_eq!(paths.as_slice(), &[0.0, 0.0, 0.0, 1.0, 2.0, 3.0]);
    }
}
