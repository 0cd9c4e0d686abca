use num::{Float, NumCast};

/// Dense vector operations used for document vectors.
///
/// Implemented for slices so both `Vec<N>` and borrowed rows can use it.
/// Accumulation is always done in `f64` regardless of `N`.
pub trait DenseVec<N>
where
    N: Float + Into<f64>,
{
    /// ドット積を計算するメソッド
    ///
    /// # Arguments
    /// * `other` - 他のベクトル
    ///
    /// # Returns
    /// * `f64` - Σ(a_i * b_i)
    fn dot(&self, other: &Self) -> f64;

    /// Squared Euclidean norm
    fn norm_sq(&self) -> f64;

    /// Euclidean norm
    /// ||a|| = sqrt(Σ(a_i^2))
    fn norm(&self) -> f64 {
        self.norm_sq().sqrt()
    }

    /// Scale the vector in place so its Euclidean norm is 1.
    /// A zero vector is left untouched.
    ///
    /// # Returns
    /// * `f64` - the norm before normalization
    fn normalize_l2(&mut self) -> f64;

    /// コサイン類似度
    /// cos(θ) = Σ(a_i * b_i) / (||a|| * ||b||)
    ///
    /// Returns `0.0` when either side has zero norm, never NaN.
    /// The result is clamped to `[-1.0, 1.0]` to absorb rounding drift.
    fn cosine_similarity(&self, other: &Self) -> f64;
}

impl<N> DenseVec<N> for [N]
where
    N: Float + Into<f64>,
{
    #[inline]
    fn dot(&self, other: &Self) -> f64 {
        debug_assert_eq!(
            self.len(),
            other.len(),
            "Vectors must be of the same length to compute dot product."
        );
        self.iter()
            .zip(other.iter())
            .map(|(&a, &b)| a.into() * b.into())
            .sum()
    }

    #[inline]
    fn norm_sq(&self) -> f64 {
        self.iter()
            .map(|&a| {
                let a: f64 = a.into();
                a * a
            })
            .sum()
    }

    fn normalize_l2(&mut self) -> f64 {
        let norm = self.norm();
        // ゼロ除算回避
        if norm == 0.0 || !norm.is_finite() {
            return norm;
        }
        let inv = <N as NumCast>::from(1.0 / norm).unwrap_or_else(N::zero);
        for v in self.iter_mut() {
            *v = *v * inv;
        }
        norm
    }

    fn cosine_similarity(&self, other: &Self) -> f64 {
        let self_norm = self.norm();
        let other_norm = other.norm();
        if self_norm == 0.0 || other_norm == 0.0 {
            return 0.0;
        }
        let score = self.dot(other) / (self_norm * other_norm);
        if score.is_nan() {
            return 0.0;
        }
        score.clamp(-1.0, 1.0)
    }
}
