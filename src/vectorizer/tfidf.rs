use num::{Float, NumCast};

use crate::{
    utils::math::vector::DenseVec,
    vectorizer::{corpus::VectorSpace, term::TermFrequency},
};

/// TF-IDF calculation engine
///
/// Plug a different strategy into the vectorizer by implementing this trait.
/// The provided `tf_idf_vec` drives the whole per-document pipeline; most
/// engines only need to override the two weight functions.
pub trait TFIDFEngine<N>
where
    N: Float + Into<f64>,
{
    /// IDF weight of a term
    ///
    /// # Arguments
    /// * `doc_num` - total number of documents
    /// * `doc_freq` - number of documents containing the term
    fn idf(doc_num: u64, doc_freq: u64) -> N;

    /// TF weight of a term occurring `count` times in one document
    fn tf(count: u64) -> N;

    /// Build the L2-normalized TF-IDF vector of one document
    ///
    /// Terms outside the space are ignored. A document with no known terms
    /// yields the zero vector.
    ///
    /// # Returns
    /// * `Vec<N>` - dense vector of length `space.dim()`
    fn tf_idf_vec(freq: &TermFrequency, space: &VectorSpace<N>) -> Vec<N> {
        let mut vec = vec![N::zero(); space.dim()];
        for (term, count) in freq.iter() {
            if let Some(idx) = space.index_of(term) {
                let idf = space.idf_at(idx).unwrap_or_else(N::zero);
                vec[idx] = vec[idx] + Self::tf(count) * idf;
            }
        }
        vec.normalize_l2();
        vec
    }
}

/// Default TF-IDF engine
/// raw term counts and smoothed idf `ln((N + 1) / (df + 1)) + 1`
///
/// The smoothed idf stays strictly positive even for a term present in
/// every document, and is defined for `df = 0`.
#[derive(Debug, Clone, Copy, Default)]
pub struct DefaultTFIDFEngine;

impl DefaultTFIDFEngine {
    pub fn new() -> Self {
        DefaultTFIDFEngine
    }
}

impl<N> TFIDFEngine<N> for DefaultTFIDFEngine
where
    N: Float + Into<f64>,
{
    #[inline]
    fn idf(doc_num: u64, doc_freq: u64) -> N {
        let idf = ((doc_num as f64 + 1.0) / (doc_freq as f64 + 1.0)).ln() + 1.0;
        <N as NumCast>::from(idf).unwrap_or_else(N::one)
    }

    #[inline]
    fn tf(count: u64) -> N {
        <N as NumCast>::from(count).unwrap_or_else(N::zero)
    }
}
