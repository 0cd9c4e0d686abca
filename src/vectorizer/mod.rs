pub mod corpus;
pub mod document;
pub mod evaluate;
pub mod serde;
pub mod term;
pub mod tfidf;

use std::{
    borrow::Cow,
    collections::{HashMap, HashSet},
    marker::PhantomData,
};

use indexmap::IndexMap;
use num::Float;

use crate::{
    error::{Error, Result},
    utils::math::vector::DenseVec,
    vectorizer::{
        corpus::{build_vocabulary_with, VectorSpace},
        document::Tagged,
        term::TermFrequency,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
    },
};

/// document id -> L2-normalized TF-IDF vector
pub type DocumentVectors<N> = IndexMap<String, Vec<N>>;

/// Vectorize every document against a vector space with the default engine.
///
/// Each tag occurrence adds its count at the tag's index, the result is
/// weighted by IDF and L2-normalized. Tags outside the space are ignored and a
/// document with no known tags maps to the zero vector.
///
/// If two documents share an id the later one's vector is kept.
pub fn vectorize<D, N>(documents: &[D], space: &VectorSpace<N>) -> DocumentVectors<N>
where
    D: Tagged,
    N: Float + Into<f64>,
{
    vectorize_with::<D, N, DefaultTFIDFEngine>(documents, space)
}

/// Same as [`vectorize`] with a custom engine
pub fn vectorize_with<D, N, E>(documents: &[D], space: &VectorSpace<N>) -> DocumentVectors<N>
where
    D: Tagged,
    N: Float + Into<f64>,
    E: TFIDFEngine<N>,
{
    let mut vectors: DocumentVectors<N> = IndexMap::with_capacity(documents.len());
    for doc in documents {
        let freq = TermFrequency::from(doc.tags());
        let vec = E::tf_idf_vec(&freq, space);
        if vectors.insert(doc.id().to_string(), vec).is_some() {
            tracing::warn!(id = doc.id(), "duplicate document id, keeping the later vector");
        }
    }
    tracing::debug!(doc_num = vectors.len(), dim = space.dim(), "vectorized documents");
    vectors
}

/// Fail on the first repeated document id
pub fn check_unique_ids<D>(documents: &[D]) -> Result<()>
where
    D: Tagged,
{
    let mut seen: HashSet<&str> = HashSet::with_capacity(documents.len());
    for doc in documents {
        if !seen.insert(doc.id()) {
            return Err(Error::DuplicateDocumentId(doc.id().to_string()));
        }
    }
    Ok(())
}

/// Input positions whose id reappears later in the collection.
/// The keyed vector of such an id belongs to its last document, not to these.
pub fn shadowed_positions<D>(documents: &[D]) -> HashSet<usize>
where
    D: Tagged,
{
    let mut last: HashMap<&str, usize> = HashMap::with_capacity(documents.len());
    let mut shadowed = HashSet::new();
    for (pos, doc) in documents.iter().enumerate() {
        if let Some(prev) = last.insert(doc.id(), pos) {
            shadowed.insert(prev);
        }
    }
    shadowed
}

/// TF-IDF Vectorizer over one document collection
///
/// Builds the vocabulary, IDF weights and every document vector once, then
/// answers any number of queries through `&self`. This is the caller-side
/// cache for when one corpus is queried repeatedly; [`get_related`] rebuilds
/// everything per call instead.
///
/// `TFIDFVectorizer<'a, D, N, E>` has the following generic parameters:
/// - `D`: document type, anything implementing [`Tagged`]
/// - `N`: vector element type (`f32` or `f64`)
/// - `E`: TF-IDF calculation engine
///
/// [`get_related`]: crate::get_related
#[derive(Debug, Clone)]
pub struct TFIDFVectorizer<'a, D, N = f64, E = DefaultTFIDFEngine>
where
    N: Float + Into<f64>,
    E: TFIDFEngine<N>,
{
    /// borrowed input collection, handed back in results
    documents: &'a [D],
    /// vocabulary and IDF
    pub space: VectorSpace<N>,
    /// per-document vectors keyed by id
    pub vectors: DocumentVectors<N>,
    /// positions scored from their own tags, see [`shadowed_positions`]
    shadowed: HashSet<usize>,
    _marker: PhantomData<E>,
}

impl<'a, D, N, E> TFIDFVectorizer<'a, D, N, E>
where
    D: Tagged,
    N: Float + Into<f64>,
    E: TFIDFEngine<N>,
{
    /// Vectorize a document collection
    pub fn new(documents: &'a [D]) -> Self {
        let space = build_vocabulary_with::<D, N, E>(documents);
        let vectors = vectorize_with::<D, N, E>(documents, &space);
        Self {
            documents,
            space,
            vectors,
            shadowed: shadowed_positions(documents),
            _marker: PhantomData,
        }
    }

    /// Vectorize a document collection, rejecting repeated ids
    pub fn try_new_strict(documents: &'a [D]) -> Result<Self> {
        check_unique_ids(documents)?;
        Ok(Self::new(documents))
    }

    /// Reassemble a vectorizer from precomputed parts.
    ///
    /// The space is validated and every vector must have the space's
    /// dimension. Documents without a stored vector are treated as zero
    /// vectors when ranked.
    pub fn from_parts(
        documents: &'a [D],
        space: VectorSpace<N>,
        vectors: DocumentVectors<N>,
    ) -> Result<Self> {
        space.validate()?;
        for (id, vec) in &vectors {
            if vec.len() != space.dim() {
                return Err(Error::DimensionMismatch {
                    id: id.clone(),
                    expected: space.dim(),
                    actual: vec.len(),
                });
            }
        }
        Ok(Self {
            documents,
            space,
            vectors,
            shadowed: shadowed_positions(documents),
            _marker: PhantomData,
        })
    }

    /// The collection this vectorizer was built from
    #[inline]
    pub fn documents(&self) -> &'a [D] {
        self.documents
    }

    #[inline]
    pub fn space(&self) -> &VectorSpace<N> {
        &self.space
    }

    /// Get a document vector by id
    #[inline]
    pub fn vector(&self, id: &str) -> Option<&[N]> {
        self.vectors.get(id).map(Vec::as_slice)
    }

    /// Number of vectorized documents (distinct ids)
    #[inline]
    pub fn doc_num(&self) -> usize {
        self.vectors.len()
    }

    #[inline]
    pub fn contains_doc(&self, id: &str) -> bool {
        self.vectors.contains_key(id)
    }

    /// Vector of the document at `pos` in the collection.
    ///
    /// Equals the keyed vector unless a later document reuses the id, in which
    /// case the document's own tags are vectorized again.
    pub(crate) fn vector_at(&self, pos: usize, doc: &D) -> Option<Cow<'_, [N]>> {
        if self.shadowed.contains(&pos) {
            return Some(Cow::Owned(self.vectorize_tags(doc.tags())));
        }
        self.vectors.get(doc.id()).map(|vec| Cow::Borrowed(vec.as_slice()))
    }

    /// Cosine similarity between two indexed documents.
    /// `None` if either id is unknown.
    pub fn similarity_between(&self, a: &str, b: &str) -> Option<f64> {
        let a = self.vectors.get(a)?;
        let b = self.vectors.get(b)?;
        Some(a.cosine_similarity(b))
    }

    /// Vectorize an ad-hoc tag list in this collection's space
    pub fn vectorize_tags<T>(&self, tags: &[T]) -> Vec<N>
    where
        T: AsRef<str>,
    {
        E::tf_idf_vec(&TermFrequency::from(tags), &self.space)
    }
}
