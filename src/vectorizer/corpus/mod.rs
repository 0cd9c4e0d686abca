use std::collections::HashMap;

use indexmap::IndexMap;
use num::Float;
use serde::{Deserialize, Serialize};

use crate::{
    error::{Error, Result},
    vectorizer::{
        document::Tagged,
        term::TermFrequency,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
    },
};

/// Document frequency table
/// keeps the document count and, per tag, how many documents contain it
#[derive(Debug, Clone, Default, Serialize, Deserialize)]
pub struct Corpus {
    /// number of documents added
    pub doc_num: u64,
    /// tag -> document frequency
    pub term_counts: IndexMap<Box<str>, u64>,
}

impl Corpus {
    /// Create a new instance
    pub fn new() -> Self {
        Self::default()
    }

    /// Build a corpus from a document collection
    pub fn from_documents<D>(documents: &[D]) -> Self
    where
        D: Tagged,
    {
        let mut corpus = Self::new();
        for doc in documents {
            corpus.add_doc(&TermFrequency::from(doc.tags()));
        }
        corpus
    }

    /// Add one document's distinct terms
    /// the caller must pass each term only once
    pub fn add_set<T>(&mut self, terms: &[T])
    where
        T: AsRef<str>,
    {
        self.doc_num += 1;
        for term in terms {
            let term = term.as_ref();
            if let Some(count) = self.term_counts.get_mut(term) {
                *count += 1;
            } else {
                self.term_counts.insert(term.into(), 1);
            }
        }
    }

    /// Add a document
    /// repeated terms inside the document count once
    pub fn add_doc(&mut self, freq: &TermFrequency) {
        self.add_set(&freq.term_set_ref_str());
    }

    /// Get the number of documents in the corpus
    #[inline]
    pub fn get_doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Document frequency of a term, 0 if unseen
    #[inline]
    pub fn get_term_count(&self, term: &str) -> u64 {
        self.term_counts.get(term).copied().unwrap_or(0)
    }

    /// Get the current vocabulary size (number of unique terms)
    #[inline]
    pub fn vocab_size(&self) -> usize {
        self.term_counts.len()
    }
}

/// Vocabulary and IDF weights of one corpus.
///
/// Terms are kept sorted so that the term -> index mapping does not depend on
/// the order documents were supplied in. Every vocabulary term has exactly one
/// IDF weight by construction.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct VectorSpace<N = f64>
where
    N: Float + Into<f64>,
{
    /// sorted term -> idf
    idf: IndexMap<Box<str>, N>,
    /// document count the weights were derived from
    doc_num: u64,
}

impl<N> VectorSpace<N>
where
    N: Float + Into<f64>,
{
    /// Empty space (no terms)
    pub fn empty() -> Self {
        Self {
            idf: IndexMap::new(),
            doc_num: 0,
        }
    }

    /// Derive the vocabulary and IDF weights from a document frequency table
    pub fn from_corpus<E>(corpus: &Corpus) -> Self
    where
        E: TFIDFEngine<N>,
    {
        let doc_num = corpus.get_doc_num();
        let mut idf: IndexMap<Box<str>, N> = corpus
            .term_counts
            .iter()
            .map(|(term, &doc_freq)| (term.clone(), E::idf(doc_num, doc_freq)))
            .collect();
        idf.sort_unstable_keys();
        Self { idf, doc_num }
    }

    /// Assemble a space from an externally supplied vocabulary and IDF map.
    ///
    /// # Arguments
    /// * `vocabulary` - terms, strictly ascending
    /// * `idf` - one finite positive weight per vocabulary term
    ///
    /// # Errors
    /// Unsorted or duplicated terms, missing or extra IDF entries and
    /// non-finite / non-positive weights are rejected.
    pub fn from_parts<T>(vocabulary: &[T], idf: &HashMap<String, N>) -> Result<Self>
    where
        T: AsRef<str>,
    {
        let mut map: IndexMap<Box<str>, N> = IndexMap::with_capacity(vocabulary.len());
        for term in vocabulary {
            let term = term.as_ref();
            let weight = idf
                .get(term)
                .copied()
                .ok_or_else(|| Error::MissingIdf(term.to_string()))?;
            if map.insert(term.into(), weight).is_some() {
                return Err(Error::DuplicateTerm(term.to_string()));
            }
        }
        if let Some(extra) = idf.keys().find(|term| !map.contains_key(term.as_str())) {
            return Err(Error::UnknownIdfTerm(extra.clone()));
        }
        let space = Self { idf: map, doc_num: 0 };
        space.validate()?;
        Ok(space)
    }

    /// Check the ordering and weight invariants.
    /// Used on every space that did not come out of `from_corpus`.
    pub fn validate(&self) -> Result<()> {
        let mut prev: Option<&str> = None;
        for (term, &weight) in &self.idf {
            let term: &str = term;
            if let Some(prev) = prev {
                match prev.cmp(term) {
                    std::cmp::Ordering::Less => {}
                    std::cmp::Ordering::Equal => return Err(Error::DuplicateTerm(term.to_string())),
                    std::cmp::Ordering::Greater => {
                        return Err(Error::UnsortedVocabulary {
                            prev: prev.to_string(),
                            next: term.to_string(),
                        })
                    }
                }
            }
            let value: f64 = weight.into();
            if !value.is_finite() || value <= 0.0 {
                return Err(Error::InvalidIdf {
                    term: term.to_string(),
                    value,
                });
            }
            prev = Some(term);
        }
        Ok(())
    }

    /// Vector dimension (vocabulary size)
    #[inline]
    pub fn dim(&self) -> usize {
        self.idf.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.idf.is_empty()
    }

    /// Document count the weights were derived from (0 for external spaces)
    #[inline]
    pub fn doc_num(&self) -> u64 {
        self.doc_num
    }

    /// Vocabulary terms in index order
    pub fn vocabulary(&self) -> impl Iterator<Item = &str> {
        self.idf.keys().map(|t| &**t)
    }

    /// Vocabulary as owned strings
    pub fn vocabulary_vec(&self) -> Vec<String> {
        self.vocabulary().map(str::to_string).collect()
    }

    /// Index of a term in the vector
    #[inline]
    pub fn index_of(&self, term: &str) -> Option<usize> {
        self.idf.get_index_of(term)
    }

    /// IDF weight of a term
    #[inline]
    pub fn idf(&self, term: &str) -> Option<N> {
        self.idf.get(term).copied()
    }

    /// IDF weight at a vector index
    #[inline]
    pub fn idf_at(&self, index: usize) -> Option<N> {
        self.idf.get_index(index).map(|(_, &w)| w)
    }

    /// `(term, idf)` pairs in index order
    pub fn iter(&self) -> impl Iterator<Item = (&str, N)> {
        self.idf.iter().map(|(t, &w)| (&**t, w))
    }
}

impl<N> Default for VectorSpace<N>
where
    N: Float + Into<f64>,
{
    fn default() -> Self {
        Self::empty()
    }
}

/// Build the vocabulary and IDF weights of a document collection
/// with the default smoothed IDF.
///
/// An empty collection yields an empty space.
pub fn build_vocabulary<D, N>(documents: &[D]) -> VectorSpace<N>
where
    D: Tagged,
    N: Float + Into<f64>,
{
    build_vocabulary_with::<D, N, DefaultTFIDFEngine>(documents)
}

/// Same as [`build_vocabulary`] with a custom engine
pub fn build_vocabulary_with<D, N, E>(documents: &[D]) -> VectorSpace<N>
where
    D: Tagged,
    N: Float + Into<f64>,
    E: TFIDFEngine<N>,
{
    let corpus = Corpus::from_documents(documents);
    let space = VectorSpace::from_corpus::<E>(&corpus);
    tracing::debug!(
        doc_num = corpus.get_doc_num(),
        vocab_size = space.dim(),
        "built vector space"
    );
    space
}
