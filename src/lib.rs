/// This crate is a related-content recommendation engine
/// using a TF-IDF vectorizer over document tags.
pub mod config;
pub mod error;
pub mod utils;
pub mod vectorizer;

/// Related documents
/// Rank every other document of a collection by cosine similarity of their
/// TF-IDF tag vectors and return the best `count`.
///
/// `get_related` rebuilds the vocabulary and vectors on every call, which is
/// cheap for the tens to hundreds of posts of a blog. `get_related_with`
/// takes a [`RelatedConfig`] instead of a bare count.
pub use vectorizer::evaluate::scoring::{get_related, get_related_with};

/// TF-IDF Vectorizer
/// Vectorizes a borrowed document collection once and answers repeated
/// queries (`related`, `related_to_tags`, `similarity_between`).
///
/// Internally, it holds:
/// - The vector space (sorted vocabulary and IDF weights)
/// - One L2-normalized dense vector per document id
///
/// # Serialization
/// Use `to_data` to get a [`TFIDFData`] snapshot.
pub use vectorizer::TFIDFVectorizer;

/// Vectorization building blocks
/// `build_vocabulary` derives the vocabulary and IDF weights,
/// `vectorize` turns every document into a normalized vector in that space.
pub use vectorizer::{corpus::build_vocabulary, vectorize, DocumentVectors};

/// TF-IDF Vectorizer Data Structure for Serialization
/// Holds the vector space and document vectors without the documents.
/// Convert it back with `into_vectorizer`.
///
/// # Serialization
/// Supported (any serde format, CBOR helpers included).
pub use vectorizer::serde::TFIDFData;

/// Document frequency table and vector space
/// `Corpus` counts, per tag, the documents containing it.
/// `VectorSpace` is the sorted vocabulary with one IDF weight per term.
pub use vectorizer::corpus::{Corpus, VectorSpace};

/// Document contract
/// `Tagged` is all the engine needs from a content item: an id and tags.
/// `Document` is the plain implementation.
pub use vectorizer::document::{Document, Tagged};

/// Term Frequency structure
/// Counts tag occurrences inside one document.
pub use vectorizer::term::TermFrequency;

/// TF IDF Calculation Engine Trait
/// `DefaultTFIDFEngine` uses raw counts and the smoothed IDF
/// `ln((N + 1) / (df + 1)) + 1`.
pub use vectorizer::tfidf::{DefaultTFIDFEngine, TFIDFEngine};

/// Ranking results
/// - `Hits`: list of results with sorting helpers
/// - `HitEntry`: one document reference and its similarity
/// - `TieBreak`: ordering among exactly equal similarities
pub use vectorizer::evaluate::scoring::{HitEntry, Hits, TieBreak};

pub use config::{RelatedConfig, DEFAULT_RELATED_COUNT};
pub use error::{Error, Result};
