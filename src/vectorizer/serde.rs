use ::serde::{de::DeserializeOwned, Deserialize, Serialize};
use num::Float;

use crate::{
    error::Result,
    vectorizer::{
        corpus::VectorSpace, document::Tagged, tfidf::TFIDFEngine, DocumentVectors, TFIDFVectorizer,
    },
};

/// Serializable snapshot of a vectorized collection
///
/// Holds the vector space and every document vector but not the documents
/// themselves, so it can be cached apart from the content and reattached with
/// `into_vectorizer`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct TFIDFData<N = f64>
where
    N: Float + Into<f64>,
{
    /// vocabulary and idf
    pub space: VectorSpace<N>,
    /// document id -> normalized vector
    pub vectors: DocumentVectors<N>,
}

impl<N> TFIDFData<N>
where
    N: Float + Into<f64>,
{
    /// Encode as CBOR
    pub fn to_cbor(&self) -> Result<Vec<u8>>
    where
        N: Serialize,
    {
        Ok(serde_cbor::to_vec(self)?)
    }

    /// Decode from CBOR
    /// the content is not validated until `into_vectorizer`
    pub fn from_cbor(bytes: &[u8]) -> Result<Self>
    where
        N: DeserializeOwned,
    {
        Ok(serde_cbor::from_slice(bytes)?)
    }

    /// Reattach the documents and get a ready vectorizer back.
    ///
    /// # Errors
    /// Invalid vector spaces and vectors whose length differs from the
    /// vocabulary size are rejected.
    pub fn into_vectorizer<'a, D, E>(
        self,
        documents: &'a [D],
    ) -> Result<TFIDFVectorizer<'a, D, N, E>>
    where
        D: Tagged,
        E: TFIDFEngine<N>,
    {
        let vectorizer = TFIDFVectorizer::from_parts(documents, self.space, self.vectors)?;
        tracing::debug!(
            doc_num = vectorizer.doc_num(),
            dim = vectorizer.space().dim(),
            "restored vectorizer from snapshot"
        );
        Ok(vectorizer)
    }
}

impl<D, N, E> TFIDFVectorizer<'_, D, N, E>
where
    D: Tagged,
    N: Float + Into<f64>,
    E: TFIDFEngine<N>,
{
    /// Copy the computed state into a serializable snapshot
    pub fn to_data(&self) -> TFIDFData<N> {
        TFIDFData {
            space: self.space.clone(),
            vectors: self.vectors.clone(),
        }
    }
}
