use std::fmt::{self, Debug, Display};

use num::Float;
use rayon::prelude::*;
use serde::{Deserialize, Serialize};

use crate::{
    config::RelatedConfig,
    error::Result,
    utils::math::vector::DenseVec,
    vectorizer::{
        document::Tagged,
        tfidf::{DefaultTFIDFEngine, TFIDFEngine},
        TFIDFVectorizer,
    },
};

/// How to order results whose similarity is exactly equal
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum TieBreak {
    /// keep the order documents had in the input collection (stable sort)
    #[default]
    CorpusOrder,
    /// ascending document id
    DocumentId,
}

/// One ranked document
#[derive(Debug, Clone)]
pub struct HitEntry<'a, D> {
    pub document: &'a D,
    /// cosine similarity, `[0, 1]` for tag vectors
    pub similarity: f64,
}

impl<'a, D> HitEntry<'a, D>
where
    D: Tagged,
{
    #[inline]
    pub fn id(&self) -> &'a str {
        self.document.id()
    }
}

/// Structure to store ranking results
pub struct Hits<'a, D> {
    pub list: Vec<HitEntry<'a, D>>,
}

impl<'a, D> Hits<'a, D>
where
    D: Tagged,
{
    /// Create a new Hits instance
    pub fn new(list: Vec<HitEntry<'a, D>>) -> Self {
        Hits { list }
    }

    /// Sort results by descending score
    /// ties are resolved by `tie_break`
    pub fn sort_by_score_desc(&mut self, tie_break: TieBreak) -> &mut Self {
        // Remove NaN scores
        self.list.retain(|hit| !hit.similarity.is_nan());
        match tie_break {
            // sort_by is stable, so equal scores keep input order
            TieBreak::CorpusOrder => {
                self.list.sort_by(|a, b| b.similarity.total_cmp(&a.similarity))
            }
            TieBreak::DocumentId => self.list.sort_by(|a, b| {
                b.similarity
                    .total_cmp(&a.similarity)
                    .then_with(|| a.id().cmp(b.id()))
            }),
        }
        self
    }

    /// Keep the first `count` entries
    pub fn truncate(&mut self, count: usize) -> &mut Self {
        self.list.truncate(count);
        self
    }

    #[inline]
    pub fn len(&self) -> usize {
        self.list.len()
    }

    #[inline]
    pub fn is_empty(&self) -> bool {
        self.list.is_empty()
    }

    pub fn into_vec(self) -> Vec<HitEntry<'a, D>> {
        self.list
    }
}

impl<D> Debug for Hits<'_, D>
where
    D: Tagged,
{
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        if f.alternate() {
            writeln!(f, "Hits [")?;
            for hit in &self.list {
                writeln!(f, "    {:?}: {:.6}", hit.id(), hit.similarity)?;
            }
            write!(f, "]")
        } else {
            f.debug_list()
                .entries(self.list.iter().map(|hit| (hit.id(), hit.similarity)))
                .finish()
        }
    }
}

impl<D> Display for Hits<'_, D>
where
    D: Tagged,
{
    /// one `score<TAB>id` line per hit
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        for hit in &self.list {
            writeln!(f, "{:.6}\t{}", hit.similarity, hit.id())?;
        }
        Ok(())
    }
}

/// Ranking
///
/// Parallel scoring needs the document and element types to be shareable
/// across threads, hence the `Sync` bounds.
impl<'a, D, N, E> TFIDFVectorizer<'a, D, N, E>
where
    D: Tagged + Sync,
    N: Float + Into<f64> + Send + Sync,
    E: TFIDFEngine<N> + Sync,
{
    /// Rank every other document by similarity to `target_id`.
    ///
    /// Returns at most `count` entries, best first. An unknown target or a
    /// zero count gives an empty list. Documents sharing the target's id are
    /// never included.
    pub fn related(&self, target_id: &str, count: usize) -> Vec<HitEntry<'a, D>> {
        self.related_with(target_id, &RelatedConfig::default().with_count(count))
    }

    /// Same as [`related`](Self::related) with count, tie-break and
    /// parallelism taken from `config`
    pub fn related_with(&self, target_id: &str, config: &RelatedConfig) -> Vec<HitEntry<'a, D>> {
        let Some(target) = self.vectors.get(target_id) else {
            tracing::trace!(target_id, "target not indexed");
            return Vec::new();
        };
        if config.count == 0 {
            return Vec::new();
        }
        let mut hits = self.score_candidates(target, Some(target_id), config.parallel);
        hits.sort_by_score_desc(config.tie_break).truncate(config.count);
        tracing::trace!(target_id, hits = hits.len(), "ranked related documents");
        hits.into_vec()
    }

    /// Rank the whole collection against an ad-hoc tag list,
    /// e.g. a draft that is not part of the collection yet.
    /// Tags unknown to the collection are ignored.
    pub fn related_to_tags<T>(&self, tags: &[T], count: usize) -> Vec<HitEntry<'a, D>>
    where
        T: AsRef<str>,
    {
        if count == 0 {
            return Vec::new();
        }
        let target = self.vectorize_tags(tags);
        let mut hits = self.score_candidates(&target, None, false);
        hits.sort_by_score_desc(TieBreak::default()).truncate(count);
        hits.into_vec()
    }

    /// Cosine similarity of `target` to every document not named `exclude`,
    /// in collection order
    fn score_candidates(&self, target: &[N], exclude: Option<&str>, parallel: bool) -> Hits<'a, D> {
        let documents: &'a [D] = self.documents();
        let score = |(pos, doc): (usize, &'a D)| -> Option<HitEntry<'a, D>> {
            if exclude == Some(doc.id()) {
                return None;
            }
            // 未登録のベクトルはゼロ扱い
            let similarity = self
                .vector_at(pos, doc)
                .map_or(0.0, |vec| target.cosine_similarity(&vec));
            Some(HitEntry { document: doc, similarity })
        };
        let list = if parallel {
            documents.par_iter().enumerate().filter_map(score).collect()
        } else {
            documents.iter().enumerate().filter_map(score).collect()
        };
        Hits::new(list)
    }
}

/// Related documents for `target_id`, best first.
///
/// Vocabulary, IDF weights and vectors are rebuilt from `documents` on every
/// call; build a [`TFIDFVectorizer`] once instead when querying the same
/// collection repeatedly. Never fails: an unknown target, an empty collection
/// or `count == 0` give an empty list.
///
/// # Examples
/// ```
/// use related_tfidf::{get_related, Document};
///
/// let posts = vec![
///     Document::new("a", ["ts", "react"]),
///     Document::new("b", ["ts", "react"]),
///     Document::new("c", ["python"]),
/// ];
/// let related = get_related("a", &posts, 2);
/// assert_eq!(related[0].id(), "b");
/// assert!((related[0].similarity - 1.0).abs() < 1e-9);
/// assert_eq!(related[1].id(), "c");
/// assert_eq!(related[1].similarity, 0.0);
/// ```
pub fn get_related<'a, D>(target_id: &str, documents: &'a [D], count: usize) -> Vec<HitEntry<'a, D>>
where
    D: Tagged + Sync,
{
    TFIDFVectorizer::<'a, D, f64, DefaultTFIDFEngine>::new(documents).related(target_id, count)
}

/// [`get_related`] driven by a [`RelatedConfig`].
///
/// # Errors
/// With `strict_ids` set, a repeated document id is reported as
/// [`Error::DuplicateDocumentId`](crate::Error::DuplicateDocumentId).
pub fn get_related_with<'a, D>(
    target_id: &str,
    documents: &'a [D],
    config: &RelatedConfig,
) -> Result<Vec<HitEntry<'a, D>>>
where
    D: Tagged + Sync,
{
    let vectorizer = if config.strict_ids {
        TFIDFVectorizer::<'a, D, f64, DefaultTFIDFEngine>::try_new_strict(documents)?
    } else {
        TFIDFVectorizer::<'a, D, f64, DefaultTFIDFEngine>::new(documents)
    };
    Ok(vectorizer.related_with(target_id, config))
}

#[cfg(test)]
mod tests {
    use approx::assert_relative_eq;

    use super::*;
    use crate::{vectorizer::document::Document, Error};

    fn ids<D: Tagged>(hits: &[HitEntry<'_, D>]) -> Vec<String> {
        hits.iter().map(|h| h.id().to_string()).collect()
    }

    #[test]
    fn identical_tags_rank_first_then_unrelated() {
        let docs = vec![
            Document::new("a", ["ts", "react"]),
            Document::new("b", ["ts", "react"]),
            Document::new("c", ["python"]),
        ];
        let hits = get_related("a", &docs, 2);
        assert_eq!(ids(&hits), vec!["b", "c"]);
        assert_relative_eq!(hits[0].similarity, 1.0, epsilon = 1e-9);
        assert_eq!(hits[1].similarity, 0.0);
    }

    #[test]
    fn tagless_target_scores_zero_against_everything() {
        let docs = vec![Document::new("x", Vec::<String>::new()), Document::new("y", ["foo"])];
        let hits = get_related("x", &docs, 5);
        assert_eq!(ids(&hits), vec!["y"]);
        assert_eq!(hits[0].similarity, 0.0);
    }

    #[test]
    fn single_document_has_no_candidates() {
        let docs = vec![Document::new("p", ["a", "b", "c"])];
        assert!(get_related("p", &docs, 3).is_empty());
    }

    #[test]
    fn missing_target_gives_empty_result() {
        let docs = vec![Document::new("a", ["x"]), Document::new("b", ["x"])];
        assert!(get_related("nonexistent", &docs, 3).is_empty());
        assert!(get_related::<Document>("a", &[], 3).is_empty());
    }

    #[test]
    fn zero_count_gives_empty_result() {
        let docs = vec![Document::new("a", ["x"]), Document::new("b", ["x"])];
        assert!(get_related("a", &docs, 0).is_empty());
    }

    #[test]
    fn rare_shared_tag_beats_common_shared_tag() {
        let docs = vec![
            Document::new("target", ["rust", "blog"]),
            Document::new("common", ["blog"]),
            Document::new("rare", ["rust"]),
            Document::new("other1", ["blog"]),
            Document::new("other2", ["blog", "diary"]),
        ];
        let hits = get_related("target", &docs, 2);
        assert_eq!(hits[0].id(), "rare");
        assert!(hits[0].similarity > hits[1].similarity);
    }

    #[test]
    fn partial_overlap_is_between_zero_and_one() {
        let docs = vec![
            Document::new("a", ["rust", "cli"]),
            Document::new("b", ["rust", "web"]),
            Document::new("c", ["go"]),
        ];
        let hits = get_related("a", &docs, 3);
        assert_eq!(hits[0].id(), "b");
        assert!(hits[0].similarity > 0.0 && hits[0].similarity < 1.0);
        assert_eq!(hits[1].similarity, 0.0);
    }

    #[test]
    fn ties_keep_corpus_order_by_default() {
        let docs = vec![
            Document::new("t", ["x"]),
            Document::new("z", ["y"]),
            Document::new("m", ["y"]),
            Document::new("a", ["y"]),
        ];
        let hits = get_related("t", &docs, 3);
        assert_eq!(ids(&hits), vec!["z", "m", "a"]);

        let config = RelatedConfig {
            tie_break: TieBreak::DocumentId,
            ..RelatedConfig::default().with_count(3)
        };
        let hits = get_related_with("t", &docs, &config).unwrap();
        assert_eq!(ids(&hits), vec!["a", "m", "z"]);
    }

    #[test]
    fn duplicate_target_ids_are_all_excluded() {
        let docs = vec![
            Document::new("a", ["x"]),
            Document::new("a", ["x", "y"]),
            Document::new("b", ["x"]),
        ];
        let hits = get_related("a", &docs, 5);
        assert_eq!(ids(&hits), vec!["b"]);
    }

    #[test]
    fn repeated_candidate_ids_score_their_own_tags() {
        let docs = vec![
            Document::new("a", ["x"]),
            Document::new("b", ["y"]),
            Document::new("b", ["x"]),
        ];
        for parallel in [false, true] {
            let config = RelatedConfig {
                parallel,
                ..RelatedConfig::default().with_count(5)
            };
            let hits = get_related_with("a", &docs, &config).unwrap();
            let ranked: Vec<(&str, &[String], f64)> = hits
                .iter()
                .map(|h| (h.id(), h.document.tags.as_slice(), h.similarity))
                .collect();
            assert_eq!(ranked.len(), 2);
            assert_eq!(ranked[0].1, ["x".to_string()]);
            assert_relative_eq!(ranked[0].2, 1.0, epsilon = 1e-9);
            assert_eq!(ranked[1].1, ["y".to_string()]);
            assert_eq!(ranked[1].2, 0.0);
        }
    }

    #[test]
    fn public_types_are_send_and_sync() {
        fn assert_send_sync<T: Send + Sync>() {}
        assert_send_sync::<TFIDFVectorizer<'static, Document>>();
        assert_send_sync::<TFIDFVectorizer<'static, Document, f32>>();
        assert_send_sync::<HitEntry<'static, Document>>();
        assert_send_sync::<Hits<'static, Document>>();
        assert_send_sync::<RelatedConfig>();
        assert_send_sync::<crate::TFIDFData>();
    }

    #[test]
    fn strict_ids_reject_duplicates() {
        let docs = vec![Document::new("a", ["x"]), Document::new("a", ["y"])];
        let config = RelatedConfig {
            strict_ids: true,
            ..RelatedConfig::default()
        };
        assert!(matches!(
            get_related_with("a", &docs, &config),
            Err(Error::DuplicateDocumentId(id)) if id == "a"
        ));
    }

    #[test]
    fn parallel_matches_sequential() {
        let docs = random_corpus(&mut Rng::new(0xDEAD_BEEF), 200, 12, 5);
        let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&docs);
        let sequential = RelatedConfig::default().with_count(50);
        let parallel = RelatedConfig {
            parallel: true,
            ..sequential.clone()
        };
        for doc in docs.iter().take(20) {
            let a = vectorizer.related_with(doc.id(), &sequential);
            let b = vectorizer.related_with(doc.id(), &parallel);
            assert_eq!(ids(&a), ids(&b));
            for (x, y) in a.iter().zip(b.iter()) {
                assert_eq!(x.similarity, y.similarity);
            }
        }
    }

    #[test]
    fn related_to_tags_ranks_whole_collection() {
        let docs = vec![
            Document::new("a", ["rust", "wasm"]),
            Document::new("b", ["python"]),
            Document::new("c", ["rust"]),
        ];
        let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&docs);
        let hits = vectorizer.related_to_tags(&["rust", "unknown"], 3);
        assert_eq!(hits.len(), 3);
        assert_eq!(hits[0].id(), "c");
        assert_relative_eq!(hits[0].similarity, 1.0, epsilon = 1e-9);
        assert_eq!(hits[2].id(), "b");
        assert_eq!(hits[2].similarity, 0.0);
        assert!(vectorizer.related_to_tags(&["rust"], 0).is_empty());
    }

    #[test]
    fn hits_display_and_debug() {
        let docs = vec![Document::new("a", ["x"]), Document::new("b", ["x"])];
        let mut hits = Hits::new(vec![
            HitEntry { document: &docs[1], similarity: 0.25 },
            HitEntry { document: &docs[0], similarity: f64::NAN },
            HitEntry { document: &docs[0], similarity: 0.5 },
        ]);
        hits.sort_by_score_desc(TieBreak::CorpusOrder);
        assert_eq!(hits.len(), 2);
        assert_eq!(hits.to_string(), "0.500000\ta\n0.250000\tb\n");
        assert_eq!(format!("{:?}", hits), r#"[("a", 0.5), ("b", 0.25)]"#);
    }

    /// tiny deterministic PRNG (xorshift32)
    struct Rng(u32);
    impl Rng {
        fn new(seed: u32) -> Self {
            Self(seed)
        }
        fn next_u32(&mut self) -> u32 {
            let mut x = self.0;
            x ^= x << 13;
            x ^= x >> 17;
            x ^= x << 5;
            self.0 = x;
            x
        }
        fn below(&mut self, n: u32) -> u32 {
            self.next_u32() % n
        }
    }

    fn random_corpus(rng: &mut Rng, docs: usize, vocab: u32, max_tags: u32) -> Vec<Document> {
        (0..docs)
            .map(|i| {
                let n = rng.below(max_tags + 1);
                let tags: Vec<String> =
                    (0..n).map(|_| format!("tag{}", rng.below(vocab))).collect();
                Document::new(format!("doc{i}"), tags)
            })
            .collect()
    }

    #[test]
    fn ranking_properties_hold_on_random_corpora() {
        let mut rng = Rng::new(0x1234_5678);
        for round in 0..30 {
            let size = 1 + rng.below(40) as usize;
            let docs = random_corpus(&mut rng, size, 8, 4);
            let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&docs);
            let count = rng.below(10) as usize;
            for doc in &docs {
                let hits = vectorizer.related(doc.id(), count);
                // self-exclusion
                assert!(hits.iter().all(|h| h.id() != doc.id()), "round {round}");
                // count bound
                assert!(hits.len() <= count.min(docs.len() - 1), "round {round}");
                // bounds and order
                for h in &hits {
                    assert!((0.0..=1.0).contains(&h.similarity), "round {round}: {}", h.similarity);
                }
                for w in hits.windows(2) {
                    assert!(w[0].similarity >= w[1].similarity, "round {round}");
                }
            }
            // symmetry
            for a in &docs {
                for b in &docs {
                    let ab = vectorizer.similarity_between(a.id(), b.id()).unwrap();
                    let ba = vectorizer.similarity_between(b.id(), a.id()).unwrap();
                    assert_eq!(ab, ba);
                }
            }
        }
    }

    #[test]
    fn identical_and_disjoint_tag_sets() {
        let mut rng = Rng::new(42);
        for _ in 0..20 {
            let mut docs = random_corpus(&mut rng, 10, 6, 3);
            docs.push(Document::new("same1", ["only-here", "also-here"]));
            docs.push(Document::new("same2", ["also-here", "only-here"]));
            docs.push(Document::new("apart", ["nowhere-else"]));
            let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&docs);
            let same = vectorizer.similarity_between("same1", "same2").unwrap();
            assert_relative_eq!(same, 1.0, epsilon = 1e-9);
            assert_eq!(vectorizer.similarity_between("same1", "apart"), Some(0.0));
        }
    }

    #[test]
    fn zero_tag_document_is_zero_vector() {
        let docs = vec![
            Document::new("empty", Vec::<String>::new()),
            Document::new("a", ["x"]),
            Document::new("b", ["x", "y"]),
        ];
        let vectorizer: TFIDFVectorizer<Document> = TFIDFVectorizer::new(&docs);
        assert!(vectorizer.vector("empty").unwrap().iter().all(|v| *v == 0.0));
        let hits = vectorizer.related("a", 5);
        let empty = hits.iter().find(|h| h.id() == "empty").unwrap();
        assert_eq!(empty.similarity, 0.0);
        assert!(vectorizer.related("empty", 5).iter().all(|h| h.similarity == 0.0));
    }

    #[test]
    fn works_with_custom_document_type() {
        struct Post {
            slug: String,
            title: String,
            tags: Vec<String>,
        }
        impl Tagged for Post {
            fn id(&self) -> &str {
                &self.slug
            }
            fn tags(&self) -> &[String] {
                &self.tags
            }
        }
        let posts = vec![
            Post { slug: "one".into(), title: "One".into(), tags: vec!["a".into()] },
            Post { slug: "two".into(), title: "Two".into(), tags: vec!["a".into()] },
        ];
        let hits = get_related("one", &posts, 1);
        assert_eq!(hits[0].document.title, "Two");
    }
}
