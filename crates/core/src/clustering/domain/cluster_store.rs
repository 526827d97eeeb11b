use std::cmp::Ordering;

use crate::clustering::domain::cluster::{Cluster, ClusterId};
use crate::clustering::domain::similarity::cosine_similarity;
use crate::shared::config::MatchPolicy;
use crate::shared::embedding::Embedding;
use crate::shared::error::ClusteringError;
use crate::shared::face_crop::FaceCrop;
use crate::shared::image::ImageId;

/// Ordered collection of the clusters discovered so far in one pass.
///
/// Clusters are only ever appended; none is removed, merged or re-anchored.
/// `match_or_create` is a scan-then-insert over the whole store, so it must
/// run under exclusive access (`&mut self`) to keep creation order stable.
#[derive(Debug)]
pub struct ClusterStore {
    clusters: Vec<Cluster>,
    threshold: f64,
    policy: MatchPolicy,
    embedding_dim: Option<usize>,
}

impl ClusterStore {
    /// Store with first-match assignment and no fixed embedding size.
    pub fn new(threshold: f64) -> Self {
        Self {
            clusters: Vec::new(),
            threshold,
            policy: MatchPolicy::FirstMatch,
            embedding_dim: None,
        }
    }

    pub fn with_policy(mut self, policy: MatchPolicy) -> Self {
        self.policy = policy;
        self
    }

    /// Rejects embeddings whose length differs from `dim`.
    pub fn with_embedding_dim(mut self, dim: usize) -> Self {
        self.embedding_dim = Some(dim);
        self
    }

    pub fn threshold(&self) -> f64 {
        self.threshold
    }

    pub fn clusters(&self) -> &[Cluster] {
        &self.clusters
    }

    pub fn len(&self) -> usize {
        self.clusters.len()
    }

    pub fn is_empty(&self) -> bool {
        self.clusters.is_empty()
    }

    /// Assigns a face to a cluster, founding a new one when nothing matches.
    ///
    /// A cluster matches when the cosine similarity between its embedding and
    /// `embedding` is strictly greater than the threshold. On a match, `source`
    /// is appended to the cluster's images even if already present. A face
    /// whose similarity is undefined (NaN) founds its own cluster.
    pub fn match_or_create(
        &mut self,
        crop: FaceCrop,
        embedding: Embedding,
        source: ImageId,
    ) -> Result<ClusterId, ClusteringError> {
        if let Some(expected) = self.embedding_dim {
            if embedding.len() != expected {
                return Err(ClusteringError::DimensionMismatch {
                    expected,
                    actual: embedding.len(),
                });
            }
        }

        if let Some(id) = self.find_match(&embedding)? {
            self.clusters[id.0].record(source);
            log::debug!("{source} face {} joined {id}", crop.face_index());
            return Ok(id);
        }

        let id = ClusterId(self.clusters.len());
        log::debug!("{source} face {} founded {id}", crop.face_index());
        self.clusters.push(Cluster::new(id, crop, embedding, source));
        Ok(id)
    }

    fn find_match(&self, embedding: &Embedding) -> Result<Option<ClusterId>, ClusteringError> {
        let mut best: Option<(ClusterId, f64)> = None;
        for cluster in &self.clusters {
            let similarity = cosine_similarity(cluster.embedding(), embedding)?;
            // NaN (non-finite components or threshold) never matches.
            if similarity.partial_cmp(&self.threshold) != Some(Ordering::Greater) {
                continue;
            }
            match self.policy {
                MatchPolicy::FirstMatch => return Ok(Some(cluster.id())),
                MatchPolicy::BestMatch => {
                    if best.map_or(true, |(_, s)| similarity > s) {
                        best = Some((cluster.id(), similarity));
                    }
                }
            }
        }
        Ok(best.map(|(id, _)| id))
    }

    pub fn into_clusters(self) -> Vec<Cluster> {
        self.clusters
    }
}
