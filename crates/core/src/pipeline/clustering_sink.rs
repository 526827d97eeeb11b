use crate::clustering::domain::clustering_result::ClusteringResult;

/// Receives the result of a completed clustering pass, exactly once.
///
/// Never called for a failed or cancelled pass; there is no partial delivery.
pub trait ClusteringSink {
    fn deliver(&mut self, result: ClusteringResult);
}

impl<F> ClusteringSink for F
where
    F: FnMut(ClusteringResult),
{
    fn deliver(&mut self, result: ClusteringResult) {
        self(result)
    }
}

/// How a pass handed to a sink ended, when it did not fail.
#[derive(Debug)]
pub enum RunStatus {
    /// The whole input was consumed and the sink received the result.
    Delivered,
    /// Stopped between images; holds the clusters built so far.
    Cancelled(ClusteringResult),
}
