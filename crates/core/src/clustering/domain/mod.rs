pub mod cluster;
pub mod cluster_store;
pub mod clustering_result;
pub mod similarity;
