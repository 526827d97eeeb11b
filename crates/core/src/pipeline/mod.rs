pub mod cluster_faces_use_case;
pub mod clustering_sink;
pub mod infrastructure;
pub mod pipeline_logger;
