//! Groups a photo collection by the people in it.
//!
//! Faces are detected per image, embedded, and assigned in a single
//! greedy pass to identity clusters; see
//! [`pipeline::cluster_faces_use_case::ClusterFacesUseCase`].

pub mod clustering;
pub mod detection;
pub mod embedding;
pub mod io;
pub mod pipeline;
pub mod shared;
