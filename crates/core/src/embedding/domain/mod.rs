pub mod face_embedder;
