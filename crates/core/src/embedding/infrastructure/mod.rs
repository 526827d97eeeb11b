pub mod onnx_facenet_embedder;
