pub mod onnx_yolo_localizer;
