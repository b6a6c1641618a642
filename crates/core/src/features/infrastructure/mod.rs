pub mod onnx_encoder_extractor;
pub mod preprocess;
pub mod signal_stats_extractor;
