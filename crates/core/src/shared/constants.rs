/// Sample rate every model in the engine expects.
pub const TARGET_SAMPLE_RATE: u32 = 16000;

/// Embedding rows (encoder frames) all regression heads expect.
pub const EMBEDDING_FRAMES: usize = 1500;
/// Embedding columns (feature width) all regression heads expect.
pub const EMBEDDING_WIDTH: usize = 768;

pub const ENCODER_MODEL_NAME: &str = "whisper_base_encoder.onnx";
pub const WHISPER_MODEL_FILENAME: &str = "ggml-base.bin";

/// Head files are stored as `model_<Stored>_best.onnx`.
pub const HEAD_FILE_PREFIX: &str = "model_";
pub const HEAD_FILE_SUFFIX: &str = "_best.onnx";

/// Chunks smaller than this are rejected before decoding.
pub const MIN_CHUNK_BYTES: usize = 200;
pub const SILENCE_RMS_THRESHOLD: f32 = 0.01;
pub const SILENCE_PEAK_THRESHOLD: f32 = 0.05;
pub const SILENCE_TRANSCRIPT: &str = "[Silence]";

/// Anger score above which an alert is raised regardless of the transcript.
pub const ANGER_ALERT_THRESHOLD: f32 = 0.25;

pub const PREVIEW_MAX_TOKENS: i32 = 30;
pub const PREVIEW_NO_REPEAT_NGRAM: usize = 3;

pub const DEFAULT_DECLARED_EXTENSION: &str = "wav";

pub fn head_file_name(stored_name: &str) -> String {
    format!("{HEAD_FILE_PREFIX}{stored_name}{HEAD_FILE_SUFFIX}")
}
