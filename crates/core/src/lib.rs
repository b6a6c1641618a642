//! Speech emotion inference for dual-channel call recordings.
//!
//! Audio is split into caller and client channels, embedded, scored by an
//! ensemble of per-emotion regressors, and summarized into scores, rankings
//! and advice. When model files are missing a signal-statistics fallback
//! takes over behind the same [`pipeline::engine::EmotionEngine`] contract.

pub mod audio {
    pub mod domain {
        pub mod audio_decoder;
        pub mod audio_segment;
        pub mod channel_resolver;
        pub mod speech_recognizer;
        pub mod transcript;
        pub mod waveform;
    }
    pub mod infrastructure;
}

pub mod features {
    pub mod domain {
        pub mod embedding;
        pub mod feature_extractor;
        pub mod projection;
    }
    pub mod infrastructure;
}

pub mod emotion {
    pub mod domain {
        pub mod aggregator;
        pub mod alerts;
        pub mod emotion;
        pub mod emotion_scorer;
        pub mod ensemble;
        pub mod regression_head;
    }
    pub mod infrastructure;
}

pub mod pipeline {
    pub mod analysis;
    pub mod engine;
    pub mod engine_factory;
    pub mod engine_handle;
    pub mod fallback_pipeline;
    pub mod full_pipeline;
    pub mod infrastructure;
    pub mod quality_gate;
}

pub mod shared {
    pub mod config;
    pub mod constants;
    pub mod execution_provider;
    pub mod model_resolver;
}
