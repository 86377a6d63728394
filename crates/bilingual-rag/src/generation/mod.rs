//! Context assembly and answer orchestration

pub mod answer;
pub mod context;

pub use answer::{AnswerOrchestrator, Synthesizer, TemplateSynthesizer};
pub use context::{ContextAssembler, TRUNCATION_MARKER};
