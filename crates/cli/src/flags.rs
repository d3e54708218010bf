use clap::ValueEnum;
use mooddine_vector_store::EmbeddingMode;

#[derive(Copy, Clone, ValueEnum)]
pub(crate) enum EmbedMode {
    Stub,
    Sidecar,
}

impl EmbedMode {
    pub(crate) const fn as_domain(self) -> EmbeddingMode {
        match self {
            EmbedMode::Stub => EmbeddingMode::Stub,
            EmbedMode::Sidecar => EmbeddingMode::Sidecar,
        }
    }
}
