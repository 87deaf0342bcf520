use serde::{Deserialize, Serialize};

/// Instruction text emitted as the leading system message of every prompt
/// sequence unless overridden by configuration.
pub const DEFAULT_PERSONA: &str = "You are a friendly, helpful assistant. \
Answer the user's questions accurately and provide useful information.";

/// Per-type and aggregate limits enforced by the normalizer. Passed in
/// explicitly so boundary values can be exercised without recompilation.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct NormalizerLimits {
    pub max_total_text_len: usize,
    pub max_images: usize,
    pub max_videos: usize,
    pub max_files: usize,
}

impl Default for NormalizerLimits {
    fn default() -> Self {
        NormalizerLimits {
            max_total_text_len: 4000,
            max_images: 10,
            max_videos: 3,
            max_files: 5,
        }
    }
}

/// How much history is replayed into a model call. The two named profiles are
/// kept distinct: the multimodal window is smaller to leave context room for
/// inline images.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
pub struct HistoryProfile {
    /// Number of trailing history entries included in the prompt sequence
    pub window: usize,
}

impl HistoryProfile {
    pub fn text_only() -> Self {
        HistoryProfile { window: 10 }
    }

    pub fn multimodal() -> Self {
        HistoryProfile { window: 8 }
    }
}

impl Default for HistoryProfile {
    fn default() -> Self {
        Self::multimodal()
    }
}

/// Everything the chat service needs to run a turn
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct ChatConfig {
    pub limits: NormalizerLimits,
    pub profile: HistoryProfile,
    pub persona: String,
}

impl Default for ChatConfig {
    fn default() -> Self {
        ChatConfig {
            limits: NormalizerLimits::default(),
            profile: HistoryProfile::default(),
            persona: DEFAULT_PERSONA.to_string(),
        }
    }
}
