use crate::config::HistoryProfile;
use crate::errors::NormalizeError;
use crate::models::content::Content;
use crate::models::message::Message;
use crate::models::payload::{ModelContent, PromptMessage};
use crate::models::role::Role;
use crate::normalize::Normalizer;

/// Builds the ordered message sequence for a multi-turn model call: persona
/// first, then a bounded window of prior turns, then the new user turn.
/// Stateless; one invocation per conversation turn.
#[derive(Debug, Clone)]
pub struct HistoryAssembler {
    normalizer: Normalizer,
    profile: HistoryProfile,
    persona: String,
}

impl HistoryAssembler {
    pub fn new<S: Into<String>>(normalizer: Normalizer, profile: HistoryProfile, persona: S) -> Self {
        HistoryAssembler {
            normalizer,
            profile,
            persona: persona.into(),
        }
    }

    /// Validate the new content, then build the prompt sequence.
    ///
    /// Only the trailing `window` entries of `history` are replayed, in their
    /// original order. User entries keep their full model payload; assistant
    /// entries are reduced to their text (assistants never produce media
    /// here) and skipped entirely when that text is empty. Other roles are
    /// ignored — the persona already occupies the system slot. `history` is
    /// never mutated.
    pub fn assemble(
        &self,
        new_content: &[Content],
        history: &[Message],
    ) -> Result<Vec<PromptMessage>, NormalizeError> {
        self.normalizer.validate(new_content)?;

        let window_start = history.len().saturating_sub(self.profile.window);
        let mut sequence = Vec::with_capacity(history.len() - window_start + 2);
        sequence.push(PromptMessage::system(self.persona.clone()));

        for message in &history[window_start..] {
            match message.role {
                Role::User => {
                    sequence.push(PromptMessage::user(
                        self.normalizer.to_model_payload(&message.content),
                    ));
                }
                Role::Assistant => {
                    let text: Vec<&str> =
                        message.content.iter().filter_map(|c| c.as_text()).collect();
                    let text = text.join("\n");
                    if !text.is_empty() {
                        sequence.push(PromptMessage::assistant(ModelContent::Text(text)));
                    }
                }
                Role::System => {}
            }
        }

        sequence.push(PromptMessage::user(
            self.normalizer.to_model_payload(new_content),
        ));

        Ok(sequence)
    }
}
