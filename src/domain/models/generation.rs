use super::BackendPrompt;

/// A generation the session has committed to. The ticket ties the eventual
/// response back to the session that issued it.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationRequest {
    pub ticket: u64,
    pub prompt: BackendPrompt,
}
