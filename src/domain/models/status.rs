pub const EMPTY_PROMPT_MESSAGE: &str = "Please enter a prompt first!";
pub const LOADING_MESSAGE: &str = "Refining the magic pixels...";
pub const FALLBACK_ERROR_MESSAGE: &str = "The AI encountered a glitch. Let’s try again!";

#[derive(Clone, Copy, Debug, PartialEq, Eq, strum::Display)]
#[strum(serialize_all = "lowercase")]
pub enum GenerationStatus {
    Idle,
    Loading,
    Error,
}

/// Status of the generation lifecycle. `message` only carries meaning while
/// loading or after an error.
#[derive(Clone, Debug, PartialEq, Eq)]
pub struct GenerationState {
    pub status: GenerationStatus,
    pub message: String,
}

impl Default for GenerationState {
    fn default() -> GenerationState {
        return GenerationState::idle();
    }
}

impl GenerationState {
    pub fn idle() -> GenerationState {
        return GenerationState {
            status: GenerationStatus::Idle,
            message: "".to_string(),
        };
    }

    pub fn loading(message: &str) -> GenerationState {
        return GenerationState {
            status: GenerationStatus::Loading,
            message: message.to_string(),
        };
    }

    pub fn error(message: &str) -> GenerationState {
        return GenerationState {
            status: GenerationStatus::Error,
            message: message.to_string(),
        };
    }
}
