//! Per-user session state: the selected image, the entered credential, and
//! where the last generation attempt stands.

use thiserror::Error;

use super::PromptPipeline;
use crate::credential::Credential;
use crate::error::GenerationError;
use crate::input::ImageInput;
use crate::llm::GeneratedPrompt;

/// Where a session's generation stands.
///
/// `Idle → Requesting → {Succeeded | Failed}`; any new user action (new
/// image, new credential, new attempt) leaves a terminal state.
#[derive(Debug, Clone, PartialEq, Default)]
pub enum GenerationState {
    #[default]
    Idle,
    Requesting,
    Succeeded(GeneratedPrompt),
    Failed(GenerationError),
}

impl GenerationState {
    /// Text to render for a terminal state.
    pub fn display_text(&self) -> Option<String> {
        match self {
            GenerationState::Succeeded(prompt) => Some(prompt.text.clone()),
            GenerationState::Failed(err) => Some(err.display_text()),
            GenerationState::Idle | GenerationState::Requesting => None,
        }
    }
}

/// Input the user still has to provide before a request may be issued.
#[derive(Error, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MissingInput {
    #[error("Please select an image first.")]
    Image,
    #[error("Please provide an API key.")]
    Credential,
}

/// One user's session. Nothing in here is ever shared with another session.
#[derive(Debug, Default)]
pub struct Session {
    image: Option<ImageInput>,
    credential: Option<Credential>,
    state: GenerationState,
}

impl Session {
    pub fn new() -> Self {
        Self::default()
    }

    /// Replace the current image, discarding the previous one.
    pub fn set_image(&mut self, image: ImageInput) {
        self.image = Some(image);
        self.state = GenerationState::Idle;
    }

    pub fn set_credential(&mut self, credential: Credential) {
        self.credential = Some(credential);
        self.state = GenerationState::Idle;
    }

    /// Forget the credential, e.g. when switching to a different service.
    pub fn clear_credential(&mut self) {
        self.credential = None;
        self.state = GenerationState::Idle;
    }

    pub fn image(&self) -> Option<&ImageInput> {
        self.image.as_ref()
    }

    /// True when a non-empty credential has been entered.
    pub fn has_credential(&self) -> bool {
        self.credential.as_ref().is_some_and(|c| !c.is_empty())
    }

    pub fn state(&self) -> &GenerationState {
        &self.state
    }

    /// Check that both inputs are present, image first.
    pub fn readiness(&self) -> Result<(), MissingInput> {
        if self.image.is_none() {
            return Err(MissingInput::Image);
        }
        if !self.has_credential() {
            return Err(MissingInput::Credential);
        }
        Ok(())
    }

    /// Run one generation attempt.
    ///
    /// When an input is missing the pipeline is not invoked and the missing
    /// input is returned for the front end to warn about. Otherwise exactly
    /// one pipeline call is made and its outcome becomes the new state.
    pub async fn generate(
        &mut self,
        pipeline: &PromptPipeline,
    ) -> Result<&GenerationState, MissingInput> {
        let image = self.image.as_ref().ok_or(MissingInput::Image)?;
        let credential = match &self.credential {
            Some(c) if !c.is_empty() => c,
            _ => return Err(MissingInput::Credential),
        };

        self.state = GenerationState::Requesting;
        let outcome = pipeline.generate_prompt(image, credential).await;
        self.state = match outcome {
            Ok(prompt) => GenerationState::Succeeded(prompt),
            Err(err) => GenerationState::Failed(err),
        };
        Ok(&self.state)
    }
}
