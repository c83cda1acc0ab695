//! The instruction sent alongside every image.

/// Default instruction template.
///
/// Asks for a five-part prompt (subject, environment, lighting & color,
/// style & medium, technical keywords) and nothing but the prompt itself.
pub const DEFAULT_TEMPLATE: &str = "\
Analyze this image meticulously. You are an expert prompt engineer for a high-end AI image generator.

Create a detailed text-to-image prompt based on this image. Structure it as follows:
1. Subject: Detailed description of the main subject.
2. Environment: Background, setting, atmosphere.
3. Lighting & Color: Type of light (soft, cinematic, neon), color palette.
4. Style & Medium: e.g., Photorealistic, 35mm film, Cyberpunk, Oil painting, Digital Art.
5. Technical keywords: e.g., 8k, highly detailed, sharp focus, masterpiece.

Output ONLY the raw prompt text, ready to be copied. No markdown formatting and no preamble like 'Here is the prompt:'.";

/// Instruction text for the vision model.
///
/// Immutable once built; every request made with the same template carries
/// byte-identical instruction text.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct PromptTemplate {
    text: String,
}

impl PromptTemplate {
    pub fn new(text: impl Into<String>) -> Self {
        Self { text: text.into() }
    }

    pub fn as_str(&self) -> &str {
        &self.text
    }
}

impl Default for PromptTemplate {
    fn default() -> Self {
        Self::new(DEFAULT_TEMPLATE)
    }
}
