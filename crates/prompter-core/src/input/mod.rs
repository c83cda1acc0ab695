//! User-supplied images.
//!
//! An [`ImageInput`] is the one image a session is working with: its encoded
//! bytes exactly as uploaded, plus the format and dimensions learned by
//! decoding it once. Only JPEG and PNG are accepted.

mod decode;
mod validate;

pub use decode::ImageLoader;
pub use validate::sniff_format;

use base64::Engine;
use std::fmt;

/// Accepted image encodings.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    Jpeg,
    Png,
}

impl InputFormat {
    /// MIME type sent to the vision service.
    pub fn media_type(self) -> &'static str {
        match self {
            InputFormat::Jpeg => "image/jpeg",
            InputFormat::Png => "image/png",
        }
    }
}

impl fmt::Display for InputFormat {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            InputFormat::Jpeg => write!(f, "jpeg"),
            InputFormat::Png => write!(f, "png"),
        }
    }
}

/// A validated, decodable image held in memory for one interaction.
#[derive(Clone)]
pub struct ImageInput {
    /// Encoded bytes as uploaded
    pub bytes: Vec<u8>,
    /// Detected format
    pub format: InputFormat,
    /// Width in pixels
    pub width: u32,
    /// Height in pixels
    pub height: u32,
    /// File name the image was loaded from, for display
    pub file_name: Option<String>,
}

impl ImageInput {
    /// Encoded size in bytes.
    pub fn file_size(&self) -> u64 {
        self.bytes.len() as u64
    }

    pub fn media_type(&self) -> &'static str {
        self.format.media_type()
    }

    /// Base64 (standard alphabet, padded) of the encoded bytes.
    pub fn to_base64(&self) -> String {
        base64::engine::general_purpose::STANDARD.encode(&self.bytes)
    }

    /// Return a data URL suitable for OpenAI-style APIs.
    pub fn data_url(&self) -> String {
        format!("data:{};base64,{}", self.media_type(), self.to_base64())
    }
}

// Pixel bytes are never useful in logs.
impl fmt::Debug for ImageInput {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.debug_struct("ImageInput")
            .field("format", &self.format)
            .field("width", &self.width)
            .field("height", &self.height)
            .field("file_size", &self.file_size())
            .field("file_name", &self.file_name)
            .finish()
    }
}
