use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct TextContent {
    pub text: String,
}

/// Optional descriptive fields carried alongside a media payload. Passed
/// through serialization untouched; validation never inspects them.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaMetadata {
    #[serde(skip_serializing_if = "Option::is_none")]
    pub name: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub filename: Option<String>,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub size_bytes: Option<u64>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct MediaContent {
    /// Base64-encoded payload. Media is base64 text inside JSON end to end,
    /// never raw binary.
    pub data: String,
    pub mime_type: String,
    #[serde(skip_serializing_if = "Option::is_none")]
    pub metadata: Option<MediaMetadata>,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "camelCase")]
/// One unit of message content, tagged with its kind
pub enum Content {
    Text(TextContent),
    Image(MediaContent),
    Video(MediaContent),
    File(MediaContent),
}

impl Content {
    pub fn text<S: Into<String>>(text: S) -> Self {
        Content::Text(TextContent { text: text.into() })
    }

    pub fn image<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        Content::Image(MediaContent {
            data: data.into(),
            mime_type: mime_type.into(),
            metadata: None,
        })
    }

    pub fn video<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        Content::Video(MediaContent {
            data: data.into(),
            mime_type: mime_type.into(),
            metadata: None,
        })
    }

    pub fn file<S: Into<String>, T: Into<String>>(data: S, mime_type: T) -> Self {
        Content::File(MediaContent {
            data: data.into(),
            mime_type: mime_type.into(),
            metadata: None,
        })
    }

    /// Attach metadata to a media block; no effect on text blocks
    pub fn with_metadata(mut self, metadata: MediaMetadata) -> Self {
        match &mut self {
            Content::Text(_) => {}
            Content::Image(media) | Content::Video(media) | Content::File(media) => {
                media.metadata = Some(metadata)
            }
        }
        self
    }

    /// Get the text content if this is a Text variant
    pub fn as_text(&self) -> Option<&str> {
        match self {
            Content::Text(text) => Some(&text.text),
            _ => None,
        }
    }

    /// Get the media content if this is an image/video/file variant
    pub fn as_media(&self) -> Option<&MediaContent> {
        match self {
            Content::Text(_) => None,
            Content::Image(media) | Content::Video(media) | Content::File(media) => Some(media),
        }
    }

    /// The kind discriminator as it appears on the wire
    pub fn kind(&self) -> &'static str {
        match self {
            Content::Text(_) => "text",
            Content::Image(_) => "image",
            Content::Video(_) => "video",
            Content::File(_) => "file",
        }
    }
}
