use crate::config::NormalizerLimits;
use crate::errors::NormalizeError;
use crate::models::content::Content;
use crate::models::payload::{ImagePart, ModelContent, MultimodalContent};

/// Upper bound on a `describe` summary, ellipsis included
const SUMMARY_MAX_CHARS: usize = 100;

/// Text sent in place of a caption when an image-bearing message has none
pub const DEFAULT_IMAGE_PROMPT: &str = "Please analyze these images.";

/// Validates submitted content blocks and converts them into the linear
/// shapes needed for persistence and for a model call. Pure input to output;
/// holds nothing but its limits.
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    limits: NormalizerLimits,
}

impl Normalizer {
    pub fn new(limits: NormalizerLimits) -> Self {
        Normalizer { limits }
    }

    /// Check every block structurally, then the aggregate limits.
    ///
    /// Structural problems (empty text, incomplete or mistyped media) fail
    /// immediately during the scan. Aggregate limits are only checked after
    /// the whole list scanned cleanly, with strict greater-than comparisons,
    /// so a list sitting exactly at a limit is accepted.
    pub fn validate(&self, blocks: &[Content]) -> Result<(), NormalizeError> {
        if blocks.is_empty() {
            return Err(NormalizeError::EmptyContent);
        }

        let mut text_len = 0usize;
        let mut images = 0usize;
        let mut videos = 0usize;
        let mut files = 0usize;

        for block in blocks {
            match block {
                Content::Text(text) => {
                    if text.text.trim().is_empty() {
                        return Err(NormalizeError::EmptyText);
                    }
                    text_len += text.text.chars().count();
                }
                Content::Image(media) => {
                    if media.data.is_empty() || media.mime_type.is_empty() {
                        return Err(NormalizeError::IncompleteMedia {
                            kind: block.kind().to_string(),
                        });
                    }
                    if !media.mime_type.starts_with("image/") {
                        return Err(NormalizeError::InvalidImageFormat {
                            mime_type: media.mime_type.clone(),
                        });
                    }
                    images += 1;
                }
                Content::Video(media) => {
                    if media.data.is_empty() || media.mime_type.is_empty() {
                        return Err(NormalizeError::IncompleteMedia {
                            kind: block.kind().to_string(),
                        });
                    }
                    if !media.mime_type.starts_with("video/") {
                        return Err(NormalizeError::InvalidVideoFormat {
                            mime_type: media.mime_type.clone(),
                        });
                    }
                    videos += 1;
                }
                Content::File(media) => {
                    if media.data.is_empty() || media.mime_type.is_empty() {
                        return Err(NormalizeError::IncompleteMedia {
                            kind: block.kind().to_string(),
                        });
                    }
                    files += 1;
                }
            }
        }

        if text_len > self.limits.max_total_text_len {
            return Err(NormalizeError::TextTooLong {
                length: text_len,
                limit: self.limits.max_total_text_len,
            });
        }
        if images > self.limits.max_images {
            return Err(NormalizeError::TooManyImages {
                count: images,
                limit: self.limits.max_images,
            });
        }
        if videos > self.limits.max_videos {
            return Err(NormalizeError::TooManyVideos {
                count: videos,
                limit: self.limits.max_videos,
            });
        }
        if files > self.limits.max_files {
            return Err(NormalizeError::TooManyFiles {
                count: files,
                limit: self.limits.max_files,
            });
        }

        Ok(())
    }

    /// Bounded human-readable summary for logging: the text content followed
    /// by counts of the non-text kinds, e.g. `look at this [2 images]`.
    /// Capped at 100 characters. Observability only.
    pub fn describe(&self, blocks: &[Content]) -> String {
        let mut texts: Vec<&str> = Vec::new();
        let mut images = 0usize;
        let mut videos = 0usize;
        let mut files = 0usize;

        for block in blocks {
            match block {
                Content::Text(text) => texts.push(text.text.trim()),
                Content::Image(_) => images += 1,
                Content::Video(_) => videos += 1,
                Content::File(_) => files += 1,
            }
        }

        let mut counts = Vec::new();
        if images > 0 {
            counts.push(format!("{} images", images));
        }
        if videos > 0 {
            counts.push(format!("{} videos", videos));
        }
        if files > 0 {
            counts.push(format!("{} files", files));
        }

        let mut summary = texts.join(" ");
        if !counts.is_empty() {
            if !summary.is_empty() {
                summary.push(' ');
            }
            summary.push('[');
            summary.push_str(&counts.join(", "));
            summary.push(']');
        }

        if summary.chars().count() > SUMMARY_MAX_CHARS {
            let truncated: String = summary.chars().take(SUMMARY_MAX_CHARS - 3).collect();
            format!("{}...", truncated)
        } else {
            summary
        }
    }

    /// Convert blocks into the shape the model backend expects: all text
    /// joined with newlines, each image as an inline data URI. With no images
    /// the payload stays plain text; with images and no text a fixed default
    /// prompt stands in for the caption.
    ///
    /// Video and file blocks pass validation but are not forwarded — the
    /// model payload currently carries text and images only.
    pub fn to_model_payload(&self, blocks: &[Content]) -> ModelContent {
        let mut texts: Vec<&str> = Vec::new();
        let mut images: Vec<ImagePart> = Vec::new();

        for block in blocks {
            match block {
                Content::Text(text) => texts.push(&text.text),
                Content::Image(media) => images.push(ImagePart {
                    url: format!("data:{};base64,{}", media.mime_type, media.data),
                }),
                Content::Video(_) | Content::File(_) => {}
            }
        }

        let text = texts.join("\n");
        if images.is_empty() {
            ModelContent::Text(text)
        } else {
            ModelContent::Multimodal(MultimodalContent {
                text: if text.is_empty() {
                    DEFAULT_IMAGE_PROMPT.to_string()
                } else {
                    text
                },
                images,
            })
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::models::content::MediaContent;

    fn normalizer() -> Normalizer {
        Normalizer::new(NormalizerLimits::default())
    }

    #[test]
    fn test_validate_accepts_well_formed_blocks() {
        let blocks = vec![
            Content::text("hello"),
            Content::image("QQ==", "image/png"),
            Content::video("QQ==", "video/mp4"),
            Content::file("QQ==", "application/pdf"),
        ];
        assert!(normalizer().validate(&blocks).is_ok());
    }

    #[test]
    fn test_validate_rejects_empty_list() {
        assert_eq!(
            normalizer().validate(&[]),
            Err(NormalizeError::EmptyContent)
        );
    }

    #[test]
    fn test_validate_rejects_whitespace_text() {
        let blocks = vec![Content::text("   \n\t")];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::EmptyText)
        );
    }

    #[test]
    fn test_validate_rejects_incomplete_media() {
        let blocks = vec![Content::image("", "image/png")];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::IncompleteMedia {
                kind: "image".to_string()
            })
        );

        let blocks = vec![Content::file("QQ==", "")];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::IncompleteMedia {
                kind: "file".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_mistyped_image() {
        let blocks = vec![Content::image("QQ==", "video/mp4")];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::InvalidImageFormat {
                mime_type: "video/mp4".to_string()
            })
        );
    }

    #[test]
    fn test_validate_rejects_mistyped_video() {
        let blocks = vec![Content::video("QQ==", "image/png")];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::InvalidVideoFormat {
                mime_type: "image/png".to_string()
            })
        );
    }

    #[test]
    fn test_validate_text_length_is_aggregate_and_exact() {
        // 2000 + 2000 characters sits exactly at the limit
        let blocks = vec![
            Content::text("a".repeat(2000)),
            Content::text("b".repeat(2000)),
        ];
        assert!(normalizer().validate(&blocks).is_ok());

        let blocks = vec![
            Content::text("a".repeat(2000)),
            Content::text("b".repeat(2001)),
        ];
        assert_eq!(
            normalizer().validate(&blocks),
            Err(NormalizeError::TextTooLong {
                length: 4001,
                limit: 4000
            })
        );
    }

    #[test]
    fn test_validate_text_too_long_wins_over_other_counts() {
        // Text over the limit reports TextTooLong even with too many images
        let mut blocks = vec![Content::text("a".repeat(4001))];
        for _ in 0..11 {
            blocks.push(Content::image("QQ==", "image/png"));
        }
        assert!(matches!(
            normalizer().validate(&blocks),
            Err(NormalizeError::TextTooLong { .. })
        ));
    }

    #[test]
    fn test_validate_media_count_limits_are_exact() {
        let at_limit: Vec<Content> = (0..10).map(|_| Content::image("QQ==", "image/png")).collect();
        assert!(normalizer().validate(&at_limit).is_ok());

        let over: Vec<Content> = (0..11).map(|_| Content::image("QQ==", "image/png")).collect();
        assert_eq!(
            normalizer().validate(&over),
            Err(NormalizeError::TooManyImages {
                count: 11,
                limit: 10
            })
        );

        let over: Vec<Content> = (0..4).map(|_| Content::video("QQ==", "video/mp4")).collect();
        assert_eq!(
            normalizer().validate(&over),
            Err(NormalizeError::TooManyVideos { count: 4, limit: 3 })
        );

        let over: Vec<Content> = (0..6)
            .map(|_| Content::file("QQ==", "application/pdf"))
            .collect();
        assert_eq!(
            normalizer().validate(&over),
            Err(NormalizeError::TooManyFiles { count: 6, limit: 5 })
        );
    }

    #[test]
    fn test_validate_structural_error_precedes_aggregate_check() {
        // A malformed block later in the list short-circuits before the
        // aggregate text limit is ever considered
        let blocks = vec![
            Content::text("a".repeat(5000)),
            Content::image("QQ==", "text/plain"),
        ];
        assert!(matches!(
            normalizer().validate(&blocks),
            Err(NormalizeError::InvalidImageFormat { .. })
        ));
    }

    #[test]
    fn test_validate_custom_limits() {
        let tight = Normalizer::new(NormalizerLimits {
            max_total_text_len: 5,
            max_images: 1,
            max_videos: 0,
            max_files: 0,
        });

        assert!(tight.validate(&[Content::text("12345")]).is_ok());
        assert!(matches!(
            tight.validate(&[Content::text("123456")]),
            Err(NormalizeError::TextTooLong { .. })
        ));
        assert!(matches!(
            tight.validate(&[Content::video("QQ==", "video/mp4")]),
            Err(NormalizeError::TooManyVideos { .. })
        ));
    }

    #[test]
    fn test_describe_counts_and_omits_zeroes() {
        let blocks = vec![
            Content::text("look at this"),
            Content::image("QQ==", "image/png"),
            Content::image("QQ==", "image/jpeg"),
            Content::file("QQ==", "application/pdf"),
        ];
        assert_eq!(
            normalizer().describe(&blocks),
            "look at this [2 images, 1 files]"
        );
    }

    #[test]
    fn test_describe_media_only() {
        let blocks = vec![Content::video("QQ==", "video/mp4")];
        assert_eq!(normalizer().describe(&blocks), "[1 videos]");
    }

    #[test]
    fn test_describe_truncates_at_100_chars() {
        let blocks = vec![Content::text("x".repeat(300))];
        let summary = normalizer().describe(&blocks);
        assert_eq!(summary.chars().count(), 100);
        assert!(summary.ends_with("..."));
    }

    #[test]
    fn test_payload_plain_text() {
        let payload = normalizer().to_model_payload(&[Content::text("hi")]);
        assert_eq!(payload, ModelContent::Text("hi".to_string()));
    }

    #[test]
    fn test_payload_joins_text_blocks_with_newlines() {
        let payload =
            normalizer().to_model_payload(&[Content::text("one"), Content::text("two")]);
        assert_eq!(payload, ModelContent::Text("one\ntwo".to_string()));
    }

    #[test]
    fn test_payload_with_image_builds_data_uri() {
        let blocks = vec![Content::text("look"), Content::image("QQ==", "image/png")];
        let payload = normalizer().to_model_payload(&blocks);

        match payload {
            ModelContent::Multimodal(multimodal) => {
                assert_eq!(multimodal.text, "look");
                assert_eq!(multimodal.images.len(), 1);
                assert_eq!(multimodal.images[0].url, "data:image/png;base64,QQ==");
            }
            other => panic!("expected multimodal payload, got {:?}", other),
        }
    }

    #[test]
    fn test_payload_images_without_text_use_default_prompt() {
        let blocks = vec![Content::image("QQ==", "image/png")];
        let payload = normalizer().to_model_payload(&blocks);
        assert_eq!(payload.text(), DEFAULT_IMAGE_PROMPT);
    }

    #[test]
    fn test_payload_drops_video_and_file_blocks() {
        let blocks = vec![
            Content::text("report"),
            Content::video("QQ==", "video/mp4"),
            Content::file("QQ==", "application/pdf"),
        ];
        let payload = normalizer().to_model_payload(&blocks);
        assert_eq!(payload, ModelContent::Text("report".to_string()));
    }

    #[test]
    fn test_payload_is_deterministic() {
        let blocks = vec![
            Content::text("look"),
            Content::Image(MediaContent {
                data: "QQ==".to_string(),
                mime_type: "image/png".to_string(),
                metadata: None,
            }),
        ];
        let n = normalizer();
        assert!(n.validate(&blocks).is_ok());
        let first = n.to_model_payload(&blocks);
        assert!(n.validate(&blocks).is_ok());
        let second = n.to_model_payload(&blocks);
        assert_eq!(first, second);
    }
}
