//! Subtitle documents and styling
//!
//! Turns transcript segments into SRT or WebVTT documents and resolves
//! the rendering style a video compositor needs.

pub mod color;

pub use color::{validate_color, ColorValue};

use crate::config::SubtitleConfig;
use crate::engine::types::TranscriptSegment;
use crate::error::ColorError;

/// Build an SRT document from transcript segments.
///
/// Cues are numbered from 1 and each is followed by a blank line.
pub fn srt_document(segments: &[TranscriptSegment]) -> String {
    let mut out = String::new();
    for (i, segment) in segments.iter().enumerate() {
        let start = format_srt_timestamp(segment.start_ms);
        let end = format_srt_timestamp(segment.end_ms);
        out.push_str(&format!(
            "{}\n{} --> {}\n{}\n\n",
            i + 1,
            start,
            end,
            segment.text.trim()
        ));
    }
    out
}

/// Build a WebVTT document from transcript segments.
pub fn vtt_document(segments: &[TranscriptSegment]) -> String {
    let mut out = String::from("WEBVTT\n\n");
    for segment in segments {
        let start = format_vtt_timestamp(segment.start_ms);
        let end = format_vtt_timestamp(segment.end_ms);
        out.push_str(&format!(
            "{} --> {}\n{}\n\n",
            start,
            end,
            segment.text.trim()
        ));
    }
    out
}

/// Format timestamp for SRT (HH:MM:SS,mmm)
fn format_srt_timestamp(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    format!("{:02}:{:02}:{:02},{:03}", hours, minutes, seconds, millis)
}

/// Format timestamp for VTT (HH:MM:SS.mmm)
fn format_vtt_timestamp(ms: i64) -> String {
    let total_seconds = ms / 1000;
    let hours = total_seconds / 3600;
    let minutes = (total_seconds % 3600) / 60;
    let seconds = total_seconds % 60;
    let millis = ms % 1000;

    format!("{:02}:{:02}:{:02}.{:03}", hours, minutes, seconds, millis)
}

/// Rendering parameters for burned-in subtitles.
///
/// Colors are held as supplied; [`SubtitleStyle::canonical`] resolves
/// them to hex before a renderer sees them.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct SubtitleStyle {
    pub font_size: u32,
    pub color: String,
    pub stroke_width: u32,
    pub stroke_color: String,
}

impl SubtitleStyle {
    pub fn from_config(config: &SubtitleConfig) -> Self {
        Self {
            font_size: config.font_size,
            color: config.color.clone(),
            stroke_width: config.stroke_width,
            stroke_color: config.stroke_color.clone(),
        }
    }

    /// Return the style with both colors normalized to canonical hex.
    pub fn canonical(&self) -> Result<Self, ColorError> {
        Ok(Self {
            font_size: self.font_size,
            color: validate_color(&ColorValue::from(self.color.as_str()))?,
            stroke_width: self.stroke_width,
            stroke_color: validate_color(&ColorValue::from(self.stroke_color.as_str()))?,
        })
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn segments() -> Vec<TranscriptSegment> {
        vec![
            TranscriptSegment {
                text: " Hello world ".to_string(),
                start_ms: 1_000,
                end_ms: 2_500,
            },
            TranscriptSegment {
                text: "Second cue".to_string(),
                start_ms: 3_661_500,
                end_ms: 3_662_000,
            },
        ]
    }

    #[test]
    fn test_srt_document() {
        let srt = srt_document(&segments());
        assert!(srt.starts_with("1\n00:00:01,000 --> 00:00:02,500\nHello world\n\n"));
        assert!(srt.contains("2\n01:01:01,500 --> 01:01:02,000\nSecond cue\n\n"));
    }

    #[test]
    fn test_vtt_document() {
        let vtt = vtt_document(&segments());
        assert!(vtt.starts_with("WEBVTT\n\n"));
        assert!(vtt.contains("00:00:01.000 --> 00:00:02.500\nHello world\n\n"));
        assert!(vtt.contains("01:01:01.500 --> 01:01:02.000\nSecond cue\n\n"));
    }

    #[test]
    fn test_empty_transcript_documents() {
        assert_eq!(srt_document(&[]), "");
        assert_eq!(vtt_document(&[]), "WEBVTT\n\n");
    }

    #[test]
    fn test_canonical_resolves_colors() {
        let style = SubtitleStyle {
            font_size: 32,
            color: "rgba(255,255,255,1)".to_string(),
            stroke_width: 2,
            stroke_color: "#000".to_string(),
        };
        let resolved = style.canonical().unwrap();

        assert_eq!(resolved.color, "#ffffff");
        assert_eq!(resolved.stroke_color, "#000");
        assert_eq!(resolved.font_size, 32);
    }

    #[test]
    fn test_default_config_style_is_already_canonical() {
        let style = SubtitleStyle::from_config(&SubtitleConfig::default());
        let resolved = style.canonical().unwrap();

        assert_eq!(resolved, style);
        assert_eq!(resolved.font_size, 24);
        assert_eq!(resolved.color, "#FFFFFF");
        assert_eq!(resolved.stroke_width, 1);
        assert_eq!(resolved.stroke_color, "#000000");
    }

    #[test]
    fn test_canonical_rejects_bad_color() {
        let style = SubtitleStyle {
            font_size: 24,
            color: "not-a-color".to_string(),
            stroke_width: 1,
            stroke_color: "#000".to_string(),
        };
        let err = style.canonical().unwrap_err();
        assert!(matches!(err, ColorError::Unrecognized(_)));
    }
}
