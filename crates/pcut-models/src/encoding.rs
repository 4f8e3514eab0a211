//! Video encoding configuration.

use schemars::JsonSchema;
use serde::{Deserialize, Serialize};

/// Default video codec (H.264 for widest playback compatibility).
pub const DEFAULT_VIDEO_CODEC: &str = "libx264";
/// Default audio codec.
pub const DEFAULT_AUDIO_CODEC: &str = "aac";
/// Default encoder preset, balancing speed and compression.
pub const DEFAULT_PRESET: &str = "medium";
/// Default audio bitrate.
pub const DEFAULT_AUDIO_BITRATE: &str = "128k";

/// CRF per quality tier. Lower means higher quality and larger files.
pub const CRF_HIGH: u8 = 20;
pub const CRF_MEDIUM: u8 = 23;
pub const CRF_LOW: u8 = 28;

/// Encoding settings for a transcode run.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize, JsonSchema)]
pub struct EncodingConfig {
    #[serde(default = "default_codec")]
    pub codec: String,
    #[serde(default = "default_preset")]
    pub preset: String,
    /// Constant Rate Factor (0-51).
    #[serde(default = "default_crf")]
    pub crf: u8,
    #[serde(default = "default_audio_codec")]
    pub audio_codec: String,
    #[serde(default = "default_audio_bitrate")]
    pub audio_bitrate: String,
}

fn default_codec() -> String {
    DEFAULT_VIDEO_CODEC.to_string()
}

fn default_preset() -> String {
    DEFAULT_PRESET.to_string()
}

fn default_crf() -> u8 {
    CRF_MEDIUM
}

fn default_audio_codec() -> String {
    DEFAULT_AUDIO_CODEC.to_string()
}

fn default_audio_bitrate() -> String {
    DEFAULT_AUDIO_BITRATE.to_string()
}

impl Default for EncodingConfig {
    fn default() -> Self {
        Self {
            codec: default_codec(),
            preset: default_preset(),
            crf: default_crf(),
            audio_codec: default_audio_codec(),
            audio_bitrate: default_audio_bitrate(),
        }
    }
}

impl EncodingConfig {
    /// Map a quality tier to an encoding configuration. Total: unknown
    /// tiers fall back to the medium CRF rather than failing.
    pub fn for_quality(quality: &str) -> Self {
        let crf = match quality {
            "high" => CRF_HIGH,
            "medium" => CRF_MEDIUM,
            "low" => CRF_LOW,
            _ => CRF_MEDIUM,
        };
        Self {
            crf,
            ..Default::default()
        }
    }

    /// FFmpeg output arguments for these codec choices.
    pub fn to_output_args(&self) -> Vec<String> {
        vec![
            "-c:v".to_string(),
            self.codec.clone(),
            "-preset".to_string(),
            self.preset.clone(),
            "-crf".to_string(),
            self.crf.to_string(),
            "-c:a".to_string(),
            self.audio_codec.clone(),
            "-b:a".to_string(),
            self.audio_bitrate.clone(),
        ]
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn quality_tiers_map_to_crf() {
        assert_eq!(EncodingConfig::for_quality("high").crf, 20);
        assert_eq!(EncodingConfig::for_quality("medium").crf, 23);
        assert_eq!(EncodingConfig::for_quality("low").crf, 28);
    }

    #[test]
    fn unknown_quality_falls_back_to_medium() {
        assert_eq!(EncodingConfig::for_quality("ultra").crf, CRF_MEDIUM);
        assert_eq!(EncodingConfig::for_quality("").crf, CRF_MEDIUM);
    }

    #[test]
    fn output_args_carry_codec_and_crf() {
        let args = EncodingConfig::for_quality("high").to_output_args();
        assert_eq!(args[0], "-c:v");
        assert_eq!(args[1], "libx264");
        let crf_pos = args.iter().position(|a| a == "-crf").unwrap();
        assert_eq!(args[crf_pos + 1], "20");
        assert!(args.contains(&"-b:a".to_string()));
    }

    #[test]
    fn deserializes_with_defaults() {
        let config: EncodingConfig = serde_json::from_str("{}").unwrap();
        assert_eq!(config, EncodingConfig::default());
    }
}
