//! Audio playback for synthesized speech.
//!
//! The TTS API returns base64 encoded OGG/Opus. [`EncodedAudio`] wraps that
//! payload and [`AudioSink`] is whatever plays it: [`SystemAudio`] writes it
//! to a temp file and hands it to a system player.

use std::future::Future;
use std::path::Path;

use base64::Engine;
use base64::engine::general_purpose::STANDARD as BASE64;
use tempfile::NamedTempFile;

use crate::errors::PlaybackError;

/// MIME type (with codec) of the synthesized audio.
pub const AUDIO_MIME_TYPE: &str = "audio/ogg;codecs=opus";

/// Extension used for temporary audio files.
const AUDIO_EXTENSION: &str = "ogg";

// ============================================================================
// Audio Players
// ============================================================================

/// Players able to decode OGG/Opus, in order of preference.
///
/// afplay (macOS), paplay and aplay cannot open Ogg containers and are
/// left out on every platform.
const OGG_PLAYERS: &[&str] = &["mpv", "ffplay", "play"];

// ============================================================================
// Encoded Audio
// ============================================================================

/// Base64 encoded OGG/Opus audio as returned by the synthesis endpoint.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EncodedAudio {
    base64: String,
}

impl EncodedAudio {
    pub fn new(base64: impl Into<String>) -> Self {
        Self {
            base64: base64.into(),
        }
    }

    /// The base64 payload.
    pub fn as_base64(&self) -> &str {
        &self.base64
    }

    /// Decodes the payload into raw OGG bytes.
    ///
    /// ## Errors
    ///
    /// Returns `PlaybackError::Decode` if the payload is not valid base64.
    pub fn decode(&self) -> Result<Vec<u8>, PlaybackError> {
        Ok(BASE64.decode(self.base64.trim())?)
    }

    /// The payload as a playable `data:` URI.
    ///
    /// ## Examples
    ///
    /// ```
    /// use read_aloud::playback::EncodedAudio;
    ///
    /// let audio = EncodedAudio::new("T2dnUw==");
    /// assert_eq!(audio.data_uri(), "data:audio/ogg;codecs=opus;base64,T2dnUw==");
    /// ```
    pub fn data_uri(&self) -> String {
        format!("data:{AUDIO_MIME_TYPE};base64,{}", self.base64)
    }
}

// ============================================================================
// Sinks
// ============================================================================

/// Something that can play synthesized audio.
pub trait AudioSink: Send + Sync {
    /// Plays `audio`, resolving once playback has finished.
    fn play(&self, audio: &EncodedAudio) -> impl Future<Output = Result<(), PlaybackError>> + Send;
}

/// Plays audio through the first OGG capable player found on the host.
#[derive(Debug, Clone, Copy, Default)]
pub struct SystemAudio;

impl AudioSink for SystemAudio {
    async fn play(&self, audio: &EncodedAudio) -> Result<(), PlaybackError> {
        let bytes = audio.decode()?;
        play_audio_bytes(&bytes).await
    }
}

// ============================================================================
// Player Detection
// ============================================================================

/// Returns the first OGG capable audio player on the `PATH`.
pub fn get_audio_player() -> Option<&'static str> {
    OGG_PLAYERS
        .iter()
        .copied()
        .find(|player| which::which(player).is_ok())
}

// ============================================================================
// Playback Functions
// ============================================================================

/// Plays OGG bytes by writing them to a temporary file and invoking the
/// system player. The temp file is removed when this returns.
///
/// ## Errors
///
/// Returns `PlaybackError` if no player is available, the temp file cannot
/// be written, or the player fails.
pub async fn play_audio_bytes(data: &[u8]) -> Result<(), PlaybackError> {
    let temp_file = NamedTempFile::with_suffix(format!(".{AUDIO_EXTENSION}"))
        .map_err(|source| PlaybackError::TempFile { source })?;

    tokio::fs::write(temp_file.path(), data).await?;

    play_audio_file(temp_file.path()).await
}

/// Plays an OGG file with the system player.
pub async fn play_audio_file(path: &Path) -> Result<(), PlaybackError> {
    let player = get_audio_player().ok_or_else(|| PlaybackError::NoAudioPlayer {
        tried: OGG_PLAYERS.join(", "),
    })?;

    let args = build_player_args(player, path);

    tracing::debug!(
        player = player,
        path = %path.display(),
        "Playing audio file"
    );

    let output = tokio::process::Command::new(player)
        .args(&args)
        .output()
        .await
        .map_err(|source| PlaybackError::ProcessSpawnFailed {
            player: player.to_string(),
            source,
        })?;

    if !output.status.success() {
        return Err(PlaybackError::PlaybackFailed {
            player: player.to_string(),
            stderr: String::from_utf8_lossy(&output.stderr).to_string(),
        });
    }

    Ok(())
}

/// Builds the command-line arguments for the audio player.
fn build_player_args(player: &str, path: &Path) -> Vec<String> {
    let path_str = path.to_string_lossy().to_string();

    match player {
        "ffplay" => vec![
            "-nodisp".to_string(),
            "-autoexit".to_string(),
            "-loglevel".to_string(),
            "quiet".to_string(),
            path_str,
        ],
        "mpv" => vec![
            "--no-video".to_string(),
            "--really-quiet".to_string(),
            path_str,
        ],
        "play" => vec!["-q".to_string(), path_str],
        _ => vec![path_str],
    }
}
