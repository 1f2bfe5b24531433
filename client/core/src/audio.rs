//! Audio Playback Seam
//!
//! Spoken replies carry an MPEG track. The core does not decode audio; it
//! hands the bytes to an [`AudioPlayer`] and asks it for the playback
//! position while highlighting words.
//!
//! Players are clock-driven: every call takes the caller's `now`, so the
//! controller and its tests share one notion of time.

use std::path::PathBuf;
use std::process::Stdio;
use std::time::{Duration, Instant};

use tokio::process::{Child, Command};

/// Audio playback errors
#[derive(Debug, thiserror::Error)]
pub enum AudioError {
    /// Could not write the audio file for the external player
    #[error("failed to write audio to {path}: {source}")]
    Io {
        /// File that was being written
        path: PathBuf,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// External player could not be started
    #[error("failed to start audio player {program:?}: {source}")]
    Spawn {
        /// Program that was launched
        program: String,
        /// The underlying IO error
        source: std::io::Error,
    },

    /// No player command configured
    #[error("no audio player command configured")]
    NoCommand,
}

/// Something that can play one reply's audio at a time
pub trait AudioPlayer: Send {
    /// Start playing `audio`, stopping anything already playing
    ///
    /// `duration_hint` is the expected track length (end of the last word).
    fn play(&mut self, audio: &[u8], duration_hint: Duration, now: Instant)
        -> Result<(), AudioError>;

    /// Playback position in seconds
    fn position(&self, now: Instant) -> f64;

    /// Whether playback is still running
    fn is_playing(&mut self, now: Instant) -> bool;

    /// Stop playback; safe to call when idle
    fn stop(&mut self);
}

/// Silent player that "plays" for the hinted duration
#[derive(Clone, Debug, Default)]
pub struct ClockPlayer {
    started_at: Option<Instant>,
    duration: Duration,
}

impl ClockPlayer {
    /// Create an idle player
    pub fn new() -> Self {
        Self::default()
    }
}

impl AudioPlayer for ClockPlayer {
    fn play(
        &mut self,
        audio: &[u8],
        duration_hint: Duration,
        now: Instant,
    ) -> Result<(), AudioError> {
        tracing::debug!(bytes = audio.len(), ?duration_hint, "Clock playback started");
        self.started_at = Some(now);
        self.duration = duration_hint;
        Ok(())
    }

    fn position(&self, now: Instant) -> f64 {
        self.started_at
            .map_or(0.0, |s| now.saturating_duration_since(s).as_secs_f64())
    }

    fn is_playing(&mut self, now: Instant) -> bool {
        match self.started_at {
            Some(s) if now.saturating_duration_since(s) < self.duration => true,
            Some(_) => {
                self.started_at = None;
                false
            }
            None => false,
        }
    }

    fn stop(&mut self) {
        self.started_at = None;
    }
}

/// Grace period past the hint before a still-running player is stopped
const OVERRUN_GRACE: Duration = Duration::from_secs(2);

/// Player that shells out to an external program (e.g. `mpv --no-video`)
pub struct CommandPlayer {
    command: Vec<String>,
    cache_dir: PathBuf,
    child: Option<Child>,
    started_at: Option<Instant>,
    duration: Duration,
}

impl CommandPlayer {
    /// Create a player that runs `command <file>` for each reply
    pub fn new(command: Vec<String>, cache_dir: impl Into<PathBuf>) -> Self {
        Self {
            command,
            cache_dir: cache_dir.into(),
            child: None,
            started_at: None,
            duration: Duration::ZERO,
        }
    }

    fn write_track(&self, audio: &[u8]) -> Result<PathBuf, AudioError> {
        let path = self.cache_dir.join("reply.mp3");
        std::fs::create_dir_all(&self.cache_dir)
            .and_then(|()| std::fs::write(&path, audio))
            .map_err(|source| AudioError::Io {
                path: path.clone(),
                source,
            })?;
        Ok(path)
    }
}

impl std::fmt::Debug for CommandPlayer {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        f.debug_struct("CommandPlayer")
            .field("command", &self.command)
            .field("playing", &self.child.is_some())
            .finish_non_exhaustive()
    }
}

impl AudioPlayer for CommandPlayer {
    fn play(
        &mut self,
        audio: &[u8],
        duration_hint: Duration,
        now: Instant,
    ) -> Result<(), AudioError> {
        self.stop();

        let (program, args) = self.command.split_first().ok_or(AudioError::NoCommand)?;
        let path = self.write_track(audio)?;

        let child = Command::new(program)
            .args(args)
            .arg(&path)
            .stdin(Stdio::null())
            .stdout(Stdio::null())
            .stderr(Stdio::null())
            .kill_on_drop(true)
            .spawn()
            .map_err(|source| AudioError::Spawn {
                program: program.clone(),
                source,
            })?;

        tracing::info!(program = %program, bytes = audio.len(), "Audio playback started");
        self.child = Some(child);
        self.started_at = Some(now);
        self.duration = duration_hint;
        Ok(())
    }

    fn position(&self, now: Instant) -> f64 {
        self.started_at
            .map_or(0.0, |s| now.saturating_duration_since(s).as_secs_f64())
    }

    fn is_playing(&mut self, now: Instant) -> bool {
        let Some(child) = self.child.as_mut() else {
            return false;
        };

        let exited = match child.try_wait() {
            Ok(Some(status)) => {
                tracing::debug!(%status, "Audio player exited");
                true
            }
            Ok(None) => false,
            Err(e) => {
                tracing::warn!(error = %e, "Failed to poll audio player");
                true
            }
        };

        let overran = self
            .started_at
            .is_some_and(|s| now.saturating_duration_since(s) >= self.duration + OVERRUN_GRACE);

        if exited || overran {
            self.stop();
            return false;
        }
        true
    }

    fn stop(&mut self) {
        if let Some(mut child) = self.child.take() {
            if let Err(e) = child.start_kill() {
                tracing::debug!(error = %e, "Audio player already gone");
            }
        }
        self.started_at = None;
    }
}
