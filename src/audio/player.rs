// Playback session
// Keeps at most one source playing and tracks which one is current

use std::fmt;
use std::sync::Arc;
use tokio::sync::mpsc::{self, UnboundedReceiver, UnboundedSender};

use super::buffer::AudioBuffer;
use crate::error::PlaybackError;

/// Identity of one playback instance. Never reused within a session.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord)]
pub struct SourceId(u64);

impl SourceId {
    pub fn get(self) -> u64 {
        self.0
    }

    #[cfg(test)]
    pub(crate) fn from_raw(id: u64) -> Self {
        Self(id)
    }
}

impl fmt::Display for SourceId {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum EndReason {
    /// Played through to the last frame.
    Finished,
    /// Halted by `stop`.
    Stopped,
    /// The output stream broke mid-playback.
    Failed,
}

/// Sent by a sink when one of its sources ends.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct PlaybackEvent {
    pub source: SourceId,
    pub reason: EndReason,
}

pub type EventSender = UnboundedSender<PlaybackEvent>;

/// Something that can render an `AudioBuffer`.
///
/// Implementations report the end of every started source on `events`,
/// whether it ran out or was stopped.
pub trait AudioSink {
    fn start(
        &self,
        id: SourceId,
        buffer: Arc<AudioBuffer>,
        events: EventSender,
    ) -> Result<(), PlaybackError>;

    /// Halt `id`. Returns `PlaybackError::SourceFinished` if it is no longer playing.
    fn stop(&self, id: SourceId) -> Result<(), PlaybackError>;
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Playing,
}

pub struct PlaybackSession {
    active: Option<SourceId>,
    next_id: u64,
    events_tx: EventSender,
    events_rx: UnboundedReceiver<PlaybackEvent>,
}

impl PlaybackSession {
    pub fn new() -> Self {
        let (events_tx, events_rx) = mpsc::unbounded_channel();
        Self {
            active: None,
            next_id: 1,
            events_tx,
            events_rx,
        }
    }

    pub fn state(&self) -> PlayerState {
        match self.active {
            Some(_) => PlayerState::Playing,
            None => PlayerState::Idle,
        }
    }

    pub fn is_playing(&self) -> bool {
        self.active.is_some()
    }

    pub fn active_source(&self) -> Option<SourceId> {
        self.active
    }

    /// Start `buffer`, stopping whatever was playing first.
    ///
    /// If the sink cannot start the new source the session is left idle.
    pub fn play<S: AudioSink + ?Sized>(
        &mut self,
        sink: &S,
        buffer: Arc<AudioBuffer>,
    ) -> Result<SourceId, PlaybackError> {
        self.stop(sink);

        let id = SourceId(self.next_id);
        self.next_id += 1;

        sink.start(id, buffer, self.events_tx.clone())?;
        self.active = Some(id);
        log::debug!("Playback started: source {}", id);

        Ok(id)
    }

    /// Stop the active source. No-op when idle.
    pub fn stop<S: AudioSink + ?Sized>(&mut self, sink: &S) {
        let Some(id) = self.active.take() else {
            return;
        };

        match sink.stop(id) {
            Ok(()) => log::debug!("Playback stopped: source {}", id),
            Err(PlaybackError::SourceFinished(_)) => {}
            Err(e) => log::warn!("Failed to stop source {}: {}", id, e),
        }
    }

    /// Apply one end-of-playback event. Returns true if it ended the active source.
    pub fn handle_event(&mut self, event: PlaybackEvent) -> bool {
        if self.active == Some(event.source) {
            self.active = None;
            log::debug!("Playback ended ({:?}): source {}", event.reason, event.source);
            true
        } else {
            log::trace!("Ignoring stale end event for source {}", event.source);
            false
        }
    }

    /// Drain pending events without waiting.
    pub fn poll_events(&mut self) {
        while let Ok(event) = self.events_rx.try_recv() {
            self.handle_event(event);
        }
    }

    /// Wait for the next end event and apply it.
    pub async fn next_event(&mut self) -> PlaybackEvent {
        // The session holds a sender itself, so the channel never closes.
        loop {
            if let Some(event) = self.events_rx.recv().await {
                self.handle_event(event);
                return event;
            }
        }
    }

    /// Wait until the session goes idle.
    pub async fn wait_until_idle(&mut self) {
        self.poll_events();
        while self.is_playing() {
            self.next_event().await;
        }
    }
}

impl Default for PlaybackSession {
    fn default() -> Self {
        Self::new()
    }
}
