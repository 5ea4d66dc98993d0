//! Playback session engine.
//!
//! The engine owns at most one adaptive session, one audio gain stage and one
//! subtitle resource at a time. Loading a new manifest tears the previous
//! session down completely before anything new is created. Host events are
//! tagged with the [`SessionId`] returned by [`PlaybackEngine::load`]; events
//! for an older session are dropped.

use tracing::{debug, info, warn};

use crate::backend::{
    AdaptiveConfig, AdaptiveSession, AudioGraph, Backends, HLS_MIME, SubtitleHandle, TextTrack,
};
use crate::config::PlayerConfig;
use crate::error::PlayerError;
use crate::manifest::is_hls_url;
use crate::quality::{AUTO_QUALITY, QualityLevel};
use crate::shortcuts::PlayerCommand;
use crate::state::{PlaybackSnapshot, PlaybackState, SessionId};
use crate::subtitle::to_webvtt;
use crate::volume::{MAX_VOLUME, MIN_VOLUME, map_volume};

const MIN_RATE: f64 = 0.25;
const MAX_RATE: f64 = 4.0;

/// Events raised by the adaptive session.
#[derive(Debug, Clone, PartialEq)]
pub enum AdaptiveEvent {
    ManifestParsed { levels: Vec<QualityLevel> },
    LevelLoaded,
    Error { fatal: bool, details: String },
}

/// Events raised by the media element.
#[derive(Debug, Clone, PartialEq)]
pub enum MediaEvent {
    LoadedMetadata { duration: f64 },
    Waiting,
    Playing,
    Paused,
    TimeUpdate { current_time: f64 },
    Progress { buffered_end: f64 },
    Ended,
    Error { message: String },
}

/// How the current source is being played.
enum Source {
    Adaptive(Box<dyn AdaptiveSession>),
    Native,
}

pub struct PlaybackEngine {
    config: PlayerConfig,
    backends: Backends,
    state: PlaybackState,
    next_session: u64,
    session: Option<SessionId>,
    source: Option<Source>,
    audio: Option<Box<dyn AudioGraph>>,
    subtitle: Option<TextTrack>,
    levels: Vec<QualityLevel>,
    current_quality: i32,
    volume: f64,
    muted: bool,
    playback_rate: f64,
    current_time: f64,
    duration: f64,
    buffered_end: f64,
    error: Option<String>,
}

impl PlaybackEngine {
    pub fn new(config: PlayerConfig, backends: Backends) -> Self {
        Self {
            config,
            backends,
            state: PlaybackState::Idle,
            next_session: 0,
            session: None,
            source: None,
            audio: None,
            subtitle: None,
            levels: Vec::new(),
            current_quality: AUTO_QUALITY,
            volume: 1.0,
            muted: false,
            playback_rate: 1.0,
            current_time: 0.0,
            duration: 0.0,
            buffered_end: 0.0,
            error: None,
        }
    }

    pub fn state(&self) -> PlaybackState {
        self.state
    }

    pub fn session_id(&self) -> Option<SessionId> {
        self.session
    }

    pub fn quality_levels(&self) -> &[QualityLevel] {
        &self.levels
    }

    pub fn current_quality(&self) -> i32 {
        self.current_quality
    }

    pub fn volume(&self) -> f64 {
        self.volume
    }

    pub fn is_muted(&self) -> bool {
        self.muted
    }

    pub fn subtitle(&self) -> Option<&TextTrack> {
        self.subtitle.as_ref()
    }

    pub fn snapshot(&self) -> PlaybackSnapshot {
        PlaybackSnapshot {
            session: self.session,
            state: self.state,
            current_time: self.current_time,
            duration: self.duration,
            buffered_end: self.buffered_end,
            volume: self.volume,
            muted: self.muted,
            playback_rate: self.playback_rate,
            is_playing: self.state.is_playing(),
            is_buffering: matches!(self.state, PlaybackState::Buffering { .. }),
            has_error: self.state == PlaybackState::Error,
            error: self.error.clone(),
            quality_levels: self.levels.clone(),
            current_quality: self.current_quality,
            subtitle_label: self.subtitle.as_ref().map(|t| t.label.clone()),
        }
    }

    /// Starts a new session for `url`, replacing any current one.
    pub fn load(&mut self, url: &str) -> Result<SessionId, PlayerError> {
        if self.state == PlaybackState::Closed {
            return Err(PlayerError::SessionClosed);
        }
        let url = url.trim();
        if url.is_empty() {
            return Err(PlayerError::InvalidUrl("empty manifest url".to_string()));
        }

        self.teardown();

        self.next_session += 1;
        let session = SessionId(self.next_session);
        self.session = Some(session);
        self.state = PlaybackState::Loading;
        self.error = None;
        self.current_time = 0.0;
        self.duration = 0.0;
        self.buffered_end = 0.0;

        let hls = is_hls_url(url);
        let adaptive = hls && self.backends.adaptive.is_supported();
        if hls && !adaptive && !self.backends.media.can_play_type(HLS_MIME) {
            let message = format!("no way to play {url}");
            self.fail(message.clone());
            return Err(PlayerError::UnsupportedSource(message));
        }

        self.audio = self.backends.audio.create();
        if self.audio.is_none() {
            debug!("No audio processing, volume limited to 100%");
        }
        self.apply_volume(self.volume);

        if adaptive {
            let mut adaptive = self.backends.adaptive.create_session(&AdaptiveConfig {
                back_buffer_secs: self.config.back_buffer_secs,
                enable_worker: self.config.enable_worker,
                low_latency: self.config.low_latency,
            });
            adaptive.load_source(url);
            adaptive.attach_media();
            self.source = Some(Source::Adaptive(adaptive));
            info!(%session, url, "Adaptive session started");
        } else {
            self.backends.media.set_source(url);
            self.source = Some(Source::Native);
            info!(%session, url, "Native playback started");
        }

        Ok(session)
    }

    /// Ends the session for good; later loads are refused.
    pub fn close(&mut self) {
        if self.state == PlaybackState::Closed {
            return;
        }
        self.teardown();
        self.backends.media.pause();
        self.backends.media.clear_source();
        self.session = None;
        self.state = PlaybackState::Closed;
        info!("Player closed");
    }

    pub fn handle_adaptive_event(&mut self, session: SessionId, event: AdaptiveEvent) -> bool {
        if !self.accepts(session) {
            debug!(%session, ?event, "Ignoring stale adaptive event");
            return false;
        }

        match event {
            AdaptiveEvent::ManifestParsed { levels } => {
                debug!(%session, levels = levels.len(), "Manifest parsed");
                self.levels = levels;
                self.current_quality = AUTO_QUALITY;
                self.media_ready();
            }
            AdaptiveEvent::LevelLoaded => self.resume_from_buffering(),
            AdaptiveEvent::Error { fatal: true, details } => {
                self.fail(details);
            }
            AdaptiveEvent::Error {
                fatal: false,
                details,
            } => {
                debug!(%session, %details, "Recoverable adaptive error");
            }
        }
        true
    }

    pub fn handle_media_event(&mut self, session: SessionId, event: MediaEvent) -> bool {
        if !self.accepts(session) {
            debug!(%session, ?event, "Ignoring stale media event");
            return false;
        }

        match event {
            MediaEvent::LoadedMetadata { duration } => {
                if duration.is_finite() && duration >= 0.0 {
                    self.duration = duration;
                }
                if matches!(self.source, Some(Source::Native)) {
                    self.media_ready();
                } else {
                    self.resume_from_buffering();
                }
            }
            MediaEvent::Waiting => {
                self.state = match self.state {
                    PlaybackState::Playing => PlaybackState::Buffering {
                        resume_playing: true,
                    },
                    PlaybackState::Paused => PlaybackState::Buffering {
                        resume_playing: false,
                    },
                    other => other,
                };
            }
            MediaEvent::Playing => {
                if matches!(
                    self.state,
                    PlaybackState::Ready | PlaybackState::Paused | PlaybackState::Buffering { .. }
                ) {
                    self.state = PlaybackState::Playing;
                }
            }
            MediaEvent::Paused | MediaEvent::Ended => {
                self.state = match self.state {
                    PlaybackState::Playing => PlaybackState::Paused,
                    PlaybackState::Buffering { .. } => PlaybackState::Buffering {
                        resume_playing: false,
                    },
                    other => other,
                };
            }
            MediaEvent::TimeUpdate { current_time } => self.current_time = current_time,
            MediaEvent::Progress { buffered_end } => self.buffered_end = buffered_end,
            MediaEvent::Error { message } => self.fail(message),
        }
        true
    }

    pub fn play(&mut self) -> Result<(), PlayerError> {
        self.ensure_active()?;
        match self.state {
            PlaybackState::Loading => Ok(()),
            PlaybackState::Buffering { .. } => {
                self.state = PlaybackState::Buffering {
                    resume_playing: true,
                };
                Ok(())
            }
            _ => match self.backends.media.play() {
                Ok(()) => {
                    self.state = PlaybackState::Playing;
                    Ok(())
                }
                Err(e) => {
                    self.fail(e.to_string());
                    Err(e)
                }
            },
        }
    }

    pub fn pause(&mut self) -> Result<(), PlayerError> {
        self.ensure_active()?;
        self.backends.media.pause();
        self.state = match self.state {
            PlaybackState::Buffering { .. } => PlaybackState::Buffering {
                resume_playing: false,
            },
            PlaybackState::Playing => PlaybackState::Paused,
            other => other,
        };
        Ok(())
    }

    pub fn toggle_play(&mut self) -> Result<(), PlayerError> {
        if self.state.is_playing() {
            self.pause()
        } else {
            self.play()
        }
    }

    /// Seeks to `seconds`, clamped to the known duration.
    pub fn seek(&mut self, seconds: f64) -> Result<f64, PlayerError> {
        self.ensure_active()?;
        let mut target = if seconds.is_finite() { seconds } else { 0.0 };
        if self.duration > 0.0 {
            target = target.min(self.duration);
        }
        target = target.max(0.0);

        self.backends.media.set_current_time(target);
        self.current_time = target;
        Ok(target)
    }

    pub fn seek_by(&mut self, delta: f64) -> Result<f64, PlayerError> {
        self.seek(self.current_time + delta)
    }

    /// Sets the volume in `[0, 2]` and returns the effective value.
    pub fn set_volume(&mut self, volume: f64) -> f64 {
        let effective = self.apply_volume(volume);
        self.volume = effective;
        self.muted = effective == 0.0;
        self.backends.media.set_muted(self.muted);
        effective
    }

    pub fn adjust_volume(&mut self, delta: f64) -> f64 {
        self.set_volume((self.volume + delta).clamp(MIN_VOLUME, MAX_VOLUME))
    }

    pub fn toggle_mute(&mut self) -> bool {
        if self.muted {
            self.muted = false;
            if self.volume == 0.0 {
                self.volume = self.apply_volume(1.0);
            }
        } else {
            self.muted = true;
        }
        self.backends.media.set_muted(self.muted);
        self.muted
    }

    pub fn set_playback_rate(&mut self, rate: f64) -> f64 {
        let rate = if rate.is_finite() {
            rate.clamp(MIN_RATE, MAX_RATE)
        } else {
            1.0
        };
        self.playback_rate = rate;
        self.backends.media.set_playback_rate(rate);
        rate
    }

    /// Selects a quality level, or automatic selection with `-1`.
    pub fn set_quality(&mut self, index: i32) -> Result<(), PlayerError> {
        self.ensure_active()?;
        let valid = index == AUTO_QUALITY
            || usize::try_from(index).is_ok_and(|i| i < self.levels.len());
        if !valid {
            return Err(PlayerError::InvalidQuality {
                index,
                available: self.levels.len(),
            });
        }
        let Some(Source::Adaptive(session)) = self.source.as_mut() else {
            return Err(PlayerError::NotAdaptive);
        };

        session.set_current_level(index);
        self.current_quality = index;
        Ok(())
    }

    /// Replaces the subtitle track. The previous resource is revoked first.
    pub fn load_subtitle(
        &mut self,
        text: &str,
        declared_format: Option<&str>,
        label: &str,
        language: &str,
    ) -> Result<SubtitleHandle, PlayerError> {
        self.ensure_active()?;
        if self.session.is_none() {
            return Err(PlayerError::NothingLoaded);
        }

        self.clear_subtitle();

        let vtt = to_webvtt(text, declared_format);
        let handle = self.backends.subtitles.create(&vtt);
        let track = TextTrack {
            handle: handle.clone(),
            label: if label.is_empty() { "Subtitles" } else { label }.to_string(),
            language: if language.is_empty() { "en" } else { language }.to_string(),
        };
        self.backends.media.attach_text_track(&track);
        debug!(label = %track.label, "Subtitle attached");
        self.subtitle = Some(track);
        Ok(handle)
    }

    pub fn clear_subtitle(&mut self) {
        if let Some(track) = self.subtitle.take() {
            self.backends.media.detach_text_track(&track.handle);
            self.backends.subtitles.revoke(&track.handle);
        }
    }

    /// Runs a shortcut command. Menu and fullscreen commands belong to the UI
    /// and return `Ok(false)`.
    pub fn apply(&mut self, command: PlayerCommand) -> Result<bool, PlayerError> {
        match command {
            PlayerCommand::TogglePlay => self.toggle_play()?,
            PlayerCommand::SeekBy(delta) => {
                self.seek_by(delta)?;
            }
            PlayerCommand::VolumeBy(delta) => {
                self.adjust_volume(delta);
            }
            PlayerCommand::ToggleMute => {
                self.toggle_mute();
            }
            PlayerCommand::ClosePlayer => self.close(),
            PlayerCommand::ToggleFullscreen
            | PlayerCommand::ToggleQualityMenu
            | PlayerCommand::ToggleSubtitleMenu
            | PlayerCommand::CloseMenu => return Ok(false),
        }
        Ok(true)
    }

    /// Releases every per-session resource in one step.
    fn teardown(&mut self) {
        if let Some(Source::Adaptive(mut session)) = self.source.take() {
            session.destroy();
        }
        if let Some(mut audio) = self.audio.take() {
            audio.close();
        }
        self.clear_subtitle();
        self.levels.clear();
        self.current_quality = AUTO_QUALITY;
    }

    fn accepts(&self, session: SessionId) -> bool {
        self.session == Some(session) && !self.state.is_terminal()
    }

    fn ensure_active(&self) -> Result<(), PlayerError> {
        match self.state {
            PlaybackState::Closed => Err(PlayerError::SessionClosed),
            PlaybackState::Idle => Err(PlayerError::NothingLoaded),
            // only a new load leaves the error state
            PlaybackState::Error => Err(PlayerError::Playback(
                self.error
                    .clone()
                    .unwrap_or_else(|| "playback failed".to_string()),
            )),
            _ => Ok(()),
        }
    }

    /// Media can start; autoplay if configured.
    fn media_ready(&mut self) {
        if self.state != PlaybackState::Loading {
            self.resume_from_buffering();
            return;
        }
        self.state = PlaybackState::Ready;
        if self.config.autoplay
            && let Err(e) = self.backends.media.play()
        {
            self.fail(e.to_string());
            return;
        }
        if self.config.autoplay {
            self.state = PlaybackState::Playing;
        }
    }

    fn resume_from_buffering(&mut self) {
        if let PlaybackState::Buffering { resume_playing } = self.state {
            self.state = if resume_playing {
                PlaybackState::Playing
            } else {
                PlaybackState::Paused
            };
        }
    }

    fn fail(&mut self, message: String) {
        if self.state.is_terminal() {
            return;
        }
        warn!(session = ?self.session, error = %message, "Playback failed");
        self.error = Some(message);
        self.state = PlaybackState::Error;
    }

    /// Pushes `volume` to the element and gain stage; returns the effective value.
    fn apply_volume(&mut self, volume: f64) -> f64 {
        let mapping = map_volume(volume, self.audio.is_some());
        self.backends.media.set_volume(mapping.native);
        if let Some(audio) = self.audio.as_mut() {
            audio.set_gain(mapping.gain);
        }
        mapping.effective
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::backend::{
        AdaptiveBackend, AudioGraphFactory, MediaElement, SubtitleResources,
    };
    use std::sync::{Arc, Mutex};

    #[derive(Debug, Clone, PartialEq)]
    enum Call {
        SetSource(String),
        ClearSource,
        Play,
        Pause,
        CurrentTime(f64),
        Volume(f64),
        Muted(bool),
        Rate(f64),
        AttachTrack(String),
        DetachTrack(String),
        CreateSession(AdaptiveConfig),
        LoadSource(usize, String),
        Attach(usize),
        Level(usize, i32),
        Destroy(usize),
        CreateGraph(usize),
        Gain(usize, f64),
        CloseGraph(usize),
        CreateSubtitle(String),
        Revoke(String),
    }

    #[derive(Default)]
    struct Host {
        calls: Vec<Call>,
        sessions: usize,
        graphs: usize,
        blobs: usize,
        live_blobs: Vec<String>,
        live_tracks: Vec<String>,
        live_sessions: Vec<usize>,
        live_graphs: Vec<usize>,
        hls_supported: bool,
        native_hls: bool,
        audio_supported: bool,
        play_fails: bool,
        last_vtt: String,
    }

    type Shared = Arc<Mutex<Host>>;

    struct FakeMedia(Shared);
    struct FakeAdaptive(Shared);
    struct FakeSession(Shared, usize);
    struct FakeAudio(Shared);
    struct FakeGraph(Shared, usize);
    struct FakeSubtitles(Shared);

    impl MediaElement for FakeMedia {
        fn can_play_type(&self, _mime: &str) -> bool {
            self.0.lock().unwrap().native_hls
        }
        fn set_source(&mut self, url: &str) {
            self.0.lock().unwrap().calls.push(Call::SetSource(url.to_string()));
        }
        fn clear_source(&mut self) {
            self.0.lock().unwrap().calls.push(Call::ClearSource);
        }
        fn play(&mut self) -> Result<(), PlayerError> {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::Play);
            if host.play_fails {
                Err(PlayerError::Playback("autoplay blocked".to_string()))
            } else {
                Ok(())
            }
        }
        fn pause(&mut self) {
            self.0.lock().unwrap().calls.push(Call::Pause);
        }
        fn set_current_time(&mut self, seconds: f64) {
            self.0.lock().unwrap().calls.push(Call::CurrentTime(seconds));
        }
        fn set_volume(&mut self, volume: f64) {
            self.0.lock().unwrap().calls.push(Call::Volume(volume));
        }
        fn set_muted(&mut self, muted: bool) {
            self.0.lock().unwrap().calls.push(Call::Muted(muted));
        }
        fn set_playback_rate(&mut self, rate: f64) {
            self.0.lock().unwrap().calls.push(Call::Rate(rate));
        }
        fn attach_text_track(&mut self, track: &TextTrack) {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::AttachTrack(track.handle.0.clone()));
            host.live_tracks.push(track.handle.0.clone());
        }
        fn detach_text_track(&mut self, handle: &SubtitleHandle) {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::DetachTrack(handle.0.clone()));
            host.live_tracks.retain(|t| t != &handle.0);
        }
    }

    impl AdaptiveBackend for FakeAdaptive {
        fn is_supported(&self) -> bool {
            self.0.lock().unwrap().hls_supported
        }
        fn create_session(&mut self, config: &AdaptiveConfig) -> Box<dyn AdaptiveSession> {
            let mut host = self.0.lock().unwrap();
            host.sessions += 1;
            let id = host.sessions;
            host.calls.push(Call::CreateSession(config.clone()));
            host.live_sessions.push(id);
            Box::new(FakeSession(self.0.clone(), id))
        }
    }

    impl AdaptiveSession for FakeSession {
        fn load_source(&mut self, url: &str) {
            self.0.lock().unwrap().calls.push(Call::LoadSource(self.1, url.to_string()));
        }
        fn attach_media(&mut self) {
            self.0.lock().unwrap().calls.push(Call::Attach(self.1));
        }
        fn set_current_level(&mut self, level: i32) {
            self.0.lock().unwrap().calls.push(Call::Level(self.1, level));
        }
        fn destroy(&mut self) {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::Destroy(self.1));
            let id = self.1;
            host.live_sessions.retain(|s| *s != id);
        }
    }

    impl AudioGraphFactory for FakeAudio {
        fn create(&mut self) -> Option<Box<dyn AudioGraph>> {
            let mut host = self.0.lock().unwrap();
            if !host.audio_supported {
                return None;
            }
            host.graphs += 1;
            let id = host.graphs;
            host.calls.push(Call::CreateGraph(id));
            host.live_graphs.push(id);
            Some(Box::new(FakeGraph(self.0.clone(), id)))
        }
    }

    impl AudioGraph for FakeGraph {
        fn set_gain(&mut self, gain: f64) {
            self.0.lock().unwrap().calls.push(Call::Gain(self.1, gain));
        }
        fn close(&mut self) {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::CloseGraph(self.1));
            let id = self.1;
            host.live_graphs.retain(|g| *g != id);
        }
    }

    impl SubtitleResources for FakeSubtitles {
        fn create(&mut self, vtt: &str) -> SubtitleHandle {
            let mut host = self.0.lock().unwrap();
            host.blobs += 1;
            let handle = format!("blob:{}", host.blobs);
            host.calls.push(Call::CreateSubtitle(handle.clone()));
            host.live_blobs.push(handle.clone());
            host.last_vtt = vtt.to_string();
            SubtitleHandle(handle)
        }
        fn revoke(&mut self, handle: &SubtitleHandle) {
            let mut host = self.0.lock().unwrap();
            host.calls.push(Call::Revoke(handle.0.clone()));
            host.live_blobs.retain(|b| b != &handle.0);
        }
    }

    fn host() -> Host {
        Host {
            hls_supported: true,
            audio_supported: true,
            ..Default::default()
        }
    }

    fn engine_with(host: Host, config: PlayerConfig) -> (PlaybackEngine, Shared) {
        let shared = Arc::new(Mutex::new(host));
        let backends = Backends {
            media: Box::new(FakeMedia(shared.clone())),
            adaptive: Box::new(FakeAdaptive(shared.clone())),
            audio: Box::new(FakeAudio(shared.clone())),
            subtitles: Box::new(FakeSubtitles(shared.clone())),
        };
        (PlaybackEngine::new(config, backends), shared)
    }

    fn engine() -> (PlaybackEngine, Shared) {
        engine_with(host(), PlayerConfig::default())
    }

    fn levels(n: usize) -> Vec<QualityLevel> {
        (0..n)
            .map(|i| QualityLevel::new(i, 640 * (i as u64 + 1), 360 * (i as u64 + 1), 1_000_000, None))
            .collect()
    }

    fn last_calls(shared: &Shared, n: usize) -> Vec<Call> {
        let host = shared.lock().unwrap();
        host.calls[host.calls.len().saturating_sub(n)..].to_vec()
    }

    const A: &str = "https://cdn.example/a/master.m3u8";
    const B: &str = "https://cdn.example/b/master.m3u8";

    #[test]
    fn adaptive_load_populates_levels_after_manifest_parsed() {
        let (mut engine, shared) = engine();
        let session = engine.load(A).unwrap();

        assert_eq!(engine.state(), PlaybackState::Loading);
        assert!(engine.quality_levels().is_empty());
        {
            let host = shared.lock().unwrap();
            assert!(host.calls.contains(&Call::CreateSession(AdaptiveConfig {
                back_buffer_secs: 90,
                enable_worker: true,
                low_latency: false,
            })));
            assert!(host.calls.contains(&Call::LoadSource(1, A.to_string())));
            assert!(host.calls.contains(&Call::Attach(1)));
        }

        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(3) });
        assert_eq!(engine.quality_levels().len(), 3);
        assert_eq!(engine.current_quality(), AUTO_QUALITY);
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn new_manifest_resets_quality_selection() {
        let (mut engine, shared) = engine();
        let a = engine.load(A).unwrap();
        engine.handle_adaptive_event(a, AdaptiveEvent::ManifestParsed { levels: levels(3) });
        engine.set_quality(2).unwrap();
        assert_eq!(engine.current_quality(), 2);
        assert!(shared.lock().unwrap().calls.contains(&Call::Level(1, 2)));

        engine.load(B).unwrap();
        assert_eq!(engine.current_quality(), AUTO_QUALITY);
        assert!(engine.quality_levels().is_empty());
        assert!(!shared.lock().unwrap().calls.contains(&Call::Level(2, 2)));
    }

    #[test]
    fn invalid_quality_is_rejected() {
        let (mut engine, _) = engine();
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(2) });

        assert_eq!(
            engine.set_quality(2),
            Err(PlayerError::InvalidQuality {
                index: 2,
                available: 2
            })
        );
        assert!(engine.set_quality(-5).is_err());
        engine.set_quality(AUTO_QUALITY).unwrap();
    }

    #[test]
    fn native_source_has_no_quality_control() {
        let (mut engine, shared) = engine();
        let session = engine.load("https://cdn.example/movie.mp4").unwrap();
        assert!(shared
            .lock()
            .unwrap()
            .calls
            .contains(&Call::SetSource("https://cdn.example/movie.mp4".to_string())));

        engine.handle_media_event(session, MediaEvent::LoadedMetadata { duration: 7_200.0 });
        assert_eq!(engine.state(), PlaybackState::Playing);
        assert_eq!(engine.set_quality(AUTO_QUALITY), Err(PlayerError::NotAdaptive));
    }

    #[test]
    fn hls_without_adaptive_support_uses_native_when_possible() {
        let (mut engine, shared) = engine_with(
            Host {
                hls_supported: false,
                native_hls: true,
                ..host()
            },
            PlayerConfig::default(),
        );
        engine.load(A).unwrap();
        assert!(shared.lock().unwrap().calls.contains(&Call::SetSource(A.to_string())));
    }

    #[test]
    fn unplayable_source_is_an_error_state() {
        let (mut engine, shared) = engine_with(
            Host {
                hls_supported: false,
                native_hls: false,
                ..host()
            },
            PlayerConfig::default(),
        );
        let err = engine.load(A).unwrap_err();
        assert!(matches!(err, PlayerError::UnsupportedSource(_)));
        assert_eq!(engine.state(), PlaybackState::Error);
        assert!(engine.snapshot().has_error);

        let host = shared.lock().unwrap();
        assert_eq!(host.graphs, 0);
        assert!(host.live_graphs.is_empty());
        assert!(!host.calls.iter().any(|c| matches!(c, Call::SetSource(_))));
    }

    #[test]
    fn failed_session_refuses_controls_until_reload() {
        let (mut engine, shared) = engine();
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(3) });
        engine.handle_adaptive_event(
            session,
            AdaptiveEvent::Error {
                fatal: true,
                details: "bufferStalledError".to_string(),
            },
        );
        assert_eq!(engine.state(), PlaybackState::Error);
        let calls_before = shared.lock().unwrap().calls.len();

        assert_eq!(
            engine.play(),
            Err(PlayerError::Playback("bufferStalledError".to_string()))
        );
        assert!(engine.toggle_play().is_err());
        assert!(engine.set_quality(1).is_err());
        assert!(engine.seek(10.0).is_err());
        assert!(engine.load_subtitle("WEBVTT", None, "", "").is_err());
        assert_eq!(engine.state(), PlaybackState::Error);
        assert_eq!(shared.lock().unwrap().calls.len(), calls_before);

        engine.load(B).unwrap();
        assert_eq!(engine.state(), PlaybackState::Loading);
    }

    #[test]
    fn volume_mapping_drives_element_and_gain() {
        let (mut engine, shared) = engine();
        engine.load(A).unwrap();

        engine.set_volume(0.5);
        let calls = last_calls(&shared, 3);
        assert_eq!(calls[..2], [Call::Volume(0.5), Call::Gain(1, 1.0)]);

        assert_eq!(engine.set_volume(1.6), 1.6);
        let calls = last_calls(&shared, 3);
        assert_eq!(calls[..2], [Call::Volume(1.0), Call::Gain(1, 1.6)]);
    }

    #[test]
    fn volume_caps_without_audio_graph() {
        let (mut engine, shared) = engine_with(
            Host {
                audio_supported: false,
                ..host()
            },
            PlayerConfig::default(),
        );
        engine.load(A).unwrap();

        assert_eq!(engine.set_volume(1.6), 1.0);
        assert_eq!(engine.volume(), 1.0);
        assert!(shared.lock().unwrap().calls.contains(&Call::Volume(1.0)));
    }

    #[test]
    fn volume_shortcuts_clamp() {
        let (mut engine, _) = engine();
        engine.load(A).unwrap();
        engine.set_volume(1.98);
        engine.apply(PlayerCommand::VolumeBy(0.05)).unwrap();
        assert_eq!(engine.volume(), 2.0);

        engine.set_volume(0.02);
        engine.apply(PlayerCommand::VolumeBy(-0.05)).unwrap();
        assert_eq!(engine.volume(), 0.0);
        assert!(engine.is_muted());
    }

    #[test]
    fn unmuting_silent_player_restores_full_volume() {
        let (mut engine, _) = engine();
        engine.load(A).unwrap();
        engine.set_volume(0.0);
        assert!(engine.is_muted());

        assert!(!engine.toggle_mute());
        assert_eq!(engine.volume(), 1.0);
    }

    #[test]
    fn subtitle_swap_revokes_previous_resource() {
        let (mut engine, shared) = engine();
        engine.load(A).unwrap();

        let x = engine
            .load_subtitle("1\n00:00:01,000 --> 00:00:02,000\nX\n", Some("srt"), "English", "en")
            .unwrap();
        let y = engine
            .load_subtitle("WEBVTT\n\n00:01.000 --> 00:02.000\nY\n", Some("vtt"), "French", "fr")
            .unwrap();

        let host = shared.lock().unwrap();
        assert_eq!(host.live_blobs, vec![y.0.clone()]);
        assert_eq!(host.live_tracks, vec![y.0.clone()]);
        let revoke = host.calls.iter().position(|c| *c == Call::Revoke(x.0.clone()));
        let create_y = host
            .calls
            .iter()
            .position(|c| *c == Call::CreateSubtitle(y.0.clone()));
        assert!(revoke.unwrap() < create_y.unwrap());
        assert!(host.last_vtt.starts_with("WEBVTT\n\nSTYLE"));
        drop(host);

        assert_eq!(engine.subtitle().map(|t| t.language.as_str()), Some("fr"));
    }

    #[test]
    fn subtitle_requires_a_session() {
        let (mut engine, _) = engine();
        assert_eq!(
            engine.load_subtitle("WEBVTT", None, "", "").unwrap_err(),
            PlayerError::NothingLoaded
        );
    }

    #[test]
    fn fatal_errors_end_playback_non_fatal_do_not() {
        let (mut engine, _) = engine();
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(1) });

        engine.handle_adaptive_event(
            session,
            AdaptiveEvent::Error {
                fatal: false,
                details: "fragLoadError".to_string(),
            },
        );
        assert_eq!(engine.state(), PlaybackState::Playing);

        engine.handle_adaptive_event(
            session,
            AdaptiveEvent::Error {
                fatal: true,
                details: "manifestLoadError".to_string(),
            },
        );
        assert_eq!(engine.state(), PlaybackState::Error);
        assert_eq!(engine.snapshot().error.as_deref(), Some("manifestLoadError"));

        // no automatic recovery
        engine.handle_media_event(session, MediaEvent::Playing);
        assert_eq!(engine.state(), PlaybackState::Error);

        // a fresh load is allowed
        engine.load(B).unwrap();
        assert_eq!(engine.state(), PlaybackState::Loading);
    }

    #[test]
    fn buffering_returns_to_previous_state() {
        let (mut engine, _) = engine();
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(1) });

        engine.handle_media_event(session, MediaEvent::Waiting);
        assert_eq!(
            engine.state(),
            PlaybackState::Buffering {
                resume_playing: true
            }
        );
        assert!(engine.snapshot().is_buffering);
        engine.handle_adaptive_event(session, AdaptiveEvent::LevelLoaded);
        assert_eq!(engine.state(), PlaybackState::Playing);

        engine.pause().unwrap();
        engine.handle_media_event(session, MediaEvent::Waiting);
        engine.handle_media_event(session, MediaEvent::LoadedMetadata { duration: 100.0 });
        assert_eq!(engine.state(), PlaybackState::Paused);
    }

    #[test]
    fn autoplay_refusal_is_an_error() {
        let (mut engine, _) = engine_with(
            Host {
                play_fails: true,
                ..host()
            },
            PlayerConfig::default(),
        );
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(1) });
        assert_eq!(engine.state(), PlaybackState::Error);
    }

    #[test]
    fn without_autoplay_session_waits_ready() {
        let (mut engine, shared) = engine_with(
            host(),
            PlayerConfig {
                autoplay: false,
                ..Default::default()
            },
        );
        let session = engine.load(A).unwrap();
        engine.handle_adaptive_event(session, AdaptiveEvent::ManifestParsed { levels: levels(1) });
        assert_eq!(engine.state(), PlaybackState::Ready);
        assert!(!shared.lock().unwrap().calls.contains(&Call::Play));

        engine.apply(PlayerCommand::TogglePlay).unwrap();
        assert_eq!(engine.state(), PlaybackState::Playing);
    }

    #[test]
    fn stale_events_are_ignored() {
        let (mut engine, _) = engine();
        let a = engine.load(A).unwrap();
        let b = engine.load(B).unwrap();

        assert!(!engine.handle_adaptive_event(a, AdaptiveEvent::ManifestParsed { levels: levels(4) }));
        assert!(engine.quality_levels().is_empty());
        assert!(!engine.handle_adaptive_event(
            a,
            AdaptiveEvent::Error {
                fatal: true,
                details: "old".to_string()
            }
        ));
        assert_eq!(engine.state(), PlaybackState::Loading);

        assert!(engine.handle_adaptive_event(b, AdaptiveEvent::ManifestParsed { levels: levels(2) }));
        assert_eq!(engine.quality_levels().len(), 2);
    }

    #[test]
    fn teardown_releases_everything_together() {
        let (mut engine, shared) = engine();
        let a = engine.load(A).unwrap();
        engine.handle_adaptive_event(a, AdaptiveEvent::ManifestParsed { levels: levels(2) });
        engine
            .load_subtitle("WEBVTT\n\n00:01.000 --> 00:02.000\nHi\n", None, "English", "en")
            .unwrap();

        engine.load(B).unwrap();
        {
            let host = shared.lock().unwrap();
            assert_eq!(host.live_sessions, vec![2]);
            assert_eq!(host.live_graphs, vec![2]);
            assert!(host.live_blobs.is_empty());
            assert!(host.live_tracks.is_empty());
        }
        assert!(engine.subtitle().is_none());

        engine.close();
        let host = shared.lock().unwrap();
        assert!(host.live_sessions.is_empty());
        assert!(host.live_graphs.is_empty());
        assert_eq!(&host.calls[host.calls.len() - 2..], [Call::Pause, Call::ClearSource]);
        drop(host);

        assert_eq!(engine.state(), PlaybackState::Closed);
        assert_eq!(engine.load(A), Err(PlayerError::SessionClosed));
    }

    #[test]
    fn seeking_is_clamped() {
        let (mut engine, _) = engine();
        let session = engine.load("https://cdn.example/movie.mp4").unwrap();
        engine.handle_media_event(session, MediaEvent::LoadedMetadata { duration: 100.0 });
        engine.handle_media_event(session, MediaEvent::TimeUpdate { current_time: 95.0 });

        assert_eq!(engine.apply(PlayerCommand::SeekBy(10.0)), Ok(true));
        assert_eq!(engine.snapshot().current_time, 100.0);
        assert_eq!(engine.seek(-3.0).unwrap(), 0.0);
        assert_eq!(engine.seek_by(-10.0).unwrap(), 0.0);
    }

    #[test]
    fn ui_commands_are_not_handled() {
        let (mut engine, _) = engine();
        engine.load(A).unwrap();
        assert_eq!(engine.apply(PlayerCommand::ToggleQualityMenu), Ok(false));
        assert_eq!(engine.apply(PlayerCommand::ToggleFullscreen), Ok(false));
    }

    #[test]
    fn playback_rate_is_clamped() {
        let (mut engine, _) = engine();
        assert_eq!(engine.set_playback_rate(2.0), 2.0);
        assert_eq!(engine.set_playback_rate(10.0), 4.0);
        assert_eq!(engine.set_playback_rate(f64::NAN), 1.0);
    }
}
