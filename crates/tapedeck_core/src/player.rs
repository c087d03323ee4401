//! Player - Session Lifecycle
//!
//! The control-thread half of a session. The player validates the setup,
//! opens the output device, and moves a `StreamEngine` onto a dedicated
//! playback thread; from then on it only requests a stop and waits for the
//! one-shot outcome. The recording travels back inside that outcome, so the
//! control thread never touches live stream state.
//!
//! ```text
//! ┌──────────────────────────────────────────────────────────┐
//! │ Control thread:  start() / stop() / wait() / save()      │
//! └──────────────────────────────────────────────────────────┘
//!        │ spawn                      ▲ outcome + recording
//!        ▼                            │ (bounded(1) channel)
//! ┌──────────────────────────────────────────────────────────┐
//! │ Playback thread: owns the cpal stream, parks on recv     │
//! │   Device thread: StreamEngine::render per block          │
//! └──────────────────────────────────────────────────────────┘
//! ```

use std::path::{Path, PathBuf};
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;
use std::thread::JoinHandle;

use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use cpal::{BufferSize, SampleRate, StreamConfig as CpalStreamConfig};
use crossbeam_channel::{bounded, Receiver, Sender};
use tracing::{debug, error, info, warn};

use tapedeck_fx::{BlockEffect, EffectContext};

use crate::config::PlayerConfig;
use crate::error::{PlayerError, PlayerResult};
use crate::signal::Signal;
use crate::stream::{SessionReport, StreamEngine, StreamOutcome};

/// Observable lifecycle state of a player
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlayerState {
    Idle,
    Running,
    Finished,
}

enum State {
    Idle,
    Running {
        stop_flag: Arc<AtomicBool>,
        report_rx: Receiver<SessionReport>,
        handle: JoinHandle<()>,
    },
    Finished {
        outcome: StreamOutcome,
        /// Taken by the first `wait_until_finished` after a failure
        error: Option<PlayerError>,
        /// Absent when the session died before the engine ran
        recorder: Option<crate::recorder::Recorder>,
    },
}

/// Plays a signal through an optional effect while capturing the output.
///
/// A player runs exactly one session: `Idle → Running → Finished`.
pub struct Player {
    config: PlayerConfig,
    signal: Arc<Signal>,
    /// Taken by `start`; `None` afterwards (and for bypass players)
    effect: Option<Box<dyn BlockEffect>>,
    state: State,
}

impl Player {
    /// Player with no effect: output is the input signal (bypass)
    pub fn new(signal: Signal, config: PlayerConfig) -> Self {
        Self {
            config,
            signal: Arc::new(signal),
            effect: None,
            state: State::Idle,
        }
    }

    /// Player routing every channel through `effect`
    pub fn with_effect(signal: Signal, config: PlayerConfig, effect: Box<dyn BlockEffect>) -> Self {
        Self {
            config,
            signal: Arc::new(signal),
            effect: Some(effect),
            state: State::Idle,
        }
    }

    pub fn signal(&self) -> &Signal {
        &self.signal
    }

    pub fn config(&self) -> &PlayerConfig {
        &self.config
    }

    /// Current lifecycle state. A session whose outcome has already been
    /// reported is folded into `Finished` without blocking.
    pub fn state(&mut self) -> PlayerState {
        self.poll();
        match self.state {
            State::Idle => PlayerState::Idle,
            State::Running { .. } => PlayerState::Running,
            State::Finished { .. } => PlayerState::Finished,
        }
    }

    /// Open the output device and begin streaming. Returns immediately;
    /// the device then drives the session to completion.
    pub fn start(&mut self) -> PlayerResult<()> {
        match self.state {
            State::Running { .. } => return Err(PlayerError::AlreadyRunning),
            State::Finished { .. } => return Err(PlayerError::AlreadyFinished),
            State::Idle => {}
        }

        self.config.validate().map_err(PlayerError::ConfigError)?;

        let channels = self.signal.num_channels();
        let sample_rate = self.signal.sample_rate();
        let ctx = EffectContext::new(
            sample_rate,
            self.config.block_size,
            self.config.history_frames(),
        );

        // Effect misconfiguration is fatal before any audio is emitted
        if let Some(effect) = &self.effect {
            effect.prepare(&ctx)?;
            debug!(effect = effect.name(), "Effect prepared");
        }

        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or(PlayerError::NoOutputDevice)?;
        Self::ensure_supported(&device, channels as u16, sample_rate)?;

        let stream_config = CpalStreamConfig {
            channels: channels as u16,
            sample_rate: SampleRate(sample_rate),
            buffer_size: BufferSize::Fixed(self.config.block_size as u32),
        };

        let stop_flag = Arc::new(AtomicBool::new(false));
        // Engine -> playback thread, then playback thread -> control thread;
        // the hop lets the stream be torn down before Finished is observable
        let (done_tx, done_rx) = bounded::<SessionReport>(1);
        let (report_tx, report_rx) = bounded::<SessionReport>(1);

        let engine = StreamEngine::new(
            Arc::clone(&self.signal),
            &self.config,
            self.effect.take(),
            Arc::clone(&stop_flag),
            done_tx.clone(),
        );

        let handle = std::thread::Builder::new()
            .name("tapedeck-stream".into())
            .spawn(move || {
                Self::playback_thread(engine, device, stream_config, done_tx, done_rx, report_tx);
            })
            .map_err(|e| PlayerError::StreamBuild(e.to_string()))?;

        info!(
            frames = self.signal.frames(),
            channels,
            sample_rate,
            block_size = self.config.block_size,
            history_depth = self.config.history_depth,
            latency_ms = self.config.latency_ms(sample_rate),
            "Playback started"
        );

        self.state = State::Running {
            stop_flag,
            report_rx,
            handle,
        };
        Ok(())
    }

    /// Request a cooperative stop at the next block boundary.
    ///
    /// Safe to call while a callback is in flight: the current block
    /// always completes, including its history advance.
    pub fn stop(&self) -> PlayerResult<()> {
        match &self.state {
            State::Idle => Err(PlayerError::NotStarted),
            State::Running { stop_flag, .. } => {
                debug!("Stop requested");
                stop_flag.store(true, Ordering::Release);
                Ok(())
            }
            State::Finished { .. } => {
                warn!("Stop requested after stream finished");
                Ok(())
            }
        }
    }

    /// Block until the session reaches `Finished`, by exhaustion, stop, or
    /// failure.
    ///
    /// A failure is returned as `Err` exactly once; afterwards the terminal
    /// state stays queryable and repeated calls return the outcome.
    pub fn wait_until_finished(&mut self) -> PlayerResult<StreamOutcome> {
        match std::mem::replace(&mut self.state, State::Idle) {
            State::Idle => Err(PlayerError::NotStarted),
            State::Running {
                report_rx,
                handle,
                stop_flag: _,
            } => {
                let report = report_rx
                    .recv()
                    .unwrap_or_else(|_| SessionReport::disconnected());
                self.finalize(report, handle);
                self.take_result()
            }
            finished @ State::Finished { .. } => {
                self.state = finished;
                self.take_result()
            }
        }
    }

    /// Persist the captured output as WAV at `path`.
    pub fn save(&self, path: impl AsRef<Path>) -> PlayerResult<()> {
        match &self.state {
            State::Idle => Err(PlayerError::NotStarted),
            State::Running { .. } => Err(PlayerError::StillRunning),
            State::Finished {
                recorder: Some(recorder),
                ..
            } => recorder.persist(path, self.signal.sample_rate()),
            State::Finished { recorder: None, .. } => Err(PlayerError::NothingRecorded),
        }
    }

    /// Persist next to the source file as `<stem>_out.wav` and return the
    /// path written.
    pub fn save_default(&self) -> PlayerResult<PathBuf> {
        let source = self.signal.source_path().ok_or(PlayerError::NoSourcePath)?;
        let stem = source
            .file_stem()
            .and_then(|s| s.to_str())
            .ok_or(PlayerError::NoSourcePath)?;
        let path = source.with_file_name(format!("{stem}_out.wav"));
        self.save(&path)?;
        Ok(path)
    }

    /// Fold an already-delivered outcome into `Finished` without blocking.
    fn poll(&mut self) {
        let delivered =
            matches!(&self.state, State::Running { report_rx, .. } if !report_rx.is_empty());
        if delivered {
            if let State::Running {
                report_rx, handle, ..
            } = std::mem::replace(&mut self.state, State::Idle)
            {
                let report = report_rx
                    .recv()
                    .unwrap_or_else(|_| SessionReport::disconnected());
                self.finalize(report, handle);
            }
        }
    }

    fn finalize(&mut self, report: SessionReport, handle: JoinHandle<()>) {
        if handle.join().is_err() {
            warn!("Playback thread panicked");
        }
        match report.outcome {
            StreamOutcome::Completed => info!("Stream completed"),
            StreamOutcome::Stopped => info!("Stream stopped"),
            StreamOutcome::Failed => {
                if let Some(e) = &report.error {
                    error!("Stream failed: {e}");
                }
            }
        }
        self.state = State::Finished {
            outcome: report.outcome,
            error: report.error,
            recorder: report.recorder,
        };
    }

    fn take_result(&mut self) -> PlayerResult<StreamOutcome> {
        match &mut self.state {
            State::Finished { outcome, error, .. } => match error.take() {
                Some(e) => Err(e),
                None => Ok(*outcome),
            },
            _ => Err(PlayerError::NotStarted),
        }
    }

    /// Verify the device speaks f32 at the signal's shape before streaming.
    fn ensure_supported(device: &cpal::Device, channels: u16, sample_rate: u32) -> PlayerResult<()> {
        let mut ranges = device
            .supported_output_configs()
            .map_err(|e| PlayerError::StreamBuild(e.to_string()))?;

        let supported = ranges.any(|range| {
            range.channels() == channels
                && range.sample_format() == cpal::SampleFormat::F32
                && range.min_sample_rate().0 <= sample_rate
                && sample_rate <= range.max_sample_rate().0
        });

        if supported {
            Ok(())
        } else {
            Err(PlayerError::UnsupportedStreamConfig {
                channels,
                sample_rate,
            })
        }
    }

    /// Owns the cpal stream for the whole session. Parks on the engine's
    /// one-shot report, tears the stream down, then forwards the report so
    /// `Finished` is only observable after the device has let go.
    fn playback_thread(
        engine: StreamEngine,
        device: cpal::Device,
        config: CpalStreamConfig,
        done_tx: Sender<SessionReport>,
        done_rx: Receiver<SessionReport>,
        report_tx: Sender<SessionReport>,
    ) {
        let mut engine = engine;

        let stream = match device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                engine.render(data);
            },
            move |err| {
                // Device failure mid-stream: first report wins
                let _ = done_tx.try_send(SessionReport::failed(PlayerError::StreamRuntime(
                    err.to_string(),
                )));
            },
            None,
        ) {
            Ok(stream) => stream,
            Err(e) => {
                let _ = report_tx.send(SessionReport::failed(PlayerError::StreamBuild(
                    e.to_string(),
                )));
                return;
            }
        };

        if let Err(e) = stream.play() {
            let _ = report_tx.send(SessionReport::failed(PlayerError::StreamPlay(
                e.to_string(),
            )));
            return;
        }

        let report = done_rx
            .recv()
            .unwrap_or_else(|_| SessionReport::disconnected());
        drop(stream);
        let _ = report_tx.send(report);
    }
}

impl Drop for Player {
    fn drop(&mut self) {
        if let State::Running { stop_flag, .. } = &self.state {
            stop_flag.store(true, Ordering::Release);
        }
        if matches!(self.state, State::Running { .. }) {
            let _ = self.wait_until_finished();
        }
    }
}
