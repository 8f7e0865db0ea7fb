use std::collections::VecDeque;
use std::fs::File;
use std::path::PathBuf;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::mpsc::{self, TryRecvError};
use std::sync::{Arc, Mutex};
use std::thread::JoinHandle;
use std::time::Duration;

use cpal::Sample;
use cpal::traits::{DeviceTrait, HostTrait, StreamTrait};
use symphonia::core::audio::{SampleBuffer, SignalSpec};
use symphonia::core::codecs::{CODEC_TYPE_NULL, DecoderOptions};
use symphonia::core::errors::Error as SymphoniaError;
use symphonia::core::formats::{FormatOptions, FormatReader, SeekMode, SeekTo};
use symphonia::core::io::MediaSourceStream;
use symphonia::core::meta::MetadataOptions;
use symphonia::core::probe::Hint;
use symphonia::core::units::Time;

use crate::events::types::AppEvent;
use crate::player::commands::{PlayerCommand, PlayerState};
use crate::player::handle::SharedPlayback;

struct AudioOutput {
    ring_buffer: Arc<Mutex<VecDeque<f32>>>,
    spec: SignalSpec,
    _stream: cpal::Stream,
    paused: Arc<AtomicBool>,
}

impl AudioOutput {
    fn new(
        spec: SignalSpec,
        shared: Arc<SharedPlayback>,
    ) -> Result<Self, Box<dyn std::error::Error + Send + Sync>> {
        let host = cpal::default_host();
        let device = host
            .default_output_device()
            .ok_or("No output device available")?;

        let config = cpal::StreamConfig {
            channels: spec.channels.count() as u16,
            sample_rate: cpal::SampleRate(spec.rate),
            buffer_size: cpal::BufferSize::Default,
        };

        let buffer_capacity = spec.rate as usize * spec.channels.count() * 5;
        let ring_buffer = Arc::new(Mutex::new(VecDeque::with_capacity(buffer_capacity)));
        let ring_buffer_clone = ring_buffer.clone();
        let paused = Arc::new(AtomicBool::new(true));
        let paused_clone = paused.clone();

        let stream = device.build_output_stream(
            &config,
            move |data: &mut [f32], _: &cpal::OutputCallbackInfo| {
                let volume = shared.volume();
                let mut buffer = ring_buffer_clone.lock().unwrap();
                for sample in data.iter_mut() {
                    if paused_clone.load(Ordering::Relaxed) {
                        *sample = Sample::EQUILIBRIUM;
                    } else {
                        *sample = buffer.pop_front().unwrap_or(Sample::EQUILIBRIUM) * volume;
                    }
                }
            },
            |err| eprintln!("Audio stream error: {}", err),
            None,
        )?;

        stream.play()?;

        Ok(AudioOutput {
            ring_buffer,
            spec,
            _stream: stream,
            paused,
        })
    }

    fn write_samples(&self, samples: &[f32]) {
        let mut buffer = self.ring_buffer.lock().unwrap();
        buffer.extend(samples.iter().copied());
    }

    fn buffer_len(&self) -> usize {
        self.ring_buffer.lock().unwrap().len()
    }

    fn set_paused(&self, paused: bool) {
        self.paused.store(paused, Ordering::Relaxed);
    }

    fn clear_buffer(&self) {
        self.ring_buffer.lock().unwrap().clear();
    }
}

struct PlaybackContext {
    format: Box<dyn FormatReader>,
    decoder: Box<dyn symphonia::core::codecs::Decoder>,
    track_id: u32,
    audio_output: AudioOutput,
    sample_buf: SampleBuffer<f32>,
    total_frames_decoded: u64,
    total_duration: Option<f64>,
}

pub fn spawn(
    cmd_rx: mpsc::Receiver<PlayerCommand>,
    event_tx: mpsc::Sender<AppEvent>,
    shared: Arc<SharedPlayback>,
) -> JoinHandle<()> {
    std::thread::spawn(move || {
        let mut ctx: Option<PlaybackContext> = None;
        let mut is_paused = true;

        loop {
            match cmd_rx.try_recv() {
                Ok(cmd) => match cmd {
                    PlayerCommand::Load { path } => {
                        ctx = None;
                        is_paused = true;

                        let _ = event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Loading));

                        match load_audio(&path, shared.clone()) {
                            Ok(new_ctx) => {
                                shared.set_position(0.0);
                                // Without a reported duration the widget
                                // never builds its controls, so the event
                                // is withheld too.
                                if let Some(dur) = new_ctx.total_duration {
                                    shared.set_duration(dur);
                                    let _ = event_tx.send(AppEvent::DurationChanged(dur));
                                }
                                shared.set_paused(true);
                                ctx = Some(new_ctx);
                                let _ = event_tx
                                    .send(AppEvent::PlayerStateChanged(PlayerState::Paused));
                            }
                            Err(e) => {
                                let _ = event_tx.send(AppEvent::PlayerError(e.to_string()));
                                let _ = event_tx
                                    .send(AppEvent::PlayerStateChanged(PlayerState::Stopped));
                            }
                        }
                    }

                    PlayerCommand::Pause => {
                        if let Some(ref c) = ctx {
                            c.audio_output.set_paused(true);
                            is_paused = true;
                            shared.set_paused(true);
                            let _ =
                                event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Paused));
                        }
                    }

                    PlayerCommand::Resume => {
                        if let Some(ref c) = ctx {
                            c.audio_output.set_paused(false);
                            is_paused = false;
                            shared.set_paused(false);
                            let _ =
                                event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Playing));
                        }
                    }

                    PlayerCommand::Stop => {
                        if let Some(ref c) = ctx {
                            c.audio_output.clear_buffer();
                        }
                        ctx = None;
                        is_paused = true;
                        shared.set_paused(true);
                        shared.set_position(0.0);
                        let _ = event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Stopped));
                    }

                    PlayerCommand::Seek(secs) => {
                        if let Some(ref mut c) = ctx {
                            c.audio_output.clear_buffer();

                            // The demuxer needs a non-negative target; the
                            // shared snapshot keeps the caller's raw value.
                            let target = secs.max(0.0);
                            let seek_to = SeekTo::Time {
                                time: Time::from(target),
                                track_id: Some(c.track_id),
                            };

                            match c.format.seek(SeekMode::Accurate, seek_to) {
                                Ok(_seeked_to) => {
                                    c.decoder.reset();
                                    c.total_frames_decoded =
                                        (target * c.audio_output.spec.rate as f64) as u64;
                                }
                                Err(e) => {
                                    let _ = event_tx
                                        .send(AppEvent::PlayerError(format!("Seek error: {}", e)));
                                }
                            }
                        }
                    }
                },

                Err(TryRecvError::Empty) => {
                    // No command, continue
                }

                Err(TryRecvError::Disconnected) => {
                    // Main thread is gone, exit
                    break;
                }
            }

            // Process audio if we have a context and not paused
            if let Some(ref mut c) = ctx {
                if is_paused {
                    std::thread::sleep(Duration::from_millis(50));
                    continue;
                }

                // Throttle if buffer is full
                let max_buffer =
                    c.audio_output.spec.rate as usize * c.audio_output.spec.channels.count() * 3;
                if c.audio_output.buffer_len() > max_buffer {
                    std::thread::sleep(Duration::from_millis(10));
                    continue;
                }

                match c.format.next_packet() {
                    Ok(packet) => {
                        if packet.track_id() != c.track_id {
                            continue;
                        }

                        match c.decoder.decode(&packet) {
                            Ok(decoded) => {
                                c.sample_buf.copy_interleaved_ref(decoded);
                                c.total_frames_decoded += c.sample_buf.len() as u64
                                    / c.audio_output.spec.channels.count() as u64;

                                c.audio_output.write_samples(c.sample_buf.samples());

                                shared.set_position(
                                    c.total_frames_decoded as f64 / c.audio_output.spec.rate as f64,
                                );
                            }
                            Err(SymphoniaError::DecodeError(e)) => {
                                // Non-fatal, continue
                                eprintln!("Decode error: {}", e);
                            }
                            Err(e) => {
                                let _ = event_tx
                                    .send(AppEvent::PlayerError(format!("Decode error: {}", e)));
                            }
                        }
                    }

                    Err(SymphoniaError::IoError(e))
                        if e.kind() == std::io::ErrorKind::UnexpectedEof =>
                    {
                        // Wait for buffer to drain
                        while c.audio_output.buffer_len() > 0 {
                            std::thread::sleep(Duration::from_millis(50));
                        }

                        // Keep the context so a rewind seek still works;
                        // park paused at the end of the stream.
                        c.audio_output.set_paused(true);
                        is_paused = true;
                        shared.set_paused(true);
                        if let Some(dur) = c.total_duration {
                            shared.set_position(dur);
                        }
                        let _ = event_tx.send(AppEvent::TrackEnded);
                        let _ = event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Paused));
                    }

                    Err(e) => {
                        let _ = event_tx.send(AppEvent::PlayerError(format!("Read error: {}", e)));
                        ctx = None;
                        is_paused = true;
                        shared.set_paused(true);
                        let _ = event_tx.send(AppEvent::PlayerStateChanged(PlayerState::Stopped));
                    }
                }
            } else {
                // No playback, sleep to avoid busy loop
                std::thread::sleep(Duration::from_millis(50));
            }
        }
    })
}

fn load_audio(
    path: &PathBuf,
    shared: Arc<SharedPlayback>,
) -> Result<PlaybackContext, Box<dyn std::error::Error + Send + Sync>> {
    let codecs = symphonia::default::get_codecs();
    let probe = symphonia::default::get_probe();

    let file = File::open(path)?;
    let mss = MediaSourceStream::new(Box::new(file), Default::default());

    let mut hint = Hint::new();
    if let Some(ext) = path.extension().and_then(|e| e.to_str()) {
        hint.with_extension(ext);
    }

    let probed = probe.format(
        &hint,
        mss,
        &FormatOptions::default(),
        &MetadataOptions::default(),
    )?;
    let mut format = probed.format;

    let track = format
        .tracks()
        .iter()
        .find(|t| t.codec_params.codec != CODEC_TYPE_NULL)
        .ok_or("No audio track found")?;

    let track_id = track.id;
    let codec_params = track.codec_params.clone();

    let total_duration = codec_params.time_base.and_then(|tb| {
        codec_params.n_frames.map(|frames| {
            let time = tb.calc_time(frames);
            time.seconds as f64 + time.frac
        })
    });

    let mut decoder = codecs.make(&codec_params, &DecoderOptions::default())?;

    // Decode packets until we get valid audio (handles decoder warm-up)
    let (spec, first_samples) = loop {
        let packet = format.next_packet()?;

        if packet.track_id() != track_id {
            continue;
        }

        match decoder.decode(&packet) {
            Ok(decoded) => {
                let spec = *decoded.spec();
                let mut sample_buf = SampleBuffer::new(decoded.capacity() as u64, spec);
                sample_buf.copy_interleaved_ref(decoded);
                break (spec, sample_buf);
            }
            Err(SymphoniaError::DecodeError(_)) => {
                continue;
            }
            Err(e) => return Err(e.into()),
        }
    };

    // The stream starts paused; the widget decides when playback begins.
    let audio_output = AudioOutput::new(spec, shared)?;

    audio_output.write_samples(first_samples.samples());

    let initial_frames = first_samples.len() as u64 / spec.channels.count() as u64;
    let sample_buf = SampleBuffer::new(first_samples.len() as u64, spec);

    Ok(PlaybackContext {
        format,
        decoder,
        track_id,
        audio_output,
        sample_buf,
        total_frames_decoded: initial_frames,
        total_duration,
    })
}
