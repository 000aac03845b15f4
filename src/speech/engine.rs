//! Speech synthesis through an external synthesizer, cached as WAV files,
//! played through a single shared audio device.

use anyhow::{Context, Result, anyhow, bail};
use rodio::source::Zero;
use rodio::{Decoder, OutputStream, Sink, Source};
use std::fs::{self, File};
use std::io::BufReader;
use std::path::{Path, PathBuf};
use std::process::Command;
use std::sync::atomic::{AtomicUsize, Ordering};
use std::sync::{Arc, mpsc};
use std::time::Duration;
use tracing::{debug, info, warn};

use super::timing::UtteranceChunk;
use super::voice::{SynthBackend, Voice};
use crate::cache;
use crate::cancellation::CancellationToken;

#[derive(Clone)]
pub struct SpeechEngine {
    program: String,
    backend: SynthBackend,
    voice: Option<Voice>,
    rate_wpm: u32,
}

impl SpeechEngine {
    pub fn new(
        program: String,
        backend: SynthBackend,
        voice: Option<Voice>,
        rate_wpm: u32,
    ) -> Self {
        info!(
            program = %program,
            voice = voice.as_ref().map(|v| v.name.as_str()).unwrap_or("default"),
            rate_wpm,
            "Initializing speech engine"
        );
        Self {
            program,
            backend,
            voice,
            rate_wpm,
        }
    }

    /// Change the speaking rate. Takes effect on the next prepared
    /// utterance; already-cached audio at other rates is keyed separately.
    pub fn set_rate(&mut self, rate_wpm: u32) {
        self.rate_wpm = rate_wpm;
    }

    /// Identity of the active voice for cache keying.
    fn voice_key(&self) -> &str {
        self.voice.as_ref().map(|v| v.name.as_str()).unwrap_or("default")
    }

    /// Synthesize every chunk that is not already cached and return one
    /// `(wav, duration)` pair per chunk, in order.
    pub fn prepare_utterance(
        &self,
        speech_dir: &Path,
        chunks: &[UtteranceChunk],
        threads: usize,
        cancel: &CancellationToken,
    ) -> Result<Vec<(PathBuf, Duration)>> {
        info!(
            chunk_count = chunks.len(),
            threads,
            rate_wpm = self.rate_wpm,
            "Preparing utterance audio"
        );

        let mut collected: Vec<Option<(PathBuf, Duration)>> = vec![None; chunks.len()];
        let mut jobs: Vec<(usize, String, PathBuf)> = Vec::new();

        for (idx, chunk) in chunks.iter().enumerate() {
            let path = cache::chunk_path(speech_dir, self.voice_key(), self.rate_wpm, &chunk.text);
            if wav_is_valid(&path) {
                collected[idx] = Some((path.clone(), chunk_duration(&path)));
            } else {
                jobs.push((idx, chunk.text.clone(), path));
            }
        }

        let threads = threads.max(1);
        if jobs.len() <= 1 || threads == 1 {
            for (idx, text, path) in jobs {
                cancel.check_cancelled("synthesis")?;
                self.synth_chunk(&path, &text)?;
                collected[idx] = Some((path.clone(), chunk_duration(&path)));
            }
        } else {
            let pending = jobs.len();
            let jobs = Arc::new(jobs);
            let cursor = Arc::new(AtomicUsize::new(0));
            let (tx, rx) = mpsc::channel::<Result<(usize, PathBuf, Duration)>>();

            for _ in 0..threads.min(pending) {
                let engine = self.clone();
                let jobs = Arc::clone(&jobs);
                let cursor = Arc::clone(&cursor);
                let cancel = cancel.clone();
                let tx = tx.clone();

                std::thread::spawn(move || {
                    loop {
                        let slot = cursor.fetch_add(1, Ordering::Relaxed);
                        let Some((idx, text, path)) = jobs.get(slot) else {
                            break;
                        };
                        if let Err(err) = cancel.check_cancelled("synthesis") {
                            let _ = tx.send(Err(err));
                            break;
                        }
                        let result = engine
                            .synth_chunk(path, text)
                            .map(|()| (*idx, path.clone(), chunk_duration(path)));
                        if tx.send(result).is_err() {
                            break;
                        }
                    }
                });
            }

            drop(tx);
            for _ in 0..pending {
                match rx.recv() {
                    Ok(Ok((idx, path, dur))) => {
                        collected[idx] = Some((path, dur));
                    }
                    Ok(Err(err)) => {
                        warn!("Failed to synthesize chunk: {err}");
                        return Err(err);
                    }
                    Err(err) => {
                        return Err(anyhow!("synthesis worker channel closed: {err}"));
                    }
                }
            }
        }

        let collected: Vec<(PathBuf, Duration)> = collected.into_iter().flatten().collect();
        debug!(count = collected.len(), "Prepared utterance audio");
        Ok(collected)
    }

    fn synth_chunk(&self, path: &Path, text: &str) -> Result<()> {
        debug!(
            path = %path.display(),
            chars = text.chars().count(),
            "Synthesizing chunk"
        );
        if let Some(parent) = path.parent() {
            fs::create_dir_all(parent).context("Creating speech cache directory")?;
        }

        let mut command = self.command_for(path, text)?;
        let output = command
            .output()
            .with_context(|| format!("running synthesizer {}", self.program))?;
        if !output.status.success() {
            bail!(
                "synthesizer exited with {}: {}",
                output.status,
                String::from_utf8_lossy(&output.stderr).trim()
            );
        }
        if !path.exists() {
            bail!("synthesizer produced no output at {}", path.display());
        }
        Ok(())
    }

    fn command_for(&self, out: &Path, text: &str) -> Result<Command> {
        match self.backend {
            SynthBackend::EspeakNg => {
                let mut cmd = Command::new(&self.program);
                cmd.arg("-w").arg(out);
                if let Some(voice) = &self.voice {
                    cmd.args(["-v", &voice.language]);
                }
                cmd.args(["-s", &self.rate_wpm.to_string()]);
                cmd.arg(text);
                Ok(cmd)
            }
            SynthBackend::Say => {
                let mut cmd = Command::new(&self.program);
                cmd.arg("-o").arg(out);
                cmd.arg("--data-format=LEI16@22050");
                if let Some(voice) = &self.voice {
                    cmd.args(["-v", &voice.name]);
                }
                cmd.args(["-r", &self.rate_wpm.to_string()]);
                cmd.arg(text);
                Ok(cmd)
            }
            SynthBackend::Custom => self.custom_command(out, text),
        }
    }

    /// Expand a user-supplied command template. `{out}`, `{voice}`, `{rate}`,
    /// and `{text}` are replaced; a template without `{text}` gets the text
    /// appended as the final argument.
    fn custom_command(&self, out: &Path, text: &str) -> Result<Command> {
        let mut parts = self.program.split_whitespace();
        let program = parts
            .next()
            .ok_or_else(|| anyhow!("synthesizer command is empty"))?;
        let mut cmd = Command::new(program);
        let mut text_used = false;
        for part in parts {
            let expanded = part
                .replace("{out}", &out.display().to_string())
                .replace("{voice}", self.voice_key())
                .replace("{rate}", &self.rate_wpm.to_string());
            if expanded.contains("{text}") {
                cmd.arg(expanded.replace("{text}", text));
                text_used = true;
            } else {
                cmd.arg(expanded);
            }
        }
        if !text_used {
            cmd.arg(text);
        }
        Ok(cmd)
    }

    /// Queue audio files on a fresh sink; returns a handle controlling the
    /// shared output device.
    pub fn play_files(&self, files: &[PathBuf], pause_after: Duration) -> Result<Playback> {
        let (_stream, handle) = OutputStream::try_default().context("Opening audio output")?;
        let sink = Sink::try_new(&handle).context("Creating sink")?;

        info!(
            count = files.len(),
            pause_ms = pause_after.as_millis(),
            "Starting playback"
        );
        for file in files {
            let reader = BufReader::new(File::open(file)?);
            let source = Decoder::new(reader)?;
            sink.append(source);
            if pause_after > Duration::ZERO {
                let silence = Zero::<f32>::new(1, 48_000).take_duration(pause_after);
                sink.append(silence);
            }
        }

        sink.play();
        Ok(Playback { _stream, sink })
    }
}

/// A live utterance on the audio device. Dropping it releases the device.
pub struct Playback {
    _stream: OutputStream,
    sink: Sink,
}

impl Playback {
    pub fn pause(&self) {
        debug!("Pausing playback");
        self.sink.pause();
    }

    pub fn resume(&self) {
        debug!("Resuming playback");
        self.sink.play();
    }

    pub fn is_paused(&self) -> bool {
        self.sink.is_paused()
    }

    pub fn set_volume(&self, volume: f32) {
        self.sink.set_volume(volume.clamp(0.0, 2.0));
    }

    /// Sources still queued, counting the silence gaps.
    pub fn queued(&self) -> usize {
        self.sink.len()
    }

    pub fn is_drained(&self) -> bool {
        self.sink.empty()
    }

    pub fn stop(self) {
        self.sink.stop();
        // stream dropped automatically
    }
}

/// Whether an error came from the audio device being unavailable, which a
/// single retry with a fresh stream often fixes.
pub fn is_transient_device_error(err: &anyhow::Error) -> bool {
    err.chain().any(|cause| {
        cause.downcast_ref::<rodio::StreamError>().is_some()
            || cause.downcast_ref::<rodio::PlayError>().is_some()
    })
}

fn wav_is_valid(path: &Path) -> bool {
    hound::WavReader::open(path).is_ok()
}

pub fn chunk_duration(path: &Path) -> Duration {
    if let Ok(file) = File::open(path) {
        if let Some(duration) = Decoder::new(BufReader::new(file))
            .ok()
            .and_then(|d| d.total_duration())
        {
            return duration;
        }
    }
    if let Ok(reader) = hound::WavReader::open(path) {
        let spec = reader.spec();
        if spec.sample_rate > 0 {
            let frames = reader.duration();
            return Duration::from_secs_f64(frames as f64 / spec.sample_rate as f64);
        }
    }
    Duration::from_secs(1)
}
