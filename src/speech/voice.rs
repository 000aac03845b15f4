//! Voice discovery and the English-voice selection heuristics.
//!
//! Synthesizers expose their voice inventories in incompatible formats, and
//! the "best" English voice differs per platform. The selection rules here
//! are plain data walked by [`pick_voice`], so they can be unit tested and
//! overridden from the config without touching the engine.

use anyhow::{Context, Result, anyhow};
use once_cell::sync::Lazy;
use regex::Regex;
use std::process::Command;
use std::sync::RwLock;
use std::time::Duration;
use tracing::{debug, info, warn};

/// One installed voice as reported by the synthesizer.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Voice {
    pub name: String,
    pub language: String,
}

impl std::fmt::Display for Voice {
    fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
        write!(f, "{} ({})", self.name, self.language)
    }
}

/// Which external synthesizer the engine drives.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum SynthBackend {
    EspeakNg,
    Say,
    Custom,
}

/// Capability for listing installed voices. Injected into selection so the
/// heuristics are testable against fixed inventories.
pub trait VoiceCatalog: Send + Sync {
    fn backend(&self) -> SynthBackend;
    fn voices(&self) -> Result<Vec<Voice>>;
}

/// Catalog backed by the real synthesizer binary found on this machine.
#[derive(Debug, Clone)]
pub struct SystemVoiceCatalog {
    pub program: String,
    backend: SynthBackend,
}

impl SystemVoiceCatalog {
    /// Resolve which synthesizer to use. A non-empty `synth_command` from the
    /// config wins; otherwise `say` on macOS, otherwise `espeak-ng` with a
    /// fallback to plain `espeak`.
    pub fn probe(synth_command: &str) -> Result<Self> {
        if !synth_command.trim().is_empty() {
            info!(command = %synth_command, "Using custom synthesizer command");
            return Ok(Self {
                program: synth_command.to_string(),
                backend: SynthBackend::Custom,
            });
        }

        if cfg!(target_os = "macos") {
            return Ok(Self {
                program: "say".to_string(),
                backend: SynthBackend::Say,
            });
        }

        for candidate in ["espeak-ng", "espeak"] {
            if Command::new(candidate)
                .arg("--version")
                .output()
                .map(|out| out.status.success())
                .unwrap_or(false)
            {
                info!(program = candidate, "Found espeak synthesizer");
                return Ok(Self {
                    program: candidate.to_string(),
                    backend: SynthBackend::EspeakNg,
                });
            }
        }

        Err(anyhow!(
            "no speech synthesizer found; install espeak-ng or set speech.synth_command"
        ))
    }
}

impl VoiceCatalog for SystemVoiceCatalog {
    fn backend(&self) -> SynthBackend {
        self.backend
    }

    fn voices(&self) -> Result<Vec<Voice>> {
        match self.backend {
            SynthBackend::EspeakNg => {
                let output = Command::new(&self.program)
                    .arg("--voices")
                    .output()
                    .with_context(|| format!("running {} --voices", self.program))?;
                Ok(parse_espeak_voices(&String::from_utf8_lossy(&output.stdout)))
            }
            SynthBackend::Say => {
                let output = Command::new(&self.program)
                    .args(["-v", "?"])
                    .output()
                    .context("running say -v ?")?;
                Ok(parse_say_voices(&String::from_utf8_lossy(&output.stdout)))
            }
            // Custom commands have no inventory protocol; synthesis runs
            // with whatever voice the command's template bakes in.
            SynthBackend::Custom => Ok(Vec::new()),
        }
    }
}

/// `espeak-ng --voices` rows look like:
/// ` 5  en-US   --/M    English (America)   gmw/en-US`
pub fn parse_espeak_voices(listing: &str) -> Vec<Voice> {
    let mut voices = Vec::new();
    for line in listing.lines() {
        let tokens: Vec<&str> = line.split_whitespace().collect();
        if tokens.len() < 4 || !tokens[0].bytes().all(|b| b.is_ascii_digit()) {
            continue;
        }
        let language = tokens[1].to_string();
        let name: Vec<&str> = tokens[3..]
            .iter()
            .take_while(|t| !t.contains('/'))
            .copied()
            .collect();
        if name.is_empty() {
            continue;
        }
        voices.push(Voice {
            name: name.join(" "),
            language,
        });
    }
    voices
}

static SAY_VOICE_LINE: Lazy<Regex> =
    Lazy::new(|| Regex::new(r"^(.+?)\s{2,}([a-zA-Z][a-zA-Z_-]*)\s+#").unwrap());

/// `say -v ?` rows look like:
/// `Samantha            en_US    # Hello, my name is Samantha.`
pub fn parse_say_voices(listing: &str) -> Vec<Voice> {
    listing
        .lines()
        .filter_map(|line| {
            SAY_VOICE_LINE.captures(line).map(|caps| Voice {
                name: caps[1].trim().to_string(),
                language: caps[2].to_string(),
            })
        })
        .collect()
}

/// Synthesizer/OS pairing. Each bucket carries its own preferred-name table
/// because the well-known good voices differ per platform.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum PlatformBucket {
    SayMac,
    EspeakWindows,
    EspeakMac,
    EspeakOther,
    Other,
}

pub fn bucket_for(backend: SynthBackend) -> PlatformBucket {
    match backend {
        SynthBackend::Say if cfg!(target_os = "macos") => PlatformBucket::SayMac,
        SynthBackend::EspeakNg if cfg!(target_os = "windows") => PlatformBucket::EspeakWindows,
        SynthBackend::EspeakNg if cfg!(target_os = "macos") => PlatformBucket::EspeakMac,
        SynthBackend::EspeakNg => PlatformBucket::EspeakOther,
        _ => PlatformBucket::Other,
    }
}

const SAY_MAC_NAMES: &[&str] = &[
    "samantha", "alex", "karen", "daniel", "moira", "fiona", "tessa",
];
const ESPEAK_NAMES: &[&str] = &[
    "english (america)",
    "en-us",
    "english (great britain)",
    "en-gb",
];
const ESPEAK_OTHER_NAMES: &[&str] = &[
    "english (america)",
    "en-us",
    "english (great britain)",
    "en-gb",
    "english",
];

/// Language tags tried in order when no preferred name matches.
const LANGUAGE_ORDER: &[&str] = &[
    "en-US",
    "en_GB",
    "en-GB",
    "en-AU",
    "en-CA",
    "en-IN",
    "en-US-male",
    "en-US-female",
    "en-GB-oxendict",
];

/// The selection data [`pick_voice`] walks: names first, languages second.
#[derive(Debug, Clone)]
pub struct SelectionRules {
    pub preferred_names: Vec<String>,
    pub language_order: Vec<String>,
}

impl SelectionRules {
    pub fn for_bucket(bucket: PlatformBucket) -> Self {
        let names: &[&str] = match bucket {
            PlatformBucket::SayMac => SAY_MAC_NAMES,
            PlatformBucket::EspeakWindows | PlatformBucket::EspeakMac => ESPEAK_NAMES,
            PlatformBucket::EspeakOther => ESPEAK_OTHER_NAMES,
            PlatformBucket::Other => &[],
        };
        SelectionRules {
            preferred_names: names.iter().map(|n| n.to_string()).collect(),
            language_order: LANGUAGE_ORDER.iter().map(|l| l.to_string()).collect(),
        }
    }

    /// User-configured names take priority over the bucket table.
    pub fn with_overrides(mut self, preferred: &[String]) -> Self {
        if !preferred.is_empty() {
            let mut names: Vec<String> = preferred.to_vec();
            names.extend(self.preferred_names);
            self.preferred_names = names;
        }
        self
    }
}

fn normalize_tag(tag: &str) -> String {
    tag.replace('_', "-").to_ascii_lowercase()
}

fn is_english(voice: &Voice) -> bool {
    normalize_tag(&voice.language).starts_with("en")
}

fn name_matches(voice_name: &str, preferred: &str) -> bool {
    let name = voice_name.to_ascii_lowercase();
    let wanted = preferred.to_ascii_lowercase();
    name.contains(&wanted) || wanted.contains(&name)
}

/// Walk the rules over an inventory and return the best English voice.
///
/// Order: preferred names (English voices only), then the language order,
/// then anything that looks English at all, then the first voice. `None`
/// only when the inventory is empty.
pub fn pick_voice(voices: &[Voice], rules: &SelectionRules) -> Option<Voice> {
    if voices.is_empty() {
        return None;
    }

    for preferred in &rules.preferred_names {
        if let Some(voice) = voices
            .iter()
            .find(|v| name_matches(&v.name, preferred) && is_english(v))
        {
            debug!(voice = %voice, rule = %preferred, "Matched preferred voice name");
            return Some(voice.clone());
        }
    }

    for tag in &rules.language_order {
        let wanted = normalize_tag(tag);
        if let Some(voice) = voices
            .iter()
            .find(|v| normalize_tag(&v.language) == wanted)
        {
            debug!(voice = %voice, tag = %tag, "Matched preferred language");
            return Some(voice.clone());
        }
    }

    if let Some(voice) = voices.iter().find(|v| {
        let haystack = format!(
            "{} {}",
            v.name.to_ascii_lowercase(),
            normalize_tag(&v.language)
        );
        haystack.contains("english") || haystack.contains("united states") || haystack.contains("en-")
    }) {
        debug!(voice = %voice, "Matched english-ish fallback");
        return Some(voice.clone());
    }

    voices.first().cloned()
}

const LIST_ATTEMPTS: usize = 3;
const LIST_RETRY_DELAY: Duration = Duration::from_millis(200);

/// Query the catalog and pick a voice, retrying briefly when the inventory
/// comes back empty. Some synthesizers report no voices right after install
/// until their data files are scanned.
pub fn select_voice(catalog: &dyn VoiceCatalog, rules: &SelectionRules) -> Result<Option<Voice>> {
    let mut voices = Vec::new();
    for attempt in 1..=LIST_ATTEMPTS {
        voices = catalog.voices()?;
        if !voices.is_empty() {
            break;
        }
        debug!(attempt, "Voice inventory empty, retrying");
        if attempt < LIST_ATTEMPTS {
            std::thread::sleep(LIST_RETRY_DELAY);
        }
    }
    if voices.is_empty() {
        warn!("No voices reported by the synthesizer");
        return Ok(None);
    }
    Ok(pick_voice(&voices, rules))
}

static CACHED_VOICE: Lazy<RwLock<Option<Voice>>> = Lazy::new(|| RwLock::new(None));

/// Selection result shared by both playback sessions. Computed once, but
/// refreshed on the next call if the previous attempt found nothing.
pub fn cached_or_select(
    catalog: &dyn VoiceCatalog,
    rules: &SelectionRules,
) -> Result<Option<Voice>> {
    if let Some(voice) = CACHED_VOICE.read().expect("voice cache poisoned").clone() {
        return Ok(Some(voice));
    }
    let picked = select_voice(catalog, rules)?;
    if let Some(voice) = &picked {
        info!(voice = %voice, "Selected voice");
        *CACHED_VOICE.write().expect("voice cache poisoned") = Some(voice.clone());
    }
    Ok(picked)
}

/// Reset the process-wide selection so each test starts from a cold cache.
#[cfg(test)]
fn invalidate_cached_voice() {
    *CACHED_VOICE.write().expect("voice cache poisoned") = None;
}
