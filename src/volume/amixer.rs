//! ALSA simple mixer control driven through the `amixer` tool.

use std::process::Command;

use tracing::debug;

use crate::error::{Error, Result};

use super::hardware::MixerDevice;

const PREFERRED_CONTROLS: [&str; 2] = ["Master", "PCM"];

#[derive(Debug, Clone)]
pub struct AmixerDevice {
    control: String,
}

impl AmixerDevice {
    pub fn new(control: impl Into<String>) -> Self {
        Self {
            control: control.into(),
        }
    }

    pub fn control(&self) -> &str {
        &self.control
    }

    /// Look for a usable simple control on the default card.
    pub fn detect() -> Option<Self> {
        let output = Command::new("amixer").arg("scontrols").output().ok()?;
        if !output.status.success() {
            debug!("amixer scontrols failed");
            return None;
        }
        let text = String::from_utf8_lossy(&output.stdout);
        pick_control(&text).map(Self::new)
    }

    fn run(&self, args: &[&str]) -> Result<String> {
        let output = Command::new("amixer")
            .args(args)
            .output()
            .map_err(|e| Error::Mixer(format!("cannot run amixer: {e}")))?;
        if !output.status.success() {
            return Err(Error::Mixer(format!(
                "amixer {} failed: {}",
                args.join(" "),
                String::from_utf8_lossy(&output.stderr).trim()
            )));
        }
        Ok(String::from_utf8_lossy(&output.stdout).into_owned())
    }
}

impl MixerDevice for AmixerDevice {
    fn read(&self) -> Result<(u8, bool)> {
        let out = self.run(&["-M", "get", &self.control])?;
        parse_level(&out)
            .ok_or_else(|| Error::Mixer(format!("no level in amixer output for {}", self.control)))
    }

    fn write(&self, percent: u8) -> Result<()> {
        let level = format!("{}%", percent.min(100));
        self.run(&["-M", "set", &self.control, &level]).map(|_| ())
    }

    fn set_muted(&self, muted: bool) -> Result<()> {
        let switch = if muted { "mute" } else { "unmute" };
        self.run(&["set", &self.control, switch]).map(|_| ())
    }
}

/// First preferred control named in `amixer scontrols` output, e.g.
/// `Simple mixer control 'Master',0`.
pub(crate) fn pick_control(scontrols: &str) -> Option<String> {
    let names: Vec<&str> = scontrols
        .lines()
        .filter_map(|l| l.split('\'').nth(1))
        .collect();
    PREFERRED_CONTROLS
        .iter()
        .find(|want| names.contains(want))
        .map(|s| s.to_string())
}

/// Level and mute state from `amixer get` output: the first `[NN%]` and
/// the first `[on]`/`[off]`.
pub(crate) fn parse_level(output: &str) -> Option<(u8, bool)> {
    let mut level = None;
    let mut muted = false;
    for field in output.split('[').skip(1) {
        let Some(value) = field.split(']').next() else {
            continue;
        };
        if level.is_none() {
            if let Some(p) = value.strip_suffix('%') {
                level = p.trim().parse::<u8>().ok().map(|v| v.min(100));
                continue;
            }
        }
        match value {
            "off" => {
                muted = true;
                break;
            }
            "on" => break,
            _ => {}
        }
    }
    level.map(|l| (l, muted))
}
