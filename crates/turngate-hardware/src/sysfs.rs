//! Linux sysfs GPIO backend.
//!
//! Drives a line through the `/sys/class/gpio` interface:
//!
//! ```text
//! echo 529  > /sys/class/gpio/export              # acquire (base 512 + line 17)
//! echo low  > /sys/class/gpio/gpio529/direction   # output, initial level
//! echo 1    > /sys/class/gpio/gpio529/value       # drive
//! echo 529  > /sys/class/gpio/unexport            # release
//! ```
//!
//! Lines are configured by their offset on the header controller (BCM
//! numbering). Sysfs numbers every line globally from the owning chip's
//! `base`, which recent kernels no longer start at 0, so the offset is
//! translated through the `gpiochip*` entries on every `initialize`.
//!
//! Writing `high`/`low` to `direction` configures the line as an output and
//! sets its level atomically, so the relay never sees a glitch at startup.

use crate::{HardwareError, Result, traits::DigitalOutputPin, types::DeviceInfo};
use std::io::ErrorKind;
use std::path::{Path, PathBuf};
use std::time::Duration;
use tracing::{debug, warn};
use turngate_core::Level;

/// Default sysfs GPIO class directory.
pub const SYSFS_GPIO_ROOT: &str = "/sys/class/gpio";

/// Controllers that own the Raspberry Pi header lines, newest board first.
const HEADER_CHIP_LABELS: [&str; 4] = [
    "pinctrl-rp1",
    "pinctrl-bcm2712",
    "pinctrl-bcm2711",
    "pinctrl-bcm2835",
];

/// How long to wait for udev to expose the line directory after export.
const EXPORT_SETTLE_ATTEMPTS: u32 = 20;
const EXPORT_SETTLE_INTERVAL: Duration = Duration::from_millis(10);

// errno values the kernel uses on export
const EBUSY: i32 = 16;
const EINVAL: i32 = 22;

/// A GPIO controller listed as `gpiochip<base>` under the sysfs root.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct GpioChip {
    pub label: String,
    pub base: u32,
    pub ngpio: u32,
}

impl GpioChip {
    fn covers(&self, offset: u32) -> bool {
        offset < self.ngpio
    }
}

/// List the controllers under `root`. A missing root lists nothing.
pub async fn list_chips(root: &Path) -> Result<Vec<GpioChip>> {
    let mut entries = match tokio::fs::read_dir(root).await {
        Ok(entries) => entries,
        Err(e) if e.kind() == ErrorKind::NotFound => return Ok(Vec::new()),
        Err(e) => return Err(e.into()),
    };

    let mut chips = Vec::new();
    while let Some(entry) = entries.next_entry().await? {
        if !entry.file_name().to_string_lossy().starts_with("gpiochip") {
            continue;
        }
        match read_chip(&entry.path()).await {
            Ok(chip) => chips.push(chip),
            Err(e) => debug!(path = %entry.path().display(), error = %e, "Skipping unreadable GPIO chip"),
        }
    }
    chips.sort_by_key(|chip| chip.base);
    Ok(chips)
}

async fn read_chip(dir: &Path) -> Result<GpioChip> {
    let read = |file: &'static str| {
        let path = dir.join(file);
        async move { tokio::fs::read_to_string(path).await }
    };
    let number = |text: String| {
        text.trim()
            .parse::<u32>()
            .map_err(|e| HardwareError::configuration(format!("{}: {e}", dir.display())))
    };

    Ok(GpioChip {
        label: read("label").await?.trim().to_string(),
        base: number(read("base").await?)?,
        ngpio: number(read("ngpio").await?)?,
    })
}

/// Pick the controller that owns header line `offset`.
///
/// A known header controller wins; otherwise the lowest-based chip wide
/// enough for the offset. `None` if no chip covers it.
pub fn header_chip(chips: &[GpioChip], offset: u32) -> Option<&GpioChip> {
    chips
        .iter()
        .find(|chip| HEADER_CHIP_LABELS.contains(&chip.label.as_str()) && chip.covers(offset))
        .or_else(|| chips.iter().find(|chip| chip.covers(offset)))
}

/// GPIO line driven through sysfs.
#[derive(Debug)]
pub struct SysfsPin {
    line: u32,
    number: u32,
    root: PathBuf,
    exported: bool,
    resting: Option<Level>,
}

impl SysfsPin {
    /// Create a pin for header line `line` under the default sysfs root.
    pub fn new(line: u32) -> Self {
        Self::with_root(line, SYSFS_GPIO_ROOT)
    }

    /// Create a pin for header line `line` under a custom sysfs root.
    pub fn with_root(line: u32, root: impl Into<PathBuf>) -> Self {
        Self {
            line,
            number: line,
            root: root.into(),
            exported: false,
            resting: None,
        }
    }

    /// GPIO line offset on its controller.
    pub fn line(&self) -> u32 {
        self.line
    }

    /// Global sysfs number. Equal to [`line`](Self::line) until
    /// `initialize` has resolved the controller base.
    pub fn number(&self) -> u32 {
        self.number
    }

    fn name(&self) -> String {
        format!("gpio{}", self.number)
    }

    fn line_dir(&self) -> PathBuf {
        self.root.join(self.name())
    }

    async fn resolve_number(&self) -> Result<u32> {
        let chips = list_chips(&self.root).await?;
        if chips.is_empty() {
            // Legacy trees without chip entries number lines from 0
            return Ok(self.line);
        }

        let chip = header_chip(&chips, self.line)
            .ok_or_else(|| HardwareError::pin_not_found(format!("line {}", self.line)))?;
        debug!(line = self.line, chip = %chip.label, base = chip.base, "Resolved GPIO controller");
        Ok(chip.base + self.line)
    }

    fn map_export_error(&self, error: std::io::Error) -> HardwareError {
        match error.raw_os_error() {
            Some(EBUSY) => HardwareError::pin_busy(self.name()),
            Some(EINVAL) => HardwareError::pin_not_found(self.name()),
            _ if error.kind() == ErrorKind::NotFound => HardwareError::pin_not_found(self.name()),
            _ => HardwareError::Io(error),
        }
    }

    async fn wait_for_line_dir(&self) -> Result<()> {
        let direction = self.line_dir().join("direction");
        for _ in 0..EXPORT_SETTLE_ATTEMPTS {
            if tokio::fs::try_exists(&direction).await? {
                return Ok(());
            }
            tokio::time::sleep(EXPORT_SETTLE_INTERVAL).await;
        }
        Err(HardwareError::pin_not_found(self.name()))
    }

    async fn unexport(&self) -> Result<()> {
        tokio::fs::write(self.root.join("unexport"), self.number.to_string()).await?;
        Ok(())
    }
}

fn value_str(level: Level) -> &'static str {
    if level.is_high() { "1" } else { "0" }
}

fn direction_str(level: Level) -> &'static str {
    if level.is_high() { "high" } else { "low" }
}

impl DigitalOutputPin for SysfsPin {
    async fn initialize(&mut self, level: Level) -> Result<()> {
        if self.exported {
            return Err(HardwareError::AlreadyInitialized);
        }

        self.number = self.resolve_number().await?;

        debug!(line = self.line, number = self.number, root = %self.root.display(), "Exporting GPIO line");
        tokio::fs::write(self.root.join("export"), self.number.to_string())
            .await
            .map_err(|e| self.map_export_error(e))?;
        self.exported = true;

        let configured = async {
            self.wait_for_line_dir().await?;
            tokio::fs::write(self.line_dir().join("direction"), direction_str(level))
                .await
                .map_err(|e| HardwareError::write(level, e.to_string()))
        }
        .await;

        if let Err(e) = configured {
            // Hand the line back so the next attempt is not refused as busy
            if let Err(unexport_err) = self.unexport().await {
                warn!(line = self.line, error = %unexport_err, "Failed to unexport after init failure");
            }
            self.exported = false;
            return Err(e);
        }

        self.resting = Some(level);
        Ok(())
    }

    async fn set_level(&mut self, level: Level) -> Result<()> {
        if !self.exported {
            return Err(HardwareError::NotInitialized);
        }

        tokio::fs::write(self.line_dir().join("value"), value_str(level))
            .await
            .map_err(|e| HardwareError::write(level, e.to_string()))
    }

    async fn release(&mut self) -> Result<()> {
        if !self.exported {
            return Err(HardwareError::NotInitialized);
        }

        self.unexport().await?;
        self.exported = false;
        self.resting = None;
        debug!(line = self.line, "GPIO line unexported");
        Ok(())
    }

    fn info(&self) -> DeviceInfo {
        DeviceInfo::new(self.name(), "sysfs").with_line(self.line)
    }
}

impl Drop for SysfsPin {
    fn drop(&mut self) {
        if !self.exported {
            return;
        }

        // Still owned: put the line back at the level it was acquired at and
        // give it up, without an async context to do it properly.
        warn!(line = self.line, "GPIO line dropped without release");
        if let Some(level) = self.resting {
            let _ = std::fs::write(self.line_dir().join("value"), value_str(level));
        }
        let _ = std::fs::write(self.root.join("unexport"), self.number.to_string());
    }
}
