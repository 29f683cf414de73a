use serde::{Deserialize, Serialize};

/// Frame diagnostics. When enabled, each frame is summarised at debug level
/// and busy frames are reported at warn level.
#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(default)]
pub struct DiagnosticsCfg {
    pub enabled: bool,
    /// Warn when a frame carries more changes than this.
    pub busy_frame_changes: usize,
}

impl Default for DiagnosticsCfg {
    fn default() -> Self {
        DiagnosticsCfg {
            enabled: true,
            busy_frame_changes: 256,
        }
    }
}

impl DiagnosticsCfg {
    pub(crate) fn report(&self, frame: &crate::SiteFrame) {
        if !self.enabled {
            return;
        }
        log::debug!(
            "frame {} @{}ms: {} changes, {} events",
            frame.epoch,
            frame.now_ms,
            frame.changes.len(),
            frame.events.len()
        );
        if frame.changes.len() > self.busy_frame_changes {
            log::warn!(
                "frame {} published {} changes (limit {})",
                frame.epoch,
                frame.changes.len(),
                self.busy_frame_changes
            );
        }
    }
}
