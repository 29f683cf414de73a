use serde::{Deserialize, Serialize};

use site_motion_core::{NavKey, SectionId};

/// Input queued by the host between frames. Applied in arrival order at the
/// start of the next `step`.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(tag = "type", rename_all = "snake_case")]
pub enum HostEvent {
    Scroll {
        y: f32,
    },
    Resize {
        width: f32,
        height: f32,
        document_height: f32,
    },
    /// Client pixels; normalised against the last known viewport.
    PointerMove {
        x: f32,
        y: f32,
    },
    TriggerEnter,
    TriggerLeave,
    MenuEnter,
    MenuLeave,
    ToggleMegaMenu,
    OpenMobileMenu {
        focusable: usize,
    },
    CloseMobileMenu,
    OpenSearch,
    CloseSearch,
    Key(NavKey),
    Focus {
        index: usize,
    },
    Skip,
    SectionLayout {
        section: SectionId,
        top: f32,
        height: f32,
    },
    RevealLayout {
        name: String,
        top: f32,
        height: f32,
    },
}

impl HostEvent {
    /// Short label used in log lines.
    pub fn kind(&self) -> &'static str {
        match self {
            HostEvent::Scroll { .. } => "scroll",
            HostEvent::Resize { .. } => "resize",
            HostEvent::PointerMove { .. } => "pointer_move",
            HostEvent::TriggerEnter => "trigger_enter",
            HostEvent::TriggerLeave => "trigger_leave",
            HostEvent::MenuEnter => "menu_enter",
            HostEvent::MenuLeave => "menu_leave",
            HostEvent::ToggleMegaMenu => "toggle_mega_menu",
            HostEvent::OpenMobileMenu { .. } => "open_mobile_menu",
            HostEvent::CloseMobileMenu => "close_mobile_menu",
            HostEvent::OpenSearch => "open_search",
            HostEvent::CloseSearch => "close_search",
            HostEvent::Key(_) => "key",
            HostEvent::Focus { .. } => "focus",
            HostEvent::Skip => "skip",
            HostEvent::SectionLayout { .. } => "section_layout",
            HostEvent::RevealLayout { .. } => "reveal_layout",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn parses_tagged_json() {
        let e: HostEvent = serde_json::from_str(r#"{"type":"scroll","y":120.0}"#).unwrap();
        assert_eq!(e, HostEvent::Scroll { y: 120.0 });

        let e: HostEvent =
            serde_json::from_str(r#"{"type":"key","key":"tab","shift":true}"#).unwrap();
        assert_eq!(e, HostEvent::Key(NavKey::Tab { shift: true }));

        let e: HostEvent = serde_json::from_str(
            r##"{"type":"section_layout","section":"impact","top":2400,"height":700}"##,
        )
        .unwrap();
        assert_eq!(e.kind(), "section_layout");
    }
}
