//! Page geometry handed to the orchestrator at startup.
//!
//! Positions are document coordinates in CSS px. Layout can also change at
//! runtime through `SectionLayout` / `RevealLayout` host events.

use serde::{Deserialize, Serialize};

use site_motion_core::{RevealPlan, SectionId, Span, TriggerOptions};

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct SectionSpan {
    pub section: SectionId,
    pub top: f32,
    pub height: f32,
}

/// One reveal registration. Trigger and plan default to the configured
/// reveal defaults; `children` only overrides the child count.
#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
pub struct RevealSpec {
    pub name: String,
    pub top: f32,
    pub height: f32,
    #[serde(default)]
    pub trigger: Option<TriggerOptions>,
    #[serde(default)]
    pub plan: Option<RevealPlan>,
    #[serde(default)]
    pub children: Option<usize>,
}

impl RevealSpec {
    pub fn span(&self) -> Span {
        Span::new(self.top, self.height)
    }
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(default)]
pub struct SiteLayout {
    /// Viewport (width, height).
    pub viewport: [f32; 2],
    pub document_height: f32,
    pub sections: Vec<SectionSpan>,
    pub reveals: Vec<RevealSpec>,
}

impl Default for SiteLayout {
    fn default() -> Self {
        Self {
            viewport: [1280.0, 800.0],
            document_height: 800.0,
            sections: Vec::new(),
            reveals: Vec::new(),
        }
    }
}

impl SiteLayout {
    pub fn from_json_str(s: &str) -> anyhow::Result<Self> {
        use anyhow::Context;
        serde_json::from_str(s).context("parse site layout")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn optional_fields_default() {
        let layout = SiteLayout::from_json_str(
            r#"{
                "viewport": [1440, 900],
                "document_height": 5200,
                "reveals": [{ "name": "stats", "top": 1200, "height": 300, "children": 3 }]
            }"#,
        )
        .unwrap();
        assert!(layout.sections.is_empty());
        let r = &layout.reveals[0];
        assert_eq!(r.children, Some(3));
        assert!(r.trigger.is_none() && r.plan.is_none());
        assert_eq!(r.span().bottom(), 1500.0);
    }
}
