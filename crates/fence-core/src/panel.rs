//! Edit panel state exposed to the UI

use fence_meta::FenceId;
use serde::Serialize;

#[derive(Debug, Clone, Copy, Default, PartialEq, Eq, Serialize)]
#[serde(rename_all = "lowercase")]
pub enum PanelVisibility {
    #[default]
    Hidden,
    Shown,
}

/// What the edit panel shows.
///
/// Published as a reactive value; the UI renders it and never writes it.
#[derive(Debug, Clone, Default, PartialEq, Serialize)]
pub struct EditPanel {
    pub visibility: PanelVisibility,
    pub selected: Option<FenceId>,
    pub radius: Option<f64>,
}

impl EditPanel {
    pub fn hidden() -> Self {
        Self::default()
    }

    pub fn shown(id: FenceId, radius: f64) -> Self {
        Self {
            visibility: PanelVisibility::Shown,
            selected: Some(id),
            radius: Some(radius),
        }
    }

    pub fn is_shown(&self) -> bool {
        self.visibility == PanelVisibility::Shown
    }
}
