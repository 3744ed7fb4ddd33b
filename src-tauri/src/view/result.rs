//! Result panel contents, single or dual view.

use crate::render;
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum ResultTab {
    #[default]
    Formatted,
    Raw,
}

#[derive(Debug, Clone, PartialEq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct ResultView {
    /// The text exactly as extracted.
    pub raw: String,
    /// Rendered Markdown; present only in dual-view mode.
    pub html: Option<String>,
    /// What the formatted tab reads as, for copying.
    pub plain: Option<String>,
    pub active_tab: ResultTab,
}

impl ResultView {
    pub fn new(raw: String, dual_view: bool) -> Self {
        let (html, plain) = if dual_view {
            (
                Some(render::markdown_to_html(&raw)),
                Some(render::markdown_to_plain_text(&raw)),
            )
        } else {
            (None, None)
        };
        Self {
            raw,
            html,
            plain,
            active_tab: ResultTab::default(),
        }
    }

    /// Raw text, unless the formatted tab of a dual view is active.
    pub fn copy_text(&self) -> &str {
        match (&self.plain, self.active_tab) {
            (Some(plain), ResultTab::Formatted) => plain,
            _ => &self.raw,
        }
    }
}
