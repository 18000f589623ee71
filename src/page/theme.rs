use super::document::Page;
use crate::app::config::Config;
use std::fmt;
use std::str::FromStr;

/// Document-root attribute carrying the active theme
pub const ATTR_DATA_THEME: &str = "data-theme";
/// Element id of the theme toggle button
pub const THEME_TOGGLE_ID: &str = "themeToggle";

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Theme {
    Light,
    Dark,
}

impl Theme {
    pub fn as_str(&self) -> &'static str {
        match self {
            Theme::Light => "light",
            Theme::Dark => "dark",
        }
    }

    /// Dark goes to light, everything else (including no theme) goes to dark
    pub fn next(current: Option<Theme>) -> Theme {
        match current {
            Some(Theme::Dark) => Theme::Light,
            _ => Theme::Dark,
        }
    }
}

impl fmt::Display for Theme {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

impl FromStr for Theme {
    type Err = String;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "light" => Ok(Theme::Light),
            "dark" => Ok(Theme::Dark),
            other => Err(format!("Unknown theme: {}", other)),
        }
    }
}

/// Theme currently applied to the page, if any
pub fn current_theme(page: &Page) -> Option<Theme> {
    page.attr(page.root(), ATTR_DATA_THEME)
        .and_then(|raw| raw.parse().ok())
}

pub fn apply_theme(page: &mut Page, theme: Theme) {
    let root = page.root();
    page.set_attr(root, ATTR_DATA_THEME, theme.as_str());
}

/// Flip the page theme and reflect it on the toggle button
pub fn toggle_theme(page: &mut Page) -> Theme {
    let next = Theme::next(current_theme(page));
    apply_theme(page, next);

    if let Some(button) = page.element_by_id(THEME_TOGGLE_ID) {
        page.set_attr(button, "aria-pressed", (next == Theme::Dark).to_string());
    }

    tracing::debug!("Theme toggled to {}", next);
    next
}

/// Saved preference; values other than light/dark mean "no preference"
pub fn saved_theme(config: &Config) -> Option<Theme> {
    config.general.theme.parse().ok()
}

/// Apply the saved preference, leaving the page untouched without one
pub fn restore_theme(page: &mut Page, config: &Config) -> Option<Theme> {
    let theme = saved_theme(config)?;
    apply_theme(page, theme);
    Some(theme)
}

/// Record the theme as the saved preference (caller persists the config)
pub fn remember_theme(config: &mut Config, theme: Theme) {
    config.general.theme = theme.to_string();
}
