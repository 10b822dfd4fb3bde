use egui::{Color32, Visuals};
use serde::{Deserialize, Serialize};

#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Serialize, Deserialize)]
pub enum Theme {
    Dark,
    #[default]
    Light,
}

impl Theme {
    pub fn toggle(&self) -> Self {
        match self {
            Theme::Dark => Theme::Light,
            Theme::Light => Theme::Dark,
        }
    }

    pub fn visuals(&self) -> Visuals {
        match self {
            Theme::Dark => Visuals::dark(),
            Theme::Light => Visuals::light(),
        }
    }

    /// Colour for success notes such as "No missing values found."
    pub fn ok_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(120, 210, 140),
            Theme::Light => Color32::from_rgb(30, 130, 60),
        }
    }

    pub fn warn_color(&self) -> Color32 {
        match self {
            Theme::Dark => Color32::from_rgb(255, 200, 90),
            Theme::Light => Color32::from_rgb(180, 110, 0),
        }
    }

    pub fn label(&self) -> &'static str {
        match self {
            Theme::Dark => "Dark",
            Theme::Light => "Light",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn toggle_flips() {
        assert_eq!(Theme::Light.toggle(), Theme::Dark);
        assert_eq!(Theme::Dark.toggle().label(), "Light");
    }
}
