use trellis_core::model::{
    ComparisonCondition, DarkLightMode, Image, MediaQueryCondition, Stylesheet,
};
use trellis_core::px_to_dp;

/// Evaluates media-query conditions for one frame.
#[derive(Clone, Copy, Debug, PartialEq)]
pub struct MediaQueryHelper {
    pub frame_width_dp: f32,
    pub dark_theme: bool,
}

impl MediaQueryHelper {
    pub fn new(frame_width_px: i32, density: f32, dark_theme: bool) -> Self {
        MediaQueryHelper {
            frame_width_dp: px_to_dp(frame_width_px, density),
            dark_theme,
        }
    }

    pub fn are_conditions_met(&self, conditions: &[MediaQueryCondition]) -> bool {
        conditions.iter().all(|c| self.is_condition_met(c))
    }

    pub fn is_condition_met(&self, condition: &MediaQueryCondition) -> bool {
        match condition {
            MediaQueryCondition::FrameWidth {
                width_dp,
                condition,
            } => {
                let target = *width_dp as f32;
                let width = self.frame_width_dp;
                match condition {
                    ComparisonCondition::Equals => (width - target).abs() < 0.5,
                    ComparisonCondition::NotEquals => (width - target).abs() >= 0.5,
                    ComparisonCondition::GreaterThan => width > target,
                    ComparisonCondition::LessThan => width < target,
                }
            }
            MediaQueryCondition::DarkLight(mode) => match mode {
                DarkLightMode::Dark => self.dark_theme,
                DarkLightMode::Light => !self.dark_theme,
            },
        }
    }

    pub fn filter_stylesheets<'a>(
        &self,
        stylesheets: impl IntoIterator<Item = &'a Stylesheet>,
    ) -> Vec<&'a Stylesheet> {
        stylesheets
            .into_iter()
            .filter(|s| self.are_conditions_met(&s.conditions))
            .collect()
    }

    /// Keeps the sources whose conditions all hold (unconditional sources
    /// always do).
    pub fn filter_image_sources(&self, image: &Image) -> Image {
        Image {
            sources: image
                .sources
                .iter()
                .filter(|s| self.are_conditions_met(&s.conditions))
                .cloned()
                .collect(),
            tint_color: image.tint_color,
        }
    }
}
