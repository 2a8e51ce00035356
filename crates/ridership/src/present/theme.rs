//! Light/dark theme colours shared by charts and the map.

use palette::{LinSrgb, Mix, Srgb, Srgba, WithAlpha};
use serde::Serialize;
use strum::{Display, EnumIter, EnumString};

#[derive(Clone, Copy, Debug, Default, PartialEq, Eq, Hash, Serialize, Display, EnumString, EnumIter)]
#[strum(serialize_all = "lowercase", ascii_case_insensitive)]
#[serde(rename_all = "lowercase")]
pub enum Theme {
    #[default]
    Dark,
    Light,
}

impl Theme {
    pub fn toggled(self) -> Self {
        match self {
            Self::Dark => Self::Light,
            Self::Light => Self::Dark,
        }
    }

    pub fn palette(self) -> ThemePalette {
        match self {
            Self::Dark => ThemePalette {
                chart_template: "plotly_dark",
                basemap: "CartoDB DarkMatter",
                background: rgb(0x020617),
                plot_background: rgb(0x0f172a),
                text: rgb(0xe5e7eb),
                accent: rgb(0xf97316),
                marker: rgb(0xe5e7eb),
                origin: rgb(0xf97316),
                destination: rgb(0x22c55e),
                band: rgba(0x94a3b8, 0.25),
                route_line: rgb(0x64748b),
            },
            Self::Light => ThemePalette {
                chart_template: "plotly_white",
                basemap: "CartoDB Positron",
                background: rgb(0xf3f4f6),
                plot_background: rgb(0xffffff),
                text: rgb(0x111827),
                accent: rgb(0x2563eb),
                marker: rgb(0x111827),
                origin: rgb(0xf97316),
                destination: rgb(0x22c55e),
                band: rgba(0x94a3b8, 0.25),
                route_line: rgb(0x64748b),
            },
        }
    }
}

fn rgba(hex: u32, alpha: f32) -> Srgba<f32> {
    let [_, r, g, b] = hex.to_be_bytes();
    Srgb::new(r, g, b).into_format::<f32>().with_alpha(alpha)
}

fn rgb(hex: u32) -> Srgba<f32> {
    rgba(hex, 1.0)
}

/// CSS colour string: `#rrggbb`, or `rgba(..)` when translucent
pub fn css(color: Srgba<f32>) -> String {
    let c: Srgba<u8> = color.into_format();
    if c.alpha == u8::MAX {
        format!("#{:02x}{:02x}{:02x}", c.red, c.green, c.blue)
    } else {
        format!("rgba({},{},{},{:.2})", c.red, c.green, c.blue, color.alpha)
    }
}

#[derive(Clone, Copy, Debug, PartialEq)]
pub struct ThemePalette {
    pub chart_template: &'static str,
    pub basemap: &'static str,
    pub background: Srgba<f32>,
    pub plot_background: Srgba<f32>,
    pub text: Srgba<f32>,
    pub accent: Srgba<f32>,
    /// Scatter markers
    pub marker: Srgba<f32>,
    pub origin: Srgba<f32>,
    pub destination: Srgba<f32>,
    /// Shaded restriction period
    pub band: Srgba<f32>,
    pub route_line: Srgba<f32>,
}

impl ThemePalette {
    /// Heat-map colour stops running from the plot background to `hot`,
    /// blended in linear light.
    pub fn heat_gradient(&self, hot: Srgba<f32>, steps: usize) -> Vec<(f32, String)> {
        let cold: LinSrgb = self.plot_background.color.into_linear();
        let hot_lin: LinSrgb = hot.color.into_linear();
        let steps = steps.max(2);

        (0..steps)
            .map(|i| {
                let t = i as f32 / (steps - 1) as f32;
                let mixed = Srgb::<f32>::from_linear(cold.mix(hot_lin, t));
                (t, css(mixed.with_alpha(1.0)))
            })
            .collect()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::str::FromStr;

    #[test]
    fn test_theme_parse_and_toggle() {
        assert_eq!(Theme::from_str("dark").unwrap(), Theme::Dark);
        assert_eq!(Theme::from_str("Light").unwrap(), Theme::Light);
        assert!(Theme::from_str("sepia").is_err());
        assert_eq!(Theme::default(), Theme::Dark);
        assert_eq!(Theme::Dark.toggled(), Theme::Light);
        assert_eq!(Theme::Light.to_string(), "light");
    }

    #[test]
    fn test_css() {
        assert_eq!(css(rgb(0xf97316)), "#f97316");
        assert_eq!(css(rgba(0x94a3b8, 0.25)), "rgba(148,163,184,0.25)");
    }

    #[test]
    fn test_palettes_differ() {
        let dark = Theme::Dark.palette();
        let light = Theme::Light.palette();
        assert_eq!(dark.basemap, "CartoDB DarkMatter");
        assert_eq!(light.chart_template, "plotly_white");
        assert_ne!(css(dark.accent), css(light.accent));
    }

    #[test]
    fn test_heat_gradient_endpoints() {
        let palette = Theme::Light.palette();
        let stops = palette.heat_gradient(palette.origin, 5);
        assert_eq!(stops.len(), 5);
        assert_eq!(stops[0], (0.0, "#ffffff".to_string()));
        assert_eq!(stops[4], (1.0, "#f97316".to_string()));
    }
}
