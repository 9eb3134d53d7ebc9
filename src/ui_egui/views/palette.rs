use egui::{Color32, Visuals};

use crate::models::event::EventSource;

fn with_alpha(color: Color32, alpha: u8) -> Color32 {
    Color32::from_rgba_unmultiplied(color.r(), color.g(), color.b(), alpha)
}

fn blend(a: Color32, b: Color32, t: f32) -> Color32 {
    let t = t.clamp(0.0, 1.0);
    let lerp = |c1: u8, c2: u8| -> u8 { ((c1 as f32 * (1.0 - t)) + (c2 as f32 * t)).round() as u8 };
    Color32::from_rgb(lerp(a.r(), b.r()), lerp(a.g(), b.g()), lerp(a.b(), b.b()))
}

/// Fill colour for an event block, chosen by where the event came from.
pub(crate) fn source_color(source: EventSource) -> Color32 {
    match source {
        EventSource::Google => Color32::from_rgb(66, 133, 244),
        EventSource::Native => Color32::from_rgb(46, 160, 120),
        EventSource::Unknown => Color32::from_rgb(120, 120, 140),
    }
}

#[derive(Clone, Copy)]
pub(crate) struct TimeGridPalette {
    pub column_bg: Color32,
    pub today_bg: Color32,
    pub hour_line: Color32,
    pub half_hour_line: Color32,
    pub divider: Color32,
    pub label: Color32,
    pub event_text: Color32,
    pub now_line: Color32,
    pub skeleton: Color32,
    pub header_text: Color32,
    pub today_header_text: Color32,
}

impl TimeGridPalette {
    pub fn from_visuals(visuals: &Visuals) -> Self {
        let base = visuals.panel_fill;
        let line = visuals.widgets.noninteractive.bg_stroke.color;
        let accent = visuals.selection.bg_fill;
        Self {
            column_bg: base,
            today_bg: blend(base, accent, if visuals.dark_mode { 0.18 } else { 0.08 }),
            hour_line: line,
            half_hour_line: with_alpha(line, 110),
            divider: with_alpha(line, 220),
            label: Color32::GRAY,
            event_text: Color32::WHITE,
            now_line: Color32::from_rgb(255, 100, 100),
            skeleton: with_alpha(visuals.weak_text_color(), 60),
            header_text: visuals.text_color(),
            today_header_text: accent,
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_sources_have_distinct_colors() {
        let google = source_color(EventSource::Google);
        let native = source_color(EventSource::Native);
        let unknown = source_color(EventSource::Unknown);
        assert_ne!(google, native);
        assert_ne!(native, unknown);
    }

    #[test]
    fn test_blend_endpoints() {
        let a = Color32::from_rgb(0, 0, 0);
        let b = Color32::from_rgb(200, 100, 50);
        assert_eq!(blend(a, b, 0.0), a);
        assert_eq!(blend(a, b, 1.0), b);
        assert_eq!(blend(a, b, 0.5), Color32::from_rgb(100, 50, 25));
    }
}
