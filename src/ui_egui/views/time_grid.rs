//! Time grid rendering for the week and 3-day views.
//!
//! Geometry comes from `services::layout`; this module only paints it and
//! turns pointer input into a [`GridInteraction`].

use chrono::NaiveDate;
use chrono_tz::Tz;
use egui::{Align2, CursorIcon, FontId, Pos2, Rect, Sense, Stroke, Vec2};

use super::palette::{source_color, TimeGridPalette};
use super::GridInteraction;
use crate::models::event::CalendarEvent;
use crate::models::settings::OverlapStrategy;
use crate::services::layout::{
    compute_day_hours, layout_day, partition_by_day, slot_at_offset, DayPartition, EventSlot,
    HOURS_PER_DAY,
};

/// Constants for time grid rendering
pub const TIME_LABEL_WIDTH: f32 = 56.0;
pub const COLUMN_SPACING: f32 = 1.0;
pub const HEADER_HEIGHT: f32 = 36.0;
pub const ALL_DAY_CHIP_HEIGHT: f32 = 20.0;
const MIN_COLUMN_WIDTH: f32 = 24.0;

/// Values the grid consumes but never computes.
#[derive(Debug, Clone, Copy)]
pub struct TimeGridConfig {
    pub hour_height: f32,
    pub slot_minutes: u32,
    pub tz: Tz,
    pub overlap_strategy: OverlapStrategy,
}

/// Per-frame inputs owned by the host.
pub struct TimeGridInput<'a> {
    pub dates: &'a [NaiveDate],
    /// `None` while the feed is still loading
    pub events: Option<&'a [CalendarEvent]>,
    pub today: NaiveDate,
    /// Column index and offset of the live now marker, when now is visible
    pub now_marker: Option<(usize, f32)>,
    /// Set on the first frame after mount only
    pub initial_scroll: Option<f32>,
}

/// Render headers, the all-day row and the scrollable time grid.
pub fn render_time_grid(
    ui: &mut egui::Ui,
    input: &TimeGridInput<'_>,
    config: &TimeGridConfig,
) -> GridInteraction {
    let palette = TimeGridPalette::from_visuals(ui.visuals());
    let mut result = GridInteraction::default();

    if input.dates.is_empty() {
        return result;
    }

    let col_width = column_width(ui.available_width(), input.dates.len());
    render_day_headers(ui, input.dates, input.today, col_width, &palette);

    let Some(events) = input.events else {
        render_skeleton(ui, input.dates.len(), col_width, config.hour_height, &palette);
        return result;
    };

    let partition = partition_by_day(events, input.dates, &config.tz, true);
    if partition.has_all_day_events() {
        result.merge(render_all_day_row(ui, input.dates, &partition, col_width, config, &palette));
    }

    ui.add_space(4.0);

    let mut area = egui::ScrollArea::vertical()
        .id_source("time_grid_scroll")
        .auto_shrink([false, false]);
    if let Some(offset) = input.initial_scroll {
        area = area.vertical_scroll_offset(offset);
    }

    let grid_result = area
        .show(ui, |scroll_ui| {
            render_grid_body(scroll_ui, input, &partition, col_width, config, &palette)
        })
        .inner;
    result.merge(grid_result);

    result
}

fn column_width(available_width: f32, columns: usize) -> f32 {
    let columns = columns.max(1) as f32;
    let spacing = COLUMN_SPACING * columns;
    ((available_width - TIME_LABEL_WIDTH - spacing) / columns).max(MIN_COLUMN_WIDTH)
}

fn column_rect(grid: Rect, index: usize, col_width: f32) -> Rect {
    let left = grid.left() + TIME_LABEL_WIDTH + COLUMN_SPACING + index as f32 * (col_width + COLUMN_SPACING);
    Rect::from_min_max(Pos2::new(left, grid.top()), Pos2::new(left + col_width, grid.bottom()))
}

fn grid_width(columns: usize, col_width: f32) -> f32 {
    TIME_LABEL_WIDTH + columns as f32 * (col_width + COLUMN_SPACING)
}

fn render_day_headers(
    ui: &mut egui::Ui,
    dates: &[NaiveDate],
    today: NaiveDate,
    col_width: f32,
    palette: &TimeGridPalette,
) {
    let (rect, _) = ui.allocate_exact_size(
        Vec2::new(grid_width(dates.len(), col_width), HEADER_HEIGHT),
        Sense::hover(),
    );
    let painter = ui.painter_at(rect);

    for (i, date) in dates.iter().enumerate() {
        let col = column_rect(rect, i, col_width);
        let is_today = *date == today;
        let color = if is_today { palette.today_header_text } else { palette.header_text };

        painter.text(
            col.center(),
            Align2::CENTER_CENTER,
            date.format("%a %-d").to_string(),
            FontId::proportional(13.0),
            color,
        );
    }

    painter.hline(rect.x_range(), rect.bottom() - 0.5, Stroke::new(1.0, palette.divider));
}

fn render_all_day_row(
    ui: &mut egui::Ui,
    dates: &[NaiveDate],
    partition: &DayPartition,
    col_width: f32,
    config: &TimeGridConfig,
    palette: &TimeGridPalette,
) -> GridInteraction {
    let mut result = GridInteraction::default();
    let rows = dates
        .iter()
        .map(|date| partition.all_day_for(*date).len())
        .max()
        .unwrap_or(0);

    let row_height = ALL_DAY_CHIP_HEIGHT + 2.0;
    let (rect, _) = ui.allocate_exact_size(
        Vec2::new(grid_width(dates.len(), col_width), rows as f32 * row_height + 2.0),
        Sense::hover(),
    );
    let painter = ui.painter_at(rect);

    painter.text(
        Pos2::new(rect.left() + TIME_LABEL_WIDTH - 6.0, rect.top() + 2.0),
        Align2::RIGHT_TOP,
        "all-day",
        FontId::proportional(10.0),
        palette.label,
    );

    for (i, date) in dates.iter().enumerate() {
        let col = column_rect(rect, i, col_width);
        for (row, event) in partition.all_day_for(*date).iter().enumerate() {
            let chip = Rect::from_min_size(
                Pos2::new(col.left() + 1.0, col.top() + 1.0 + row as f32 * row_height),
                Vec2::new(col.width() - 2.0, ALL_DAY_CHIP_HEIGHT),
            );
            let response = ui
                .interact(chip, ui.id().with(("all_day_event", i, &event.id)), Sense::click())
                .on_hover_text(format_event_tooltip(event, &config.tz));

            painter.rect_filled(chip, 4.0, source_color(event.source));
            painter.with_clip_rect(chip.shrink(2.0)).text(
                Pos2::new(chip.left() + 5.0, chip.center().y),
                Align2::LEFT_CENTER,
                &event.title,
                FontId::proportional(11.0),
                palette.event_text,
            );

            if response.hovered() {
                ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
            }
            if response.clicked() {
                result.event_clicked = Some(event.clone());
            }
        }
    }

    result
}

fn render_grid_body(
    ui: &mut egui::Ui,
    input: &TimeGridInput<'_>,
    partition: &DayPartition,
    col_width: f32,
    config: &TimeGridConfig,
    palette: &TimeGridPalette,
) -> GridInteraction {
    let mut result = GridInteraction::default();
    let hour_height = config.hour_height;
    let grid_height = HOURS_PER_DAY as f32 * hour_height;

    let (rect, response) = ui.allocate_exact_size(
        Vec2::new(grid_width(input.dates.len(), col_width), grid_height),
        Sense::click(),
    );
    let painter = ui.painter_at(rect);

    paint_rail_and_columns(&painter, rect, input.dates, input.today, col_width, hour_height, palette);

    for (day_idx, date) in input.dates.iter().enumerate() {
        let col = column_rect(rect, day_idx, col_width);
        let day_events = partition.timed_for(*date);
        let layout = layout_day(day_events, hour_height, &config.tz, config.overlap_strategy);

        for (event_idx, event) in day_events.iter().enumerate() {
            let Some(slot) = layout.get(&event.id) else {
                continue;
            };
            let event_rect = event_rect(col, slot);

            let event_response = ui
                .interact(event_rect, ui.id().with(("grid_event", day_idx, event_idx)), Sense::click())
                .on_hover_text(format_event_tooltip(event, &config.tz));

            paint_event(&painter, event_rect, event, &config.tz, palette);

            if event_response.hovered() {
                ui.ctx().set_cursor_icon(CursorIcon::PointingHand);
            }
            if event_response.clicked() {
                result.event_clicked = Some(event.clone());
            }
        }
    }

    if let Some((day_index, offset)) = input.now_marker {
        draw_current_time_indicator(&painter, rect, day_index, col_width, offset, palette);
    }

    if response.clicked() {
        if let Some(pos) = response.interact_pointer_pos() {
            let x = pos.x - rect.left() - TIME_LABEL_WIDTH - COLUMN_SPACING;
            if x >= 0.0 {
                let day_idx = (x / (col_width + COLUMN_SPACING)) as usize;
                if let Some(date) = input.dates.get(day_idx) {
                    let slot = slot_at_offset(pos.y - rect.top(), hour_height, config.slot_minutes);
                    result.slot_clicked = Some((*date, slot));
                }
            }
        }
    }

    result
}

fn paint_rail_and_columns(
    painter: &egui::Painter,
    rect: Rect,
    dates: &[NaiveDate],
    today: NaiveDate,
    col_width: f32,
    hour_height: f32,
    palette: &TimeGridPalette,
) {
    for (i, date) in dates.iter().enumerate() {
        let fill = if *date == today { palette.today_bg } else { palette.column_bg };
        painter.rect_filled(column_rect(rect, i, col_width), 0.0, fill);
    }

    let columns_left = rect.left() + TIME_LABEL_WIDTH;
    for marker in compute_day_hours() {
        let y = rect.top() + marker.hour as f32 * hour_height;
        painter.hline(columns_left..=rect.right(), y, Stroke::new(1.0, palette.hour_line));
        painter.hline(
            columns_left..=rect.right(),
            y + hour_height / 2.0,
            Stroke::new(1.0, palette.half_hour_line),
        );
        painter.text(
            Pos2::new(columns_left - 6.0, y + 2.0),
            Align2::RIGHT_TOP,
            &marker.label,
            FontId::proportional(11.0),
            palette.label,
        );
    }
}

fn event_rect(col: Rect, slot: &EventSlot) -> Rect {
    let left = col.left() + slot.left_fraction * col.width() + 1.0;
    let top = col.top() + slot.top + 1.0;
    let width = (slot.width_fraction * col.width() - 2.0).max(2.0);
    let height = (slot.height - 2.0).max(2.0);
    Rect::from_min_size(Pos2::new(left, top), Vec2::new(width, height))
}

fn paint_event(
    painter: &egui::Painter,
    rect: Rect,
    event: &CalendarEvent,
    tz: &Tz,
    palette: &TimeGridPalette,
) {
    painter.rect_filled(rect, 4.0, source_color(event.source));

    let text = painter.with_clip_rect(rect.shrink(3.0));
    let mut cursor = Pos2::new(rect.left() + 5.0, rect.top() + 3.0);
    text.text(
        cursor,
        Align2::LEFT_TOP,
        &event.title,
        FontId::proportional(12.0),
        palette.event_text,
    );

    // Second line only when the block is tall enough to read it
    if rect.height() >= 34.0 {
        cursor.y += 15.0;
        text.text(
            cursor,
            Align2::LEFT_TOP,
            time_range_label(event, tz),
            FontId::proportional(10.0),
            palette.event_text,
        );
    }
    if rect.height() >= 50.0 {
        if let Some(location) = event.location.as_deref() {
            cursor.y += 13.0;
            text.text(
                cursor,
                Align2::LEFT_TOP,
                location,
                FontId::proportional(10.0),
                palette.event_text,
            );
        }
    }
}

/// Draw the current time indicator line across today's column.
fn draw_current_time_indicator(
    painter: &egui::Painter,
    rect: Rect,
    day_index: usize,
    col_width: f32,
    offset: f32,
    palette: &TimeGridPalette,
) {
    let col = column_rect(rect, day_index, col_width);
    let y = rect.top() + offset;

    painter.circle_filled(Pos2::new(col.left() - 4.0, y), 3.0, palette.now_line);
    painter.line_segment(
        [Pos2::new(col.left(), y), Pos2::new(col.right(), y)],
        Stroke::new(2.0, palette.now_line),
    );
}

/// Placeholder columns drawn while the event feed is loading.
fn render_skeleton(
    ui: &mut egui::Ui,
    columns: usize,
    col_width: f32,
    hour_height: f32,
    palette: &TimeGridPalette,
) {
    ui.horizontal(|ui| {
        ui.spinner();
        ui.label(egui::RichText::new("Loading events…").color(palette.label));
    });

    let height = (ui.available_height() - 4.0).max(hour_height * 4.0);
    let (rect, _) = ui.allocate_exact_size(Vec2::new(grid_width(columns, col_width), height), Sense::hover());
    let painter = ui.painter_at(rect);

    for i in 0..columns {
        let col = column_rect(rect, i, col_width);
        for block in 0..3 {
            // Staggered so the placeholder does not read as real data
            let top = col.top() + hour_height * (1.0 + block as f32 * 2.5 + (i % 2) as f32);
            let placeholder = Rect::from_min_size(
                Pos2::new(col.left() + 4.0, top),
                Vec2::new(col.width() - 8.0, hour_height * 0.8),
            );
            painter.rect_filled(placeholder, 4.0, palette.skeleton);
        }
    }
}

fn time_range_label(event: &CalendarEvent, tz: &Tz) -> String {
    let start = event.start_time.with_timezone(tz);
    let end = event.effective_end().with_timezone(tz);
    format!("{} – {}", start.format("%-I:%M %p"), end.format("%-I:%M %p"))
}

/// Tooltip text: title, local time range, location and origin.
pub fn format_event_tooltip(event: &CalendarEvent, tz: &Tz) -> String {
    let mut lines = vec![event.title.clone()];

    if event.all_day {
        lines.push(format!("All day – {}", event.start_time.with_timezone(tz).format("%A, %B %d")));
    } else {
        lines.push(time_range_label(event, tz));
    }

    if let Some(location) = event.location.as_deref() {
        lines.push(location.to_string());
    }

    if event.end_time.is_none() && !event.all_day {
        lines.push("No end time recorded".to_string());
    }

    lines.join("\n")
}
