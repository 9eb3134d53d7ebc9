use std::path::PathBuf;
use std::sync::Arc;

use anyhow::Result;
use chrono::{NaiveDate, Utc};
use tokio::runtime::Handle;
use tokio::sync::oneshot;

use crate::models::event::CalendarEvent;
use crate::models::settings::VisibleDays;
use crate::services::config::ResolvedSettings;
use crate::services::feed::{load_feed_file, DecodedFeed};
use crate::services::layout::marker_day_index;
use crate::services::navigation::{shift_window, visible_dates, NavDirection, SwipeTracker};
use crate::services::now_marker::{Clock, SystemClock};
use crate::ui_egui::grid_mount::MountedGrid;
use crate::ui_egui::views::time_grid::{render_time_grid, TimeGridConfig, TimeGridInput};
use crate::ui_egui::views::GridInteraction;
use crate::utils::date::local_date;

enum FeedState {
    Loading(oneshot::Receiver<Result<DecodedFeed>>),
    Ready(Vec<CalendarEvent>),
    Failed(String),
}

pub struct CalendarApp {
    resolved: ResolvedSettings,
    runtime: Handle,
    clock: Arc<dyn Clock>,
    anchor: NaiveDate,
    feed: FeedState,
    grid: Option<MountedGrid>,
    swipe: SwipeTracker,
}

impl eframe::App for CalendarApp {
    fn update(&mut self, ctx: &egui::Context, _frame: &mut eframe::Frame) {
        self.poll_feed();

        let mut interaction = GridInteraction::default();

        egui::TopBottomPanel::top("toolbar").show(ctx, |ui| {
            interaction.merge(self.render_toolbar(ctx, ui));
        });

        egui::CentralPanel::default().show(ctx, |ui| {
            interaction.merge(self.render_grid(ui));
        });

        interaction.merge(self.handle_swipe(ctx));
        self.apply_interaction(interaction);

        if matches!(self.feed, FeedState::Loading(_)) {
            ctx.request_repaint_after(std::time::Duration::from_millis(100));
        }
    }
}

impl CalendarApp {
    pub fn new(
        cc: &eframe::CreationContext<'_>,
        resolved: ResolvedSettings,
        runtime: Handle,
        feed_path: Option<PathBuf>,
    ) -> Self {
        let clock: Arc<dyn Clock> = Arc::new(SystemClock);
        let anchor = local_date(clock.now(), &resolved.tz);
        let feed = start_feed_load(&runtime, feed_path, anchor, &resolved);
        let swipe = SwipeTracker::new(resolved.settings.swipe_threshold);

        let mut app = Self {
            resolved,
            runtime,
            clock,
            anchor,
            feed,
            grid: None,
            swipe,
        };
        app.mount_grid(&cc.egui_ctx);
        app
    }

    /// (Re)create the grid's per-mount resources. The previous marker, if
    /// any, is dropped and its timer cancelled.
    fn mount_grid(&mut self, ctx: &egui::Context) {
        let repaint_ctx = ctx.clone();
        self.grid = Some(MountedGrid::mount(
            &self.runtime,
            Arc::clone(&self.clock),
            self.resolved.tz,
            self.resolved.hour_height(),
            move || repaint_ctx.request_repaint(),
        ));
        log::debug!("Time grid mounted ({} days)", self.resolved.settings.visible_days.count());
    }

    fn poll_feed(&mut self) {
        let FeedState::Loading(receiver) = &mut self.feed else {
            return;
        };

        let next = match receiver.try_recv() {
            Ok(Ok(decoded)) => FeedState::Ready(decoded.events),
            Ok(Err(err)) => {
                log::error!("Failed to load event feed: {:#}", err);
                FeedState::Failed(format!("{:#}", err))
            }
            Err(oneshot::error::TryRecvError::Empty) => return,
            Err(oneshot::error::TryRecvError::Closed) => {
                FeedState::Failed("event feed loader stopped unexpectedly".to_string())
            }
        };
        self.feed = next;
    }

    fn visible_dates(&self) -> Vec<NaiveDate> {
        let settings = &self.resolved.settings;
        visible_dates(self.anchor, settings.visible_days, settings.first_day_of_week)
    }

    fn render_toolbar(&mut self, ctx: &egui::Context, ui: &mut egui::Ui) -> GridInteraction {
        let mut result = GridInteraction::default();
        let visible = self.resolved.settings.visible_days;

        ui.horizontal(|ui| {
            if ui.button("◀").on_hover_text("Previous").clicked() {
                result.navigate_to = Some(shift_window(self.anchor, visible, NavDirection::Previous));
            }
            if ui.button("Today").clicked() {
                result.navigate_to = Some(local_date(self.clock.now(), &self.resolved.tz));
            }
            if ui.button("▶").on_hover_text("Next").clicked() {
                result.navigate_to = Some(shift_window(self.anchor, visible, NavDirection::Next));
            }

            let mut picked = self.anchor;
            ui.add(egui_extras::DatePickerButton::new(&mut picked).id_source("jump_to_date"));
            if picked != self.anchor {
                result.navigate_to = Some(picked);
            }

            ui.separator();

            let mut selected = visible;
            ui.selectable_value(&mut selected, VisibleDays::Three, "3 days");
            ui.selectable_value(&mut selected, VisibleDays::Seven, "Week");
            if selected != visible {
                self.resolved.settings.visible_days = selected;
                self.mount_grid(ctx);
            }

            if let FeedState::Failed(message) = &self.feed {
                ui.separator();
                ui.colored_label(ui.visuals().error_fg_color, "Events unavailable")
                    .on_hover_text(message.as_str());
            }
        });

        result
    }

    fn render_grid(&mut self, ui: &mut egui::Ui) -> GridInteraction {
        let dates = self.visible_dates();
        let now = self.clock.now();
        let tz = self.resolved.tz;
        let hour_height = self.resolved.hour_height();
        let today = local_date(now, &tz);

        let events = match &self.feed {
            FeedState::Loading(_) => None,
            FeedState::Ready(events) => Some(events.as_slice()),
            FeedState::Failed(_) => Some(&[][..]),
        };

        let (now_marker, initial_scroll) = match self.grid.as_mut() {
            Some(grid) => {
                // Wait for the feed so the scroll lands on the real grid
                let scroll = match events {
                    Some(_) => grid.take_initial_scroll(
                        now,
                        &tz,
                        hour_height,
                        self.resolved.settings.look_behind_hours,
                    ),
                    None => None,
                };
                let marker = marker_day_index(&dates, now, &tz)
                    .map(|day_index| (day_index, grid.now_offset()));
                (marker, scroll)
            }
            None => (None, None),
        };

        let input = TimeGridInput {
            dates: &dates,
            events,
            today,
            now_marker,
            initial_scroll,
        };
        let config = TimeGridConfig {
            hour_height,
            slot_minutes: self.resolved.settings.slot_minutes,
            tz,
            overlap_strategy: self.resolved.settings.overlap_strategy,
        };

        render_time_grid(ui, &input, &config)
    }

    fn handle_swipe(&mut self, ctx: &egui::Context) -> GridInteraction {
        let mut result = GridInteraction::default();
        let visible = self.resolved.settings.visible_days;

        let touches: Vec<(egui::TouchPhase, f32)> = ctx.input(|input| {
            input
                .events
                .iter()
                .filter_map(|event| match event {
                    egui::Event::Touch { phase, pos, .. } => Some((*phase, pos.x)),
                    _ => None,
                })
                .collect()
        });

        for (phase, x) in touches {
            match phase {
                egui::TouchPhase::Start => self.swipe.touch_start(x),
                egui::TouchPhase::End => {
                    if let Some(direction) = self.swipe.touch_end(x) {
                        result.navigate_to = Some(shift_window(self.anchor, visible, direction));
                    }
                }
                egui::TouchPhase::Cancel => self.swipe.cancel(),
                egui::TouchPhase::Move => {}
            }
        }

        result
    }

    fn apply_interaction(&mut self, interaction: GridInteraction) {
        if !interaction.has_actions() {
            return;
        }

        if let Some(event) = &interaction.event_clicked {
            log::info!("Event activated: {} ({})", event.id, event.title);
        }
        if let Some((date, slot)) = &interaction.slot_clicked {
            log::info!("Empty slot activated: {} {}", date, slot.label);
        }
        if let Some(date) = interaction.navigate_to {
            log::info!("Navigating to {}", date);
            self.anchor = date;
        }
    }
}

fn start_feed_load(
    runtime: &Handle,
    feed_path: Option<PathBuf>,
    anchor: NaiveDate,
    resolved: &ResolvedSettings,
) -> FeedState {
    let Some(path) = feed_path else {
        log::info!("No event feed configured; showing an empty calendar");
        return FeedState::Ready(Vec::new());
    };

    let (sender, receiver) = oneshot::channel();
    let tz = resolved.tz;
    runtime.spawn_blocking(move || {
        let started = Utc::now();
        let result = load_feed_file(&path, anchor, &tz);
        log::debug!(
            "Feed load from {} finished in {}ms",
            path.display(),
            (Utc::now() - started).num_milliseconds()
        );
        // The app may have closed already
        let _ = sender.send(result);
    });

    FeedState::Loading(receiver)
}
