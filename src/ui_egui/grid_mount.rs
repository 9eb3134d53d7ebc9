//! Resources that live exactly as long as one mounted time grid.

use std::sync::Arc;

use chrono::{DateTime, Utc};
use chrono_tz::Tz;
use tokio::runtime::Handle;

use crate::services::layout::initial_scroll_offset;
use crate::services::now_marker::{Clock, NowMarker};

/// Lets a value through once, then stays shut until a new mount.
#[derive(Debug, Default)]
pub struct ScrollOnce {
    applied: bool,
}

impl ScrollOnce {
    pub fn take(&mut self, offset: impl FnOnce() -> f32) -> Option<f32> {
        if self.applied {
            return None;
        }
        self.applied = true;
        Some(offset())
    }
}

/// Dropping a mount stops its now marker, so replacing the mount
/// replaces the timer.
pub struct MountedGrid {
    now_marker: NowMarker,
    scroll: ScrollOnce,
}

impl MountedGrid {
    pub fn mount<F>(handle: &Handle, clock: Arc<dyn Clock>, tz: Tz, hour_height: f32, on_tick: F) -> Self
    where
        F: Fn() + Send + Sync + 'static,
    {
        Self::with_marker(NowMarker::start(handle, clock, tz, hour_height, on_tick))
    }

    pub fn with_marker(now_marker: NowMarker) -> Self {
        Self {
            now_marker,
            scroll: ScrollOnce::default(),
        }
    }

    pub fn now_offset(&self) -> f32 {
        self.now_marker.offset()
    }

    /// The scroll position to show "now" with look-behind context, on the
    /// first call after mounting only.
    pub fn take_initial_scroll(
        &mut self,
        now: DateTime<Utc>,
        tz: &Tz,
        hour_height: f32,
        look_behind_hours: u32,
    ) -> Option<f32> {
        self.scroll
            .take(|| initial_scroll_offset(now, tz, hour_height, look_behind_hours))
    }
}
