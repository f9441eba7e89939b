// GLSL Live
// Copyright (c) 2025 Harlen Batagelo
// SPDX-License-Identifier: GPL-3.0-or-later

//! Frame timing and frame-rate statistics.
//!
//! Frame times are collected over a fixed interval. When the interval is
//! full, the average rate and the 1% / 0.1% lows are computed from the
//! sorted samples and the window starts over.

use std::time::{Duration, Instant};

use crate::APP_TITLE;

/// Shortest accepted statistics interval.
pub const MIN_STATS_INTERVAL: Duration = Duration::from_millis(100);

/// Frame-rate summary of one statistics interval.
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FpsReport {
    /// Frames divided by the time they took.
    pub average: f64,

    /// Rate of the frame at the 99th percentile of frame times.
    pub one_percent_low: f64,

    /// Rate of the frame at the 99.9th percentile of frame times.
    pub point_one_percent_low: f64,

    /// Number of frames the report covers.
    pub frames: usize,
}

impl FpsReport {
    /// Summarizes `frame_times`. Returns `None` if there is nothing to measure.
    pub fn from_frame_times(frame_times: &[Duration]) -> Option<Self> {
        let total: Duration = frame_times.iter().sum();
        if frame_times.is_empty() || total.is_zero() {
            return None;
        }

        let mut sorted = frame_times.to_vec();
        sorted.sort_unstable();
        let percentile = |fraction: f64| {
            let index = ((sorted.len() as f64 * fraction) as usize).min(sorted.len() - 1);
            rate(sorted[index])
        };

        Some(Self {
            average: frame_times.len() as f64 / total.as_secs_f64(),
            one_percent_low: percentile(0.99),
            point_one_percent_low: percentile(0.999),
            frames: frame_times.len(),
        })
    }

    /// Window title showing the average rate.
    pub fn title(&self) -> String {
        format!("{APP_TITLE} | FPS: {:.2}", self.average)
    }
}

fn rate(frame_time: Duration) -> f64 {
    if frame_time.is_zero() {
        0.0
    } else {
        1.0 / frame_time.as_secs_f64()
    }
}

/// Timing of one frame as seen by [`FrameController::tick`].
#[derive(Copy, Clone, Debug, PartialEq)]
pub struct FrameTiming {
    /// Time since the previous tick; zero on the first one.
    pub time_delta: Duration,

    /// Present on the tick that completes a statistics interval.
    pub fps_report: Option<FpsReport>,
}

pub struct FrameController {
    /// Length of one statistics window.
    stats_interval: Duration,

    /// Timestamp of the previous tick.
    previous_frame_time: Option<Instant>,

    /// Time covered by `frame_times`.
    window_elapsed: Duration,

    /// Frame times of the current window.
    frame_times: Vec<Duration>,
}

impl Default for FrameController {
    fn default() -> Self {
        Self::new(Duration::from_secs(1))
    }
}

impl FrameController {
    /// `stats_interval` is raised to [`MIN_STATS_INTERVAL`] if shorter.
    pub fn new(stats_interval: Duration) -> Self {
        Self {
            stats_interval: stats_interval.max(MIN_STATS_INTERVAL),
            previous_frame_time: None,
            window_elapsed: Duration::ZERO,
            frame_times: Vec::new(),
        }
    }

    pub fn tick(&mut self) -> FrameTiming {
        self.tick_at(Instant::now())
    }

    /// Records a frame presented at `now`.
    pub fn tick_at(&mut self, now: Instant) -> FrameTiming {
        let Some(previous) = self.previous_frame_time.replace(now) else {
            return FrameTiming {
                time_delta: Duration::ZERO,
                fps_report: None,
            };
        };

        let time_delta = now.saturating_duration_since(previous);
        self.frame_times.push(time_delta);
        self.window_elapsed += time_delta;

        let fps_report = if self.window_elapsed >= self.stats_interval {
            let report = FpsReport::from_frame_times(&self.frame_times);
            self.frame_times.clear();
            self.window_elapsed = Duration::ZERO;
            if let Some(report) = &report {
                log::info!(
                    "Average FPS: {:.2}, 1% low: {:.2}, 0.1% low: {:.2}",
                    report.average,
                    report.one_percent_low,
                    report.point_one_percent_low
                );
            }
            report
        } else {
            None
        };

        FrameTiming {
            time_delta,
            fps_report,
        }
    }
}
