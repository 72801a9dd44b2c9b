//! Epoch numbering for navigating a recording in fixed-length windows.
//!
//! Epochs are numbered from 1. Epoch `e` covers
//! `[(e - 1)·length, e·length)` seconds after the recording start.

use chrono::{NaiveDateTime, TimeDelta};

use crate::error::{AnalysisError, Result};

#[derive(Debug, Clone, Copy, PartialEq)]
pub struct EpochClock {
    recording_start: NaiveDateTime,
    epoch_length: f64,
}

impl EpochClock {
    pub fn new(recording_start: NaiveDateTime, epoch_length: f64) -> Result<Self> {
        if !(epoch_length.is_finite() && epoch_length > 0.0) {
            return Err(AnalysisError::Config(format!(
                "epoch length must be positive, got {}",
                epoch_length
            )));
        }
        Ok(Self {
            recording_start,
            epoch_length,
        })
    }

    pub fn recording_start(&self) -> NaiveDateTime {
        self.recording_start
    }

    pub fn epoch_length(&self) -> f64 {
        self.epoch_length
    }

    /// Offset in seconds of the first instant of `epoch`.
    pub fn epoch_start(&self, epoch: u32) -> f64 {
        epoch.saturating_sub(1) as f64 * self.epoch_length
    }

    /// `(start, end)` offsets of `epoch`; the end is exclusive.
    pub fn epoch_window(&self, epoch: u32) -> (f64, f64) {
        let start = self.epoch_start(epoch);
        (start, start + self.epoch_length)
    }

    /// Epoch containing an offset in seconds. Negative offsets map to 1.
    pub fn epoch_of(&self, offset: f64) -> u32 {
        if offset <= 0.0 {
            return 1;
        }
        (offset / self.epoch_length).floor() as u32 + 1
    }

    /// Number of epochs needed to cover `duration` seconds.
    pub fn epoch_count(&self, duration: f64) -> u32 {
        if duration <= 0.0 {
            return 0;
        }
        (duration / self.epoch_length).ceil() as u32
    }

    pub fn epoch_to_datetime(&self, epoch: u32) -> NaiveDateTime {
        self.offset_to_datetime(self.epoch_start(epoch))
    }

    pub fn datetime_to_epoch(&self, time: NaiveDateTime) -> u32 {
        self.epoch_of(self.datetime_to_offset(time))
    }

    pub fn offset_to_datetime(&self, offset: f64) -> NaiveDateTime {
        self.recording_start + TimeDelta::milliseconds((offset * 1000.0).round() as i64)
    }

    pub fn datetime_to_offset(&self, time: NaiveDateTime) -> f64 {
        (time - self.recording_start).num_milliseconds() as f64 / 1000.0
    }
}
