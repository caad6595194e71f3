//! Startup duration probe
//!
//! Media resources only know a source's duration after its metadata has
//! loaded, and there is only one resource. The probe therefore walks the
//! track list one source at a time:
//!
//! 1. load track `i`
//! 2. on `MetadataReady { duration }`: show the duration on track `i`, add it
//!    to the running total, then load track `i + 1`
//! 3. after the last track: show the total, seed the volume slider from the
//!    resource and unload the resource so real playback starts from idle
//!
//! A source that never reports metadata stalls the probe for good. There is
//! no timeout.

use std::collections::VecDeque;

use tracing::{debug, info, trace};

use crate::display::{ControlPanel, TrackDisplay};
use crate::format::format_time;
use crate::media::MediaResource;
use crate::volume::volume_to_level;

/// Progress of the duration probe
#[derive(Debug, Clone, Copy, PartialEq)]
pub enum ProbeStatus {
    /// Waiting for metadata of track `index`
    Pending { index: usize },

    /// Every track has been measured
    Complete {
        /// Sum of all finite durations, in seconds
        total: f64,
    },
}

impl ProbeStatus {
    pub fn is_complete(&self) -> bool {
        matches!(self, ProbeStatus::Complete { .. })
    }
}

/// Sequential duration probe over the whole track list
#[derive(Debug, Clone)]
pub struct DurationProbe {
    /// Tracks not loaded yet, in list order
    pending: VecDeque<usize>,

    /// Track whose metadata is being loaded
    loading: Option<usize>,

    /// Accumulated duration in seconds
    total: f64,

    status: ProbeStatus,
}

impl DurationProbe {
    /// Start probing: loads the first track (or completes at once for an
    /// empty list)
    pub fn start<M, T, C>(media: &mut M, tracks: &mut [T], controls: &mut C) -> Self
    where
        M: MediaResource,
        T: TrackDisplay,
        C: ControlPanel,
    {
        let mut probe = Self {
            pending: (0..tracks.len()).collect(),
            loading: None,
            total: 0.0,
            status: ProbeStatus::Pending { index: 0 },
        };

        debug!(tracks = tracks.len(), "Starting duration probe");
        probe.advance(media, tracks, controls);
        probe
    }

    /// Current progress
    pub fn status(&self) -> ProbeStatus {
        self.status
    }

    /// Accumulated duration so far, in seconds
    pub fn total(&self) -> f64 {
        self.total
    }

    /// Record the duration of the track being loaded and load the next one
    pub fn on_metadata_ready<M, T, C>(
        &mut self,
        duration: f64,
        media: &mut M,
        tracks: &mut [T],
        controls: &mut C,
    ) -> ProbeStatus
    where
        M: MediaResource,
        T: TrackDisplay,
        C: ControlPanel,
    {
        let Some(index) = self.loading.take() else {
            trace!(duration, "Metadata outside of an active probe step, ignoring");
            return self.status;
        };

        if let Some(track) = tracks.get_mut(index) {
            track.set_total_time(&format_time(duration));
        }

        if duration.is_finite() && duration > 0.0 {
            self.total += duration;
        }

        trace!(index, duration, total = self.total, "Probed track duration");
        self.advance(media, tracks, controls)
    }

    fn advance<M, T, C>(&mut self, media: &mut M, tracks: &mut [T], controls: &mut C) -> ProbeStatus
    where
        M: MediaResource,
        T: TrackDisplay,
        C: ControlPanel,
    {
        // Skip indices that disappeared; the list is fixed for the session
        while let Some(index) = self.pending.pop_front() {
            if let Some(track) = tracks.get(index) {
                media.set_source(Some(track.locator()));
                self.loading = Some(index);
                self.status = ProbeStatus::Pending { index };
                return self.status;
            }
        }

        self.finish(media, controls)
    }

    fn finish<M, C>(&mut self, media: &mut M, controls: &mut C) -> ProbeStatus
    where
        M: MediaResource,
        C: ControlPanel,
    {
        controls.set_text(&format_time(self.total));
        controls.set_value(volume_to_level(media.volume()));
        media.set_source(None);

        info!(
            total_seconds = self.total,
            total = %format_time(self.total),
            "Duration probe complete"
        );

        self.status = ProbeStatus::Complete { total: self.total };
        self.status
    }
}
