//! Input feeds that build a [`Track`]
//!
//! Two formats are understood: whitespace-separated `lat lon time` triples and GPX
//! documents. Either way every sample is offered to [`Track::add_point`] in input
//! order, and the [`RejectPolicy`] decides what happens to samples that do not
//! come strictly after the previous one.

use crate::{DataError, Result, Track, Trackpoint};
use std::collections::VecDeque;
use std::io::{BufRead, Read};
use time::OffsetDateTime;

/// What to do with a sample whose time does not strictly increase
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub enum RejectPolicy {
    /// Drop the sample, log it and keep loading
    #[default]
    Skip,
    /// Stop loading with `DataError::OutOfOrder`
    Strict,
}

/// Counters collected while loading a track
#[derive(Clone, Copy, Debug, Default, PartialEq, Eq)]
pub struct LoadStats {
    /// Samples appended to the track
    pub accepted: usize,
    /// Samples refused by the monotonicity check
    pub rejected: usize,
    /// GPX waypoints without a timestamp
    pub skipped_untimed: usize,
}

/// A freshly loaded track and how it was built
#[derive(Clone, Debug, Default)]
pub struct LoadedTrack {
    pub track: Track,
    pub stats: LoadStats,
}

/// Streaming reader of whitespace-separated `lat lon time` triples
///
/// Records may be split over lines in any way; only the token order matters.
/// Iteration stops after the first error.
pub struct TripleReader<R> {
    reader: R,
    line: String,
    tokens: VecDeque<String>,
    /// Number of records yielded so far
    record: usize,
    done: bool,
}

impl<R: BufRead> TripleReader<R> {
    pub fn new(reader: R) -> Self {
        Self {
            reader,
            line: String::new(),
            tokens: VecDeque::new(),
            record: 0,
            done: false,
        }
    }

    fn next_token(&mut self) -> Result<Option<String>> {
        loop {
            if let Some(token) = self.tokens.pop_front() {
                return Ok(Some(token));
            }
            self.line.clear();
            if self.reader.read_line(&mut self.line)? == 0 {
                return Ok(None);
            }
            self.tokens
                .extend(self.line.split_whitespace().map(str::to_owned));
        }
    }

    fn next_record(&mut self) -> Result<Option<Trackpoint>> {
        let record = self.record + 1;
        let mut fields = [0.0; 3];
        for (count, field) in fields.iter_mut().enumerate() {
            let Some(token) = self.next_token()? else {
                if count == 0 {
                    return Ok(None);
                }
                return Err(DataError::TruncatedRecord {
                    record,
                    fields: count,
                });
            };
            *field = token
                .parse()
                .map_err(|_| DataError::Parse { record, token })?;
        }
        self.record = record;
        let [lat, lon, time] = fields;
        Ok(Some(Trackpoint::new(lat, lon, time)))
    }
}

impl<R: BufRead> Iterator for TripleReader<R> {
    type Item = Result<Trackpoint>;

    fn next(&mut self) -> Option<Self::Item> {
        if self.done {
            return None;
        }
        match self.next_record() {
            Ok(Some(point)) => Some(Ok(point)),
            Ok(None) => {
                self.done = true;
                None
            }
            Err(e) => {
                self.done = true;
                Some(Err(e))
            }
        }
    }
}

/// Offer every sample to a new track, in order
///
/// Errors from the sample source are returned as-is. Under
/// `RejectPolicy::Strict` the first out-of-order sample aborts the load.
pub fn load_track<I>(samples: I, policy: RejectPolicy) -> Result<LoadedTrack>
where
    I: IntoIterator<Item = Result<Trackpoint>>,
{
    let mut loaded = LoadedTrack::default();

    for (index, sample) in samples.into_iter().enumerate() {
        let point = sample?;
        if loaded.track.add_point(point)? {
            loaded.stats.accepted += 1;
            continue;
        }

        let record = index + 1;
        let last = loaded.track.last().map_or(f64::NAN, |p| p.time);
        match policy {
            RejectPolicy::Strict => {
                return Err(DataError::OutOfOrder {
                    record,
                    time: point.time,
                    last,
                });
            }
            RejectPolicy::Skip => {
                tracing::warn!(
                    "Skipping record {}: time {} does not follow {}",
                    record,
                    point.time,
                    last
                );
                loaded.stats.rejected += 1;
            }
        }
    }

    tracing::debug!(
        "Loaded {} points ({} rejected)",
        loaded.stats.accepted,
        loaded.stats.rejected
    );
    Ok(loaded)
}

/// Load a track from whitespace-separated triples
pub fn load_triples<R: BufRead>(reader: R, policy: RejectPolicy) -> Result<LoadedTrack> {
    load_track(TripleReader::new(reader), policy)
}

/// Flatten all track points of a GPX document in document order
///
/// Times are seconds since the Unix epoch. Returns the points and the number of
/// waypoints skipped because they carry no time.
pub fn gpx_trackpoints(gpx: &gpx::Gpx) -> (Vec<Trackpoint>, usize) {
    let mut points = Vec::new();
    let mut untimed = 0;

    for track in &gpx.tracks {
        for segment in &track.segments {
            for waypoint in &segment.points {
                let Some(time) = waypoint.time else {
                    tracing::warn!(
                        "Skipping waypoint without time: ({}, {})",
                        waypoint.point().y(),
                        waypoint.point().x()
                    );
                    untimed += 1;
                    continue;
                };
                let time: OffsetDateTime = time.into();
                let seconds = time.unix_timestamp_nanos() as f64 / 1e9;
                points.push(Trackpoint::new(
                    waypoint.point().y(),
                    waypoint.point().x(),
                    seconds,
                ));
            }
        }
    }

    (points, untimed)
}

/// Load a track from a GPX document
pub fn load_gpx<R: Read>(reader: R, policy: RejectPolicy) -> Result<LoadedTrack> {
    let gpx = gpx::read(reader)?;
    let (points, untimed) = gpx_trackpoints(&gpx);
    let mut loaded = load_track(points.into_iter().map(Ok), policy)?;
    loaded.stats.skipped_untimed = untimed;
    Ok(loaded)
}
