//! Load, analyze, print

use crate::settings::{InputFormat, MetricKind, Settings};
use stationary_track_lib::input::{self, LoadedTrack, RejectPolicy};
use stationary_track_lib::{
    DataError, DistanceMetric, Haversine, Planar, StationaryBounds, StationarySegment, Track,
    TrackAnalyzer, Trackpoint,
};
use std::fs::File;
use std::io::{self, BufRead, BufReader, Write};
use std::path::PathBuf;

#[derive(Debug, thiserror::Error)]
pub enum CliError {
    #[error("error opening {}: {source}", .path.display())]
    Open { path: PathBuf, source: io::Error },

    #[error(transparent)]
    Data(#[from] DataError),

    #[error("Output error: {0}")]
    Output(#[from] io::Error),

    #[error("{0} of the requested times could not be located")]
    Unlocated(usize),
}

/// Run the tool with parsed settings, writing results to `out`
pub fn run(settings: &Settings, out: &mut impl Write) -> Result<(), CliError> {
    profiling::scope!("stationary_track::run");

    // Bounds are checked before any input is read
    let bounds = StationaryBounds::new(settings.time_bound, settings.dist_bound)?;

    let path = settings.input_path();
    let format = settings.format.resolve(path);
    let reader: Box<dyn BufRead> = match path {
        Some(path) => {
            let file = File::open(path).map_err(|source| CliError::Open {
                path: path.to_path_buf(),
                source,
            })?;
            Box::new(BufReader::new(file))
        }
        None => Box::new(io::stdin().lock()),
    };

    analyze(settings, &bounds, format, reader, out)
}

/// Everything after the input has been opened
pub fn analyze<R: BufRead>(
    settings: &Settings,
    bounds: &StationaryBounds,
    format: InputFormat,
    reader: R,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let policy = if settings.strict {
        RejectPolicy::Strict
    } else {
        RejectPolicy::Skip
    };

    let LoadedTrack { track, stats } = match format {
        InputFormat::Gpx => input::load_gpx(reader, policy)?,
        InputFormat::Triples | InputFormat::Auto => input::load_triples(reader, policy)?,
    };
    tracing::info!(
        "Loaded {} points spanning {:.1} ({} rejected, {} without time)",
        track.len(),
        track.duration(),
        stats.rejected,
        stats.skipped_untimed
    );

    if !settings.at.is_empty() {
        return print_locations(&track, &settings.at, out);
    }

    match settings.metric {
        MetricKind::Haversine => print_stationary(&track, Haversine, bounds, settings, out),
        MetricKind::Planar => print_stationary(&track, Planar, bounds, settings, out),
    }
}

fn print_stationary<M: DistanceMetric>(
    track: &Track,
    metric: M,
    bounds: &StationaryBounds,
    settings: &Settings,
    out: &mut impl Write,
) -> Result<(), CliError> {
    let analyzer = TrackAnalyzer::with_metric(track, metric);

    if settings.segments {
        let segments = analyzer.find_stationary_segments(bounds)?;
        tracing::info!("Found {} stationary segments", segments.len());
        for segment in &segments {
            writeln!(out, "{}", format_segment(segment))?;
        }
    } else {
        let points = analyzer.find_stationary(bounds)?;
        tracing::info!("Found {} near-stationary points", points.len());
        for point in &points {
            writeln!(out, "{}", format_location(point))?;
        }
    }
    out.flush()?;
    Ok(())
}

fn print_locations(track: &Track, times: &[f64], out: &mut impl Write) -> Result<(), CliError> {
    let mut unlocated = 0;
    for &time in times {
        match track.get_point(time) {
            Ok(point) => writeln!(out, "{} {:.6}", format_location(&point), point.time)?,
            Err(e) => {
                tracing::error!("{e}");
                unlocated += 1;
            }
        }
    }
    out.flush()?;

    if unlocated > 0 {
        return Err(CliError::Unlocated(unlocated));
    }
    Ok(())
}

/// "lat lon" with six decimals
pub fn format_location(point: &Trackpoint) -> String {
    format!("{:.6} {:.6}", point.location.lat, point.location.lon)
}

/// "lat lon start end points"
pub fn format_segment(segment: &StationarySegment) -> String {
    format!(
        "{} {:.6} {:.6} {}",
        format_location(&segment.anchor),
        segment.anchor.time,
        segment.last.time,
        segment.len()
    )
}
