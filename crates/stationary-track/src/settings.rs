use clap::{ArgAction, Parser, ValueEnum};
use std::path::{Path, PathBuf};

#[derive(Parser, Debug, Clone)]
#[clap(author, version, about, long_about = None, allow_negative_numbers = true)]
/// Stationary Track - find where a GPS track stood still
pub struct Settings {
    /// Minimum dwell time, in the unit of the input times (must be > 0)
    pub time_bound: f64,

    /// Maximum dwell radius, in meters for the haversine metric (must be >= 0)
    pub dist_bound: f64,

    /// Track file to read; standard input when omitted or "-"
    #[clap(value_name = "FILE")]
    pub file: Option<PathBuf>,

    /// Input format
    #[clap(long, value_enum, default_value_t = InputFormat::Auto)]
    pub format: InputFormat,

    /// Distance primitive used for the dwell radius
    #[clap(long, value_enum, default_value_t = MetricKind::Haversine)]
    pub metric: MetricKind,

    /// Abort on the first record whose time does not strictly increase
    #[clap(long, default_value = "false")]
    pub strict: bool,

    /// Print each stationary segment as "lat lon start end points"
    #[clap(long, default_value = "false", conflicts_with = "at")]
    pub segments: bool,

    /// Print the location at TIME instead of stationary points (repeatable)
    #[clap(long, value_name = "TIME")]
    pub at: Vec<f64>,

    /// More log output on stderr (-v info, -vv debug)
    #[clap(short, long, action = ArgAction::Count, conflicts_with = "quiet")]
    pub verbose: u8,

    /// Only log errors
    #[clap(short, long, default_value = "false")]
    pub quiet: bool,
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum InputFormat {
    /// GPX for a .gpx file, whitespace triples otherwise
    Auto,
    /// Whitespace-separated "lat lon time" triples
    Triples,
    /// GPX document, times in seconds since the Unix epoch
    Gpx,
}

impl InputFormat {
    /// Pick a concrete format for the given input path
    pub fn resolve(self, path: Option<&Path>) -> InputFormat {
        match self {
            InputFormat::Auto => {
                let is_gpx = path
                    .and_then(|p| p.extension())
                    .and_then(|e| e.to_str())
                    .is_some_and(|e| e.eq_ignore_ascii_case("gpx"));
                if is_gpx {
                    InputFormat::Gpx
                } else {
                    InputFormat::Triples
                }
            }
            other => other,
        }
    }
}

#[derive(ValueEnum, Debug, Clone, Copy, PartialEq, Eq)]
pub enum MetricKind {
    /// Great-circle distance in meters
    Haversine,
    /// Euclidean distance on raw coordinates
    Planar,
}

impl Settings {
    /// Input path, `None` for standard input
    pub fn input_path(&self) -> Option<&Path> {
        self.file
            .as_deref()
            .filter(|path| path.as_os_str() != "-")
    }

    /// Default log filter when RUST_LOG is not set
    pub fn log_level(&self) -> &'static str {
        if self.quiet {
            return "error";
        }
        match self.verbose {
            0 => "warn",
            1 => "info",
            _ => "debug",
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn parse(args: &[&str]) -> Result<Settings, clap::Error> {
        Settings::try_parse_from(std::iter::once("stationary-track").chain(args.iter().copied()))
    }

    #[test]
    fn test_positional_bounds() {
        let settings = parse(&["15", "1.5"]).unwrap();
        assert_eq!(settings.time_bound, 15.0);
        assert_eq!(settings.dist_bound, 1.5);
        assert!(settings.file.is_none());
        assert!(settings.input_path().is_none());
        assert_eq!(settings.format, InputFormat::Auto);
        assert_eq!(settings.metric, MetricKind::Haversine);
        assert!(!settings.strict);
    }

    #[test]
    fn test_file_and_options() {
        let settings = parse(&[
            "60", "25", "walk.gpx", "--metric", "planar", "--strict", "--segments", "-vv",
        ])
        .unwrap();
        assert_eq!(settings.input_path(), Some(Path::new("walk.gpx")));
        assert_eq!(settings.metric, MetricKind::Planar);
        assert!(settings.strict);
        assert!(settings.segments);
        assert_eq!(settings.log_level(), "debug");
    }

    #[test]
    fn test_dash_means_stdin() {
        let settings = parse(&["1", "1", "-"]).unwrap();
        assert!(settings.input_path().is_none());
    }

    #[test]
    fn test_negative_bounds_are_parsed() {
        // Rejected later by the bounds check, not by the parser
        let settings = parse(&["-5", "1"]).unwrap();
        assert_eq!(settings.time_bound, -5.0);
    }

    #[test]
    fn test_missing_bounds() {
        assert!(parse(&["15"]).is_err());
        assert!(parse(&["abc", "1"]).is_err());
    }

    #[test]
    fn test_repeated_at() {
        let settings = parse(&["1", "1", "--at", "5", "--at", "7.5"]).unwrap();
        assert_eq!(settings.at, vec![5.0, 7.5]);
        assert!(parse(&["1", "1", "--at", "5", "--segments"]).is_err());
    }

    #[test]
    fn test_log_level() {
        assert_eq!(parse(&["1", "1"]).unwrap().log_level(), "warn");
        assert_eq!(parse(&["1", "1", "-v"]).unwrap().log_level(), "info");
        assert_eq!(parse(&["1", "1", "-q"]).unwrap().log_level(), "error");
        assert!(parse(&["1", "1", "-q", "-v"]).is_err());
    }

    #[test]
    fn test_format_resolution() {
        let gpx = Path::new("track.GPX");
        let txt = Path::new("track.txt");
        assert_eq!(InputFormat::Auto.resolve(Some(gpx)), InputFormat::Gpx);
        assert_eq!(InputFormat::Auto.resolve(Some(txt)), InputFormat::Triples);
        assert_eq!(InputFormat::Auto.resolve(None), InputFormat::Triples);
        assert_eq!(InputFormat::Gpx.resolve(Some(txt)), InputFormat::Gpx);
    }
}
