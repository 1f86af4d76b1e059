use std::fs;
use std::io;
use std::path::{Path, PathBuf};

use thiserror::Error;

use super::{ChannelStats, CHANNEL_COUNT};

#[derive(Debug, Error)]
pub enum ThresholdsError {
    #[error("failed to write thresholds file {path}: {source}")]
    Write {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("failed to read thresholds file {path}: {source}")]
    Read {
        path: PathBuf,
        #[source]
        source: io::Error,
    },
    #[error("thresholds line {line}: {reason}")]
    Parse { line: usize, reason: String },
}

/// One line per channel in myo1, myo2, eeg order:
/// `lowAvg highAvg lowStdDev highStdDev`.
pub fn format_thresholds(stats: &[ChannelStats; CHANNEL_COUNT]) -> String {
    let mut text = String::new();
    for channel in stats {
        text.push_str(&format!(
            "{} {} {} {}\n",
            channel.low_avg, channel.high_avg, channel.low_std_dev, channel.high_std_dev
        ));
    }
    text
}

pub fn parse_thresholds(text: &str) -> Result<[ChannelStats; CHANNEL_COUNT], ThresholdsError> {
    let mut parsed = [ChannelStats::default(); CHANNEL_COUNT];
    let mut lines = text.lines().filter(|line| !line.trim().is_empty());
    for (index, slot) in parsed.iter_mut().enumerate() {
        let line_number = index + 1;
        let line = lines.next().ok_or_else(|| ThresholdsError::Parse {
            line: line_number,
            reason: "missing channel line".to_string(),
        })?;
        let fields = line
            .split(|ch: char| ch.is_whitespace() || ch == ':')
            .filter(|field| !field.is_empty())
            .map(|field| {
                field.parse::<f64>().map_err(|error| ThresholdsError::Parse {
                    line: line_number,
                    reason: format!("invalid number '{field}': {error}"),
                })
            })
            .collect::<Result<Vec<_>, _>>()?;
        let [low_avg, high_avg, low_std_dev, high_std_dev] =
            <[f64; 4]>::try_from(fields.as_slice()).map_err(|_| ThresholdsError::Parse {
                line: line_number,
                reason: format!("expected 4 fields, found {}", fields.len()),
            })?;
        *slot = ChannelStats {
            low_avg,
            high_avg,
            low_std_dev,
            high_std_dev,
        };
    }
    Ok(parsed)
}

pub fn write_thresholds(
    path: &Path,
    stats: &[ChannelStats; CHANNEL_COUNT],
) -> Result<(), ThresholdsError> {
    write_text_atomic(path, &format_thresholds(stats)).map_err(|source| ThresholdsError::Write {
        path: path.to_path_buf(),
        source,
    })
}

/// Returns `Ok(None)` when the file does not exist yet.
pub fn load_thresholds(
    path: &Path,
) -> Result<Option<[ChannelStats; CHANNEL_COUNT]>, ThresholdsError> {
    let text = match fs::read_to_string(path) {
        Ok(text) => text,
        Err(error) if error.kind() == io::ErrorKind::NotFound => return Ok(None),
        Err(source) => {
            return Err(ThresholdsError::Read {
                path: path.to_path_buf(),
                source,
            })
        }
    };
    parse_thresholds(&text).map(Some)
}

fn write_text_atomic(path: &Path, text: &str) -> io::Result<()> {
    if let Some(parent) = path.parent() {
        fs::create_dir_all(parent)?;
    }

    let tmp_path = temp_path_for(path);
    fs::write(&tmp_path, text.as_bytes())?;
    if let Err(error) = fs::rename(&tmp_path, path) {
        let _ = fs::remove_file(&tmp_path);
        return Err(error);
    }
    Ok(())
}

fn temp_path_for(path: &Path) -> PathBuf {
    let file_name = path
        .file_name()
        .and_then(|name| name.to_str())
        .unwrap_or("thresholds.txt");
    let tmp_name = format!("{file_name}.tmp");
    match path.parent() {
        Some(parent) => parent.join(tmp_name),
        None => PathBuf::from(tmp_name),
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use tempfile::TempDir;

    fn sample_stats() -> [ChannelStats; CHANNEL_COUNT] {
        [
            ChannelStats {
                low_avg: 1.5,
                high_avg: 3.5,
                low_std_dev: 0.5,
                high_std_dev: 0.5,
            },
            ChannelStats {
                low_avg: 10.0,
                high_avg: 20.0,
                low_std_dev: 1.0,
                high_std_dev: 2.0,
            },
            ChannelStats::default(),
        ]
    }

    #[test]
    fn writes_one_line_per_channel_in_order() {
        let text = format_thresholds(&sample_stats());
        let lines: Vec<_> = text.lines().collect();
        assert_eq!(lines, vec!["1.5 3.5 0.5 0.5", "10 20 1 2", "0 0 0 0"]);
        for line in lines {
            assert_eq!(line.split_whitespace().count(), 4);
        }
    }

    #[test]
    fn written_file_loads_back() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("nested").join("thresholds.txt");
        write_thresholds(&path, &sample_stats()).expect("write");

        assert!(!temp.path().join("nested").join("thresholds.txt.tmp").exists());
        let loaded = load_thresholds(&path).expect("load").expect("file present");
        assert_eq!(loaded, sample_stats());
    }

    #[test]
    fn rewrite_replaces_existing_file() {
        let temp = TempDir::new().expect("temp dir");
        let path = temp.path().join("thresholds.txt");
        write_thresholds(&path, &[ChannelStats::default(); CHANNEL_COUNT]).expect("first write");
        write_thresholds(&path, &sample_stats()).expect("second write");
        let loaded = load_thresholds(&path).expect("load").expect("file present");
        assert_eq!(loaded[1].high_avg, 20.0);
    }

    #[test]
    fn missing_file_loads_as_none() {
        let temp = TempDir::new().expect("temp dir");
        let loaded = load_thresholds(&temp.path().join("absent.txt")).expect("load");
        assert!(loaded.is_none());
    }

    #[test]
    fn colon_separators_are_accepted() {
        let parsed = parse_thresholds("1:2:3:4\n5 6 7 8\n9: 10 :11 12\n").expect("parse");
        assert_eq!(parsed[0].high_std_dev, 4.0);
        assert_eq!(parsed[2].low_avg, 9.0);
        assert_eq!(parsed[2].high_avg, 10.0);
    }

    #[test]
    fn short_line_reports_line_number() {
        let error = parse_thresholds("1 2 3 4\n5 6 7\n9 10 11 12\n").expect_err("short line");
        match error {
            ThresholdsError::Parse { line, .. } => assert_eq!(line, 2),
            other => panic!("unexpected error: {other}"),
        }
    }

    #[test]
    fn missing_channel_line_is_an_error() {
        assert!(parse_thresholds("1 2 3 4\n").is_err());
    }
}
