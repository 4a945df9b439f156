//! Utility functions for timestamps and filesystem helpers.
//!
//! Artifact directories are named by second-granularity timestamps, and every
//! stage reads and writes YAML/JSON documents through the helpers in [`fs`].

pub mod fs;
pub mod timestamps;

pub use fs::{file_sha256, read_yaml_file, write_json_file, write_yaml_file};
pub use timestamps::{current_time_stamp, Timestamp, TIME_STAMP_FORMAT};

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_current_time_stamp_is_numeric() {
        let ts = current_time_stamp();
        assert_eq!(ts.len(), 14);
        assert!(ts.chars().all(|c| c.is_ascii_digit()));
    }
}
