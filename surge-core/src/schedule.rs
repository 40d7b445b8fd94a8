//! Load schedule generation
//!
//! A [`Schedule`] is the per-second timeline of target request counts that the
//! dispatcher walks. Generation is a pure function of the pattern parameters:
//! no randomness, no clock reads, so schedules are testable without any I/O.

use crate::config::TestConfig;
use crate::error::{Error, Result};

/// Default spike length in seconds when a spike pattern omits it
pub const DEFAULT_SPIKE_DURATION: u32 = 10;
/// Default rate during a spike
pub const DEFAULT_SPIKE_LOAD: u32 = 20;
/// Default seconds between spike starts for the periodic pattern
pub const DEFAULT_SPIKE_INTERVAL: u32 = 30;

/// Shape of the rate-over-time curve
///
/// The base rate is shared by all variants and carried in
/// [`TestConfig::rate`]; variants hold only the spike parameters.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum LoadPattern {
    /// Same rate for every second of the test
    Steady,
    /// A single burst in the middle of the test, flanked by two equal
    /// normal-rate halves
    Spike { spike_rate: u32, spike_duration: u32 },
    /// A repeating cycle of normal seconds followed by spike seconds
    Periodic {
        spike_rate: u32,
        spike_duration: u32,
        interval: u32,
    },
}

impl LoadPattern {
    /// Resolve the loosely-typed pattern tag and optional parameters of a
    /// [`TestConfig`] into a concrete pattern
    ///
    /// Unknown tags fail with [`Error::UnsupportedPattern`]. Omitted spike
    /// parameters fall back to the documented defaults.
    pub fn from_config(config: &TestConfig) -> Result<Self> {
        let spike_rate = config.spike_load.unwrap_or(DEFAULT_SPIKE_LOAD);
        let spike_duration = config.spike_duration.unwrap_or(DEFAULT_SPIKE_DURATION);

        match config.pattern.as_str() {
            "steady" => Ok(LoadPattern::Steady),
            "spike" => Ok(LoadPattern::Spike { spike_rate, spike_duration }),
            "periodic" => Ok(LoadPattern::Periodic {
                spike_rate,
                spike_duration,
                interval: config.spike_interval.unwrap_or(DEFAULT_SPIKE_INTERVAL),
            }),
            other => Err(Error::UnsupportedPattern(other.to_string())),
        }
    }
}

/// Ordered per-second target request counts
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Schedule(Vec<u32>);

impl Schedule {
    /// Number of ticks (seconds) in the schedule
    pub fn len(&self) -> usize {
        self.0.len()
    }

    pub fn is_empty(&self) -> bool {
        self.0.is_empty()
    }

    /// Iterate over per-tick target counts in schedule order
    pub fn ticks(&self) -> impl Iterator<Item = u32> + '_ {
        self.0.iter().copied()
    }

    /// Total number of requests the schedule will issue
    pub fn total_requests(&self) -> u64 {
        self.0.iter().map(|&n| n as u64).sum()
    }

    /// Raw per-tick counts
    pub fn as_slice(&self) -> &[u32] {
        &self.0
    }
}

/// Generate the full tick timeline for a pattern
///
/// `rate` is the base requests-per-second, `duration` the test length in
/// seconds. The result is truncated (never padded) to at most `duration`
/// entries; a spike whose flanks do not divide evenly yields `duration - 1`
/// entries rather than an asymmetric final second.
pub fn generate_schedule(pattern: &LoadPattern, rate: u32, duration: u64) -> Result<Schedule> {
    let duration = duration as usize;

    let ticks = match pattern {
        LoadPattern::Steady => vec![rate; duration],
        LoadPattern::Spike { spike_rate, spike_duration } => {
            let spike_duration = *spike_duration as usize;
            if spike_duration > duration {
                return Err(Error::InvalidPattern(format!(
                    "spike duration {spike_duration}s exceeds test duration {duration}s"
                )));
            }
            let normal = (duration - spike_duration) / 2;
            let mut ticks = Vec::with_capacity(duration);
            ticks.extend(std::iter::repeat(rate).take(normal));
            ticks.extend(std::iter::repeat(*spike_rate).take(spike_duration));
            ticks.extend(std::iter::repeat(rate).take(normal));
            ticks.truncate(duration);
            ticks
        }
        LoadPattern::Periodic { spike_rate, spike_duration, interval } => {
            let spike_duration = *spike_duration as usize;
            let interval = *interval as usize;
            if spike_duration >= interval {
                return Err(Error::InvalidPattern(format!(
                    "spike duration {spike_duration}s must be shorter than the interval {interval}s"
                )));
            }
            let mut ticks = Vec::with_capacity(duration + interval);
            while ticks.len() < duration {
                ticks.extend(std::iter::repeat(rate).take(interval - spike_duration));
                ticks.extend(std::iter::repeat(*spike_rate).take(spike_duration));
            }
            ticks.truncate(duration);
            ticks
        }
    };

    Ok(Schedule(ticks))
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::HttpMethod;

    fn config_with_pattern(pattern: &str) -> TestConfig {
        TestConfig {
            url: "http://localhost/".to_string(),
            method: HttpMethod::Get,
            body: None,
            rate: 5,
            duration_secs: 30,
            concurrency: 10,
            pattern: pattern.to_string(),
            spike_duration: None,
            spike_load: None,
            spike_interval: None,
        }
    }

    #[test]
    fn test_steady_schedule() {
        let schedule = generate_schedule(&LoadPattern::Steady, 5, 10).unwrap();
        assert_eq!(schedule.len(), 10);
        assert!(schedule.ticks().all(|n| n == 5));
        assert_eq!(schedule.total_requests(), 50);
    }

    #[test]
    fn test_spike_schedule_even_split() {
        let pattern = LoadPattern::Spike { spike_rate: 20, spike_duration: 4 };
        let schedule = generate_schedule(&pattern, 5, 10).unwrap();

        assert_eq!(schedule.len(), 10);
        assert_eq!(
            schedule.as_slice(),
            &[5, 5, 5, 20, 20, 20, 20, 5, 5, 5]
        );
        assert_eq!(schedule.ticks().filter(|&n| n == 20).count(), 4);
    }

    #[test]
    fn test_spike_schedule_odd_remainder_truncates() {
        // 10 - 5 leaves 5 seconds of flank; halves of 2 give 9 ticks total.
        // Truncation, not padding, is the contract here.
        let pattern = LoadPattern::Spike { spike_rate: 20, spike_duration: 5 };
        let schedule = generate_schedule(&pattern, 5, 10).unwrap();

        assert_eq!(schedule.len(), 9);
        assert_eq!(schedule.as_slice(), &[5, 5, 20, 20, 20, 20, 20, 5, 5]);
    }

    #[test]
    fn test_spike_longer_than_duration_fails() {
        let pattern = LoadPattern::Spike { spike_rate: 20, spike_duration: 11 };
        let result = generate_schedule(&pattern, 5, 10);
        assert!(matches!(result, Err(Error::InvalidPattern(_))));
    }

    #[test]
    fn test_spike_covering_whole_duration() {
        let pattern = LoadPattern::Spike { spike_rate: 20, spike_duration: 10 };
        let schedule = generate_schedule(&pattern, 5, 10).unwrap();
        assert_eq!(schedule.len(), 10);
        assert!(schedule.ticks().all(|n| n == 20));
    }

    #[test]
    fn test_periodic_schedule_cycles() {
        let pattern = LoadPattern::Periodic {
            spike_rate: 20,
            spike_duration: 2,
            interval: 5,
        };
        let schedule = generate_schedule(&pattern, 5, 12).unwrap();

        assert_eq!(schedule.len(), 12);
        // Two full cycles plus the start of a third, truncated.
        assert_eq!(
            schedule.as_slice(),
            &[5, 5, 5, 20, 20, 5, 5, 5, 20, 20, 5, 5]
        );

        // Each full period carries exactly spike_duration spike entries.
        for period in schedule.as_slice().chunks(5).filter(|c| c.len() == 5) {
            assert_eq!(period.iter().filter(|&&n| n == 20).count(), 2);
        }
    }

    #[test]
    fn test_periodic_spike_at_least_interval_fails() {
        let pattern = LoadPattern::Periodic {
            spike_rate: 20,
            spike_duration: 5,
            interval: 5,
        };
        assert!(matches!(
            generate_schedule(&pattern, 5, 10),
            Err(Error::InvalidPattern(_))
        ));
    }

    #[test]
    fn test_from_config_steady() {
        let pattern = LoadPattern::from_config(&config_with_pattern("steady")).unwrap();
        assert_eq!(pattern, LoadPattern::Steady);
    }

    #[test]
    fn test_from_config_applies_defaults() {
        let pattern = LoadPattern::from_config(&config_with_pattern("periodic")).unwrap();
        assert_eq!(
            pattern,
            LoadPattern::Periodic {
                spike_rate: DEFAULT_SPIKE_LOAD,
                spike_duration: DEFAULT_SPIKE_DURATION,
                interval: DEFAULT_SPIKE_INTERVAL,
            }
        );
    }

    #[test]
    fn test_from_config_explicit_params() {
        let mut config = config_with_pattern("spike");
        config.spike_duration = Some(3);
        config.spike_load = Some(50);

        let pattern = LoadPattern::from_config(&config).unwrap();
        assert_eq!(pattern, LoadPattern::Spike { spike_rate: 50, spike_duration: 3 });
    }

    #[test]
    fn test_from_config_unknown_tag() {
        let result = LoadPattern::from_config(&config_with_pattern("sawtooth"));
        assert!(matches!(result, Err(Error::UnsupportedPattern(tag)) if tag == "sawtooth"));
    }

    #[test]
    fn test_schedule_deterministic() {
        let pattern = LoadPattern::Periodic {
            spike_rate: 7,
            spike_duration: 1,
            interval: 3,
        };
        let a = generate_schedule(&pattern, 2, 100).unwrap();
        let b = generate_schedule(&pattern, 2, 100).unwrap();
        assert_eq!(a, b);
    }
}
