//! Ramp stage schedule

use assessor_config::StageConfig;
use std::time::Duration;

use crate::error::{LoadError, LoadResult};

/// Piecewise-linear VU target over time.
///
/// Each stage moves from the previous stage's target (0 for the first) to
/// its own target over its duration.
#[derive(Debug, Clone)]
pub struct StageSchedule {
    stages: Vec<StageConfig>,
}

impl StageSchedule {
    pub fn new(stages: Vec<StageConfig>) -> Self {
        Self { stages }
    }

    pub fn stages(&self) -> &[StageConfig] {
        &self.stages
    }

    pub fn total_duration(&self) -> Duration {
        self.stages.iter().map(|s| s.duration).sum()
    }

    /// Target VU count `elapsed` into the run
    pub fn target_at(&self, elapsed: Duration) -> u32 {
        let mut stage_start = Duration::ZERO;
        let mut previous = 0u32;

        for stage in &self.stages {
            let stage_end = stage_start + stage.duration;
            if elapsed < stage_end {
                let progress = (elapsed - stage_start).as_secs_f64() / stage.duration.as_secs_f64();
                let from = previous as f64;
                let to = stage.target as f64;
                return (from + (to - from) * progress).round() as u32;
            }
            previous = stage.target;
            stage_start = stage_end;
        }

        previous
    }

    /// Index of the stage running at `elapsed`, if any
    pub fn stage_index_at(&self, elapsed: Duration) -> Option<usize> {
        let mut stage_end = Duration::ZERO;
        for (index, stage) in self.stages.iter().enumerate() {
            stage_end += stage.duration;
            if elapsed < stage_end {
                return Some(index);
            }
        }
        None
    }
}

/// Parse a `DURATION:TARGET` stage such as `30s:100` or `2m:5000`
pub fn parse_stage(value: &str) -> LoadResult<StageConfig> {
    let invalid = |reason: String| LoadError::InvalidStage {
        stage: value.to_string(),
        reason,
    };

    let (duration, target) = value
        .rsplit_once(':')
        .ok_or_else(|| invalid("expected DURATION:TARGET".to_string()))?;

    let duration = humantime::parse_duration(duration.trim()).map_err(|e| invalid(e.to_string()))?;
    if duration.is_zero() {
        return Err(invalid("duration must be greater than 0".to_string()));
    }

    let target = target
        .trim()
        .parse::<u32>()
        .map_err(|e| invalid(format!("target: {}", e)))?;

    Ok(StageConfig::new(duration, target))
}

#[cfg(test)]
mod tests {
    use super::*;

    fn secs(s: u64) -> Duration {
        Duration::from_secs(s)
    }

    #[test]
    fn test_ramp_from_zero() {
        let schedule = StageSchedule::new(vec![StageConfig::new(secs(60), 1000)]);
        assert_eq!(schedule.target_at(secs(0)), 0);
        assert_eq!(schedule.target_at(secs(30)), 500);
        assert_eq!(schedule.target_at(secs(45)), 750);
        assert_eq!(schedule.target_at(secs(60)), 1000);
        assert_eq!(schedule.target_at(secs(600)), 1000);
    }

    #[test]
    fn test_default_profile_interpolation() {
        let schedule = StageSchedule::new(assessor_config::LoadgenConfig::default().stages);
        assert_eq!(schedule.total_duration(), secs(13 * 60));
        // 1m -> 1000, then 2m -> 5000
        assert_eq!(schedule.target_at(secs(60)), 1000);
        assert_eq!(schedule.target_at(secs(120)), 3000);
        // plateau at 10000
        assert_eq!(schedule.target_at(secs(6 * 60 + 30)), 10000);
        // ramp down 2m -> 0
        assert_eq!(schedule.target_at(secs(12 * 60)), 5000);
        assert_eq!(schedule.target_at(secs(13 * 60)), 0);
    }

    #[test]
    fn test_stage_index() {
        let schedule =
            StageSchedule::new(vec![StageConfig::new(secs(10), 5), StageConfig::new(secs(10), 0)]);
        assert_eq!(schedule.stage_index_at(secs(0)), Some(0));
        assert_eq!(schedule.stage_index_at(secs(10)), Some(1));
        assert_eq!(schedule.stage_index_at(secs(20)), None);
    }

    #[test]
    fn test_parse_stage() {
        assert_eq!(parse_stage("30s:100").unwrap(), StageConfig::new(secs(30), 100));
        assert_eq!(parse_stage("2m:5000").unwrap(), StageConfig::new(secs(120), 5000));
        assert_eq!(parse_stage("1m 30s:0").unwrap(), StageConfig::new(secs(90), 0));
    }

    #[test]
    fn test_parse_stage_rejects_garbage() {
        assert!(matches!(parse_stage("30s"), Err(LoadError::InvalidStage { .. })));
        assert!(parse_stage("soon:10").is_err());
        assert!(parse_stage("30s:-1").is_err());
        assert!(parse_stage("0s:10").is_err());
    }
}
