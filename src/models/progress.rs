use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use super::course::CourseModule;

/// A module counts as watched once the player reports this percentage.
pub const COMPLETION_THRESHOLD: f64 = 95.0;

#[derive(Debug, Clone, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ProgressReport {
    pub module_id: String,
    pub progress: f64,
    #[serde(default)]
    pub watch_time: f64,
}

#[derive(Debug, Clone, PartialEq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase")]
pub struct ModuleProgress {
    pub module_id: String,
    pub progress: f64,
    pub last_position: f64,
    pub completed: bool,
    pub updated_at: DateTime<Utc>,
}

impl ModuleProgress {
    /// Folds a new player report into the stored record. The best progress is kept so
    /// seeking backwards never un-completes a module; the resume position always
    /// follows the latest report.
    pub fn merge(existing: Option<&ModuleProgress>, report: &ProgressReport, now: DateTime<Utc>) -> Self {
        let best = existing
            .map(|p| p.progress.max(report.progress))
            .unwrap_or(report.progress);
        let completed = existing.map(|p| p.completed).unwrap_or(false) || best >= COMPLETION_THRESHOLD;

        ModuleProgress {
            module_id: report.module_id.clone(),
            progress: best,
            last_position: report.watch_time.max(0.0),
            completed,
            updated_at: now,
        }
    }

    fn effective(&self) -> f64 {
        if self.completed {
            100.0
        } else {
            self.progress.clamp(0.0, 100.0)
        }
    }
}

/// Course-wide percentage: mean over the course's modules, where modules without a
/// record count as 0. Only a course with every module completed reaches 100. A course
/// without modules takes `fallback` as is.
pub fn overall_progress(modules: &[CourseModule], records: &[ModuleProgress], fallback: f64) -> i32 {
    if modules.is_empty() {
        return fallback.clamp(0.0, 100.0).round() as i32;
    }

    let records: Vec<Option<&ModuleProgress>> = modules
        .iter()
        .map(|module| records.iter().find(|r| r.module_id == module.id))
        .collect();

    if records.iter().all(|r| r.is_some_and(|r| r.completed)) {
        return 100;
    }

    let sum: f64 = records.iter().map(|r| r.map(ModuleProgress::effective).unwrap_or(0.0)).sum();

    ((sum / modules.len() as f64).round() as i32).min(99)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn module(id: &str) -> CourseModule {
        CourseModule {
            id: id.to_string(),
            title: format!("Module {}", id),
            description: String::new(),
            duration: 45,
            video_url: None,
            content: None,
        }
    }

    fn report(module_id: &str, progress: f64, watch_time: f64) -> ProgressReport {
        ProgressReport { module_id: module_id.to_string(), progress, watch_time }
    }

    #[test]
    fn merge_keeps_best_progress_and_latest_position() {
        let now = Utc::now();
        let first = ModuleProgress::merge(None, &report("1", 60.0, 300.0), now);
        let second = ModuleProgress::merge(Some(&first), &report("1", 20.0, 90.0), now);

        assert_eq!(second.progress, 60.0);
        assert_eq!(second.last_position, 90.0);
        assert!(!second.completed);
    }

    #[test]
    fn near_end_completes_module() {
        let done = ModuleProgress::merge(None, &report("1", 96.0, 2400.0), Utc::now());
        assert!(done.completed);
    }

    #[test]
    fn overall_is_mean_over_modules() {
        let now = Utc::now();
        let modules = vec![module("1"), module("2"), module("3"), module("4")];
        let records = vec![
            ModuleProgress::merge(None, &report("1", 100.0, 0.0), now),
            ModuleProgress::merge(None, &report("2", 96.0, 0.0), now),
            ModuleProgress::merge(None, &report("3", 60.0, 0.0), now),
        ];

        assert_eq!(overall_progress(&modules, &records, 0.0), 65);
    }

    #[test]
    fn rounding_never_completes_a_course() {
        let now = Utc::now();
        let modules: Vec<_> = (1..=200).map(|i| module(&i.to_string())).collect();
        let mut records: Vec<_> = (1..=199)
            .map(|i| ModuleProgress::merge(None, &report(&i.to_string(), 100.0, 0.0), now))
            .collect();
        records.push(ModuleProgress::merge(None, &report("200", 94.0, 0.0), now));

        assert_eq!(overall_progress(&modules, &records, 0.0), 99);

        records.pop();
        records.push(ModuleProgress::merge(None, &report("200", 95.0, 0.0), now));
        assert_eq!(overall_progress(&modules, &records, 0.0), 100);
    }

    #[test]
    fn course_without_modules_uses_reported_value() {
        assert_eq!(overall_progress(&[], &[], 100.0), 100);
        assert_eq!(overall_progress(&[], &[], 42.4), 42);
    }
}
