use std::collections::BTreeMap;

use chrono::{DateTime, Utc};
use serde::{Deserialize, Serialize};

use crate::models::{course::Course, progress::ModuleProgress, student::Student};

#[derive(Serialize, Deserialize, Debug, Clone, PartialEq)]
#[serde(rename_all = "camelCase")]
pub struct ModuleState{
    pub last_position: f64,
    pub completed: bool,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct ProgressSummary{
    pub progress_percent: i32,
    pub completed_modules: Vec<String>,
    pub module_progress: BTreeMap<String, ModuleState>,
}

impl ProgressSummary{
    /// Every module of the course gets an entry; unwatched ones start at position 0.
    pub fn build(student: &Student, course: Option<&Course>, records: &[ModuleProgress]) -> Self{
        let mut module_progress = BTreeMap::new();

        if let Some(course) = course{
            for module in &course.modules{
                module_progress.insert(module.id.clone(), ModuleState{ last_position: 0.0, completed: false });
            }
        }

        for record in records{
            module_progress.insert(record.module_id.clone(), ModuleState{
                last_position: record.last_position,
                completed: record.completed,
            });
        }

        let completed_modules = module_progress
            .iter()
            .filter(|(_, state)| state.completed)
            .map(|(id, _)| id.clone())
            .collect();

        ProgressSummary{
            progress_percent: student.progress,
            completed_modules,
            module_progress,
        }
    }
}

#[derive(Serialize, Deserialize, Debug)]
pub struct StudentDashboard{
    pub student: Student,
    pub course: Option<Course>,
    pub progress: ProgressSummary,
}

#[derive(Serialize, Deserialize, Debug)]
#[serde(rename_all = "camelCase")]
pub struct AckedProgress{
    pub module_id: String,
    pub progress: f64,
    pub watch_time: f64,
    pub overall_progress: i32,
    pub last_updated: DateTime<Utc>,
}

#[derive(Serialize, Deserialize, Debug)]
pub struct ProgressAck{
    pub success: bool,
    pub progress: AckedProgress,
}
