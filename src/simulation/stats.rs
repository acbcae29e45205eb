use serde::{Deserialize, Serialize};

/// Running counters over every resolved or cancelled task.
#[derive(Debug, Clone, Default, PartialEq, Serialize, Deserialize)]
pub struct DispatchStatistics {
    pub total_tasks: u64,
    pub successful_tasks: u64,
    pub failed_tasks: u64,
    #[serde(default)]
    pub cancelled_tasks: u64,
    pub total_experience_gained: f64,
}

impl DispatchStatistics {
    pub fn record_completion(&mut self, success: bool, experience: f64) {
        self.total_tasks += 1;
        if success {
            self.successful_tasks += 1;
        } else {
            self.failed_tasks += 1;
        }
        self.total_experience_gained += experience;
    }

    pub fn record_cancellation(&mut self) {
        self.cancelled_tasks += 1;
    }

    pub fn success_rate(&self) -> Option<f64> {
        if self.total_tasks == 0 {
            return None;
        }
        Some(self.successful_tasks as f64 / self.total_tasks as f64)
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn counts_outcomes() {
        let mut stats = DispatchStatistics::default();
        assert_eq!(stats.success_rate(), None);
        stats.record_completion(true, 15.0);
        stats.record_completion(false, 7.5);
        stats.record_cancellation();
        assert_eq!(stats.total_tasks, 2);
        assert_eq!(stats.successful_tasks, 1);
        assert_eq!(stats.failed_tasks, 1);
        assert_eq!(stats.cancelled_tasks, 1);
        assert_eq!(stats.total_experience_gained, 22.5);
        assert_eq!(stats.success_rate(), Some(0.5));
    }
}
