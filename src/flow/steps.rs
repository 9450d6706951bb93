//! Progress tracker: classifies each step relative to the current page.

use serde::Serialize;

/// One step of the tracker.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
pub struct Step {
    pub id: u8,
    pub name: &'static str,
}

/// The tracker's fixed step list.
pub const STEPS: [Step; 4] = [
    Step { id: 1, name: "Details" },
    Step { id: 2, name: "Interview" },
    Step { id: 3, name: "Feedback" },
    Step { id: 4, name: "Complete" },
];

#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize)]
#[serde(rename_all = "snake_case")]
pub enum StepStatus {
    Completed,
    Active,
    Upcoming,
}

/// Classify step `step_id` while the page at ordinal `current` is shown.
pub fn classify(step_id: u8, current: u8) -> StepStatus {
    use std::cmp::Ordering::*;
    match step_id.cmp(&current) {
        Less => StepStatus::Completed,
        Equal => StepStatus::Active,
        Greater => StepStatus::Upcoming,
    }
}

/// A step as rendered.
#[derive(Debug, Clone, PartialEq, Eq, Serialize)]
#[serde(rename_all = "camelCase")]
pub struct StepView {
    pub id: u8,
    pub name: &'static str,
    pub status: StepStatus,
    /// Segment to the next step; `None` after the last step.
    #[serde(skip_serializing_if = "Option::is_none")]
    pub connector_filled: Option<bool>,
}

/// Render the whole tracker for ordinal `current`.
pub fn render(steps: &[Step], current: u8) -> Vec<StepView> {
    let last = steps.len().saturating_sub(1);
    steps
        .iter()
        .enumerate()
        .map(|(index, step)| StepView {
            id: step.id,
            name: step.name,
            status: classify(step.id, current),
            connector_filled: (index < last).then_some(step.id < current),
        })
        .collect()
}

/// Tracker with the standard step list.
pub fn progress(current: u8) -> Vec<StepView> {
    render(&STEPS, current)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn interview_page_tracker() {
        let views = progress(2);
        let statuses: Vec<StepStatus> = views.iter().map(|v| v.status).collect();
        assert_eq!(
            statuses,
            vec![
                StepStatus::Completed,
                StepStatus::Active,
                StepStatus::Upcoming,
                StepStatus::Upcoming
            ]
        );
        let connectors: Vec<Option<bool>> = views.iter().map(|v| v.connector_filled).collect();
        assert_eq!(connectors, vec![Some(true), Some(false), Some(false), None]);
    }

    #[test]
    fn classification_is_monotonic() {
        for a in 1..=4u8 {
            for b in (a + 1)..=4u8 {
                assert_eq!(classify(a, b), StepStatus::Completed, "{a} under {b}");
                assert_ne!(classify(a, b), StepStatus::Upcoming);
            }
        }
    }

    #[test]
    fn exactly_one_active_step_in_range() {
        for current in 1..=4u8 {
            let active = progress(current)
                .iter()
                .filter(|v| v.status == StepStatus::Active)
                .count();
            assert_eq!(active, 1);
        }
    }

    #[test]
    fn out_of_range_ordinals() {
        assert!(progress(0).iter().all(|v| v.status == StepStatus::Upcoming));
        assert!(progress(9).iter().all(|v| v.status == StepStatus::Completed));
    }

    #[test]
    fn final_page_fills_every_connector() {
        let views = progress(4);
        assert!(views.iter().filter_map(|v| v.connector_filled).all(|f| f));
        assert_eq!(views[3].status, StepStatus::Active);
    }

    #[test]
    fn empty_step_list() {
        assert!(render(&[], 1).is_empty());
    }
}
