//! Release pipeline runner
//!
//! Runs the steps from [steps::release_steps] strictly in order. The first
//! failing step ends the run; nothing is retried or rolled back, so a failed
//! release is restarted from the first step once the operator has fixed the
//! cause.
//!
//! The publish and push steps are only reached when
//! [ReleaseSettings::publish] is set. By default the run ends successfully
//! right after the version bump.

pub mod steps;

pub use steps::{release_steps, Step, StepContext, StepKind};

use crate::exec::CommandRunner;
use crate::failure::StepFailure;
use crate::settings::ReleaseSettings;
use crate::ui;

/// Where a run is in the step sequence.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum RunState {
    Pending,
    Running { index: usize },
    Completed,
    Aborted { index: usize },
}

impl RunState {
    pub fn is_terminal(&self) -> bool {
        matches!(self, RunState::Completed | RunState::Aborted { .. })
    }

    /// Whether `next` may follow this state. Steps only move forward one at
    /// a time and a terminal state is final.
    pub fn can_advance_to(&self, next: RunState) -> bool {
        match (*self, next) {
            (RunState::Pending, RunState::Running { index }) => index == 0,
            (RunState::Running { index }, RunState::Running { index: next }) => next == index + 1,
            (RunState::Running { index }, RunState::Aborted { index: failed }) => failed == index,
            (RunState::Running { .. }, RunState::Completed) => true,
            _ => false,
        }
    }
}

/// How a run ended.
#[derive(Debug)]
pub enum RunOutcome {
    /// Every reachable step passed
    Succeeded { published: bool },
    /// Step number `index` (zero-based) failed and nothing after it ran
    Failed {
        index: usize,
        step: StepKind,
        failure: StepFailure,
    },
}

impl RunOutcome {
    pub fn is_success(&self) -> bool {
        matches!(self, RunOutcome::Succeeded { .. })
    }

    pub fn failed_step(&self) -> Option<StepKind> {
        match self {
            RunOutcome::Succeeded { .. } => None,
            RunOutcome::Failed { step, .. } => Some(*step),
        }
    }

    /// The terminal state this outcome corresponds to
    pub fn final_state(&self) -> RunState {
        match self {
            RunOutcome::Succeeded { .. } => RunState::Completed,
            RunOutcome::Failed { index, .. } => RunState::Aborted { index: *index },
        }
    }

    /// Process exit status: 0 on success, 1 for any failure
    pub fn exit_code(&self) -> i32 {
        if self.is_success() {
            0
        } else {
            1
        }
    }
}

/// A single release run over a fixed step sequence.
pub struct Pipeline<'a, R: CommandRunner> {
    settings: &'a ReleaseSettings,
    runner: R,
    steps: Vec<Step>,
    state: RunState,
}

impl<'a, R: CommandRunner> Pipeline<'a, R> {
    pub fn new(settings: &'a ReleaseSettings, runner: R) -> Self {
        Pipeline {
            settings,
            runner,
            steps: release_steps(),
            state: RunState::Pending,
        }
    }

    pub fn state(&self) -> RunState {
        self.state
    }

    fn advance(&mut self, next: RunState) {
        debug_assert!(
            self.state.can_advance_to(next),
            "illegal run state transition {:?} -> {:?}",
            self.state,
            next
        );
        self.state = next;
    }

    /// Number of steps this run will attempt when nothing fails
    pub fn reachable_steps(&self) -> usize {
        self.steps
            .iter()
            .filter(|step| self.settings.publish || !step.kind.is_publish_stage())
            .count()
    }

    /// Print the settings report, then run every reachable step once.
    pub fn run(mut self) -> RunOutcome {
        let settings = self.settings;
        let total = self.reachable_steps();
        let steps = std::mem::take(&mut self.steps);

        let version = settings.current_version.to_string();
        ui::display_status(&ui::compose(&[
            "Releasing",
            settings.package_name.as_deref().unwrap_or(""),
            "from version",
            version.as_str(),
        ]));
        ui::report_settings(settings);

        for (index, step) in steps.iter().enumerate() {
            if step.kind.is_publish_stage() && !settings.publish {
                ui::display_warning(
                    "Publish and push are disabled; stopping after the version bump. Pass --publish or set `publish = true` under [release] to run them.",
                );
                self.advance(RunState::Completed);
                return RunOutcome::Succeeded { published: false };
            }
            self.advance(RunState::Running { index });

            ui::display_status(&format!(
                "[{}/{}] {}",
                index + 1,
                total,
                step.description()
            ));

            let result = step.run(&StepContext::new(settings, &self.runner));
            match result {
                Ok(confirmation) => ui::display_success(&confirmation),
                Err(failure) => {
                    ui::display_error(&failure.to_string());
                    self.advance(RunState::Aborted { index });
                    return RunOutcome::Failed {
                        index,
                        step: step.kind,
                        failure,
                    };
                }
            }
        }

        self.advance(RunState::Completed);
        RunOutcome::Succeeded {
            published: settings.publish,
        }
    }
}

/// Run the full release with `runner` and report the outcome.
pub fn run_release<R: CommandRunner>(settings: &ReleaseSettings, runner: R) -> RunOutcome {
    let outcome = Pipeline::new(settings, runner).run();
    match &outcome {
        RunOutcome::Succeeded { published: true } => {
            ui::display_success("Release published and pushed")
        }
        RunOutcome::Succeeded { published: false } => {
            ui::display_success("Release prepared; nothing was published or pushed")
        }
        RunOutcome::Failed { .. } => ui::display_release_failed(),
    }
    outcome
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::config::Config;
    use crate::error::ReleaseError;
    use crate::exec::MockRunner;
    use crate::manifest::Manifest;
    use crate::settings::SettingsOverrides;

    fn settings(publish: bool) -> ReleaseSettings {
        let manifest = Manifest::from_json(r#"{ "version": "1.0.0" }"#).unwrap();
        let overrides = SettingsOverrides {
            publish: Some(publish),
            ..Default::default()
        };
        ReleaseSettings::resolve(overrides, &manifest, &Config::default()).unwrap()
    }

    #[test]
    fn test_reachable_steps_without_publish() {
        let settings = settings(false);
        let pipeline = Pipeline::new(&settings, MockRunner::new());
        assert_eq!(pipeline.reachable_steps(), 7);
    }

    #[test]
    fn test_reachable_steps_with_publish() {
        let settings = settings(true);
        let pipeline = Pipeline::new(&settings, MockRunner::new());
        assert_eq!(pipeline.reachable_steps(), 9);
    }

    #[test]
    fn test_new_pipeline_is_pending() {
        let settings = settings(false);
        let pipeline = Pipeline::new(&settings, MockRunner::new());
        assert_eq!(pipeline.state(), RunState::Pending);
        assert!(!pipeline.state().is_terminal());
    }

    #[test]
    fn test_run_state_transitions() {
        let pending = RunState::Pending;
        assert!(pending.can_advance_to(RunState::Running { index: 0 }));
        assert!(!pending.can_advance_to(RunState::Running { index: 1 }));
        assert!(!pending.can_advance_to(RunState::Completed));

        let running = RunState::Running { index: 2 };
        assert!(running.can_advance_to(RunState::Running { index: 3 }));
        assert!(!running.can_advance_to(RunState::Running { index: 2 }));
        assert!(!running.can_advance_to(RunState::Running { index: 1 }));
        assert!(running.can_advance_to(RunState::Aborted { index: 2 }));
        assert!(!running.can_advance_to(RunState::Aborted { index: 3 }));
        assert!(running.can_advance_to(RunState::Completed));

        for terminal in [RunState::Completed, RunState::Aborted { index: 2 }] {
            assert!(terminal.is_terminal());
            assert!(!terminal.can_advance_to(RunState::Running { index: 3 }));
            assert!(!terminal.can_advance_to(RunState::Completed));
        }
    }

    #[test]
    fn test_outcome_exit_codes() {
        let ok = RunOutcome::Succeeded { published: false };
        assert_eq!(ok.exit_code(), 0);
        assert_eq!(ok.failed_step(), None);
        assert_eq!(ok.final_state(), RunState::Completed);

        let failed = RunOutcome::Failed {
            index: 2,
            step: StepKind::Fetch,
            failure: StepFailure::FetchFailed {
                remote: "origin".to_string(),
                source: ReleaseError::CommandFailed {
                    command: "git fetch origin".to_string(),
                    code: Some(128),
                },
            },
        };
        assert_eq!(failed.exit_code(), 1);
        assert_eq!(failed.failed_step(), Some(StepKind::Fetch));
        assert_eq!(failed.final_state(), RunState::Aborted { index: 2 });
    }
}
