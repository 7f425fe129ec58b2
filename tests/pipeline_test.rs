use release_pipeline::config::{CommandsConfig, Config};
use release_pipeline::exec::{MockResponse, MockRunner, OutputMode};
use release_pipeline::failure::StepFailure;
use release_pipeline::manifest::Manifest;
use release_pipeline::pipeline::{run_release, Pipeline, RunOutcome, RunState, StepKind};
use release_pipeline::settings::{ReleaseSettings, SettingsOverrides};

const HASH: &str = "3f2a9c1d5e7b8a6f4c2d1e0b9a8f7e6d5c4b3a21";
const OTHER_HASH: &str = "a1b2c3d4e5f60718293a4b5c6d7e8f9012345678";

fn settings(overrides: SettingsOverrides) -> ReleaseSettings {
    settings_with_config(overrides, &Config::default())
}

fn settings_with_config(overrides: SettingsOverrides, config: &Config) -> ReleaseSettings {
    let manifest = Manifest::from_json(r#"{ "name": "widgets", "version": "1.4.0" }"#).unwrap();
    ReleaseSettings::resolve(overrides, &manifest, config).unwrap()
}

fn custom_tree_check_config() -> Config {
    Config {
        commands: CommandsConfig {
            tree_check: vec![
                "npm".to_string(),
                "run".to_string(),
                "check-clean".to_string(),
            ],
            ..Default::default()
        },
        ..Default::default()
    }
}

/// A runner where every check passes, with `overrides` taking precedence.
fn runner_with(overrides: Vec<(&str, MockResponse)>) -> MockRunner {
    let mut runner = MockRunner::new();
    for (line, response) in overrides {
        runner = runner.respond(line, response);
    }
    runner
        .respond("git status --porcelain", MockResponse::stdout(""))
        .respond(
            "git rev-parse --abbrev-ref HEAD",
            MockResponse::stdout("master\n"),
        )
        .respond("git rev-parse master", MockResponse::stdout(format!("{}\n", HASH)))
        .respond(
            "git rev-parse origin/master",
            MockResponse::stdout(format!("{}\n", HASH)),
        )
}

fn ran_any(runner: &MockRunner, prefixes: &[&str]) -> bool {
    prefixes.iter().any(|prefix| runner.ran(prefix))
}

#[test]
fn test_happy_path_stops_after_version_bump() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![]);

    let outcome = run_release(&settings, &runner);

    assert!(matches!(outcome, RunOutcome::Succeeded { published: false }));
    assert_eq!(outcome.exit_code(), 0);
    assert_eq!(outcome.final_state(), RunState::Completed);
    assert_eq!(
        runner.command_lines(),
        vec![
            "git status --porcelain".to_string(),
            "git rev-parse --abbrev-ref HEAD".to_string(),
            "git fetch origin".to_string(),
            "git rev-parse master".to_string(),
            "git rev-parse origin/master".to_string(),
            "npm run qa:prepare".to_string(),
            "npm run qa".to_string(),
            "npx lerna version --conventional-commits --git-remote origin --message \"chore(release): %v\" --no-push --sign-git-commit=false --sign-git-tag=false".to_string(),
        ]
    );
    assert!(!ran_any(&runner, &["npm publish", "git push"]));
}

#[test]
fn test_dirty_tree_runs_nothing_else() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![(
        "git status --porcelain",
        MockResponse::stdout(" M src/index.js\n?? notes.txt\n"),
    )]);

    let outcome = run_release(&settings, &runner);

    assert_eq!(outcome.exit_code(), 1);
    assert_eq!(outcome.final_state(), RunState::Aborted { index: 0 });
    match outcome {
        RunOutcome::Failed {
            index,
            step,
            failure: StepFailure::DirtyWorkingTree { changes },
        } => {
            assert_eq!(index, 0);
            assert_eq!(step, StepKind::WorkingTree);
            assert_eq!(changes, vec![" M src/index.js", "?? notes.txt"]);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert_eq!(runner.command_lines(), vec!["git status --porcelain"]);
    assert!(!ran_any(&runner, &["git rev-parse", "git fetch", "npm", "npx"]));
}

#[test]
fn test_failing_tree_check_command_aborts() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![("git status", MockResponse::Failure(128))]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert_eq!(outcome.failed_step(), Some(StepKind::WorkingTree));
    assert!(!runner.ran("git fetch"));
}

#[test]
fn test_custom_tree_check_banner_output_is_not_dirty() {
    let settings = settings_with_config(SettingsOverrides::default(), &custom_tree_check_config());
    let runner = runner_with(vec![(
        "npm run check-clean",
        MockResponse::stdout("> widgets@1.4.0 check-clean\n> git diff --quiet\n"),
    )]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert!(outcome.is_success());
    assert_eq!(outcome.failed_step(), None);
    let lines = runner.command_lines();
    assert_eq!(lines[0], "npm run check-clean");
    assert!(runner.ran("git fetch origin"));
    assert!(runner.ran("npx lerna version"));
}

#[test]
fn test_custom_tree_check_fails_on_exit_status() {
    let settings = settings_with_config(SettingsOverrides::default(), &custom_tree_check_config());
    let runner = runner_with(vec![("npm run check-clean", MockResponse::Failure(1))]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert_eq!(outcome.failed_step(), Some(StepKind::WorkingTree));
    assert_eq!(runner.command_lines(), vec!["npm run check-clean"]);
}

#[test]
fn test_wrong_branch_never_fetches() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![(
        "git rev-parse --abbrev-ref HEAD",
        MockResponse::stdout("feature/login\n"),
    )]);

    let outcome = run_release(&settings, &runner);

    match &outcome {
        RunOutcome::Failed {
            failure: StepFailure::WrongBranch { current, expected },
            ..
        } => {
            assert_eq!(current, "feature/login");
            assert_eq!(expected, "master");
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!runner.ran("git fetch"));
}

#[test]
fn test_branch_override_is_compared_exactly() {
    let settings = settings(SettingsOverrides {
        git_branch: Some("Master".to_string()),
        ..Default::default()
    });
    let runner = runner_with(vec![]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert_eq!(outcome.failed_step(), Some(StepKind::Branch));
}

#[test]
fn test_fetch_failure_stops_before_sync() {
    let settings = settings(SettingsOverrides {
        git_remote: Some("upstream".to_string()),
        ..Default::default()
    });
    let runner = runner_with(vec![("git fetch upstream", MockResponse::Failure(128))]);

    let outcome = Pipeline::new(&settings, &runner).run();

    match outcome {
        RunOutcome::Failed {
            failure: StepFailure::FetchFailed { remote, source },
            ..
        } => {
            assert_eq!(remote, "upstream");
            assert_eq!(source.exit_code(), Some(128));
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!runner.ran("git rev-parse master"));
}

#[test]
fn test_out_of_sync_branches_fail_before_qa() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![(
        "git rev-parse origin/master",
        MockResponse::stdout(OTHER_HASH),
    )]);

    let outcome = run_release(&settings, &runner);

    match &outcome {
        RunOutcome::Failed {
            index,
            failure:
                StepFailure::OutOfSync {
                    local_hash,
                    remote_hash,
                    ..
                },
            ..
        } => {
            assert_eq!(*index, 3);
            assert_eq!(local_hash, HASH);
            assert_eq!(remote_hash, OTHER_HASH);
        }
        other => panic!("unexpected outcome: {:?}", other),
    }
    assert!(!ran_any(&runner, &["npm", "npx"]));
}

#[test]
fn test_unresolvable_remote_branch_fails_sync() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![("git rev-parse origin/master", MockResponse::stdout("\n"))]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert!(matches!(
        outcome,
        RunOutcome::Failed {
            failure: StepFailure::UnresolvedRef { .. },
            ..
        }
    ));
}

#[test]
fn test_same_failure_on_repeated_runs() {
    let settings = settings(SettingsOverrides::default());
    let script = || {
        runner_with(vec![(
            "git rev-parse master",
            MockResponse::stdout(OTHER_HASH),
        )])
    };

    let first_runner = script();
    let first = Pipeline::new(&settings, &first_runner).run();
    let second_runner = script();
    let second = Pipeline::new(&settings, &second_runner).run();

    assert_eq!(first.failed_step(), Some(StepKind::Sync));
    assert_eq!(first.failed_step(), second.failed_step());
    assert_eq!(first_runner.command_lines(), second_runner.command_lines());
}

#[test]
fn test_qa_failure_keeps_earlier_side_effects_and_skips_bump() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![("npm run qa", MockResponse::Failure(1))]);

    let outcome = run_release(&settings, &runner);

    assert_eq!(outcome.failed_step(), Some(StepKind::Qa));
    assert!(runner.ran("git fetch origin"));
    assert!(runner.ran("npm run qa:prepare"));
    assert!(!runner.ran("npx lerna version"));
}

#[test]
fn test_qa_prepare_failure() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![("npm run qa:prepare", MockResponse::Failure(2))]);

    let outcome = Pipeline::new(&settings, &runner).run();

    assert_eq!(outcome.failed_step(), Some(StepKind::QaPrepare));
    assert!(!runner.command_lines().contains(&"npm run qa".to_string()));
    assert_eq!(runner.command_lines().last().unwrap(), "npm run qa:prepare");
}

#[test]
fn test_version_bump_failure() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![("npx lerna version", MockResponse::Failure(1))]);

    let outcome = run_release(&settings, &runner);

    assert_eq!(outcome.failed_step(), Some(StepKind::VersionBump));
    assert_eq!(outcome.exit_code(), 1);
}

#[test]
fn test_version_bump_receives_computed_flags() {
    let settings = settings(SettingsOverrides {
        version_bump: Some("minor".to_string()),
        preid: Some("next".to_string()),
        sign: Some(true),
        commit_message: Some("release: %s".to_string()),
        ..Default::default()
    });
    let runner = runner_with(vec![]);

    assert!(Pipeline::new(&settings, &runner).run().is_success());

    let bump = runner
        .invocations()
        .into_iter()
        .find(|cmd| cmd.program == "npx")
        .unwrap();
    assert_eq!(
        bump.args,
        vec![
            "lerna",
            "version",
            "minor",
            "--conventional-commits",
            "--git-remote",
            "origin",
            "--message",
            "release: %s",
            "--no-push",
            "--preid",
            "next",
            "--sign-git-commit=true",
            "--sign-git-tag=true",
        ]
    );
}

#[test]
fn test_output_modes() {
    let settings = settings(SettingsOverrides::default());
    let runner = runner_with(vec![]);

    Pipeline::new(&settings, &runner).run();

    assert_eq!(runner.mode_of("git status"), Some(OutputMode::Captured));
    assert_eq!(
        runner.mode_of("git rev-parse --abbrev-ref"),
        Some(OutputMode::Captured)
    );
    assert_eq!(runner.mode_of("git fetch"), Some(OutputMode::Inherited));
    assert_eq!(runner.mode_of("npm run qa"), Some(OutputMode::Inherited));
    assert_eq!(runner.mode_of("npx lerna"), Some(OutputMode::Inherited));
}

#[test]
fn test_publish_enabled_runs_publish_then_push() {
    let settings = settings(SettingsOverrides {
        publish: Some(true),
        dist_tag: Some("beta".to_string()),
        ..Default::default()
    });
    let runner = runner_with(vec![]);

    let outcome = run_release(&settings, &runner);

    assert!(matches!(outcome, RunOutcome::Succeeded { published: true }));
    let lines = runner.command_lines();
    assert_eq!(
        &lines[lines.len() - 2..],
        &[
            "npm publish --tag beta --registry https://registry.npmjs.org/".to_string(),
            "git push --follow-tags origin master".to_string(),
        ]
    );
}

#[test]
fn test_publish_failure_skips_push() {
    let settings = settings(SettingsOverrides {
        publish: Some(true),
        ..Default::default()
    });
    let runner = runner_with(vec![("npm publish", MockResponse::Failure(1))]);

    let outcome = run_release(&settings, &runner);

    assert_eq!(outcome.failed_step(), Some(StepKind::Publish));
    assert!(!runner.ran("git push"));
}
