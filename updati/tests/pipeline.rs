mod common;

use common::{composer_repository, repository, settings, Behavior, FakeHost, FakePlugin, FakeVcs, Harness};
use std::sync::Arc;
use tokio_util::sync::CancellationToken;
use updati::{OutcomeStatus, Plugin, PrAction, Settings};

fn composer_vcs(name: &str) -> FakeVcs {
    let mut vcs = FakeVcs::default();
    vcs.seed.insert(
        format!("acme/{name}"),
        vec![
            ("composer.json".to_string(), "{}".to_string()),
            ("composer.lock".to_string(), "locked-v1".to_string()),
        ],
    );
    vcs
}

#[tokio::test]
async fn composer_change_opens_pull_request() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert!(outcome.changed());
    assert_eq!(outcome.changed_files, vec!["composer.lock"]);
    assert_eq!(outcome.branch, "updati/dependencies");
    let pr = outcome.pull_request.expect("pull request");
    assert!(!pr.url.is_empty());

    assert_eq!(
        harness.vcs.calls(),
        vec![
            "clone acme/shop@main",
            "checkout updati/dependencies",
            "commit chore(deps): update dependencies",
            "force-push updati/dependencies",
        ]
    );
    assert_eq!(
        harness.host.mutations(),
        vec!["create acme/shop", "label acme/shop #1 dependencies,automated"]
    );
}

#[tokio::test]
async fn repository_without_manifests_runs_no_plugins() {
    let composer = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let npm = Arc::new(FakePlugin::npm(Behavior::Write("{}")));
    let plugins: Vec<Arc<dyn Plugin>> = vec![composer.clone(), npm.clone()];
    let harness = Harness::new(settings(), FakeHost::default(), FakeVcs::default(), plugins);

    let outcome = harness
        .updater
        .update(&repository("docs"), &CancellationToken::new())
        .await;

    assert!(outcome.succeeded());
    assert!(!outcome.changed());
    assert_eq!(composer.runs() + npm.runs(), 0);
    assert!(harness.host.mutations().is_empty());
    assert!(!harness.vcs.calls().iter().any(|c| c.contains("push")));
}

#[tokio::test]
async fn failing_update_command_stops_before_commit() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Fail("lock conflict")));
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert!(!outcome.succeeded());
    let error = outcome.error().unwrap();
    assert!(error.contains("composer update failed: lock conflict"), "{error}");
    assert!(!harness
        .vcs
        .calls()
        .iter()
        .any(|c| c.starts_with("commit") || c.contains("push")));
    assert!(harness.host.calls().is_empty());
}

#[tokio::test]
async fn later_plugin_failure_fails_repository() {
    let composer = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let npm = Arc::new(FakePlugin::npm(Behavior::Fail("ERESOLVE")));
    let harness = Harness::new(
        settings(),
        FakeHost::default(),
        composer_vcs("shop"),
        vec![composer.clone(), npm],
    );
    let mut repo = composer_repository("shop");
    repo.has_npm = true;

    let outcome = harness.updater.update(&repo, &CancellationToken::new()).await;

    assert_eq!(composer.runs(), 1);
    assert!(outcome.error().unwrap().starts_with("npm: "));
    assert!(harness.host.calls().is_empty());
}

#[tokio::test]
async fn second_run_is_unchanged_and_keeps_one_pull_request() {
    let plugin = Arc::new(
        FakePlugin::composer(Behavior::Nothing).then([Behavior::Write("locked-v2")]),
    );
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);
    let repo = composer_repository("shop");
    let cancel = CancellationToken::new();

    let first = harness.updater.update(&repo, &cancel).await;
    let second = harness.updater.update(&repo, &cancel).await;

    assert_eq!(first.status, OutcomeStatus::Updated);
    assert_eq!(second.status, OutcomeStatus::UpToDate);
    assert!(second.pull_request.is_none());
    assert_eq!(harness.host.open_pull_requests(), 1);
    assert_eq!(
        harness
            .host
            .calls()
            .iter()
            .filter(|c| c.starts_with("create"))
            .count(),
        1
    );
}

#[tokio::test]
async fn repeated_change_updates_existing_pull_request() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);
    let repo = composer_repository("shop");
    let cancel = CancellationToken::new();

    let first = harness.updater.update(&repo, &cancel).await;
    let second = harness.updater.update(&repo, &cancel).await;

    assert_eq!(first.pull_request, second.pull_request);
    assert_eq!(first.pull_request_action, Some(PrAction::Created));
    assert_eq!(second.pull_request_action, Some(PrAction::Updated));
    assert_eq!(harness.host.open_pull_requests(), 1);
    assert!(harness.host.calls().contains(&"update acme/shop #1".to_string()));
}

#[tokio::test]
async fn dry_run_touches_no_remote_state() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        dry_run: true,
        ..settings()
    };
    let harness = Harness::new(settings, FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Simulated);
    assert!(outcome.changed());
    assert_eq!(outcome.changed_files, vec!["composer.lock"]);
    assert_eq!(harness.vcs.calls(), vec!["clone acme/shop@main"]);
    assert!(harness.host.calls().is_empty());
}

#[tokio::test]
async fn direct_push_targets_base_branch() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        create_pr: false,
        base_branch: Some("develop".to_string()),
        ..settings()
    };
    let harness = Harness::new(settings, FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert_eq!(outcome.branch, "develop");
    assert!(outcome.pull_request.is_none());
    assert_eq!(
        harness.vcs.calls(),
        vec![
            "clone acme/shop@develop",
            "commit chore(deps): update dependencies",
            "push develop"
        ]
    );
    assert!(harness.host.calls().is_empty());
}

#[tokio::test]
async fn direct_push_defaults_to_repository_branch() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        create_pr: false,
        ..settings()
    };
    let harness = Harness::new(settings, FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.branch, "main");
    assert_eq!(harness.vcs.calls()[0], "clone acme/shop@main");
    assert!(harness.vcs.calls().contains(&"push main".to_string()));
}

#[tokio::test]
async fn nothing_to_commit_is_up_to_date() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let vcs = FakeVcs {
        nothing_to_commit: true,
        ..composer_vcs("shop")
    };
    let harness = Harness::new(settings(), FakeHost::default(), vcs, vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::UpToDate);
    assert!(!harness.vcs.calls().iter().any(|c| c.contains("push")));
    assert!(harness.host.calls().is_empty());
}

#[tokio::test]
async fn label_failure_is_reported_as_warning() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let host = FakeHost {
        reject_labels: true,
        ..FakeHost::default()
    };
    let harness = Harness::new(settings(), host, composer_vcs("shop"), vec![plugin]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert!(outcome.pull_request.is_some());
    assert_eq!(outcome.warnings.len(), 1);
    assert!(outcome.warnings[0].contains("Validation Failed"));
}

#[tokio::test]
async fn disabled_ecosystem_is_not_run() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        update_composer: false,
        ..settings()
    };
    let harness = Harness::new(settings, FakeHost::default(), composer_vcs("shop"), vec![plugin.clone()]);

    let outcome = harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::UpToDate);
    assert_eq!(plugin.runs(), 0);
}

#[tokio::test]
async fn templates_see_changed_files() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        commit_message: "chore({{repository}}): {{#each changed_files}}{{this}} {{/each}}".to_string(),
        ..settings()
    };
    let harness = Harness::new(settings, FakeHost::default(), composer_vcs("shop"), vec![plugin]);

    harness
        .updater
        .update(&composer_repository("shop"), &CancellationToken::new())
        .await;

    assert!(harness
        .vcs
        .calls()
        .contains(&"commit chore(shop): composer.lock ".to_string()));
}

#[tokio::test]
async fn working_copy_is_removed_on_every_path() {
    let plugin = Arc::new(
        FakePlugin::composer(Behavior::Write("locked-v2")).then([Behavior::Fail("boom")]),
    );
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);
    let repo = composer_repository("shop");
    let cancel = CancellationToken::new();

    let failed = harness.updater.update(&repo, &cancel).await;
    let succeeded = harness.updater.update(&repo, &cancel).await;

    assert!(!failed.succeeded());
    assert!(succeeded.succeeded());

    let copies = harness.vcs.working_copies();
    assert_eq!(copies.len(), 2);
    for path in copies {
        assert!(!path.exists(), "{} was left behind", path.display());
    }
}

#[tokio::test]
async fn cancelled_update_fails_without_cloning() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin]);
    let cancel = CancellationToken::new();
    cancel.cancel();

    let outcome = harness.updater.update(&composer_repository("shop"), &cancel).await;

    assert_eq!(outcome.error(), Some("operation cancelled"));
    assert!(harness.vcs.calls().is_empty());
}

#[tokio::test]
async fn process_detects_manifests_before_updating() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let host = FakeHost::default().with_file("acme/shop", "composer.json", r#"{"require": {}}"#);
    let harness = Harness::new(settings(), host, composer_vcs("shop"), vec![plugin.clone()]);

    let outcome = harness
        .updater
        .process(repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::Updated);
    assert_eq!(plugin.runs(), 1);
}

#[tokio::test]
async fn process_skips_repositories_without_manifests() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let harness = Harness::new(settings(), FakeHost::default(), composer_vcs("shop"), vec![plugin.clone()]);

    let outcome = harness
        .updater
        .process(repository("shop"), &CancellationToken::new())
        .await;

    assert_eq!(outcome.status, OutcomeStatus::UpToDate);
    assert_eq!(plugin.runs(), 0);
    assert!(harness.vcs.calls().is_empty());
}

#[tokio::test]
async fn laravel_only_skips_other_projects() {
    let plugin = Arc::new(FakePlugin::composer(Behavior::Write("locked-v2")));
    let settings = Settings {
        laravel_only: true,
        ..settings()
    };
    let host = FakeHost::default()
        .with_file("acme/shop", "composer.json", r#"{"require": {"symfony/console": "^7"}}"#)
        .with_file(
            "acme/app",
            "composer.json",
            r#"{"require": {"laravel/framework": "^11.0"}}"#,
        );
    let mut vcs = composer_vcs("shop");
    vcs.seed.insert("acme/app".to_string(), Vec::new());
    let harness = Harness::new(settings, host, vcs, vec![plugin.clone()]);
    let cancel = CancellationToken::new();

    let skipped = harness.updater.process(repository("shop"), &cancel).await;
    let updated = harness.updater.process(repository("app"), &cancel).await;

    assert_eq!(skipped.status, OutcomeStatus::UpToDate);
    assert_eq!(updated.status, OutcomeStatus::Updated);
    assert_eq!(plugin.runs(), 1);
    assert_eq!(harness.vcs.calls()[0], "clone acme/app@main");
}
