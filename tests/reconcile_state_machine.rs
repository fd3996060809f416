// tests/reconcile_state_machine.rs

mod common;
use crate::common::{goal, init_tracing, Call, FakeClient, HostConfigBuilder, Op, TestResult};

use dockergoal::client::ClientError;
use dockergoal::errors::GoalError;
use dockergoal::goal::ApplyOutcome;

#[tokio::test]
async fn absent_container_is_created_then_started() -> TestResult {
    init_tracing();
    let client = FakeClient::new();
    let web = goal("web", "nginx:1.27").build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::Created);
    assert_eq!(
        client.calls(),
        vec![
            Call::Inspect("web".into()),
            Call::Create {
                name: "web".into(),
                image: "nginx:1.27".into()
            },
            Call::Inspect("web".into()),
            Call::Start("web".into()),
        ]
    );
    assert!(client.container("web").is_some_and(|c| c.running));
    Ok(())
}

#[tokio::test]
async fn running_container_without_image_check_is_left_alone() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_image("nginx:1.27", "sha256:new")
        .with_container("web", "sha256:old", true);
    let web = goal("web", "nginx:1.27").remove_existing().build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::AlreadyRunning);
    assert!(client.mutating_calls().is_empty());
    assert_eq!(client.calls(), vec![Call::Inspect("web".into())]);
    Ok(())
}

#[tokio::test]
async fn running_container_with_matching_image_is_satisfying() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_image("nginx:1.27", "sha256:same")
        .with_container("web", "sha256:same", true);
    let web = goal("web", "nginx:1.27").check_running_image().build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::AlreadyRunning);
    assert!(client.mutating_calls().is_empty());
    assert!(client.calls().contains(&Call::ResolveImage("nginx:1.27".into())));
    Ok(())
}

#[tokio::test]
async fn image_mismatch_without_removal_permission_fails_without_mutation() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_image("nginx:1.27", "sha256:new")
        .with_container("web", "sha256:old", true);
    let web = goal("web", "nginx:1.27").check_running_image().build()?;

    let err = web.apply(&client).await.unwrap_err();

    match &err {
        GoalError::ImageMismatch {
            container,
            running_image,
            desired_image,
            desired_image_id,
        } => {
            assert_eq!(container, "web");
            assert_eq!(running_image, "sha256:old");
            assert_eq!(desired_image, "nginx:1.27");
            assert_eq!(desired_image_id, "sha256:new");
        }
        other => panic!("expected ImageMismatch, got {other:?}"),
    }
    let msg = err.to_string();
    assert!(msg.contains("web") && msg.contains("sha256:old") && msg.contains("sha256:new"));
    assert!(client.mutating_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn image_mismatch_with_removal_permission_replaces_container() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_image("nginx:1.27", "sha256:new")
        .with_container("web", "sha256:old", true);
    let web = goal("web", "nginx:1.27")
        .check_running_image()
        .remove_existing()
        .build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::Replaced);
    assert_eq!(
        client.mutating_calls(),
        vec![
            Call::Remove {
                name: "web".into(),
                force: true,
                remove_volumes: false
            },
            Call::Create {
                name: "web".into(),
                image: "nginx:1.27".into()
            },
            Call::Start("web".into()),
        ]
    );
    let info = client.container("web").expect("container recreated");
    assert_eq!(info.image, "sha256:new");
    assert!(info.running);
    Ok(())
}

#[tokio::test]
async fn force_remove_replaces_even_a_satisfying_container() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_image("nginx:1.27", "sha256:same")
        .with_container("web", "sha256:same", true);
    let web = goal("web", "nginx:1.27").force_remove_existing().build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::Replaced);
    let mutating = client.mutating_calls();
    assert_eq!(mutating.len(), 3);
    assert!(matches!(
        mutating[0],
        Call::Remove {
            force: true,
            remove_volumes: false,
            ..
        }
    ));
    assert!(matches!(mutating[1], Call::Create { .. }));
    assert_eq!(mutating[2], Call::Start("web".into()));
    // Force removal never compares images.
    assert!(!client.calls().iter().any(|c| matches!(c, Call::ResolveImage(_))));
    Ok(())
}

#[tokio::test]
async fn force_remove_with_no_existing_container_just_creates() -> TestResult {
    init_tracing();
    let client = FakeClient::new();
    let web = goal("web", "nginx:1.27").force_remove_existing().build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::Created);
    assert!(!client.calls().iter().any(|c| matches!(c, Call::Remove { .. })));
    Ok(())
}

#[tokio::test]
async fn stopped_container_is_started_in_place() -> TestResult {
    init_tracing();
    let client = FakeClient::new().with_container("web", "sha256:old", false);
    let web = goal("web", "nginx:1.27").check_running_image().build()?;

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::StartedExisting);
    assert_eq!(client.mutating_calls(), vec![Call::Start("web".into())]);
    Ok(())
}

#[tokio::test]
async fn stopped_container_with_host_config_is_still_started_in_place() -> TestResult {
    init_tracing();
    let client = FakeClient::new().with_container("web", "sha256:old", false);
    let web = goal("web", "nginx:1.27")
        .host_config(HostConfigBuilder::new().port("8080:80").build())
        .build()?;
    assert!(!web.host_config().is_empty());

    let outcome = web.apply(&client).await?;

    assert_eq!(outcome, ApplyOutcome::StartedExisting);
    assert_eq!(client.mutating_calls(), vec![Call::Start("web".into())]);
    Ok(())
}

#[tokio::test]
async fn inspect_failure_aborts_before_any_mutation() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_container("web", "sha256:old", true)
        .failing(Op::Inspect, "web");
    let web = goal("web", "nginx:1.27").force_remove_existing().build()?;

    let err = web.apply(&client).await.unwrap_err();

    match err {
        GoalError::Client { context, source } => {
            assert!(context.contains("inspecting container 'web'"));
            assert!(matches!(source, ClientError::Command { .. }));
        }
        other => panic!("expected Client error, got {other:?}"),
    }
    assert!(client.mutating_calls().is_empty());
    Ok(())
}

#[tokio::test]
async fn remove_failure_is_fatal() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_container("web", "sha256:old", true)
        .failing(Op::Remove, "web");
    let web = goal("web", "nginx:1.27").force_remove_existing().build()?;

    let err = web.apply(&client).await.unwrap_err();

    assert!(matches!(err, GoalError::Client { .. }));
    assert!(!client.calls().iter().any(|c| matches!(c, Call::Create { .. })));
    Ok(())
}

#[tokio::test]
async fn create_failure_is_fatal_and_skips_start() -> TestResult {
    init_tracing();
    let client = FakeClient::new().failing(Op::Create, "web");
    let web = goal("web", "nginx:1.27").build()?;

    let err = web.apply(&client).await.unwrap_err();

    assert!(err.to_string().contains("creating container 'web'"));
    assert!(client.container("web").is_none());
    assert!(!client.calls().iter().any(|c| matches!(c, Call::Start(_))));
    Ok(())
}

#[tokio::test]
async fn start_failure_is_fatal() -> TestResult {
    init_tracing();
    let client = FakeClient::new().failing(Op::Start, "web");
    let web = goal("web", "nginx:1.27").build()?;

    let err = web.apply(&client).await.unwrap_err();

    assert!(err.to_string().contains("starting container 'web'"));
    Ok(())
}

#[tokio::test]
async fn image_resolution_failure_is_fatal_without_mutation() -> TestResult {
    init_tracing();
    let client = FakeClient::new()
        .with_container("web", "sha256:old", true)
        .failing(Op::ResolveImage, "nginx:1.27");
    let web = goal("web", "nginx:1.27")
        .check_running_image()
        .remove_existing()
        .build()?;

    let err = web.apply(&client).await.unwrap_err();

    assert!(err.to_string().contains("resolving image id of 'nginx:1.27'"));
    assert!(client.mutating_calls().is_empty());
    Ok(())
}
