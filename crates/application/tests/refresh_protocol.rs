//! Integration tests for bearer attachment and the single-flight refresh.
#![allow(clippy::unwrap_used, clippy::expect_used, clippy::panic)]

mod common;

use popspot_application::{ClientError, RefreshError, SessionStore};
use popspot_domain::{Attempt, RequestSpec, Session, TokenPair};
use pretty_assertions::assert_eq;

use common::{Harness, MockApi, RefreshBehavior, logged_in, token_in_body, wait_until};

#[tokio::test]
async fn test_attaches_current_access_token() {
    let api = MockApi::new("T1", RefreshBehavior::Fail(500));
    let harness = Harness::new(api, logged_in("T1", "R1"));

    let response = harness
        .client
        .send(RequestSpec::get("/users/me"))
        .await
        .unwrap();

    assert_eq!(response.status.as_u16(), 200);
    let sent = harness.api.requests_to("/users/me");
    assert_eq!(sent.len(), 1);
    assert_eq!(sent[0].headers.get("Authorization"), Some("Bearer T1"));
    assert_eq!(harness.api.refresh_calls(), 0);
}

#[tokio::test]
async fn test_anonymous_request_has_no_authorization_header() {
    let api = MockApi::new("T1", RefreshBehavior::Fail(500));
    api.make_public("/exhibitions");
    let harness = Harness::new(api, Session::anonymous());

    harness
        .client
        .send(RequestSpec::get("/exhibitions"))
        .await
        .unwrap();

    let sent = harness.api.requests_to("/exhibitions");
    assert!(sent[0].headers.get("Authorization").is_none());
}

#[tokio::test]
async fn test_expired_token_is_refreshed_and_replayed_once() {
    let harness = Harness::expired();

    let response = harness
        .client
        .send(RequestSpec::get("/wishlist"))
        .await
        .unwrap();

    assert_eq!(token_in_body(&response).as_deref(), Some("T2"));
    assert_eq!(harness.api.refresh_calls(), 1);

    let refresh = harness.api.requests_to("/auth/refresh");
    assert_eq!(refresh[0].headers.get("Authorization"), Some("Bearer R1"));

    let sent = harness.api.requests_to("/wishlist");
    assert_eq!(sent.len(), 2);
    assert_eq!(sent[0].attempt(), Attempt::Initial);
    assert_eq!(sent[1].attempt(), Attempt::Replay);
    assert_eq!(sent[1].id, sent[0].id);

    let session = harness.session.session().await;
    assert_eq!(session.access_token.as_deref(), Some("T2"));
    assert_eq!(session.refresh_token.as_deref(), Some("R2"));
    assert!(session.user.is_some());
    assert!(harness.navigator.redirects().is_empty());
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_three_requests_share_one_refresh() {
    let harness = Harness::expired();
    let gate = harness.api.gate_refresh();

    let a = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;

    let b = harness.spawn_get("/exhibitions/2");
    let c = harness.spawn_get("/exhibitions/3");
    wait_until(|| harness.client.queued_requests() == 2).await;

    gate.add_permits(1);

    for handle in [a, b, c] {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(token_in_body(&response).as_deref(), Some("T2"));
    }
    assert_eq!(harness.api.refresh_calls(), 1);

    for path in ["/exhibitions/1", "/exhibitions/2", "/exhibitions/3"] {
        let sent = harness.api.requests_to(path);
        assert_eq!(sent.len(), 2, "{path} should be sent then replayed");
        assert_eq!(sent[1].headers.get("Authorization"), Some("Bearer T2"));
    }
    assert!(!harness.client.is_refreshing());
    assert_eq!(harness.client.queued_requests(), 0);
}

#[tokio::test(flavor = "multi_thread", worker_threads = 4)]
async fn test_many_concurrent_failures_issue_one_refresh() {
    const N: usize = 16;
    let harness = Harness::expired();
    let gate = harness.api.gate_refresh();

    let handles: Vec<_> = (0..N).map(|_| harness.spawn_get("/wishlist")).collect();
    wait_until(|| harness.client.queued_requests() == N - 1).await;
    gate.add_permits(1);

    for handle in handles {
        let response = handle.await.unwrap().unwrap();
        assert_eq!(token_in_body(&response).as_deref(), Some("T2"));
    }
    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.api.requests_to("/wishlist").len(), 2 * N);
}

#[tokio::test]
async fn test_refresh_failure_rejects_every_queued_request() {
    let api = MockApi::new("T-current", RefreshBehavior::Fail(500));
    let harness = Harness::new(api, logged_in("T1", "R1"));
    let gate = harness.api.gate_refresh();

    let a = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;
    let b = harness.spawn_get("/exhibitions/2");
    let c = harness.spawn_get("/exhibitions/3");
    wait_until(|| harness.client.queued_requests() == 2).await;
    gate.add_permits(1);

    for handle in [a, b, c] {
        let error = handle.await.unwrap().unwrap_err();
        assert!(
            matches!(
                error,
                ClientError::RefreshFailed(RefreshError::Rejected { status: 500, .. })
            ),
            "unexpected error: {error:?}"
        );
    }

    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
    assert!(!harness.client.is_refreshing());

    // The flag is free again: a new login followed by an expired token refreshes anew.
    harness.api.ungate_refresh();
    harness
        .api
        .set_refresh(RefreshBehavior::Issue(TokenPair::new("T3", "R3")));
    harness.session.replace(logged_in("T1", "R1")).await;

    let response = harness
        .client
        .send(RequestSpec::get("/exhibitions/4"))
        .await
        .unwrap();
    assert_eq!(token_in_body(&response).as_deref(), Some("T3"));
    assert_eq!(harness.api.refresh_calls(), 2);
}

#[tokio::test]
async fn test_missing_refresh_token_fails_without_refresh_call() {
    let api = MockApi::new("T-current", RefreshBehavior::Issue(TokenPair::new("T2", "R2")));
    let session = Session {
        access_token: Some("T1".to_string()),
        ..Session::anonymous()
    };
    let harness = Harness::new(api, session);

    let error = harness
        .client
        .send(RequestSpec::get("/users/me"))
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Unauthorized { status: 401, .. }));
    assert_eq!(harness.api.refresh_calls(), 0);
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
}

#[tokio::test]
async fn test_replay_rejected_again_is_terminal() {
    let harness = Harness::expired();
    harness.api.reject_always("/admin");

    let error = harness
        .client
        .send(RequestSpec::get("/admin"))
        .await
        .unwrap_err();

    assert!(matches!(error, ClientError::Unauthorized { status: 401, .. }));
    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.api.requests_to("/admin").len(), 2);
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
}

#[tokio::test]
async fn test_queued_replay_rejected_again_is_terminal() {
    let harness = Harness::expired();
    harness.api.reject_always("/admin");
    let gate = harness.api.gate_refresh();

    let owner = harness.spawn_get("/wishlist");
    wait_until(|| harness.client.is_refreshing()).await;
    let queued = harness.spawn_get("/admin");
    wait_until(|| harness.client.queued_requests() == 1).await;
    gate.add_permits(1);

    let owner = owner.await.unwrap().unwrap();
    assert_eq!(token_in_body(&owner).as_deref(), Some("T2"));

    let error = queued.await.unwrap().unwrap_err();
    assert!(matches!(error, ClientError::Unauthorized { status: 401, .. }));
    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.api.requests_to("/admin").len(), 2);
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_logout_during_refresh_is_not_undone() {
    let harness = Harness::expired();
    let gate = harness.api.gate_refresh();

    let owner = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;
    let queued = harness.spawn_get("/exhibitions/2");
    wait_until(|| harness.client.queued_requests() == 1).await;

    harness.session.logout().await.unwrap();
    gate.add_permits(1);

    for handle in [owner, queued] {
        let error = handle.await.unwrap().unwrap_err();
        assert_eq!(error, ClientError::RefreshFailed(RefreshError::SessionEnded));
    }

    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.api.requests_to("/exhibitions/1").len(), 1);
    assert_eq!(harness.api.requests_to("/exhibitions/2").len(), 1);
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_new_login_during_refresh_is_kept() {
    let harness = Harness::expired();
    let gate = harness.api.gate_refresh();

    let owner = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;

    harness.session.replace(logged_in("T9", "R9")).await;
    gate.add_permits(1);

    let error = owner.await.unwrap().unwrap_err();
    assert_eq!(error, ClientError::RefreshFailed(RefreshError::SessionEnded));

    let session = harness.session.session().await;
    assert_eq!(session.access_token.as_deref(), Some("T9"));
    assert_eq!(session.refresh_token.as_deref(), Some("R9"));
}

#[tokio::test]
async fn test_unreachable_refresh_endpoint_ends_session() {
    let api = MockApi::new("T-current", RefreshBehavior::Unreachable);
    let harness = Harness::new(api, logged_in("T1", "R1"));

    let error = harness
        .client
        .send(RequestSpec::get("/wishlist"))
        .await
        .unwrap_err();

    assert!(
        matches!(error, ClientError::RefreshFailed(RefreshError::Transport(_))),
        "unexpected error: {error:?}"
    );
    assert_eq!(harness.api.refresh_calls(), 1);
    assert_eq!(harness.api.requests_to("/wishlist").len(), 1);
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_malformed_refresh_response_ends_session() {
    let api = MockApi::new("T-current", RefreshBehavior::Malformed);
    let harness = Harness::new(api, logged_in("T1", "R1"));
    let gate = harness.api.gate_refresh();

    let owner = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;
    let queued = harness.spawn_get("/exhibitions/2");
    wait_until(|| harness.client.queued_requests() == 1).await;
    gate.add_permits(1);

    for handle in [owner, queued] {
        let error = handle.await.unwrap().unwrap_err();
        assert!(
            matches!(error, ClientError::RefreshFailed(RefreshError::InvalidResponse(_))),
            "unexpected error: {error:?}"
        );
    }
    assert_eq!(harness.session.session().await, Session::anonymous());
    assert_eq!(harness.navigator.redirects(), vec!["/auth/login".to_string()]);
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_already_replayed_request_is_not_refreshed() {
    let harness = Harness::expired();

    let replay = RequestSpec::get("/wishlist").replay_with("T1");
    let error = harness.client.send(replay).await.unwrap_err();

    assert!(matches!(error, ClientError::Unauthorized { .. }));
    assert_eq!(harness.api.refresh_calls(), 0);
}

#[tokio::test]
async fn test_dropped_refresh_owner_releases_queue() {
    let harness = Harness::expired();
    let _gate = harness.api.gate_refresh();

    let owner = harness.spawn_get("/exhibitions/1");
    wait_until(|| harness.client.is_refreshing()).await;
    let queued = harness.spawn_get("/exhibitions/2");
    wait_until(|| harness.client.queued_requests() == 1).await;

    owner.abort();
    assert!(owner.await.unwrap_err().is_cancelled());

    let error = queued.await.unwrap().unwrap_err();
    assert_eq!(error, ClientError::RefreshFailed(RefreshError::Aborted));
    assert!(!harness.client.is_refreshing());
}

#[tokio::test]
async fn test_non_auth_failures_pass_through() {
    let api = MockApi::new("T1", RefreshBehavior::Fail(500));
    api.respond(
        popspot_domain::HttpMethod::Get,
        "/exhibitions/99",
        popspot_domain::ResponseSpec::json_body(500, &serde_json::json!({ "error": "boom" })),
    );
    let harness = Harness::new(api, logged_in("T1", "R1"));

    let response = harness
        .client
        .send(RequestSpec::get("/exhibitions/99"))
        .await
        .unwrap();
    assert_eq!(response.status.as_u16(), 500);

    let error = harness
        .client
        .send(RequestSpec::get("/offline"))
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::Transport(_)));

    assert_eq!(harness.api.refresh_calls(), 0);
    assert!(harness.navigator.redirects().is_empty());
    assert!(harness.session.session().await.is_authenticated);
}

#[tokio::test]
async fn test_invalid_path_is_rejected_before_sending() {
    let harness = Harness::expired();
    let error = harness
        .client
        .send(RequestSpec::get("no-leading-slash"))
        .await
        .unwrap_err();
    assert!(matches!(error, ClientError::InvalidRequest(_)));
    assert!(harness.api.requests().is_empty());
}
