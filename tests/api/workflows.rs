use crate::helpers::{json_body, subscription_body, TestApp};
use claims::assert_ok_eq;
use serde_json::{json, Value};
use subtrack::{
    reminder_workflow::{try_execute_task, ExecutionOutcome},
    repo::RemindersRepo,
};
use time::{format_description::well_known::Rfc3339, Duration, OffsetDateTime};
use uuid::Uuid;
use wiremock::{
    matchers::{any, method, path},
    Mock, ResponseTemplate,
};

fn id_of(subscription: &Value) -> Uuid {
    Uuid::parse_str(subscription["id"].as_str().unwrap()).unwrap()
}

fn renewal_of(subscription: &Value) -> OffsetDateTime {
    OffsetDateTime::parse(subscription["renewalDate"].as_str().unwrap(), &Rfc3339).unwrap()
}

async fn trigger(app: &TestApp, subscription_id: impl serde::Serialize) -> reqwest::Response {
    app.post_workflow(
        "/workflows/subscription/reminder",
        &json!({ "subscriptionId": subscription_id }),
        Some(&app.workflow_secret),
    )
    .await
}

#[tokio::test]
async fn creating_a_subscription_plans_four_reminders() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;

    // when
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;

    // then
    let renewal_date = renewal_of(&subscription);
    let pending = RemindersRepo::pending_for(&app.db_pool, id_of(&subscription))
        .await
        .unwrap();
    let expected: Vec<_> = [7, 5, 3, 1]
        .into_iter()
        .map(|days: i16| (days, renewal_date - Duration::days(days.into())))
        .collect();
    assert_eq!(pending, expected);
}

#[tokio::test]
async fn replaying_the_trigger_plans_nothing_new() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;

    // when
    let response = trigger(&app, subscription["id"].clone()).await;

    // then
    assert_eq!(response.status(), 200);
    let body = json_body(response).await;
    assert_eq!(body["success"], true);
    assert_eq!(
        body["data"],
        json!({ "outcome": "scheduled", "plannedReminders": 0 })
    );
    let pending = RemindersRepo::pending_for(&app.db_pool, id_of(&subscription))
        .await
        .unwrap();
    assert_eq!(pending.len(), 4);
}

#[tokio::test]
async fn trigger_stops_quietly_for_missing_or_inactive_subscriptions() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let expired = app.create_subscription(&user, &subscription_body(40)).await;

    // when
    let missing = json_body(trigger(&app, Uuid::new_v4()).await).await;
    let inactive = json_body(trigger(&app, expired["id"].clone()).await).await;

    // then
    assert_eq!(missing["data"]["outcome"], "subscription_missing");
    assert_eq!(inactive["data"]["outcome"], "inactive");
    let pending = RemindersRepo::pending_for(&app.db_pool, id_of(&expired))
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn trigger_returns_400_for_malformed_payloads() {
    // given
    let app = TestApp::spawn().await;

    for body in [json!({}), json!({ "subscriptionId": "42" })] {
        // when
        let response = app
            .post_workflow(
                "/workflows/subscription/reminder",
                &body,
                Some(&app.workflow_secret),
            )
            .await;

        // then
        assert_eq!(response.status(), 400);
    }
}

#[tokio::test]
async fn trigger_returns_401_without_the_workflow_secret() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;
    let body = json!({ "subscriptionId": subscription["id"] });

    for (secret, description) in [(None, "missing secret"), (Some("wrong-secret"), "wrong secret")] {
        // when
        let response = app
            .post_workflow("/workflows/subscription/reminder", &body, secret)
            .await;

        // then
        assert_eq!(
            response.status(),
            401,
            "The API did not reject a trigger with a {description}"
        );
        assert_eq!(json_body(response).await["success"], false);
    }
}

#[tokio::test]
async fn reminders_fire_in_order_and_never_early() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;
    let renewal_date = renewal_of(&subscription);

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(4)
        .mount(&app.email_server)
        .await;

    // when
    let before_first = renewal_date - Duration::days(7) - Duration::seconds(1);
    let after_first = renewal_date - Duration::days(7);
    let at_renewal = renewal_date;

    // then
    assert_ok_eq!(
        try_execute_task(&app.db_pool, &app.email_client, before_first).await,
        ExecutionOutcome::EmptyQueue
    );
    assert_ok_eq!(
        try_execute_task(&app.db_pool, &app.email_client, after_first).await,
        ExecutionOutcome::TaskCompleted
    );
    assert_ok_eq!(
        try_execute_task(&app.db_pool, &app.email_client, after_first).await,
        ExecutionOutcome::EmptyQueue
    );
    for _ in 0..3 {
        assert_ok_eq!(
            try_execute_task(&app.db_pool, &app.email_client, at_renewal).await,
            ExecutionOutcome::TaskCompleted
        );
    }
    assert_ok_eq!(
        try_execute_task(&app.db_pool, &app.email_client, at_renewal).await,
        ExecutionOutcome::EmptyQueue
    );

    let subjects: Vec<String> = app
        .email_server
        .received_requests()
        .await
        .unwrap()
        .iter()
        .map(|request| {
            let body: Value = serde_json::from_slice(&request.body).unwrap();
            body["Subject"].as_str().unwrap().to_owned()
        })
        .collect();
    let expected: Vec<String> = [7, 5, 3, 1]
        .iter()
        .map(|days| {
            format!("Reminder: your Netflix Premium subscription renews in {days} day(s)")
        })
        .collect();
    assert_eq!(subjects, expected);

    let recipient = {
        let requests = app.email_server.received_requests().await.unwrap();
        let body: Value = serde_json::from_slice(&requests[0].body).unwrap();
        body["To"].clone()
    };
    assert_eq!(recipient, user.email);
}

#[tokio::test]
async fn canceled_subscriptions_are_not_reminded() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;
    app.put(
        &format!("/subscriptions/{}/cancel", id_of(&subscription)),
        &json!({}),
        Some(&user.token),
    )
    .await;

    Mock::given(any())
        .respond_with(ResponseTemplate::new(200))
        .expect(0)
        .mount(&app.email_server)
        .await;

    // when
    for _ in 0..4 {
        assert_ok_eq!(
            try_execute_task(&app.db_pool, &app.email_client, renewal_of(&subscription)).await,
            ExecutionOutcome::TaskCompleted
        );
    }

    // then
    let pending = RemindersRepo::pending_for(&app.db_pool, id_of(&subscription))
        .await
        .unwrap();
    assert!(pending.is_empty());
}

#[tokio::test]
async fn failed_deliveries_are_retried_later() {
    // given
    let app = TestApp::spawn().await;
    let user = app.register_user().await;
    let subscription = app.create_subscription(&user, &subscription_body(20)).await;
    let now = renewal_of(&subscription) - Duration::days(7);

    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(500))
        .up_to_n_times(1)
        .expect(1)
        .mount(&app.email_server)
        .await;
    Mock::given(path("/email"))
        .and(method("POST"))
        .respond_with(ResponseTemplate::new(200))
        .expect(1)
        .mount(&app.email_server)
        .await;

    // when
    let first = try_execute_task(&app.db_pool, &app.email_client, now).await;
    let too_soon = try_execute_task(&app.db_pool, &app.email_client, now).await;
    let retried =
        try_execute_task(&app.db_pool, &app.email_client, now + Duration::minutes(1)).await;

    // then
    assert_ok_eq!(first, ExecutionOutcome::TaskRescheduled);
    assert_ok_eq!(too_soon, ExecutionOutcome::EmptyQueue);
    assert_ok_eq!(retried, ExecutionOutcome::TaskCompleted);
    let pending = RemindersRepo::pending_for(&app.db_pool, id_of(&subscription))
        .await
        .unwrap();
    assert_eq!(pending.len(), 3);
}
