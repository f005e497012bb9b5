mod common;

use std::time::Duration;

use common::{recording_min_len, service};
use futures::FutureExt;
use quick_input::{KeyCode, QuickInputError, TextInputOptions, ViewUpdate};

const DEFAULT_MESSAGE: &str = "Press 'Enter' to confirm your input or 'Escape' to cancel";

#[tokio::test(start_paused = true)]
async fn bursts_are_validated_once_with_the_last_value() {
    let (service, _view) = service();
    let (options, calls) = recording_min_len(1);
    let promise = service.input(options);
    assert_eq!(calls.lock().as_slice(), [""]);

    for value in ["v1", "v2", "v3", "v4", "v5"] {
        service.set_value(value);
        tokio::time::sleep(Duration::from_millis(20)).await;
    }
    tokio::time::sleep(Duration::from_millis(200)).await;
    assert_eq!(calls.lock().as_slice(), ["", "v5"]);

    for value in ["a", "b", "c"] {
        service.set_value(value);
        tokio::time::sleep(Duration::from_millis(150)).await;
    }
    assert_eq!(calls.lock().as_slice(), ["", "v5", "a", "b", "c"]);

    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
}

#[tokio::test(start_paused = true)]
async fn superseded_validation_results_are_never_shown() {
    let (service, view) = service();
    let promise = service.input(TextInputOptions::new().validate_async(|value| async move {
        let delay = if value == "ab" { 300 } else { 50 };
        tokio::time::sleep(Duration::from_millis(delay)).await;
        Ok::<_, anyhow::Error>((value == "ab").then(|| "ab is taken".to_string()))
    }));

    service.set_value("ab");
    tokio::time::sleep(Duration::from_millis(150)).await;
    service.set_value("abc");
    tokio::time::sleep(Duration::from_millis(600)).await;

    assert!(!view
        .updates()
        .contains(&ViewUpdate::Message("ab is taken".into())));
    assert_eq!(view.last_message().as_deref(), Some(DEFAULT_MESSAGE));

    service.accept().await;
    assert_eq!(promise.await.expect("ok").as_deref(), Some("abc"));
}

#[tokio::test(start_paused = true)]
async fn returning_to_a_value_after_its_result_was_discarded_shows_its_error() {
    let (service, view) = service();
    let promise = service.input(TextInputOptions::new().validate_async(|value| async move {
        tokio::time::sleep(Duration::from_millis(50)).await;
        Ok::<_, anyhow::Error>((value == "ab").then(|| "ab is taken".to_string()))
    }));

    service.set_value("ab");
    tokio::time::sleep(Duration::from_millis(120)).await;
    service.set_value("abc");
    tokio::time::sleep(Duration::from_millis(40)).await;
    service.set_value("ab");
    tokio::time::sleep(Duration::from_millis(500)).await;

    assert_eq!(view.last_message().as_deref(), Some("ab is taken"));
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
}

#[test]
fn typing_without_a_runtime_does_not_panic() {
    let (service, view) = service();
    let (options, calls) = recording_min_len(1);
    let _promise = service.input(options);
    service.set_value("x");
    assert!(service.is_displayed());
    assert_eq!(calls.lock().as_slice(), [""]);
    service.cancel();
    assert!(!service.is_displayed());
    assert_eq!(view.hide_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn failing_confirmation_keeps_the_session_open() {
    let (service, view) = service();
    let (options, _calls) = recording_min_len(3);
    let mut promise = service.input(options.prompt("Tag"));

    service.set_value("ab");
    service.accept().await;
    assert!(service.is_displayed());
    assert!((&mut promise).now_or_never().is_none());
    assert_eq!(
        view.last_message().as_deref(),
        Some("at least 3 characters")
    );
    assert_eq!(
        view.last_input().map(|input| input.severity),
        Some(quick_input::input_box::Severity::Error)
    );

    service.set_value("abc");
    service.key_down(KeyCode::Enter.into()).await;
    assert_eq!(promise.await.expect("ok").as_deref(), Some("abc"));
    assert_eq!(view.hide_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn confirming_mid_burst_validates_the_typed_value_once() {
    let (service, _view) = service();
    let (options, calls) = recording_min_len(2);
    let promise = service.input(options);
    service.set_value("a");
    service.set_value("ab");
    service.accept().await;
    assert_eq!(promise.await.expect("ok").as_deref(), Some("ab"));
    tokio::time::sleep(Duration::from_millis(500)).await;
    assert_eq!(calls.lock().as_slice(), ["", "ab"]);
}

#[tokio::test(start_paused = true)]
async fn rejected_confirmation_can_still_be_cancelled() {
    let (service, _view) = service();
    let (options, _calls) = recording_min_len(5);
    let promise = service.input(options.value("abc"));
    service.accept().await;
    assert!(service.is_displayed());
    service.key_down(KeyCode::Escape.into()).await;
    assert_eq!(promise.await.expect("ok"), None);
}

#[tokio::test(start_paused = true)]
async fn value_change_during_confirmation_is_refused() {
    let (service, _view) = service();
    let mut promise = service.input(TextInputOptions::new().validate_async(|_value| async {
        tokio::time::sleep(Duration::from_millis(100)).await;
        Ok::<_, anyhow::Error>(None)
    }));

    let confirming = {
        let service = service.clone();
        tokio::spawn(async move { service.accept().await })
    };
    tokio::time::sleep(Duration::from_millis(10)).await;
    service.set_value("changed");
    confirming.await.expect("confirm task");

    assert!((&mut promise).now_or_never().is_none());
    assert!(service.is_displayed());
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
}

#[tokio::test(start_paused = true)]
async fn validator_failure_rejects_the_session() {
    let (service, view) = service();
    let promise = service.input(
        TextInputOptions::new()
            .validate_async(|_value| async { Err(anyhow::anyhow!("validator crashed")) }),
    );
    let outcome = promise.await;
    assert!(matches!(outcome, Err(QuickInputError::Unexpected(_))));
    assert!(!service.is_displayed());
    assert_eq!(view.hide_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn initial_value_is_validated_immediately() {
    let (service, view) = service();
    let (options, calls) = recording_min_len(4);
    let _promise = service.input(options.value("abc").value_selection(0..2));
    assert_eq!(calls.lock().as_slice(), ["abc"]);
    let input = view.last_input().expect("input published");
    assert_eq!(input.selection, Some(0..2));

    tokio::time::sleep(Duration::from_millis(1)).await;
    assert_eq!(
        view.last_message().as_deref(),
        Some("at least 4 characters")
    );
}
