mod common;

use std::time::Duration;

use common::{items, labels, service, slow_items};
use expect_test::expect;
use futures::FutureExt;
use quick_input::{
    CancellationTokenSource, InputKind, InputParameters, KeyCode, KeyEvent, PickManyOptions,
    PickOneOptions, QuickInputValue, QuickNavigateConfiguration, TextInputOptions, ViewUpdate,
};

#[tokio::test(start_paused = true)]
async fn cancel_before_work_resolves_settles_with_nothing_in_every_mode() {
    let (service, view) = service();

    let one = service.pick_one(PickOneOptions::new(slow_items(
        &["a"],
        Duration::from_millis(500),
    )));
    service.cancel();
    assert_eq!(one.await.expect("pick one"), None);

    let many = service.pick_many(PickManyOptions::new(slow_items(
        &["a"],
        Duration::from_millis(500),
    )));
    service.cancel();
    assert_eq!(many.await.expect("pick many"), None);

    let text = service.input(TextInputOptions::new().validate_async(|_value| async {
        tokio::time::sleep(Duration::from_millis(500)).await;
        Ok::<_, anyhow::Error>(None)
    }));
    service.cancel();
    assert_eq!(text.await.expect("text input"), None);

    let hides = view.hide_count();
    view.take();
    tokio::time::sleep(Duration::from_secs(1)).await;
    assert_eq!(hides, 3);
    assert!(view.updates().is_empty(), "late work reached the view");
}

#[tokio::test]
async fn new_session_settles_the_previous_one_first() {
    let (service, view) = service();
    let first = service.pick_one(PickOneOptions::new(items(&["a", "b"])));
    view.take();

    let mut second = service.input(TextInputOptions::new().prompt("Name"));
    assert_eq!(
        first.now_or_never().expect("first settled").expect("ok"),
        None
    );
    assert!((&mut second).now_or_never().is_none());
    assert_eq!(service.active_kind(), Some(InputKind::TextInput));

    let updates = view.take();
    assert_eq!(
        updates[0],
        ViewUpdate::Show {
            kind: InputKind::TextInput
        }
    );
    assert!(matches!(updates[1], ViewUpdate::Regions(regions) if regions.message && !regions.list));
    assert!(!updates
        .iter()
        .any(|update| matches!(update, ViewUpdate::Hide { .. })));

    service.cancel();
    assert_eq!(second.await.expect("ok"), None);
}

#[tokio::test]
async fn show_with_a_cancelled_token_still_settles_the_previous_session() {
    let (service, view) = service();
    let first = service.pick_one(PickOneOptions::new(items(&["a"])));
    let source = CancellationTokenSource::new();
    source.cancel();

    let second = service.input_with_token(TextInputOptions::new(), source.token());
    assert_eq!(first.await.expect("first"), None);
    assert_eq!(second.await.expect("second"), None);
    assert!(!service.is_displayed());
    assert_eq!(service.active_kind(), None);
    assert_eq!(view.hide_count(), 1);
}

#[tokio::test]
async fn closing_twice_hides_once() {
    let (service, view) = service();
    let promise = service.pick_many(PickManyOptions::new(items(&["a"])));
    service.close(false).await;
    service.close(false).await;
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
    assert_eq!(view.hide_count(), 1);
}

#[tokio::test(start_paused = true)]
async fn busy_indicator_appears_after_the_delay_and_clears_on_delivery() {
    let (service, view) = service();
    let promise = service.pick_one(PickOneOptions::new(slow_items(
        &["x", "y"],
        Duration::from_secs(2),
    )));

    tokio::time::sleep(Duration::from_millis(799)).await;
    assert!(!view.updates().contains(&ViewUpdate::Busy(true)));
    tokio::time::sleep(Duration::from_millis(2)).await;
    assert!(view.updates().contains(&ViewUpdate::Busy(true)));

    tokio::time::sleep(Duration::from_secs(2)).await;
    let updates = view.updates();
    let cleared = updates
        .iter()
        .position(|update| *update == ViewUpdate::Busy(false))
        .expect("busy cleared");
    let listed = updates
        .iter()
        .rposition(|update| matches!(update, ViewUpdate::List(rows) if rows.len() == 2))
        .expect("candidates listed");
    assert!(cleared < listed);

    service.accept().await;
    let picked = promise.await.expect("ok").expect("picked");
    assert_eq!(picked.label, "x");
}

#[tokio::test(start_paused = true)]
async fn fast_candidates_never_show_busy() {
    let (service, view) = service();
    let promise = service.pick_many(PickManyOptions::new(slow_items(
        &["x"],
        Duration::from_millis(300),
    )));
    tokio::time::sleep(Duration::from_secs(2)).await;
    assert!(!view
        .updates()
        .iter()
        .any(|update| matches!(update, ViewUpdate::Busy(_))));
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
}

#[tokio::test(start_paused = true)]
async fn cancelling_while_busy_clears_the_indicator() {
    let (service, view) = service();
    let promise = service.pick_one(PickOneOptions::new(slow_items(
        &["x"],
        Duration::from_secs(5),
    )));
    tokio::time::sleep(Duration::from_secs(1)).await;
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
    let updates = view.take();
    assert_eq!(
        &updates[updates.len() - 2..],
        [
            ViewUpdate::Busy(false),
            ViewUpdate::Hide {
                restore_focus: true
            }
        ]
    );
}

#[tokio::test]
async fn check_all_tracks_visible_items() {
    let (service, view) = service();
    let promise = service.pick_many(PickManyOptions::new(items(&[
        "apple", "apricot", "banana",
    ])));

    service.set_value("ap");
    view.take();
    service.set_check_all(true);
    let updates = view.take();
    assert!(updates.contains(&ViewUpdate::CheckAll(true)));
    assert!(updates.contains(&ViewUpdate::Count(2)));

    service.set_item_checked(0, false);
    let updates = view.take();
    assert!(updates.contains(&ViewUpdate::CheckAll(false)));
    assert!(updates.contains(&ViewUpdate::Count(1)));

    service.set_value("");
    service.accept().await;
    let picked = promise.await.expect("ok").expect("picked");
    assert_eq!(labels(&picked), ["apricot"]);
}

#[tokio::test]
async fn pick_many_transcript() {
    let (service, view) = service();
    let promise = service.pick_many(
        PickManyOptions::new(items(&["red", "green", "blue"])).message("Pick colors"),
    );
    service.key_down(KeyCode::Down.into()).await;
    service.key_down(KeyCode::Down.into()).await;
    service.key_down(KeyCode::Space.into()).await;
    service.set_check_all(true);
    service.key_down(KeyCode::Enter.into()).await;

    let picked = promise.await.expect("ok").expect("picked");
    assert_eq!(labels(&picked), ["red", "green", "blue"]);
    expect![[r#"
        show pickMany
        regions check_all,input,count,ok,list,message
        input ""
        message "Pick colors"
        list []
        check_all false
        count 0
        list [>red, green, blue]
        focus input
        focus list
        list [>red, green, blue]
        list [red, >green, blue]
        count 1
        list [red, >[x]green, blue]
        check_all true
        count 3
        list [[x]red, >[x]green, [x]blue]
        hide restore_focus=true
    "#]]
    .assert_eq(&view.transcript());
}

#[tokio::test]
async fn selecting_a_row_accepts_it() {
    let (service, _view) = service();
    let promise = service.pick_one(PickOneOptions::new(items(&["a", "b", "c"])));
    service.select_item(2).await;
    let picked = promise.await.expect("ok").expect("picked");
    assert_eq!(picked.label, "c");
}

#[tokio::test]
async fn quick_navigate_accepts_on_modifier_release() {
    let (service, _view) = service();
    let promise = service.pick_one(PickOneOptions::new(items(&["a", "b", "c"])));
    let config = QuickNavigateConfiguration::new(vec!["ctrl+p".parse().expect("binding")]);
    service.navigate(true, Some(config));
    service.key_up(KeyEvent::new(KeyCode::Shift)).await;
    assert!(service.is_displayed());
    service.key_up(KeyEvent::new(KeyCode::Ctrl)).await;
    let picked = promise.await.expect("ok").expect("picked");
    assert_eq!(picked.label, "b");
}

#[tokio::test]
async fn show_wraps_results_by_mode() {
    let (service, _view) = service();
    let promise = service.show(InputParameters::TextInput(
        TextInputOptions::new().value("draft"),
    ));
    service.accept().await;
    assert_eq!(
        promise.await.expect("ok"),
        Some(QuickInputValue::Text("draft".into()))
    );

    let promise = service.show(InputParameters::PickMany(
        PickManyOptions::new(vec![
            quick_input::PickItem::new("kept").with_picked(true),
            quick_input::PickItem::new("dropped"),
        ]),
    ));
    service.accept().await;
    let Some(QuickInputValue::Many(picked)) = promise.await.expect("ok") else {
        panic!("expected a pick-many result");
    };
    assert_eq!(labels(&picked), ["kept"]);
}

#[tokio::test]
async fn focus_callback_sees_every_focused_item() {
    let seen = std::sync::Arc::new(parking_lot::Mutex::new(Vec::new()));
    let (service, _view) = service();
    let promise = service.pick_one(PickOneOptions::new(items(&["a", "b"])).on_did_focus({
        let seen = std::sync::Arc::clone(&seen);
        move |item| seen.lock().push(item.label.to_string())
    }));
    service.navigate(true, None);
    service.set_value("a");
    service.cancel();
    assert_eq!(promise.await.expect("ok"), None);
    assert_eq!(seen.lock().as_slice(), ["a", "b", "a"]);
}
