#![allow(dead_code)]

use std::sync::Arc;
use std::time::Duration;

use parking_lot::Mutex;
use quick_input::{
    ItemsSource, PickItem, QuickInputConfig, QuickInputService, RecordingView, TextInputOptions,
};

pub fn service() -> (QuickInputService<PickItem>, RecordingView) {
    let view = RecordingView::new();
    let service = QuickInputService::new(view.clone(), QuickInputConfig::default());
    (service, view)
}

pub fn items(labels: &[&str]) -> Vec<PickItem> {
    labels.iter().map(|label| PickItem::new(*label)).collect()
}

/// Candidates delivered after `delay`.
pub fn slow_items(labels: &[&str], delay: Duration) -> ItemsSource<PickItem> {
    let items = items(labels);
    ItemsSource::from_future(async move {
        tokio::time::sleep(delay).await;
        Ok(items)
    })
}

pub fn labels(items: &[PickItem]) -> Vec<String> {
    items.iter().map(|item| item.label.to_string()).collect()
}

/// A synchronous validator that records every value it sees and rejects
/// values shorter than `min`.
pub fn recording_min_len(min: usize) -> (TextInputOptions, Arc<Mutex<Vec<String>>>) {
    let calls = Arc::new(Mutex::new(Vec::new()));
    let options = TextInputOptions::new().validate_with({
        let calls = Arc::clone(&calls);
        move |value| {
            calls.lock().push(value.to_string());
            (value.chars().count() < min).then(|| format!("at least {min} characters"))
        }
    });
    (options, calls)
}
