//! The modal quick input controller.
//!
//! One [`QuickInputService`] drives one widget. At most one session is wired
//! to the widget at a time; starting a session settles the previous one with
//! no result first. Every session gets a fresh generation number, and async
//! work (candidate loads, validator runs, busy timers, debounced values)
//! carries the generation it was started for. Work finishing for an older
//! generation is dropped.

#![cfg_attr(not(test), deny(clippy::unwrap_used))]

use std::collections::VecDeque;
use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use parking_lot::{Mutex, MutexGuard};
use tracing::{debug, trace, warn};

use crate::cancellation::{CancellationToken, CancellationTokenSource};
use crate::config::QuickInputConfig;
use crate::debounce::Debouncer;
use crate::deferred::{deferred, timeout, ResultPromise};
use crate::error::{LogReporter, QuickInputError, UnexpectedErrorReporter};
use crate::event::{Disposable, DisposableStore};
use crate::item::QuickPickItem;
use crate::keys::{KeyCode, KeyEvent, QuickNavigateConfiguration};
use crate::params::{
    InputKind, InputParameters, PickManyOptions, PickOneOptions, QuickInputValue,
    TextInputOptions,
};
use crate::strategy::{
    InputStrategy, PendingConfirm, PickManyStrategy, PickOneStrategy, ResolveOutcome,
    TextInputStrategy,
};
use crate::surface::{Effect, Surface};
use crate::view::{Dimension, FocusRegion, LayoutMetrics, QuickInputView, ViewUpdate};

/// Quick input controller for items of type `T`.
pub struct QuickInputService<T> {
    inner: Arc<ServiceInner<T>>,
}

impl<T> Clone for QuickInputService<T> {
    fn clone(&self) -> Self {
        Self {
            inner: Arc::clone(&self.inner),
        }
    }
}

struct ServiceInner<T> {
    state: Mutex<ServiceState<T>>,
    outbox: Mutex<VecDeque<Effect<T>>>,
    draining: AtomicBool,
    view: Arc<dyn QuickInputView>,
    reporter: Arc<dyn UnexpectedErrorReporter>,
    config: QuickInputConfig,
}

struct ServiceState<T> {
    surface: Surface<T>,
    session: Option<Session<T>>,
    next_generation: u64,
    displayed: bool,
    layout: Option<LayoutMetrics>,
}

struct Session<T> {
    generation: u64,
    kind: InputKind,
    strategy: Box<dyn InputStrategy<T>>,
    /// Released when the session ends.
    store: DisposableStore,
    /// Cancelled once candidates arrived or the session ended.
    ready: CancellationTokenSource,
    busy_shown: bool,
    ignore_focus_lost: bool,
    debouncer: Option<Debouncer<String>>,
}

impl<T: QuickPickItem> QuickInputService<T> {
    pub fn new(view: impl QuickInputView + 'static, config: QuickInputConfig) -> Self {
        Self::with_reporter(view, config, LogReporter)
    }

    pub fn with_reporter(
        view: impl QuickInputView + 'static,
        config: QuickInputConfig,
        reporter: impl UnexpectedErrorReporter + 'static,
    ) -> Self {
        Self {
            inner: Arc::new(ServiceInner {
                state: Mutex::new(ServiceState {
                    surface: Surface::new(),
                    session: None,
                    next_generation: 0,
                    displayed: false,
                    layout: None,
                }),
                outbox: Mutex::new(VecDeque::new()),
                draining: AtomicBool::new(false),
                view: Arc::new(view),
                reporter: Arc::new(reporter),
                config,
            }),
        }
    }

    pub fn config(&self) -> &QuickInputConfig {
        &self.inner.config
    }

    pub fn show(&self, parameters: InputParameters<T>) -> ResultPromise<QuickInputValue<T>> {
        self.show_with_token(parameters, CancellationToken::none())
    }

    pub fn show_with_token(
        &self,
        parameters: InputParameters<T>,
        token: CancellationToken,
    ) -> ResultPromise<QuickInputValue<T>> {
        match parameters {
            InputParameters::PickOne(options) => self
                .pick_one_with_token(options, token)
                .map(QuickInputValue::One),
            InputParameters::PickMany(options) => self
                .pick_many_with_token(options, token)
                .map(QuickInputValue::Many),
            InputParameters::TextInput(options) => self
                .input_with_token(options, token)
                .map(QuickInputValue::Text),
        }
    }

    pub fn pick_one(&self, options: PickOneOptions<T>) -> ResultPromise<T> {
        self.pick_one_with_token(options, CancellationToken::none())
    }

    pub fn pick_one_with_token(
        &self,
        options: PickOneOptions<T>,
        token: CancellationToken,
    ) -> ResultPromise<T> {
        let ignore_focus_lost = options.ignore_focus_lost;
        let (settler, promise) = deferred();
        self.inner.open(
            Box::new(PickOneStrategy::new(options, settler)),
            ignore_focus_lost,
            &token,
        );
        promise
    }

    pub fn pick_many(&self, options: PickManyOptions<T>) -> ResultPromise<Vec<T>> {
        self.pick_many_with_token(options, CancellationToken::none())
    }

    pub fn pick_many_with_token(
        &self,
        options: PickManyOptions<T>,
        token: CancellationToken,
    ) -> ResultPromise<Vec<T>> {
        let ignore_focus_lost = options.ignore_focus_lost;
        let (settler, promise) = deferred();
        self.inner.open(
            Box::new(PickManyStrategy::new(options, settler)),
            ignore_focus_lost,
            &token,
        );
        promise
    }

    pub fn input(&self, options: TextInputOptions) -> ResultPromise<String> {
        self.input_with_token(options, CancellationToken::none())
    }

    pub fn input_with_token(
        &self,
        options: TextInputOptions,
        token: CancellationToken,
    ) -> ResultPromise<String> {
        let ignore_focus_lost = options.ignore_focus_lost;
        let (settler, promise) = deferred();
        self.inner.open(
            Box::new(TextInputStrategy::new(options, settler)),
            ignore_focus_lost,
            &token,
        );
        promise
    }

    /// Confirms the active session.
    pub async fn accept(&self) {
        self.close(true).await;
    }

    /// Resolves the active session. A confirmation may wait for a validator
    /// run; it is refused (and the session stays open) if the validator
    /// reports a problem or the value changed meanwhile. Without a session a
    /// still visible widget is hidden.
    pub async fn close(&self, confirmed: bool) {
        self.close_generation(None, confirmed).await;
    }

    async fn close_generation(&self, generation: Option<u64>, confirmed: bool) {
        if confirmed {
            self.inner.flush_pending_value(generation);
        }
        let Some((generation, pending)) = self.inner.begin_close(generation, confirmed) else {
            return;
        };
        let outcome = pending.validation.await;
        self.inner
            .finish_confirm(generation, pending.requested, outcome);
    }

    /// Dismisses the active session with no result. Never fails.
    pub fn cancel(&self) {
        let mut guard = self.inner.state.lock();
        guard.dismiss(true);
        self.inner.commit(guard);
    }

    /// The widget lost focus. Closes the session unless it opted out or the
    /// widget is configured to stay open.
    pub fn focus_lost(&self) {
        let mut guard = self.inner.state.lock();
        let sticky = !self.inner.config.behavior.close_on_focus_lost;
        match guard.session.as_ref() {
            Some(session) if session.ignore_focus_lost || sticky => {
                trace!(generation = session.generation, "quick input: focus lost ignored");
            }
            _ => guard.dismiss(false),
        }
        self.inner.commit(guard);
    }

    pub fn set_value(&self, value: impl Into<String>) {
        let value = value.into();
        let mut guard = self.inner.state.lock();
        let Some((session, surface)) = guard.current() else {
            return;
        };
        if surface.input.value == value {
            return;
        }
        surface.input.set_value(value.clone());
        session.strategy.on_value_changed(surface);
        let debouncer = session.debouncer.clone();
        self.inner.commit(guard);
        if let Some(debouncer) = debouncer {
            debouncer.trigger(value);
        }
    }

    /// Enter accepts and Escape cancels; other keys go to the active mode.
    pub async fn key_down(&self, key: KeyEvent) {
        match key.code {
            KeyCode::Enter => self.accept().await,
            KeyCode::Escape => self.cancel(),
            _ => {
                self.inner.with_session(|session, surface| {
                    session.strategy.on_key_down(surface, &key);
                });
            }
        }
    }

    /// Releasing a quick-navigate modifier accepts the focused item.
    pub async fn key_up(&self, key: KeyEvent) {
        let generation = self.inner.with_session(|session, _| {
            session
                .strategy
                .confirms_on_key_up(&key)
                .then_some(session.generation)
        });
        if let Some(Some(generation)) = generation {
            self.close_generation(Some(generation), true).await;
        }
    }

    /// The user picked the visible row `row`: pick-one accepts it, pick-many
    /// toggles it.
    pub async fn select_item(&self, row: usize) {
        let generation = self.inner.with_session(|session, surface| {
            session
                .strategy
                .select_row(surface, row)
                .then_some(session.generation)
        });
        if let Some(Some(generation)) = generation {
            self.close_generation(Some(generation), true).await;
        }
    }

    pub fn set_item_checked(&self, row: usize, checked: bool) {
        self.inner.with_session(|session, surface| {
            session.strategy.set_item_checked(surface, row, checked);
        });
    }

    pub fn set_check_all(&self, checked: bool) {
        self.inner.with_session(|session, surface| {
            session.strategy.set_check_all(surface, checked);
        });
    }

    /// Toggles the focused pick-many row.
    pub fn toggle(&self) {
        self.inner.with_session(|session, surface| {
            session.strategy.toggle(surface);
        });
    }

    /// Moves list focus. The first `quick_navigate` configuration of a
    /// pick-one session is kept; later ones are ignored.
    pub fn navigate(&self, next: bool, quick_navigate: Option<QuickNavigateConfiguration>) {
        self.inner.with_session(|session, surface| {
            if let Some(config) = quick_navigate {
                session.strategy.configure_quick_navigate(config);
            }
            session.strategy.navigate(surface, next);
        });
    }

    /// Moves keyboard focus back to the input box.
    pub fn focus(&self) {
        self.inner.with_session(|_, surface| {
            if surface.focus() == FocusRegion::Input {
                surface.publish_focus();
            } else {
                surface.move_focus(FocusRegion::Input);
            }
        });
    }

    pub fn layout(&self, dimension: Dimension) {
        let metrics = LayoutMetrics::compute(dimension, &self.inner.config.layout);
        let mut guard = self.inner.state.lock();
        guard.layout = Some(metrics);
        if guard.displayed {
            guard.surface.push(ViewUpdate::Layout(metrics));
        }
        self.inner.commit(guard);
    }

    /// Ends any session and hides the widget.
    pub fn shutdown(&self) {
        debug!("quick input: shutting down");
        self.cancel();
    }

    pub fn is_displayed(&self) -> bool {
        self.inner.state.lock().displayed
    }

    pub fn active_kind(&self) -> Option<InputKind> {
        self.inner
            .state
            .lock()
            .session
            .as_ref()
            .map(|session| session.kind)
    }
}

impl<T: QuickPickItem> ServiceInner<T> {
    fn open(
        self: &Arc<Self>,
        mut strategy: Box<dyn InputStrategy<T>>,
        ignore_focus_lost: bool,
        token: &CancellationToken,
    ) {
        let kind = strategy.kind();
        let mut guard = self.state.lock();
        if token.is_cancellation_requested() {
            debug!(%kind, "quick input: token cancelled before showing");
            guard.dismiss(true);
            self.commit(guard);
            strategy.dismiss();
            return;
        }

        let state = &mut *guard;
        if let Some(mut previous) = state.session.take() {
            debug!(
                generation = previous.generation,
                "quick input: superseding active session"
            );
            previous.strategy.dismiss();
            retire(&mut state.surface, previous);
        }

        state.next_generation += 1;
        let generation = state.next_generation;
        let surface = &mut state.surface;
        surface.begin(generation);
        surface.push(ViewUpdate::Show { kind });
        surface.push(ViewUpdate::Regions(strategy.regions()));
        if let Some(layout) = state.layout {
            surface.push(ViewUpdate::Layout(layout));
        }
        state.displayed = true;
        let loader = strategy.attach(surface);
        surface.publish_focus();

        let debouncer = strategy.wants_validation().then(|| {
            let inner = Arc::downgrade(self);
            Debouncer::new(
                self.config.timing.validation_debounce,
                move |value: String| {
                    if let Some(inner) = inner.upgrade() {
                        inner.on_debounced_value(generation, &value);
                    }
                },
            )
        });
        let store = DisposableStore::new();
        if let Some(debouncer) = &debouncer {
            store.add(debouncer.clone());
        }
        let ready = CancellationTokenSource::new();
        if loader.is_none() {
            ready.cancel();
        }
        let ready_token = ready.token();
        state.session = Some(Session {
            generation,
            kind,
            strategy,
            store,
            ready,
            busy_shown: false,
            ignore_focus_lost,
            debouncer,
        });
        debug!(generation, %kind, "quick input: session started");
        self.commit(guard);

        let weak = Arc::downgrade(self);
        let subscription = token.on_cancellation_requested(move || {
            if let Some(inner) = weak.upgrade() {
                inner.cancel_generation(generation);
            }
        });
        let orphaned = {
            let state = self.state.lock();
            match state.session.as_ref() {
                Some(session) if session.generation == generation => {
                    session.store.add(subscription);
                    None
                }
                _ => Some(subscription),
            }
        };
        if let Some(subscription) = orphaned {
            subscription.dispose();
        }

        let Some(loader) = loader else {
            return;
        };
        let weak = Arc::downgrade(self);
        spawn(async move {
            let items = loader.await;
            if let Some(inner) = weak.upgrade() {
                inner.on_items_loaded(generation, items);
            }
        });
        let weak = Arc::downgrade(self);
        let delay = self.config.timing.progress_delay;
        spawn(async move {
            if timeout(delay, &ready_token).await.is_ok() {
                if let Some(inner) = weak.upgrade() {
                    inner.show_busy(generation);
                }
            }
        });
    }

    /// Runs `f` against the active session, if any.
    fn with_session<R>(
        self: &Arc<Self>,
        f: impl FnOnce(&mut Session<T>, &mut Surface<T>) -> R,
    ) -> Option<R> {
        let mut guard = self.state.lock();
        let (session, surface) = guard.current()?;
        let result = f(session, surface);
        self.commit(guard);
        Some(result)
    }

    /// Delivers a value still waiting in the debouncer so that a
    /// confirmation validates what is typed now.
    fn flush_pending_value(&self, expected: Option<u64>) {
        let debouncer = {
            let state = self.state.lock();
            state
                .session
                .as_ref()
                .filter(|session| expected.is_none_or(|expected| expected == session.generation))
                .and_then(|session| session.debouncer.clone())
        };
        if let Some(debouncer) = debouncer {
            debouncer.flush();
        }
    }

    fn begin_close(
        self: &Arc<Self>,
        expected: Option<u64>,
        confirmed: bool,
    ) -> Option<(u64, PendingConfirm)> {
        let mut guard = self.state.lock();
        let pending = if let Some((session, surface)) = guard.current() {
            let generation = session.generation;
            if expected.is_some_and(|expected| expected != generation) {
                return None;
            }
            if confirmed {
                let outcome = session.strategy.confirm(surface);
                guard
                    .settle(outcome)
                    .map(|pending| (generation, pending))
            } else {
                guard.dismiss(true);
                None
            }
        } else {
            if expected.is_none() {
                guard.hide(true);
            }
            None
        };
        self.commit(guard);
        pending
    }

    fn finish_confirm(
        self: &Arc<Self>,
        generation: u64,
        requested: String,
        outcome: Result<Option<String>, QuickInputError>,
    ) {
        let mut guard = self.state.lock();
        if let Some((session, surface)) = guard.live(generation) {
            let resolved = session.strategy.complete_confirm(surface, requested, outcome);
            if guard.settle(resolved).is_some() {
                warn!(generation, "quick input: confirmation deferred twice");
            }
        } else {
            trace!(generation, "quick input: session ended while confirming");
        }
        self.commit(guard);
    }

    fn cancel_generation(self: &Arc<Self>, generation: u64) {
        let mut guard = self.state.lock();
        if guard.live(generation).is_some() {
            debug!(generation, "quick input: cancellation requested");
            guard.dismiss(true);
        }
        self.commit(guard);
    }

    fn on_items_loaded(self: &Arc<Self>, generation: u64, items: anyhow::Result<Vec<T>>) {
        let mut guard = self.state.lock();
        match items {
            Ok(items) => {
                let Some((session, surface)) = guard.live(generation) else {
                    trace!(generation, "quick input: discarding stale candidates");
                    return;
                };
                session.ready.cancel();
                if std::mem::take(&mut session.busy_shown) {
                    surface.push(ViewUpdate::Busy(false));
                }
                session.strategy.on_items_loaded(surface, items);
            }
            Err(err) => {
                if guard.live(generation).is_none() {
                    trace!(generation, "quick input: ignoring stale loader failure: {err:#}");
                    return;
                }
                guard.fail(QuickInputError::unexpected(err));
            }
        }
        self.commit(guard);
    }

    fn show_busy(self: &Arc<Self>, generation: u64) {
        let mut guard = self.state.lock();
        let Some((session, surface)) = guard.live(generation) else {
            return;
        };
        if session.busy_shown || session.ready.is_cancellation_requested() {
            return;
        }
        session.busy_shown = true;
        surface.push(ViewUpdate::Busy(true));
        self.commit(guard);
    }

    fn on_debounced_value(self: &Arc<Self>, generation: u64, value: &str) {
        let mut guard = self.state.lock();
        let Some((session, surface)) = guard.live(generation) else {
            return;
        };
        session.strategy.on_debounced_value(surface, value);
        self.commit(guard);
    }

    fn apply_validation(
        self: &Arc<Self>,
        generation: u64,
        requested: &str,
        outcome: Result<Option<String>, QuickInputError>,
    ) {
        let mut guard = self.state.lock();
        let Some((session, surface)) = guard.live(generation) else {
            trace!(generation, "quick input: discarding validation of ended session");
            return;
        };
        match session.strategy.apply_validation(surface, requested, outcome) {
            Ok(()) => {}
            Err(QuickInputError::Canceled) => {
                trace!(requested, "quick input: validation superseded");
            }
            Err(err) => guard.fail(err),
        }
        self.commit(guard);
    }

    /// Moves queued effects to the outbox, releases the lock and dispatches.
    fn commit(self: &Arc<Self>, mut guard: MutexGuard<'_, ServiceState<T>>) {
        let effects = guard.surface.take_effects();
        if !effects.is_empty() {
            self.outbox.lock().extend(effects);
        }
        drop(guard);
        self.drain();
    }

    /// Dispatches queued effects in order. Effects queued by a listener
    /// while draining are picked up by the drain already running.
    fn drain(self: &Arc<Self>) {
        loop {
            if self.draining.swap(true, Ordering::SeqCst) {
                return;
            }
            loop {
                let next = self.outbox.lock().pop_front();
                let Some(effect) = next else {
                    break;
                };
                self.dispatch(effect);
            }
            self.draining.store(false, Ordering::SeqCst);
            if self.outbox.lock().is_empty() {
                return;
            }
        }
    }

    fn dispatch(self: &Arc<Self>, effect: Effect<T>) {
        match effect {
            Effect::View(update) => self.view.update(update),
            Effect::Focused { callback, item } => callback(&item),
            Effect::Report(error) => self.reporter.report(&error),
            Effect::Validate {
                generation,
                requested,
                validation,
            } => {
                let weak = Arc::downgrade(self);
                spawn(async move {
                    let outcome = validation.await;
                    if let Some(inner) = weak.upgrade() {
                        inner.apply_validation(generation, &requested, outcome);
                    }
                });
            }
        }
    }
}

impl<T: QuickPickItem> ServiceState<T> {
    fn current(&mut self) -> Option<(&mut Session<T>, &mut Surface<T>)> {
        let session = self.session.as_mut()?;
        Some((session, &mut self.surface))
    }

    /// The active session, if it is the one started as `generation`.
    fn live(&mut self, generation: u64) -> Option<(&mut Session<T>, &mut Surface<T>)> {
        match self.session.as_mut() {
            Some(session) if session.generation == generation => {
                Some((session, &mut self.surface))
            }
            _ => None,
        }
    }

    fn settle(&mut self, outcome: ResolveOutcome) -> Option<PendingConfirm> {
        match outcome {
            ResolveOutcome::Settled => {
                self.finish(true);
                None
            }
            ResolveOutcome::Rejected => {
                trace!("quick input: confirmation rejected");
                None
            }
            ResolveOutcome::Deferred(pending) => Some(pending),
            ResolveOutcome::Failed(err) => {
                self.fail(err);
                None
            }
        }
    }

    fn dismiss(&mut self, restore_focus: bool) {
        if let Some(session) = self.session.as_mut() {
            session.strategy.dismiss();
        }
        self.finish(restore_focus);
    }

    fn fail(&mut self, error: QuickInputError) {
        let Some(session) = self.session.as_mut() else {
            return;
        };
        self.surface.emit(Effect::Report(error.clone()));
        session.strategy.fail(error);
        self.finish(true);
    }

    fn finish(&mut self, restore_focus: bool) {
        if let Some(session) = self.session.take() {
            retire(&mut self.surface, session);
        }
        self.hide(restore_focus);
    }

    fn hide(&mut self, restore_focus: bool) {
        if !self.displayed {
            return;
        }
        self.displayed = false;
        self.surface.push(ViewUpdate::Hide { restore_focus });
    }
}

/// Releases a session whose promise is settled.
fn retire<T: QuickPickItem>(surface: &mut Surface<T>, session: Session<T>) {
    session.store.dispose();
    session.ready.cancel();
    if session.busy_shown {
        surface.push(ViewUpdate::Busy(false));
    }
    debug!(generation = session.generation, kind = %session.kind, "quick input: session ended");
}

fn spawn(task: impl Future<Output = ()> + Send + 'static) {
    match tokio::runtime::Handle::try_current() {
        Ok(handle) => {
            handle.spawn(task);
        }
        Err(_) => warn!("quick input: no tokio runtime, background work dropped"),
    }
}

#[cfg(test)]
mod tests {
    use std::time::Duration;

    use futures::FutureExt;

    use super::*;
    use crate::item::PickItem;
    use crate::params::ItemsSource;
    use crate::view::RecordingView;

    fn service() -> (QuickInputService<PickItem>, RecordingView) {
        let view = RecordingView::new();
        (
            QuickInputService::new(view.clone(), QuickInputConfig::default()),
            view,
        )
    }

    fn items(labels: &[&str]) -> Vec<PickItem> {
        labels.iter().map(|label| PickItem::new(*label)).collect()
    }

    #[tokio::test]
    async fn escape_dismisses_and_hides_once() {
        let (service, view) = service();
        let promise = service.pick_one(PickOneOptions::new(items(&["a"])));
        assert_eq!(service.active_kind(), Some(InputKind::PickOne));
        service.key_down(KeyCode::Escape.into()).await;
        service.cancel();
        assert_eq!(promise.await.expect("ok"), None);
        assert_eq!(view.hide_count(), 1);
        assert!(!service.is_displayed());
        assert_eq!(service.active_kind(), None);
    }

    #[tokio::test]
    async fn enter_accepts_the_focused_item() {
        let (service, _view) = service();
        let promise = service.pick_one(PickOneOptions::new(items(&["a", "b"])));
        service.key_down(KeyCode::Down.into()).await;
        service.key_down(KeyCode::Enter.into()).await;
        let picked = promise.await.expect("ok").expect("picked");
        assert_eq!(picked.label, "b");
    }

    #[tokio::test]
    async fn sticky_sessions_survive_focus_loss() {
        let (service, view) = service();
        let promise = service.input(TextInputOptions::new().ignore_focus_lost(true));
        service.focus_lost();
        assert!(service.is_displayed());

        service.cancel();
        assert_eq!(promise.await.expect("ok"), None);

        let promise = service.input(TextInputOptions::new());
        service.focus_lost();
        assert_eq!(promise.await.expect("ok"), None);
        assert!(matches!(
            view.updates().last(),
            Some(ViewUpdate::Hide {
                restore_focus: false
            })
        ));
    }

    #[tokio::test]
    async fn configuration_can_disable_close_on_focus_lost() {
        let view = RecordingView::new();
        let config = QuickInputConfig::from_contents(None, "[behavior]\nclose_on_focus_lost = false\n");
        let service = QuickInputService::<PickItem>::new(view, config);
        let mut promise = service.input(TextInputOptions::new());
        service.focus_lost();
        assert!(service.is_displayed());
        assert!((&mut promise).now_or_never().is_none());
        service.shutdown();
        assert_eq!(promise.await.expect("ok"), None);
    }

    #[tokio::test]
    async fn layout_is_pushed_on_show_and_on_resize() {
        let (service, view) = service();
        service.layout(Dimension {
            width: 1000,
            height: 500,
        });
        assert!(view.updates().is_empty());

        let _promise = service.input(TextInputOptions::new());
        let metrics = LayoutMetrics {
            width: 600,
            list_max_height: 200,
        };
        assert!(view.updates().contains(&ViewUpdate::Layout(metrics)));

        view.take();
        service.layout(Dimension {
            width: 400,
            height: 100,
        });
        assert_eq!(
            view.take(),
            [ViewUpdate::Layout(LayoutMetrics {
                width: 248,
                list_max_height: 40,
            })]
        );
    }

    #[tokio::test]
    async fn loader_failure_rejects_and_reports() {
        let reported = Arc::new(Mutex::new(Vec::new()));
        let view = RecordingView::new();
        let service = QuickInputService::<PickItem>::with_reporter(
            view.clone(),
            QuickInputConfig::default(),
            {
                let reported = Arc::clone(&reported);
                move |err: &QuickInputError| reported.lock().push(err.to_string())
            },
        );
        let promise = service.pick_one(PickOneOptions::new(ItemsSource::from_future(async {
            Err(anyhow::anyhow!("index unavailable"))
        })));
        let outcome = promise.await;
        assert!(matches!(outcome, Err(QuickInputError::Unexpected(_))));
        assert_eq!(
            reported.lock().as_slice(),
            ["unexpected quick input failure: index unavailable"]
        );
        assert_eq!(view.hide_count(), 1);
    }

    #[tokio::test(start_paused = true)]
    async fn cancellation_token_settles_with_nothing() {
        let (service, view) = service();
        let source = CancellationTokenSource::new();
        let promise = service.pick_many_with_token(
            PickManyOptions::new(ItemsSource::from_future(async {
                tokio::time::sleep(Duration::from_secs(5)).await;
                Ok(items(&["late"]))
            })),
            source.token(),
        );
        tokio::time::sleep(Duration::from_millis(10)).await;
        source.cancel();
        source.cancel();
        assert_eq!(promise.await.expect("ok"), None);
        assert_eq!(view.hide_count(), 1);

        tokio::time::sleep(Duration::from_secs(10)).await;
        assert!(view.last_list().is_some_and(|rows| rows.is_empty()));
    }

    #[tokio::test]
    async fn already_cancelled_token_never_shows() {
        let (service, view) = service();
        let source = CancellationTokenSource::new();
        source.cancel();
        let promise = service.input_with_token(TextInputOptions::new(), source.token());
        assert_eq!(promise.await.expect("ok"), None);
        assert!(view.updates().is_empty());
    }

    #[tokio::test]
    async fn close_without_session_hides_directly() {
        let (service, view) = service();
        service.close(false).await;
        assert!(view.updates().is_empty());

        let promise = service.pick_one(PickOneOptions::new(items(&["a"])));
        service.accept().await;
        service.close(true).await;
        assert_eq!(view.hide_count(), 1);
        assert!(promise.await.expect("ok").is_some());
    }
}
