//! Gated view lifecycle.
//!
//! A mounted view holds one auth subscription for its whole life. Every auth
//! change goes through the [`AccessGate`] as it arrives. The view's fetch runs
//! only after a session is observed. An in-flight fetch is dropped when the
//! session ends or changes, and nothing is published after teardown.

use std::future::Future;
use std::sync::atomic::{AtomicBool, Ordering};
use std::sync::Arc;

use tokio::sync::watch;
use tokio::task::JoinHandle;
use tracing::{debug, warn};

use crate::auth::{AccessGate, AuthOutcome, AuthState, SessionUser};
use crate::directory::{DirectoryLister, User};
use crate::error::AppError;
use crate::reviews::{Outcome, ReviewAggregator, ReviewSummary};

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum ViewState<T> {
    /// Waiting for a session or for the fetch to resolve.
    Loading,
    /// Not enough input to fetch yet.
    Pending,
    Ready(T),
    Failed(AppError),
}

pub struct ViewHandle<T> {
    state: watch::Receiver<ViewState<T>>,
    disposed: Arc<AtomicBool>,
    task: Option<JoinHandle<()>>,
}

impl<T> ViewHandle<T> {
    pub fn watch(&self) -> watch::Receiver<ViewState<T>> {
        self.state.clone()
    }

    pub fn state(&self) -> ViewState<T>
    where
        T: Clone,
    {
        self.state.borrow().clone()
    }

    /// Stop the view and wait until its task, subscription included, is gone.
    pub async fn teardown(mut self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
            let _ = task.await;
        }
    }
}

impl<T> Drop for ViewHandle<T> {
    fn drop(&mut self) {
        self.disposed.store(true, Ordering::SeqCst);
        if let Some(task) = self.task.take() {
            task.abort();
        }
    }
}

/// Mount a view on the current runtime. `fetch` is called with the signed-in
/// user each time a new session is observed.
pub fn mount<T, F, Fut>(auth: &AuthState, gate: AccessGate, mut fetch: F) -> ViewHandle<T>
where
    T: Send + Sync + 'static,
    F: FnMut(SessionUser) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Outcome<T>, AppError>> + Send + 'static,
{
    let (_fixed, input) = watch::channel(());
    mount_with(auth, gate, input, move |user, ()| fetch(user))
}

/// Like [`mount`], with a second input the fetch depends on. The view
/// fetches again whenever the pair of session uid and input changes.
///
/// Auth changes are gated as they arrive, also while a fetch is in flight.
/// A fetch is dropped unfinished when the user signs out, the uid changes,
/// or the input moves on.
pub fn mount_with<I, T, F, Fut>(
    auth: &AuthState,
    gate: AccessGate,
    mut input: watch::Receiver<I>,
    mut fetch: F,
) -> ViewHandle<T>
where
    I: Clone + PartialEq + Send + Sync + 'static,
    T: Send + Sync + 'static,
    F: FnMut(SessionUser, I) -> Fut + Send + 'static,
    Fut: Future<Output = Result<Outcome<T>, AppError>> + Send + 'static,
{
    let (tx, rx) = watch::channel(ViewState::Loading);
    let disposed = Arc::new(AtomicBool::new(false));
    let flag = disposed.clone();
    let mut subscription = auth.subscribe();

    let task = tokio::spawn(async move {
        let publish = |state: ViewState<T>| {
            if !flag.load(Ordering::SeqCst) {
                tx.send_replace(state);
            }
        };
        let mut input_open = true;
        let mut loaded: Option<(String, I)> = None;
        let mut outcome = gate.check(subscription.current());

        loop {
            if let AuthOutcome::Authenticated(user) = outcome {
                let key = (user.uid.clone(), input.borrow_and_update().clone());
                if loaded.as_ref() != Some(&key) {
                    loaded = None;
                    publish(ViewState::Loading);
                    let session = user.clone();
                    let fetching = fetch(user, key.1.clone());
                    tokio::pin!(fetching);

                    let interrupted = loop {
                        tokio::select! {
                            result = &mut fetching => {
                                loaded = Some(key.clone());
                                publish(match result {
                                    Ok(Outcome::Ready(value)) => ViewState::Ready(value),
                                    Ok(Outcome::Pending) => ViewState::Pending,
                                    Err(e) => {
                                        warn!(error = %e, "view fetch failed");
                                        ViewState::Failed(e)
                                    }
                                });
                                break None;
                            }
                            alive = subscription.changed() => {
                                if !alive {
                                    return;
                                }
                                match gate.check(subscription.current()) {
                                    AuthOutcome::Authenticated(u) if u.uid == key.0 => {}
                                    other => break Some(other),
                                }
                            }
                            open = input.changed(), if input_open => {
                                if open.is_err() {
                                    input_open = false;
                                    continue;
                                }
                                let next = input.borrow_and_update().clone();
                                if next != key.1 {
                                    break Some(AuthOutcome::Authenticated(session.clone()));
                                }
                            }
                        }
                    };

                    if let Some(next) = interrupted {
                        debug!(uid = %key.0, "session or target changed during fetch, dropping it");
                        outcome = next;
                        continue;
                    }
                }
            } else {
                loaded = None;
                publish(ViewState::Loading);
            }

            outcome = loop {
                tokio::select! {
                    alive = subscription.changed() => {
                        if !alive {
                            return;
                        }
                        break gate.check(subscription.current());
                    }
                    open = input.changed(), if input_open => match open {
                        Ok(()) => break AccessGate::decide(subscription.peek()),
                        Err(_) => input_open = false,
                    },
                }
            };
        }
    });

    ViewHandle {
        state: rx,
        disposed,
        task: Some(task),
    }
}

/// The doctor directory page.
pub fn directory_view(
    auth: &AuthState,
    gate: AccessGate,
    lister: DirectoryLister,
) -> ViewHandle<Vec<User>> {
    mount(auth, gate, move |_user| {
        let lister = lister.clone();
        async move { lister.doctors().await.map(Outcome::Ready) }
    })
}

/// One doctor's review page. `doctor_uid` holds `None` until the route
/// parameter resolves; each new value fetches again.
pub fn review_view(
    auth: &AuthState,
    gate: AccessGate,
    aggregator: ReviewAggregator,
    doctor_uid: watch::Receiver<Option<String>>,
) -> ViewHandle<ReviewSummary> {
    mount_with(auth, gate, doctor_uid, move |_user, target: Option<String>| {
        let aggregator = aggregator.clone();
        async move { aggregator.review_summary(target.as_deref()).await }
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::auth::RecordingNavigator;
    use crate::reviews::AggregateRating;
    use crate::store::MemoryStore;
    use serde_json::json;
    use std::sync::atomic::AtomicUsize;
    use tokio::sync::Notify;

    async fn settle() {
        for _ in 0..10 {
            tokio::task::yield_now().await;
        }
    }

    fn gate() -> (AccessGate, Arc<RecordingNavigator>) {
        let nav = Arc::new(RecordingNavigator::default());
        (AccessGate::new(nav.clone(), "/"), nav)
    }

    fn seeded_store() -> Arc<MemoryStore> {
        let store = Arc::new(MemoryStore::new());
        store
            .insert(
                "users",
                "d1",
                json!({ "uid": "d1", "firstName": "Ada", "lastName": "B", "userType": "Doctor" }),
            )
            .unwrap();
        for (id, stars) in [("r1", 5), ("r2", 4), ("r3", 3)] {
            store
                .insert("users/d1/reviews", id, json!({ "stars": stars }))
                .unwrap();
        }
        store
    }

    #[tokio::test]
    async fn no_fetch_and_a_redirect_without_session() {
        let auth = AuthState::new();
        let (gate, nav) = gate();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let view = mount(&auth, gate, move |_user| {
            counter.fetch_add(1, Ordering::SeqCst);
            async { Ok(Outcome::Ready(())) }
        });
        settle().await;

        assert_eq!(nav.redirects(), vec!["/"]);
        assert_eq!(calls.load(Ordering::SeqCst), 0);
        assert_eq!(view.state(), ViewState::Loading);
        view.teardown().await;
    }

    #[tokio::test]
    async fn fetches_after_sign_in_and_redirects_after_sign_out() {
        let auth = AuthState::new();
        let (gate, nav) = gate();
        let view = directory_view(&auth, gate, DirectoryLister::new(seeded_store()));
        settle().await;
        assert_eq!(nav.redirects().len(), 1);

        auth.sign_in(SessionUser::new("p1"));
        let mut rx = view.watch();
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap()
            .clone();
        let ViewState::Ready(doctors) = state else {
            unreachable!()
        };
        assert_eq!(doctors.len(), 1);
        assert_eq!(doctors[0].uid, "d1");
        assert_eq!(nav.redirects().len(), 1);

        auth.sign_out();
        settle().await;
        assert_eq!(nav.redirects(), vec!["/", "/"]);
        view.teardown().await;
    }

    #[tokio::test]
    async fn repeated_events_for_same_session_do_not_refetch() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("u1"));
        let (gate, nav) = gate();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let view = mount(&auth, gate, move |user| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(Outcome::Ready(user.uid)) }
        });
        settle().await;
        auth.sign_in(SessionUser::new("u1"));
        settle().await;

        assert_eq!(calls.load(Ordering::SeqCst), 1);
        assert_eq!(view.state(), ViewState::Ready("u1".to_string()));
        assert!(nav.redirects().is_empty());
        view.teardown().await;
    }

    #[tokio::test]
    async fn result_resolving_after_teardown_is_discarded() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("u1"));
        let (gate, _nav) = gate();
        let release = Arc::new(Notify::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let (r, c) = (release.clone(), completed.clone());

        let view = mount(&auth, gate, move |_user| {
            let (r, c) = (r.clone(), c.clone());
            async move {
                r.notified().await;
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Ready(42))
            }
        });
        settle().await;
        assert_eq!(auth.subscriber_count(), 1);

        let rx = view.watch();
        view.teardown().await;
        assert_eq!(auth.subscriber_count(), 0);

        release.notify_waiters();
        settle().await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(*rx.borrow(), ViewState::Loading);
    }

    #[tokio::test]
    async fn result_for_a_stale_session_is_discarded() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("u1"));
        let (gate, _nav) = gate();
        let release = Arc::new(Notify::new());
        let calls = Arc::new(AtomicUsize::new(0));
        let (r, counter) = (release.clone(), calls.clone());

        let view = mount(&auth, gate, move |user| {
            let n = counter.fetch_add(1, Ordering::SeqCst);
            let r = r.clone();
            async move {
                if n == 0 {
                    r.notified().await;
                }
                Ok(Outcome::Ready(user.uid))
            }
        });
        settle().await;
        auth.sign_in(SessionUser::new("u2"));
        release.notify_one();

        let mut rx = view.watch();
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap()
            .clone();
        assert_eq!(state, ViewState::Ready("u2".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        view.teardown().await;
    }

    #[tokio::test]
    async fn sign_out_during_fetch_redirects_and_drops_it() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("u1"));
        let (gate, nav) = gate();
        let release = Arc::new(Notify::new());
        let completed = Arc::new(AtomicUsize::new(0));
        let (r, c) = (release.clone(), completed.clone());

        let view = mount(&auth, gate, move |_user| {
            let (r, c) = (r.clone(), c.clone());
            async move {
                r.notified().await;
                c.fetch_add(1, Ordering::SeqCst);
                Ok(Outcome::Ready(7))
            }
        });
        settle().await;
        assert!(nav.redirects().is_empty());

        auth.sign_out();
        settle().await;
        assert_eq!(nav.redirects(), vec!["/"]);
        assert_eq!(view.state(), ViewState::Loading);

        release.notify_waiters();
        settle().await;
        assert_eq!(completed.load(Ordering::SeqCst), 0);
        assert_eq!(view.state(), ViewState::Loading);
        view.teardown().await;
    }

    #[tokio::test]
    async fn sign_out_withdraws_published_content() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("u1"));
        let (gate, nav) = gate();
        let calls = Arc::new(AtomicUsize::new(0));
        let counter = calls.clone();

        let view = mount(&auth, gate, move |user| {
            counter.fetch_add(1, Ordering::SeqCst);
            async move { Ok(Outcome::Ready(user.uid)) }
        });
        let mut rx = view.watch();
        rx.wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap();

        auth.sign_out();
        settle().await;
        assert_eq!(view.state(), ViewState::Loading);
        assert_eq!(nav.redirects(), vec!["/"]);

        auth.sign_in(SessionUser::new("u1"));
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap()
            .clone();
        assert_eq!(state, ViewState::Ready("u1".to_string()));
        assert_eq!(calls.load(Ordering::SeqCst), 2);
        view.teardown().await;
    }

    #[tokio::test]
    async fn review_view_follows_the_target() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("p1"));
        let (gate, _) = gate();
        let (target, doctor_uid) = watch::channel::<Option<String>>(None);

        let view = review_view(
            &auth,
            gate,
            ReviewAggregator::new(seeded_store()),
            doctor_uid,
        );
        let mut rx = view.watch();
        rx.wait_for(|s| *s == ViewState::Pending).await.unwrap();

        target.send_replace(Some("d1".into()));
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap()
            .clone();
        let ViewState::Ready(summary) = state else {
            unreachable!()
        };
        assert_eq!(summary.average.to_string(), "Average Rating: 4.00");

        target.send_replace(Some("d2".into()));
        rx.wait_for(
            |s| matches!(s, ViewState::Ready(summary) if summary.average == AggregateRating::NoReviews),
        )
        .await
        .unwrap();
        view.teardown().await;
    }

    #[tokio::test]
    async fn dropping_the_handle_releases_the_subscription() {
        let auth = AuthState::new();
        let (gate, _nav) = gate();
        let view = mount(&auth, gate, |_user| async { Ok(Outcome::Ready(())) });
        settle().await;
        assert_eq!(auth.subscriber_count(), 1);
        drop(view);
        settle().await;
        assert_eq!(auth.subscriber_count(), 0);
    }

    #[tokio::test]
    async fn review_view_summarises_or_stays_pending() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("p1"));
        let store = seeded_store();

        let (gate_a, _) = gate();
        let view = review_view(
            &auth,
            gate_a,
            ReviewAggregator::new(store.clone()),
            watch::channel(Some("d1".to_string())).1,
        );
        let mut rx = view.watch();
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Ready(_)))
            .await
            .unwrap()
            .clone();
        let ViewState::Ready(summary) = state else {
            unreachable!()
        };
        assert_eq!(summary.average.to_string(), "Average Rating: 4.00");
        assert_ne!(summary.average, AggregateRating::NoReviews);
        view.teardown().await;

        let (gate_b, _) = gate();
        let pending = review_view(
            &auth,
            gate_b,
            ReviewAggregator::new(store),
            watch::channel(None).1,
        );
        let mut rx = pending.watch();
        rx.wait_for(|s| *s == ViewState::Pending).await.unwrap();
        pending.teardown().await;
    }

    #[tokio::test]
    async fn store_failure_is_a_failed_state() {
        let auth = AuthState::new();
        auth.sign_in(SessionUser::new("p1"));
        let store = seeded_store();
        store.set_offline(true);
        let (gate, _) = gate();

        let view = directory_view(&auth, gate, DirectoryLister::new(store));
        let mut rx = view.watch();
        let state = rx
            .wait_for(|s| matches!(s, ViewState::Failed(_)))
            .await
            .unwrap()
            .clone();
        assert!(matches!(state, ViewState::Failed(AppError::StoreUnavailable(_))));
        view.teardown().await;
    }
}
