//! Task scope
//!
//! A small structured-concurrency primitive: every task spawned into a
//! [`TaskScope`] shares one cancellation token, and [`TaskScope::wait`] only
//! returns once all of them have finished.

use super::error::{AppResult, LifecycleError, is_cancellation};
use std::any::Any;
use std::collections::HashMap;
use std::future::Future;
use tokio::task::{Id, JoinSet};
use tokio_util::sync::CancellationToken;
use tracing::Instrument;

/// What a task returning without error means for its scope
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum OnExit {
    /// The scope's work is done; cancel the remaining tasks
    Exit,
    /// The task should only stop after cancellation; anything else is an error
    Fail,
}

struct TaskInfo {
    name: String,
    on_exit: OnExit,
}

/// Set of named tasks supervised together
pub struct TaskScope {
    token: CancellationToken,
    tasks: JoinSet<AppResult>,
    info: HashMap<Id, TaskInfo>,
}

impl TaskScope {
    /// Create a scope cancelled together with `parent`
    pub fn new(parent: &CancellationToken) -> Self {
        Self {
            token: parent.child_token(),
            tasks: JoinSet::new(),
            info: HashMap::new(),
        }
    }

    pub fn token(&self) -> &CancellationToken {
        &self.token
    }

    pub fn cancel(&self) {
        self.token.cancel();
    }

    pub fn len(&self) -> usize {
        self.tasks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.tasks.is_empty()
    }

    /// Spawn `task`, handing it the scope's token
    ///
    /// The task runs inside the current tracing span.
    pub fn spawn<F, Fut>(&mut self, name: impl Into<String>, on_exit: OnExit, task: F)
    where
        F: FnOnce(CancellationToken) -> Fut,
        Fut: Future<Output = AppResult> + Send + 'static,
    {
        let name = name.into();
        let future = task(self.token.clone()).in_current_span();
        let handle = self.tasks.spawn(future);

        tracing::debug!(task = %name, ?on_exit, "Task spawned");
        self.info.insert(handle.id(), TaskInfo { name, on_exit });
    }

    /// Wait for every task to finish
    ///
    /// Any error cancels the scope. The first error is returned unless it is
    /// a cancellation reported after the scope was already cancelled; later
    /// errors are only logged.
    pub async fn wait(mut self) -> AppResult {
        let mut first_error: Option<anyhow::Error> = None;

        while let Some(joined) = self.tasks.join_next_with_id().await {
            let (id, result) = match joined {
                Ok((id, result)) => (id, Ok(result)),
                Err(err) => (err.id(), Err(err)),
            };
            let TaskInfo { name, on_exit } = self.info.remove(&id).unwrap_or(TaskInfo {
                name: id.to_string(),
                on_exit: OnExit::Fail,
            });

            let error = match result {
                Ok(Ok(())) => match on_exit {
                    OnExit::Exit => {
                        tracing::debug!(task = %name, "Task finished, cancelling scope");
                        self.token.cancel();
                        None
                    }
                    OnExit::Fail if self.token.is_cancelled() => {
                        tracing::debug!(task = %name, "Task finished after cancellation");
                        None
                    }
                    OnExit::Fail => Some(LifecycleError::task_exited(&name).into()),
                },
                Ok(Err(err)) => Some(err),
                Err(join) if join.is_panic() => Some(
                    LifecycleError::task_panicked(&name, panic_message(join.into_panic())).into(),
                ),
                Err(_) => Some(LifecycleError::Cancelled.into()),
            };

            let Some(err) = error else { continue };
            let scope_cancelled = self.token.is_cancelled();
            self.token.cancel();

            if scope_cancelled && is_cancellation(&err) {
                tracing::debug!(task = %name, "Task cancelled");
            } else if first_error.is_none() {
                tracing::debug!(task = %name, error = %err, "Task failed, cancelling scope");
                first_error = Some(err);
            } else {
                tracing::debug!(task = %name, error = %err, "Additional task failure");
            }
        }

        first_error.map_or(Ok(()), Err)
    }
}

fn panic_message(payload: Box<dyn Any + Send>) -> String {
    if let Some(message) = payload.downcast_ref::<&str>() {
        (*message).to_owned()
    } else if let Some(message) = payload.downcast_ref::<String>() {
        message.clone()
    } else {
        "non-string panic payload".to_owned()
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    async fn until_cancelled(token: CancellationToken) -> AppResult {
        token.cancelled().await;
        Err(LifecycleError::Cancelled.into())
    }

    async fn crash(_token: CancellationToken) -> AppResult {
        panic!("kaboom")
    }

    #[tokio::test]
    async fn test_exit_cancels_siblings() {
        let root = CancellationToken::new();
        let mut scope = TaskScope::new(&root);
        scope.spawn("worker", OnExit::Fail, until_cancelled);
        scope.spawn("main", OnExit::Exit, |_| async { Ok(()) });

        assert!(scope.wait().await.is_ok());
        assert!(!root.is_cancelled());
    }

    #[tokio::test]
    async fn test_first_error_wins() {
        let mut scope = TaskScope::new(&CancellationToken::new());
        scope.spawn("watcher", OnExit::Exit, until_cancelled);
        scope.spawn("main", OnExit::Fail, |_| async {
            Err(anyhow::anyhow!("first"))
        });

        let err = scope.wait().await.unwrap_err();
        assert_eq!(err.to_string(), "first");
    }

    #[tokio::test]
    async fn test_unexpected_exit_is_an_error() {
        let mut scope = TaskScope::new(&CancellationToken::new());
        scope.spawn("watcher", OnExit::Exit, until_cancelled);
        scope.spawn("server", OnExit::Fail, |_| async { Ok(()) });

        let err = scope.wait().await.unwrap_err();
        assert!(matches!(
            err.downcast_ref::<LifecycleError>(),
            Some(LifecycleError::TaskExited { name }) if name == "server"
        ));
    }

    #[tokio::test]
    async fn test_fail_task_may_return_after_cancellation() {
        let mut scope = TaskScope::new(&CancellationToken::new());
        scope.spawn("server", OnExit::Fail, |token| async move {
            token.cancelled().await;
            Ok(())
        });
        scope.spawn("stopper", OnExit::Exit, |_| async { Ok(()) });

        assert!(scope.wait().await.is_ok());
    }

    #[tokio::test]
    async fn test_cancellation_before_scope_cancel_is_an_error() {
        let mut scope = TaskScope::new(&CancellationToken::new());
        scope.spawn("watcher", OnExit::Exit, until_cancelled);
        scope.spawn("server", OnExit::Fail, |token| {
            let own = token.child_token();
            own.cancel();
            until_cancelled(own)
        });

        let err = scope.wait().await.unwrap_err();
        assert!(is_cancellation(&err));
    }

    #[tokio::test]
    async fn test_panic_is_reported_with_name() {
        let mut scope = TaskScope::new(&CancellationToken::new());
        scope.spawn("watcher", OnExit::Exit, until_cancelled);
        scope.spawn("crashy", OnExit::Fail, crash);

        let err = scope.wait().await.unwrap_err();
        match err.downcast_ref::<LifecycleError>() {
            Some(LifecycleError::TaskPanicked { name, message }) => {
                assert_eq!(name, "crashy");
                assert_eq!(message, "kaboom");
            }
            other => panic!("unexpected error: {other:?}"),
        }
    }

    #[tokio::test]
    async fn test_parent_cancellation_reaches_tasks() {
        let root = CancellationToken::new();
        let mut scope = TaskScope::new(&root);
        scope.spawn("a", OnExit::Fail, until_cancelled);
        scope.spawn("b", OnExit::Fail, until_cancelled);
        assert_eq!(scope.len(), 2);

        root.cancel();
        assert!(scope.wait().await.is_ok());
    }
}
