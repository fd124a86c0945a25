//! Bridge from asynchronous handlers to synchronous host callbacks.
//!
//! The host invokes every command callback synchronously and expects the
//! command to be finished when the callback returns. Handlers may be written
//! as futures, so the adapters drive them to completion on the calling
//! thread with [`TaskBridge::run_to_completion`].
//!
//! This blocks the calling thread for as long as the handler runs. On the
//! world thread that stalls every other world operation, so handlers for
//! world-thread categories must not wait on slow I/O. There is no timeout: a
//! handler that never completes hangs its calling thread.
//!
//! Tokio timers and I/O awaited by a handler are driven by a multi-thread
//! runtime: the embedding's own when one is available, otherwise a shared
//! single-worker runtime started on first use. A current-thread runtime is
//! never used, since the thread that would drive it is the one blocked.

use std::any::Any;
use std::future::Future;
use std::panic::AssertUnwindSafe;
use std::sync::OnceLock;

use anyhow::anyhow;
use futures::FutureExt;
use tokio::runtime::{Builder, Handle, Runtime, RuntimeFlavor};
use tracing::debug;

use crate::domain::errors::InvocationError;

/// Name of the worker thread of the shared handler runtime.
const SHARED_RUNTIME_THREAD: &str = "forgekit-handlers";

/// Runs handler futures to completion on the current thread.
#[derive(Debug, Clone, Default)]
pub struct TaskBridge {
    runtime: Option<Handle>,
}

impl TaskBridge {
    /// Bridge driving tokio resources on the shared handler runtime.
    pub fn new() -> Self {
        Self::default()
    }

    /// Bridge that enters `runtime` while driving handlers, so tokio
    /// resources resolve against it. A current-thread runtime is ignored in
    /// favour of the shared handler runtime.
    pub fn with_runtime(runtime: Handle) -> Self {
        Self {
            runtime: usable(runtime),
        }
    }

    /// Bridge bound to the runtime of the calling context when that runtime
    /// is multi-threaded.
    pub fn current() -> Self {
        Self {
            runtime: Handle::try_current().ok().and_then(usable),
        }
    }

    /// Whether an embedding-supplied runtime is entered while handlers run.
    pub fn has_runtime(&self) -> bool {
        self.runtime.is_some()
    }

    /// Block the current thread until `future` completes.
    ///
    /// A panic inside the future is returned as an error.
    pub fn run_to_completion<F>(&self, future: F) -> anyhow::Result<()>
    where
        F: Future<Output = anyhow::Result<()>>,
    {
        let handle = match &self.runtime {
            Some(handle) => handle.clone(),
            None => shared_runtime()?,
        };
        let _guard = handle.enter();
        match futures::executor::block_on(AssertUnwindSafe(future).catch_unwind()) {
            Ok(result) => result,
            Err(payload) => Err(InvocationError::Panicked(panic_message(payload.as_ref())).into()),
        }
    }
}

fn usable(handle: Handle) -> Option<Handle> {
    match handle.runtime_flavor() {
        RuntimeFlavor::MultiThread => Some(handle),
        flavor => {
            debug!(?flavor, "runtime cannot drive blocked handlers, using the shared handler runtime");
            None
        }
    }
}

/// Handle of the process-wide handler runtime, built on first use and never
/// dropped.
fn shared_runtime() -> anyhow::Result<Handle> {
    static SHARED: OnceLock<Result<Runtime, String>> = OnceLock::new();
    SHARED
        .get_or_init(|| {
            Builder::new_multi_thread()
                .worker_threads(1)
                .thread_name(SHARED_RUNTIME_THREAD)
                .enable_all()
                .build()
                .map_err(|e| e.to_string())
        })
        .as_ref()
        .map(|runtime| runtime.handle().clone())
        .map_err(|e| anyhow!("failed to start the handler runtime: {e}"))
}

fn panic_message(payload: &(dyn Any + Send)) -> String {
    if let Some(s) = payload.downcast_ref::<&str>() {
        (*s).to_string()
    } else if let Some(s) = payload.downcast_ref::<String>() {
        s.clone()
    } else {
        "non-string panic payload".to_string()
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use std::time::Duration;

    #[test]
    fn test_runs_future_to_completion() {
        let bridge = TaskBridge::new();
        let result = bridge.run_to_completion(async {
            let value = futures::future::ready(21).await * 2;
            anyhow::ensure!(value == 42, "wrong value");
            Ok(())
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_propagates_handler_error() {
        let bridge = TaskBridge::new();
        let err = bridge
            .run_to_completion(async { Err(anyhow::anyhow!("boom")) })
            .unwrap_err();
        assert_eq!(err.to_string(), "boom");
    }

    #[test]
    fn test_panic_becomes_error() {
        let bridge = TaskBridge::new();
        let err = bridge
            .run_to_completion(async { panic!("handler exploded") })
            .unwrap_err();
        assert_eq!(
            err.downcast_ref::<InvocationError>(),
            Some(&InvocationError::Panicked("handler exploded".to_string()))
        );
    }

    #[test]
    fn test_entered_runtime_drives_tokio_timers() {
        let runtime = tokio::runtime::Builder::new_multi_thread()
            .worker_threads(1)
            .enable_all()
            .build()
            .unwrap();
        let bridge = TaskBridge::with_runtime(runtime.handle().clone());
        assert!(bridge.has_runtime());

        let result = bridge.run_to_completion(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(())
        });
        assert!(result.is_ok());
    }

    #[test]
    fn test_current_outside_runtime_has_none() {
        assert!(!TaskBridge::current().has_runtime());
    }

    #[test]
    fn test_bridge_without_runtime_drives_tokio_timers() {
        let result = TaskBridge::new().run_to_completion(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(())
        });
        assert!(result.is_ok());
    }

    #[tokio::test]
    async fn test_current_thread_runtime_is_not_captured() {
        let bridge = TaskBridge::current();
        assert!(!bridge.has_runtime());
        assert!(!TaskBridge::with_runtime(Handle::current()).has_runtime());

        let result = bridge.run_to_completion(async {
            tokio::time::sleep(Duration::from_millis(5)).await;
            Ok(())
        });
        assert!(result.is_ok());
    }

    #[tokio::test(flavor = "multi_thread", worker_threads = 2)]
    async fn test_multi_thread_runtime_is_captured() {
        assert!(TaskBridge::current().has_runtime());
    }
}
