//! Explicit registry of state-reset callbacks.
//!
//! Modules that keep state outside the ECS world or the feature list register
//! a named hook here during their own initialization. `reset_all` runs the
//! hooks in `order` before a fresh session, isolating each one.

use std::panic::{catch_unwind, AssertUnwindSafe};

use bevy::prelude::*;

pub type ResetFn<T> = Box<dyn FnMut(&mut T) -> Result<(), String> + Send + Sync>;

struct ResetHook<T> {
    name: String,
    order: i32,
    run: ResetFn<T>,
}

/// Outcome of one `reset_all` pass.
#[derive(Debug, Clone, Default, PartialEq, Eq)]
pub struct ResetReport {
    pub succeeded: usize,
    pub failed: Vec<String>,
}

pub struct ResetRegistry<T> {
    hooks: Vec<ResetHook<T>>,
}

impl<T> Default for ResetRegistry<T> {
    fn default() -> Self {
        Self { hooks: Vec::new() }
    }
}

impl<T> ResetRegistry<T> {
    pub fn new() -> Self {
        Self::default()
    }

    /// Lower `order` runs first; equal orders keep registration order.
    pub fn register(
        &mut self,
        name: impl Into<String>,
        order: i32,
        run: impl FnMut(&mut T) -> Result<(), String> + Send + Sync + 'static,
    ) {
        self.hooks.push(ResetHook {
            name: name.into(),
            order,
            run: Box::new(run),
        });
        self.hooks.sort_by_key(|h| h.order);
    }

    pub fn len(&self) -> usize {
        self.hooks.len()
    }

    pub fn is_empty(&self) -> bool {
        self.hooks.is_empty()
    }

    /// Runs every hook. A hook that errors or panics is logged and skipped;
    /// the rest still run.
    pub fn reset_all(&mut self, target: &mut T) -> ResetReport {
        let mut report = ResetReport::default();

        for hook in self.hooks.iter_mut() {
            let outcome = catch_unwind(AssertUnwindSafe(|| (hook.run)(target)));
            match outcome {
                Ok(Ok(())) => report.succeeded += 1,
                Ok(Err(e)) => {
                    error!("[Reset] {} failed: {}", hook.name, e);
                    report.failed.push(hook.name.clone());
                }
                Err(_) => {
                    error!("[Reset] {} panicked", hook.name);
                    report.failed.push(hook.name.clone());
                }
            }
        }

        info!(
            "[Reset] Ran {} reset hooks ({} failed).",
            self.hooks.len(),
            report.failed.len()
        );
        report
    }
}
