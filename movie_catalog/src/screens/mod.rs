//! View-models for the client's screens.
//!
//! Each type holds the state a screen keeps between user actions and drives
//! the access layer and session lifecycle. Rendering is left to the front end.

use std::sync::atomic::{AtomicBool, Ordering};

use crate::session::SessionSnapshot;

pub mod forms;
pub mod profile;
pub mod saved;

pub use forms::{SignInForm, SignUpForm};
pub use profile::ProfileEditor;
pub use saved::{SavedIds, SavedList, SavedToggle, ToggleOutcome};

/// Top-level destination chosen from the session state
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum Route {
    Splash,
    SignIn,
    Tabs,
}

/// Where the client should land for the given session state
pub fn landing_route(snapshot: &SessionSnapshot) -> Route {
    if snapshot.is_loading() {
        Route::Splash
    } else if snapshot.is_logged() {
        Route::Tabs
    } else {
        Route::SignIn
    }
}

/// In-flight marker for a screen action
#[derive(Debug, Default)]
pub(crate) struct BusyFlag(AtomicBool);

impl BusyFlag {
    /// Take the flag, or `None` if an action is already running
    pub(crate) fn try_begin(&self) -> Option<BusyGuard<'_>> {
        self.0
            .compare_exchange(false, true, Ordering::AcqRel, Ordering::Acquire)
            .ok()
            .map(|_| BusyGuard(&self.0))
    }

    pub(crate) fn is_busy(&self) -> bool {
        self.0.load(Ordering::Acquire)
    }
}

/// Releases the flag when dropped, on every exit path
pub(crate) struct BusyGuard<'a>(&'a AtomicBool);

impl Drop for BusyGuard<'_> {
    fn drop(&mut self) {
        self.0.store(false, Ordering::Release);
    }
}
