//! Scoped change-event suppression.

use super::Workspace;
use std::ops::{Deref, DerefMut};

/// Disables workspace events on creation and re-enables them on drop.
///
/// Re-enabling happens on every exit path, including early returns and
/// unwinding panics, so a bulk insertion reads as one atomic change.
pub struct SuppressedEvents<'a, W: Workspace + ?Sized> {
    workspace: &'a mut W,
}

impl<'a, W: Workspace + ?Sized> SuppressedEvents<'a, W> {
    pub fn new(workspace: &'a mut W) -> Self {
        workspace.disable_events();
        Self { workspace }
    }
}

impl<W: Workspace + ?Sized> Deref for SuppressedEvents<'_, W> {
    type Target = W;

    fn deref(&self) -> &W {
        self.workspace
    }
}

impl<W: Workspace + ?Sized> DerefMut for SuppressedEvents<'_, W> {
    fn deref_mut(&mut self) -> &mut W {
        self.workspace
    }
}

impl<W: Workspace + ?Sized> Drop for SuppressedEvents<'_, W> {
    fn drop(&mut self) {
        self.workspace.enable_events();
    }
}
