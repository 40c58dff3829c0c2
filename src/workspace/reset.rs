//! Clean-slate protocol run before every load.

use super::{Workspace, WorkspaceError};
use tracing::debug;

/// Bring a workspace back to an empty state.
///
/// Clears blocks, then variable bindings, since variable ids from an
/// unrelated strategy can collide with the next one. Undo history goes last
/// so nothing the reset did can be undone. Every step is idempotent.
pub fn reset<W: Workspace + ?Sized>(workspace: &mut W) -> Result<(), WorkspaceError> {
    debug!("Clearing existing workspace");
    workspace.clear()?;
    workspace.clear_variables();
    workspace.clear_undo();
    Ok(())
}
