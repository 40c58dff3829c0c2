//! Headless in-memory workspace.
//!
//! Models the parts of a block editor the loader relies on: top-level blocks,
//! variable bindings, a nesting event-disable counter, an undo stack fed by
//! emitted events, and change listeners.

use super::{Workspace, WorkspaceError};
use crate::markup::{Element, NormalizedDocument};
use std::collections::BTreeMap;
use tokio::sync::mpsc;
use tracing::{debug, warn};
use uuid::Uuid;

/// A top-level block and the number of blocks nested under it.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Block {
    pub id: String,
    pub kind: String,
    pub nested: usize,
}

/// Change events emitted while events are enabled.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WorkspaceEvent {
    BlockCreated { id: String, kind: String },
    BlockDeleted { id: String },
    VariableCreated { id: String, name: String },
    VariableDeleted { id: String },
}

/// A workspace without a rendering surface.
#[derive(Debug, Default)]
pub struct InMemoryWorkspace {
    blocks: Vec<Block>,
    /// Variable id -> name.
    variables: BTreeMap<String, String>,
    undo_stack: Vec<WorkspaceEvent>,
    redo_stack: Vec<WorkspaceEvent>,
    disabled_depth: usize,
    listeners: Vec<mpsc::UnboundedSender<WorkspaceEvent>>,
    current_strategy_id: Option<String>,
    resize_count: usize,
    render_count: usize,
}

impl InMemoryWorkspace {
    pub fn new() -> Self {
        Self::default()
    }

    /// Receive every change event fired from now on.
    pub fn subscribe(&mut self) -> mpsc::UnboundedReceiver<WorkspaceEvent> {
        let (tx, rx) = mpsc::unbounded_channel();
        self.listeners.push(tx);
        rx
    }

    pub fn blocks(&self) -> &[Block] {
        &self.blocks
    }

    pub fn variables(&self) -> &BTreeMap<String, String> {
        &self.variables
    }

    pub fn undo_depth(&self) -> usize {
        self.undo_stack.len()
    }

    pub fn events_enabled(&self) -> bool {
        self.disabled_depth == 0
    }

    pub fn render_count(&self) -> usize {
        self.render_count
    }

    pub fn resize_count(&self) -> usize {
        self.resize_count
    }

    fn fire(&mut self, event: WorkspaceEvent) {
        if !self.events_enabled() {
            return;
        }
        self.redo_stack.clear();
        self.undo_stack.push(event.clone());
        self.listeners.retain(|tx| tx.send(event.clone()).is_ok());
    }

    fn load_variables(&mut self, variables: &Element) -> Result<(), WorkspaceError> {
        for variable in variables.child_elements().filter(|el| el.name() == "variable") {
            let name = variable.text();
            let id = variable
                .attribute("id")
                .map(str::to_string)
                .unwrap_or_else(|| Uuid::new_v4().to_string());

            if self.variables.contains_key(&id) || self.variables.values().any(|n| *n == name) {
                return Err(WorkspaceError::VariableConflict(name));
            }

            self.variables.insert(id.clone(), name.clone());
            self.fire(WorkspaceEvent::VariableCreated { id, name });
        }
        Ok(())
    }

    fn load_block(&mut self, element: &Element) -> Result<(), WorkspaceError> {
        let kind = element
            .attribute("type")
            .ok_or_else(|| WorkspaceError::MalformedBlock("block without a type".into()))?
            .to_string();

        let id = match element.attribute("id") {
            Some(id) if !self.blocks.iter().any(|b| b.id == id) => id.to_string(),
            Some(id) => {
                let fresh = Uuid::new_v4().to_string();
                debug!("Block id '{}' already in use, assigned '{}'", id, fresh);
                fresh
            }
            None => Uuid::new_v4().to_string(),
        };

        self.blocks.push(Block {
            id: id.clone(),
            kind: kind.clone(),
            nested: element.count_descendants("block"),
        });
        self.fire(WorkspaceEvent::BlockCreated { id, kind });
        Ok(())
    }
}

impl Workspace for InMemoryWorkspace {
    fn clear(&mut self) -> Result<(), WorkspaceError> {
        for block in std::mem::take(&mut self.blocks) {
            self.fire(WorkspaceEvent::BlockDeleted { id: block.id });
        }
        Ok(())
    }

    fn clear_undo(&mut self) {
        self.undo_stack.clear();
        self.redo_stack.clear();
    }

    fn clear_variables(&mut self) {
        for id in std::mem::take(&mut self.variables).into_keys() {
            self.fire(WorkspaceEvent::VariableDeleted { id });
        }
    }

    fn load_document(&mut self, document: &NormalizedDocument) -> Result<(), WorkspaceError> {
        for element in document.root().child_elements() {
            match element.name() {
                "variables" => self.load_variables(element)?,
                "block" | "shadow" => self.load_block(element)?,
                _ => {}
            }
        }
        Ok(())
    }

    fn current_strategy_id(&self) -> Option<String> {
        self.current_strategy_id.clone()
    }

    fn set_current_strategy_id(&mut self, id: Option<String>) {
        self.current_strategy_id = id;
    }

    fn disable_events(&mut self) {
        self.disabled_depth += 1;
    }

    fn enable_events(&mut self) {
        if self.disabled_depth == 0 {
            warn!("Workspace events enabled more often than disabled");
            return;
        }
        self.disabled_depth -= 1;
    }

    fn svg_resize(&mut self) -> Result<(), WorkspaceError> {
        self.resize_count += 1;
        Ok(())
    }

    fn render(&mut self) -> Result<(), WorkspaceError> {
        self.render_count += 1;
        Ok(())
    }
}
