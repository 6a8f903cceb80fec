//! Widget factory contract and the in-memory widget tree.
//!
//! The composition engine only talks to [`WidgetFactory`]. [`WidgetTree`]
//! is the factory used by the bench: it validates geometry, keeps the
//! attached nodes, and is what `gridbench-ui` draws.

use std::collections::BTreeMap;
use std::fmt;

use serde::{Deserialize, Serialize};
use serde_json::{Map, Value};

use crate::value::FlatConfig;

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum WidgetKind {
    Grid,
    Box,
}

/// Options of a grid container.
///
/// Field names match the grid's settings controls (`fullSize` etc.), so a
/// widget store's flat config deserializes straight into this struct.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct GridOptions {
    pub col: u16,
    pub line: u16,
    pub width: Option<u16>,
    pub height: Option<u16>,
    pub columns: u16,
    pub rows: u16,
    /// Fill the available area instead of using `width`/`height`.
    pub full_size: bool,
}

impl Default for GridOptions {
    fn default() -> Self {
        Self {
            col: 0,
            line: 0,
            width: None,
            height: None,
            columns: 1,
            rows: 1,
            full_size: false,
        }
    }
}

impl GridOptions {
    /// Read grid options out of a flat config. Unset entries fall back to
    /// the defaults; values that do not fit a cell coordinate are rejected.
    pub fn from_config(config: &FlatConfig) -> Result<Self, WidgetError> {
        let mut object = Map::new();
        for (name, value) in config {
            let Some(value) = value else {
                continue;
            };
            let value = serde_json::to_value(value)
                .map_err(|err| WidgetError::InvalidOptions(err.to_string()))?;
            object.insert(name.clone(), value);
        }
        serde_json::from_value(Value::Object(object))
            .map_err(|err| WidgetError::InvalidOptions(format!("grid options: {err}")))
    }
}

#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct BoxOptions {
    pub title: String,
}

impl BoxOptions {
    pub fn titled(title: impl Into<String>) -> Self {
        Self {
            title: title.into(),
        }
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetOptions {
    Grid(GridOptions),
    Box(BoxOptions),
}

impl WidgetOptions {
    pub fn kind(&self) -> WidgetKind {
        match self {
            WidgetOptions::Grid(_) => WidgetKind::Grid,
            WidgetOptions::Box(_) => WidgetKind::Box,
        }
    }
}

/// Cell position and span of a child inside its container.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct Placement {
    pub col: u16,
    pub line: u16,
    pub width: u16,
    pub height: u16,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash)]
pub struct WidgetHandle(u64);

impl fmt::Display for WidgetHandle {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "#{}", self.0)
    }
}

#[derive(Debug, Clone, PartialEq, Eq)]
pub enum WidgetError {
    UnknownWidget(WidgetHandle),
    NotAContainer(WidgetHandle),
    InvalidOptions(String),
    OutOfBounds {
        placement: Placement,
        columns: u16,
        rows: u16,
    },
}

impl fmt::Display for WidgetError {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Self::UnknownWidget(handle) => write!(f, "unknown widget {handle}"),
            Self::NotAContainer(handle) => write!(f, "widget {handle} cannot hold children"),
            Self::InvalidOptions(msg) => write!(f, "invalid widget options: {msg}"),
            Self::OutOfBounds {
                placement,
                columns,
                rows,
            } => write!(
                f,
                "placement {}x{} at ({}, {}) does not fit a {columns}x{rows} grid",
                placement.width, placement.height, placement.col, placement.line
            ),
        }
    }
}

impl std::error::Error for WidgetError {}

/// Creates widgets at the root level and inside containers.
pub trait WidgetFactory {
    /// Attach a new top-level widget. Existing roots are left in place.
    fn attach_root(&mut self, options: WidgetOptions) -> Result<WidgetHandle, WidgetError>;

    /// Attach a child at `placement` inside the container `parent`.
    fn attach_child(
        &mut self,
        parent: WidgetHandle,
        placement: Placement,
        options: WidgetOptions,
    ) -> Result<WidgetHandle, WidgetError>;

    /// Destroy a widget and everything under it.
    fn detach(&mut self, handle: WidgetHandle) -> bool;
}

#[derive(Debug, Clone)]
pub struct WidgetNode {
    pub handle: WidgetHandle,
    pub options: WidgetOptions,
    pub placement: Option<Placement>,
    pub parent: Option<WidgetHandle>,
    pub children: Vec<WidgetHandle>,
}

/// Structural copy of a subtree, without handles.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct NodeSnapshot {
    pub options: WidgetOptions,
    pub placement: Option<Placement>,
    pub children: Vec<NodeSnapshot>,
}

#[derive(Debug, Default)]
pub struct WidgetTree {
    nodes: BTreeMap<WidgetHandle, WidgetNode>,
    roots: Vec<WidgetHandle>,
    next: u64,
}

impl WidgetTree {
    pub fn new() -> Self {
        Self::default()
    }

    /// The most recently attached root.
    pub fn root(&self) -> Option<&WidgetNode> {
        self.roots.last().and_then(|handle| self.nodes.get(handle))
    }

    pub fn get(&self, handle: WidgetHandle) -> Option<&WidgetNode> {
        self.nodes.get(&handle)
    }

    pub fn children(&self, handle: WidgetHandle) -> impl Iterator<Item = &WidgetNode> + '_ {
        self.nodes
            .get(&handle)
            .into_iter()
            .flat_map(|node| node.children.iter())
            .filter_map(|child| self.nodes.get(child))
    }

    /// Number of live widgets, roots included.
    pub fn len(&self) -> usize {
        self.nodes.len()
    }

    pub fn is_empty(&self) -> bool {
        self.nodes.is_empty()
    }

    pub fn snapshot(&self, handle: WidgetHandle) -> Option<NodeSnapshot> {
        let node = self.nodes.get(&handle)?;
        Some(NodeSnapshot {
            options: node.options.clone(),
            placement: node.placement,
            children: node
                .children
                .iter()
                .filter_map(|child| self.snapshot(*child))
                .collect(),
        })
    }

    fn insert(
        &mut self,
        options: WidgetOptions,
        placement: Option<Placement>,
        parent: Option<WidgetHandle>,
    ) -> WidgetHandle {
        self.next += 1;
        let handle = WidgetHandle(self.next);
        self.nodes.insert(
            handle,
            WidgetNode {
                handle,
                options,
                placement,
                parent,
                children: Vec::new(),
            },
        );
        handle
    }
}

fn validate_root(options: &WidgetOptions) -> Result<(), WidgetError> {
    let WidgetOptions::Grid(grid) = options else {
        return Ok(());
    };
    if grid.columns == 0 || grid.rows == 0 {
        return Err(WidgetError::InvalidOptions(format!(
            "grid needs at least one column and one row, got {}x{}",
            grid.columns, grid.rows
        )));
    }
    if !grid.full_size {
        let sized = matches!((grid.width, grid.height), (Some(w), Some(h)) if w > 0 && h > 0);
        if !sized {
            return Err(WidgetError::InvalidOptions(
                "grid without fullSize needs a width and height of at least 1".into(),
            ));
        }
    }
    Ok(())
}

impl WidgetFactory for WidgetTree {
    fn attach_root(&mut self, options: WidgetOptions) -> Result<WidgetHandle, WidgetError> {
        validate_root(&options)?;
        let handle = self.insert(options, None, None);
        self.roots.push(handle);
        Ok(handle)
    }

    fn attach_child(
        &mut self,
        parent: WidgetHandle,
        placement: Placement,
        options: WidgetOptions,
    ) -> Result<WidgetHandle, WidgetError> {
        let container = self
            .nodes
            .get(&parent)
            .ok_or(WidgetError::UnknownWidget(parent))?;
        let WidgetOptions::Grid(grid) = &container.options else {
            return Err(WidgetError::NotAContainer(parent));
        };

        let fits = placement.width > 0
            && placement.height > 0
            && u32::from(placement.col) + u32::from(placement.width) <= u32::from(grid.columns)
            && u32::from(placement.line) + u32::from(placement.height) <= u32::from(grid.rows);
        if !fits {
            return Err(WidgetError::OutOfBounds {
                placement,
                columns: grid.columns,
                rows: grid.rows,
            });
        }

        let handle = self.insert(options, Some(placement), Some(parent));
        if let Some(container) = self.nodes.get_mut(&parent) {
            container.children.push(handle);
        }
        Ok(handle)
    }

    fn detach(&mut self, handle: WidgetHandle) -> bool {
        let Some(node) = self.nodes.remove(&handle) else {
            return false;
        };
        match node.parent {
            Some(parent) => {
                if let Some(parent) = self.nodes.get_mut(&parent) {
                    parent.children.retain(|child| *child != handle);
                }
            }
            None => self.roots.retain(|root| *root != handle),
        }
        for child in node.children {
            self.detach(child);
        }
        true
    }
}
