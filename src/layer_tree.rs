//! Typed view of an image's layer hierarchy as described by the host.
//!
//! The host adapter walks its own object model once, right after loading the
//! image, and tags every node as either a [`LayerNode::Layer`] (pixel content)
//! or a [`LayerNode::Group`] (container). Anything the host cannot identify as
//! a group is described as a leaf layer. The description travels as JSON:
//!
//! ```json
//! {
//!   "name": "sprite.xcf", "width": 64, "height": 64,
//!   "layers": [
//!     { "kind": "layer", "name": "Background", "visible": true,
//!       "width": 64, "height": 64, "locator": [0] },
//!     { "kind": "group", "name": "Group#1", "visible": true, "locator": [1],
//!       "children": [] }
//!   ]
//! }
//! ```
//!
//! Every node carries a `locator`: the child-index path from the image root.
//! The host uses it to find the same layer again when exporting.

use anyhow::{Context, Result};
use serde::Deserialize;
use std::fs;
use std::path::Path;

/// Leaf layer with pixel content
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Layer {
    pub name: String,
    pub visible: bool,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    pub locator: Vec<usize>,
}

/// Container of other layers
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct Group {
    pub name: String,
    #[serde(default = "default_visible")]
    pub visible: bool,
    pub locator: Vec<usize>,
    #[serde(default)]
    pub children: Vec<LayerNode>,
}

fn default_visible() -> bool {
    true
}

#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
#[serde(tag = "kind", rename_all = "snake_case")]
pub enum LayerNode {
    Layer(Layer),
    Group(Group),
}

impl LayerNode {
    pub fn name(&self) -> &str {
        match self {
            LayerNode::Layer(layer) => &layer.name,
            LayerNode::Group(group) => &group.name,
        }
    }

    pub fn locator(&self) -> &[usize] {
        match self {
            LayerNode::Layer(layer) => &layer.locator,
            LayerNode::Group(group) => &group.locator,
        }
    }
}

/// Loaded image as reported by the host
#[derive(Debug, Clone, PartialEq, Eq, Deserialize)]
pub struct LayerTree {
    #[serde(default)]
    pub name: String,
    #[serde(default)]
    pub width: u32,
    #[serde(default)]
    pub height: u32,
    #[serde(default)]
    pub layers: Vec<LayerNode>,
}

impl LayerTree {
    pub fn from_json(content: &str) -> Result<Self> {
        serde_json::from_str(content).context("Failed to parse layer tree description")
    }

    pub fn load(path: &Path) -> Result<Self> {
        let content = fs::read_to_string(path)
            .with_context(|| format!("Failed to read layer tree from {}", path.display()))?;
        Self::from_json(&content)
    }

    /// Total number of leaf layers, visible or not
    pub fn leaf_count(&self) -> usize {
        fn count(nodes: &[LayerNode]) -> usize {
            nodes
                .iter()
                .map(|node| match node {
                    LayerNode::Layer(_) => 1,
                    LayerNode::Group(group) => count(&group.children),
                })
                .sum()
        }
        count(&self.layers)
    }
}
