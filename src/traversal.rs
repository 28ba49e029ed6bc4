//! Depth-first export walk over a [`LayerTree`].
//!
//! [`walk_layers`] is the only place that decides which layers get exported and
//! where. It visits nodes in pre-order:
//! - groups are always descended into, whatever their own visibility, with the
//!   [`GroupPath`] extended by the group's sanitized name;
//! - hidden leaves are skipped;
//! - visible leaves first get their directory ensured, then are exported to
//!   `<group path>/<prefix><sanitized name>.png`.
//!
//! Directories are created on behalf of leaves only, so a group that holds
//! nothing but empty groups leaves no trace on disk.
//!
//! What "ensure a directory" and "export a layer" mean is left to a
//! [`LayerSink`]. A failing leaf is logged under its original name, recorded in
//! the [`ExportReport`], and the walk moves on.

use crate::layer_tree::{Layer, LayerNode, LayerTree};
use crate::naming::{export_file_name, GroupPath};
use crate::report::ExportReport;
use anyhow::Result;
use log::{debug, trace, warn};
use std::path::{Path, PathBuf};

/// Capabilities the walk needs from whoever performs the export.
/// Both paths are relative to the output directory.
pub trait LayerSink {
    /// Creates `relative_dir` and its parents; must tolerate existing directories
    fn ensure_dir(&mut self, relative_dir: &Path) -> Result<()>;

    /// Exports a single visible leaf to `relative_file`
    fn export_layer(&mut self, layer: &Layer, relative_file: &Path) -> Result<()>;
}

/// Walks `tree` and hands every visible leaf to `sink`
pub fn walk_layers<S: LayerSink>(tree: &LayerTree, prefix: &str, sink: &mut S) -> ExportReport {
    let mut report = ExportReport::new();
    walk_nodes(&tree.layers, &GroupPath::root(), prefix, sink, &mut report);
    report
}

fn walk_nodes<S: LayerSink>(
    nodes: &[LayerNode],
    group_path: &GroupPath,
    prefix: &str,
    sink: &mut S,
    report: &mut ExportReport,
) {
    for node in nodes {
        match node {
            LayerNode::Group(group) => {
                let current_path = group_path.descend(&group.name);
                trace!("Entering group '{}' ({})", group.name, current_path);
                walk_nodes(&group.children, &current_path, prefix, sink, report);
            }
            LayerNode::Layer(layer) => {
                if !layer.visible {
                    debug!("Skipping hidden layer '{}'", layer.name);
                    report.hidden += 1;
                    continue;
                }
                export_leaf(layer, group_path, prefix, sink, report);
            }
        }
    }
}

fn export_leaf<S: LayerSink>(
    layer: &Layer,
    group_path: &GroupPath,
    prefix: &str,
    sink: &mut S,
    report: &mut ExportReport,
) -> bool {
    let relative_dir = group_path.to_relative_dir();
    let relative_file: PathBuf = relative_dir.join(export_file_name(prefix, &layer.name));

    let result = sink
        .ensure_dir(&relative_dir)
        .and_then(|_| sink.export_layer(layer, &relative_file));

    match result {
        Ok(()) => {
            debug!("Layer '{}' -> {}", layer.name, relative_file.display());
            report.exported.push(relative_file);
            true
        }
        Err(e) => {
            warn!("Error exporting {}: {:#}", layer.name, e);
            report.record_failure(&layer.name, format!("{:#}", e));
            false
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::layer_tree::Group;
    use anyhow::anyhow;

    /// Records every call instead of touching the filesystem
    #[derive(Default)]
    struct RecordingSink {
        dirs: Vec<PathBuf>,
        files: Vec<PathBuf>,
        fail_on: Option<String>,
    }

    impl LayerSink for RecordingSink {
        fn ensure_dir(&mut self, relative_dir: &Path) -> Result<()> {
            if !self.dirs.iter().any(|d| d == relative_dir) {
                self.dirs.push(relative_dir.to_path_buf());
            }
            Ok(())
        }

        fn export_layer(&mut self, layer: &Layer, relative_file: &Path) -> Result<()> {
            if self.fail_on.as_deref() == Some(layer.name.as_str()) {
                return Err(anyhow!("procedure returned an error"));
            }
            self.files.push(relative_file.to_path_buf());
            Ok(())
        }
    }

    fn leaf(name: &str, visible: bool, locator: &[usize]) -> LayerNode {
        LayerNode::Layer(Layer {
            name: name.to_string(),
            visible,
            width: 16,
            height: 16,
            locator: locator.to_vec(),
        })
    }

    fn group(name: &str, locator: &[usize], children: Vec<LayerNode>) -> LayerNode {
        LayerNode::Group(Group {
            name: name.to_string(),
            visible: true,
            locator: locator.to_vec(),
            children,
        })
    }

    fn tree(layers: Vec<LayerNode>) -> LayerTree {
        LayerTree {
            name: "test.xcf".to_string(),
            width: 16,
            height: 16,
            layers,
        }
    }

    #[test]
    fn test_sprite_sheet_scenario() {
        let image = tree(vec![
            leaf("Background", true, &[0]),
            group(
                "Group#1",
                &[1],
                vec![leaf("Eyes", true, &[1, 0]), leaf("Hidden Layer", false, &[1, 1])],
            ),
        ]);

        let mut sink = RecordingSink::default();
        let report = walk_layers(&image, "spr_", &mut sink);

        assert_eq!(
            sink.files,
            vec![
                PathBuf::from("spr_background.png"),
                Path::new("group_1").join("spr_eyes.png"),
            ]
        );
        assert_eq!(sink.dirs, vec![PathBuf::new(), PathBuf::from("group_1")]);
        assert_eq!(report.exported, sink.files);
        assert_eq!(report.hidden, 1);
        assert!(!report.has_failures());
    }

    #[test]
    fn test_hidden_leaf_does_not_affect_siblings() {
        let image = tree(vec![
            leaf("One", true, &[0]),
            leaf("Two", false, &[1]),
            leaf("Three", true, &[2]),
        ]);

        let mut sink = RecordingSink::default();
        let report = walk_layers(&image, "", &mut sink);

        assert_eq!(
            sink.files,
            vec![PathBuf::from("one.png"), PathBuf::from("three.png")]
        );
        assert_eq!(report.hidden, 1);
    }

    #[test]
    fn test_nested_groups_mirror_directories() {
        let image = tree(vec![group(
            "A",
            &[0],
            vec![group("B", &[0, 0], vec![leaf("Leaf Layer", true, &[0, 0, 0])])],
        )]);

        let mut sink = RecordingSink::default();
        walk_layers(&image, "p_", &mut sink);

        assert_eq!(
            sink.files,
            vec![Path::new("a").join("b").join("p_leaf_layer.png")]
        );
        assert_eq!(sink.dirs, vec![Path::new("a").join("b")]);
    }

    #[test]
    fn test_groups_without_leaves_create_nothing() {
        let image = tree(vec![
            group("Outer", &[0], vec![group("Inner", &[0, 0], Vec::new())]),
            group("Only Hidden", &[1], vec![leaf("Ghost", false, &[1, 0])]),
        ]);

        let mut sink = RecordingSink::default();
        let report = walk_layers(&image, "", &mut sink);

        assert!(sink.dirs.is_empty());
        assert!(sink.files.is_empty());
        assert_eq!(report.hidden, 1);
    }

    #[test]
    fn test_hidden_group_is_still_walked() {
        let image = tree(vec![LayerNode::Group(Group {
            name: "Off".to_string(),
            visible: false,
            locator: vec![0],
            children: vec![leaf("Inside", true, &[0, 0])],
        })]);

        let mut sink = RecordingSink::default();
        walk_layers(&image, "", &mut sink);

        assert_eq!(sink.files, vec![Path::new("off").join("inside.png")]);
    }

    #[test]
    fn test_failure_is_recorded_and_walk_continues() {
        let image = tree(vec![
            leaf("Broken Layer", true, &[0]),
            leaf("Fine", true, &[1]),
        ]);

        let mut sink = RecordingSink {
            fail_on: Some("Broken Layer".to_string()),
            ..Default::default()
        };
        let report = walk_layers(&image, "", &mut sink);

        assert_eq!(sink.files, vec![PathBuf::from("fine.png")]);
        assert_eq!(report.exported, vec![PathBuf::from("fine.png")]);
        assert_eq!(report.failures.len(), 1);
        assert_eq!(report.failures[0].layer, "Broken Layer");
        assert!(report.failures[0].reason.contains("procedure returned an error"));
    }
}
