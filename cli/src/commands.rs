//! CLI Commands

use anyhow::Context;
use std::collections::HashSet;
use std::path::Path;
use std::sync::Arc;
use tracing::{debug, info};
use viewstate_controls::{Color, DataControlField, FontUnit, Unit};
use viewstate_core::{
    InspectConfig, Payload, StatefulNode, ViewStateConfig, ViewStateError, ViewStateResult,
};
use viewstate_state::{render_payload, render_with_schema, NodeSchema, TreeSnapshot};

/// Load configuration from `path`, or defaults when none is given
pub fn load_config(path: Option<&Path>) -> anyhow::Result<ViewStateConfig> {
    match path {
        Some(path) => ViewStateConfig::from_file(path)
            .with_context(|| format!("loading config from {}", path.display())),
        None => Ok(ViewStateConfig::default()),
    }
}

/// Known payload shapes the inspector can label
#[derive(Debug, Clone, Copy, PartialEq, Eq, clap::ValueEnum)]
pub enum SchemaKind {
    Field,
    WebControl,
    List,
}

impl SchemaKind {
    pub fn schema(self) -> Arc<NodeSchema> {
        match self {
            SchemaKind::Field => NodeSchema::builder("DataControlField")
                .leaf_slot("control_style")
                .leaf_slot("footer_style")
                .leaf_slot("header_style")
                .leaf_slot("item_style")
                .build(),
            SchemaKind::WebControl => web_control_schema(),
            SchemaKind::List => NodeSchema::builder("ListControl")
                .slot(web_control_schema())
                .leaf_slot("items")
                .build(),
        }
    }
}

fn web_control_schema() -> Arc<NodeSchema> {
    NodeSchema::builder("WebControl")
        .leaf_slot("style")
        .leaf_slot("attributes")
        .build()
}

/// Read a payload file
///
/// Accepts either a snapshot written by `demo --out` or a bare payload
/// (`null` included).
pub fn read_payload(path: &Path) -> anyhow::Result<Option<Payload>> {
    let json = std::fs::read_to_string(path)
        .with_context(|| format!("reading {}", path.display()))?;
    if let Ok(snapshot) = TreeSnapshot::from_json(&json) {
        debug!(root = %snapshot.root, "read snapshot");
        return Ok(snapshot.payload);
    }
    let payload: Option<Payload> = serde_json::from_str(&json)
        .map_err(|e| ViewStateError::corrupt(format!("unreadable payload: {}", e)))?;
    Ok(payload)
}

/// Check the shape rules a loader enforces, without a tree to load into
pub fn validate_payload(payload: &Payload) -> ViewStateResult<()> {
    match payload {
        Payload::Diff(diff) => {
            let mut seen = HashSet::new();
            for entry in diff {
                if entry.key().is_empty() {
                    return Err(ViewStateError::corrupt("diff contains an empty key"));
                }
                if !seen.insert(entry.key()) {
                    return Err(ViewStateError::corrupt(format!(
                        "diff repeats key {}",
                        entry.key()
                    )));
                }
            }
            Ok(())
        }
        Payload::Tuple(slots) => {
            if slots.is_empty() {
                return Err(ViewStateError::corrupt("tuple has no own-state position"));
            }
            slots.iter().flatten().try_for_each(validate_payload)
        }
        Payload::Items(items) => {
            let mut previous: Option<usize> = None;
            for (index, entry) in &items.entries {
                if previous.is_some_and(|p| p >= *index) {
                    return Err(ViewStateError::corrupt(format!(
                        "item index {} out of order",
                        index
                    )));
                }
                if items.rebuilt && *index >= items.len {
                    return Err(ViewStateError::corrupt(format!(
                        "item index {} outside rebuilt length {}",
                        index, items.len
                    )));
                }
                previous = Some(*index);
                if let Some(entry) = entry {
                    validate_payload(entry)?;
                }
            }
            Ok(())
        }
    }
}

/// Validate and render a payload
pub fn inspect(
    payload: Option<&Payload>,
    schema: Option<SchemaKind>,
    config: &InspectConfig,
) -> ViewStateResult<String> {
    if let Some(payload) = payload {
        validate_payload(payload)?;
    }
    let tree = match schema {
        Some(kind) => render_with_schema(payload, &kind.schema(), config),
        None => render_payload(payload, config),
    };
    let entries = payload.map(Payload::entry_count).unwrap_or(0);
    Ok(format!("{}{} entries\n", tree, entries))
}

/// Values read back from the restored demo field
#[derive(Debug, Clone, PartialEq)]
pub struct DemoReport {
    pub snapshot: TreeSnapshot,
    pub header_text: String,
    pub sort_expression: String,
    pub visible: bool,
    pub header_back_color: Color,
    pub item_width: Unit,
}

fn demo_field() -> DataControlField {
    let mut field = DataControlField::new();
    field.set_header_text("Product");
    field
}

/// One simulated request cycle on a data field
pub fn run_demo() -> ViewStateResult<DemoReport> {
    let mut field = demo_field();
    field.begin_tracking();

    field.set_sort_expression("Name ASC");
    field.set_visible(false);
    let header = field.header_style_mut();
    header.set_back_color(Color::Rgb(0x33, 0x66, 0x99));
    header.font_mut().set_bold(true);
    header.font_mut().set_size(FontUnit::Large)?;
    field.item_style_mut().set_width(Unit::pixel(140.0))?;

    let snapshot = TreeSnapshot::capture("DataControlField", &field);
    info!(entries = snapshot.entry_count(), "demo field saved");

    let mut restored = demo_field();
    snapshot.restore_into(&mut restored)?;
    restored.begin_tracking();

    Ok(DemoReport {
        header_text: restored.header_text(),
        sort_expression: restored.sort_expression(),
        visible: restored.visible(),
        header_back_color: restored
            .header_style()
            .map(|s| s.back_color())
            .unwrap_or_default(),
        item_width: restored
            .item_style()
            .map(|s| s.width())
            .unwrap_or(Unit::EMPTY),
        snapshot,
    })
}
