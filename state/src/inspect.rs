//! Human-readable rendering of saved payloads

use std::fmt::Write;
use viewstate_core::{DiffEntry, InspectConfig, ItemsPayload, Payload};

use crate::composite::NodeSchema;

/// Render `payload` as an indented positional tree
pub fn render_payload(payload: Option<&Payload>, config: &InspectConfig) -> String {
    let mut printer = Printer::new(config);
    printer.node(payload, None, 0);
    printer.out
}

/// Like [`render_payload`], labelling tuple slots with the schema's names
pub fn render_with_schema(
    payload: Option<&Payload>,
    schema: &NodeSchema,
    config: &InspectConfig,
) -> String {
    let mut printer = Printer::new(config);
    printer.node(payload, Some(schema), 0);
    printer.out
}

struct Printer<'a> {
    config: &'a InspectConfig,
    out: String,
}

impl<'a> Printer<'a> {
    fn new(config: &'a InspectConfig) -> Self {
        Self {
            config,
            out: String::new(),
        }
    }

    fn line(&mut self, depth: usize, text: &str) {
        // writing into a String cannot fail
        let _ = writeln!(self.out, "{:indent$}{}", "", text, indent = depth * 2);
    }

    fn node(&mut self, payload: Option<&Payload>, schema: Option<&NodeSchema>, depth: usize) {
        let Some(payload) = payload else {
            self.line(depth, "-");
            return;
        };
        if depth >= self.config.max_depth {
            self.line(depth, "...");
            return;
        }
        match payload {
            Payload::Diff(diff) => {
                self.line(depth, &format!("diff({})", diff.len()));
                for entry in diff {
                    self.entry(entry, depth + 1);
                }
            }
            Payload::Tuple(slots) => {
                self.line(depth, &format!("tuple[{}]", slots.len()));
                for (index, slot) in slots.iter().enumerate() {
                    let child_schema = match index {
                        0 => None,
                        i => schema.and_then(|s| s.slots.get(i - 1)).map(|s| s.as_ref()),
                    };
                    let label = match (index, schema, child_schema) {
                        (0, Some(_), _) => "#0 own".to_string(),
                        (i, _, Some(child)) => format!("#{} {}", i, child.name),
                        (i, _, None) => format!("#{}", i),
                    };
                    self.labelled(&label, slot.as_ref(), child_schema, depth + 1);
                }
            }
            Payload::Items(items) => self.items(items, schema, depth),
        }
    }

    /// Print `label:` followed by the child on the same line when it is a leaf
    fn labelled(
        &mut self,
        label: &str,
        payload: Option<&Payload>,
        schema: Option<&NodeSchema>,
        depth: usize,
    ) {
        match payload {
            None => self.line(depth, &format!("{}: -", label)),
            Some(payload) => {
                self.line(depth, &format!("{}:", label));
                self.node(Some(payload), schema, depth + 1);
            }
        }
    }

    fn items(&mut self, items: &ItemsPayload, schema: Option<&NodeSchema>, depth: usize) {
        let header = if items.rebuilt {
            format!("items(rebuilt, len={})", items.len)
        } else {
            format!("items({} changed)", items.entries.len())
        };
        self.line(depth, &header);
        for (index, entry) in &items.entries {
            self.labelled(&format!("[{}]", index), entry.as_ref(), schema, depth + 1);
        }
    }

    fn entry(&mut self, entry: &DiffEntry, depth: usize) {
        let text = match entry {
            DiffEntry::Removed { key } => format!("{} (removed)", key),
            DiffEntry::Set { key, value } if self.config.show_values => {
                format!("{} = {}", key, value)
            }
            DiffEntry::Set { key, .. } => key.clone(),
        };
        self.line(depth, &text);
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use viewstate_core::DictDiff;

    fn nested() -> Payload {
        Payload::Tuple(vec![
            None,
            None,
            Some(Payload::Tuple(vec![
                Some(DictDiff::from_pairs([("X", "1")]).into()),
                None,
                None,
            ])),
        ])
    }

    #[test]
    fn test_render_none() {
        assert_eq!(render_payload(None, &InspectConfig::default()), "-\n");
    }

    #[test]
    fn test_render_nested_tuple() {
        let text = render_payload(Some(&nested()), &InspectConfig::default());
        let expected = "\
tuple[3]
  #0: -
  #1: -
  #2:
    tuple[3]
      #0:
        diff(1)
          X = \"1\"
      #1: -
      #2: -
";
        assert_eq!(text, expected);
    }

    #[test]
    fn test_render_hides_values() {
        let config = InspectConfig {
            show_values: false,
            ..InspectConfig::default()
        };
        let mut diff = DictDiff::from_pairs([("Text", "secret")]);
        diff.push_removed("Gone");
        let text = render_payload(Some(&Payload::Diff(diff)), &config);
        assert!(text.contains("Text\n"));
        assert!(!text.contains("secret"));
        assert!(text.contains("Gone (removed)"));
    }

    #[test]
    fn test_render_elides_past_max_depth() {
        let config = InspectConfig {
            max_depth: 2,
            ..InspectConfig::default()
        };
        let text = render_payload(Some(&nested()), &config);
        assert!(text.contains("..."));
        assert!(!text.contains("X = "));
    }

    #[test]
    fn test_render_with_schema_labels() {
        let b = NodeSchema::builder("header").leaf_slot("x").leaf_slot("y").build();
        let schema = NodeSchema::builder("field").leaf_slot("control").slot(b).build();
        let text = render_with_schema(Some(&nested()), &schema, &InspectConfig::default());
        assert!(text.contains("#0 own: -"));
        assert!(text.contains("#1 control: -"));
        assert!(text.contains("#2 header:"));
        assert!(text.contains("#2 y: -"));
    }

    #[test]
    fn test_render_items() {
        let items = ItemsPayload::rebuilt(2, vec![(1, Some(DictDiff::from_pairs([("Text", "b")]).into()))]);
        let text = render_payload(Some(&items.into()), &InspectConfig::default());
        assert!(text.starts_with("items(rebuilt, len=2)\n"));
        assert!(text.contains("  [1]:\n"));
    }
}
