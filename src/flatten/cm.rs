//! Configuration (CM) tree flattening
//!
//! Two walkers cover the CM conventions in the wild: a generic
//! "managed object with class attribute" tree (Nokia) and the 3GPP bulk-CM
//! container style with `vsData`-prefixed type names (Ericsson). Both carry
//! the enclosing object class down the recursion explicitly, so a finished
//! subtree can never leak its class into a sibling.

use std::collections::BTreeMap;

use log::debug;

use crate::flatten::types::{ConfigRecord, FlattenStats};
use crate::source::RawNode;

/// Per-class record batches plus the document capture time
pub type ClassBatches = BTreeMap<String, Vec<ConfigRecord>>;

/// Fields nested deeper than this many element levels are dropped
const MAX_NESTING: usize = 3;

const VS_DATA_PREFIX: &str = "vsData";

/// Flatten a class-attribute tree (Nokia style)
///
/// An element carrying a `class` attribute opens a new record; its other
/// attributes become fields in document order. Attributed descendants
/// contribute to the nearest enclosing record: `list` elements join their
/// children's texts with `;` (an empty list still yields an empty field),
/// anything else contributes one (attribute value -> element text) pair per
/// attribute. Attributed elements outside any record cannot be routed and
/// are only counted.
pub fn flatten_class_tree(
    doc: &RawNode,
    stats: &mut FlattenStats,
) -> (ClassBatches, Option<String>) {
    let mut walk = ClassWalk {
        capture_time: None,
        batches: BTreeMap::new(),
        stats,
    };
    walk.visit(doc, None);
    (walk.batches, walk.capture_time)
}

struct ClassWalk<'a> {
    capture_time: Option<String>,
    batches: ClassBatches,
    stats: &'a mut FlattenStats,
}

impl ClassWalk<'_> {
    fn visit(&mut self, node: &RawNode, mut record: Option<&mut ConfigRecord>) {
        if let Some(stamp) = node.attr("dateTime") {
            self.capture_time = Some(stamp.to_owned());
        }

        if let Some(class) = node.attr("class") {
            let mut opened = ConfigRecord::new(class);
            for (name, value) in &node.attrs {
                if name != "class" {
                    opened.push(name.clone(), value.clone());
                }
            }
            for child in &node.children {
                self.visit(child, Some(&mut opened));
            }
            self.batches
                .entry(opened.object_class.clone())
                .or_default()
                .push(opened);
            return;
        }

        if !node.attrs.is_empty() {
            match record.as_deref_mut() {
                Some(open) => {
                    if node.tag == "list" {
                        let joined = node
                            .children
                            .iter()
                            .filter_map(|member| member.text.as_deref())
                            .collect::<Vec<_>>()
                            .join(";");
                        for (_, value) in &node.attrs {
                            open.push(value.clone(), joined.clone());
                        }
                        return;
                    }
                    let text = node.text.clone().unwrap_or_default();
                    for (_, value) in &node.attrs {
                        open.push(value.clone(), text.clone());
                    }
                }
                None => {
                    self.stats.unroutable += 1;
                }
            }
        }

        for child in &node.children {
            self.visit(child, record.as_deref_mut());
        }
    }
}

/// Flatten a 3GPP bulk-CM document (Ericsson style)
///
/// Every `VsDataContainer` yields one record: its `id` attribute, then the
/// flattened fields of its first child element. A child whose text holds an
/// embedded line break is a structured group; its nested scalars are pulled
/// into the same flat record, up to [`MAX_NESTING`] levels. The object
/// class comes from the `vsDataType` field with the `vsData` prefix
/// stripped; containers without one cannot be routed.
pub fn flatten_bulk_vs_data(
    doc: &RawNode,
    stats: &mut FlattenStats,
) -> (ClassBatches, Option<String>) {
    let mut batches: ClassBatches = BTreeMap::new();

    for container in doc.find_all("VsDataContainer") {
        let mut record = ConfigRecord::default();
        if let Some(id) = container.attr("id") {
            record.push("id", id);
        }
        if let Some(group) = container.children.first() {
            collect_nested(group, 0, &mut record, stats);
        }

        match object_class(&record) {
            Some(class) => {
                record.object_class = class.clone();
                batches.entry(class).or_default().push(record);
            }
            None => stats.unroutable += 1,
        }
    }

    (batches, last_date_time(doc))
}

fn collect_nested(group: &RawNode, depth: usize, record: &mut ConfigRecord, stats: &mut FlattenStats) {
    for child in &group.children {
        let text = child.text.clone().unwrap_or_default();
        record.push(child.tag.clone(), text.clone());

        if text.contains('\n') {
            if depth + 1 < MAX_NESTING {
                collect_nested(child, depth + 1, record, stats);
            } else {
                debug!("dropping {} nested beyond {} levels", child.tag, MAX_NESTING);
                stats.depth_dropped += 1;
            }
        }
    }
}

fn object_class(record: &ConfigRecord) -> Option<String> {
    let type_name = record
        .fields
        .iter()
        .find(|(name, _)| name == "vsDataType")
        .map(|(_, value)| value.trim())?;
    if type_name.is_empty() {
        return None;
    }
    Some(
        type_name
            .strip_prefix(VS_DATA_PREFIX)
            .unwrap_or(type_name)
            .to_owned(),
    )
}

fn last_date_time(node: &RawNode) -> Option<String> {
    let mut found = node.attr("dateTime").map(str::to_owned);
    for child in &node.children {
        if let Some(stamp) = last_date_time(child) {
            found = Some(stamp);
        }
    }
    found
}
