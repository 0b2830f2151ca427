//! Parser for Chromium profile `Bookmarks` files.
//!
//! Each entry under `roots` (bookmark bar, other, mobile) becomes a
//! first-level folder of a synthetic root.
//!
//! The file is read into a shallow node model rather than a `serde_json::Value`:
//! nesting is unbounded, fields of the wrong type are ignored instead of
//! failing the whole file, and nodes are released without recursion.

use std::fmt;

use serde::de::{self, Deserialize, Deserializer, MapAccess, SeqAccess, Visitor};
use tracing::{debug, warn};

use crate::domain::TempLink;

use super::{FolderStack, ParsedTree, SourceFormat, TreeParser};
use crate::core::error::ParseError;

/// Well-known roots, in the order browsers display them
const ROOT_ORDER: [&str; 3] = ["bookmark_bar", "other", "synced"];

/// Tree parser for Chromium JSON bookmark files
#[derive(Debug, Clone, Copy, Default)]
pub struct ChromiumParser;

impl TreeParser for ChromiumParser {
    fn parse(&self, raw: &str) -> Result<ParsedTree, ParseError> {
        let Json::Node(mut document) = read_json(raw.trim_start_matches('\u{feff}'))? else {
            return Err(ParseError::UnexpectedShape(
                "top level is not an object".into(),
            ));
        };
        let mut roots = document
            .take_member("roots")
            .ok_or(ParseError::MissingRootContainer {
                format: "Chromium JSON",
            })?;

        let mut ordered: Vec<RawNode> = ROOT_ORDER
            .iter()
            .filter_map(|key| roots.take_member(key))
            .collect();
        roots.members.sort_by(|(a, _), (b, _)| a.cmp(b));
        ordered.extend(roots.members.drain(..).map(|(_, node)| node));

        let mut stack = FolderStack::new();
        stack.open("Bookmarks".to_string());
        for node in &ordered {
            if node.kind() == NodeKind::Folder {
                read_folder(node, &mut stack);
            } else {
                warn!("Skipping bookmark root that is not a folder");
                stack.stats_mut().skipped_nodes += 1;
            }
        }

        let root = stack.close().ok_or(ParseError::MissingRootContainer {
            format: "Chromium JSON",
        })?;
        let stats = stack.into_stats();
        debug!(
            folders = stats.folders,
            links = stats.links,
            dropped = stats.links_without_href,
            "Parsed Chromium bookmark file"
        );

        Ok(ParsedTree {
            root: root.into(),
            format: SourceFormat::ChromiumJson,
            stats,
        })
    }
}

/// Deserialize without serde_json's nesting limit, growing the stack on
/// demand instead
fn read_json(raw: &str) -> Result<Json, ParseError> {
    let mut deserializer = serde_json::Deserializer::from_str(raw);
    deserializer.disable_recursion_limit();
    let value = Json::deserialize(serde_stacker::Deserializer::new(&mut deserializer))?;
    deserializer.end()?;
    Ok(value)
}

// ============================================================================
// Node model
// ============================================================================

/// A JSON value as far as bookmark files care: objects are nodes, arrays are
/// child lists, strings are field values and everything else is ignored
enum Json {
    Node(RawNode),
    List(Vec<RawNode>),
    Text(String),
    Other,
}

impl Json {
    fn into_node(self) -> RawNode {
        match self {
            Json::Node(node) => node,
            _ => RawNode::default(),
        }
    }
}

/// One JSON object of the bookmark file
#[derive(Debug, Default)]
struct RawNode {
    /// False for array elements that were not objects
    object: bool,
    kind: Option<String>,
    name: Option<String>,
    url: Option<String>,
    icon: Option<String>,
    children: Option<Vec<RawNode>>,
    /// Other object-valued members (`roots`, the roots themselves, `meta_info`)
    members: Vec<(String, RawNode)>,
}

#[derive(Debug, Clone, Copy, PartialEq, Eq)]
enum NodeKind {
    Folder,
    Url,
    Unknown,
}

impl RawNode {
    fn kind(&self) -> NodeKind {
        if !self.object {
            return NodeKind::Unknown;
        }
        match self.kind.as_deref() {
            Some("folder") => NodeKind::Folder,
            Some("url") => NodeKind::Url,
            Some(_) => NodeKind::Unknown,
            None if self.children.is_some() => NodeKind::Folder,
            None if self.url.is_some() => NodeKind::Url,
            None => NodeKind::Unknown,
        }
    }

    fn take_member(&mut self, key: &str) -> Option<RawNode> {
        let index = self.members.iter().position(|(name, _)| name == key)?;
        Some(self.members.remove(index).1)
    }

    fn children(&self) -> std::slice::Iter<'_, RawNode> {
        self.children.as_deref().unwrap_or(&[]).iter()
    }
}

fn text(field: &Option<String>) -> &str {
    field.as_deref().unwrap_or("").trim()
}

// Nested nodes are released through an explicit stack so deep files never
// recurse on drop.
impl Drop for RawNode {
    fn drop(&mut self) {
        let mut pending: Vec<RawNode> = self.children.take().unwrap_or_default();
        pending.extend(self.members.drain(..).map(|(_, node)| node));

        while let Some(mut node) = pending.pop() {
            if let Some(children) = node.children.take() {
                pending.extend(children);
            }
            pending.extend(node.members.drain(..).map(|(_, member)| member));
        }
    }
}

impl<'de> Deserialize<'de> for Json {
    fn deserialize<D: Deserializer<'de>>(deserializer: D) -> Result<Self, D::Error> {
        deserializer.deserialize_any(JsonVisitor)
    }
}

struct JsonVisitor;

impl<'de> Visitor<'de> for JsonVisitor {
    type Value = Json;

    fn expecting(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str("a JSON value")
    }

    fn visit_map<A: MapAccess<'de>>(self, mut map: A) -> Result<Json, A::Error> {
        let mut node = RawNode::default();
        node.object = true;

        while let Some(key) = map.next_key::<String>()? {
            match map.next_value::<Json>()? {
                Json::Text(value) => match key.as_str() {
                    "type" => node.kind = Some(value),
                    "name" => node.name = Some(value),
                    "url" => node.url = Some(value),
                    "icon" => node.icon = Some(value),
                    _ => {}
                },
                Json::List(children) if key == "children" => node.children = Some(children),
                Json::Node(member) => node.members.push((key, member)),
                Json::List(_) | Json::Other => {}
            }
        }

        Ok(Json::Node(node))
    }

    fn visit_seq<A: SeqAccess<'de>>(self, mut seq: A) -> Result<Json, A::Error> {
        let mut items = Vec::new();
        while let Some(item) = seq.next_element::<Json>()? {
            items.push(item.into_node());
        }
        Ok(Json::List(items))
    }

    fn visit_str<E: de::Error>(self, value: &str) -> Result<Json, E> {
        Ok(Json::Text(value.to_string()))
    }

    fn visit_string<E: de::Error>(self, value: String) -> Result<Json, E> {
        Ok(Json::Text(value))
    }

    fn visit_bool<E: de::Error>(self, _: bool) -> Result<Json, E> {
        Ok(Json::Other)
    }

    fn visit_i64<E: de::Error>(self, _: i64) -> Result<Json, E> {
        Ok(Json::Other)
    }

    fn visit_u64<E: de::Error>(self, _: u64) -> Result<Json, E> {
        Ok(Json::Other)
    }

    fn visit_f64<E: de::Error>(self, _: f64) -> Result<Json, E> {
        Ok(Json::Other)
    }

    fn visit_unit<E: de::Error>(self) -> Result<Json, E> {
        Ok(Json::Other)
    }
}

// ============================================================================
// Tree building
// ============================================================================

/// Copy one folder subtree onto the stack, depth-first without recursion
fn read_folder(folder: &RawNode, stack: &mut FolderStack) {
    stack.open(text(&folder.name).to_string());
    let mut pending = vec![folder.children()];

    while let Some(siblings) = pending.last_mut() {
        let Some(node) = siblings.next() else {
            pending.pop();
            stack.close();
            continue;
        };

        match node.kind() {
            NodeKind::Folder => {
                stack.open(text(&node.name).to_string());
                pending.push(node.children());
            }
            NodeKind::Url => {
                let url = text(&node.url);
                if url.is_empty() {
                    stack.stats_mut().links_without_href += 1;
                    continue;
                }
                let mut link = TempLink::new(text(&node.name), url);
                link.icon = Some(text(&node.icon))
                    .filter(|icon| !icon.is_empty())
                    .map(str::to_string);
                stack.push_link(link.into());
            }
            NodeKind::Unknown => {
                debug!("Skipping bookmark node of unknown type");
                stack.stats_mut().skipped_nodes += 1;
            }
        }
    }
}
