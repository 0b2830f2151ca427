//! Normalization of the intermediate tree into the two-level model.
//!
//! Flattening policy:
//! - every first-level folder under the root becomes one category
//! - links in deeper folders are hoisted into their top-level category,
//!   depth-first and left-to-right, with no trace of the sub-folder
//! - links sitting directly under the root go to a synthetic category that
//!   is always placed last
//!
//! Within a category the first occurrence of a link wins; later duplicates
//! (per [`link_key`](super::link_key::link_key)) are dropped.

use std::collections::HashSet;

use serde::{Deserialize, Serialize};
use tracing::{debug, warn};

use crate::domain::{
    total_items, BookmarkCategory, BookmarkItem, CategoryId, ItemId, TempBookmarkItem, TempFolder,
    TempLink,
};

use super::error::NormalizationError;
use super::link_key::{default_title, link_key, parse_link};

/// Title of the bucket collecting links that sit directly under the root
pub const UNCATEGORIZED_TITLE: &str = "Uncategorized";

/// Title given to folders whose own title is empty
pub const UNTITLED_TITLE: &str = "Untitled";

/// Tunable defaulting rules
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct NormalizeSettings {
    /// Title of the synthetic category for root-level links
    #[serde(default = "default_uncategorized_title")]
    pub uncategorized_title: String,

    /// Title used for folders with an empty title
    #[serde(default = "default_untitled_title")]
    pub untitled_title: String,

    /// Omit top-level folders that end up with no items
    #[serde(default)]
    pub drop_empty_categories: bool,
}

fn default_uncategorized_title() -> String {
    UNCATEGORIZED_TITLE.to_string()
}

fn default_untitled_title() -> String {
    UNTITLED_TITLE.to_string()
}

impl Default for NormalizeSettings {
    fn default() -> Self {
        Self {
            uncategorized_title: default_uncategorized_title(),
            untitled_title: default_untitled_title(),
            drop_empty_categories: false,
        }
    }
}

/// Counters collected while normalizing
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize)]
pub struct NormalizeStats {
    /// Categories emitted
    pub categories: usize,
    /// Items emitted
    pub items: usize,
    /// Links dropped as duplicates within their category
    pub duplicates_dropped: usize,
    /// Links dropped because the href is not an absolute URL
    pub invalid_links: usize,
    /// Links moved up from nested folders
    pub hoisted_links: usize,
    /// Nested folders collapsed into their top-level category
    pub hoisted_folders: usize,
    /// Top-level folders omitted for being empty
    pub empty_categories_dropped: usize,
    /// Deepest folder nesting seen (root = 0)
    pub max_depth: usize,
}

/// Output of a normalization pass
#[derive(Debug, Clone)]
pub struct Normalized {
    pub categories: Vec<BookmarkCategory>,
    pub stats: NormalizeStats,
}

/// Turns an intermediate tree into categories
#[derive(Debug, Clone, Default)]
pub struct Normalizer {
    settings: NormalizeSettings,
}

impl Normalizer {
    pub fn new(settings: NormalizeSettings) -> Self {
        Self { settings }
    }

    /// Normalize a tree whose root must be a folder
    pub fn run(&self, root: &TempBookmarkItem) -> Result<Normalized, NormalizationError> {
        let root = match root {
            TempBookmarkItem::Folder(folder) => folder,
            TempBookmarkItem::Link(link) => {
                return Err(NormalizationError::RootNotFolder {
                    title: link.title.clone(),
                })
            }
        };

        let mut stats = NormalizeStats::default();
        let mut categories = Vec::new();
        let mut loose = CategoryBuilder::new(self.settings.uncategorized_title.clone());

        for child in &root.items {
            match child {
                TempBookmarkItem::Link(link) => loose.push(link, &mut stats),
                TempBookmarkItem::Folder(folder) => {
                    stats.max_depth = stats.max_depth.max(1);
                    let category = self.flatten(folder, &mut stats);
                    if category.items.is_empty() && self.settings.drop_empty_categories {
                        debug!(title = %category.title, "Dropping empty category");
                        stats.empty_categories_dropped += 1;
                        continue;
                    }
                    categories.push(category.finish());
                }
            }
        }

        if !loose.items.is_empty() {
            categories.push(loose.finish());
        }

        stats.categories = categories.len();
        stats.items = total_items(&categories);
        debug!(
            categories = stats.categories,
            items = stats.items,
            duplicates = stats.duplicates_dropped,
            "Normalized bookmark tree"
        );

        Ok(Normalized { categories, stats })
    }

    /// Collect every link below a top-level folder into one category
    fn flatten(&self, folder: &TempFolder, stats: &mut NormalizeStats) -> CategoryBuilder {
        let title = folder.title.trim();
        let title = if title.is_empty() {
            self.settings.untitled_title.clone()
        } else {
            title.to_string()
        };
        let mut category = CategoryBuilder::new(title);

        // Children are pushed in reverse so pops come out in document order
        let mut stack: Vec<(&TempBookmarkItem, usize)> =
            folder.items.iter().rev().map(|item| (item, 2)).collect();

        while let Some((item, depth)) = stack.pop() {
            match item {
                TempBookmarkItem::Link(link) => {
                    if depth > 2 {
                        stats.hoisted_links += 1;
                    }
                    category.push(link, stats);
                }
                TempBookmarkItem::Folder(nested) => {
                    stats.hoisted_folders += 1;
                    stats.max_depth = stats.max_depth.max(depth);
                    stack.extend(nested.items.iter().rev().map(|child| (child, depth + 1)));
                }
            }
        }

        category
    }
}

/// Accumulates the items of one category, enforcing link uniqueness
struct CategoryBuilder {
    title: String,
    items: Vec<BookmarkItem>,
    seen: HashSet<String>,
}

impl CategoryBuilder {
    fn new(title: String) -> Self {
        Self {
            title,
            items: Vec::new(),
            seen: HashSet::new(),
        }
    }

    fn push(&mut self, link: &TempLink, stats: &mut NormalizeStats) {
        let href = link.link.trim();
        let Some(url) = parse_link(href) else {
            warn!(link = %href, "Dropping bookmark with an invalid URL");
            stats.invalid_links += 1;
            return;
        };

        if !self.seen.insert(link_key(&url)) {
            debug!(link = %href, category = %self.title, "Dropping duplicate bookmark");
            stats.duplicates_dropped += 1;
            return;
        }

        let title = link.title.trim();
        let title = if title.is_empty() {
            default_title(&url, href)
        } else {
            title.to_string()
        };

        self.items.push(BookmarkItem {
            id: ItemId::generate(),
            title,
            link: href.to_string(),
            icon: link
                .icon
                .as_deref()
                .map(str::trim)
                .filter(|icon| !icon.is_empty())
                .map(str::to_string),
            desc: link.desc.as_deref().map(str::trim).unwrap_or("").to_string(),
        });
    }

    fn finish(self) -> BookmarkCategory {
        BookmarkCategory {
            id: CategoryId::generate(),
            title: self.title,
            items: self.items,
        }
    }
}

/// Normalize with default settings
pub fn normalize(root: &TempBookmarkItem) -> Result<Vec<BookmarkCategory>, NormalizationError> {
    Normalizer::default().run(root).map(|normalized| normalized.categories)
}

#[cfg(test)]
mod tests {
    use super::*;

    fn link(title: &str, href: &str) -> TempBookmarkItem {
        TempBookmarkItem::link(title, href)
    }

    fn root(items: Vec<TempBookmarkItem>) -> TempBookmarkItem {
        let mut folder = TempFolder::new("root");
        folder.items = items;
        folder.into()
    }

    fn folder(title: &str, items: Vec<TempBookmarkItem>) -> TempBookmarkItem {
        let mut folder = TempFolder::new(title);
        folder.items = items;
        folder.into()
    }

    fn links_of(category: &BookmarkCategory) -> Vec<&str> {
        category.items.iter().map(|item| item.link.as_str()).collect()
    }

    #[test]
    fn test_root_must_be_folder() {
        let err = normalize(&link("Mail", "https://mail.example.com")).unwrap_err();
        assert_eq!(
            err,
            NormalizationError::RootNotFolder {
                title: "Mail".to_string()
            }
        );
    }

    #[test]
    fn test_empty_root_yields_no_categories() {
        assert!(normalize(&root(vec![])).unwrap().is_empty());
    }

    #[test]
    fn test_hoisting_is_depth_first_left_to_right() {
        let tree = root(vec![folder(
            "Top",
            vec![
                link("1", "https://one.example.com"),
                folder(
                    "Sub",
                    vec![
                        link("2", "https://two.example.com"),
                        folder("Deeper", vec![link("3", "https://three.example.com")]),
                        link("4", "https://four.example.com"),
                    ],
                ),
                link("5", "https://five.example.com"),
            ],
        )]);

        let normalized = Normalizer::default().run(&tree).unwrap();
        assert_eq!(normalized.categories.len(), 1);
        assert_eq!(
            links_of(&normalized.categories[0]),
            vec![
                "https://one.example.com",
                "https://two.example.com",
                "https://three.example.com",
                "https://four.example.com",
                "https://five.example.com",
            ]
        );
        assert_eq!(normalized.stats.hoisted_links, 3);
        assert_eq!(normalized.stats.hoisted_folders, 2);
        assert_eq!(normalized.stats.max_depth, 3);
    }

    #[test]
    fn test_uncategorized_bucket_is_last() {
        let tree = root(vec![
            link("Loose", "https://loose.example.com"),
            folder("Work", vec![link("Mail", "https://mail.example.com")]),
        ]);

        let categories = normalize(&tree).unwrap();
        let titles: Vec<&str> = categories.iter().map(|c| c.title.as_str()).collect();
        assert_eq!(titles, vec!["Work", UNCATEGORIZED_TITLE]);
    }

    #[test]
    fn test_duplicates_within_category_keep_first() {
        let mut first = TempLink::new("First", "https://dup.example.com/page");
        first.icon = Some("first.ico".to_string());
        let tree = root(vec![folder(
            "Work",
            vec![
                first.into(),
                link("Second", "https://DUP.example.com/page#section"),
                link("Other", "https://dup.example.com/page?tab=2"),
            ],
        )]);

        let normalized = Normalizer::default().run(&tree).unwrap();
        let items = &normalized.categories[0].items;
        assert_eq!(items.len(), 2);
        assert_eq!(items[0].title, "First");
        assert_eq!(items[0].icon.as_deref(), Some("first.ico"));
        assert_eq!(normalized.stats.duplicates_dropped, 1);
    }

    #[test]
    fn test_same_link_in_different_categories_is_kept() {
        let tree = root(vec![
            folder("A", vec![link("x", "https://same.example.com")]),
            folder("B", vec![link("x", "https://same.example.com")]),
        ]);

        let categories = normalize(&tree).unwrap();
        assert_eq!(categories[0].len(), 1);
        assert_eq!(categories[1].len(), 1);
        assert_ne!(categories[0].items[0].id, categories[1].items[0].id);
    }

    #[test]
    fn test_invalid_links_are_dropped() {
        let tree = root(vec![folder(
            "Work",
            vec![
                link("bad", "not a url"),
                link("ok", "https://ok.example.com"),
            ],
        )]);

        let normalized = Normalizer::default().run(&tree).unwrap();
        assert_eq!(links_of(&normalized.categories[0]), vec!["https://ok.example.com"]);
        assert_eq!(normalized.stats.invalid_links, 1);
    }

    #[test]
    fn test_defaults_for_missing_fields() {
        let tree = root(vec![folder(
            "   ",
            vec![
                link("", "https://b.example.com"),
                TempLink::new("Described", "https://c.example.com")
                    .with_desc("  notes  ")
                    .with_icon("   ")
                    .into(),
            ],
        )]);

        let categories = normalize(&tree).unwrap();
        let category = &categories[0];
        assert_eq!(category.title, UNTITLED_TITLE);
        assert_eq!(category.items[0].title, "b.example.com");
        assert_eq!(category.items[0].desc, "");
        assert_eq!(category.items[0].icon, None);
        assert_eq!(category.items[1].desc, "notes");
        assert_eq!(category.items[1].icon, None);
    }

    #[test]
    fn test_empty_categories_kept_unless_configured() {
        let tree = root(vec![
            folder("Empty", vec![folder("Also empty", vec![])]),
            folder("Full", vec![link("a", "https://a.example.com")]),
        ]);

        assert_eq!(normalize(&tree).unwrap().len(), 2);

        let normalizer = Normalizer::new(NormalizeSettings {
            drop_empty_categories: true,
            ..Default::default()
        });
        let normalized = normalizer.run(&tree).unwrap();
        assert_eq!(normalized.categories.len(), 1);
        assert_eq!(normalized.categories[0].title, "Full");
        assert_eq!(normalized.stats.empty_categories_dropped, 1);
    }

    #[test]
    fn test_custom_sentinel_titles() {
        let normalizer = Normalizer::new(NormalizeSettings {
            uncategorized_title: "Unsorted".to_string(),
            untitled_title: "No name".to_string(),
            drop_empty_categories: false,
        });
        let tree = root(vec![
            folder("", vec![]),
            link("a", "https://a.example.com"),
        ]);

        let titles: Vec<String> = normalizer
            .run(&tree)
            .unwrap()
            .categories
            .into_iter()
            .map(|c| c.title)
            .collect();
        assert_eq!(titles, vec!["No name", "Unsorted"]);
    }

    #[test]
    fn test_deep_tree_is_flattened_without_recursion() {
        let mut node = TempFolder::new("bottom");
        node.items.push(link("deep", "https://deep.example.com"));
        for _ in 0..100_000 {
            let mut parent = TempFolder::new("level");
            parent.items.push(node.into());
            node = parent;
        }
        let tree = root(vec![node.into()]);

        let normalized = Normalizer::default().run(&tree).unwrap();
        assert_eq!(normalized.categories.len(), 1);
        assert_eq!(normalized.categories[0].items[0].title, "deep");
        assert_eq!(normalized.stats.max_depth, 100_001);
    }
}
