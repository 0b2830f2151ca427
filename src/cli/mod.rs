//! Command-line interface for marknav.
//!
//! Provides commands for importing a bookmark export into the normalized
//! JSON model, inspecting the intermediate tree, and showing configuration.

use std::io::{self, IsTerminal, Read};
use std::path::PathBuf;

use anyhow::{Context, Result};
use clap::{Parser, Subcommand};
use tokio::fs;

use crate::config;
use crate::core::{decode_source, parse_document, ImportError, DEDUP_KEY_POLICY};
use crate::domain::TempBookmarkItem;

/// Exit code for unreadable or corrupt bookmark files
const EXIT_CORRUPT_INPUT: i32 = 2;

/// Exit code for internal errors
const EXIT_INTERNAL: i32 = 1;

/// marknav - Browser bookmark export importer
#[derive(Parser, Debug)]
#[command(name = "marknav")]
#[command(author, version, about, long_about = None)]
pub struct Cli {
    #[command(subcommand)]
    pub command: Commands,
}

#[derive(Subcommand, Debug)]
pub enum Commands {
    /// Import a bookmark export and print the normalized categories as JSON
    Import {
        /// Export file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,

        /// Write JSON here instead of stdout
        #[arg(short, long)]
        output: Option<PathBuf>,

        /// Pretty-print the JSON
        #[arg(long)]
        pretty: bool,

        /// Print the import report to stderr
        #[arg(long)]
        report: bool,
    },

    /// Show the intermediate folder/link tree of an export
    Inspect {
        /// Export file (reads from stdin if not provided)
        #[arg(short, long)]
        input: Option<PathBuf>,
    },

    /// Show resolved configuration (debug)
    Config,
}

impl Cli {
    /// Execute the CLI command
    pub async fn execute(self) -> Result<()> {
        match self.command {
            Commands::Import {
                input,
                output,
                pretty,
                report,
            } => import(input, output, pretty, report).await,
            Commands::Inspect { input } => inspect(input).await,
            Commands::Config => show_config(),
        }
    }
}

/// Read the export bytes from a file, or from stdin when it is piped.
///
/// Decoding is left to the importer so that empty or mis-encoded exports are
/// reported as corrupt input rather than as internal errors.
async fn read_input(input_file: Option<PathBuf>) -> Result<Vec<u8>> {
    if let Some(path) = input_file {
        return fs::read(&path)
            .await
            .with_context(|| format!("Failed to read input file: {}", path.display()));
    }

    if io::stdin().is_terminal() {
        anyhow::bail!("No input provided. Use --input <file> or pipe to stdin");
    }

    let mut buffer = Vec::new();
    io::stdin()
        .read_to_end(&mut buffer)
        .context("Failed to read from stdin")?;
    Ok(buffer)
}

/// Import a bookmark export
async fn import(
    input_file: Option<PathBuf>,
    output: Option<PathBuf>,
    pretty: bool,
    show_report: bool,
) -> Result<()> {
    let raw = read_input(input_file).await?;
    let importer = config::config()?.importer();

    let outcome = match importer.import_bytes(&raw) {
        Ok(outcome) => outcome,
        Err(e) => exit_with_import_error(&e),
    };

    let json = if pretty {
        serde_json::to_string_pretty(&outcome.categories)?
    } else {
        serde_json::to_string(&outcome.categories)?
    };

    match output {
        Some(path) => fs::write(&path, json)
            .await
            .with_context(|| format!("Failed to write output: {}", path.display()))?,
        None => println!("{}", json),
    }

    if show_report {
        eprintln!("{}", serde_json::to_string_pretty(&outcome.report)?);
    }

    Ok(())
}

/// Process exit code for a failed import
fn exit_code(error: &ImportError) -> i32 {
    if error.is_corrupt_input() {
        EXIT_CORRUPT_INPUT
    } else {
        EXIT_INTERNAL
    }
}

/// Report an import failure the way a user should see it, then exit
fn exit_with_import_error(error: &ImportError) -> ! {
    let code = exit_code(error);
    if code == EXIT_CORRUPT_INPUT {
        eprintln!("Bookmark file is unreadable or corrupt: {}", error);
    } else {
        eprintln!("Internal error while importing bookmarks: {}", error);
    }
    std::process::exit(code);
}

/// Print the intermediate tree
async fn inspect(input_file: Option<PathBuf>) -> Result<()> {
    let raw = read_input(input_file).await?;

    let tree = match decode_source(&raw).and_then(parse_document) {
        Ok(tree) => tree,
        Err(e) => exit_with_import_error(&ImportError::from(e)),
    };

    println!("Format: {}", tree.format);
    println!(
        "Folders: {}  Links: {}  Dropped (no href): {}  Skipped: {}  Max depth: {}",
        tree.stats.folders,
        tree.stats.links,
        tree.stats.links_without_href,
        tree.stats.skipped_nodes,
        tree.stats.max_depth
    );
    println!();
    print!("{}", render_outline(&tree.root));

    Ok(())
}

/// Indented outline of a tree, one node per line
pub fn render_outline(root: &TempBookmarkItem) -> String {
    let mut out = String::new();
    let mut stack = vec![(root, 0usize)];

    while let Some((node, depth)) = stack.pop() {
        let indent = "  ".repeat(depth);
        match node {
            TempBookmarkItem::Folder(folder) => {
                out.push_str(&format!("{}[{}]\n", indent, folder.title));
                stack.extend(folder.items.iter().rev().map(|child| (child, depth + 1)));
            }
            TempBookmarkItem::Link(link) => {
                out.push_str(&format!("{}- {} <{}>\n", indent, link.title, link.link));
            }
        }
    }

    out
}

/// Show resolved configuration
fn show_config() -> Result<()> {
    let cfg = config::config()?;

    println!("marknav configuration");
    println!();
    println!(
        "Config file: {}",
        cfg.config_file
            .as_ref()
            .map(|p| p.display().to_string())
            .unwrap_or_else(|| "(none - using defaults)".to_string())
    );
    println!();
    println!("Import:");
    println!("  Uncategorized title:   {}", cfg.settings.uncategorized_title);
    println!("  Untitled title:        {}", cfg.settings.untitled_title);
    println!("  Drop empty categories: {}", cfg.settings.drop_empty_categories);
    println!("  Duplicate rule:        {}", DEDUP_KEY_POLICY);
    println!();
    println!("Limits:");
    println!("  Max input size: {} bytes", cfg.limits.max_input_bytes);

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::TempFolder;

    #[test]
    fn test_render_outline() {
        let root: TempBookmarkItem = TempFolder::new("Bookmarks")
            .with_item(
                TempFolder::new("Work")
                    .with_item(TempBookmarkItem::link("Mail", "https://mail.example.com"))
                    .into(),
            )
            .with_item(TempBookmarkItem::link("Loose", "https://loose.example.com"))
            .into();

        assert_eq!(
            render_outline(&root),
            "[Bookmarks]\n  [Work]\n    - Mail <https://mail.example.com>\n  - Loose <https://loose.example.com>\n"
        );
    }

    #[test]
    fn test_cli_parses_import_flags() {
        let cli = Cli::try_parse_from([
            "marknav", "import", "--input", "bookmarks.html", "--pretty", "--report",
        ])
        .unwrap();

        match cli.command {
            Commands::Import {
                input,
                output,
                pretty,
                report,
            } => {
                assert_eq!(input, Some(PathBuf::from("bookmarks.html")));
                assert_eq!(output, None);
                assert!(pretty);
                assert!(report);
            }
            other => panic!("unexpected command: {:?}", other),
        }
    }

    #[tokio::test]
    async fn test_unreadable_exports_exit_as_corrupt_input() {
        let temp = tempfile::TempDir::new().unwrap();
        let importer = crate::core::Importer::default();

        let legacy = temp.path().join("legacy.html");
        std::fs::write(
            &legacy,
            b"<DL><DT><A HREF=\"https://a.example.com\">Caf\xe9</A></DL>",
        )
        .unwrap();
        let empty = temp.path().join("empty.html");
        std::fs::write(&empty, b"").unwrap();

        for path in [legacy, empty] {
            let raw = read_input(Some(path.clone())).await.unwrap();
            let err = importer.import_bytes(&raw).unwrap_err();
            assert_eq!(exit_code(&err), EXIT_CORRUPT_INPUT, "{}", path.display());
        }
    }

    #[test]
    fn test_caller_errors_exit_as_internal() {
        let err: ImportError = crate::core::NormalizationError::RootNotFolder {
            title: "Mail".to_string(),
        }
        .into();
        assert_eq!(exit_code(&err), EXIT_INTERNAL);
    }
}
