//! Single-pass classification of the raw block sequence into an ordered,
//! renderable content tree. Block order in equals node order out; images are
//! threaded into the exact position they occupy in the source.

use crate::docx_reader::{Block, Extraction, Inline, ListKind};
use crate::error::ConvertError;
use crate::image::AssetStore;

#[derive(Debug, Clone, PartialEq)]
pub enum ContentNode {
    Heading { level: u8, text: String },
    Paragraph(String),
    List { ordered: bool, items: Vec<ListItem> },
    /// rows x cells, each cell its own ordered node sequence
    Table(Vec<Vec<Vec<ContentNode>>>),
    /// src is the stored asset path relative to the bundle root
    Image { src: String },
}

#[derive(Debug, Clone, PartialEq, Default)]
pub struct ListItem {
    pub text: String,
    /// Illustrative images nested inside this item
    pub images: Vec<String>,
}

#[derive(Debug, Clone, Copy, Default)]
pub struct BuildOptions {
    /// Preserve empty paragraphs as spacing instead of dropping them.
    pub keep_empty_paragraphs: bool,
    /// Emit an image following a list item as a sibling block instead of
    /// nesting it inside the item.
    pub sibling_images: bool,
}

/// Closed mapping from paragraph style names to block kinds. Style ids come
/// in with and without spaces depending on the authoring tool.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum StyleClass {
    Heading(u8),
    ListItem,
    Normal,
}

pub fn classify_style(style: Option<&str>) -> StyleClass {
    let Some(style) = style else {
        return StyleClass::Normal;
    };
    let normalized: String = style
        .chars()
        .filter(|c| !c.is_whitespace())
        .collect::<String>()
        .to_ascii_lowercase();

    match normalized.as_str() {
        "title" => StyleClass::Heading(1),
        "subtitle" => StyleClass::Heading(2),
        "listparagraph" | "listbullet" | "listnumber" => StyleClass::ListItem,
        other => {
            if let Some(rest) = other.strip_prefix("heading") {
                if let Ok(level) = rest.parse::<u8>() {
                    if (1..=6).contains(&level) {
                        return StyleClass::Heading(level);
                    }
                }
            }
            StyleClass::Normal
        }
    }
}

/// Enumerated prefixes like `1. ` or `2) ` mark a manually numbered list
/// item; the prefix is stripped since the list container renders numbers.
fn strip_ordinal_prefix(text: &str) -> Option<&str> {
    let digits = text.chars().take_while(|c| c.is_ascii_digit()).count();
    if digits == 0 || digits > 3 {
        return None;
    }
    let rest = &text[digits..];
    let rest = rest.strip_prefix('.').or_else(|| rest.strip_prefix(')'))?;
    let rest = rest.strip_prefix(' ')?;
    let rest = rest.trim_start();
    if rest.is_empty() {
        return None;
    }
    Some(rest)
}

fn joined_text(inlines: &[Inline]) -> String {
    let mut text = String::new();
    for inline in inlines {
        if let Inline::Text(t) = inline {
            text.push_str(t);
        }
    }
    text
}

/// Pathological nesting is rejected rather than recursed into; the caller
/// falls back to plain-text extraction.
const MAX_TABLE_DEPTH: usize = 16;

pub fn build_tree(
    doc: &Extraction,
    store: &AssetStore,
    options: BuildOptions,
    diagnostics: &mut Vec<String>,
) -> Result<Vec<ContentNode>, ConvertError> {
    let mut builder = TreeBuilder {
        doc,
        store,
        options,
        diagnostics,
    };
    builder.build_level(&doc.blocks, 0)
}

/// Last-resort extraction when the structured tree cannot be built: every
/// piece of text becomes a plain paragraph, in document order.
pub fn plain_text_nodes(blocks: &[Block]) -> Vec<ContentNode> {
    let mut nodes = Vec::new();
    collect_plain(blocks, &mut nodes);
    nodes
}

fn collect_plain(blocks: &[Block], nodes: &mut Vec<ContentNode>) {
    for block in blocks {
        match block {
            Block::Paragraph { inlines, .. } => {
                let text = joined_text(inlines);
                let text = text.trim();
                if !text.is_empty() {
                    nodes.push(ContentNode::Paragraph(text.to_string()));
                }
            }
            Block::Table(rows) => {
                for row in rows {
                    for cell in row {
                        collect_plain(cell, nodes);
                    }
                }
            }
        }
    }
}

struct OpenList {
    ordered: bool,
    items: Vec<ListItem>,
}

fn close_list(open_list: &mut Option<OpenList>, nodes: &mut Vec<ContentNode>) {
    if let Some(list) = open_list.take() {
        nodes.push(ContentNode::List {
            ordered: list.ordered,
            items: list.items,
        });
    }
}

struct TreeBuilder<'a> {
    doc: &'a Extraction,
    store: &'a AssetStore,
    options: BuildOptions,
    diagnostics: &'a mut Vec<String>,
}

impl TreeBuilder<'_> {
    fn build_level(&mut self, blocks: &[Block], depth: usize) -> Result<Vec<ContentNode>, ConvertError> {
        if depth > MAX_TABLE_DEPTH {
            return Err(ConvertError::Serialization(
                "table nesting exceeds supported depth".to_string(),
            ));
        }

        let mut nodes = Vec::new();
        // The open-list accumulator lives on this pass, never in shared state.
        let mut open_list: Option<OpenList> = None;

        for block in blocks {
            match block {
                Block::Paragraph {
                    style,
                    numbering,
                    inlines,
                } => {
                    self.paragraph(style.as_deref(), *numbering, inlines, &mut open_list, &mut nodes)?;
                }
                Block::Table(rows) => {
                    close_list(&mut open_list, &mut nodes);
                    let mut out_rows = Vec::with_capacity(rows.len());
                    for row in rows {
                        let mut out_cells = Vec::with_capacity(row.len());
                        for cell in row {
                            out_cells.push(self.build_level(cell, depth + 1)?);
                        }
                        out_rows.push(out_cells);
                    }
                    nodes.push(ContentNode::Table(out_rows));
                }
            }
        }

        close_list(&mut open_list, &mut nodes);
        Ok(nodes)
    }

    fn paragraph(
        &mut self,
        style: Option<&str>,
        numbering: Option<ListKind>,
        inlines: &[Inline],
        open_list: &mut Option<OpenList>,
        nodes: &mut Vec<ContentNode>,
    ) -> Result<(), ConvertError> {
        let text = joined_text(inlines);
        let trimmed = text.trim();

        if let StyleClass::Heading(level) = classify_style(style) {
            close_list(open_list, nodes);
            let images = self.paragraph_images(inlines)?;
            if !trimmed.is_empty() {
                nodes.push(ContentNode::Heading {
                    level,
                    text: trimmed.to_string(),
                });
            }
            for src in images {
                nodes.push(ContentNode::Image { src });
            }
            return Ok(());
        }

        // A list item is marked by explicit numbering, a list style, or an
        // enumerated text prefix.
        let mut item_text = trimmed.to_string();
        let mut kind = numbering;
        if kind.is_none() {
            if classify_style(style) == StyleClass::ListItem {
                kind = Some(match strip_ordinal_prefix(trimmed) {
                    Some(rest) => {
                        item_text = rest.to_string();
                        ListKind::Ordered
                    }
                    None => ListKind::Bullet,
                });
            } else if let Some(rest) = strip_ordinal_prefix(trimmed) {
                item_text = rest.to_string();
                kind = Some(ListKind::Ordered);
            }
        }

        if let Some(kind) = kind {
            let images = self.paragraph_images(inlines)?;
            if item_text.is_empty() && images.is_empty() {
                return Ok(());
            }
            let ordered = kind == ListKind::Ordered;
            let (nested, floating) = if self.options.sibling_images {
                (Vec::new(), images)
            } else {
                (images, Vec::new())
            };
            let item = ListItem {
                text: item_text,
                images: nested,
            };
            match open_list {
                Some(list) if list.ordered == ordered => list.items.push(item),
                _ => {
                    close_list(open_list, nodes);
                    *open_list = Some(OpenList {
                        ordered,
                        items: vec![item],
                    });
                }
            }
            // Sibling placement closes the list, as any non-list block does.
            for src in floating {
                close_list(open_list, nodes);
                nodes.push(ContentNode::Image { src });
            }
            return Ok(());
        }

        if trimmed.is_empty() {
            let images = self.paragraph_images(inlines)?;
            if images.is_empty() {
                if self.options.keep_empty_paragraphs {
                    close_list(open_list, nodes);
                    nodes.push(ContentNode::Paragraph(String::new()));
                }
                // A dropped empty paragraph does not close an open list.
                return Ok(());
            }
            // An image directly after a list item illustrates that item.
            if !self.options.sibling_images {
                if let Some(list) = open_list.as_mut() {
                    if let Some(last) = list.items.last_mut() {
                        last.images.extend(images);
                        return Ok(());
                    }
                }
            }
            close_list(open_list, nodes);
            for src in images {
                nodes.push(ContentNode::Image { src });
            }
            return Ok(());
        }

        // Plain paragraph. Segments are emitted in run order so a
        // mid-paragraph image stays at its exact position.
        close_list(open_list, nodes);
        for inline in inlines {
            match inline {
                Inline::Text(t) => {
                    let t = t.trim();
                    if !t.is_empty() {
                        nodes.push(ContentNode::Paragraph(t.to_string()));
                    }
                }
                Inline::Image { rel_id } => {
                    if let Some(src) = self.resolve_image(rel_id)? {
                        nodes.push(ContentNode::Image { src });
                    }
                }
            }
        }
        Ok(())
    }

    fn paragraph_images(&mut self, inlines: &[Inline]) -> Result<Vec<String>, ConvertError> {
        let mut images = Vec::new();
        for inline in inlines {
            if let Inline::Image { rel_id } = inline {
                if let Some(src) = self.resolve_image(rel_id)? {
                    images.push(src);
                }
            }
        }
        Ok(images)
    }

    /// Missing relationships degrade to an omitted image plus a diagnostic;
    /// asset-store write failures stay fatal.
    fn resolve_image(&mut self, rel_id: &str) -> Result<Option<String>, ConvertError> {
        let item = match self.doc.image(rel_id) {
            Ok(item) => item,
            Err(ConvertError::MissingRelationship(id)) => {
                self.diagnostics.push(format!(
                    "image relationship '{}' could not be resolved; image omitted",
                    id
                ));
                return Ok(None);
            }
            Err(err) => return Err(err),
        };
        let stored = self.store.store(&item.bytes, Some(&item.source_path))?;
        Ok(Some(stored.rel_path))
    }
}
