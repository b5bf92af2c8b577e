use crate::error::ConvertError;
use docx_rust::document::{
    BodyContent, ParagraphContent, RunContent, TableCellContent, TableRowContent,
};
use docx_rust::{Docx, DocxFile};
use std::collections::HashMap;
use std::path::Path;

/// Numbering format of a list paragraph, resolved through the document's
/// numbering definitions.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ListKind {
    Bullet,
    Ordered,
}

/// Inline content of a paragraph in run order. Consecutive text runs are
/// merged; an embedded drawing splits the text at its exact position.
#[derive(Debug, Clone, PartialEq)]
pub enum Inline {
    Text(String),
    Image { rel_id: String },
}

/// One structural unit of the document body, in document order. Table cells
/// recursively carry their own ordered block sequences.
#[derive(Debug, Clone, PartialEq)]
pub enum Block {
    Paragraph {
        style: Option<String>,
        numbering: Option<ListKind>,
        inlines: Vec<Inline>,
    },
    /// rows x cells, each cell an ordered sub-sequence of blocks
    Table(Vec<Vec<Vec<Block>>>),
}

/// Embedded media bytes resolved from the relationship index.
#[derive(Debug, Clone)]
pub struct MediaItem {
    /// Path of the part inside the package, e.g. `word/media/image1.png`
    pub source_path: String,
    pub bytes: Vec<u8>,
}

/// Everything the rest of the pipeline needs from a source document: the
/// ordered block sequence plus the relationship-id -> media index. Owned, so
/// the file handle is released as soon as extraction finishes.
pub struct Extraction {
    pub blocks: Vec<Block>,
    pub media: HashMap<String, MediaItem>,
}

impl Extraction {
    pub fn image(&self, rel_id: &str) -> Result<&MediaItem, ConvertError> {
        self.media
            .get(rel_id)
            .ok_or_else(|| ConvertError::MissingRelationship(rel_id.to_string()))
    }
}

pub struct DocxData {
    /// DocxFile owns the raw data; Docx borrows from it.
    /// We store the file so it lives long enough, then parse on demand.
    file: DocxFile,
}

impl DocxData {
    /// Fails fast with a format error when the path is not a well-formed
    /// ZIP-based document package.
    pub fn open(path: &Path) -> Result<Self, ConvertError> {
        let file = DocxFile::from_file(path)
            .map_err(|e| ConvertError::Format(format!("{}: {}", path.display(), e)))?;
        Ok(Self { file })
    }

    fn parse(&self) -> Result<Docx<'_>, ConvertError> {
        self.file
            .parse()
            .map_err(|e| ConvertError::Format(format!("malformed document body: {}", e)))
    }

    /// Walks the body in document order and snapshots media bytes, producing
    /// an owned [`Extraction`].
    pub fn extract(&self) -> Result<Extraction, ConvertError> {
        let docx = self.parse()?;
        let mut blocks = Vec::new();
        for item in &docx.document.body.content {
            append_block(&docx, item, &mut blocks);
        }
        let media = collect_media(&docx);
        Ok(Extraction { blocks, media })
    }
}

fn append_block(docx: &Docx, item: &BodyContent, out: &mut Vec<Block>) {
    match item {
        BodyContent::Paragraph(para) => out.push(paragraph_block(docx, para)),
        BodyContent::Table(table) => out.push(table_block(docx, table)),
        BodyContent::Sdt(sdt) => {
            if let Some(ref sdt_content) = sdt.content {
                for nested in &sdt_content.content {
                    append_block(docx, nested, out);
                }
            }
        }
        _ => {}
    }
}

fn paragraph_block(docx: &Docx, para: &docx_rust::document::Paragraph) -> Block {
    let mut style = None;
    let mut numbering = None;

    if let Some(ref prop) = para.property {
        if let Some(ref style_id) = prop.style_id {
            style = Some(style_id.value.to_string());
        }
        // Both id and level are Option<T>
        if let Some(ref num_prop) = prop.numbering {
            if let (Some(ref id), Some(ref level)) = (&num_prop.id, &num_prop.level) {
                numbering = Some(resolve_list_kind(docx, id.value, level.value));
            }
        }
    }

    Block::Paragraph {
        style,
        numbering,
        inlines: collect_inlines(para),
    }
}

fn collect_inlines(para: &docx_rust::document::Paragraph) -> Vec<Inline> {
    let mut inlines = Vec::new();
    let mut text = String::new();

    for pc in &para.content {
        match pc {
            ParagraphContent::Run(run) => collect_run(run, &mut text, &mut inlines),
            ParagraphContent::Link(link) => {
                // Hyperlink targets are not preserved; the display text is.
                if let Some(ref run) = link.content {
                    collect_run(run, &mut text, &mut inlines);
                }
            }
            _ => {}
        }
    }

    flush_text(&mut text, &mut inlines);
    inlines
}

fn collect_run(run: &docx_rust::document::Run, text: &mut String, inlines: &mut Vec<Inline>) {
    for rc in &run.content {
        match rc {
            RunContent::Text(t) => text.push_str(&t.text),
            RunContent::Break(_) => text.push('\n'),
            RunContent::Tab(_) => text.push('\t'),
            RunContent::Drawing(drawing) => {
                if let Some(rel_id) = drawing_rel_id(drawing) {
                    flush_text(text, inlines);
                    inlines.push(Inline::Image { rel_id });
                }
            }
            _ => {}
        }
    }
}

fn flush_text(text: &mut String, inlines: &mut Vec<Inline>) {
    if !text.is_empty() {
        inlines.push(Inline::Text(std::mem::take(text)));
    }
}

fn drawing_rel_id(drawing: &docx_rust::document::Drawing) -> Option<String> {
    // Try inline drawing first (most common)
    if let Some(ref inline) = drawing.inline {
        if let Some(ref graphic) = inline.graphic {
            if let Some(pic) = graphic.data.children.first() {
                return Some(pic.fill.blip.embed.to_string());
            }
        }
    }

    // Then anchor (floating images)
    if let Some(ref anchor) = drawing.anchor {
        if let Some(ref graphic) = anchor.graphic {
            if let Some(pic) = graphic.data.children.first() {
                return Some(pic.fill.blip.embed.to_string());
            }
        }
    }

    None
}

fn table_block(docx: &Docx, table: &docx_rust::document::Table) -> Block {
    let mut rows = Vec::new();

    for row in &table.rows {
        let mut cells = Vec::new();
        for cell_content in &row.cells {
            if let TableRowContent::TableCell(cell) = cell_content {
                let mut cell_blocks = Vec::new();
                for tc in &cell.content {
                    let TableCellContent::Paragraph(para) = tc;
                    cell_blocks.push(paragraph_block(docx, para));
                }
                cells.push(cell_blocks);
            }
        }
        if !cells.is_empty() {
            rows.push(cells);
        }
    }

    Block::Table(rows)
}

/// Maps a (num_id, level) pair to its numbering format via the document's
/// numbering part. Unresolvable pairs fall back to bullets.
fn resolve_list_kind(docx: &Docx, num_id: isize, level: isize) -> ListKind {
    if let Some(ref numbering) = docx.numbering {
        for num in &numbering.numberings {
            if num.num_id != Some(num_id) {
                continue;
            }
            let abstract_id = match &num.abstract_num_id {
                Some(aid) => aid.value,
                None => continue,
            };
            for abstract_num in &numbering.abstract_numberings {
                if abstract_num.abstract_num_id != abstract_id {
                    continue;
                }
                for lvl in &abstract_num.levels {
                    if lvl.i_level != Some(level) {
                        continue;
                    }
                    if let Some(ref fmt) = lvl.number_format {
                        return match fmt.value.as_ref() {
                            "decimal" | "upperRoman" | "lowerRoman" | "upperLetter"
                            | "lowerLetter" => ListKind::Ordered,
                            _ => ListKind::Bullet,
                        };
                    }
                }
            }
        }
    }
    ListKind::Bullet
}

fn collect_media(docx: &Docx) -> HashMap<String, MediaItem> {
    let mut media = HashMap::new();
    let Some(ref rels) = docx.document_rels else {
        return media;
    };

    for rel in &rels.relationships {
        let target = rel.target.as_ref();
        // DOCX stores media as word/media/... while relationship targets are
        // written relative to word/
        let prefixed = format!("word/{}", target);
        let found = docx
            .media
            .iter()
            .find(|(path, _)| path.as_str() == prefixed || path.as_str() == target);
        if let Some((path, (_media_type, data))) = found {
            media.insert(
                rel.id.to_string(),
                MediaItem {
                    source_path: path.clone(),
                    bytes: data.to_vec(),
                },
            );
        }
    }

    media
}
