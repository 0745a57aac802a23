use std::io::Cursor;

use chrono::{DateTime, Local};
use docx_rs::{AlignmentType, BreakType, Docx, Paragraph, Run};

use crate::error::{Result, TextlensError};
use crate::models::Metadata;
use crate::ocr::split_paragraphs;

pub const DOCUMENT_TITLE: &str = "Extracted Text from Image";
pub const SEPARATOR_WIDTH: usize = 50;

/// Run containing `text` with embedded newlines turned into line breaks.
fn multiline_run(text: &str) -> Run {
    let mut run = Run::new();
    for (i, line) in text.lines().enumerate() {
        if i > 0 {
            run = run.add_break(BreakType::TextWrapping);
        }
        run = run.add_text(line);
    }
    run
}

/// Build the `.docx` package: title, metadata block, timestamp, separator
/// and one paragraph per text paragraph.
pub fn build_document(
    text: &str,
    metadata: &Metadata,
    generated_at: DateTime<Local>,
) -> Result<Vec<u8>> {
    let mut docx = Docx::new().add_paragraph(
        Paragraph::new()
            .style("Title")
            .align(AlignmentType::Center)
            .add_run(Run::new().add_text(DOCUMENT_TITLE).bold().size(36)),
    );

    if !metadata.is_empty() {
        let mut block = Paragraph::new().add_run(Run::new().add_text("Metadata:").bold());
        for (key, value) in metadata {
            block = block.add_run(
                Run::new()
                    .add_break(BreakType::TextWrapping)
                    .add_text(format!("{key}: {value}")),
            );
        }
        docx = docx.add_paragraph(block);
    }

    docx = docx
        .add_paragraph(
            Paragraph::new().align(AlignmentType::Center).add_run(Run::new().add_text(format!(
                "Generated on: {}",
                generated_at.format("%Y-%m-%d %H:%M:%S")
            ))),
        )
        .add_paragraph(Paragraph::new().add_run(Run::new().add_text("=".repeat(SEPARATOR_WIDTH))));

    for paragraph in split_paragraphs(text) {
        docx = docx.add_paragraph(Paragraph::new().add_run(multiline_run(&paragraph)));
    }

    let mut buffer = Vec::new();
    docx.build()
        .pack(&mut Cursor::new(&mut buffer))
        .map_err(|e| TextlensError::Export(format!("Failed to write DOCX: {e}")))?;

    Ok(buffer)
}
