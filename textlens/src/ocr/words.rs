//! Word-level engine output: Tesseract TSV parsing, confidence filtering
//! and line reconstruction.

use crate::models::{BoundingBox, ExtractedText, LinePosition, RecognizedWord};

/// TSV `level` of word rows (page=1, block=2, paragraph=3, line=4).
const WORD_LEVEL: u32 = 5;
const TSV_COLUMNS: usize = 12;

/// Parse Tesseract TSV output into words, in reading order. Header, layout
/// and empty rows are skipped.
pub fn parse_tsv(tsv: &str) -> Vec<RecognizedWord> {
    tsv.lines().filter_map(parse_tsv_row).collect()
}

fn parse_tsv_row(row: &str) -> Option<RecognizedWord> {
    let cols: Vec<&str> = row.splitn(TSV_COLUMNS, '\t').collect();
    if cols.len() < TSV_COLUMNS {
        return None;
    }
    let num = |i: usize| cols[i].trim().parse::<u32>().ok();

    if num(0)? != WORD_LEVEL {
        return None;
    }
    let confidence: f32 = cols[10].trim().parse().ok()?;
    let text = cols[11].trim();
    if text.is_empty() || confidence < 0.0 {
        return None;
    }

    Some(RecognizedWord {
        text: text.to_string(),
        confidence: confidence.min(100.0),
        bbox: BoundingBox {
            x: num(6)?,
            y: num(7)?,
            width: num(8)?,
            height: num(9)?,
        },
        position: LinePosition {
            block: num(2)?,
            paragraph: num(3)?,
            line: num(4)?,
        },
    })
}

/// Join words back into text: spaces within a line, a newline between
/// lines and a blank line between paragraphs.
pub fn words_to_text(words: &[RecognizedWord]) -> String {
    let mut text = String::new();
    let mut previous: Option<LinePosition> = None;

    for word in words {
        if let Some(prev) = previous {
            let here = word.position;
            if (prev.block, prev.paragraph) != (here.block, here.paragraph) {
                text.push_str("\n\n");
            } else if prev.line != here.line {
                text.push('\n');
            } else {
                text.push(' ');
            }
        }
        text.push_str(&word.text);
        previous = Some(word.position);
    }

    text
}

/// Keep only words scoring strictly above `threshold` and rebuild the text
/// from them. Engines without word-level output are left alone. Returns the
/// number of words dropped.
pub fn retain_confident_words(extracted: &mut ExtractedText, threshold: u8) -> usize {
    if extracted.words.is_empty() {
        return 0;
    }

    let before = extracted.words.len();
    let kept: Vec<RecognizedWord> = std::mem::take(&mut extracted.words)
        .into_iter()
        .filter(|w| w.confidence > f32::from(threshold))
        .collect();
    let dropped = before - kept.len();

    extracted.text = words_to_text(&kept);
    extracted.set_words(kept);
    extracted.discarded_words += dropped;
    dropped
}
