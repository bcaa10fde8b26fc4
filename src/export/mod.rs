//! CSV and BibTeX export for sifted result sets.

use std::collections::HashSet;
use std::fs::File;
use std::io::Write;
use std::path::Path;

use crate::models::Paper;

/// CSV column set, in writing order.
const CSV_COLUMNS: [&str; 11] = [
    "Title",
    "Authors",
    "Year",
    "Citations",
    "Influential Citations",
    "S2 TLDR",
    "Abstract",
    "Publication Type",
    "DOI",
    "PDF URL",
    "S2 URL",
];

/// Errors raised while writing an export file.
#[derive(Debug, thiserror::Error)]
pub enum ExportError {
    /// IO error (file system)
    #[error("IO error: {0}")]
    Io(#[from] std::io::Error),

    /// CSV serialization error
    #[error("CSV error: {0}")]
    Csv(#[from] csv::Error),
}

/// Export file formats.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub enum ExportFormat {
    Csv,
    Bibtex,
}

/// Write records to `path` in the given format.
pub fn save_to_file(
    papers: &[Paper],
    path: &Path,
    format: ExportFormat,
) -> Result<(), ExportError> {
    let file = File::create(path)?;
    match format {
        ExportFormat::Csv => write_csv(papers, file),
        ExportFormat::Bibtex => write_bibtex(papers, file),
    }
}

fn csv_row(paper: &Paper) -> [&str; 11] {
    [
        &paper.title,
        &paper.authors,
        &paper.year,
        &paper.citations,
        &paper.influential_citations,
        &paper.tldr,
        &paper.abstract_text,
        &paper.publication_types,
        &paper.doi,
        &paper.pdf_url,
        &paper.url,
    ]
}

/// Write the CSV rendition: fixed columns, every field quoted, duplicate
/// rows (full-tuple equality) and all-empty rows skipped.
pub fn write_csv<W: Write>(papers: &[Paper], writer: W) -> Result<(), ExportError> {
    let mut out = csv::WriterBuilder::new()
        .quote_style(csv::QuoteStyle::Always)
        .from_writer(writer);
    out.write_record(CSV_COLUMNS)?;

    let mut seen: HashSet<[&str; 11]> = HashSet::new();
    for paper in papers {
        let row = csv_row(paper);
        if row.iter().all(|cell| cell.is_empty()) {
            continue;
        }
        if seen.insert(row) {
            out.write_record(row)?;
        }
    }

    out.flush()?;
    Ok(())
}

/// Write the BibTeX rendition: one entry per record that carries citation
/// text, blank-line separated, deduplicated by exact citation text.
pub fn write_bibtex<W: Write>(papers: &[Paper], mut writer: W) -> Result<(), ExportError> {
    let mut seen: HashSet<&str> = HashSet::new();
    for paper in papers {
        if paper.bibtex.is_empty() || !seen.insert(&paper.bibtex) {
            continue;
        }
        writeln!(writer, "{}\n", paper.bibtex)?;
    }
    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;

    fn paper(title: &str, bibtex: &str) -> Paper {
        Paper {
            title: title.to_string(),
            authors: "A. Author".to_string(),
            year: "2020".to_string(),
            bibtex: bibtex.to_string(),
            ..Default::default()
        }
    }

    #[test]
    fn csv_quotes_everything_and_writes_header() {
        let papers = vec![paper("First", "")];
        let mut buf = Vec::new();
        write_csv(&papers, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        let mut lines = text.lines();
        assert_eq!(
            lines.next().unwrap(),
            "\"Title\",\"Authors\",\"Year\",\"Citations\",\"Influential Citations\",\"S2 TLDR\",\"Abstract\",\"Publication Type\",\"DOI\",\"PDF URL\",\"S2 URL\""
        );
        assert!(lines.next().unwrap().starts_with("\"First\",\"A. Author\",\"2020\""));
    }

    #[test]
    fn csv_deduplicates_identical_rows() {
        let papers = vec![paper("Same", ""), paper("Same", ""), paper("Other", "")];
        let mut buf = Vec::new();
        write_csv(&papers, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        // Header plus two distinct rows.
        assert_eq!(text.lines().count(), 3);
    }

    #[test]
    fn csv_skips_all_empty_rows() {
        let papers = vec![Paper::default(), paper("Real", "")];
        let mut buf = Vec::new();
        write_csv(&papers, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text.lines().count(), 2);
        assert!(text.contains("\"Real\""));
    }

    #[test]
    fn bibtex_dedupes_by_citation_text_and_skips_blanks() {
        let papers = vec![
            paper("A", "@article{a}"),
            paper("B", ""),
            paper("C", "@article{a}"),
            paper("D", "@article{d}"),
        ];
        let mut buf = Vec::new();
        write_bibtex(&papers, &mut buf).unwrap();

        let text = String::from_utf8(buf).unwrap();
        assert_eq!(text, "@article{a}\n\n@article{d}\n\n");
    }

    #[test]
    fn save_to_file_writes_both_formats() {
        let dir = tempfile::tempdir().unwrap();
        let papers = vec![paper("Saved", "@article{saved}")];

        let csv_path = dir.path().join("out.csv");
        save_to_file(&papers, &csv_path, ExportFormat::Csv).unwrap();
        assert!(std::fs::read_to_string(&csv_path).unwrap().contains("\"Saved\""));

        let bib_path = dir.path().join("out.bib");
        save_to_file(&papers, &bib_path, ExportFormat::Bibtex).unwrap();
        assert!(std::fs::read_to_string(&bib_path)
            .unwrap()
            .contains("@article{saved}"));
    }
}
