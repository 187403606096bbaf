use docx_rs::{ read_docx, DocumentChild, InsertChild, Paragraph, ParagraphChild, Run, RunChild };

use super::{ join_non_empty, ExtractError };

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let docx = read_docx(bytes).map_err(|e| ExtractError::Docx(e.to_string()))?;

    let paragraphs = docx.document.children.iter().filter_map(|child| {
        match child {
            DocumentChild::Paragraph(p) => Some(paragraph_text(p)),
            _ => None,
        }
    });

    Ok(join_non_empty(paragraphs))
}

fn paragraph_text(paragraph: &Paragraph) -> String {
    let mut text = String::new();
    push_paragraph_children(&paragraph.children, &mut text);
    text
}

// Hyperlinks nest further paragraph children; tracked insertions hold runs.
fn push_paragraph_children(children: &[ParagraphChild], text: &mut String) {
    for child in children {
        match child {
            ParagraphChild::Run(run) => push_run(run, text),
            ParagraphChild::Hyperlink(link) => push_paragraph_children(&link.children, text),
            ParagraphChild::Insert(insert) => {
                for inserted in &insert.children {
                    if let InsertChild::Run(run) = inserted {
                        push_run(run, text);
                    }
                }
            }
            _ => {}
        }
    }
}

fn push_run(run: &Run, text: &mut String) {
    for run_child in &run.children {
        match run_child {
            RunChild::Text(t) => text.push_str(&t.text),
            RunChild::Tab(_) => text.push('\t'),
            RunChild::Break(_) => text.push('\n'),
            _ => {}
        }
    }
}

#[cfg(test)]
mod tests {
    use super::*;
    use docx_rs::{ Docx, Hyperlink, HyperlinkType };
    use std::io::Cursor;

    fn build_docx(paragraphs: &[&str]) -> Vec<u8> {
        let mut docx = Docx::new();
        for text in paragraphs {
            let paragraph = if text.is_empty() {
                Paragraph::new()
            } else {
                Paragraph::new().add_run(Run::new().add_text(*text))
            };
            docx = docx.add_paragraph(paragraph);
        }
        let mut buf = Cursor::new(Vec::new());
        docx.build().pack(&mut buf).unwrap();
        buf.into_inner()
    }

    #[test]
    fn paragraphs_are_joined_with_newlines() {
        let bytes = build_docx(&["Introduction", "", "Mitochondria are organelles."]);
        let text = extract(&bytes).unwrap();
        assert_eq!(text, "Introduction\nMitochondria are organelles.");
    }

    #[test]
    fn runs_within_a_paragraph_are_concatenated() {
        let mut buf = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("Hello, "))
                    .add_run(Run::new().add_text("world"))
            )
            .build()
            .pack(&mut buf)
            .unwrap();

        assert_eq!(extract(&buf.into_inner()).unwrap(), "Hello, world");
    }

    #[test]
    fn hyperlink_text_and_tabs_are_kept() {
        let mut buf = Cursor::new(Vec::new());
        Docx::new()
            .add_paragraph(
                Paragraph::new()
                    .add_run(Run::new().add_text("See "))
                    .add_hyperlink(
                        Hyperlink::new("https://example.com/course", HyperlinkType::External).add_run(
                            Run::new().add_text("the course page")
                        )
                    )
                    .add_run(Run::new().add_text(" for details."))
            )
            .add_paragraph(Paragraph::new().add_run(Run::new().add_text("A").add_tab().add_text("B")))
            .build()
            .pack(&mut buf)
            .unwrap();

        assert_eq!(extract(&buf.into_inner()).unwrap(), "See the course page for details.\nA\tB");
    }

    #[test]
    fn non_docx_bytes_are_a_docx_error() {
        let err = extract(b"plain bytes").unwrap_err();
        assert!(matches!(err, ExtractError::Docx(_)));
    }
}
