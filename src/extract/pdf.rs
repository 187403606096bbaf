use lopdf::Document;
use log::warn;

use super::{ join_non_empty, ExtractError };

pub fn extract(bytes: &[u8]) -> Result<String, ExtractError> {
    let doc = Document::load_mem(bytes).map_err(|e| ExtractError::Pdf(e.to_string()))?;

    let pages = doc
        .get_pages()
        .into_keys()
        .filter_map(|page_number| {
            match doc.extract_text(&[page_number]) {
                Ok(text) => Some(text.trim().to_string()),
                Err(e) => {
                    warn!("Skipping PDF page {}: {}", page_number, e);
                    None
                }
            }
        });

    Ok(join_non_empty(pages))
}
