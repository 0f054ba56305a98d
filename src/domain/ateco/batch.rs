//! Batch ATECO import helpers.

use super::lookup::AtecoItem;

/// Largest chunk the directory accepts per batch call.
pub const MAX_BATCH_SIZE: usize = 50;

const SUMMARY_FOUND_ITEMS: usize = 10;
const SUMMARY_MISSING_ITEMS: usize = 5;

/// Outcome for one requested code.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct BatchEntry {
    pub code: String,
    pub item: Option<AtecoItem>,
}

impl BatchEntry {
    pub fn is_found(&self) -> bool {
        self.item.is_some()
    }
}

/// Splits pasted or uploaded text into codes. Newlines, commas and
/// semicolons separate; blanks are dropped.
pub fn parse_code_list(text: &str) -> Vec<String> {
    clean_codes(text.split(|c| matches!(c, '\n' | ',' | ';')))
}

/// Trims codes and drops the empty ones.
pub fn clean_codes<I, S>(codes: I) -> Vec<String>
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    codes
        .into_iter()
        .map(|c| c.as_ref().trim().to_string())
        .filter(|c| !c.is_empty())
        .collect()
}

/// Chat summary of a batch run.
pub fn batch_summary(entries: &[BatchEntry]) -> String {
    let found: Vec<&BatchEntry> = entries.iter().filter(|e| e.is_found()).collect();
    let missing: Vec<&BatchEntry> = entries.iter().filter(|e| !e.is_found()).collect();

    let mut text = format!(
        "📊 **Risultati Batch Import ATECO**\n\n✅ **Trovati**: {} codici\n❌ **Non trovati**: {} codici\n📁 **Totale processati**: {} codici\n\n**Dettagli codici trovati:**\n",
        found.len(),
        missing.len(),
        entries.len()
    );

    let found_lines: Vec<String> = found
        .iter()
        .take(SUMMARY_FOUND_ITEMS)
        .map(|e| {
            let title = e.item.as_ref().map(AtecoItem::display_title).unwrap_or("N/D");
            format!("• {}: {}", e.code, title)
        })
        .collect();
    text.push_str(&found_lines.join("\n"));
    if found.len() > SUMMARY_FOUND_ITEMS {
        text.push_str(&format!(
            "\n\n...e altri {} codici",
            found.len() - SUMMARY_FOUND_ITEMS
        ));
    }

    if !missing.is_empty() {
        let missing_lines: Vec<String> = missing
            .iter()
            .take(SUMMARY_MISSING_ITEMS)
            .map(|e| format!("• {}", e.code))
            .collect();
        text.push_str("\n\n**Codici non trovati:**\n");
        text.push_str(&missing_lines.join("\n"));
        if missing.len() > SUMMARY_MISSING_ITEMS {
            text.push_str(&format!(
                "\n...e altri {} codici",
                missing.len() - SUMMARY_MISSING_ITEMS
            ));
        }
    }

    text.trim().to_string()
}
