use std::path::Path;

use anyhow::{Context, Result};
use tracing::info;

/// Parse a universe file: one bare symbol per line, blank lines and `#`
/// comments ignored, symbols upper-cased, duplicates dropped in file order.
pub fn parse_universe(content: &str) -> Vec<String> {
    let mut symbols: Vec<String> = Vec::new();
    for line in content.lines() {
        let sym = line.trim();
        if sym.is_empty() || sym.starts_with('#') {
            continue;
        }
        let sym = sym.to_uppercase();
        if !symbols.contains(&sym) {
            symbols.push(sym);
        }
    }
    symbols
}

pub fn load_universe(path: impl AsRef<Path>) -> Result<Vec<String>> {
    let path = path.as_ref();
    let content = std::fs::read_to_string(path)
        .with_context(|| format!("failed to read universe from {}", path.display()))?;
    let symbols = parse_universe(&content);
    info!(path = %path.display(), count = symbols.len(), "universe loaded");
    Ok(symbols)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn skips_blanks_and_comments() {
        let syms = parse_universe("RELIANCE\n\n  tcs  \n# banks\nHDFCBANK\nTCS\n");
        assert_eq!(syms, vec!["RELIANCE", "TCS", "HDFCBANK"]);
    }

    #[test]
    fn missing_file_is_error() {
        assert!(load_universe("/nonexistent/stocks.txt").is_err());
    }
}
