//! Script detection.

use regex::Regex;
use std::sync::OnceLock;

static RTL_SCRIPT: OnceLock<Regex> = OnceLock::new();

/// True when `text` contains at least one character from the Persian/Arabic
/// Unicode block (U+0600–U+06FF). One match is enough; a single RTL word
/// inside an otherwise-Latin paragraph counts.
pub fn is_rtl_script(text: &str) -> bool {
    let re = RTL_SCRIPT.get_or_init(|| Regex::new("[\u{0600}-\u{06FF}]").unwrap());
    re.is_match(text)
}
