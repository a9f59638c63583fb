//! Deterministic text normalization applied after extraction.
//!
//! The pass is idempotent: running it twice over any input yields the
//! same output, which keeps reprocessing of unchanged documents stable.

use regex::Regex;
use serde::Deserialize;
use unicode_normalization::UnicodeNormalization;

/// Normalization preset levels.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Default, Deserialize)]
#[serde(rename_all = "lowercase")]
pub enum NormalizePreset {
    /// Unicode NFC and newline canonicalization only.
    Minimal,
    /// NFC plus OCR artifact correction and whitespace cleanup.
    #[default]
    Standard,
    /// Standard plus page-number stripping and tight newline limits.
    Aggressive,
}

/// Options controlling individual normalization stages.
#[derive(Debug, Clone)]
pub struct NormalizeOptions {
    /// Normalize Unicode to NFC form.
    pub normalize_unicode: bool,
    /// Expand typographic ligatures (fi, fl, ...).
    pub fix_ligatures: bool,
    /// Map bullet glyph variants to a single marker.
    pub standardize_bullets: bool,
    /// Drop U+FFFD, a common OCR casualty.
    pub remove_replacement_char: bool,
    /// Drop control characters other than newline and tab.
    pub remove_control_chars: bool,
    /// Join words hyphenated across line breaks.
    pub fix_hyphenation: bool,
    /// Strip lines that are nothing but a page number.
    pub remove_page_numbers: bool,
    /// Collapse runs of spaces and tabs within a line.
    pub collapse_spaces: bool,
    /// Maximum consecutive newlines (0 = unlimited).
    pub max_consecutive_newlines: u8,
}

impl NormalizeOptions {
    pub fn from_preset(preset: NormalizePreset) -> Self {
        match preset {
            NormalizePreset::Minimal => Self::minimal(),
            NormalizePreset::Standard => Self::standard(),
            NormalizePreset::Aggressive => Self::aggressive(),
        }
    }

    pub fn minimal() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: false,
            standardize_bullets: false,
            remove_replacement_char: false,
            remove_control_chars: false,
            fix_hyphenation: false,
            remove_page_numbers: false,
            collapse_spaces: false,
            max_consecutive_newlines: 0,
        }
    }

    pub fn standard() -> Self {
        Self {
            normalize_unicode: true,
            fix_ligatures: true,
            standardize_bullets: true,
            remove_replacement_char: true,
            remove_control_chars: true,
            fix_hyphenation: true,
            remove_page_numbers: false,
            collapse_spaces: true,
            max_consecutive_newlines: 2,
        }
    }

    pub fn aggressive() -> Self {
        Self {
            remove_page_numbers: true,
            max_consecutive_newlines: 1,
            ..Self::standard()
        }
    }
}

impl Default for NormalizeOptions {
    fn default() -> Self {
        Self::standard()
    }
}

/// Deterministic cleanup pass over extracted text.
pub struct TextNormalizer {
    options: NormalizeOptions,
    page_number_regex: Regex,
    hyphenation_regex: Regex,
    space_run_regex: Regex,
    ligature_map: Vec<(&'static str, &'static str)>,
}

impl TextNormalizer {
    pub fn new(options: NormalizeOptions) -> Self {
        Self {
            options,
            page_number_regex: Regex::new(r"(?m)^\s*[-–—]?\s*\d+\s*[-–—]?\s*$").unwrap(),
            hyphenation_regex: Regex::new(r"([a-zA-Z])-\s*\n\s*([a-z])").unwrap(),
            space_run_regex: Regex::new(r"[ \t]{2,}").unwrap(),
            ligature_map: vec![
                ("\u{FB00}", "ff"),
                ("\u{FB01}", "fi"),
                ("\u{FB02}", "fl"),
                ("\u{FB03}", "ffi"),
                ("\u{FB04}", "ffl"),
                ("\u{FB05}", "st"),
                ("\u{FB06}", "st"),
            ],
        }
    }

    pub fn from_preset(preset: NormalizePreset) -> Self {
        Self::new(NormalizeOptions::from_preset(preset))
    }

    /// Run every enabled stage over the text.
    pub fn normalize(&self, text: &str) -> String {
        // Newlines are canonical LF throughout; OCR output on some
        // platforms arrives with CRLF.
        let mut result = text.replace("\r\n", "\n").replace('\r', "\n");

        if self.options.normalize_unicode {
            result = result.nfc().collect();
        }

        if self.options.fix_ligatures {
            for (ligature, replacement) in &self.ligature_map {
                result = result.replace(ligature, replacement);
            }
        }

        if self.options.standardize_bullets {
            result = standardize_bullets(&result);
        }

        if self.options.remove_replacement_char {
            result = result.replace('\u{FFFD}', "");
        }

        if self.options.remove_control_chars {
            result.retain(|c| c == '\n' || c == '\t' || !c.is_control());
        }

        if self.options.remove_page_numbers {
            result = self.page_number_regex.replace_all(&result, "").to_string();
        }

        // Must run before space collapsing so the break pattern is intact.
        if self.options.fix_hyphenation {
            result = self.hyphenation_regex.replace_all(&result, "$1$2").to_string();
        }

        if self.options.collapse_spaces {
            result = self.space_run_regex.replace_all(&result, " ").to_string();
            result = strip_trailing_spaces(&result);
        }

        if self.options.max_consecutive_newlines > 0 {
            result = limit_newlines(&result, self.options.max_consecutive_newlines as usize);
        }

        result.trim().to_string()
    }
}

impl Default for TextNormalizer {
    fn default() -> Self {
        Self::new(NormalizeOptions::default())
    }
}

fn standardize_bullets(text: &str) -> String {
    let variants = ['●', '○', '■', '□', '◆', '◇', '▪', '▫', '►', '▻', '‣', '◦'];
    let mut result = text.to_string();
    for variant in variants {
        result = result.replace(variant, "•");
    }
    result
}

fn strip_trailing_spaces(text: &str) -> String {
    text.lines()
        .map(str::trim_end)
        .collect::<Vec<_>>()
        .join("\n")
}

fn limit_newlines(text: &str, max: usize) -> String {
    let pattern = format!(r"\n{{{},}}", max + 1);
    let re = Regex::new(&pattern).unwrap();
    let replacement = "\n".repeat(max);
    re.replace_all(text, replacement.as_str()).to_string()
}
