//! Heuristic layout probing over extracted text.
//!
//! Without real page geometry the probe assigns synthetic line-grid
//! coordinates: a letter-width page with one row per text line. That is
//! enough for downstream consumers that only care about ordering and
//! region typing.

use crate::engine::LayoutProbe;
use crate::model::{BoundingBox, Region, RegionType};

const PAGE_WIDTH: f32 = 612.0;
const LINE_HEIGHT: f32 = 14.0;

const BULLET_PREFIXES: [&str; 6] = ["- ", "* ", "• ", "▪ ", "◦ ", "‣ "];

#[derive(Debug, Default)]
pub struct HeuristicLayoutProbe;

impl HeuristicLayoutProbe {
    pub fn new() -> Self {
        Self
    }

    fn classify(line: &str, is_first: bool) -> RegionType {
        let trimmed = line.trim();
        if BULLET_PREFIXES.iter().any(|p| trimmed.starts_with(p)) {
            return RegionType::List;
        }
        if trimmed.contains('|') || trimmed.contains('\t') {
            return RegionType::Table;
        }
        let looks_like_heading = trimmed.len() < 60
            && !trimmed.ends_with(['.', ',', ';', ':'])
            && trimmed.split_whitespace().count() <= 8;
        if looks_like_heading && (is_first || trimmed.chars().any(|c| c.is_uppercase()) && trimmed == trimmed.to_uppercase())
        {
            return RegionType::Title;
        }
        RegionType::Text
    }
}

impl LayoutProbe for HeuristicLayoutProbe {
    fn probe(&self, text: &str) -> Vec<Region> {
        let mut regions: Vec<Region> = Vec::new();
        let mut current: Option<(RegionType, usize, Vec<&str>)> = None;
        let mut seen_content = false;

        for (idx, line) in text.lines().enumerate() {
            if line.trim().is_empty() {
                if let Some((kind, start, lines)) = current.take() {
                    regions.push(make_region(kind, start, idx, &lines));
                }
                continue;
            }
            let kind = Self::classify(line, !seen_content);
            seen_content = true;
            match current.as_mut() {
                Some((k, _, lines)) if *k == kind => lines.push(line),
                _ => {
                    if let Some((k, start, lines)) = current.take() {
                        regions.push(make_region(k, start, idx, &lines));
                    }
                    current = Some((kind, idx, vec![line]));
                }
            }
        }
        if let Some((kind, start, lines)) = current.take() {
            regions.push(make_region(kind, start, start + lines.len(), &lines));
        }
        regions
    }
}

fn make_region(kind: RegionType, start: usize, end: usize, lines: &[&str]) -> Region {
    let bbox = BoundingBox::new(
        0.0,
        start as f32 * LINE_HEIGHT,
        PAGE_WIDTH,
        end as f32 * LINE_HEIGHT,
    );
    Region::new(kind, bbox).with_text(lines.join("\n"))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_title_then_body() {
        let text = "QUARTERLY REPORT\n\nRevenue grew in the third quarter. Costs were flat.";
        let regions = HeuristicLayoutProbe::new().probe(text);
        assert_eq!(regions.len(), 2);
        assert_eq!(regions[0].region_type, RegionType::Title);
        assert_eq!(regions[1].region_type, RegionType::Text);
    }

    #[test]
    fn test_bulleted_block_is_list() {
        let text = "Findings:\n- first item\n- second item\n- third item";
        let regions = HeuristicLayoutProbe::new().probe(text);
        let list = regions
            .iter()
            .find(|r| r.region_type == RegionType::List)
            .unwrap();
        assert!(list.text.as_deref().unwrap().contains("second item"));
    }

    #[test]
    fn test_pipe_rows_are_table() {
        let text = "name | qty\napples | 4\npears | 9";
        let regions = HeuristicLayoutProbe::new().probe(text);
        assert_eq!(regions.len(), 1);
        assert_eq!(regions[0].region_type, RegionType::Table);
    }

    #[test]
    fn test_no_degenerate_boxes() {
        let text = "One\n\nTwo paragraphs of ordinary text here.\n\nAnd a third.";
        let regions = HeuristicLayoutProbe::new().probe(text);
        assert!(regions.iter().all(|r| !r.bbox.is_degenerate()));
    }

    #[test]
    fn test_empty_text_yields_no_regions() {
        assert!(HeuristicLayoutProbe::new().probe("").is_empty());
        assert!(HeuristicLayoutProbe::new().probe("\n\n  \n").is_empty());
    }
}
