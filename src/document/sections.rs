use super::blocks::Block;

pub const HEADER: &str = "header";
pub const FOOTER: &str = "footer";

#[derive(Debug, Clone)]
pub struct Section {
    pub kind: String,
    pub blocks: Vec<Block>,
}

/// Cluster a flat Vec<Block> into sections. A section starts at each `## ` header
/// (its kind is the header text) and at the closing rule; blocks before the first
/// header form the `header` section.
pub fn cluster_sections(blocks: &[Block]) -> Vec<Section> {
    let mut sections: Vec<Section> = Vec::new();
    let mut current_blocks: Vec<Block> = Vec::new();
    let mut current_kind = HEADER.to_string();

    for block in blocks {
        if let Some(new_kind) = detect_transition(block) {
            if !current_blocks.is_empty() || current_kind != HEADER {
                sections.push(Section {
                    kind: current_kind,
                    blocks: std::mem::take(&mut current_blocks),
                });
            }
            current_kind = new_kind;
            continue;
        }
        if !matches!(block, Block::Empty) {
            current_blocks.push(block.clone());
        }
    }

    if !current_blocks.is_empty() || current_kind != HEADER {
        sections.push(Section {
            kind: current_kind,
            blocks: current_blocks,
        });
    }

    sections
}

fn detect_transition(block: &Block) -> Option<String> {
    match block {
        Block::SectionHeader(name) => Some(name.clone()),
        Block::Rule => Some(FOOTER.to_string()),
        _ => None,
    }
}

/// Split an offerings section into one block run per ordinal heading. Blocks before
/// the first heading are dropped.
pub fn split_offerings(blocks: &[Block]) -> Vec<(String, Vec<Block>)> {
    let mut out: Vec<(String, Vec<Block>)> = Vec::new();
    for block in blocks {
        match block {
            Block::Offering { name, .. } => out.push((name.clone(), Vec::new())),
            other => {
                if let Some((_, run)) = out.last_mut() {
                    run.push(other.clone());
                }
            }
        }
    }
    out
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::document::blocks::classify_lines;

    fn section_kinds(doc: &str) -> Vec<String> {
        cluster_sections(&classify_lines(doc))
            .iter()
            .map(|s| s.kind.clone())
            .collect()
    }

    #[test]
    fn sections_by_header() {
        let kinds = section_kinds("# Acme\n\n## Basic Information\n- **Vendor ID**: acme\n\n## Metadata\n\n---\n*x*");
        assert_eq!(kinds, vec!["header", "Basic Information", "Metadata", "footer"]);
    }

    #[test]
    fn empty_sections_are_kept() {
        let sections = cluster_sections(&classify_lines("## Technology Stack\n## Metadata\n"));
        assert_eq!(sections.len(), 2);
        assert!(sections[0].blocks.is_empty());
    }

    #[test]
    fn offerings_split_at_ordinal_heading() {
        let doc = "stray\n### 1. Alpha\n- **URL**: a\n### 2. Beta\n- **URL**: b\n- **Features**:\n  - one two three four";
        let runs = split_offerings(&classify_lines(doc));
        assert_eq!(runs.len(), 2);
        assert_eq!(runs[0].0, "Alpha");
        assert_eq!(runs[0].1.len(), 1);
        assert_eq!(runs[1].0, "Beta");
        assert_eq!(runs[1].1.len(), 3);
    }

    #[test]
    fn unknown_text_not_lost() {
        let sections = cluster_sections(&classify_lines("Random paragraph\nthat matches nothing"));
        assert_eq!(sections.len(), 1);
        assert_eq!(sections[0].blocks.len(), 2);
    }
}
