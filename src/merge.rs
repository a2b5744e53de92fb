use std::collections::HashMap;

use crate::model::{dedup_items, Offering};

/// Collapse candidates sharing a case-insensitive name.
///
/// The first candidate for a name is kept; later ones extend its lists and fill
/// scalars that are still empty. Output keeps first-encounter order, every list
/// deduplicated.
pub fn merge_offerings(candidates: Vec<Offering>) -> Vec<Offering> {
    let mut index: HashMap<String, usize> = HashMap::new();
    let mut merged: Vec<Offering> = Vec::new();

    for candidate in candidates {
        let key = candidate.key();
        if key.is_empty() {
            continue;
        }
        match index.get(&key) {
            Some(&i) => absorb(&mut merged[i], candidate),
            None => {
                index.insert(key, merged.len());
                merged.push(candidate);
            }
        }
    }

    for o in &mut merged {
        dedup_items(&mut o.features);
        dedup_items(&mut o.benefits);
        dedup_items(&mut o.use_cases);
    }
    merged
}

fn absorb(into: &mut Offering, from: Offering) {
    into.features.extend(from.features);
    into.benefits.extend(from.benefits);
    into.use_cases.extend(from.use_cases);

    if into.pricing.as_deref().map_or(true, |p| p.trim().is_empty()) {
        if let Some(p) = from.pricing.filter(|p| !p.trim().is_empty()) {
            into.pricing = Some(p);
        }
    }
    fill(&mut into.category, from.category);
    fill(&mut into.description, from.description);
    fill(&mut into.url, from.url);
    fill(&mut into.target_audience, from.target_audience);
    fill(&mut into.requirements, from.requirements);
    fill(&mut into.deployment, from.deployment);
    fill(&mut into.support, from.support);
}

fn fill(slot: &mut String, value: String) {
    if slot.trim().is_empty() && !value.trim().is_empty() {
        *slot = value;
    }
}
