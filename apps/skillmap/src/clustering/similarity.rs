use std::collections::BTreeSet;

/// A posting's skills reduced to a lowercase set.
pub type SkillSet = BTreeSet<String>;

pub fn skill_set<I, S>(skills: I) -> SkillSet
where
    I: IntoIterator<Item = S>,
    S: AsRef<str>,
{
    skills
        .into_iter()
        .map(|s| s.as_ref().trim().to_lowercase())
        .filter(|s| !s.is_empty())
        .collect()
}

/// `|A ∩ B| / |A ∪ B|`; 0 when either set is empty.
pub fn jaccard(a: &SkillSet, b: &SkillSet) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let intersection = a.intersection(b).count();
    let union = a.len() + b.len() - intersection;
    intersection as f64 / union as f64
}

/// Mean Jaccard similarity over every (member of `a`, member of `b`) pair.
pub fn average_linkage(a: &[usize], b: &[usize], sets: &[SkillSet]) -> f64 {
    if a.is_empty() || b.is_empty() {
        return 0.0;
    }
    let total: f64 = a
        .iter()
        .flat_map(|&i| b.iter().map(move |&j| (i, j)))
        .map(|(i, j)| jaccard(&sets[i], &sets[j]))
        .sum();
    total / (a.len() * b.len()) as f64
}
