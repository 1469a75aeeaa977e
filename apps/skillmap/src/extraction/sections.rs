//! Section Extractor: heuristic locator of labeled subsections in free text.
//!
//! Only the FIRST heading that matches is captured; a posting with two
//! "skills" blocks contributes only the first one.

/// Default number of lines collected after a heading.
pub const DEFAULT_CONTEXT_LINES: usize = 15;

/// Headings that open a technical-skills block.
pub const TECHNICAL_HEADINGS: &[&str] = &[
    "technical skills",
    "required skills",
    "compétences techniques",
    "competences techniques",
    "tech stack",
    "stack technique",
    "technologies",
    "skills",
    "compétences",
    "competences",
];

/// Headings that open a candidate profile / qualifications block.
pub const PROFILE_HEADINGS: &[&str] = &[
    "profil recherché",
    "profil recherche",
    "your profile",
    "profile",
    "profil",
    "qualifications",
    "requirements",
    "exigences",
    "must have",
    "required",
];

/// Headings that open a responsibilities block.
pub const RESPONSIBILITY_HEADINGS: &[&str] = &[
    "responsibilities",
    "responsabilités",
    "responsabilites",
    "what you will do",
    "your role",
    "vos missions",
    "missions",
    "tâches",
    "duties",
];

/// Returns the first line matching any of `heading_keywords` (case-insensitive)
/// together with the `context_lines` lines that follow it, joined by `\n`.
/// Returns an empty string when no heading matches.
pub fn extract_section(text: &str, heading_keywords: &[&str], context_lines: usize) -> String {
    let lines: Vec<&str> = text.lines().collect();

    let start = lines.iter().position(|line| {
        let lower = line.to_lowercase();
        heading_keywords
            .iter()
            .any(|keyword| lower.contains(&keyword.to_lowercase()))
    });

    match start {
        Some(idx) => {
            let end = (idx + 1 + context_lines).min(lines.len());
            lines[idx..end].join("\n")
        }
        None => String::new(),
    }
}
