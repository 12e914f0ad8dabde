use std::collections::HashMap;

/// Heading anchor generator, compatible with github-slugger.
///
/// Slugs are unique within one slugger: repeats get `-1`, `-2`, ... suffixes,
/// skipping any suffixed form that an earlier heading already produced.
///
/// ```
/// use folio_html::Slugger;
///
/// let mut slugger = Slugger::new();
/// assert_eq!(slugger.slug("Side Projects"), "side-projects");
/// assert_eq!(slugger.slug("Side Projects"), "side-projects-1");
/// ```
#[derive(Debug, Default)]
pub struct Slugger {
    seen: HashMap<String, usize>,
}

impl Slugger {
    /// Creates a new slugger.
    pub fn new() -> Self {
        Self::default()
    }

    /// Returns the next unique slug for `text`.
    pub fn slug(&mut self, text: &str) -> String {
        let base = slugify(text);
        let mut slug = base.clone();
        while self.seen.contains_key(&slug) {
            let count = self.seen.entry(base.clone()).or_insert(0);
            *count += 1;
            slug = format!("{}-{}", base, count);
        }
        // Generated slugs are taken too, so a later heading cannot reuse one.
        self.seen.insert(slug.clone(), 0);
        slug
    }
}

/// Lowercases `text`, turns spaces into hyphens and drops punctuation.
///
/// Hyphens are neither collapsed nor trimmed. Empty results become `heading`.
pub fn slugify(text: &str) -> String {
    let mut slug = String::with_capacity(text.len());
    for ch in text.trim().chars() {
        if ch.is_alphanumeric() || ch == '-' || ch == '_' {
            slug.extend(ch.to_lowercase());
        } else if ch == ' ' {
            slug.push('-');
        }
    }
    if slug.is_empty() {
        slug.push_str("heading");
    }
    slug
}
