//! Literal allergy matching: an ingredient conflicts with a declared term
//! when its lowercased name equals or contains the lowercased term.

use super::messages::MessageTemplates;

/// A declared allergy, trimmed for display and lowercased for matching.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct AllergyTerm {
    pub display: String,
    needle: String,
}

impl AllergyTerm {
    /// `None` for blank input: an empty term would match every ingredient.
    pub fn parse(raw: &str) -> Option<Self> {
        let display = raw.trim();
        if display.is_empty() {
            return None;
        }
        Some(Self {
            display: display.to_string(),
            needle: display.to_lowercase(),
        })
    }

    pub fn matches(&self, ingredient: &str) -> bool {
        ingredient.to_lowercase().contains(&self.needle)
    }
}

pub fn parse_allergy_terms(raw: &[String]) -> Vec<AllergyTerm> {
    raw.iter().filter_map(|t| AllergyTerm::parse(t)).collect()
}

/// One warning per (ingredient, term) conflict, ingredient-major order.
/// Identical messages are emitted once, at their first position.
pub fn scan_allergies(ingredients: &[String], terms: &[AllergyTerm]) -> Vec<String> {
    let mut warnings: Vec<String> = Vec::new();
    for ingredient in ingredients {
        for term in terms {
            if !term.matches(ingredient) {
                continue;
            }
            let message = MessageTemplates::allergy(ingredient, &term.display);
            if !warnings.contains(&message) {
                warnings.push(message);
            }
        }
    }
    warnings
}

#[cfg(test)]
mod tests {
    use super::*;

    fn strings(items: &[&str]) -> Vec<String> {
        items.iter().map(|s| s.to_string()).collect()
    }

    #[test]
    fn blank_terms_are_dropped() {
        let terms = parse_allergy_terms(&strings(&["", "   ", " Penicillin "]));
        assert_eq!(terms.len(), 1);
        assert_eq!(terms[0].display, "Penicillin");
    }

    #[test]
    fn ingredient_containing_term_matches() {
        let term = AllergyTerm::parse("CLAVULANIC").unwrap();
        assert!(term.matches("Clavulanic Acid"));
        assert!(!term.matches("Amoxicillin"));
    }

    #[test]
    fn term_longer_than_ingredient_does_not_match() {
        let term = AllergyTerm::parse("Amoxicillin trihydrate").unwrap();
        assert!(!term.matches("Amoxicillin"));
    }

    #[test]
    fn identical_warnings_deduplicated() {
        let ingredients = strings(&["Atorvastatin"]);
        let terms = parse_allergy_terms(&strings(&["Atorvastatin", " Atorvastatin "]));
        let warnings = scan_allergies(&ingredients, &terms);
        assert_eq!(warnings.len(), 1);
    }

    #[test]
    fn distinct_conflicts_keep_first_occurrence_order() {
        let ingredients = strings(&["Amoxicillin", "Clavulanic Acid"]);
        let terms = parse_allergy_terms(&strings(&["acid", "amox"]));
        let warnings = scan_allergies(&ingredients, &terms);
        assert_eq!(warnings.len(), 2);
        assert!(warnings[0].contains("Amoxicillin"));
        assert!(warnings[1].contains("Clavulanic Acid"));
    }

    #[test]
    fn no_terms_no_warnings() {
        assert!(scan_allergies(&strings(&["Metformin"]), &[]).is_empty());
    }
}
