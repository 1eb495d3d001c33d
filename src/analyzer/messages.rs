/// Patient-facing message templates for analysis findings.
pub struct MessageTemplates;

impl MessageTemplates {
    /// ALLERGY message. Names both the ingredient and the declared term.
    pub fn allergy(ingredient: &str, allergy_term: &str) -> String {
        format!(
            "Contains {}, which matches your listed allergy \"{}\". \
             Please check with your doctor or pharmacist before taking it.",
            ingredient, allergy_term,
        )
    }
}
