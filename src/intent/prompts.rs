// Prompt text for each descriptor schema. Every prompt ends by pinning the
// exact JSON shape the parser in `parse.rs` expects.

use crate::catalog::{CatalogItem, PurchaseDigest};

pub(crate) fn vibe_keywords(vibe: &str, categories: &[String]) -> String {
    format!(
        "You are a fashion stylist. Translate a \"vibe\" or feeling into searchable catalog keywords.\n\
         User vibe: \"{vibe}\"\n\
         Catalog categories: {categories}\n\n\
         Pick 3-5 keywords that characterize this vibe. At least 2 should name garments that \
         belong to the catalog categories above.\n\
         Return ONLY a JSON object: {{\"search_terms\": [\"keyword\", ...]}}",
        categories = categories.join(", "),
    )
}

pub(crate) fn stylist_selection(brief: &str, candidates: &[CatalogItem]) -> String {
    let listing = candidates
        .iter()
        .map(|item| {
            format!(
                "- ID: {}, Name: {}, Category: {} / {}, Color: {}",
                item.id, item.name, item.master_category, item.category, item.color
            )
        })
        .collect::<Vec<_>>()
        .join("\n");

    format!(
        "You are a personal stylist assembling one complete outfit from the inventory below.\n\
         Brief: \"{brief}\"\n\n\
         INVENTORY:\n{listing}\n\n\
         Choose items that work together: at least one top, one bottom and one pair of shoes \
         when the inventory allows. Only use IDs from the list.\n\
         Return ONLY a JSON object:\n\
         {{\"OverallTheme\": \"short name for the look\", \
         \"StylistReasoning\": \"1-2 sentences\", \
         \"SelectedProductIds\": [1, 2, 3]}}"
    )
}

pub(crate) fn style_dna(history: &PurchaseDigest) -> String {
    format!(
        "You are a luxury fashion advisor. Analyze this customer's recent purchase history and \
         describe their \"Style DNA\". Then provide 10 specific fashion keywords or qualities for \
         items they would love next.\n\n\
         PURCHASE HISTORY:\n{history}\n\n\
         Return ONLY a JSON object:\n\
         {{\"StyleSummary\": \"a 1-sentence description of their aesthetic\", \
         \"RecommendedQualities\": [\"linen\", \"relaxed fit\", \"earth tones\"]}}",
        history = history.render(),
    )
}

pub(crate) fn vibe_qualities(vibe: &str) -> String {
    format!(
        "You are a fashion advisor. Describe the style below as 5-10 concrete garment qualities \
         (materials, colors, cuts, garment names).\n\
         Style: \"{vibe}\"\n\n\
         Return ONLY a JSON object:\n\
         {{\"StyleSummary\": \"a 1-sentence description\", \
         \"RecommendedQualities\": [\"quality\", ...]}}"
    )
}

pub(crate) fn item_description() -> String {
    "Analyze this clothing image for a fashion 'vibe' search engine. Describe it with rich \
     fashion adjectives. Identify the masterCategory (Apparel, Footwear, Accessories), \
     category (Topwear, Bottomwear, etc.), gender and color.\n\
     Return ONLY a JSON object with: 'title' (marketing name), 'vibe_description' \
     (2-3 sentences), 'masterCategory', 'category', 'gender', 'color'."
        .to_string()
}

pub(crate) fn complete_look(declared: &[String], missing: &[String]) -> String {
    let wearing = declared
        .iter()
        .map(|c| format!("One is a {c}."))
        .collect::<Vec<_>>()
        .join(" ");

    format!(
        "I am wearing the items in these images. {wearing} Analyze their collective style and \
         aesthetic vibe. Based on this, write a prompt for a personal stylist to find matching \
         items in these MISSING categories: {missing}.\n\
         Return ONLY a JSON object with: 'collective_vibe' and 'styling_prompt'.",
        missing = missing.join(", "),
    )
}
