use crate::types::Category;

/// Keyword lists checked in fixed priority order; the first category with a
/// substring hit wins. Independent of the similarity scorer.
const CATEGORY_KEYWORDS: &[(Category, &[&str])] = &[
    (
        Category::Electronics,
        &[
            "phone", "laptop", "tablet", "watch", "earphone", "headphone", "camera", "tv",
            "monitor", "keyboard", "mouse", "speaker",
        ],
    ),
    (
        Category::Fashion,
        &[
            "shirt", "jeans", "shoe", "dress", "jacket", "trouser", "bag", "sunglasses", "watch",
            "belt", "hat",
        ],
    ),
    (
        Category::Home,
        &[
            "furniture", "bed", "sofa", "chair", "table", "lamp", "curtain", "vacuum", "mixer",
            "blender", "kettle",
        ],
    ),
    (Category::Books, &["book", "novel", "diary", "notebook", "pen", "pencil"]),
    (Category::Sports, &["gym", "fitness", "yoga", "dumbbell", "treadmill", "cycle"]),
];

/// Classify a product name by keyword substring, defaulting to General.
pub fn category_of(name: &str) -> Category {
    let lower = name.to_lowercase();
    for (category, words) in CATEGORY_KEYWORDS {
        if words.iter().any(|w| lower.contains(w)) {
            return *category;
        }
    }
    Category::General
}

// ---------------------------------------------------------------------------
// Tests
// ---------------------------------------------------------------------------
