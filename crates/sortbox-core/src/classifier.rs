use std::collections::HashMap;

use once_cell::sync::Lazy;

use crate::models::Category;

/// Known extensions per category, in declaration order.
/// Categories are disjoint: no extension appears twice.
const CATEGORY_EXTENSIONS: &[(Category, &[&str])] = &[
    (
        Category::Images,
        &["jpg", "jpeg", "png", "gif", "bmp", "svg", "webp", "ico"],
    ),
    (Category::Pdfs, &["pdf"]),
    (
        Category::Documents,
        &[
            "doc", "docx", "txt", "rtf", "odt", "xls", "xlsx", "ppt", "pptx", "csv",
        ],
    ),
    (
        Category::Videos,
        &["mp4", "avi", "mov", "wmv", "flv", "mkv", "webm"],
    ),
    (Category::Audio, &["mp3", "wav", "ogg", "flac", "aac", "m4a"]),
    (Category::Archives, &["zip", "rar", "7z", "tar", "gz"]),
];

static EXTENSION_INDEX: Lazy<HashMap<&'static str, Category>> = Lazy::new(|| {
    let mut index = HashMap::new();
    for (category, extensions) in CATEGORY_EXTENSIONS {
        for ext in *extensions {
            // first declaration wins
            index.entry(*ext).or_insert(*category);
        }
    }
    index
});

/// Lowercased text after the final `.`; empty when the name has no dot.
pub fn file_extension(filename: &str) -> String {
    match filename.rsplit_once('.') {
        Some((_, ext)) => ext.to_lowercase(),
        None => String::new(),
    }
}

/// Classify a file by its name. Total and deterministic.
pub fn classify(filename: &str) -> Category {
    let ext = file_extension(filename);
    EXTENSION_INDEX
        .get(ext.as_str())
        .copied()
        .unwrap_or(Category::Other)
}

/// Extensions mapped to `category`; empty for `Other`.
pub fn extensions_for(category: Category) -> &'static [&'static str] {
    CATEGORY_EXTENSIONS
        .iter()
        .find(|(c, _)| *c == category)
        .map(|(_, exts)| *exts)
        .unwrap_or(&[])
}
