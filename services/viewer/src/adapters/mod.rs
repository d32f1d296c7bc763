pub mod documents;
pub mod html;
pub mod mock_translation;
pub mod pdf;

pub use documents::LocalDocumentAdapter;
pub use mock_translation::MockTranslationAdapter;

/// Collapses whitespace runs to single spaces and trims the ends.
pub(crate) fn collapse_whitespace(text: &str) -> String {
    text.split_whitespace().collect::<Vec<_>>().join(" ")
}
