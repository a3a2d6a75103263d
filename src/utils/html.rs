// src/utils/html.rs

/// Strips markup from free text (question body, explanation) before it is stored.
///
/// Whitelist based: harmless formatting tags survive, `<script>` and event
/// handler attributes are removed. Options and answers are not passed through
/// here because entity-encoding would break answer comparison.
pub fn sanitize_text(input: &str) -> String {
    ammonia::clean(input.trim())
}
