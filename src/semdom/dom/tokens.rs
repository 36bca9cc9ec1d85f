//! Token definitions for raw markup
//!
//! The tokens are defined using the logos derive macro. Tag contents
//! (element name, attributes) are not split here; the parser extracts them
//! from the matched slice. The `Text` catch-all keeps the tokenizer total:
//! any input produces a token stream.

use logos::Logos;

/// All possible tokens in a markup fragment
#[derive(Logos, Debug, PartialEq, Clone, Copy)]
pub enum MarkupToken {
    // Comments must win over doctype for `<!--` prefixes
    #[regex(r"<!--([^-]|-[^-]|--[^>])*-->", priority = 4)]
    Comment,

    // Doctype and other `<!...>` declarations (skipped by the parser)
    #[regex(r"<![^>]*>", priority = 2)]
    Doctype,

    #[regex(r"</[a-zA-Z][^>]*>")]
    CloseTag,

    // Quoted attribute values may contain `>`
    #[regex(r#"<[a-zA-Z]([^>"']|"[^"]*"|'[^']*')*>"#)]
    OpenTag,

    #[regex(r"[^<]+")]
    Text,

    // A `<` that starts no recognizable tag is plain text
    #[token("<")]
    StrayBracket,
}

/// Tokenize markup with location information.
///
/// Returns tokens paired with their byte spans in the source. Tokenization
/// never fails; unmatched input degrades to text tokens.
pub fn tokenize(source: &str) -> Vec<(MarkupToken, logos::Span)> {
    let mut lexer = MarkupToken::lexer(source);
    let mut tokens = Vec::new();

    while let Some(result) = lexer.next() {
        if let Ok(token) = result {
            tokens.push((token, lexer.span()));
        }
    }

    tokens
}

#[cfg(test)]
mod tests {
    use super::*;

    fn kinds(source: &str) -> Vec<MarkupToken> {
        tokenize(source).into_iter().map(|(t, _)| t).collect()
    }

    #[test]
    fn test_tokenizes_simple_element() {
        assert_eq!(
            kinds("<div>hello</div>"),
            vec![MarkupToken::OpenTag, MarkupToken::Text, MarkupToken::CloseTag]
        );
    }

    #[test]
    fn test_tokenizes_comment() {
        assert_eq!(
            kinds("a<!-- note -->b"),
            vec![MarkupToken::Text, MarkupToken::Comment, MarkupToken::Text]
        );
    }

    #[test]
    fn test_comment_containing_angle_bracket() {
        assert_eq!(kinds("<!-- a > b -->"), vec![MarkupToken::Comment]);
    }

    #[test]
    fn test_doctype() {
        assert_eq!(
            kinds("<!DOCTYPE html><p>x</p>"),
            vec![
                MarkupToken::Doctype,
                MarkupToken::OpenTag,
                MarkupToken::Text,
                MarkupToken::CloseTag
            ]
        );
    }

    #[test]
    fn test_quoted_attribute_with_bracket() {
        assert_eq!(kinds(r#"<a title="x>y">"#), vec![MarkupToken::OpenTag]);
    }

    #[test]
    fn test_stray_bracket_is_tokenized() {
        assert_eq!(
            kinds("a < b"),
            vec![MarkupToken::Text, MarkupToken::StrayBracket, MarkupToken::Text]
        );
    }

    #[test]
    fn test_empty_input() {
        assert_eq!(kinds(""), vec![]);
    }
}
