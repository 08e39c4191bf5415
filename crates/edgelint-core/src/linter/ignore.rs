// Copyright 2026 James Casey
// SPDX-License-Identifier: Apache-2.0

//! Inline lint-directive parsing.
//!
//! Two directive shapes are recognised in comments:
//!
//! - `edgelint-ignore-next-line` in a node's **leading** comments (the
//!   comment sits on its own line above the annotated statement), and
//! - `edgelint-ignore` in a node's **trailing** comments (the comment sits
//!   on the same line as the statement).
//!
//! Either form may restrict itself to specific rules with a colon-separated
//! list: `# edgelint-ignore-next-line: type-mismatch, unused-local`.
//! Without a list, every rule on the annotated node is suppressed.
//!
//! Unknown rule names in the list are kept as never-matching entries rather
//! than dropped, so a typo surfaces as an ineffective directive in strict
//! mode instead of silently widening the suppression.

use crate::ast::Meta;
use crate::source_analysis::Span;

use super::Rule;

/// The directive marker for same-line suppression.
const IGNORE: &str = "edgelint-ignore";
/// The directive marker for next-line suppression.
const IGNORE_NEXT_LINE: &str = "edgelint-ignore-next-line";

/// One parsed suppression directive.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Directive {
    /// Rules this directive suppresses; `None` means all rules.
    pub rules: Option<Vec<Rule>>,
    /// Where the directive comment sits.
    pub span: Span,
}

impl Directive {
    /// Returns `true` if this directive suppresses the given rule.
    #[must_use]
    pub fn suppresses(&self, rule: Rule) -> bool {
        match &self.rules {
            None => true,
            Some(rules) => rules.contains(&rule),
        }
    }
}

/// Collects the suppression directives attached to a node.
///
/// Leading comments are searched for the next-line form, trailing comments
/// for the same-line form; a directive in the wrong position is not a
/// directive.
pub(crate) fn directives_in(meta: &Meta) -> Vec<Directive> {
    let mut directives = Vec::new();
    for comment in &meta.leading {
        if let Some(rest) = parse_marker(&comment.text, IGNORE_NEXT_LINE) {
            directives.push(Directive {
                rules: parse_rule_list(rest),
                span: comment.span,
            });
        }
    }
    for comment in &meta.trailing {
        // `edgelint-ignore-next-line` in trailing position must not match
        // the shorter marker's prefix.
        if parse_marker(&comment.text, IGNORE_NEXT_LINE).is_some() {
            continue;
        }
        if let Some(rest) = parse_marker(&comment.text, IGNORE) {
            directives.push(Directive {
                rules: parse_rule_list(rest),
                span: comment.span,
            });
        }
    }
    directives
}

/// Matches a directive marker at the start of a comment, returning the rest
/// of the comment text after the marker.
fn parse_marker<'c>(text: &'c str, marker: &str) -> Option<&'c str> {
    let rest = text.trim_start().strip_prefix(marker)?;
    // The marker must end at a word boundary: end of comment, whitespace,
    // or the rule-list colon.
    match rest.chars().next() {
        None => Some(rest),
        Some(':' | ' ' | '\t') => Some(rest),
        Some(_) => None,
    }
}

/// Parses an optional `: rule, rule` restriction list.
///
/// Returns `None` (suppress everything) when no list is present. Unknown
/// rule names become never-matching placeholders by being skipped while the
/// list itself stays `Some`.
fn parse_rule_list(rest: &str) -> Option<Vec<Rule>> {
    let rest = rest.trim_start();
    let list = rest.strip_prefix(':')?;
    Some(
        list.split(',')
            .map(str::trim)
            .filter(|name| !name.is_empty())
            .filter_map(Rule::from_name)
            .collect(),
    )
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::source_analysis::Comment;

    fn meta_with_leading(text: &str) -> Meta {
        let mut meta = Meta::new(Span::new(20, 40));
        meta.leading.push(Comment::new(text, Span::new(0, 19)));
        meta
    }

    fn meta_with_trailing(text: &str) -> Meta {
        let mut meta = Meta::new(Span::new(0, 19));
        meta.trailing.push(Comment::new(text, Span::new(20, 40)));
        meta
    }

    #[test]
    fn next_line_directive_in_leading_position() {
        let directives = directives_in(&meta_with_leading("edgelint-ignore-next-line"));
        assert_eq!(directives.len(), 1);
        assert!(directives[0].rules.is_none());
        assert!(directives[0].suppresses(Rule::TypeMismatch));
    }

    #[test]
    fn same_line_directive_in_trailing_position() {
        let directives = directives_in(&meta_with_trailing("edgelint-ignore"));
        assert_eq!(directives.len(), 1);
        assert!(directives[0].suppresses(Rule::Undeclared));
    }

    #[test]
    fn directive_in_wrong_position_is_not_a_directive() {
        assert!(directives_in(&meta_with_leading("edgelint-ignore")).is_empty());
        assert!(directives_in(&meta_with_trailing("edgelint-ignore-next-line")).is_empty());
    }

    #[test]
    fn rule_list_restricts_suppression() {
        let directives = directives_in(&meta_with_leading(
            "edgelint-ignore-next-line: type-mismatch, unused-local",
        ));
        assert_eq!(directives.len(), 1);
        let directive = &directives[0];
        assert!(directive.suppresses(Rule::TypeMismatch));
        assert!(directive.suppresses(Rule::UnusedLocal));
        assert!(!directive.suppresses(Rule::Undeclared));
    }

    #[test]
    fn unknown_rule_name_matches_nothing() {
        let directives = directives_in(&meta_with_leading(
            "edgelint-ignore-next-line: no-such-rule",
        ));
        assert_eq!(directives.len(), 1);
        assert!(!directives[0].suppresses(Rule::TypeMismatch));
    }

    #[test]
    fn ordinary_comments_are_not_directives() {
        assert!(directives_in(&meta_with_leading("just a comment")).is_empty());
        assert!(directives_in(&meta_with_leading("edgelint-ignored-maybe")).is_empty());
    }
}
