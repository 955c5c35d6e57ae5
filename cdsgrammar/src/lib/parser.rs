//! Parser for the line-oriented grammar format: one production per line,
//! whitespace-separated, the first token being the rule's left-hand side and
//! the remaining tokens (possibly none, denoting an empty production) its
//! right-hand side in order. The first left-hand side encountered becomes the
//! start symbol. A line without any tokens terminates the grammar; anything
//! after it is ignored.

use crate::{builder::CdsGrammarBuilder, CdsGrammar, GrammarError, GrammarWarning};

/// Parse `src` in the line-oriented grammar format into a [`CdsGrammar`].
/// Right-hand side symbols which never appear as a left-hand side are
/// classified as terminals.
pub fn parse_grammar(src: &str) -> Result<(CdsGrammar, Vec<GrammarWarning>), GrammarError> {
    let mut builder = CdsGrammarBuilder::new();
    for line in src.lines() {
        let mut tokens = line.split_whitespace();
        match tokens.next() {
            Some(lhs) => {
                let rhs = tokens.collect::<Vec<_>>();
                builder.rule(lhs, &rhs);
            }
            None => break,
        }
    }
    builder.build()
}

#[cfg(test)]
mod test {
    use super::parse_grammar;
    use crate::GrammarErrorKind;

    #[test]
    fn test_basic_grammar() {
        let (grm, warnings) = parse_grammar(
            "E E plus T
             E T
             T id",
        )
        .unwrap();
        assert!(warnings.is_empty());
        assert_eq!(grm.start_rule_idx(), grm.rule_idx("E").unwrap());
        assert_eq!(usize::from(grm.rules_len()), 2);
        assert_eq!(usize::from(grm.prods_len()), 3);
        assert!(grm.token_idx("plus").is_some());
        assert!(grm.token_idx("id").is_some());
        assert!(grm.token_idx("E").is_none());
    }

    #[test]
    fn test_empty_production() {
        let (grm, _) = parse_grammar("S").unwrap();
        let pidx = grm.rule_prods(grm.start_rule_idx())[0];
        assert!(grm.prod(pidx).is_empty());
        assert_eq!(usize::from(grm.tokens_len()), 0);
    }

    #[test]
    fn test_blank_line_terminates() {
        let (grm, _) = parse_grammar(
            "S a

             T b",
        )
        .unwrap();
        assert!(grm.rule_idx("T").is_none());
        assert!(grm.token_idx("b").is_none());
        assert_eq!(usize::from(grm.rules_len()), 1);
    }

    #[test]
    fn test_empty_source() {
        assert_eq!(
            parse_grammar("").unwrap_err().kind,
            GrammarErrorKind::NoRules
        );
        assert_eq!(
            parse_grammar("\nS a").unwrap_err().kind,
            GrammarErrorKind::NoRules
        );
    }

    #[test]
    fn test_rhs_rule_references_are_not_tokens() {
        // "B" is used before its rule appears; it must still end up a rule.
        let (grm, _) = parse_grammar(
            "A B a
             B b",
        )
        .unwrap();
        assert!(grm.rule_idx("B").is_some());
        assert!(grm.token_idx("B").is_none());
    }
}
