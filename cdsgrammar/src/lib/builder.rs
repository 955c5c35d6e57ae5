use std::{collections::HashMap, error::Error, fmt};

use indexmap::{IndexMap, IndexSet};

use crate::{grammar::CdsGrammar, PIdx, RIdx, Symbol, TIdx};

/// Errors which prevent a grammar from being built at all. Symbol
/// classification clashes are deliberately not in this category: they reject
/// the offending operation but leave the builder usable (see
/// [`GrammarWarning`]).
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GrammarErrorKind {
    NoRules,
    InvalidStartSymbol(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GrammarError {
    pub kind: GrammarErrorKind,
}

impl Error for GrammarError {}

impl fmt::Display for GrammarError {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            GrammarErrorKind::NoRules => write!(f, "Grammar defines no rules"),
            GrammarErrorKind::InvalidStartSymbol(name) => write!(
                f,
                "Start symbol '{}' does not appear as the left-hand side of any rule",
                name
            ),
        }
    }
}

/// A rejected operation noticed while the grammar was being assembled.
#[derive(Debug, PartialEq, Eq, Clone)]
pub enum GrammarWarningKind {
    /// An attempt to declare a terminal which is already a nonterminal.
    InvalidTerminal(String),
    /// An attempt to add a rule whose left-hand side is already a terminal.
    InvalidNonterminal(String),
}

#[derive(Debug, PartialEq, Eq, Clone)]
pub struct GrammarWarning {
    pub kind: GrammarWarningKind,
}

impl fmt::Display for GrammarWarning {
    fn fmt(&self, f: &mut fmt::Formatter) -> fmt::Result {
        match &self.kind {
            GrammarWarningKind::InvalidTerminal(name) => {
                write!(f, "Invalid terminal symbol '{}': already a nonterminal", name)
            }
            GrammarWarningKind::InvalidNonterminal(name) => {
                write!(f, "Invalid nonterminal symbol '{}': already a terminal", name)
            }
        }
    }
}

/// Assembles a [`CdsGrammar`] gradually. Rules keep the order they were first
/// added in, which determines rule numbering and the default start symbol.
/// Right-hand side symbols which never gain a rule of their own are promoted
/// to terminals when [`build`](CdsGrammarBuilder::build) is called.
#[derive(Debug, Default)]
pub struct CdsGrammarBuilder {
    rules: IndexMap<String, Vec<Vec<String>>>,
    terminals: IndexSet<String>,
    start: Option<String>,
    warnings: Vec<GrammarWarning>,
}

impl CdsGrammarBuilder {
    pub fn new() -> Self {
        CdsGrammarBuilder::default()
    }

    /// Add a production for the nonterminal `lhs`. If `lhs` was previously
    /// declared a terminal the operation is rejected and recorded as a
    /// warning.
    pub fn rule(&mut self, lhs: &str, rhs: &[&str]) {
        if self.terminals.contains(lhs) {
            self.warnings.push(GrammarWarning {
                kind: GrammarWarningKind::InvalidNonterminal(lhs.to_string()),
            });
            return;
        }
        self.rules
            .entry(lhs.to_string())
            .or_insert_with(Vec::new)
            .push(rhs.iter().map(|s| s.to_string()).collect());
    }

    /// Declare `name` a terminal. If `name` is already the left-hand side of
    /// a rule the operation is rejected and recorded as a warning. Declaring
    /// the same terminal twice is harmless.
    pub fn terminal(&mut self, name: &str) {
        if self.rules.contains_key(name) {
            self.warnings.push(GrammarWarning {
                kind: GrammarWarningKind::InvalidTerminal(name.to_string()),
            });
            return;
        }
        self.terminals.insert(name.to_string());
    }

    /// Override the start symbol. By default the left-hand side of the first
    /// rule added is the start symbol.
    pub fn start(&mut self, name: &str) {
        self.start = Some(name.to_string());
    }

    /// Finish the grammar. Productions which are structurally identical to an
    /// earlier production of the same rule are collapsed, so that `PIdx`
    /// equality coincides with structural production equality.
    pub fn build(self) -> Result<(CdsGrammar, Vec<GrammarWarning>), GrammarError> {
        let CdsGrammarBuilder {
            rules,
            terminals: mut tokens,
            start,
            warnings,
        } = self;

        let start_name = match start.or_else(|| rules.keys().next().cloned()) {
            Some(n) => n,
            None => {
                return Err(GrammarError {
                    kind: GrammarErrorKind::NoRules,
                })
            }
        };
        let start_rule = match rules.get_index_of(&start_name) {
            Some(i) => RIdx::from(i),
            None => {
                return Err(GrammarError {
                    kind: GrammarErrorKind::InvalidStartSymbol(start_name),
                })
            }
        };

        let rule_names: Vec<String> = rules.keys().cloned().collect();
        let mut rule_map = HashMap::with_capacity(rule_names.len());
        for (i, n) in rule_names.iter().enumerate() {
            rule_map.insert(n.clone(), RIdx::from(i));
        }

        // Promote right-hand side symbols with no rule of their own to
        // terminals, in first-appearance order after the declared terminals.
        for rhss in rules.values() {
            for rhs in rhss {
                for name in rhs {
                    if !rule_map.contains_key(name) {
                        tokens.insert(name.clone());
                    }
                }
            }
        }
        let mut token_map = HashMap::with_capacity(tokens.len());
        for (i, n) in tokens.iter().enumerate() {
            token_map.insert(n.clone(), TIdx::from(i));
        }

        let mut prods: Vec<Vec<Symbol>> = Vec::new();
        let mut prods_rules: Vec<RIdx> = Vec::new();
        let mut rules_prods: Vec<Vec<PIdx>> = vec![Vec::new(); rule_names.len()];
        for (lhs, rhss) in &rules {
            let ridx = rule_map[lhs];
            let mut seen: Vec<&Vec<String>> = Vec::new();
            for rhs in rhss {
                if seen.contains(&rhs) {
                    continue;
                }
                seen.push(rhs);
                let symbols = rhs
                    .iter()
                    .map(|name| match rule_map.get(name) {
                        Some(&r) => Symbol::Rule(r),
                        None => Symbol::Token(token_map[name]),
                    })
                    .collect();
                rules_prods[usize::from(ridx)].push(PIdx::from(prods.len()));
                prods.push(symbols);
                prods_rules.push(ridx);
            }
        }

        Ok((
            CdsGrammar {
                rule_names,
                rule_map,
                token_names: tokens.into_iter().collect(),
                token_map,
                prods,
                rules_prods,
                prods_rules,
                start_rule,
            },
            warnings,
        ))
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use crate::{Symbol, TIdx};

    #[test]
    fn test_classification_clashes_warn_and_reject() {
        let mut b = CdsGrammarBuilder::new();
        b.rule("S", &["a", "S"]);
        b.terminal("S");
        b.terminal("x");
        b.rule("x", &["a"]);
        let (grm, warnings) = b.build().unwrap();
        assert_eq!(
            warnings,
            vec![
                GrammarWarning {
                    kind: GrammarWarningKind::InvalidTerminal("S".to_string())
                },
                GrammarWarning {
                    kind: GrammarWarningKind::InvalidNonterminal("x".to_string())
                },
            ]
        );
        // The rejected operations left no trace: "S" is still a rule, "x" a
        // token.
        assert!(grm.rule_idx("S").is_some());
        assert!(grm.token_idx("S").is_none());
        assert!(grm.rule_idx("x").is_none());
        assert!(grm.token_idx("x").is_some());
    }

    #[test]
    fn test_duplicate_productions_collapse() {
        let mut b = CdsGrammarBuilder::new();
        b.rule("S", &["a"]);
        b.rule("S", &["b"]);
        b.rule("S", &["a"]);
        let (grm, _) = b.build().unwrap();
        assert_eq!(usize::from(grm.prods_len()), 2);
        let pidxs = grm.rule_prods(grm.rule_idx("S").unwrap());
        assert_eq!(pidxs.len(), 2);
        assert_eq!(grm.prod(pidxs[0]), &[Symbol::Token(TIdx(0))]);
        assert_eq!(grm.prod(pidxs[1]), &[Symbol::Token(TIdx(1))]);
    }

    #[test]
    fn test_start_defaults_to_first_rule() {
        let mut b = CdsGrammarBuilder::new();
        b.rule("A", &["B"]);
        b.rule("B", &["b"]);
        let (grm, _) = b.build().unwrap();
        assert_eq!(grm.start_rule_idx(), grm.rule_idx("A").unwrap());

        let mut b = CdsGrammarBuilder::new();
        b.rule("A", &["B"]);
        b.rule("B", &["b"]);
        b.start("B");
        let (grm, _) = b.build().unwrap();
        assert_eq!(grm.start_rule_idx(), grm.rule_idx("B").unwrap());
    }

    #[test]
    fn test_build_errors() {
        assert_eq!(
            CdsGrammarBuilder::new().build().unwrap_err().kind,
            GrammarErrorKind::NoRules
        );

        let mut b = CdsGrammarBuilder::new();
        b.rule("S", &["a"]);
        b.start("T");
        assert_eq!(
            b.build().unwrap_err().kind,
            GrammarErrorKind::InvalidStartSymbol("T".to_string())
        );
    }
}
