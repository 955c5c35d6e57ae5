use std::collections::HashMap;

use crate::{PIdx, RIdx, SIdx, Symbol, TIdx};

/// Representation of a grammar for descriptor processing. See the
/// [top-level documentation](../index.html) for the guarantees this struct
/// makes about rules, tokens, productions, and symbols.
#[derive(Debug)]
pub struct CdsGrammar {
    /// A mapping from `RIdx` -> `String`.
    pub(crate) rule_names: Vec<String>,
    pub(crate) rule_map: HashMap<String, RIdx>,
    /// A mapping from `TIdx` -> `String`.
    pub(crate) token_names: Vec<String>,
    pub(crate) token_map: HashMap<String, TIdx>,
    /// A list of all productions.
    pub(crate) prods: Vec<Vec<Symbol>>,
    /// A mapping from rules to their productions. The order of rules is
    /// identical to that of `rule_names` and every rule has at least 1
    /// production.
    pub(crate) rules_prods: Vec<Vec<PIdx>>,
    /// A mapping from productions to their corresponding rule indices.
    pub(crate) prods_rules: Vec<RIdx>,
    pub(crate) start_rule: RIdx,
}

impl CdsGrammar {
    /// How many rules does this grammar have?
    pub fn rules_len(&self) -> RIdx {
        RIdx::from(self.rule_names.len())
    }

    /// How many tokens does this grammar have?
    pub fn tokens_len(&self) -> TIdx {
        TIdx::from(self.token_names.len())
    }

    /// How many productions does this grammar have?
    pub fn prods_len(&self) -> PIdx {
        PIdx::from(self.prods.len())
    }

    /// What is the index of the start rule?
    pub fn start_rule_idx(&self) -> RIdx {
        self.start_rule
    }

    /// Return the index of the rule named `n` or `None` if it doesn't exist.
    pub fn rule_idx(&self, n: &str) -> Option<RIdx> {
        self.rule_map.get(n).copied()
    }

    /// Return the index of the token named `n` or `None` if it doesn't exist.
    pub fn token_idx(&self, n: &str) -> Option<TIdx> {
        self.token_map.get(n).copied()
    }

    /// Return the name of rule `ridx`.
    ///
    /// # Panics
    ///
    /// If `ridx` doesn't exist.
    pub fn rule_name(&self, ridx: RIdx) -> &str {
        &self.rule_names[usize::from(ridx)]
    }

    /// Return the name of token `tidx`.
    ///
    /// # Panics
    ///
    /// If `tidx` doesn't exist.
    pub fn token_name(&self, tidx: TIdx) -> &str {
        &self.token_names[usize::from(tidx)]
    }

    /// Return the productions for rule `ridx`. Guaranteed to be non-empty.
    pub fn rule_prods(&self, ridx: RIdx) -> &[PIdx] {
        &self.rules_prods[usize::from(ridx)]
    }

    /// Return the symbols of production `pidx`.
    pub fn prod(&self, pidx: PIdx) -> &[Symbol] {
        &self.prods[usize::from(pidx)]
    }

    /// Return the rule production `pidx` belongs to.
    pub fn prod_rule(&self, pidx: PIdx) -> RIdx {
        self.prods_rules[usize::from(pidx)]
    }

    /// Return the name of symbol `sym`.
    pub fn symbol_name(&self, sym: Symbol) -> &str {
        match sym {
            Symbol::Rule(ridx) => self.rule_name(ridx),
            Symbol::Token(tidx) => self.token_name(tidx),
        }
    }

    /// Return a pretty-printed version of production `pidx`, with a `·`
    /// marking position `dot` if one is given. An empty production with no
    /// dot prints as `ϵ`.
    pub fn pp_prod(&self, pidx: PIdx, dot: Option<SIdx>) -> String {
        let symbols = self.prod(pidx);
        let mut s = format!("{} ::=", self.rule_name(self.prod_rule(pidx)));
        if symbols.is_empty() && dot.is_none() {
            s.push_str(" ϵ");
            return s;
        }
        for i in 0..=symbols.len() {
            if dot == Some(SIdx::from(i)) {
                s.push_str(" ·");
            }
            if i < symbols.len() {
                s.push(' ');
                s.push_str(self.symbol_name(symbols[i]));
            }
        }
        s
    }
}

#[cfg(test)]
mod test {
    use crate::{parse_grammar, SIdx, Symbol};

    #[test]
    fn test_queries() {
        let (grm, _) = parse_grammar(
            "S A b
             A a",
        )
        .unwrap();
        assert_eq!(usize::from(grm.rules_len()), 2);
        assert_eq!(usize::from(grm.tokens_len()), 2);
        assert_eq!(usize::from(grm.prods_len()), 2);
        assert_eq!(grm.start_rule_idx(), grm.rule_idx("S").unwrap());
        assert_eq!(grm.rule_name(grm.rule_idx("A").unwrap()), "A");
        assert_eq!(grm.token_name(grm.token_idx("b").unwrap()), "b");

        let s_prods = grm.rule_prods(grm.rule_idx("S").unwrap());
        assert_eq!(s_prods.len(), 1);
        assert_eq!(
            grm.prod(s_prods[0]),
            &[
                Symbol::Rule(grm.rule_idx("A").unwrap()),
                Symbol::Token(grm.token_idx("b").unwrap())
            ]
        );
        assert_eq!(grm.prod_rule(s_prods[0]), grm.rule_idx("S").unwrap());
    }

    #[test]
    fn test_pp_prod() {
        let (grm, _) = parse_grammar(
            "S A b
             A a
             E",
        )
        .unwrap();
        let s_pidx = grm.rule_prods(grm.rule_idx("S").unwrap())[0];
        assert_eq!(grm.pp_prod(s_pidx, None), "S ::= A b");
        assert_eq!(grm.pp_prod(s_pidx, Some(SIdx(1))), "S ::= A · b");
        assert_eq!(grm.pp_prod(s_pidx, Some(SIdx(2))), "S ::= A b ·");
        let e_pidx = grm.rule_prods(grm.rule_idx("E").unwrap())[0];
        assert_eq!(grm.pp_prod(e_pidx, None), "E ::= ϵ");
        assert_eq!(grm.pp_prod(e_pidx, Some(SIdx(0))), "E ::= ·");
    }
}
