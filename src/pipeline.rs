//! Chained request validation.
//!
//! Each session method runs its preconditions through a [`Chain`] before any
//! request is built: a failed rule halts the chain, and every subsequent
//! step is inert, so no preparation runs and no network call happens. The
//! rule set is a closed enum; there is no runtime rule dispatch.

/// A precondition evaluated before a request is dispatched.
#[derive(Debug)]
pub(crate) enum Rule<'a> {
    /// The session must be logged in.
    Authorized,
    /// Every named argument must be present (non-empty). Declaration order
    /// is preserved in the failure message.
    Required(Vec<(&'a str, bool)>),
}

/// Result of validating a call: either the chain continues toward dispatch,
/// or it halted on the first failing rule and carries that rule's message.
#[derive(Debug)]
pub(crate) enum Chain {
    Continue,
    Halted(String),
}

impl Chain {
    pub(crate) fn start() -> Self {
        Chain::Continue
    }

    /// Evaluate rules in declaration order; the first failure halts the
    /// chain with its message. A halted chain stays halted.
    pub(crate) fn validate(self, logged_in: bool, rules: &[Rule<'_>]) -> Self {
        if let Chain::Halted(_) = self {
            return self;
        }
        for rule in rules {
            match rule {
                Rule::Authorized => {
                    if !logged_in {
                        return Chain::Halted("Not authorized. Please log in.".to_string());
                    }
                }
                Rule::Required(fields) => {
                    let missing: Vec<&str> = fields
                        .iter()
                        .filter(|(_, present)| !present)
                        .map(|(name, _)| *name)
                        .collect();
                    if !missing.is_empty() {
                        return Chain::Halted(format!(
                            "Missing parameter(s): {}",
                            missing.join(",")
                        ));
                    }
                }
            }
        }
        self
    }

    /// Run a request-preparation step. Skipped entirely once halted.
    pub(crate) fn then(self, f: impl FnOnce()) -> Self {
        if let Chain::Continue = self {
            f();
        }
        self
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_authorized_rule_fails_when_logged_out() {
        let chain = Chain::start().validate(false, &[Rule::Authorized]);
        match chain {
            Chain::Halted(message) => {
                assert_eq!(message, "Not authorized. Please log in.")
            }
            Chain::Continue => panic!("expected halted chain"),
        }
    }

    #[test]
    fn test_authorized_rule_passes_when_logged_in() {
        assert!(matches!(
            Chain::start().validate(true, &[Rule::Authorized]),
            Chain::Continue
        ));
    }

    #[test]
    fn test_required_collects_missing_in_declaration_order() {
        let chain = Chain::start().validate(
            true,
            &[Rule::Required(vec![
                ("name", false),
                ("id", true),
                ("data", false),
            ])],
        );
        match chain {
            Chain::Halted(message) => {
                assert_eq!(message, "Missing parameter(s): name,data")
            }
            Chain::Continue => panic!("expected halted chain"),
        }
    }

    #[test]
    fn test_first_failing_rule_wins() {
        // Authorized is declared first, so its message takes precedence
        // even though required fields are also missing.
        let chain = Chain::start().validate(
            false,
            &[Rule::Authorized, Rule::Required(vec![("name", false)])],
        );
        match chain {
            Chain::Halted(message) => {
                assert_eq!(message, "Not authorized. Please log in.")
            }
            Chain::Continue => panic!("expected halted chain"),
        }
    }

    #[test]
    fn test_then_runs_only_while_continuing() {
        let mut ran = false;
        let chain = Chain::start().then(|| ran = true);
        assert!(ran);
        assert!(matches!(chain, Chain::Continue));

        let mut ran_after_halt = false;
        let chain = Chain::start()
            .validate(false, &[Rule::Authorized])
            .then(|| ran_after_halt = true);
        assert!(!ran_after_halt);
        assert!(matches!(chain, Chain::Halted(_)));
    }

    #[test]
    fn test_halted_chain_ignores_further_validation() {
        let chain = Chain::start()
            .validate(false, &[Rule::Authorized])
            .validate(true, &[Rule::Required(vec![("soql", false)])]);
        match chain {
            Chain::Halted(message) => {
                assert_eq!(message, "Not authorized. Please log in.")
            }
            Chain::Continue => panic!("expected halted chain"),
        }
    }
}
