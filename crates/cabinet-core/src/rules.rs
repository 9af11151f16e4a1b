use crate::types::LifecycleAction;

/// Package path of the lifecycle rules on the policy server.
pub const POLICY_PACKAGE: &str = "property/lifecycle";

/// The policy rule that must allow `action` before anything else runs.
pub fn rule_for_action(action: LifecycleAction) -> &'static str {
    match action {
        LifecycleAction::Create => "allow_create",
        LifecycleAction::LogicalDelete => "allow_logical_delete",
        LifecycleAction::HardDelete => "allow_hard_delete",
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn one_rule_per_action() {
        let rules: Vec<_> = LifecycleAction::all()
            .iter()
            .map(|a| rule_for_action(*a))
            .collect();
        assert_eq!(
            rules,
            vec!["allow_create", "allow_logical_delete", "allow_hard_delete"]
        );
    }
}
