use crate::domain::model::{RuleRecord, RuleSpec};

/// Multiset equivalence between the desired rules and the remote rules,
/// under per-rule field masking.
///
/// Each desired rule must match exactly one remaining remote rule, compared
/// after masking the remote entry by the desired rule's own target kind.
/// Matched entries are removed from the pool by position, so duplicate
/// desired rules each consume a distinct remote occurrence. First match
/// wins; there is no best-match search. The sets are equivalent only if
/// every desired rule found a partner and the pool ended up empty.
pub fn rules_equivalent(desired: &[RuleSpec], remote: &[RuleRecord]) -> bool {
    let mut pool: Vec<RuleRecord> = remote.to_vec();

    for spec in desired {
        let want = spec.record();
        let matched = pool
            .iter()
            .position(|candidate| candidate.masked_for(&spec.target) == want);
        match matched {
            Some(index) => {
                pool.remove(index);
            }
            None => return false,
        }
    }

    pool.is_empty()
}

/// Descriptions count as equivalent when they are literally equal or when
/// both are non-empty. Two different non-empty descriptions therefore never
/// trigger an update; only an empty/non-empty transition does.
pub fn descriptions_equivalent(a: &str, b: &str) -> bool {
    if a == b {
        return true;
    }

    !a.is_empty() && !b.is_empty()
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::domain::model::{Direction, Ethertype, RuleTarget};

    fn cidr_rule(from_port: i32, to_port: i32, protocol: &str, cidr: &str) -> RuleSpec {
        RuleSpec {
            from_port,
            to_port,
            protocol: protocol.to_string(),
            direction: Direction::Ingress,
            target: RuleTarget::Cidr {
                cidr: cidr.to_string(),
                ethertype: Ethertype::IPv4,
            },
        }
    }

    fn remote_group_rule(from_port: i32, to_port: i32, protocol: &str, url: &str) -> RuleSpec {
        RuleSpec {
            from_port,
            to_port,
            protocol: protocol.to_string(),
            direction: Direction::Ingress,
            target: RuleTarget::RemoteGroup {
                url: url.to_string(),
            },
        }
    }

    #[test]
    fn test_identical_rule_sets_are_equivalent() {
        let desired = vec![
            cidr_rule(80, 80, "tcp", "0.0.0.0/0"),
            cidr_rule(443, 443, "tcp", "0.0.0.0/0"),
        ];
        let remote: Vec<RuleRecord> = desired.iter().map(|r| r.record()).collect();

        assert!(rules_equivalent(&desired, &remote));
    }

    #[test]
    fn test_empty_sets_are_equivalent() {
        assert!(rules_equivalent(&[], &[]));
    }

    #[test]
    fn test_missing_remote_rule_is_not_equivalent() {
        let desired = vec![cidr_rule(80, 80, "tcp", "0.0.0.0/0")];

        assert!(!rules_equivalent(&desired, &[]));
    }

    #[test]
    fn test_extra_remote_rule_is_not_equivalent() {
        let remote = vec![cidr_rule(80, 80, "tcp", "0.0.0.0/0").record()];

        assert!(!rules_equivalent(&[], &remote));
    }

    #[test]
    fn test_duplicate_desired_rules_consume_distinct_remote_rules() {
        let rule = cidr_rule(22, 22, "tcp", "10.0.0.0/24");
        let desired = vec![rule.clone(), rule.clone()];

        // One remote occurrence cannot satisfy two desired duplicates.
        assert!(!rules_equivalent(&desired, &[rule.record()]));

        // Two remote occurrences can.
        assert!(rules_equivalent(&desired, &[rule.record(), rule.record()]));
    }

    #[test]
    fn test_remote_group_target_ignores_cidr_and_ethertype() {
        let desired = vec![remote_group_rule(
            80,
            80,
            "tcp",
            "https://api.example.com/openstack-security-groups/web/",
        )];

        let mut remote = desired[0].record();
        // The remote side reports stray cidr/ethertype values for the rule;
        // they must not cause a mismatch.
        remote.cidr = Some("0.0.0.0/0".to_string());
        remote.ethertype = Some("IPv4".to_string());

        assert!(rules_equivalent(&desired, &[remote]));
    }

    #[test]
    fn test_cidr_target_ignores_remote_group() {
        let desired = vec![cidr_rule(80, 80, "tcp", "0.0.0.0/0")];

        let mut remote = desired[0].record();
        remote.remote_group = Some("https://api.example.com/groups/other/".to_string());

        assert!(rules_equivalent(&desired, &[remote]));
    }

    #[test]
    fn test_port_difference_is_a_mismatch() {
        let desired = vec![cidr_rule(80, 80, "tcp", "0.0.0.0/0")];
        let remote = vec![cidr_rule(80, 8080, "tcp", "0.0.0.0/0").record()];

        assert!(!rules_equivalent(&desired, &remote));
    }

    #[test]
    fn test_direction_difference_is_a_mismatch() {
        let desired = vec![cidr_rule(80, 80, "tcp", "0.0.0.0/0")];
        let mut remote = desired[0].record();
        remote.direction = Some("egress".to_string());

        assert!(!rules_equivalent(&desired, &[remote]));
    }

    #[test]
    fn test_descriptions_equal_strings() {
        assert!(descriptions_equivalent("web group", "web group"));
        assert!(descriptions_equivalent("", ""));
    }

    #[test]
    fn test_descriptions_both_non_empty_count_as_equivalent() {
        // Documented quirk: prose edits do not count as drift.
        assert!(descriptions_equivalent("old text", "new text"));
    }

    #[test]
    fn test_descriptions_empty_vs_non_empty_differ() {
        assert!(!descriptions_equivalent("", "new text"));
        assert!(!descriptions_equivalent("old text", ""));
    }
}
