use serde_json::Value;

#[allow(dead_code)]
pub trait CasinoAssertions {
    fn assert_help_contains_commands(&self, help_text: &str);
    fn assert_jsonl_format(&self, content: &str);
    fn assert_required_fields(&self, content: &str, fields: &[&str]);
    fn assert_payout_rules(&self, content: &str);
    fn assert_valid_round_id(&self, round_id: &str);
    fn assert_deterministic_output(&self, _seed: u64, out1: &str, out2: &str);
}

#[derive(Debug, Default, Copy, Clone)]
#[allow(dead_code)]
pub struct DefaultAsserter;

#[allow(dead_code)]
pub(crate) fn commands_list() -> &'static [&'static str] {
    &[
        "play", "sim", "deal", "stats", "verify", "export", "cfg", "doctor", "rng",
    ]
}

impl CasinoAssertions for DefaultAsserter {
    fn assert_help_contains_commands(&self, help_text: &str) {
        for c in commands_list() {
            assert!(
                help_text.contains(c),
                "help should contain command `{}`\n---help---\n{}\n----------",
                c,
                help_text
            );
        }
    }

    fn assert_jsonl_format(&self, content: &str) {
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            serde_json::from_str::<Value>(line)
                .unwrap_or_else(|e| panic!("invalid JSON at line {}: {}\n{}", i + 1, e, line));
        }
    }

    fn assert_required_fields(&self, content: &str, fields: &[&str]) {
        // Check first non-empty line only (schema spot-check)
        let first = content
            .lines()
            .find(|l| !l.trim().is_empty())
            .expect("no lines");
        let v: Value = serde_json::from_str(first).expect("first line must be JSON");
        let obj = v.as_object().expect("record must be object");
        for f in fields {
            assert!(
                obj.contains_key(*f),
                "missing required field `{}` in {}",
                f,
                first
            );
        }
    }

    fn assert_payout_rules(&self, content: &str) {
        for (i, line) in content.lines().enumerate() {
            if line.trim().is_empty() {
                continue;
            }
            let v: Value = serde_json::from_str(line).expect("json");
            let stake = v
                .get("stake")
                .and_then(Value::as_u64)
                .expect("stake must be an integer");
            let payout = v
                .get("payout")
                .and_then(Value::as_u64)
                .expect("payout must be an integer");
            let outcome = v
                .get("outcome")
                .and_then(Value::as_str)
                .expect("outcome must be a string");
            let ok = match outcome {
                "win" => payout > 0,
                "push" => payout == stake,
                "lose" => payout < stake,
                other => panic!("unknown outcome `{}` at line {}", other, i + 1),
            };
            assert!(
                ok,
                "payout rule violated at line {}: outcome={} stake={} payout={}\n{}",
                i + 1,
                outcome,
                stake,
                payout,
                line
            );
        }
    }

    fn assert_valid_round_id(&self, round_id: &str) {
        let plain = !round_id.is_empty() && round_id.chars().all(|c| c.is_ascii_digit());
        let dated = round_id.len() == 15
            && round_id.chars().take(8).all(|c| c.is_ascii_digit())
            && &round_id[8..9] == "-"
            && round_id.chars().skip(9).all(|c| c.is_ascii_digit());
        assert!(
            plain || dated,
            "invalid round id format (expected NNNNNN or YYYYMMDD-NNNNNN): {}",
            round_id
        );
    }

    fn assert_deterministic_output(&self, _seed: u64, out1: &str, out2: &str) {
        assert_eq!(out1, out2, "outputs differ for same seed");
    }
}

#[allow(dead_code)]
pub fn asserter() -> DefaultAsserter {
    DefaultAsserter
}
