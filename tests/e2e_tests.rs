//! End-to-end integration tests
//!
//! These tests validate the complete replay pipeline using predefined CSV
//! fixtures. Each test:
//! 1. Reads input.csv from a fixture directory
//! 2. Applies all commands through the point service
//! 3. Generates output CSV
//! 4. Compares actual output with expected.csv
//!
//! Test fixtures are located in tests/fixtures/ and cover:
//! - Happy path scenarios
//! - Amount band rejections (too small, too large, zero, negative)
//! - The balance ceiling
//! - Insufficient balance
//! - Malformed rows
//!
//! Fixtures with an expected_history.csv are also replayed with the history
//! report, compared on user, type and amount.
//!
//! Each fixture is run twice: once with the sequential strategy and once with
//! the concurrent strategy. Both must agree since a user's commands are always
//! applied in file order.

#[cfg(test)]
mod tests {
    use chrono::DateTime;
    use point_ledger::cli::StrategyType;
    use point_ledger::core::PointPolicy;
    use point_ledger::strategy::{create_strategy, BatchConfig, OutputMode};
    use rstest::rstest;
    use std::collections::{HashMap, HashSet};
    use std::fs;
    use std::io::Write;
    use std::path::Path;
    use tempfile::NamedTempFile;

    /// Run a test fixture by processing input.csv and comparing with expected.csv
    ///
    /// # Panics
    ///
    /// Panics if:
    /// - Input or expected files cannot be read
    /// - Output doesn't match expected
    fn run_test_fixture(fixture_name: &str, strategy_type: StrategyType, config: Option<BatchConfig>) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected.csv", fixture_dir);

        assert!(
            Path::new(&input_path).exists(),
            "Input file not found: {}",
            input_path
        );
        assert!(
            Path::new(&expected_path).exists(),
            "Expected file not found: {}",
            expected_path
        );

        let strategy = create_strategy(
            strategy_type.clone(),
            config,
            PointPolicy::default(),
            OutputMode::Balances,
        );

        let mut temp_output = NamedTempFile::new().expect("Failed to create temp file");

        strategy
            .process(Path::new(&input_path), &mut temp_output)
            .unwrap_or_else(|e| panic!("Failed to process commands: {}", e));

        temp_output.flush().expect("Failed to flush temp file");

        let actual_output = fs::read_to_string(temp_output.path())
            .unwrap_or_else(|e| panic!("Failed to read temp output file: {}", e));

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));

        assert_eq!(
            actual_output, expected_output,
            "\n\nOutput mismatch for fixture: {} (strategy: {:?})\n\nActual output:\n{}\n\nExpected output:\n{}\n",
            fixture_name, strategy_type, actual_output, expected_output
        );
    }

    /// End-to-end test for all fixtures with both strategies
    #[rstest]
    #[case("happy_path")]
    #[case("invalid_amounts")]
    #[case("balance_ceiling")]
    #[case("insufficient_balance")]
    #[case("multiple_users")]
    #[case("malformed_data")]
    #[case("drain_to_zero")]
    fn test_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sequential, StrategyType::Concurrent)] strategy: StrategyType,
    ) {
        run_test_fixture(fixture, strategy, None);
    }

    /// A user's commands split across many tiny batches still replay in order
    #[rstest]
    #[case("balance_ceiling")]
    #[case("multiple_users")]
    #[case("drain_to_zero")]
    fn test_fixtures_with_small_batches(#[case] fixture: &str) {
        run_test_fixture(fixture, StrategyType::Concurrent, Some(BatchConfig::new(2, 4)));
    }

    #[test]
    fn test_missing_input_file_is_an_error() {
        let strategy = create_strategy(
            StrategyType::Concurrent,
            None,
            PointPolicy::default(),
            OutputMode::Balances,
        );
        let mut output = Vec::new();

        let result = strategy.process(Path::new("tests/fixtures/does_not_exist.csv"), &mut output);

        assert!(result.is_err());
        assert!(output.is_empty());
    }

    /// Replay a fixture with the history report and check it against
    /// expected_history.csv
    ///
    /// Record IDs and timestamps depend on commit timing, so rows are compared
    /// on user, type and amount. IDs must still be unique and increase within
    /// each user, and every timestamp must be RFC 3339.
    fn run_history_fixture(fixture_name: &str, strategy_type: StrategyType) {
        let fixture_dir = format!("tests/fixtures/{}", fixture_name);
        let input_path = format!("{}/input.csv", fixture_dir);
        let expected_path = format!("{}/expected_history.csv", fixture_dir);

        let strategy = create_strategy(
            strategy_type.clone(),
            Some(BatchConfig::new(3, 4)),
            PointPolicy::default(),
            OutputMode::History,
        );
        let mut output = Vec::new();
        strategy
            .process(Path::new(&input_path), &mut output)
            .unwrap_or_else(|e| panic!("Failed to process commands: {}", e));
        let output = String::from_utf8(output).expect("History output is not UTF-8");

        let mut lines = output.lines();
        assert_eq!(lines.next(), Some("user,id,type,amount,recorded_at"));

        let mut projected = vec!["user,type,amount".to_string()];
        let mut last_id_per_user: HashMap<String, u64> = HashMap::new();
        let mut seen_ids = HashSet::new();

        for line in lines {
            let fields: Vec<&str> = line.split(',').collect();
            assert_eq!(fields.len(), 5, "unexpected history row: {}", line);

            let id: u64 = fields[1].parse().expect("history id is not a number");
            assert!(seen_ids.insert(id), "duplicate history id {}", id);
            if let Some(previous) = last_id_per_user.insert(fields[0].to_string(), id) {
                assert!(previous < id, "ids out of order in row: {}", line);
            }
            DateTime::parse_from_rfc3339(fields[4])
                .unwrap_or_else(|e| panic!("bad timestamp {}: {}", fields[4], e));

            projected.push(format!("{},{},{}", fields[0], fields[2], fields[3]));
        }

        let expected_output = fs::read_to_string(&expected_path)
            .unwrap_or_else(|e| panic!("Failed to read expected file {}: {}", expected_path, e));
        let expected: Vec<&str> = expected_output.lines().collect();

        assert_eq!(
            projected, expected,
            "\n\nHistory mismatch for fixture: {} (strategy: {:?})\n",
            fixture_name, strategy_type
        );
    }

    #[rstest]
    #[case("happy_path")]
    #[case("insufficient_balance")]
    #[case("multiple_users")]
    #[case("malformed_data")]
    fn test_history_fixtures(
        #[case] fixture: &str,
        #[values(StrategyType::Sequential, StrategyType::Concurrent)] strategy: StrategyType,
    ) {
        run_history_fixture(fixture, strategy);
    }
}
