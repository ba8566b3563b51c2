//! CSV format handling for point commands and balance output
//!
//! This module centralizes all CSV format concerns, providing:
//! - CsvRecord structure for deserialization
//! - Conversion from CSV records to `PointCommand`s
//! - Balance and history output serialization
//!
//! All functions are pure (no I/O) for easy testing.

use crate::types::{
    PointCommand, PointError, PointHistory, Points, TransactionType, UserId, UserPoint,
};
use chrono::SecondsFormat;
use serde::Deserialize;
use std::fmt::Display;
use std::io::Write;

/// CSV record structure for deserialization
///
/// Matches the input CSV format with columns: type, user, amount
#[derive(Debug, Deserialize, Clone, PartialEq)]
pub struct CsvRecord {
    #[serde(rename = "type")]
    pub kind: String,
    pub user: UserId,
    pub amount: Option<String>,
}

/// Convert a CsvRecord to a PointCommand
///
/// Only the shape of the row is checked here. The amount is parsed as a
/// signed integer and passed on as-is; zero, negative and out-of-band amounts
/// are rejected by the point service like any other caller's request.
///
/// # Returns
///
/// * `Ok(PointCommand)` - Successfully converted record
/// * `Err(String)` - Unknown type, missing or non-integer amount
pub fn convert_csv_record(csv_record: CsvRecord) -> Result<PointCommand, String> {
    let kind = match csv_record.kind.to_lowercase().as_str() {
        "charge" => TransactionType::Charge,
        "use" => TransactionType::Use,
        _ => {
            return Err(format!(
                "Invalid command type: '{}' for user {}",
                csv_record.kind, csv_record.user
            ))
        }
    };

    let amount = match csv_record.amount {
        Some(amount_str) if !amount_str.trim().is_empty() => amount_str
            .trim()
            .parse::<Points>()
            .map_err(|_| {
                format!(
                    "Invalid amount '{}' for {} on user {}",
                    amount_str, kind, csv_record.user
                )
            })?,
        _ => {
            return Err(format!(
                "{} command for user {} requires an amount",
                kind, csv_record.user
            ))
        }
    };

    Ok(PointCommand {
        kind,
        user: csv_record.user,
        amount,
    })
}

/// Turn one deserialized row into a command, tagging failures with `line`
///
/// Both readers funnel their rows through here so a malformed row reads the
/// same whichever strategy is replaying.
pub fn command_from_row<E: Display>(
    row: Result<CsvRecord, E>,
    line: u64,
) -> Result<PointCommand, PointError> {
    row.map_err(|e| e.to_string())
        .and_then(convert_csv_record)
        .map_err(|message| PointError::ParseError {
            line: Some(line),
            message,
        })
}

/// Write balances to CSV format
///
/// Writes balances with columns: user, point
/// Balances are sorted by user ID for deterministic output.
///
/// # Returns
///
/// * `Ok(())` if writing succeeded
/// * `Err(String)` if a write error occurred
pub fn write_balances_csv(balances: &[UserPoint], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "point"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = balances.to_vec();
    sorted.sort_by_key(|balance| balance.id);

    for balance in sorted {
        writer
            .write_record(&[balance.id.to_string(), balance.point.to_string()])
            .map_err(|e| format!("Failed to write balance record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

/// Write history records to CSV format
///
/// Writes records with columns: user, id, type, amount, recorded_at
/// Records are sorted by user ID, then by record ID, which is each user's
/// commit order. Timestamps are RFC 3339 in UTC with microseconds.
pub fn write_history_csv(records: &[PointHistory], output: &mut dyn Write) -> Result<(), String> {
    use csv::Writer;

    let mut writer = Writer::from_writer(output);

    writer
        .write_record(["user", "id", "type", "amount", "recorded_at"])
        .map_err(|e| format!("Failed to write CSV header: {}", e))?;

    let mut sorted = records.to_vec();
    sorted.sort_by_key(|record| (record.user_id, record.id));

    for record in sorted {
        writer
            .write_record(&[
                record.user_id.to_string(),
                record.id.to_string(),
                record.kind.to_string(),
                record.amount.to_string(),
                record
                    .recorded_at
                    .to_rfc3339_opts(SecondsFormat::Micros, true),
            ])
            .map_err(|e| format!("Failed to write history record: {}", e))?;
    }

    writer
        .flush()
        .map_err(|e| format!("Failed to flush output: {}", e))?;

    Ok(())
}

#[cfg(test)]
mod tests {
    use super::*;
    use chrono::{TimeZone, Utc};
    use rstest::rstest;

    fn record(kind: &str, amount: Option<&str>) -> CsvRecord {
        CsvRecord {
            kind: kind.to_string(),
            user: 1,
            amount: amount.map(|s| s.to_string()),
        }
    }

    #[rstest]
    #[case("charge", TransactionType::Charge, "5000", 5_000)]
    #[case("use", TransactionType::Use, "1000", 1_000)]
    #[case("CHARGE", TransactionType::Charge, "2000", 2_000)] // case insensitive
    #[case("Use", TransactionType::Use, "  300  ", 300)] // whitespace trimming
    #[case("charge", TransactionType::Charge, "-5", -5)] // validated later by the service
    #[case("charge", TransactionType::Charge, "0", 0)]
    fn test_convert_csv_record_valid(
        #[case] kind: &str,
        #[case] expected_kind: TransactionType,
        #[case] amount: &str,
        #[case] expected_amount: Points,
    ) {
        let command = convert_csv_record(record(kind, Some(amount))).unwrap();

        assert_eq!(command.kind, expected_kind);
        assert_eq!(command.user, 1);
        assert_eq!(command.amount, expected_amount);
    }

    #[rstest]
    #[case::invalid_type("deposit", Some("1000"), "Invalid command type")]
    #[case::missing_amount("charge", None, "requires an amount")]
    #[case::empty_amount("use", Some(""), "requires an amount")]
    #[case::whitespace_amount("use", Some("   "), "requires an amount")]
    #[case::decimal_amount("charge", Some("100.5"), "Invalid amount")]
    #[case::not_a_number("charge", Some("lots"), "Invalid amount")]
    fn test_convert_csv_record_errors(
        #[case] kind: &str,
        #[case] amount: Option<&str>,
        #[case] expected_error: &str,
    ) {
        let result = convert_csv_record(record(kind, amount));

        assert!(result.is_err());
        assert!(result.unwrap_err().contains(expected_error));
    }

    fn balance(id: UserId, point: Points) -> UserPoint {
        UserPoint::new(id, point)
    }

    #[rstest]
    #[case::single(vec![balance(1, 5_000)], "user,point\n1,5000\n")]
    #[case::sorted_by_user(
        vec![balance(3, 0), balance(1, 1_000), balance(2, 2_000)],
        "user,point\n1,1000\n2,2000\n3,0\n"
    )]
    #[case::empty(vec![], "user,point\n")]
    fn test_write_balances_csv(#[case] balances: Vec<UserPoint>, #[case] expected_output: &str) {
        let mut output = Vec::new();

        write_balances_csv(&balances, &mut output).unwrap();

        assert_eq!(String::from_utf8(output).unwrap(), expected_output);
    }

    #[test]
    fn test_write_history_csv_sorts_by_user_then_id() {
        let at = Utc.with_ymd_and_hms(2024, 1, 2, 3, 4, 5).unwrap();
        let history = |id, user_id, kind, amount| PointHistory {
            id,
            user_id,
            kind,
            amount,
            recorded_at: at,
        };
        let records = vec![
            history(3, 2, TransactionType::Charge, 7_000),
            history(4, 1, TransactionType::Use, 1_000),
            history(1, 1, TransactionType::Charge, 5_000),
        ];
        let mut output = Vec::new();

        write_history_csv(&records, &mut output).unwrap();

        assert_eq!(
            String::from_utf8(output).unwrap(),
            "user,id,type,amount,recorded_at\n\
             1,1,charge,5000,2024-01-02T03:04:05.000000Z\n\
             1,4,use,1000,2024-01-02T03:04:05.000000Z\n\
             2,3,charge,7000,2024-01-02T03:04:05.000000Z\n"
        );
    }

    #[rstest]
    #[case::row_error(Err("found record with 2 fields".to_string()), "found record with 2 fields")]
    #[case::conversion_error(Ok(record("refund", Some("1000"))), "Invalid command type")]
    fn test_command_from_row_reports_line(
        #[case] row: Result<CsvRecord, String>,
        #[case] expected_message: &str,
    ) {
        let error = command_from_row(row, 7).unwrap_err();

        match error {
            PointError::ParseError { line, message } => {
                assert_eq!(line, Some(7));
                assert!(message.contains(expected_message));
            }
            other => panic!("unexpected error: {:?}", other),
        }
    }

    #[test]
    fn test_command_from_row_passes_commands_through() {
        let command = command_from_row::<String>(Ok(record("use", Some("2000"))), 2).unwrap();

        assert_eq!(command.kind, TransactionType::Use);
        assert_eq!(command.amount, 2_000);
    }
}
