use safeshare_core::{CellValue, ColumnSelections, PiiCategory, Table};

/// National IDs that pass the checksum.
pub const VALID_NATIONAL_IDS: &[&str] = &["123456782", "000000018", "090909094"];

/// Nine-digit numbers that fail the checksum.
pub const INVALID_NATIONAL_IDS: &[&str] = &["123456789", "000000019"];

/// A small customer file as CSV text, with the typical problems of real
/// exports: quoted commas, empty cells, leading-zero IDs, Hebrew text.
pub const CUSTOMERS_CSV: &str = "\
customer_id,full_name,tz,email,phone,city,balance
1,Dana Levi,123456782,dana@example.com,050-1234567,Tel Aviv,1200.5
2,\"Cohen, Avi\",000000018,avi@example.co.il,0521234567,Haifa,-30.25
3,דנה לוי,090909094,,03-1234567,ירושלים,0.0
4,Dana Levi,123456782,dana@example.com,050-1234567,Tel Aviv,15.75
5,Noa Bar,,noa@example.org,,Eilat,
";

/// The parsed form of [`CUSTOMERS_CSV`].
pub fn customers_table() -> Table {
    safeshare_core::io::parse_csv(CUSTOMERS_CSV.as_bytes())
        .expect("fixture CSV is well-formed")
}

/// Hand selections for [`customers_table`].
pub fn customer_selections() -> ColumnSelections {
    let mut selections = ColumnSelections::new();
    selections.insert("full_name".to_string(), PiiCategory::Name);
    selections.insert("tz".to_string(), PiiCategory::NationalId);
    selections.insert("email".to_string(), PiiCategory::Email);
    selections.insert("phone".to_string(), PiiCategory::Phone);
    selections
}

/// A column of `total` values where the first `matching` are emails.
pub fn mixed_email_column(matching: usize, total: usize) -> Vec<CellValue> {
    (0..total)
        .map(|i| {
            if i < matching {
                CellValue::String(format!("user{}@example.com", i))
            } else {
                CellValue::String(format!("note {}", i))
            }
        })
        .collect()
}

/// Append the check digit to an eight-digit body.
pub fn national_id(body: u32) -> String {
    let digits = format!("{:08}", body % 100_000_000);
    let sum: u32 = digits
        .bytes()
        .enumerate()
        .map(|(i, b)| {
            let product = u32::from(b - b'0') * if i % 2 == 0 { 1 } else { 2 };
            if product > 9 {
                product - 9
            } else {
                product
            }
        })
        .sum();
    format!("{}{}", digits, (10 - sum % 10) % 10)
}

/// A synthetic customer table with `rows` rows and realistic repetition
/// (every value recurs roughly every 50 rows).
pub fn large_customer_table(rows: usize) -> Table {
    let ids: Vec<CellValue> = (0..rows)
        .map(|i| CellValue::String(national_id(10_000_000 + (i % 50) as u32 * 7919)))
        .collect();
    let emails: Vec<CellValue> = (0..rows)
        .map(|i| CellValue::String(format!("customer{}@example.com", i % 50)))
        .collect();
    let phones: Vec<CellValue> = (0..rows)
        .map(|i| CellValue::String(format!("050-{:07}", 1_000_000 + i % 50)))
        .collect();
    let amounts: Vec<CellValue> = (0..rows).map(|i| CellValue::Int(i as i64)).collect();

    Table::from_columns(vec![
        ("tz", ids),
        ("email", emails),
        ("phone", phones),
        ("amount", amounts),
    ])
    .expect("columns have equal length")
}

#[cfg(test)]
mod tests {
    use super::*;
    use safeshare_core::detect::is_valid_national_id;

    #[test]
    fn test_fixture_ids() {
        for id in VALID_NATIONAL_IDS {
            assert!(is_valid_national_id(id), "{} should be valid", id);
        }
        for id in INVALID_NATIONAL_IDS {
            assert!(!is_valid_national_id(id), "{} should be invalid", id);
        }
    }

    #[test]
    fn test_generated_ids_are_valid() {
        assert_eq!(national_id(12_345_678), "123456782");
        for body in [0, 1, 9_090_909, 99_999_999] {
            assert!(is_valid_national_id(&national_id(body)));
        }
    }

    #[test]
    fn test_customers_table_shape() {
        let table = customers_table();
        assert_eq!(table.shape(), (5, 7));
        assert_eq!(table.column("tz").unwrap()[1], CellValue::from("000000018"));
        assert_eq!(table.column("email").unwrap()[2], CellValue::Null);
    }
}
