use chrono::NaiveDate;
use rstest::rstest;
use vol_forecast::utils::date_parser;

#[rstest]
#[case("2023-01-03")]
#[case("2023-01-03 00:00:00")]
#[case("2023-01-03T00:00:00")]
#[case("2023-01-03 00:00:00+00:00")]
#[case("  2023-01-03 ")]
fn test_parse_date_accepts_timestamps(#[case] input: &str) {
    let parsed = date_parser::parse_date(input).unwrap();
    assert_eq!(parsed, NaiveDate::from_ymd_opt(2023, 1, 3).unwrap());
}

#[rstest]
#[case("")]
#[case("03/01/2023")]
#[case("2023-13-01")]
#[case("yesterday")]
fn test_parse_date_rejects_garbage(#[case] input: &str) {
    assert!(date_parser::parse_date(input).is_err());
}

#[test]
fn test_format_date() {
    let date = NaiveDate::from_ymd_opt(2010, 1, 4).unwrap();
    assert_eq!(date_parser::format_date(date), "2010-01-04");
    assert_eq!(date_parser::parse_date(&date_parser::format_date(date)).unwrap(), date);
}
