use chrono::NaiveDate;

#[must_use]
pub fn format_date(value: NaiveDate) -> String {
    value.format("%Y-%m-%d").to_string()
}
