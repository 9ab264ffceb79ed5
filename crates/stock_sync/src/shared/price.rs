use super::error::{SyncError, SyncResult};

/// Приводит цену из прайса к целому числу рублей.
///
/// Копейки отбрасываются по первой точке, из оставшегося удаляется все,
/// кроме ASCII-цифр: `"24'570.00 руб."` -> `24570`.
pub fn normalize_price(price_text: &str) -> SyncResult<i64> {
    let integral = price_text.split('.').next().unwrap_or_default();
    let digits: String = integral.chars().filter(|c| c.is_ascii_digit()).collect();

    if digits.is_empty() {
        return Err(SyncError::Format(format!(
            "price {:?} contains no digits",
            price_text
        )));
    }

    digits
        .parse::<i64>()
        .map_err(|e| SyncError::Format(format!("price {:?}: {}", price_text, e)))
}
