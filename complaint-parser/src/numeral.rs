//! Numeral tokens in Arabic, Roman and Chinese notation.

/// Parse a numeral token. `None` means the token is not a number at all.
pub fn parse_number_token(token: &str) -> Option<f64> {
    let token = token.trim();
    if token.is_empty() {
        return None;
    }

    parse_decimal(token)
        .or_else(|| parse_roman(token))
        .or_else(|| parse_chinese(token))
        .filter(|value| value.is_finite())
}

fn parse_decimal(token: &str) -> Option<f64> {
    let digits_only = token.chars().all(|ch| ch.is_ascii_digit() || ch == '.');
    let dots = token.matches('.').count();
    if !digits_only || dots > 1 || token.starts_with('.') || token.ends_with('.') {
        return None;
    }
    token.parse::<f64>().ok()
}

fn roman_value(symbol: char) -> Option<f64> {
    let value = match symbol.to_ascii_uppercase() {
        'I' => 1.0,
        'V' => 5.0,
        'X' => 10.0,
        'L' => 50.0,
        'C' => 100.0,
        'D' => 500.0,
        'M' => 1000.0,
        _ => return None,
    };
    Some(value)
}

/// Right-to-left scan; a symbol smaller than the largest seen so far subtracts.
fn parse_roman(token: &str) -> Option<f64> {
    let mut total = 0.0;
    let mut largest = 0.0;
    for symbol in token.chars().rev() {
        let value = roman_value(symbol)?;
        if value < largest {
            total -= value;
        } else {
            total += value;
            largest = value;
        }
    }
    Some(total)
}

fn chinese_digit(ch: char) -> Option<f64> {
    let digit = match ch {
        '零' | '〇' => 0.0,
        '一' => 1.0,
        '二' | '两' => 2.0,
        '三' => 3.0,
        '四' => 4.0,
        '五' => 5.0,
        '六' => 6.0,
        '七' => 7.0,
        '八' => 8.0,
        '九' => 9.0,
        _ => return None,
    };
    Some(digit)
}

fn chinese_multiplier(ch: char) -> Option<f64> {
    match ch {
        '十' => Some(10.0),
        '百' => Some(100.0),
        '千' => Some(1000.0),
        _ => None,
    }
}

fn parse_chinese(token: &str) -> Option<f64> {
    if token == "半" {
        return Some(0.5);
    }

    let mut total = 0.0;
    let mut pending: Option<f64> = None;
    for ch in token.chars() {
        if let Some(digit) = chinese_digit(ch) {
            // Bare digit runs such as 二〇 read positionally.
            pending = Some(pending.map_or(digit, |current| current * 10.0 + digit));
        } else if let Some(multiplier) = chinese_multiplier(ch) {
            // 十五 is fifteen: a multiplier without a digit counts once.
            total += pending.take().unwrap_or(1.0) * multiplier;
        } else {
            return None;
        }
    }
    Some(total + pending.unwrap_or(0.0))
}
