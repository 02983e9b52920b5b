use rust_decimal::Decimal;

/// Format a decimal as a BRL amount with thousands separators:
/// R$ 1.234,56
pub fn money(value: Decimal) -> String {
    let negative = value.is_sign_negative();
    let abs = value.abs().round_dp(2);
    let text = abs.to_string();
    let (int_part, dec_part) = match text.split_once('.') {
        Some((i, d)) => (i.to_string(), format!("{d:0<2}")),
        None => (text, "00".to_string()),
    };

    let mut grouped = String::new();
    for (i, c) in int_part.chars().rev().enumerate() {
        if i > 0 && i % 3 == 0 {
            grouped.push('.');
        }
        grouped.push(c);
    }
    let grouped: String = grouped.chars().rev().collect();

    if negative {
        format!("-R$ {grouped},{dec_part}")
    } else {
        format!("R$ {grouped},{dec_part}")
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn dec(s: &str) -> Decimal {
        s.parse().unwrap()
    }

    #[test]
    fn test_money_formatting() {
        assert_eq!(money(dec("1234.56")), "R$ 1.234,56");
        assert_eq!(money(dec("-500")), "-R$ 500,00");
        assert_eq!(money(dec("0")), "R$ 0,00");
        assert_eq!(money(dec("1000000.99")), "R$ 1.000.000,99");
        assert_eq!(money(dec("42.1")), "R$ 42,10");
    }
}
