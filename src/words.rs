//! Rupee amounts spelled out with lakh/thousand/hundred grouping.

const ONES: [&str; 20] = [
    "", "one", "two", "three", "four", "five", "six", "seven", "eight", "nine", "ten", "eleven",
    "twelve", "thirteen", "fourteen", "fifteen", "sixteen", "seventeen", "eighteen", "nineteen",
];

const TENS: [&str; 10] = [
    "", "", "twenty", "thirty", "forty", "fifty", "sixty", "seventy", "eighty", "ninety",
];

fn below_hundred(n: u64) -> String {
    if n < 20 {
        ONES[n as usize].to_string()
    } else if n % 10 == 0 {
        TENS[(n / 10) as usize].to_string()
    } else {
        format!("{} {}", TENS[(n / 10) as usize], ONES[(n % 10) as usize])
    }
}

fn below_thousand(n: u64) -> String {
    let hundreds = n / 100;
    let rest = n % 100;
    match (hundreds, rest) {
        (0, r) => below_hundred(r),
        (h, 0) => format!("{} hundred", ONES[h as usize]),
        (h, r) => format!("{} hundred {}", ONES[h as usize], below_hundred(r)),
    }
}

/// Words for a positive integer. Counts above 99 lakh stay in lakhs.
pub fn number_to_words(n: u64) -> String {
    let lakhs = n / 100_000;
    let thousands = (n % 100_000) / 1_000;
    let rest = n % 1_000;

    let mut parts = Vec::new();
    if lakhs > 0 {
        parts.push(format!("{} lakh", number_to_words(lakhs)));
    }
    if thousands > 0 {
        parts.push(format!("{} thousand", below_hundred(thousands)));
    }
    if rest > 0 {
        parts.push(below_thousand(rest));
    }
    parts.join(" ")
}

/// Integer part of `amount` in words; paise are dropped.
pub fn amount_in_words(amount: f64) -> String {
    let whole = amount.abs().trunc() as u64;
    if whole == 0 {
        return "zero".to_string();
    }
    format!("Rupees {} only", number_to_words(whole))
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_zero_is_bare_word() {
        assert_eq!(amount_in_words(0.0), "zero");
        assert_eq!(amount_in_words(0.75), "zero");
    }

    #[test]
    fn test_lakh_grouping() {
        let words = amount_in_words(150000.0);
        assert!(words.contains("one lakh fifty thousand"));
        assert_eq!(words, "Rupees one lakh fifty thousand only");
    }

    #[test]
    fn test_small_numbers() {
        assert_eq!(number_to_words(7), "seven");
        assert_eq!(number_to_words(15), "fifteen");
        assert_eq!(number_to_words(40), "forty");
        assert_eq!(number_to_words(99), "ninety nine");
        assert_eq!(number_to_words(100), "one hundred");
        assert_eq!(number_to_words(305), "three hundred five");
    }

    #[test]
    fn test_mixed_amount_ignores_paise() {
        assert_eq!(
            amount_in_words(1234.56),
            "Rupees one thousand two hundred thirty four only"
        );
    }

    #[test]
    fn test_large_lakh_counts() {
        assert_eq!(
            number_to_words(12_345_678),
            "one hundred twenty three lakh forty five thousand six hundred seventy eight"
        );
        assert_eq!(number_to_words(2_000_001), "twenty lakh one");
    }
}
