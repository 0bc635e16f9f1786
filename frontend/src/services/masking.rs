//! Display masking for payee details. Stored values are never altered.

/// Keep the last four digits; other digits become `*`, separators stay.
pub fn mask_account_number(account_number: &str) -> String {
    let digit_count = account_number.chars().filter(char::is_ascii_digit).count();
    let visible_from = digit_count.saturating_sub(4);

    let mut seen = 0;
    account_number
        .chars()
        .map(|c| {
            if c.is_ascii_digit() {
                seen += 1;
                if seen > visible_from {
                    c
                } else {
                    '*'
                }
            } else {
                c
            }
        })
        .collect()
}

/// Keep the first and last character: `김현아` → `김*아`, `이수` → `이*`.
pub fn mask_owner_name(owner_name: &str) -> String {
    let chars: Vec<char> = owner_name.trim().chars().collect();
    match chars.len() {
        0 | 1 => chars.into_iter().collect(),
        2 => format!("{}*", chars[0]),
        n => {
            let middle = "*".repeat(n - 2);
            format!("{}{}{}", chars[0], middle, chars[n - 1])
        }
    }
}
