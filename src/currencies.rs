// Copyright (c) 2025 Spendbook contributors.
// All rights reserved.
//
// This source code is licensed under the license found in the
// LICENSE file in the root directory of this source tree.

use once_cell::sync::Lazy;

/// Display metadata for a supported currency. Changing the active currency
/// only affects the symbol shown and the tag stamped on new expenses; amounts
/// are never converted.
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct Currency {
    pub code: &'static str,
    pub name: &'static str,
    pub symbol: &'static str,
}

pub const DEFAULT_CURRENCY: &str = "INR";

pub static CURRENCIES: Lazy<Vec<Currency>> = Lazy::new(|| {
    vec![
        Currency { code: "INR", name: "Indian Rupee", symbol: "₹" },
        Currency { code: "USD", name: "US Dollar", symbol: "$" },
        Currency { code: "EUR", name: "Euro", symbol: "€" },
        Currency { code: "GBP", name: "British Pound", symbol: "£" },
        Currency { code: "JPY", name: "Japanese Yen", symbol: "¥" },
        Currency { code: "AUD", name: "Australian Dollar", symbol: "A$" },
        Currency { code: "CAD", name: "Canadian Dollar", symbol: "C$" },
        Currency { code: "CHF", name: "Swiss Franc", symbol: "CHF" },
        Currency { code: "CNY", name: "Chinese Yuan", symbol: "¥" },
        Currency { code: "SGD", name: "Singapore Dollar", symbol: "S$" },
    ]
});

pub fn currency_by_code(code: &str) -> Option<&'static Currency> {
    CURRENCIES.iter().find(|c| c.code == code)
}

/// Symbol for a code, defaulting to the rupee sign for unknown codes.
pub fn symbol_for(code: &str) -> &'static str {
    currency_by_code(code).map(|c| c.symbol).unwrap_or("₹")
}
