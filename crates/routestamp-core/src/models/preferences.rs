use serde::{Deserialize, Serialize};

// ─── Currency ──────────────────────────────────────────────

/// Display currency used for trip budgets.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Currency {
    pub code: String,
    pub name: String,
    pub symbol: String,
    /// BCP 47 tag, e.g. `en-GB`.
    pub locale: String,
}

impl Currency {
    fn new(code: &str, name: &str, symbol: &str, locale: &str) -> Self {
        Self {
            code: code.to_string(),
            name: name.to_string(),
            symbol: symbol.to_string(),
            locale: locale.to_string(),
        }
    }

    /// US Dollar.
    pub fn usd() -> Self {
        Self::new("USD", "US Dollar", "$", "en-US")
    }

    /// Look up a catalog entry by ISO 4217 code (case-insensitive).
    pub fn from_code(code: &str) -> Option<Self> {
        catalog()
            .into_iter()
            .find(|c| c.code.eq_ignore_ascii_case(code))
    }

    /// Guess the user's currency from a locale tag such as `en-GB` or `de_DE`.
    ///
    /// The region subtag is matched against the region of each catalog
    /// locale; anything unmatched falls back to USD.
    pub fn detect(locale: &str) -> Self {
        let region = locale
            .split(['-', '_'])
            .nth(1)
            .map(|r| r.split('.').next().unwrap_or(r).to_ascii_uppercase());

        let Some(region) = region else {
            return Self::usd();
        };

        catalog()
            .into_iter()
            .find(|c| {
                c.locale
                    .split('-')
                    .nth(1)
                    .is_some_and(|r| r.eq_ignore_ascii_case(&region))
            })
            .unwrap_or_else(Self::usd)
    }

    /// Plain `{symbol}{amount}` rendering with two decimals.
    pub fn format_amount(&self, amount: f64) -> String {
        format!("{}{:.2}", self.symbol, amount)
    }
}

impl Default for Currency {
    fn default() -> Self {
        Self::usd()
    }
}

/// Built-in currency catalog.
pub fn catalog() -> Vec<Currency> {
    [
        ("USD", "US Dollar", "$", "en-US"),
        ("EUR", "Euro", "€", "de-DE"),
        ("GBP", "British Pound", "£", "en-GB"),
        ("JPY", "Japanese Yen", "¥", "ja-JP"),
        ("CAD", "Canadian Dollar", "C$", "en-CA"),
        ("AUD", "Australian Dollar", "A$", "en-AU"),
        ("CHF", "Swiss Franc", "CHF", "de-CH"),
        ("CNY", "Chinese Yuan", "¥", "zh-CN"),
        ("INR", "Indian Rupee", "₹", "en-IN"),
        ("BRL", "Brazilian Real", "R$", "pt-BR"),
        ("KRW", "South Korean Won", "₩", "ko-KR"),
        ("MXN", "Mexican Peso", "$", "es-MX"),
        ("SGD", "Singapore Dollar", "S$", "en-SG"),
        ("NZD", "New Zealand Dollar", "NZ$", "en-NZ"),
        ("SEK", "Swedish Krona", "kr", "sv-SE"),
        ("NOK", "Norwegian Krone", "kr", "nb-NO"),
        ("DKK", "Danish Krone", "kr", "da-DK"),
        ("PLN", "Polish Złoty", "zł", "pl-PL"),
        ("CZK", "Czech Koruna", "Kč", "cs-CZ"),
        ("TRY", "Turkish Lira", "₺", "tr-TR"),
        ("ZAR", "South African Rand", "R", "en-ZA"),
        ("THB", "Thai Baht", "฿", "th-TH"),
        ("IDR", "Indonesian Rupiah", "Rp", "id-ID"),
        ("PEN", "Peruvian Sol", "S/", "es-PE"),
        ("ARS", "Argentine Peso", "$", "es-AR"),
        ("ILS", "Israeli Shekel", "₪", "he-IL"),
        ("AED", "UAE Dirham", "د.إ", "ar-AE"),
        ("KES", "Kenyan Shilling", "KSh", "en-KE"),
    ]
    .into_iter()
    .map(|(code, name, symbol, locale)| Currency::new(code, name, symbol, locale))
    .collect()
}

// ─── Notifications ─────────────────────────────────────────

/// Notification opt-ins.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "camelCase", default)]
pub struct NotificationPreferences {
    pub travel_reminders: bool,
    pub achievements: bool,
    pub updates: bool,
}

impl Default for NotificationPreferences {
    fn default() -> Self {
        Self {
            travel_reminders: false,
            achievements: true,
            updates: true,
        }
    }
}

impl NotificationPreferences {
    /// Set a flag by its camelCase or snake_case key. Returns `false` for unknown keys.
    pub fn set(&mut self, key: &str, value: bool) -> bool {
        match key {
            "travelReminders" | "travel_reminders" => self.travel_reminders = value,
            "achievements" => self.achievements = value,
            "updates" => self.updates = value,
            _ => return false,
        }
        true
    }
}
