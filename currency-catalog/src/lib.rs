//! Currency Catalog with Macro-Based Currency Generation
//!
//! This library is the single source of truth for the currencies the
//! commercial exchange service can quote. Currencies are declared once in the
//! `define_currencies!` invocation below; the macro generates the
//! [`CurrencyCode`] enum, its lookups, and the ordered [`CATALOG`].
//!
//! Order is significant: the first entry is the default source currency and
//! the second the default target, and pickers list currencies in this order.
//!
//! # Adding a New Currency
//! Simply add a line to the `define_currencies!` macro invocation:
//! ```ignore
//! define_currencies! {
//!     // ... existing currencies ...
//!     ISK => ("ISK", "Icelandic Krona"),
//! }
//! ```
//!
//! # Example
//! ```
//! use currency_catalog::{catalog, Currency, CurrencyCode};
//!
//! assert_eq!(catalog()[0].code, CurrencyCode::USD);
//!
//! let yen: CurrencyCode = "jpy".parse().unwrap();
//! assert_eq!(yen.currency().display_name(), "JPY (Japanese Yen)");
//! assert_eq!(Currency::lookup("EUR").map(|c| c.name), Some("Euro"));
//! ```

use std::fmt;
use std::hash::{Hash, Hasher};

use serde::Serialize;

// ─────────────────────────────────────────────────────────────────────────────
// Currency Record
// ─────────────────────────────────────────────────────────────────────────────

/// A catalog entry: ISO code plus human-readable name.
///
/// Two currencies are equal when their codes are equal; the name is
/// presentation only.
#[derive(Debug, Clone, Copy, Serialize)]
pub struct Currency {
    pub code: CurrencyCode,
    pub name: &'static str,
}

impl Currency {
    /// Finds a catalog entry by its code, ignoring ASCII case.
    pub fn lookup(code: &str) -> Option<Currency> {
        CATALOG
            .iter()
            .find(|c| c.code.code().eq_ignore_ascii_case(code))
            .copied()
    }

    /// Label used by pickers, e.g. `USD (United States Dollar)`.
    pub fn display_name(&self) -> String {
        format!("{} ({})", self.code, self.name)
    }
}

impl PartialEq for Currency {
    fn eq(&self, other: &Self) -> bool {
        self.code == other.code
    }
}

impl Eq for Currency {}

impl Hash for Currency {
    fn hash<H: Hasher>(&self, state: &mut H) {
        self.code.hash(state);
    }
}

impl fmt::Display for Currency {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.code)
    }
}

impl From<CurrencyCode> for Currency {
    fn from(code: CurrencyCode) -> Self {
        code.currency()
    }
}

/// Returned when a code is not part of the catalog.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("Unknown currency: {0}")]
pub struct UnknownCurrency(pub String);

/// The full ordered catalog.
pub fn catalog() -> &'static [Currency] {
    CATALOG
}

// ─────────────────────────────────────────────────────────────────────────────
// THE MACRO: Defines the CurrencyCode enum, lookups, and the ordered catalog
// ─────────────────────────────────────────────────────────────────────────────

/// Macro to define the catalog with auto-generated codes and lookups.
///
/// # Syntax
/// ```ignore
/// define_currencies! {
///     CurrencyName => ("CODE", "Human readable name"),
/// }
/// ```
#[macro_export]
macro_rules! define_currencies {
    (
        $(
            $name:ident => ($code:literal, $display:literal)
        ),* $(,)?
    ) => {
        // ─────────────────────────────────────────────────────────────────────
        // Generate CurrencyCode enum, in declaration order
        // ─────────────────────────────────────────────────────────────────────
        #[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, serde::Serialize, serde::Deserialize)]
        #[serde(rename_all = "UPPERCASE")]
        pub enum CurrencyCode {
            $($name),*
        }

        impl CurrencyCode {
            pub fn code(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $code),*
                }
            }

            pub fn name(&self) -> &'static str {
                match self {
                    $(CurrencyCode::$name => $display),*
                }
            }

            pub fn currency(&self) -> $crate::Currency {
                $crate::Currency {
                    code: *self,
                    name: self.name(),
                }
            }

            pub fn all() -> &'static [CurrencyCode] {
                &[$(CurrencyCode::$name),*]
            }
        }

        impl std::fmt::Display for CurrencyCode {
            fn fmt(&self, f: &mut std::fmt::Formatter<'_>) -> std::fmt::Result {
                write!(f, "{}", self.code())
            }
        }

        impl std::str::FromStr for CurrencyCode {
            type Err = $crate::UnknownCurrency;
            fn from_str(s: &str) -> Result<Self, Self::Err> {
                match s.trim().to_uppercase().as_str() {
                    $($code => Ok(CurrencyCode::$name),)*
                    _ => Err($crate::UnknownCurrency(s.to_string())),
                }
            }
        }

        // ─────────────────────────────────────────────────────────────────────
        // Generate the ordered catalog
        // ─────────────────────────────────────────────────────────────────────
        pub static CATALOG: &[$crate::Currency] = &[
            $($crate::Currency { code: CurrencyCode::$name, name: $display }),*
        ];
    };
}

// ─────────────────────────────────────────────────────────────────────────────
// CURRENCY DEFINITIONS - Add new currencies here! USD and EUR stay first.
// ─────────────────────────────────────────────────────────────────────────────

define_currencies! {
    USD => ("USD", "United States Dollar"),
    EUR => ("EUR", "Euro"),
    LVL => ("LVL", "Latvian Lats"),
    UAH => ("UAH", "Ukrainian Hryvnia"),
    AED => ("AED", "United Arab Emirates Dirham"),
    ALL => ("ALL", "Albanian Lek"),
    ARS => ("ARS", "Argentine Peso"),
    AUD => ("AUD", "Australian Dollar"),
    AZN => ("AZN", "Azerbaijani Manat"),
    BAM => ("BAM", "Bosnia-Herzegovina Convertible Mark"),
    BGN => ("BGN", "Bulgarian Lev"),
    BRL => ("BRL", "Brazilian Real"),
    BYN => ("BYN", "Belarusian Ruble"),
    CAD => ("CAD", "Canadian Dollar"),
    CHF => ("CHF", "Swiss Franc"),
    CLP => ("CLP", "Chilean Peso"),
    CNY => ("CNY", "Chinese Yuan"),
    COP => ("COP", "Colombian Peso"),
    CVE => ("CVE", "Cape Verdean Escudo"),
    CZK => ("CZK", "Czech Koruna"),
    DKK => ("DKK", "Danish Krone"),
    DZD => ("DZD", "Algerian Dinar"),
    EGP => ("EGP", "Egyptian Pound"),
    GEL => ("GEL", "Georgian Lari"),
    HKD => ("HKD", "Hong Kong Dollar"),
    HUF => ("HUF", "Hungarian Forint"),
    ILS => ("ILS", "Israeli New Shekel"),
    INR => ("INR", "Indian Rupee"),
    IQD => ("IQD", "Iraqi Dinar"),
    JOD => ("JOD", "Jordanian Dinar"),
    JPY => ("JPY", "Japanese Yen"),
    KWD => ("KWD", "Kuwaiti Dinar"),
    KZT => ("KZT", "Kazakhstani Tenge"),
    MAD => ("MAD", "Moroccan Dirham"),
    MDL => ("MDL", "Moldovan Leu"),
    MKD => ("MKD", "Macedonian Denar"),
    MXN => ("MXN", "Mexican Peso"),
    NGN => ("NGN", "Nigerian Naira"),
    NOK => ("NOK", "Norwegian Krone"),
    NZD => ("NZD", "New Zealand Dollar"),
    PHP => ("PHP", "Philippine Peso"),
    PLN => ("PLN", "Polish Złoty"),
    RON => ("RON", "Romanian Leu"),
    RSD => ("RSD", "Serbian Dinar"),
    RUB => ("RUB", "Russian Ruble"),
    SAR => ("SAR", "Saudi Riyal"),
    SEK => ("SEK", "Swedish Krona"),
    SGD => ("SGD", "Singapore Dollar"),
    THB => ("THB", "Thai Baht"),
    TRY => ("TRY", "Turkish Lira"),
    ZAR => ("ZAR", "South African Rand"),
}

// ─────────────────────────────────────────────────────────────────────────────
// Tests
// ─────────────────────────────────────────────────────────────────────────────
