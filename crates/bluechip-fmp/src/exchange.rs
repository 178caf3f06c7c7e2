//! Exchange codes to standard UTC offsets.
//!
//! Offsets are the exchanges' standard (winter) time. Daylight saving is not
//! modelled; quarter bucketing only depends on which side of midnight UTC a
//! local date falls, which the standard offset decides.

use chrono::FixedOffset;

const HOUR: i32 = 3600;

/// Standard UTC offset of an FMP exchange short name, `None` if unknown.
#[must_use]
pub fn exchange_offset(exchange: &str) -> Option<FixedOffset> {
    let seconds = match exchange.to_ascii_uppercase().as_str() {
        "NYSE" | "NASDAQ" | "AMEX" | "NYSEARCA" | "BATS" | "CBOE" | "OTC" | "PNK" | "TSX"
        | "TSXV" | "NEO" | "CNQ" => -5 * HOUR,
        "SAO" => -3 * HOUR,
        "LSE" | "ISE" | "LIS" => 0,
        "XETRA" | "FRA" | "GER" | "PAR" | "EURONEXT" | "AMS" | "BRU" | "MIL" | "SIX" | "STO"
        | "CPH" | "OSL" | "MCE" | "VIE" | "WSE" => HOUR,
        "HEL" | "ATH" | "JNB" | "TLV" => 2 * HOUR,
        "NSE" | "BSE" => 5 * HOUR + 30 * 60,
        "HKSE" | "SHH" | "SHZ" | "SES" | "TAI" | "TWO" => 8 * HOUR,
        "JPX" | "TYO" | "KSC" | "KOE" => 9 * HOUR,
        "ASX" => 10 * HOUR,
        "NZE" => 12 * HOUR,
        _ => return None,
    };
    FixedOffset::east_opt(seconds)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn test_known_exchanges() {
        assert_eq!(exchange_offset("NYSE"), FixedOffset::west_opt(5 * HOUR));
        assert_eq!(exchange_offset("nasdaq"), FixedOffset::west_opt(5 * HOUR));
        assert_eq!(exchange_offset("JPX"), FixedOffset::east_opt(9 * HOUR));
        assert_eq!(exchange_offset("NSE"), FixedOffset::east_opt(19_800));
        assert_eq!(exchange_offset("LSE"), FixedOffset::east_opt(0));
    }

    #[test]
    fn test_unknown_exchange() {
        assert!(exchange_offset("MOON").is_none());
        assert!(exchange_offset("").is_none());
    }
}
