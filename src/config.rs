use anyhow::Context;
use time::{format_description::FormatItem, macros::format_description, UtcOffset};

const OFFSET_FORMAT: &[FormatItem<'static>] =
    format_description!("[offset_hour sign:mandatory]:[offset_minute]");

#[derive(Clone, Debug)]
pub struct JwtConfig {
    pub secret: String,
    pub issuer: String,
    pub audience: String,
}

#[derive(Clone, Debug)]
pub struct TrophyConfig {
    /// Offset of the users' local midnight.
    pub utc_offset: UtcOffset,
    /// Targets older than this are reported as expired.
    pub targets_validity_days: i64,
}

impl Default for TrophyConfig {
    fn default() -> Self {
        Self {
            utc_offset: UtcOffset::UTC,
            targets_validity_days: 30,
        }
    }
}

#[derive(Clone, Debug)]
pub struct AppConfig {
    pub database_url: String,
    pub jwt: JwtConfig,
    pub trophies: TrophyConfig,
}

impl AppConfig {
    pub fn from_env() -> anyhow::Result<Self> {
        let database_url = std::env::var("DATABASE_URL").context("DATABASE_URL")?;
        let jwt = JwtConfig {
            secret: std::env::var("JWT_SECRET").context("JWT_SECRET")?,
            issuer: std::env::var("JWT_ISSUER").unwrap_or_else(|_| "mealmind".into()),
            audience: std::env::var("JWT_AUDIENCE").unwrap_or_else(|_| "mealmind-users".into()),
        };
        let defaults = TrophyConfig::default();
        let trophies = TrophyConfig {
            utc_offset: match std::env::var("TROPHY_UTC_OFFSET") {
                Ok(v) => parse_offset(&v)?,
                Err(_) => defaults.utc_offset,
            },
            targets_validity_days: std::env::var("TARGETS_VALIDITY_DAYS")
                .ok()
                .and_then(|v| v.parse::<i64>().ok())
                .unwrap_or(defaults.targets_validity_days),
        };
        Ok(Self {
            database_url,
            jwt,
            trophies,
        })
    }
}

/// Parses `+HH:MM` / `-HH:MM`.
pub fn parse_offset(s: &str) -> anyhow::Result<UtcOffset> {
    UtcOffset::parse(s.trim(), OFFSET_FORMAT)
        .with_context(|| format!("TROPHY_UTC_OFFSET must look like +02:00, got {s:?}"))
}

#[cfg(test)]
mod tests {
    use super::*;
    use time::macros::offset;

    #[test]
    fn parses_signed_offsets() {
        assert_eq!(parse_offset("+02:00").unwrap(), offset!(+02:00));
        assert_eq!(parse_offset("-05:30").unwrap(), offset!(-05:30));
        assert_eq!(parse_offset(" +00:00 ").unwrap(), UtcOffset::UTC);
    }

    #[test]
    fn rejects_malformed_offsets() {
        assert!(parse_offset("02:00").is_err());
        assert!(parse_offset("UTC").is_err());
        assert!(parse_offset("+2").is_err());
    }

    #[test]
    fn trophy_defaults() {
        let d = TrophyConfig::default();
        assert_eq!(d.utc_offset, UtcOffset::UTC);
        assert_eq!(d.targets_validity_days, 30);
    }
}
