//! Maps field bags onto the canonical [`LogRecord`] shape.

use super::timestamp::TimestampResolver;
use crate::config::AliasTable;
use crate::models::{FieldBag, FieldValue, LogRecord};

/// Resolves canonical fields through an alias table
#[derive(Debug, Clone)]
pub struct RecordNormalizer {
    aliases: AliasTable,
    resolver: TimestampResolver,
}

impl RecordNormalizer {
    pub fn new(aliases: AliasTable, resolver: TimestampResolver) -> Self {
        RecordNormalizer { aliases, resolver }
    }

    pub fn aliases(&self) -> &AliasTable {
        &self.aliases
    }

    pub fn resolver(&self) -> &TimestampResolver {
        &self.resolver
    }

    /// Build a record from a bag; the first present alias of each field wins
    pub fn normalize(&self, bag: &FieldBag) -> LogRecord {
        let raw_time = first_text(bag, &self.aliases.time);
        let parsed_time = raw_time.as_deref().and_then(|t| self.resolver.resolve(t));

        LogRecord {
            source_ip: first_text(bag, &self.aliases.source_ip),
            dest_ip: first_text(bag, &self.aliases.dest_ip),
            raw_time,
            parsed_time,
            request: first_text(bag, &self.aliases.request),
            status: first_text(bag, &self.aliases.status),
            port: first_value(bag, &self.aliases.port).and_then(coerce_port),
            raw: first_text(bag, &self.aliases.raw).unwrap_or_else(|| bag.to_json_string()),
        }
    }
}

impl Default for RecordNormalizer {
    fn default() -> Self {
        Self::new(AliasTable::default(), TimestampResolver::default())
    }
}

fn first_value<'a>(bag: &'a FieldBag, aliases: &[String]) -> Option<&'a FieldValue> {
    aliases
        .iter()
        .filter_map(|alias| bag.get(alias))
        .find(|value| !value.is_blank())
}

fn first_text(bag: &FieldBag, aliases: &[String]) -> Option<String> {
    first_value(bag, aliases).map(FieldValue::to_text)
}

/// Ports are integers in `0..=65535`; anything else is treated as absent
fn coerce_port(value: &FieldValue) -> Option<u16> {
    let number = match value {
        FieldValue::Number(n) => n.as_f64()?,
        FieldValue::Text(s) => s.trim().parse::<f64>().ok()?,
    };
    if number.fract() == 0.0 && (0.0..=f64::from(u16::MAX)).contains(&number) {
        Some(number as u16)
    } else {
        None
    }
}
