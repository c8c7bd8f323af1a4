//! Conversions between stored attribute maps and typed records.

pub mod record;
