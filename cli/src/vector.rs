//! Parsing of the CVSS v3.1 short-code vector, e.g.
//! `AV:N/AC:L/PR:N/UI:N/S:U/C:H/I:H/A:H`.
//!
//! Vector handling lives here, outside the scoring core. Each component's
//! value is parsed by the core's per-metric `FromStr`, so an out-of-domain
//! value surfaces as the core's [`InvalidMetric`] unmodified.

use std::str::FromStr;
use vulnscore_cvss::cvss3::{BaseMetrics, InvalidMetric};

#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
pub enum Error {
    #[error(transparent)]
    InvalidMetric(#[from] InvalidMetric),
    #[error("malformed vector component: {0:?}")]
    MalformedComponent(String),
    #[error("unknown metric: {0:?}")]
    UnknownMetric(String),
    #[error("duplicate metric: {0}")]
    DuplicateMetric(&'static str),
    #[error("missing metric: {0}")]
    MissingMetric(&'static str),
}

fn set<T>(slot: &mut Option<T>, value: T, key: &'static str) -> Result<(), Error> {
    if slot.replace(value).is_some() {
        Err(Error::DuplicateMetric(key))
    } else {
        Ok(())
    }
}

fn require<T>(slot: Option<T>, key: &'static str) -> Result<T, Error> {
    slot.ok_or(Error::MissingMetric(key))
}

/// Parse a full base metric vector. An optional `CVSS:3.1/` prefix is
/// accepted and ignored; all eight metrics must be present exactly once.
pub fn parse(vector: &str) -> Result<BaseMetrics, Error> {
    let vector = vector.strip_prefix("CVSS:3.1/").unwrap_or(vector);

    let mut av = None;
    let mut ac = None;
    let mut pr = None;
    let mut ui = None;
    let mut s = None;
    let mut c = None;
    let mut i = None;
    let mut a = None;

    for component in vector.split('/') {
        let (key, value) = component
            .split_once(':')
            .ok_or_else(|| Error::MalformedComponent(component.to_string()))?;
        match key {
            "AV" => set(&mut av, FromStr::from_str(value)?, "AV")?,
            "AC" => set(&mut ac, FromStr::from_str(value)?, "AC")?,
            "PR" => set(&mut pr, FromStr::from_str(value)?, "PR")?,
            "UI" => set(&mut ui, FromStr::from_str(value)?, "UI")?,
            "S" => set(&mut s, FromStr::from_str(value)?, "S")?,
            "C" => set(&mut c, FromStr::from_str(value)?, "C")?,
            "I" => set(&mut i, FromStr::from_str(value)?, "I")?,
            "A" => set(&mut a, FromStr::from_str(value)?, "A")?,
            _ => return Err(Error::UnknownMetric(key.to_string())),
        }
    }

    Ok(BaseMetrics {
        av: require(av, "AV")?,
        ac: require(ac, "AC")?,
        pr: require(pr, "PR")?,
        ui: require(ui, "UI")?,
        s: require(s, "S")?,
        c: require(c, "C")?,
        i: require(i, "I")?,
        a: require(a, "A")?,
    })
}
