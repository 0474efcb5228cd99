//! CVSS v3.1 base metrics and base score computation.
//!
//! The entry point is [`BaseMetrics`]: construct one value per evaluation and
//! call [`BaseMetrics::score`]. The computation is pure; no state is kept
//! between calls.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;
use strum::VariantArray;
use utoipa::ToSchema;

pub mod score;
pub mod severity;

pub use score::Score;
pub use severity::Severity;

/// A metric value outside its category's fixed domain.
///
/// This is the only failure mode of the engine. It surfaces at the parsing
/// boundary: a constructed metric enum can never hold an out-of-domain value,
/// so the formula itself is infallible.
#[derive(Debug, Clone, PartialEq, Eq, thiserror::Error)]
#[error("invalid {category} metric value: {value}")]
pub struct InvalidMetric {
    pub category: &'static str,
    pub value: String,
}

impl InvalidMetric {
    fn new(category: &'static str, value: &str) -> Self {
        Self {
            category,
            value: value.to_string(),
        }
    }
}

/// Attack Vector (AV): the context by which exploitation is possible.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum AttackVector {
    Network,
    Adjacent,
    Local,
    Physical,
}

impl AttackVector {
    pub fn weight(self) -> f64 {
        match self {
            Self::Network => 0.85,
            Self::Adjacent => 0.62,
            Self::Local => 0.55,
            Self::Physical => 0.20,
        }
    }
}

impl fmt::Display for AttackVector {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Network => "N",
            Self::Adjacent => "A",
            Self::Local => "L",
            Self::Physical => "P",
        })
    }
}

impl FromStr for AttackVector {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::Network),
            "A" => Ok(Self::Adjacent),
            "L" => Ok(Self::Local),
            "P" => Ok(Self::Physical),
            _ => Err(InvalidMetric::new("AV", s)),
        }
    }
}

/// Attack Complexity (AC): conditions beyond the attacker's control that must
/// exist for exploitation.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum AttackComplexity {
    Low,
    High,
}

impl AttackComplexity {
    pub fn weight(self) -> f64 {
        match self {
            Self::Low => 0.77,
            Self::High => 0.44,
        }
    }
}

impl fmt::Display for AttackComplexity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Low => "L",
            Self::High => "H",
        })
    }
}

impl FromStr for AttackComplexity {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "L" => Ok(Self::Low),
            "H" => Ok(Self::High),
            _ => Err(InvalidMetric::new("AC", s)),
        }
    }
}

/// Privileges Required (PR): the level of privileges an attacker must possess
/// before exploitation.
///
/// Its weight depends on [`Scope`]: Low and High weigh more when the scope is
/// changed, None is unaffected.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum PrivilegesRequired {
    None,
    Low,
    High,
}

impl PrivilegesRequired {
    pub fn weight(self, scope: Scope) -> f64 {
        match (self, scope) {
            (Self::None, _) => 0.85,
            (Self::Low, Scope::Unchanged) => 0.62,
            (Self::Low, Scope::Changed) => 0.68,
            (Self::High, Scope::Unchanged) => 0.27,
            (Self::High, Scope::Changed) => 0.50,
        }
    }
}

impl fmt::Display for PrivilegesRequired {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "N",
            Self::Low => "L",
            Self::High => "H",
        })
    }
}

impl FromStr for PrivilegesRequired {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::None),
            "L" => Ok(Self::Low),
            "H" => Ok(Self::High),
            _ => Err(InvalidMetric::new("PR", s)),
        }
    }
}

/// User Interaction (UI): whether a user other than the attacker must
/// participate in the exploitation.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum UserInteraction {
    None,
    Required,
}

impl UserInteraction {
    pub fn weight(self) -> f64 {
        match self {
            Self::None => 0.85,
            Self::Required => 0.62,
        }
    }
}

impl fmt::Display for UserInteraction {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "N",
            Self::Required => "R",
        })
    }
}

impl FromStr for UserInteraction {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::None),
            "R" => Ok(Self::Required),
            _ => Err(InvalidMetric::new("UI", s)),
        }
    }
}

/// Scope (S): whether the impact is confined to the vulnerable component
/// (unchanged) or reaches beyond it (changed).
///
/// Scope selects the impact formula branch and the [`PrivilegesRequired`]
/// weight table.
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum Scope {
    Unchanged,
    Changed,
}

impl fmt::Display for Scope {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::Unchanged => "U",
            Self::Changed => "C",
        })
    }
}

impl FromStr for Scope {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "U" => Ok(Self::Unchanged),
            "C" => Ok(Self::Changed),
            _ => Err(InvalidMetric::new("S", s)),
        }
    }
}

/// Confidentiality impact (C).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum Confidentiality {
    None,
    Low,
    High,
}

impl Confidentiality {
    pub fn weight(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.22,
            Self::High => 0.56,
        }
    }
}

impl fmt::Display for Confidentiality {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "N",
            Self::Low => "L",
            Self::High => "H",
        })
    }
}

impl FromStr for Confidentiality {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::None),
            "L" => Ok(Self::Low),
            "H" => Ok(Self::High),
            _ => Err(InvalidMetric::new("C", s)),
        }
    }
}

/// Integrity impact (I).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum Integrity {
    None,
    Low,
    High,
}

impl Integrity {
    pub fn weight(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.22,
            Self::High => 0.56,
        }
    }
}

impl fmt::Display for Integrity {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "N",
            Self::Low => "L",
            Self::High => "H",
        })
    }
}

impl FromStr for Integrity {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::None),
            "L" => Ok(Self::Low),
            "H" => Ok(Self::High),
            _ => Err(InvalidMetric::new("I", s)),
        }
    }
}

/// Availability impact (A).
#[derive(
    Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema, VariantArray,
)]
#[serde(rename_all = "lowercase")]
pub enum Availability {
    None,
    Low,
    High,
}

impl Availability {
    pub fn weight(self) -> f64 {
        match self {
            Self::None => 0.0,
            Self::Low => 0.22,
            Self::High => 0.56,
        }
    }
}

impl fmt::Display for Availability {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(match self {
            Self::None => "N",
            Self::Low => "L",
            Self::High => "H",
        })
    }
}

impl FromStr for Availability {
    type Err = InvalidMetric;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        match s {
            "N" => Ok(Self::None),
            "L" => Ok(Self::Low),
            "H" => Ok(Self::High),
            _ => Err(InvalidMetric::new("A", s)),
        }
    }
}

/// The eight CVSS v3.1 base metrics of a vulnerability.
///
/// Always complete and in-domain by construction: there is no partial or
/// default-filled variant of this type. Construct a fresh value for every
/// evaluation.
#[derive(Debug, Copy, Clone, PartialEq, Eq, Hash, Serialize, Deserialize, ToSchema)]
pub struct BaseMetrics {
    pub av: AttackVector,
    pub ac: AttackComplexity,
    pub pr: PrivilegesRequired,
    pub ui: UserInteraction,
    pub s: Scope,
    pub c: Confidentiality,
    pub i: Integrity,
    pub a: Availability,
}

impl BaseMetrics {
    /// Compute the base score.
    ///
    /// Impact and exploitability sub-scores are combined per the v3.1
    /// specification, clamped at 10, and rounded up to one decimal place.
    /// A changed scope switches both the impact formula and the
    /// privileges-required weight table, and scales the combined score
    /// by 1.08.
    pub fn score(&self) -> Score {
        let isc_base =
            1.0 - (1.0 - self.c.weight()) * (1.0 - self.i.weight()) * (1.0 - self.a.weight());

        let impact = match self.s {
            Scope::Unchanged => 6.42 * isc_base,
            Scope::Changed => 7.52 * (isc_base - 0.029) - 3.25 * (isc_base - 0.02).powi(15),
        };

        let exploitability =
            8.22 * self.av.weight() * self.ac.weight() * self.pr.weight(self.s) * self.ui.weight();

        let raw = if impact <= 0.0 {
            0.0
        } else {
            match self.s {
                Scope::Unchanged => f64::min(impact + exploitability, 10.0),
                Scope::Changed => f64::min(1.08 * (impact + exploitability), 10.0),
            }
        };

        Score::roundup(raw)
    }
}

#[cfg(test)]
mod test {
    use super::*;
    use rstest::rstest;
    use strum::VariantArray;

    fn metrics(
        av: &str,
        ac: &str,
        pr: &str,
        ui: &str,
        s: &str,
        c: &str,
        i: &str,
        a: &str,
    ) -> BaseMetrics {
        BaseMetrics {
            av: av.parse().unwrap(),
            ac: ac.parse().unwrap(),
            pr: pr.parse().unwrap(),
            ui: ui.parse().unwrap(),
            s: s.parse().unwrap(),
            c: c.parse().unwrap(),
            i: i.parse().unwrap(),
            a: a.parse().unwrap(),
        }
    }

    fn all_metrics() -> Vec<BaseMetrics> {
        let mut out = Vec::new();
        for &av in AttackVector::VARIANTS {
            for &ac in AttackComplexity::VARIANTS {
                for &pr in PrivilegesRequired::VARIANTS {
                    for &ui in UserInteraction::VARIANTS {
                        for &s in Scope::VARIANTS {
                            for &c in Confidentiality::VARIANTS {
                                for &i in Integrity::VARIANTS {
                                    for &a in Availability::VARIANTS {
                                        out.push(BaseMetrics {
                                            av,
                                            ac,
                                            pr,
                                            ui,
                                            s,
                                            c,
                                            i,
                                            a,
                                        });
                                    }
                                }
                            }
                        }
                    }
                }
            }
        }
        out
    }

    /// All metric sets one severity step above `m` on a single axis.
    fn more_severe(m: &BaseMetrics) -> Vec<BaseMetrics> {
        let mut out = Vec::new();

        let av = match m.av {
            AttackVector::Physical => Some(AttackVector::Local),
            AttackVector::Local => Some(AttackVector::Adjacent),
            AttackVector::Adjacent => Some(AttackVector::Network),
            AttackVector::Network => None,
        };
        if let Some(av) = av {
            out.push(BaseMetrics { av, ..*m });
        }

        if m.ac == AttackComplexity::High {
            out.push(BaseMetrics {
                ac: AttackComplexity::Low,
                ..*m
            });
        }

        let pr = match m.pr {
            PrivilegesRequired::High => Some(PrivilegesRequired::Low),
            PrivilegesRequired::Low => Some(PrivilegesRequired::None),
            PrivilegesRequired::None => None,
        };
        if let Some(pr) = pr {
            out.push(BaseMetrics { pr, ..*m });
        }

        if m.ui == UserInteraction::Required {
            out.push(BaseMetrics {
                ui: UserInteraction::None,
                ..*m
            });
        }

        if m.s == Scope::Unchanged {
            out.push(BaseMetrics {
                s: Scope::Changed,
                ..*m
            });
        }

        let c = match m.c {
            Confidentiality::None => Some(Confidentiality::Low),
            Confidentiality::Low => Some(Confidentiality::High),
            Confidentiality::High => None,
        };
        if let Some(c) = c {
            out.push(BaseMetrics { c, ..*m });
        }

        let i = match m.i {
            Integrity::None => Some(Integrity::Low),
            Integrity::Low => Some(Integrity::High),
            Integrity::High => None,
        };
        if let Some(i) = i {
            out.push(BaseMetrics { i, ..*m });
        }

        let a = match m.a {
            Availability::None => Some(Availability::Low),
            Availability::Low => Some(Availability::High),
            Availability::High => None,
        };
        if let Some(a) = a {
            out.push(BaseMetrics { a, ..*m });
        }

        out
    }

    /// Official v3.1 vectors with known scores.
    #[rstest]
    #[case(metrics("N", "L", "N", "N", "U", "H", "H", "H"), 9.8, Severity::Critical)]
    #[case(metrics("N", "L", "N", "N", "U", "N", "N", "N"), 0.0, Severity::None)]
    #[case(metrics("L", "H", "H", "R", "U", "L", "L", "N"), 2.9, Severity::Low)]
    #[case(metrics("N", "L", "L", "N", "C", "H", "H", "H"), 9.9, Severity::Critical)]
    fn known_vectors(#[case] m: BaseMetrics, #[case] score: f64, #[case] severity: Severity) {
        let result = m.score();
        assert_eq!(result.value(), score);
        assert_eq!(result.severity(), severity);
    }

    /// No impact means a zero score, regardless of exploitability.
    #[test]
    fn zero_impact_short_circuits() {
        for &s in Scope::VARIANTS {
            let m = BaseMetrics {
                s,
                ..metrics("N", "L", "N", "N", "U", "N", "N", "N")
            };
            assert_eq!(m.score().value(), 0.0);
        }
    }

    #[test_log::test]
    fn bounds_over_full_domain() {
        for m in all_metrics() {
            let score = m.score().value();
            assert!(
                (0.0..=10.0).contains(&score),
                "{m:?} scored out of range: {score}"
            );
        }
    }

    #[test]
    fn deterministic() {
        for m in all_metrics() {
            assert_eq!(m.score(), m.score());
        }
    }

    /// Raising the severity of any single metric never lowers the score.
    #[test]
    fn monotone_per_axis() {
        for m in all_metrics() {
            let base = m.score().value();
            for worse in more_severe(&m) {
                let bumped = worse.score().value();
                assert!(
                    bumped >= base,
                    "score dropped from {base} to {bumped}: {m:?} -> {worse:?}"
                );
            }
        }
    }

    /// The privileges-required weight table switches with scope.
    #[rstest]
    #[case(PrivilegesRequired::None, 0.85, 0.85)]
    #[case(PrivilegesRequired::Low, 0.62, 0.68)]
    #[case(PrivilegesRequired::High, 0.27, 0.50)]
    fn pr_weight_is_scope_dependent(
        #[case] pr: PrivilegesRequired,
        #[case] unchanged: f64,
        #[case] changed: f64,
    ) {
        assert_eq!(pr.weight(Scope::Unchanged), unchanged);
        assert_eq!(pr.weight(Scope::Changed), changed);
    }

    /// An out-of-domain code fails instead of defaulting.
    #[rstest]
    #[case("AV", "X".parse::<AttackVector>().unwrap_err())]
    #[case("AC", "N".parse::<AttackComplexity>().unwrap_err())]
    #[case("PR", "R".parse::<PrivilegesRequired>().unwrap_err())]
    #[case("UI", "L".parse::<UserInteraction>().unwrap_err())]
    #[case("S", "N".parse::<Scope>().unwrap_err())]
    #[case("C", "X".parse::<Confidentiality>().unwrap_err())]
    #[case("I", "".parse::<Integrity>().unwrap_err())]
    #[case("A", "h".parse::<Availability>().unwrap_err())]
    fn invalid_codes_are_rejected(#[case] category: &str, #[case] err: InvalidMetric) {
        assert_eq!(err.category, category);
    }

    #[test]
    fn codes_round_trip() {
        for &av in AttackVector::VARIANTS {
            assert_eq!(av.to_string().parse::<AttackVector>().unwrap(), av);
        }
        for &pr in PrivilegesRequired::VARIANTS {
            assert_eq!(pr.to_string().parse::<PrivilegesRequired>().unwrap(), pr);
        }
        for &s in Scope::VARIANTS {
            assert_eq!(s.to_string().parse::<Scope>().unwrap(), s);
        }
    }

    #[test]
    fn serde_round_trip() {
        let m = metrics("N", "L", "N", "N", "U", "H", "H", "H");
        let json = serde_json::to_value(m).unwrap();
        assert_eq!(json["av"], "network");
        assert_eq!(json["s"], "unchanged");
        let back: BaseMetrics = serde_json::from_value(json).unwrap();
        assert_eq!(back, m);
    }

    #[test]
    fn serde_rejects_out_of_domain_values() {
        let result = serde_json::from_value::<BaseMetrics>(serde_json::json!({
            "av": "cosmic", "ac": "low", "pr": "none", "ui": "none",
            "s": "unchanged", "c": "high", "i": "high", "a": "high",
        }));
        assert!(result.is_err());
    }
}
