//! SectionName enum representing the disclosure sections that accept manual data.

use serde::{Deserialize, Serialize};
use std::fmt;
use std::str::FromStr;

use super::errors::ValidationError;

/// The top-level divisions of a BRSR disclosure.
///
/// Section C is split into one section per NGRBC principle, each with its own
/// independent record.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Hash, Serialize, Deserialize)]
pub enum SectionName {
    #[serde(rename = "sectionA")]
    SectionA,
    #[serde(rename = "sectionB")]
    SectionB,
    #[serde(rename = "principle1")]
    Principle1,
    #[serde(rename = "principle2")]
    Principle2,
    #[serde(rename = "principle3")]
    Principle3,
    #[serde(rename = "principle4")]
    Principle4,
    #[serde(rename = "principle5")]
    Principle5,
    #[serde(rename = "principle6")]
    Principle6,
    #[serde(rename = "principle7")]
    Principle7,
    #[serde(rename = "principle8")]
    Principle8,
    #[serde(rename = "principle9")]
    Principle9,
}

impl SectionName {
    /// Returns all sections in report order.
    pub fn all() -> &'static [SectionName] {
        &[
            SectionName::SectionA,
            SectionName::SectionB,
            SectionName::Principle1,
            SectionName::Principle2,
            SectionName::Principle3,
            SectionName::Principle4,
            SectionName::Principle5,
            SectionName::Principle6,
            SectionName::Principle7,
            SectionName::Principle8,
            SectionName::Principle9,
        ]
    }

    /// Stable key used in payload field names and saved drafts.
    pub fn wire_key(&self) -> &'static str {
        match self {
            SectionName::SectionA => "sectionA",
            SectionName::SectionB => "sectionB",
            SectionName::Principle1 => "principle1",
            SectionName::Principle2 => "principle2",
            SectionName::Principle3 => "principle3",
            SectionName::Principle4 => "principle4",
            SectionName::Principle5 => "principle5",
            SectionName::Principle6 => "principle6",
            SectionName::Principle7 => "principle7",
            SectionName::Principle8 => "principle8",
            SectionName::Principle9 => "principle9",
        }
    }

    /// Returns the display name.
    pub fn display_name(&self) -> &'static str {
        match self {
            SectionName::SectionA => "Section A - Contact & Workforce",
            SectionName::SectionB => "Section B - Policy & Governance",
            SectionName::Principle1 => "P1: Ethics & Integrity",
            SectionName::Principle2 => "P2: Sustainability",
            SectionName::Principle3 => "P3: Employee Welfare",
            SectionName::Principle4 => "P4: Stakeholder Engagement",
            SectionName::Principle5 => "P5: Human Rights",
            SectionName::Principle6 => "P6: Environment",
            SectionName::Principle7 => "P7: Public Policy",
            SectionName::Principle8 => "P8: Inclusive Growth",
            SectionName::Principle9 => "P9: Customer Value",
        }
    }

    /// Multipart field name carrying this section's manual data.
    pub fn manual_data_field(&self) -> String {
        format!("manual_data_{}", self.wire_key())
    }
}

impl fmt::Display for SectionName {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        write!(f, "{}", self.wire_key())
    }
}

impl FromStr for SectionName {
    type Err = ValidationError;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        let wanted = s.trim();
        Self::all()
            .iter()
            .find(|section| section.wire_key().eq_ignore_ascii_case(wanted))
            .copied()
            .ok_or_else(|| ValidationError::invalid_format("section", format!("unknown section '{}'", wanted)))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn all_returns_11_sections_in_report_order() {
        let all = SectionName::all();
        assert_eq!(all.len(), 11);
        assert_eq!(all[0], SectionName::SectionA);
        assert_eq!(all[1], SectionName::SectionB);
        assert_eq!(all[10], SectionName::Principle9);
    }

    #[test]
    fn manual_data_field_uses_wire_key() {
        assert_eq!(SectionName::SectionA.manual_data_field(), "manual_data_sectionA");
        assert_eq!(SectionName::Principle6.manual_data_field(), "manual_data_principle6");
    }

    #[test]
    fn display_names_are_human_readable() {
        assert_eq!(SectionName::SectionA.display_name(), "Section A - Contact & Workforce");
        assert_eq!(SectionName::Principle6.display_name(), "P6: Environment");
    }

    #[test]
    fn parses_wire_keys_case_insensitively() {
        assert_eq!("sectionA".parse::<SectionName>().unwrap(), SectionName::SectionA);
        assert_eq!("PRINCIPLE3".parse::<SectionName>().unwrap(), SectionName::Principle3);
        assert!("sectionD".parse::<SectionName>().is_err());
    }

    #[test]
    fn serializes_to_wire_key() {
        let json = serde_json::to_string(&SectionName::Principle2).unwrap();
        assert_eq!(json, "\"principle2\"");
    }
}
