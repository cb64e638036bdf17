use serde::Serialize;
use std::fmt;
use std::str::FromStr;
use thiserror::Error;

/// Output category a domain is sorted into.
///
/// Declaration order is the canonical order used for sheets and summaries.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize)]
pub enum Bucket {
    /// Native-script label under a native-script `.中国` / `.中國` TLD.
    #[serde(rename = "IDN.IDN")]
    IdnIdn,
    /// Internationalized label under the puny-encoded native TLD.
    #[serde(rename = "IDN.XN--FIQS8S")]
    IdnPunyTld,
    /// ASCII label under the puny-encoded native TLD.
    #[serde(rename = "ASCII.XN--FIQS8S")]
    AsciiPunyTld,
    #[serde(rename = "ASCII.CN")]
    AsciiCn,
    #[serde(rename = "IDN.CN")]
    IdnCn,
    #[serde(rename = ".COM.CN")]
    ComCn,
    #[serde(rename = ".NET.CN")]
    NetCn,
    #[serde(rename = ".ORG.CN")]
    OrgCn,
    #[serde(rename = "UNCLASSIFIED")]
    Unclassified,
}

impl Bucket {
    pub const COUNT: usize = 9;

    pub const ALL: [Bucket; Bucket::COUNT] = [
        Bucket::IdnIdn,
        Bucket::IdnPunyTld,
        Bucket::AsciiPunyTld,
        Bucket::AsciiCn,
        Bucket::IdnCn,
        Bucket::ComCn,
        Bucket::NetCn,
        Bucket::OrgCn,
        Bucket::Unclassified,
    ];

    pub const fn label(self) -> &'static str {
        match self {
            Bucket::IdnIdn => "IDN.IDN",
            Bucket::IdnPunyTld => "IDN.XN--FIQS8S",
            Bucket::AsciiPunyTld => "ASCII.XN--FIQS8S",
            Bucket::AsciiCn => "ASCII.CN",
            Bucket::IdnCn => "IDN.CN",
            Bucket::ComCn => ".COM.CN",
            Bucket::NetCn => ".NET.CN",
            Bucket::OrgCn => ".ORG.CN",
            Bucket::Unclassified => "UNCLASSIFIED",
        }
    }

    /// Position in [`Bucket::ALL`].
    pub const fn index(self) -> usize {
        self as usize
    }

    /// Worksheet name for this bucket, cut to at most `max_chars` characters.
    pub fn sheet_name(self, max_chars: usize) -> String {
        self.label().chars().take(max_chars).collect()
    }
}

impl fmt::Display for Bucket {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.label())
    }
}

#[derive(Debug, Clone, PartialEq, Eq, Error)]
#[error("unknown bucket '{0}'")]
pub struct UnknownBucket(pub String);

impl FromStr for Bucket {
    type Err = UnknownBucket;

    fn from_str(s: &str) -> Result<Self, Self::Err> {
        Bucket::ALL
            .into_iter()
            .find(|bucket| bucket.label() == s)
            .ok_or_else(|| UnknownBucket(s.to_string()))
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn index_matches_canonical_position() {
        for (position, bucket) in Bucket::ALL.iter().enumerate() {
            assert_eq!(bucket.index(), position);
        }
    }

    #[test]
    fn canonical_order_is_declaration_order() {
        let mut sorted = Bucket::ALL;
        sorted.sort();
        assert_eq!(sorted, Bucket::ALL);
        assert_eq!(Bucket::ALL.last(), Some(&Bucket::Unclassified));
    }

    #[test]
    fn labels_parse_back() {
        for bucket in Bucket::ALL {
            assert_eq!(bucket.label().parse::<Bucket>(), Ok(bucket));
        }
        let err = "COM.CN".parse::<Bucket>().unwrap_err();
        assert_eq!(err.to_string(), "unknown bucket 'COM.CN'");
    }

    #[test]
    fn sheet_names_are_truncated_by_characters() {
        assert_eq!(Bucket::AsciiPunyTld.sheet_name(31), "ASCII.XN--FIQS8S");
        assert_eq!(Bucket::AsciiPunyTld.sheet_name(5), "ASCII");
        assert_eq!(Bucket::ComCn.sheet_name(0), "");
    }

    #[test]
    fn serializes_as_label() {
        let json = serde_json::to_string(&Bucket::ComCn).unwrap();
        assert_eq!(json, "\".COM.CN\"");
    }
}
