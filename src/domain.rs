use regex::Regex;
use std::sync::LazyLock;
use thiserror::Error;
use tracing::debug;
use url::Host;

use crate::bucket::Bucket;

static ACE_PREFIX: LazyLock<Regex> =
    LazyLock::new(|| Regex::new(r"(?i)^xn--").expect("ACE prefix pattern is valid"));

/// ACE forms of `.中国` and `.中國`.
pub const PUNY_TLDS: [&str; 2] = ["xn--fiqs8s", "xn--fiqz9s"];

/// A domain split around its public suffix.
#[derive(Debug, Clone, Copy, PartialEq, Eq)]
pub struct DomainParts<'a> {
    /// Label immediately left of the suffix, empty when there is none.
    pub sld: &'a str,
    pub suffix: &'a str,
}

#[derive(Debug, Error)]
enum EncodingFailure {
    #[error("IDNA conversion failed: {0}")]
    Idna(#[from] url::ParseError),
    #[error("not a domain name")]
    NotADomain,
}

/// Trims, lower-cases and drops a trailing root dot.
pub fn normalize(domain: &str) -> String {
    let trimmed = domain.trim();
    trimmed
        .strip_suffix('.')
        .unwrap_or(trimmed)
        .to_lowercase()
}

/// True for labels outside printable ASCII or already in ACE form.
pub fn is_internationalized(label: &str) -> bool {
    label.chars().any(|c| !(' '..='~').contains(&c)) || ACE_PREFIX.is_match(label)
}

/// ICANN public suffix of `domain`. Private-section matches (cloud and
/// hosting zones such as `amazonaws.com.cn`) are skipped by dropping their
/// leftmost label and looking up again.
fn icann_suffix(domain: &str) -> &str {
    let mut name = domain;
    loop {
        let Some(suffix) = psl::suffix(name.as_bytes()) else {
            return "";
        };
        // the suffix is a byte tail of `name` ending on a label boundary
        let found = &name[name.len() - suffix.as_bytes().len()..];
        if suffix.typ() != Some(psl::Type::Private) {
            return found;
        }
        match found.split_once('.') {
            Some((_, parent)) => name = parent,
            None => return found,
        }
    }
}

/// Splits an already normalized domain around its ICANN suffix.
pub fn split_domain(domain: &str) -> DomainParts<'_> {
    let suffix = icann_suffix(domain);
    let rest = domain.strip_suffix(suffix).unwrap_or("");
    let rest = rest.strip_suffix('.').unwrap_or(rest);
    let sld = rest.rsplit('.').next().unwrap_or("");
    DomainParts { sld, suffix }
}

fn generic_zone(suffix: &str) -> Option<Bucket> {
    match suffix {
        "com.cn" => Some(Bucket::ComCn),
        "net.cn" => Some(Bucket::NetCn),
        "org.cn" => Some(Bucket::OrgCn),
        _ => None,
    }
}

fn is_puny_tld(suffix: &str) -> bool {
    PUNY_TLDS.contains(&suffix)
}

fn is_country_zone(suffix: &str) -> bool {
    suffix == "cn" || suffix.ends_with(".cn")
}

fn ace_encode(domain: &str) -> Result<String, EncodingFailure> {
    match Host::parse(domain)? {
        Host::Domain(ascii) => Ok(ascii),
        Host::Ipv4(_) | Host::Ipv6(_) => Err(EncodingFailure::NotADomain),
    }
}

/// Whole domain written in native script, e.g. `例子.中国`.
fn is_fully_native(domain: &str) -> bool {
    match ace_encode(domain) {
        Ok(ascii) => {
            let parts = split_domain(&ascii);
            is_puny_tld(parts.suffix) && is_internationalized(parts.sld)
        }
        Err(e) => {
            debug!(action = "encode", component = "classifier", domain = domain, error = %e, "ACE encoding failed, rule skipped");
            false
        }
    }
}

/// Assigns exactly one bucket to `domain`. The first matching rule wins.
pub fn classify(domain: &str) -> Bucket {
    let normalized = normalize(domain);
    let parts = split_domain(&normalized);

    if let Some(bucket) = generic_zone(parts.suffix) {
        return bucket;
    }

    if is_puny_tld(parts.suffix) {
        return if is_internationalized(parts.sld) {
            Bucket::IdnPunyTld
        } else {
            Bucket::AsciiPunyTld
        };
    }

    // Plain `cn` and every zone below it, province SLDs included.
    if is_country_zone(parts.suffix) {
        return if is_internationalized(parts.sld) {
            Bucket::IdnCn
        } else {
            Bucket::AsciiCn
        };
    }

    if is_fully_native(&normalized) {
        return Bucket::IdnIdn;
    }

    Bucket::Unclassified
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn generic_zones() {
        assert_eq!(classify("example.com.cn"), Bucket::ComCn);
        assert_eq!(classify("example.net.cn"), Bucket::NetCn);
        assert_eq!(classify("example.org.cn"), Bucket::OrgCn);
        assert_eq!(classify("www.shop.example.com.cn"), Bucket::ComCn);
    }

    #[test]
    fn generic_zone_wins_over_country_code() {
        // com.cn also ends with ".cn" but must never land in ASCII.CN
        assert_eq!(classify("例子.com.cn"), Bucket::ComCn);
        assert_eq!(classify("com.cn"), Bucket::ComCn);
    }

    #[test]
    fn puny_native_tlds() {
        assert_eq!(classify("xn--fsqu00a.xn--fiqs8s"), Bucket::IdnPunyTld);
        assert_eq!(classify("example.xn--fiqs8s"), Bucket::AsciiPunyTld);
        assert_eq!(classify("example.xn--fiqz9s"), Bucket::AsciiPunyTld);
        assert_eq!(classify("XN--FSQU00A.XN--FIQZ9S"), Bucket::IdnPunyTld);
    }

    #[test]
    fn country_code_and_province_zones() {
        assert_eq!(classify("example.cn"), Bucket::AsciiCn);
        assert_eq!(classify("example.xj.cn"), Bucket::AsciiCn);
        assert_eq!(classify("example.gs.cn"), Bucket::AsciiCn);
        assert_eq!(classify("例子.cn"), Bucket::IdnCn);
        assert_eq!(classify("xn--fsqu00a.cn"), Bucket::IdnCn);
        assert_eq!(classify("例子.bj.cn"), Bucket::IdnCn);
    }

    #[test]
    fn private_suffixes_are_ignored() {
        assert_eq!(classify("foo.s3.cn-north-1.amazonaws.com.cn"), Bucket::ComCn);
        assert_eq!(classify("x.compute.amazonaws.com.cn"), Bucket::ComCn);
        // the label left of `cn` is `myqnapcloud`, which is ASCII
        assert_eq!(classify("xn--fsqu00a.myqnapcloud.cn"), Bucket::AsciiCn);
    }

    #[test]
    fn fully_native_domain() {
        assert_eq!(classify("例子.中国"), Bucket::IdnIdn);
        assert_eq!(classify("例子.中國"), Bucket::IdnIdn);
    }

    #[test]
    fn ascii_label_under_native_tld_is_not_fully_native() {
        assert_eq!(classify("example.中国"), Bucket::Unclassified);
    }

    #[test]
    fn unrecognised_domains() {
        assert_eq!(classify("notadomain"), Bucket::Unclassified);
        assert_eq!(classify("example.com"), Bucket::Unclassified);
        assert_eq!(classify(""), Bucket::Unclassified);
        assert_eq!(classify("nan"), Bucket::Unclassified);
    }

    #[test]
    fn encoding_failures_fall_through() {
        assert_eq!(classify("bad domain.中国"), Bucket::Unclassified);
        assert_eq!(classify("192.168.0.1"), Bucket::Unclassified);
        assert_eq!(classify("exa%mple.org"), Bucket::Unclassified);
    }

    #[test]
    fn case_and_whitespace_insensitive() {
        assert_eq!(classify("EXAMPLE.COM.CN"), classify("example.com.cn"));
        assert_eq!(classify("  Example.XJ.cn  "), Bucket::AsciiCn);
        assert_eq!(classify("example.cn."), Bucket::AsciiCn);
    }

    #[test]
    fn classification_is_deterministic() {
        let samples = ["例子.中国", "example.com.cn", "a.b.c.xj.cn", "???", "xn--"];
        for sample in samples {
            assert_eq!(classify(sample), classify(sample));
        }
    }

    #[test]
    fn internationalized_labels() {
        assert!(is_internationalized("例子"));
        assert!(is_internationalized("xn--fsqu00a"));
        assert!(is_internationalized("XN--FSQU00A"));
        assert!(is_internationalized("caf\u{e9}"));
        assert!(is_internationalized("tab\there"));
        assert!(!is_internationalized("example"));
        assert!(!is_internationalized("axn--b"));
        assert!(!is_internationalized(""));
    }

    #[test]
    fn splits_on_public_suffix() {
        let parts = split_domain("www.example.com.cn");
        assert_eq!(parts.suffix, "com.cn");
        assert_eq!(parts.sld, "example");

        let parts = split_domain("example.xj.cn");
        assert_eq!(parts.suffix, "xj.cn");
        assert_eq!(parts.sld, "example");

        let parts = split_domain("foo.s3.cn-north-1.amazonaws.com.cn");
        assert_eq!(parts.suffix, "com.cn");
        assert_eq!(parts.sld, "amazonaws");

        let parts = split_domain("xn--fsqu00a.myqnapcloud.cn");
        assert_eq!(parts.suffix, "cn");
        assert_eq!(parts.sld, "myqnapcloud");

        let parts = split_domain("cn");
        assert_eq!(parts.suffix, "cn");
        assert_eq!(parts.sld, "");
    }

    #[test]
    fn normalize_trims_and_lowercases() {
        assert_eq!(normalize("  Example.CN. "), "example.cn");
        assert_eq!(normalize("例子.中国"), "例子.中国");
    }
}
