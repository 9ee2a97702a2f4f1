use std::fmt;

/// Coarse mail-provider family of an MX host. Only used to pick a timing
/// threshold; it is not an authoritative provider detection.
#[cfg_attr(feature = "with-serde", derive(serde::Serialize, serde::Deserialize))]
#[cfg_attr(feature = "with-serde", serde(rename_all = "lowercase"))]
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash)]
pub enum MxBrand {
    Google,
    Microsoft,
    Proofpoint,
    Mimecast,
    Zoho,
    Other,
}

impl MxBrand {
    pub fn as_str(&self) -> &'static str {
        match self {
            Self::Google => "google",
            Self::Microsoft => "microsoft",
            Self::Proofpoint => "proofpoint",
            Self::Mimecast => "mimecast",
            Self::Zoho => "zoho",
            Self::Other => "other",
        }
    }
}

impl fmt::Display for MxBrand {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.as_str())
    }
}

// Checked top to bottom; first hit wins.
const BRAND_MARKERS: &[(&[&str], MxBrand)] = &[
    (&["aspmx", "google"], MxBrand::Google),
    (&["outlook", "protection"], MxBrand::Microsoft),
    (&["proofpoint"], MxBrand::Proofpoint),
    (&["mimecast"], MxBrand::Mimecast),
    (&["zoho"], MxBrand::Zoho),
];

/// Maps an MX hostname to its [`MxBrand`] by case-insensitive substring match.
pub fn classify(host: &str) -> MxBrand {
    let host = host.to_ascii_lowercase();
    BRAND_MARKERS
        .iter()
        .find(|(markers, _)| markers.iter().any(|marker| host.contains(marker)))
        .map(|(_, brand)| *brand)
        .unwrap_or(MxBrand::Other)
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn google_hosts() {
        assert_eq!(classify("ASPMX.L.GOOGLE.COM"), MxBrand::Google);
        assert_eq!(classify("alt1.aspmx.l.google.com"), MxBrand::Google);
        assert_eq!(classify("smtp.googlemail.com"), MxBrand::Google);
    }

    #[test]
    fn microsoft_hosts() {
        assert_eq!(
            classify("contoso-com.mail.protection.outlook.com"),
            MxBrand::Microsoft
        );
        assert_eq!(classify("eur.olc.protection.example"), MxBrand::Microsoft);
    }

    #[test]
    fn gateway_vendors() {
        assert_eq!(classify("mx0a-001.pphosted.proofpoint.com"), MxBrand::Proofpoint);
        assert_eq!(classify("eu-smtp-inbound-1.mimecast.com"), MxBrand::Mimecast);
        assert_eq!(classify("mx.zoho.eu"), MxBrand::Zoho);
    }

    #[test]
    fn unknown_hosts_are_other() {
        assert_eq!(classify("mail.example.com"), MxBrand::Other);
        assert_eq!(classify(""), MxBrand::Other);
    }

    #[test]
    fn earlier_rules_win() {
        assert_eq!(classify("zoho-google-relay.example"), MxBrand::Google);
        assert_eq!(classify("mimecast.protection.example"), MxBrand::Microsoft);
    }

    #[test]
    fn display_is_lowercase() {
        assert_eq!(MxBrand::Proofpoint.to_string(), "proofpoint");
        assert_eq!(MxBrand::Other.as_str(), "other");
    }
}
