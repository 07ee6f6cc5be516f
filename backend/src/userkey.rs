use std::fmt;

/// The identifier shapes Ethos accepts. Lookups hit a different upstream
/// endpoint per variant, so search and profile routes dispatch on this.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum Userkey {
    /// `profileId:<id>`
    ProfileId(i64),
    /// `address:0x...` or a bare 0x-prefixed 40-hex-digit address
    Address(String),
    /// `service:x.com:<id>` / `service:twitter.com:<id>`
    Twitter(String),
    /// `service:farcaster:<fid>`
    Farcaster(String),
    /// Anything else is treated as a Twitter/X handle (leading `@` stripped)
    Handle(String),
}

impl Userkey {
    pub fn parse(raw: &str) -> Userkey {
        let raw = raw.trim();

        if let Some(rest) = raw.strip_prefix("profileId:") {
            if let Ok(id) = rest.parse::<i64>() {
                return Userkey::ProfileId(id);
            }
        }

        if let Some(rest) = raw.strip_prefix("address:") {
            return Userkey::Address(rest.to_string());
        }

        if raw.starts_with("service:x.com:") || raw.starts_with("service:twitter.com:") {
            let id = raw.rsplit(':').next().unwrap_or("");
            return Userkey::Twitter(id.to_string());
        }

        if let Some(fid) = raw.strip_prefix("service:farcaster:") {
            return Userkey::Farcaster(fid.to_string());
        }

        if is_eth_address(raw) {
            return Userkey::Address(raw.to_string());
        }

        Userkey::Handle(raw.trim_start_matches('@').to_string())
    }
}

impl fmt::Display for Userkey {
    /// Canonical userkey string, as Ethos renders it.
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        match self {
            Userkey::ProfileId(id) => write!(f, "profileId:{}", id),
            Userkey::Address(addr) => write!(f, "address:{}", addr),
            Userkey::Twitter(id) => write!(f, "service:x.com:{}", id),
            Userkey::Farcaster(fid) => write!(f, "service:farcaster:{}", fid),
            Userkey::Handle(handle) => write!(f, "{}", handle),
        }
    }
}

fn is_eth_address(s: &str) -> bool {
    s.len() == 42 && s.starts_with("0x") && s[2..].chars().all(|c| c.is_ascii_hexdigit())
}
