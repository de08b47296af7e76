//! Tenant identity primitives: host parsing, feature flags, subscription
//! tiers.
//!
//! Host resolution is a pure mapping so the same host string always yields
//! the same outcome. The database lookup that turns a subdomain into a
//! tenant row lives in `services::tenant_service`.

use serde::{Deserialize, Serialize};

/// Named capabilities a tenant's subscription may include.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum FeatureFlag {
    AppsHub,
    Library,
    Schedule,
    Attendance,
    Notifications,
    Lockers,
    Licenses,
    Devices,
}

impl FeatureFlag {
    pub fn as_str(&self) -> &'static str {
        match self {
            FeatureFlag::AppsHub => "apps_hub",
            FeatureFlag::Library => "library",
            FeatureFlag::Schedule => "schedule",
            FeatureFlag::Attendance => "attendance",
            FeatureFlag::Notifications => "notifications",
            FeatureFlag::Lockers => "lockers",
            FeatureFlag::Licenses => "licenses",
            FeatureFlag::Devices => "devices",
        }
    }

    pub fn parse(s: &str) -> Option<FeatureFlag> {
        match s {
            "apps_hub" => Some(FeatureFlag::AppsHub),
            "library" => Some(FeatureFlag::Library),
            "schedule" => Some(FeatureFlag::Schedule),
            "attendance" => Some(FeatureFlag::Attendance),
            "notifications" => Some(FeatureFlag::Notifications),
            "lockers" => Some(FeatureFlag::Lockers),
            "licenses" => Some(FeatureFlag::Licenses),
            "devices" => Some(FeatureFlag::Devices),
            _ => None,
        }
    }
}

/// Subscription tiers are ordinal: basic < premium < enterprise.
#[derive(Debug, Clone, Copy, PartialEq, Eq, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "snake_case")]
pub enum SubscriptionTier {
    Basic,
    Premium,
    Enterprise,
}

impl SubscriptionTier {
    pub fn as_str(&self) -> &'static str {
        match self {
            SubscriptionTier::Basic => "basic",
            SubscriptionTier::Premium => "premium",
            SubscriptionTier::Enterprise => "enterprise",
        }
    }

    pub fn parse(s: &str) -> Option<SubscriptionTier> {
        match s {
            "basic" => Some(SubscriptionTier::Basic),
            "premium" => Some(SubscriptionTier::Premium),
            "enterprise" => Some(SubscriptionTier::Enterprise),
            _ => None,
        }
    }
}

/// Outcome of parsing a request host, before any directory lookup.
#[derive(Debug, Clone, PartialEq, Eq)]
pub enum HostResolution {
    /// Leftmost label of a fully-qualified tenant host, e.g.
    /// "harvard.edvirons.com" -> "harvard"
    Subdomain(String),
    /// Recognized local/development host: explicit override or the
    /// configured fallback tenant
    Local(String),
    /// Apex domain (no subdomain label present)
    Apex,
}

/// Map a Host header to a candidate tenant identifier. Pure and
/// deterministic: no lookups, no side effects.
pub fn resolve_host(
    host: &str,
    override_param: Option<&str>,
    default_tenant: &str,
) -> HostResolution {
    let hostname = strip_port(host);

    if is_local_host(hostname) {
        let tenant = override_param
            .filter(|s| !s.is_empty())
            .unwrap_or(default_tenant);
        return HostResolution::Local(tenant.to_string());
    }

    let labels: Vec<&str> = hostname.split('.').filter(|s| !s.is_empty()).collect();
    if labels.len() >= 3 {
        HostResolution::Subdomain(labels[0].to_string())
    } else {
        HostResolution::Apex
    }
}

fn strip_port(host: &str) -> &str {
    // IPv6 literals keep their brackets; everything else drops :port
    if host.starts_with('[') {
        host.split(']').next().map(|s| &s[1..]).unwrap_or(host)
    } else {
        host.split(':').next().unwrap_or(host)
    }
}

fn is_local_host(hostname: &str) -> bool {
    hostname == "localhost"
        || hostname == "127.0.0.1"
        || hostname == "::1"
        || hostname.ends_with(".local")
        || hostname.ends_with(".localhost")
}

#[cfg(test)]
mod tests {
    use super::*;

    #[test]
    fn fully_qualified_host_yields_subdomain() {
        assert_eq!(
            resolve_host("harvard.edvirons.com", None, "demo"),
            HostResolution::Subdomain("harvard".to_string())
        );
    }

    #[test]
    fn port_is_stripped_before_parsing() {
        assert_eq!(
            resolve_host("harvard.edvirons.com:8443", None, "demo"),
            HostResolution::Subdomain("harvard".to_string())
        );
    }

    #[test]
    fn localhost_without_override_falls_back_to_default() {
        assert_eq!(
            resolve_host("localhost:3000", None, "demo"),
            HostResolution::Local("demo".to_string())
        );
    }

    #[test]
    fn localhost_override_wins() {
        assert_eq!(
            resolve_host("127.0.0.1", Some("harvard"), "demo"),
            HostResolution::Local("harvard".to_string())
        );
    }

    #[test]
    fn apex_domain_has_no_tenant() {
        assert_eq!(resolve_host("edvirons.com", None, "demo"), HostResolution::Apex);
        assert_eq!(resolve_host("edvirons.com:80", None, "demo"), HostResolution::Apex);
    }

    #[test]
    fn resolution_is_deterministic() {
        let a = resolve_host("harvard.edvirons.com", None, "demo");
        let b = resolve_host("harvard.edvirons.com", None, "demo");
        assert_eq!(a, b);
    }

    #[test]
    fn tier_ordering_is_ordinal() {
        assert!(SubscriptionTier::Basic < SubscriptionTier::Premium);
        assert!(SubscriptionTier::Premium < SubscriptionTier::Enterprise);
    }

    #[test]
    fn feature_flags_round_trip() {
        for flag in [
            FeatureFlag::AppsHub,
            FeatureFlag::Library,
            FeatureFlag::Devices,
            FeatureFlag::Licenses,
        ] {
            assert_eq!(FeatureFlag::parse(flag.as_str()), Some(flag));
        }
        assert_eq!(FeatureFlag::parse("holograms"), None);
    }
}
