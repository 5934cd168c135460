//! Registry of the provider's paged list operations
//!
//! Each operation is described by an [`EndpointSpec`]: where it lives, which
//! query parameters carry the cursor and page size, and where the items and
//! the next cursor sit in the response body.

use crate::error::{Error, Result};
use serde::{Deserialize, Serialize};
use std::collections::HashMap;
use std::fmt;
use std::str::FromStr;

/// Paged list operations exposed by the provider
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, PartialOrd, Ord, Serialize, Deserialize)]
#[serde(rename_all = "kebab-case")]
pub enum ListOperation {
    /// Hosted zones owned by the account
    HostedZones,
    /// Private hosted zones associated with a VPC
    HostedZonesByVpc,
    /// Reusable delegation sets
    ReusableDelegationSets,
    /// Health checks
    HealthChecks,
    /// Latest version of every traffic policy
    TrafficPolicies,
    /// Traffic policy instances
    TrafficPolicyInstances,
    /// CIDR collections
    CidrCollections,
    /// Objects in a storage bucket
    Objects,
}

impl ListOperation {
    /// Every operation, in display order
    pub const ALL: [ListOperation; 8] = [
        ListOperation::HostedZones,
        ListOperation::HostedZonesByVpc,
        ListOperation::ReusableDelegationSets,
        ListOperation::HealthChecks,
        ListOperation::TrafficPolicies,
        ListOperation::TrafficPolicyInstances,
        ListOperation::CidrCollections,
        ListOperation::Objects,
    ];

    /// Operation name as used on the command line and in config files
    pub fn name(self) -> &'static str {
        match self {
            ListOperation::HostedZones => "hosted-zones",
            ListOperation::HostedZonesByVpc => "hosted-zones-by-vpc",
            ListOperation::ReusableDelegationSets => "reusable-delegation-sets",
            ListOperation::HealthChecks => "health-checks",
            ListOperation::TrafficPolicies => "traffic-policies",
            ListOperation::TrafficPolicyInstances => "traffic-policy-instances",
            ListOperation::CidrCollections => "cidr-collections",
            ListOperation::Objects => "objects",
        }
    }

    /// Built-in endpoint description
    pub fn builtin_spec(self) -> EndpointSpec {
        match self {
            ListOperation::HostedZones => EndpointSpec::new(
                "/hostedzone",
                "marker",
                "maxitems",
                "HostedZones",
                "NextMarker",
                100,
            )
            .with_truncated_field("IsTruncated")
            .with_marker_field("Marker"),
            ListOperation::HostedZonesByVpc => EndpointSpec::new(
                "/hostedzonesbyvpc",
                "nexttoken",
                "maxitems",
                "HostedZoneSummaries",
                "NextToken",
                100,
            )
            .with_required_params(&["vpcid", "vpcregion"]),
            ListOperation::ReusableDelegationSets => EndpointSpec::new(
                "/delegationset",
                "marker",
                "maxitems",
                "DelegationSets",
                "NextMarker",
                100,
            )
            .with_truncated_field("IsTruncated")
            .with_marker_field("Marker"),
            ListOperation::HealthChecks => EndpointSpec::new(
                "/healthcheck",
                "marker",
                "maxitems",
                "HealthChecks",
                "NextMarker",
                100,
            )
            .with_truncated_field("IsTruncated")
            .with_marker_field("Marker"),
            ListOperation::TrafficPolicies => EndpointSpec::new(
                "/trafficpolicies",
                "trafficpolicyid",
                "maxitems",
                "TrafficPolicySummaries",
                "TrafficPolicyIdMarker",
                100,
            )
            .with_truncated_field("IsTruncated"),
            ListOperation::TrafficPolicyInstances => EndpointSpec::new(
                "/trafficpolicyinstances",
                "hostedzoneid",
                "maxitems",
                "TrafficPolicyInstances",
                "HostedZoneIdMarker",
                100,
            )
            .with_truncated_field("IsTruncated")
            .with_cursor_part("trafficpolicyinstancename", "TrafficPolicyInstanceNameMarker")
            .with_cursor_part("trafficpolicyinstancetype", "TrafficPolicyInstanceTypeMarker"),
            ListOperation::CidrCollections => EndpointSpec::new(
                "/cidrcollection",
                "nexttoken",
                "maxresults",
                "CidrCollections",
                "NextToken",
                50,
            ),
            ListOperation::Objects => EndpointSpec::new(
                "/{bucket}",
                "continuation-token",
                "max-keys",
                "Contents",
                "NextContinuationToken",
                1000,
            )
            .with_truncated_field("IsTruncated")
            .with_marker_field("ContinuationToken")
            .with_fixed_param("list-type", "2"),
        }
    }
}

impl fmt::Display for ListOperation {
    fn fmt(&self, f: &mut fmt::Formatter<'_>) -> fmt::Result {
        f.write_str(self.name())
    }
}

impl FromStr for ListOperation {
    type Err = Error;

    fn from_str(s: &str) -> Result<Self> {
        let wanted = s.trim().to_ascii_lowercase().replace('_', "-");
        ListOperation::ALL
            .into_iter()
            .find(|op| op.name() == wanted)
            .ok_or_else(|| Error::UnknownOperation {
                name: s.to_string(),
            })
    }
}

/// One further marker of a composite cursor
///
/// Sent as `param` and read back from the response field `field`.
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct CursorPart {
    pub param: String,
    pub field: String,
}

/// Wire description of one paged list endpoint
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct EndpointSpec {
    /// Request path, may contain `{name}` placeholders
    pub path: String,
    /// Query parameter carrying the cursor
    pub cursor_param: String,
    /// Query parameter carrying the page size
    pub page_size_param: String,
    /// Response field holding the item array
    pub items_field: String,
    /// Response field holding the next cursor
    pub next_cursor_field: String,
    /// Markers that must be sent back together with the cursor
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub cursor_parts: Vec<CursorPart>,
    /// Response field holding the truncation flag
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub truncated_field: Option<String>,
    /// Response field echoing the request marker
    #[serde(default, skip_serializing_if = "Option::is_none")]
    pub marker_field: Option<String>,
    /// Largest page size the endpoint honors
    pub server_page_cap: u32,
    /// Query parameters the caller must bind
    #[serde(default, skip_serializing_if = "Vec::is_empty")]
    pub required_params: Vec<String>,
    /// Query parameters sent on every request
    #[serde(default, skip_serializing_if = "HashMap::is_empty")]
    pub fixed_params: HashMap<String, String>,
}

impl EndpointSpec {
    /// Create an endpoint description
    pub fn new(
        path: impl Into<String>,
        cursor_param: impl Into<String>,
        page_size_param: impl Into<String>,
        items_field: impl Into<String>,
        next_cursor_field: impl Into<String>,
        server_page_cap: u32,
    ) -> Self {
        Self {
            path: path.into(),
            cursor_param: cursor_param.into(),
            page_size_param: page_size_param.into(),
            items_field: items_field.into(),
            next_cursor_field: next_cursor_field.into(),
            cursor_parts: Vec::new(),
            truncated_field: None,
            marker_field: None,
            server_page_cap,
            required_params: Vec::new(),
            fixed_params: HashMap::new(),
        }
    }

    /// Follow the next cursor only while this flag is true
    #[must_use]
    pub fn with_truncated_field(mut self, field: impl Into<String>) -> Self {
        self.truncated_field = Some(field.into());
        self
    }

    /// Resume with one more marker next to the cursor
    #[must_use]
    pub fn with_cursor_part(mut self, param: impl Into<String>, field: impl Into<String>) -> Self {
        self.cursor_parts.push(CursorPart {
            param: param.into(),
            field: field.into(),
        });
        self
    }

    /// Whether the cursor is made of several markers
    pub fn has_composite_cursor(&self) -> bool {
        !self.cursor_parts.is_empty()
    }

    /// Every query parameter that carries part of the cursor
    pub fn cursor_params(&self) -> impl Iterator<Item = &str> {
        std::iter::once(self.cursor_param.as_str())
            .chain(self.cursor_parts.iter().map(|part| part.param.as_str()))
    }

    /// Report this field as the echoed marker
    #[must_use]
    pub fn with_marker_field(mut self, field: impl Into<String>) -> Self {
        self.marker_field = Some(field.into());
        self
    }

    /// Require the caller to bind these query parameters
    #[must_use]
    pub fn with_required_params(mut self, params: &[&str]) -> Self {
        self.required_params = params.iter().map(|p| (*p).to_string()).collect();
        self
    }

    /// Send a query parameter on every request
    #[must_use]
    pub fn with_fixed_param(mut self, key: impl Into<String>, value: impl Into<String>) -> Self {
        self.fixed_params.insert(key.into(), value.into());
        self
    }

    /// Apply configuration overrides
    pub fn apply(&mut self, overrides: &EndpointOverride) {
        if let Some(path) = &overrides.path {
            self.path.clone_from(path);
        }
        if let Some(param) = &overrides.cursor_param {
            self.cursor_param.clone_from(param);
        }
        if let Some(param) = &overrides.page_size_param {
            self.page_size_param.clone_from(param);
        }
        if let Some(field) = &overrides.items_field {
            self.items_field.clone_from(field);
        }
        if let Some(field) = &overrides.next_cursor_field {
            self.next_cursor_field.clone_from(field);
        }
        if let Some(parts) = &overrides.cursor_parts {
            self.cursor_parts.clone_from(parts);
        }
        if let Some(field) = &overrides.truncated_field {
            self.truncated_field = Some(field.clone()).filter(|f| !f.is_empty());
        }
        if let Some(cap) = overrides.server_page_cap {
            self.server_page_cap = cap;
        }
    }

    /// Validate the description
    pub fn validate(&self, operation: ListOperation) -> Result<()> {
        let field = |name: &str| format!("endpoints.{operation}.{name}");

        if self.server_page_cap == 0 {
            return Err(Error::invalid_value(
                field("server_page_cap"),
                "must be greater than zero",
            ));
        }
        for (name, value) in [
            ("path", &self.path),
            ("cursor_param", &self.cursor_param),
            ("page_size_param", &self.page_size_param),
            ("items_field", &self.items_field),
            ("next_cursor_field", &self.next_cursor_field),
        ] {
            if value.trim().is_empty() {
                return Err(Error::invalid_value(field(name), "must not be empty"));
            }
        }
        if !self.path.starts_with('/') {
            return Err(Error::invalid_value(field("path"), "must start with '/'"));
        }
        for (index, part) in self.cursor_parts.iter().enumerate() {
            if part.param.trim().is_empty() || part.field.trim().is_empty() {
                return Err(Error::invalid_value(
                    field(&format!("cursor_parts[{index}]")),
                    "param and field must not be empty",
                ));
            }
            if self.cursor_params().filter(|p| *p == part.param).count() > 1 {
                return Err(Error::invalid_value(
                    field(&format!("cursor_parts[{index}]")),
                    format!("parameter '{}' is used twice", part.param),
                ));
            }
        }
        Ok(())
    }
}

/// Per-endpoint overrides accepted in the configuration file
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(deny_unknown_fields)]
pub struct EndpointOverride {
    #[serde(default)]
    pub path: Option<String>,
    #[serde(default)]
    pub cursor_param: Option<String>,
    #[serde(default)]
    pub page_size_param: Option<String>,
    #[serde(default)]
    pub items_field: Option<String>,
    #[serde(default)]
    pub next_cursor_field: Option<String>,
    /// Replaces the built-in cursor parts; an empty list makes the cursor single-valued
    #[serde(default)]
    pub cursor_parts: Option<Vec<CursorPart>>,
    /// Empty string disables the truncation check
    #[serde(default)]
    pub truncated_field: Option<String>,
    #[serde(default)]
    pub server_page_cap: Option<u32>,
}

/// Endpoint descriptions by operation
#[derive(Debug, Clone, PartialEq, Eq)]
pub struct EndpointRegistry {
    specs: HashMap<ListOperation, EndpointSpec>,
}

impl Default for EndpointRegistry {
    fn default() -> Self {
        Self::builtin()
    }
}

impl EndpointRegistry {
    /// Registry with the built-in descriptions
    pub fn builtin() -> Self {
        Self {
            specs: ListOperation::ALL
                .into_iter()
                .map(|op| (op, op.builtin_spec()))
                .collect(),
        }
    }

    /// Apply configuration overrides and validate the result
    pub fn with_overrides(
        mut self,
        overrides: &HashMap<ListOperation, EndpointOverride>,
    ) -> Result<Self> {
        for (operation, endpoint) in overrides {
            self.specs
                .entry(*operation)
                .or_insert_with(|| operation.builtin_spec())
                .apply(endpoint);
        }
        for (operation, spec) in &self.specs {
            spec.validate(*operation)?;
        }
        Ok(self)
    }

    /// Description for an operation
    pub fn get(&self, operation: ListOperation) -> &EndpointSpec {
        &self.specs[&operation]
    }

    /// All descriptions in display order
    pub fn iter(&self) -> impl Iterator<Item = (ListOperation, &EndpointSpec)> {
        ListOperation::ALL
            .into_iter()
            .filter_map(|op| self.specs.get(&op).map(|spec| (op, spec)))
    }
}
