//! Typed records returned by the list operations
//!
//! Field names follow the provider's response documents. Unknown fields are
//! ignored so newer service versions keep decoding.

use super::endpoints::ListOperation;
use chrono::{DateTime, Utc};
use serde::de::DeserializeOwned;
use serde::{Deserialize, Serialize};

/// A record type that belongs to one list operation
pub trait ListItem: DeserializeOwned + Send {
    /// Operation producing this record
    const OPERATION: ListOperation;
}

// ============================================================================
// Hosted Zones
// ============================================================================

/// A hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZone {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub caller_reference: Option<String>,
    #[serde(default)]
    pub config: Option<HostedZoneConfig>,
    #[serde(default)]
    pub resource_record_set_count: Option<u64>,
}

/// Hosted zone settings
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneConfig {
    #[serde(default)]
    pub comment: Option<String>,
    #[serde(default)]
    pub private_zone: bool,
}

impl HostedZone {
    /// Check if the zone is private
    pub fn is_private(&self) -> bool {
        self.config.as_ref().is_some_and(|c| c.private_zone)
    }
}

impl ListItem for HostedZone {
    const OPERATION: ListOperation = ListOperation::HostedZones;
}

/// A hosted zone associated with a VPC
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneSummary {
    pub hosted_zone_id: String,
    pub name: String,
    #[serde(default)]
    pub owner: Option<HostedZoneOwner>,
}

/// Account or service owning a hosted zone
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HostedZoneOwner {
    #[serde(default)]
    pub owning_account: Option<String>,
    #[serde(default)]
    pub owning_service: Option<String>,
}

impl ListItem for HostedZoneSummary {
    const OPERATION: ListOperation = ListOperation::HostedZonesByVpc;
}

// ============================================================================
// Delegation Sets
// ============================================================================

/// A reusable set of name servers
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct DelegationSet {
    #[serde(default)]
    pub id: Option<String>,
    #[serde(default)]
    pub caller_reference: Option<String>,
    #[serde(default)]
    pub name_servers: Vec<String>,
}

impl ListItem for DelegationSet {
    const OPERATION: ListOperation = ListOperation::ReusableDelegationSets;
}

// ============================================================================
// Health Checks
// ============================================================================

/// A health check
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheck {
    pub id: String,
    #[serde(default)]
    pub caller_reference: Option<String>,
    #[serde(default)]
    pub health_check_config: Option<HealthCheckConfig>,
    #[serde(default)]
    pub health_check_version: Option<u64>,
}

/// Health check target and protocol
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct HealthCheckConfig {
    #[serde(rename = "Type")]
    pub check_type: String,
    #[serde(default)]
    pub fully_qualified_domain_name: Option<String>,
    #[serde(default, rename = "IPAddress")]
    pub ip_address: Option<String>,
    #[serde(default)]
    pub port: Option<u16>,
    #[serde(default)]
    pub resource_path: Option<String>,
}

impl ListItem for HealthCheck {
    const OPERATION: ListOperation = ListOperation::HealthChecks;
}

// ============================================================================
// Traffic Policies
// ============================================================================

/// Latest version of a traffic policy
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficPolicySummary {
    pub id: String,
    pub name: String,
    #[serde(rename = "Type")]
    pub record_type: String,
    pub latest_version: u32,
    pub traffic_policy_count: u32,
}

impl ListItem for TrafficPolicySummary {
    const OPERATION: ListOperation = ListOperation::TrafficPolicies;
}

/// A traffic policy applied to a record name
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct TrafficPolicyInstance {
    pub id: String,
    pub hosted_zone_id: String,
    pub name: String,
    #[serde(default, rename = "TTL")]
    pub ttl: Option<u64>,
    #[serde(default)]
    pub state: Option<String>,
    #[serde(default)]
    pub message: Option<String>,
    pub traffic_policy_id: String,
    pub traffic_policy_version: u32,
    #[serde(default)]
    pub traffic_policy_type: Option<String>,
}

impl ListItem for TrafficPolicyInstance {
    const OPERATION: ListOperation = ListOperation::TrafficPolicyInstances;
}

// ============================================================================
// CIDR Collections
// ============================================================================

/// A CIDR collection
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct CidrCollection {
    pub id: String,
    pub name: String,
    #[serde(default)]
    pub arn: Option<String>,
    #[serde(default)]
    pub version: Option<u64>,
}

impl ListItem for CidrCollection {
    const OPERATION: ListOperation = ListOperation::CidrCollections;
}

// ============================================================================
// Objects
// ============================================================================

/// An object in a storage bucket
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(rename_all = "PascalCase")]
pub struct ObjectSummary {
    pub key: String,
    #[serde(default)]
    pub last_modified: Option<DateTime<Utc>>,
    #[serde(default)]
    pub size: u64,
    #[serde(default, rename = "ETag")]
    pub e_tag: Option<String>,
    #[serde(default)]
    pub storage_class: Option<String>,
}

impl ListItem for ObjectSummary {
    const OPERATION: ListOperation = ListOperation::Objects;
}
