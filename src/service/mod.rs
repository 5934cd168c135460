//! Service module
//!
//! The provider's paged list operations: endpoint descriptions, typed
//! records, the HTTP page fetcher and the client that drives them through
//! the pager.

mod client;
mod cursor;
mod endpoints;
mod fetcher;
mod models;

pub use client::{Client, EndpointPager, ListOptions};
pub use endpoints::{
    CursorPart, EndpointOverride, EndpointRegistry, EndpointSpec, ListOperation,
};
pub use fetcher::{parse_page, EndpointFetcher};
pub use models::{
    CidrCollection, DelegationSet, HealthCheck, HealthCheckConfig, HostedZone, HostedZoneConfig,
    HostedZoneOwner, HostedZoneSummary, ListItem, ObjectSummary, TrafficPolicyInstance,
    TrafficPolicySummary,
};
