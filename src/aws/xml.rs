//! Query protocol responses (ElastiCache, EC2, RDS) come back as XML. This
//! module turns them into the same `serde_json::Value` trees the SDK output
//! would serialize to, so property paths work the same way for every service.
//!
//! XML alone cannot tell a one-item list from a nested structure, or the
//! string `"6"` from the integer `6`. Each service therefore carries a
//! [`Shapes`] table taken from its API model for the describe calls issued
//! here: list members are always arrays (empty ones included), integer and
//! boolean members are typed, every other leaf stays a string.

use super::AwsService;
use anyhow::{anyhow, Context, Result};
use quick_xml::events::Event;
use quick_xml::Reader;
use serde_json::{Map, Value};

/// Member types of a service's describe responses, by XML element name
#[derive(Debug)]
pub struct Shapes {
    /// List members, whatever their item element is called
    pub lists: &'static [&'static str],
    pub integers: &'static [&'static str],
    pub booleans: &'static [&'static str],
}

impl Shapes {
    fn is_list(&self, name: &str) -> bool {
        self.lists.contains(&name)
    }

    fn scalar(&self, name: &str, text: String) -> Value {
        if self.integers.contains(&name) {
            if let Ok(n) = text.parse::<i64>() {
                return Value::from(n);
            }
        } else if self.booleans.contains(&name) {
            match text.as_str() {
                "true" => return Value::Bool(true),
                "false" => return Value::Bool(false),
                _ => {}
            }
        }
        Value::String(text)
    }
}

/// ElastiCache `DescribeCacheClusters`
pub const ELASTICACHE: Shapes = Shapes {
    lists: &[
        "CacheClusters",
        "CacheNodes",
        "CacheSecurityGroups",
        "SecurityGroups",
        "CacheNodeIdsToRemove",
        "CacheNodeIdsToReboot",
        "LogDeliveryConfigurations",
    ],
    integers: &["NumCacheNodes", "Port", "SnapshotRetentionLimit"],
    booleans: &[
        "AutoMinorVersionUpgrade",
        "AuthTokenEnabled",
        "TransitEncryptionEnabled",
        "AtRestEncryptionEnabled",
        "ReplicationGroupLogDeliveryEnabled",
    ],
};

/// RDS `DescribeDBInstances`
pub const RDS: Shapes = Shapes {
    lists: &[
        "DBInstances",
        "DBSecurityGroups",
        "VpcSecurityGroups",
        "DBParameterGroups",
        "Subnets",
        "SupportedNetworkTypes",
        "ReadReplicaDBInstanceIdentifiers",
        "ReadReplicaDBClusterIdentifiers",
        "OptionGroupMemberships",
        "StatusInfos",
        "DomainMemberships",
        "DnsIps",
        "EnabledCloudwatchLogsExports",
        "LogTypesToEnable",
        "LogTypesToDisable",
        "ProcessorFeatures",
        "AssociatedRoles",
        "TagList",
        "DBInstanceAutomatedBackupsReplications",
    ],
    integers: &[
        "AllocatedStorage",
        "BackupRetentionPeriod",
        "Port",
        "DbInstancePort",
        "Iops",
        "MonitoringInterval",
        "PromotionTier",
        "PerformanceInsightsRetentionPeriod",
        "MaxAllocatedStorage",
        "StorageThroughput",
    ],
    booleans: &[
        "MultiAZ",
        "AutoMinorVersionUpgrade",
        "PubliclyAccessible",
        "StorageEncrypted",
        "CopyTagsToSnapshot",
        "IAMDatabaseAuthenticationEnabled",
        "PerformanceInsightsEnabled",
        "DeletionProtection",
        "CustomerOwnedIpEnabled",
        "Normal",
        "DedicatedLogVolume",
        "MultiTenant",
        "IsStorageConfigUpgradeAvailable",
    ],
};

/// EC2 `DescribeVpcs`, `DescribeSubnets`, `DescribeSecurityGroups` (wire names)
pub const EC2: Shapes = Shapes {
    lists: &[
        "vpcSet",
        "subnetSet",
        "securityGroupInfo",
        "tagSet",
        "cidrBlockAssociationSet",
        "ipv6CidrBlockAssociationSet",
        "ipPermissions",
        "ipPermissionsEgress",
        "ipRanges",
        "ipv6Ranges",
        "prefixListIds",
        "groups",
    ],
    integers: &["availableIpAddressCount", "fromPort", "toPort", "enableLniAtDeviceIndex"],
    booleans: &[
        "isDefault",
        "defaultForAz",
        "mapPublicIpOnLaunch",
        "mapCustomerOwnedIpOnLaunch",
        "assignIpv6AddressOnCreation",
        "enableDns64",
        "ipv6Native",
        "enableResourceNameDnsARecord",
        "enableResourceNameDnsAAAARecord",
    ],
};

const NO_SHAPES: Shapes = Shapes {
    lists: &[],
    integers: &[],
    booleans: &[],
};

/// Shape table for a Query protocol service
pub fn shapes_for(service: AwsService) -> &'static Shapes {
    match service {
        AwsService::ElastiCache => &ELASTICACHE,
        AwsService::Rds => &RDS,
        AwsService::Ec2 => &EC2,
        _ => &NO_SHAPES,
    }
}

struct Node {
    name: String,
    children: Vec<(String, Value)>,
    text: String,
}

impl Node {
    fn new(name: String) -> Self {
        Self {
            name,
            children: Vec::new(),
            text: String::new(),
        }
    }

    fn into_value(self, shapes: &Shapes) -> Value {
        if shapes.is_list(&self.name) {
            return Value::Array(self.children.into_iter().map(|(_, v)| v).collect());
        }
        if self.children.is_empty() {
            // An empty element is a structure with no members set
            if self.text.is_empty() {
                return Value::Object(Map::new());
            }
            return shapes.scalar(&self.name, self.text);
        }

        let mut map = Map::new();
        for (name, value) in self.children {
            match map.get_mut(&name) {
                Some(Value::Array(items)) => items.push(value),
                Some(existing) => {
                    let first = existing.take();
                    *existing = Value::Array(vec![first, value]);
                }
                None => {
                    map.insert(name, value);
                }
            }
        }
        Value::Object(map)
    }
}

fn local_name(raw: &[u8]) -> String {
    String::from_utf8_lossy(raw).into_owned()
}

/// Parse a document, returning the root element name and its converted content
pub fn parse_document(xml: &str, shapes: &Shapes) -> Result<(String, Value)> {
    let mut reader = Reader::from_str(xml);
    reader.config_mut().trim_text(true);

    let mut stack: Vec<Node> = Vec::new();

    loop {
        let event = reader
            .read_event()
            .with_context(|| format!("Malformed XML at position {}", reader.buffer_position()))?;

        let node = match event {
            Event::Start(e) => {
                stack.push(Node::new(local_name(e.local_name().as_ref())));
                continue;
            }
            Event::Empty(e) => Node::new(local_name(e.local_name().as_ref())),
            Event::Text(t) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&t.unescape().context("Invalid XML text")?);
                }
                continue;
            }
            Event::CData(c) => {
                if let Some(node) = stack.last_mut() {
                    node.text.push_str(&String::from_utf8_lossy(&c.into_inner()));
                }
                continue;
            }
            Event::End(_) => stack
                .pop()
                .ok_or_else(|| anyhow!("Unbalanced closing tag in XML response"))?,
            Event::Eof => return Err(anyhow!("XML response ended before the root element closed")),
            _ => continue,
        };

        let name = node.name.clone();
        let value = node.into_value(shapes);
        match stack.last_mut() {
            Some(parent) => parent.children.push((name, value)),
            None => return Ok((name, value)),
        }
    }
}

/// Extract the `<{Action}Result>` payload of an ElastiCache/RDS response
pub fn query_result(xml: &str, action: &str, shapes: &Shapes) -> Result<Value> {
    let (_, mut root) = parse_document(xml, shapes)?;
    let result_name = format!("{}Result", action);
    Ok(root
        .get_mut(&result_name)
        .map(Value::take)
        .unwrap_or_else(|| Value::Object(Map::new())))
}

/// EC2 wire names whose SDK name is not just the capitalized element name
const EC2_RENAMES: &[(&str, &str)] = &[
    ("vpcSet", "Vpcs"),
    ("subnetSet", "Subnets"),
    ("securityGroupInfo", "SecurityGroups"),
    ("tagSet", "Tags"),
    ("groups", "UserIdGroupPairs"),
];

/// Convert an EC2 response (lowerCamel elements) into SDK-style UpperCamel keys
pub fn ec2_response(xml: &str) -> Result<Value> {
    let (_, root) = parse_document(xml, &EC2)?;
    Ok(normalize_ec2(root))
}

fn normalize_ec2(value: Value) -> Value {
    match value {
        Value::Object(map) => Value::Object(
            map.into_iter()
                .map(|(key, v)| (ec2_key(&key), normalize_ec2(v)))
                .collect(),
        ),
        Value::Array(items) => Value::Array(items.into_iter().map(normalize_ec2).collect()),
        other => other,
    }
}

fn ec2_key(key: &str) -> String {
    if let Some((_, renamed)) = EC2_RENAMES.iter().find(|(from, _)| *from == key) {
        return renamed.to_string();
    }
    let mut chars = key.chars();
    match chars.next() {
        Some(first) => first.to_uppercase().chain(chars).collect(),
        None => String::new(),
    }
}
