//! Integration tests for the AWS client using wiremock
//!
//! A mock server stands in for every AWS endpoint (through the endpoint
//! override), so these tests cover request encoding, signing headers,
//! response decoding and error mapping for each protocol.

use aws_resolvers::aws::auth::Credentials;
use aws_resolvers::aws::http::ApiError;
use aws_resolvers::aws::{AwsClient, DescribeApi, DescribeCall, Parameters};
use aws_resolvers::{ResolveError, Resolver};
use serde_json::json;
use wiremock::matchers::{body_json, body_string_contains, header, header_exists, method, path};
use wiremock::{Mock, MockServer, ResponseTemplate};

fn client_for(server: &MockServer) -> AwsClient {
    AwsClient::new(Some("us-east-1"), Some(&server.uri()))
        .expect("client should build")
        .with_credentials(Credentials::new(
            "AKIDEXAMPLE",
            "wJalrXUtnFEMI/K7MDENG+bPxRfiCYEXAMPLEKEY",
            None,
            None,
            "test",
        ))
}

fn xml(body: &str) -> ResponseTemplate {
    ResponseTemplate::new(200).set_body_raw(body.to_string(), "text/xml")
}

const CACHE_CLUSTERS_XML: &str = r#"<DescribeCacheClustersResponse xmlns="http://elasticache.amazonaws.com/doc/2015-02-02/">
  <DescribeCacheClustersResult>
    <CacheClusters>
      <CacheCluster>
        <CacheClusterId>my-cluster</CacheClusterId>
        <Engine>redis</Engine>
        <CacheNodes>
          <CacheNode>
            <CacheNodeId>0001</CacheNodeId>
            <Endpoint><Address>10.0.0.5</Address><Port>6379</Port></Endpoint>
          </CacheNode>
        </CacheNodes>
      </CacheCluster>
    </CacheClusters>
  </DescribeCacheClustersResult>
  <ResponseMetadata><RequestId>r-1</RequestId></ResponseMetadata>
</DescribeCacheClustersResponse>"#;

const VPCS_XML: &str = r#"<DescribeVpcsResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>r-2</requestId>
  <vpcSet>
    <item>
      <vpcId>vpc-0a1b</vpcId>
      <ownerId>123456789012</ownerId>
      <cidrBlock>10.0.0.0/16</cidrBlock>
      <tagSet><item><key>Name</key><value>alpha</value></item></tagSet>
    </item>
  </vpcSet>
</DescribeVpcsResponse>"#;

const SECURITY_GROUPS_XML: &str = r#"<DescribeSecurityGroupsResponse xmlns="http://ec2.amazonaws.com/doc/2016-11-15/">
  <requestId>r-3</requestId>
  <securityGroupInfo>
    <item>
      <groupId>sg-0123</groupId>
      <groupName>web</groupName>
      <vpcId>vpc-0a1b</vpcId>
    </item>
  </securityGroupInfo>
</DescribeSecurityGroupsResponse>"#;

/// Test module for query protocol services (ElastiCache, EC2, RDS)
mod query_protocol_tests {
    use super::*;

    /// End-to-end: XML cache cluster response resolves to the node address
    #[tokio::test]
    async fn test_cache_cluster_endpoint_address() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header(
                "content-type",
                "application/x-www-form-urlencoded; charset=utf-8",
            ))
            .and(header_exists("authorization"))
            .and(header_exists("x-amz-date"))
            .and(body_string_contains("Action=DescribeCacheClusters"))
            .and(body_string_contains("CacheClusterId=my-cluster"))
            .and(body_string_contains("ShowCacheNodeInfo=true"))
            .respond_with(xml(CACHE_CLUSTERS_XML))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let value = resolver
            .resolve(
                "aws:ecs:my-cluster:CacheNodes[0].Endpoint.Address",
                Some("us-east-1"),
                true,
            )
            .await
            .expect("resolution should succeed");

        assert_eq!(value, Some(json!("10.0.0.5")));
    }

    /// Security groups: the VPC is looked up first and its id feeds the filter
    #[tokio::test]
    async fn test_security_group_composes_vpc_lookup() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeVpcs"))
            .and(body_string_contains("Filter.1.Name=tag-value"))
            .and(body_string_contains("Filter.1.Value.1=alpha"))
            .respond_with(xml(VPCS_XML))
            .expect(1)
            .mount(&server)
            .await;

        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeSecurityGroups"))
            .and(body_string_contains("Filter.1.Value.1=web"))
            .and(body_string_contains("Filter.2.Value.1=vpc-0a1b"))
            .respond_with(xml(SECURITY_GROUPS_XML))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let value = resolver
            .resolve("aws:ec2:securityGroup:alpha-web:GroupId", Some("us-east-1"), true)
            .await
            .expect("resolution should succeed");

        assert_eq!(value, Some(json!("sg-0123")));
    }

    /// EC2 responses are exposed with SDK-style keys
    #[tokio::test]
    async fn test_vpc_tags_use_sdk_names() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(xml(VPCS_XML))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let value = resolver
            .resolve("aws:ec2:vpc:alpha:Tags[0].Value", Some("us-east-1"), true)
            .await
            .unwrap();

        assert_eq!(value, Some(json!("alpha")));
    }

    /// Account ids stay strings; an empty tag set is an empty list
    #[tokio::test]
    async fn test_ec2_value_types() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeSubnets"))
            .respond_with(xml(
                "<DescribeSubnetsResponse><subnetSet><item>\
                 <subnetId>subnet-9</subnetId><ownerId>123456789012</ownerId>\
                 <availableIpAddressCount>251</availableIpAddressCount><tagSet/>\
                 </item></subnetSet></DescribeSubnetsResponse>",
            ))
            .mount(&server)
            .await;
        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeVpcs"))
            .respond_with(xml(VPCS_XML))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let region = Some("us-east-1");

        assert_eq!(
            resolver
                .resolve("aws:ec2:vpc:alpha:OwnerId", region, true)
                .await
                .unwrap(),
            Some(json!("123456789012"))
        );
        assert_eq!(
            resolver
                .resolve("aws:ec2:subnet:private-a:AvailableIpAddressCount", region, true)
                .await
                .unwrap(),
            Some(json!(251))
        );
        assert_eq!(
            resolver
                .resolve("aws:ec2:subnet:private-a:Tags", region, true)
                .await
                .unwrap(),
            Some(json!([]))
        );
    }

    /// A single VPC security group is still reachable by index
    #[tokio::test]
    async fn test_rds_single_security_group_is_a_list() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeDBInstances"))
            .respond_with(xml(
                "<DescribeDBInstancesResponse><DescribeDBInstancesResult><DBInstances>\
                 <DBInstance><DBInstanceIdentifier>orders</DBInstanceIdentifier>\
                 <Endpoint><Address>orders.abc.rds.amazonaws.com</Address><Port>5432</Port></Endpoint>\
                 <VpcSecurityGroups><VpcSecurityGroupMembership>\
                 <VpcSecurityGroupId>sg-1</VpcSecurityGroupId><Status>active</Status>\
                 </VpcSecurityGroupMembership></VpcSecurityGroups>\
                 </DBInstance></DBInstances></DescribeDBInstancesResult></DescribeDBInstancesResponse>",
            ))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        assert_eq!(
            resolver
                .resolve("aws:rds:orders:VpcSecurityGroups[0].VpcSecurityGroupId", Some("us-east-1"), true)
                .await
                .unwrap(),
            Some(json!("sg-1"))
        );
        assert_eq!(
            resolver
                .resolve("aws:rds:orders:Endpoint.Port", Some("us-east-1"), true)
                .await
                .unwrap(),
            Some(json!(5432))
        );
    }

    /// More than one DB instance is a hard error, even in non-strict mode
    #[tokio::test]
    async fn test_rds_multiplicity_is_hard() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(body_string_contains("Action=DescribeDBInstances"))
            .and(body_string_contains("DBInstanceIdentifier=orders"))
            .respond_with(xml(
                "<DescribeDBInstancesResponse><DescribeDBInstancesResult><DBInstances>\
                 <DBInstance><DBInstanceIdentifier>orders</DBInstanceIdentifier></DBInstance>\
                 <DBInstance><DBInstanceIdentifier>orders</DBInstanceIdentifier></DBInstance>\
                 </DBInstances></DescribeDBInstancesResult></DescribeDBInstancesResponse>",
            ))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let err = resolver
            .resolve("aws:rds:orders:Endpoint.Address", Some("us-east-1"), false)
            .await
            .unwrap_err();

        assert!(matches!(err, ResolveError::Ambiguous { count: 2, .. }));
    }

    /// 404 with an XML error body surfaces the AWS error code
    #[tokio::test]
    async fn test_rds_not_found_error_code() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(404).set_body_raw(
                "<ErrorResponse><Error><Type>Sender</Type><Code>DBInstanceNotFound</Code>\
                 <Message>DBInstance orders not found.</Message></Error></ErrorResponse>",
                "text/xml",
            ))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));

        let err = resolver
            .resolve("aws:rds:orders:Endpoint.Address", Some("us-east-1"), true)
            .await
            .unwrap_err();
        let ResolveError::Transport(inner) = &err else {
            panic!("expected transport error, got {:?}", err);
        };
        let api_error = inner.downcast_ref::<ApiError>().expect("should be an ApiError");
        assert_eq!(api_error.status, 404);
        assert_eq!(api_error.code.as_deref(), Some("DBInstanceNotFound"));

        let soft = resolver
            .resolve("aws:rds:orders:Endpoint.Address", Some("us-east-1"), false)
            .await
            .unwrap();
        assert_eq!(soft, None);
    }
}

/// Test module for JSON and REST-JSON services (Kinesis, DynamoDB, Elasticsearch)
mod json_protocol_tests {
    use super::*;

    /// Kinesis: JSON 1.1 with the target header
    #[tokio::test]
    async fn test_kinesis_stream_arn() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(path("/"))
            .and(header("x-amz-target", "Kinesis_20131202.DescribeStream"))
            .and(header("content-type", "application/x-amz-json-1.1"))
            .and(body_json(json!({"StreamName": "events"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "StreamDescription": {
                    "StreamName": "events",
                    "StreamARN": "arn:aws:kinesis:us-east-1:123456789012:stream/events",
                    "Shards": []
                }
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let value = resolver
            .resolve("aws:kinesis:events:StreamARN", Some("us-east-1"), true)
            .await
            .unwrap();

        assert_eq!(
            value,
            Some(json!("arn:aws:kinesis:us-east-1:123456789012:stream/events"))
        );
    }

    /// DynamoDB: JSON 1.0 with the target header
    #[tokio::test]
    async fn test_dynamodb_table_arn() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-target", "DynamoDB_20120810.DescribeTable"))
            .and(header("content-type", "application/x-amz-json-1.0"))
            .and(body_json(json!({"TableName": "orders"})))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Table": {
                    "TableName": "orders",
                    "TableArn": "arn:aws:dynamodb:us-east-1:123456789012:table/orders",
                    "ItemCount": 0
                }
            })))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        assert_eq!(
            resolver
                .resolve("aws:dynamodb:orders:TableArn", Some("us-east-1"), true)
                .await
                .unwrap(),
            Some(json!("arn:aws:dynamodb:us-east-1:123456789012:table/orders"))
        );
        // Present-but-falsy values are values
        assert_eq!(
            resolver
                .resolve("aws:dynamodb:orders:ItemCount", Some("us-east-1"), true)
                .await
                .unwrap(),
            Some(json!(0))
        );
    }

    /// Elasticsearch: REST GET on the domain path
    #[tokio::test]
    async fn test_search_domain_endpoint() {
        let server = MockServer::start().await;

        Mock::given(method("GET"))
            .and(path("/2015-01-01/es/domain/logs"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "DomainStatus": {
                    "DomainName": "logs",
                    "Endpoint": "search-logs-abc.us-east-1.es.amazonaws.com"
                }
            })))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        assert_eq!(
            resolver
                .resolve("aws:ess:logs:Endpoint", Some("us-east-1"), true)
                .await
                .unwrap(),
            Some(json!("search-logs-abc.us-east-1.es.amazonaws.com"))
        );
    }

    /// Throttling is passed through unchanged, with no retry
    #[tokio::test]
    async fn test_throttling_is_not_retried() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(400).set_body_json(json!({
                "__type": "com.amazonaws.dynamodb.v20120810#ThrottlingException",
                "message": "Rate exceeded"
            })))
            .expect(1)
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let err = resolver
            .resolve("aws:dynamodb:orders:TableArn", Some("us-east-1"), true)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "API request failed: 400 (ThrottlingException): Rate exceeded"
        );
    }

    /// A missing property lists what the record does have
    #[tokio::test]
    async fn test_missing_property_lists_candidates() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "StreamDescription": {"StreamARN": "arn", "StreamName": "events"}
            })))
            .mount(&server)
            .await;

        let resolver = Resolver::new(client_for(&server));
        let err = resolver
            .resolve("aws:kinesis:events:StreamArn", Some("us-east-1"), false)
            .await
            .unwrap_err();

        assert_eq!(
            err.to_string(),
            "Error resolving aws:kinesis:events:StreamArn. Key 'StreamArn' not found. \
             Candidates are StreamARN,StreamName"
        );
    }
}

/// Test module for request signing details
mod signing_tests {
    use super::*;

    /// Session tokens are sent alongside the signature
    #[tokio::test]
    async fn test_session_token_header() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(header("x-amz-security-token", "session-xyz"))
            .and(header_exists("authorization"))
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "Table": {"TableName": "orders"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let client = AwsClient::new(Some("us-east-1"), Some(&server.uri()))
            .unwrap()
            .with_credentials(Credentials::new(
                "AKID",
                "secret",
                Some("session-xyz".to_string()),
                None,
                "test",
            ));

        let response = client
            .describe(
                DescribeCall::Table {
                    table_name: "orders".into(),
                },
                &Parameters::for_region(Some("eu-west-1")),
            )
            .await
            .unwrap();

        assert_eq!(response["Table"]["TableName"], "orders");
    }

    /// The credential scope names the service and the call region
    #[tokio::test]
    async fn test_credential_scope_uses_call_region() {
        let server = MockServer::start().await;

        Mock::given(method("POST"))
            .and(|request: &wiremock::Request| {
                request
                    .headers
                    .get("authorization")
                    .and_then(|v| v.to_str().ok())
                    .is_some_and(|v| v.contains("/eu-west-1/kinesis/aws4_request"))
            })
            .respond_with(ResponseTemplate::new(200).set_body_json(json!({
                "StreamDescription": {"StreamName": "events"}
            })))
            .expect(1)
            .mount(&server)
            .await;

        let response = client_for(&server)
            .describe(
                DescribeCall::Stream {
                    stream_name: "events".into(),
                },
                &Parameters::for_region(Some("eu-west-1")),
            )
            .await
            .unwrap();

        assert_eq!(response["StreamDescription"]["StreamName"], "events");
    }
}
