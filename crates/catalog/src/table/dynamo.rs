//! DynamoDB catalog table.
//!
//! Items are keyed by `id` and carry two global secondary indexes:
//! `fileName-index` (partition key `fileName`) and `media-createdAt-index`
//! (partition key `media`, sort key `createdAt`). Both queries are paginated
//! and collected in full.

use crate::error::{ErrorKind, Result};
use crate::{CatalogRecord, CatalogTable};
use async_trait::async_trait;
use aws_config::SdkConfig;
use aws_sdk_dynamodb::{Client, error::DisplayErrorContext, types::AttributeValue};
use exn::OptionExt;
use std::collections::HashMap;

type Item = HashMap<String, AttributeValue>;

/// DynamoDB catalog table.
///
/// # Examples
///
/// ```no_run
/// use sublog_catalog::table::DynamoTable;
///
/// # async fn example() {
/// let sdk_config = aws_config::load_defaults(aws_config::BehaviorVersion::latest()).await;
/// let table = DynamoTable::new(&sdk_config, "sublog", "fileName-index", "media-createdAt-index");
/// # }
/// ```
#[derive(Debug, Clone)]
pub struct DynamoTable {
    client: Client,
    table: String,
    file_name_index: String,
    media_index: String,
}

impl DynamoTable {
    pub fn new(
        sdk_config: &SdkConfig,
        table: impl Into<String>,
        file_name_index: impl Into<String>,
        media_index: impl Into<String>,
    ) -> Self {
        Self::from_client(Client::new(sdk_config), table, file_name_index, media_index)
    }

    /// Wrap an already configured client.
    pub fn from_client(
        client: Client,
        table: impl Into<String>,
        file_name_index: impl Into<String>,
        media_index: impl Into<String>,
    ) -> Self {
        Self {
            client,
            table: table.into(),
            file_name_index: file_name_index.into(),
            media_index: media_index.into(),
        }
    }

    fn service(err: impl std::error::Error) -> ErrorKind {
        ErrorKind::Service(DisplayErrorContext(err).to_string())
    }

    /// Query a secondary index by its partition key and convert every item.
    async fn query_index(&self, index: &str, attribute: &str, value: &str) -> Result<Vec<CatalogRecord>> {
        let items: Vec<Item> = self
            .client
            .query()
            .table_name(&self.table)
            .index_name(index)
            .key_condition_expression("#k = :v")
            .expression_attribute_names("#k", attribute)
            .expression_attribute_values(":v", AttributeValue::S(value.to_string()))
            .into_paginator()
            .items()
            .send()
            .try_collect()
            .await
            .map_err(Self::service)?;
        tracing::debug!(table = %self.table, index, attribute, value, count = items.len(), "Queried catalog index");
        let mut records = items.iter().map(from_item).collect::<Result<Vec<_>>>()?;
        // `fileName-index` has no sort key.
        records.sort_by(|a, b| a.created_at.cmp(&b.created_at));
        Ok(records)
    }
}

#[async_trait]
impl CatalogTable for DynamoTable {
    fn name(&self) -> &str {
        &self.table
    }

    async fn query_by_file_name(&self, file_name: &str) -> Result<Vec<CatalogRecord>> {
        self.query_index(&self.file_name_index, "fileName", file_name).await
    }

    async fn query_by_media(&self, media: &str) -> Result<Vec<CatalogRecord>> {
        self.query_index(&self.media_index, "media", media).await
    }

    async fn put_item(&self, record: &CatalogRecord) -> Result<()> {
        self.client
            .put_item()
            .table_name(&self.table)
            .set_item(Some(to_item(record)))
            .send()
            .await
            .map_err(Self::service)?;
        Ok(())
    }

    async fn delete_item(&self, id: &str) -> Result<()> {
        self.client
            .delete_item()
            .table_name(&self.table)
            .key("id", AttributeValue::S(id.to_string()))
            .send()
            .await
            .map_err(Self::service)?;
        Ok(())
    }
}

fn to_item(record: &CatalogRecord) -> Item {
    fn s(value: &str) -> AttributeValue {
        AttributeValue::S(value.to_string())
    }
    HashMap::from([
        ("id".to_string(), s(&record.id)),
        ("fileName".to_string(), s(&record.file_name)),
        ("media".to_string(), s(&record.media)),
        ("category".to_string(), s(&record.category)),
        ("tag".to_string(), AttributeValue::L(record.tag.iter().map(|t| s(t)).collect())),
        ("title".to_string(), s(&record.title)),
        ("createdAt".to_string(), s(&record.created_at)),
        ("updatedAt".to_string(), s(&record.updated_at)),
        ("eyeCatchURL".to_string(), s(&record.eye_catch_url)),
    ])
}

fn string_attribute(item: &Item, name: &'static str) -> Result<String> {
    let value = item.get(name).ok_or_raise(|| ErrorKind::InvalidItem(name))?;
    Ok(value.as_s().ok().ok_or_raise(|| ErrorKind::InvalidItem(name))?.clone())
}

/// Attributes every update rewrites. A damaged value decodes as empty so the
/// row stays reachable for repair or deletion.
fn lenient_string_attribute(item: &Item, id: &str, name: &'static str) -> String {
    match item.get(name).and_then(|value| value.as_s().ok()) {
        Some(value) => value.clone(),
        None => {
            tracing::warn!(id, attribute = name, "Catalog item has a missing or mistyped attribute");
            String::new()
        },
    }
}

/// Tags are written as a list of strings. String sets are accepted too, and
/// a missing attribute is an empty list (DynamoDB cannot store empty sets).
fn tag_attribute(item: &Item, id: &str) -> Vec<String> {
    let tags = match item.get("tag") {
        None => Some(Vec::new()),
        Some(AttributeValue::Ss(tags)) => Some(tags.clone()),
        Some(AttributeValue::L(values)) => values.iter().map(|v| v.as_s().ok().cloned()).collect(),
        Some(_) => None,
    };
    tags.unwrap_or_else(|| {
        tracing::warn!(id, attribute = "tag", "Catalog item has a missing or mistyped attribute");
        Vec::new()
    })
}

/// Only the key attributes are required.
fn from_item(item: &Item) -> Result<CatalogRecord> {
    let id = string_attribute(item, "id")?;
    let file_name = string_attribute(item, "fileName")?;
    Ok(CatalogRecord {
        media: lenient_string_attribute(item, &id, "media"),
        category: lenient_string_attribute(item, &id, "category"),
        tag: tag_attribute(item, &id),
        title: lenient_string_attribute(item, &id, "title"),
        created_at: lenient_string_attribute(item, &id, "createdAt"),
        updated_at: lenient_string_attribute(item, &id, "updatedAt"),
        eye_catch_url: lenient_string_attribute(item, &id, "eyeCatchURL"),
        id,
        file_name,
    })
}

#[cfg(test)]
mod tests {
    use super::*;
    use crate::record::fixtures::record;
    use aws_sdk_dynamodb::operation::{
        delete_item::DeleteItemOutput, put_item::PutItemOutput, query::QueryOutput,
    };
    use aws_smithy_mocks::{mock, mock_client};
    use rstest::rstest;

    fn table(client: Client) -> DynamoTable {
        DynamoTable::from_client(client, "sublog", "fileName-index", "media-createdAt-index")
    }

    #[test]
    fn test_item_conversion_round_trip() {
        let record = record("id-1", "hello");
        let item = to_item(&record);
        assert!(matches!(item.get("tag"), Some(AttributeValue::L(_))));
        assert_eq!(from_item(&item).unwrap(), record);
    }

    #[test]
    fn test_string_set_tags_are_accepted() {
        let mut item = to_item(&record("id-1", "hello"));
        item.insert("tag".to_string(), AttributeValue::Ss(vec!["aws".to_string(), "rust".to_string()]));
        assert_eq!(from_item(&item).unwrap().tag, vec!["aws", "rust"]);
        item.remove("tag");
        assert!(from_item(&item).unwrap().tag.is_empty());
    }

    #[rstest]
    #[case("id")]
    #[case("fileName")]
    fn test_missing_key_attribute(#[case] attribute: &'static str) {
        let mut item = to_item(&record("id-1", "hello"));
        item.remove(attribute);
        let err = from_item(&item).unwrap_err();
        assert!(matches!(&*err, ErrorKind::InvalidItem(name) if *name == attribute));
    }

    #[test]
    fn test_mistyped_key_attribute() {
        let mut item = to_item(&record("id-1", "hello"));
        item.insert("id".to_string(), AttributeValue::N("1".to_string()));
        assert!(from_item(&item).is_err());
    }

    #[rstest]
    #[case("media")]
    #[case("category")]
    #[case("title")]
    #[case("createdAt")]
    #[case("updatedAt")]
    #[case("eyeCatchURL")]
    fn test_damaged_attribute_decodes_as_empty(#[case] attribute: &str) {
        let mut item = to_item(&record("id-1", "hello"));
        item.remove(attribute);
        let decoded = from_item(&item).unwrap();
        assert_eq!((decoded.id.as_str(), decoded.file_name.as_str()), ("id-1", "hello"));
        let mut expected = to_item(&record("id-1", "hello"));
        expected.insert(attribute.to_string(), AttributeValue::S(String::new()));
        assert_eq!(decoded, from_item(&expected).unwrap());
    }

    #[test]
    fn test_mistyped_tag_decodes_as_empty() {
        let mut item = to_item(&record("id-1", "hello"));
        item.insert("tag".to_string(), AttributeValue::S("rust".to_string()));
        assert!(from_item(&item).unwrap().tag.is_empty());
        item.insert("tag".to_string(), AttributeValue::L(vec![AttributeValue::N("1".to_string())]));
        assert!(from_item(&item).unwrap().tag.is_empty());
    }

    #[tokio::test]
    async fn test_query_returns_damaged_rows() {
        let rule = mock!(Client::query).then_output(|| {
            let mut item = to_item(&record("id-1", "hello"));
            item.remove("updatedAt");
            item.remove("category");
            QueryOutput::builder().items(item).build()
        });
        let client = mock_client!(aws_sdk_dynamodb, [&rule]);
        let records = table(client).query_by_file_name("hello").await.unwrap();
        assert_eq!(records.len(), 1);
        assert_eq!(records[0].id, "id-1");
        assert_eq!(records[0].updated_at, "");
        assert_eq!(records[0].category, "");
    }

    #[tokio::test]
    async fn test_query_by_file_name_uses_index() {
        let rule = mock!(Client::query)
            .match_requests(|req| req.index_name() == Some("fileName-index"))
            .then_output(|| QueryOutput::builder().items(to_item(&record("id-1", "hello"))).build());
        let client = mock_client!(aws_sdk_dynamodb, [&rule]);
        let records = table(client).query_by_file_name("hello").await.unwrap();
        assert_eq!(records, vec![record("id-1", "hello")]);
    }

    #[tokio::test]
    async fn test_put_item_writes_full_item() {
        let rule = mock!(Client::put_item)
            .match_requests(|req| {
                req.table_name() == Some("sublog")
                    && req.item().and_then(|item| item.get("fileName")).and_then(|v| v.as_s().ok())
                        == Some(&"hello".to_string())
            })
            .then_output(|| PutItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&rule]);
        table(client).put_item(&record("id-1", "hello")).await.unwrap();
        assert_eq!(rule.num_calls(), 1);
    }

    #[tokio::test]
    async fn test_delete_item_by_id() {
        let rule = mock!(Client::delete_item)
            .match_requests(|req| {
                req.key().and_then(|key| key.get("id")).and_then(|v| v.as_s().ok()) == Some(&"id-1".to_string())
            })
            .then_output(|| DeleteItemOutput::builder().build());
        let client = mock_client!(aws_sdk_dynamodb, [&rule]);
        table(client).delete_item("id-1").await.unwrap();
        assert_eq!(rule.num_calls(), 1);
    }
}
