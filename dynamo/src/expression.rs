use std::collections::HashMap;

use crate::types::{AttributeValue, Item};

/// Equality condition on a single top-level attribute.
#[derive(Debug, Clone, PartialEq)]
pub struct EqualsCondition {
    /// Attribute the condition applies to.
    pub path: String,
    /// Value the attribute must equal.
    pub value: AttributeValue,
}

/// Filter and projection plan for a table scan.
///
/// Built once per read and reused across every page request. The structured
/// form can be evaluated directly against items, which is what non-network
/// clients do; the network client renders it into the store's expression
/// syntax via [`ScanExpression::render`].
#[derive(Debug, Clone, Default, PartialEq)]
pub struct ScanExpression {
    filter: Option<EqualsCondition>,
    projection: Option<Vec<String>>,
}

impl ScanExpression {
    /// Returns a builder for assembling an expression.
    pub fn builder() -> ScanExpressionBuilder {
        ScanExpressionBuilder::default()
    }

    /// Returns the equality condition, if one was set.
    pub fn filter(&self) -> Option<&EqualsCondition> {
        self.filter.as_ref()
    }

    /// Returns the projected attribute names, if a projection was set.
    pub fn projection(&self) -> Option<&[String]> {
        self.projection.as_deref()
    }

    /// Returns whether the item satisfies the filter condition.
    ///
    /// An expression without a filter matches every item.
    pub fn matches(&self, item: &Item) -> bool {
        match &self.filter {
            Some(condition) => item.get(&condition.path) == Some(&condition.value),
            None => true,
        }
    }

    /// Returns a copy of the item narrowed to the projected attributes.
    ///
    /// Attributes absent from the item are simply omitted, matching the
    /// store's projection semantics.
    pub fn project(&self, item: &Item) -> Item {
        match &self.projection {
            Some(fields) => fields
                .iter()
                .filter_map(|field| {
                    item.get(field)
                        .map(|value| (field.clone(), value.clone()))
                })
                .collect(),
            None => item.clone(),
        }
    }

    /// Renders the expression into the store's wire syntax.
    ///
    /// Every referenced attribute name is aliased (`#n0`, `#n1`, ...) so
    /// reserved words like `name` stay usable, and the filter value is bound
    /// through a placeholder (`:v0`). An attribute referenced by both the
    /// filter and the projection reuses one alias.
    pub fn render(&self) -> RenderedScanExpression {
        let mut aliases = NameAliases::default();
        let mut expression_attribute_values = HashMap::new();

        let filter_expression = self.filter.as_ref().map(|condition| {
            let alias = aliases.alias(&condition.path);
            expression_attribute_values.insert(":v0".to_string(), condition.value.clone());

            format!("{alias} = :v0")
        });

        let projection_expression = self.projection.as_ref().map(|fields| {
            fields
                .iter()
                .map(|field| aliases.alias(field))
                .collect::<Vec<_>>()
                .join(", ")
        });

        RenderedScanExpression {
            filter_expression,
            projection_expression,
            expression_attribute_names: aliases.names,
            expression_attribute_values,
        }
    }
}

/// Builder for [`ScanExpression`].
#[derive(Debug, Default)]
pub struct ScanExpressionBuilder {
    filter: Option<EqualsCondition>,
    projection: Option<Vec<String>>,
}

impl ScanExpressionBuilder {
    /// Filters the scan to items whose attribute equals the given value.
    pub fn with_equals(mut self, path: impl Into<String>, value: AttributeValue) -> Self {
        self.filter = Some(EqualsCondition {
            path: path.into(),
            value,
        });
        self
    }

    /// Narrows returned items to the given attributes.
    pub fn with_projection<I, S>(mut self, fields: I) -> Self
    where
        I: IntoIterator<Item = S>,
        S: Into<String>,
    {
        self.projection = Some(fields.into_iter().map(Into::into).collect());
        self
    }

    /// Finalizes the expression.
    pub fn build(self) -> ScanExpression {
        ScanExpression {
            filter: self.filter,
            projection: self.projection,
        }
    }
}

/// Wire form of a [`ScanExpression`], ready to attach to a scan request.
#[derive(Debug, Clone, Default, PartialEq)]
pub struct RenderedScanExpression {
    /// Filter clause, e.g. `#n0 = :v0`.
    pub filter_expression: Option<String>,
    /// Projection clause, e.g. `#n1, #n2`.
    pub projection_expression: Option<String>,
    /// Alias to attribute name bindings referenced by the clauses.
    pub expression_attribute_names: HashMap<String, String>,
    /// Placeholder to value bindings referenced by the filter clause.
    pub expression_attribute_values: HashMap<String, AttributeValue>,
}

#[derive(Debug, Default)]
struct NameAliases {
    by_path: HashMap<String, String>,
    names: HashMap<String, String>,
}

impl NameAliases {
    fn alias(&mut self, path: &str) -> String {
        if let Some(alias) = self.by_path.get(path) {
            return alias.clone();
        }

        let alias = format!("#n{}", self.by_path.len());
        self.by_path.insert(path.to_string(), alias.clone());
        self.names.insert(alias.clone(), path.to_string());

        alias
    }
}

#[cfg(test)]
mod tests {
    use super::*;

    fn user_item(user_id: i64, platform: &str, name: &str) -> Item {
        Item::from([
            ("user_id".to_string(), AttributeValue::from(user_id)),
            ("platform".to_string(), AttributeValue::from(platform)),
            ("name".to_string(), AttributeValue::from(name)),
        ])
    }

    #[test]
    fn empty_expression_matches_everything_and_projects_nothing_away() {
        let expression = ScanExpression::default();
        let item = user_item(1, "ios", "alice");

        assert!(expression.matches(&item));
        assert_eq!(expression.project(&item), item);
    }

    #[test]
    fn equality_filter_matches_only_equal_values() {
        let expression = ScanExpression::builder()
            .with_equals("platform", AttributeValue::from("ios"))
            .build();

        assert!(expression.matches(&user_item(1, "ios", "alice")));
        assert!(!expression.matches(&user_item(2, "android", "bob")));
        assert!(!expression.matches(&Item::new()));
    }

    #[test]
    fn projection_narrows_items_and_skips_absent_attributes() {
        let expression = ScanExpression::builder()
            .with_projection(["user_id", "name", "missing"])
            .build();

        let projected = expression.project(&user_item(1, "ios", "alice"));

        assert_eq!(projected.len(), 2);
        assert!(projected.contains_key("user_id"));
        assert!(projected.contains_key("name"));
        assert!(!projected.contains_key("platform"));
    }

    #[test]
    fn render_aliases_names_and_binds_the_filter_value() {
        let expression = ScanExpression::builder()
            .with_equals("platform", AttributeValue::from("ios"))
            .with_projection(["user_id", "name"])
            .build();

        let rendered = expression.render();

        assert_eq!(rendered.filter_expression.as_deref(), Some("#n0 = :v0"));
        assert_eq!(rendered.projection_expression.as_deref(), Some("#n1, #n2"));
        assert_eq!(
            rendered.expression_attribute_names,
            HashMap::from([
                ("#n0".to_string(), "platform".to_string()),
                ("#n1".to_string(), "user_id".to_string()),
                ("#n2".to_string(), "name".to_string()),
            ])
        );
        assert_eq!(
            rendered.expression_attribute_values,
            HashMap::from([(":v0".to_string(), AttributeValue::from("ios"))])
        );
    }

    #[test]
    fn render_reuses_aliases_for_repeated_attributes() {
        let expression = ScanExpression::builder()
            .with_equals("user_id", AttributeValue::from(9))
            .with_projection(["user_id", "name"])
            .build();

        let rendered = expression.render();

        assert_eq!(rendered.filter_expression.as_deref(), Some("#n0 = :v0"));
        assert_eq!(rendered.projection_expression.as_deref(), Some("#n0, #n1"));
        assert_eq!(rendered.expression_attribute_names.len(), 2);
    }

    #[test]
    fn render_of_empty_expression_is_empty() {
        let rendered = ScanExpression::default().render();

        assert!(rendered.filter_expression.is_none());
        assert!(rendered.projection_expression.is_none());
        assert!(rendered.expression_attribute_names.is_empty());
        assert!(rendered.expression_attribute_values.is_empty());
    }
}
