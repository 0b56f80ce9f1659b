//! Grid Filters
//!
//! Filters are the payload of every grid query. A [`Condition`] constrains a
//! single attribute, a [`FilterExpression`] ANDs conditions together, and a
//! [`SearchFilterExpression`] ANDs a base expression with an OR-group used for
//! quick search.
//!
//! Field names on the wire match the backend's filter model
//! (`Conditions`, `Attribute`, `Values`, `Operator`, `Filter`, `GroupOperator`).

use gq_core::error::GridError;
use serde::{Deserialize, Serialize};

/// Filter operators understood by the backend.
///
/// The backend identifies operators by integer code. Codes are checked when a
/// value enters the system so an unknown code never reaches the backend.
#[derive(Debug, Clone, Copy, PartialEq, Eq, Hash, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum FilterOperator {
    /// Less than (1)
    LessThan,
    /// Less than or equal (2)
    LessThanOrEqual,
    /// Greater than (3)
    GreaterThan,
    /// Greater than or equal (4)
    GreaterThanOrEqual,
    /// Not equals (5)
    NotEquals,
    /// Value is one of `values` (6)
    InList,
    /// Value is none of `values` (7)
    NotInList,
    /// Starts with (8)
    StartsWith,
    /// Ends with (9)
    EndsWith,
    /// Contains, SQL `LIKE '%v%'` (10)
    Contains,
    /// Does not contain (11)
    NotContains,
    /// Equals (12)
    Equals,
}

impl FilterOperator {
    /// Parse operator from its backend code
    pub fn from_code(code: i32) -> Result<Self, GridError> {
        match code {
            1 => Ok(Self::LessThan),
            2 => Ok(Self::LessThanOrEqual),
            3 => Ok(Self::GreaterThan),
            4 => Ok(Self::GreaterThanOrEqual),
            5 => Ok(Self::NotEquals),
            6 => Ok(Self::InList),
            7 => Ok(Self::NotInList),
            8 => Ok(Self::StartsWith),
            9 => Ok(Self::EndsWith),
            10 => Ok(Self::Contains),
            11 => Ok(Self::NotContains),
            12 => Ok(Self::Equals),
            other => Err(GridError::InvalidOperatorCode(other)),
        }
    }

    /// Backend code for this operator
    pub fn code(self) -> i32 {
        match self {
            Self::LessThan => 1,
            Self::LessThanOrEqual => 2,
            Self::GreaterThan => 3,
            Self::GreaterThanOrEqual => 4,
            Self::NotEquals => 5,
            Self::InList => 6,
            Self::NotInList => 7,
            Self::StartsWith => 8,
            Self::EndsWith => 9,
            Self::Contains => 10,
            Self::NotContains => 11,
            Self::Equals => 12,
        }
    }
}

impl TryFrom<i32> for FilterOperator {
    type Error = GridError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<FilterOperator> for i32 {
    fn from(op: FilterOperator) -> Self {
        op.code()
    }
}

/// How the conditions of a search group are combined
#[derive(Debug, Clone, Copy, PartialEq, Eq, Serialize, Deserialize)]
#[serde(try_from = "i32", into = "i32")]
pub enum GroupOperator {
    /// All conditions must hold (1)
    And,
    /// Any condition may hold (2)
    Or,
}

impl GroupOperator {
    pub fn from_code(code: i32) -> Result<Self, GridError> {
        match code {
            1 => Ok(Self::And),
            2 => Ok(Self::Or),
            other => Err(GridError::InvalidGroupOperator(other)),
        }
    }

    pub fn code(self) -> i32 {
        match self {
            Self::And => 1,
            Self::Or => 2,
        }
    }
}

impl TryFrom<i32> for GroupOperator {
    type Error = GridError;

    fn try_from(code: i32) -> Result<Self, Self::Error> {
        Self::from_code(code)
    }
}

impl From<GroupOperator> for i32 {
    fn from(op: GroupOperator) -> Self {
        op.code()
    }
}

/// A single filter condition
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct Condition {
    /// The grid attribute being filtered (e.g. "CustomerID", "Status")
    #[serde(rename = "Attribute")]
    pub attribute: String,
    /// Values compared against; the backend always receives strings
    #[serde(rename = "Values")]
    pub values: Vec<String>,
    /// The operator to apply
    #[serde(rename = "Operator")]
    pub operator: FilterOperator,
}

impl Condition {
    /// Create a new condition
    pub fn new<I, V>(attribute: impl Into<String>, operator: FilterOperator, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self {
            attribute: attribute.into(),
            values: values.into_iter().map(|v| v.to_string()).collect(),
            operator,
        }
    }

    /// Create an equals condition
    pub fn equals(attribute: impl Into<String>, value: impl ToString) -> Self {
        Self::new(attribute, FilterOperator::Equals, [value])
    }

    /// Create a membership condition
    pub fn in_list<I, V>(attribute: impl Into<String>, values: I) -> Self
    where
        I: IntoIterator<Item = V>,
        V: ToString,
    {
        Self::new(attribute, FilterOperator::InList, values)
    }

    /// Create a contains condition
    pub fn contains(attribute: impl Into<String>, value: impl ToString) -> Self {
        Self::new(attribute, FilterOperator::Contains, [value])
    }

    /// Create an inclusive lower bound
    pub fn at_least(attribute: impl Into<String>, value: impl ToString) -> Self {
        Self::new(attribute, FilterOperator::GreaterThanOrEqual, [value])
    }

    /// Create an inclusive upper bound
    pub fn at_most(attribute: impl Into<String>, value: impl ToString) -> Self {
        Self::new(attribute, FilterOperator::LessThanOrEqual, [value])
    }

    /// Check the structural shape of this condition
    pub fn is_valid(&self) -> bool {
        !self.attribute.is_empty() && !self.values.is_empty()
    }
}

/// Filter expression - an ordered list of conditions with AND semantics
#[derive(Debug, Clone, Default, PartialEq, Eq, Serialize, Deserialize)]
pub struct FilterExpression {
    #[serde(rename = "Conditions")]
    conditions: Vec<Condition>,
}

impl FilterExpression {
    /// Create a new empty expression
    pub fn new() -> Self {
        Self { conditions: vec![] }
    }

    /// Add a condition to the expression
    pub fn add(&mut self, condition: Condition) -> &mut Self {
        self.conditions.push(condition);
        self
    }

    /// Add a condition and return self (builder pattern)
    pub fn with(mut self, condition: Condition) -> Self {
        self.conditions.push(condition);
        self
    }

    /// Append every condition of `other`, keeping order
    pub fn and(mut self, other: FilterExpression) -> Self {
        self.conditions.extend(other.conditions);
        self
    }

    /// Get all conditions
    pub fn conditions(&self) -> &[Condition] {
        &self.conditions
    }

    pub fn into_conditions(self) -> Vec<Condition> {
        self.conditions
    }

    /// Check if any conditions are set
    pub fn is_empty(&self) -> bool {
        self.conditions.is_empty()
    }

    /// Get number of conditions
    pub fn len(&self) -> usize {
        self.conditions.len()
    }

    /// Check if a specific attribute is being filtered
    pub fn has_condition_for(&self, attribute: &str) -> bool {
        self.conditions.iter().any(|c| c.attribute == attribute)
    }

    /// Validate all conditions
    pub fn is_valid(&self) -> bool {
        self.conditions.iter().all(Condition::is_valid)
    }
}

/// OR-group (or AND-group) of search conditions
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchGroup {
    #[serde(rename = "Conditions")]
    pub conditions: Vec<Condition>,
    #[serde(rename = "GroupOperator")]
    pub group_operator: GroupOperator,
}

/// `base AND (c1 OR c2 OR ... cn)`, used for quick search
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
pub struct SearchFilterExpression {
    /// Base conditions, always ANDed in
    #[serde(rename = "Conditions")]
    pub conditions: Vec<Condition>,
    /// The grouped search conditions
    #[serde(rename = "Filter")]
    pub filter: SearchGroup,
}

impl SearchFilterExpression {
    /// AND `base` with the OR of `search`
    pub fn any_of(base: FilterExpression, search: Vec<Condition>) -> Self {
        Self {
            conditions: base.into_conditions(),
            filter: SearchGroup {
                conditions: search,
                group_operator: GroupOperator::Or,
            },
        }
    }

    /// Get the base conditions
    pub fn base_conditions(&self) -> &[Condition] {
        &self.conditions
    }

    /// Get the grouped search conditions
    pub fn search_conditions(&self) -> &[Condition] {
        &self.filter.conditions
    }

    pub fn is_valid(&self) -> bool {
        self.conditions.iter().all(Condition::is_valid)
            && self.filter.conditions.iter().all(Condition::is_valid)
    }
}

/// The filter half of a grid query
#[derive(Debug, Clone, PartialEq, Eq, Serialize, Deserialize)]
#[serde(untagged)]
pub enum GridFilter {
    Search(SearchFilterExpression),
    Plain(FilterExpression),
}

impl GridFilter {
    /// Every condition in the filter, base conditions first
    pub fn all_conditions(&self) -> Vec<&Condition> {
        match self {
            GridFilter::Plain(expr) => expr.conditions().iter().collect(),
            GridFilter::Search(expr) => expr
                .base_conditions()
                .iter()
                .chain(expr.search_conditions())
                .collect(),
        }
    }

    pub fn is_valid(&self) -> bool {
        match self {
            GridFilter::Plain(expr) => expr.is_valid(),
            GridFilter::Search(expr) => expr.is_valid(),
        }
    }
}

impl From<FilterExpression> for GridFilter {
    fn from(expr: FilterExpression) -> Self {
        GridFilter::Plain(expr)
    }
}

impl From<SearchFilterExpression> for GridFilter {
    fn from(expr: SearchFilterExpression) -> Self {
        GridFilter::Search(expr)
    }
}

/// Attribute names used by the built-in grids
pub mod attributes {
    pub const STATUS: &str = "Status";
    pub const DATE: &str = "Date";
    pub const TICKET_ID: &str = "TicketID";
    pub const CUSTOMER_ID: &str = "CustomerID";
    pub const INVOICE_ID: &str = "InvoiceID";
}

#[cfg(test)]
mod tests {
    use super::*;
    use serde_json::json;

    #[test]
    fn test_operator_codes() {
        assert_eq!(FilterOperator::from_code(12).unwrap(), FilterOperator::Equals);
        assert_eq!(FilterOperator::from_code(10).unwrap(), FilterOperator::Contains);
        assert_eq!(FilterOperator::GreaterThanOrEqual.code(), 4);
        assert_eq!(FilterOperator::LessThanOrEqual.code(), 2);
    }

    #[test]
    fn test_unknown_operator_code() {
        assert!(matches!(
            FilterOperator::from_code(42),
            Err(GridError::InvalidOperatorCode(42))
        ));
        assert!(matches!(
            GroupOperator::from_code(0),
            Err(GridError::InvalidGroupOperator(0))
        ));
    }

    #[test]
    fn test_condition_creation() {
        let condition = Condition::equals("CustomerID", 2613496);
        assert_eq!(condition.attribute, "CustomerID");
        assert_eq!(condition.operator, FilterOperator::Equals);
        assert_eq!(condition.values, vec!["2613496"]);
        assert!(condition.is_valid());
    }

    #[test]
    fn test_condition_in_list() {
        let condition = Condition::in_list("Status", ["A", "P"]);
        assert_eq!(condition.operator, FilterOperator::InList);
        assert_eq!(condition.values.len(), 2);
    }

    #[test]
    fn test_invalid_conditions() {
        assert!(!Condition::equals("", "x").is_valid());
        assert!(!Condition::new("Status", FilterOperator::InList, Vec::<String>::new()).is_valid());
    }

    #[test]
    fn test_filter_expression() {
        let filter = FilterExpression::new()
            .with(Condition::equals("Status", "A"))
            .with(Condition::equals("CustomerID", 7));

        assert_eq!(filter.len(), 2);
        assert!(filter.has_condition_for("Status"));
        assert!(filter.has_condition_for("CustomerID"));
        assert!(!filter.has_condition_for("InvoiceID"));
        assert!(filter.is_valid());
    }

    #[test]
    fn test_filter_expression_and_keeps_order() {
        let base = FilterExpression::new().with(Condition::equals("Status", "A"));
        let extra = FilterExpression::new().with(Condition::at_least("Date", "01/01/2024"));
        let combined = base.and(extra);

        let attrs: Vec<&str> = combined
            .conditions()
            .iter()
            .map(|c| c.attribute.as_str())
            .collect();
        assert_eq!(attrs, vec!["Status", "Date"]);
    }

    #[test]
    fn test_wire_format() {
        let filter = FilterExpression::new().with(Condition::equals("Status", "A"));
        let value = serde_json::to_value(&filter).unwrap();
        assert_eq!(
            value,
            json!({"Conditions": [{"Attribute": "Status", "Values": ["A"], "Operator": 12}]})
        );
    }

    #[test]
    fn test_search_wire_format() {
        let base = FilterExpression::new().with(Condition::equals("Status", "A"));
        let search = SearchFilterExpression::any_of(
            base,
            vec![Condition::contains("FirstName", "bob")],
        );
        let value = serde_json::to_value(GridFilter::from(search)).unwrap();
        assert_eq!(value["Filter"]["GroupOperator"], 2);
        assert_eq!(value["Filter"]["Conditions"][0]["Operator"], 10);
        assert_eq!(value["Conditions"][0]["Attribute"], "Status");
    }

    #[test]
    fn test_deserialize_rejects_unknown_operator() {
        let raw = json!({"Attribute": "Status", "Values": ["A"], "Operator": 99});
        assert!(serde_json::from_value::<Condition>(raw).is_err());
    }

    #[test]
    fn test_grid_filter_untagged_roundtrip_picks_search() {
        let raw = json!({
            "Conditions": [],
            "Filter": {"Conditions": [], "GroupOperator": 2}
        });
        let filter: GridFilter = serde_json::from_value(raw).unwrap();
        assert!(matches!(filter, GridFilter::Search(_)));
    }
}
